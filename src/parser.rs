use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::error::{ExtractError, Result};
use crate::types::{Rule, RuleKind};

/// Section boundary comments, e.g. `// ===BEGIN PRIVATE DOMAINS===`
static SECTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^//\s*===\s*(BEGIN|END)\s+(ICANN|PRIVATE)\s+DOMAINS\s*===")
        .expect("SECTION_PATTERN: hardcoded regex is invalid")
});

/// Output of [`parse_rules`]
#[derive(Debug, Clone)]
pub struct ParsedRules {
    pub rules: Vec<Rule>,
    /// Non-comment lines that were not understood
    pub skipped: usize,
    /// Hex SHA-256 of the source text
    pub fingerprint: String,
}

/// Parse Public Suffix List text.
///
/// Unknown line formats are skipped and counted. Fails only when the text is
/// empty or yields no usable rules, which indicates a truncated download.
pub fn parse_rules(text: &str) -> Result<ParsedRules> {
    if text.trim().is_empty() {
        return Err(ExtractError::Parse {
            message: "suffix list text is empty".to_string(),
            skipped: 0,
        });
    }

    let mut rules = Vec::new();
    let mut skipped = 0;
    let mut private = false;

    for line in text.lines() {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with("//") {
            if let Some(captures) = SECTION_PATTERN.captures(line) {
                private = &captures[1] == "BEGIN" && &captures[2] == "PRIVATE";
            }
            continue;
        }

        // A rule ends at the first whitespace
        let token = line.split_whitespace().next().unwrap_or_default();
        match parse_rule(token, private) {
            Some(rule) => rules.push(rule),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "skipped unrecognized suffix list lines");
    }

    if rules.is_empty() {
        return Err(ExtractError::Parse {
            message: "suffix list contains no usable rules".to_string(),
            skipped,
        });
    }

    Ok(ParsedRules {
        rules,
        skipped,
        fingerprint: fingerprint(text),
    })
}

/// Hex SHA-256 of suffix list text.
pub fn fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Parse a single rule token; `None` if the format is not understood.
fn parse_rule(token: &str, private: bool) -> Option<Rule> {
    let (kind, body) = if let Some(rest) = token.strip_prefix('!') {
        (RuleKind::Exception, rest)
    } else if let Some(rest) = token.strip_prefix("*.") {
        (RuleKind::Wildcard, rest)
    } else {
        (RuleKind::Normal, token)
    };

    let labels: Vec<String> = body.split('.').map(str::to_lowercase).collect();
    if labels.iter().any(|label| !is_valid_label(label)) {
        return None;
    }

    // `!ck` would make the empty sequence a suffix
    if kind == RuleKind::Exception && labels.len() < 2 {
        return None;
    }

    Some(Rule::new(labels, kind, private))
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && !label.chars().any(|c| {
            (c.is_ascii_punctuation() && c != '-' && c != '_') || c.is_whitespace() || c.is_control()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_pattern_regex_compiles() {
        assert!(SECTION_PATTERN.is_match("// ===BEGIN PRIVATE DOMAINS==="));
        assert!(!SECTION_PATTERN.is_match("// just a comment"));
    }

    #[test]
    fn test_parse_rule_kinds() {
        let text = "com\n*.ck\n!www.ck\nco.uk\n";
        let parsed = parse_rules(text).unwrap();
        assert_eq!(parsed.rules.len(), 4);
        assert_eq!(parsed.skipped, 0);

        assert_eq!(parsed.rules[0].labels, vec!["com"]);
        assert_eq!(parsed.rules[0].kind, RuleKind::Normal);
        assert_eq!(parsed.rules[1].labels, vec!["ck"]);
        assert_eq!(parsed.rules[1].kind, RuleKind::Wildcard);
        assert_eq!(parsed.rules[2].labels, vec!["www", "ck"]);
        assert_eq!(parsed.rules[2].kind, RuleKind::Exception);
        assert_eq!(parsed.rules[3].labels, vec!["co", "uk"]);
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let text = "// comment\n\n   \ncom\n// another\n";
        let parsed = parse_rules(text).unwrap();
        assert_eq!(parsed.rules.len(), 1);
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_private_section_toggle() {
        let text = "\
// ===BEGIN ICANN DOMAINS===
com
// ===END ICANN DOMAINS===
// ===BEGIN PRIVATE DOMAINS===
// GitHub, Inc.
github.io
// ===END PRIVATE DOMAINS===
after.example
";
        let parsed = parse_rules(text).unwrap();
        assert_eq!(parsed.rules.len(), 3);
        assert!(!parsed.rules[0].private);
        assert!(parsed.rules[1].private);
        assert!(!parsed.rules[2].private);
    }

    #[test]
    fn test_labels_lowercased_punycode_untouched() {
        let text = "CO.UK\nxn--55qx5d.cn\n公司.cn\n";
        let parsed = parse_rules(text).unwrap();
        assert_eq!(parsed.rules[0].labels, vec!["co", "uk"]);
        assert_eq!(parsed.rules[1].labels, vec!["xn--55qx5d", "cn"]);
        assert_eq!(parsed.rules[2].labels, vec!["公司", "cn"]);
    }

    #[test]
    fn test_rule_ends_at_whitespace() {
        let parsed = parse_rules("com   trailing words\n").unwrap();
        assert_eq!(parsed.rules[0].labels, vec!["com"]);
    }

    #[test]
    fn test_unknown_formats_skipped_and_counted() {
        let text = "com\na..b\n*\nfoo.*.bar\n!ck\n.leading\nnet\n";
        let parsed = parse_rules(text).unwrap();
        assert_eq!(parsed.rules.len(), 2);
        assert_eq!(parsed.skipped, 5);
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        assert!(matches!(
            parse_rules(""),
            Err(ExtractError::Parse { skipped: 0, .. })
        ));
        assert!(matches!(
            parse_rules("  \n\n"),
            Err(ExtractError::Parse { .. })
        ));
    }

    #[test]
    fn test_no_usable_rules_is_parse_error() {
        let text = "// only comments\n<html>\n</html>\n";
        match parse_rules(text) {
            Err(ExtractError::Parse { skipped, .. }) => assert_eq!(skipped, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_fingerprint_tracks_text() {
        let a = parse_rules("com\n").unwrap();
        let b = parse_rules("com\n").unwrap();
        let c = parse_rules("net\n").unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_ne!(a.fingerprint, c.fingerprint);
        assert_eq!(a.fingerprint.len(), 64);
    }
}

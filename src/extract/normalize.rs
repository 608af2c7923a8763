/// A host label in the form used for suffix lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelForm {
    /// Punycode or non-ASCII label mapped to its Unicode form
    Decoded(String),
    /// Label used as given (lowercased)
    PassThrough(String),
}

impl LabelForm {
    pub fn as_str(&self) -> &str {
        match self {
            LabelForm::Decoded(s) | LabelForm::PassThrough(s) => s,
        }
    }

    pub fn is_decoded(&self) -> bool {
        matches!(self, LabelForm::Decoded(_))
    }
}

/// Normalize one label for matching against suffix list rules.
///
/// The list writes internationalized rules in Unicode, so `xn--` labels that
/// decode strictly are matched in decoded form. Labels that only look like
/// punycode are passed through. Never fails.
pub fn normalize_label(label: &str) -> LabelForm {
    let lower = label.to_lowercase();

    if lower.is_ascii() && !lower.starts_with("xn--") {
        return LabelForm::PassThrough(lower);
    }

    let (unicode, result) = idna::domain_to_unicode(&lower);
    match result {
        Ok(()) if !unicode.is_empty() && !unicode.contains('.') => LabelForm::Decoded(unicode),
        _ => LabelForm::PassThrough(lower),
    }
}

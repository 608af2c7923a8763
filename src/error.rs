use thiserror::Error;

/// Classifies suffix list fetch failures for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Connection, DNS or TLS failure
    Transport,
    /// Server answered with a non-success status
    Status,
    /// Server or file returned no content
    EmptyBody,
    /// Operation exceeded the configured fetch timeout
    Timeout,
    /// Local file does not exist or cannot be read
    NotFound,
}

/// Suffix extraction error types
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Parse error: {message} ({skipped} lines skipped)")]
    Parse { message: String, skipped: usize },

    #[error("Fetch error: {message}")]
    Fetch {
        kind: FetchErrorKind,
        message: String,
    },

    #[error("Cache IO error: {0}")]
    CacheIo(#[from] std::io::Error),

    #[error("Cache record error: {0}")]
    CacheFormat(#[from] serde_json::Error),

    #[error("Cache unavailable: {0}")]
    CacheMiss(String),

    #[error("All suffix list sources failed: {}", attempts.join("; "))]
    Exhausted { attempts: Vec<String> },

    #[error("Config error: {0}")]
    Config(String),
}

impl ExtractError {
    pub(crate) fn fetch(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        ExtractError::Fetch {
            kind,
            message: message.into(),
        }
    }

    /// Returns the fetch error kind, if this is a fetch failure.
    pub fn fetch_kind(&self) -> Option<FetchErrorKind> {
        match self {
            ExtractError::Fetch { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_kind_is_matchable() {
        let err = ExtractError::fetch(FetchErrorKind::Timeout, "request timed out");
        match &err {
            ExtractError::Fetch { kind, .. } => {
                assert!(matches!(kind, FetchErrorKind::Timeout));
            }
            _ => panic!("expected Fetch"),
        }
        assert_eq!(err.fetch_kind(), Some(FetchErrorKind::Timeout));
    }

    #[test]
    fn test_fetch_kind_none_for_other_errors() {
        let err = ExtractError::Config("bad".into());
        assert_eq!(err.fetch_kind(), None);
    }

    #[test]
    fn test_parse_error_display_includes_skipped() {
        let err = ExtractError::Parse {
            message: "no usable rules".into(),
            skipped: 3,
        };
        let display = format!("{}", err);
        assert!(display.contains("no usable rules"), "got: {}", display);
        assert!(display.contains("3 lines skipped"), "got: {}", display);
    }

    #[test]
    fn test_exhausted_lists_every_attempt() {
        let err = ExtractError::Exhausted {
            attempts: vec!["remote: timeout".into(), "snapshot: disabled".into()],
        };
        let display = format!("{}", err);
        assert!(display.contains("remote: timeout"), "got: {}", display);
        assert!(display.contains("snapshot: disabled"), "got: {}", display);
    }

    #[test]
    fn test_io_error_converts_to_cache_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ExtractError = io.into();
        assert!(matches!(err, ExtractError::CacheIo(_)));
    }
}

use std::fmt;
use std::path::{Path, PathBuf};

/// Official Public Suffix List endpoint
pub const PUBLIC_SUFFIX_LIST_URL: &str = "https://publicsuffix.org/list/public_suffix_list.dat";

/// Mirror of the list in the upstream repository
pub const PUBLIC_SUFFIX_LIST_MIRROR_URL: &str =
    "https://raw.githubusercontent.com/publicsuffix/list/master/public_suffix_list.dat";

/// Remote endpoints tried in order by default
pub const DEFAULT_SUFFIX_LIST_URLS: &[&str] =
    &[PUBLIC_SUFFIX_LIST_URL, PUBLIC_SUFFIX_LIST_MIRROR_URL];

/// Explicit location of suffix list text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuffixListLocation {
    Url(String),
    Path(PathBuf),
}

impl SuffixListLocation {
    /// Classify a string: `http(s)://` is a URL, `file://` and anything else a path.
    pub fn detect(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            SuffixListLocation::Url(location.to_string())
        } else if let Some(path) = location.strip_prefix("file://") {
            SuffixListLocation::Path(PathBuf::from(path))
        } else {
            SuffixListLocation::Path(PathBuf::from(location))
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        SuffixListLocation::Path(path.as_ref().to_path_buf())
    }
}

impl fmt::Display for SuffixListLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuffixListLocation::Url(url) => write!(f, "{}", url),
            SuffixListLocation::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

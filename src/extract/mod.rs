//! Host splitting, label normalization and the public [`Extractor`].

mod extractor;
mod host;
mod normalize;

pub use extractor::Extractor;
pub use host::{split_host, Host};
pub use normalize::{normalize_label, LabelForm};

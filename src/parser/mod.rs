//! Parsing of URLs and path-like strings into structured parts.
//!
//! Pure functions only: nothing here touches the network or the file
//! system. [`parse_path`] handles the odd encodings seen in CDN path
//! segments (repeated percent-encoding, trailing `:metadata` suffixes)
//! and [`parse_url`] layers origin classification and the authorization
//! query-parameter split on top of it.

mod error;
mod path;
mod url;

pub use error::ParseError;
pub use path::{parse_path, ParsedPath};
pub use url::{parse_url, ParsedUrl, AUTH_PARAM_KEYS};

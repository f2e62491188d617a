//! cordgrab core: resolve Discord-adjacent media URLs into every
//! alternate format the backing services can serve, plan safe file
//! names, and stream downloads to disk.
//!
//! The flow is [`resolve`] (URL classification, path detection, format
//! construction) followed by [`download_asset`] (naming, traversal
//! guard, fetch), with every terminal state folded into a
//! [`DownloadOutcome`]. [`CollectiblesCache`] supplies human-readable
//! names for shop collectibles referenced by asset URLs.

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod asset;
pub mod collectibles;
pub mod config;
pub mod dialog;
pub mod download;
pub mod naming;
pub mod parser;
pub mod resolve;
pub mod source;

pub use asset::{
    extensions_for_mime, file_threshold, AssetCategory, AssetRequest, Classifier,
};
pub use collectibles::{CollectibleRecord, CollectiblesCache};
pub use config::{ConfigError, Settings};
pub use dialog::{NoDialog, SaveDialog};
pub use download::{
    download_asset, DownloadContext, DownloadError, DownloadOutcome, HttpClient, OutcomeCategory,
    Severity,
};
pub use naming::{sanitize, SanitizeOptions, FALLBACK_BASE_NAME};
pub use parser::{parse_path, parse_url, ParseError, ParsedPath, ParsedUrl};
pub use resolve::{resolve, CandidateUrlSet, Resolution, ResolveError};
pub use source::{classify, Source};

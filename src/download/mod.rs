//! Download execution: HTTP transport, outcome classification and the
//! end-to-end executor.

mod client;
mod error;
mod executor;
mod outcome;

pub use client::{
    HttpClient, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, USER_AGENT,
};
pub use error::DownloadError;
pub use executor::{download_asset, DownloadContext};
pub use outcome::{DownloadOutcome, OutcomeCategory, Severity};

//! URL parsing: validation, source classification and the split between
//! authorization and other query parameters.

use url::Url;

use super::error::ParseError;
use super::path::parse_path;
use crate::source::{self, Source, PRIMARY_HOST, STAGING_HOSTS};

/// Query keys carrying the CDN's signed-authorization data. These must
/// be forwarded verbatim when rebuilding URLs on the same host family.
pub const AUTH_PARAM_KEYS: [&str; 3] = ["ex", "is", "hm"];

/// A validated URL with its path parts and query parameters broken out.
#[derive(Debug, Clone)]
pub struct ParsedUrl {
    pub url: Url,
    /// Directory portion of the path, trailing slash included.
    pub path: String,
    /// Raw (still-encoded) final path segment.
    pub path_end: String,
    /// Decoded final segment without extension or metadata suffix.
    pub base_name: String,
    /// Lowercased extension of the final segment, when it has one.
    pub extension: Option<String>,
    /// `ex`/`is`/`hm` signed-authorization parameters, in URL order.
    pub auth_params: Vec<(String, String)>,
    /// Every other query parameter, in URL order.
    pub other_params: Vec<(String, String)>,
    pub source: Source,
}

impl ParsedUrl {
    /// Full serialized form.
    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    /// ASCII origin, e.g. `https://cdn.discordapp.com`.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }
}

/// Parses and classifies `input`.
///
/// Staging hosts are rewritten to the primary host so everything
/// downstream sees one canonical origin. Unknown sources keep the URL
/// but get empty path fields; inline SVG data URLs report the whole URL
/// as their path with a fixed `svg` extension.
pub fn parse_url(input: &str) -> Result<ParsedUrl, ParseError> {
    let mut url =
        Url::parse(input).map_err(|e| ParseError::malformed_url(input, e))?;

    if let Some(host) = url.host_str() {
        if STAGING_HOSTS.contains(&host) {
            // Cannot fail for a fixed valid hostname.
            let _ = url.set_host(Some(PRIMARY_HOST));
        }
    }

    let source = source::classify(&url);

    let (path, path_end, base_name, extension) = match source {
        Source::Unknown => (String::new(), String::new(), String::new(), None),
        Source::InlineSvg => (
            url.as_str().to_string(),
            String::new(),
            String::new(),
            Some("svg".to_string()),
        ),
        _ => {
            let parsed = parse_path(url.path());
            (
                parsed.directory,
                parsed.path_end,
                parsed.base_name,
                parsed.extension,
            )
        }
    };

    let mut auth_params = Vec::new();
    let mut other_params = Vec::new();
    for (key, value) in url.query_pairs() {
        let pair = (key.into_owned(), value.into_owned());
        if AUTH_PARAM_KEYS.contains(&pair.0.as_str()) {
            auth_params.push(pair);
        } else {
            other_params.push(pair);
        }
    }

    Ok(ParsedUrl {
        url,
        path,
        path_end,
        base_name,
        extension,
        auth_params,
        other_params,
        source,
    })
}

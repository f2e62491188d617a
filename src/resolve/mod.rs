//! URL resolution: turning one asset URL into the set of alternate
//! format URLs the backing services can serve.

mod builder;
mod detect;
mod pipeline;

pub use builder::build_candidates;
pub use detect::detect_asset_path;
pub use pipeline::{resolve, ResolveError, Resolution};

/// Per-extension candidate URLs plus the fallback used when no
/// extension was (or could be) chosen.
///
/// Insertion is first-match-wins and order-preserving: resolution
/// branches run in priority order and the first URL recorded for an
/// extension sticks. The first key is the default offered to save
/// dialogs.
#[derive(Debug, Clone)]
pub struct CandidateUrlSet {
    by_extension: Vec<(String, String)>,
    pub fallback: String,
}

impl CandidateUrlSet {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            by_extension: Vec::new(),
            fallback: fallback.into(),
        }
    }

    /// Records `url` for `extension` unless one is already present.
    /// Empty URLs are ignored.
    pub fn insert_first(&mut self, extension: &str, url: impl Into<String>) {
        let url = url.into();
        if url.is_empty() || self.get(extension).is_some() {
            return;
        }
        self.by_extension.push((extension.to_string(), url));
    }

    pub fn get(&self, extension: &str) -> Option<&str> {
        self.by_extension
            .iter()
            .find(|(ext, _)| ext == extension)
            .map(|(_, url)| url.as_str())
    }

    /// Extensions in insertion order.
    pub fn extensions(&self) -> Vec<String> {
        self.by_extension.iter().map(|(ext, _)| ext.clone()).collect()
    }

    /// The URL to fetch for `extension`, falling back when the
    /// extension is absent or none was chosen.
    pub fn url_for(&self, extension: Option<&str>) -> &str {
        extension
            .and_then(|ext| self.get(ext))
            .unwrap_or(&self.fallback)
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_extension.len()
    }
}

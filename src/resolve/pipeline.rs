//! The resolution pipeline: classify the request's URLs, probe what is
//! missing, and produce the candidate URL set.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use super::builder::build_candidates;
use super::detect::detect_asset_path;
use super::CandidateUrlSet;
use crate::asset::{formats_for, AssetCategory, AssetRequest, Classifier, ANIMATED_MIMES};
use crate::download::HttpClient;
use crate::parser::{parse_url, ParsedUrl};
use crate::source::Source;

/// Tenor serves every rendition of a post under the same media id with
/// a two-character format suffix.
const TENOR_MEDIA_BASE: &str = "https://media.tenor.com";
const TENOR_SUFFIXES: [(&str, &str); 6] = [
    ("gif", "AC"),
    ("mp4", "Po"),
    ("webm", "Ps"),
    ("png", "Af"),
    ("webp", "Ae"),
    ("awebp", "AM"),
];

/// Width segment of a Wikimedia rendered-thumb path.
static THUMB_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/\d+px-").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});
/// Trailing render extension of a Wikimedia rendered-thumb path.
static THUMB_RENDER_EXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.\w+$").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

/// Errors the pipeline cannot recover from.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The primary URL is malformed or points somewhere no resolution
    /// rule covers.
    #[error("unsupported asset source: {detail}")]
    UnsupportedSource { detail: String },
}

impl ResolveError {
    pub fn unsupported_source(detail: impl Into<String>) -> Self {
        Self::UnsupportedSource {
            detail: detail.into(),
        }
    }
}

/// Everything resolution produced: the candidate set plus the parsed
/// (and possibly host-rewritten) URLs, which naming still needs.
#[derive(Debug)]
pub struct Resolution {
    pub candidates: CandidateUrlSet,
    pub primary: ParsedUrl,
    pub secondary: Option<ParsedUrl>,
}

/// Which of the request's two URLs drives resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Driver {
    Primary,
    Secondary,
}

/// Uniform per-source resolver contract: fill `set` with candidate URLs
/// for the driving `url`. `deferral` carries the primary URL when the
/// asset arrived through the external image proxy, for sources that
/// fall back to it for paths they cannot re-render.
type SourceResolver = fn(
    set: &mut CandidateUrlSet,
    url: &mut ParsedUrl,
    asset: &mut AssetRequest,
    deferral: Option<&ParsedUrl>,
);

/// Picks the URL that drives resolution. A secondary URL beats the
/// primary when it reaches closer to the original asset (CDN behind a
/// proxy, the un-proxied original behind an embed).
fn select_driver(primary: &ParsedUrl, secondary: Option<&ParsedUrl>) -> Option<Driver> {
    let secondary_source = secondary.map(|s| s.source);
    match primary.source {
        Source::PrimaryDomain
        | Source::PluginHosted
        | Source::InlineSvg
        | Source::AttachmentMediaProxy => return Some(Driver::Primary),
        _ => {}
    }
    if matches!(
        secondary_source,
        Some(Source::Cdn | Source::AssetMediaProxy)
    ) {
        return Some(Driver::Secondary);
    }
    if primary.source == Source::AssetMediaProxy {
        return Some(Driver::Primary);
    }
    if matches!(secondary_source, Some(Source::Wikimedia | Source::Twitter)) {
        return Some(Driver::Secondary);
    }
    match primary.source {
        Source::Cdn | Source::Tenor | Source::ExternalImageProxy => Some(Driver::Primary),
        _ => None,
    }
}

/// The resolver for one source family, keyed by where the driving URL
/// points. Each entry isolates one network's construction quirks behind
/// the same contract.
fn resolver_for(source: Source) -> Option<SourceResolver> {
    match source {
        Source::PrimaryDomain | Source::PluginHosted | Source::InlineSvg => {
            Some(resolve_direct)
        }
        Source::AttachmentMediaProxy | Source::ExternalImageProxy => Some(resolve_built_only),
        Source::AssetMediaProxy | Source::Cdn => Some(resolve_discord_family),
        Source::Tenor => Some(resolve_tenor),
        Source::Wikimedia => Some(resolve_wikimedia),
        Source::Twitter => Some(resolve_twitter),
        Source::Unknown => None,
    }
}

/// Resolves `asset` into its candidate URL set: pick the driving URL,
/// look up its source's resolver, run it.
pub async fn resolve(
    asset: &mut AssetRequest,
    client: &HttpClient,
) -> Result<Resolution, ResolveError> {
    let mut primary = parse_url(&asset.primary_url)
        .map_err(|e| ResolveError::unsupported_source(e.to_string()))?;

    let mut secondary = match asset.secondary_url.as_deref() {
        Some(raw) => parse_url(raw).ok(),
        None => None,
    };
    if secondary.as_ref().is_some_and(|s| s.source == Source::Unknown) {
        secondary = None;
        asset.secondary_url = None;
    }

    if primary.source == Source::Unknown {
        return Err(ResolveError::unsupported_source(format!(
            "{primary:?} / {asset:?}"
        )));
    }

    if asset.mime.is_none() {
        asset.mime = client.query_content_type(primary.href()).await;
        debug!(mime = ?asset.mime, url = primary.href(), "probed content type");
    }
    if asset
        .mime
        .as_deref()
        .is_some_and(|m| ANIMATED_MIMES.contains(&m))
    {
        asset.animatable = true;
    }
    if asset.classifier.is_none() {
        asset.classifier = Some(Classifier::Mime(asset.mime.clone().unwrap_or_default()));
    }

    let mut candidates = CandidateUrlSet::new(primary.href());

    match select_driver(&primary, secondary.as_ref()) {
        Some(Driver::Primary) => {
            let resolver = resolver_for(primary.source).ok_or_else(|| {
                ResolveError::unsupported_source(format!("{primary:?} / {asset:?}"))
            })?;
            resolver(&mut candidates, &mut primary, asset, None);
        }
        Some(Driver::Secondary) => {
            if let Some(sec) = secondary.as_mut() {
                let resolver = resolver_for(sec.source).ok_or_else(|| {
                    ResolveError::unsupported_source(format!("{sec:?} / {asset:?}"))
                })?;
                let deferral = (primary.source == Source::ExternalImageProxy)
                    .then_some(&primary);
                resolver(&mut candidates, sec, asset, deferral);
            }
        }
        None => {
            return Err(ResolveError::unsupported_source(format!(
                "{primary:?} / {secondary:?} / {asset:?}"
            )));
        }
    }

    debug!(
        extensions = ?candidates.extensions(),
        fallback = candidates.fallback.as_str(),
        "resolved candidate set"
    );

    Ok(Resolution {
        candidates,
        primary,
        secondary,
    })
}

/// Directly hosted assets offer only their own format.
fn resolve_direct(
    set: &mut CandidateUrlSet,
    url: &mut ParsedUrl,
    _asset: &mut AssetRequest,
    _deferral: Option<&ParsedUrl>,
) {
    if let Some(ext) = url.extension.clone() {
        let href = url.href().to_string();
        set.insert_first(&ext, href);
    }
}

/// Sources whose URL already sits on the host that serves alternate
/// formats: run the builder as-is.
fn resolve_built_only(
    set: &mut CandidateUrlSet,
    url: &mut ParsedUrl,
    asset: &mut AssetRequest,
    _deferral: Option<&ParsedUrl>,
) {
    build_candidates(set, url, asset);
}

/// CDN and asset-proxy URLs go through path detection first, which may
/// rewrite the host and fill in the category.
fn resolve_discord_family(
    set: &mut CandidateUrlSet,
    url: &mut ParsedUrl,
    asset: &mut AssetRequest,
    _deferral: Option<&ParsedUrl>,
) {
    detect_asset_path(url, asset);
    build_candidates(set, url, asset);
}

/// Wikimedia rendered thumbs derive both the full-size original and,
/// for SVG sources, arbitrary-format renders at any width. Anything
/// else also defers to the external image proxy on the primary URL.
fn resolve_wikimedia(
    set: &mut CandidateUrlSet,
    secondary: &mut ParsedUrl,
    asset: &mut AssetRequest,
    deferral: Option<&ParsedUrl>,
) {
    let mut skip_external_proxy = false;

    if secondary.path.starts_with("/wikipedia/commons/thumb") {
        // Dropping `/thumb/` and the final render segment yields the
        // full-size original image's URL.
        let derived = secondary.href().replacen("/thumb/", "/", 1);
        let mut segments: Vec<&str> = derived.split('/').collect();
        segments.pop();
        let full_href = segments.join("/");

        if let Ok(full_image) = parse_url(&full_href) {
            asset.alias = Some(full_image.base_name.clone());

            if full_image.extension.as_deref() == Some("svg") {
                skip_external_proxy = true;
                // The renderer serves SVG sources as png/jpg/webp at
                // any requested width; 4096 matches the media proxy's
                // maximum sizing.
                if let Some(support) = formats_for(Source::Wikimedia, AssetCategory::WikimediaSvg)
                {
                    for &ext in support.still {
                        let built = if ext == "svg" {
                            full_image.href().to_string()
                        } else {
                            let widened =
                                THUMB_WIDTH.replace(secondary.href(), "/4096px-");
                            THUMB_RENDER_EXT
                                .replace(&widened, format!(".{ext}").as_str())
                                .into_owned()
                        };
                        set.insert_first(ext, built);
                    }
                }
            } else if let Some(ext) = full_image.extension.clone() {
                let href = full_image.href().to_string();
                set.insert_first(&ext, href);
            }
        }
    }

    if !skip_external_proxy {
        if let Some(primary) = deferral {
            build_candidates(set, primary, asset);
        }
    }
}

/// Twitter media paths re-render through `format`/`name` parameters;
/// profile images and banners do not, so those defer to the external
/// image proxy.
fn resolve_twitter(
    set: &mut CandidateUrlSet,
    secondary: &mut ParsedUrl,
    asset: &mut AssetRequest,
    deferral: Option<&ParsedUrl>,
) {
    let formattable = ["/ext_tw_video_thumb", "/media"]
        .iter()
        .any(|prefix| secondary.path.starts_with(prefix));

    if formattable {
        if let Some(support) = formats_for(Source::Twitter, AssetCategory::TwitterImage) {
            for &ext in support.still {
                set.insert_first(
                    ext,
                    format!(
                        "{}{}{}?format={}&name=4096x4096",
                        secondary.origin(),
                        secondary.path,
                        secondary.base_name,
                        ext
                    ),
                );
            }
        }
    } else if let Some(primary) = deferral {
        build_candidates(set, primary, asset);
    }
}

/// Tenor renditions share a media id; swapping the two-character
/// suffix selects the format.
fn resolve_tenor(
    set: &mut CandidateUrlSet,
    primary: &mut ParsedUrl,
    _asset: &mut AssetRequest,
    _deferral: Option<&ParsedUrl>,
) {
    let joined: String = primary.path.chars().filter(|&c| c != '/').collect();
    let mut chars: Vec<char> = joined.chars().collect();
    if chars.len() < 2 {
        return;
    }
    chars.truncate(chars.len() - 2);
    let media_id: String = chars.into_iter().collect();

    for (ext, suffix) in TENOR_SUFFIXES {
        let file_ext = if ext == "awebp" { "webp" } else { ext };
        set.insert_first(
            ext,
            format!("{TENOR_MEDIA_BASE}/{media_id}{suffix}/tenor.{file_ext}"),
        );
    }
}

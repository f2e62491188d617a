//! Alternate-format URL construction for proxy-family and CDN sources.

use url::Url;

use super::CandidateUrlSet;
use crate::asset::{formats_for, AssetCategory, AssetRequest, Classifier};
use crate::parser::ParsedUrl;
use crate::source::Source;

/// Compound-format extensions collapse to their container format in
/// real URLs and file names.
pub fn resolve_compound_extension(ext: &str) -> String {
    ext.replace("apng", "png").replace("awebp", "webp")
}

fn format_param(resolved_ext: &str) -> String {
    resolved_ext.replace("jpg", "jpeg")
}

/// Builds one candidate URL per available extension for `url` and
/// records each into `set` (first writer wins).
///
/// Only proxy-family and CDN sources are handled here; the third-party
/// hosts (Tenor, Twitter, Wikimedia) have their own construction rules
/// in the pipeline.
pub fn build_candidates(set: &mut CandidateUrlSet, url: &ParsedUrl, asset: &AssetRequest) {
    let Some(category) = asset
        .classifier
        .as_ref()
        .and_then(Classifier::table_category)
    else {
        return;
    };
    let Some(support) = formats_for(url.source, category) else {
        return;
    };

    let is_video = crate::asset::is_video_mime(asset.mime.as_deref());

    for &ext in support.applicable(asset.animatable) {
        let resolved_ext = resolve_compound_extension(ext);
        let built = if url.source.is_proxy_family() {
            build_proxy_url(url, asset, ext, &resolved_ext, is_video)
        } else if url.source == Source::Cdn {
            build_cdn_url(url, category, ext, &resolved_ext, is_video)
        } else {
            None
        };
        if let Some(built) = built {
            set.insert_first(ext, built);
        }
    }
}

/// Media-proxy family construction.
///
/// Assets on the media proxy change format by rewriting the file name;
/// attachments, the external proxy and video files keep their path and
/// use the `format` query parameter instead. Authorization parameters
/// are always forwarded.
fn build_proxy_url(
    url: &ParsedUrl,
    asset: &AssetRequest,
    ext: &str,
    resolved_ext: &str,
    is_video: bool,
) -> Option<String> {
    let base = if url.source == Source::AssetMediaProxy && !is_video {
        format!("{}{}{}.{}", url.origin(), url.path, url.base_name, resolved_ext)
    } else {
        format!("{}{}{}", url.origin(), url.path, url.path_end)
    };
    let mut built = Url::parse(&base).ok()?;

    {
        let mut params = built.query_pairs_mut();
        for (key, value) in &url.auth_params {
            params.append_pair(key, value);
        }

        if (is_video || url.source != Source::AssetMediaProxy)
            && url.extension.as_deref() != Some(ext)
        {
            params.append_pair("format", &format_param(resolved_ext));
        }

        // Attachments do not support resizing; everything else on
        // these hosts does.
        if url.source != Source::AttachmentMediaProxy {
            params.append_pair("size", "4096");
        }

        if ext == "awebp" && asset.animatable {
            params.append_pair("animated", "true");
        } else if ext == "png" && asset.animatable {
            // Forces a re-encode so an animated source yields a
            // genuinely static png.
            params.append_pair("passthrough", "false");
        }

        if ext == "webp" || ext == "awebp" {
            params.append_pair("lossless", "true");
        }
    }
    // an attachment kept in its own format may append nothing at all
    if built.query() == Some("") {
        built.set_query(None);
    }

    Some(built.into())
}

/// CDN construction. Nameplates and profile effects have fixed
/// sub-path / query grammars; lottie stickers pass through; generic
/// images and videos use the `format` parameter.
fn build_cdn_url(
    url: &ParsedUrl,
    category: AssetCategory,
    ext: &str,
    resolved_ext: &str,
    is_video: bool,
) -> Option<String> {
    match category {
        AssetCategory::Nameplate => {
            let base = format!("{}{}", url.origin(), url.path);
            let suffix = match ext {
                "apng" => "img.png",
                "webm" => "asset.webm",
                "png" => "static.png",
                "webp" => "img.png?format=webp",
                "jpg" => "img.png?format=jpeg",
                _ => return None,
            };
            Some(format!("{base}{suffix}"))
        }
        AssetCategory::ProfileEffect | AssetCategory::ProfileEffectThumbnail => {
            let mut built = url.url.clone();
            match ext {
                "webp" => {
                    built.query_pairs_mut().append_pair("format", "webp");
                }
                "jpg" => {
                    built.query_pairs_mut().append_pair("format", "jpeg");
                }
                _ => {}
            }
            Some(built.into())
        }
        AssetCategory::LottieSticker => Some(url.href().to_string()),
        _ if is_video || category == AssetCategory::GenericImage => {
            let mut built = url.url.clone();
            if url.extension.as_deref() != Some(ext) {
                built
                    .query_pairs_mut()
                    .append_pair("format", &format_param(resolved_ext));
            }
            Some(built.into())
        }
        // Animated images stay unresolved on the raw CDN; the original
        // URL is fetched instead.
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parser::parse_url;

    fn emoji_request() -> AssetRequest {
        AssetRequest {
            primary_url: String::new(),
            secondary_url: None,
            mime: Some("image/gif".to_string()),
            animatable: true,
            classifier: Some(Classifier::Category(AssetCategory::CustomEmoji)),
            alias: None,
            size: None,
        }
    }

    #[test]
    fn test_animated_emoji_candidates() {
        let url = parse_url("https://media.discordapp.net/emojis/123456.gif").unwrap();
        let mut set = CandidateUrlSet::new(url.href());
        build_candidates(&mut set, &url, &emoji_request());

        assert_eq!(
            set.get("gif"),
            Some("https://media.discordapp.net/emojis/123456.gif?size=4096")
        );
        // apng resolves to a .png name without a passthrough override
        assert_eq!(
            set.get("apng"),
            Some("https://media.discordapp.net/emojis/123456.png?size=4096")
        );
        // static png forces a re-encode
        assert_eq!(
            set.get("png"),
            Some("https://media.discordapp.net/emojis/123456.png?size=4096&passthrough=false")
        );
        assert_eq!(
            set.get("awebp"),
            Some(
                "https://media.discordapp.net/emojis/123456.webp?size=4096&animated=true&lossless=true"
            )
        );
        assert_eq!(
            set.get("webp"),
            Some("https://media.discordapp.net/emojis/123456.webp?size=4096&lossless=true")
        );
    }

    #[test]
    fn test_attachment_uses_format_param_and_forwards_auth() {
        let url = parse_url(
            "https://media.discordapp.net/attachments/1/2/photo.png?ex=aa&is=bb&hm=cc",
        )
        .unwrap();
        let mut asset = AssetRequest::new(url.href());
        asset.mime = Some("image/png".to_string());
        asset.classifier = Some(Classifier::Mime("image/png".to_string()));

        let mut set = CandidateUrlSet::new(url.href());
        build_candidates(&mut set, &url, &asset);

        // same extension: no format param, no size param
        assert_eq!(
            set.get("png"),
            Some("https://media.discordapp.net/attachments/1/2/photo.png?ex=aa&is=bb&hm=cc")
        );
        assert_eq!(
            set.get("jpg"),
            Some(
                "https://media.discordapp.net/attachments/1/2/photo.png?ex=aa&is=bb&hm=cc&format=jpeg"
            )
        );
    }

    #[test]
    fn test_video_attachment_thumbnails() {
        let url =
            parse_url("https://media.discordapp.net/attachments/1/2/clip.mp4?ex=aa").unwrap();
        let mut asset = AssetRequest::new(url.href());
        asset.mime = Some("video/mp4".to_string());
        asset.animatable = true;
        asset.classifier = Some(Classifier::Mime("video/mp4".to_string()));

        let mut set = CandidateUrlSet::new(url.href());
        build_candidates(&mut set, &url, &asset);

        assert_eq!(
            set.get("mp4"),
            Some("https://media.discordapp.net/attachments/1/2/clip.mp4?ex=aa")
        );
        let png = set.get("png").unwrap();
        assert!(png.contains("format=png"), "thumbnail via format: {png}");
        assert!(png.contains("passthrough=false"));
    }

    #[test]
    fn test_nameplate_subpaths() {
        let url = parse_url(
            "https://cdn.discordapp.com/assets/collectibles/nameplates/nameplates/cityscape/img.png",
        )
        .unwrap();
        let mut asset = AssetRequest::new(url.href());
        asset.animatable = true;
        asset.classifier = Some(Classifier::Category(AssetCategory::Nameplate));

        let mut set = CandidateUrlSet::new(url.href());
        build_candidates(&mut set, &url, &asset);

        let prefix = "https://cdn.discordapp.com/assets/collectibles/nameplates/nameplates/cityscape/";
        assert_eq!(set.get("apng"), Some(format!("{prefix}img.png").as_str()));
        assert_eq!(set.get("webm"), Some(format!("{prefix}asset.webm").as_str()));
        assert_eq!(set.get("png"), Some(format!("{prefix}static.png").as_str()));
        assert_eq!(
            set.get("webp"),
            Some(format!("{prefix}img.png?format=webp").as_str())
        );
        assert_eq!(
            set.get("jpg"),
            Some(format!("{prefix}img.png?format=jpeg").as_str())
        );
    }

    #[test]
    fn test_profile_effect_clones_do_not_accumulate_params() {
        let url = parse_url(
            "https://cdn.discordapp.com/assets/profile_effects/effects/2024/snow/intro.png",
        )
        .unwrap();
        let mut asset = AssetRequest::new(url.href());
        asset.animatable = true;
        asset.classifier = Some(Classifier::Category(AssetCategory::ProfileEffect));

        let mut set = CandidateUrlSet::new(url.href());
        build_candidates(&mut set, &url, &asset);

        assert_eq!(set.get("png"), Some(url.href()));
        let webp = set.get("webp").unwrap();
        let jpg = set.get("jpg").unwrap();
        assert!(webp.ends_with("?format=webp"));
        assert!(jpg.ends_with("?format=jpeg"));
        assert!(!jpg.contains("format=webp"));
    }

    #[test]
    fn test_lottie_sticker_passthrough() {
        let url = parse_url("https://cdn.discordapp.com/stickers/42.json").unwrap();
        let mut asset = AssetRequest::new(url.href());
        asset.classifier = Some(Classifier::Category(AssetCategory::LottieSticker));

        let mut set = CandidateUrlSet::new(url.href());
        build_candidates(&mut set, &url, &asset);

        assert_eq!(set.extensions(), vec!["json"]);
        assert_eq!(set.get("json"), Some(url.href()));
    }

    #[test]
    fn test_cdn_animated_image_stays_unresolved() {
        let url = parse_url("https://cdn.discordapp.com/app-assets/1/anim.gif").unwrap();
        let mut asset = AssetRequest::new(url.href());
        asset.mime = Some("image/gif".to_string());
        asset.animatable = true;
        asset.classifier = Some(Classifier::Mime("image/gif".to_string()));

        let mut set = CandidateUrlSet::new(url.href());
        build_candidates(&mut set, &url, &asset);
        // every table entry for this pair is unbuildable, so the set
        // stays empty and the fallback URL is fetched
        assert!(set.is_empty());
    }

    #[test]
    fn test_built_urls_parse_back_to_their_extension() {
        let url = parse_url("https://media.discordapp.net/emojis/123456.gif").unwrap();
        let mut set = CandidateUrlSet::new(url.href());
        build_candidates(&mut set, &url, &emoji_request());

        for ext in set.extensions() {
            let built = parse_url(set.get(&ext).unwrap()).unwrap();
            let resolved = resolve_compound_extension(&ext);
            assert_eq!(
                built.extension.as_deref(),
                Some(resolved.as_str()),
                "candidate for {ext} does not carry its own format"
            );
        }
    }

    #[test]
    fn test_unclassified_request_builds_nothing() {
        let url = parse_url("https://media.discordapp.net/emojis/123.png").unwrap();
        let asset = AssetRequest::new(url.href());
        let mut set = CandidateUrlSet::new(url.href());
        build_candidates(&mut set, &url, &asset);
        assert!(set.is_empty());
    }
}

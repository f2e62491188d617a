//! Path-based asset category detection for Discord-family URLs.
//!
//! Detection inspects the first path segment(s), rewrites the URL onto
//! the host that can actually serve alternate formats (media proxy or
//! CDN) and fills in the request's classifier.

use std::sync::LazyLock;

use regex::Regex;

use crate::asset::{AssetCategory, AssetRequest, Classifier};
use crate::parser::ParsedUrl;
use crate::source::{Source, CDN_HOST, MEDIA_PROXY_HOST};

/// Leading path keyword. Multi-segment literals come first so the
/// alternation cannot stop at a shorter prefix.
static ASSET_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^/(assets/collectibles/nameplates|assets/profile_effects/effects|avatar-decoration-presets|attachments|emojis|badge-icons|clan-badges|role-icons|discovery-splashes|splashes|banners|icons|avatars|stickers|guilds)(?:/|$)",
    )
    .unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

/// Guild-scoped member assets: `/guilds/{id}/users/{id}/avatars/...`
/// and the guild-profile variants without the user segment.
static GUILD_SCOPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/guilds/\d+(?:/users/\d+)?/(avatars|banners)/")
        .unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

fn to_media_proxy(url: &mut ParsedUrl, asset: &mut AssetRequest, category: AssetCategory) {
    let _ = url.url.set_host(Some(MEDIA_PROXY_HOST));
    url.source = Source::AssetMediaProxy;
    asset.classifier = Some(Classifier::Category(category));
}

fn to_cdn(url: &mut ParsedUrl) {
    let _ = url.url.set_host(Some(CDN_HOST));
    url.source = Source::Cdn;
}

/// The parent directory name of the final path segment, used as a
/// human-readable alias for collectibles (`.../cityscape/img.png`
/// names the nameplate "cityscape").
fn parent_segment(path: &str) -> Option<String> {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    segments.pop();
    segments.pop().map(str::to_string)
}

/// Detects the asset category from the URL path, rewriting host and
/// source so format construction happens against the right service.
/// URLs that match nothing are left untouched.
pub fn detect_asset_path(url: &mut ParsedUrl, asset: &mut AssetRequest) {
    let path = url.url.path().to_string();
    let Some(captures) = ASSET_PATH.captures(&path) else {
        return;
    };
    let keyword = captures.get(1).map_or("", |m| m.as_str());

    match keyword {
        "attachments" => {
            let _ = url.url.set_host(Some(MEDIA_PROXY_HOST));
            url.source = Source::AttachmentMediaProxy;
            asset.classifier = asset.mime.clone().map(Classifier::Mime);
        }
        "emojis" => to_media_proxy(url, asset, AssetCategory::CustomEmoji),
        "badge-icons" => to_media_proxy(url, asset, AssetCategory::ProfileBadge),
        "clan-badges" => to_media_proxy(url, asset, AssetCategory::ClanBadge),
        "role-icons" => to_media_proxy(url, asset, AssetCategory::RoleIcon),
        "discovery-splashes" => {
            to_media_proxy(url, asset, AssetCategory::GuildDiscoverySplash);
        }
        "splashes" => to_media_proxy(url, asset, AssetCategory::GuildInviteSplash),
        "banners" => to_media_proxy(url, asset, AssetCategory::GuildBanner),
        "icons" => to_media_proxy(url, asset, AssetCategory::GuildIcon),
        "avatar-decoration-presets" => {
            to_media_proxy(url, asset, AssetCategory::AvatarDecoration);
            // Decoration presets always have animated variants.
            asset.animatable = true;
        }
        "avatars" => to_media_proxy(url, asset, AssetCategory::UserAvatar),
        "guilds" => {
            if let Some(scoped) = GUILD_SCOPED.captures(&path) {
                match scoped.get(1).map_or("", |m| m.as_str()) {
                    "avatars" => to_media_proxy(url, asset, AssetCategory::UserAvatar),
                    "banners" => to_media_proxy(url, asset, AssetCategory::UserBanner),
                    _ => {}
                }
            }
        }
        "assets/collectibles/nameplates" => {
            to_cdn(url);
            asset.classifier = Some(Classifier::Category(AssetCategory::Nameplate));
            // Nameplates always have animated variants.
            asset.animatable = true;
            if asset.alias.is_none() {
                asset.alias =
                    Some(parent_segment(&path).unwrap_or_else(|| "nameplate".to_string()));
            }
        }
        "assets/profile_effects/effects" => {
            to_cdn(url);
            let already_effect = matches!(
                asset.classifier,
                Some(Classifier::Category(
                    AssetCategory::ProfileEffect | AssetCategory::ProfileEffectThumbnail
                ))
            );
            if !already_effect {
                asset.classifier =
                    Some(Classifier::Category(AssetCategory::ProfileEffectThumbnail));
            }
            asset.animatable = !matches!(
                asset.classifier,
                Some(Classifier::Category(AssetCategory::ProfileEffectThumbnail))
            );
            if asset.alias.is_none() {
                asset.alias =
                    Some(parent_segment(&path).unwrap_or_else(|| "profile-effect".to_string()));
            }
        }
        "stickers" => detect_sticker(url, asset),
        _ => {}
    }
}

/// Sticker links are ambiguous: a static png/webp/jpg URL could come
/// from an APNG, PNG or GIF sticker, so those stay unclassified unless
/// the caller already knows the asset animates.
fn detect_sticker(url: &mut ParsedUrl, asset: &mut AssetRequest) {
    match url.extension.as_deref() {
        Some("gif") => {
            to_media_proxy(url, asset, AssetCategory::GifSticker);
            asset.animatable = true;
        }
        Some("webp") if asset.animatable => {
            to_media_proxy(url, asset, AssetCategory::GifSticker);
        }
        Some("png") if asset.animatable => {
            to_media_proxy(url, asset, AssetCategory::ApngSticker);
        }
        _ => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parser::parse_url;

    fn detect(input: &str, asset: &mut AssetRequest) -> ParsedUrl {
        let mut url = parse_url(input).unwrap();
        detect_asset_path(&mut url, asset);
        url
    }

    #[test]
    fn test_detect_emoji_rewrites_to_media_proxy() {
        let mut asset = AssetRequest::new("");
        let url = detect("https://cdn.discordapp.com/emojis/123456.gif", &mut asset);
        assert_eq!(url.source, Source::AssetMediaProxy);
        assert_eq!(url.url.host_str(), Some(MEDIA_PROXY_HOST));
        assert_eq!(
            asset.classifier,
            Some(Classifier::Category(AssetCategory::CustomEmoji))
        );
    }

    #[test]
    fn test_detect_attachment_takes_mime_classifier() {
        let mut asset = AssetRequest::new("");
        asset.mime = Some("image/png".to_string());
        let url = detect("https://cdn.discordapp.com/attachments/1/2/a.png", &mut asset);
        assert_eq!(url.source, Source::AttachmentMediaProxy);
        assert_eq!(asset.classifier, Some(Classifier::Mime("image/png".to_string())));
    }

    #[test]
    fn test_detect_guild_member_avatar_and_banner() {
        let mut asset = AssetRequest::new("");
        detect(
            "https://cdn.discordapp.com/guilds/1/users/2/avatars/abc.png",
            &mut asset,
        );
        assert_eq!(
            asset.classifier,
            Some(Classifier::Category(AssetCategory::UserAvatar))
        );

        let mut asset = AssetRequest::new("");
        detect(
            "https://cdn.discordapp.com/guilds/1/users/2/banners/abc.png",
            &mut asset,
        );
        assert_eq!(
            asset.classifier,
            Some(Classifier::Category(AssetCategory::UserBanner))
        );
    }

    #[test]
    fn test_detect_plain_banners_is_guild_banner() {
        let mut asset = AssetRequest::new("");
        detect("https://cdn.discordapp.com/banners/1/abc.png", &mut asset);
        assert_eq!(
            asset.classifier,
            Some(Classifier::Category(AssetCategory::GuildBanner))
        );
    }

    #[test]
    fn test_detect_avatar_decoration_forces_animatable() {
        let mut asset = AssetRequest::new("");
        detect(
            "https://cdn.discordapp.com/avatar-decoration-presets/a_123.png",
            &mut asset,
        );
        assert!(asset.animatable);
        assert_eq!(
            asset.classifier,
            Some(Classifier::Category(AssetCategory::AvatarDecoration))
        );
    }

    #[test]
    fn test_detect_nameplate_sets_alias_and_cdn() {
        let mut asset = AssetRequest::new("");
        let url = detect(
            "https://media.discordapp.net/assets/collectibles/nameplates/nameplates/cityscape/img.png",
            &mut asset,
        );
        assert_eq!(url.source, Source::Cdn);
        assert_eq!(url.url.host_str(), Some(CDN_HOST));
        assert!(asset.animatable);
        assert_eq!(asset.alias.as_deref(), Some("cityscape"));
    }

    #[test]
    fn test_detect_nameplate_keeps_existing_alias() {
        let mut asset = AssetRequest::new("");
        asset.alias = Some("custom".to_string());
        detect(
            "https://cdn.discordapp.com/assets/collectibles/nameplates/nameplates/cityscape/img.png",
            &mut asset,
        );
        assert_eq!(asset.alias.as_deref(), Some("custom"));
    }

    #[test]
    fn test_detect_profile_effect_defaults_to_thumbnail() {
        let mut asset = AssetRequest::new("");
        detect(
            "https://cdn.discordapp.com/assets/profile_effects/effects/festivus/thumbnail.png",
            &mut asset,
        );
        assert_eq!(
            asset.classifier,
            Some(Classifier::Category(AssetCategory::ProfileEffectThumbnail))
        );
        assert!(!asset.animatable);
        assert_eq!(asset.alias.as_deref(), Some("festivus"));
    }

    #[test]
    fn test_detect_profile_effect_keeps_effect_classifier() {
        let mut asset = AssetRequest::new("");
        asset.classifier = Some(Classifier::Category(AssetCategory::ProfileEffect));
        detect(
            "https://cdn.discordapp.com/assets/profile_effects/effects/festivus/intro.png",
            &mut asset,
        );
        assert_eq!(
            asset.classifier,
            Some(Classifier::Category(AssetCategory::ProfileEffect))
        );
        assert!(asset.animatable);
    }

    #[test]
    fn test_detect_gif_sticker() {
        let mut asset = AssetRequest::new("");
        let url = detect("https://media.discordapp.net/stickers/42.gif", &mut asset);
        assert_eq!(url.source, Source::AssetMediaProxy);
        assert!(asset.animatable);
        assert_eq!(
            asset.classifier,
            Some(Classifier::Category(AssetCategory::GifSticker))
        );
    }

    #[test]
    fn test_detect_animated_png_sticker() {
        let mut asset = AssetRequest::new("");
        asset.animatable = true;
        detect("https://cdn.discordapp.com/stickers/42.png", &mut asset);
        assert_eq!(
            asset.classifier,
            Some(Classifier::Category(AssetCategory::ApngSticker))
        );
    }

    #[test]
    fn test_detect_static_sticker_stays_unclassified() {
        let mut asset = AssetRequest::new("");
        let url = detect("https://cdn.discordapp.com/stickers/42.png", &mut asset);
        assert_eq!(asset.classifier, None);
        assert_eq!(url.source, Source::Cdn);
    }

    #[test]
    fn test_detect_unrelated_path_untouched() {
        let mut asset = AssetRequest::new("");
        let url = detect("https://cdn.discordapp.com/app-assets/1/2.png", &mut asset);
        assert_eq!(url.source, Source::Cdn);
        assert_eq!(asset.classifier, None);
    }
}

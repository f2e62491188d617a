//! The format-availability table: which file extensions each (source,
//! category) pair can actually serve.
//!
//! Entries with an empty half are one-sided: a category with no static
//! formats always uses its animated list and vice versa, regardless of
//! the request's animatable flag.

use super::AssetCategory;
use crate::source::Source;

/// Extension lists for the animated and static renditions of one
/// (source, category) pair. Order matters: the first entry is the
/// default offered to save dialogs.
#[derive(Debug, Clone, Copy)]
pub struct FormatSupport {
    pub animated: &'static [&'static str],
    pub still: &'static [&'static str],
}

impl FormatSupport {
    /// The list that applies given the request's animatable flag,
    /// honoring the only-animated / only-static override.
    pub fn applicable(&self, animatable: bool) -> &'static [&'static str] {
        let only_animated = !self.animated.is_empty() && self.still.is_empty();
        let only_still = !self.still.is_empty() && self.animated.is_empty();
        if (animatable || only_animated) && !only_still {
            self.animated
        } else {
            self.still
        }
    }
}

const fn support(
    animated: &'static [&'static str],
    still: &'static [&'static str],
) -> FormatSupport {
    FormatSupport { animated, still }
}

// Shared lists for proxy-served assets. png/webp appear in the animated
// lists because the proxy will render a static frame of an animated
// asset on request.
const PROXY_ANIMATED: &[&str] = &["gif", "apng", "awebp", "png", "webp"];
const PROXY_STILL: &[&str] = &["png", "webp", "jpg"];
const GENERIC_ANIMATED: &[&str] = &["gif", "awebp", "png", "webp"];
const GENERIC_VIDEO: &[&str] = &["mp4", "webm", "png", "webp", "jpg"];

/// Looks up the extension lists for one (source, category) pair.
/// Returns `None` for combinations the backing services cannot serve.
pub fn formats_for(source: Source, category: AssetCategory) -> Option<FormatSupport> {
    use AssetCategory as C;
    let entry = match source {
        Source::AssetMediaProxy => match category {
            C::CustomEmoji
            | C::UserAvatar
            | C::UserBanner
            | C::GuildIcon
            | C::GuildBanner
            | C::AvatarDecoration => support(PROXY_ANIMATED, PROXY_STILL),
            C::GuildInviteSplash
            | C::GuildDiscoverySplash
            | C::ClanBadge
            | C::RoleIcon
            | C::ProfileBadge => support(&[], PROXY_STILL),
            C::GifSticker => support(&["gif", "apng", "awebp"], &["png", "webp"]),
            C::ApngSticker => support(&["apng", "gif", "awebp"], &["png", "webp"]),
            C::PngSticker => support(&[], &["png", "webp"]),
            C::GenericImage => support(&[], PROXY_STILL),
            C::GenericAnimated => support(GENERIC_ANIMATED, &[]),
            C::GenericVideo => support(GENERIC_VIDEO, &[]),
            _ => return None,
        },
        Source::AttachmentMediaProxy | Source::ExternalImageProxy => match category {
            C::GenericImage => support(&[], PROXY_STILL),
            C::GenericAnimated => support(GENERIC_ANIMATED, &[]),
            C::GenericVideo => support(GENERIC_VIDEO, &[]),
            C::VoiceMessage => support(&[], &["ogg"]),
            _ => return None,
        },
        Source::Cdn => match category {
            C::Nameplate => support(&["apng", "webm", "png", "webp", "jpg"], &[]),
            C::ProfileEffect => support(&["png", "webp", "jpg"], &[]),
            C::ProfileEffectThumbnail => support(&[], &["png", "webp", "jpg"]),
            C::LottieSticker => support(&[], &["json"]),
            C::GenericImage => support(&[], PROXY_STILL),
            // The raw CDN has no re-render grammar for animated
            // images, so the builder produces nothing for this pair
            // and the request resolves to the fallback URL.
            C::GenericAnimated => support(GENERIC_ANIMATED, &[]),
            C::GenericVideo => support(&["mp4", "webm"], &[]),
            _ => return None,
        },
        Source::Tenor => match category {
            C::TenorMedia => support(&["gif", "mp4", "webm", "png", "webp", "awebp"], &[]),
            _ => return None,
        },
        Source::Twitter => match category {
            C::TwitterImage => support(&[], &["png", "jpg", "webp"]),
            _ => return None,
        },
        Source::Wikimedia => match category {
            C::WikimediaSvg => support(&[], &["svg", "png", "jpg", "webp"]),
            _ => return None,
        },
        _ => return None,
    };
    Some(entry)
}

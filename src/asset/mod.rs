//! The asset data model: categories, classifiers and download requests.

pub mod availability;

pub use availability::{formats_for, FormatSupport};

/// Mime types whose assets animate; seeing one of these marks the
/// request animatable before any table lookup happens.
pub const ANIMATED_MIMES: [&str; 3] = ["image/gif", "video/mp4", "video/webm"];

/// What kind of asset a URL points at, once detected.
///
/// The `Generic*` variants are derived from a mime type when the path
/// carries no more specific category (attachments, external embeds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    CustomEmoji,
    PngSticker,
    ApngSticker,
    GifSticker,
    LottieSticker,
    UserAvatar,
    UserBanner,
    GuildIcon,
    GuildBanner,
    GuildInviteSplash,
    GuildDiscoverySplash,
    AvatarDecoration,
    ClanBadge,
    RoleIcon,
    ProfileBadge,
    Nameplate,
    ProfileEffect,
    ProfileEffectThumbnail,
    TenorMedia,
    TwitterImage,
    WikimediaSvg,
    GenericImage,
    GenericAnimated,
    GenericVideo,
    VoiceMessage,
}

impl AssetCategory {
    /// Maps a mime type onto the generic category used for table
    /// lookups when the path gave us nothing better.
    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime == "image/gif" {
            return Some(Self::GenericAnimated);
        }
        if mime.starts_with("image/") {
            return Some(Self::GenericImage);
        }
        if mime.starts_with("video/") {
            return Some(Self::GenericVideo);
        }
        if mime.starts_with("audio/") {
            return Some(Self::VoiceMessage);
        }
        None
    }
}

/// How an asset has been classified so far.
///
/// Path detection yields a concrete [`AssetCategory`]; before that the
/// only evidence may be a mime type (supplied by the caller or probed
/// over HTTP), which still resolves to a generic table category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classifier {
    Category(AssetCategory),
    Mime(String),
}

impl Classifier {
    /// The category to use for format-availability lookups.
    pub fn table_category(&self) -> Option<AssetCategory> {
        match self {
            Self::Category(category) => Some(*category),
            Self::Mime(mime) => AssetCategory::from_mime(mime),
        }
    }
}

/// One download request, mutated in place as resolution learns more
/// about the asset (mime probe, path detection, alias discovery).
#[derive(Debug, Clone, Default)]
pub struct AssetRequest {
    /// The URL the user acted on.
    pub primary_url: String,
    /// An alternate URL for the same asset, when the caller has one
    /// (e.g. the un-proxied original behind an embed).
    pub secondary_url: Option<String>,
    /// Known or probed mime type.
    pub mime: Option<String>,
    /// Whether the asset animates. Drives the animated/static half of
    /// the availability table.
    pub animatable: bool,
    /// Classification so far; `None` until something is known.
    pub classifier: Option<Classifier>,
    /// Preferred base file name, overriding URL-derived names.
    pub alias: Option<String>,
    /// Size in bytes when the caller knows it.
    pub size: Option<u64>,
}

impl AssetRequest {
    pub fn new(primary_url: impl Into<String>) -> Self {
        Self {
            primary_url: primary_url.into(),
            ..Self::default()
        }
    }
}

/// Candidate file extensions for a mime type, most canonical first.
pub fn extensions_for_mime(mime: &str) -> Option<&'static [&'static str]> {
    let exts: &'static [&'static str] = match mime {
        "image/png" => &["png"],
        "image/apng" => &["apng", "png"],
        "image/jpeg" => &["jpg", "jpeg"],
        "image/gif" => &["gif"],
        "image/webp" => &["webp"],
        "image/avif" => &["avif"],
        "image/svg+xml" => &["svg"],
        "video/mp4" => &["mp4"],
        "video/webm" => &["webm"],
        "video/quicktime" => &["mov"],
        "audio/ogg" => &["ogg"],
        "audio/mpeg" => &["mp3"],
        "audio/wav" => &["wav"],
        "application/json" => &["json"],
        _ => return None,
    };
    Some(exts)
}

/// True when the mime type marks one of the video containers the media
/// proxy serves (not an animated image).
pub fn is_video_mime(mime: Option<&str>) -> bool {
    matches!(mime, Some("video/mp4" | "video/webm"))
}

/// True when `size` is unknown or exceeds `threshold_mib` mebibytes.
/// Used to decide whether a start notice is worth showing.
pub fn file_threshold(size: Option<u64>, threshold_mib: u64) -> bool {
    match size {
        Some(bytes) => bytes > threshold_mib * 1024 * 1024,
        None => true,
    }
}

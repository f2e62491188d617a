//! Classification of URLs into the closed set of supported sources.

use url::Url;

/// Canonical application host. Staging hosts normalize to this.
pub const PRIMARY_HOST: &str = "discord.com";
/// Staging hosts rewritten to [`PRIMARY_HOST`] during parsing.
pub const STAGING_HOSTS: [&str; 2] = ["canary.discord.com", "ptb.discord.com"];
/// Media proxy host (attachment paths and re-encoded asset paths).
pub const MEDIA_PROXY_HOST: &str = "media.discordapp.net";
/// Raw CDN host.
pub const CDN_HOST: &str = "cdn.discordapp.com";
/// External image proxy hosts (embeds of third-party images).
pub const EXTERNAL_PROXY_HOSTS: [&str; 2] =
    ["images-ext-1.discordapp.net", "images-ext-2.discordapp.net"];
/// Wikimedia upload host.
pub const WIKIMEDIA_HOST: &str = "upload.wikimedia.org";
/// Twitter image host.
pub const TWITTER_HOST: &str = "pbs.twimg.com";
/// Tenor media hosts.
pub const TENOR_HOSTS: [&str; 2] = ["media.tenor.com", "c.tenor.com"];
/// Hosts serving plugin-bundled assets (badges and the like).
pub const PLUGIN_HOSTS: [&str; 2] = ["vencord.dev", "badges.vencord.dev"];

/// Where a URL points, as far as download resolution is concerned.
///
/// The distinction between [`Source::AttachmentMediaProxy`] and
/// [`Source::AssetMediaProxy`] is the path prefix on the same host:
/// attachments keep user-chosen file names and support different query
/// parameters than re-encoded asset paths do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// `discord.com` itself (direct asset routes, unicode emoji SVGs).
    PrimaryDomain,
    /// Media proxy, `/attachments/...` paths.
    AttachmentMediaProxy,
    /// Media proxy, everything else (avatars, emojis, stickers, ...).
    AssetMediaProxy,
    /// The raw CDN.
    Cdn,
    /// Proxy in front of third-party images embedded in messages.
    ExternalImageProxy,
    /// Wikimedia uploads (flag emoji sources and the like).
    Wikimedia,
    /// Twitter image host.
    Twitter,
    /// Tenor GIF hosts.
    Tenor,
    /// Plugin-distributed assets.
    PluginHosted,
    /// An inline `data:image/svg+xml` URL.
    InlineSvg,
    /// Anything else.
    Unknown,
}

impl Source {
    /// True for the two media-proxy variants and the external image
    /// proxy, which share the same format/size query grammar.
    pub fn is_proxy_family(self) -> bool {
        matches!(
            self,
            Self::AttachmentMediaProxy | Self::AssetMediaProxy | Self::ExternalImageProxy
        )
    }
}

/// Classifies a parsed URL by origin.
///
/// Staging hosts count as the primary domain even when the caller has
/// not normalized them yet.
pub fn classify(url: &Url) -> Source {
    if url.scheme() == "data" {
        if url.path().starts_with("image/svg+xml") {
            return Source::InlineSvg;
        }
        return Source::Unknown;
    }
    let Some(host) = url.host_str() else {
        return Source::Unknown;
    };
    if host == PRIMARY_HOST || STAGING_HOSTS.contains(&host) {
        return Source::PrimaryDomain;
    }
    if host == MEDIA_PROXY_HOST {
        // Attachment paths take precedence over the general proxy.
        if url.path().starts_with("/attachments") {
            return Source::AttachmentMediaProxy;
        }
        return Source::AssetMediaProxy;
    }
    if host == CDN_HOST {
        return Source::Cdn;
    }
    if EXTERNAL_PROXY_HOSTS.contains(&host) {
        return Source::ExternalImageProxy;
    }
    if host == WIKIMEDIA_HOST {
        return Source::Wikimedia;
    }
    if host == TWITTER_HOST {
        return Source::Twitter;
    }
    if TENOR_HOSTS.contains(&host) {
        return Source::Tenor;
    }
    if PLUGIN_HOSTS.contains(&host) {
        return Source::PluginHosted;
    }
    Source::Unknown
}

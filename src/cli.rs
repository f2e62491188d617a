//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;

/// Resolve a Discord media URL and download it in its best format.
#[derive(Parser, Debug)]
#[command(name = "cordgrab", version, about)]
pub struct Cli {
    /// The asset URL to download.
    pub url: String,

    /// Alternate URL for the same asset (e.g. the un-proxied original
    /// behind an embed).
    #[arg(long)]
    pub secondary: Option<String>,

    /// Mime type, when known. Skips the HEAD probe.
    #[arg(long)]
    pub mime: Option<String>,

    /// Preferred base file name.
    #[arg(long)]
    pub alias: Option<String>,

    /// Treat the asset as animated.
    #[arg(long)]
    pub animatable: bool,

    /// Size in bytes, when known. Drives the large-download notice.
    #[arg(long)]
    pub size: Option<u64>,

    /// Directory to save into. Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Overwrite an existing file instead of suffixing -1, -2, ...
    #[arg(long)]
    pub overwrite: bool,

    /// Strip non-ASCII characters from the file name.
    #[arg(long)]
    pub ascii: bool,

    /// Settings file to load (JSON). CLI flags override it.
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log warnings and errors only.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let cli = Cli::try_parse_from(["cordgrab", "https://cdn.discordapp.com/emojis/1.png"])
            .unwrap();
        assert_eq!(cli.url, "https://cdn.discordapp.com/emojis/1.png");
        assert!(!cli.overwrite);
        assert!(cli.dir.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_full_invocation() {
        let cli = Cli::try_parse_from([
            "cordgrab",
            "https://cdn.discordapp.com/emojis/1.gif",
            "--secondary",
            "https://media.discordapp.net/emojis/1.gif",
            "--mime",
            "image/gif",
            "--alias",
            "party",
            "--animatable",
            "--dir",
            "/tmp/saves",
            "--overwrite",
            "--ascii",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.alias.as_deref(), Some("party"));
        assert!(cli.animatable);
        assert!(cli.ascii);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["cordgrab", "u", "-q", "-v"]).is_err());
    }
}

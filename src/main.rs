mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cordgrab_core::download::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS};
use cordgrab_core::{
    download_asset, file_threshold, AssetRequest, DownloadContext, HttpClient, NoDialog,
    OutcomeCategory, Settings,
};

/// Downloads at or above this size (or of unknown size) get a start
/// notice, since they may take a while.
const LARGE_DOWNLOAD_NOTICE_MIB: u64 = 15;

fn init_logging(verbose: u8, quiet: bool) {
    let default_directive = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut settings = match cli.settings.as_deref() {
        Some(path) => Settings::load(path).context("loading settings")?,
        None => Settings::default(),
    };
    if cli.ascii {
        settings.allow_unicode = false;
    }
    if cli.overwrite {
        settings.overwrite_files = true;
    }

    // The CLI has no save dialog, so it always runs in directory mode.
    // Absolutize up front: the traversal guard compares the planned
    // path against its lexically absolute form.
    let directory = match cli.dir.clone().or_else(|| settings.default_directory.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolving current directory")?,
    };
    settings.default_directory =
        Some(std::path::absolute(&directory).context("resolving save directory")?);

    let mut asset = AssetRequest::new(cli.url.clone());
    asset.secondary_url = cli.secondary.clone();
    asset.mime = cli.mime.clone();
    asset.alias = cli.alias.clone();
    asset.animatable = cli.animatable;
    asset.size = cli.size;

    if settings.display_status && file_threshold(asset.size, LARGE_DOWNLOAD_NOTICE_MIB) {
        println!("Download Started");
    }

    let client = HttpClient::new(DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS)
        .context("building HTTP client")?;
    let ctx = DownloadContext {
        client,
        settings,
        dialog: Arc::new(NoDialog),
    };
    let outcome = download_asset(&ctx, &mut asset).await;
    println!("{}", outcome.user_message);

    if outcome.category == OutcomeCategory::Failure {
        std::process::exit(1);
    }
    Ok(())
}

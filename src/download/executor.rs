//! End-to-end download execution: resolve, name, fetch. Every way the
//! attempt can end is folded into one [`DownloadOutcome`].

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use super::client::HttpClient;
use super::outcome::DownloadOutcome;
use crate::asset::{extensions_for_mime, AssetRequest};
use crate::config::Settings;
use crate::dialog::SaveDialog;
use crate::naming::{
    lexical_absolute, normalize_compound_extension, plan_directory_path, replace_last_extension,
    sanitize, PlannedSave, SanitizeOptions, DIALOG_PATH_BUDGET, FALLBACK_BASE_NAME,
};
use crate::parser::parse_path;
use crate::resolve::{resolve, Resolution};

/// Everything a download run needs.
pub struct DownloadContext {
    pub client: HttpClient,
    pub settings: Settings,
    pub dialog: Arc<dyn SaveDialog>,
}

/// Runs one download attempt to completion. Never returns an error:
/// every failure mode becomes an outcome, already reported through
/// tracing at its own severity.
pub async fn download_asset(ctx: &DownloadContext, asset: &mut AssetRequest) -> DownloadOutcome {
    let resolution = match resolve(asset, &ctx.client).await {
        Ok(resolution) => resolution,
        Err(e) => {
            let outcome = DownloadOutcome::invalid_source(&e.to_string());
            outcome.emit();
            return outcome;
        }
    };

    let base_name = pick_base_name(ctx, asset, &resolution);

    let planned = match plan_save_path(ctx, asset, &resolution, &base_name).await {
        Ok(planned) => planned,
        Err(outcome) => {
            outcome.emit();
            return outcome;
        }
    };

    // Sanitization should make traversal impossible; verify anyway
    // before touching the file system.
    match lexical_absolute(&planned.path) {
        Some(resolved) if resolved == planned.path => {}
        resolved => {
            let outcome = DownloadOutcome::invalid_path(
                &planned.path,
                &resolved.unwrap_or_default(),
            );
            outcome.emit();
            return outcome;
        }
    }

    let resolved_url = resolution
        .candidates
        .url_for(planned.chosen_extension.as_deref())
        .to_string();
    debug!(
        url = resolved_url.as_str(),
        path = %planned.path.display(),
        extension = ?planned.chosen_extension,
        "fetching"
    );

    let detail = format!("{asset:?}");
    let outcome = match ctx.client.download_to_file(&resolved_url, &planned.path).await {
        Ok(_) => DownloadOutcome::finished(&planned.path, &resolved_url),
        Err(e) if e.is_rejection() => {
            DownloadOutcome::failed(&planned.path, &resolved_url, &detail)
        }
        Err(e) => DownloadOutcome::errored(&planned.path, &resolved_url, &detail, &e.to_string()),
    };
    outcome.emit();
    outcome
}

/// Alias beats the primary URL's name, which beats the secondary's;
/// all of them pass through sanitization with `_` as the replacement.
fn pick_base_name(ctx: &DownloadContext, asset: &AssetRequest, resolution: &Resolution) -> String {
    let opts = SanitizeOptions {
        allow_unicode: ctx.settings.allow_unicode,
        allow_spaces: false,
        replacement: "_",
        use_fallback: true,
        split_extension: false,
    };
    let candidate = if let Some(alias) = asset.alias.as_deref() {
        sanitize(alias, &opts)
    } else if !resolution.primary.base_name.is_empty() {
        sanitize(&resolution.primary.base_name, &opts)
    } else if let Some(name) = resolution
        .secondary
        .as_ref()
        .map(|s| s.base_name.as_str())
        .filter(|n| !n.is_empty())
    {
        sanitize(name, &opts)
    } else {
        None
    };
    candidate.unwrap_or_else(|| FALLBACK_BASE_NAME.to_string())
}

/// Plans where the file lands: the default directory when configured,
/// otherwise whatever the save dialog returns.
async fn plan_save_path(
    ctx: &DownloadContext,
    asset: &AssetRequest,
    resolution: &Resolution,
    base_name: &str,
) -> Result<PlannedSave, DownloadOutcome> {
    let assumed_extension = || {
        asset
            .mime
            .as_deref()
            .and_then(extensions_for_mime)
            .and_then(|exts| exts.first())
            .map(|e| (*e).to_string())
    };

    if let Some(directory) = ctx.settings.default_directory.as_deref() {
        // Directory mode always fetches the original format, so the
        // extension is informational only.
        let extension = resolution
            .primary
            .extension
            .clone()
            .or_else(assumed_extension);
        return Ok(plan_directory_path(
            directory,
            base_name,
            extension.as_deref(),
            ctx.settings.overwrite_files,
        )
        .await);
    }

    let mut extensions = resolution.candidates.extensions();
    if extensions.is_empty() {
        if let Some(ext) = resolution.primary.extension.clone() {
            extensions.push(ext);
        }
    }
    if extensions.is_empty() {
        if let Some(ext) = assumed_extension() {
            extensions.push(ext);
        }
    }

    let Some(picked) = ctx.dialog.pick_save_path(base_name, &extensions).await else {
        return Err(DownloadOutcome::canceled());
    };
    let picked_str = picked.to_string_lossy().into_owned();
    if picked_str.chars().count() > DIALOG_PATH_BUDGET {
        return Err(DownloadOutcome::path_too_long(&picked));
    }

    let chosen_extension = parse_path(&picked_str).extension;
    let path = match chosen_extension.as_deref() {
        Some(chosen) => {
            let resolved = normalize_compound_extension(chosen);
            if resolved == chosen {
                picked
            } else {
                PathBuf::from(replace_last_extension(&picked_str, chosen, &resolved))
            }
        }
        None => picked,
    };

    Ok(PlannedSave {
        path,
        chosen_extension,
    })
}

//! File name sanitization and save-path planning.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::parser::parse_path;

/// Base name used when sanitization leaves nothing usable.
pub const FALLBACK_BASE_NAME: &str = "discord-download";

/// Path length budget when saving into a default directory. Room is
/// left under the common 255 limit for collision suffixes.
pub const DIRECTORY_PATH_BUDGET: usize = 250;
/// Path length budget for dialog-chosen paths.
pub const DIALOG_PATH_BUDGET: usize = 255;

/// Windows-reserved device names; never usable as a bare file name.
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

static ILLEGAL_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});
static TRAVERSAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\.").unwrap_or_else(|e| unreachable!("static pattern: {e}")));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/\\]").unwrap_or_else(|e| unreachable!("static pattern: {e}")));
static LEADING_DOTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.+").unwrap_or_else(|e| unreachable!("static pattern: {e}")));
static TRAILING_DOTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.+$").unwrap_or_else(|e| unreachable!("static pattern: {e}")));
static DRIVE_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]:").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});
static HOME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^~").unwrap_or_else(|e| unreachable!("static pattern: {e}")));
static LINE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\t\n\r]+").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});
static SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap_or_else(|e| unreachable!("static pattern: {e}")));
static NON_ASCII: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\x00-\x7F]").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

/// Knobs for [`sanitize`]. The defaults match interactive use: unicode
/// kept, spaces collapsed, `-` as the replacement, no fallback.
#[derive(Debug, Clone)]
pub struct SanitizeOptions<'a> {
    pub allow_unicode: bool,
    pub allow_spaces: bool,
    pub replacement: &'a str,
    pub use_fallback: bool,
    /// Treat the input as a file name whose extension should be split
    /// off first instead of replacing every dot.
    pub split_extension: bool,
}

impl Default for SanitizeOptions<'_> {
    fn default() -> Self {
        Self {
            allow_unicode: true,
            allow_spaces: false,
            replacement: "-",
            use_fallback: false,
            split_extension: false,
        }
    }
}

/// Produces a name safe to use as a single path component on every
/// platform, or `None` when nothing survives and no fallback was
/// requested. Idempotent: sanitizing a sanitized name is a no-op.
pub fn sanitize(name: &str, opts: &SanitizeOptions<'_>) -> Option<String> {
    let rep = opts.replacement;
    let input = if opts.split_extension {
        name.to_string()
    } else {
        name.replace('.', rep)
    };
    let mut sanitized = parse_path(&input).base_name;

    for pattern in [
        &*ILLEGAL_CHARS,
        &*TRAVERSAL,
        &*SEPARATORS,
        &*LEADING_DOTS,
        &*TRAILING_DOTS,
        &*DRIVE_LETTER,
        &*HOME_PREFIX,
        &*LINE_WHITESPACE,
    ] {
        sanitized = pattern.replace_all(&sanitized, rep).into_owned();
    }

    if !opts.allow_spaces {
        sanitized = SPACES.replace_all(&sanitized, rep).into_owned();
    }
    if !opts.allow_unicode {
        sanitized = NON_ASCII.replace_all(&sanitized, rep).into_owned();
    }
    if RESERVED_NAMES.contains(&sanitized.to_ascii_uppercase().as_str()) {
        sanitized.clear();
    }

    // Collapse runs of the replacement, then strip it from the ends.
    let escaped = regex::escape(rep);
    if let Ok(collapse) = Regex::new(&format!("(?:{escaped})+")) {
        sanitized = collapse.replace_all(&sanitized, rep).into_owned();
    }
    if let Ok(trim) = Regex::new(&format!("^(?:{escaped})+|(?:{escaped})+$")) {
        sanitized = trim.replace_all(&sanitized, "").into_owned();
    }

    if sanitized.is_empty() {
        return opts.use_fallback.then(|| FALLBACK_BASE_NAME.to_string());
    }
    Some(sanitized)
}

/// Maps a compound-format extension onto the container format used in
/// actual file names (`apng` files are `.png`, `awebp` are `.webp`).
pub fn normalize_compound_extension(ext: &str) -> String {
    ext.replace("apng", "png").replace("awebp", "webp")
}

/// Replaces the last occurrence of `.{chosen}` in `path` (case
/// insensitive) with `.{resolved}`. Used after a save dialog returns a
/// path carrying a compound-format extension.
pub fn replace_last_extension(path: &str, chosen: &str, resolved: &str) -> String {
    let needle = format!(".{}", chosen.to_ascii_lowercase());
    let haystack = path.to_ascii_lowercase();
    match haystack.rfind(&needle) {
        Some(pos) => {
            let mut out = String::with_capacity(path.len());
            out.push_str(&path[..pos]);
            out.push('.');
            out.push_str(resolved);
            out.push_str(&path[pos + needle.len()..]);
            out
        }
        None => path.to_string(),
    }
}

/// Lexically absolutizes `path` without touching the file system, so
/// not-yet-created files can still be checked for traversal.
pub fn lexical_absolute(path: &Path) -> Option<PathBuf> {
    std::path::absolute(path).ok()
}

/// A planned save location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSave {
    pub path: PathBuf,
    /// Extension selected by the user, when a dialog was involved.
    /// `None` means the fallback URL's original format is fetched.
    pub chosen_extension: Option<String>,
}

/// Plans a save path inside a default directory: fit the name into the
/// length budget, then suffix `-1`, `-2`, ... until the path is free.
///
/// The existence check races against other writers by design; the
/// original behaves the same way and the window is harmless for a
/// user-triggered download.
pub async fn plan_directory_path(
    directory: &Path,
    base_name: &str,
    extension: Option<&str>,
    overwrite: bool,
) -> PlannedSave {
    let dir = directory.to_string_lossy();
    let suffix = extension.map(|e| format!(".{e}")).unwrap_or_default();

    let mut name = base_name.to_string();
    let built = format!("{dir}{}{name}{suffix}", std::path::MAIN_SEPARATOR);
    if built.chars().count() > DIRECTORY_PATH_BUDGET {
        let excess = built.chars().count() - DIRECTORY_PATH_BUDGET;
        let keep = name.chars().count().saturating_sub(excess);
        name = name.chars().take(keep).collect();
    }

    let mut built = format!("{dir}{}{name}{suffix}", std::path::MAIN_SEPARATOR);
    if !overwrite {
        let mut counter = 1u32;
        while tokio::fs::try_exists(&built).await.unwrap_or(false) {
            built = format!(
                "{dir}{}{name}-{counter}{suffix}",
                std::path::MAIN_SEPARATOR
            );
            counter += 1;
        }
    }

    PlannedSave {
        path: PathBuf::from(built),
        chosen_extension: None,
    }
}

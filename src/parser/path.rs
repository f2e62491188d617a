//! Splitting path-like strings into directory, final segment, base name
//! and extension.

/// Structured parts of a path-like string.
///
/// `directory` is everything up to and including the last separator.
/// `path_end` is the raw (still-encoded) final segment; `base_name` and
/// `extension` are derived from its decoded form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedPath {
    pub directory: String,
    pub path_end: String,
    pub base_name: String,
    pub extension: Option<String>,
}

/// Splits `input` on `/` and `\` and decodes the final segment.
///
/// CDN segments are sometimes percent-encoded more than once, so the
/// `%25` escape is unwrapped repeatedly before the final decode. A colon
/// in the decoded name (other than at position zero) starts a metadata
/// suffix and truncates the name. A dot at position zero marks a dotfile,
/// not an extension boundary; extensions are reported lowercased.
pub fn parse_path(input: &str) -> ParsedPath {
    let mut parts: Vec<&str> = input.split(['/', '\\']).collect();
    // split() always yields at least one element
    let path_end = parts.pop().unwrap_or_default().to_string();
    let mut directory = parts.join("/");
    directory.push('/');

    let mut decoded = path_end.clone();
    while decoded.contains("%25") {
        match urlencoding::decode(&decoded) {
            Ok(next) if next != decoded => decoded = next.into_owned(),
            _ => break,
        }
    }
    if let Ok(next) = urlencoding::decode(&decoded) {
        decoded = next.into_owned();
    }

    // "name:large" style metadata suffixes; a leading colon is part of
    // the name itself.
    let name = match decoded
        .char_indices()
        .find(|&(i, c)| c == ':' && i >= 1)
    {
        Some((i, _)) => &decoded[..i],
        None => decoded.as_str(),
    };

    let (base_name, extension) = match name.rfind('.') {
        Some(pos) if pos >= 1 => (
            name[..pos].to_string(),
            Some(name[pos + 1..].to_ascii_lowercase()),
        ),
        _ => (name.to_string(), None),
    };

    ParsedPath {
        directory,
        path_end,
        base_name,
        extension,
    }
}

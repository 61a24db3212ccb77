//! Path helpers.
//!
//! Derives file types, default tags, and catalog keys from local paths.

/// Extension of the final path segment, including the leading dot.
///
/// `config/.env` yields `.env`, `id_rsa` yields an empty string.
pub fn extension(path: &str) -> &str {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[name_start..].rfind('.') {
        Some(i) => &path[name_start + i..],
        None => "",
    }
}

/// File type inferred from the extension, without dots.
///
/// # Examples
///
/// ```
/// use stash::core::path::file_type;
///
/// assert_eq!(file_type("config/.env"), "env");
/// assert_eq!(file_type("app.json"), "json");
/// assert_eq!(file_type("id_rsa"), "");
/// ```
pub fn file_type(path: &str) -> String {
    extension(path).replace('.', "")
}

/// Default tags for a path: its directory segments.
///
/// Files at the top level get no tags.
pub fn tags(path: &str) -> Vec<String> {
    let stem = path.strip_suffix(extension(path)).unwrap_or(path);
    let trimmed = stem
        .trim_matches(|c| c == '.' || c == '/')
        .replace("../", "");

    let segments: Vec<String> = trimmed.split('/').map(str::to_string).collect();
    if segments.len() <= 1 {
        return Vec::new();
    }
    segments
}

/// Default catalog key for a path.
///
/// Also keys the per-user sync state, so it must stay stable for a path.
pub fn initial_key(path: &str) -> String {
    let replaced = sanitize(path, |c| c.is_ascii_alphanumeric() || c == '_', '_');
    replaced.trim_matches('_').to_lowercase()
}

/// Replace every character rejected by `keep` with `with`.
pub fn sanitize(value: &str, keep: impl Fn(char) -> bool, with: char) -> String {
    value
        .chars()
        .map(|c| if keep(c) { c } else { with })
        .collect()
}

/// Path with leading dots and slashes removed, used to build remote keys.
pub fn trim_leading(path: &str) -> &str {
    path.trim_start_matches(|c| c == '.' || c == '/')
}

/// Last `/`-separated segment of a remote key.
pub fn base(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Everything before the last `/` of a remote key.
pub fn dir(key: &str) -> &str {
    match key.rfind('/') {
        Some(0) => "/",
        Some(i) => &key[..i],
        None => ".",
    }
}

//! Shared path helpers.

/// Strip the last extension from a file name (e.g. "Query.cs" -> "Query").
///
/// Dot files keep their name (".gitignore" stays ".gitignore").
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Whether `s` can be used as a single path segment: non-empty, not `.`/`..`,
/// and free of separators.
pub fn is_path_segment(s: &str) -> bool {
    !s.trim().is_empty()
        && s != "."
        && s != ".."
        && !s.contains(['/', '\\'])
        && !s.chars().any(char::is_control)
}

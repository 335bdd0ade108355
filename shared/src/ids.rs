//! Helpers for turning labels into names usable as filesystem path components.

/// Returns true if a save name is safe to use as a single path component on all platforms.
///
/// Rules:
/// - Must be non-empty and not "." or ".."
/// - Must not contain path separators ('/' or '\\')
/// - Must not contain control characters or NUL
/// - Must not contain Windows-reserved filename characters
/// - Must not end with '.' or space (Windows restriction)
pub fn is_safe_save_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }

    if name.ends_with('.') || name.ends_with(' ') {
        return false;
    }

    name.chars().all(|c| !is_forbidden_char(c))
}

/// Rewrite a label into a safe save name.
///
/// Forbidden characters become '_', trailing dots and spaces are trimmed and
/// an empty result falls back to `"save"`.
pub fn sanitize_save_name(label: &str) -> String {
    let replaced: String = label
        .chars()
        .map(|c| if is_forbidden_char(c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_end_matches(['.', ' ']);

    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        "save".to_string()
    } else {
        trimmed.to_string()
    }
}

fn is_forbidden_char(c: char) -> bool {
    c == '/'
        || c == '\\'
        || c == '\0'
        || c.is_control()
        // Windows-reserved filename characters.
        || matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|')
}

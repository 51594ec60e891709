//! File naming for downloaded media

/// Longest file stem we produce, in bytes
const MAX_STEM_LEN: usize = 200;

/// Make a video title safe to use as a file stem
///
/// Returns `None` when nothing usable is left, so callers can fall back to
/// another name such as the video id.
///
/// ```
/// use tubegrab::utils::filename::sanitize_filename;
/// assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("_etc_passwd"));
/// assert_eq!(sanitize_filename(".hidden").as_deref(), Some("hidden"));
/// assert_eq!(sanitize_filename("???"), None);
/// ```
pub fn sanitize_filename(name: &str) -> Option<String> {
    // Characters invalid on Windows/macOS/Linux filesystems
    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];

    let mut sanitized: String = name
        .replace("..", "")
        .chars()
        .map(|c| {
            if invalid_chars.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Leading dots hide files; trailing dots and spaces break Windows
    sanitized = sanitized
        .trim()
        .trim_start_matches('.')
        .trim_end_matches(['.', ' '])
        .to_string();

    while sanitized.contains("__") {
        sanitized = sanitized.replace("__", "_");
    }

    if sanitized.len() > MAX_STEM_LEN {
        let mut end = MAX_STEM_LEN;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized.truncate(end);
        sanitized = sanitized.trim_end().trim_end_matches(['.', ' ']).to_string();
    }

    if sanitized.chars().all(|c| c == '_' || c.is_whitespace()) {
        return None;
    }
    Some(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_title_is_unchanged() {
        assert_eq!(
            sanitize_filename("Rick Astley - Never Gonna Give You Up").as_deref(),
            Some("Rick Astley - Never Gonna Give You Up")
        );
    }

    #[test]
    fn test_separators_are_replaced() {
        assert_eq!(sanitize_filename("AC/DC: Live").as_deref(), Some("AC_DC_ Live"));
        assert_eq!(sanitize_filename("a\\b|c").as_deref(), Some("a_b_c"));
    }

    #[test]
    fn test_unusable_titles() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("   "), None);
        assert_eq!(sanitize_filename("..."), None);
        assert_eq!(sanitize_filename("///"), None);
    }

    #[test]
    fn test_truncation_never_leaves_a_trailing_dot() {
        let title = format!("{}. . .tail", "a".repeat(MAX_STEM_LEN - 4));
        let sanitized = sanitize_filename(&title).unwrap();
        assert_eq!(sanitized, "a".repeat(MAX_STEM_LEN - 4));
    }

    #[test]
    fn test_long_multibyte_title_is_truncated_on_char_boundary() {
        let title = "日本語".repeat(100);
        let sanitized = sanitize_filename(&title).unwrap();
        assert!(sanitized.len() <= MAX_STEM_LEN);
        assert!(sanitized.starts_with("日本語"));
    }
}

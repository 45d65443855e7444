use deunicode::deunicode;

/// Turns a user supplied filename into one that is safe to send in headers and to store on disk.
///
/// Only the last path component survives. Non-ASCII text is transliterated,
/// whitespace becomes `_`, anything other than ASCII alphanumerics and `.-_`
/// is dropped, and leading dots or underscores are stripped. Returns
/// `fallback` when nothing usable is left.
pub fn secure_filename(filename: &str, fallback: &str) -> String {
    let basename = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = deunicode(basename)
        .trim()
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some('_'),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            _ => None,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches(['.', '_']);
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_are_kept() {
        assert_eq!(secure_filename("abstract-12.pdf", "abstract.pdf"), "abstract-12.pdf");
    }

    #[test]
    fn test_path_components_are_dropped() {
        assert_eq!(secure_filename("../../etc/passwd", "x"), "passwd");
        assert_eq!(secure_filename("C:\\Users\\me\\slides.pptx", "x"), "slides.pptx");
    }

    #[test]
    fn test_unsafe_characters() {
        assert_eq!(secure_filename("my poster (final).pdf", "x"), "my_poster_final.pdf");
        assert_eq!(secure_filename(".hidden", "x"), "hidden");
    }

    #[test]
    fn test_non_ascii_is_transliterated() {
        assert_eq!(secure_filename("Z\u{fc}rich talk.pdf", "x"), "Zurich_talk.pdf");
        let name = secure_filename("\u{65e5}\u{672c}.pdf", "x");
        assert_ne!(name, "x");
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn test_fallback_when_nothing_left() {
        assert_eq!(secure_filename("(?)", "abstract.pdf"), "abstract.pdf");
        assert_eq!(secure_filename("", "file"), "file");
    }
}

//! Location utilities for segment references.
//!
//! Segment locations in a descriptor are written relative to the descriptor
//! itself. This module resolves them into absolute references and implements
//! the safe-filename rule used when a script comes from an untrusted source.

/// Check a raw location against the safe-filename rule.
///
/// Every `/`-separated component must start with an ASCII letter, digit,
/// `_` or `-`; later characters may also be `.`. Traversal (`..`), hidden
/// files, absolute paths, empty components and punctuation are rejected,
/// while nested relative subdirectories are allowed.
///
/// # Examples
///
/// ```
/// use segcat_common::paths::is_safe_location;
///
/// assert!(is_safe_location("sub/dir/clip.ts"));
/// assert!(!is_safe_location("../escape.ts"));
/// assert!(!is_safe_location("/abs/path.ts"));
/// ```
pub fn is_safe_location(location: &str) -> bool {
    let mut component_start = true;

    for c in location.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            component_start = false;
            continue;
        }
        if component_start {
            return false;
        }
        match c {
            '/' => component_start = true,
            '.' => {}
            _ => return false,
        }
    }

    true
}

/// Resolve `rel` against the location of the document that referenced it.
///
/// - A `rel` containing `://` is already absolute and kept as is.
/// - A `/`-rooted `rel` is kept, unless `base` is a URL: then it replaces the
///   base's path (`//`-rooted values keep only the base's scheme).
/// - Otherwise the base's query string and file name are dropped, each
///   leading `../` pops one directory, and `rel` is appended.
///
/// Without a base, `rel` is returned unchanged.
///
/// # Examples
///
/// ```
/// use segcat_common::paths::make_absolute;
///
/// assert_eq!(
///     make_absolute(Some("/media/show/list.ffconcat"), "part1.ts"),
///     "/media/show/part1.ts"
/// );
/// assert_eq!(
///     make_absolute(Some("https://cdn.example/a/b/list.txt?sig=1"), "../c.ts"),
///     "https://cdn.example/a/c.ts"
/// );
/// ```
pub fn make_absolute(base: Option<&str>, rel: &str) -> String {
    let Some(base) = base else {
        return rel.to_string();
    };

    if rel.starts_with('/') {
        if let Some(scheme_sep) = base.find("://") {
            let mut buf = base.to_string();
            if rel.starts_with("//") {
                buf.truncate(scheme_sep + 1);
            } else {
                let host_start = scheme_sep + 3;
                if let Some(path_start) = buf[host_start..].find('/') {
                    buf.truncate(host_start + path_start);
                }
            }
            buf.push_str(rel);
            return buf;
        }
        return rel.to_string();
    }

    if rel.contains("://") {
        return rel.to_string();
    }

    let mut buf = base.to_string();
    if let Some(query) = buf.find('?') {
        buf.truncate(query);
    }
    if rel.starts_with('?') {
        buf.push_str(rel);
        return buf;
    }

    let mut has_dir = match buf.rfind('/') {
        Some(sep) => {
            buf.truncate(sep + 1);
            true
        }
        None => {
            buf.clear();
            false
        }
    };

    let mut rel = rel;
    while has_dir && rel.starts_with("../") {
        buf.pop();
        let sep = buf.rfind('/');
        let last = match sep {
            Some(i) => &buf[i + 1..],
            None => buf.as_str(),
        };
        if last == ".." {
            buf.push('/');
            break;
        }
        match sep {
            Some(i) => buf.truncate(i + 1),
            None => {
                buf.clear();
                has_dir = false;
            }
        }
        rel = &rel[3..];
    }

    buf.push_str(rel);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_locations() {
        assert!(is_safe_location("clip.ts"));
        assert!(is_safe_location("sub/dir/clip.ts"));
        assert!(is_safe_location("part_01-final.mp4"));
        assert!(is_safe_location("a.b.c"));
        assert!(is_safe_location("dir/"));
    }

    #[test]
    fn test_unsafe_locations() {
        assert!(!is_safe_location("../escape.ts"));
        assert!(!is_safe_location("sub/../../escape.ts"));
        assert!(!is_safe_location("/abs/path.ts"));
        assert!(!is_safe_location(".hidden"));
        assert!(!is_safe_location("a//b.ts"));
        assert!(!is_safe_location("http://host/x.ts"));
        assert!(!is_safe_location("with space.ts"));
        assert!(!is_safe_location("caf\u{e9}.ts"));
    }

    #[test]
    fn test_make_absolute_without_base() {
        assert_eq!(make_absolute(None, "clip.ts"), "clip.ts");
        assert_eq!(make_absolute(None, "../clip.ts"), "../clip.ts");
    }

    #[test]
    fn test_make_absolute_file_paths() {
        assert_eq!(make_absolute(Some("/a/b/list.txt"), "c.ts"), "/a/b/c.ts");
        assert_eq!(make_absolute(Some("/a/b/list.txt"), "sub/c.ts"), "/a/b/sub/c.ts");
        assert_eq!(make_absolute(Some("/a/b/list.txt"), "../c.ts"), "/a/c.ts");
        assert_eq!(make_absolute(Some("/a/b/list.txt"), "/x/c.ts"), "/x/c.ts");
        assert_eq!(make_absolute(Some("list.txt"), "c.ts"), "c.ts");
        assert_eq!(make_absolute(Some("../list.txt"), "../c.ts"), "../../c.ts");
    }

    #[test]
    fn test_make_absolute_urls() {
        let base = Some("http://host/dir/list.txt?token=abc");
        assert_eq!(make_absolute(base, "c.ts"), "http://host/dir/c.ts");
        assert_eq!(make_absolute(base, "/root.ts"), "http://host/root.ts");
        assert_eq!(make_absolute(base, "//other/x.ts"), "http://other/x.ts");
        assert_eq!(make_absolute(base, "?page=2"), "http://host/dir/list.txt?page=2");
        assert_eq!(
            make_absolute(base, "https://elsewhere/x.ts"),
            "https://elsewhere/x.ts"
        );
    }
}

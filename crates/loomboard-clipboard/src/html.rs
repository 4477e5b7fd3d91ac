//! Minimal scanning of pasted HTML for image references.
//!
//! Browser clipboards ship copied images as HTML fragments. A full parser
//! is overkill for "find the first `<img src=…>`", so this walks the text
//! directly: case-insensitive tag and attribute matching, with the value
//! returned in its original casing.

/// Find the `src` value of the first `<img>` tag, if any.
///
/// Tolerates single-quoted, double-quoted, and unquoted values. Attributes
/// that merely end in `src` (like `data-src`) do not match.
pub fn first_img_src(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let mut cursor = 0;
    while let Some(found) = lower[cursor..].find("<img") {
        let tag_start = cursor + found;
        // "<img" must be a whole tag name, not a prefix of something else.
        match lower.as_bytes().get(tag_start + 4) {
            Some(b) if !b.is_ascii_whitespace() && *b != b'>' && *b != b'/' => {
                cursor = tag_start + 4;
                continue;
            }
            None => return None,
            _ => {}
        }
        let tag_end = lower[tag_start..]
            .find('>')
            .map_or(lower.len(), |i| tag_start + i);
        if let Some(src) = src_in_tag(html, &lower, tag_start + 4, tag_end) {
            return Some(src);
        }
        cursor = (tag_end + 1).min(lower.len());
    }
    None
}

/// Scan one tag body (between the tag name and `>`) for a src attribute.
fn src_in_tag(original: &str, lower: &str, start: usize, end: usize) -> Option<String> {
    let segment = &lower[start..end];
    let bytes = lower.as_bytes();
    let mut offset = 0;
    while let Some(found) = segment[offset..].find("src") {
        let at = offset + found;
        // Must be its own attribute name: whitespace before, `=` after.
        let standalone = at > 0 && segment.as_bytes()[at - 1].is_ascii_whitespace();
        if !standalone {
            offset = at + 3;
            continue;
        }

        let mut i = start + at + 3;
        while i < end && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= end || bytes[i] != b'=' {
            offset = at + 3;
            continue;
        }
        i += 1;
        while i < end && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= end {
            return None;
        }

        let value = match bytes[i] {
            quote @ (b'"' | b'\'') => {
                let value_start = i + 1;
                let close = lower[value_start..end].find(quote as char)? + value_start;
                &original[value_start..close]
            }
            _ => {
                let mut j = i;
                while j < end && !bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                &original[i..j]
            }
        };
        if value.is_empty() {
            offset = at + 3;
            continue;
        }
        return Some(value.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_quoted_src() {
        let html = r#"<div><img src="https://example.com/cat.png" alt="cat"></div>"#;
        assert_eq!(
            first_img_src(html).as_deref(),
            Some("https://example.com/cat.png")
        );
    }

    #[test]
    fn test_single_quoted_src() {
        let html = "<img src='https://example.com/a.jpg'>";
        assert_eq!(first_img_src(html).as_deref(), Some("https://example.com/a.jpg"));
    }

    #[test]
    fn test_unquoted_src() {
        let html = "<img src=https://example.com/b.webp >";
        assert_eq!(
            first_img_src(html).as_deref(),
            Some("https://example.com/b.webp")
        );
    }

    #[test]
    fn test_case_insensitive_tag_preserves_value_case() {
        let html = r#"<IMG SRC="https://Example.com/Mixed.PNG">"#;
        assert_eq!(
            first_img_src(html).as_deref(),
            Some("https://Example.com/Mixed.PNG")
        );
    }

    #[test]
    fn test_data_src_does_not_match() {
        let html = r#"<img data-src="lazy.png">"#;
        assert_eq!(first_img_src(html), None);
    }

    #[test]
    fn test_data_src_followed_by_real_src() {
        let html = r#"<img data-src="lazy.png" src="real.png">"#;
        assert_eq!(first_img_src(html).as_deref(), Some("real.png"));
    }

    #[test]
    fn test_first_of_several_imgs_wins() {
        let html = r#"<img src="one.png"><img src="two.png">"#;
        assert_eq!(first_img_src(html).as_deref(), Some("one.png"));
    }

    #[test]
    fn test_img_without_src_skipped_for_later_one() {
        let html = r#"<img alt="decorative"><img src="u.png">"#;
        assert_eq!(first_img_src(html).as_deref(), Some("u.png"));
    }

    #[test]
    fn test_script_src_is_not_an_image() {
        let html = r#"<script src="app.js"></script><p>text</p>"#;
        assert_eq!(first_img_src(html), None);
    }

    #[test]
    fn test_no_images() {
        assert_eq!(first_img_src("<p>just text</p>"), None);
        assert_eq!(first_img_src(""), None);
    }

    #[test]
    fn test_truncated_tag() {
        assert_eq!(first_img_src("<img"), None);
        assert_eq!(first_img_src(r#"<img src="unterminated"#), None);
    }
}

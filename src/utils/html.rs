//! HTML entity escaping and unescaping.

use std::borrow::Cow;

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters in text content.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
///
/// # Example
/// ```ignore
/// assert_eq!(escape("<script>"), "&lt;script&gt;");
/// assert_eq!(escape("hello"), "hello"); // No allocation
/// ```
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Unescape HTML entities back to characters.
///
/// Handles common named entities and numeric character references.
/// Anything unrecognized is kept verbatim.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        // Entities are short; a missing or distant `;` means a bare ampersand.
        let entity_end = tail.find(';').filter(|&end| end > 1 && end <= 12);
        let Some(end) = entity_end else {
            result.push('&');
            rest = &tail[1..];
            continue;
        };

        let entity = &tail[1..end];
        match decode_entity(entity) {
            Some(c) => result.push(c),
            None => result.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }
    result.push_str(rest);

    Cow::Owned(result)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        _ => {
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_special_chars() {
        assert_eq!(escape("hello world"), "hello world");
        assert_eq!(escape("<script>"), "&lt;script&gt;");
        assert_eq!(escape("a & b"), "a &amp; b");
        assert_eq!(escape("say \"hi\""), "say &quot;hi&quot;");
        assert_eq!(escape("it's"), "it&#39;s");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("hello"), "hello");
        assert_eq!(unescape("&lt;script&gt;"), "<script>");
        assert_eq!(unescape("a &amp; b"), "a & b");
        assert_eq!(unescape("print(&quot;hi&quot;)"), "print(\"hi\")");
        assert_eq!(unescape("&#39;"), "'");
        assert_eq!(unescape("&#x27;"), "'");
        assert_eq!(unescape("&#65;"), "A");
        assert_eq!(unescape("&nbsp;"), "\u{00A0}");
    }

    #[test]
    fn test_unescape_keeps_unknown_and_bare_ampersands() {
        assert_eq!(unescape("a && b"), "a && b");
        assert_eq!(unescape("&bogus;"), "&bogus;");
        assert_eq!(unescape("fish & chips; please"), "fish & chips; please");
        assert_eq!(unescape("trailing &"), "trailing &");
    }

    #[test]
    fn test_escape_unescape_inverse() {
        let src = r#"if a < b && c > "d" { 'e' }"#;
        assert_eq!(unescape(&escape(src)), src);
    }
}

//! Backslash escapes for control characters in field text.

use std::borrow::Cow;

/// Replace backslashes and the control characters `\b`, `\f`, `\n`, `\r`, `\t` with their
/// backslash escapes.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['\\', '\u{8}', '\u{c}', '\n', '\r', '\t']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Reverse [`escape`]. Unknown escapes and a trailing backslash are kept verbatim.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("plain", "plain")]
    #[case("a\nb", "a\\nb")]
    #[case("tab\there", "tab\\there")]
    #[case("c:\\dir", "c:\\\\dir")]
    #[case("\r\u{8}\u{c}", "\\r\\b\\f")]
    fn escapes(#[case] raw: &str, #[case] escaped: &str) {
        assert_eq!(escape(raw), escaped);
        assert_eq!(unescape(escaped), raw);
    }

    #[test]
    fn borrows_when_clean() {
        assert!(matches!(escape("clean"), Cow::Borrowed(_)));
        assert!(matches!(unescape("clean"), Cow::Borrowed(_)));
    }

    #[test]
    fn unknown_escapes_are_kept() {
        assert_eq!(unescape("\\x\\"), "\\x\\");
    }
}

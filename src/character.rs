use std::borrow::Cow;
use std::char;
use std::cmp::min;
use std::collections::HashMap;

use entities::ENTITIES;
use once_cell::sync::Lazy;

pub const ENTITY_MIN_LENGTH: usize = 2;
pub const ENTITY_MAX_LENGTH: usize = 32;

/// A decoded escape sequence or entity reference: the replacement text and
/// how much of the input it consumed.
pub struct Escaped {
    pub text: Cow<'static, str>,
    pub len: usize,
}

const ESCAPABLE: &[u8] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Scan a backslash escape at the start of `text`.  A backslash before an
/// ASCII punctuation character consumes both and yields the bare character;
/// before anything else (or at end of input) the backslash itself is the
/// output and only one character is consumed.
pub fn scan_backslash(text: &str) -> Option<Escaped> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'\\') {
        return None;
    }

    match bytes.get(1) {
        Some(&c) if ESCAPABLE.contains(&c) => Some(Escaped {
            text: Cow::Owned((c as char).to_string()),
            len: 2,
        }),
        _ => Some(Escaped {
            text: Cow::Borrowed("\\"),
            len: 1,
        }),
    }
}

static NAMED_ENTITIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    ENTITIES
        .iter()
        .filter(|e| e.entity.ends_with(';'))
        .map(|e| (&e.entity[1..e.entity.len() - 1], e.characters))
        .collect()
});

/// Scan an entity reference (`&name;`, `&#NNNN;`, `&#xHHHH;`) at the start
/// of `text`.  The output is the raw decoded text; unknown names and
/// malformed numeric forms decode to nothing.
pub fn scan_entity(text: &str) -> Option<Escaped> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'&') {
        return None;
    }

    if bytes.get(1) == Some(&b'#') {
        return scan_numeric_entity(text);
    }

    let size = min(text.len(), ENTITY_MAX_LENGTH);
    for i in ENTITY_MIN_LENGTH..size {
        match bytes[i] {
            b' ' => return None,
            b';' => {
                return NAMED_ENTITIES.get(&text[1..i]).map(|s| Escaped {
                    text: Cow::Borrowed(*s),
                    len: i + 1,
                })
            }
            _ => (),
        }
    }

    None
}

fn scan_numeric_entity(text: &str) -> Option<Escaped> {
    let bytes = text.as_bytes();
    let mut codepoint: u32 = 0;
    let mut i = 2;

    let num_digits = if bytes.get(i).map_or(false, u8::is_ascii_digit) {
        while i < text.len() && bytes[i].is_ascii_digit() {
            codepoint = codepoint * 10 + (bytes[i] - b'0') as u32;
            codepoint = min(codepoint, 0x11_0000);
            i += 1;
        }
        i - 2
    } else if matches!(bytes.get(i), Some(&b'x') | Some(&b'X')) {
        i += 1;
        while i < text.len() && bytes[i].is_ascii_hexdigit() {
            codepoint = codepoint * 16 + ((bytes[i] as u32 | 32) % 39 - 9);
            codepoint = min(codepoint, 0x11_0000);
            i += 1;
        }
        i - 3
    } else {
        0
    };

    if (1..=8).contains(&num_digits) && bytes.get(i) == Some(&b';') {
        if codepoint == 0 || codepoint >= 0x11_0000 {
            codepoint = 0xFFFD;
        }
        let ch = char::from_u32(codepoint).unwrap_or('\u{FFFD}');
        return Some(Escaped {
            text: Cow::Owned(ch.to_string()),
            len: i + 1,
        });
    }

    None
}

/// The entity form of a character that is special in HTML text, if any.
pub fn escape_html_char(c: char) -> Option<&'static str> {
    match c {
        '"' => Some("&quot;"),
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    }
}

pub fn escape_html_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match escape_html_char(c) {
            Some(e) => out.push_str(e),
            None => out.push(c),
        }
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_html_into(&mut out, s);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backslash_escapes() {
        let e = scan_backslash("\\*rest").unwrap();
        assert_eq!((e.text.as_ref(), e.len), ("*", 2));

        let e = scan_backslash("\\q").unwrap();
        assert_eq!((e.text.as_ref(), e.len), ("\\", 1));

        let e = scan_backslash("\\").unwrap();
        assert_eq!((e.text.as_ref(), e.len), ("\\", 1));

        assert!(scan_backslash("x").is_none());
    }

    #[test]
    fn named_entities() {
        for (name, expected) in [
            ("nbsp", "\u{a0}"),
            ("amp", "&"),
            ("auml", "ä"),
            ("ouml", "ö"),
            ("copy", "©"),
            ("AElig", "Æ"),
            ("Dcaron", "Ď"),
            ("frac34", "¾"),
            ("HilbertSpace", "ℋ"),
            ("DifferentialD", "ⅆ"),
            ("ClockwiseContourIntegral", "∲"),
            ("ngE", "≧̸"),
        ] {
            let input = format!("&{};", name);
            let e = scan_entity(&input).unwrap();
            assert_eq!(e.text.as_ref(), expected, "&{};", name);
            assert_eq!(e.len, input.len());
        }

        assert!(scan_entity("&nosuchentityname;").is_none());
        assert!(scan_entity("&amp").is_none());
    }

    #[test]
    fn numeric_entities() {
        let e = scan_entity("&#8734;").unwrap();
        assert_eq!((e.text.as_ref(), e.len), ("∞", 7));

        let e = scan_entity("&#x221e;").unwrap();
        assert_eq!((e.text.as_ref(), e.len), ("∞", 8));

        let e = scan_entity("&#0;").unwrap();
        assert_eq!(e.text.as_ref(), "\u{FFFD}");

        let e = scan_entity("&#55296;").unwrap();
        assert_eq!(e.text.as_ref(), "\u{FFFD}");

        assert!(scan_entity("&#123456789;").is_none());
        assert!(scan_entity("&#;").is_none());
    }

    #[test]
    fn html_escapes() {
        assert_eq!(escape_html("a<b&c\"d>e"), "a&lt;b&amp;c&quot;d&gt;e");
    }
}

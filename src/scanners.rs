//! Position-based scanning over immutable text: HTML fragment skippers,
//! link label/destination/title parsing, and URL percent-encoding.
//!
//! Every `skip_*` function takes a byte position and returns the position
//! one past the recognised construct, or the starting position when nothing
//! matched.

use crate::character;

fn char_at(s: &str, pos: usize) -> char {
    s[pos..].chars().next().unwrap()
}

pub fn skip_whitespace(s: &str, begin: usize) -> usize {
    let bytes = s.as_bytes();
    let mut pos = begin;
    while pos < s.len() && matches!(bytes[pos], b' ' | b'\t' | b'\n') {
        pos += 1;
    }
    pos
}

/// True when `s` opens with an autolink candidate: `<` followed by scheme
/// or mailbox characters reaching a `:` or `@` before any whitespace.
pub fn is_autolink(s: &str) -> bool {
    let bytes = s.as_bytes();
    if s.len() <= 7 || bytes[0] != b'<' || matches!(bytes[1], b' ' | b'\t' | b'/') {
        return false;
    }

    let mut pos = 1;
    while pos < s.len() {
        match bytes[pos] {
            b':' | b'@' => return true,
            c if c.is_ascii_alphanumeric() || c == b'+' || c == b'-' => pos += 1,
            c if c >= 0x80 => pos += 1,
            _ => break,
        }
    }

    false
}

/// Parse a link label (`[…]`) at the first non-whitespace position at or
/// after `*begin`.  On success `*begin` is left one past the closing `]`
/// and the collected label (escapes kept, whitespace runs collapsed) is
/// returned.  Nested unescaped brackets disqualify the label.
pub fn find_link_label(s: &str, begin: &mut usize) -> Option<String> {
    let bytes = s.as_bytes();
    let mut pos = skip_whitespace(s, *begin);

    if pos >= s.len() || bytes[pos] != b'[' {
        return None;
    }
    pos += 1;

    while pos < s.len() && matches!(bytes[pos], b' ' | b'\t' | b'\n') {
        pos += 1;
    }

    let mut label = String::new();
    while pos < s.len() {
        match bytes[pos] {
            b'[' => return None,
            b']' => {
                *begin = pos + 1;
                return Some(label);
            }
            b'\\' => {
                label.push('\\');
                pos += 1;
                if pos < s.len() {
                    let c = char_at(s, pos);
                    label.push(c);
                    pos += c.len_utf8();
                }
            }
            b'`' => {
                label.push('`');
                loop {
                    pos += 1;
                    if pos >= s.len() {
                        return None;
                    }
                    let c = char_at(s, pos);
                    label.push(c);
                    if c == '\\' {
                        pos += 1;
                        if pos < s.len() {
                            let e = char_at(s, pos);
                            label.push(e);
                            pos += e.len_utf8() - 1;
                        }
                    } else if c == '`' {
                        break;
                    } else {
                        pos += c.len_utf8() - 1;
                    }
                }
                pos += 1;
            }
            b' ' | b'\t' | b'\n' => {
                label.push(' ');
                while pos < s.len() && matches!(bytes[pos], b' ' | b'\t' | b'\n') {
                    pos += 1;
                }
            }
            _ => {
                let c = char_at(s, pos);
                label.push(c);
                pos += c.len_utf8();
            }
        }
    }

    None
}

/// Parse a link label that must be directly followed by `next` (the `:` of
/// a reference definition).
pub fn find_link_label_followed_by(s: &str, begin: &mut usize, next: u8) -> Option<String> {
    let mut pos = *begin;
    let label = find_link_label(s, &mut pos)?;

    if pos >= s.len() || s.as_bytes()[pos] != next {
        return None;
    }

    *begin = pos + 1;
    Some(label)
}

/// Parse a reference definition's destination starting at the first
/// non-whitespace position after `*begin`: everything up to the next
/// whitespace, with backslash escapes and entities decoded and an
/// angle-bracket wrapping stripped.  Returns the raw destination text.
pub fn find_link_destination(s: &str, begin: &mut usize) -> Option<String> {
    let mut pos = skip_whitespace(s, *begin);
    let mut dest = String::new();

    while pos < s.len() {
        let c = char_at(s, pos);
        if c.is_whitespace() {
            break;
        }

        if let Some(e) = character::scan_backslash(&s[pos..]).or_else(|| character::scan_entity(&s[pos..])) {
            dest.push_str(&e.text);
            pos += e.len;
        } else {
            dest.push(c);
            pos += c.len_utf8();
        }
    }

    if dest.starts_with('<') && dest.ends_with('>') && dest.len() >= 2 {
        dest = dest[1..dest.len() - 1].to_string();
    }

    *begin = pos;
    if dest.is_empty() {
        None
    } else {
        Some(dest)
    }
}

/// Parse a reference definition's optional title.  `Some(None)` means no
/// title was present (still a valid definition); `None` means an opened
/// title never terminated, or trailing garbage followed it, and the whole
/// definition is to be rejected.
pub fn find_link_title(s: &str, begin: &mut usize) -> Option<Option<String>> {
    let bytes = s.as_bytes();
    let mut pos = skip_whitespace(s, *begin);
    *begin = pos;

    if pos + 1 >= s.len() {
        return Some(None);
    }

    let open = bytes[pos];
    let close = match open {
        b'\'' | b'"' => open,
        b'(' => b')',
        _ => return Some(None),
    };
    pos += 1;

    let mut title = String::new();
    while pos < s.len() {
        if bytes[pos] == close {
            pos += 1;
            while pos < s.len() {
                match bytes[pos] {
                    b'\n' => {
                        pos += 1;
                        break;
                    }
                    b' ' | b'\t' => pos += 1,
                    _ => return None,
                }
            }
            *begin = pos;
            return Some(Some(title));
        }

        if let Some(e) = character::scan_backslash(&s[pos..]).or_else(|| character::scan_entity(&s[pos..])) {
            title.push_str(&e.text);
            pos += e.len;
        } else {
            let c = char_at(s, pos);
            title.push(c);
            pos += c.len_utf8();
        }
    }

    None
}

const ENCODE_EXEMPT: &[u8] = b"@#%()&*/:+=?,-._~";

/// Percent-encode a URL the way the rendered `href` needs it: unreserved
/// characters and common URL punctuation pass through, everything else
/// becomes `%XX` over its UTF-8 bytes, and any surviving `&` is written as
/// its entity.
pub fn percent_encode(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for &b in url.as_bytes() {
        if b == b'&' {
            out.push_str("&amp;");
        } else if b.is_ascii_alphanumeric() || ENCODE_EXEMPT.contains(&b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// Skip any single HTML construct behind a leading `<`: open tag, close
/// tag, comment, processing instruction, declaration or CDATA section.
pub fn skip_html_span(s: &str, begin: usize) -> usize {
    if begin >= s.len() || s.as_bytes()[begin] != b'<' {
        return begin;
    }

    let pos = begin + 1;
    let skips: [fn(&str, usize) -> usize; 6] = [
        skip_open_tag,
        skip_close_tag,
        skip_html_comment,
        skip_processing_instruction,
        skip_declaration,
        skip_cdata_section,
    ];
    for skip in skips {
        let end = skip(s, pos);
        if end != pos {
            return end;
        }
    }

    begin
}

pub fn skip_html_comment(s: &str, begin: usize) -> usize {
    let bytes = s.as_bytes();
    if begin + 4 >= s.len()
        || bytes[begin] != b'!'
        || bytes[begin + 1] != b'-'
        || bytes[begin + 2] != b'-'
        || bytes[begin + 3] == b'>'
        || (bytes[begin + 3] == b'-' && bytes[begin + 4] == b'>')
    {
        return begin;
    }

    let mut count = 0;
    for pos in begin + 3..s.len() {
        if count == 2 {
            return if bytes[pos] == b'>' { pos + 1 } else { begin };
        }
        count = if bytes[pos] == b'-' { count + 1 } else { 0 };
    }

    begin
}

pub fn skip_processing_instruction(s: &str, begin: usize) -> usize {
    let bytes = s.as_bytes();
    if begin + 1 >= s.len() || bytes[begin] != b'?' {
        return begin;
    }

    for pos in begin + 1..s.len() - 1 {
        if bytes[pos] == b'?' && bytes[pos + 1] == b'>' {
            return pos + 2;
        }
    }

    begin
}

pub fn skip_declaration(s: &str, begin: usize) -> usize {
    let bytes = s.as_bytes();
    if begin + 1 >= s.len() || bytes[begin] != b'!' {
        return begin;
    }

    let mut pos = begin + 1;
    if !bytes[pos].is_ascii_uppercase() {
        return begin;
    }
    while pos < s.len() && bytes[pos].is_ascii_uppercase() {
        pos += 1;
    }

    if pos >= s.len() || !matches!(bytes[pos], b' ' | b'\t' | b'\n') {
        return begin;
    }
    pos = skip_whitespace(s, pos + 1);

    while pos < s.len() {
        if bytes[pos] == b'>' {
            return pos + 1;
        }
        pos += 1;
    }

    begin
}

pub fn skip_cdata_section(s: &str, begin: usize) -> usize {
    if !s[begin..].starts_with("![CDATA[") {
        return begin;
    }

    let bytes = s.as_bytes();
    let mut pos = begin + 8;
    while pos + 2 < s.len() {
        if bytes[pos] == b']' && bytes[pos + 1] == b']' && bytes[pos + 2] == b'>' {
            return pos + 3;
        }
        pos += 1;
    }

    begin
}

pub fn skip_open_tag(s: &str, begin: usize) -> usize {
    let bytes = s.as_bytes();
    let mut pos = skip_tag_name(s, begin);
    if pos == begin {
        return begin;
    }

    while pos < s.len() {
        match bytes[pos] {
            b'<' | b'\\' => break,
            c => {
                let end = skip_attribute(s, pos);
                if end != pos {
                    pos = end;
                    continue;
                }

                if c == b'/' {
                    return if pos + 1 < s.len() && bytes[pos + 1] == b'>' {
                        pos + 2
                    } else {
                        begin
                    };
                }
                if c == b'>' {
                    return pos + 1;
                }
                break;
            }
        }
    }

    begin
}

pub fn skip_close_tag(s: &str, begin: usize) -> usize {
    let bytes = s.as_bytes();
    if begin >= s.len() || bytes[begin] != b'/' {
        return begin;
    }

    let end = skip_tag_name(s, begin + 1);
    if end != begin + 1 && end < s.len() && bytes[end] == b'>' {
        end + 1
    } else {
        begin
    }
}

fn skip_tag_name(s: &str, begin: usize) -> usize {
    let bytes = s.as_bytes();
    if begin >= s.len() || !bytes[begin].is_ascii_alphabetic() {
        return begin;
    }

    let mut pos = begin + 1;
    while pos < s.len() {
        match bytes[pos] {
            b' ' | b'\t' | b'\n' => return skip_whitespace(s, pos + 1),
            b'>' | b'/' => return pos,
            c if c.is_ascii_alphanumeric() || c == b'-' => pos += 1,
            _ => return begin,
        }
    }

    begin
}

fn skip_attribute(s: &str, begin: usize) -> usize {
    let bytes = s.as_bytes();
    let mut pos = skip_attribute_name(s, begin);
    if pos == begin || pos >= s.len() {
        return begin;
    }

    match bytes[pos] {
        b'/' | b'>' => return pos,
        b'=' => (),
        _ => return pos,
    }

    pos += 1;
    while pos < s.len() {
        if !matches!(bytes[pos], b' ' | b'\t' | b'\n') {
            let skips: [fn(&str, usize) -> usize; 3] = [
                skip_unquoted_attribute_value,
                skip_single_quoted_attribute_value,
                skip_double_quoted_attribute_value,
            ];
            for skip in skips {
                let end = skip(s, pos);
                if end != pos {
                    return end;
                }
            }
            return begin;
        }
        pos += 1;
    }

    begin
}

fn skip_attribute_name(s: &str, begin: usize) -> usize {
    let bytes = s.as_bytes();
    if begin >= s.len() {
        return begin;
    }

    let c = bytes[begin];
    if !c.is_ascii_alphabetic() && c != b'_' && c != b':' {
        return begin;
    }

    let mut pos = begin + 1;
    while pos < s.len() {
        match bytes[pos] {
            b' ' | b'\t' | b'\n' => return skip_whitespace(s, pos + 1),
            b'=' | b'>' | b'/' => return pos,
            c if c.is_ascii_alphanumeric() || matches!(c, b'_' | b'.' | b':' | b'-') => pos += 1,
            _ => return begin,
        }
    }

    begin
}

fn skip_unquoted_attribute_value(s: &str, begin: usize) -> usize {
    let bytes = s.as_bytes();
    let mut pos = begin;
    while pos < s.len() {
        match bytes[pos] {
            b' ' | b'\t' | b'\n' => {
                return if pos == begin {
                    begin
                } else {
                    skip_whitespace(s, pos + 1)
                }
            }
            b'>' | b'/' => return pos,
            b'"' | b'\'' | b'=' | b'<' | b'`' => return begin,
            _ => pos += 1,
        }
    }

    begin
}

fn skip_quoted_attribute_value(s: &str, begin: usize, delimiter: u8) -> usize {
    let bytes = s.as_bytes();
    if begin >= s.len() || bytes[begin] != delimiter {
        return begin;
    }

    let mut pos = begin + 1;
    while pos < s.len() {
        if bytes[pos] == delimiter {
            pos += 1;
            if pos >= s.len() {
                return begin;
            }
            return match bytes[pos] {
                b' ' | b'\t' | b'\n' => skip_whitespace(s, pos + 1),
                b'/' | b'>' => pos,
                _ => begin,
            };
        }
        pos += 1;
    }

    begin
}

fn skip_single_quoted_attribute_value(s: &str, begin: usize) -> usize {
    skip_quoted_attribute_value(s, begin, b'\'')
}

fn skip_double_quoted_attribute_value(s: &str, begin: usize) -> usize {
    skip_quoted_attribute_value(s, begin, b'"')
}

/// True when the line (from `begin`) is a lone open or close tag followed
/// only by whitespace, the type-7 HTML block condition.
pub fn is_html_type7(s: &str, begin: usize) -> bool {
    let pos = skip_whitespace(s, begin);
    if pos >= s.len() || s.as_bytes()[pos] != b'<' {
        return false;
    }

    let start = pos + 1;
    let mut end = skip_open_tag(s, start);
    if end == start {
        end = skip_close_tag(s, start);
    }
    if end == start {
        return false;
    }

    skip_whitespace(s, end) >= s.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autolink_detection() {
        assert!(is_autolink("<http://example.com>"));
        assert!(is_autolink("<someone@example.com>"));
        assert!(!is_autolink("<ab:cd>"));
        assert!(!is_autolink("</closing>"));
        assert!(!is_autolink("< spaced>"));
    }

    #[test]
    fn link_labels() {
        let mut pos = 0;
        assert_eq!(find_link_label("[foo]", &mut pos).as_deref(), Some("foo"));
        assert_eq!(pos, 5);

        let mut pos = 0;
        assert_eq!(
            find_link_label("[Foo  \n bar]", &mut pos).as_deref(),
            Some("Foo bar")
        );

        let mut pos = 0;
        assert!(find_link_label("[a[b]c]", &mut pos).is_none());

        let mut pos = 0;
        assert_eq!(
            find_link_label_followed_by("[ref]: /x", &mut pos, b':').as_deref(),
            Some("ref")
        );
        assert_eq!(pos, 6);
    }

    #[test]
    fn link_destinations() {
        let mut pos = 0;
        assert_eq!(
            find_link_destination(" /url rest", &mut pos).as_deref(),
            Some("/url")
        );
        assert_eq!(pos, 5);

        let mut pos = 0;
        assert_eq!(
            find_link_destination("<http://a b>", &mut pos).as_deref(),
            Some("<http://a")
        );

        let mut pos = 0;
        assert_eq!(
            find_link_destination("<http://x>\n", &mut pos).as_deref(),
            Some("http://x")
        );
    }

    #[test]
    fn link_titles() {
        let mut pos = 0;
        assert_eq!(
            find_link_title("\"hi\"\nrest", &mut pos),
            Some(Some("hi".to_string()))
        );
        assert_eq!(pos, 5);

        let mut pos = 0;
        assert_eq!(find_link_title("no title", &mut pos), Some(None));

        let mut pos = 0;
        assert_eq!(find_link_title("\"unterminated", &mut pos), None);

        let mut pos = 0;
        assert_eq!(find_link_title("\"hi\" junk", &mut pos), None);
    }

    #[test]
    fn percent_encoding() {
        assert_eq!(percent_encode("/a b"), "/a%20b");
        assert_eq!(percent_encode("/x?y=1&z=2"), "/x?y=1&amp;z=2");
        assert_eq!(percent_encode("héllo"), "h%C3%A9llo");
    }

    #[test]
    fn html_spans() {
        assert_eq!(skip_html_span("<a href='x'> rest", 0), 12);
        assert_eq!(skip_html_span("</div> rest", 0), 6);
        assert_eq!(skip_html_span("<!-- c --> rest", 0), 10);
        assert_eq!(skip_html_span("<? pi ?> rest", 0), 8);
        assert_eq!(skip_html_span("<!DOCTYPE html> rest", 0), 15);
        assert_eq!(skip_html_span("<![CDATA[x]]> rest", 0), 13);
        assert_eq!(skip_html_span("<not a tag", 0), 0);
    }

    #[test]
    fn type7_lines() {
        assert!(is_html_type7("<a b >", 0));
        assert!(is_html_type7("  </table>  ", 0));
        assert!(!is_html_type7("<a b> c", 0));
        assert!(!is_html_type7("<a b=>", 0));
    }
}

//! The conformance-suite runner: reads an XML file of repeated
//! `<markdown>…</markdown>` / `<html>…</html>` pairs, converts each
//! markdown text and compares with the expected HTML.  Mismatched outputs
//! are printed; the process reports totals and never fails.

use std::fs;

pub fn run(path: &str) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => {
            eprintln!("Load XML File Problem\nCouldn't open {}.", path);
            return;
        }
    };

    let mut parser = marq::Parser::new();
    let mut ok_count = 0usize;
    let mut fault_count = 0usize;
    let mut pos = 0;

    loop {
        let markdown = match element_text(&text, &mut pos, "markdown") {
            Some(md) => md,
            None => break,
        };
        let expected = match element_text(&text, &mut pos, "html") {
            Some(html) => html,
            None => {
                eprintln!("{} Parse Error\nmarkdown element without html element", path);
                return;
            }
        };

        let result = parser.html_of(&markdown);
        if result == expected {
            ok_count += 1;
        } else {
            fault_count += 1;
            println!("test {}:", ok_count + fault_count);
            println!("{}", result);
        }
    }

    println!("Success: {}", ok_count);
    println!("Fault: {}", fault_count);
}

/// Find the next `<tag>…</tag>` after `*pos`, returning its decoded text
/// and leaving `*pos` after the close tag.
fn element_text(text: &str, pos: &mut usize, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);

    let start = text[*pos..].find(&open)? + *pos + open.len();
    let end = text[start..].find(&close)? + start;
    *pos = end + close.len();

    Some(unescape_xml(&text[start..end]))
}

fn unescape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < s.len() {
        if bytes[i] != b'&' {
            let c = s[i..].chars().next().unwrap();
            out.push(c);
            i += c.len_utf8();
            continue;
        }

        let rest = &s[i..];
        let decoded = [
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&amp;", '&'),
            ("&quot;", '"'),
            ("&apos;", '\''),
        ]
        .iter()
        .find(|(name, _)| rest.starts_with(name));

        match decoded {
            Some((name, c)) => {
                out.push(*c);
                i += name.len();
            }
            None => {
                out.push('&');
                i += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_pairs_in_order() {
        let xml = "<items>\n<markdown># Hi</markdown>\n<html>&lt;h1&gt;Hi&lt;/h1&gt;</html>\n</items>";
        let mut pos = 0;

        assert_eq!(
            element_text(xml, &mut pos, "markdown").as_deref(),
            Some("# Hi")
        );
        assert_eq!(
            element_text(xml, &mut pos, "html").as_deref(),
            Some("<h1>Hi</h1>")
        );
        assert_eq!(element_text(xml, &mut pos, "markdown"), None);
    }

    #[test]
    fn unescapes_xml_entities() {
        assert_eq!(unescape_xml("a &amp;&lt;b&gt; &quot;c&quot;"), "a &<b> \"c\"");
        assert_eq!(unescape_xml("&unknown;"), "&unknown;");
    }
}

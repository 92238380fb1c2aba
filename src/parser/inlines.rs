//! The inline parser.
//!
//! A [`Subject`] advances a read cursor over a block's raw text and appends
//! decoded fragments to an output buffer: code spans, links, images,
//! autolinks, raw HTML passes, escapes, entities and hard breaks.  Emphasis
//! delimiters are emitted verbatim and recorded as [`Delimiter`] entries
//! whose positions index the output buffer; a second pass splices the
//! `<em>`/`<strong>` tags in.  Unmatched constructs come out as literal
//! text, so rendering is total.

use unicode_categories::UnicodeCategories;

use crate::character;
use crate::parser::RefMap;
use crate::scanners;
use crate::strings;

/// Render a block's raw text as inline HTML.
pub fn to_html(input: &str, refmap: &RefMap) -> String {
    Subject::new(input, refmap, true).render()
}

/// Render a block's raw text as plain text, the variant used for image
/// `alt` attributes: emphasis framing is dropped and links and images
/// reduce to their text.
pub fn to_plain(input: &str, refmap: &RefMap) -> String {
    Subject::new(input, refmap, false).render()
}

/// Entity-escape code block or code span contents.
pub fn code_to_html(input: &str) -> String {
    character::escape_html(input)
}

/// Resolve a reference link against the map: the rendered link text inside
/// an `<a>` with the stored destination and optional title.  `None` when
/// the label has no definition.
pub fn link_text(refmap: &RefMap, label: &str, text: Option<&str>) -> Option<String> {
    let reference = refmap.lookup(label)?;
    let inner = to_html(text.unwrap_or(label), refmap);

    Some(if reference.title.is_empty() {
        format!(
            "<a href=\"{}\">{}</a>",
            scanners::percent_encode(&reference.url),
            inner
        )
    } else {
        format!(
            "<a href=\"{}\" title=\"{}\">{}</a>",
            scanners::percent_encode(&reference.url),
            character::escape_html(&reference.title),
            inner
        )
    })
}

/// Resolve a reference image: `<img>` with the label (or the given
/// description) rendered as plain text for the `alt` attribute.
pub fn image_text(refmap: &RefMap, label: &str, description: Option<&str>) -> Option<String> {
    let reference = refmap.lookup(label)?;
    let alt = to_plain(description.unwrap_or(label), refmap);

    Some(if reference.title.is_empty() {
        format!(
            "<img src=\"{}\" alt=\"{}\" />",
            scanners::percent_encode(&reference.url),
            alt
        )
    } else {
        format!(
            "<img src=\"{}\" alt=\"{}\" title=\"{}\" />",
            scanners::percent_encode(&reference.url),
            alt,
            character::escape_html(&reference.title)
        )
    })
}

/// A candidate emphasis delimiter run: where it sits in the output buffer,
/// which tag it will carry, and whether it has found its mate.
#[derive(Debug)]
struct Delimiter {
    delim: u8,
    count: usize,
    tag: &'static str,
    begin: usize,
    end: Option<usize>,
}

struct Subject<'r> {
    input: &'r str,
    refmap: &'r RefMap,
    html: bool,
    out: String,
    delims: Vec<Delimiter>,
    pending: Vec<usize>,
}

impl<'r> Subject<'r> {
    fn new(input: &'r str, refmap: &'r RefMap, html: bool) -> Self {
        Subject {
            input,
            refmap,
            html,
            out: String::with_capacity(input.len()),
            delims: Vec::new(),
            pending: Vec::new(),
        }
    }

    fn render(mut self) -> String {
        let bytes = self.input.as_bytes();
        let len = self.input.len();

        let mut i = 0;
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        self.out.push_str(&self.input[..i]);

        while i < len {
            match bytes[i] {
                b'<' => i = self.angle_bracket(i),
                b'[' => i = self.link(i),
                b'!' => i = self.image_or_literal(i),
                b'`' => i = self.code_span(i),
                b'\\' => i = self.backslash(i),
                b'&' => i = self.entity(i),
                b'"' | b'>' => {
                    self.out
                        .push_str(character::escape_html_char(bytes[i] as char).unwrap());
                    i += 1;
                }
                b' ' => i = self.whitespace(i),
                b'*' | b'_' => i = self.emphasis(i),
                _ => {
                    let c = self.char_at(i);
                    self.out.push(c);
                    i += c.len_utf8();
                }
            }
        }

        self.splice()
    }

    fn char_at(&self, pos: usize) -> char {
        self.input[pos..].chars().next().unwrap()
    }

    fn next_char(&self, pos: usize) -> Option<char> {
        self.input[pos.min(self.input.len())..].chars().next()
    }

    fn prev_out_char(&self) -> Option<char> {
        self.out.chars().next_back()
    }

    //////////////////////////
    // Angle-bracket spans  //
    //////////////////////////

    fn angle_bracket(&mut self, begin: usize) -> usize {
        if let Some(end) = self.autolink(begin) {
            return end;
        }

        let end = scanners::skip_html_span(self.input, begin);
        if end != begin {
            self.out.push_str(&self.input[begin..end]);
            return end;
        }

        self.out.push_str("&lt;");
        begin + 1
    }

    fn autolink(&mut self, begin: usize) -> Option<usize> {
        let bytes = self.input.as_bytes();
        let len = self.input.len();

        if begin + 1 >= len || (bytes[begin + 1] as char).is_whitespace() {
            return None;
        }

        let mut pos = begin + 1;
        while pos < len {
            match bytes[pos] {
                b':' => {
                    return if pos - begin > 2 {
                        self.apply_autolink(begin, pos, false)
                    } else {
                        None
                    }
                }
                b'@' => {
                    return if pos - begin > 2 {
                        self.apply_autolink(begin, pos, true)
                    } else {
                        None
                    }
                }
                c if c.is_ascii_alphanumeric() || c == b'-' || c == b'+' => pos += 1,
                _ => return None,
            }
        }

        None
    }

    fn apply_autolink(&mut self, begin: usize, mut pos: usize, email: bool) -> Option<usize> {
        let bytes = self.input.as_bytes();

        pos += 1;
        while pos < self.input.len() {
            match bytes[pos] {
                b'<' => return None,
                b'>' => {
                    let uri = &self.input[begin + 1..pos];
                    if self.html {
                        if email {
                            self.out
                                .push_str(&format!("<a href=\"mailto:{}\">{}</a>", uri, uri));
                        } else {
                            self.out.push_str(&format!(
                                "<a href=\"{}\">{}</a>",
                                scanners::percent_encode(uri),
                                character::escape_html(uri.trim_start())
                            ));
                        }
                    } else {
                        self.out.push_str(uri);
                    }
                    return Some(pos + 1);
                }
                c if (c as char).is_whitespace() => return None,
                _ => pos += 1,
            }
        }

        None
    }

    ///////////
    // Links //
    ///////////

    /// Collect the text between balanced brackets starting at `begin`
    /// (which holds `[`), returning the raw label and the position of the
    /// closing bracket.  Backslash pairs are kept, backtick spans are
    /// opaque, and a nested image is included whole so its brackets do not
    /// count.
    fn scan_link_label(&self, begin: usize) -> Option<(String, usize)> {
        let bytes = self.input.as_bytes();
        let len = self.input.len();
        let mut label = String::new();
        let mut count = 1;
        let mut pos = begin + 1;

        while pos < len {
            match bytes[pos] {
                b'\\' => {
                    label.push('\\');
                    pos += 1;
                    if pos < len {
                        let c = self.char_at(pos);
                        label.push(c);
                        pos += c.len_utf8();
                    }
                }
                b'[' => {
                    count += 1;
                    label.push('[');
                    pos += 1;
                }
                b']' => {
                    count -= 1;
                    if count <= 0 {
                        return Some((label, pos));
                    }
                    if pos + 1 >= len || matches!(bytes[pos + 1], b'(' | b'[') {
                        return None;
                    }
                    label.push(']');
                    pos += 1;
                }
                b'!' => {
                    if let Some(end) = image_extent(self.input, pos) {
                        label.push_str(&self.input[pos..end]);
                        pos = end;
                    } else {
                        label.push('!');
                        pos += 1;
                    }
                }
                b'`' => {
                    label.push('`');
                    loop {
                        pos += 1;
                        if pos >= len {
                            return None;
                        }
                        let c = self.char_at(pos);
                        label.push(c);
                        pos += c.len_utf8();
                        if c == '\\' {
                            if pos < len {
                                let e = self.char_at(pos);
                                label.push(e);
                                pos += e.len_utf8();
                            }
                        } else if c == '`' {
                            break;
                        }
                    }
                }
                _ => {
                    let c = self.char_at(pos);
                    label.push(c);
                    pos += c.len_utf8();
                }
            }
        }

        None
    }

    fn link(&mut self, begin: usize) -> usize {
        match self.try_link(begin) {
            Some(end) => end,
            None => {
                self.out.push('[');
                begin + 1
            }
        }
    }

    fn try_link(&mut self, begin: usize) -> Option<usize> {
        let (label, close) = self.scan_link_label(begin)?;
        let bytes = self.input.as_bytes();

        // Full reference form: [text][label].
        if bytes.get(close + 1) == Some(&b'[') {
            let (reference, ref_close) = self.scan_link_label(close + 1)?;
            let key = if reference.trim().is_empty() {
                label.clone()
            } else {
                reference
            };

            let rendered = link_text(self.refmap, &key, Some(&label))?;
            if self.html {
                self.out.push_str(&rendered);
            } else {
                self.out.push_str(&to_plain(&label, self.refmap));
            }
            return Some(ref_close + 1);
        }

        // Inline form: [text](dest "title").
        if bytes.get(close + 1) == Some(&b'(') {
            if let Some(end) = self.inline_link_or_image(begin, close, &label, false) {
                return Some(end);
            }
        }

        // Shortcut reference: [label].
        let rendered = link_text(self.refmap, &label, None)?;
        if self.html {
            self.out.push_str(&rendered);
        } else {
            self.out.push_str(&to_plain(&label, self.refmap));
        }
        Some(close + 1)
    }

    fn image_or_literal(&mut self, begin: usize) -> usize {
        if self.input.as_bytes().get(begin + 1) != Some(&b'[') {
            self.out.push('!');
            return begin + 1;
        }

        match self.try_image(begin) {
            Some(end) => end,
            None => {
                self.out.push('!');
                begin + 1
            }
        }
    }

    fn try_image(&mut self, begin: usize) -> Option<usize> {
        let close = balanced_bracket_end(self.input, begin + 1)?;
        let label = self.input[begin + 2..close].trim().to_string();
        let bytes = self.input.as_bytes();

        if bytes.get(close + 1) == Some(&b'[') {
            let (reference, ref_close) = self.scan_link_label(close + 1)?;
            let key = if reference.trim().is_empty() {
                label.clone()
            } else {
                reference
            };

            let rendered = image_text(self.refmap, &key, Some(&label))?;
            if self.html {
                self.out.push_str(&rendered);
            } else {
                self.out.push_str(&to_plain(&label, self.refmap));
            }
            return Some(ref_close + 1);
        }

        if bytes.get(close + 1) == Some(&b'(') {
            if let Some(end) = self.inline_link_or_image(begin, close, &label, true) {
                return Some(end);
            }
        }

        let rendered = image_text(self.refmap, &label, None)?;
        if self.html {
            self.out.push_str(&rendered);
        } else {
            self.out.push_str(&to_plain(&label, self.refmap));
        }
        Some(close + 1)
    }

    /// The `(dest "title")` tail shared by inline links and images.
    /// `close` is the position of the label's `]`.
    fn inline_link_or_image(
        &mut self,
        _begin: usize,
        close: usize,
        label: &str,
        image: bool,
    ) -> Option<usize> {
        let (mut pos, dest) = self.scan_inline_destination(close + 1)?;
        let bytes = self.input.as_bytes();

        let title = if bytes.get(pos) == Some(&b')') {
            None
        } else {
            let (title_end, title) = self.scan_inline_title(pos)?;
            pos = title_end;
            Some(title)
        };

        if bytes.get(pos) != Some(&b')') {
            return None;
        }

        if !self.html {
            self.out.push_str(&to_plain(label, self.refmap));
            return Some(pos + 1);
        }

        let url = scanners::percent_encode(&dest);
        if image {
            let alt = to_plain(label, self.refmap);
            match title {
                None => self
                    .out
                    .push_str(&format!("<img src=\"{}\" alt=\"{}\" />", url, alt)),
                Some(t) => self.out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\" title=\"{}\" />",
                    url,
                    alt,
                    character::escape_html(&t)
                )),
            }
        } else {
            let inner = to_html(label, self.refmap);
            match title {
                None => self
                    .out
                    .push_str(&format!("<a href=\"{}\">{}</a>", url, inner)),
                Some(t) => self.out.push_str(&format!(
                    "<a href=\"{}\" title=\"{}\">{}</a>",
                    url,
                    character::escape_html(&t),
                    inner
                )),
            }
        }

        Some(pos + 1)
    }

    /// Parse `(destination` leaving the cursor at the `)`, a title opener,
    /// or wherever the whitespace after the destination ended.
    fn scan_inline_destination(&self, begin: usize) -> Option<(usize, String)> {
        let bytes = self.input.as_bytes();
        let len = self.input.len();

        if begin >= len || bytes[begin] != b'(' {
            return None;
        }

        let mut pos = begin;
        loop {
            pos += 1;
            if pos >= len {
                return None;
            }
            if !matches!(bytes[pos], b' ' | b'\n') {
                break;
            }
        }

        let mut dest = String::new();
        let mut count = 1;
        let required_end = if bytes[pos] == b'<' {
            pos += 1;
            if pos >= len {
                return None;
            }
            Some(b'>')
        } else {
            None
        };

        while pos < len {
            let c = bytes[pos];

            if required_end == Some(c) {
                return Some((pos + 1, dest));
            }

            if required_end.is_some() {
                // An angle-bracketed destination may contain spaces but
                // not newlines or a stray `<`.
                if c == b'\n' || c == b'<' {
                    return None;
                }
            } else if matches!(c, b' ' | b'\n') {
                while pos < len && matches!(bytes[pos], b' ' | b'\n') {
                    pos += 1;
                }
                return Some((pos, dest));
            } else if c == b')' {
                count -= 1;
                if count <= 0 {
                    return Some((pos, dest));
                }
            } else if c == b'(' {
                count += 1;
            }

            if let Some(e) = character::scan_backslash(&self.input[pos..])
                .or_else(|| character::scan_entity(&self.input[pos..]))
            {
                dest.push_str(&e.text);
                pos += e.len;
                continue;
            }

            let ch = self.char_at(pos);
            dest.push(ch);
            pos += ch.len_utf8();
        }

        None
    }

    /// Parse a `"title"`, `'title'` or `(title)` leaving the cursor at the
    /// closing `)` of the link.
    fn scan_inline_title(&self, begin: usize) -> Option<(usize, String)> {
        let bytes = self.input.as_bytes();
        let len = self.input.len();

        if begin + 1 >= len {
            return None;
        }

        let close = match bytes[begin] {
            c @ (b'\'' | b'"') => c,
            b'(' => b')',
            _ => return None,
        };

        let mut title = String::new();
        let mut pos = begin + 1;
        while pos < len {
            if bytes[pos] == close {
                pos += 1;
                while pos < len {
                    match bytes[pos] {
                        b')' => return Some((pos, title)),
                        b' ' | b'\n' => pos += 1,
                        _ => return None,
                    }
                }
                return None;
            }

            if let Some(e) = character::scan_backslash(&self.input[pos..])
                .or_else(|| character::scan_entity(&self.input[pos..]))
            {
                title.push_str(&e.text);
                pos += e.len;
                continue;
            }

            let c = self.char_at(pos);
            title.push(c);
            pos += c.len_utf8();
        }

        None
    }

    ////////////////
    // Code spans //
    ////////////////

    fn code_span(&mut self, begin: usize) -> usize {
        let bytes = self.input.as_bytes();
        let len = self.input.len();

        let mut open = begin;
        while open < len && bytes[open] == b'`' {
            open += 1;
        }
        let n = open - begin;

        // Find the next backtick run of exactly the opening length.
        let mut pos = open;
        let close = loop {
            if pos >= len {
                // No closer: the rest of the text passes through untouched.
                self.out.push_str(&self.input[begin..]);
                return len;
            }
            if bytes[pos] == b'`' {
                let run_start = pos;
                while pos < len && bytes[pos] == b'`' {
                    pos += 1;
                }
                if pos - run_start == n {
                    break run_start;
                }
            } else {
                pos += 1;
            }
        };

        let content = strings::collapse_whitespace(self.input[open..close].trim());
        self.out.push_str("<code>");
        self.out.push_str(&character::escape_html(&content));
        self.out.push_str("</code>");

        close + n
    }

    //////////////////////////
    // Escapes and entities //
    //////////////////////////

    fn backslash(&mut self, begin: usize) -> usize {
        if self.input.as_bytes().get(begin + 1) == Some(&b'\n') {
            self.out.push_str("<br />\n");
            return begin + 2;
        }

        let e = character::scan_backslash(&self.input[begin..]).unwrap();
        character::escape_html_into(&mut self.out, &e.text);
        begin + e.len
    }

    fn entity(&mut self, begin: usize) -> usize {
        match character::scan_entity(&self.input[begin..]) {
            Some(e) => {
                character::escape_html_into(&mut self.out, &e.text);
                begin + e.len
            }
            None => {
                self.out.push_str("&amp;");
                begin + 1
            }
        }
    }

    ////////////////
    // Whitespace //
    ////////////////

    /// A run of spaces and tabs: dropped at the end of the text, turned
    /// into a hard break before a newline when two or more columns wide,
    /// passed through otherwise.
    fn whitespace(&mut self, begin: usize) -> usize {
        let bytes = self.input.as_bytes();
        let len = self.input.len();

        let mut end = begin;
        while end < len && matches!(bytes[end], b' ' | b'\t') {
            end += 1;
        }

        if end >= len {
            return end;
        }

        if bytes[end] == b'\n' {
            if end - begin >= 2 {
                self.out.push_str("<br />");
            }
            // The newline and any following indentation pass through
            // unscanned.
            let mut pos = end;
            while pos < len && matches!(bytes[pos], b' ' | b'\t' | b'\n') {
                pos += 1;
            }
            self.out.push_str(&self.input[end..pos]);
            return pos;
        }

        self.out.push_str(&self.input[begin..end]);
        end
    }

    //////////////
    // Emphasis //
    //////////////

    fn emphasis(&mut self, begin: usize) -> usize {
        let c = self.input.as_bytes()[begin];
        let p = self.out.len();

        let continued = self
            .pending
            .last()
            .map_or(false, |&idx| self.delims[idx].delim == c && self.delims[idx].begin + 1 == p);

        if !continued {
            if let Some(consumed) = self.close_delimiter(begin, c) {
                for _ in 0..consumed {
                    self.out.push(c as char);
                }
                return begin + consumed;
            }
        }

        if begin + 1 < self.input.len() {
            if let Some(consumed) = self.open_delimiter(begin, c) {
                for _ in 0..consumed {
                    self.out.push(c as char);
                }
                return begin + consumed;
            }
        }

        // Neither closes nor opens: literal.
        let double = self.input.as_bytes().get(begin + 1) == Some(&c);
        let consumed = if double { 2 } else { 1 };
        for _ in 0..consumed {
            self.out.push(c as char);
        }
        begin + consumed
    }

    fn open_delimiter(&mut self, begin: usize, c: u8) -> Option<usize> {
        let p = self.out.len();
        let double = self.input.as_bytes()[begin + 1] == c;

        if double {
            if self.can_open(begin, 2, c) {
                self.delims.push(Delimiter {
                    delim: c,
                    count: 1,
                    tag: "em",
                    begin: p,
                    end: None,
                });
                self.pending.push(self.delims.len() - 1);
                self.delims.push(Delimiter {
                    delim: c,
                    count: 1,
                    tag: "em",
                    begin: p + 1,
                    end: None,
                });
                self.pending.push(self.delims.len() - 1);
                return Some(2);
            }
            return None;
        }

        if self.can_open(begin, 1, c) {
            self.delims.push(Delimiter {
                delim: c,
                count: 1,
                tag: "em",
                begin: p,
                end: None,
            });
            self.pending.push(self.delims.len() - 1);
            return Some(1);
        }

        None
    }

    fn can_open(&self, begin: usize, size: usize, c: u8) -> bool {
        if !self.left_flanking(begin, size) {
            return false;
        }
        if c != b'_' {
            return true;
        }
        // Intra-word underscores do not open unless preceded by
        // punctuation.
        !self.right_flanking(begin, size)
            || self.prev_out_char().map_or(false, |p| p.is_punctuation())
    }

    fn can_close(&self, begin: usize, size: usize, c: u8) -> bool {
        if !self.right_flanking(begin, size) {
            return false;
        }
        if c != b'_' {
            return true;
        }
        !self.left_flanking(begin, size)
            || self
                .next_char(begin + size)
                .map_or(false, |f| f.is_punctuation())
    }

    fn left_flanking(&self, begin: usize, size: usize) -> bool {
        let followed = match self.next_char(begin + size) {
            Some(f) => f,
            None => return false,
        };

        if followed.is_whitespace() {
            return false;
        }
        if !followed.is_punctuation() || self.out.is_empty() {
            return true;
        }

        self.prev_out_char()
            .map_or(true, |p| p.is_whitespace() || p.is_punctuation())
    }

    fn right_flanking(&self, begin: usize, size: usize) -> bool {
        let preceded = match self.prev_out_char() {
            Some(p) => p,
            None => return false,
        };

        if preceded.is_whitespace() {
            return false;
        }
        if !preceded.is_punctuation() {
            return true;
        }

        self.next_char(begin + size)
            .map_or(true, |f| f.is_whitespace() || f.is_punctuation())
    }

    /// Match a closing run against the innermost compatible opener.
    /// Returns how many delimiter characters the close consumed, or `None`
    /// when nothing closed (openers popped along the way are restored).
    fn close_delimiter(&mut self, begin: usize, c: u8) -> Option<usize> {
        let mut stack: Vec<usize> = Vec::new();

        let inner = loop {
            match self.pending.pop() {
                None => {
                    self.restore(stack);
                    return None;
                }
                Some(idx) => {
                    stack.push(idx);
                    if self.delims[idx].delim == c {
                        break idx;
                    }
                }
            }
        };

        if let Some(&outer) = self.pending.last() {
            let adjacent = self.delims[outer].delim == self.delims[inner].delim
                && self.delims[outer].begin + 1 == self.delims[inner].begin;

            if adjacent && self.left_flanking(begin, 1) && self.right_flanking(begin, 1) {
                if self.close_strong(outer, inner, begin, c) {
                    self.pending.pop();
                    return Some(2);
                }
                self.restore(stack);
                return None;
            }

            if self.close_strong(outer, inner, begin, c) {
                self.pending.pop();
                return Some(2);
            }
        }

        if self.close_single(inner, begin, c) {
            return Some(1);
        }

        self.restore(stack);
        None
    }

    fn restore(&mut self, mut stack: Vec<usize>) {
        while let Some(idx) = stack.pop() {
            self.pending.push(idx);
        }
    }

    fn close_single(&mut self, inner: usize, begin: usize, c: u8) -> bool {
        let bytes = self.input.as_bytes();

        // A single delimiter facing a longer run only closes when the run
        // continues to the end of the text.
        if bytes.get(begin + 1) == Some(&c) && !self.input[begin + 2..].bytes().all(|b| b == c) {
            return false;
        }

        if self.delims[inner].delim != c || !self.can_close(begin, 1, c) {
            return false;
        }

        let p = self.out.len();
        self.delims[inner].end = Some(p + self.delims[inner].count);
        true
    }

    fn close_strong(&mut self, outer: usize, inner: usize, begin: usize, c: u8) -> bool {
        let bytes = self.input.as_bytes();

        if bytes.get(begin + 1) != Some(&c)
            || self.delims[outer].delim != c
            || self.delims[inner].delim != c
            || self.delims[outer].begin + 1 != self.delims[inner].begin
            || !self.can_close(begin, 2, c)
        {
            return false;
        }

        let p = self.out.len();
        self.delims[inner].end = None;
        self.delims[outer].count = 2;
        self.delims[outer].end = Some(p + 2);
        self.delims[outer].tag = "strong";
        true
    }

    /// Rebuild the output, inserting emphasis tags at the recorded
    /// positions.  Incomplete records pass their delimiter characters
    /// through as literal text.
    fn splice(self) -> String {
        let complete: Vec<&Delimiter> =
            self.delims.iter().filter(|d| d.end.is_some()).collect();
        if complete.is_empty() {
            return self.out;
        }

        let mut result = String::with_capacity(self.out.len() + 16 * complete.len());
        let mut last_pos = 0;
        let mut stack: Vec<&Delimiter> = Vec::new();

        for d in complete {
            while let Some(&top) = stack.last() {
                let top_end = top.end.unwrap();
                if top_end > d.begin {
                    break;
                }
                stack.pop();
                last_pos = self.emit_right(&mut result, top, last_pos);
            }

            result.push_str(slice_between(&self.out, last_pos, d.begin));
            if self.html {
                result.push('<');
                result.push_str(d.tag);
                result.push('>');
            }
            last_pos = d.begin + d.count;
            stack.push(d);
        }

        while let Some(top) = stack.pop() {
            last_pos = self.emit_right(&mut result, top, last_pos);
        }

        result.push_str(slice_between(&self.out, last_pos, self.out.len()));
        result
    }

    fn emit_right(&self, result: &mut String, d: &Delimiter, last_pos: usize) -> usize {
        let end = d.end.unwrap();
        result.push_str(slice_between(&self.out, last_pos, end - d.count));
        if self.html {
            result.push_str("</");
            result.push_str(d.tag);
            result.push('>');
        }
        end
    }
}

fn slice_between(s: &str, from: usize, to: usize) -> &str {
    if from >= to {
        ""
    } else {
        &s[from..to]
    }
}

/// The extent of a whole image construct (`![…]`, optionally followed by
/// `(…)` or `[…]`) so a label scan can step over it without counting its
/// brackets.
fn image_extent(input: &str, begin: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    let len = input.len();

    if begin + 1 >= len || bytes[begin] != b'!' || bytes[begin + 1] != b'[' {
        return None;
    }

    let close = balanced_bracket_end(input, begin + 1)?;

    match bytes.get(close + 1) {
        Some(&b'(') => {
            let mut pos = close + 2;
            let mut count = 1;
            while pos < len {
                match bytes[pos] {
                    b'\\' => pos += 1,
                    b'(' => count += 1,
                    b')' => {
                        count -= 1;
                        if count == 0 {
                            return Some(pos + 1);
                        }
                    }
                    _ => (),
                }
                pos += 1;
            }
            None
        }
        Some(&b'[') => balanced_bracket_end(input, close + 1).map(|end| end + 1),
        _ => Some(close + 1),
    }
}

fn balanced_bracket_end(input: &str, begin: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    let len = input.len();

    if begin >= len || bytes[begin] != b'[' {
        return None;
    }

    let mut count = 1;
    let mut pos = begin + 1;
    while pos < len {
        match bytes[pos] {
            b'\\' => pos += 1,
            b'[' => count += 1,
            b']' => {
                count -= 1;
                if count == 0 {
                    return Some(pos);
                }
            }
            b'`' => loop {
                pos += 1;
                if pos >= len {
                    return None;
                }
                match bytes[pos] {
                    b'\\' => pos += 1,
                    b'`' => break,
                    _ => (),
                }
            },
            _ => (),
        }
        pos += 1;
    }

    None
}

//! The process-wide HTML block tag catalogue: compiled open/close patterns
//! for block types 1 through 5 and the tag-name list for type 6.

use once_cell::sync::Lazy;
use regex::Regex;

/// Which closing condition an open HTML block of type 1–5 is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlCloser {
    Type1,
    Comment,
    ProcessingInstruction,
    Declaration,
    Cdata,
}

pub struct HtmlTagSet {
    pub type1_close: Regex,
    openers: Vec<(Regex, HtmlCloser)>,
    closers: Vec<(HtmlCloser, Regex)>,
    pub type6_names: &'static [&'static str],
}

pub static TYPE6_NAMES: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "meta", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "section",
    "source", "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track",
    "ul",
];

static CATALOGUE: Lazy<HtmlTagSet> = Lazy::new(|| HtmlTagSet {
    type1_close: Regex::new(r"(?i)</(script|pre|style)>").unwrap(),
    openers: vec![
        (
            Regex::new(r"(?i)^[ \t]*<(script|pre|style)([ \t>].*|)$").unwrap(),
            HtmlCloser::Type1,
        ),
        (Regex::new(r"^[ \t]*<!--").unwrap(), HtmlCloser::Comment),
        (
            Regex::new(r"^[ \t]*<\?").unwrap(),
            HtmlCloser::ProcessingInstruction,
        ),
        (Regex::new(r"^[ \t]*<![A-Z]").unwrap(), HtmlCloser::Declaration),
        (Regex::new(r"^[ \t]*<!\[CDATA\[").unwrap(), HtmlCloser::Cdata),
    ],
    closers: vec![
        (
            HtmlCloser::Type1,
            Regex::new(r"(?i)</(script|pre|style)>").unwrap(),
        ),
        (HtmlCloser::Comment, Regex::new(r"-->").unwrap()),
        (HtmlCloser::ProcessingInstruction, Regex::new(r"\?>").unwrap()),
        (HtmlCloser::Declaration, Regex::new(r">").unwrap()),
        (HtmlCloser::Cdata, Regex::new(r"\]\]>").unwrap()),
    ],
    type6_names: TYPE6_NAMES,
});

pub fn catalogue() -> &'static HtmlTagSet {
    &CATALOGUE
}

impl HtmlTagSet {
    pub fn openers(&self) -> impl Iterator<Item = (&Regex, HtmlCloser)> {
        self.openers.iter().map(|(re, c)| (re, *c))
    }

    pub fn closer(&self, kind: HtmlCloser) -> &Regex {
        &self
            .closers
            .iter()
            .find(|(k, _)| *k == kind)
            .expect("closer registered for every opener")
            .1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openers_match_their_types() {
        let tags = catalogue();
        let opens = |line: &str| {
            tags.openers()
                .find(|(re, _)| re.is_match(line))
                .map(|(_, c)| c)
        };

        assert_eq!(opens("<script src=\"x\">"), Some(HtmlCloser::Type1));
        assert_eq!(opens("  <!-- note"), Some(HtmlCloser::Comment));
        assert_eq!(opens("<?php"), Some(HtmlCloser::ProcessingInstruction));
        assert_eq!(opens("<!DOCTYPE html>"), Some(HtmlCloser::Declaration));
        assert_eq!(opens("<![CDATA[data"), Some(HtmlCloser::Cdata));
        assert_eq!(opens("<div>"), None);
    }

    #[test]
    fn closers_match_anywhere_in_line() {
        let tags = catalogue();
        assert!(tags.closer(HtmlCloser::Type1).is_match("x</script>y"));
        assert!(tags.closer(HtmlCloser::Comment).is_match("done --> tail"));
        assert!(tags.closer(HtmlCloser::Cdata).is_match("d ]]>"));
        assert!(!tags.closer(HtmlCloser::Comment).is_match("-- >"));
    }

    #[test]
    fn type6_list_is_sorted() {
        let mut sorted = TYPE6_NAMES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, TYPE6_NAMES);
    }
}

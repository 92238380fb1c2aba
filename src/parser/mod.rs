//! The block parser.
//!
//! Each input line is dispatched through the currently open branch of the
//! block tree: blank-line handling first, then indented code, leaf blocks,
//! container openers, and finally the heading/paragraph fallback.  Deeper
//! blocks end only by unwinding, which closes the current container and
//! moves the cursor to its parent.  The link reference map is populated
//! here as paragraphs close and consulted by the inline parser during
//! rendering.

pub mod inlines;

use std::collections::HashMap;

use crate::htmltag;
use crate::line::LineScanner;
use crate::nodes::{
    make_block, Arena, BlockValue, Node, NodeBulletItem, NodeBulletList, NodeFencedCode,
    NodeHeading, NodeHtmlBlock, NodeIndentedCode, NodeOrderedItem, NodeOrderedList,
};
use crate::scanners;
use crate::strings;

pub const CODE_INDENT: usize = 4;

/// A link reference definition's resolved destination and optional title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub url: String,
    pub title: String,
}

/// The per-document link reference table.  Labels are stored lowercased
/// with internal whitespace collapsed; the first definition of a label
/// wins.
#[derive(Debug, Default)]
pub struct RefMap {
    map: HashMap<String, Reference>,
}

impl RefMap {
    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn define(&mut self, label: &str, url: String, title: String) {
        let key = strings::normalize_label(label);
        if key.is_empty() {
            return;
        }
        self.map.entry(key).or_insert(Reference { url, title });
    }

    pub fn lookup(&self, label: &str) -> Option<&Reference> {
        self.map.get(&strings::normalize_label(label))
    }
}

/// Parse a whole document into a block tree, registering link reference
/// definitions in `refmap` as paragraphs close.
pub fn parse_document(md: &str, refmap: &mut RefMap) -> (Arena, Node) {
    let mut arena = Arena::new();
    let root = arena.alloc(make_block(BlockValue::Body, 0, 0));

    let mut parser = BlockParser {
        arena,
        root,
        current: root,
        refmap,
    };

    for line in md.split('\n') {
        parser.process_line(line);
    }

    while parser.unwind() {}
    parser.close(root);

    (parser.arena, root)
}

struct BlockParser<'r> {
    arena: Arena,
    root: Node,
    current: Node,
    refmap: &'r mut RefMap,
}

impl<'r> BlockParser<'r> {
    fn process_line(&mut self, line: &str) {
        let mut ls = LineScanner::new(line);

        if self.dispatch_blank_line(self.current, &ls) {
            return;
        }

        loop {
            if self.dispatch_indented_code(self.current, &ls)
                || self.dispatch_leaf_block(self.current, &mut ls)
            {
                break;
            }

            ls.skip_whitespace();

            if !self.dispatch_container_block(self.current, &mut ls) {
                self.dispatch_heading_and_paragraph(self.current, &mut ls);
                break;
            }
        }
    }

    ////////////////
    // Unwinding  //
    ////////////////

    fn unwind(&mut self) -> bool {
        let parent = match self.current.parent(&self.arena) {
            Some(p) => p,
            None => return false,
        };

        self.close(self.current);
        self.current = parent;
        true
    }

    fn unwind_until(&mut self, indent: usize) {
        while indent < self.current.data(&self.arena).indent {
            if !self.unwind() {
                break;
            }
        }
    }

    /////////////
    // Closing //
    /////////////

    fn close(&mut self, node: Node) {
        if node.is_paragraph(&self.arena) {
            self.close_paragraph(node);
            return;
        }

        if node.data(&self.arena).value.is_container() {
            if let Some(last) = node.last_child(&self.arena) {
                if last.is_writable(&self.arena) {
                    self.close(last);
                }
            }
        }

        node.disable(&mut self.arena);
    }

    /// Peel leading `[label]: destination "title"` definitions off a
    /// closing paragraph, registering each in the reference map.  A
    /// paragraph emptied entirely by definitions is removed from its
    /// parent.
    fn close_paragraph(&mut self, node: Node) {
        if !node.is_writable(&self.arena) {
            return;
        }

        let text = std::mem::take(&mut node.data_mut(&mut self.arena).content);
        let mut pos = 0;

        loop {
            let mut p = pos;
            let label = match scanners::find_link_label_followed_by(&text, &mut p, b':') {
                Some(label) if !label.is_empty() => label,
                _ => break,
            };
            let destination = match scanners::find_link_destination(&text, &mut p) {
                Some(d) => d,
                None => break,
            };
            let title = match scanners::find_link_title(&text, &mut p) {
                Some(t) => t.unwrap_or_default(),
                None => break,
            };

            self.refmap.define(&label, destination, title);
            pos = p;
        }

        if pos >= text.len() && pos > 0 {
            if let Some(parent) = node.parent(&self.arena) {
                parent.remove_last(&mut self.arena);
            }
        } else {
            node.data_mut(&mut self.arena).content = text[pos..].to_string();
        }

        node.disable(&mut self.arena);
    }

    /////////////////
    // Blank lines //
    /////////////////

    fn dispatch_blank_line(&mut self, node: Node, ls: &LineScanner) -> bool {
        if !ls.is_blank() {
            return false;
        }

        match node.data(&self.arena).value {
            BlockValue::BlockQuote => {
                self.unwind();
            }
            BlockValue::BulletItem(..) | BlockValue::OrderedItem(..) => {
                if node.is_empty(&self.arena) {
                    node.set_has_blank_line(&mut self.arena, true);
                    self.close(node);
                } else {
                    let last = node.last_child(&self.arena).unwrap();
                    self.handle_blank_line(last, ls);
                }
            }
            _ => {
                if let Some(last) = node.last_child(&self.arena) {
                    self.handle_blank_line(last, ls);
                }
            }
        }

        true
    }

    fn handle_blank_line(&mut self, node: Node, ls: &LineScanner) {
        enum Action {
            CloseParagraph,
            Disable,
            IndentedPending(usize),
            Fenced { writable: bool, indent: usize },
            HtmlAppend,
            CloseQuote,
            Nothing,
        }

        let action = match node.data(&self.arena).value {
            BlockValue::Paragraph => Action::CloseParagraph,
            BlockValue::Heading(..) => Action::Disable,
            BlockValue::IndentedCode(..) => {
                let parent_indent = node
                    .parent(&self.arena)
                    .map_or(0, |p| p.data(&self.arena).indent);
                Action::IndentedPending(CODE_INDENT + parent_indent)
            }
            BlockValue::FencedCode(ref f) => Action::Fenced {
                writable: node.is_writable(&self.arena),
                indent: f.fence_indent,
            },
            BlockValue::HtmlBlock(ref h) => {
                if h.closer.is_some() && node.is_writable(&self.arena) {
                    Action::HtmlAppend
                } else {
                    Action::Disable
                }
            }
            BlockValue::BlockQuote => Action::CloseQuote,
            _ => Action::Nothing,
        };

        match action {
            Action::CloseParagraph => {
                if let Some(parent) = node.parent(&self.arena) {
                    parent.set_has_blank_line(&mut self.arena, true);
                }
                self.close(node);
            }
            Action::Disable => node.disable(&mut self.arena),
            Action::IndentedPending(indent) => {
                let removed = ls.remove_indent(indent);
                let addition = if removed.indent() >= indent {
                    removed.current_text()
                } else {
                    String::new()
                };
                if let BlockValue::IndentedCode(ref mut ic) =
                    node.data_mut(&mut self.arena).value
                {
                    ic.pending.push('\n');
                    ic.pending.push_str(&addition);
                }
            }
            Action::Fenced { writable, indent } => {
                if writable {
                    let text = ls.remove_indent(indent).line_with_break_after();
                    node.data_mut(&mut self.arena).content.push_str(&text);
                } else if let Some(parent) = node.parent(&self.arena) {
                    parent.set_has_blank_line(&mut self.arena, true);
                }
            }
            Action::HtmlAppend => {
                let text = ls.line_with_break_before();
                node.data_mut(&mut self.arena).content.push_str(&text);
            }
            Action::CloseQuote => self.close(node),
            Action::Nothing => (),
        }
    }

    ///////////////////
    // Indented code //
    ///////////////////

    fn dispatch_indented_code(&mut self, node: Node, ls: &LineScanner) -> bool {
        match node.data(&self.arena).value {
            BlockValue::BulletList(..) | BlockValue::OrderedList(..) => {
                self.unwind() && self.dispatch_indented_code(self.current, ls)
            }
            BlockValue::BulletItem(..) | BlockValue::OrderedItem(..) => {
                self.dispatch_indented_code_item(node, ls)
            }
            BlockValue::BlockQuote => self.dispatch_indented_code_quote(node, ls),
            _ => self.dispatch_indented_code_base(node, ls),
        }
    }

    fn dispatch_indented_code_base(&mut self, node: Node, ls: &LineScanner) -> bool {
        let requirement = CODE_INDENT + node.data(&self.arena).indent;
        let removed = ls.remove_indent(requirement);

        if removed.indent() < requirement {
            return false;
        }

        self.accept_indented_text(node, ls, &removed);
        true
    }

    fn dispatch_indented_code_quote(&mut self, node: Node, ls: &LineScanner) -> bool {
        if !node.is_writable(&self.arena) {
            return false;
        }

        let requirement = CODE_INDENT + node.data(&self.arena).indent;
        let removed = ls.remove_indent(requirement);

        if removed.indent() < requirement {
            // Code-block-like indent with no `>` marker still continues an
            // open paragraph lazily.
            if removed.indent() >= CODE_INDENT && ls.depth() == 0 && !node.is_empty(&self.arena) {
                let mut copy = ls.clone();
                copy.skip_whitespace();
                let last = node.last_child(&self.arena).unwrap();
                return self.append_paragraph_text(last, &copy);
            }
            return false;
        }

        self.accept_indented_text(node, ls, &removed);
        true
    }

    fn dispatch_indented_code_item(&mut self, node: Node, ls: &LineScanner) -> bool {
        if !node.is_writable(&self.arena) {
            return false;
        }

        let requirement = CODE_INDENT + node.data(&self.arena).indent;
        let removed = ls.remove_indent(requirement);

        if node.data(&self.arena).depth != ls.depth() {
            return false;
        }

        if removed.indent() < requirement {
            let last_closed = node
                .last_child(&self.arena)
                .map_or(false, |last| !last.is_writable(&self.arena));

            if !node.is_empty(&self.arena) && last_closed {
                let mut copy = ls.clone();
                copy.skip_whitespace();
                let indent = copy.indent();

                if indent < node.data(&self.arena).indent {
                    if self.is_followed_by_sibling_marker(node, &copy, indent) {
                        return false;
                    }

                    self.unwind();
                    self.unwind();
                    return self.dispatch_indented_code(self.current, ls);
                }
            }
            return false;
        }

        self.accept_indented_text(node, ls, &removed);
        true
    }

    /// Whether the line opens a sibling item of `node` rather than falling
    /// out to the enclosing container.
    fn is_followed_by_sibling_marker(&self, node: Node, ls: &LineScanner, indent: usize) -> bool {
        match node.data(&self.arena).value {
            BlockValue::BulletItem(ref it) => {
                let mut copy = ls.clone();
                copy.find_bullet() == Some(it.bullet_char) && indent < it.base_indent + 1
            }
            BlockValue::OrderedItem(ref it) => {
                let mut copy = ls.clone();
                match copy.find_digit() {
                    Some(digit) => {
                        digit.as_bytes()[digit.len() - 1] == it.delimiter
                            && indent < it.base_indent + digit.len()
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    fn accept_indented_text(&mut self, node: Node, ls: &LineScanner, removed: &LineScanner) {
        if node.data(&self.arena).depth > ls.depth() {
            while self.current.data(&self.arena).depth > ls.depth() {
                if !self.unwind() {
                    break;
                }
            }
            let target = self.current;
            self.append_indented_code_child(target, removed);
            return;
        }

        match node.last_child(&self.arena) {
            Some(last) if self.append_indented_text(last, removed) => (),
            _ => self.append_indented_code_child(node, removed),
        }
    }

    fn append_indented_code_child(&mut self, container: Node, removed: &LineScanner) {
        let node = self.append_leaf(
            container,
            BlockValue::IndentedCode(NodeIndentedCode::default()),
            removed.indent(),
        );
        node.data_mut(&mut self.arena).content = removed.current_text();
    }

    /// Route an indented continuation to an open leaf; false sends it back
    /// to the container to start a fresh code block.
    fn append_indented_text(&mut self, node: Node, removed: &LineScanner) -> bool {
        enum Action {
            Paragraph,
            Indented,
            Fenced(usize),
            Html,
            Container,
            Refuse,
        }

        let action = match node.data(&self.arena).value {
            BlockValue::Paragraph if node.is_writable(&self.arena) => Action::Paragraph,
            BlockValue::IndentedCode(..) if node.is_writable(&self.arena) => Action::Indented,
            BlockValue::FencedCode(ref f) if node.is_writable(&self.arena) => {
                Action::Fenced(f.fence_indent)
            }
            BlockValue::HtmlBlock(..) => Action::Html,
            ref v if v.is_container() => Action::Container,
            _ => Action::Refuse,
        };

        match action {
            Action::Paragraph => {
                let mut copy = removed.clone();
                copy.skip_whitespace();
                let text = copy.line_with_break_before();
                node.data_mut(&mut self.arena).content.push_str(&text);
                true
            }
            Action::Indented => {
                let pending = match node.data_mut(&mut self.arena).value {
                    BlockValue::IndentedCode(ref mut ic) => std::mem::take(&mut ic.pending),
                    _ => unreachable!(),
                };
                let data = node.data_mut(&mut self.arena);
                data.content.push_str(&pending);
                let text = removed.line_with_break_before();
                data.content.push_str(&text);
                true
            }
            Action::Fenced(indent) => {
                let text = removed.remove_indent(indent).line_with_break_after();
                node.data_mut(&mut self.arena).content.push_str(&text);
                true
            }
            Action::Html => self.append_html_block_text(node, removed),
            Action::Container => {
                self.append_indented_code_child(node, removed);
                true
            }
            Action::Refuse => false,
        }
    }

    /////////////////
    // Leaf blocks //
    /////////////////

    fn dispatch_leaf_block(&mut self, node: Node, ls: &mut LineScanner) -> bool {
        self.dispatch_html_block(node, ls)
            || self.dispatch_fenced_code(node, ls)
            || self.dispatch_setext_heading(node, ls)
            || self.dispatch_thematic_break(node, ls)
            || self.append_fenced_code_text(node, ls)
            || self.append_html_continuation(node, ls)
    }

    fn append_html_continuation(&mut self, node: Node, ls: &LineScanner) -> bool {
        match node.last_child(&self.arena) {
            Some(last) => self.append_html_block_text(last, ls),
            None => false,
        }
    }

    fn dispatch_html_block(&mut self, node: Node, ls: &LineScanner) -> bool {
        let tags = htmltag::catalogue();

        if let Some(last) = node.last_child(&self.arena) {
            if self.close_html_block(last, ls) || self.append_html_block_text(last, ls) {
                return true;
            }
        }

        if ls.is_autolink() {
            return false;
        }

        for (open, closer) in tags.openers() {
            if ls.match_html_open_tag(open) {
                let block = self.append_leaf(
                    node,
                    BlockValue::HtmlBlock(NodeHtmlBlock {
                        closer: Some(closer),
                    }),
                    ls.indent(),
                );
                block.data_mut(&mut self.arena).content = ls.current_text();

                if ls.match_html_close_tag(tags.closer(closer)) {
                    block.disable(&mut self.arena);
                }

                return true;
            }
        }

        if ls.match_html_tag(tags.type6_names) {
            let block = self.append_leaf(
                node,
                BlockValue::HtmlBlock(NodeHtmlBlock { closer: None }),
                ls.indent(),
            );
            block.data_mut(&mut self.arena).content = ls.current_text();
            return true;
        }

        let last_open = node
            .last_child(&self.arena)
            .map_or(false, |last| last.is_writable(&self.arena));
        if !last_open && !ls.match_html_close_tag(&tags.type1_close) && ls.is_html_type7() {
            let block = self.append_leaf(
                node,
                BlockValue::HtmlBlock(NodeHtmlBlock { closer: None }),
                ls.indent(),
            );
            block.data_mut(&mut self.arena).content = ls.current_text();
            return true;
        }

        false
    }

    fn close_html_block(&mut self, node: Node, ls: &LineScanner) -> bool {
        let closer = match node.data(&self.arena).value {
            BlockValue::HtmlBlock(NodeHtmlBlock { closer: Some(c) }) => c,
            _ => return false,
        };

        if !ls.match_html_close_tag(htmltag::catalogue().closer(closer)) {
            return false;
        }

        self.append_html_block_text(node, ls);
        node.disable(&mut self.arena);
        true
    }

    fn append_html_block_text(&mut self, node: Node, ls: &LineScanner) -> bool {
        if !matches!(node.data(&self.arena).value, BlockValue::HtmlBlock(..)) {
            return false;
        }

        let parent_indent = node
            .parent(&self.arena)
            .map_or(0, |p| p.data(&self.arena).indent);

        if !node.is_writable(&self.arena) || ls.indent() < parent_indent {
            return false;
        }

        let text = ls.remove_indent(parent_indent).line_with_break_before();
        node.data_mut(&mut self.arena).content.push_str(&text);
        true
    }

    fn dispatch_fenced_code(&mut self, node: Node, ls: &LineScanner) -> bool {
        let mut copy = ls.clone();
        copy.skip_whitespace();
        let indent = copy.indent();

        if indent >= node.data(&self.arena).indent + CODE_INDENT {
            return false;
        }

        for fence_char in [b'`', b'~'] {
            let count = copy.skip_fence_char(fence_char);

            if count >= 3 {
                if copy.index_of(b'`').is_some() {
                    return false;
                }

                if node.data(&self.arena).depth > copy.depth() {
                    while self.current.data(&self.arena).depth > copy.depth() {
                        if !self.unwind() {
                            break;
                        }
                    }
                    return self.dispatch_fenced_code(self.current, ls);
                }

                if node.is_empty(&self.arena) {
                    self.append_leaf(
                        node,
                        BlockValue::FencedCode(NodeFencedCode {
                            fence_char,
                            fence_length: count,
                            info: copy.first_word().to_string(),
                            fence_indent: indent,
                        }),
                        indent,
                    );
                    return true;
                }

                let last = node.last_child(&self.arena).unwrap();
                return self.append_html_block_text(last, ls)
                    || self.toggle_fenced_code(node, last, fence_char, count, &copy, indent);
            }

            if count > 0 {
                break;
            }
        }

        false
    }

    /// A fence line against the last block: close an open fenced block on
    /// a matching closer, otherwise open a new one.
    fn toggle_fenced_code(
        &mut self,
        container: Node,
        last: Node,
        fence_char: u8,
        count: usize,
        rest: &LineScanner,
        indent: usize,
    ) -> bool {
        if let BlockValue::FencedCode(ref f) = last.data(&self.arena).value {
            if last.is_writable(&self.arena) {
                if count < f.fence_length || fence_char != f.fence_char || !rest.is_blank() {
                    return false;
                }
                last.disable(&mut self.arena);
                return true;
            }
        }

        self.append_leaf(
            container,
            BlockValue::FencedCode(NodeFencedCode {
                fence_char,
                fence_length: count,
                info: rest.first_word().to_string(),
                fence_indent: indent,
            }),
            indent,
        );
        true
    }

    fn append_fenced_code_text(&mut self, node: Node, ls: &LineScanner) -> bool {
        if node.is_empty(&self.arena) || node.data(&self.arena).depth > ls.depth() {
            return false;
        }

        let last = node.last_child(&self.arena).unwrap();
        if !last.is_fenced_code(&self.arena) || !last.is_writable(&self.arena) {
            return false;
        }

        let fence_indent = match last.data(&self.arena).value {
            BlockValue::FencedCode(ref f) => f.fence_indent,
            _ => unreachable!(),
        };

        let text = ls.remove_indent(fence_indent).line_with_break_after();
        last.data_mut(&mut self.arena).content.push_str(&text);
        true
    }

    fn dispatch_setext_heading(&mut self, node: Node, ls: &LineScanner) -> bool {
        match node.data(&self.arena).value {
            BlockValue::BlockQuote => return false,
            BlockValue::BulletItem(..) | BlockValue::OrderedItem(..) => {
                let mut copy = ls.clone();
                copy.skip_whitespace();
                if copy.indent() < node.data(&self.arena).indent {
                    return false;
                }
            }
            _ => (),
        }

        let last = match node.last_child(&self.arena) {
            Some(last) => last,
            None => return false,
        };

        let level = match self.setext_level(last, ls) {
            Some(level) => level,
            None => return false,
        };

        let text = last.data(&self.arena).content.trim().to_string();
        node.remove_last(&mut self.arena);
        let heading = self.append_leaf(node, BlockValue::Heading(NodeHeading { level }), 0);
        heading.data_mut(&mut self.arena).content = text;
        true
    }

    /// An open paragraph (or HTML block) followed by a run of `=` or `-`
    /// is promoted in place to a heading of level 1 or 2.
    fn setext_level(&self, last: Node, ls: &LineScanner) -> Option<usize> {
        if !matches!(
            last.data(&self.arena).value,
            BlockValue::Paragraph | BlockValue::HtmlBlock(..)
        ) || !last.is_writable(&self.arena)
        {
            return None;
        }

        let text = ls.trimmed();
        if text.is_empty() {
            return None;
        }

        if text.bytes().all(|b| b == b'=') {
            Some(1)
        } else if text.bytes().all(|b| b == b'-') {
            Some(2)
        } else {
            None
        }
    }

    fn dispatch_thematic_break(&mut self, node: Node, ls: &LineScanner) -> bool {
        let indent = ls.count_indent();
        if indent > node.data(&self.arena).indent + 3 {
            return false;
        }

        let text = ls.no_whitespace();
        if text.len() < 3 {
            return false;
        }

        for marker in [b'-', b'*', b'_'] {
            if text.bytes().all(|b| b == marker) {
                self.unwind_until(ls.position());
                let target = self.current;
                let node = self.append_leaf(target, BlockValue::ThematicBreak, 0);
                node.disable(&mut self.arena);
                return true;
            }
        }

        false
    }

    //////////////////////
    // Container blocks //
    //////////////////////

    fn dispatch_container_block(&mut self, node: Node, ls: &mut LineScanner) -> bool {
        match node.data(&self.arena).value {
            BlockValue::OrderedItem(..) => {
                self.dispatch_block_quote(node, ls)
                    || self.dispatch_ordered_list(node, ls)
                    || self.dispatch_bullet_list(node, ls)
            }
            _ => {
                self.dispatch_block_quote(node, ls)
                    || self.dispatch_bullet_list(node, ls)
                    || self.dispatch_ordered_list(node, ls)
            }
        }
    }

    fn dispatch_block_quote(&mut self, node: Node, ls: &mut LineScanner) -> bool {
        if matches!(node.data(&self.arena).value, BlockValue::BlockQuote)
            && !node.is_writable(&self.arena)
        {
            return false;
        }

        if !ls.match_block_quote() {
            return false;
        }

        if node.data(&self.arena).depth < ls.depth() {
            while self.current.data(&self.arena).depth < ls.depth() {
                let target = self.current;
                self.append_container(target, BlockValue::BlockQuote, ls.indent());
            }
        }

        true
    }

    fn dispatch_bullet_list(&mut self, node: Node, ls: &mut LineScanner) -> bool {
        match node.data(&self.arena).value {
            BlockValue::BulletList(..) | BlockValue::OrderedList(..) => {
                return self.unwind() && self.dispatch_bullet_list(self.current, ls);
            }
            BlockValue::BulletItem(..) => return self.dispatch_bullet_list_item(node, ls),
            _ => (),
        }

        self.dispatch_bullet_list_base(node, ls)
    }

    fn dispatch_bullet_list_base(&mut self, node: Node, ls: &mut LineScanner) -> bool {
        let mut copy = ls.clone();
        let base_indent = copy.indent();

        let bullet = match copy.find_bullet() {
            Some(b) => b,
            None => return false,
        };

        if node.data(&self.arena).depth > copy.depth() {
            while self.current.data(&self.arena).depth > copy.depth() {
                if !self.unwind() {
                    break;
                }
            }
            return self.dispatch_bullet_list(self.current, ls);
        }

        if copy.is_blank() {
            if let Some(last) = node.last_child(&self.arena) {
                if self.append_paragraph_text(last, ls) {
                    *ls = copy;
                    return false;
                }
            }
        } else if !self.indent_enough_for_child(node, base_indent) {
            return self.unwind() && self.dispatch_bullet_list(self.current, ls);
        }

        *ls = copy;
        self.append_first_bullet_list(node, ls, bullet, base_indent);
        true
    }

    fn dispatch_bullet_list_item(&mut self, node: Node, ls: &mut LineScanner) -> bool {
        let my_bullet = match node.data(&self.arena).value {
            BlockValue::BulletItem(ref it) => it.bullet_char,
            _ => unreachable!(),
        };

        let mut copy = ls.clone();
        let base_indent = copy.indent();

        if copy.find_bullet() != Some(my_bullet) {
            return self.dispatch_bullet_list_base(node, ls);
        }

        if node.data(&self.arena).depth > copy.depth() {
            while self.current.data(&self.arena).depth > copy.depth() {
                if !self.unwind() {
                    break;
                }
            }
            return self.dispatch_bullet_list(self.current, ls);
        }

        let parent_base = node
            .parent(&self.arena)
            .map_or(0, |p| p.base_indent(&self.arena));
        if base_indent < parent_base {
            let writable = match node.last_child(&self.arena) {
                Some(last) => last.is_writable(&self.arena),
                None => node.is_writable(&self.arena),
            };
            self.unwind();
            self.unwind();
            let target = self.current;
            target.set_has_blank_line(&mut self.arena, !writable);
            return self.dispatch_bullet_list(self.current, ls);
        }

        *ls = copy;

        if base_indent <= node.base_indent(&self.arena) + 1 {
            let own_blank = node.own_blank_line(&self.arena);
            let list = node.parent(&self.arena).unwrap();
            self.append_container(
                list,
                BlockValue::BulletItem(NodeBulletItem {
                    bullet_char: my_bullet,
                    base_indent,
                    has_blank_line: false,
                }),
                ls.indent(),
            );
            list.set_has_blank_line(&mut self.arena, own_blank);
        } else {
            self.append_first_bullet_list(node, ls, my_bullet, base_indent);
        }

        true
    }

    fn append_first_bullet_list(
        &mut self,
        node: Node,
        ls: &mut LineScanner,
        bullet: u8,
        base_indent: usize,
    ) {
        if node.data(&self.arena).value.is_list() {
            if self.unwind() {
                let target = self.current;
                self.append_first_bullet_list(target, ls, bullet, base_indent);
            }
            return;
        }

        let mut indent = ls.indent();
        if base_indent + 1 == indent {
            indent += 1;
        }

        let list = self.append_container(
            node,
            BlockValue::BulletList(NodeBulletList {
                bullet_char: bullet,
                has_blank_line: false,
            }),
            indent,
        );
        self.append_container(
            list,
            BlockValue::BulletItem(NodeBulletItem {
                bullet_char: bullet,
                base_indent,
                has_blank_line: false,
            }),
            indent,
        );
    }

    fn dispatch_ordered_list(&mut self, node: Node, ls: &mut LineScanner) -> bool {
        match node.data(&self.arena).value {
            BlockValue::BulletList(..) | BlockValue::OrderedList(..) => {
                return self.unwind() && self.dispatch_ordered_list(self.current, ls);
            }
            BlockValue::OrderedItem(..) => return self.dispatch_ordered_list_item(node, ls),
            _ => (),
        }

        self.dispatch_ordered_list_base(node, ls)
    }

    fn dispatch_ordered_list_base(&mut self, node: Node, ls: &mut LineScanner) -> bool {
        let mut copy = ls.clone();
        let base_indent = copy.indent();

        let digit = match copy.find_digit() {
            Some(d) => d,
            None => return false,
        };

        if node.data(&self.arena).depth > copy.depth() {
            while self.current.data(&self.arena).depth > copy.depth() {
                if !self.unwind() {
                    break;
                }
            }
            return self.dispatch_ordered_list(self.current, ls);
        }

        if copy.is_blank() {
            if let Some(last) = node.last_child(&self.arena) {
                if self.append_paragraph_text(last, ls) {
                    *ls = copy;
                    return false;
                }
            }
        } else if !self.indent_enough_for_child(node, base_indent) {
            return self.unwind() && self.dispatch_ordered_list(self.current, ls);
        }

        // Only `1.` may start a list directly against an open paragraph.
        let last_is_paragraph = node
            .last_child(&self.arena)
            .map_or(false, |last| last.is_paragraph(&self.arena));
        if last_is_paragraph && digit != "1." {
            return false;
        }

        let start: u64 = digit[..digit.len() - 1].parse().unwrap_or(1);
        let delimiter = digit.as_bytes()[digit.len() - 1];
        let marker_len = digit.len() + 1;

        *ls = copy;
        self.append_first_ordered_list(node, ls, start, delimiter, base_indent, marker_len);
        true
    }

    fn dispatch_ordered_list_item(&mut self, node: Node, ls: &mut LineScanner) -> bool {
        let (my_delimiter, my_base, my_marker_len) = match node.data(&self.arena).value {
            BlockValue::OrderedItem(ref it) => (it.delimiter, it.base_indent, it.marker_len),
            _ => unreachable!(),
        };

        let mut copy = ls.clone();
        let base_indent = copy.indent();

        let digit = match copy.find_digit() {
            Some(d) => d,
            None => return false,
        };

        let start: u64 = digit[..digit.len() - 1].parse().unwrap_or(1);
        let delimiter = digit.as_bytes()[digit.len() - 1];

        if delimiter != my_delimiter {
            return self.dispatch_ordered_list_base(node, ls);
        }

        if node.data(&self.arena).depth > copy.depth() {
            while self.current.data(&self.arena).depth > copy.depth() {
                if !self.unwind() {
                    break;
                }
            }
            return self.dispatch_ordered_list(self.current, ls);
        }

        let parent_base = node
            .parent(&self.arena)
            .map_or(0, |p| p.base_indent(&self.arena));
        if base_indent < parent_base {
            let writable = match node.last_child(&self.arena) {
                Some(last) => last.is_writable(&self.arena),
                None => node.is_writable(&self.arena),
            };
            self.unwind();
            self.unwind();
            let target = self.current;
            target.set_has_blank_line(&mut self.arena, !writable);
            return self.dispatch_ordered_list(self.current, ls);
        }

        let marker_len = digit.len() + 1;
        *ls = copy;

        if base_indent <= my_base + my_marker_len {
            let own_blank = node.own_blank_line(&self.arena);
            let list = node.parent(&self.arena).unwrap();
            self.append_container(
                list,
                BlockValue::OrderedItem(NodeOrderedItem {
                    delimiter,
                    base_indent,
                    marker_len,
                    has_blank_line: false,
                }),
                ls.indent(),
            );
            list.set_has_blank_line(&mut self.arena, own_blank);
        } else {
            self.append_first_ordered_list(node, ls, start, delimiter, base_indent, marker_len);
        }

        true
    }

    fn append_first_ordered_list(
        &mut self,
        node: Node,
        ls: &mut LineScanner,
        start: u64,
        delimiter: u8,
        base_indent: usize,
        marker_len: usize,
    ) {
        if node.data(&self.arena).value.is_list() {
            if self.unwind() {
                let target = self.current;
                self.append_first_ordered_list(target, ls, start, delimiter, base_indent, marker_len);
            }
            return;
        }

        let indent = ls.indent();
        let list = self.append_container(
            node,
            BlockValue::OrderedList(NodeOrderedList {
                start,
                delimiter,
                has_blank_line: false,
            }),
            indent,
        );
        self.append_container(
            list,
            BlockValue::OrderedItem(NodeOrderedItem {
                delimiter,
                base_indent,
                marker_len,
                has_blank_line: false,
            }),
            indent,
        );
    }

    fn indent_enough_for_child(&self, node: Node, indent: usize) -> bool {
        match node.data(&self.arena).value {
            BlockValue::BulletItem(ref it) => indent >= it.base_indent + 2,
            BlockValue::OrderedItem(ref it) => indent >= it.base_indent + it.marker_len,
            _ => true,
        }
    }

    /////////////////////////////
    // Headings and paragraphs //
    /////////////////////////////

    fn dispatch_heading_and_paragraph(&mut self, node: Node, ls: &mut LineScanner) {
        if self.dispatch_no_text(node, ls) || self.dispatch_heading_block(node, ls) {
            return;
        }
        self.append_paragraph(node, ls);
    }

    fn dispatch_no_text(&mut self, node: Node, ls: &LineScanner) -> bool {
        if !ls.is_blank() {
            return false;
        }

        if let Some(last) = node.last_child(&self.arena) {
            self.handle_blank_line(last, ls);
        }

        true
    }

    fn dispatch_heading_block(&mut self, _node: Node, ls: &mut LineScanner) -> bool {
        let count = ls.find_heading_marker();
        let indent = ls.indent();

        if count == 0 {
            return false;
        }

        ls.remove_last_sequence(b'#');
        self.unwind_until(indent);
        let target = self.current;
        let heading = self.append_leaf(target, BlockValue::Heading(NodeHeading { level: count }), indent);
        heading.data_mut(&mut self.arena).content = ls.trimmed();
        true
    }

    fn append_paragraph(&mut self, node: Node, ls: &LineScanner) -> bool {
        match node.data(&self.arena).value {
            BlockValue::Body => {
                let lazy = match node.last_child(&self.arena) {
                    Some(last) => self.append_paragraph_text(last, ls),
                    None => false,
                };
                if !lazy {
                    self.append_paragraph_leaf(node, ls);
                }
                true
            }
            BlockValue::BlockQuote => self.append_paragraph_quote(node, ls),
            BlockValue::BulletItem(..) | BlockValue::OrderedItem(..) => {
                self.append_paragraph_item(node, ls)
            }
            _ => {
                if !node.is_writable(&self.arena) {
                    return false;
                }
                if !ls.is_blank() {
                    self.append_paragraph_leaf(node, ls);
                }
                true
            }
        }
    }

    fn append_paragraph_quote(&mut self, node: Node, ls: &LineScanner) -> bool {
        if !node.is_writable(&self.arena) {
            return false;
        }

        let lazy = match node.last_child(&self.arena) {
            Some(last) => self.append_paragraph_text(last, ls),
            None => false,
        };

        if !lazy {
            if node.data(&self.arena).depth > ls.depth() {
                while self.current.data(&self.arena).depth > ls.depth() {
                    if !self.unwind() {
                        break;
                    }
                }
                let target = self.current;
                self.append_paragraph_leaf(target, ls);
            } else {
                self.append_paragraph_leaf(node, ls);
            }
        }

        true
    }

    fn append_paragraph_item(&mut self, node: Node, ls: &LineScanner) -> bool {
        if !node.is_writable(&self.arena) {
            self.unwind();
            self.unwind();
            let target = self.current;
            return self.append_paragraph(target, ls);
        }

        match node.last_child(&self.arena) {
            None => {
                if !ls.is_blank() {
                    self.append_paragraph_leaf(node, ls);
                }
            }
            Some(last) if !last.is_writable(&self.arena) => {
                node.set_has_blank_line(&mut self.arena, true);
                self.append_paragraph_leaf(node, ls);
            }
            Some(last) => {
                if !self.append_paragraph_text(last, ls) {
                    let requirement = CODE_INDENT + node.data(&self.arena).indent;
                    let removed = ls.remove_indent(requirement);

                    if removed.indent() < node.data(&self.arena).indent {
                        self.unwind();
                        self.unwind();
                        let target = self.current;
                        self.append_paragraph(target, ls);
                    } else {
                        self.append_paragraph_leaf(node, ls);
                    }
                }
            }
        }

        true
    }

    fn append_paragraph_leaf(&mut self, container: Node, ls: &LineScanner) {
        let node = self.append_leaf(container, BlockValue::Paragraph, ls.indent());
        node.data_mut(&mut self.arena).content = ls.current_text();
    }

    /// Continue an open leaf with paragraph text; containers forward to
    /// their own paragraph logic so lazy continuation reaches the open
    /// branch.
    fn append_paragraph_text(&mut self, node: Node, ls: &LineScanner) -> bool {
        if node.is_paragraph(&self.arena) {
            if !node.is_writable(&self.arena) {
                return false;
            }
            let text = ls.line_with_break_before();
            node.data_mut(&mut self.arena).content.push_str(&text);
            return true;
        }

        if node.data(&self.arena).value.is_container() {
            return self.append_paragraph(node, ls);
        }

        false
    }

    //////////////
    // Appends  //
    //////////////

    fn append_block(&mut self, parent: Node, child: Node) {
        if let Some(last) = parent.last_child(&self.arena) {
            if last.is_writable(&self.arena) {
                self.close(last);
            }
        }
        parent.append(&mut self.arena, child);
    }

    fn append_leaf(&mut self, parent: Node, value: BlockValue, indent: usize) -> Node {
        self.propagate_item_blank_line(parent);
        let depth = parent.data(&self.arena).depth;
        let node = self.arena.alloc(make_block(value, depth, indent));
        self.append_block(parent, node);
        node
    }

    fn append_container(&mut self, parent: Node, value: BlockValue, indent: usize) -> Node {
        self.propagate_item_blank_line(parent);
        let depth = parent.data(&self.arena).depth;
        let node = self.arena.alloc(make_block(value, depth, indent));
        self.append_block(parent, node);
        self.current = node;
        node
    }

    /// An item forwards its blank-line flag to the parent list whenever it
    /// gains another child.
    fn propagate_item_blank_line(&mut self, parent: Node) {
        if parent.data(&self.arena).value.is_item() {
            let own = parent.own_blank_line(&self.arena);
            if let Some(list) = parent.parent(&self.arena) {
                list.set_has_blank_line(&mut self.arena, own);
            }
        }
    }
}

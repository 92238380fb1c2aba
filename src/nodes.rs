//! The block tree.
//!
//! Nodes live in an index arena; a [`Node`] is a copyable handle and every
//! structural accessor takes the arena explicitly.  Exactly one child of
//! each container is writable at a time, and it is always the last one;
//! the block parser closes the previous sibling whenever a new one opens.

use crate::htmltag::HtmlCloser;

/// The per-variant data of a block node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockValue {
    /// The document root.  Contains blocks.
    Body,

    /// A block quote.  Contains blocks; increments the blockquote depth of
    /// its subtree.
    BlockQuote,

    /// A bullet list.  Contains bullet items sharing one bullet character.
    BulletList(NodeBulletList),

    /// An ordered list.  Contains ordered items sharing one delimiter.
    OrderedList(NodeOrderedList),

    /// One item of a bullet list.
    BulletItem(NodeBulletItem),

    /// One item of an ordered list.
    OrderedItem(NodeOrderedItem),

    /// A paragraph.  Holds raw text re-scanned by the inline parser at
    /// rendering time.
    Paragraph,

    /// An ATX or promoted setext heading.
    Heading(NodeHeading),

    /// An indented code block; four columns of indent per line stripped.
    IndentedCode(NodeIndentedCode),

    /// A fenced code block.
    FencedCode(NodeFencedCode),

    /// A raw HTML block.  Types 1–5 carry the close condition they wait
    /// for; types 6 and 7 end at a blank line.
    HtmlBlock(NodeHtmlBlock),

    /// A thematic break.  Closed at birth, no text.
    ThematicBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeBulletList {
    /// The bullet character shared by every item: `-`, `+` or `*`.
    pub bullet_char: u8,

    /// Whether a blank line occurred between or inside the items, making
    /// the list render loose.
    pub has_blank_line: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeOrderedList {
    /// The ordinal the list starts at.
    pub start: u64,

    /// The delimiter after each number: `.` or `)`.
    pub delimiter: u8,

    pub has_blank_line: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeBulletItem {
    pub bullet_char: u8,

    /// The column of the item's marker.
    pub base_indent: usize,

    pub has_blank_line: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeOrderedItem {
    pub delimiter: u8,

    /// The column of the item's marker.
    pub base_indent: usize,

    /// Marker width including the delimiter, the extra indent a child
    /// block must clear.
    pub marker_len: usize,

    pub has_blank_line: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHeading {
    /// 1–6 for ATX headings, 1 or 2 for promoted setext headings.
    pub level: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeIndentedCode {
    /// Blank lines seen while the block is open; flushed into the text if
    /// more code follows, discarded if the block closes first.
    pub pending: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFencedCode {
    /// The fence character, `` ` `` or `~`.
    pub fence_char: u8,

    /// The opening fence length; a closer needs at least as many.
    pub fence_length: usize,

    /// The first word of the info string, emitted as `language-…`.
    pub info: String,

    /// The indent stripped from continuation lines.
    pub fence_indent: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHtmlBlock {
    pub closer: Option<HtmlCloser>,
}

impl BlockValue {
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            BlockValue::Body
                | BlockValue::BlockQuote
                | BlockValue::BulletList(..)
                | BlockValue::OrderedList(..)
                | BlockValue::BulletItem(..)
                | BlockValue::OrderedItem(..)
        )
    }

    pub fn is_list(&self) -> bool {
        matches!(self, BlockValue::BulletList(..) | BlockValue::OrderedList(..))
    }

    pub fn is_item(&self) -> bool {
        matches!(self, BlockValue::BulletItem(..) | BlockValue::OrderedItem(..))
    }
}

/// One node of the block tree.
#[derive(Debug)]
pub struct Block {
    pub value: BlockValue,
    pub parent: Option<Node>,
    pub children: Vec<Node>,

    /// Raw accumulated text of leaf blocks.
    pub content: String,

    /// False once the block has closed; a closed block refuses more text.
    pub writable: bool,

    /// The logical column at which the block's content begins.
    pub indent: usize,

    /// The number of enclosing blockquote levels.
    pub depth: usize,
}

#[derive(Debug, Default)]
pub struct Arena {
    nodes: Vec<Block>,
}

/// A copyable handle into the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node(usize);

impl Arena {
    pub fn new() -> Self {
        Arena::default()
    }

    pub fn alloc(&mut self, block: Block) -> Node {
        self.nodes.push(block);
        Node(self.nodes.len() - 1)
    }
}

impl Node {
    pub fn data<'a>(&self, arena: &'a Arena) -> &'a Block {
        &arena.nodes[self.0]
    }

    pub fn data_mut<'a>(&self, arena: &'a mut Arena) -> &'a mut Block {
        &mut arena.nodes[self.0]
    }

    pub fn parent(&self, arena: &Arena) -> Option<Node> {
        self.data(arena).parent
    }

    pub fn first_child(&self, arena: &Arena) -> Option<Node> {
        self.data(arena).children.first().copied()
    }

    pub fn last_child(&self, arena: &Arena) -> Option<Node> {
        self.data(arena).children.last().copied()
    }

    pub fn is_empty(&self, arena: &Arena) -> bool {
        self.data(arena).children.is_empty()
    }

    pub fn append(&self, arena: &mut Arena, child: Node) {
        child.data_mut(arena).parent = Some(*self);
        self.data_mut(arena).children.push(child);
    }

    /// Drop the last child from this container.  The node stays allocated
    /// in the arena but is no longer reachable.
    pub fn remove_last(&self, arena: &mut Arena) {
        self.data_mut(arena).children.pop();
    }

    pub fn is_writable(&self, arena: &Arena) -> bool {
        self.data(arena).writable
    }

    pub fn disable(&self, arena: &mut Arena) {
        self.data_mut(arena).writable = false;
    }

    pub fn is_paragraph(&self, arena: &Arena) -> bool {
        matches!(self.data(arena).value, BlockValue::Paragraph)
    }

    pub fn is_fenced_code(&self, arena: &Arena) -> bool {
        matches!(self.data(arena).value, BlockValue::FencedCode(..))
    }

    /// The marker column of a list item; for a list, its first item's.
    pub fn base_indent(&self, arena: &Arena) -> usize {
        match self.data(arena).value {
            BlockValue::BulletItem(ref it) => it.base_indent,
            BlockValue::OrderedItem(ref it) => it.base_indent,
            BlockValue::BulletList(..) | BlockValue::OrderedList(..) => self
                .first_child(arena)
                .map_or(0, |first| first.base_indent(arena)),
            _ => 0,
        }
    }

    /// Whether paragraphs under this container render wrapped in `<p>`.
    /// Lists and items answer from the blank-line flag; every other
    /// container always wraps.
    pub fn has_blank_line(&self, arena: &Arena) -> bool {
        match self.data(arena).value {
            BlockValue::BulletList(ref l) => l.has_blank_line,
            BlockValue::OrderedList(ref l) => l.has_blank_line,
            BlockValue::BulletItem(..) | BlockValue::OrderedItem(..) => self
                .parent(arena)
                .map_or(true, |list| list.has_blank_line(arena)),
            _ => true,
        }
    }

    /// Record a blank line on a list or item; other containers ignore it.
    pub fn set_has_blank_line(&self, arena: &mut Arena, value: bool) {
        match self.data_mut(arena).value {
            BlockValue::BulletList(ref mut l) => l.has_blank_line |= value,
            BlockValue::OrderedList(ref mut l) => l.has_blank_line |= value,
            BlockValue::BulletItem(ref mut it) => it.has_blank_line |= value,
            BlockValue::OrderedItem(ref mut it) => it.has_blank_line |= value,
            _ => (),
        }
    }

    /// The item-local blank-line flag, forwarded to the parent list when
    /// the item gains a child or a sibling.
    pub fn own_blank_line(&self, arena: &Arena) -> bool {
        match self.data(arena).value {
            BlockValue::BulletItem(ref it) => it.has_blank_line,
            BlockValue::OrderedItem(ref it) => it.has_blank_line,
            _ => false,
        }
    }
}

/// Build a block with the bookkeeping every node carries.  Block quotes
/// increment the depth they inherit.
pub fn make_block(value: BlockValue, parent_depth: usize, indent: usize) -> Block {
    let depth = match value {
        BlockValue::BlockQuote => parent_depth + 1,
        _ => parent_depth,
    };

    Block {
        value,
        parent: None,
        children: Vec::new(),
        content: String::new(),
        writable: true,
        indent,
        depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_links_parent_and_children() {
        let mut arena = Arena::new();
        let root = arena.alloc(make_block(BlockValue::Body, 0, 0));
        let para = arena.alloc(make_block(BlockValue::Paragraph, 0, 0));
        root.append(&mut arena, para);

        assert_eq!(para.parent(&arena), Some(root));
        assert_eq!(root.last_child(&arena), Some(para));
        assert!(para.is_writable(&arena));
    }

    #[test]
    fn block_quotes_deepen() {
        let mut arena = Arena::new();
        let root = arena.alloc(make_block(BlockValue::Body, 0, 0));
        let quote = arena.alloc(make_block(BlockValue::BlockQuote, root.data(&arena).depth, 0));
        let inner = arena.alloc(make_block(BlockValue::BlockQuote, quote.data(&arena).depth, 0));

        assert_eq!(quote.data(&arena).depth, 1);
        assert_eq!(inner.data(&arena).depth, 2);
    }

    #[test]
    fn blank_line_flags_propagate_to_lists() {
        let mut arena = Arena::new();
        let list = arena.alloc(make_block(
            BlockValue::BulletList(NodeBulletList {
                bullet_char: b'-',
                has_blank_line: false,
            }),
            0,
            0,
        ));
        let item = arena.alloc(make_block(
            BlockValue::BulletItem(NodeBulletItem {
                bullet_char: b'-',
                base_indent: 0,
                has_blank_line: false,
            }),
            0,
            0,
        ));
        list.append(&mut arena, item);

        assert!(!item.has_blank_line(&arena));
        list.set_has_blank_line(&mut arena, true);
        assert!(item.has_blank_line(&arena));
    }
}

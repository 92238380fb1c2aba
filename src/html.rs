//! HTML rendering: a read-only post-order walk over the finished block
//! tree.  Containers join their children's HTML; each leaf hands its raw
//! text to the inline parser.

use crate::nodes::{Arena, BlockValue, Node};
use crate::parser::{inlines, RefMap};

pub fn format_document(arena: &Arena, root: Node, refmap: &RefMap) -> String {
    render(arena, root, refmap)
}

fn render(arena: &Arena, node: Node, refmap: &RefMap) -> String {
    let data = node.data(arena);

    match data.value {
        BlockValue::Body => children(arena, node, refmap).join("\n"),

        BlockValue::BlockQuote => {
            let mut text = String::new();
            for child in children(arena, node, refmap) {
                text.push_str(&child);
                text.push('\n');
            }
            format!("<blockquote>\n{}</blockquote>", text)
        }

        BlockValue::BulletList(..) => {
            let mut text = String::new();
            for child in children(arena, node, refmap) {
                text.push_str(&child);
                text.push('\n');
            }
            format!("<ul>\n{}</ul>", text)
        }

        BlockValue::OrderedList(ref list) => {
            let mut text = String::new();
            for child in children(arena, node, refmap) {
                text.push_str(&child);
                text.push('\n');
            }
            if list.start == 1 {
                format!("<ol>\n{}</ol>", text)
            } else {
                format!("<ol start=\"{}\">\n{}</ol>", list.start, text)
            }
        }

        BlockValue::BulletItem(..) | BlockValue::OrderedItem(..) => {
            let text = children(arena, node, refmap).join("\n");
            item_html(&text)
        }

        BlockValue::Paragraph => {
            let inner = inlines::to_html(&data.content, refmap);
            let loose = node
                .parent(arena)
                .map_or(true, |parent| parent.has_blank_line(arena));
            if loose {
                format!("<p>{}</p>", inner)
            } else {
                inner
            }
        }

        BlockValue::Heading(ref h) => {
            format!(
                "<h{}>{}</h{}>",
                h.level,
                inlines::to_html(&data.content, refmap),
                h.level
            )
        }

        BlockValue::IndentedCode(..) => {
            format!(
                "<pre><code>{}\n</code></pre>",
                inlines::code_to_html(&data.content)
            )
        }

        BlockValue::FencedCode(ref f) => {
            let code = inlines::code_to_html(&data.content);
            if f.info.is_empty() {
                format!("<pre><code>{}</code></pre>", code)
            } else {
                format!(
                    "<pre><code class=\"language-{}\">{}</code></pre>",
                    inlines::to_html(&f.info, refmap),
                    code
                )
            }
        }

        BlockValue::HtmlBlock(..) => data.content.clone(),

        BlockValue::ThematicBreak => "<hr />".to_string(),
    }
}

fn children(arena: &Arena, node: Node, refmap: &RefMap) -> Vec<String> {
    node.data(arena)
        .children
        .iter()
        .map(|&child| render(arena, child, refmap))
        .collect()
}

/// Item bodies get an inner newline next to block-level (tagged) content
/// only: after `<li>` when the body starts with a tag, before `</li>` when
/// it ends with one.
fn item_html(text: &str) -> String {
    if text.is_empty() {
        return "<li></li>".to_string();
    }

    match (text.starts_with('<'), text.ends_with('>')) {
        (true, true) => format!("<li>\n{}\n</li>", text),
        (true, false) => format!("<li>\n{}</li>", text),
        (false, true) => format!("<li>{}\n</li>", text),
        (false, false) => format!("<li>{}</li>", text),
    }
}

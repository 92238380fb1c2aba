use super::*;

#[test]
fn block_quote() {
    html(
        concat!("> a\n", "> b"),
        concat!("<blockquote>\n", "<p>a\nb</p>\n", "</blockquote>"),
    );
}

#[test]
fn block_quote_lazy_continuation() {
    html(
        concat!("> a\n", "b"),
        concat!("<blockquote>\n", "<p>a\nb</p>\n", "</blockquote>"),
    );
}

#[test]
fn block_quote_closed_by_blank_line() {
    html(
        concat!("> a\n", "\n", "b"),
        concat!("<blockquote>\n", "<p>a</p>\n", "</blockquote>\n", "<p>b</p>"),
    );
}

#[test]
fn nested_block_quotes() {
    html(
        "> > a",
        concat!(
            "<blockquote>\n",
            "<blockquote>\n",
            "<p>a</p>\n",
            "</blockquote>\n",
            "</blockquote>"
        ),
    );
}

#[test]
fn bullet_list() {
    html(
        concat!("- a\n", "- b"),
        concat!("<ul>\n", "<li>a</li>\n", "<li>b</li>\n", "</ul>"),
    );
}

#[test]
fn bullet_list_stars() {
    html(
        concat!("* one\n", "* two"),
        concat!("<ul>\n", "<li>one</li>\n", "<li>two</li>\n", "</ul>"),
    );
}

#[test]
fn ordered_list() {
    html(
        concat!("1. one\n", "2. two"),
        concat!("<ol>\n", "<li>one</li>\n", "<li>two</li>\n", "</ol>"),
    );
}

#[test]
fn ordered_list_start() {
    html(
        concat!("2. Hello.\n", "3. Hi."),
        concat!(
            "<ol start=\"2\">\n",
            "<li>Hello.</li>\n",
            "<li>Hi.</li>\n",
            "</ol>"
        ),
    );
}

#[test]
fn loose_list_wraps_paragraphs() {
    html(
        concat!("- a\n", "\n", "- b"),
        concat!(
            "<ul>\n",
            "<li>\n",
            "<p>a</p>\n",
            "</li>\n",
            "<li>\n",
            "<p>b</p>\n",
            "</li>\n",
            "</ul>"
        ),
    );
}

#[test]
fn nested_list() {
    html(
        concat!("- a\n", "  - b"),
        concat!(
            "<ul>\n",
            "<li>a\n",
            "<ul>\n",
            "<li>b</li>\n",
            "</ul>\n",
            "</li>\n",
            "</ul>"
        ),
    );
}

#[test]
fn block_quote_inside_list_item() {
    html(
        "- > q",
        concat!(
            "<ul>\n",
            "<li>\n",
            "<blockquote>\n",
            "<p>q</p>\n",
            "</blockquote>\n",
            "</li>\n",
            "</ul>"
        ),
    );
}

#[test]
fn only_one_dot_interrupts_a_paragraph() {
    html(concat!("para\n", "2. x"), "<p>para\n2. x</p>");
    html(
        concat!("para\n", "1. x"),
        concat!("<p>para</p>\n", "<ol>\n", "<li>x</li>\n", "</ol>"),
    );
}

#[test]
fn bullet_interrupting_paragraph() {
    html(
        concat!("para\n", "- x"),
        concat!("<p>para</p>\n", "<ul>\n", "<li>x</li>\n", "</ul>"),
    );
}

#[test]
fn list_item_continuation_indent() {
    html(
        concat!("- a\n", "  b"),
        concat!("<ul>\n", "<li>a\nb</li>\n", "</ul>"),
    );
}

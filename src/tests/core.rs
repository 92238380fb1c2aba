use super::*;

#[test]
fn basic() {
    html(
        concat!(
            "My **document**.\n",
            "\n",
            "It's mine.\n",
            "\n",
            "> Yes.\n",
            "\n",
            "## Hi!"
        ),
        concat!(
            "<p>My <strong>document</strong>.</p>\n",
            "<p>It's mine.</p>\n",
            "<blockquote>\n",
            "<p>Yes.</p>\n",
            "</blockquote>\n",
            "<h2>Hi!</h2>"
        ),
    );
}

#[test]
fn atx_heading() {
    html("# Hello", "<h1>Hello</h1>");
    html("###### six", "<h6>six</h6>");
    html("####### seven", "<p>####### seven</p>");
    html("#no-space", "<p>#no-space</p>");
}

#[test]
fn atx_heading_trailing_hashes() {
    html("# title ##", "<h1>title</h1>");
    html("## title#", "<h2>title#</h2>");
}

#[test]
fn setext_heading() {
    html(
        concat!("Hi\n", "==\n", "\n", "Ok\n", "-----"),
        concat!("<h1>Hi</h1>\n", "<h2>Ok</h2>"),
    );
}

#[test]
fn setext_wins_over_thematic_break() {
    html(concat!("para\n", "---"), "<h2>para</h2>");
}

#[test]
fn thematic_breaks() {
    html(
        concat!("---\n", "\n", "- - -\n", "\n", "_        _   _"),
        concat!("<hr />\n", "<hr />\n", "<hr />"),
    );
}

#[test]
fn paragraph_joins_lines() {
    html(concat!("a\n", "b"), "<p>a\nb</p>");
}

#[test]
fn blank_lines_separate_paragraphs() {
    html(
        concat!("one\n", "\n", "\n", "two"),
        concat!("<p>one</p>\n", "<p>two</p>"),
    );
}

#[test]
fn tabs_expand_to_four_columns() {
    html("\tcode", "<pre><code>code\n</code></pre>");
    html("  \tcode", "<pre><code>code\n</code></pre>");
}

#[test]
fn conversion_is_deterministic() {
    let input = "# a\n\n> quote\n\n- x\n- y\n\n`code` *em*";
    assert_eq!(markdown_to_html(input), markdown_to_html(input));
}

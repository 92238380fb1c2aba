use super::*;

#[test]
fn inline_link() {
    html("[text](/url)", "<p><a href=\"/url\">text</a></p>");
}

#[test]
fn inline_link_with_title() {
    html(
        "[going](https://microsoft.com \"today\")",
        "<p><a href=\"https://microsoft.com\" title=\"today\">going</a></p>",
    );
}

#[test]
fn inline_link_with_paren_title() {
    html(
        "[x](/here (now))",
        "<p><a href=\"/here\" title=\"now\">x</a></p>",
    );
}

#[test]
fn angle_bracket_destination() {
    html("[x](</my url>)", "<p><a href=\"/my%20url\">x</a></p>");
}

#[test]
fn link_text_is_inline_parsed() {
    html(
        "[*em* text](/u)",
        "<p><a href=\"/u\"><em>em</em> text</a></p>",
    );
}

#[test]
fn reference_link() {
    html(
        concat!("[foo]: /url \"t\"\n", "\n", "[foo]"),
        "<p><a href=\"/url\" title=\"t\">foo</a></p>",
    );
}

#[test]
fn full_reference_link() {
    html(
        concat!("This [is][legit] ok.\n", "\n", "[legit]: /ok"),
        "<p>This <a href=\"/ok\">is</a> ok.</p>",
    );
}

#[test]
fn collapsed_reference_link() {
    html(
        concat!("[legit][] ok.\n", "\n", "[legit]: /ok"),
        "<p><a href=\"/ok\">legit</a> ok.</p>",
    );
}

#[test]
fn reference_labels_are_case_and_whitespace_insensitive() {
    html(
        concat!("[Foo  Bar]\n", "\n", "[foo bar]: /url"),
        "<p><a href=\"/url\">Foo  Bar</a></p>",
    );
}

#[test]
fn first_definition_wins() {
    html(
        concat!("[x]\n", "\n", "[x]: /first\n", "[x]: /second"),
        "<p><a href=\"/first\">x</a></p>",
    );
}

#[test]
fn undefined_reference_stays_literal() {
    html("[nope]", "<p>[nope]</p>");
    html("This [is] plain.", "<p>This [is] plain.</p>");
}

#[test]
fn definition_only_paragraph_disappears() {
    html("[a]: /url", "");
    html(
        concat!("[a]: /url\n", "text after"),
        "<p>text after</p>",
    );
}

#[test]
fn inline_image() {
    html(
        "![alt](/img.png)",
        "<p><img src=\"/img.png\" alt=\"alt\" /></p>",
    );
}

#[test]
fn image_with_title() {
    html(
        "![alt](/i.png \"t\")",
        "<p><img src=\"/i.png\" alt=\"alt\" title=\"t\" /></p>",
    );
}

#[test]
fn image_alt_text_is_plain() {
    html(
        "![a *b*](/i)",
        "<p><img src=\"/i\" alt=\"a b\" /></p>",
    );
}

#[test]
fn image_with_link_inside_alt() {
    html(
        "I am ![eating [things](/url)](http://i.imgur.com/QqK1vq7.png).",
        "<p>I am <img src=\"http://i.imgur.com/QqK1vq7.png\" alt=\"eating things\" />.</p>",
    );
}

#[test]
fn reference_image() {
    html(
        concat!("![logo]\n", "\n", "[logo]: /logo.png"),
        "<p><img src=\"/logo.png\" alt=\"logo\" /></p>",
    );
}

#[test]
fn destination_is_percent_encoded() {
    html(
        "[x](/ünïcode)",
        "<p><a href=\"/%C3%BCn%C3%AFcode\">x</a></p>",
    );
}

#[test]
fn space_in_bare_destination_is_not_a_link() {
    html("[x](/a b)", "<p>[x](/a b)</p>");
}

#[test]
fn escaped_brackets_are_literal() {
    html("\\[not a link\\]", "<p>[not a link]</p>");
}

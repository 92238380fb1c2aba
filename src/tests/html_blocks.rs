use super::*;

#[test]
fn type_1_script() {
    html(
        concat!("<script>\n", "var x = 1;\n", "</script>\n", "after"),
        concat!(
            "<script>\n",
            "var x = 1;\n",
            "</script>\n",
            "<p>after</p>"
        ),
    );
}

#[test]
fn type_1_closes_on_same_line() {
    html(
        concat!("<pre>x</pre>\n", "after"),
        concat!("<pre>x</pre>\n", "<p>after</p>"),
    );
}

#[test]
fn type_2_comment() {
    html(
        concat!("<!-- note\n", "still note -->\n", "after"),
        concat!("<!-- note\n", "still note -->\n", "<p>after</p>"),
    );
}

#[test]
fn type_3_processing_instruction() {
    html(
        concat!("<? pi\n", "done ?>\n", "after"),
        concat!("<? pi\n", "done ?>\n", "<p>after</p>"),
    );
}

#[test]
fn type_4_declaration() {
    html(
        concat!("<!DOCTYPE html>\n", "after"),
        concat!("<!DOCTYPE html>\n", "<p>after</p>"),
    );
}

#[test]
fn type_5_cdata() {
    html(
        concat!("<![CDATA[\n", "data ]]>\n", "after"),
        concat!("<![CDATA[\n", "data ]]>\n", "<p>after</p>"),
    );
}

#[test]
fn type_6_runs_until_blank_line() {
    html(
        concat!("<div>\n", "foo\n", "</div>\n", "\n", "bar"),
        concat!("<div>\n", "foo\n", "</div>\n", "<p>bar</p>"),
    );
}

#[test]
fn type_7_lone_tag_line() {
    html(
        concat!("<a b >\n", "ok\n", "\n", "after"),
        concat!("<a b >\n", "ok\n", "<p>after</p>"),
    );
}

#[test]
fn type_7_does_not_interrupt_paragraph() {
    html(
        concat!("text\n", "<a b >"),
        "<p>text\n<a b ></p>",
    );
}

#[test]
fn autolink_line_is_not_an_html_block() {
    html(
        "<http://example.com>",
        "<p><a href=\"http://example.com\">http://example.com</a></p>",
    );
}

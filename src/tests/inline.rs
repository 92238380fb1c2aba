use super::*;

#[test]
fn emphasis() {
    html("*a* **b**", "<p><em>a</em> <strong>b</strong></p>");
}

#[test]
fn emphasis_with_code_span() {
    html(
        "*a* **b** `a`",
        "<p><em>a</em> <strong>b</strong> <code>a</code></p>",
    );
}

#[test]
fn nested_emphasis() {
    html("*a **b** c*", "<p><em>a <strong>b</strong> c</em></p>");
}

#[test]
fn underscore_emphasis() {
    html("_foo_ __bar__", "<p><em>foo</em> <strong>bar</strong></p>");
}

#[test]
fn intraword_underscores_stay_literal() {
    html("foo_bar_baz", "<p>foo_bar_baz</p>");
}

#[test]
fn intraword_asterisks_emphasize() {
    html("foo*bar*baz", "<p>foo<em>bar</em>baz</p>");
}

#[test]
fn unmatched_delimiters_are_literal() {
    html("*open", "<p>*open</p>");
    html("close*", "<p>close*</p>");
    html("a * b", "<p>a * b</p>");
}

#[test]
fn code_spans() {
    html("a `b  c` d", "<p>a <code>b c</code> d</p>");
    html("`` ` ``", "<p><code>`</code></p>");
}

#[test]
fn code_span_escapes_content() {
    html("`<b> & Co`", "<p><code>&lt;b&gt; &amp; Co</code></p>");
    html("Some `code\\` yep.", "<p>Some <code>code\\</code> yep.</p>");
}

#[test]
fn unmatched_backticks_pass_through() {
    html("a `b", "<p>a `b</p>");
}

#[test]
fn hard_breaks() {
    html("a  \nb", "<p>a<br />\nb</p>");
    html("a\\\nb", "<p>a<br />\nb</p>");
}

#[test]
fn single_trailing_space_is_stripped() {
    html("a \nb", "<p>a\nb</p>");
    html("trailing ", "<p>trailing</p>");
}

#[test]
fn backslash_escapes() {
    html("\\*not emphasis\\*", "<p>*not emphasis*</p>");
    html("Ga\\rbage.", "<p>Ga\\rbage.</p>");
}

#[test]
fn special_characters_become_entities() {
    html(
        "a < b > c \" d & e",
        "<p>a &lt; b &gt; c &quot; d &amp; e</p>",
    );
}

#[test]
fn inline_html_passes_through() {
    html(
        "Inline <em>tag</em> and <!-- comment --> here.",
        "<p>Inline <em>tag</em> and <!-- comment --> here.</p>",
    );
}

#[test]
fn autolinks() {
    html(
        "URI: <https://www.pixiv.net>",
        "<p>URI: <a href=\"https://www.pixiv.net\">https://www.pixiv.net</a></p>",
    );
    html(
        "Email: <bill@microsoft.com>",
        "<p>Email: <a href=\"mailto:bill@microsoft.com\">bill@microsoft.com</a></p>",
    );
}

#[test]
fn not_an_autolink() {
    html("a < b", "<p>a &lt; b</p>");
    html("<>", "<p>&lt;&gt;</p>");
}

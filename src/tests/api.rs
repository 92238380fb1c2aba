use super::*;

#[test]
fn define_link_and_resolve() {
    let mut p = Parser::new();
    p.define_link("Foo Bar", "/url", "t");

    assert_eq!(
        p.link_text("foo  bar", None),
        Some("<a href=\"/url\" title=\"t\">foo  bar</a>".to_string())
    );
    assert_eq!(
        p.link_text("Foo Bar", Some("click")),
        Some("<a href=\"/url\" title=\"t\">click</a>".to_string())
    );
    assert_eq!(p.link_text("other", None), None);
}

#[test]
fn link_without_title() {
    let mut p = Parser::new();
    p.define_link("a", "/x", "");

    assert_eq!(
        p.link_text("a", None),
        Some("<a href=\"/x\">a</a>".to_string())
    );
}

#[test]
fn image_text_uses_plain_alt() {
    let mut p = Parser::new();
    p.define_link("logo", "/logo.png", "");

    assert_eq!(
        p.image_text("logo", Some("the *logo*")),
        Some("<img src=\"/logo.png\" alt=\"the logo\" />".to_string())
    );
}

#[test]
fn first_definition_wins() {
    let mut p = Parser::new();
    p.define_link("x", "/first", "");
    p.define_link("x", "/second", "");

    assert_eq!(
        p.link_text("x", None),
        Some("<a href=\"/first\">x</a>".to_string())
    );
}

#[test]
fn html_of_rebuilds_the_reference_table() {
    let mut p = Parser::new();
    p.define_link("x", "/gone", "");

    assert_eq!(p.html_of("[x]"), "<p>[x]</p>");
    assert_eq!(p.link_text("x", None), None);
}

#[test]
fn html_of_is_reusable() {
    let mut p = Parser::new();
    assert_eq!(p.html_of("# one"), "<h1>one</h1>");
    assert_eq!(p.html_of("# two"), "<h1>two</h1>");
}

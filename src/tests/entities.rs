use super::*;

#[test]
fn named_entities() {
    html(
        "This is &amp;, &copy;, &auml;, &ouml;.",
        "<p>This is &amp;, ©, ä, ö.</p>",
    );
}

#[test]
fn long_entity_names() {
    html(
        "&HilbertSpace;, &DifferentialD;, &ClockwiseContourIntegral;, &ngE;",
        "<p>ℋ, ⅆ, ∲, ≧̸</p>",
    );
}

#[test]
fn numeric_entities() {
    html("&#8734; &#x221e;", "<p>∞ ∞</p>");
}

#[test]
fn invalid_code_points_are_replaced() {
    html("&#0; &#55296; &#1234567;", "<p>\u{FFFD} \u{FFFD} \u{FFFD}</p>");
}

#[test]
fn unknown_entities_stay_literal() {
    html("&xyz; &nosuch;", "<p>&amp;xyz; &amp;nosuch;</p>");
}

#[test]
fn escaped_entities_stay_literal() {
    html("\\&trade;", "<p>&amp;trade;</p>");
}

#[test]
fn nbsp_decodes_to_a_nonbreaking_space() {
    html("a&nbsp;b", "<p>a\u{a0}b</p>");
}

use super::*;
use ntest::timeout;

#[test]
#[timeout(4000)]
fn pathological_emphasis_runs() {
    let n = 5_000;
    let input = "*a_ ".repeat(n);
    let mut expected = format!("<p>{}", input);
    // The trailing space is stripped from the output.
    expected.pop();
    expected += "</p>";

    html(&input, &expected);
}

#[test]
#[timeout(4000)]
fn pathological_nested_emphasis() {
    let n = 5_000;
    let input = format!("{}a{}", "*".repeat(n), "*".repeat(n));
    let output = markdown_to_html(&input);
    assert!(output.starts_with("<p>"));
}

#[test]
#[timeout(4000)]
fn pathological_open_brackets() {
    let n = 2_000;
    let input = "[".repeat(n);
    let expected = format!("<p>{}</p>", input);

    html(&input, &expected);
}

#[test]
#[timeout(4000)]
fn pathological_backslashes() {
    let n = 50_000;
    let input = "\\*".repeat(n);
    let expected = format!("<p>{}</p>", "*".repeat(n));

    html(&input, &expected);
}

#[test]
#[timeout(4000)]
fn pathological_blockquote_nesting() {
    let n = 1_000;
    let input = format!("{} deep", "> ".repeat(n));
    let output = markdown_to_html(&input);
    assert!(output.contains("<p>deep</p>"));
}

/// Normalize a link label for reference-map keys: trim, lowercase, and
/// collapse internal whitespace runs to single spaces.
pub fn normalize_label(i: &str) -> String {
    let i = i.trim();
    let mut v = String::with_capacity(i.len());
    let mut last_was_whitespace = false;
    for c in i.chars() {
        for e in c.to_lowercase() {
            if e.is_whitespace() {
                if !last_was_whitespace {
                    last_was_whitespace = true;
                    v.push(' ');
                }
            } else {
                last_was_whitespace = false;
                v.push(e);
            }
        }
    }
    v
}

/// Collapse runs of spaces and newlines to single spaces, as code span
/// contents require.
pub fn collapse_whitespace(i: &str) -> String {
    let mut v = String::with_capacity(i.len());
    let mut in_run = false;
    for c in i.chars() {
        if c == ' ' || c == '\n' {
            if !in_run {
                v.push(' ');
                in_run = true;
            }
        } else {
            v.push(c);
            in_run = false;
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_label_lowercases_and_collapses() {
        assert_eq!(normalize_label("  FoO \t Bar  "), "foo bar");
        assert_eq!(normalize_label("ẞ"), "ß");
    }

    #[test]
    fn collapse_whitespace_handles_newlines() {
        assert_eq!(collapse_whitespace("a  b\nc"), "a b c");
        assert_eq!(collapse_whitespace(" x "), " x ");
    }
}

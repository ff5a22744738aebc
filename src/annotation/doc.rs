use once_cell::sync::Lazy;
use regex::Regex;

/// `@var <rest of line>`; the type is cut out of `rest` afterwards because it
/// may itself contain spaces (`array{float, float}`).
static VAR_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)@var[ \t]+([^\r\n]*)").expect("static regex")
});

/// Every `@var` type found in a doc comment, in order of appearance.
///
/// Zero or several results are legal here; deciding that a property needs
/// exactly one is the generator's job.
pub fn var_annotations(doc: &str) -> Vec<String> {
    VAR_TAG
        .captures_iter(doc)
        .filter_map(|caps| caps.get(1))
        .map(|m| leading_type(m.as_str()))
        .filter(|t| !t.is_empty())
        .collect()
}

/// The type text at the start of `rest`: everything up to the first
/// whitespace outside `<..>` / `{..}` that does not sit next to a `|` (or
/// follow a `?`), minus a closing `*/`.
fn leading_type(rest: &str) -> String {
    let rest = rest.trim_end().trim_end_matches("*/").trim();
    let chars: Vec<char> = rest.chars().collect();
    let mut depth = 0i32;
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() && depth <= 0 {
            let next = chars[i..].iter().position(|c| !c.is_whitespace()).map(|n| i + n);
            let joins = matches!(out.chars().last(), Some('|' | '?'))
                || next.is_some_and(|n| chars[n] == '|');
            match next {
                Some(n) if joins => { i = n; continue; }
                _ => break,
            }
        }
        match c {
            '<' | '{' => depth += 1,
            '>' | '}' => depth -= 1,
            _ => {}
        }
        out.push(c);
        i += 1;
    }
    out
}

/// Trim surrounding whitespace and escape HTML-significant characters,
/// quotes included.
pub fn sanitize(input: &str) -> String {
    escape_html(input.trim())
}

pub fn sanitize_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| sanitize(s))
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

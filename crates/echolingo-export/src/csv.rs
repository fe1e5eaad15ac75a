//! Field-level rendering. Every field is quote-wrapped; embedded quotes
//! are doubled and newlines become a literal break marker so the value
//! survives single-line CSV cell storage.

/// Escape one CSV field
pub fn escape_field(value: &str) -> String {
    let flattened = value
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
        .replace('"', "\"\"");
    format!("\"{flattened}\"")
}

/// Minimal HTML escaping for in-cell markup
pub fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Inline unordered list of HTML-escaped items
pub fn html_list(items: &[String]) -> String {
    let mut out = String::from("<ul>");
    for item in items {
        out.push_str("<li>");
        out.push_str(&html_escape(item));
        out.push_str("</li>");
    }
    out.push_str("</ul>");
    out
}

/// Bullet-prefixed newline-joined fallback rendering
pub fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

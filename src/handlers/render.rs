use std::fs;
use crate::errors::{AppError, AppResult};
use crate::models::Notice;

/// Reads `templates/<name>` and substitutes each `{{key}}` with its value.
/// Values are inserted as given; escape user text with `escape_html` first.
pub fn render_template(name: &str, values: &[(&str, String)]) -> AppResult<String> {
    let path = format!("templates/{}", name);
    let mut html = fs::read_to_string(&path).map_err(|e| {
        tracing::error!("Failed to read template {}: {}", path, e);
        AppError::File(e)
    })?;

    for (key, value) in values {
        html = html.replace(&format!("{{{{{}}}}}", key), value);
    }
    Ok(html)
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Inline banner for messages carried over a redirect.
pub fn notice_html(notice: &Notice) -> String {
    let mut banners = Vec::new();
    for (class, text) in [("error", &notice.error), ("warning", &notice.warning), ("success", &notice.message)] {
        if let Some(text) = text {
            banners.push(format!(r#"<div class="notice {}">{}</div>"#, class, escape_html(text)));
        }
    }
    banners.join("\n")
}

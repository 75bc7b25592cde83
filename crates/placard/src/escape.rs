//! Output transforms applied by escaping directives.

use minijinja::HtmlEscape;

/// HTML-escapes `value` for element content and quoted attributes.
pub fn html(value: &str) -> String {
    HtmlEscape(value).to_string()
}

/// Percent-encodes `value` for use as a URL component.
pub fn url(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Renders `value` as a double-quoted script string literal.
pub fn js(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

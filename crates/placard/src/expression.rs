//! Placeholder expression grammar.
//!
//! An expression is an optional directive prefix followed by a remainder:
//!
//! | expression | prefix | remainder |
//! |---|---|---|
//! | `""` or `"-"` | `""` | `""` |
//! | `"name"` | `""` | `"name"` |
//! | `"-url link"` | `"url"` | `"link"` |
//! | `"-each users row.html"` | `"each"` | `"users row.html"` |
//! | `"-raw"` | `"raw"` | `""` |

/// Marker that introduces a directive prefix.
pub const PREFIX_MARKER: char = '-';

/// Splits an expression into `(prefix, remainder)`.
///
/// If the expression starts with [`PREFIX_MARKER`], everything up to the
/// next whitespace is the prefix (marker stripped) and the trimmed text after
/// that whitespace is the remainder. Otherwise the whole expression is the
/// remainder.
pub fn split(input: &str) -> (&str, &str) {
    let Some(body) = input.strip_prefix(PREFIX_MARKER) else {
        return ("", input);
    };

    match body.find(char::is_whitespace) {
        Some(idx) => (&body[..idx], body[idx..].trim()),
        None => (body, ""),
    }
}

/// How the remainder of an expression is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `-require <template>`: inline a cached template.
    Require,
    /// `-each <binding>[.<path>] <template>`: render a template per element.
    Each,
    /// `-js <binding>`: script string literal.
    Js,
    /// `-raw <binding>`: unescaped.
    Raw,
    /// `-html <binding>`: unescaped, the value is already markup.
    Html,
    /// `-url <binding>`: percent-encoded.
    Url,
    /// `-include <binding>`: the value names a template to require.
    Include,
    /// No prefix: HTML-escaped.
    Default,
    /// Any other prefix.
    Other(&'a str),
}

impl<'a> Directive<'a> {
    pub fn from_prefix(prefix: &'a str) -> Self {
        match prefix {
            "" => Directive::Default,
            "require" => Directive::Require,
            "each" => Directive::Each,
            "js" => Directive::Js,
            "raw" => Directive::Raw,
            "html" => Directive::Html,
            "url" => Directive::Url,
            "include" => Directive::Include,
            other => Directive::Other(other),
        }
    }
}

/// A split placeholder expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expression<'a> {
    pub prefix: &'a str,
    pub remainder: &'a str,
}

impl<'a> Expression<'a> {
    pub fn parse(input: &'a str) -> Self {
        let (prefix, remainder) = split(input);
        Self { prefix, remainder }
    }

    /// True for `""` and `"-"`, which resolve to nothing.
    pub fn is_blank(&self) -> bool {
        self.prefix.is_empty() && self.remainder.is_empty()
    }

    pub fn directive(&self) -> Directive<'a> {
        Directive::from_prefix(self.prefix)
    }
}

//! Placeholder scanner for `<@ ... @>` templates.
//!
//! This crate finds placeholder expressions in a template source and renders
//! the template by handing every expression to a resolver. It knows nothing
//! about what an expression means: literal text is copied verbatim and each
//! placeholder is replaced by whatever the resolver returns.
//!
//! # Example
//!
//! ```rust
//! use placard_scan::Template;
//!
//! let template = Template::parse("Hello <@ name @>!");
//! let output = template.render(&mut |expr: &str| match expr {
//!     "name" => "Donald".to_string(),
//!     _ => String::new(),
//! });
//! assert_eq!(output, "Hello Donald!");
//! ```
//!
//! # Syntax
//!
//! - A placeholder starts with the open delimiter (`<@` by default) and ends
//!   at the next close delimiter (`@>` by default).
//! - Whitespace around the expression is trimmed: `<@name@>` and
//!   `<@ name @>` both resolve `"name"`.
//! - An open delimiter without a close delimiter is literal text.
//! - Placeholders do not nest.

use std::fmt;
use std::ops::Range;

/// Default opening delimiter.
pub const DEFAULT_OPEN: &str = "<@";

/// Default closing delimiter.
pub const DEFAULT_CLOSE: &str = "@>";

/// Error returned when a delimiter pair cannot be used for scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelimiterError {
    /// One of the delimiters is the empty string.
    Empty,
}

impl fmt::Display for DelimiterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelimiterError::Empty => write!(f, "delimiters must not be empty"),
        }
    }
}

impl std::error::Error for DelimiterError {}

/// The marker pair that surrounds a placeholder expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    open: String,
    close: String,
}

impl Delimiters {
    /// Creates a delimiter pair.
    ///
    /// # Errors
    ///
    /// Returns [`DelimiterError::Empty`] if either marker is empty.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Result<Self, DelimiterError> {
        let open = open.into();
        let close = close.into();
        if open.is_empty() || close.is_empty() {
            return Err(DelimiterError::Empty);
        }
        Ok(Self { open, close })
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: DEFAULT_OPEN.to_string(),
            close: DEFAULT_CLOSE.to_string(),
        }
    }
}

/// Something that turns a placeholder expression into its substitution.
///
/// The renderer calls [`Resolve::resolve`] exactly once per placeholder
/// occurrence, in source order. A blanket implementation covers closures.
pub trait Resolve {
    /// Returns the text that replaces the placeholder `expression`.
    fn resolve(&mut self, expression: &str) -> String;
}

impl<F> Resolve for F
where
    F: FnMut(&str) -> String,
{
    fn resolve(&mut self, expression: &str) -> String {
        (self)(expression)
    }
}

/// A piece of a parsed template, as a byte range into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Literal text copied to the output.
    Text(Range<usize>),
    /// Trimmed placeholder expression handed to the resolver.
    Placeholder(Range<usize>),
}

/// A template parsed once and rendered any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parses a template using the default `<@ ... @>` delimiters.
    pub fn parse(source: impl Into<String>) -> Self {
        Self::parse_with(source, &Delimiters::default())
    }

    /// Parses a template using a custom delimiter pair.
    pub fn parse_with(source: impl Into<String>, delimiters: &Delimiters) -> Self {
        let source = source.into();
        let segments = Tokenizer::new(&source, delimiters).collect();
        Self { source, segments }
    }

    /// The template source as parsed.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Iterates over the placeholder expressions in source order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(range) => Some(&self.source[range.clone()]),
            Segment::Text(_) => None,
        })
    }

    /// Returns true if the template contains no placeholders.
    pub fn is_static(&self) -> bool {
        self.placeholders().next().is_none()
    }

    /// Renders the template into a new string.
    pub fn render<R: Resolve + ?Sized>(&self, resolver: &mut R) -> String {
        let mut output = String::with_capacity(self.source.len());
        self.render_into(&mut output, resolver);
        output
    }

    /// Renders the template, appending to `output`.
    pub fn render_into<R: Resolve + ?Sized>(&self, output: &mut String, resolver: &mut R) {
        for segment in &self.segments {
            match segment {
                Segment::Text(range) => output.push_str(&self.source[range.clone()]),
                Segment::Placeholder(range) => {
                    output.push_str(&resolver.resolve(&self.source[range.clone()]));
                }
            }
        }
    }
}

/// Splits a source into text and placeholder segments.
struct Tokenizer<'a> {
    input: &'a str,
    delimiters: &'a Delimiters,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str, delimiters: &'a Delimiters) -> Self {
        Self {
            input,
            delimiters,
            pos: 0,
        }
    }

    /// Consumes the rest of the input as text.
    fn rest_as_text(&mut self) -> Segment {
        let start = self.pos;
        self.pos = self.input.len();
        Segment::Text(start..self.input.len())
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }

        let remaining = &self.input[self.pos..];
        let open = self.delimiters.open();
        let close = self.delimiters.close();

        match remaining.find(open) {
            Some(0) => {
                let body_start = self.pos + open.len();
                let Some(close_offset) = self.input[body_start..].find(close) else {
                    // Unclosed placeholder - rest is text
                    return Some(self.rest_as_text());
                };

                let body_end = body_start + close_offset;
                let body = &self.input[body_start..body_end];
                let start = body_start + (body.len() - body.trim_start().len());
                let end = start + body.trim().len();

                self.pos = body_end + close.len();
                Some(Segment::Placeholder(start..end))
            }
            Some(offset) => {
                let start = self.pos;
                self.pos += offset;
                Some(Segment::Text(start..self.pos))
            }
            None => Some(self.rest_as_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(expr: &str) -> String {
        format!("[{}]", expr)
    }

    mod parsing {
        use super::*;

        #[test]
        fn plain_text_has_no_placeholders() {
            let template = Template::parse("hello world");
            assert!(template.is_static());
            assert_eq!(template.segments, vec![Segment::Text(0..11)]);
        }

        #[test]
        fn empty_source_has_no_segments() {
            let template = Template::parse("");
            assert!(template.segments.is_empty());
            assert!(template.is_static());
        }

        #[test]
        fn placeholder_is_trimmed() {
            let template = Template::parse("a<@  name\t@>b");
            assert_eq!(template.placeholders().collect::<Vec<_>>(), vec!["name"]);
        }

        #[test]
        fn directive_expression_keeps_inner_spaces() {
            let template = Template::parse("<@-each users row.html@>");
            assert_eq!(
                template.placeholders().collect::<Vec<_>>(),
                vec!["-each users row.html"]
            );
        }

        #[test]
        fn unclosed_placeholder_is_text() {
            let template = Template::parse("before <@ never closed");
            assert!(template.is_static());
            assert_eq!(template.render(&mut echo), "before <@ never closed");
        }

        #[test]
        fn empty_placeholder_is_still_a_placeholder() {
            let template = Template::parse("<@@>");
            assert_eq!(template.placeholders().collect::<Vec<_>>(), vec![""]);
        }

        #[test]
        fn adjacent_placeholders() {
            let template = Template::parse("<@a@><@b@>");
            assert_eq!(template.placeholders().collect::<Vec<_>>(), vec!["a", "b"]);
        }

        #[test]
        fn custom_delimiters() {
            let delimiters = Delimiters::new("{{", "}}").unwrap();
            let template = Template::parse_with("x {{ y }} <@z@>", &delimiters);
            assert_eq!(template.placeholders().collect::<Vec<_>>(), vec!["y"]);
        }

        #[test]
        fn empty_delimiters_rejected() {
            assert_eq!(Delimiters::new("", "@>"), Err(DelimiterError::Empty));
            assert_eq!(Delimiters::new("<@", ""), Err(DelimiterError::Empty));
        }

        #[test]
        fn multibyte_text_is_preserved() {
            let template = Template::parse("grüße <@ wer @> ✓");
            assert_eq!(template.render(&mut echo), "grüße [wer] ✓");
        }
    }

    mod rendering {
        use super::*;

        #[test]
        fn text_and_values_in_order() {
            let template = Template::parse("<@a@>-<@b@>-<@c@>");
            assert_eq!(template.render(&mut echo), "[a]-[b]-[c]");
        }

        #[test]
        fn one_call_per_occurrence() {
            let template = Template::parse("<@x@> and <@x@> and <@y@>");
            let mut calls = Vec::new();
            template.render(&mut |expr: &str| {
                calls.push(expr.to_string());
                String::new()
            });
            assert_eq!(calls, vec!["x", "x", "y"]);
        }

        #[test]
        fn render_into_appends() {
            let template = Template::parse("<@v@>!");
            let mut output = String::from("> ");
            template.render_into(&mut output, &mut echo);
            assert_eq!(output, "> [v]!");
        }

        #[test]
        fn resolver_output_is_not_rescanned() {
            let template = Template::parse("<@a@>");
            let output = template.render(&mut |_: &str| "<@b@>".to_string());
            assert_eq!(output, "<@b@>");
        }
    }
}

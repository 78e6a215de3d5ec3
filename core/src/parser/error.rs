use crate::api::{Diagnostic, Severity};
use crate::parser::Rule;
use crate::syntax::Span;
use crate::{String, ToString, Vec, format};

/// Parser error with the span it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// The grammar expected something else here
    UnexpectedToken { expected: String, found: String },
    /// Literal that does not fit its type (e.g. an integer past `i32::MAX`)
    InvalidNumber { text: String },
    /// Catch-all for pest errors we don't specifically handle
    Other { message: String },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, code, help) = match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, found } => (
                format!("Expected {}, found {}", expected, found),
                "P001",
                None,
            ),
            ParseErrorKind::InvalidNumber { text } => (
                format!("Invalid number literal '{}'", text),
                "P003",
                Some("Integer literals must fit in 32 bits".to_string()),
            ),
            ParseErrorKind::Other { message } => (message.clone(), "P999", None),
        };

        Diagnostic {
            severity: Severity::Error,
            message,
            span: self.span.clone(),
            help,
            code: Some(code.to_string()),
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let diagnostic = self.to_diagnostic();
        write!(f, "{}: {}", diagnostic.severity, diagnostic.message)?;
        if let Some(code) = &diagnostic.code {
            write!(f, " [{}]", code)?;
        }
        Ok(())
    }
}

impl core::error::Error for ParseError {}

/// Prefix of the custom pest error raised for literals that fail to convert.
pub(crate) const INVALID_NUMBER: &str = "invalid number literal: ";

/// Convert Pest error to human-readable ParseError
pub fn convert_pest_error(err: pest::error::Error<Rule>) -> ParseError {
    use pest::error::{ErrorVariant, InputLocation};

    let span = match err.location {
        InputLocation::Pos(pos) => Span(pos..pos),
        InputLocation::Span((start, end)) => Span(start..end),
    };

    let kind = match err.variant {
        ErrorVariant::ParsingError {
            positives,
            negatives,
        } => ParseErrorKind::UnexpectedToken {
            expected: describe_rules(&positives, "something else"),
            found: describe_rules(&negatives, "unexpected input"),
        },
        ErrorVariant::CustomError { message } => match message.strip_prefix(INVALID_NUMBER) {
            Some(text) => ParseErrorKind::InvalidNumber {
                text: text.to_string(),
            },
            None => ParseErrorKind::Other { message },
        },
    };

    ParseError::new(kind, span)
}

fn describe_rules(rules: &[Rule], fallback: &str) -> String {
    let mut names: Vec<&'static str> = rules.iter().map(|rule| rule_name(*rule)).collect();
    names.sort_unstable();
    names.dedup();
    match names.as_slice() {
        [] => fallback.to_string(),
        [one] => one.to_string(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

fn rule_name(rule: Rule) -> &'static str {
    match rule {
        Rule::EOI => "end of input",
        Rule::expression | Rule::if_expr | Rule::block | Rule::call => "expression",
        Rule::assignment | Rule::statements => "statement",
        Rule::ident => "identifier",
        Rule::null | Rule::na | Rule::boolean | Rule::integer | Rule::double => "literal",
        Rule::not | Rule::neg => "unary operator",
        Rule::eq | Rule::neq | Rule::lt | Rule::le | Rule::gt | Rule::ge => "comparison operator",
        Rule::else_clause | Rule::else_kw => "'else'",
        _ => "input",
    }
}

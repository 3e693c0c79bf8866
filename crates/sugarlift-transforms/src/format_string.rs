//! Composite-format strings to interpolated strings.
//!
//! `string.Format("{0} of {1:N2}", a, b)` becomes `$"{a} of {b:N2}"` when the
//! format string references every argument exactly once, in order. Anything
//! else (reordering, reuse, alignment, malformed braces) keeps the call.

use std::mem;

use thiserror::Error;
use tracing::debug;

use sugarlift_core::{Expr, ExprKind, InterpolatedContent, Literal, MethodSymbol};

pub(crate) const STRING_FORMAT: &str = "System.String.Format";

/// A lexical piece of a composite-format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatToken {
    /// Literal text with `{{`/`}}` already unescaped.
    Text(String),
    /// `{n}`.
    Argument(usize),
    /// `{n:spec}`.
    ArgumentWithFormat(usize, String),
    /// Malformed input; always the last token.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    Argument,
    ArgumentWithFormat,
}

fn argument_token(index: &str, spec: Option<String>) -> FormatToken {
    // Alignment (`{0,5}`) and anything else non-numeric fall through to Error.
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return FormatToken::Error;
    }
    let Ok(index) = index.parse::<usize>() else {
        return FormatToken::Error;
    };
    match spec {
        None => FormatToken::Argument(index),
        Some(spec) => FormatToken::ArgumentWithFormat(index, spec),
    }
}

/// Splits a composite-format string into tokens.
///
/// Scanning stops at the first malformed construct, which is reported as a
/// trailing [`FormatToken::Error`].
pub fn tokenize(format: &str) -> Vec<FormatToken> {
    let mut tokens = Vec::new();
    let mut state = State::Text;
    let mut text = String::new();
    let mut index = String::new();
    let mut spec = String::new();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        match (state, c) {
            (State::Text, '{') if chars.peek() == Some(&'{') => {
                chars.next();
                text.push('{');
            }
            (State::Text, '}') if chars.peek() == Some(&'}') => {
                chars.next();
                text.push('}');
            }
            (State::Text, '{') => {
                if !text.is_empty() {
                    tokens.push(FormatToken::Text(mem::take(&mut text)));
                }
                state = State::Argument;
            }
            (State::Text, c) if c != '}' => text.push(c),
            (State::Argument, ':') => state = State::ArgumentWithFormat,
            (State::Argument, '}') => {
                let token = argument_token(&mem::take(&mut index), None);
                let failed = token == FormatToken::Error;
                tokens.push(token);
                if failed {
                    return tokens;
                }
                state = State::Text;
            }
            (State::ArgumentWithFormat, '}') => {
                let token = argument_token(&mem::take(&mut index), Some(mem::take(&mut spec)));
                let failed = token == FormatToken::Error;
                tokens.push(token);
                if failed {
                    return tokens;
                }
                state = State::Text;
            }
            (State::Argument, c) if c != '{' => index.push(c),
            (State::ArgumentWithFormat, c) if c != '{' => spec.push(c),
            // A lone `}` in text, or `{` inside an argument.
            _ => {
                tokens.push(FormatToken::Error);
                return tokens;
            }
        }
    }

    match state {
        State::Text => {
            if !text.is_empty() {
                tokens.push(FormatToken::Text(text));
            }
        }
        State::Argument | State::ArgumentWithFormat => tokens.push(FormatToken::Error),
    }
    tokens
}

/// A validated piece of the interpolated string to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// The next format argument, with its format specifier.
    Argument { index: usize, format: Option<String> },
}

/// Why a format string cannot become an interpolated string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatDecline {
    #[error("malformed format string")]
    Malformed,
    #[error("argument {found} referenced where {expected} was expected")]
    OutOfOrder { expected: usize, found: usize },
    #[error("empty format specifier for argument {0}")]
    EmptyFormatSpec(usize),
    #[error("argument {index} referenced but only {available} supplied")]
    MissingArgument { index: usize, available: usize },
    #[error("{0} argument(s) never referenced")]
    UnusedArguments(usize),
}

/// Validates `format` against `argument_count` format arguments.
///
/// Every argument must be referenced exactly once, in order, so the rewrite
/// keeps each argument's evaluation and its position.
pub fn plan(format: &str, argument_count: usize) -> Result<Vec<Segment>, FormatDecline> {
    let mut segments = Vec::new();
    let mut expected = 0;
    for token in tokenize(format) {
        let (index, format) = match token {
            FormatToken::Text(text) => {
                segments.push(Segment::Text(text));
                continue;
            }
            FormatToken::Error => return Err(FormatDecline::Malformed),
            FormatToken::Argument(index) => (index, None),
            FormatToken::ArgumentWithFormat(index, spec) => {
                if spec.is_empty() {
                    return Err(FormatDecline::EmptyFormatSpec(index));
                }
                (index, Some(spec))
            }
        };
        if index != expected {
            return Err(FormatDecline::OutOfOrder {
                expected,
                found: index,
            });
        }
        if index >= argument_count {
            return Err(FormatDecline::MissingArgument {
                index,
                available: argument_count,
            });
        }
        segments.push(Segment::Argument { index, format });
        expected += 1;
    }
    if expected < argument_count {
        return Err(FormatDecline::UnusedArguments(argument_count - expected));
    }
    Ok(segments)
}

/// Assembles the interpolated-string content from a plan and its arguments.
pub fn build(segments: Vec<Segment>, args: impl IntoIterator<Item = Expr>) -> Vec<InterpolatedContent> {
    let mut args = args.into_iter();
    segments
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Text(text) => Some(InterpolatedContent::Text(text)),
            Segment::Argument { format, .. } => args.next().map(|expr| {
                // `{c ? a : b}` would read the `:` as a format specifier.
                let expr = if matches!(expr.kind, ExprKind::Conditional { .. }) {
                    Expr::parenthesized(expr)
                } else {
                    expr
                };
                InterpolatedContent::Interpolation { expr, format }
            }),
        })
        .collect()
}

/// `string.Format("...", args)` → `$"..."`.
pub(crate) fn reconstruct(call: &mut Expr, method: &MethodSymbol) -> bool {
    if method.full_name() != STRING_FORMAT {
        return false;
    }
    let args = call.arguments();
    if args.len() < 2 {
        return false;
    }
    let ExprKind::Primitive(Literal::String(format)) = &args[0].kind else {
        return false;
    };
    if args[1..]
        .iter()
        .any(|a| a.any_descendant_or_self(&Expr::is_string_literal))
    {
        debug!(format = %format, "keeping string.Format call: nested string literal");
        return false;
    }
    if args
        .iter()
        .any(|a| matches!(a.kind, ExprKind::NamedArgument { .. }))
    {
        return false;
    }
    // `string.Format(fmt, array)` passes the params array itself.
    let unexpanded_params = method.parameters.last().is_some_and(|p| p.ty.is_array())
        && method.parameters.len() == args.len();
    if unexpanded_params {
        return false;
    }

    let segments = match plan(format, args.len() - 1) {
        Ok(segments) => segments,
        Err(reason) => {
            debug!(format = %format, %reason, "keeping string.Format call");
            return false;
        }
    };
    let content = build(segments, call.take_arguments().into_iter().skip(1));
    call.replace_and_copy_annotations(Expr::interpolated(content));
    true
}

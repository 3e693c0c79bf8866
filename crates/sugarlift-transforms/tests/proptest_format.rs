//! Property-based tests for composite-format reconstruction.
//!
//! The reconstructor must either decline or produce exactly one interpolation
//! per argument, in argument order, and must never panic on arbitrary input.

use proptest::prelude::*;

use sugarlift_transforms::format_string::{build, plan, tokenize, Segment};
use sugarlift_transforms::{FormatDecline, FormatToken};

use sugarlift_core::{Expr, InterpolatedContent};

/// Literal text that needs no escaping.
fn plain_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,.;=!-]{0,8}"
}

/// Optional format specifier.
fn format_spec() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[A-Za-z0-9#.]{1,4}")
}

/// Builds a well-formed format string referencing `0..pieces.len()` in order.
fn well_formed(prefix: &str, pieces: &[(Option<String>, String)]) -> String {
    let mut format = prefix.to_string();
    for (i, (spec, text)) in pieces.iter().enumerate() {
        match spec {
            Some(spec) => format.push_str(&format!("{{{}:{}}}", i, spec)),
            None => format.push_str(&format!("{{{}}}", i)),
        }
        format.push_str(text);
    }
    format
}

// =============================================================================
// Tokenizer Safety Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(5000))]

    /// Tokenizing arbitrary strings never panics.
    #[test]
    fn tokenize_never_panics(s in ".*") {
        let _ = tokenize(&s);
    }

    /// An error token, if present, is always the last token.
    #[test]
    fn error_token_is_last(s in "[{}0-9a-z:,]*") {
        let tokens = tokenize(&s);
        if let Some(pos) = tokens.iter().position(|t| *t == FormatToken::Error) {
            prop_assert_eq!(pos, tokens.len() - 1);
        }
    }

    /// Text without braces is a single text token.
    #[test]
    fn brace_free_text_is_one_token(s in "[^{}]+") {
        prop_assert_eq!(tokenize(&s), vec![FormatToken::Text(s.clone())]);
    }

    /// Doubled braces always unescape to single braces.
    #[test]
    fn doubled_braces_unescape(a in plain_text(), b in plain_text()) {
        let format = format!("{}{{{{{}}}}}", a, b);
        let expected = format!("{}{{{}}}", a, b);
        prop_assert_eq!(tokenize(&format), vec![FormatToken::Text(expected)]);
    }
}

// =============================================================================
// Plan Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Plans either decline or reference every argument once, in order.
    #[test]
    fn plan_declines_or_covers_arguments(s in "[{}0-3a-z:]{0,16}", count in 0usize..4) {
        if let Ok(segments) = plan(&s, count) {
            let indices: Vec<usize> = segments
                .iter()
                .filter_map(|seg| match seg {
                    Segment::Argument { index, .. } => Some(*index),
                    Segment::Text(_) => None,
                })
                .collect();
            prop_assert_eq!(indices, (0..count).collect::<Vec<_>>());
        }
    }

    /// Well-formed format strings are always accepted.
    #[test]
    fn well_formed_is_accepted(
        prefix in plain_text(),
        pieces in prop::collection::vec((format_spec(), plain_text()), 1..5),
    ) {
        let format = well_formed(&prefix, &pieces);
        let segments = plan(&format, pieces.len());
        prop_assert!(segments.is_ok(), "{:?} rejected: {:?}", format, segments);
    }

    /// Supplying more arguments than the format references declines.
    #[test]
    fn extra_arguments_decline(
        pieces in prop::collection::vec((format_spec(), plain_text()), 1..4),
        extra in 1usize..3,
    ) {
        let format = well_formed("", &pieces);
        prop_assert_eq!(
            plan(&format, pieces.len() + extra),
            Err(FormatDecline::UnusedArguments(extra))
        );
    }

    /// Building keeps argument order and carries format specifiers through.
    #[test]
    fn build_preserves_order(
        pieces in prop::collection::vec((format_spec(), plain_text()), 1..5),
    ) {
        let format = well_formed("", &pieces);
        let segments = plan(&format, pieces.len()).unwrap();
        let args: Vec<Expr> = (0..pieces.len()).map(|i| Expr::ident(format!("v{}", i))).collect();
        let content = build(segments, args.clone());

        let interpolations: Vec<(Expr, Option<String>)> = content
            .into_iter()
            .filter_map(|c| match c {
                InterpolatedContent::Interpolation { expr, format } => Some((expr, format)),
                InterpolatedContent::Text(_) => None,
            })
            .collect();
        prop_assert_eq!(interpolations.len(), args.len());
        for (i, (expr, format)) in interpolations.into_iter().enumerate() {
            prop_assert_eq!(&expr, &args[i]);
            prop_assert_eq!(format, pieces[i].0.clone());
        }
    }
}

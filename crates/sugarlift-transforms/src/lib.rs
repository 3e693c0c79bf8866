//! # sugarlift-transforms
//!
//! Recovers C# operator syntax from decompiled trees. Compiled code encodes
//! operators, string concatenation, `typeof` and composite formatting as plain
//! method calls; [`ReplaceMethodCallsWithOperators`] recognizes those call
//! shapes and rewrites them back into the syntax they came from.
//!
//! # Example
//!
//! ```
//! use sugarlift_core::{Expr, MethodSymbol, TypeSig};
//! use sugarlift_transforms::{
//!     DefaultTypeBuilder, ReplaceMethodCallsWithOperators, TransformContext, TransformSettings,
//! };
//!
//! let symbol = MethodSymbol::new_static(TypeSig::named("Geometry", "Vector"), "op_Addition");
//! let mut expr = Expr::invoke(Expr::ident("op_Addition"), vec![Expr::ident("a"), Expr::ident("b")])
//!     .with_method(symbol);
//!
//! let settings = TransformSettings::default();
//! let builder = DefaultTypeBuilder::default();
//! let ctx = TransformContext::new(&settings, &builder);
//! ReplaceMethodCallsWithOperators::new().run_expr(&mut expr, &ctx);
//! assert_eq!(expr.to_string(), "a + b");
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod format_string;
mod handles;
pub mod operators;
pub mod pattern;
pub mod replace_calls;
pub mod type_builder;

#[cfg(test)]
mod test_util;

pub use config::{LanguageVersion, RewriteRule, TransformSettings};
pub use context::TransformContext;
pub use error::{TransformError, TransformResult};
pub use format_string::{FormatDecline, FormatToken};
pub use replace_calls::{AstTransform, ReplaceMethodCallsWithOperators};
pub use type_builder::{DefaultTypeBuilder, TypeSyntaxBuilder};

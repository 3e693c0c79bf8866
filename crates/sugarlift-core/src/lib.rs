//! # sugarlift-core
//!
//! Core abstractions for sugarlift. This crate defines the syntax tree that
//! decompiled C# code is represented as, the annotations attached to its nodes
//! (resolved symbols, instruction provenance), the semantic type signatures
//! those symbols refer to, and the detach/replace primitives rewrites use.

pub mod annotation;
pub mod ast;
pub mod error;
pub mod output;
pub mod surgery;
pub mod symbol;
pub mod types;

pub use annotation::{Annotation, Annotations, InstructionRange};
pub use ast::{
    AstType, BinaryOperator, Expr, ExprKind, FieldDirection, InterpolatedContent, Literal, Role,
    Stmt, UnaryOperator,
};
pub use error::{Error, Result};
pub use output::{escape_interpolated_text, escape_string};
pub use symbol::{FieldSymbol, MethodSymbol, Parameter, Symbol};
pub use types::{KnownType, TypeParameter, TypeSig};

//! Syntax tree for decompiled C# code.
//!
//! Every node owns its children (`Box`/`Vec`), so a subtree has exactly one
//! parent. Moving a subtree elsewhere goes through the surgery helpers in
//! [`crate::surgery`], which leave a [`ExprKind::Null`] hole behind.

use crate::annotation::{Annotation, Annotations, InstructionRange};
use crate::symbol::{FieldSymbol, MethodSymbol, Symbol};
use crate::types::{KnownType, TypeSig};

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Annotations::is_empty"))]
    pub annotations: Annotations,
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExprKind {
    /// Placeholder left behind by a detach. Never present in a finished tree.
    Null,

    /// A simple name: local, parameter, or unqualified member.
    Identifier(String),

    /// A literal value.
    Primitive(Literal),

    /// A type used in expression position (`Console` in `Console.WriteLine`).
    TypeReference(AstType),

    /// `typeof(T)`.
    TypeOf(AstType),

    /// The `__reftype(x)` intrinsic.
    RefType(Box<Expr>),

    /// `target.member<type_args>`.
    MemberAccess {
        target: Box<Expr>,
        member: String,
        #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
        type_args: Vec<AstType>,
    },

    /// `target(args...)`.
    Invocation { target: Box<Expr>, args: Vec<Expr> },

    /// `left op right`.
    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `op operand`.
    Unary {
        op: UnaryOperator,
        operand: Box<Expr>,
    },

    /// `(ty)expr`.
    Cast { ty: AstType, expr: Box<Expr> },

    /// `new ty(args...)`.
    ObjectCreation { ty: AstType, args: Vec<Expr> },

    /// `$"..."`.
    InterpolatedString(Vec<InterpolatedContent>),

    /// `cond ? then_expr : else_expr`.
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },

    /// `(expr)`.
    Parenthesized(Box<Expr>),

    /// An argument passed with `in`, `ref` or `out`.
    Direction {
        direction: FieldDirection,
        expr: Box<Expr>,
    },

    /// `name: expr` in an argument list.
    NamedArgument { name: String, expr: Box<Expr> },
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    /// An integral `decimal` literal (`1m`).
    Decimal(i64),
    Float(f64),
    Char(char),
    String(String),
}

/// Binary operator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,

    // Bitwise
    BitwiseAnd,
    BitwiseOr,
    ExclusiveOr,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,

    // Comparison
    Equality,
    InEquality,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl BinaryOperator {
    /// Returns the operator token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulus => "%",
            Self::BitwiseAnd => "&",
            Self::BitwiseOr => "|",
            Self::ExclusiveOr => "^",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::UnsignedShiftRight => ">>>",
            Self::Equality => "==",
            Self::InEquality => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        }
    }

    /// Returns precedence (higher = binds tighter).
    pub fn precedence(&self) -> u8 {
        match self {
            Self::BitwiseOr => 3,
            Self::ExclusiveOr => 4,
            Self::BitwiseAnd => 5,
            Self::Equality | Self::InEquality => 6,
            Self::LessThan | Self::LessThanOrEqual | Self::GreaterThan | Self::GreaterThanOrEqual => 7,
            Self::ShiftLeft | Self::ShiftRight | Self::UnsignedShiftRight => 8,
            Self::Add | Self::Subtract => 9,
            Self::Multiply | Self::Divide | Self::Modulus => 10,
        }
    }
}

/// Unary operator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UnaryOperator {
    Not,       // !x
    BitNot,    // ~x
    Minus,     // -x
    Plus,      // +x
    Increment, // ++x
    Decrement, // --x
}

impl UnaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::BitNot => "~",
            Self::Minus => "-",
            Self::Plus => "+",
            Self::Increment => "++",
            Self::Decrement => "--",
        }
    }
}

/// Argument passing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FieldDirection {
    In,
    Ref,
    Out,
}

impl FieldDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Ref => "ref",
            Self::Out => "out",
        }
    }
}

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InterpolatedContent {
    /// Literal text, unescaped (a `{` here is a single brace).
    Text(String),
    /// `{expr}` or `{expr:format}`.
    Interpolation {
        expr: Expr,
        #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
        format: Option<String>,
    },
}

/// Syntax for a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AstType {
    /// A keyword type (`int`, `string`).
    Primitive(String),
    /// An unqualified name.
    Simple {
        name: String,
        #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
        type_args: Vec<AstType>,
    },
    /// `target.name`.
    Member {
        target: Box<AstType>,
        name: String,
        #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
        type_args: Vec<AstType>,
    },
    /// `element[]`.
    Array { element: Box<AstType>, rank: u32 },
}

impl AstType {
    pub fn primitive(keyword: impl Into<String>) -> Self {
        Self::Primitive(keyword.into())
    }

    pub fn simple(name: impl Into<String>) -> Self {
        Self::Simple {
            name: name.into(),
            type_args: Vec::new(),
        }
    }

    /// Builds `A.B.C` from a dotted name.
    pub fn qualified(dotted: &str) -> Self {
        let mut parts = dotted.split('.');
        let first = parts.next().unwrap_or_default();
        parts.fold(Self::simple(first), |target, name| Self::Member {
            target: Box::new(target),
            name: name.to_string(),
            type_args: Vec::new(),
        })
    }

    /// The rightmost name (or keyword).
    pub fn name(&self) -> &str {
        match self {
            Self::Primitive(kw) => kw,
            Self::Simple { name, .. } | Self::Member { name, .. } => name,
            Self::Array { element, .. } => element.name(),
        }
    }

    /// Checks whether this syntax spells the type `full_name` (`Namespace.Name`).
    ///
    /// An unqualified name matches on its last segment; a keyword matches the
    /// corresponding `System` type.
    pub fn refers_to(&self, full_name: &str) -> bool {
        match self {
            Self::Primitive(kw) => KnownType::all()
                .iter()
                .any(|k| k.keyword() == kw.as_str() && format!("System.{}", k.name()) == full_name),
            Self::Simple { name, type_args } => {
                type_args.is_empty() && full_name.rsplit('.').next() == Some(name.as_str())
            }
            Self::Member { type_args, .. } => {
                type_args.is_empty() && self.dotted_name().as_deref() == Some(full_name)
            }
            Self::Array { .. } => false,
        }
    }

    /// `A.B.C` for a chain of non-generic names.
    fn dotted_name(&self) -> Option<String> {
        match self {
            Self::Simple { name, type_args } if type_args.is_empty() => Some(name.clone()),
            Self::Member {
                target,
                name,
                type_args,
            } if type_args.is_empty() => Some(format!("{}.{}", target.dotted_name()?, name)),
            _ => None,
        }
    }
}

/// The syntactic slot a child occupies in its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Condition of an `if`, `while` or `?:`.
    Condition,
    /// Callee of an invocation.
    Target,
    /// Argument of an invocation or object creation.
    Argument,
    /// Any other expression slot.
    Expression,
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Stmt {
    Expr(Expr),
    VarDecl {
        ty: AstType,
        name: String,
        #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
        init: Option<Expr>,
    },
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
        else_body: Option<Vec<Stmt>>,
    },
    While { cond: Expr, body: Vec<Stmt> },
    Return(Option<Expr>),
    Block(Vec<Stmt>),
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            annotations: Annotations::new(),
        }
    }

    /// The detached-slot placeholder.
    pub fn null() -> Self {
        Self::new(ExprKind::Null)
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Identifier(name.into()))
    }

    pub fn literal(value: Literal) -> Self {
        Self::new(ExprKind::Primitive(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(Literal::String(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Self::literal(Literal::Int(value))
    }

    pub fn type_reference(ty: AstType) -> Self {
        Self::new(ExprKind::TypeReference(ty))
    }

    pub fn type_of(ty: AstType) -> Self {
        Self::new(ExprKind::TypeOf(ty))
    }

    pub fn ref_type(expr: Expr) -> Self {
        Self::new(ExprKind::RefType(Box::new(expr)))
    }

    pub fn member(target: Expr, member: impl Into<String>) -> Self {
        Self::new(ExprKind::MemberAccess {
            target: Box::new(target),
            member: member.into(),
            type_args: Vec::new(),
        })
    }

    pub fn invoke(target: Expr, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Invocation {
            target: Box::new(target),
            args,
        })
    }

    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(op: UnaryOperator, operand: Expr) -> Self {
        Self::new(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn cast(ty: AstType, expr: Expr) -> Self {
        Self::new(ExprKind::Cast {
            ty,
            expr: Box::new(expr),
        })
    }

    pub fn object_creation(ty: AstType, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::ObjectCreation { ty, args })
    }

    pub fn interpolated(content: Vec<InterpolatedContent>) -> Self {
        Self::new(ExprKind::InterpolatedString(content))
    }

    pub fn conditional(cond: Expr, then_expr: Expr, else_expr: Expr) -> Self {
        Self::new(ExprKind::Conditional {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    pub fn parenthesized(expr: Expr) -> Self {
        Self::new(ExprKind::Parenthesized(Box::new(expr)))
    }

    pub fn direction(direction: FieldDirection, expr: Expr) -> Self {
        Self::new(ExprKind::Direction {
            direction,
            expr: Box::new(expr),
        })
    }

    pub fn named_argument(name: impl Into<String>, expr: Expr) -> Self {
        Self::new(ExprKind::NamedArgument {
            name: name.into(),
            expr: Box::new(expr),
        })
    }

    /// Adds an annotation (builder style).
    pub fn with(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_method(self, method: MethodSymbol) -> Self {
        self.with(Annotation::Symbol(Symbol::Method(method)))
    }

    pub fn with_field(self, field: FieldSymbol) -> Self {
        self.with(Annotation::Symbol(Symbol::Field(field)))
    }

    pub fn with_type(self, ty: TypeSig) -> Self {
        self.with(Annotation::ResolvedType(ty))
    }

    pub fn with_instructions(self, start: u32, end: u32) -> Self {
        self.with(Annotation::Instructions(vec![InstructionRange::new(start, end)]))
    }

    pub fn with_load_token(self) -> Self {
        self.with(Annotation::LoadToken)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ExprKind::Null)
    }

    /// Checks whether this is a string literal.
    pub fn is_string_literal(&self) -> bool {
        matches!(self.kind, ExprKind::Primitive(Literal::String(_)))
    }

    /// The statically known type of this expression, from annotations or literal form.
    pub fn static_type(&self) -> Option<TypeSig> {
        if let Some(ty) = self.annotations.resolved_type() {
            return Some(ty.clone());
        }
        match &self.kind {
            ExprKind::Primitive(Literal::String(_)) | ExprKind::InterpolatedString(_) => {
                Some(TypeSig::string())
            }
            ExprKind::Primitive(Literal::Bool(_)) => Some(TypeSig::known(KnownType::Boolean)),
            ExprKind::Primitive(Literal::Char(_)) => Some(TypeSig::known(KnownType::Char)),
            ExprKind::Primitive(Literal::Decimal(_)) => Some(TypeSig::known(KnownType::Decimal)),
            _ => None,
        }
    }

    /// Direct children with the role each occupies, in source order.
    pub fn children_with_roles(&self) -> Vec<(Role, &Expr)> {
        match &self.kind {
            ExprKind::Null
            | ExprKind::Identifier(_)
            | ExprKind::Primitive(_)
            | ExprKind::TypeReference(_)
            | ExprKind::TypeOf(_) => Vec::new(),
            ExprKind::RefType(e)
            | ExprKind::Parenthesized(e)
            | ExprKind::Direction { expr: e, .. }
            | ExprKind::NamedArgument { expr: e, .. }
            | ExprKind::Cast { expr: e, .. }
            | ExprKind::MemberAccess { target: e, .. }
            | ExprKind::Unary { operand: e, .. } => vec![(Role::Expression, e.as_ref())],
            ExprKind::Invocation { target, args } => std::iter::once((Role::Target, target.as_ref()))
                .chain(args.iter().map(|a| (Role::Argument, a)))
                .collect(),
            ExprKind::ObjectCreation { args, .. } => {
                args.iter().map(|a| (Role::Argument, a)).collect()
            }
            ExprKind::Binary { left, right, .. } => vec![
                (Role::Expression, left.as_ref()),
                (Role::Expression, right.as_ref()),
            ],
            ExprKind::InterpolatedString(content) => content
                .iter()
                .filter_map(|c| match c {
                    InterpolatedContent::Interpolation { expr, .. } => Some((Role::Expression, expr)),
                    InterpolatedContent::Text(_) => None,
                })
                .collect(),
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => vec![
                (Role::Condition, cond.as_ref()),
                (Role::Expression, then_expr.as_ref()),
                (Role::Expression, else_expr.as_ref()),
            ],
        }
    }

    /// Mutable direct children with their roles; same order as [`Self::children_with_roles`].
    pub fn children_with_roles_mut(&mut self) -> Vec<(Role, &mut Expr)> {
        match &mut self.kind {
            ExprKind::Null
            | ExprKind::Identifier(_)
            | ExprKind::Primitive(_)
            | ExprKind::TypeReference(_)
            | ExprKind::TypeOf(_) => Vec::new(),
            ExprKind::RefType(e)
            | ExprKind::Parenthesized(e)
            | ExprKind::Direction { expr: e, .. }
            | ExprKind::NamedArgument { expr: e, .. }
            | ExprKind::Cast { expr: e, .. }
            | ExprKind::MemberAccess { target: e, .. }
            | ExprKind::Unary { operand: e, .. } => vec![(Role::Expression, e.as_mut())],
            ExprKind::Invocation { target, args } => std::iter::once((Role::Target, target.as_mut()))
                .chain(args.iter_mut().map(|a| (Role::Argument, a)))
                .collect(),
            ExprKind::ObjectCreation { args, .. } => {
                args.iter_mut().map(|a| (Role::Argument, a)).collect()
            }
            ExprKind::Binary { left, right, .. } => vec![
                (Role::Expression, left.as_mut()),
                (Role::Expression, right.as_mut()),
            ],
            ExprKind::InterpolatedString(content) => content
                .iter_mut()
                .filter_map(|c| match c {
                    InterpolatedContent::Interpolation { expr, .. } => Some((Role::Expression, expr)),
                    InterpolatedContent::Text(_) => None,
                })
                .collect(),
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => vec![
                (Role::Condition, cond.as_mut()),
                (Role::Expression, then_expr.as_mut()),
                (Role::Expression, else_expr.as_mut()),
            ],
        }
    }

    pub fn child(&self, index: usize) -> Option<&Expr> {
        self.children_with_roles().into_iter().nth(index).map(|(_, e)| e)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Expr> {
        self.children_with_roles_mut()
            .into_iter()
            .nth(index)
            .map(|(_, e)| e)
    }

    /// Follows a path of child indices from this node.
    pub fn descendant(&self, path: &[usize]) -> Option<&Expr> {
        path.iter().try_fold(self, |node, &i| node.child(i))
    }

    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut Expr> {
        path.iter().try_fold(self, |node, &i| node.child_mut(i))
    }

    /// Checks `pred` against this node and every descendant.
    pub fn any_descendant_or_self(&self, pred: &dyn Fn(&Expr) -> bool) -> bool {
        pred(self)
            || self
                .children_with_roles()
                .into_iter()
                .any(|(_, c)| c.any_descendant_or_self(pred))
    }

    /// Counts this node and its descendants.
    pub fn node_count(&self) -> usize {
        1 + self
            .children_with_roles()
            .into_iter()
            .map(|(_, c)| c.node_count())
            .sum::<usize>()
    }
}

impl Stmt {
    /// Expressions owned directly by this statement, with their roles.
    pub fn exprs_mut(&mut self) -> Vec<(Role, &mut Expr)> {
        match self {
            Stmt::Expr(e) => vec![(Role::Expression, e)],
            Stmt::VarDecl { init, .. } => init.iter_mut().map(|e| (Role::Expression, e)).collect(),
            Stmt::If { cond, .. } | Stmt::While { cond, .. } => vec![(Role::Condition, cond)],
            Stmt::Return(value) => value.iter_mut().map(|e| (Role::Expression, e)).collect(),
            Stmt::Block(_) => Vec::new(),
        }
    }

    /// Nested statements, in source order.
    pub fn body_mut(&mut self) -> Vec<&mut Stmt> {
        match self {
            Stmt::If {
                then_body,
                else_body,
                ..
            } => then_body
                .iter_mut()
                .chain(else_body.iter_mut().flatten())
                .collect(),
            Stmt::While { body, .. } | Stmt::Block(body) => body.iter_mut().collect(),
            Stmt::Expr(_) | Stmt::VarDecl { .. } | Stmt::Return(_) => Vec::new(),
        }
    }
}

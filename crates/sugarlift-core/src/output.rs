//! C#-like source rendering of syntax trees.

use std::fmt::{self, Write as _};

use crate::ast::{AstType, Expr, ExprKind, InterpolatedContent, Literal, Stmt};

/// Precedence of primary expressions (names, calls, member access, literals).
const PRIMARY: u8 = 15;
/// Precedence of unary operators and casts.
const UNARY: u8 = 12;
/// Precedence of the conditional operator.
const CONDITIONAL: u8 = 1;

fn precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Binary { op, .. } => op.precedence(),
        ExprKind::Unary { .. } | ExprKind::Cast { .. } => UNARY,
        ExprKind::Conditional { .. } => CONDITIONAL,
        // Named arguments and direction markers only appear in argument lists.
        ExprKind::NamedArgument { .. } | ExprKind::Direction { .. } => 0,
        _ => PRIMARY,
    }
}

/// Writes `expr`, parenthesizing when it binds looser than `min`.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min: u8) -> fmt::Result {
    if precedence(expr) < min {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_type_args(f: &mut fmt::Formatter<'_>, args: &[AstType]) -> fmt::Result {
    if !args.is_empty() {
        write!(f, "<")?;
        write_list(f, args)?;
        write!(f, ">")?;
    }
    Ok(())
}

/// Escapes text for a C# string literal body.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Escapes literal text inside an interpolated string.
pub fn escape_interpolated_text(s: &str) -> String {
    escape_string(s).replace('{', "{{").replace('}', "}}")
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Decimal(n) => write!(f, "{}m", n),
            Literal::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{:.1}", x),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::Char('\'') => write!(f, "'\\''"),
            Literal::Char(c) => write!(f, "'{}'", escape_string(&c.to_string())),
            Literal::String(s) => write!(f, "\"{}\"", escape_string(s)),
        }
    }
}

impl fmt::Display for AstType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstType::Primitive(kw) => write!(f, "{}", kw),
            AstType::Simple { name, type_args } => {
                write!(f, "{}", name)?;
                write_type_args(f, type_args)
            }
            AstType::Member {
                target,
                name,
                type_args,
            } => {
                write!(f, "{}.{}", target, name)?;
                write_type_args(f, type_args)
            }
            AstType::Array { element, rank } => {
                write!(f, "{}[", element)?;
                for _ in 1..*rank {
                    write!(f, ",")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Null => write!(f, "<null>"),
            ExprKind::Identifier(name) => write!(f, "{}", name),
            ExprKind::Primitive(lit) => write!(f, "{}", lit),
            ExprKind::TypeReference(ty) => write!(f, "{}", ty),
            ExprKind::TypeOf(ty) => write!(f, "typeof({})", ty),
            ExprKind::RefType(e) => write!(f, "__reftype({})", e),
            ExprKind::MemberAccess {
                target,
                member,
                type_args,
            } => {
                write_operand(f, target, PRIMARY)?;
                write!(f, ".{}", member)?;
                write_type_args(f, type_args)
            }
            ExprKind::Invocation { target, args } => {
                write_operand(f, target, PRIMARY)?;
                write!(f, "(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            ExprKind::Binary { op, left, right } => {
                // Left-associative: equal precedence on the left needs no parentheses.
                write_operand(f, left, op.precedence())?;
                write!(f, " {} ", op.as_str())?;
                write_operand(f, right, op.precedence() + 1)
            }
            ExprKind::Unary { op, operand } => {
                write!(f, "{}", op.as_str())?;
                write_operand(f, operand, UNARY)
            }
            ExprKind::Cast { ty, expr } => {
                write!(f, "({})", ty)?;
                write_operand(f, expr, UNARY)
            }
            ExprKind::ObjectCreation { ty, args } => {
                write!(f, "new {}(", ty)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            ExprKind::InterpolatedString(content) => {
                write!(f, "$\"")?;
                for part in content {
                    match part {
                        InterpolatedContent::Text(text) => {
                            write!(f, "{}", escape_interpolated_text(text))?
                        }
                        InterpolatedContent::Interpolation { expr, format } => {
                            write!(f, "{{{}", expr)?;
                            if let Some(spec) = format {
                                write!(f, ":{}", spec)?;
                            }
                            write!(f, "}}")?;
                        }
                    }
                }
                write!(f, "\"")
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                write_operand(f, cond, CONDITIONAL + 1)?;
                write!(f, " ? ")?;
                write_operand(f, then_expr, CONDITIONAL)?;
                write!(f, " : ")?;
                write_operand(f, else_expr, CONDITIONAL)
            }
            ExprKind::Parenthesized(e) => write!(f, "({})", e),
            ExprKind::Direction { direction, expr } => write!(f, "{} {}", direction.as_str(), expr),
            ExprKind::NamedArgument { name, expr } => write!(f, "{}: {}", name, expr),
        }
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, body: &[Stmt], indent: usize) -> fmt::Result {
    writeln!(f, "{{")?;
    for stmt in body {
        write_stmt(f, stmt, indent + 1)?;
    }
    write!(f, "{}}}", "    ".repeat(indent))
}

fn write_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, indent: usize) -> fmt::Result {
    let pad = "    ".repeat(indent);
    match stmt {
        Stmt::Expr(e) => writeln!(f, "{}{};", pad, e),
        Stmt::VarDecl { ty, name, init } => match init {
            Some(value) => writeln!(f, "{}{} {} = {};", pad, ty, name, value),
            None => writeln!(f, "{}{} {};", pad, ty, name),
        },
        Stmt::If {
            cond,
            then_body,
            else_body,
        } => {
            write!(f, "{}if ({}) ", pad, cond)?;
            write_block(f, then_body, indent)?;
            if let Some(else_body) = else_body {
                write!(f, " else ")?;
                write_block(f, else_body, indent)?;
            }
            writeln!(f)
        }
        Stmt::While { cond, body } => {
            write!(f, "{}while ({}) ", pad, cond)?;
            write_block(f, body, indent)?;
            writeln!(f)
        }
        Stmt::Return(Some(value)) => writeln!(f, "{}return {};", pad, value),
        Stmt::Return(None) => writeln!(f, "{}return;", pad),
        Stmt::Block(body) => {
            write!(f, "{}", pad)?;
            write_block(f, body, indent)?;
            writeln!(f)
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOperator, InterpolatedContent, UnaryOperator};

    #[test]
    fn test_binary_associativity() {
        let left_nested = Expr::binary(
            BinaryOperator::Add,
            Expr::binary(BinaryOperator::Add, Expr::ident("a"), Expr::ident("b")),
            Expr::ident("c"),
        );
        assert_eq!(left_nested.to_string(), "a + b + c");

        let right_nested = Expr::binary(
            BinaryOperator::Subtract,
            Expr::ident("a"),
            Expr::binary(BinaryOperator::Subtract, Expr::ident("b"), Expr::ident("c")),
        );
        assert_eq!(right_nested.to_string(), "a - (b - c)");

        let mixed = Expr::binary(
            BinaryOperator::Multiply,
            Expr::binary(BinaryOperator::Add, Expr::ident("a"), Expr::ident("b")),
            Expr::ident("c"),
        );
        assert_eq!(mixed.to_string(), "(a + b) * c");
    }

    #[test]
    fn test_unary_and_cast() {
        let neg = Expr::unary(
            UnaryOperator::Minus,
            Expr::binary(BinaryOperator::Add, Expr::ident("a"), Expr::int(1)),
        );
        assert_eq!(neg.to_string(), "-(a + 1)");
        let cast = Expr::cast(AstType::primitive("int"), Expr::ident("d"));
        assert_eq!(cast.to_string(), "(int)d");
    }

    #[test]
    fn test_interpolated_string_escapes_braces() {
        let e = Expr::interpolated(vec![
            InterpolatedContent::Text("{".to_string()),
            InterpolatedContent::Interpolation {
                expr: Expr::ident("x"),
                format: Some("N2".to_string()),
            },
            InterpolatedContent::Text("} \"q\"".to_string()),
        ]);
        assert_eq!(e.to_string(), "$\"{{{x:N2}}} \\\"q\\\"\"");
    }

    #[test]
    fn test_member_and_call() {
        let call = Expr::invoke(
            Expr::member(Expr::type_reference(AstType::simple("Console")), "WriteLine"),
            vec![Expr::string("hi"), Expr::literal(Literal::Decimal(1))],
        );
        assert_eq!(call.to_string(), "Console.WriteLine(\"hi\", 1m)");
    }

    #[test]
    fn test_statements() {
        let stmt = Stmt::Block(vec![
            Stmt::If {
                cond: Expr::ident("ok"),
                then_body: vec![Stmt::Return(Some(Expr::int(1)))],
                else_body: None,
            },
            Stmt::Return(None),
        ]);
        assert_eq!(
            stmt.to_string(),
            "{\n    if (ok) {\n        return 1;\n    }\n    return;\n}\n"
        );
    }
}

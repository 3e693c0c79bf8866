//! User-defined operator recovery.
//!
//! Operator overloads compile to static methods with reserved metadata names
//! (`op_Addition`, `op_UnaryNegation`, ...). A call to one of them is turned
//! back into the operator expression it was compiled from.

use sugarlift_core::{
    BinaryOperator, Expr, ExprKind, FieldDirection, KnownType, Literal, MethodSymbol,
    UnaryOperator,
};

use crate::context::TransformContext;

pub(crate) const OP_EXPLICIT: &str = "op_Explicit";
pub(crate) const OP_TRUE: &str = "op_True";
const OP_UNSIGNED_RIGHT_SHIFT: &str = "op_UnsignedRightShift";

/// Maps a binary operator method name to its operator.
pub fn binary_operator_from_metadata_name(name: &str) -> Option<BinaryOperator> {
    use BinaryOperator::*;
    Some(match name {
        "op_Addition" => Add,
        "op_Subtraction" => Subtract,
        "op_Multiply" => Multiply,
        "op_Division" => Divide,
        "op_Modulus" => Modulus,
        "op_BitwiseAnd" => BitwiseAnd,
        "op_BitwiseOr" => BitwiseOr,
        "op_ExclusiveOr" => ExclusiveOr,
        "op_LeftShift" => ShiftLeft,
        "op_RightShift" => ShiftRight,
        OP_UNSIGNED_RIGHT_SHIFT => UnsignedShiftRight,
        "op_Equality" => Equality,
        "op_Inequality" => InEquality,
        "op_LessThan" => LessThan,
        "op_LessThanOrEqual" => LessThanOrEqual,
        "op_GreaterThan" => GreaterThan,
        "op_GreaterThanOrEqual" => GreaterThanOrEqual,
        _ => return None,
    })
}

/// Maps a unary operator method name to its operator.
pub fn unary_operator_from_metadata_name(name: &str) -> Option<UnaryOperator> {
    use UnaryOperator::*;
    Some(match name {
        "op_LogicalNot" => Not,
        "op_OnesComplement" => BitNot,
        "op_UnaryNegation" => Minus,
        "op_UnaryPlus" => Plus,
        "op_Increment" => Increment,
        "op_Decrement" => Decrement,
        _ => return None,
    })
}

/// Strips an `in` marker; operands are passed by readonly reference implicitly.
fn operand(arg: Expr) -> Expr {
    match arg.kind {
        ExprKind::Direction {
            direction: FieldDirection::In,
            expr,
        } => *expr,
        kind => Expr {
            kind,
            annotations: arg.annotations,
        },
    }
}

fn arity(call: &Expr) -> usize {
    call.arguments().len()
}

/// `op_Addition(a, b)` → `a + b`.
pub(crate) fn replace_binary(call: &mut Expr, method: &MethodSymbol, ctx: &TransformContext<'_>) -> bool {
    if arity(call) != 2 {
        return false;
    }
    let Some(op) = binary_operator_from_metadata_name(&method.name) else {
        return false;
    };
    if op == BinaryOperator::UnsignedShiftRight && !ctx.settings.unsigned_right_shift() {
        return false;
    }
    let mut args = call.take_arguments().into_iter().map(operand);
    let (Some(left), Some(right)) = (args.next(), args.next()) else {
        return false;
    };
    call.replace_and_copy_annotations(Expr::binary(op, left, right));
    true
}

/// `op_UnaryNegation(a)` → `-a`.
///
/// `decimal` increments and decrements become `a + 1m` / `a - 1m`: older
/// compilers emit the operator call for that addition, and `++a` would
/// assign to `a`.
pub(crate) fn replace_unary(call: &mut Expr, method: &MethodSymbol) -> bool {
    if arity(call) != 1 {
        return false;
    }
    let Some(op) = unary_operator_from_metadata_name(&method.name) else {
        return false;
    };
    let Some(arg) = call.take_arguments().pop().map(operand) else {
        return false;
    };
    let replacement = match op {
        UnaryOperator::Increment | UnaryOperator::Decrement
            if method.declaring_type.is_known(KnownType::Decimal) =>
        {
            let op = if op == UnaryOperator::Increment {
                BinaryOperator::Add
            } else {
                BinaryOperator::Subtract
            };
            Expr::binary(op, arg, Expr::literal(Literal::Decimal(1)))
        }
        _ => Expr::unary(op, arg),
    };
    call.replace_and_copy_annotations(replacement);
    true
}

/// `op_Explicit(a)` → `(T)a`, with `T` the operator's return type.
pub(crate) fn replace_explicit(call: &mut Expr, method: &MethodSymbol, ctx: &TransformContext<'_>) -> bool {
    if method.name != OP_EXPLICIT || arity(call) != 1 {
        return false;
    }
    let Some(arg) = call.take_arguments().pop().map(operand) else {
        return false;
    };
    let ty = ctx.type_builder.convert_type(&method.return_type);
    call.replace_and_copy_annotations(Expr::cast(ty, arg));
    true
}

fn is_true_call(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Invocation { .. })
        && arity(expr) == 1
        && expr.annotations.method().is_some_and(|m| m.name == OP_TRUE)
}

/// `if (op_True(a))` → `if (a)`.
///
/// Only valid where the truth test is implied by the surrounding syntax; the
/// caller checks the slot. Nested calls collapse together, since the inner
/// ones were visited outside the condition slot.
pub(crate) fn collapse_true(call: &mut Expr, method: &MethodSymbol) -> bool {
    if method.name != OP_TRUE || arity(call) != 1 {
        return false;
    }
    while is_true_call(call) {
        let Some(mut arg) = call.take_arguments().pop().map(operand) else {
            break;
        };
        arg.copy_instructions_from(&call.annotations);
        call.replace_with(arg);
    }
    true
}

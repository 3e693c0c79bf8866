//! The operator recovery pass.
//!
//! [`ReplaceMethodCallsWithOperators`] walks a tree once, children before
//! parents, and offers every resolved call to a fixed list of rules. The first
//! rule whose preconditions hold rewrites the call in place; the rest are not
//! consulted for that node.

use tracing::trace;

use sugarlift_core::{BinaryOperator, Expr, ExprKind, MethodSymbol, Role, Stmt, TypeSig};

use crate::config::RewriteRule;
use crate::context::TransformContext;
use crate::format_string;
use crate::handles;
use crate::operators;

const STRING_CONCAT: &str = "System.String.Concat";
const CREATE_INSTANCE: &str = "System.Activator.CreateInstance";

/// A tree-to-tree pass a host pipeline can schedule.
pub trait AstTransform {
    /// Short identifier for logging.
    fn name(&self) -> &'static str;

    /// Rewrites `root` in place.
    fn run(&self, root: &mut Stmt, ctx: &TransformContext<'_>);
}

/// Rewrites runtime helper calls into C# operator syntax.
///
/// The transform holds no state; everything run-specific lives in the
/// [`TransformContext`] passed to [`run`](AstTransform::run).
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceMethodCallsWithOperators;

impl ReplaceMethodCallsWithOperators {
    pub fn new() -> Self {
        Self
    }

    /// Runs the pass over a bare expression root.
    pub fn run_expr(&self, root: &mut Expr, ctx: &TransformContext<'_>) {
        self.visit_expr(root, Role::Expression, ctx);
    }

    fn visit_stmt(&self, stmt: &mut Stmt, ctx: &TransformContext<'_>) {
        for (role, expr) in stmt.exprs_mut() {
            self.visit_expr(expr, role, ctx);
        }
        for child in stmt.body_mut() {
            self.visit_stmt(child, ctx);
        }
    }

    fn visit_expr(&self, expr: &mut Expr, role: Role, ctx: &TransformContext<'_>) {
        for (child_role, child) in expr.children_with_roles_mut() {
            self.visit_expr(child, child_role, ctx);
        }
        match expr.kind {
            ExprKind::Invocation { .. } => {
                if let Some(rule) = dispatch_call(expr, role, ctx) {
                    trace!(%rule, "rewrote call");
                }
            }
            ExprKind::Cast { .. } => {
                if ctx.settings.is_rule_enabled(RewriteRule::HandleUnwrapping)
                    && handles::unwrap_method_handle(expr, ctx)
                {
                    trace!(rule = %RewriteRule::HandleUnwrapping, "rewrote method handle cast");
                }
            }
            _ => {}
        }
    }
}

impl AstTransform for ReplaceMethodCallsWithOperators {
    fn name(&self) -> &'static str {
        "replace-method-calls-with-operators"
    }

    fn run(&self, root: &mut Stmt, ctx: &TransformContext<'_>) {
        self.visit_stmt(root, ctx);
    }
}

/// Offers `call` to each enabled rule in priority order.
///
/// Returns the rule that rewrote the call, if any.
fn dispatch_call(call: &mut Expr, role: Role, ctx: &TransformContext<'_>) -> Option<RewriteRule> {
    // Rules replace `call` wholesale, so the symbol is cloned out of its annotations first.
    let method = call.annotations.method()?.clone();
    let settings = ctx.settings;
    let enabled = |rule| settings.is_rule_enabled(rule);

    let applied = if enabled(RewriteRule::StringConcat) && fold_concat(call, &method) {
        RewriteRule::StringConcat
    } else if enabled(RewriteRule::HandleUnwrapping)
        && (handles::unwrap_type_handle(call) || handles::unwrap_field_handle(call))
    {
        RewriteRule::HandleUnwrapping
    } else if enabled(RewriteRule::GenericInstantiation) && instantiate_generic(call, &method, ctx) {
        RewriteRule::GenericInstantiation
    } else if settings.string_interpolation() && format_string::reconstruct(call, &method) {
        RewriteRule::StringInterpolation
    } else if enabled(RewriteRule::BinaryOperators) && operators::replace_binary(call, &method, ctx) {
        RewriteRule::BinaryOperators
    } else if enabled(RewriteRule::UnaryOperators) && operators::replace_unary(call, &method) {
        RewriteRule::UnaryOperators
    } else if enabled(RewriteRule::ExplicitConversion)
        && operators::replace_explicit(call, &method, ctx)
    {
        RewriteRule::ExplicitConversion
    } else if enabled(RewriteRule::OperatorTrue)
        && role == Role::Condition
        && operators::collapse_true(call, &method)
    {
        RewriteRule::OperatorTrue
    } else {
        return None;
    };
    Some(applied)
}

/// `string.Concat(a, b, c)` → `a + b + c`.
fn fold_concat(call: &mut Expr, method: &MethodSymbol) -> bool {
    if method.full_name() != STRING_CONCAT
        || !method.is_static
        || method.parameters.iter().any(|p| p.ty.is_array())
    {
        return false;
    }
    let args = call.arguments();
    if args.len() < 2 || args.iter().any(|a| matches!(a.kind, ExprKind::NamedArgument { .. })) {
        return false;
    }
    let is_string = |e: &Expr| e.static_type().is_some_and(|t| t == TypeSig::string());
    if !is_string(&args[0]) && !is_string(&args[1]) {
        return false;
    }
    let mut args = call.take_arguments().into_iter();
    let Some(first) = args.next() else {
        return false;
    };
    let sum = args.fold(first, |acc, arg| Expr::binary(BinaryOperator::Add, acc, arg));
    call.replace_and_copy_annotations(sum);
    true
}

/// `Activator.CreateInstance<T>()` → `new T()` when `T` has a `new()` constraint.
fn instantiate_generic(call: &mut Expr, method: &MethodSymbol, ctx: &TransformContext<'_>) -> bool {
    if method.full_name() != CREATE_INSTANCE || !call.arguments().is_empty() {
        return false;
    }
    let [TypeSig::Parameter(parameter)] = method.type_arguments.as_slice() else {
        return false;
    };
    if !parameter.has_default_constructor_constraint {
        return false;
    }
    let ty = ctx
        .type_builder
        .convert_type(&TypeSig::Parameter(parameter.clone()));
    call.replace_and_copy_annotations(Expr::object_creation(ty, Vec::new()));
    true
}

//! Composable tree-shape matchers.
//!
//! A pattern is a predicate over an [`Expr`] that can record named captures.
//! Captures are stored as child-index paths relative to the node the match
//! started from, so a caller can inspect the shape immutably and then locate
//! the captured nodes again (via [`Expr::descendant_mut`]) once it decides to
//! rewrite.

use sugarlift_core::{AstType, Expr, ExprKind};

/// Result of a successful (or in-progress) match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    path: Vec<usize>,
    captures: Vec<(&'static str, Vec<usize>)>,
}

impl Match {
    /// Path of the first capture named `name`.
    pub fn get(&self, name: &str) -> Option<&[usize]> {
        self.captures
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, path)| path.as_slice())
    }

    fn checkpoint(&self) -> usize {
        self.captures.len()
    }

    fn restore(&mut self, checkpoint: usize) {
        self.captures.truncate(checkpoint);
    }

    /// Matches `pattern` against the child at `index` of the current node.
    fn descend(&mut self, node: &Expr, index: usize, pattern: &dyn Pattern) -> bool {
        let Some(child) = node.child(index) else {
            return false;
        };
        self.path.push(index);
        let ok = pattern.matches(child, self);
        self.path.pop();
        ok
    }
}

/// A tree-shape predicate.
pub trait Pattern: Send + Sync {
    fn matches(&self, expr: &Expr, m: &mut Match) -> bool;
}

impl<F> Pattern for F
where
    F: Fn(&Expr, &mut Match) -> bool + Send + Sync,
{
    fn matches(&self, expr: &Expr, m: &mut Match) -> bool {
        self(expr, m)
    }
}

pub type BoxPattern = Box<dyn Pattern>;

/// Boxes a pattern for use in [`choice`] or argument sequences.
pub fn boxed(pattern: impl Pattern + 'static) -> BoxPattern {
    Box::new(pattern)
}

/// Runs `pattern` against `expr`, returning the captures on success.
pub fn match_node(pattern: &dyn Pattern, expr: &Expr) -> Option<Match> {
    let mut m = Match::default();
    pattern.matches(expr, &mut m).then_some(m)
}

/// Matches any node.
pub fn any() -> impl Pattern {
    |_: &Expr, _: &mut Match| true
}

/// Records the matched node under `name`.
pub fn capture(name: &'static str, inner: impl Pattern) -> impl Pattern {
    move |e: &Expr, m: &mut Match| {
        if inner.matches(e, m) {
            let path = m.path.clone();
            m.captures.push((name, path));
            true
        } else {
            false
        }
    }
}

/// Matches the first alternative that succeeds; captures of failed attempts are dropped.
pub fn choice(alternatives: Vec<BoxPattern>) -> impl Pattern {
    move |e: &Expr, m: &mut Match| {
        for alt in &alternatives {
            let checkpoint = m.checkpoint();
            if alt.matches(e, m) {
                return true;
            }
            m.restore(checkpoint);
        }
        false
    }
}

/// An element of an argument sequence.
pub enum Item {
    Required(BoxPattern),
    Optional(BoxPattern),
}

pub fn required(pattern: impl Pattern + 'static) -> Item {
    Item::Required(boxed(pattern))
}

pub fn optional(pattern: impl Pattern + 'static) -> Item {
    Item::Optional(boxed(pattern))
}

/// Matches `items` against the children of `parent` starting at child `index`.
///
/// All children from `index` on must be consumed.
fn match_sequence(parent: &Expr, items: &[Item], index: usize, m: &mut Match) -> bool {
    let remaining = parent.children_with_roles().len().saturating_sub(index);
    match items.split_first() {
        None => remaining == 0,
        Some((Item::Required(p), rest)) => {
            if remaining == 0 {
                return false;
            }
            let checkpoint = m.checkpoint();
            if m.descend(parent, index, &**p) && match_sequence(parent, rest, index + 1, m) {
                return true;
            }
            m.restore(checkpoint);
            false
        }
        Some((Item::Optional(p), rest)) => {
            if remaining > 0 {
                let checkpoint = m.checkpoint();
                if m.descend(parent, index, &**p)
                    && match_sequence(parent, rest, index + 1, m)
                {
                    return true;
                }
                m.restore(checkpoint);
            }
            match_sequence(parent, rest, index, m)
        }
    }
}

/// `target.member`.
pub fn member_access(member: &'static str, target: impl Pattern) -> impl Pattern {
    move |e: &Expr, m: &mut Match| match &e.kind {
        ExprKind::MemberAccess {
            member: name,
            type_args,
            ..
        } if name == member && type_args.is_empty() => m.descend(e, 0, &target),
        _ => false,
    }
}

/// `typeof(T)` for any `T`.
pub fn type_of() -> impl Pattern {
    |e: &Expr, _: &mut Match| matches!(e.kind, ExprKind::TypeOf(_))
}

/// `__reftype(x)`.
pub fn ref_type(inner: impl Pattern) -> impl Pattern {
    move |e: &Expr, m: &mut Match| match &e.kind {
        ExprKind::RefType(_) => m.descend(e, 0, &inner),
        _ => false,
    }
}

/// Any node carrying load-token provenance.
pub fn has_load_token() -> impl Pattern {
    |e: &Expr, _: &mut Match| e.annotations.has_load_token()
}

/// A load-token invocation with exactly one argument matching `argument`.
pub fn load_token(argument: impl Pattern) -> impl Pattern {
    move |e: &Expr, m: &mut Match| match &e.kind {
        ExprKind::Invocation { args, .. } if e.annotations.has_load_token() && args.len() == 1 => {
            m.descend(e, 1, &argument)
        }
        _ => false,
    }
}

/// An invocation resolved to the method `full_name` whose arguments match `args`.
pub fn invocation_of(full_name: &'static str, args: Vec<Item>) -> impl Pattern {
    move |e: &Expr, m: &mut Match| {
        let resolved = e
            .annotations
            .method()
            .is_some_and(|method| method.full_name() == full_name);
        resolved
            && matches!(e.kind, ExprKind::Invocation { .. })
            && match_sequence(e, &args, 1, m)
    }
}

/// `(T)inner` where `T` spells one of `type_names`.
pub fn cast_to(type_names: &'static [&'static str], inner: impl Pattern) -> impl Pattern {
    move |e: &Expr, m: &mut Match| match &e.kind {
        ExprKind::Cast { ty, .. } if type_names.iter().any(|n| ty.refers_to(n)) => {
            m.descend(e, 0, &inner)
        }
        _ => false,
    }
}

/// The type spelled by a captured `typeof(T)` node.
pub fn type_of_operand(expr: &Expr) -> Option<&AstType> {
    match &expr.kind {
        ExprKind::TypeOf(ty) => Some(ty),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sugarlift_core::{MethodSymbol, TypeSig};

    fn handle_call(args: Vec<Expr>) -> Expr {
        Expr::invoke(Expr::ident("GetFieldFromHandle"), args).with_method(MethodSymbol::new_static(
            TypeSig::named("System.Reflection", "FieldInfo"),
            "GetFieldFromHandle",
        ))
    }

    #[test]
    fn test_capture_records_path() {
        let pattern = member_access("TypeHandle", capture("target", type_of()));
        let e = Expr::member(Expr::type_of(AstType::simple("T")), "TypeHandle");
        let m = match_node(&pattern, &e).unwrap();
        assert_eq!(m.get("target"), Some(&[0usize][..]));
        assert_eq!(m.get("other"), None);

        let wrong_member = Expr::member(Expr::type_of(AstType::simple("T")), "FieldHandle");
        assert!(match_node(&pattern, &wrong_member).is_none());
    }

    #[test]
    fn test_choice_drops_failed_captures() {
        let pattern = choice(vec![
            boxed(capture("first", member_access("X", any()))),
            boxed(capture("second", any())),
        ]);
        let m = match_node(&pattern, &Expr::ident("a")).unwrap();
        assert_eq!(m.get("first"), None);
        assert_eq!(m.get("second"), Some(&[][..]));
    }

    #[test]
    fn test_optional_trailing_argument() {
        let pattern = invocation_of(
            "System.Reflection.FieldInfo.GetFieldFromHandle",
            vec![
                required(capture("a", any())),
                optional(capture("b", type_of())),
            ],
        );

        let one = handle_call(vec![Expr::ident("h")]);
        let m = match_node(&pattern, &one).unwrap();
        assert_eq!(m.get("a"), Some(&[1usize][..]));
        assert_eq!(m.get("b"), None);

        let two = handle_call(vec![Expr::ident("h"), Expr::type_of(AstType::simple("T"))]);
        let m = match_node(&pattern, &two).unwrap();
        assert_eq!(m.get("b"), Some(&[2usize][..]));

        let bad_second = handle_call(vec![Expr::ident("h"), Expr::ident("x")]);
        assert!(match_node(&pattern, &bad_second).is_none());

        let three = handle_call(vec![Expr::ident("h"), Expr::ident("x"), Expr::ident("y")]);
        assert!(match_node(&pattern, &three).is_none());

        let none = handle_call(vec![]);
        assert!(match_node(&pattern, &none).is_none());
    }

    #[test]
    fn test_invocation_requires_resolved_method() {
        let pattern = invocation_of("System.Reflection.FieldInfo.GetFieldFromHandle", vec![]);
        assert!(match_node(&pattern, &handle_call(vec![])).is_some());
        let unresolved = Expr::invoke(Expr::ident("GetFieldFromHandle"), vec![]);
        assert!(match_node(&pattern, &unresolved).is_none());
    }

    #[test]
    fn test_load_token_shape() {
        let pattern = load_token(capture("field", any()));
        let token = Expr::invoke(Expr::ident("ldtoken"), vec![Expr::ident("f")]).with_load_token();
        let m = match_node(&pattern, &token).unwrap();
        assert_eq!(token.descendant(m.get("field").unwrap()), Some(&Expr::ident("f")));

        let plain = Expr::invoke(Expr::ident("ldtoken"), vec![Expr::ident("f")]);
        assert!(match_node(&pattern, &plain).is_none());
    }

    #[test]
    fn test_cast_to_matches_qualified_and_short_names() {
        const NAMES: &[&str] = &["System.Reflection.MethodInfo"];
        let pattern = cast_to(NAMES, any());
        let short = Expr::cast(AstType::simple("MethodInfo"), Expr::ident("x"));
        let long = Expr::cast(AstType::qualified("System.Reflection.MethodInfo"), Expr::ident("x"));
        let other = Expr::cast(AstType::simple("FieldInfo"), Expr::ident("x"));
        assert!(match_node(&pattern, &short).is_some());
        assert!(match_node(&pattern, &long).is_some());
        assert!(match_node(&pattern, &other).is_none());
    }
}

//! Detach/replace primitives used by tree rewrites.
//!
//! A subtree is moved by detaching it from its slot (which leaves a `Null`
//! placeholder) and placing it into exactly one new slot. Rewrites always
//! refill every slot they detach from, either by replacing the parent that
//! owned the hole or by writing a new node into it.

use std::mem;

use crate::annotation::Annotations;
use crate::ast::{Expr, ExprKind};

impl Expr {
    /// Moves this subtree out, leaving a `Null` placeholder in its slot.
    pub fn detach(&mut self) -> Expr {
        mem::replace(self, Expr::null())
    }

    /// Puts `replacement` into this slot and returns the previous subtree.
    pub fn replace_with(&mut self, replacement: Expr) -> Expr {
        mem::replace(self, replacement)
    }

    /// Replaces this node, carrying its annotations over to `replacement`.
    ///
    /// Returns the old node with its annotations removed.
    pub fn replace_and_copy_annotations(&mut self, mut replacement: Expr) -> Expr {
        let mut old = self.detach();
        replacement.annotations.copy_from(&old.annotations);
        old.annotations = Annotations::new();
        *self = replacement;
        old
    }

    /// Appends all annotations of `donor` onto this node.
    pub fn copy_annotations_from(&mut self, donor: &Annotations) -> &mut Self {
        self.annotations.copy_from(donor);
        self
    }

    /// Appends the instruction provenance of `donor` onto this node.
    pub fn copy_instructions_from(&mut self, donor: &Annotations) -> &mut Self {
        self.annotations.copy_instructions_from(donor);
        self
    }

    /// Builder-style variant of [`Self::copy_annotations_from`].
    pub fn with_annotations_from(mut self, donor: &Annotations) -> Self {
        self.annotations.copy_from(donor);
        self
    }

    /// Takes the argument list out of an invocation, leaving it empty.
    ///
    /// Returns an empty list for any other node.
    pub fn take_arguments(&mut self) -> Vec<Expr> {
        match &mut self.kind {
            ExprKind::Invocation { args, .. } | ExprKind::ObjectCreation { args, .. } => {
                mem::take(args)
            }
            _ => Vec::new(),
        }
    }

    /// Returns the arguments of an invocation.
    pub fn arguments(&self) -> &[Expr] {
        match &self.kind {
            ExprKind::Invocation { args, .. } | ExprKind::ObjectCreation { args, .. } => args,
            _ => &[],
        }
    }

    /// Checks that no `Null` placeholder remains in this subtree.
    pub fn is_fully_attached(&self) -> bool {
        !self.any_descendant_or_self(&Expr::is_null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOperator;

    #[test]
    fn test_detach_leaves_hole() {
        let mut e = Expr::binary(BinaryOperator::Add, Expr::ident("a"), Expr::ident("b"));
        let left = match &mut e.kind {
            ExprKind::Binary { left, .. } => left.detach(),
            _ => unreachable!(),
        };
        assert_eq!(left, Expr::ident("a"));
        assert!(!e.is_fully_attached());
    }

    #[test]
    fn test_replace_copies_annotations() {
        let mut slot = Expr::ident("call").with_instructions(3, 7);
        let old = slot.replace_and_copy_annotations(Expr::ident("new"));
        assert_eq!(old.kind, ExprKind::Identifier("call".to_string()));
        assert!(old.annotations.is_empty());
        assert_eq!(slot.annotations.instructions().count(), 1);
        assert!(slot.is_fully_attached());
    }

    #[test]
    fn test_take_arguments() {
        let mut call = Expr::invoke(Expr::ident("f"), vec![Expr::int(1), Expr::int(2)]);
        assert_eq!(call.arguments().len(), 2);
        let args = call.take_arguments();
        assert_eq!(args, vec![Expr::int(1), Expr::int(2)]);
        assert!(call.arguments().is_empty());
        assert!(Expr::ident("x").take_arguments().is_empty());
    }
}

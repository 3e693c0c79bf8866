//! Tree builders shared by the unit tests.

use sugarlift_core::{AstType, Expr, KnownType, MethodSymbol, TypeSig};

use crate::config::TransformSettings;
use crate::context::TransformContext;
use crate::type_builder::DefaultTypeBuilder;

pub(crate) static DEFAULT_BUILDER: DefaultTypeBuilder = DefaultTypeBuilder {
    use_keywords: true,
    fully_qualify: false,
};

pub(crate) fn context(settings: &TransformSettings) -> TransformContext<'_> {
    TransformContext::new(settings, &DEFAULT_BUILDER)
}

pub(crate) fn ty(name: &str) -> TypeSig {
    name.parse().unwrap()
}

pub(crate) fn method(declaring_type: &str, name: &str) -> MethodSymbol {
    MethodSymbol::new_static(ty(declaring_type), name)
}

/// `Declaring.name(args)` resolved to `symbol`.
pub(crate) fn call_to(symbol: MethodSymbol, args: Vec<Expr>) -> Expr {
    let target = Expr::member(
        Expr::type_reference(AstType::qualified(&symbol.declaring_type.full_name())),
        symbol.name.clone(),
    );
    Expr::invoke(target, args).with_method(symbol)
}

pub(crate) fn call(declaring_type: &str, name: &str, args: Vec<Expr>) -> Expr {
    call_to(method(declaring_type, name), args)
}

/// A local of the given type.
pub(crate) fn local(name: &str, ty: TypeSig) -> Expr {
    Expr::ident(name).with_type(ty)
}

pub(crate) fn int_local(name: &str) -> Expr {
    local(name, TypeSig::known(KnownType::Int32))
}

pub(crate) fn string_local(name: &str) -> Expr {
    local(name, TypeSig::string())
}

/// `ldtoken(reference)` with load-token provenance.
pub(crate) fn ldtoken(reference: Expr) -> Expr {
    Expr::invoke(Expr::ident("ldtoken"), vec![reference]).with_load_token()
}

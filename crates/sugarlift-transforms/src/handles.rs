//! Reflection-handle idioms.
//!
//! Compilers lower `typeof(T)`, field references and method references in
//! reflection contexts to a metadata-token load followed by one of the
//! `Get*FromHandle` helpers. These rules fold the pair back into the
//! expression the helper call was built from.

use std::sync::LazyLock;

use sugarlift_core::Expr;

use crate::context::TransformContext;
use crate::pattern::{
    any, boxed, capture, cast_to, choice, has_load_token, invocation_of, load_token, match_node,
    member_access, optional, ref_type, required, type_of, type_of_operand, BoxPattern, Pattern,
};

const GET_TYPE_FROM_HANDLE: &str = "System.Type.GetTypeFromHandle";
const GET_FIELD_FROM_HANDLE: &str = "System.Reflection.FieldInfo.GetFieldFromHandle";
const GET_METHOD_FROM_HANDLE: &str = "System.Reflection.MethodBase.GetMethodFromHandle";

const METHOD_INFO_TYPES: &[&str] = &[
    "System.Reflection.MethodInfo",
    "System.Reflection.ConstructorInfo",
];

/// `typeof(D).TypeHandle`, capturing `typeof(D)` as `declaringType`.
fn declaring_type_handle() -> impl Pattern {
    member_access("TypeHandle", capture("declaringType", type_of()))
}

/// A load-token node captured as `token`. When it wraps a single member
/// reference, that reference is captured as `reference`.
fn token() -> impl Pattern {
    capture(
        "token",
        choice(vec![
            boxed(load_token(capture("reference", any()))),
            boxed(has_load_token()),
        ]),
    )
}

/// `Type.GetTypeFromHandle(typeof(T).TypeHandle)` or `Type.GetTypeFromHandle(__reftype(x).TypeHandle)`.
static TYPE_FROM_HANDLE: LazyLock<BoxPattern> = LazyLock::new(|| {
    boxed(invocation_of(
        GET_TYPE_FROM_HANDLE,
        vec![required(member_access(
            "TypeHandle",
            capture(
                "type",
                choice(vec![boxed(type_of()), boxed(ref_type(any()))]),
            ),
        ))],
    ))
});

/// `FieldInfo.GetFieldFromHandle(token.FieldHandle[, typeof(D).TypeHandle])`.
static FIELD_FROM_HANDLE: LazyLock<BoxPattern> = LazyLock::new(|| {
    boxed(invocation_of(
        GET_FIELD_FROM_HANDLE,
        vec![
            required(member_access("FieldHandle", token())),
            optional(declaring_type_handle()),
        ],
    ))
});

/// `(MethodInfo)MethodBase.GetMethodFromHandle(token.MethodHandle[, typeof(D).TypeHandle])`.
static METHOD_FROM_HANDLE: LazyLock<BoxPattern> = LazyLock::new(|| {
    boxed(cast_to(
        METHOD_INFO_TYPES,
        invocation_of(
            GET_METHOD_FROM_HANDLE,
            vec![
                required(member_access("MethodHandle", token())),
                optional(declaring_type_handle()),
            ],
        ),
    ))
});

/// `Type.GetTypeFromHandle(typeof(T).TypeHandle)` → `typeof(T)`.
pub(crate) fn unwrap_type_handle(call: &mut Expr) -> bool {
    let Some(m) = match_node(&**TYPE_FROM_HANDLE, call) else {
        return false;
    };
    let Some(slot) = m.get("type").and_then(|path| call.descendant_mut(path)) else {
        return false;
    };
    let mut target = slot.detach();
    target.copy_instructions_from(&call.annotations);
    call.replace_with(target);
    true
}

/// `FieldInfo.GetFieldFromHandle(ldtoken(f).FieldHandle)` → `ldtoken(f)`.
///
/// With the declaring-type argument the field reference inside the token is
/// re-qualified with that type first, so inherited and hidden fields keep
/// pointing at the right declaration.
pub(crate) fn unwrap_field_handle(call: &mut Expr) -> bool {
    let Some(m) = match_node(&**FIELD_FROM_HANDLE, call) else {
        return false;
    };
    let Some(token_path) = m.get("token") else {
        return false;
    };

    let qualified = match m.get("declaringType") {
        None => None,
        Some(type_path) => {
            let Some(declaring_type) = call.descendant(type_path).and_then(type_of_operand) else {
                return false;
            };
            let Some(reference) = m.get("reference").and_then(|path| call.descendant(path)) else {
                return false;
            };
            let Some(field) = reference.annotations.field() else {
                return false;
            };
            Some(
                Expr::member(
                    Expr::type_reference(declaring_type.clone()),
                    field.name.clone(),
                )
                .with_annotations_from(&reference.annotations),
            )
        }
    };

    let Some(slot) = call.descendant_mut(token_path) else {
        return false;
    };
    let mut token = slot.detach();
    if let (Some(reference), Some(slot)) = (qualified, token.child_mut(1)) {
        slot.replace_with(reference);
    }
    token.copy_instructions_from(&call.annotations);
    call.replace_with(token);
    true
}

/// `(MethodInfo)MethodBase.GetMethodFromHandle(ldtoken(m).MethodHandle)` → `ldtoken(m)`.
///
/// With the declaring-type argument the method reference is replaced by an
/// explicit `D.m(P1, P2, ...)` so the overload stays unambiguous.
pub(crate) fn unwrap_method_handle(cast: &mut Expr, ctx: &TransformContext<'_>) -> bool {
    let Some(m) = match_node(&**METHOD_FROM_HANDLE, cast) else {
        return false;
    };
    let Some(token_path) = m.get("token") else {
        return false;
    };

    let qualified = m.get("declaringType").and_then(|type_path| {
        let declaring_type = cast.descendant(type_path).and_then(type_of_operand)?;
        let reference = m.get("reference").and_then(|path| cast.descendant(path))?;
        let method = reference.annotations.method()?;
        let parameter_types = method
            .parameters
            .iter()
            .map(|p| Expr::type_reference(ctx.type_builder.convert_type(&p.ty)))
            .collect();
        // Symbol on the member only: the invocation is a parameter list, not a call.
        let target = Expr::member(
            Expr::type_reference(declaring_type.clone()),
            method.name.clone(),
        )
        .with_annotations_from(&reference.annotations);
        Some(Expr::invoke(target, parameter_types))
    });

    let Some(slot) = cast.descendant_mut(token_path) else {
        return false;
    };
    let mut token = slot.detach();
    if let (Some(reference), Some(slot)) = (qualified, token.child_mut(1)) {
        slot.replace_with(reference);
    }
    token.copy_annotations_from(&cast.annotations);
    cast.replace_with(token);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransformSettings;
    use crate::test_util::{call, call_to, context, ldtoken, method, ty};
    use sugarlift_core::{AstType, FieldSymbol, TypeSig};

    fn type_handle(target: Expr) -> Expr {
        Expr::member(target, "TypeHandle")
    }

    fn field_ref(declaring: &str, name: &str) -> Expr {
        Expr::member(Expr::type_reference(AstType::simple(declaring)), name).with_field(
            FieldSymbol {
                name: name.to_string(),
                declaring_type: TypeSig::named("", declaring),
                ty: TypeSig::string(),
            },
        )
    }

    #[test]
    fn test_type_from_handle() {
        let typeof_t = Expr::type_of(AstType::simple("T"));
        let mut e = call(
            "System.Type",
            "GetTypeFromHandle",
            vec![type_handle(typeof_t.clone())],
        )
        .with_instructions(4, 9);
        assert!(unwrap_type_handle(&mut e));
        assert_eq!(e.kind, typeof_t.kind);
        assert_eq!(e.annotations.instructions().count(), 1);
        assert!(e.annotations.method().is_none());
    }

    #[test]
    fn test_type_from_handle_reftype() {
        let reftype = Expr::ref_type(Expr::ident("tr"));
        let mut e = call(
            "System.Type",
            "GetTypeFromHandle",
            vec![type_handle(reftype.clone())],
        );
        assert!(unwrap_type_handle(&mut e));
        assert_eq!(e, reftype);
    }

    #[test]
    fn test_type_from_handle_declines_other_shapes() {
        let original = call(
            "System.Type",
            "GetTypeFromHandle",
            vec![type_handle(Expr::ident("h"))],
        );
        let mut e = original.clone();
        assert!(!unwrap_type_handle(&mut e));
        assert_eq!(e, original);

        let original = call(
            "System.Type",
            "GetTypeFromHandle",
            vec![Expr::member(Expr::type_of(AstType::simple("T")), "Handle")],
        );
        let mut e = original.clone();
        assert!(!unwrap_type_handle(&mut e));
        assert_eq!(e, original);
    }

    #[test]
    fn test_field_from_handle_single_argument() {
        let token = ldtoken(field_ref("Base", "value"));
        let mut e = call(
            "System.Reflection.FieldInfo",
            "GetFieldFromHandle",
            vec![Expr::member(token.clone(), "FieldHandle")],
        )
        .with_instructions(0, 2);
        assert!(unwrap_field_handle(&mut e));
        assert_eq!(e.kind, token.kind);
        assert!(e.annotations.has_load_token());
        assert_eq!(e.annotations.instructions().count(), 1);
    }

    #[test]
    fn test_field_from_handle_requalifies_declaring_type() {
        let token = ldtoken(field_ref("Base", "value"));
        let mut e = call(
            "System.Reflection.FieldInfo",
            "GetFieldFromHandle",
            vec![
                Expr::member(token, "FieldHandle"),
                type_handle(Expr::type_of(AstType::simple("Derived"))),
            ],
        );
        assert!(unwrap_field_handle(&mut e));
        assert!(e.is_fully_attached());
        let reference = e.child(1).unwrap();
        assert_eq!(reference.to_string(), "Derived.value");
        assert!(reference.annotations.field().is_some());
    }

    #[test]
    fn test_field_from_handle_missing_symbol_leaves_tree_untouched() {
        let unresolved = Expr::member(Expr::type_reference(AstType::simple("Base")), "value");
        let original = call(
            "System.Reflection.FieldInfo",
            "GetFieldFromHandle",
            vec![
                Expr::member(ldtoken(unresolved), "FieldHandle"),
                type_handle(Expr::type_of(AstType::simple("Derived"))),
            ],
        );
        let mut e = original.clone();
        assert!(!unwrap_field_handle(&mut e));
        assert_eq!(e, original);
    }

    #[test]
    fn test_field_from_handle_token_with_extra_arguments_declines() {
        let token = Expr::invoke(
            Expr::ident("ldtoken"),
            vec![field_ref("Base", "value"), Expr::ident("extra")],
        )
        .with_load_token();
        let original = call(
            "System.Reflection.FieldInfo",
            "GetFieldFromHandle",
            vec![
                Expr::member(token, "FieldHandle"),
                type_handle(Expr::type_of(AstType::simple("Derived"))),
            ],
        );
        let mut e = original.clone();
        assert!(!unwrap_field_handle(&mut e));
        assert_eq!(e, original);
    }

    #[test]
    fn test_field_from_handle_without_load_token_declines() {
        let original = call(
            "System.Reflection.FieldInfo",
            "GetFieldFromHandle",
            vec![Expr::member(Expr::ident("h"), "FieldHandle")],
        );
        let mut e = original.clone();
        assert!(!unwrap_field_handle(&mut e));
        assert_eq!(e, original);
    }

    fn method_ref() -> Expr {
        let symbol = method("Widget", "Resize")
            .with_parameter("width", ty("System.Int32"))
            .with_parameter("label", ty("System.String"));
        Expr::member(Expr::type_reference(AstType::simple("Widget")), "Resize").with_method(symbol)
    }

    fn method_from_handle(args: Vec<Expr>) -> Expr {
        call_to(
            method("System.Reflection.MethodBase", "GetMethodFromHandle"),
            args,
        )
    }

    #[test]
    fn test_method_from_handle_collapses_cast() {
        let settings = TransformSettings::default();
        let ctx = context(&settings);
        let token = ldtoken(method_ref());
        let mut e = Expr::cast(
            AstType::simple("MethodInfo"),
            method_from_handle(vec![Expr::member(token.clone(), "MethodHandle")]),
        )
        .with_instructions(10, 12);
        assert!(unwrap_method_handle(&mut e, &ctx));
        assert_eq!(e.kind, token.kind);
        assert!(e.annotations.has_load_token());
        assert_eq!(e.annotations.instructions().count(), 1);
    }

    #[test]
    fn test_method_from_handle_with_declaring_type() {
        let settings = TransformSettings::default();
        let ctx = context(&settings);
        let mut e = Expr::cast(
            AstType::qualified("System.Reflection.ConstructorInfo"),
            method_from_handle(vec![
                Expr::member(ldtoken(method_ref()), "MethodHandle"),
                type_handle(Expr::type_of(AstType::simple("Gadget"))),
            ]),
        );
        assert!(unwrap_method_handle(&mut e, &ctx));
        assert!(e.is_fully_attached());
        let reference = e.child(1).unwrap();
        assert_eq!(reference.to_string(), "Gadget.Resize(int, string)");
        assert!(reference.annotations.method().is_none());
        assert!(reference.child(0).unwrap().annotations.method().is_some());
    }

    #[test]
    fn test_method_from_handle_unresolved_reference_collapses_unqualified() {
        let settings = TransformSettings::default();
        let ctx = context(&settings);
        let unresolved = Expr::member(Expr::type_reference(AstType::simple("Widget")), "Resize");
        let token = ldtoken(unresolved);
        let mut e = Expr::cast(
            AstType::simple("MethodInfo"),
            method_from_handle(vec![
                Expr::member(token.clone(), "MethodHandle"),
                type_handle(Expr::type_of(AstType::simple("Gadget"))),
            ]),
        );
        assert!(unwrap_method_handle(&mut e, &ctx));
        assert_eq!(e.kind, token.kind);
        assert_eq!(e.to_string(), "ldtoken(Widget.Resize)");
    }

    #[test]
    fn test_method_from_handle_needs_reflection_cast() {
        let settings = TransformSettings::default();
        let ctx = context(&settings);
        let original = Expr::cast(
            AstType::simple("FieldInfo"),
            method_from_handle(vec![Expr::member(ldtoken(method_ref()), "MethodHandle")]),
        );
        let mut e = original.clone();
        assert!(!unwrap_method_handle(&mut e, &ctx));
        assert_eq!(e, original);
    }
}

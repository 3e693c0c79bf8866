//! Conversion of semantic types into type syntax.

use sugarlift_core::{AstType, TypeSig};

/// Turns resolved types into the syntax used to spell them.
///
/// Hosts usually provide their own implementation that knows the using
/// directives in scope; [`DefaultTypeBuilder`] is a context-free fallback.
pub trait TypeSyntaxBuilder {
    fn convert_type(&self, ty: &TypeSig) -> AstType;
}

/// Context-free type syntax builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultTypeBuilder {
    /// Spell built-in types as keywords (`int`, `string`).
    pub use_keywords: bool,
    /// Emit namespace-qualified names instead of bare type names.
    pub fully_qualify: bool,
}

impl Default for DefaultTypeBuilder {
    fn default() -> Self {
        Self {
            use_keywords: true,
            fully_qualify: false,
        }
    }
}

impl DefaultTypeBuilder {
    pub fn new(use_keywords: bool) -> Self {
        Self {
            use_keywords,
            ..Self::default()
        }
    }

    pub fn fully_qualified(mut self) -> Self {
        self.fully_qualify = true;
        self
    }
}

/// Drops the generic arity suffix (`List`1` → `List`).
fn strip_arity(name: &str) -> &str {
    match name.find('`') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

impl TypeSyntaxBuilder for DefaultTypeBuilder {
    fn convert_type(&self, ty: &TypeSig) -> AstType {
        match ty {
            TypeSig::Named {
                namespace,
                name,
                type_args,
            } => {
                if self.use_keywords {
                    if let Some(known) = ty.known_type() {
                        return AstType::primitive(known.keyword());
                    }
                }
                let type_args: Vec<AstType> =
                    type_args.iter().map(|t| self.convert_type(t)).collect();
                let name = strip_arity(name).to_string();
                if self.fully_qualify && !namespace.is_empty() {
                    AstType::Member {
                        target: Box::new(AstType::qualified(namespace)),
                        name,
                        type_args,
                    }
                } else {
                    AstType::Simple { name, type_args }
                }
            }
            TypeSig::Array { element, rank } => AstType::Array {
                element: Box::new(self.convert_type(element)),
                rank: *rank,
            },
            // By-ref-ness is expressed at the use site (`ref`/`in`), not in the type.
            TypeSig::ByRef(inner) => self.convert_type(inner),
            TypeSig::Parameter(tp) => AstType::simple(tp.name.clone()),
            TypeSig::Unknown => AstType::simple("?"),
        }
    }
}

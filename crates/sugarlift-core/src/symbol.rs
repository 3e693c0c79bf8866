//! Resolved symbols attached to syntax nodes.

use crate::types::TypeSig;

/// The declared program element a node denotes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Symbol {
    Method(MethodSymbol),
    Field(FieldSymbol),
    Type(TypeSig),
}

/// A method, constructor or operator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodSymbol {
    /// Metadata name (`op_Addition`, `.ctor`, `Concat`, ...).
    pub name: String,
    pub declaring_type: TypeSig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_static: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub parameters: Vec<Parameter>,
    pub return_type: TypeSig,
    /// Method-level type arguments of a generic instantiation.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub type_arguments: Vec<TypeSig>,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameter {
    pub name: String,
    pub ty: TypeSig,
}

/// A field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldSymbol {
    pub name: String,
    pub declaring_type: TypeSig,
    pub ty: TypeSig,
}

impl MethodSymbol {
    /// Creates a static method with no parameters returning `void`.
    pub fn new_static(declaring_type: TypeSig, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declaring_type,
            is_static: true,
            parameters: Vec::new(),
            return_type: TypeSig::known(crate::types::KnownType::Void),
            type_arguments: Vec::new(),
        }
    }

    /// Adds a parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, ty: TypeSig) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            ty,
        });
        self
    }

    /// Sets the return type.
    pub fn returning(mut self, ty: TypeSig) -> Self {
        self.return_type = ty;
        self
    }

    /// Adds a method-level type argument.
    pub fn with_type_argument(mut self, ty: TypeSig) -> Self {
        self.type_arguments.push(ty);
        self
    }

    /// `Namespace.Type.Name`, e.g. `System.String.Format`.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.declaring_type.full_name(), self.name)
    }

    /// Checks whether this method is `name` declared on the type `declaring_type`.
    pub fn is(&self, declaring_type: &str, name: &str) -> bool {
        self.name == name && self.declaring_type.full_name() == declaring_type
    }
}

impl FieldSymbol {
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.declaring_type.full_name(), self.name)
    }
}

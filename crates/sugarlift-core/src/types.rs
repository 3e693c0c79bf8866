//! Semantic type signatures.
//!
//! These describe the types that resolved symbols refer to. They are distinct
//! from [`AstType`](crate::ast::AstType), which is the *syntax* used to spell a
//! type in the output; a [`TypeSig`] is turned into an `AstType` by a type
//! syntax builder owned by the host.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TypeSig {
    /// A named (possibly generic) type such as `System.Collections.Generic.List<int>`.
    Named {
        namespace: String,
        name: String,
        #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
        type_args: Vec<TypeSig>,
    },
    /// An array type with the given rank.
    Array { element: Box<TypeSig>, rank: u32 },
    /// A managed by-reference type (`T&`).
    ByRef(Box<TypeSig>),
    /// A generic type parameter.
    Parameter(TypeParameter),
    /// The type could not be resolved.
    Unknown,
}

/// A generic type parameter and the constraints relevant to rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeParameter {
    pub name: String,
    /// True when the parameter carries a `new()` constraint (or is a value type).
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_default_constructor_constraint: bool,
}

/// Well-known types from the core library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownType {
    Void,
    Object,
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    String,
}

impl KnownType {
    /// Returns all known types.
    pub fn all() -> &'static [KnownType] {
        use KnownType::*;
        &[
            Void, Object, Boolean, Char, SByte, Byte, Int16, UInt16, Int32, UInt32, Int64,
            UInt64, Single, Double, Decimal, String,
        ]
    }

    /// The metadata name inside the `System` namespace.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Void => "Void",
            Self::Object => "Object",
            Self::Boolean => "Boolean",
            Self::Char => "Char",
            Self::SByte => "SByte",
            Self::Byte => "Byte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Single => "Single",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::String => "String",
        }
    }

    /// The C# keyword for this type.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Object => "object",
            Self::Boolean => "bool",
            Self::Char => "char",
            Self::SByte => "sbyte",
            Self::Byte => "byte",
            Self::Int16 => "short",
            Self::UInt16 => "ushort",
            Self::Int32 => "int",
            Self::UInt32 => "uint",
            Self::Int64 => "long",
            Self::UInt64 => "ulong",
            Self::Single => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::String => "string",
        }
    }

    /// Looks up a known type by its metadata name in `System`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }
}

impl TypeSig {
    /// Creates a non-generic named type.
    pub fn named(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            namespace: namespace.into(),
            name: name.into(),
            type_args: Vec::new(),
        }
    }

    /// Creates a well-known type.
    pub fn known(kind: KnownType) -> Self {
        Self::named("System", kind.name())
    }

    /// `System.String`.
    pub fn string() -> Self {
        Self::known(KnownType::String)
    }

    /// Creates a generic type parameter.
    pub fn type_parameter(name: impl Into<String>, has_default_constructor_constraint: bool) -> Self {
        Self::Parameter(TypeParameter {
            name: name.into(),
            has_default_constructor_constraint,
        })
    }

    /// Creates a single-dimensional array of `element`.
    pub fn array_of(element: TypeSig) -> Self {
        Self::Array {
            element: Box::new(element),
            rank: 1,
        }
    }

    /// Returns the known type this signature denotes, if any.
    pub fn known_type(&self) -> Option<KnownType> {
        match self {
            Self::Named {
                namespace,
                name,
                type_args,
            } if namespace == "System" && type_args.is_empty() => KnownType::from_name(name),
            _ => None,
        }
    }

    /// Checks whether this is the given known type.
    pub fn is_known(&self, kind: KnownType) -> bool {
        self.known_type() == Some(kind)
    }

    /// Checks whether this is an array type.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array { .. })
    }

    /// Returns the namespace-qualified name without type arguments.
    ///
    /// Arrays, by-refs and type parameters return their display form.
    pub fn full_name(&self) -> String {
        match self {
            Self::Named { namespace, name, .. } if namespace.is_empty() => name.clone(),
            Self::Named { namespace, name, .. } => format!("{}.{}", namespace, name),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for TypeSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named {
                namespace,
                name,
                type_args,
            } => {
                if !namespace.is_empty() {
                    write!(f, "{}.", namespace)?;
                }
                write!(f, "{}", name)?;
                if !type_args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in type_args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Self::Array { element, rank } => {
                write!(f, "{}[", element)?;
                for _ in 1..*rank {
                    write!(f, ",")?;
                }
                write!(f, "]")
            }
            Self::ByRef(inner) => write!(f, "{}&", inner),
            Self::Parameter(tp) => write!(f, "{}", tp.name),
            Self::Unknown => write!(f, "?"),
        }
    }
}

impl FromStr for TypeSig {
    type Err = Error;

    /// Parses the textual form produced by `Display`, e.g.
    /// `System.Collections.Generic.Dictionary<System.String, System.Int32[]>`.
    ///
    /// Type parameters cannot be spelled this way; use [`TypeSig::type_parameter`].
    fn from_str(s: &str) -> Result<Self> {
        let mut parser = TypeNameParser { src: s, pos: 0 };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(Error::InvalidTypeName(s.to_string()));
        }
        Ok(ty)
    }
}

struct TypeNameParser<'a> {
    src: &'a str,
    pos: usize,
}

impl TypeNameParser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn parse_type(&mut self) -> Result<TypeSig> {
        if self.eat('?') {
            return Ok(TypeSig::Unknown);
        }
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '.' | '`') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        let dotted = &self.src[start..self.pos];
        if dotted.is_empty() || dotted.starts_with('.') || dotted.ends_with('.') {
            return Err(Error::InvalidTypeName(self.src.to_string()));
        }
        let (namespace, name) = match dotted.rfind('.') {
            Some(idx) => (&dotted[..idx], &dotted[idx + 1..]),
            None => ("", dotted),
        };

        let mut type_args = Vec::new();
        if self.eat('<') {
            loop {
                type_args.push(self.parse_type()?);
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(Error::UnbalancedTypeArguments(self.src.to_string()));
            }
        }

        let mut ty = TypeSig::Named {
            namespace: namespace.to_string(),
            name: name.to_string(),
            type_args,
        };

        loop {
            if self.eat('[') {
                let mut rank = 1;
                while self.eat(',') {
                    rank += 1;
                }
                if !self.eat(']') {
                    return Err(Error::InvalidTypeName(self.src.to_string()));
                }
                ty = TypeSig::Array {
                    element: Box::new(ty),
                    rank,
                };
            } else if self.eat('&') {
                ty = TypeSig::ByRef(Box::new(ty));
            } else {
                break;
            }
        }

        Ok(ty)
    }
}

//! Annotations carried by syntax nodes.
//!
//! Annotations are metadata produced upstream (symbol resolution, instruction
//! mapping). Rewrites move them from the node they replace to the node that
//! takes its place.

use crate::symbol::{FieldSymbol, MethodSymbol, Symbol};
use crate::types::TypeSig;

/// A half-open range of IL offsets an expression was reconstructed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstructionRange {
    pub start: u32,
    pub end: u32,
}

impl InstructionRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// A single annotation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Annotation {
    /// The program element the node denotes.
    Symbol(Symbol),
    /// Instruction provenance.
    Instructions(Vec<InstructionRange>),
    /// Statically resolved type of the expression.
    ResolvedType(TypeSig),
    /// The node was produced by a `ldtoken` instruction.
    LoadToken,
}

/// The ordered annotation list of a node.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Annotations(Vec<Annotation>);

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.0.iter()
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.0.push(annotation);
    }

    /// First resolved symbol, if any.
    pub fn symbol(&self) -> Option<&Symbol> {
        self.0.iter().find_map(|a| match a {
            Annotation::Symbol(s) => Some(s),
            _ => None,
        })
    }

    /// Resolved method symbol, if the first symbol is a method.
    pub fn method(&self) -> Option<&MethodSymbol> {
        match self.symbol()? {
            Symbol::Method(m) => Some(m),
            _ => None,
        }
    }

    /// Resolved field symbol, if the first symbol is a field.
    pub fn field(&self) -> Option<&FieldSymbol> {
        match self.symbol()? {
            Symbol::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn resolved_type(&self) -> Option<&TypeSig> {
        self.0.iter().find_map(|a| match a {
            Annotation::ResolvedType(t) => Some(t),
            _ => None,
        })
    }

    pub fn has_load_token(&self) -> bool {
        self.0.iter().any(|a| matches!(a, Annotation::LoadToken))
    }

    /// All instruction ranges, in annotation order.
    pub fn instructions(&self) -> impl Iterator<Item = &InstructionRange> {
        self.0.iter().flat_map(|a| match a {
            Annotation::Instructions(ranges) => ranges.as_slice(),
            _ => &[][..],
        })
    }

    /// Appends every annotation of `donor`.
    pub fn copy_from(&mut self, donor: &Annotations) {
        self.0.extend(donor.0.iter().cloned());
    }

    /// Appends only the instruction provenance of `donor`.
    pub fn copy_instructions_from(&mut self, donor: &Annotations) {
        let ranges: Vec<InstructionRange> = donor.instructions().copied().collect();
        if !ranges.is_empty() {
            self.0.push(Annotation::Instructions(ranges));
        }
    }
}

impl From<Vec<Annotation>> for Annotations {
    fn from(annotations: Vec<Annotation>) -> Self {
        Self(annotations)
    }
}

//! Type printers: `TypeDesc` plus context to target type spelling.
//!
//! Each target implements [`TypePrinter`]. The context is an explicit value
//! passed down every call, including the recursive ones for pointees and
//! array elements, so a printer never carries state between calls.

use crate::config::Target;
use crate::error::{GenError, Result};
use crate::model::{
    ArraySize, DeclIndex, Direction, EntryKind, IndexEntry, ParamDecl, PrimitiveKind, TypeAlias,
    TypeDesc,
};

pub mod c;
pub mod java;

pub use c::CTypePrinter;
pub use java::JavaTypePrinter;

/// Where a type is being spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrintContext {
    /// User-facing signatures.
    Signature,
    /// The native call boundary: objects become opaque handles.
    Native,
    /// Generic/container positions: primitives print boxed.
    Boxed,
}

impl PrintContext {
    pub const ALL: [PrintContext; 3] = [
        PrintContext::Signature,
        PrintContext::Native,
        PrintContext::Boxed,
    ];
}

impl std::fmt::Display for PrintContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrintContext::Signature => f.write_str("signature"),
            PrintContext::Native => f.write_str("native"),
            PrintContext::Boxed => f.write_str("boxed"),
        }
    }
}

/// Print context plus the direction of the parameter being printed, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeContext {
    pub kind: PrintContext,
    pub direction: Option<Direction>,
}

impl TypeContext {
    pub fn new(kind: PrintContext) -> Self {
        Self {
            kind,
            direction: None,
        }
    }

    pub fn param(kind: PrintContext, direction: Direction) -> Self {
        Self {
            kind,
            direction: Some(direction),
        }
    }

    pub fn with_kind(self, kind: PrintContext) -> Self {
        Self { kind, ..self }
    }

    /// Context for a nested type (pointee, element): the parameter
    /// direction applies only to the outermost type.
    pub fn nested(self) -> Self {
        Self {
            direction: None,
            ..self
        }
    }

    pub fn is_by_ref(self) -> bool {
        self.direction.is_some_and(Direction::is_by_ref)
    }
}

/// Spells types for one target.
pub trait TypePrinter {
    fn target(&self) -> Target;

    fn index(&self) -> &DeclIndex;

    fn primitive(&self, kind: PrimitiveKind, cx: TypeContext) -> Result<String>;

    fn pointer(&self, pointee: &TypeDesc, is_const: bool, cx: TypeContext) -> Result<String>;

    fn array(&self, element: &TypeDesc, size: ArraySize, cx: TypeContext) -> Result<String>;

    fn decayed(&self, alias: &TypeAlias, cx: TypeContext) -> Result<String>;

    fn named(&self, entry: &IndexEntry, cx: TypeContext) -> Result<String>;

    /// A parameter with direction-aware wrapping, optionally followed by its
    /// name.
    fn param(&self, param: &ParamDecl, kind: PrintContext, with_name: bool) -> Result<String>;

    fn print(&self, ty: &TypeDesc, cx: TypeContext) -> Result<String> {
        match ty {
            TypeDesc::Primitive { kind } => self.primitive(*kind, cx),
            TypeDesc::Pointer { pointee, is_const } => self.pointer(pointee, *is_const, cx),
            TypeDesc::Array { element, size } => self.array(element, *size, cx),
            TypeDesc::Decayed { alias } => self.decayed(alias, cx),
            TypeDesc::Unsupported { origin } => Err(self.unsupported(origin, cx)),
            TypeDesc::Named { name } => {
                let entry = self.resolve(name)?;
                self.named(entry, cx)
            }
        }
    }

    fn print_as(&self, ty: &TypeDesc, kind: PrintContext) -> Result<String> {
        self.print(ty, TypeContext::new(kind))
    }

    /// Comma-separated parameter list.
    fn params<'p, I>(&self, params: I, kind: PrintContext, with_names: bool) -> Result<String>
    where
        I: IntoIterator<Item = &'p ParamDecl>,
    {
        let printed = params
            .into_iter()
            .map(|p| self.param(p, kind, with_names))
            .collect::<Result<Vec<_>>>()?;
        Ok(printed.join(", "))
    }

    fn resolve(&self, name: &str) -> Result<&IndexEntry> {
        self.index().get(name).ok_or_else(|| GenError::UnknownType {
            name: name.to_string(),
        })
    }

    fn unsupported(&self, ty: &str, cx: TypeContext) -> GenError {
        GenError::UnsupportedType {
            ty: ty.to_string(),
            target: self.target(),
            context: cx.kind,
        }
    }
}

/// The class a pointer refers to, if it is a managed object reference.
pub fn class_pointee<'i>(index: &'i DeclIndex, pointee: &TypeDesc) -> Option<&'i IndexEntry> {
    match pointee.resolve_alias() {
        TypeDesc::Named { name } => index.get(name).filter(|e| e.is_class()),
        _ => None,
    }
}

/// Backing type of a named enum.
pub fn enum_underlying(entry: &IndexEntry) -> Option<PrimitiveKind> {
    match entry.kind {
        EntryKind::Enum { underlying } => Some(underlying),
        EntryKind::Class { .. } => None,
    }
}

//! Declaration model: the managed type graph handed to the emitters.
//!
//! These types are produced by an upstream reflection provider and are
//! read-only for the whole generation pass. They are target-independent, so
//! the C and Java emitters can be tested against the same fixtures.

use std::collections::HashMap;

use serde::Deserialize;

/// A translation unit: one managed assembly and its declaration tree.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    /// Assembly file name, e.g. `managed.dll`.
    pub file_name: String,
    /// Native library name used by the Java surface to load the C surface.
    pub library: String,
    pub declarations: Vec<Decl>,
}

impl TranslationUnit {
    /// File name without its extension (`managed.dll` → `managed`).
    pub fn base_name(&self) -> &str {
        file_base_name(&self.file_name)
    }
}

/// Strip the extension from an assembly file name.
pub fn file_base_name(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// Access level of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
    Internal,
}

/// Attributes shared by every named declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct DeclMeta {
    pub name: String,
    #[serde(default)]
    pub access: Access,
    /// Explicitly excluded by the user.
    #[serde(default)]
    pub ignore: bool,
    /// Selected for generation by the provider.
    #[serde(default = "default_true")]
    pub generated: bool,
}

fn default_true() -> bool {
    true
}

impl DeclMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access: Access::Public,
            ignore: false,
            generated: true,
        }
    }

    /// A declaration reaches the output only when it is generated and not
    /// ignored.
    pub fn is_emitted(&self) -> bool {
        self.generated && !self.ignore
    }
}

/// A declaration in the managed graph.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decl {
    Namespace(NamespaceDecl),
    Class(ClassDecl),
    Enum(EnumDecl),
    EnumItem(EnumItem),
    Method(MethodDecl),
    Field(FieldDecl),
    Property(PropertyDecl),
    Parameter(ParamDecl),
    Typedef(TypedefDecl),
}

/// Discriminant of [`Decl`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Namespace,
    Class,
    Enum,
    EnumItem,
    Method,
    Field,
    Property,
    Parameter,
    Typedef,
}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeclKind::Namespace => "namespace",
            DeclKind::Class => "class",
            DeclKind::Enum => "enum",
            DeclKind::EnumItem => "enum item",
            DeclKind::Method => "method",
            DeclKind::Field => "field",
            DeclKind::Property => "property",
            DeclKind::Parameter => "parameter",
            DeclKind::Typedef => "typedef",
        };
        f.write_str(s)
    }
}

impl Decl {
    pub fn kind(&self) -> DeclKind {
        match self {
            Decl::Namespace(_) => DeclKind::Namespace,
            Decl::Class(_) => DeclKind::Class,
            Decl::Enum(_) => DeclKind::Enum,
            Decl::EnumItem(_) => DeclKind::EnumItem,
            Decl::Method(_) => DeclKind::Method,
            Decl::Field(_) => DeclKind::Field,
            Decl::Property(_) => DeclKind::Property,
            Decl::Parameter(_) => DeclKind::Parameter,
            Decl::Typedef(_) => DeclKind::Typedef,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Decl::Namespace(d) => &d.meta.name,
            Decl::Class(d) => &d.meta.name,
            Decl::Enum(d) => &d.meta.name,
            Decl::EnumItem(d) => &d.name,
            Decl::Method(d) => &d.meta.name,
            Decl::Field(d) => &d.meta.name,
            Decl::Property(d) => &d.meta.name,
            Decl::Parameter(d) => &d.name,
            Decl::Typedef(d) => &d.meta.name,
        }
    }

    /// Whether the declaration should be visited at all. Items and
    /// parameters carry no flags of their own and always pass.
    pub fn is_emitted(&self) -> bool {
        match self {
            Decl::Namespace(d) => d.meta.is_emitted(),
            Decl::Class(d) => d.meta.is_emitted(),
            Decl::Enum(d) => d.meta.is_emitted(),
            Decl::Method(d) => d.meta.is_emitted(),
            Decl::Field(d) => d.meta.is_emitted(),
            Decl::Property(d) => d.meta.is_emitted(),
            Decl::Typedef(d) => d.meta.is_emitted(),
            Decl::EnumItem(_) | Decl::Parameter(_) => true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamespaceDecl {
    #[serde(flatten)]
    pub meta: DeclMeta,
    #[serde(default)]
    pub declarations: Vec<Decl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassDecl {
    #[serde(flatten)]
    pub meta: DeclMeta,
    /// Dot-qualified managed names of base classes and interfaces.
    #[serde(default)]
    pub bases: Vec<String>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_interface: bool,
    /// Members: methods, fields, properties and nested types.
    #[serde(default)]
    pub declarations: Vec<Decl>,
}

impl ClassDecl {
    /// Generated methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Decl::Method(m) if m.meta.is_emitted() => Some(m),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumDecl {
    #[serde(flatten)]
    pub meta: DeclMeta,
    /// Backing integral type.
    #[serde(default = "default_underlying")]
    pub underlying: PrimitiveKind,
    #[serde(default)]
    pub items: Vec<EnumItem>,
}

fn default_underlying() -> PrimitiveKind {
    PrimitiveKind::Int32
}

impl EnumDecl {
    /// An enum without items has no definition to emit.
    pub fn is_incomplete(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolved value of every item, in item order. Items without an
    /// explicit value take the previous value plus one, starting at zero.
    pub fn item_values(&self) -> Vec<i64> {
        let mut next = 0i64;
        self.items
            .iter()
            .map(|item| {
                let value = item.value.unwrap_or(next);
                next = value.wrapping_add(1);
                value
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumItem {
    pub name: String,
    /// Explicit value; `None` means positional.
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub doc: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    #[default]
    Normal,
    Constructor,
    Destructor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodDecl {
    #[serde(flatten)]
    pub meta: DeclMeta,
    /// Serialized as `role`; `kind` is taken by the declaration tag.
    #[serde(default, rename = "role")]
    pub kind: MethodKind,
    #[serde(default)]
    pub is_static: bool,
    /// Pure virtual / abstract.
    #[serde(default)]
    pub is_pure: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_override: bool,
    #[serde(default)]
    pub return_type: TypeDesc,
    #[serde(default)]
    pub parameters: Vec<ParamDecl>,
}

impl MethodDecl {
    pub fn is_ctor_or_dtor(&self) -> bool {
        matches!(self.kind, MethodKind::Constructor | MethodKind::Destructor)
    }

    /// Instance methods receive the native handle as an implicit first
    /// argument. Destructors take the receiver too, constructors produce it.
    pub fn takes_receiver(&self) -> bool {
        !self.is_static && self.kind != MethodKind::Constructor
    }

    /// A value is handed back to the caller only for non-void normal methods.
    pub fn has_return(&self) -> bool {
        !self.return_type.is_void() && !self.is_ctor_or_dtor()
    }

    /// Parameters as seen by the caller, skipping compiler-synthesized ones.
    pub fn visible_params(&self) -> impl Iterator<Item = &ParamDecl> {
        self.parameters.iter().filter(|p| !p.implicit)
    }
}

/// Parameter passing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    In,
    Out,
    InOut,
}

impl Direction {
    pub fn is_by_ref(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDesc,
    #[serde(default)]
    pub direction: Direction,
    /// Synthesized by the compiler (e.g. a hidden `this`); never marshaled.
    #[serde(default)]
    pub implicit: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDecl {
    #[serde(flatten)]
    pub meta: DeclMeta,
    #[serde(rename = "type")]
    pub ty: TypeDesc,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDecl {
    #[serde(flatten)]
    pub meta: DeclMeta,
    #[serde(rename = "type")]
    pub ty: TypeDesc,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypedefDecl {
    #[serde(flatten)]
    pub meta: DeclMeta,
    pub target: TypeDesc,
}

/// Primitive type kinds of the managed type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Void,
    Bool,
    /// UTF-16 code unit (managed `char`).
    Char,
    WideChar,
    Char16,
    Char32,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Int128,
    UInt128,
    Half,
    Float,
    Double,
    LongDouble,
    IntPtr,
    UIntPtr,
    String,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 23] = [
        PrimitiveKind::Void,
        PrimitiveKind::Bool,
        PrimitiveKind::Char,
        PrimitiveKind::WideChar,
        PrimitiveKind::Char16,
        PrimitiveKind::Char32,
        PrimitiveKind::Int8,
        PrimitiveKind::UInt8,
        PrimitiveKind::Int16,
        PrimitiveKind::UInt16,
        PrimitiveKind::Int32,
        PrimitiveKind::UInt32,
        PrimitiveKind::Int64,
        PrimitiveKind::UInt64,
        PrimitiveKind::Int128,
        PrimitiveKind::UInt128,
        PrimitiveKind::Half,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::LongDouble,
        PrimitiveKind::IntPtr,
        PrimitiveKind::UIntPtr,
        PrimitiveKind::String,
    ];

    /// Inclusive value range of an integral kind.
    pub fn integral_range(self) -> Option<(i128, i128)> {
        let range = match self {
            PrimitiveKind::Int8 => (i8::MIN as i128, i8::MAX as i128),
            PrimitiveKind::UInt8 => (0, u8::MAX as i128),
            PrimitiveKind::Int16 => (i16::MIN as i128, i16::MAX as i128),
            PrimitiveKind::UInt16 => (0, u16::MAX as i128),
            PrimitiveKind::Int32 => (i32::MIN as i128, i32::MAX as i128),
            PrimitiveKind::UInt32 => (0, u32::MAX as i128),
            PrimitiveKind::Int64 => (i64::MIN as i128, i64::MAX as i128),
            PrimitiveKind::UInt64 => (0, u64::MAX as i128),
            _ => return None,
        };
        Some(range)
    }

    /// Runtime type name, as the managed side looks it up.
    pub fn managed_name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "System.Void",
            PrimitiveKind::Bool => "System.Boolean",
            PrimitiveKind::Char | PrimitiveKind::WideChar | PrimitiveKind::Char16 => "System.Char",
            PrimitiveKind::Char32 => "System.Text.Rune",
            PrimitiveKind::Int8 => "System.SByte",
            PrimitiveKind::UInt8 => "System.Byte",
            PrimitiveKind::Int16 => "System.Int16",
            PrimitiveKind::UInt16 => "System.UInt16",
            PrimitiveKind::Int32 => "System.Int32",
            PrimitiveKind::UInt32 => "System.UInt32",
            PrimitiveKind::Int64 => "System.Int64",
            PrimitiveKind::UInt64 => "System.UInt64",
            PrimitiveKind::Int128 => "System.Int128",
            PrimitiveKind::UInt128 => "System.UInt128",
            PrimitiveKind::Half => "System.Half",
            PrimitiveKind::Float => "System.Single",
            PrimitiveKind::Double | PrimitiveKind::LongDouble => "System.Double",
            PrimitiveKind::IntPtr => "System.IntPtr",
            PrimitiveKind::UIntPtr => "System.UIntPtr",
            PrimitiveKind::String => "System.String",
        }
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            PrimitiveKind::UInt8
                | PrimitiveKind::UInt16
                | PrimitiveKind::UInt32
                | PrimitiveKind::UInt64
                | PrimitiveKind::UInt128
                | PrimitiveKind::UIntPtr
        )
    }
}

/// Length of an array type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArraySize {
    #[default]
    Variable,
    Constant(usize),
}

/// A type alias that a decayed type resolves through.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypeAlias {
    #[serde(default)]
    pub namespace: Vec<String>,
    pub name: String,
    pub target: Box<TypeDesc>,
}

/// A managed type as seen by the printers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeDesc {
    Primitive {
        kind: PrimitiveKind,
    },
    /// Pointer or managed reference. Managed class references are pointers to
    /// a `Named` class.
    Pointer {
        pointee: Box<TypeDesc>,
        #[serde(default)]
        is_const: bool,
    },
    Array {
        element: Box<TypeDesc>,
        #[serde(default)]
        size: ArraySize,
    },
    /// Managed array decayed to a declared alias; prints through the alias.
    Decayed {
        alias: TypeAlias,
    },
    /// A managed-only type with no native representation.
    Unsupported {
        origin: String,
    },
    /// Reference to a declared class or enum by dot-qualified managed name.
    Named {
        name: String,
    },
}

impl Default for TypeDesc {
    fn default() -> Self {
        TypeDesc::primitive(PrimitiveKind::Void)
    }
}

impl TypeDesc {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeDesc::Primitive { kind }
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeDesc::Named { name: name.into() }
    }

    /// A managed object reference: pointer to a named class.
    pub fn class_ref(name: impl Into<String>) -> Self {
        TypeDesc::Pointer {
            pointee: Box::new(TypeDesc::named(name)),
            is_const: false,
        }
    }

    pub fn array_of(element: TypeDesc) -> Self {
        TypeDesc::Array {
            element: Box::new(element),
            size: ArraySize::Variable,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(
            self.resolve_alias(),
            TypeDesc::Primitive {
                kind: PrimitiveKind::Void
            }
        )
    }

    /// Follow decayed aliases down to the structural type.
    pub fn resolve_alias(&self) -> &TypeDesc {
        match self {
            TypeDesc::Decayed { alias } => alias.target.resolve_alias(),
            other => other,
        }
    }

    /// Managed type name as it appears in a runtime method descriptor.
    /// Object references are spelled by their class name.
    pub fn managed_name(&self) -> String {
        match self {
            TypeDesc::Primitive { kind } => kind.managed_name().to_string(),
            TypeDesc::Pointer { pointee, .. } => match pointee.as_ref() {
                TypeDesc::Named { name } => name.clone(),
                other => format!("{}*", other.managed_name()),
            },
            TypeDesc::Array { element, .. } => format!("{}[]", element.managed_name()),
            TypeDesc::Decayed { alias } => alias.target.managed_name(),
            TypeDesc::Unsupported { origin } => origin.clone(),
            TypeDesc::Named { name } => name.clone(),
        }
    }

    /// Human-readable spelling for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TypeDesc::Primitive { kind } => format!("{kind:?}"),
            TypeDesc::Pointer { pointee, .. } => format!("{}*", pointee.describe()),
            TypeDesc::Array { element, .. } => format!("{}[]", element.describe()),
            TypeDesc::Decayed { alias } => alias.name.clone(),
            TypeDesc::Unsupported { origin } => origin.clone(),
            TypeDesc::Named { name } => name.clone(),
        }
    }
}

/// Lexical position of a declaration: the enclosing namespaces and classes.
///
/// This is the non-owning parent reference of the declaration graph; it is
/// built during traversal rather than stored on each node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub namespaces: Vec<String>,
    pub classes: Vec<String>,
}

impl Scope {
    pub fn enter_namespace(&self, name: &str) -> Scope {
        let mut scope = self.clone();
        scope
            .namespaces
            .extend(name.split('.').filter(|s| !s.is_empty()).map(String::from));
        scope
    }

    pub fn enter_class(&self, name: &str) -> Scope {
        let mut scope = self.clone();
        scope.classes.push(name.to_string());
        scope
    }

    pub fn is_nested(&self) -> bool {
        !self.classes.is_empty()
    }

    /// Dot-qualified managed name of `name` declared in this scope.
    pub fn qualify(&self, name: &str) -> String {
        self.segments(name).join(".")
    }

    /// Namespace segments, enclosing classes, then `name`.
    pub fn segments(&self, name: &str) -> Vec<String> {
        let mut segs = self.namespaces.clone();
        segs.extend(self.classes.iter().cloned());
        segs.push(name.to_string());
        segs
    }
}

/// What an index entry refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Class {
        bases: Vec<String>,
        is_interface: bool,
        is_static: bool,
    },
    Enum {
        underlying: PrimitiveKind,
    },
}

/// A class or enum known to the generator.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// File name of the unit that declares it.
    pub unit: String,
    pub scope: Scope,
    pub name: String,
    pub kind: EntryKind,
    /// Generated and not ignored, with every enclosing declaration emitted too.
    pub emitted: bool,
}

impl IndexEntry {
    pub fn is_class(&self) -> bool {
        matches!(self.kind, EntryKind::Class { .. })
    }

    pub fn is_interface(&self) -> bool {
        matches!(
            self.kind,
            EntryKind::Class {
                is_interface: true,
                ..
            }
        )
    }

    pub fn qualified_name(&self) -> String {
        self.scope.qualify(&self.name)
    }
}

/// Global index of classes and enums across every loaded unit.
///
/// Built once before emission and shared read-only by all printers, so that
/// `Named` references and base-class links resolve to the declaring unit.
#[derive(Debug, Default)]
pub struct DeclIndex {
    entries: HashMap<String, IndexEntry>,
}

impl DeclIndex {
    pub fn build(units: &[TranslationUnit]) -> Self {
        let mut index = DeclIndex::default();
        for unit in units {
            index.collect(&unit.file_name, &Scope::default(), &unit.declarations, true);
        }
        index
    }

    fn collect(&mut self, unit: &str, scope: &Scope, decls: &[Decl], parent_emitted: bool) {
        for decl in decls {
            match decl {
                Decl::Namespace(ns) => {
                    let inner = scope.enter_namespace(&ns.meta.name);
                    let emitted = parent_emitted && ns.meta.is_emitted();
                    self.collect(unit, &inner, &ns.declarations, emitted);
                }
                Decl::Class(c) => {
                    let emitted = parent_emitted && c.meta.is_emitted();
                    self.insert(IndexEntry {
                        unit: unit.to_string(),
                        scope: scope.clone(),
                        name: c.meta.name.clone(),
                        kind: EntryKind::Class {
                            bases: c.bases.clone(),
                            is_interface: c.is_interface,
                            is_static: c.is_static,
                        },
                        emitted,
                    });
                    let inner = scope.enter_class(&c.meta.name);
                    self.collect(unit, &inner, &c.declarations, emitted);
                }
                Decl::Enum(e) => {
                    self.insert(IndexEntry {
                        unit: unit.to_string(),
                        scope: scope.clone(),
                        name: e.meta.name.clone(),
                        kind: EntryKind::Enum {
                            underlying: e.underlying,
                        },
                        emitted: parent_emitted && e.meta.is_emitted(),
                    });
                }
                _ => {}
            }
        }
    }

    fn insert(&mut self, entry: IndexEntry) {
        // First writer wins, matching declaration order across units.
        self.entries.entry(entry.qualified_name()).or_insert(entry);
    }

    pub fn get(&self, qualified_name: &str) -> Option<&IndexEntry> {
        self.entries.get(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The superclass: the first base that resolves to a non-interface class.
    pub fn base_class(&self, qualified_name: &str) -> Option<&IndexEntry> {
        let EntryKind::Class { bases, .. } = &self.get(qualified_name)?.kind else {
            return None;
        };
        bases
            .iter()
            .filter_map(|b| self.get(b))
            .find(|b| b.is_class() && !b.is_interface())
    }

    /// The superclass, if it is itself emitted.
    pub fn generated_base(&self, qualified_name: &str) -> Option<&IndexEntry> {
        self.base_class(qualified_name).filter(|b| b.emitted)
    }

    /// Number of emitted ancestors between a class and the root that owns
    /// the native handle storage.
    pub fn handle_depth(&self, qualified_name: &str) -> usize {
        let mut depth = 0;
        let mut current = qualified_name.to_string();
        while let Some(base) = self.generated_base(&current) {
            depth += 1;
            current = base.qualified_name();
            // A cyclic base list from a broken provider must not hang us.
            if depth > self.entries.len() {
                break;
            }
        }
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, bases: &[&str], generated: bool) -> Decl {
        let mut meta = DeclMeta::new(name);
        meta.generated = generated;
        Decl::Class(ClassDecl {
            meta,
            bases: bases.iter().map(|s| s.to_string()).collect(),
            is_static: false,
            is_abstract: false,
            is_final: false,
            is_interface: false,
            declarations: vec![],
        })
    }

    fn unit(decls: Vec<Decl>) -> TranslationUnit {
        TranslationUnit {
            file_name: "managed.dll".into(),
            library: "managed".into(),
            declarations: vec![Decl::Namespace(NamespaceDecl {
                meta: DeclMeta::new("Shapes"),
                declarations: decls,
            })],
        }
    }

    #[test]
    fn positional_enum_values_continue_from_explicit() {
        let e = EnumDecl {
            meta: DeclMeta::new("Color"),
            underlying: PrimitiveKind::Int32,
            items: vec![
                EnumItem { name: "Red".into(), value: None, doc: None },
                EnumItem { name: "Green".into(), value: Some(4), doc: None },
                EnumItem { name: "Blue".into(), value: None, doc: None },
            ],
        };
        assert_eq!(e.item_values(), vec![0, 4, 5]);
    }

    #[test]
    fn handle_depth_stops_at_non_generated_base() {
        let units = vec![unit(vec![
            class("Hidden", &[], false),
            class("Shape", &["Shapes.Hidden"], true),
            class("Circle", &["Shapes.Shape"], true),
        ])];
        let index = DeclIndex::build(&units);
        assert_eq!(index.handle_depth("Shapes.Circle"), 1);
        assert_eq!(index.handle_depth("Shapes.Shape"), 0);
        assert!(index.generated_base("Shapes.Shape").is_none());
        assert_eq!(
            index.base_class("Shapes.Shape").map(|b| b.name.as_str()),
            Some("Hidden")
        );
    }

    #[test]
    fn children_of_ignored_namespace_are_not_emitted() {
        let mut units = vec![unit(vec![class("Square", &[], true)])];
        if let Decl::Namespace(ns) = &mut units[0].declarations[0] {
            ns.meta.ignore = true;
        }
        let index = DeclIndex::build(&units);
        let entry = index.get("Shapes.Square").expect("indexed");
        assert!(!entry.emitted);
    }
}

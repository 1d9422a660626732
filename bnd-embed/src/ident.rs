//! Generated identifiers, ABI symbol names and output paths.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::config::NamingStyle;
use crate::error::{GenError, Result};
use crate::model::{
    ClassDecl, Decl, IndexEntry, MethodDecl, MethodKind, Scope, TranslationUnit, file_base_name,
};

/// Escape prefix for generated identifiers. Managed identifiers never start
/// with two underscores in CLS-compliant code.
pub const GEN_PREFIX: &str = "__";

/// Java package holding the runtime support classes (`Ref`, `Out`, `Runtime`,
/// the unsigned integer types).
pub const JAVA_RUNTIME_PACKAGE: &str = "bnd.embed";

/// Header shipped with the C runtime support library.
pub const C_RUNTIME_HEADER: &str = "bnd_embed.h";

pub fn gen_id(id: &str) -> String {
    format!("{GEN_PREFIX}{id}")
}

/// Identifier of the static holding the assembly name in C sources
/// (`managed.dll` → `__managed_dll`).
pub fn assembly_id(unit: &TranslationUnit) -> String {
    gen_id(&unit.file_name).replace('.', "_")
}

/// Strip everything that is not valid in a C identifier.
pub fn c_identifier(id: &str) -> String {
    id.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// C spelling of a class, enum or typedef name.
pub fn c_type_name(scope: &Scope, name: &str, style: NamingStyle) -> String {
    let segs = match style {
        NamingStyle::Qualified => scope.segments(name),
        NamingStyle::Flat => {
            let mut segs = scope.classes.clone();
            segs.push(name.to_string());
            segs
        }
    };
    segs.join("_")
}

/// Namespace-qualified C prefix for a class' functions. Always qualified,
/// so flat type names still yield distinct symbols.
pub fn c_symbol_prefix(scope: &Scope, class_name: &str) -> String {
    c_type_name(scope, class_name, NamingStyle::Qualified)
}

fn method_base_name(method: &MethodDecl) -> &str {
    match method.kind {
        MethodKind::Constructor => "new",
        MethodKind::Destructor => "destroy",
        MethodKind::Normal => &method.meta.name,
    }
}

/// Root Java package of an assembly: its lower-cased base name.
pub fn java_root_package(file_name: &str) -> String {
    c_identifier(file_base_name(file_name)).to_lowercase()
}

/// Package segments for a declaration: the assembly's root package followed
/// by the lower-cased namespace chain.
fn package_names(file_name: &str, scope: &Scope) -> Vec<String> {
    let mut names = vec![java_root_package(file_name)];
    names.extend(scope.namespaces.iter().map(|n| n.to_lowercase()));
    names.retain(|n| !n.is_empty());
    names
}

pub fn java_package_names(unit: &TranslationUnit, scope: &Scope) -> Vec<String> {
    package_names(&unit.file_name, scope)
}

pub fn java_package(unit: &TranslationUnit, scope: &Scope) -> String {
    java_package_names(unit, scope).join(".")
}

/// Fully-qualified Java name of an indexed class or enum, e.g.
/// `managed.structs.Point` or `managed.structs.Outer.Inner`.
pub fn java_qualified_name(entry: &IndexEntry) -> String {
    let mut names = package_names(&entry.unit, &entry.scope);
    names.extend(entry.scope.classes.iter().cloned());
    names.push(entry.name.clone());
    names.join(".")
}

/// Relative output path of the Java file for a top-level declaration.
pub fn java_file_path(unit: &TranslationUnit, scope: &Scope, name: &str) -> PathBuf {
    let mut path: PathBuf = java_package_names(unit, scope).iter().collect();
    path.push(format!("{name}.java"));
    path
}

/// Class name of the JNA library interface for a unit.
pub fn java_native_lib_class(unit: &TranslationUnit) -> String {
    format!("Native{}", capitalize(&c_identifier(unit.base_name())))
}

pub fn c_header_file(unit: &TranslationUnit) -> PathBuf {
    PathBuf::from(format!("{}.h", unit.base_name()))
}

pub fn c_source_file(unit: &TranslationUnit) -> PathBuf {
    PathBuf::from(format!("{}.c", unit.base_name()))
}

/// ABI symbols of every generated method in a unit.
///
/// Both surfaces must agree on symbol names, so they are assigned once per
/// unit: `<Class>_<Method>`, with `_1`, `_2`, … appended to overloads in
/// declaration order.
#[derive(Debug, Default)]
pub struct SymbolTable {
    /// (qualified class name, member index) → symbol.
    symbols: HashMap<(String, usize), String>,
    /// Symbols in assignment order.
    ordered: Vec<String>,
}

impl SymbolTable {
    pub fn build(unit: &TranslationUnit) -> Result<Self> {
        let mut table = SymbolTable::default();
        let mut seen = HashSet::new();
        table.collect(&Scope::default(), &unit.declarations, &mut seen)?;
        Ok(table)
    }

    fn collect(&mut self, scope: &Scope, decls: &[Decl], seen: &mut HashSet<String>) -> Result<()> {
        for decl in decls.iter().filter(|d| d.is_emitted()) {
            match decl {
                Decl::Namespace(ns) => {
                    self.collect(&scope.enter_namespace(&ns.meta.name), &ns.declarations, seen)?
                }
                Decl::Class(c) => self.collect_class(scope, c, seen)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn collect_class(
        &mut self,
        scope: &Scope,
        class: &ClassDecl,
        seen: &mut HashSet<String>,
    ) -> Result<()> {
        let prefix = c_symbol_prefix(scope, &class.meta.name);
        let qualified = scope.qualify(&class.meta.name);
        let mut overloads: HashMap<&str, usize> = HashMap::new();

        for (i, decl) in class.declarations.iter().enumerate() {
            let Decl::Method(method) = decl else { continue };
            if !method.meta.is_emitted() {
                continue;
            }
            let base = method_base_name(method);
            let count = overloads.entry(base).or_insert(0);
            let symbol = match *count {
                0 => format!("{prefix}_{base}"),
                n => format!("{prefix}_{base}_{n}"),
            };
            *count += 1;

            if !seen.insert(symbol.clone()) {
                return Err(GenError::SymbolCollision { symbol });
            }
            self.ordered.push(symbol.clone());
            self.symbols.insert((qualified.clone(), i), symbol);
        }

        // Nested types live in the class scope.
        let inner = scope.enter_class(&class.meta.name);
        for decl in class.declarations.iter().filter(|d| d.is_emitted()) {
            if let Decl::Class(nested) = decl {
                self.collect_class(&inner, nested, seen)?;
            }
        }
        Ok(())
    }

    /// Symbol of the member at `index` in the class' declaration list.
    pub fn get(&self, class_qualified: &str, index: usize) -> Option<&str> {
        self.symbols
            .get(&(class_qualified.to_string(), index))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

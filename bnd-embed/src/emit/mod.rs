//! Declaration emitters.
//!
//! Both targets walk the declaration graph through [`visit_decls`] and
//! [`visit_members`]: one closed `match` over [`Decl`], so a declaration kind
//! a target has no behavior for is an [`GenError::UnhandledDecl`] rather than
//! a silent gap.

use std::path::PathBuf;

use tracing::debug;

use crate::config::{Options, Target};
use crate::error::{GenError, Result};
use crate::ident::SymbolTable;
use crate::model::{
    ClassDecl, Decl, DeclIndex, EnumDecl, MethodDecl, NamespaceDecl, Scope, TranslationUnit,
    TypedefDecl,
};

pub mod c;
pub mod java;

/// One output file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Per-target declaration visitor.
pub trait DeclVisitor {
    fn target(&self) -> Target;

    fn visit_namespace(&mut self, scope: &Scope, ns: &NamespaceDecl) -> Result<()> {
        visit_decls(self, &scope.enter_namespace(&ns.meta.name), &ns.declarations)
    }

    fn visit_class(&mut self, scope: &Scope, class: &ClassDecl) -> Result<()>;

    fn visit_enum(&mut self, scope: &Scope, e: &EnumDecl) -> Result<()>;

    /// `member` is the method's position in the class' declaration list.
    fn visit_method(
        &mut self,
        scope: &Scope,
        class: &ClassDecl,
        member: usize,
        method: &MethodDecl,
    ) -> Result<()>;

    fn visit_typedef(&mut self, scope: &Scope, typedef: &TypedefDecl) -> Result<()>;
}

fn unhandled(decl: &Decl, target: Target) -> GenError {
    GenError::UnhandledDecl {
        kind: decl.kind(),
        name: decl.name().to_string(),
        target,
    }
}

/// Dispatch declarations at namespace level.
pub fn visit_decls<V: DeclVisitor + ?Sized>(
    v: &mut V,
    scope: &Scope,
    decls: &[Decl],
) -> Result<()> {
    for decl in decls {
        if !decl.is_emitted() {
            debug!(kind = %decl.kind(), name = decl.name(), "skipping declaration");
            continue;
        }
        match decl {
            Decl::Namespace(ns) => v.visit_namespace(scope, ns)?,
            Decl::Class(class) => v.visit_class(scope, class)?,
            Decl::Enum(e) => v.visit_enum(scope, e)?,
            Decl::Typedef(t) => v.visit_typedef(scope, t)?,
            // Surfaced through accessor methods by the provider.
            Decl::Field(_) | Decl::Property(_) => {}
            Decl::Method(_) | Decl::EnumItem(_) | Decl::Parameter(_) => {
                return Err(unhandled(decl, v.target()));
            }
        }
    }
    Ok(())
}

/// Dispatch the members of `class`, declared at `scope`.
pub fn visit_members<V: DeclVisitor + ?Sized>(
    v: &mut V,
    scope: &Scope,
    class: &ClassDecl,
) -> Result<()> {
    let inner = scope.enter_class(&class.meta.name);
    for (member, decl) in class.declarations.iter().enumerate() {
        if !decl.is_emitted() {
            debug!(kind = %decl.kind(), name = decl.name(), "skipping member");
            continue;
        }
        match decl {
            Decl::Method(method) => v.visit_method(scope, class, member, method)?,
            Decl::Class(nested) => v.visit_class(&inner, nested)?,
            Decl::Enum(e) => v.visit_enum(&inner, e)?,
            Decl::Typedef(t) => v.visit_typedef(&inner, t)?,
            Decl::Field(_) | Decl::Property(_) => {}
            Decl::Namespace(_) | Decl::EnumItem(_) | Decl::Parameter(_) => {
                return Err(unhandled(decl, v.target()));
            }
        }
    }
    Ok(())
}

/// Reject enums whose backing type has no integer spelling, or whose item
/// values do not fit it.
pub fn check_enum_backing(e: &EnumDecl) -> Result<()> {
    let Some((min, max)) = e.underlying.integral_range() else {
        return Err(GenError::InvalidEnumBacking {
            name: e.meta.name.clone(),
            underlying: format!("{:?}", e.underlying),
        });
    };
    for (item, value) in e.items.iter().zip(e.item_values()) {
        if !(min..=max).contains(&i128::from(value)) {
            return Err(GenError::EnumValueOutOfRange {
                name: e.meta.name.clone(),
                item: item.name.clone(),
                value,
                underlying: format!("{:?}", e.underlying),
            });
        }
    }
    Ok(())
}

/// Emit every file of `unit` for `target`. Nothing is written here; the
/// caller flushes the files once the whole unit succeeded.
pub fn emit_unit(
    unit: &TranslationUnit,
    index: &DeclIndex,
    options: &Options,
    target: Target,
) -> Result<Vec<GeneratedFile>> {
    let symbols = SymbolTable::build(unit)?;
    let files = match target {
        Target::C => c::CEmitter::new(unit, index, options, &symbols).emit()?,
        Target::Java => java::JavaEmitter::new(unit, index, &symbols).emit()?,
    };
    debug!(unit = %unit.file_name, %target, files = files.len(), "emitted unit");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeclMeta, EnumItem, ParamDecl, PrimitiveKind, TypeDesc};
    use crate::test_support::{method, sample_unit, unit_with};

    fn emit(unit: &TranslationUnit, target: Target) -> Result<Vec<GeneratedFile>> {
        let index = DeclIndex::build(std::slice::from_ref(unit));
        emit_unit(unit, &index, &Options::default(), target)
    }

    #[test]
    fn method_outside_a_class_is_unhandled_on_both_targets() {
        let unit = unit_with(vec![Decl::Method(method("Free", TypeDesc::default(), vec![]))]);
        for target in [Target::C, Target::Java] {
            let err = emit(&unit, target).unwrap_err();
            let GenError::UnhandledDecl { name, target: t, .. } = &err else {
                panic!("{target}: {err}");
            };
            assert_eq!((name.as_str(), *t), ("Free", target));
        }
    }

    #[test]
    fn stray_parameter_is_unhandled() {
        let unit = unit_with(vec![Decl::Parameter(ParamDecl {
            name: "x".into(),
            ty: TypeDesc::primitive(PrimitiveKind::Int32),
            direction: Default::default(),
            implicit: false,
        })]);
        let err = emit(&unit, Target::C).unwrap_err();
        assert!(err.to_string().contains("parameter"), "{err}");
    }

    #[test]
    fn float_backed_enum_is_rejected() {
        let unit = unit_with(vec![Decl::Enum(EnumDecl {
            meta: DeclMeta::new("Ratio"),
            underlying: PrimitiveKind::Float,
            items: vec![EnumItem {
                name: "Half".into(),
                value: None,
                doc: None,
            }],
        })]);
        for target in [Target::C, Target::Java] {
            let err = emit(&unit, target).unwrap_err();
            assert!(matches!(err, GenError::InvalidEnumBacking { .. }), "{err}");
        }
    }

    #[test]
    fn enum_values_must_fit_the_backing_type() {
        let item = |name: &str, value| EnumItem {
            name: name.into(),
            value,
            doc: None,
        };
        let cases = [
            (PrimitiveKind::Int8, vec![item("Big", Some(300))], "Big"),
            (PrimitiveKind::UInt8, vec![item("Neg", Some(-1))], "Neg"),
            (
                PrimitiveKind::Int32,
                vec![item("Last", Some(i64::from(i32::MAX))), item("Next", None)],
                "Next",
            ),
        ];
        for (underlying, items, bad) in cases {
            let unit = unit_with(vec![Decl::Enum(EnumDecl {
                meta: DeclMeta::new("Level"),
                underlying,
                items,
            })]);
            for target in [Target::C, Target::Java] {
                let err = emit(&unit, target).unwrap_err();
                assert!(
                    matches!(&err, GenError::EnumValueOutOfRange { item, .. } if item == bad),
                    "{err}"
                );
            }
        }
    }

    #[test]
    fn ignored_declarations_do_not_change_output() {
        let plain = sample_unit();
        let mut with_ignored = sample_unit();
        let Decl::Namespace(ns) = &mut with_ignored.declarations[0] else {
            unreachable!()
        };
        let mut hidden = method("Hidden", TypeDesc::default(), vec![]);
        hidden.meta.ignore = true;
        let Decl::Class(point) = &mut ns.declarations[0] else {
            unreachable!()
        };
        point.declarations.insert(0, Decl::Method(hidden));
        for target in [Target::C, Target::Java] {
            assert_eq!(emit(&plain, target).unwrap(), emit(&with_ignored, target).unwrap());
        }
    }
}

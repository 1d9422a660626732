//! C type printer for the ABI surface.

use crate::config::{NamingStyle, Target};
use crate::error::Result;
use crate::ident::{c_identifier, c_type_name, capitalize};
use crate::model::{
    ArraySize, DeclIndex, EntryKind, IndexEntry, ParamDecl, PrimitiveKind, Scope, TypeAlias,
    TypeDesc,
};

use super::{PrintContext, TypeContext, TypePrinter, class_pointee};

/// Managed object reference as seen by C code calling the runtime.
pub const OBJECT_TYPE: &str = "bnd_embed_object*";

/// GC handle pinning a managed object behind a C wrapper struct.
pub const HANDLE_TYPE: &str = "bnd_embed_gchandle";

/// Staging type for strings passed by reference.
pub const STRING_REF_TYPE: &str = "GString*";

pub struct CTypePrinter<'a> {
    index: &'a DeclIndex,
    naming: NamingStyle,
}

impl<'a> CTypePrinter<'a> {
    pub fn new(index: &'a DeclIndex, naming: NamingStyle) -> Self {
        Self { index, naming }
    }

    pub fn naming(&self) -> NamingStyle {
        self.naming
    }

    /// C name of an indexed class or enum.
    pub fn entry_name(&self, entry: &IndexEntry) -> String {
        c_type_name(&entry.scope, &entry.name, self.naming)
    }

    /// C name of a declaration at `scope`.
    pub fn decl_name(&self, scope: &Scope, name: &str) -> String {
        c_type_name(scope, name, self.naming)
    }

    /// Name of the wrapper struct standing in for an array of `element`,
    /// e.g. `IntArray` or `Structs_PointArray`.
    pub fn array_wrapper_name(&self, element: &TypeDesc) -> Result<String> {
        let element_name = match element {
            TypeDesc::Primitive { kind } => element_keyword(*kind).to_string(),
            TypeDesc::Pointer { pointee, .. } => return self.array_wrapper_name(pointee),
            TypeDesc::Array { element, .. } => self.array_wrapper_name(element)?,
            TypeDesc::Decayed { alias } => self.alias_name(alias),
            TypeDesc::Named { name } => self.entry_name(self.resolve(name)?),
            TypeDesc::Unsupported { origin } => {
                return Err(self.unsupported(origin, TypeContext::new(PrintContext::Signature)));
            }
        };
        Ok(format!("{}Array", capitalize(&c_identifier(&element_name))))
    }

    fn alias_name(&self, alias: &TypeAlias) -> String {
        let scope = Scope {
            namespaces: alias.namespace.clone(),
            classes: Vec::new(),
        };
        c_type_name(&scope, &alias.name, self.naming)
    }
}

/// Keyword used to name array wrappers of a primitive element.
fn element_keyword(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Void => "void",
        PrimitiveKind::Bool => "bool",
        PrimitiveKind::Char => "char",
        PrimitiveKind::WideChar => "wchar",
        PrimitiveKind::Char16 => "char16",
        PrimitiveKind::Char32 => "char32",
        PrimitiveKind::Int8 => "sbyte",
        PrimitiveKind::UInt8 => "byte",
        PrimitiveKind::Int16 => "short",
        PrimitiveKind::UInt16 => "ushort",
        PrimitiveKind::Int32 => "int",
        PrimitiveKind::UInt32 => "uint",
        PrimitiveKind::Int64 => "long",
        PrimitiveKind::UInt64 => "ulong",
        PrimitiveKind::Int128 => "int128",
        PrimitiveKind::UInt128 => "uint128",
        PrimitiveKind::Half => "half",
        PrimitiveKind::Float => "float",
        PrimitiveKind::Double => "double",
        PrimitiveKind::LongDouble => "longdouble",
        PrimitiveKind::IntPtr => "intptr",
        PrimitiveKind::UIntPtr => "uintptr",
        PrimitiveKind::String => "string",
    }
}

impl TypePrinter for CTypePrinter<'_> {
    fn target(&self) -> Target {
        Target::C
    }

    fn index(&self) -> &DeclIndex {
        self.index
    }

    fn primitive(&self, kind: PrimitiveKind, cx: TypeContext) -> Result<String> {
        let spelled = match kind {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "gunichar2",
            PrimitiveKind::WideChar => "wchar_t",
            PrimitiveKind::Char16 => "char16_t",
            PrimitiveKind::Char32 => "char32_t",
            PrimitiveKind::Int8 => "int8_t",
            PrimitiveKind::UInt8 => "uint8_t",
            PrimitiveKind::Int16 => "int16_t",
            PrimitiveKind::UInt16 => "uint16_t",
            PrimitiveKind::Int32 => "int32_t",
            PrimitiveKind::UInt32 => "uint32_t",
            PrimitiveKind::Int64 => "int64_t",
            PrimitiveKind::UInt64 => "uint64_t",
            PrimitiveKind::Int128 => "__int128",
            PrimitiveKind::UInt128 => "unsigned __int128",
            PrimitiveKind::Half => "_Float16",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::LongDouble => "long double",
            PrimitiveKind::IntPtr => "intptr_t",
            PrimitiveKind::UIntPtr => "uintptr_t",
            PrimitiveKind::String => match cx.kind {
                PrintContext::Native => OBJECT_TYPE,
                _ if cx.is_by_ref() => STRING_REF_TYPE,
                _ => "const char*",
            },
        };
        Ok(spelled.to_string())
    }

    fn pointer(&self, pointee: &TypeDesc, is_const: bool, cx: TypeContext) -> Result<String> {
        if let Some(class) = class_pointee(self.index, pointee) {
            if cx.kind == PrintContext::Native {
                return Ok(OBJECT_TYPE.to_string());
            }
            let name = self.entry_name(class);
            return Ok(if is_const {
                format!("const {name}*")
            } else {
                format!("{name}*")
            });
        }
        let inner = self.print(pointee, cx.nested())?;
        Ok(if is_const {
            format!("const {inner}*")
        } else {
            format!("{inner}*")
        })
    }

    fn array(&self, element: &TypeDesc, _size: ArraySize, cx: TypeContext) -> Result<String> {
        if cx.kind == PrintContext::Native {
            return Ok(OBJECT_TYPE.to_string());
        }
        self.array_wrapper_name(element)
    }

    fn decayed(&self, alias: &TypeAlias, cx: TypeContext) -> Result<String> {
        if cx.kind == PrintContext::Native {
            return self.print(&alias.target, cx);
        }
        Ok(self.alias_name(alias))
    }

    fn named(&self, entry: &IndexEntry, cx: TypeContext) -> Result<String> {
        match (&entry.kind, cx.kind) {
            (EntryKind::Class { .. }, PrintContext::Native) => Ok(OBJECT_TYPE.to_string()),
            _ => Ok(self.entry_name(entry)),
        }
    }

    fn param(&self, param: &ParamDecl, kind: PrintContext, with_name: bool) -> Result<String> {
        let cx = TypeContext::param(kind, param.direction);
        let mut ty = self.print(&param.ty, cx)?;
        // By-ref strings already are a pointer (`GString*`).
        let is_string = matches!(
            param.ty.resolve_alias(),
            TypeDesc::Primitive {
                kind: PrimitiveKind::String
            }
        );
        if cx.is_by_ref() && !is_string && kind != PrintContext::Native {
            ty.push('*');
        }
        Ok(if with_name {
            format!("{ty} {}", param.name)
        } else {
            ty
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenError;
    use crate::model::Direction;
    use crate::test_support::sample_index;

    #[test]
    fn primitives_are_total_and_deterministic() {
        let index = sample_index();
        let printer = CTypePrinter::new(&index, NamingStyle::Qualified);
        for kind in PrimitiveKind::ALL {
            for cx in PrintContext::ALL {
                let ty = TypeDesc::primitive(kind);
                let first = printer.print_as(&ty, cx).unwrap();
                assert!(!first.is_empty(), "{kind:?} in {cx} printed empty");
                assert_eq!(first, printer.print_as(&ty, cx).unwrap());
            }
        }
    }

    #[test]
    fn fixed_width_integers_use_stdint_names() {
        let index = sample_index();
        let printer = CTypePrinter::new(&index, NamingStyle::Qualified);
        let spell = |k| printer.print_as(&TypeDesc::primitive(k), PrintContext::Signature).unwrap();
        assert_eq!(spell(PrimitiveKind::Int8), "int8_t");
        assert_eq!(spell(PrimitiveKind::UInt64), "uint64_t");
        assert_eq!(spell(PrimitiveKind::Char), "gunichar2");
        assert_eq!(spell(PrimitiveKind::String), "const char*");
    }

    #[test]
    fn class_pointers_use_wrapper_struct_or_object_handle() {
        let index = sample_index();
        let printer = CTypePrinter::new(&index, NamingStyle::Qualified);
        let point = TypeDesc::class_ref("Structs.Point");
        assert_eq!(
            printer.print_as(&point, PrintContext::Signature).unwrap(),
            "Structs_Point*"
        );
        assert_eq!(printer.print_as(&point, PrintContext::Native).unwrap(), OBJECT_TYPE);

        let flat = CTypePrinter::new(&index, NamingStyle::Flat);
        assert_eq!(flat.print_as(&point, PrintContext::Signature).unwrap(), "Point*");
    }

    #[test]
    fn arrays_become_named_wrappers() {
        let index = sample_index();
        let printer = CTypePrinter::new(&index, NamingStyle::Qualified);
        let ints = TypeDesc::array_of(TypeDesc::primitive(PrimitiveKind::Int32));
        assert_eq!(printer.print_as(&ints, PrintContext::Signature).unwrap(), "IntArray");
        let strings = TypeDesc::array_of(TypeDesc::primitive(PrimitiveKind::String));
        assert_eq!(
            printer.print_as(&strings, PrintContext::Signature).unwrap(),
            "StringArray"
        );
        let points = TypeDesc::array_of(TypeDesc::class_ref("Structs.Point"));
        assert_eq!(
            printer.print_as(&points, PrintContext::Signature).unwrap(),
            "Structs_PointArray"
        );
    }

    #[test]
    fn decayed_types_keep_their_alias_name() {
        let index = sample_index();
        let printer = CTypePrinter::new(&index, NamingStyle::Qualified);
        let decayed = TypeDesc::Decayed {
            alias: TypeAlias {
                namespace: vec!["Structs".into()],
                name: "Samples".into(),
                target: Box::new(TypeDesc::array_of(TypeDesc::primitive(PrimitiveKind::Double))),
            },
        };
        assert_eq!(
            printer.print_as(&decayed, PrintContext::Signature).unwrap(),
            "Structs_Samples"
        );
        assert_eq!(printer.print_as(&decayed, PrintContext::Native).unwrap(), OBJECT_TYPE);
    }

    #[test]
    fn by_ref_params_add_indirection_except_strings() {
        let index = sample_index();
        let printer = CTypePrinter::new(&index, NamingStyle::Qualified);
        let param = |ty, direction| ParamDecl {
            name: "value".into(),
            ty,
            direction,
            implicit: false,
        };
        let out_int = param(TypeDesc::primitive(PrimitiveKind::Int32), Direction::Out);
        assert_eq!(
            printer.param(&out_int, PrintContext::Signature, true).unwrap(),
            "int32_t* value"
        );
        let ref_str = param(TypeDesc::primitive(PrimitiveKind::String), Direction::InOut);
        assert_eq!(
            printer.param(&ref_str, PrintContext::Signature, true).unwrap(),
            "GString* value"
        );
        let in_str = param(TypeDesc::primitive(PrimitiveKind::String), Direction::In);
        assert_eq!(
            printer.param(&in_str, PrintContext::Signature, false).unwrap(),
            "const char*"
        );
    }

    #[test]
    fn unsupported_managed_type_fails_fast() {
        let index = sample_index();
        let printer = CTypePrinter::new(&index, NamingStyle::Qualified);
        let err = printer
            .print_as(
                &TypeDesc::Unsupported {
                    origin: "System.Decimal".into(),
                },
                PrintContext::Native,
            )
            .unwrap_err();
        let GenError::UnsupportedType { ty, target, .. } = &err else {
            panic!("{err}");
        };
        assert_eq!((ty.as_str(), *target), ("System.Decimal", Target::C));
    }
}

//! Java type printer, following JNA marshaling conventions.

use crate::config::Target;
use crate::error::Result;
use crate::ident::{JAVA_RUNTIME_PACKAGE, java_qualified_name};
use crate::model::{
    ArraySize, DeclIndex, Direction, EntryKind, IndexEntry, ParamDecl, PrimitiveKind, TypeAlias,
    TypeDesc,
};

use super::{PrintContext, TypeContext, TypePrinter, class_pointee, enum_underlying};

/// Java spelling of a native pointer / object handle.
pub const POINTER_TYPE: &str = "com.sun.jna.Pointer";

pub struct JavaTypePrinter<'a> {
    index: &'a DeclIndex,
}

impl<'a> JavaTypePrinter<'a> {
    pub fn new(index: &'a DeclIndex) -> Self {
        Self { index }
    }

    /// JNA by-reference holder used at the native boundary for `out` and
    /// `in-out` parameters of type `ty`.
    pub fn by_reference(&self, ty: &TypeDesc) -> Result<String> {
        let cx = TypeContext::new(PrintContext::Native);
        let holder = match ty.resolve_alias() {
            TypeDesc::Primitive { kind } => match kind {
                PrimitiveKind::Bool | PrimitiveKind::Int8 | PrimitiveKind::UInt8 => {
                    "ByteByReference"
                }
                PrimitiveKind::Char | PrimitiveKind::Int16 | PrimitiveKind::UInt16 => {
                    "ShortByReference"
                }
                PrimitiveKind::Int32 | PrimitiveKind::UInt32 => "IntByReference",
                PrimitiveKind::Int64 | PrimitiveKind::UInt64 => "LongByReference",
                PrimitiveKind::Float => "FloatByReference",
                PrimitiveKind::Double => "DoubleByReference",
                PrimitiveKind::IntPtr | PrimitiveKind::UIntPtr => "PointerByReference",
                // Strings travel as a runtime-owned `GString*`.
                PrimitiveKind::String => return Ok(POINTER_TYPE.to_string()),
                _ => return Err(self.unsupported(&ty.describe(), cx)),
            },
            TypeDesc::Named { name } => {
                let entry = self.resolve(name)?;
                match enum_underlying(entry) {
                    Some(underlying) => {
                        return self.by_reference(&TypeDesc::primitive(underlying));
                    }
                    None => "PointerByReference",
                }
            }
            TypeDesc::Pointer { .. } | TypeDesc::Array { .. } => "PointerByReference",
            TypeDesc::Unsupported { origin } => return Err(self.unsupported(origin, cx)),
            TypeDesc::Decayed { alias } => return self.by_reference(&alias.target),
        };
        Ok(format!("com.sun.jna.ptr.{holder}"))
    }
}

impl TypePrinter for JavaTypePrinter<'_> {
    fn target(&self) -> Target {
        Target::Java
    }

    fn index(&self) -> &DeclIndex {
        self.index
    }

    fn primitive(&self, kind: PrimitiveKind, cx: TypeContext) -> Result<String> {
        let boxed = cx.kind == PrintContext::Boxed;
        let pick = |unboxed: &str, boxed_name: &str| {
            (if boxed { boxed_name } else { unboxed }).to_string()
        };
        // https://java-native-access.github.io/jna/latest/javadoc/overview-summary.html#marshalling
        let spelled = match kind {
            PrimitiveKind::Void => pick("void", "Void"),
            PrimitiveKind::Bool => pick("boolean", "Boolean"),
            PrimitiveKind::Char => pick("char", "Character"),
            PrimitiveKind::WideChar | PrimitiveKind::Char16 | PrimitiveKind::Char32 => {
                "com.sun.jna.WString".to_string()
            }
            PrimitiveKind::Int8 => pick("byte", "Byte"),
            PrimitiveKind::UInt8 => "UnsignedByte".to_string(),
            PrimitiveKind::Int16 => pick("short", "Short"),
            PrimitiveKind::UInt16 => "UnsignedShort".to_string(),
            PrimitiveKind::Int32 => pick("int", "Integer"),
            PrimitiveKind::UInt32 => "UnsignedInt".to_string(),
            PrimitiveKind::Int64 => pick("long", "Long"),
            PrimitiveKind::UInt64 => "UnsignedLong".to_string(),
            PrimitiveKind::Float => pick("float", "Float"),
            PrimitiveKind::Double => pick("double", "Double"),
            PrimitiveKind::IntPtr | PrimitiveKind::UIntPtr => POINTER_TYPE.to_string(),
            PrimitiveKind::String => "String".to_string(),
            PrimitiveKind::Int128
            | PrimitiveKind::UInt128
            | PrimitiveKind::Half
            | PrimitiveKind::LongDouble => {
                return Err(self.unsupported(&format!("{kind:?}"), cx));
            }
        };
        Ok(spelled)
    }

    fn pointer(&self, pointee: &TypeDesc, _is_const: bool, cx: TypeContext) -> Result<String> {
        if class_pointee(self.index, pointee).is_some() && cx.kind == PrintContext::Native {
            return Ok(POINTER_TYPE.to_string());
        }
        self.print(pointee, cx.nested())
    }

    fn array(&self, element: &TypeDesc, _size: ArraySize, cx: TypeContext) -> Result<String> {
        if cx.kind == PrintContext::Native {
            return Ok(POINTER_TYPE.to_string());
        }
        // Java arrays are already reference types; elements never box.
        let element = self.print(element, cx.nested().with_kind(PrintContext::Signature))?;
        Ok(format!("{element}[]"))
    }

    fn decayed(&self, alias: &TypeAlias, cx: TypeContext) -> Result<String> {
        // No typedefs on the Java surface: spell what the alias stands for.
        self.print(&alias.target, cx)
    }

    fn named(&self, entry: &IndexEntry, cx: TypeContext) -> Result<String> {
        match (&entry.kind, cx.kind) {
            (EntryKind::Enum { underlying }, PrintContext::Native) => {
                self.primitive(*underlying, cx)
            }
            (EntryKind::Class { .. }, PrintContext::Native) => Ok(POINTER_TYPE.to_string()),
            _ => Ok(java_qualified_name(entry)),
        }
    }

    fn param(&self, param: &ParamDecl, kind: PrintContext, with_name: bool) -> Result<String> {
        let ty = if param.direction.is_by_ref() {
            if kind == PrintContext::Native {
                self.by_reference(&param.ty)?
            } else {
                let inner = self.print(&param.ty, TypeContext::new(PrintContext::Boxed))?;
                let wrapper = match param.direction {
                    Direction::InOut => "Ref",
                    _ => "Out",
                };
                format!("{JAVA_RUNTIME_PACKAGE}.{wrapper}<{inner}>")
            }
        } else {
            self.print(&param.ty, TypeContext::param(kind, param.direction))?
        };
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
    use crate::test_support::sample_index;

    #[test]
    fn primitives_are_total_and_deterministic() {
        let index = sample_index();
        let printer = JavaTypePrinter::new(&index);
        let unsupported = [
            PrimitiveKind::Int128,
            PrimitiveKind::UInt128,
            PrimitiveKind::Half,
            PrimitiveKind::LongDouble,
        ];
        for kind in PrimitiveKind::ALL {
            for cx in PrintContext::ALL {
                let first = printer.print_as(&TypeDesc::primitive(kind), cx);
                let second = printer.print_as(&TypeDesc::primitive(kind), cx);
                if unsupported.contains(&kind) {
                    assert!(
                        matches!(first, Err(GenError::UnsupportedType { .. })),
                        "{kind:?} in {cx} should fail, got {first:?}"
                    );
                } else {
                    let first = first.unwrap();
                    assert!(!first.is_empty(), "{kind:?} in {cx} printed empty");
                    assert_eq!(first, second.unwrap());
                }
            }
        }
    }

    #[test]
    fn boxed_context_uses_reference_types() {
        let index = sample_index();
        let printer = JavaTypePrinter::new(&index);
        let int = TypeDesc::primitive(PrimitiveKind::Int32);
        assert_eq!(printer.print_as(&int, PrintContext::Signature).unwrap(), "int");
        assert_eq!(printer.print_as(&int, PrintContext::Boxed).unwrap(), "Integer");
        let b = TypeDesc::primitive(PrimitiveKind::Bool);
        assert_eq!(printer.print_as(&b, PrintContext::Boxed).unwrap(), "Boolean");
    }

    #[test]
    fn class_pointer_collapses_to_handle_only_in_native_context() {
        let index = sample_index();
        let printer = JavaTypePrinter::new(&index);
        let point = TypeDesc::class_ref("Structs.Point");
        assert_eq!(
            printer.print_as(&point, PrintContext::Signature).unwrap(),
            "managed.structs.Point"
        );
        assert_eq!(printer.print_as(&point, PrintContext::Native).unwrap(), POINTER_TYPE);
    }

    #[test]
    fn enums_cross_the_boundary_as_their_backing_type() {
        let index = sample_index();
        let printer = JavaTypePrinter::new(&index);
        let color = TypeDesc::named("Structs.Color");
        assert_eq!(
            printer.print_as(&color, PrintContext::Signature).unwrap(),
            "managed.structs.Color"
        );
        assert_eq!(printer.print_as(&color, PrintContext::Native).unwrap(), "int");
    }

    #[test]
    fn arrays_print_with_brackets() {
        let index = sample_index();
        let printer = JavaTypePrinter::new(&index);
        let ints = TypeDesc::array_of(TypeDesc::primitive(PrimitiveKind::Int32));
        assert_eq!(printer.print_as(&ints, PrintContext::Signature).unwrap(), "int[]");
        assert_eq!(printer.print_as(&ints, PrintContext::Boxed).unwrap(), "int[]");
        assert_eq!(printer.print_as(&ints, PrintContext::Native).unwrap(), POINTER_TYPE);
    }

    #[test]
    fn out_and_ref_params_wrap_boxed_types() {
        let index = sample_index();
        let printer = JavaTypePrinter::new(&index);
        let out = ParamDecl {
            name: "count".into(),
            ty: TypeDesc::primitive(PrimitiveKind::Int32),
            direction: Direction::Out,
            implicit: false,
        };
        let inout = ParamDecl {
            direction: Direction::InOut,
            ..out.clone()
        };
        assert_eq!(
            printer.param(&out, PrintContext::Signature, true).unwrap(),
            "bnd.embed.Out<Integer> count"
        );
        assert_eq!(
            printer.param(&inout, PrintContext::Signature, false).unwrap(),
            "bnd.embed.Ref<Integer>"
        );
        assert_eq!(
            printer.param(&out, PrintContext::Native, true).unwrap(),
            "com.sun.jna.ptr.IntByReference count"
        );
    }

    #[test]
    fn unsupported_managed_type_fails_fast() {
        let index = sample_index();
        let printer = JavaTypePrinter::new(&index);
        let decimal = TypeDesc::Unsupported {
            origin: "System.Decimal".into(),
        };
        let err = printer.print_as(&decimal, PrintContext::Native).unwrap_err();
        assert!(err.to_string().contains("System.Decimal"), "{err}");
    }

    #[test]
    fn unknown_named_type_is_reported() {
        let index = sample_index();
        let printer = JavaTypePrinter::new(&index);
        let err = printer
            .print_as(&TypeDesc::named("Nowhere.Thing"), PrintContext::Signature)
            .unwrap_err();
        assert!(matches!(err, GenError::UnknownType { .. }), "{err}");
    }
}

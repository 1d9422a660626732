//! Marshaling for the Java surface: Java values to JNA native arguments.

use crate::error::Result;
use crate::ident::{JAVA_RUNTIME_PACKAGE, gen_id, java_qualified_name};
use crate::model::{Direction, EntryKind, IndexEntry, PrimitiveKind, TypeDesc};
use crate::printer::{JavaTypePrinter, PrintContext, TypeContext, TypePrinter, class_pointee};

use super::{MarshalContext, Marshaller};

pub struct JavaMarshaller<'a> {
    printer: &'a JavaTypePrinter<'a>,
}

#[derive(Clone, Copy)]
enum Shape<'t> {
    Value(PrimitiveKind),
    Str,
    Enum(&'t IndexEntry, PrimitiveKind),
    Object(&'t IndexEntry),
    Array(&'t TypeDesc),
    RawPointer,
}

/// `bnd.embed.Runtime` copies only signed numeric primitive arrays.
fn has_array_conversion(element: &TypeDesc) -> bool {
    matches!(
        element.resolve_alias(),
        TypeDesc::Primitive {
            kind: PrimitiveKind::Int8
                | PrimitiveKind::Int16
                | PrimitiveKind::Int32
                | PrimitiveKind::Int64
                | PrimitiveKind::Float
                | PrimitiveKind::Double
        }
    )
}

/// Holder value for a primitive, given the boxed Java value `v`.
fn primitive_to_holder(kind: PrimitiveKind, v: &str) -> String {
    match kind {
        PrimitiveKind::Bool => format!("(byte) ({v} ? 1 : 0)"),
        PrimitiveKind::Char => format!("(short) {v}.charValue()"),
        PrimitiveKind::UInt8 => format!("{v}.byteValue()"),
        PrimitiveKind::UInt16 => format!("{v}.shortValue()"),
        PrimitiveKind::UInt32 => format!("{v}.intValue()"),
        PrimitiveKind::UInt64 => format!("{v}.longValue()"),
        _ => v.to_string(),
    }
}

/// Java value for a primitive read back from its holder value `x`.
fn primitive_from_holder(kind: PrimitiveKind, x: &str) -> String {
    match kind {
        PrimitiveKind::Bool => format!("{x} != 0"),
        PrimitiveKind::Char => format!("(char) {x}"),
        PrimitiveKind::UInt8 => format!("new UnsignedByte(Byte.toUnsignedLong({x}))"),
        PrimitiveKind::UInt16 => format!("new UnsignedShort(Short.toUnsignedLong({x}))"),
        PrimitiveKind::UInt32 => format!("new UnsignedInt(Integer.toUnsignedLong({x}))"),
        PrimitiveKind::UInt64 => format!("new UnsignedLong({x})"),
        _ => x.to_string(),
    }
}

impl<'a> JavaMarshaller<'a> {
    pub fn new(printer: &'a JavaTypePrinter<'a>) -> Self {
        Self { printer }
    }

    fn shape<'t>(&'t self, ty: &'t TypeDesc) -> Result<Shape<'t>> {
        let index = self.printer.index();
        Ok(match ty.resolve_alias() {
            TypeDesc::Primitive {
                kind: PrimitiveKind::String,
            } => Shape::Str,
            TypeDesc::Primitive { kind } => Shape::Value(*kind),
            TypeDesc::Pointer { pointee, .. } => match class_pointee(index, pointee) {
                Some(class) => Shape::Object(class),
                None => Shape::RawPointer,
            },
            TypeDesc::Array { element, .. } => Shape::Array(element),
            TypeDesc::Named { name } => {
                let entry = self.printer.resolve(name)?;
                match entry.kind {
                    EntryKind::Enum { underlying } => Shape::Enum(entry, underlying),
                    EntryKind::Class { .. } => Shape::Object(entry),
                }
            }
            TypeDesc::Decayed { .. } | TypeDesc::Unsupported { .. } => {
                return Err(self
                    .printer
                    .unsupported(&ty.describe(), TypeContext::new(PrintContext::Native)));
            }
        })
    }

    fn object_to_native(class: &IndexEntry, v: &str) -> String {
        if class.is_interface() {
            format!("{JAVA_RUNTIME_PACKAGE}.Runtime.handle({v})")
        } else {
            format!("{v} != null ? {v}.{} : null", gen_id("object"))
        }
    }

    fn object_from_native(class: &IndexEntry, x: &str) -> String {
        let name = java_qualified_name(class);
        if class.is_interface() {
            format!("{JAVA_RUNTIME_PACKAGE}.Runtime.wrap({x}, {name}.class)")
        } else {
            format!("{x} != null ? new {name}({x}) : null")
        }
    }

    fn array_from_native(&self, ty: &TypeDesc, x: &str) -> Result<String> {
        let spelled = self.printer.print_as(ty, PrintContext::Signature)?;
        Ok(format!(
            "{JAVA_RUNTIME_PACKAGE}.Runtime.fromArray({x}, {spelled}.class)"
        ))
    }

    /// Holder value for the boxed Java value `v`. Empty when the type has
    /// no holder conversion.
    fn to_holder(&self, shape: &Shape<'_>, v: &str) -> String {
        match shape {
            Shape::Value(kind) => primitive_to_holder(*kind, v),
            Shape::Enum(_, underlying) => {
                primitive_to_holder(*underlying, &format!("{v}.getValue()"))
            }
            Shape::Object(class) => Self::object_to_native(class, v),
            Shape::Array(_) => format!("{JAVA_RUNTIME_PACKAGE}.Runtime.toArray({v})"),
            Shape::Str | Shape::RawPointer => String::new(),
        }
    }

    fn from_holder(&self, shape: &Shape<'_>, ty: &TypeDesc, x: &str) -> Result<String> {
        Ok(match shape {
            Shape::Value(kind) => primitive_from_holder(*kind, x),
            Shape::Enum(entry, underlying) => format!(
                "{}.fromOrdinal({})",
                java_qualified_name(entry),
                primitive_from_holder(*underlying, x)
            ),
            Shape::Object(class) => Self::object_from_native(class, x),
            Shape::Array(_) => self.array_from_native(ty.resolve_alias(), x)?,
            Shape::Str | Shape::RawPointer => String::new(),
        })
    }

    fn marshal_by_ref(
        &self,
        cx: &mut MarshalContext,
        ty: &TypeDesc,
        shape: Shape<'_>,
    ) -> Result<()> {
        let name = cx.arg_name.clone();
        let holder = gen_id(&format!("ref{}", cx.index));

        if let Shape::Str = shape {
            let initial = match cx.direction {
                Direction::InOut => format!("{name}.get()"),
                _ => "null".to_string(),
            };
            cx.before(format!(
                "com.sun.jna.Pointer {holder} = {JAVA_RUNTIME_PACKAGE}.Runtime.newStringRef({initial});"
            ));
            cx.arg = holder.clone();
            cx.after(format!(
                "{name}.set({JAVA_RUNTIME_PACKAGE}.Runtime.readStringRef({holder}));"
            ));
            return Ok(());
        }

        let read_back = self.from_holder(&shape, ty, &format!("{holder}.getValue()"))?;
        if read_back.is_empty() {
            return Ok(());
        }
        cx.before(format!("{} {holder} = new {}();", cx.native_type, cx.native_type));
        if cx.direction == Direction::InOut {
            let value = self.to_holder(&shape, &format!("{name}.get()"));
            cx.before(format!("{holder}.setValue({value});"));
        }
        cx.arg = holder;
        cx.after(format!("{name}.set({read_back});"));
        Ok(())
    }
}

impl Marshaller for JavaMarshaller<'_> {
    fn marshal_param(&self, cx: &mut MarshalContext, ty: &TypeDesc) -> Result<()> {
        cx.native_type = if cx.direction.is_by_ref() {
            self.printer.by_reference(ty)?
        } else {
            self.printer.print_as(ty, PrintContext::Native)?
        };
        let shape = self.shape(ty)?;
        if let Shape::Array(element) = shape {
            if !has_array_conversion(element) {
                return Ok(());
            }
        }
        if cx.direction.is_by_ref() {
            return self.marshal_by_ref(cx, ty, shape);
        }

        let name = cx.arg_name.clone();
        cx.arg = match shape {
            Shape::Value(_) | Shape::Str | Shape::RawPointer => name,
            Shape::Enum(..) => format!("{name}.getValue()"),
            Shape::Object(class) => Self::object_to_native(class, &name),
            Shape::Array(_) => format!("{JAVA_RUNTIME_PACKAGE}.Runtime.toArray({name})"),
        };
        Ok(())
    }

    fn marshal_return(&self, cx: &mut MarshalContext, ty: &TypeDesc) -> Result<()> {
        cx.native_type = self.printer.print_as(ty, PrintContext::Native)?;
        let result = cx.arg_name.clone();
        cx.arg = match self.shape(ty)? {
            Shape::Value(_) | Shape::Str | Shape::RawPointer => result,
            Shape::Enum(entry, _) => {
                format!("{}.fromOrdinal({result})", java_qualified_name(entry))
            }
            Shape::Object(class) => Self::object_from_native(class, &result),
            Shape::Array(element) if !has_array_conversion(element) => String::new(),
            Shape::Array(_) => self.array_from_native(ty.resolve_alias(), &result)?,
        };
        Ok(())
    }

    fn result_name(&self) -> &'static str {
        "__ret"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{param, sample_index};

    fn marshal(ty: TypeDesc, direction: Direction) -> MarshalContext {
        let index = sample_index();
        let printer = JavaTypePrinter::new(&index);
        let m = JavaMarshaller::new(&printer);
        let p = param("value", ty, direction);
        let mut cx = MarshalContext::for_param(&p, 0);
        m.marshal_param(&mut cx, &p.ty).unwrap();
        cx
    }

    fn ret(ty: TypeDesc) -> String {
        let index = sample_index();
        let printer = JavaTypePrinter::new(&index);
        let m = JavaMarshaller::new(&printer);
        let mut cx = MarshalContext::for_return(m.result_name());
        m.marshal_return(&mut cx, &ty).unwrap();
        cx.arg
    }

    #[test]
    fn in_params_pass_native_views() {
        assert_eq!(
            marshal(TypeDesc::primitive(PrimitiveKind::Int32), Direction::In).arg,
            "value"
        );
        assert_eq!(
            marshal(TypeDesc::named("Structs.Color"), Direction::In).arg,
            "value.getValue()"
        );
        let point = marshal(TypeDesc::class_ref("Structs.Point"), Direction::In);
        assert_eq!(point.arg, "value != null ? value.__object : null");
        assert_eq!(point.native_type, "com.sun.jna.Pointer");
    }

    #[test]
    fn out_params_go_through_jna_holders() {
        let cx = marshal(TypeDesc::primitive(PrimitiveKind::Int32), Direction::Out);
        assert_eq!(
            cx.before,
            ["com.sun.jna.ptr.IntByReference __ref0 = new com.sun.jna.ptr.IntByReference();"]
        );
        assert_eq!(cx.arg, "__ref0");
        assert_eq!(cx.after, ["value.set(__ref0.getValue());"]);
    }

    #[test]
    fn in_out_bool_converts_through_byte() {
        let cx = marshal(TypeDesc::primitive(PrimitiveKind::Bool), Direction::InOut);
        assert_eq!(cx.before[1], "__ref0.setValue((byte) (value.get() ? 1 : 0));");
        assert_eq!(cx.after, ["value.set(__ref0.getValue() != 0);"]);
    }

    #[test]
    fn out_objects_and_enums_are_rewrapped() {
        let point = marshal(TypeDesc::class_ref("Structs.Point"), Direction::Out);
        assert_eq!(
            point.after,
            ["value.set(__ref0.getValue() != null ? new managed.structs.Point(__ref0.getValue()) : null);"]
        );
        let color = marshal(TypeDesc::named("Structs.Color"), Direction::InOut);
        assert_eq!(color.before[1], "__ref0.setValue(value.get().getValue());");
        assert_eq!(
            color.after,
            ["value.set(managed.structs.Color.fromOrdinal(__ref0.getValue()));"]
        );
    }

    #[test]
    fn returns_convert_back_to_java_types() {
        assert_eq!(ret(TypeDesc::primitive(PrimitiveKind::Double)), "__ret");
        assert_eq!(
            ret(TypeDesc::class_ref("Structs.Point")),
            "__ret != null ? new managed.structs.Point(__ret) : null"
        );
        assert_eq!(
            ret(TypeDesc::named("Structs.Color")),
            "managed.structs.Color.fromOrdinal(__ret)"
        );
        assert_eq!(
            ret(TypeDesc::array_of(TypeDesc::primitive(PrimitiveKind::Int32))),
            "bnd.embed.Runtime.fromArray(__ret, int[].class)"
        );
        let nested = TypeDesc::array_of(TypeDesc::array_of(TypeDesc::primitive(
            PrimitiveKind::Int32,
        )));
        assert!(ret(nested).is_empty());
    }

    #[test]
    fn arrays_without_a_runtime_copy_have_no_marshaling() {
        let strings = TypeDesc::array_of(TypeDesc::primitive(PrimitiveKind::String));
        assert!(ret(strings.clone()).is_empty());
        assert!(marshal(strings, Direction::In).arg.is_empty());
        for element in [
            TypeDesc::class_ref("Structs.Point"),
            TypeDesc::named("Structs.Color"),
            TypeDesc::primitive(PrimitiveKind::UInt32),
            TypeDesc::primitive(PrimitiveKind::Bool),
            TypeDesc::primitive(PrimitiveKind::Char),
        ] {
            let array = TypeDesc::array_of(element);
            assert!(marshal(array.clone(), Direction::In).arg.is_empty(), "{array:?}");
            assert!(ret(array).is_empty());
        }
        let doubles = TypeDesc::array_of(TypeDesc::primitive(PrimitiveKind::Double));
        assert_eq!(
            marshal(doubles, Direction::In).arg,
            "bnd.embed.Runtime.toArray(value)"
        );
    }
}

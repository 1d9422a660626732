//! Marshaling for the C surface: C values to runtime invoke arguments.
//!
//! The runtime's invoke takes a `void*` per argument: value types are passed
//! by address, managed objects (strings, arrays, class instances) as
//! `bnd_embed_object*`. Results come back as one boxed object, `__result`.

use crate::error::Result;
use crate::ident::gen_id;
use crate::model::{DeclIndex, Direction, IndexEntry, PrimitiveKind, TypeDesc};
use crate::printer::{CTypePrinter, PrintContext, TypePrinter, class_pointee};

use super::{MarshalContext, Marshaller};

/// Field path from a wrapper struct to its handle, e.g. `__base.__object`
/// for a class one level below the root.
pub fn handle_path(index: &DeclIndex, class: &IndexEntry) -> String {
    let depth = index.handle_depth(&class.qualified_name());
    format!("{}{}", "__base.".repeat(depth), gen_id("object"))
}

pub struct CMarshaller<'a> {
    printer: &'a CTypePrinter<'a>,
}

/// How a type crosses the boundary.
#[derive(Clone, Copy)]
enum Shape<'t> {
    Value,
    Str,
    Object(&'t IndexEntry),
    Array(&'t TypeDesc),
    RawPointer,
}

impl<'a> CMarshaller<'a> {
    pub fn new(printer: &'a CTypePrinter<'a>) -> Self {
        Self { printer }
    }

    fn shape<'t>(&'t self, ty: &'t TypeDesc) -> Result<Shape<'t>> {
        let index = self.printer.index();
        Ok(match ty.resolve_alias() {
            TypeDesc::Primitive {
                kind: PrimitiveKind::String,
            } => Shape::Str,
            TypeDesc::Primitive { .. } => Shape::Value,
            TypeDesc::Pointer { pointee, .. } => match class_pointee(index, pointee) {
                Some(class) => Shape::Object(class),
                None => Shape::RawPointer,
            },
            TypeDesc::Array { element, .. } => Shape::Array(element),
            TypeDesc::Named { name } => {
                let entry = self.printer.resolve(name)?;
                if entry.is_class() {
                    Shape::Object(entry)
                } else {
                    Shape::Value
                }
            }
            TypeDesc::Decayed { .. } | TypeDesc::Unsupported { .. } => {
                return Err(self.printer.unsupported(
                    &ty.describe(),
                    crate::printer::TypeContext::new(PrintContext::Native),
                ));
            }
        })
    }

    /// Runtime name of an array's element type.
    fn element_managed_name(&self, element: &TypeDesc) -> Result<String> {
        Ok(match element.resolve_alias() {
            TypeDesc::Primitive { kind } => kind.managed_name().to_string(),
            TypeDesc::Pointer { pointee, .. } => return self.element_managed_name(pointee),
            TypeDesc::Named { name } => self.printer.resolve(name)?.qualified_name(),
            other => other.describe(),
        })
    }

    fn wrapper_name(&self, class: &IndexEntry) -> String {
        self.printer.entry_name(class)
    }

    fn handle_path(&self, class: &IndexEntry) -> String {
        handle_path(self.printer.index(), class)
    }

    /// Lines wrapping the object in `object` into a freshly allocated wrapper
    /// stored through `target`.
    fn wrap_object(&self, class: &IndexEntry, object: &str, target: &str) -> Vec<String> {
        let wrapper = self.wrapper_name(class);
        let path = self.handle_path(class);
        vec![
            format!("if ({object}) {{"),
            format!("    {target} = ({wrapper}*) calloc(1, sizeof({wrapper}));"),
            format!("    ({target})->{path} = bnd_embed_gchandle_new({object}, false);"),
            "} else {".to_string(),
            format!("    {target} = 0;"),
            "}".to_string(),
        ]
    }
}

fn is_nested_array(element: &TypeDesc) -> bool {
    matches!(element.resolve_alias(), TypeDesc::Array { .. })
}

impl Marshaller for CMarshaller<'_> {
    fn marshal_param(&self, cx: &mut MarshalContext, ty: &TypeDesc) -> Result<()> {
        cx.native_type = self.printer.print_as(ty, PrintContext::Native)?;
        let name = cx.arg_name.clone();
        let tmp = gen_id(&format!("arg{}", cx.index));
        let by_ref = cx.direction.is_by_ref();

        match self.shape(ty)? {
            Shape::Value | Shape::RawPointer => {
                // By-ref values arrive as a pointer already.
                cx.arg = if by_ref { name } else { format!("&{name}") };
            }
            Shape::Str => {
                let init = match cx.direction {
                    Direction::In => format!("bnd_embed_string_new({name})"),
                    Direction::InOut => format!("bnd_embed_string_new({name}->str)"),
                    Direction::Out => "0".to_string(),
                };
                cx.before(format!("bnd_embed_object* {tmp} = {init};"));
                if by_ref {
                    cx.arg = format!("&{tmp}");
                    cx.after(format!(
                        "g_string_assign({name}, bnd_embed_string_to_utf8({tmp}));"
                    ));
                } else {
                    cx.arg = tmp;
                }
            }
            Shape::Object(class) => {
                let path = self.handle_path(class);
                let init = match cx.direction {
                    Direction::In => {
                        format!("{name} ? bnd_embed_gchandle_target({name}->{path}) : 0")
                    }
                    Direction::InOut => {
                        format!("*{name} ? bnd_embed_gchandle_target((*{name})->{path}) : 0")
                    }
                    Direction::Out => "0".to_string(),
                };
                cx.before(format!("bnd_embed_object* {tmp} = {init};"));
                if by_ref {
                    cx.arg = format!("&{tmp}");
                    for line in self.wrap_object(class, &tmp, &format!("*{name}")) {
                        cx.after(line);
                    }
                } else {
                    cx.arg = tmp;
                }
            }
            Shape::Array(element) => {
                if is_nested_array(element) {
                    return Ok(());
                }
                let managed = self.element_managed_name(element)?;
                let init = match cx.direction {
                    Direction::In => {
                        format!("bnd_embed_array_from_garray({name}.array, \"{managed}\")")
                    }
                    Direction::InOut => {
                        format!("bnd_embed_array_from_garray({name}->array, \"{managed}\")")
                    }
                    Direction::Out => "0".to_string(),
                };
                cx.before(format!("bnd_embed_object* {tmp} = {init};"));
                if by_ref {
                    let element_type = self.printer.print_as(element, PrintContext::Signature)?;
                    cx.arg = format!("&{tmp}");
                    cx.after(format!(
                        "{name}->array = bnd_embed_array_to_garray({tmp}, sizeof({element_type}));"
                    ));
                } else {
                    cx.arg = tmp;
                }
            }
        }
        Ok(())
    }

    fn marshal_return(&self, cx: &mut MarshalContext, ty: &TypeDesc) -> Result<()> {
        cx.native_type = self.printer.print_as(ty, PrintContext::Native)?;
        let result = cx.arg_name.clone();
        match self.shape(ty)? {
            Shape::Value | Shape::RawPointer => {
                let spelled = self.printer.print_as(ty, PrintContext::Signature)?;
                cx.arg = format!("*({spelled}*) bnd_embed_unbox({result})");
            }
            Shape::Str => cx.arg = format!("bnd_embed_string_to_utf8({result})"),
            Shape::Object(class) => {
                let ret = gen_id("ret");
                cx.before(format!("{}* {ret} = 0;", self.wrapper_name(class)));
                for line in self.wrap_object(class, &result, &ret) {
                    cx.before(line);
                }
                cx.arg = ret;
            }
            Shape::Array(element) => {
                if is_nested_array(element) {
                    return Ok(());
                }
                let wrapper = self.printer.print_as(ty, PrintContext::Signature)?;
                let element_type = self.printer.print_as(element, PrintContext::Signature)?;
                cx.arg = format!(
                    "({wrapper}) {{ bnd_embed_array_to_garray({result}, sizeof({element_type})) }}"
                );
            }
        }
        Ok(())
    }

    fn result_name(&self) -> &'static str {
        "__result"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingStyle;
    use crate::test_support::{param, sample_index};

    fn marshal(ty: TypeDesc, direction: Direction) -> MarshalContext {
        let index = sample_index();
        let printer = CTypePrinter::new(&index, NamingStyle::Qualified);
        let m = CMarshaller::new(&printer);
        let p = param("value", ty, direction);
        let mut cx = MarshalContext::for_param(&p, 2);
        m.marshal_param(&mut cx, &p.ty).unwrap();
        cx
    }

    #[test]
    fn value_types_pass_by_address_unless_already_by_ref() {
        let int = || TypeDesc::primitive(PrimitiveKind::Int32);
        assert_eq!(marshal(int(), Direction::In).arg, "&value");
        let out = marshal(int(), Direction::Out);
        assert_eq!(out.arg, "value");
        assert!(out.before.is_empty() && out.after.is_empty());
        assert_eq!(marshal(TypeDesc::named("Structs.Color"), Direction::In).arg, "&value");
    }

    #[test]
    fn strings_are_converted_both_ways_when_by_ref() {
        let cx = marshal(TypeDesc::primitive(PrimitiveKind::String), Direction::InOut);
        assert_eq!(cx.before, ["bnd_embed_object* __arg2 = bnd_embed_string_new(value->str);"]);
        assert_eq!(cx.arg, "&__arg2");
        assert_eq!(
            cx.after,
            ["g_string_assign(value, bnd_embed_string_to_utf8(__arg2));"]
        );
    }

    #[test]
    fn objects_pass_their_handle_target() {
        let cx = marshal(TypeDesc::class_ref("Structs.Point"), Direction::In);
        assert_eq!(
            cx.before,
            ["bnd_embed_object* __arg2 = value ? bnd_embed_gchandle_target(value->__object) : 0;"]
        );
        assert_eq!(cx.arg, "__arg2");
        assert_eq!(cx.native_type, "bnd_embed_object*");
    }

    #[test]
    fn out_objects_are_wrapped_after_the_call() {
        let cx = marshal(TypeDesc::class_ref("Structs.Point"), Direction::Out);
        assert_eq!(cx.arg, "&__arg2");
        assert_eq!(cx.after[0], "if (__arg2) {");
        assert!(
            cx.after[1].contains("calloc(1, sizeof(Structs_Point))"),
            "{:?}",
            cx.after
        );
    }

    #[test]
    fn returns_unbox_values_and_wrap_objects() {
        let index = sample_index();
        let printer = CTypePrinter::new(&index, NamingStyle::Qualified);
        let m = CMarshaller::new(&printer);

        let mut cx = MarshalContext::for_return(m.result_name());
        m.marshal_return(&mut cx, &TypeDesc::primitive(PrimitiveKind::Float))
            .unwrap();
        assert_eq!(cx.arg, "*(float*) bnd_embed_unbox(__result)");

        let mut cx = MarshalContext::for_return(m.result_name());
        m.marshal_return(&mut cx, &TypeDesc::class_ref("Structs.Point"))
            .unwrap();
        assert_eq!(cx.before[0], "Structs_Point* __ret = 0;");
        assert_eq!(cx.arg, "__ret");

        let mut cx = MarshalContext::for_return(m.result_name());
        let ints = TypeDesc::array_of(TypeDesc::primitive(PrimitiveKind::Int32));
        m.marshal_return(&mut cx, &ints).unwrap();
        assert_eq!(
            cx.arg,
            "(IntArray) { bnd_embed_array_to_garray(__result, sizeof(int32_t)) }"
        );
    }

    #[test]
    fn nested_arrays_produce_no_expression() {
        let nested = TypeDesc::array_of(TypeDesc::array_of(TypeDesc::primitive(
            PrimitiveKind::Int32,
        )));
        assert!(marshal(nested, Direction::In).arg.is_empty());
    }
}

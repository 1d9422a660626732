//! Shared in-memory fixtures for unit tests.

use crate::model::*;

pub fn method(name: &str, return_type: TypeDesc, parameters: Vec<ParamDecl>) -> MethodDecl {
    MethodDecl {
        meta: DeclMeta::new(name),
        kind: MethodKind::Normal,
        is_static: false,
        is_pure: false,
        is_final: false,
        is_override: false,
        return_type,
        parameters,
    }
}

pub fn param(name: &str, ty: TypeDesc, direction: Direction) -> ParamDecl {
    ParamDecl {
        name: name.into(),
        ty,
        direction,
        implicit: false,
    }
}

pub fn class(name: &str, bases: &[&str], declarations: Vec<Decl>) -> ClassDecl {
    ClassDecl {
        meta: DeclMeta::new(name),
        bases: bases.iter().map(|b| b.to_string()).collect(),
        is_static: false,
        is_abstract: false,
        is_final: false,
        is_interface: false,
        declarations,
    }
}

pub fn color() -> EnumDecl {
    let item = |name: &str, value: Option<i64>| EnumItem {
        name: name.into(),
        value,
        doc: None,
    };
    EnumDecl {
        meta: DeclMeta::new("Color"),
        underlying: PrimitiveKind::Int32,
        items: vec![item("Red", Some(0)), item("Green", None), item("Blue", Some(5))],
    }
}

pub fn point() -> ClassDecl {
    let float = || TypeDesc::primitive(PrimitiveKind::Float);
    let mut ctor = method(
        "Point",
        TypeDesc::default(),
        vec![param("x", float(), Direction::In), param("y", float(), Direction::In)],
    );
    ctor.kind = MethodKind::Constructor;
    class(
        "Point",
        &[],
        vec![
            Decl::Field(FieldDecl {
                meta: DeclMeta::new("X"),
                ty: float(),
            }),
            Decl::Field(FieldDecl {
                meta: DeclMeta::new("Y"),
                ty: float(),
            }),
            Decl::Method(ctor),
            Decl::Method(method("get_X", float(), vec![])),
        ],
    )
}

/// `managed.dll` with `Structs.Point` and `Structs.Color`.
pub fn sample_unit() -> TranslationUnit {
    unit_with(vec![Decl::Class(point()), Decl::Enum(color())])
}

/// A `managed.dll` unit whose `Structs` namespace holds `decls`.
pub fn unit_with(decls: Vec<Decl>) -> TranslationUnit {
    TranslationUnit {
        file_name: "managed.dll".into(),
        library: "managed".into(),
        declarations: vec![Decl::Namespace(NamespaceDecl {
            meta: DeclMeta::new("Structs"),
            declarations: decls,
        })],
    }
}

pub fn sample_index() -> DeclIndex {
    DeclIndex::build(&[sample_unit()])
}

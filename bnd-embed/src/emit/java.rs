//! Java surface: one file per top-level type plus the unit's JNA library
//! interface.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::debug;

use crate::config::Target;
use crate::error::{GenError, Result};
use crate::ident::{
    JAVA_RUNTIME_PACKAGE, SymbolTable, gen_id, java_file_path, java_native_lib_class,
    java_package, java_qualified_name, java_root_package,
};
use crate::marshal::{JavaMarshaller, plan_call};
use crate::model::{
    Access, ClassDecl, DeclIndex, DeclKind, EnumDecl, MethodDecl, MethodKind, PrimitiveKind, Scope,
    TranslationUnit, TypeDesc, TypedefDecl,
};
use crate::printer::java::POINTER_TYPE;
use crate::printer::{JavaTypePrinter, PrintContext, TypePrinter};
use crate::writer::{NewLine, SourceWriter};

use super::{DeclVisitor, GeneratedFile, check_enum_backing, visit_decls, visit_members};

pub struct JavaEmitter<'a> {
    unit: &'a TranslationUnit,
    index: &'a DeclIndex,
    symbols: &'a SymbolTable,
    printer: JavaTypePrinter<'a>,
    /// File currently being written (the enclosing top-level type).
    out: SourceWriter,
    files: Vec<GeneratedFile>,
    paths: HashSet<PathBuf>,
    natives: Vec<String>,
}

fn access_modifier(access: Access) -> &'static str {
    match access {
        Access::Public => "public",
        Access::Protected => "protected",
        Access::Private => "private",
        Access::Internal => "",
    }
}

/// Top-level Java types are either public or package-private.
fn type_access(access: Access, nested: bool) -> &'static str {
    match (access, nested) {
        (Access::Public, _) => "public",
        (_, false) => "",
        (other, true) => access_modifier(other),
    }
}

fn modifiers(words: &[&str]) -> String {
    words
        .iter()
        .filter(|w| !w.is_empty())
        .map(|w| format!("{w} "))
        .collect()
}

/// Constant value of an enum item, typed for the backing field.
fn enum_literal(kind: PrimitiveKind, value: i64) -> String {
    match kind {
        PrimitiveKind::Int8 => format!("(byte) {value}"),
        PrimitiveKind::Int16 => format!("(short) {value}"),
        PrimitiveKind::Int64 => format!("{value}L"),
        PrimitiveKind::UInt8 => format!("new UnsignedByte({value}L)"),
        PrimitiveKind::UInt16 => format!("new UnsignedShort({value}L)"),
        PrimitiveKind::UInt32 => format!("new UnsignedInt({value}L)"),
        PrimitiveKind::UInt64 => format!("new UnsignedLong({value}L)"),
        _ => value.to_string(),
    }
}

/// Reverse-map key for an item value. Unsigned enums key by `Long`.
fn enum_key(kind: PrimitiveKind, value: i64) -> String {
    if kind.is_unsigned() {
        return format!("{value}L");
    }
    match kind {
        PrimitiveKind::Int8 => format!("(byte) {value}"),
        PrimitiveKind::Int16 => format!("(short) {value}"),
        PrimitiveKind::Int64 => format!("{value}L"),
        _ => value.to_string(),
    }
}

impl<'a> JavaEmitter<'a> {
    pub fn new(unit: &'a TranslationUnit, index: &'a DeclIndex, symbols: &'a SymbolTable) -> Self {
        Self {
            unit,
            index,
            symbols,
            printer: JavaTypePrinter::new(index),
            out: SourceWriter::new(),
            files: Vec::new(),
            paths: HashSet::new(),
            natives: Vec::new(),
        }
    }

    pub fn emit(mut self) -> Result<Vec<GeneratedFile>> {
        let unit = self.unit;
        visit_decls(&mut self, &Scope::default(), &unit.declarations)?;
        self.native_library()?;
        Ok(self.files)
    }

    fn native_call_prefix(&self) -> String {
        format!(
            "{}.{}.INSTANCE",
            java_root_package(&self.unit.file_name),
            java_native_lib_class(self.unit)
        )
    }

    fn begin_file(&mut self, package: &str) {
        let w = &mut self.out;
        w.file_preamble();
        if !package.is_empty() {
            w.line(&format!("package {package};"));
            w.end_block(NewLine::BeforeNextBlock);
        }
        w.line(&format!("import {JAVA_RUNTIME_PACKAGE}.*;"));
        w.line("import com.sun.jna.*;");
        w.end_block(NewLine::BeforeNextBlock);
    }

    fn finish_file(&mut self, path: PathBuf) -> Result<()> {
        if !self.paths.insert(path.clone()) {
            return Err(GenError::PathCollision {
                path: path.display().to_string(),
            });
        }
        let contents = std::mem::replace(&mut self.out, SourceWriter::new()).into_string();
        debug!(path = %path.display(), "emitted java file");
        self.files.push(GeneratedFile { path, contents });
        Ok(())
    }

    /// Run `body` in a file of its own for top-level types, inline otherwise.
    fn in_type_file(
        &mut self,
        scope: &Scope,
        name: &str,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        if scope.is_nested() {
            return body(self);
        }
        let package = java_package(self.unit, scope);
        self.begin_file(&package);
        body(self)?;
        self.finish_file(java_file_path(self.unit, scope, name))
    }

    fn native_library(&mut self) -> Result<()> {
        let package = java_root_package(&self.unit.file_name);
        let lib = java_native_lib_class(self.unit);
        self.begin_file(&package);
        let w = &mut self.out;
        w.write(&format!("public interface {lib} extends Library "));
        w.open_brace();
        w.line(&format!(
            "{lib} INSTANCE = Native.load(\"{}\", {lib}.class);",
            self.unit.library
        ));
        w.end_block(NewLine::BeforeNextBlock);
        w.lines(&self.natives);
        w.close_brace();

        let mut path = PathBuf::from(&package);
        path.push(format!("{lib}.java"));
        self.finish_file(path)
    }

    fn write_class(&mut self, scope: &Scope, class: &ClassDecl) -> Result<()> {
        let index = self.index;
        let qualified = scope.qualify(&class.meta.name);
        let nested = scope.is_nested();
        let base = index.generated_base(&qualified);
        let interfaces: Vec<String> = class
            .bases
            .iter()
            .filter_map(|b| index.get(b))
            .filter(|b| b.is_interface() && b.emitted)
            .map(java_qualified_name)
            .collect();

        let access = type_access(class.meta.access, nested);
        let mut decl = if class.is_interface {
            let mut decl = format!(
                "{}interface {}",
                modifiers(&[access, if nested { "static" } else { "" }]),
                class.meta.name
            );
            if !interfaces.is_empty() {
                decl.push_str(&format!(" extends {}", interfaces.join(", ")));
            }
            decl
        } else {
            let mut decl = format!(
                "{}class {}",
                modifiers(&[
                    access,
                    if class.is_abstract { "abstract" } else { "" },
                    if class.is_final { "final" } else { "" },
                    if nested { "static" } else { "" },
                ]),
                class.meta.name
            );
            if let Some(b) = base {
                decl.push_str(&format!(" extends {}", java_qualified_name(b)));
            }
            if !interfaces.is_empty() {
                decl.push_str(&format!(" implements {}", interfaces.join(", ")));
            }
            decl
        };
        decl.push(' ');
        self.out.write(&decl);
        self.out.open_brace();

        if !class.is_interface && !class.is_static {
            let handle = gen_id("object");
            let w = &mut self.out;
            // The handle lives once per chain, on the first generated class.
            if base.is_none() {
                w.line(&format!("public {POINTER_TYPE} {handle};"));
                w.end_block(NewLine::BeforeNextBlock);
            }
            w.write(&format!("public {}({POINTER_TYPE} object) ", class.meta.name));
            w.open_brace();
            if base.is_some() {
                w.line("super(object);");
            } else {
                w.line(&format!("this.{handle} = object;"));
            }
            w.close_brace();
            w.end_block(NewLine::BeforeNextBlock);
        }

        visit_members(self, scope, class)?;
        self.out.close_brace();
        self.out.end_block(NewLine::BeforeNextBlock);
        Ok(())
    }

    fn write_enum(&mut self, scope: &Scope, e: &EnumDecl) -> Result<()> {
        let name = &e.meta.name;
        let underlying = e.underlying;
        let value_type = self
            .printer
            .print_as(&TypeDesc::primitive(underlying), PrintContext::Signature)?;
        let key_type = if underlying.is_unsigned() {
            "Long".to_string()
        } else {
            self.printer
                .print_as(&TypeDesc::primitive(underlying), PrintContext::Boxed)?
        };
        let lookup = if underlying.is_unsigned() {
            "n.longValue()"
        } else {
            "n"
        };
        let values = e.item_values();
        let nested = scope.is_nested();

        let w = &mut self.out;
        w.write(&format!(
            "{}final class {name} ",
            modifiers(&[
                type_access(e.meta.access, nested),
                if nested { "static" } else { "" }
            ])
        ));
        w.open_brace();
        for (item, value) in e.items.iter().zip(&values) {
            if let Some(doc) = &item.doc {
                w.line(&format!("/** {doc} */"));
            }
            w.line(&format!(
                "public static final {name} {} = new {name}({});",
                item.name,
                enum_literal(underlying, *value)
            ));
        }
        w.end_block(NewLine::BeforeNextBlock);

        w.line(&format!("private final {value_type} id;"));
        w.end_block(NewLine::BeforeNextBlock);

        w.write(&format!("private {name}({value_type} id) "));
        w.open_brace();
        w.line("this.id = id;");
        w.close_brace();
        w.end_block(NewLine::BeforeNextBlock);

        w.write(&format!("public {value_type} getValue() "));
        w.open_brace();
        w.line("return id;");
        w.close_brace();
        w.end_block(NewLine::BeforeNextBlock);

        // Unmapped ordinals still yield an instance carrying the raw value.
        w.write(&format!("public static {name} fromOrdinal({value_type} n) "));
        w.open_brace();
        w.line(&format!("if (valuesMap.containsKey({lookup}))"));
        w.line_indented(&format!("return valuesMap.get({lookup});"));
        w.line(&format!("return new {name}(n);"));
        w.close_brace();
        w.end_block(NewLine::BeforeNextBlock);

        w.line(&format!(
            "private static final java.util.Map<{key_type}, {name}> valuesMap = new java.util.HashMap<{key_type}, {name}>();"
        ));
        w.end_block(NewLine::BeforeNextBlock);

        w.write("static ");
        w.open_brace();
        for (item, value) in e.items.iter().zip(&values) {
            // First declared item wins for aliased values.
            w.line(&format!(
                "valuesMap.putIfAbsent({}, {});",
                enum_key(underlying, *value),
                item.name
            ));
        }
        w.close_brace();
        w.close_brace();
        w.end_block(NewLine::BeforeNextBlock);
        Ok(())
    }
}

impl DeclVisitor for JavaEmitter<'_> {
    fn target(&self) -> Target {
        Target::Java
    }

    fn visit_class(&mut self, scope: &Scope, class: &ClassDecl) -> Result<()> {
        debug!(class = %scope.qualify(&class.meta.name), "emitting class");
        self.in_type_file(scope, &class.meta.name, |this| this.write_class(scope, class))
    }

    fn visit_enum(&mut self, scope: &Scope, e: &EnumDecl) -> Result<()> {
        check_enum_backing(e)?;
        if e.is_incomplete() {
            debug!(name = %e.meta.name, "skipping enum without items");
            return Ok(());
        }
        self.in_type_file(scope, &e.meta.name, |this| this.write_enum(scope, e))
    }

    fn visit_method(
        &mut self,
        scope: &Scope,
        class: &ClassDecl,
        member: usize,
        method: &MethodDecl,
    ) -> Result<()> {
        let qualified = scope.qualify(&class.meta.name);
        let symbol = self
            .symbols
            .get(&qualified, member)
            .ok_or_else(|| GenError::UnhandledDecl {
                kind: DeclKind::Method,
                name: format!("{qualified}.{}", method.meta.name),
                target: Target::Java,
            })?
            .to_string();
        let has_base = self.index.generated_base(&qualified).is_some();

        // Native prototype, shared by every surface shape of the method.
        let native_return = match method.kind {
            MethodKind::Constructor => POINTER_TYPE.to_string(),
            MethodKind::Destructor => "void".to_string(),
            MethodKind::Normal => self
                .printer
                .print_as(&method.return_type, PrintContext::Native)?,
        };
        let mut native_params = Vec::new();
        if method.takes_receiver() {
            native_params.push(format!("{POINTER_TYPE} object"));
        }
        let declared = self
            .printer
            .params(method.visible_params(), PrintContext::Native, true)?;
        if !declared.is_empty() {
            native_params.push(declared);
        }
        self.natives.push(format!(
            "{native_return} {symbol}({});",
            native_params.join(", ")
        ));

        let params = self
            .printer
            .params(method.visible_params(), PrintContext::Signature, true)?;
        let head = match method.kind {
            MethodKind::Constructor => format!("{}({params})", class.meta.name),
            MethodKind::Destructor => format!("void destroy({params})"),
            MethodKind::Normal => format!(
                "{} {}({params})",
                self.printer
                    .print_as(&method.return_type, PrintContext::Signature)?,
                method.meta.name
            ),
        };
        let access = access_modifier(method.meta.access);

        if class.is_interface {
            self.out.line(&format!("{head};"));
            self.out.end_block(NewLine::BeforeNextBlock);
            return Ok(());
        }
        if method.is_override && has_base {
            self.out.line("@Override");
        }
        if method.is_pure {
            self.out
                .line(&format!("{}{head};", modifiers(&[access, "abstract"])));
            self.out.end_block(NewLine::BeforeNextBlock);
            return Ok(());
        }

        let plan = {
            let marshaller = JavaMarshaller::new(&self.printer);
            plan_call(&marshaller, method, &format!("{qualified}.{}", method.meta.name))?
        };
        let mut args: Vec<String> = Vec::new();
        if plan.receiver {
            args.push(gen_id("object"));
        }
        args.extend(plan.args().map(String::from));
        let call = format!("{}.{symbol}({});", self.native_call_prefix(), args.join(", "));

        let w = &mut self.out;
        w.write(&format!(
            "{}{head} ",
            modifiers(&[
                access,
                if method.is_static { "static" } else { "" },
                if method.is_final { "final" } else { "" },
            ])
        ));
        w.open_brace();
        if method.kind == MethodKind::Constructor && has_base {
            w.line(&format!("super(({POINTER_TYPE}) null);"));
        }
        for line in plan.before() {
            w.line(line);
        }
        match (&plan.ret, method.kind) {
            (_, MethodKind::Constructor) => w.line(&format!("{} = {call}", gen_id("object"))),
            (Some(ret), _) => w.line(&format!("{} __ret = {call}", ret.native_type)),
            (None, _) => w.line(&call),
        }
        w.line(&format!("{JAVA_RUNTIME_PACKAGE}.Runtime.checkExceptions();"));
        for line in plan.after() {
            w.line(line);
        }
        if let Some(ret) = &plan.ret {
            for line in &ret.before {
                w.line(line);
            }
            w.line(&format!("return {};", ret.arg));
        }
        w.close_brace();
        w.end_block(NewLine::BeforeNextBlock);
        debug!(%symbol, "emitted method");
        Ok(())
    }

    /// Java has no typedefs; uses print the alias target instead.
    fn visit_typedef(&mut self, _scope: &Scope, _typedef: &TypedefDecl) -> Result<()> {
        Ok(())
    }
}

//! C surface: `<unit>.h` and `<unit>.c`.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::{Options, Target};
use crate::error::{GenError, Result};
use crate::ident::{
    C_RUNTIME_HEADER, SymbolTable, assembly_id, c_header_file, c_source_file, gen_id,
};
use crate::marshal::c::handle_path;
use crate::marshal::{CMarshaller, CallPlan, plan_call};
use crate::model::{
    ClassDecl, DeclIndex, DeclKind, EnumDecl, MethodDecl, MethodKind, Scope, TranslationUnit,
    TypeDesc, TypedefDecl, file_base_name,
};
use crate::printer::{CTypePrinter, PrintContext, TypePrinter};
use crate::writer::{NewLine, SourceWriter};

use super::{DeclVisitor, GeneratedFile, check_enum_backing, visit_decls, visit_members};

/// Wrapper struct awaiting its place in the header.
struct StructDef {
    qualified: String,
    c_name: String,
    /// Generated base declared in this unit, if any.
    base: Option<String>,
    field: String,
}

pub struct CEmitter<'a> {
    unit: &'a TranslationUnit,
    index: &'a DeclIndex,
    options: &'a Options,
    symbols: &'a SymbolTable,
    printer: CTypePrinter<'a>,
    includes: Vec<String>,
    forwards: Vec<String>,
    structs: Vec<StructDef>,
    arrays: Vec<Vec<String>>,
    enums: Vec<Vec<String>>,
    typedefs: Vec<String>,
    prototypes: Vec<String>,
    bodies: SourceWriter,
    seen: HashSet<String>,
    /// C type name to the managed declaration that owns it.
    type_names: HashMap<String, String>,
}

/// Managed name of a class as the runtime resolves it: nested classes are
/// joined with `+`.
fn runtime_class_name(scope: &Scope, name: &str) -> String {
    let mut classes = scope.classes.clone();
    classes.push(name.to_string());
    let nested = classes.join("+");
    if scope.namespaces.is_empty() {
        nested
    } else {
        format!("{}.{nested}", scope.namespaces.join("."))
    }
}

/// Runtime method descriptor: `Name(Type,Type&)`. The parameter types keep
/// same-arity overloads apart.
fn method_descriptor(name: &str, method: &MethodDecl) -> String {
    let params: Vec<String> = method
        .visible_params()
        .map(|p| {
            let ty = p.ty.managed_name();
            if p.direction.is_by_ref() {
                format!("{ty}&")
            } else {
                ty
            }
        })
        .collect();
    format!("{name}({})", params.join(","))
}

impl<'a> CEmitter<'a> {
    pub fn new(
        unit: &'a TranslationUnit,
        index: &'a DeclIndex,
        options: &'a Options,
        symbols: &'a SymbolTable,
    ) -> Self {
        Self {
            unit,
            index,
            options,
            symbols,
            printer: CTypePrinter::new(index, options.naming),
            includes: Vec::new(),
            forwards: Vec::new(),
            structs: Vec::new(),
            arrays: Vec::new(),
            enums: Vec::new(),
            typedefs: Vec::new(),
            prototypes: Vec::new(),
            bodies: SourceWriter::new(),
            seen: HashSet::new(),
            type_names: HashMap::new(),
        }
    }

    pub fn emit(mut self) -> Result<Vec<GeneratedFile>> {
        let unit = self.unit;
        visit_decls(&mut self, &Scope::default(), &unit.declarations)?;
        let header = self.header();
        let source = self.source();
        Ok(vec![
            GeneratedFile {
                path: c_header_file(self.unit),
                contents: header,
            },
            GeneratedFile {
                path: c_source_file(self.unit),
                contents: source,
            },
        ])
    }

    /// Record a header-level item once, keyed by `key`.
    fn first_time(&mut self, key: String) -> bool {
        self.seen.insert(key)
    }

    /// Reserve a header type name for `owner`. Flat naming can map two
    /// managed declarations onto one C name.
    fn claim_type_name(&mut self, name: &str, owner: &str) -> Result<()> {
        match self.type_names.get(name) {
            Some(first) if first != owner => Err(GenError::TypeNameCollision {
                name: name.to_string(),
                first: first.clone(),
                second: owner.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.type_names.insert(name.to_string(), owner.to_string());
                Ok(())
            }
        }
    }

    fn include_unit_of(&mut self, unit_file: &str) {
        if unit_file == self.unit.file_name {
            return;
        }
        let header = format!("{}.h", file_base_name(unit_file));
        if self.first_time(format!("include:{header}")) {
            self.includes.push(header);
        }
    }

    /// Collect the header support a type needs: array wrappers, alias
    /// typedefs and other units' headers.
    fn note_type(&mut self, ty: &TypeDesc) -> Result<()> {
        match ty {
            TypeDesc::Pointer { pointee, .. } => self.note_type(pointee)?,
            TypeDesc::Array { element, .. } => {
                self.note_type(element)?;
                let wrapper = self.printer.array_wrapper_name(element)?;
                self.claim_type_name(&wrapper, &format!("{}[]", element.managed_name()))?;
                if self.first_time(format!("array:{wrapper}")) {
                    let guard = format!("BND_EMBED_{}_DEFINED", wrapper.to_uppercase());
                    self.arrays.push(vec![
                        format!("#ifndef {guard}"),
                        format!("#define {guard}"),
                        format!("typedef struct {wrapper} {{"),
                        "    GArray* array;".to_string(),
                        format!("}} {wrapper};"),
                        "#endif".to_string(),
                    ]);
                }
            }
            TypeDesc::Decayed { alias } => {
                self.note_type(&alias.target)?;
                let name = self.printer.print_as(ty, PrintContext::Signature)?;
                let target = self.printer.print_as(&alias.target, PrintContext::Signature)?;
                let mut owner = alias.namespace.clone();
                owner.push(alias.name.clone());
                self.claim_type_name(&name, &owner.join("."))?;
                if self.first_time(format!("typedef:{name}")) {
                    self.typedefs.push(format!("typedef {target} {name};"));
                }
            }
            TypeDesc::Named { name } => {
                let entry = self.printer.resolve(name)?;
                let unit_file = entry.unit.clone();
                self.include_unit_of(&unit_file);
            }
            TypeDesc::Primitive { .. } | TypeDesc::Unsupported { .. } => {}
        }
        Ok(())
    }

    fn header(&self) -> String {
        let mut w = SourceWriter::new();
        w.file_preamble();
        w.line("#pragma once");
        w.end_block(NewLine::BeforeNextBlock);

        if self.options.generate_support_files {
            w.line(&format!("#include \"{C_RUNTIME_HEADER}\""));
        } else {
            w.line(&format!("#include <{C_RUNTIME_HEADER}>"));
        }
        for include in &self.includes {
            w.line(&format!("#include \"{include}\""));
        }
        w.end_block(NewLine::BeforeNextBlock);

        w.line("#ifdef __cplusplus");
        w.line("extern \"C\" {");
        w.line("#endif");
        w.end_block(NewLine::BeforeNextBlock);

        if !self.forwards.is_empty() {
            w.lines(&self.forwards);
            w.end_block(NewLine::BeforeNextBlock);
        }
        for def in self.ordered_structs() {
            w.write(&format!("struct {} ", def.c_name));
            w.open_brace();
            w.line(&def.field);
            w.close_brace_semi("");
            w.end_block(NewLine::BeforeNextBlock);
        }
        for block in self.arrays.iter().chain(&self.enums) {
            w.lines(block);
            w.end_block(NewLine::BeforeNextBlock);
        }
        if !self.typedefs.is_empty() {
            // Consecutive typedefs stay together.
            w.lines(&self.typedefs);
            w.end_block(NewLine::BeforeNextBlock);
        }
        if !self.prototypes.is_empty() {
            w.lines(&self.prototypes);
            w.end_block(NewLine::BeforeNextBlock);
        }

        w.line("#ifdef __cplusplus");
        w.line("}");
        w.line("#endif");
        w.into_string()
    }

    /// Struct definitions with every in-unit base ahead of its subclasses.
    fn ordered_structs(&self) -> Vec<&StructDef> {
        fn place<'s>(
            def: &'s StructDef,
            all: &'s [StructDef],
            placed: &mut HashSet<&'s str>,
            out: &mut Vec<&'s StructDef>,
        ) {
            if !placed.insert(&def.qualified) {
                return;
            }
            let base = def
                .base
                .as_deref()
                .and_then(|b| all.iter().find(|d| d.qualified == b));
            if let Some(base) = base {
                place(base, all, placed, out);
            }
            out.push(def);
        }

        let mut placed = HashSet::new();
        let mut out = Vec::with_capacity(self.structs.len());
        for def in &self.structs {
            place(def, &self.structs, &mut placed, &mut out);
        }
        out
    }

    fn source(&mut self) -> String {
        let mut w = SourceWriter::new();
        w.file_preamble();
        w.line(&format!("#include \"{}\"", c_header_file(self.unit).display()));
        w.line("#include <stdlib.h>");
        w.end_block(NewLine::BeforeNextBlock);
        w.line(&format!(
            "static const char* {} = \"{}\";",
            assembly_id(self.unit),
            self.unit.file_name
        ));
        w.end_block(NewLine::BeforeNextBlock);
        let bodies = std::mem::take(&mut self.bodies).into_string();
        format!("{}{bodies}", w.into_string())
    }

    fn write_lookup(&mut self, scope: &Scope, class: &ClassDecl, method: &MethodDecl) {
        let managed = runtime_class_name(scope, &class.meta.name);
        let name = match method.kind {
            MethodKind::Constructor => ".ctor",
            _ => method.meta.name.as_str(),
        };
        let descriptor = method_descriptor(name, method);
        let w = &mut self.bodies;
        w.line("static bnd_embed_method* __method = 0;");
        w.line("if (!__method)");
        w.line_indented(&format!(
            "__method = bnd_embed_lookup_method({}, \"{managed}\", \"{descriptor}\");",
            assembly_id(self.unit)
        ));
    }

    fn write_args(&mut self, plan: &CallPlan) {
        let w = &mut self.bodies;
        match plan.params.len() {
            0 => w.line("void** __args = 0;"),
            n => w.line(&format!("void* __args[{n}];")),
        }
        for line in plan.before() {
            w.line(line);
        }
        for (i, arg) in plan.args().enumerate() {
            w.line(&format!("__args[{i}] = {arg};"));
        }
        w.line(&format!("bnd_embed_object* {} = 0;", gen_id("exception")));
    }

    fn write_after(&mut self, plan: &CallPlan) {
        let w = &mut self.bodies;
        w.line(&format!("bnd_embed_check_exceptions({});", gen_id("exception")));
        for line in plan.after() {
            w.line(line);
        }
    }
}

impl DeclVisitor for CEmitter<'_> {
    fn target(&self) -> Target {
        Target::C
    }

    fn visit_class(&mut self, scope: &Scope, class: &ClassDecl) -> Result<()> {
        let index = self.index;
        let qualified = scope.qualify(&class.meta.name);
        let c_name = self.printer.decl_name(scope, &class.meta.name);

        // Static classes have no instances and so no wrapper.
        if !class.is_static {
            self.claim_type_name(&c_name, &qualified)?;
            self.forwards
                .push(format!("typedef struct {c_name} {c_name};"));
            let base = index.generated_base(&qualified);
            let field = match base {
                Some(b) => format!("{} {};", self.printer.entry_name(b), gen_id("base")),
                None => format!("bnd_embed_gchandle {};", gen_id("object")),
            };
            if let Some(b) = base {
                self.include_unit_of(&b.unit);
            }
            let local_base = base
                .filter(|b| b.unit == self.unit.file_name)
                .map(|b| b.qualified_name());
            self.structs.push(StructDef {
                qualified: qualified.clone(),
                c_name,
                base: local_base,
                field,
            });
        }
        debug!(class = %qualified, "emitting class");
        visit_members(self, scope, class)
    }

    fn visit_enum(&mut self, scope: &Scope, e: &EnumDecl) -> Result<()> {
        check_enum_backing(e)?;
        if e.is_incomplete() {
            debug!(name = %e.meta.name, "skipping enum without items");
            return Ok(());
        }
        let name = self.printer.decl_name(scope, &e.meta.name);
        self.claim_type_name(&name, &scope.qualify(&e.meta.name))?;
        let values = e.item_values();
        let last = e.items.len() - 1;
        let mut block = vec![format!("typedef enum {name} {{")];
        for (i, (item, value)) in e.items.iter().zip(values).enumerate() {
            let comma = if i == last { "" } else { "," };
            block.push(format!("    {name}_{} = {value}{comma}", item.name));
        }
        block.push(format!("}} {name};"));
        self.enums.push(block);
        Ok(())
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
                target: Target::C,
            })?
            .to_string();
        let index = self.index;
        let entry = index
            .get(&qualified)
            .ok_or_else(|| GenError::UnknownType {
                name: qualified.clone(),
            })?;
        let class_name = self.printer.entry_name(entry);
        let handle = handle_path(index, entry);

        for ty in method.visible_params().map(|p| &p.ty) {
            self.note_type(ty)?;
        }
        self.note_type(&method.return_type)?;

        let return_type = match method.kind {
            MethodKind::Constructor => format!("{class_name}*"),
            MethodKind::Destructor => "void".to_string(),
            MethodKind::Normal => self
                .printer
                .print_as(&method.return_type, PrintContext::Signature)?,
        };
        let mut params = Vec::new();
        if method.takes_receiver() {
            params.push(format!("{class_name}* object"));
        }
        let declared = self
            .printer
            .params(method.visible_params(), PrintContext::Signature, true)?;
        if !declared.is_empty() {
            params.push(declared);
        }
        let params = if params.is_empty() {
            "void".to_string()
        } else {
            params.join(", ")
        };
        let signature = format!("{return_type} {symbol}({params})");
        let export = self
            .options
            .export_macro
            .as_deref()
            .map(|m| format!("{m} "))
            .unwrap_or_default();
        self.prototypes.push(format!("{export}{signature};"));

        let plan = {
            let marshaller = CMarshaller::new(&self.printer);
            plan_call(&marshaller, method, &format!("{qualified}.{}", method.meta.name))?
        };

        self.bodies.line(&signature);
        self.bodies.open_brace();
        match method.kind {
            MethodKind::Destructor => {
                self.bodies
                    .line(&format!("bnd_embed_gchandle_free(object->{handle});"));
                self.bodies.line("free(object);");
            }
            MethodKind::Constructor => {
                self.write_lookup(scope, class, method);
                self.write_args(&plan);
                let w = &mut self.bodies;
                w.line(&format!(
                    "{class_name}* object = ({class_name}*) calloc(1, sizeof({class_name}));"
                ));
                w.line("bnd_embed_object* __instance = bnd_embed_object_new(__method);");
                w.line("bnd_embed_invoke(__method, __instance, __args, &__exception);");
                self.write_after(&plan);
                let w = &mut self.bodies;
                w.line(&format!(
                    "object->{handle} = bnd_embed_gchandle_new(__instance, false);"
                ));
                w.line("return object;");
            }
            MethodKind::Normal => {
                self.write_lookup(scope, class, method);
                self.write_args(&plan);
                let instance = if plan.receiver {
                    self.bodies.line(&format!(
                        "bnd_embed_object* __instance = bnd_embed_gchandle_target(object->{handle});"
                    ));
                    "__instance"
                } else {
                    "0"
                };
                let call = format!("bnd_embed_invoke(__method, {instance}, __args, &__exception);");
                match &plan.ret {
                    Some(_) => self
                        .bodies
                        .line(&format!("bnd_embed_object* __result = {call}")),
                    None => self.bodies.line(&call),
                }
                self.write_after(&plan);
                if let Some(ret) = &plan.ret {
                    for line in &ret.before {
                        self.bodies.line(line);
                    }
                    self.bodies.line(&format!("return {};", ret.arg));
                }
            }
        }
        self.bodies.close_brace();
        self.bodies.end_block(NewLine::BeforeNextBlock);
        debug!(%symbol, "emitted function");
        Ok(())
    }

    fn visit_typedef(&mut self, scope: &Scope, typedef: &TypedefDecl) -> Result<()> {
        self.note_type(&typedef.target)?;
        let name = self.printer.decl_name(scope, &typedef.meta.name);
        self.claim_type_name(&name, &scope.qualify(&typedef.meta.name))?;
        let target = self
            .printer
            .print_as(&typedef.target, PrintContext::Signature)?;
        if self.first_time(format!("typedef:{name}")) {
            self.typedefs.push(format!("typedef {target} {name};"));
        }
        Ok(())
    }
}

use std::collections::{HashMap, HashSet};

use crate::diagnostics::{rules, Diagnostic, DiagnosticSink};
use crate::parser::{CompilationUnit, FunctionDecl, ImportShape, Item, ModuleDecl, Type};

/// The closed effect alphabet (spec §3).
pub const EFFECT_ALPHABET: [&str; 6] = ["Database", "Network", "Logging", "FileSystem", "Memory", "IO"];

#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub params: Vec<Type>,
    pub return_type: Type,
    pub effects: HashSet<String>,
    pub is_pure: bool,
}

impl FunctionSignature {
    fn from_decl(decl: &FunctionDecl) -> Self {
        FunctionSignature {
            params: decl.params.iter().map(|p| p.ty.clone()).collect(),
            return_type: decl.return_type.clone(),
            effects: decl.effects.iter().flatten().map(|e| e.name.clone()).collect(),
            is_pure: decl.is_pure,
        }
    }
}

#[derive(Debug, Default)]
pub struct ModuleInfo {
    pub functions: HashMap<String, FunctionSignature>,
    pub exports: HashSet<String>,
}

/// Global name tables built in one pass before any function body is
/// checked, so mutually-recursive and forward-referenced calls resolve
/// (spec §4.3 check 1 / invariant 7: same-module functions are all
/// visible to each other regardless of declaration order).
#[derive(Debug, Default)]
pub struct Registry {
    pub top_level: HashMap<String, FunctionSignature>,
    pub modules: HashMap<String, ModuleInfo>,
    /// Names brought into unqualified scope by `import M` / `import M.*`
    /// / `import M.{a, b}`, mapped to their owning module.
    pub unqualified_imports: HashMap<String, String>,
}

pub fn build_registry(unit: &CompilationUnit, sink: &mut DiagnosticSink) -> Registry {
    let mut registry = Registry::default();

    for item in &unit.items {
        match item {
            Item::Function(decl) => {
                register_function(&mut registry.top_level, decl, sink);
            }
            Item::Module(module) => {
                register_module(&mut registry, module, sink);
            }
            Item::Import(_) => {}
        }
    }

    let mut imports = Vec::new();
    collect_imports(&unit.items, &mut imports);
    for import in imports {
        process_import(&mut registry, import, sink);
    }

    registry
}

/// Collects every `import` in the unit, including ones nested inside a
/// `module { ... }` body (the grammar's `top_item*` production allows
/// `import` there same as at the top level), so none are silently
/// discarded by the registration pass above.
fn collect_imports<'a>(items: &'a [Item], out: &mut Vec<&'a crate::parser::ImportDecl>) {
    for item in items {
        match item {
            Item::Import(import) => out.push(import),
            Item::Module(module) => collect_imports(&module.items, out),
            Item::Function(_) => {}
        }
    }
}

fn register_function(table: &mut HashMap<String, FunctionSignature>, decl: &FunctionDecl, sink: &mut DiagnosticSink) {
    check_duplicate_parameters(decl, sink);
    check_effect_alphabet(decl, sink);
    table.insert(decl.name.clone(), FunctionSignature::from_decl(decl));
}

fn register_module(registry: &mut Registry, module: &ModuleDecl, sink: &mut DiagnosticSink) {
    let mut info = ModuleInfo::default();
    for item in &module.items {
        match item {
            Item::Function(decl) => register_function(&mut info.functions, decl, sink),
            Item::Module(nested) => {
                // Nested module declarations are not part of the grammar's
                // `top_item` production inside a module body beyond one
                // level of functions/imports; treat as a flat sibling to
                // keep qualified-call resolution simple.
                register_module(registry, nested, sink);
            }
            // Imports are gathered separately by `collect_imports` once the
            // whole registry exists, so every module's exports are visible
            // regardless of declaration order.
            Item::Import(_) => {}
        }
    }

    match &module.exports {
        Some(names) => {
            let mut seen = HashSet::new();
            for name in names {
                if !seen.insert(name.clone()) {
                    sink.push(
                        Diagnostic::error(rules::SEM_DUPLICATE_EXPORT, format!("'{name}' is exported more than once from module '{}'", module.name))
                            .with_span(module.span),
                    );
                    continue;
                }
                if !info.functions.contains_key(name) {
                    sink.push(
                        Diagnostic::error(rules::SEM_UNRESOLVED_NAME, format!("module '{}' exports unknown function '{name}'", module.name))
                            .with_span(module.span),
                    );
                    continue;
                }
                info.exports.insert(name.clone());
            }
        }
        None => {
            // No explicit export list: every module-scope function is
            // exported (spec §3).
            info.exports = info.functions.keys().cloned().collect();
        }
    }

    registry.modules.insert(module.name.clone(), info);
}

/// Validates `import` against the already-built module registry (invariant
/// 6) and, for `All`/`Only` shapes, brings the resolved names into
/// unqualified scope.
fn process_import(registry: &mut Registry, import: &crate::parser::ImportDecl, sink: &mut DiagnosticSink) {
    let Some(exports) = registry.modules.get(&import.module_name).map(|info| info.exports.clone()) else {
        sink.push(
            Diagnostic::error(rules::SEM_UNKNOWN_MODULE, format!("no module named '{}' in this compilation unit", import.module_name))
                .with_span(import.span),
        );
        return;
    };

    match &import.shape {
        ImportShape::All => {
            for name in exports {
                registry.unqualified_imports.insert(name, import.module_name.clone());
            }
        }
        ImportShape::Only(names) => {
            for name in names {
                if exports.contains(name) {
                    registry.unqualified_imports.insert(name.clone(), import.module_name.clone());
                } else {
                    sink.push(
                        Diagnostic::error(
                            rules::SEM_UNEXPORTED_IMPORT,
                            format!("'{name}' is not exported by module '{}'", import.module_name),
                        )
                        .with_span(import.span),
                    );
                }
            }
        }
        ImportShape::Bare => {}
    }
}

fn check_duplicate_parameters(decl: &FunctionDecl, sink: &mut DiagnosticSink) {
    let mut seen = HashSet::new();
    for param in &decl.params {
        if !seen.insert(param.name.clone()) {
            sink.push(
                Diagnostic::error(rules::SEM_DUPLICATE_PARAMETER, format!("duplicate parameter '{}' in function '{}'", param.name, decl.name))
                    .with_span(decl.span),
            );
        }
    }
}

fn check_effect_alphabet(decl: &FunctionDecl, sink: &mut DiagnosticSink) {
    let Some(effects) = &decl.effects else { return };
    for effect in effects {
        if !EFFECT_ALPHABET.contains(&effect.name.as_str()) {
            sink.push(
                Diagnostic::error(rules::SEM_UNKNOWN_EFFECT, format!("'{}' is not a recognised effect", effect.name)).with_span(effect.span),
            );
        }
    }
}

use crate::model::{
    AttributeSurface, ClassSurface, DefaultValue, FunctionSurface, ParamKind, Parameter, TypeRef,
};
use std::cell::RefCell;
use tree_sitter::{Node, Parser};

use super::{FileSurface, Reexport};

thread_local! {
    static PYTHON_PARSER: RefCell<Parser> = RefCell::new({
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .expect("Failed to set Python language");
        parser
    });
}

/// Project one Python source file into its public surface.
///
/// `package` is the dotted base used to resolve relative imports: the module's
/// own name for an `__init__.py`, its parent package otherwise.
pub(crate) fn parse_source(source: &str, package: &str) -> Result<FileSurface, String> {
    let tree = PYTHON_PARSER
        .with(|parser| parser.borrow_mut().parse(source, None))
        .ok_or_else(|| "failed to produce a syntax tree".to_string())?;

    let root = tree.root_node();
    if root.has_error() {
        return Err("syntax error".to_string());
    }

    let source_bytes = source.as_bytes();
    let mut functions: Vec<FunctionSurface> = Vec::new();
    let mut classes: Vec<ClassSurface> = Vec::new();
    let mut imports: Vec<ImportBinding> = Vec::new();
    let mut export_list: Option<Vec<String>> = None;

    // Only direct children of the module node are part of the surface;
    // anything nested inside a function body never is.
    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        match node.kind() {
            "function_definition" => {
                if let Some(f) = extract_function(&node, source_bytes, false) {
                    upsert_function(&mut functions, f);
                }
            }
            "class_definition" => {
                if let Some(c) = extract_class(&node, source_bytes) {
                    upsert_class(&mut classes, c);
                }
            }
            "decorated_definition" => {
                if let Some(inner) = node.child_by_field_name("definition") {
                    match inner.kind() {
                        "function_definition" => {
                            if let Some(f) = extract_function(&inner, source_bytes, false) {
                                upsert_function(&mut functions, f);
                            }
                        }
                        "class_definition" => {
                            if let Some(c) = extract_class(&inner, source_bytes) {
                                upsert_class(&mut classes, c);
                            }
                        }
                        _ => {}
                    }
                }
            }
            "expression_statement" => {
                if let Some(assign) = node.named_child(0).filter(|n| n.kind() == "assignment") {
                    if let Some(names) = parse_export_list(&assign, source_bytes) {
                        export_list = Some(names);
                    }
                }
            }
            "import_from_statement" => {
                collect_from_import(&node, source_bytes, package, &mut imports);
            }
            _ => {}
        }
    }

    let exposed = |name: &str| match &export_list {
        Some(list) => list.iter().any(|entry| entry == name),
        None => !name.starts_with('_'),
    };

    let mut reexports = Vec::new();
    for binding in imports {
        let defined_locally = functions.iter().any(|f| f.name == binding.local_name)
            || classes.iter().any(|c| c.name == binding.local_name);
        if exposed(&binding.local_name) && !defined_locally {
            reexports.push(Reexport {
                local_name: binding.local_name,
                source_module: binding.source_module,
                source_name: binding.source_name,
            });
        }
    }

    functions.retain(|f| exposed(&f.name));
    classes.retain(|c| exposed(&c.name));

    Ok(FileSurface {
        functions,
        classes,
        reexports,
    })
}

struct ImportBinding {
    local_name: String,
    source_module: String,
    source_name: String,
}

fn extract_function(node: &Node, source_bytes: &[u8], is_method: bool) -> Option<FunctionSurface> {
    let name = node
        .child_by_field_name("name")?
        .utf8_text(source_bytes)
        .ok()?
        .to_string();

    let returns = node
        .child_by_field_name("return_type")
        .and_then(|n| n.utf8_text(source_bytes).ok())
        .map(TypeRef::new);

    let params = node
        .child_by_field_name("parameters")
        .map(|p| extract_params(&p, source_bytes, is_method))
        .unwrap_or_default();

    Some(FunctionSurface {
        name,
        params,
        returns,
    })
}

fn extract_params(node: &Node, source_bytes: &[u8], is_method: bool) -> Vec<Parameter> {
    let mut params: Vec<Parameter> = Vec::new();
    let mut keyword_only = false;

    let positional_kind = |keyword_only: bool| {
        if keyword_only {
            ParamKind::KeywordOnly
        } else {
            ParamKind::PositionalOrKeyword
        }
    };

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => {
                if let Ok(name) = child.utf8_text(source_bytes) {
                    params.push(Parameter {
                        name: name.to_string(),
                        kind: positional_kind(keyword_only),
                        annotation: None,
                        default: DefaultValue::Absent,
                    });
                }
            }
            "typed_parameter" => {
                let annotation = child
                    .child_by_field_name("type")
                    .and_then(|t| t.utf8_text(source_bytes).ok())
                    .map(TypeRef::new);
                let Some(pattern) = child.named_child(0) else {
                    continue;
                };
                match pattern.kind() {
                    "identifier" => {
                        if let Ok(name) = pattern.utf8_text(source_bytes) {
                            params.push(Parameter {
                                name: name.to_string(),
                                kind: positional_kind(keyword_only),
                                annotation,
                                default: DefaultValue::Absent,
                            });
                        }
                    }
                    "list_splat_pattern" => {
                        if let Some(p) = splat_param(
                            &pattern,
                            source_bytes,
                            ParamKind::VariadicPositional,
                            annotation,
                        ) {
                            params.push(p);
                        }
                        keyword_only = true;
                    }
                    "dictionary_splat_pattern" => {
                        if let Some(p) = splat_param(
                            &pattern,
                            source_bytes,
                            ParamKind::VariadicKeyword,
                            annotation,
                        ) {
                            params.push(p);
                        }
                    }
                    _ => {}
                }
            }
            "default_parameter" | "typed_default_parameter" => {
                let Some(name_node) = child.child_by_field_name("name") else {
                    continue;
                };
                if name_node.kind() != "identifier" {
                    continue;
                }
                if let Ok(name) = name_node.utf8_text(source_bytes) {
                    let annotation = child
                        .child_by_field_name("type")
                        .and_then(|t| t.utf8_text(source_bytes).ok())
                        .map(TypeRef::new);
                    let default = child
                        .child_by_field_name("value")
                        .map(|v| default_value(&v, source_bytes))
                        .unwrap_or(DefaultValue::Absent);
                    params.push(Parameter {
                        name: name.to_string(),
                        kind: positional_kind(keyword_only),
                        annotation,
                        default,
                    });
                }
            }
            "list_splat_pattern" => {
                if let Some(p) =
                    splat_param(&child, source_bytes, ParamKind::VariadicPositional, None)
                {
                    params.push(p);
                }
                keyword_only = true;
            }
            "dictionary_splat_pattern" => {
                if let Some(p) = splat_param(&child, source_bytes, ParamKind::VariadicKeyword, None)
                {
                    params.push(p);
                }
            }
            "keyword_separator" => {
                keyword_only = true;
            }
            "positional_separator" => {
                // Everything declared before the `/` is positional-only.
                for param in &mut params {
                    if param.kind == ParamKind::PositionalOrKeyword {
                        param.kind = ParamKind::PositionalOnly;
                    }
                }
            }
            _ => {}
        }
    }

    if is_method {
        if let Some(first) = params.first() {
            if (first.name == "self" || first.name == "cls") && first.is_positional() {
                params.remove(0);
            }
        }
    }

    params
}

fn splat_param(
    pattern: &Node,
    source_bytes: &[u8],
    kind: ParamKind,
    annotation: Option<TypeRef>,
) -> Option<Parameter> {
    let name = pattern
        .named_child(0)
        .filter(|n| n.kind() == "identifier")?
        .utf8_text(source_bytes)
        .ok()?
        .to_string();
    Some(Parameter {
        name,
        kind,
        annotation,
        default: DefaultValue::Absent,
    })
}

fn extract_class(node: &Node, source_bytes: &[u8]) -> Option<ClassSurface> {
    let name = node
        .child_by_field_name("name")?
        .utf8_text(source_bytes)
        .ok()?
        .to_string();

    let mut bases = Vec::new();
    if let Some(superclasses) = node.child_by_field_name("superclasses") {
        let mut cursor = superclasses.walk();
        for base in superclasses.named_children(&mut cursor) {
            if let Ok(text) = base.utf8_text(source_bytes) {
                bases.push(normalize_text(text));
            }
        }
    }

    let mut attributes: Vec<AttributeSurface> = Vec::new();
    let mut methods: Vec<FunctionSurface> = Vec::new();

    let body = node.child_by_field_name("body")?;
    let mut cursor = body.walk();
    for item in body.named_children(&mut cursor) {
        match item.kind() {
            "function_definition" => {
                if let Some(f) = extract_function(&item, source_bytes, true) {
                    if !f.name.starts_with('_') {
                        upsert_function(&mut methods, f);
                    }
                }
            }
            "decorated_definition" => {
                if let Some(inner) = item
                    .child_by_field_name("definition")
                    .filter(|n| n.kind() == "function_definition")
                {
                    if let Some(f) = extract_function(&inner, source_bytes, true) {
                        if !f.name.starts_with('_') {
                            upsert_function(&mut methods, f);
                        }
                    }
                }
            }
            "expression_statement" => {
                if let Some(assign) = item.named_child(0).filter(|n| n.kind() == "assignment") {
                    if let Some(attr) = extract_attribute(&assign, source_bytes) {
                        upsert_attribute(&mut attributes, attr);
                    }
                }
            }
            _ => {}
        }
    }

    Some(ClassSurface {
        name,
        bases,
        attributes,
        methods,
    })
}

fn extract_attribute(assign: &Node, source_bytes: &[u8]) -> Option<AttributeSurface> {
    let left = assign.child_by_field_name("left")?;
    if left.kind() != "identifier" {
        return None;
    }
    let name = left.utf8_text(source_bytes).ok()?.to_string();
    if name.starts_with('_') {
        return None;
    }

    let annotation = assign
        .child_by_field_name("type")
        .and_then(|t| t.utf8_text(source_bytes).ok())
        .map(TypeRef::new);
    let default = assign
        .child_by_field_name("right")
        .map(|v| default_value(&v, source_bytes))
        .unwrap_or(DefaultValue::Absent);

    Some(AttributeSurface {
        name,
        annotation,
        default,
    })
}

/// Capture a default expression: a literal constant keeps its normalized
/// text, anything else degrades to the `Dynamic` sentinel without being
/// evaluated.
fn default_value(node: &Node, source_bytes: &[u8]) -> DefaultValue {
    if !is_literal(node) {
        return DefaultValue::Dynamic;
    }
    match node.utf8_text(source_bytes) {
        Ok(text) => DefaultValue::Literal(normalize_text(text)),
        Err(_) => DefaultValue::Dynamic,
    }
}

fn is_literal(node: &Node) -> bool {
    match node.kind() {
        "integer" | "float" | "string" | "concatenated_string" | "true" | "false" | "none" => true,
        "unary_operator" => node
            .child_by_field_name("argument")
            .map(|arg| matches!(arg.kind(), "integer" | "float"))
            .unwrap_or(false),
        _ => false,
    }
}

fn normalize_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '\'' { '"' } else { c })
        .collect()
}

/// `__all__ = ["a", "b"]` as a literal list or tuple of plain strings.
/// Anything fancier (augmented assignment, comprehensions) is ignored.
fn parse_export_list(assign: &Node, source_bytes: &[u8]) -> Option<Vec<String>> {
    let left = assign.child_by_field_name("left")?;
    if left.kind() != "identifier" || left.utf8_text(source_bytes).ok()? != "__all__" {
        return None;
    }
    let right = assign.child_by_field_name("right")?;
    if !matches!(right.kind(), "list" | "tuple") {
        return None;
    }

    let mut names = Vec::new();
    let mut cursor = right.walk();
    for element in right.named_children(&mut cursor) {
        if element.kind() == "string" {
            if let Some(text) = string_literal_text(&element, source_bytes) {
                names.push(text);
            }
        }
    }
    Some(names)
}

fn string_literal_text(node: &Node, source_bytes: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    for part in node.named_children(&mut cursor) {
        if part.kind() == "string_content" {
            return part.utf8_text(source_bytes).ok().map(str::to_string);
        }
    }
    None
}

fn collect_from_import(
    node: &Node,
    source_bytes: &[u8],
    package: &str,
    imports: &mut Vec<ImportBinding>,
) {
    let Some(module_node) = node.child_by_field_name("module_name") else {
        return;
    };
    let source_module = match module_node.kind() {
        "dotted_name" => match module_node.utf8_text(source_bytes) {
            Ok(text) => text.to_string(),
            Err(_) => return,
        },
        "relative_import" => {
            match resolve_relative(package, &module_node, source_bytes) {
                Some(resolved) => resolved,
                // More dots than the package has depth; not resolvable here.
                None => return,
            }
        }
        _ => return,
    };

    let mut cursor = node.walk();
    for name_node in node.children_by_field_name("name", &mut cursor) {
        match name_node.kind() {
            "dotted_name" => {
                if let Ok(name) = name_node.utf8_text(source_bytes) {
                    imports.push(ImportBinding {
                        local_name: name.to_string(),
                        source_module: source_module.clone(),
                        source_name: name.to_string(),
                    });
                }
            }
            "aliased_import" => {
                let original = name_node
                    .child_by_field_name("name")
                    .and_then(|n| n.utf8_text(source_bytes).ok());
                let alias = name_node
                    .child_by_field_name("alias")
                    .and_then(|n| n.utf8_text(source_bytes).ok());
                if let (Some(original), Some(alias)) = (original, alias) {
                    imports.push(ImportBinding {
                        local_name: alias.to_string(),
                        source_module: source_module.clone(),
                        source_name: original.to_string(),
                    });
                }
            }
            _ => {}
        }
    }
}

fn resolve_relative(package: &str, node: &Node, source_bytes: &[u8]) -> Option<String> {
    let mut dots = 0;
    let mut target: Option<String> = None;

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_prefix" => dots = child.utf8_text(source_bytes).ok()?.len(),
            "dotted_name" => target = child.utf8_text(source_bytes).ok().map(str::to_string),
            _ => {}
        }
    }

    let mut parts: Vec<&str> = if package.is_empty() {
        Vec::new()
    } else {
        package.split('.').collect()
    };
    for _ in 1..dots {
        parts.pop()?;
    }
    if let Some(target) = &target {
        parts.extend(target.split('.'));
    }
    Some(parts.join("."))
}

/// Python rebinding semantics: a later definition of the same name wins.
fn upsert_function(functions: &mut Vec<FunctionSurface>, f: FunctionSurface) {
    match functions.iter_mut().find(|existing| existing.name == f.name) {
        Some(existing) => *existing = f,
        None => functions.push(f),
    }
}

fn upsert_class(classes: &mut Vec<ClassSurface>, c: ClassSurface) {
    match classes.iter_mut().find(|existing| existing.name == c.name) {
        Some(existing) => *existing = c,
        None => classes.push(c),
    }
}

fn upsert_attribute(attributes: &mut Vec<AttributeSurface>, a: AttributeSurface) {
    match attributes.iter_mut().find(|existing| existing.name == a.name) {
        Some(existing) => *existing = a,
        None => attributes.push(a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> FileSurface {
        parse_source(source, "").unwrap()
    }

    #[test]
    fn underscore_names_are_private_without_export_list() {
        let surface = parse("def visible(): pass\ndef _hidden(): pass\n");
        let names: Vec<_> = surface.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["visible"]);
    }

    #[test]
    fn export_list_overrides_underscore_convention() {
        let surface = parse(concat!(
            "__all__ = [\"_special\"]\n",
            "def _special(): pass\n",
            "def unlisted(): pass\n",
        ));
        let names: Vec<_> = surface.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["_special"]);
    }

    #[test]
    fn parameter_kinds_follow_separators() {
        let surface = parse("def f(a, b, /, c, *, d, **extra): pass\n");
        let f = &surface.functions[0];
        let kinds: Vec<_> = f.params.iter().map(|p| (p.name.as_str(), p.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("a", ParamKind::PositionalOnly),
                ("b", ParamKind::PositionalOnly),
                ("c", ParamKind::PositionalOrKeyword),
                ("d", ParamKind::KeywordOnly),
                ("extra", ParamKind::VariadicKeyword),
            ]
        );
    }

    #[test]
    fn star_args_marks_following_params_keyword_only() {
        let surface = parse("def f(a, *rest, b=1): pass\n");
        let f = &surface.functions[0];
        assert_eq!(f.params[1].kind, ParamKind::VariadicPositional);
        assert_eq!(f.params[2].kind, ParamKind::KeywordOnly);
    }

    #[test]
    fn literal_defaults_are_captured_dynamic_ones_are_not() {
        let surface = parse("def f(a=1, b='x', c=None, d=-2, e=len('x'), g=CONST): pass\n");
        let f = &surface.functions[0];
        assert_eq!(f.params[0].default, DefaultValue::Literal("1".to_string()));
        assert_eq!(
            f.params[1].default,
            DefaultValue::Literal("\"x\"".to_string())
        );
        assert_eq!(
            f.params[2].default,
            DefaultValue::Literal("None".to_string())
        );
        assert_eq!(f.params[3].default, DefaultValue::Literal("-2".to_string()));
        assert_eq!(f.params[4].default, DefaultValue::Dynamic);
        assert_eq!(f.params[5].default, DefaultValue::Dynamic);
    }

    #[test]
    fn annotations_are_normalized_text() {
        let surface = parse("def f(a: Dict[str,  int]) -> 'User': pass\n");
        let f = &surface.functions[0];
        assert_eq!(f.params[0].annotation, Some(TypeRef::new("Dict[str,int]")));
        assert_eq!(f.returns, Some(TypeRef::new("\"User\"")));
    }

    #[test]
    fn class_surface_collects_attributes_and_methods() {
        let surface = parse(concat!(
            "class User(Base):\n",
            "    name: str\n",
            "    retries: int = 3\n",
            "    plain = 5\n",
            "    _secret: str\n",
            "    def greet(self, loud: bool = False) -> str: ...\n",
            "    def _internal(self): ...\n",
        ));
        let c = &surface.classes[0];
        assert_eq!(c.bases, vec!["Base".to_string()]);

        let attrs: Vec<_> = c.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(attrs, vec!["name", "retries", "plain"]);
        assert_eq!(c.attributes[0].default, DefaultValue::Absent);
        assert_eq!(
            c.attributes[1].default,
            DefaultValue::Literal("3".to_string())
        );
        assert!(c.attributes[2].annotation.is_none());

        let methods: Vec<_> = c.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["greet"]);
        // self is dropped from the callable surface
        assert_eq!(c.methods[0].params.len(), 1);
        assert_eq!(c.methods[0].params[0].name, "loud");
    }

    #[test]
    fn decorated_definitions_are_unwrapped() {
        let surface = parse("@cached\ndef f(a: int) -> int: ...\n");
        assert_eq!(surface.functions.len(), 1);
        assert_eq!(surface.functions[0].params.len(), 1);
    }

    #[test]
    fn nested_definitions_are_not_part_of_the_surface() {
        let surface = parse(concat!(
            "def outer():\n",
            "    def inner(): pass\n",
            "    class Hidden: pass\n",
            "    return inner\n",
        ));
        assert_eq!(surface.functions.len(), 1);
        assert!(surface.classes.is_empty());
    }

    #[test]
    fn redefinition_keeps_the_last_signature() {
        let surface = parse("def f(a): pass\ndef f(a, b): pass\n");
        assert_eq!(surface.functions.len(), 1);
        assert_eq!(surface.functions[0].params.len(), 2);
    }

    #[test]
    fn syntax_errors_are_reported_not_swallowed() {
        assert!(parse_source("def broken(:\n", "").is_err());
    }

    #[test]
    fn from_imports_become_reexport_candidates() {
        let surface = parse_source(
            "from pkg.impl import helper, Engine as Core\nfrom ._private import _hidden\n",
            "pkg",
        )
        .unwrap();
        let targets: Vec<_> = surface
            .reexports
            .iter()
            .map(|r| {
                (
                    r.local_name.as_str(),
                    r.source_module.as_str(),
                    r.source_name.as_str(),
                )
            })
            .collect();
        assert_eq!(
            targets,
            vec![
                ("helper", "pkg.impl", "helper"),
                ("Core", "pkg.impl", "Engine"),
            ]
        );
    }

    #[test]
    fn relative_import_resolution_uses_the_package_base() {
        let surface = parse_source("from ..core import run\n", "pkg.sub").unwrap();
        assert_eq!(surface.reexports[0].source_module, "pkg.core");
    }
}

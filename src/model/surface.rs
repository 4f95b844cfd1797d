use serde::{Deserialize, Serialize};

/// One extracted snapshot of a source tree's public surface.
///
/// Modules are kept sorted by name so two extractions of the same tree are
/// byte-identical regardless of how the per-file work was scheduled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Surface {
    pub modules: Vec<ModuleSurface>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSurface {
    /// Dotted module path relative to the tree root (`pkg.sub.api`).
    /// Empty for a package root `__init__.py` at the top of the tree.
    pub name: String,
    pub functions: Vec<FunctionSurface>,
    pub classes: Vec<ClassSurface>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSurface {
    pub name: String,
    /// Base classes as opaque names; never resolved.
    pub bases: Vec<String>,
    pub attributes: Vec<AttributeSurface>,
    pub methods: Vec<FunctionSurface>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSurface {
    pub name: String,
    pub params: Vec<Parameter>,
    pub returns: Option<TypeRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub kind: ParamKind,
    pub annotation: Option<TypeRef>,
    pub default: DefaultValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    PositionalOnly,
    PositionalOrKeyword,
    KeywordOnly,
    VariadicPositional,
    VariadicKeyword,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSurface {
    pub name: String,
    pub annotation: Option<TypeRef>,
    pub default: DefaultValue,
}

/// Normalized textual form of a type expression. Equality is textual; no
/// semantic type reasoning happens anywhere in the crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(String);

/// A parameter or attribute default. Non-literal defaults collapse to
/// `Dynamic` and are never evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    Absent,
    Literal(String),
    Dynamic,
}

impl Surface {
    pub fn new(modules: Vec<ModuleSurface>) -> Self {
        let mut modules = modules;
        modules.sort_by(|a, b| a.name.cmp(&b.name));
        Self { modules }
    }

    /// All top-level functions, qualified.
    pub fn functions(&self) -> impl Iterator<Item = (String, &FunctionSurface)> {
        self.modules
            .iter()
            .flat_map(|m| m.functions.iter().map(|f| (m.qualify(&f.name), f)))
    }

    /// All top-level classes, qualified.
    pub fn classes(&self) -> impl Iterator<Item = (String, &ClassSurface)> {
        self.modules
            .iter()
            .flat_map(|m| m.classes.iter().map(|c| (m.qualify(&c.name), c)))
    }

    pub fn symbol_count(&self) -> usize {
        self.modules
            .iter()
            .map(|m| m.functions.len() + m.classes.len())
            .sum()
    }
}

impl ModuleSurface {
    pub fn new(name: String) -> Self {
        Self {
            name,
            functions: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn qualify(&self, symbol: &str) -> String {
        if self.name.is_empty() {
            symbol.to_string()
        } else {
            format!("{}.{}", self.name, symbol)
        }
    }
}

impl Parameter {
    /// A call site can omit this parameter: it has a default or is variadic.
    pub fn is_optional(&self) -> bool {
        self.default.is_present()
            || matches!(
                self.kind,
                ParamKind::VariadicPositional | ParamKind::VariadicKeyword
            )
    }

    /// Participates in positional call matching.
    pub fn is_positional(&self) -> bool {
        matches!(
            self.kind,
            ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword
        )
    }
}

impl DefaultValue {
    pub fn is_present(&self) -> bool {
        !matches!(self, DefaultValue::Absent)
    }

    /// Rendering for change records; `Absent` renders as nothing.
    pub fn render(&self) -> Option<String> {
        match self {
            DefaultValue::Absent => None,
            DefaultValue::Literal(text) => Some(text.clone()),
            DefaultValue::Dynamic => Some("<dynamic>".to_string()),
        }
    }
}

impl TypeRef {
    /// Capture a raw annotation expression as normalized text: single quotes
    /// become double quotes, whitespace is stripped. Nothing else.
    pub fn new(raw: &str) -> Self {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == '\'' { '"' } else { c })
            .collect();
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

use serde::{Deserialize, Serialize};

/// One atomic difference between two surface snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    pub path: ChangePath,
    /// Rendered old value, where the kind has one (type text, default text,
    /// parameter order).
    pub previous: Option<String>,
    /// Rendered new value.
    pub new: Option<String>,
}

/// Location of a change: the qualified symbol plus, for parameter and
/// attribute level changes, the member name inside it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChangePath {
    pub symbol: String,
    pub member: Option<String>,
}

/// Every change the differ can emit. Variant order is the tie-break order for
/// records at the same path, so output stays deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    FunctionRemoved,
    FunctionAdded,
    ClassRemoved,
    ClassAdded,
    MethodRemoved,
    MethodAdded,
    ParameterRemoved,
    RequiredParameterAdded,
    OptionalParameterAdded,
    ParameterTypeChanged,
    ParametersReordered,
    ReturnTypeChanged,
    AttributeRemoved,
    AttributeAdded,
    AttributeTypeChanged,
    DefaultRemoved,
    DefaultAdded,
    DefaultChanged,
    AnnotationAdded,
    AnnotationRemoved,
}

impl ChangePath {
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            member: None,
        }
    }

    pub fn member(symbol: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            member: Some(member.into()),
        }
    }
}

impl std::fmt::Display for ChangePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.member {
            Some(member) => write!(f, "{}.{}", self.symbol, member),
            None => write!(f, "{}", self.symbol),
        }
    }
}

impl ChangeRecord {
    pub fn new(
        kind: ChangeKind,
        path: ChangePath,
        previous: Option<String>,
        new: Option<String>,
    ) -> Self {
        Self {
            kind,
            path,
            previous,
            new,
        }
    }

    /// Human-readable one-liner for table and SARIF output.
    pub fn describe(&self) -> String {
        let symbol = &self.path.symbol;
        let member = self.path.member.as_deref().unwrap_or("");
        let prev = self.previous.as_deref().unwrap_or("");
        let new = self.new.as_deref().unwrap_or("");

        match self.kind {
            ChangeKind::FunctionRemoved => format!("Removed: {}", symbol),
            ChangeKind::FunctionAdded => format!("Added: {}", symbol),
            ChangeKind::ClassRemoved => format!("Removed: {}", symbol),
            ChangeKind::ClassAdded => format!("Added: {}", symbol),
            ChangeKind::MethodRemoved => {
                let (owner, name) = split_owner(symbol);
                format!("Method '{}' removed from {}", name, owner)
            }
            ChangeKind::MethodAdded => {
                let (owner, name) = split_owner(symbol);
                format!("Method '{}' added to {}", name, owner)
            }
            ChangeKind::ParameterRemoved => {
                format!("Parameter '{}' removed from {}", member, symbol)
            }
            ChangeKind::RequiredParameterAdded => {
                format!("Parameter '{}' added to {} (REQUIRED)", member, symbol)
            }
            ChangeKind::OptionalParameterAdded => {
                format!("Parameter '{}' added to {} (optional)", member, symbol)
            }
            ChangeKind::ParameterTypeChanged => {
                format!("Type of '{}': {} -> {}", member, prev, new)
            }
            ChangeKind::ParametersReordered => {
                format!("Positional order of {}: {} -> {}", symbol, prev, new)
            }
            ChangeKind::ReturnTypeChanged => format!("Return: {} -> {}", prev, new),
            ChangeKind::AttributeRemoved => {
                format!("Attribute '{}' removed from {}", member, symbol)
            }
            ChangeKind::AttributeAdded => format!("Attribute '{}' added to {}", member, symbol),
            ChangeKind::AttributeTypeChanged => {
                format!("Type of attribute '{}': {} -> {}", member, prev, new)
            }
            ChangeKind::DefaultRemoved => {
                format!("Default of '{}' removed (now required)", target(member, "return"))
            }
            ChangeKind::DefaultAdded => {
                format!("Default of '{}' added (now optional)", target(member, "return"))
            }
            ChangeKind::DefaultChanged => {
                format!("Default of '{}' changed: {} -> {}", target(member, "return"), prev, new)
            }
            ChangeKind::AnnotationAdded => {
                format!("Annotation added to '{}': {}", target(member, "return"), new)
            }
            ChangeKind::AnnotationRemoved => {
                format!("Annotation removed from '{}': {}", target(member, "return"), prev)
            }
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            ChangeKind::FunctionRemoved => "function_removed",
            ChangeKind::FunctionAdded => "function_added",
            ChangeKind::ClassRemoved => "class_removed",
            ChangeKind::ClassAdded => "class_added",
            ChangeKind::MethodRemoved => "method_removed",
            ChangeKind::MethodAdded => "method_added",
            ChangeKind::ParameterRemoved => "parameter_removed",
            ChangeKind::RequiredParameterAdded => "required_parameter_added",
            ChangeKind::OptionalParameterAdded => "optional_parameter_added",
            ChangeKind::ParameterTypeChanged => "parameter_type_changed",
            ChangeKind::ParametersReordered => "parameters_reordered",
            ChangeKind::ReturnTypeChanged => "return_type_changed",
            ChangeKind::AttributeRemoved => "attribute_removed",
            ChangeKind::AttributeAdded => "attribute_added",
            ChangeKind::AttributeTypeChanged => "attribute_type_changed",
            ChangeKind::DefaultRemoved => "default_removed",
            ChangeKind::DefaultAdded => "default_added",
            ChangeKind::DefaultChanged => "default_changed",
            ChangeKind::AnnotationAdded => "annotation_added",
            ChangeKind::AnnotationRemoved => "annotation_removed",
        };
        write!(f, "{}", tag)
    }
}

fn split_owner(symbol: &str) -> (&str, &str) {
    match symbol.rsplit_once('.') {
        Some((owner, name)) => (owner, name),
        None => ("", symbol),
    }
}

fn target<'a>(member: &'a str, fallback: &'a str) -> &'a str {
    if member.is_empty() { fallback } else { member }
}

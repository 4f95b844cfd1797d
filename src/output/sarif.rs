//! SARIF v2.1.0 output for code-scanning integrations.

use crate::classify;
use crate::model::Severity;
use crate::output::{CompareReport, OutputFormatter};
use serde_json::json;
use std::collections::BTreeMap;
use std::io::Write;

const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json";

pub struct SarifOutput;

impl SarifOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SarifOutput {
    fn default() -> Self {
        Self::new()
    }
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Major => "error",
        Severity::Minor => "warning",
        Severity::Patch | Severity::None => "note",
    }
}

/// `parameter_removed` -> `Parameter Removed`
fn rule_title(kind_tag: &str) -> String {
    kind_tag
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl OutputFormatter for SarifOutput {
    fn format<W: Write>(&self, report: &CompareReport, writer: &mut W) -> std::io::Result<()> {
        // One rule per change kind, keyed for deterministic ordering.
        let mut rules: BTreeMap<String, serde_json::Value> = BTreeMap::new();
        let mut results = Vec::new();

        for change in &report.changes {
            let rule_id = change.kind.to_string();
            let level = sarif_level(classify::severity_of(change.kind));

            rules.entry(rule_id.clone()).or_insert_with(|| {
                json!({
                    "id": rule_id,
                    "shortDescription": { "text": rule_title(&rule_id) },
                    "defaultConfiguration": { "level": level },
                })
            });

            results.push(json!({
                "ruleId": rule_id,
                "level": level,
                "message": {
                    "text": format!("{}: {} — {}", change.kind, change.path, change.describe())
                },
                "locations": [{
                    "logicalLocations": [{
                        "fullyQualifiedName": change.path.to_string()
                    }]
                }]
            }));
        }

        let sarif = json!({
            "$schema": SARIF_SCHEMA,
            "version": "2.1.0",
            "runs": [{
                "tool": {
                    "driver": {
                        "name": "apigate",
                        "version": env!("CARGO_PKG_VERSION"),
                        "informationUri": env!("CARGO_PKG_REPOSITORY"),
                        "rules": rules.into_values().collect::<Vec<_>>(),
                    }
                },
                "results": results,
            }]
        });

        let json = serde_json::to_string_pretty(&sarif)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{}", json)
    }
}

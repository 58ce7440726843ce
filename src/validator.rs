//! Structural validation of translated locales.
//!
//! A translation may change leaf text but must keep every key path of the
//! source and add none. Findings are reported, never enforced: the caller
//! decides whether to log or reject.

use crate::codec::{leaf_paths, KeyPath};
use serde_json::Value;
use std::collections::HashSet;

/// Validation report containing errors and warnings about a translation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// Key paths missing from or added by the translation
    pub errors: Vec<String>,

    /// Leaves whose JSON type changed
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

pub struct StructureValidator;

impl StructureValidator {
    /// Compare the key paths and leaf types of `source` and `translated`.
    ///
    /// Paths are compared segment by segment, so a nested key and a key that
    /// merely contains `.` never match each other.
    pub fn validate(source: &Value, translated: &Value) -> ValidationReport {
        let mut report = ValidationReport::new();

        let source_paths = leaf_paths(source);
        let translated_paths = leaf_paths(translated);
        let source_set: HashSet<&KeyPath> = source_paths.iter().collect();
        let translated_set: HashSet<&KeyPath> = translated_paths.iter().collect();

        for path in source_paths.iter().filter(|p| !translated_set.contains(p)) {
            report.errors.push(format!("Missing key path: {}", display_path(path)));
        }
        for path in translated_paths.iter().filter(|p| !source_set.contains(p)) {
            report
                .errors
                .push(format!("Unexpected key path: {}", display_path(path)));
        }

        for path in source_paths.iter().filter(|p| translated_set.contains(p)) {
            let (Some(before), Some(after)) = (path.resolve(source), path.resolve(translated))
            else {
                continue;
            };
            if kind(before) != kind(after) {
                report.warnings.push(format!(
                    "Type changed at {}: {} -> {}",
                    display_path(path),
                    kind(before),
                    kind(after)
                ));
            }
        }

        report
    }
}

fn display_path(path: &KeyPath) -> String {
    if path.is_root() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

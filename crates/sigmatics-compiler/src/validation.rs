//! Structural descriptor checks
//!
//! Unlike compilation, validation never stops at the first problem: every
//! finding is collected so a caller can report them together.

use crate::fuser::Complexity;
use crate::ir::OverflowMode;
use crate::model::ModelDescriptor;
use std::collections::HashSet;

/// Outcome of [`validate_descriptor`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check a descriptor without compiling it
pub fn validate_descriptor(descriptor: &ModelDescriptor) -> ValidationReport {
    let mut errors = Vec::new();

    if descriptor.name.trim().is_empty() {
        errors.push("name must not be empty".to_string());
    }
    if descriptor.namespace.trim().is_empty() {
        errors.push("namespace must not be empty".to_string());
    }
    if !is_semver(&descriptor.version) {
        errors.push(format!(
            "version {:?} is not MAJOR.MINOR.PATCH",
            descriptor.version
        ));
    }

    if let Some(hint) = &descriptor.complexity_hint {
        if let Err(err) = hint.parse::<Complexity>() {
            errors.push(err.to_string());
        }
    }

    let mut seen = HashSet::new();
    for name in &descriptor.runtime_params {
        if name.trim().is_empty() {
            errors.push("runtime parameter names must not be empty".to_string());
        } else if !seen.insert(name.as_str()) {
            errors.push(format!("duplicate runtime parameter: {name}"));
        }
    }

    if let Some(value) = descriptor.compiled_params.get("overflow") {
        if serde_json::from_value::<OverflowMode>(value.clone()).is_err() {
            errors.push(format!("overflow must be \"drop\" or \"track\", got {value}"));
        }
    }

    if !errors.is_empty() {
        tracing::debug!(model = %descriptor.name, count = errors.len(), "descriptor validation failed");
    }
    ValidationReport::from_errors(errors)
}

fn is_semver(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

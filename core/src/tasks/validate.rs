/**
 * Formal-grammar gate. The bundled schema describes the parsed tree shape of
 * a Task document; any XML text can be checked before it is trusted. Every
 * violation is reported, never just the first.
 */
use crate::tasks::decode::parse_tree;
use crate::tasks::error::TaskError;
use jsonschema::{Draft, Validator};
use log::error;
use serde_json::Value;
use std::sync::OnceLock;

const TASK_SCHEMA: &str = include_str!("../../schemas/task.schema.json");

static VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();

/// Compiled once per process. Readers only after initialization.
fn validator() -> Result<&'static Validator, TaskError> {
    let compiled = VALIDATOR.get_or_init(|| {
        let schema: Value =
            serde_json::from_str(TASK_SCHEMA).map_err(|err| err.to_string())?;
        jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .map_err(|err| err.to_string())
    });
    match compiled {
        Ok(validator) => Ok(validator),
        Err(err) => {
            error!("[tasks] Bundled task schema failed to compile: {err}");
            Err(TaskError::Schema)
        }
    }
}

/// Validate task XML text, collecting every schema violation.
pub fn validate(xml: &str) -> Result<(), TaskError> {
    let tree = parse_tree(xml)?;
    if tree.get("Task").is_none() {
        return Err(TaskError::InvalidStructure);
    }

    let violations: Vec<String> = validator()?
        .iter_errors(&tree)
        .map(|violation| {
            let path = violation.instance_path.to_string();
            if path.is_empty() {
                violation.to_string()
            } else {
                format!("{path}: {violation}")
            }
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(TaskError::SchemaViolations(violations))
    }
}

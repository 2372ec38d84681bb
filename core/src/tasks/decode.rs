/**
 * Decode Scheduled Task XML into the typed document model.
 *
 * The raw text is first parsed into a generic attribute-aware tree (element
 * names as keys, attributes under `$`), then each schema section is decoded
 * by its own routine under `schemas/`. Two policies share the code path:
 * lenient (malformed values are dropped, incomplete entries are skipped) and
 * strict (the first malformed field fails the decode).
 */
use crate::tasks::error::TaskError;
use crate::tasks::schemas::{actions, principals, registration, settings, triggers};
use crate::tasks::values::{self, CoerceError};
use common::tasks::{OneOrMany, Task};
use log::{error, warn};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde_json::{Map, Value};
use xml2json_rs::JsonConfig;

#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Fail on malformed fields instead of dropping them.
    pub strict: bool,
}

/// Decode task XML with the default lenient policy.
pub fn decode(xml: &str) -> Result<Task, TaskError> {
    decode_with(xml, &DecodeOptions::default())
}

pub fn decode_with(xml: &str, options: &DecodeOptions) -> Result<Task, TaskError> {
    let tree = parse_tree(xml)?;
    let task_node = match tree.get("Task").and_then(|node| node.as_object()) {
        Some(node) => node,
        None => {
            error!("[tasks] XML input has no Task document element");
            return Err(TaskError::InvalidStructure);
        }
    };

    let ctx = DecodeContext {
        strict: options.strict,
    };
    let mut task = Task::default();

    task.registration_info =
        registration::decode_registration_info(&ctx, task_node.get("RegistrationInfo"))?;
    task.triggers = triggers::decode_triggers(&ctx, task_node.get("Triggers"))?;
    task.settings = settings::decode_settings(&ctx, task_node.get("Settings"))?;
    task.principals = principals::decode_principals(&ctx, task_node.get("Principals"))?;
    task.data = task_node.get("Data").cloned();
    if let Some(decoded) = actions::decode_actions(&ctx, task_node.get("Actions"))? {
        task.actions = decoded;
    }

    Ok(task)
}

/// Parse XML text into a generic serde value tree.
pub(crate) fn parse_tree(xml: &str) -> Result<Value, TaskError> {
    if xml.trim().is_empty() {
        return Err(TaskError::EmptyInput);
    }
    well_formed(xml)?;

    let builder = JsonConfig::new().explicit_array(false).finalize();
    match builder.build_from_xml(xml) {
        Ok(tree) => Ok(tree),
        Err(err) => {
            error!("[tasks] Could not parse XML input: {err:?}");
            Err(TaskError::InvalidXml(err.to_string()))
        }
    }
}

/// The tree builder tolerates truncated documents, so well-formedness is
/// checked with a full event scan first.
fn well_formed(xml: &str) -> Result<(), TaskError> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0_i32;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                error!("[tasks] Malformed XML input: {err:?}");
                return Err(TaskError::InvalidXml(err.to_string()));
            }
        }
    }
    if depth != 0 {
        error!("[tasks] XML input ends with {depth} unterminated element(s)");
        return Err(TaskError::InvalidXml(String::from(
            "unterminated document element",
        )));
    }
    Ok(())
}

/// Read an attribute from a node's `$` map.
pub(crate) fn attribute<'a>(map: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    map.get("$").and_then(|attrs| attrs.get(name))
}

/// Carries the decode policy into the per-section routines.
pub(crate) struct DecodeContext {
    pub(crate) strict: bool,
}

impl DecodeContext {
    pub(crate) fn string(
        &self,
        value: Option<&Value>,
        field: &str,
    ) -> Result<Option<String>, TaskError> {
        let Some(value) = value else {
            return Ok(None);
        };
        match values::as_string(value) {
            Ok(result) => Ok(Some(result)),
            Err(err) => self.fail_or_drop(field, err),
        }
    }

    pub(crate) fn boolean(
        &self,
        value: Option<&Value>,
        field: &str,
    ) -> Result<Option<bool>, TaskError> {
        let Some(value) = value else {
            return Ok(None);
        };
        match values::as_bool(value) {
            Ok(result) => Ok(Some(result)),
            Err(err) => self.fail_or_drop(field, err),
        }
    }

    pub(crate) fn integer(
        &self,
        value: Option<&Value>,
        field: &str,
        min: i64,
        max: i64,
    ) -> Result<Option<i64>, TaskError> {
        let Some(value) = value else {
            return Ok(None);
        };
        match values::as_integer(value, min, max) {
            Ok(result) => Ok(Some(result)),
            Err(err) => self.fail_or_drop(field, err),
        }
    }

    pub(crate) fn enum_value<T>(
        &self,
        value: Option<&Value>,
        field: &str,
        from_name: fn(&str) -> Option<T>,
        allowed: &'static [&'static str],
    ) -> Result<Option<T>, TaskError> {
        let Some(value) = value else {
            return Ok(None);
        };
        match values::as_enum(value, from_name, allowed) {
            Ok(result) => Ok(Some(result)),
            Err(err) => self.fail_or_drop(field, err),
        }
    }

    /// A section or entry node. An empty element counts as absent; anything
    /// else but an object is unusable.
    pub(crate) fn object<'a>(
        &self,
        value: Option<&'a Value>,
        field: &str,
    ) -> Result<Option<&'a Map<String, Value>>, TaskError> {
        let Some(value) = value else {
            return Ok(None);
        };
        if values::is_blank(value) {
            return Ok(None);
        }
        match value.as_object() {
            Some(map) => Ok(Some(map)),
            None => self.fail_or_drop(
                field,
                CoerceError::Mismatch {
                    expected: "object",
                    found: values::value_kind(value),
                },
            ),
        }
    }

    /// Stringify every element of a singular-or-repeated node.
    pub(crate) fn string_list(
        &self,
        value: Option<&Value>,
        field: &str,
    ) -> Result<Vec<String>, TaskError> {
        let mut result = Vec::new();
        for item in values::to_array(value) {
            match values::as_string(item) {
                Ok(text) => result.push(text),
                Err(err) => {
                    self.fail_or_drop::<String>(field, err)?;
                }
            }
        }
        Ok(result)
    }

    pub(crate) fn string_one_or_many(
        &self,
        value: Option<&Value>,
        field: &str,
    ) -> Result<Option<OneOrMany<String>>, TaskError> {
        Ok(OneOrMany::from_vec(self.string_list(value, field)?))
    }

    /// Required field absent: strict fails, lenient drops the whole entry.
    pub(crate) fn missing<T>(&self, field: &str) -> Result<Option<T>, TaskError> {
        if self.strict {
            return Err(TaskError::MissingField {
                field: field.to_string(),
            });
        }
        warn!("[tasks] Dropping entry missing required {field}");
        Ok(None)
    }

    fn fail_or_drop<T>(&self, field: &str, err: CoerceError) -> Result<Option<T>, TaskError> {
        if self.strict {
            return Err(coerce_failure(field, err));
        }
        warn!("[tasks] Dropping malformed value for {field}: {err:?}");
        Ok(None)
    }
}

fn coerce_failure(field: &str, err: CoerceError) -> TaskError {
    match err {
        CoerceError::Mismatch { found, .. } => TaskError::TypeMismatch {
            field: field.to_string(),
            found,
        },
        CoerceError::OutOfRange { value, min, max } => TaskError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        },
        CoerceError::UnknownVariant { value, allowed } => TaskError::InvalidEnum {
            field: field.to_string(),
            value,
            allowed,
        },
    }
}

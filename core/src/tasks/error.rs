use std::fmt;

#[derive(Debug, PartialEq)]
pub enum TaskError {
    EmptyInput,
    InvalidXml(String),
    InvalidStructure,
    TypeMismatch {
        field: String,
        found: &'static str,
    },
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },
    InvalidEnum {
        field: String,
        value: String,
        allowed: &'static [&'static str],
    },
    MissingField {
        field: String,
    },
    SchemaViolations(Vec<String>),
    Schema,
    InvalidPatch(String),
    MissingName,
    NoActions,
    NoTriggers,
    NoTaskLoaded,
    Serialize,
    Encode,
}

impl std::error::Error for TaskError {}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::EmptyInput => write!(f, "Task XML input is empty"),
            TaskError::InvalidXml(message) => {
                write!(f, "Could not parse task XML: {message}")
            }
            TaskError::InvalidStructure => write!(f, "Missing root Task element"),
            TaskError::TypeMismatch { field, found } => {
                write!(f, "Unexpected {found} value for {field}")
            }
            TaskError::OutOfRange {
                field,
                value,
                min,
                max,
            } => {
                write!(f, "Value {value} for {field} outside range {min}..={max}")
            }
            TaskError::InvalidEnum {
                field,
                value,
                allowed,
            } => {
                write!(
                    f,
                    "Value {value} for {field} not one of: {}",
                    allowed.join(", ")
                )
            }
            TaskError::MissingField { field } => {
                write!(f, "Required field {field} is missing")
            }
            TaskError::SchemaViolations(violations) => {
                write!(
                    f,
                    "Task XML failed schema validation:\n{}",
                    violations.join("\n")
                )
            }
            TaskError::Schema => write!(f, "Bundled task schema could not be compiled"),
            TaskError::InvalidPatch(message) => {
                write!(f, "Patch does not fit the task document shape: {message}")
            }
            TaskError::MissingName => write!(f, "Task name is required"),
            TaskError::NoActions => write!(f, "At least one action is required"),
            TaskError::NoTriggers => write!(f, "At least one trigger is required"),
            TaskError::NoTaskLoaded => write!(f, "No task loaded"),
            TaskError::Serialize => write!(f, "Failed to serialize task document"),
            TaskError::Encode => write!(f, "Failed to write task XML"),
        }
    }
}

/**
 * Coercions from the loosely-typed parsed XML tree to strict scalar values.
 * Leaf text arrives as strings, merge patches may carry real JSON numbers and
 * booleans, so every coercion accepts both forms. All functions are pure;
 * policy (drop vs fail) is applied by the decode layer.
 */
use serde_json::Value;

#[derive(Debug, PartialEq)]
pub(crate) enum CoerceError {
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
    OutOfRange {
        value: i64,
        min: i64,
        max: i64,
    },
    UnknownVariant {
        value: String,
        allowed: &'static [&'static str],
    },
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Stringify scalar nodes. Containers and null do not stringify.
pub(crate) fn as_string(value: &Value) -> Result<String, CoerceError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(CoerceError::Mismatch {
            expected: "string",
            found: value_kind(other),
        }),
    }
}

/// Accepts literal booleans, 0/1 numbers and the usual boolean spellings.
pub(crate) fn as_bool(value: &Value) -> Result<bool, CoerceError> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::Number(number) => match number.as_f64() {
            Some(float) if float == 1.0 => Ok(true),
            Some(float) if float == 0.0 => Ok(false),
            _ => Err(CoerceError::Mismatch {
                expected: "boolean",
                found: "number",
            }),
        },
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(CoerceError::Mismatch {
                expected: "boolean",
                found: "string",
            }),
        },
        other => Err(CoerceError::Mismatch {
            expected: "boolean",
            found: value_kind(other),
        }),
    }
}

/// Integral numbers or numeric strings, checked against inclusive bounds.
pub(crate) fn as_integer(value: &Value, min: i64, max: i64) -> Result<i64, CoerceError> {
    let number = match value {
        Value::Number(number) => match number.as_i64() {
            Some(number) => number,
            None => {
                return Err(CoerceError::Mismatch {
                    expected: "integer",
                    found: "number",
                });
            }
        },
        Value::String(text) => match text.trim().parse::<i64>() {
            Ok(number) => number,
            Err(_) => {
                return Err(CoerceError::Mismatch {
                    expected: "integer",
                    found: "string",
                });
            }
        },
        other => {
            return Err(CoerceError::Mismatch {
                expected: "integer",
                found: value_kind(other),
            });
        }
    };

    if number < min || number > max {
        return Err(CoerceError::OutOfRange {
            value: number,
            min,
            max,
        });
    }
    Ok(number)
}

/// Exact, case-sensitive match against a closed name set.
pub(crate) fn as_enum<T>(
    value: &Value,
    from_name: fn(&str) -> Option<T>,
    allowed: &'static [&'static str],
) -> Result<T, CoerceError> {
    let name = match value.as_str() {
        Some(name) => name,
        None => {
            return Err(CoerceError::UnknownVariant {
                value: value_kind(value).to_string(),
                allowed,
            });
        }
    };

    match from_name(name) {
        Some(variant) => Ok(variant),
        None => Err(CoerceError::UnknownVariant {
            value: name.to_string(),
            allowed,
        }),
    }
}

/// Normalize a node that may be absent, a single value or a list into a list.
pub(crate) fn to_array(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(values)) => values.iter().collect(),
        Some(value) => vec![value],
    }
}

/// Empty elements parse as empty text. Treated everywhere as absence.
pub(crate) fn is_blank(value: &Value) -> bool {
    matches!(value, Value::String(text) if text.trim().is_empty())
}

/// Remove null entries from every object in the tree. Unset never reaches the wire.
pub(crate) fn compact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, entry| !entry.is_null());
            for entry in map.values_mut() {
                compact(entry);
            }
        }
        Value::Array(entries) => {
            for entry in entries {
                compact(entry);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::{CoerceError, as_bool, as_enum, as_integer, as_string, compact, to_array};
    use common::tasks::{LogonType, OneOrMany};
    use serde_json::{Value, json};

    #[test]
    fn test_as_string() {
        assert_eq!(as_string(&json!("run")).unwrap(), "run");
        assert_eq!(as_string(&json!(7)).unwrap(), "7");
        assert_eq!(as_string(&json!(true)).unwrap(), "true");
        assert_eq!(
            as_string(&json!({})).unwrap_err(),
            CoerceError::Mismatch {
                expected: "string",
                found: "object"
            }
        );
    }

    #[test]
    fn test_as_bool() {
        assert!(as_bool(&json!(true)).unwrap());
        assert!(as_bool(&json!(1)).unwrap());
        assert!(!as_bool(&json!(0)).unwrap());
        assert!(as_bool(&json!("true")).unwrap());
        assert!(as_bool(&json!(" TRUE ")).unwrap());
        assert!(!as_bool(&json!("0")).unwrap());
        assert!(as_bool(&json!("yes")).is_err());
        assert!(as_bool(&json!(2)).is_err());
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(as_integer(&json!(7), 0, 10).unwrap(), 7);
        assert_eq!(as_integer(&json!("7"), 0, 10).unwrap(), 7);
        assert_eq!(
            as_integer(&json!(11), 0, 10).unwrap_err(),
            CoerceError::OutOfRange {
                value: 11,
                min: 0,
                max: 10
            }
        );
        assert!(as_integer(&json!("seven"), 0, 10).is_err());
        assert!(as_integer(&json!(1.5), 0, 10).is_err());
    }

    #[test]
    fn test_as_enum() {
        let logon = as_enum(&json!("S4U"), LogonType::from_name, LogonType::VALUES).unwrap();
        assert_eq!(logon, LogonType::S4U);

        let bad = as_enum(&json!("s4u"), LogonType::from_name, LogonType::VALUES).unwrap_err();
        assert_eq!(
            bad,
            CoerceError::UnknownVariant {
                value: String::from("s4u"),
                allowed: LogonType::VALUES
            }
        );
    }

    #[test]
    fn test_to_array() {
        assert!(to_array(None).is_empty());
        assert!(to_array(Some(&Value::Null)).is_empty());
        assert_eq!(to_array(Some(&json!("one"))).len(), 1);
        assert_eq!(to_array(Some(&json!(["one", "two"]))).len(), 2);
    }

    #[test]
    fn test_to_array_singular_equals_one_element_list() {
        let bare = json!("notepad.exe");
        let listed = json!(["notepad.exe"]);
        assert_eq!(to_array(Some(&bare)), to_array(Some(&listed)));

        assert_eq!(
            OneOrMany::from_vec(vec![String::from("notepad.exe")]),
            Some(OneOrMany::One(String::from("notepad.exe")))
        );
        assert_eq!(
            OneOrMany::from_vec(vec![String::from("a"), String::from("b")]),
            Some(OneOrMany::Many(vec![String::from("a"), String::from("b")]))
        );
        assert_eq!(OneOrMany::<String>::from_vec(Vec::new()), None);
    }

    #[test]
    fn test_compact_removes_nulls() {
        let mut value = json!({"keep": "x", "drop": null, "nested": {"also": null, "kept": 1}});
        compact(&mut value);
        assert_eq!(value, json!({"keep": "x", "nested": {"kept": 1}}));
    }

    #[test]
    fn test_compact_idempotent() {
        let mut value = json!({"a": {"b": ["c", {"d": null}]}});
        compact(&mut value);
        let once = value.clone();
        compact(&mut value);
        assert_eq!(value, once);
    }
}

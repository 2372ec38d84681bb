/**
 * Deep merge of a partial patch onto a Task. Patches are written against the
 * document's wire-face JSON shape. Objects merge recursively, arrays replace
 * wholesale, and a null patch value removes the key entirely.
 */
use crate::tasks::error::TaskError;
use crate::tasks::values;
use common::tasks::Task;
use log::error;
use serde_json::Value;

/// Apply a patch to a copy of the task. The original is never touched.
pub fn merge_task(task: &Task, patch: &Value) -> Result<Task, TaskError> {
    let mut face = match serde_json::to_value(task) {
        Ok(face) => face,
        Err(err) => {
            error!("[tasks] Could not serialize task for merge: {err:?}");
            return Err(TaskError::Serialize);
        }
    };

    merge_value(&mut face, patch);
    values::compact(&mut face);

    match serde_json::from_value(face) {
        Ok(merged) => Ok(merged),
        Err(err) => Err(TaskError::InvalidPatch(err.to_string())),
    }
}

fn merge_value(original: &mut Value, patch: &Value) {
    match (original, patch) {
        (Value::Object(original_map), Value::Object(patch_map)) => {
            for (key, patch_entry) in patch_map {
                if patch_entry.is_null() {
                    original_map.remove(key);
                    continue;
                }
                match original_map.get_mut(key) {
                    Some(original_entry)
                        if original_entry.is_object() && patch_entry.is_object() =>
                    {
                        merge_value(original_entry, patch_entry);
                    }
                    _ => {
                        original_map.insert(key.clone(), patch_entry.clone());
                    }
                }
            }
        }
        (original, patch) => *original = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::merge_task;
    use crate::tasks::decode::decode;
    use crate::tasks::error::TaskError;
    use serde_json::json;

    const BASE: &str = "<Task><RegistrationInfo><URI>\\Foo</URI><Description>Y</Description></RegistrationInfo><Triggers><TimeTrigger><StartBoundary>2024-01-01T09:00:00</StartBoundary></TimeTrigger></Triggers><Actions><Exec><Command>notepad.exe</Command></Exec></Actions></Task>";

    #[test]
    fn test_merge_overrides_one_sibling_field() {
        let task = decode(BASE).unwrap();
        let merged = merge_task(
            &task,
            &json!({"RegistrationInfo": {"Description": "X"}}),
        )
        .unwrap();
        let info = merged.registration_info.unwrap();
        assert_eq!(info.uri.as_deref(), Some("\\Foo"));
        assert_eq!(info.description.as_deref(), Some("X"));
    }

    #[test]
    fn test_merge_arrays_replace_entirely() {
        let task = decode(BASE).unwrap();
        let merged = merge_task(
            &task,
            &json!({"Triggers": {"TimeTrigger": [
                {"StartBoundary": "2025-06-01T06:00:00"},
                {"StartBoundary": "2025-06-02T06:00:00"}
            ]}}),
        )
        .unwrap();
        let triggers = merged.triggers.unwrap();
        assert_eq!(triggers.time.len(), 2);
        assert_eq!(
            triggers.time[0].base.start_boundary.as_deref(),
            Some("2025-06-01T06:00:00")
        );
    }

    #[test]
    fn test_merge_null_removes_key() {
        let task = decode(BASE).unwrap();
        let merged = merge_task(
            &task,
            &json!({"RegistrationInfo": {"Description": null}}),
        )
        .unwrap();
        let info = merged.registration_info.unwrap();
        assert_eq!(info.description, None);
        assert_eq!(info.uri.as_deref(), Some("\\Foo"));
    }

    #[test]
    fn test_merge_does_not_mutate_original() {
        let task = decode(BASE).unwrap();
        let before = task.clone();
        let _ = merge_task(&task, &json!({"RegistrationInfo": {"Description": "X"}})).unwrap();
        assert_eq!(task, before);
    }

    #[test]
    fn test_merge_shape_breaking_patch_fails() {
        let task = decode(BASE).unwrap();
        let result = merge_task(&task, &json!({"Actions": "nonsense"}));
        assert!(matches!(result.unwrap_err(), TaskError::InvalidPatch(_)));
    }

    #[test]
    fn test_merge_adds_new_section() {
        let task = decode(BASE).unwrap();
        let merged = merge_task(&task, &json!({"Settings": {"Hidden": true}})).unwrap();
        assert_eq!(merged.settings.unwrap().hidden, Some(true));
    }
}

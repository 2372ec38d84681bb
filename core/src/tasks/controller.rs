/**
 * Stateful wrapper over one Task document. Every mutation is validated
 * before it is committed, so the held task is always schema-clean and a
 * failed update leaves it untouched.
 */
use crate::tasks::decode::{DecodeOptions, decode_with};
use crate::tasks::encode::{EncodePolicy, encode, encode_with};
use crate::tasks::error::TaskError;
use crate::tasks::merge::merge_task;
use crate::tasks::validate::validate;
use common::tasks::Task;
use serde_json::Value;

#[derive(Debug, Default)]
pub struct TaskController {
    task: Option<Task>,
}

impl TaskController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from XML text. The text must pass schema validation and the
    /// strict decode, otherwise nothing is loaded.
    pub fn from_xml(xml: &str) -> Result<Self, TaskError> {
        validate(xml)?;
        let task = decode_with(xml, &DecodeOptions { strict: true })?;
        Ok(Self { task: Some(task) })
    }

    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    /// Replace the held task. Rejected if the candidate does not survive an
    /// encode-then-validate pass.
    pub fn set_task(&mut self, task: Task) -> Result<(), TaskError> {
        let xml = encode(&task)?;
        validate(&xml)?;
        self.task = Some(task);
        Ok(())
    }

    /// Deep-merge a patch onto the held task and commit only if the result
    /// still validates.
    pub fn update(&mut self, patch: &Value) -> Result<(), TaskError> {
        let Some(current) = &self.task else {
            return Err(TaskError::NoTaskLoaded);
        };
        let merged = merge_task(current, patch)?;
        let xml = encode(&merged)?;
        validate(&xml)?;
        self.task = Some(merged);
        Ok(())
    }

    pub fn to_xml(&self) -> Result<String, TaskError> {
        self.to_xml_with(EncodePolicy::Passthrough)
    }

    pub fn to_xml_with(&self, policy: EncodePolicy) -> Result<String, TaskError> {
        let Some(task) = &self.task else {
            return Err(TaskError::NoTaskLoaded);
        };
        encode_with(task, policy)
    }
}

#[cfg(test)]
mod tests {
    use super::TaskController;
    use crate::tasks::error::TaskError;
    use serde_json::json;

    const BASE: &str = "<Task><RegistrationInfo><URI>\\Ops\\Report</URI></RegistrationInfo><Triggers><LogonTrigger><UserId>alice</UserId></LogonTrigger></Triggers><Actions><Exec><Command>report.exe</Command></Exec></Actions></Task>";

    #[test]
    fn test_from_xml_loads_valid_task() {
        let controller = TaskController::from_xml(BASE).unwrap();
        let task = controller.task().unwrap();
        assert_eq!(
            task.registration_info.as_ref().unwrap().uri.as_deref(),
            Some("\\Ops\\Report")
        );
    }

    #[test]
    fn test_from_xml_accepts_empty_sections() {
        let xml = "<Task><RegistrationInfo/><Triggers><LogonTrigger><UserId>alice</UserId></LogonTrigger></Triggers><Actions><Exec><Command>notepad.exe</Command></Exec></Actions></Task>";
        let controller = TaskController::from_xml(xml).unwrap();
        let task = controller.task().unwrap();
        assert_eq!(task.registration_info, None);
        assert_eq!(
            task.triggers.as_ref().unwrap().logon[0].user_id.as_deref(),
            Some("alice")
        );
    }

    #[test]
    fn test_from_xml_rejects_invalid_document() {
        let xml = "<Task><Triggers><LogonTrigger/></Triggers></Task>";
        assert!(matches!(
            TaskController::from_xml(xml).unwrap_err(),
            TaskError::SchemaViolations(_)
        ));
    }

    #[test]
    fn test_update_commits_valid_patch() {
        let mut controller = TaskController::from_xml(BASE).unwrap();
        controller
            .update(&json!({"Settings": {"Hidden": true}}))
            .unwrap();
        assert_eq!(
            controller.task().unwrap().settings.as_ref().unwrap().hidden,
            Some(true)
        );
    }

    #[test]
    fn test_update_failure_leaves_task_untouched() {
        let mut controller = TaskController::from_xml(BASE).unwrap();
        let before = controller.task().unwrap().clone();
        let result = controller.update(&json!({"Settings": {"Priority": 99}}));
        assert!(matches!(
            result.unwrap_err(),
            TaskError::SchemaViolations(_)
        ));
        assert_eq!(controller.task().unwrap(), &before);
    }

    #[test]
    fn test_update_without_task_fails() {
        let mut controller = TaskController::new();
        assert_eq!(
            controller.update(&json!({})).unwrap_err(),
            TaskError::NoTaskLoaded
        );
        assert_eq!(controller.to_xml().unwrap_err(), TaskError::NoTaskLoaded);
    }

    #[test]
    fn test_round_trip_through_controller() {
        let controller = TaskController::from_xml(BASE).unwrap();
        let xml = controller.to_xml().unwrap();
        let again = TaskController::from_xml(&xml).unwrap();
        assert_eq!(controller.task(), again.task());
    }
}

/**
 * Emit a typed Task back to schema-compliant XML. The declaration advertises
 * UTF-16 because the schema mandates it; the in-memory string is re-encoded
 * by the file layer when written to disk. Section order is fixed:
 * RegistrationInfo, Triggers, Principals, Settings, Data, Actions.
 */
use crate::tasks::error::TaskError;
use crate::tasks::schemas::{
    actions, principals, registration, settings, triggers, write_value,
};
use common::tasks::{Principal, Principals, TASK_NAMESPACE, TASK_VERSION, Task};
use log::error;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, Event};
use std::io;

/**
 * Two historical emission policies. `Passthrough` writes only what the
 * document holds and round-trips losslessly. `Defaulted` additionally fills
 * schtasks-safe values so sparse documents still register cleanly; the fields
 * it may inject (lossy under round-trip) are the Settings defaults
 * (instances policy, battery flags, hard terminate, start-when-available,
 * network availability, idle settings, demand start, enabled, hidden,
 * run-only-if-idle, wake-to-run, execution time limit PT72H, priority 7),
 * a `Principals` entry with id `Author`, and the Actions context `Author`.
 */
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EncodePolicy {
    #[default]
    Passthrough,
    Defaulted,
}

/// Encode with the default pass-through policy.
pub fn encode(task: &Task) -> Result<String, TaskError> {
    encode_with(task, EncodePolicy::Passthrough)
}

pub fn encode_with(task: &Task, policy: EncodePolicy) -> Result<String, TaskError> {
    match write_document(task, policy) {
        Ok(xml) => Ok(xml),
        Err(err) => {
            error!("[tasks] Could not write task XML: {err:?}");
            Err(TaskError::Encode)
        }
    }
}

fn write_document(task: &Task, policy: EncodePolicy) -> io::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-16"), None)))?;
    writer
        .create_element("Task")
        .with_attribute(("version", TASK_VERSION))
        .with_attribute(("xmlns", TASK_NAMESPACE))
        .write_inner_content(|writer| {
            if let Some(info) = &task.registration_info {
                registration::write_registration_info(writer, info)?;
            }
            if let Some(task_triggers) = &task.triggers {
                triggers::write_triggers(writer, task_triggers)?;
            }
            match (&task.principals, policy) {
                (Some(task_principals), _) => {
                    principals::write_principals(writer, task_principals)?;
                }
                (None, EncodePolicy::Defaulted) => {
                    principals::write_principals(writer, &default_principals())?;
                }
                (None, EncodePolicy::Passthrough) => {}
            }
            match (&task.settings, policy) {
                (_, EncodePolicy::Defaulted) => {
                    settings::write_settings(
                        writer,
                        &settings::with_defaults(task.settings.as_ref()),
                    )?;
                }
                (Some(task_settings), EncodePolicy::Passthrough) => {
                    settings::write_settings(writer, task_settings)?;
                }
                (None, EncodePolicy::Passthrough) => {}
            }
            if let Some(data) = &task.data {
                write_value(writer, "Data", data)?;
            }
            match policy {
                EncodePolicy::Defaulted if task.actions.context.is_none() => {
                    let mut defaulted = task.actions.clone();
                    defaulted.context = Some(String::from("Author"));
                    actions::write_actions(writer, &defaulted)?;
                }
                _ => actions::write_actions(writer, &task.actions)?,
            }
            Ok(())
        })?;

    Ok(String::from_utf8_lossy(&writer.into_inner()).to_string())
}

fn default_principals() -> Principals {
    Principals {
        principal: Some(Principal {
            id: Some(String::from("Author")),
            ..Default::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{EncodePolicy, encode, encode_with};
    use common::tasks::{
        Actions, ExecAction, LogonTrigger, Settings, Task, TriggerBase, Triggers,
    };

    fn exec_task() -> Task {
        let mut triggers = Triggers::default();
        triggers.logon.push(LogonTrigger {
            base: TriggerBase {
                enabled: Some(true),
                ..Default::default()
            },
            user_id: Some(String::from("alice")),
            delay: None,
        });
        Task {
            triggers: Some(triggers),
            actions: Actions {
                exec: vec![ExecAction {
                    id: None,
                    command: String::from("notepad.exe"),
                    arguments: None,
                    working_directory: None,
                }],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_encode_declaration_and_root() {
        let xml = encode(&exec_task()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-16\"?>"));
        assert!(xml.contains(
            "<Task version=\"1.2\" xmlns=\"http://schemas.microsoft.com/windows/2004/02/mit/task\">"
        ));
    }

    #[test]
    fn test_encode_passthrough_omits_unset_sections() {
        let xml = encode(&exec_task()).unwrap();
        assert!(!xml.contains("<Settings>"));
        assert!(!xml.contains("<Principals>"));
        assert!(!xml.contains("<RegistrationInfo>"));
    }

    #[test]
    fn test_encode_defaulted_fills_safe_values() {
        let xml = encode_with(&exec_task(), EncodePolicy::Defaulted).unwrap();
        assert!(xml.contains("<MultipleInstancesPolicy>IgnoreNew</MultipleInstancesPolicy>"));
        assert!(xml.contains("<ExecutionTimeLimit>PT72H</ExecutionTimeLimit>"));
        assert!(xml.contains("<Priority>7</Priority>"));
        assert!(xml.contains("<Principal id=\"Author\">"));
        assert!(xml.contains("<Actions Context=\"Author\">"));
    }

    #[test]
    fn test_encode_defaulted_keeps_explicit_values() {
        let mut task = exec_task();
        task.settings = Some(Settings {
            priority: Some(3),
            ..Default::default()
        });
        let xml = encode_with(&task, EncodePolicy::Defaulted).unwrap();
        assert!(xml.contains("<Priority>3</Priority>"));
        assert!(!xml.contains("<Priority>7</Priority>"));
    }

    #[test]
    fn test_encode_section_order() {
        let mut task = exec_task();
        task.registration_info = Some(common::tasks::RegistrationInfo {
            uri: Some(String::from("\\A\\B")),
            ..Default::default()
        });
        task.settings = Some(Settings {
            hidden: Some(true),
            ..Default::default()
        });
        let xml = encode(&task).unwrap();
        let registration = xml.find("<RegistrationInfo>").unwrap();
        let triggers = xml.find("<Triggers>").unwrap();
        let settings = xml.find("<Settings>").unwrap();
        let actions = xml.find("<Actions>").unwrap();
        assert!(registration < triggers);
        assert!(triggers < settings);
        assert!(settings < actions);
    }
}

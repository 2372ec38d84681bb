/**
 * Thin wrapper over the Windows `schtasks.exe` utility. Registration stages
 * the task XML in a temporary file, hands the path to schtasks and removes
 * the file afterwards whether or not the command succeeded.
 */
use crate::filesystem::write_task_file;
use crate::schtasks::command::run_schtasks;
use crate::schtasks::error::SchtasksError;
use crate::tasks::encode::{EncodePolicy, encode_with};
use crate::utils::{time::unix_seconds, uuid::generate_uuid};
use common::tasks::TaskDefinition;
use log::error;
use serde::Serialize;
use std::env::temp_dir;
use std::fs::remove_file;

pub mod error;

pub(crate) mod command;

pub use command::CommandResult;

#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    /// Overwrite an existing task of the same name.
    pub force: bool,
    /// Register under the SYSTEM account.
    pub run_as_system: bool,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// One row of `schtasks /Query` output.
#[derive(Debug, Serialize, PartialEq)]
pub struct TaskEntry {
    pub name: String,
    pub next_run_time: String,
    pub status: String,
}

/// Register a task definition with the scheduler. The XML is emitted with
/// safe defaults filled so sparse documents still register cleanly.
pub fn register(
    definition: &TaskDefinition,
    options: &RegisterOptions,
) -> Result<CommandResult, SchtasksError> {
    if definition.name.is_empty() {
        return Err(SchtasksError::NoTaskName);
    }
    if options.run_as_system && options.user.is_some() {
        return Err(SchtasksError::UserConflict);
    }
    if options.password.is_some() && options.user.is_none() {
        return Err(SchtasksError::PasswordWithoutUser);
    }

    let xml = match encode_with(&definition.task, EncodePolicy::Defaulted) {
        Ok(xml) => xml,
        Err(err) => {
            error!("[schtasks] Could not encode task for registration: {err:?}");
            return Err(SchtasksError::EncodeTask);
        }
    };

    let staged = temp_dir().join(format!("task-{}-{}.xml", unix_seconds(), generate_uuid()));
    if write_task_file(&staged, &xml).is_err() {
        return Err(SchtasksError::TempFile);
    }

    let args = register_args(&definition.name, &staged.to_string_lossy(), options);
    let result = run_schtasks(&args);
    // Stale staging files should never accumulate in temp
    let _ = remove_file(&staged);
    result
}

pub fn delete(name: &str, force: bool) -> Result<CommandResult, SchtasksError> {
    if name.is_empty() {
        return Err(SchtasksError::NoTaskName);
    }
    let mut args = name_args("/Delete", name);
    if force {
        args.push(String::from("/F"));
    }
    run_schtasks(&args)
}

pub fn run(name: &str) -> Result<CommandResult, SchtasksError> {
    if name.is_empty() {
        return Err(SchtasksError::NoTaskName);
    }
    run_schtasks(&name_args("/Run", name))
}

pub fn end(name: &str) -> Result<CommandResult, SchtasksError> {
    if name.is_empty() {
        return Err(SchtasksError::NoTaskName);
    }
    run_schtasks(&name_args("/End", name))
}

/// Fetch the registered XML for one task. The document text is in `stdout`.
pub fn query_task(name: &str) -> Result<CommandResult, SchtasksError> {
    if name.is_empty() {
        return Err(SchtasksError::NoTaskName);
    }
    let mut args = name_args("/Query", name);
    args.push(String::from("/XML"));
    run_schtasks(&args)
}

pub fn exists(name: &str) -> Result<bool, SchtasksError> {
    if name.is_empty() {
        return Err(SchtasksError::NoTaskName);
    }
    let result = run_schtasks(&name_args("/Query", name))?;
    Ok(result.success)
}

/// List every registered task the current account can see.
pub fn list() -> Result<Vec<TaskEntry>, SchtasksError> {
    let args = vec![
        String::from("/Query"),
        String::from("/FO"),
        String::from("CSV"),
        String::from("/NH"),
    ];
    let result = run_schtasks(&args)?;
    parse_task_list(&result.stdout)
}

fn register_args(name: &str, xml_path: &str, options: &RegisterOptions) -> Vec<String> {
    let mut args = vec![
        String::from("/Create"),
        String::from("/TN"),
        name.to_string(),
        String::from("/XML"),
        xml_path.to_string(),
    ];
    if options.force {
        args.push(String::from("/F"));
    }
    if options.run_as_system {
        args.push(String::from("/RU"));
        args.push(String::from("SYSTEM"));
    } else if let Some(user) = &options.user {
        args.push(String::from("/RU"));
        args.push(user.clone());
        if let Some(password) = &options.password {
            args.push(String::from("/RP"));
            args.push(password.clone());
        }
    }
    args
}

fn name_args(verb: &str, name: &str) -> Vec<String> {
    vec![verb.to_string(), String::from("/TN"), name.to_string()]
}

/// Parse `/FO CSV /NH` output. schtasks repeats the header once per task
/// folder, so header rows are filtered by value.
fn parse_task_list(output: &str) -> Result<Vec<TaskEntry>, SchtasksError> {
    let mut entries = Vec::new();
    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let fields = parse_csv_line(line);
        if fields.len() < 3 {
            error!("[schtasks] Unexpected query row: {line}");
            return Err(SchtasksError::OutputParse);
        }
        if fields[0] == "TaskName" {
            continue;
        }
        entries.push(TaskEntry {
            name: fields[0].clone(),
            next_run_time: fields[1].clone(),
            status: fields[2].clone(),
        });
    }
    Ok(entries)
}

/// Commas inside quoted fields are data. Doubled quotes are literal quotes.
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(value) = chars.next() {
        match value {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(field.clone());
                field.clear();
            }
            _ => field.push(value),
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::{
        RegisterOptions, TaskEntry, delete, end, exists, name_args, parse_csv_line,
        parse_task_list, register, register_args, run,
    };
    use crate::schtasks::error::SchtasksError;
    use crate::tasks::builder::TaskBuilder;

    fn definition() -> common::tasks::TaskDefinition {
        TaskBuilder::new()
            .name("Reports")
            .add_logon_trigger(None)
            .add_exec("report.exe", None, None)
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_args_plain() {
        let options = RegisterOptions::default();
        let args = register_args("Reports", "C:\\temp\\task.xml", &options);
        assert_eq!(
            args,
            vec!["/Create", "/TN", "Reports", "/XML", "C:\\temp\\task.xml"]
        );
    }

    #[test]
    fn test_register_args_force_system() {
        let options = RegisterOptions {
            force: true,
            run_as_system: true,
            ..Default::default()
        };
        let args = register_args("Reports", "task.xml", &options);
        assert_eq!(
            args,
            vec!["/Create", "/TN", "Reports", "/XML", "task.xml", "/F", "/RU", "SYSTEM"]
        );
    }

    #[test]
    fn test_register_args_user_password() {
        let options = RegisterOptions {
            user: Some(String::from("ops")),
            password: Some(String::from("hunter2")),
            ..Default::default()
        };
        let args = register_args("Reports", "task.xml", &options);
        assert_eq!(
            args,
            vec!["/Create", "/TN", "Reports", "/XML", "task.xml", "/RU", "ops", "/RP", "hunter2"]
        );
    }

    #[test]
    fn test_register_rejects_conflicting_accounts() {
        let options = RegisterOptions {
            run_as_system: true,
            user: Some(String::from("ops")),
            ..Default::default()
        };
        assert_eq!(
            register(&definition(), &options).unwrap_err(),
            SchtasksError::UserConflict
        );
    }

    #[test]
    fn test_register_rejects_password_without_user() {
        let options = RegisterOptions {
            password: Some(String::from("hunter2")),
            ..Default::default()
        };
        assert_eq!(
            register(&definition(), &options).unwrap_err(),
            SchtasksError::PasswordWithoutUser
        );
    }

    #[test]
    fn test_name_ops_reject_empty_name() {
        assert_eq!(delete("", false).unwrap_err(), SchtasksError::NoTaskName);
        assert_eq!(run("").unwrap_err(), SchtasksError::NoTaskName);
        assert_eq!(end("").unwrap_err(), SchtasksError::NoTaskName);
        assert_eq!(exists("").unwrap_err(), SchtasksError::NoTaskName);
    }

    #[test]
    fn test_name_args() {
        assert_eq!(name_args("/Run", "\\Ops\\Reports"), vec![
            "/Run",
            "/TN",
            "\\Ops\\Reports"
        ]);
    }

    #[test]
    fn test_parse_task_list() {
        let output = "\"\\Ops\\Reports\",\"3/1/2024 6:30:00 AM\",\"Ready\"\r\n\"TaskName\",\"Next Run Time\",\"Status\"\r\n\"\\Audit, Weekly\",\"N/A\",\"Disabled\"\r\n";
        let entries = parse_task_list(output).unwrap();
        assert_eq!(entries, vec![
            TaskEntry {
                name: String::from("\\Ops\\Reports"),
                next_run_time: String::from("3/1/2024 6:30:00 AM"),
                status: String::from("Ready"),
            },
            TaskEntry {
                name: String::from("\\Audit, Weekly"),
                next_run_time: String::from("N/A"),
                status: String::from("Disabled"),
            },
        ]);
    }

    #[test]
    fn test_parse_task_list_rejects_garbage() {
        assert_eq!(
            parse_task_list("not csv at all").unwrap_err(),
            SchtasksError::OutputParse
        );
    }

    #[test]
    fn test_parse_csv_line_escaped_quote() {
        let fields = parse_csv_line("\"a \"\"quoted\"\" name\",\"N/A\",\"Ready\"");
        assert_eq!(fields, vec!["a \"quoted\" name", "N/A", "Ready"]);
    }
}

/**
 * Fluent construction of a Task. Calls accumulate without failing; all
 * completeness checks happen at `build`. A builder may be seeded from a
 * decoded Task, after which scalar setters overwrite the seeded values and
 * trigger/action calls append after the seed's entries.
 */
use crate::tasks::error::TaskError;
use chrono::NaiveDateTime;
use common::tasks::{
    Action, BootTrigger, ByDay, ByWeek, CalendarSchedule, CalendarTrigger, ExecAction, LogonType,
    LogonTrigger, OneOrMany, Principal, Principals, RegistrationInfo, RunLevel, Settings, Task,
    TaskDefinition, TimeTrigger, Trigger, TriggerBase, Triggers, Weekday,
};

#[derive(Debug, Clone, Default)]
pub struct TaskBuilder {
    name: Option<String>,
    task: Task,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from an existing document, typically a decode result.
    pub fn from_task(task: Task) -> Self {
        Self { name: None, task }
    }

    /// Explicit registration name. Without it, `RegistrationInfo.URI` is used.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.registration_info().author = Some(author.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.registration_info().description = Some(description.to_string());
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.registration_info().version = Some(version.to_string());
        self
    }

    pub fn uri(mut self, uri: &str) -> Self {
        self.registration_info().uri = Some(uri.to_string());
        self
    }

    pub fn documentation(mut self, documentation: &str) -> Self {
        self.registration_info().documentation = Some(documentation.to_string());
        self
    }

    pub fn source(mut self, source: &str) -> Self {
        self.registration_info().source = Some(source.to_string());
        self
    }

    pub fn security_descriptor(mut self, descriptor: &str) -> Self {
        self.registration_info().security_descriptor = Some(descriptor.to_string());
        self
    }

    pub fn registration_date(mut self, date: NaiveDateTime) -> Self {
        self.registration_info().date = Some(format_boundary(&date));
        self
    }

    pub fn add_trigger(mut self, trigger: Trigger) -> Self {
        self.task
            .triggers
            .get_or_insert_with(Triggers::default)
            .push(trigger);
        self
    }

    pub fn add_time_trigger(self, start: NaiveDateTime) -> Self {
        self.add_trigger(Trigger::Time(TimeTrigger {
            base: boundary_base(start),
            random_delay: None,
        }))
    }

    pub fn add_logon_trigger(self, user_id: Option<&str>) -> Self {
        self.add_trigger(Trigger::Logon(LogonTrigger {
            base: TriggerBase::default(),
            user_id: user_id.map(str::to_string),
            delay: None,
        }))
    }

    pub fn add_boot_trigger(self, delay: Option<&str>) -> Self {
        self.add_trigger(Trigger::Boot(BootTrigger {
            base: TriggerBase::default(),
            delay: delay.map(str::to_string),
        }))
    }

    pub fn add_daily_schedule(self, start: NaiveDateTime, days_interval: u16) -> Self {
        self.add_trigger(Trigger::Calendar(CalendarTrigger {
            base: boundary_base(start),
            random_delay: None,
            schedule: CalendarSchedule::ByDay(ByDay { days_interval }),
        }))
    }

    pub fn add_weekly_schedule(
        self,
        start: NaiveDateTime,
        weeks_interval: u8,
        days: &[Weekday],
    ) -> Self {
        self.add_trigger(Trigger::Calendar(CalendarTrigger {
            base: boundary_base(start),
            random_delay: None,
            schedule: CalendarSchedule::ByWeek(ByWeek {
                weeks_interval: Some(weeks_interval),
                days_of_week: (!days.is_empty()).then(|| days.to_vec()),
            }),
        }))
    }

    pub fn add_action(mut self, action: Action) -> Self {
        self.task.actions.push(action);
        self
    }

    pub fn add_exec(
        self,
        command: &str,
        arguments: Option<&str>,
        working_directory: Option<&str>,
    ) -> Self {
        self.add_action(Action::Exec(ExecAction {
            id: None,
            command: command.to_string(),
            arguments: arguments.map(|value| OneOrMany::One(value.to_string())),
            working_directory: working_directory.map(|value| OneOrMany::One(value.to_string())),
        }))
    }

    pub fn principal_user(mut self, user_id: &str) -> Self {
        self.principal().user_id = Some(user_id.to_string());
        self
    }

    pub fn principal_group(mut self, group_id: &str) -> Self {
        self.principal().group_id = Some(group_id.to_string());
        self
    }

    pub fn logon_type(mut self, logon_type: LogonType) -> Self {
        self.principal().logon_type = Some(logon_type);
        self
    }

    pub fn run_level(mut self, run_level: RunLevel) -> Self {
        self.principal().run_level = Some(run_level);
        self
    }

    pub fn run_with_highest_privileges(self) -> Self {
        self.run_level(RunLevel::HighestAvailable)
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.task.settings = Some(settings);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.settings_mut().hidden = Some(hidden);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.settings_mut().enabled = Some(enabled);
        self
    }

    /// Check the completeness invariants and yield the finished definition.
    pub fn build(self) -> Result<TaskDefinition, TaskError> {
        let fallback = self
            .task
            .registration_info
            .as_ref()
            .and_then(|info| info.uri.clone());
        let Some(name) = self.name.or(fallback) else {
            return Err(TaskError::MissingName);
        };
        if self.task.actions.is_empty() {
            return Err(TaskError::NoActions);
        }
        if self.task.trigger_count() == 0 {
            return Err(TaskError::NoTriggers);
        }
        Ok(TaskDefinition {
            name,
            task: self.task,
        })
    }

    fn registration_info(&mut self) -> &mut RegistrationInfo {
        self.task
            .registration_info
            .get_or_insert_with(RegistrationInfo::default)
    }

    fn principal(&mut self) -> &mut Principal {
        self.task
            .principals
            .get_or_insert_with(Principals::default)
            .principal
            .get_or_insert_with(Principal::default)
    }

    fn settings_mut(&mut self) -> &mut Settings {
        self.task.settings.get_or_insert_with(Settings::default)
    }
}

fn boundary_base(start: NaiveDateTime) -> TriggerBase {
    TriggerBase {
        start_boundary: Some(format_boundary(&start)),
        ..Default::default()
    }
}

/// The schema's local-time layout, no zone suffix.
fn format_boundary(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::TaskBuilder;
    use crate::tasks::decode::decode;
    use crate::tasks::error::TaskError;
    use chrono::NaiveDate;
    use common::tasks::{CalendarSchedule, RunLevel, Weekday};

    fn start() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_build_complete_task() {
        let definition = TaskBuilder::new()
            .name("Nightly Backup")
            .author("IT")
            .description("Copies state to the file share")
            .add_daily_schedule(start(), 1)
            .add_exec("backup.exe", Some("--full"), Some("C:\\ops"))
            .run_with_highest_privileges()
            .hidden(true)
            .build()
            .unwrap();

        assert_eq!(definition.name, "Nightly Backup");
        let task = definition.task;
        assert_eq!(task.trigger_count(), 1);
        assert_eq!(task.action_count(), 1);
        assert_eq!(
            task.triggers.as_ref().unwrap().calendar[0]
                .base
                .start_boundary
                .as_deref(),
            Some("2024-03-01T06:30:00")
        );
        assert_eq!(
            task.principals.unwrap().principal.unwrap().run_level,
            Some(RunLevel::HighestAvailable)
        );
        assert_eq!(task.settings.unwrap().hidden, Some(true));
    }

    #[test]
    fn test_build_name_falls_back_to_uri() {
        let definition = TaskBuilder::new()
            .uri("\\Ops\\Backup")
            .add_logon_trigger(None)
            .add_exec("backup.exe", None, None)
            .build()
            .unwrap();
        assert_eq!(definition.name, "\\Ops\\Backup");
    }

    #[test]
    fn test_build_without_name_fails() {
        let result = TaskBuilder::new()
            .add_logon_trigger(None)
            .add_exec("calc.exe", None, None)
            .build();
        assert_eq!(result.unwrap_err(), TaskError::MissingName);
    }

    #[test]
    fn test_build_without_actions_fails() {
        let result = TaskBuilder::new()
            .name("A")
            .add_logon_trigger(None)
            .build();
        assert_eq!(result.unwrap_err(), TaskError::NoActions);
    }

    #[test]
    fn test_build_without_triggers_fails() {
        let result = TaskBuilder::new()
            .name("A")
            .add_exec("calc.exe", None, None)
            .build();
        assert_eq!(result.unwrap_err(), TaskError::NoTriggers);
    }

    #[test]
    fn test_seeded_builder_appends_and_overwrites() {
        let xml = "<Task><RegistrationInfo><Description>old</Description></RegistrationInfo><Triggers><LogonTrigger><UserId>alice</UserId></LogonTrigger></Triggers><Actions><Exec><Command>first.exe</Command></Exec></Actions></Task>";
        let seed = decode(xml).unwrap();
        let definition = TaskBuilder::from_task(seed)
            .name("Seeded")
            .description("new")
            .add_exec("second.exe", None, None)
            .add_time_trigger(start())
            .build()
            .unwrap();

        let task = definition.task;
        assert_eq!(
            task.registration_info.unwrap().description.as_deref(),
            Some("new")
        );
        let triggers = task.triggers.unwrap();
        assert_eq!(triggers.logon.len(), 1);
        assert_eq!(triggers.time.len(), 1);
        assert_eq!(task.actions.exec.len(), 2);
        assert_eq!(task.actions.exec[0].command, "first.exe");
        assert_eq!(task.actions.exec[1].command, "second.exe");
    }

    #[test]
    fn test_weekly_schedule_days() {
        let definition = TaskBuilder::new()
            .name("Weekly")
            .add_weekly_schedule(start(), 2, &[Weekday::Monday, Weekday::Friday])
            .add_exec("report.exe", None, None)
            .build()
            .unwrap();
        let triggers = definition.task.triggers.unwrap();
        match &triggers.calendar[0].schedule {
            CalendarSchedule::ByWeek(by_week) => {
                assert_eq!(by_week.weeks_interval, Some(2));
                assert_eq!(by_week.days_of_week.as_ref().unwrap().len(), 2);
            }
            other => panic!("expected weekly schedule, got {other:?}"),
        }
    }
}

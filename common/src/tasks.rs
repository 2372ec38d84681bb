use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema version carried on every emitted document. Never caller input.
pub const TASK_VERSION: &str = "1.2";
/// XML namespace of the Task Scheduler schema.
pub const TASK_NAMESPACE: &str = "http://schemas.microsoft.com/windows/2004/02/mit/task";

/// Declares a closed wire enumeration with a name table for coercion and emission.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$(stringify!($variant)),+];

            pub fn from_name(value: &str) -> Option<Self> {
                match value {
                    $(stringify!($variant) => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn as_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }
    };
}

wire_enum!(LogonType {
    S4U,
    InteractiveToken,
    Password,
    InteractiveTokenOrPassword,
});

wire_enum!(RunLevel {
    LeastPrivilege,
    HighestAvailable,
});

wire_enum!(ProcessTokenSidType {
    None,
    Unrestricted,
});

wire_enum!(MultipleInstancesPolicy {
    IgnoreNew,
    Queue,
    Parallel,
    StopExisting,
});

wire_enum!(SessionStateChange {
    ConsoleConnect,
    ConsoleDisconnect,
    RemoteConnect,
    RemoteDisconnect,
    SessionLock,
    SessionUnlock,
});

wire_enum!(Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
});

wire_enum!(Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
});

wire_enum!(Privilege {
    SeCreateTokenPrivilege,
    SeAssignPrimaryTokenPrivilege,
    SeLockMemoryPrivilege,
    SeIncreaseQuotaPrivilege,
    SeUnsolicitedInputPrivilege,
    SeMachineAccountPrivilege,
    SeTcbPrivilege,
    SeSecurityPrivilege,
    SeTakeOwnershipPrivilege,
    SeLoadDriverPrivilege,
    SeSystemProfilePrivilege,
    SeSystemtimePrivilege,
    SeProfileSingleProcessPrivilege,
    SeIncreaseBasePriorityPrivilege,
    SeCreatePagefilePrivilege,
    SeCreatePermanentPrivilege,
    SeBackupPrivilege,
    SeRestorePrivilege,
    SeShutdownPrivilege,
    SeDebugPrivilege,
    SeAuditPrivilege,
    SeSystemEnvironmentPrivilege,
    SeChangeNotifyPrivilege,
    SeRemoteShutdownPrivilege,
    SeUndockPrivilege,
    SeSyncAgentPrivilege,
    SeEnableDelegationPrivilege,
    SeManageVolumePrivilege,
    SeImpersonatePrivilege,
    SeCreateGlobalPrivilege,
    SeTrustedCredManAccessPrivilege,
    SeRelabelPrivilege,
    SeIncreaseWorkingSetPrivilege,
    SeTimeZonePrivilege,
    SeCreateSymbolicLinkPrivilege,
});

/// A value the wire schema allows as either a single element or a repeated list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Collapse a collection: empty becomes `None`, a single element stays singular.
    pub fn from_vec(mut values: Vec<T>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => Some(Self::One(values.remove(0))),
            _ => Some(Self::Many(values)),
        }
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(value: T) -> Self {
        Self::One(value)
    }
}

/**
 * Typed model of a Scheduled Task XML document. Field names follow the wire
 * element names through serde, so the JSON face of a `Task` mirrors the
 * document shape and deep-merge patches can be written against it.
 * Schema at: [Task XML](https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-tsch/0d6383e4-de92-43e7-b0bb-a60cfa36379f)
 */
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "RegistrationInfo", skip_serializing_if = "Option::is_none")]
    pub registration_info: Option<RegistrationInfo>,
    #[serde(rename = "Triggers", skip_serializing_if = "Option::is_none")]
    pub triggers: Option<Triggers>,
    #[serde(rename = "Principals", skip_serializing_if = "Option::is_none")]
    pub principals: Option<Principals>,
    #[serde(rename = "Settings", skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    /**Arbitrary task data, carried through untouched */
    #[serde(rename = "Data", skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(rename = "Actions", default)]
    pub actions: Actions,
}

impl Task {
    /// Trigger count across all kinds.
    pub fn trigger_count(&self) -> usize {
        self.triggers.as_ref().map_or(0, |triggers| triggers.len())
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationInfo {
    #[serde(rename = "URI", skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(rename = "SecurityDescriptor", skip_serializing_if = "Option::is_none")]
    pub security_descriptor: Option<String>,
    #[serde(rename = "Source", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "Date", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "Author", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(rename = "Version", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Documentation", skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// Trigger instances grouped by wire element name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Triggers {
    #[serde(rename = "BootTrigger", default, skip_serializing_if = "Vec::is_empty")]
    pub boot: Vec<BootTrigger>,
    #[serde(
        rename = "RegistrationTrigger",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub registration: Vec<RegistrationTrigger>,
    #[serde(rename = "IdleTrigger", default, skip_serializing_if = "Vec::is_empty")]
    pub idle: Vec<IdleTrigger>,
    #[serde(rename = "TimeTrigger", default, skip_serializing_if = "Vec::is_empty")]
    pub time: Vec<TimeTrigger>,
    #[serde(rename = "EventTrigger", default, skip_serializing_if = "Vec::is_empty")]
    pub event: Vec<EventTrigger>,
    #[serde(rename = "LogonTrigger", default, skip_serializing_if = "Vec::is_empty")]
    pub logon: Vec<LogonTrigger>,
    #[serde(
        rename = "SessionStateChangeTrigger",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub session_state_change: Vec<SessionStateChangeTrigger>,
    #[serde(
        rename = "CalendarTrigger",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub calendar: Vec<CalendarTrigger>,
}

impl Triggers {
    /// File a trigger into the collection for its kind.
    pub fn push(&mut self, trigger: Trigger) {
        match trigger {
            Trigger::Boot(value) => self.boot.push(value),
            Trigger::Registration(value) => self.registration.push(value),
            Trigger::Idle(value) => self.idle.push(value),
            Trigger::Time(value) => self.time.push(value),
            Trigger::Event(value) => self.event.push(value),
            Trigger::Logon(value) => self.logon.push(value),
            Trigger::SessionStateChange(value) => self.session_state_change.push(value),
            Trigger::Calendar(value) => self.calendar.push(value),
        }
    }

    pub fn len(&self) -> usize {
        self.boot.len()
            + self.registration.len()
            + self.idle.len()
            + self.time.len()
            + self.event.len()
            + self.logon.len()
            + self.session_state_change.len()
            + self.calendar.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single trigger of any kind. Construction-side seam for builders.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    Boot(BootTrigger),
    Registration(RegistrationTrigger),
    Idle(IdleTrigger),
    Time(TimeTrigger),
    Event(EventTrigger),
    Logon(LogonTrigger),
    SessionStateChange(SessionStateChangeTrigger),
    Calendar(CalendarTrigger),
}

/// Fields shared by every trigger kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerBase {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Enabled", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(rename = "StartBoundary", skip_serializing_if = "Option::is_none")]
    pub start_boundary: Option<String>,
    #[serde(rename = "EndBoundary", skip_serializing_if = "Option::is_none")]
    pub end_boundary: Option<String>,
    #[serde(rename = "ExecutionTimeLimit", skip_serializing_if = "Option::is_none")]
    pub execution_time_limit: Option<String>,
    #[serde(rename = "Repetition", skip_serializing_if = "Option::is_none")]
    pub repetition: Option<Repetition>,
}

impl TriggerBase {
    /// A trigger left without an explicit flag counts as enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repetition {
    #[serde(rename = "Interval")]
    pub interval: String,
    #[serde(rename = "Duration", skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(rename = "StopAtDurationEnd", skip_serializing_if = "Option::is_none")]
    pub stop_at_duration_end: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BootTrigger {
    #[serde(flatten)]
    pub base: TriggerBase,
    #[serde(rename = "Delay", skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationTrigger {
    #[serde(flatten)]
    pub base: TriggerBase,
    #[serde(rename = "Delay", skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdleTrigger {
    #[serde(flatten)]
    pub base: TriggerBase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeTrigger {
    #[serde(flatten)]
    pub base: TriggerBase,
    #[serde(rename = "RandomDelay", skip_serializing_if = "Option::is_none")]
    pub random_delay: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogonTrigger {
    #[serde(flatten)]
    pub base: TriggerBase,
    #[serde(rename = "UserId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "Delay", skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStateChangeTrigger {
    #[serde(flatten)]
    pub base: TriggerBase,
    #[serde(rename = "StateChange")]
    pub state_change: SessionStateChange,
    #[serde(rename = "UserId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "Delay", skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTrigger {
    #[serde(flatten)]
    pub base: TriggerBase,
    #[serde(rename = "Subscription")]
    pub subscription: String,
    #[serde(rename = "NumberOfOccurrences", skip_serializing_if = "Option::is_none")]
    pub number_of_occurrences: Option<u32>,
    #[serde(rename = "PeriodOfOccurrence", skip_serializing_if = "Option::is_none")]
    pub period_of_occurrence: Option<String>,
    #[serde(rename = "Delay", skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,
    #[serde(rename = "MatchingElement", skip_serializing_if = "Option::is_none")]
    pub matching_element: Option<OneOrMany<String>>,
    #[serde(rename = "ValueQueries", skip_serializing_if = "Option::is_none")]
    pub value_queries: Option<ValueQueries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueQueries {
    #[serde(rename = "Value")]
    pub value: OneOrMany<String>,
}

/// Calendar trigger. Exactly one schedule shape, enforced by the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarTrigger {
    #[serde(flatten)]
    pub base: TriggerBase,
    #[serde(rename = "RandomDelay", skip_serializing_if = "Option::is_none")]
    pub random_delay: Option<String>,
    #[serde(flatten)]
    pub schedule: CalendarSchedule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CalendarSchedule {
    #[serde(rename = "ScheduleByDay")]
    ByDay(ByDay),
    #[serde(rename = "ScheduleByWeek")]
    ByWeek(ByWeek),
    #[serde(rename = "ScheduleByMonth")]
    ByMonth(ByMonth),
    #[serde(rename = "ScheduleByMonthDayOfWeek")]
    ByMonthDayOfWeek(ByMonthDayOfWeek),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ByDay {
    #[serde(rename = "DaysInterval")]
    pub days_interval: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ByWeek {
    #[serde(rename = "WeeksInterval", skip_serializing_if = "Option::is_none")]
    pub weeks_interval: Option<u8>,
    #[serde(rename = "DaysOfWeek", skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<Weekday>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ByMonth {
    #[serde(rename = "DaysOfMonth", skip_serializing_if = "Option::is_none")]
    pub days_of_month: Option<DaysOfMonth>,
    #[serde(rename = "Months")]
    pub months: Vec<Month>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ByMonthDayOfWeek {
    #[serde(rename = "Weeks")]
    pub weeks: Weeks,
    #[serde(rename = "DaysOfWeek")]
    pub days_of_week: Vec<Weekday>,
    #[serde(rename = "Months")]
    pub months: Vec<Month>,
}

/// Days of the month, `1` through `31` or `Last`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaysOfMonth {
    #[serde(rename = "Day")]
    pub day: OneOrMany<String>,
}

/// Weeks of the month, `1` through `4` or `Last`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weeks {
    #[serde(rename = "Week")]
    pub week: OneOrMany<String>,
}

/// Action entries grouped by wire element name, plus the shared context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Actions {
    #[serde(rename = "Context", skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(rename = "Exec", default, skip_serializing_if = "Vec::is_empty")]
    pub exec: Vec<ExecAction>,
    #[serde(rename = "ComHandler", default, skip_serializing_if = "Vec::is_empty")]
    pub com_handler: Vec<ComHandlerAction>,
    #[serde(rename = "SendEmail", default, skip_serializing_if = "Vec::is_empty")]
    pub send_email: Vec<SendEmailAction>,
}

impl Actions {
    pub fn push(&mut self, action: Action) {
        match action {
            Action::Exec(value) => self.exec.push(value),
            Action::ComHandler(value) => self.com_handler.push(value),
            Action::SendEmail(value) => self.send_email.push(value),
        }
    }

    pub fn len(&self) -> usize {
        self.exec.len() + self.com_handler.len() + self.send_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single action of any kind. Construction-side seam for builders.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Exec(ExecAction),
    ComHandler(ComHandlerAction),
    SendEmail(SendEmailAction),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecAction {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Command")]
    pub command: String,
    #[serde(rename = "Arguments", skip_serializing_if = "Option::is_none")]
    pub arguments: Option<OneOrMany<String>>,
    #[serde(rename = "WorkingDirectory", skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<OneOrMany<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComHandlerAction {
    #[serde(rename = "ClassId")]
    pub class_id: String,
    /**Arbitrary handler data, carried through untouched */
    #[serde(rename = "Data", skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendEmailAction {
    #[serde(rename = "Server")]
    pub server: String,
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "Cc", skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,
    #[serde(rename = "Bcc", skip_serializing_if = "Option::is_none")]
    pub bcc: Option<String>,
    #[serde(rename = "ReplyTo", skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "HeaderFields", skip_serializing_if = "Option::is_none")]
    pub header_fields: Option<HeaderFields>,
    #[serde(rename = "Body", skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(rename = "Attachments", skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Attachments>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderFields {
    #[serde(rename = "HeaderField")]
    pub header_field: OneOrMany<HeaderField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderField {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachments {
    #[serde(rename = "File")]
    pub file: OneOrMany<String>,
}

/// The wire schema mandates the wrapper element even for a single principal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Principals {
    #[serde(rename = "Principal", skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "UserId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "LogonType", skip_serializing_if = "Option::is_none")]
    pub logon_type: Option<LogonType>,
    #[serde(rename = "GroupId", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(rename = "DisplayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "RunLevel", skip_serializing_if = "Option::is_none")]
    pub run_level: Option<RunLevel>,
    #[serde(rename = "ProcessTokenSidType", skip_serializing_if = "Option::is_none")]
    pub process_token_sid_type: Option<ProcessTokenSidType>,
    #[serde(rename = "RequiredPrivileges", skip_serializing_if = "Option::is_none")]
    pub required_privileges: Option<RequiredPrivileges>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredPrivileges {
    #[serde(rename = "Privilege")]
    pub privilege: OneOrMany<Privilege>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "AllowStartOnDemand", skip_serializing_if = "Option::is_none")]
    pub allow_start_on_demand: Option<bool>,
    #[serde(rename = "RestartOnFailure", skip_serializing_if = "Option::is_none")]
    pub restart_on_failure: Option<RestartOnFailure>,
    #[serde(
        rename = "MultipleInstancesPolicy",
        skip_serializing_if = "Option::is_none"
    )]
    pub multiple_instances_policy: Option<MultipleInstancesPolicy>,
    #[serde(
        rename = "DisallowStartIfOnBatteries",
        skip_serializing_if = "Option::is_none"
    )]
    pub disallow_start_if_on_batteries: Option<bool>,
    #[serde(
        rename = "StopIfGoingOnBatteries",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_if_going_on_batteries: Option<bool>,
    #[serde(rename = "AllowHardTerminate", skip_serializing_if = "Option::is_none")]
    pub allow_hard_terminate: Option<bool>,
    #[serde(rename = "StartWhenAvailable", skip_serializing_if = "Option::is_none")]
    pub start_when_available: Option<bool>,
    #[serde(rename = "NetworkProfileName", skip_serializing_if = "Option::is_none")]
    pub network_profile_name: Option<String>,
    #[serde(
        rename = "RunOnlyIfNetworkAvailable",
        skip_serializing_if = "Option::is_none"
    )]
    pub run_only_if_network_available: Option<bool>,
    #[serde(rename = "WakeToRun", skip_serializing_if = "Option::is_none")]
    pub wake_to_run: Option<bool>,
    #[serde(rename = "Enabled", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(rename = "Hidden", skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(
        rename = "DeleteExpiredTaskAfter",
        skip_serializing_if = "Option::is_none"
    )]
    pub delete_expired_task_after: Option<String>,
    #[serde(rename = "IdleSettings", skip_serializing_if = "Option::is_none")]
    pub idle_settings: Option<IdleSettings>,
    #[serde(rename = "NetworkSettings", skip_serializing_if = "Option::is_none")]
    pub network_settings: Option<NetworkSettings>,
    #[serde(rename = "ExecutionTimeLimit", skip_serializing_if = "Option::is_none")]
    pub execution_time_limit: Option<String>,
    #[serde(rename = "Priority", skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(rename = "RunOnlyIfIdle", skip_serializing_if = "Option::is_none")]
    pub run_only_if_idle: Option<bool>,
    #[serde(
        rename = "UseUnifiedSchedulingEngine",
        skip_serializing_if = "Option::is_none"
    )]
    pub use_unified_scheduling_engine: Option<bool>,
    #[serde(
        rename = "DisallowStartOnRemoteAppSession",
        skip_serializing_if = "Option::is_none"
    )]
    pub disallow_start_on_remote_app_session: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestartOnFailure {
    #[serde(rename = "Interval")]
    pub interval: String,
    #[serde(rename = "Count")]
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdleSettings {
    #[serde(rename = "Duration", skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(rename = "WaitTimeout", skip_serializing_if = "Option::is_none")]
    pub wait_timeout: Option<String>,
    #[serde(rename = "StopOnIdleEnd", skip_serializing_if = "Option::is_none")]
    pub stop_on_idle_end: Option<bool>,
    #[serde(rename = "RestartOnIdle", skip_serializing_if = "Option::is_none")]
    pub restart_on_idle: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSettings {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A complete task paired with the name it registers under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDefinition {
    pub name: String,
    pub task: Task,
}

use crate::tasks::decode::DecodeContext;
use crate::tasks::error::TaskError;
use crate::tasks::schemas::{write_opt_bool, write_opt_text, write_text};
use common::tasks::{
    IdleSettings, MultipleInstancesPolicy, NetworkSettings, RestartOnFailure, Settings,
};
use quick_xml::Writer;
use serde_json::Value;
use std::io;

/// Decode the Settings policy bag. Every field is optional.
pub(crate) fn decode_settings(
    ctx: &DecodeContext,
    node: Option<&Value>,
) -> Result<Option<Settings>, TaskError> {
    let Some(map) = ctx.object(node, "Settings")? else {
        return Ok(None);
    };

    let settings = Settings {
        // AllowDemandStart is the legacy spelling of the same element
        allow_start_on_demand: ctx.boolean(
            map.get("AllowStartOnDemand")
                .or_else(|| map.get("AllowDemandStart")),
            "Settings.AllowStartOnDemand",
        )?,
        restart_on_failure: decode_restart_on_failure(ctx, map.get("RestartOnFailure"))?,
        multiple_instances_policy: ctx.enum_value(
            map.get("MultipleInstancesPolicy"),
            "Settings.MultipleInstancesPolicy",
            MultipleInstancesPolicy::from_name,
            MultipleInstancesPolicy::VALUES,
        )?,
        disallow_start_if_on_batteries: ctx.boolean(
            map.get("DisallowStartIfOnBatteries"),
            "Settings.DisallowStartIfOnBatteries",
        )?,
        stop_if_going_on_batteries: ctx.boolean(
            map.get("StopIfGoingOnBatteries"),
            "Settings.StopIfGoingOnBatteries",
        )?,
        allow_hard_terminate: ctx.boolean(
            map.get("AllowHardTerminate"),
            "Settings.AllowHardTerminate",
        )?,
        start_when_available: ctx.boolean(
            map.get("StartWhenAvailable"),
            "Settings.StartWhenAvailable",
        )?,
        network_profile_name: ctx.string(
            map.get("NetworkProfileName"),
            "Settings.NetworkProfileName",
        )?,
        run_only_if_network_available: ctx.boolean(
            map.get("RunOnlyIfNetworkAvailable"),
            "Settings.RunOnlyIfNetworkAvailable",
        )?,
        wake_to_run: ctx.boolean(map.get("WakeToRun"), "Settings.WakeToRun")?,
        enabled: ctx.boolean(map.get("Enabled"), "Settings.Enabled")?,
        hidden: ctx.boolean(map.get("Hidden"), "Settings.Hidden")?,
        delete_expired_task_after: ctx.string(
            map.get("DeleteExpiredTaskAfter"),
            "Settings.DeleteExpiredTaskAfter",
        )?,
        idle_settings: decode_idle_settings(ctx, map.get("IdleSettings"))?,
        network_settings: decode_network_settings(ctx, map.get("NetworkSettings"))?,
        execution_time_limit: ctx.string(
            map.get("ExecutionTimeLimit"),
            "Settings.ExecutionTimeLimit",
        )?,
        priority: ctx
            .integer(map.get("Priority"), "Settings.Priority", 0, 10)?
            .map(|value| value as u8),
        run_only_if_idle: ctx.boolean(map.get("RunOnlyIfIdle"), "Settings.RunOnlyIfIdle")?,
        use_unified_scheduling_engine: ctx.boolean(
            map.get("UseUnifiedSchedulingEngine"),
            "Settings.UseUnifiedSchedulingEngine",
        )?,
        disallow_start_on_remote_app_session: ctx.boolean(
            map.get("DisallowStartOnRemoteAppSession"),
            "Settings.DisallowStartOnRemoteAppSession",
        )?,
    };

    Ok((settings != Settings::default()).then_some(settings))
}

fn decode_restart_on_failure(
    ctx: &DecodeContext,
    node: Option<&Value>,
) -> Result<Option<RestartOnFailure>, TaskError> {
    let Some(map) = ctx.object(node, "Settings.RestartOnFailure")? else {
        return Ok(None);
    };
    let Some(interval) = ctx.string(map.get("Interval"), "Settings.RestartOnFailure.Interval")?
    else {
        return ctx.missing("Settings.RestartOnFailure.Interval");
    };
    let Some(count) = ctx.integer(
        map.get("Count"),
        "Settings.RestartOnFailure.Count",
        1,
        i64::from(u32::MAX),
    )?
    else {
        return ctx.missing("Settings.RestartOnFailure.Count");
    };
    Ok(Some(RestartOnFailure {
        interval,
        count: count as u32,
    }))
}

fn decode_idle_settings(
    ctx: &DecodeContext,
    node: Option<&Value>,
) -> Result<Option<IdleSettings>, TaskError> {
    let Some(map) = ctx.object(node, "Settings.IdleSettings")? else {
        return Ok(None);
    };
    let idle = IdleSettings {
        duration: ctx.string(map.get("Duration"), "Settings.IdleSettings.Duration")?,
        wait_timeout: ctx.string(map.get("WaitTimeout"), "Settings.IdleSettings.WaitTimeout")?,
        stop_on_idle_end: ctx.boolean(
            map.get("StopOnIdleEnd"),
            "Settings.IdleSettings.StopOnIdleEnd",
        )?,
        restart_on_idle: ctx.boolean(
            map.get("RestartOnIdle"),
            "Settings.IdleSettings.RestartOnIdle",
        )?,
    };
    Ok((idle != IdleSettings::default()).then_some(idle))
}

fn decode_network_settings(
    ctx: &DecodeContext,
    node: Option<&Value>,
) -> Result<Option<NetworkSettings>, TaskError> {
    let Some(map) = ctx.object(node, "Settings.NetworkSettings")? else {
        return Ok(None);
    };
    let network = NetworkSettings {
        name: ctx.string(map.get("Name"), "Settings.NetworkSettings.Name")?,
        id: ctx.string(map.get("Id"), "Settings.NetworkSettings.Id")?,
    };
    Ok((network != NetworkSettings::default()).then_some(network))
}

/// The schtasks-safe values a sparse document receives under defaulted encoding.
pub(crate) fn with_defaults(settings: Option<&Settings>) -> Settings {
    let mut filled = settings.cloned().unwrap_or_default();
    filled
        .multiple_instances_policy
        .get_or_insert(MultipleInstancesPolicy::IgnoreNew);
    filled.disallow_start_if_on_batteries.get_or_insert(false);
    filled.stop_if_going_on_batteries.get_or_insert(true);
    filled.allow_hard_terminate.get_or_insert(true);
    filled.start_when_available.get_or_insert(false);
    filled.run_only_if_network_available.get_or_insert(false);
    let idle = filled.idle_settings.get_or_insert_with(IdleSettings::default);
    idle.duration.get_or_insert_with(|| String::from("PT10M"));
    idle.wait_timeout.get_or_insert_with(|| String::from("PT1H"));
    idle.stop_on_idle_end.get_or_insert(true);
    idle.restart_on_idle.get_or_insert(false);
    filled.allow_start_on_demand.get_or_insert(true);
    filled.enabled.get_or_insert(true);
    filled.hidden.get_or_insert(false);
    filled.run_only_if_idle.get_or_insert(false);
    filled.wake_to_run.get_or_insert(false);
    filled
        .execution_time_limit
        .get_or_insert_with(|| String::from("PT72H"));
    filled.priority.get_or_insert(7);
    filled
}

pub(crate) fn write_settings(writer: &mut Writer<Vec<u8>>, settings: &Settings) -> io::Result<()> {
    writer
        .create_element("Settings")
        .write_inner_content(|writer| {
            if let Some(policy) = settings.multiple_instances_policy {
                write_text(writer, "MultipleInstancesPolicy", policy.as_name())?;
            }
            write_opt_bool(
                writer,
                "DisallowStartIfOnBatteries",
                settings.disallow_start_if_on_batteries,
            )?;
            write_opt_bool(
                writer,
                "StopIfGoingOnBatteries",
                settings.stop_if_going_on_batteries,
            )?;
            write_opt_bool(writer, "AllowHardTerminate", settings.allow_hard_terminate)?;
            write_opt_bool(writer, "StartWhenAvailable", settings.start_when_available)?;
            write_opt_bool(
                writer,
                "RunOnlyIfNetworkAvailable",
                settings.run_only_if_network_available,
            )?;
            if let Some(idle) = &settings.idle_settings {
                writer
                    .create_element("IdleSettings")
                    .write_inner_content(|writer| {
                        write_opt_text(writer, "Duration", idle.duration.as_deref())?;
                        write_opt_text(writer, "WaitTimeout", idle.wait_timeout.as_deref())?;
                        write_opt_bool(writer, "StopOnIdleEnd", idle.stop_on_idle_end)?;
                        write_opt_bool(writer, "RestartOnIdle", idle.restart_on_idle)
                    })?;
            }
            if let Some(network) = &settings.network_settings {
                writer
                    .create_element("NetworkSettings")
                    .write_inner_content(|writer| {
                        write_opt_text(writer, "Name", network.name.as_deref())?;
                        write_opt_text(writer, "Id", network.id.as_deref())
                    })?;
            }
            write_opt_bool(writer, "AllowStartOnDemand", settings.allow_start_on_demand)?;
            write_opt_bool(writer, "Enabled", settings.enabled)?;
            write_opt_bool(writer, "Hidden", settings.hidden)?;
            write_opt_bool(writer, "RunOnlyIfIdle", settings.run_only_if_idle)?;
            write_opt_bool(
                writer,
                "DisallowStartOnRemoteAppSession",
                settings.disallow_start_on_remote_app_session,
            )?;
            write_opt_bool(
                writer,
                "UseUnifiedSchedulingEngine",
                settings.use_unified_scheduling_engine,
            )?;
            write_opt_bool(writer, "WakeToRun", settings.wake_to_run)?;
            write_opt_text(
                writer,
                "ExecutionTimeLimit",
                settings.execution_time_limit.as_deref(),
            )?;
            write_opt_text(
                writer,
                "DeleteExpiredTaskAfter",
                settings.delete_expired_task_after.as_deref(),
            )?;
            if let Some(priority) = settings.priority {
                write_text(writer, "Priority", &priority.to_string())?;
            }
            write_opt_text(
                writer,
                "NetworkProfileName",
                settings.network_profile_name.as_deref(),
            )?;
            if let Some(restart) = &settings.restart_on_failure {
                writer
                    .create_element("RestartOnFailure")
                    .write_inner_content(|writer| {
                        write_text(writer, "Interval", &restart.interval)?;
                        write_text(writer, "Count", &restart.count.to_string())
                    })?;
            }
            Ok(())
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{decode_settings, with_defaults, write_settings};
    use crate::tasks::decode::DecodeContext;
    use common::tasks::{MultipleInstancesPolicy, Settings};
    use quick_xml::Writer;
    use serde_json::json;

    #[test]
    fn test_decode_settings() {
        let ctx = DecodeContext { strict: false };
        let node = json!({
            "MultipleInstancesPolicy": "Queue",
            "Priority": "5",
            "Hidden": "true",
            "RestartOnFailure": {"Interval": "PT1M", "Count": "3"},
            "IdleSettings": {"Duration": "PT10M", "StopOnIdleEnd": "true"}
        });
        let settings = decode_settings(&ctx, Some(&node)).unwrap().unwrap();
        assert_eq!(
            settings.multiple_instances_policy,
            Some(MultipleInstancesPolicy::Queue)
        );
        assert_eq!(settings.priority, Some(5));
        assert_eq!(settings.hidden, Some(true));
        let restart = settings.restart_on_failure.unwrap();
        assert_eq!(restart.interval, "PT1M");
        assert_eq!(restart.count, 3);
        assert_eq!(
            settings.idle_settings.unwrap().duration.as_deref(),
            Some("PT10M")
        );
    }

    #[test]
    fn test_decode_settings_legacy_demand_start_name() {
        let ctx = DecodeContext { strict: false };
        let node = json!({"AllowDemandStart": "true"});
        let settings = decode_settings(&ctx, Some(&node)).unwrap().unwrap();
        assert_eq!(settings.allow_start_on_demand, Some(true));
    }

    #[test]
    fn test_decode_settings_drops_incomplete_restart() {
        let ctx = DecodeContext { strict: false };
        let node = json!({"RestartOnFailure": {"Interval": "PT1M"}, "Hidden": "true"});
        let settings = decode_settings(&ctx, Some(&node)).unwrap().unwrap();
        assert_eq!(settings.restart_on_failure, None);
        assert_eq!(settings.hidden, Some(true));
    }

    #[test]
    fn test_with_defaults_fills_unset_only() {
        let sparse = Settings {
            priority: Some(4),
            hidden: Some(true),
            ..Default::default()
        };
        let filled = with_defaults(Some(&sparse));
        assert_eq!(filled.priority, Some(4));
        assert_eq!(filled.hidden, Some(true));
        assert_eq!(
            filled.multiple_instances_policy,
            Some(MultipleInstancesPolicy::IgnoreNew)
        );
        assert_eq!(filled.execution_time_limit.as_deref(), Some("PT72H"));
        assert_eq!(filled.enabled, Some(true));
        assert_eq!(filled.idle_settings.unwrap().wait_timeout.as_deref(), Some("PT1H"));
    }

    #[test]
    fn test_write_settings_passthrough_is_sparse() {
        let settings = Settings {
            priority: Some(7),
            enabled: Some(true),
            ..Default::default()
        };
        let mut writer = Writer::new(Vec::new());
        write_settings(&mut writer, &settings).unwrap();
        let xml = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            xml,
            "<Settings><Enabled>true</Enabled><Priority>7</Priority></Settings>"
        );
    }
}

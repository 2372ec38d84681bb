use crate::tasks::decode::{DecodeContext, attribute};
use crate::tasks::error::TaskError;
use crate::tasks::schemas::{write_opt_bool, write_opt_one_or_many, write_opt_text, write_text};
use crate::tasks::values;
use common::tasks::{
    BootTrigger, ByDay, ByMonth, ByMonthDayOfWeek, ByWeek, CalendarSchedule, CalendarTrigger,
    DaysOfMonth, EventTrigger, IdleTrigger, LogonTrigger, Month, RegistrationTrigger,
    Repetition, SessionStateChange, SessionStateChangeTrigger, TimeTrigger, TriggerBase, Triggers,
    ValueQueries, Weekday, Weeks,
};
use quick_xml::Writer;
use serde_json::{Map, Value};
use std::io;

/// Decode the Triggers section, one routine per wire element name.
pub(crate) fn decode_triggers(
    ctx: &DecodeContext,
    node: Option<&Value>,
) -> Result<Option<Triggers>, TaskError> {
    let Some(map) = ctx.object(node, "Triggers")? else {
        return Ok(None);
    };

    let mut triggers = Triggers::default();
    for entry in values::to_array(map.get("BootTrigger")) {
        if values::is_blank(entry) {
            triggers.boot.push(BootTrigger::default());
        } else if let Some(entry) = ctx.object(Some(entry), "Triggers.BootTrigger")? {
            if let Some(trigger) = decode_boot(ctx, entry)? {
                triggers.boot.push(trigger);
            }
        }
    }
    for entry in values::to_array(map.get("RegistrationTrigger")) {
        if values::is_blank(entry) {
            triggers.registration.push(RegistrationTrigger::default());
        } else if let Some(entry) = ctx.object(Some(entry), "Triggers.RegistrationTrigger")? {
            if let Some(trigger) = decode_registration(ctx, entry)? {
                triggers.registration.push(trigger);
            }
        }
    }
    for entry in values::to_array(map.get("IdleTrigger")) {
        if values::is_blank(entry) {
            triggers.idle.push(IdleTrigger::default());
        } else if let Some(entry) = ctx.object(Some(entry), "Triggers.IdleTrigger")? {
            triggers.idle.push(IdleTrigger {
                base: decode_base(ctx, entry, "Triggers.IdleTrigger")?,
            });
        }
    }
    for entry in values::to_array(map.get("TimeTrigger")) {
        if values::is_blank(entry) {
            triggers.time.push(TimeTrigger::default());
        } else if let Some(entry) = ctx.object(Some(entry), "Triggers.TimeTrigger")? {
            if let Some(trigger) = decode_time(ctx, entry)? {
                triggers.time.push(trigger);
            }
        }
    }
    for entry in values::to_array(map.get("EventTrigger")) {
        if let Some(entry) = ctx.object(Some(entry), "Triggers.EventTrigger")? {
            if let Some(trigger) = decode_event(ctx, entry)? {
                triggers.event.push(trigger);
            }
        }
    }
    for entry in values::to_array(map.get("LogonTrigger")) {
        if values::is_blank(entry) {
            triggers.logon.push(LogonTrigger::default());
        } else if let Some(entry) = ctx.object(Some(entry), "Triggers.LogonTrigger")? {
            if let Some(trigger) = decode_logon(ctx, entry)? {
                triggers.logon.push(trigger);
            }
        }
    }
    for entry in values::to_array(map.get("SessionStateChangeTrigger")) {
        if let Some(entry) = ctx.object(Some(entry), "Triggers.SessionStateChangeTrigger")? {
            if let Some(trigger) = decode_session_state_change(ctx, entry)? {
                triggers.session_state_change.push(trigger);
            }
        }
    }
    for entry in values::to_array(map.get("CalendarTrigger")) {
        if let Some(entry) = ctx.object(Some(entry), "Triggers.CalendarTrigger")? {
            if let Some(trigger) = decode_calendar(ctx, entry)? {
                triggers.calendar.push(trigger);
            }
        }
    }

    Ok((!triggers.is_empty()).then_some(triggers))
}

fn decode_base(
    ctx: &DecodeContext,
    map: &Map<String, Value>,
    field: &str,
) -> Result<TriggerBase, TaskError> {
    Ok(TriggerBase {
        id: ctx.string(
            attribute(map, "id").or_else(|| map.get("Id")),
            &format!("{field}.Id"),
        )?,
        enabled: ctx.boolean(map.get("Enabled"), &format!("{field}.Enabled"))?,
        start_boundary: ctx.string(map.get("StartBoundary"), &format!("{field}.StartBoundary"))?,
        end_boundary: ctx.string(map.get("EndBoundary"), &format!("{field}.EndBoundary"))?,
        execution_time_limit: ctx.string(
            map.get("ExecutionTimeLimit"),
            &format!("{field}.ExecutionTimeLimit"),
        )?,
        repetition: decode_repetition(ctx, map.get("Repetition"), field)?,
    })
}

fn decode_repetition(
    ctx: &DecodeContext,
    node: Option<&Value>,
    field: &str,
) -> Result<Option<Repetition>, TaskError> {
    let Some(map) = ctx.object(node, &format!("{field}.Repetition"))? else {
        return Ok(None);
    };
    let Some(interval) = ctx.string(
        map.get("Interval"),
        &format!("{field}.Repetition.Interval"),
    )?
    else {
        return ctx.missing(&format!("{field}.Repetition.Interval"));
    };
    Ok(Some(Repetition {
        interval,
        duration: ctx.string(
            map.get("Duration"),
            &format!("{field}.Repetition.Duration"),
        )?,
        stop_at_duration_end: ctx.boolean(
            map.get("StopAtDurationEnd"),
            &format!("{field}.Repetition.StopAtDurationEnd"),
        )?,
    }))
}

fn decode_boot(
    ctx: &DecodeContext,
    map: &Map<String, Value>,
) -> Result<Option<BootTrigger>, TaskError> {
    Ok(Some(BootTrigger {
        base: decode_base(ctx, map, "Triggers.BootTrigger")?,
        delay: ctx.string(map.get("Delay"), "Triggers.BootTrigger.Delay")?,
    }))
}

fn decode_registration(
    ctx: &DecodeContext,
    map: &Map<String, Value>,
) -> Result<Option<RegistrationTrigger>, TaskError> {
    Ok(Some(RegistrationTrigger {
        base: decode_base(ctx, map, "Triggers.RegistrationTrigger")?,
        delay: ctx.string(map.get("Delay"), "Triggers.RegistrationTrigger.Delay")?,
    }))
}

fn decode_time(
    ctx: &DecodeContext,
    map: &Map<String, Value>,
) -> Result<Option<TimeTrigger>, TaskError> {
    Ok(Some(TimeTrigger {
        base: decode_base(ctx, map, "Triggers.TimeTrigger")?,
        random_delay: ctx.string(map.get("RandomDelay"), "Triggers.TimeTrigger.RandomDelay")?,
    }))
}

fn decode_logon(
    ctx: &DecodeContext,
    map: &Map<String, Value>,
) -> Result<Option<LogonTrigger>, TaskError> {
    Ok(Some(LogonTrigger {
        base: decode_base(ctx, map, "Triggers.LogonTrigger")?,
        user_id: ctx.string(map.get("UserId"), "Triggers.LogonTrigger.UserId")?,
        delay: ctx.string(map.get("Delay"), "Triggers.LogonTrigger.Delay")?,
    }))
}

fn decode_session_state_change(
    ctx: &DecodeContext,
    map: &Map<String, Value>,
) -> Result<Option<SessionStateChangeTrigger>, TaskError> {
    let field = "Triggers.SessionStateChangeTrigger";
    let Some(state_change) = ctx.enum_value(
        map.get("StateChange"),
        &format!("{field}.StateChange"),
        SessionStateChange::from_name,
        SessionStateChange::VALUES,
    )?
    else {
        return ctx.missing(&format!("{field}.StateChange"));
    };
    Ok(Some(SessionStateChangeTrigger {
        base: decode_base(ctx, map, field)?,
        state_change,
        user_id: ctx.string(map.get("UserId"), &format!("{field}.UserId"))?,
        delay: ctx.string(map.get("Delay"), &format!("{field}.Delay"))?,
    }))
}

fn decode_event(
    ctx: &DecodeContext,
    map: &Map<String, Value>,
) -> Result<Option<EventTrigger>, TaskError> {
    let field = "Triggers.EventTrigger";
    let Some(subscription) = ctx.string(
        map.get("Subscription"),
        &format!("{field}.Subscription"),
    )?
    else {
        return ctx.missing(&format!("{field}.Subscription"));
    };
    Ok(Some(EventTrigger {
        base: decode_base(ctx, map, field)?,
        subscription,
        number_of_occurrences: ctx
            .integer(
                map.get("NumberOfOccurrences"),
                &format!("{field}.NumberOfOccurrences"),
                1,
                i64::from(u32::MAX),
            )?
            .map(|value| value as u32),
        period_of_occurrence: ctx.string(
            map.get("PeriodOfOccurrence"),
            &format!("{field}.PeriodOfOccurrence"),
        )?,
        delay: ctx.string(map.get("Delay"), &format!("{field}.Delay"))?,
        matching_element: ctx.string_one_or_many(
            map.get("MatchingElement"),
            &format!("{field}.MatchingElement"),
        )?,
        value_queries: decode_value_queries(ctx, map.get("ValueQueries"))?,
    }))
}

fn decode_value_queries(
    ctx: &DecodeContext,
    node: Option<&Value>,
) -> Result<Option<ValueQueries>, TaskError> {
    let field = "Triggers.EventTrigger.ValueQueries";
    let Some(map) = ctx.object(node, field)? else {
        return Ok(None);
    };
    Ok(ctx
        .string_one_or_many(map.get("Value"), &format!("{field}.Value"))?
        .map(|value| ValueQueries { value }))
}

fn decode_calendar(
    ctx: &DecodeContext,
    map: &Map<String, Value>,
) -> Result<Option<CalendarTrigger>, TaskError> {
    let field = "Triggers.CalendarTrigger";
    let base = decode_base(ctx, map, field)?;
    let random_delay = ctx.string(map.get("RandomDelay"), &format!("{field}.RandomDelay"))?;
    let Some(schedule) = decode_schedule(ctx, map)? else {
        return ctx.missing(&format!("{field}.Schedule"));
    };
    Ok(Some(CalendarTrigger {
        base,
        random_delay,
        schedule,
    }))
}

/// More than one schedule shape normalizes to exactly one, by-day first.
fn decode_schedule(
    ctx: &DecodeContext,
    map: &Map<String, Value>,
) -> Result<Option<CalendarSchedule>, TaskError> {
    if let Some(entry) = ctx.object(
        map.get("ScheduleByDay"),
        "Triggers.CalendarTrigger.ScheduleByDay",
    )? {
        if let Some(by_day) = decode_by_day(ctx, entry)? {
            return Ok(Some(CalendarSchedule::ByDay(by_day)));
        }
    }
    if let Some(entry) = ctx.object(
        map.get("ScheduleByWeek"),
        "Triggers.CalendarTrigger.ScheduleByWeek",
    )? {
        return Ok(Some(CalendarSchedule::ByWeek(decode_by_week(ctx, entry)?)));
    }
    if let Some(entry) = ctx.object(
        map.get("ScheduleByMonth"),
        "Triggers.CalendarTrigger.ScheduleByMonth",
    )? {
        if let Some(by_month) = decode_by_month(ctx, entry)? {
            return Ok(Some(CalendarSchedule::ByMonth(by_month)));
        }
    }
    if let Some(entry) = ctx.object(
        map.get("ScheduleByMonthDayOfWeek"),
        "Triggers.CalendarTrigger.ScheduleByMonthDayOfWeek",
    )? {
        if let Some(by_month_dow) = decode_by_month_day_of_week(ctx, entry)? {
            return Ok(Some(CalendarSchedule::ByMonthDayOfWeek(by_month_dow)));
        }
    }
    Ok(None)
}

fn decode_by_day(
    ctx: &DecodeContext,
    map: &Map<String, Value>,
) -> Result<Option<ByDay>, TaskError> {
    let field = "Triggers.CalendarTrigger.ScheduleByDay.DaysInterval";
    let Some(days_interval) = ctx.integer(map.get("DaysInterval"), field, 1, 365)? else {
        return ctx.missing(field);
    };
    Ok(Some(ByDay {
        days_interval: days_interval as u16,
    }))
}

fn decode_by_week(ctx: &DecodeContext, map: &Map<String, Value>) -> Result<ByWeek, TaskError> {
    Ok(ByWeek {
        weeks_interval: ctx
            .integer(
                map.get("WeeksInterval"),
                "Triggers.CalendarTrigger.ScheduleByWeek.WeeksInterval",
                1,
                52,
            )?
            .map(|value| value as u8),
        days_of_week: decode_weekdays(
            ctx,
            map.get("DaysOfWeek"),
            "Triggers.CalendarTrigger.ScheduleByWeek.DaysOfWeek",
        )?,
    })
}

fn decode_by_month(
    ctx: &DecodeContext,
    map: &Map<String, Value>,
) -> Result<Option<ByMonth>, TaskError> {
    let field = "Triggers.CalendarTrigger.ScheduleByMonth";
    let days_of_month = decode_days_of_month(ctx, map.get("DaysOfMonth"))?;
    let Some(months) = decode_months(ctx, map.get("Months"), &format!("{field}.Months"))? else {
        return ctx.missing(&format!("{field}.Months"));
    };
    Ok(Some(ByMonth {
        days_of_month,
        months,
    }))
}

fn decode_by_month_day_of_week(
    ctx: &DecodeContext,
    map: &Map<String, Value>,
) -> Result<Option<ByMonthDayOfWeek>, TaskError> {
    let field = "Triggers.CalendarTrigger.ScheduleByMonthDayOfWeek";
    let Some(weeks) = decode_weeks(ctx, map.get("Weeks"), &format!("{field}.Weeks"))? else {
        return ctx.missing(&format!("{field}.Weeks"));
    };
    let Some(days_of_week) = decode_weekdays(
        ctx,
        map.get("DaysOfWeek"),
        &format!("{field}.DaysOfWeek"),
    )?
    else {
        return ctx.missing(&format!("{field}.DaysOfWeek"));
    };
    let Some(months) = decode_months(ctx, map.get("Months"), &format!("{field}.Months"))? else {
        return ctx.missing(&format!("{field}.Months"));
    };
    Ok(Some(ByMonthDayOfWeek {
        weeks,
        days_of_week,
        months,
    }))
}

/// Weekday flags are presence elements: `<DaysOfWeek><Monday/></DaysOfWeek>`.
fn decode_weekdays(
    ctx: &DecodeContext,
    node: Option<&Value>,
    field: &str,
) -> Result<Option<Vec<Weekday>>, TaskError> {
    let Some(map) = ctx.object(node, field)? else {
        return Ok(None);
    };
    let days: Vec<Weekday> = Weekday::VALUES
        .iter()
        .filter(|name| map.contains_key(**name))
        .filter_map(|name| Weekday::from_name(name))
        .collect();
    Ok((!days.is_empty()).then_some(days))
}

fn decode_months(
    ctx: &DecodeContext,
    node: Option<&Value>,
    field: &str,
) -> Result<Option<Vec<Month>>, TaskError> {
    let Some(map) = ctx.object(node, field)? else {
        return Ok(None);
    };
    let months: Vec<Month> = Month::VALUES
        .iter()
        .filter(|name| map.contains_key(**name))
        .filter_map(|name| Month::from_name(name))
        .collect();
    Ok((!months.is_empty()).then_some(months))
}

fn decode_days_of_month(
    ctx: &DecodeContext,
    node: Option<&Value>,
) -> Result<Option<DaysOfMonth>, TaskError> {
    let field = "Triggers.CalendarTrigger.ScheduleByMonth.DaysOfMonth";
    let Some(map) = ctx.object(node, field)? else {
        return Ok(None);
    };
    Ok(ctx
        .string_one_or_many(map.get("Day"), &format!("{field}.Day"))?
        .map(|day| DaysOfMonth { day }))
}

fn decode_weeks(
    ctx: &DecodeContext,
    node: Option<&Value>,
    field: &str,
) -> Result<Option<Weeks>, TaskError> {
    let Some(map) = ctx.object(node, field)? else {
        return Ok(None);
    };
    Ok(ctx
        .string_one_or_many(map.get("Week"), &format!("{field}.Week"))?
        .map(|week| Weeks { week }))
}

pub(crate) fn write_triggers(
    writer: &mut Writer<Vec<u8>>,
    triggers: &Triggers,
) -> io::Result<()> {
    writer
        .create_element("Triggers")
        .write_inner_content(|writer| {
            for trigger in &triggers.boot {
                write_kind(writer, "BootTrigger", &trigger.base, |writer| {
                    write_opt_text(writer, "Delay", trigger.delay.as_deref())
                })?;
            }
            for trigger in &triggers.registration {
                write_kind(writer, "RegistrationTrigger", &trigger.base, |writer| {
                    write_opt_text(writer, "Delay", trigger.delay.as_deref())
                })?;
            }
            for trigger in &triggers.idle {
                write_kind(writer, "IdleTrigger", &trigger.base, |_| Ok(()))?;
            }
            for trigger in &triggers.time {
                write_kind(writer, "TimeTrigger", &trigger.base, |writer| {
                    write_opt_text(writer, "RandomDelay", trigger.random_delay.as_deref())
                })?;
            }
            for trigger in &triggers.event {
                write_kind(writer, "EventTrigger", &trigger.base, |writer| {
                    write_text(writer, "Subscription", &trigger.subscription)?;
                    if let Some(occurrences) = trigger.number_of_occurrences {
                        write_text(writer, "NumberOfOccurrences", &occurrences.to_string())?;
                    }
                    write_opt_text(
                        writer,
                        "PeriodOfOccurrence",
                        trigger.period_of_occurrence.as_deref(),
                    )?;
                    write_opt_text(writer, "Delay", trigger.delay.as_deref())?;
                    write_opt_one_or_many(
                        writer,
                        "MatchingElement",
                        trigger.matching_element.as_ref(),
                    )?;
                    if let Some(queries) = &trigger.value_queries {
                        writer
                            .create_element("ValueQueries")
                            .write_inner_content(|writer| {
                                write_opt_one_or_many(writer, "Value", Some(&queries.value))
                            })?;
                    }
                    Ok(())
                })?;
            }
            for trigger in &triggers.logon {
                write_kind(writer, "LogonTrigger", &trigger.base, |writer| {
                    write_opt_text(writer, "UserId", trigger.user_id.as_deref())?;
                    write_opt_text(writer, "Delay", trigger.delay.as_deref())
                })?;
            }
            for trigger in &triggers.session_state_change {
                write_kind(
                    writer,
                    "SessionStateChangeTrigger",
                    &trigger.base,
                    |writer| {
                        write_text(writer, "StateChange", trigger.state_change.as_name())?;
                        write_opt_text(writer, "UserId", trigger.user_id.as_deref())?;
                        write_opt_text(writer, "Delay", trigger.delay.as_deref())
                    },
                )?;
            }
            for trigger in &triggers.calendar {
                write_kind(writer, "CalendarTrigger", &trigger.base, |writer| {
                    write_opt_text(writer, "RandomDelay", trigger.random_delay.as_deref())?;
                    write_schedule(writer, &trigger.schedule)
                })?;
            }
            Ok(())
        })?;
    Ok(())
}

/// Shared base fields, the id as an attribute, then the kind's own fields.
fn write_kind<F>(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    base: &TriggerBase,
    kind_fields: F,
) -> io::Result<()>
where
    F: FnOnce(&mut Writer<Vec<u8>>) -> io::Result<()>,
{
    let mut element = writer.create_element(name);
    if let Some(id) = base.id.as_deref() {
        element = element.with_attribute(("id", id));
    }
    element.write_inner_content(|writer| {
        write_opt_bool(writer, "Enabled", base.enabled)?;
        write_opt_text(writer, "StartBoundary", base.start_boundary.as_deref())?;
        write_opt_text(writer, "EndBoundary", base.end_boundary.as_deref())?;
        if let Some(repetition) = &base.repetition {
            writer
                .create_element("Repetition")
                .write_inner_content(|writer| {
                    write_text(writer, "Interval", &repetition.interval)?;
                    write_opt_text(writer, "Duration", repetition.duration.as_deref())?;
                    write_opt_bool(
                        writer,
                        "StopAtDurationEnd",
                        repetition.stop_at_duration_end,
                    )
                })?;
        }
        write_opt_text(
            writer,
            "ExecutionTimeLimit",
            base.execution_time_limit.as_deref(),
        )?;
        kind_fields(writer)
    })?;
    Ok(())
}

fn write_schedule(
    writer: &mut Writer<Vec<u8>>,
    schedule: &CalendarSchedule,
) -> io::Result<()> {
    match schedule {
        CalendarSchedule::ByDay(by_day) => {
            writer
                .create_element("ScheduleByDay")
                .write_inner_content(|writer| {
                    write_text(writer, "DaysInterval", &by_day.days_interval.to_string())
                })?;
        }
        CalendarSchedule::ByWeek(by_week) => {
            writer
                .create_element("ScheduleByWeek")
                .write_inner_content(|writer| {
                    if let Some(interval) = by_week.weeks_interval {
                        write_text(writer, "WeeksInterval", &interval.to_string())?;
                    }
                    if let Some(days) = &by_week.days_of_week {
                        write_weekdays(writer, days)?;
                    }
                    Ok(())
                })?;
        }
        CalendarSchedule::ByMonth(by_month) => {
            writer
                .create_element("ScheduleByMonth")
                .write_inner_content(|writer| {
                    if let Some(days) = &by_month.days_of_month {
                        writer
                            .create_element("DaysOfMonth")
                            .write_inner_content(|writer| {
                                write_opt_one_or_many(writer, "Day", Some(&days.day))
                            })?;
                    }
                    write_months(writer, &by_month.months)
                })?;
        }
        CalendarSchedule::ByMonthDayOfWeek(by_month_dow) => {
            writer
                .create_element("ScheduleByMonthDayOfWeek")
                .write_inner_content(|writer| {
                    writer
                        .create_element("Weeks")
                        .write_inner_content(|writer| {
                            write_opt_one_or_many(writer, "Week", Some(&by_month_dow.weeks.week))
                        })?;
                    write_weekdays(writer, &by_month_dow.days_of_week)?;
                    write_months(writer, &by_month_dow.months)
                })?;
        }
    }
    Ok(())
}

fn write_weekdays(writer: &mut Writer<Vec<u8>>, days: &[Weekday]) -> io::Result<()> {
    writer
        .create_element("DaysOfWeek")
        .write_inner_content(|writer| {
            for day in days {
                writer.create_element(day.as_name()).write_empty()?;
            }
            Ok(())
        })?;
    Ok(())
}

fn write_months(writer: &mut Writer<Vec<u8>>, months: &[Month]) -> io::Result<()> {
    writer
        .create_element("Months")
        .write_inner_content(|writer| {
            for month in months {
                writer.create_element(month.as_name()).write_empty()?;
            }
            Ok(())
        })?;
    Ok(())
}

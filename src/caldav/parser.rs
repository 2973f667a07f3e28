use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use ical::parser::ical::component::{IcalAlarm, IcalTodo};
use ical::property::Property;

use crate::error::{Error, Result};
use crate::service::tasks::MAX_REPEAT_AFTER;
use crate::types::{RepeatMode, Task};

/// Inverse of [`priority_to_ical`](super::priority_to_ical).
#[must_use]
pub fn ical_to_priority(priority: i64) -> i64 {
    match priority {
        1..=4 => 8,
        5 => 5,
        6..=9 => 2,
        _ => 0,
    }
}

/// Parses `YYYYMMDDTHHMMSS`, the same with a trailing `Z`, or a bare
/// `YYYYMMDD` date. All values are taken as UTC.
#[must_use]
pub fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let parsed = if value.len() == 8 {
        NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    } else {
        let bare = value.strip_suffix('Z').unwrap_or(value);
        NaiveDateTime::parse_from_str(bare, "%Y%m%dT%H%M%S").ok()
    };

    match parsed {
        Some(naive) => Some(naive.and_utc()),
        None => {
            tracing::warn!(value, "could not parse caldav time");
            None
        }
    }
}

/// Parses an iCalendar duration such as `PT1H30M`, `-P1D` or `P2W`.
#[must_use]
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (negative, rest) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let rest = rest.strip_prefix('P')?;

    let mut seconds = 0i64;
    let mut number = String::new();
    let mut in_time = false;
    for c in rest.chars() {
        match c {
            '0'..='9' => number.push(c),
            'T' if number.is_empty() => in_time = true,
            unit => {
                let n: i64 = number.parse().ok()?;
                number.clear();
                let factor = match (unit, in_time) {
                    ('W', false) => 7 * 86400,
                    ('D', false) => 86400,
                    ('H', true) => 3600,
                    ('M', true) => 60,
                    ('S', true) => 1,
                    _ => return None,
                };
                seconds = match n.checked_mul(factor).and_then(|s| seconds.checked_add(s)) {
                    Some(total) => total,
                    None => {
                        tracing::warn!(value, "caldav duration out of range");
                        return None;
                    }
                };
            }
        }
    }
    if !number.is_empty() {
        return None;
    }

    let Some(duration) = Duration::try_seconds(seconds) else {
        tracing::warn!(value, "caldav duration out of range");
        return None;
    };
    Some(if negative { -duration } else { duration })
}

fn unescape(value: &str) -> String {
    value
        .replace("\\,", ",")
        .replace("\\;", ";")
        .replace("\\n", "\n")
        .replace("\\N", "\n")
}

fn properties(props: &[Property]) -> HashMap<String, &Property> {
    props
        .iter()
        .map(|p| (p.name.to_ascii_uppercase(), p))
        .collect()
}

fn value<'a>(props: &HashMap<String, &'a Property>, name: &str) -> Option<&'a str> {
    props
        .get(name)
        .and_then(|p| p.value.as_deref())
        .filter(|v| !v.is_empty())
}

fn has_param(prop: &Property, name: &str, expected: &str) -> bool {
    prop.params.as_ref().is_some_and(|params| {
        params.iter().any(|(key, values)| {
            key.eq_ignore_ascii_case(name) && values.iter().any(|v| v.eq_ignore_ascii_case(expected))
        })
    })
}

/// `(repeat_after, mode)` for the RRULEs that map onto task repetition.
fn parse_rrule(rule: &str) -> Option<(i64, RepeatMode)> {
    let parts: HashMap<String, &str> = rule
        .split(';')
        .filter_map(|part| part.split_once('='))
        .map(|(k, v)| (k.to_ascii_uppercase(), v))
        .collect();

    let unit: i64 = match parts.get("FREQ")?.to_ascii_uppercase().as_str() {
        "MONTHLY" => return Some((0, RepeatMode::Month)),
        "SECONDLY" => 1,
        "MINUTELY" => 60,
        "HOURLY" => 3600,
        "DAILY" => 86400,
        "WEEKLY" => 7 * 86400,
        other => {
            tracing::warn!(freq = other, "unsupported recurrence frequency");
            return None;
        }
    };
    let interval = parts
        .get("INTERVAL")
        .and_then(|i| i.parse::<i64>().ok())
        .unwrap_or(1);
    match unit
        .checked_mul(interval)
        .filter(|seconds| (0..=MAX_REPEAT_AFTER).contains(seconds))
    {
        Some(seconds) => Some((seconds, RepeatMode::Default)),
        None => {
            tracing::warn!(rule, "recurrence interval out of range");
            None
        }
    }
}

fn parse_alarm(alarm: &IcalAlarm, reference: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    let trigger = alarm
        .properties
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case("TRIGGER"))?;
    let value = trigger.value.as_deref()?;

    if has_param(trigger, "VALUE", "DATE-TIME") {
        return parse_time(value);
    }
    match (parse_duration(value), reference) {
        (Some(offset), Some(reference)) => {
            let time = reference.checked_add_signed(offset);
            if time.is_none() {
                tracing::warn!(trigger = value, "alarm time out of range");
            }
            time
        }
        _ => {
            tracing::warn!(trigger = value, "dropping alarm without usable reference");
            None
        }
    }
}

fn todo_to_task(todo: &IcalTodo) -> Task {
    let props = properties(&todo.properties);
    let time = |name: &str| value(&props, name).and_then(parse_time);

    let mut task = Task {
        uid: value(&props, "UID").unwrap_or_default().to_string(),
        title: value(&props, "SUMMARY").unwrap_or_default().to_string(),
        description: value(&props, "DESCRIPTION").map(unescape).unwrap_or_default(),
        priority: value(&props, "PRIORITY")
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map(ical_to_priority)
            .unwrap_or_default(),
        due_date: time("DUE"),
        start_date: time("DTSTART"),
        end_date: time("DTEND"),
        done_at: time("COMPLETED"),
        done: value(&props, "STATUS").is_some_and(|s| s.eq_ignore_ascii_case("COMPLETED")),
        ..Default::default()
    };

    if let Some(updated) = time("LAST-MODIFIED").or_else(|| time("DTSTAMP")) {
        task.updated = updated;
    }
    if let Some(created) = time("CREATED") {
        task.created = created;
    }

    if task.end_date.is_none() {
        let duration = value(&props, "DURATION").and_then(parse_duration);
        if let (Some(start), Some(duration)) = (task.start_date, duration) {
            task.end_date = start.checked_add_signed(duration);
            if task.end_date.is_none() {
                tracing::warn!("end date from DURATION out of range");
            }
        }
    }

    if let Some((repeat_after, mode)) = value(&props, "RRULE").and_then(parse_rrule) {
        task.repeat_after = repeat_after;
        task.repeat_mode = mode;
    }

    let color = value(&props, "X-APPLE-CALENDAR-COLOR")
        .or_else(|| value(&props, "X-OUTLOOK-COLOR"))
        .or_else(|| value(&props, "X-FUNAMBOL-COLOR"));
    if let Some(color) = color {
        let color = color.trim_start_matches('#');
        let color = if color.len() == 8 {
            color.strip_suffix("FF").unwrap_or(color)
        } else {
            color
        };
        task.hex_color = color.to_string();
    }

    let reference = task.start_date.or(task.due_date);
    task.reminder_dates = todo
        .alarms
        .iter()
        .filter_map(|alarm| parse_alarm(alarm, reference))
        .collect();

    task
}

/// Reads the first VTODO of an uploaded calendar.
pub fn parse_todo(content: &str) -> Result<Task> {
    let calendar = ical::IcalParser::new(content.as_bytes())
        .next()
        .ok_or_else(|| Error::BadRequest("no calendar found".to_string()))?
        .map_err(|e| Error::BadRequest(format!("invalid calendar: {e}")))?;

    let todo = calendar
        .todos
        .first()
        .ok_or_else(|| Error::BadRequest("the calendar holds no VTODO".to_string()))?;

    Ok(todo_to_task(todo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caldav::{Alarm, Config, Todo, todos_to_ical};
    use chrono::TimeZone;

    #[test]
    fn test_priority_mapping() {
        assert_eq!(ical_to_priority(0), 0);
        assert_eq!(ical_to_priority(1), 8);
        assert_eq!(ical_to_priority(4), 8);
        assert_eq!(ical_to_priority(5), 5);
        assert_eq!(ical_to_priority(9), 2);
        assert_eq!(ical_to_priority(42), 0);
    }

    #[test]
    fn test_parse_time_formats() {
        let expected = Utc.with_ymd_and_hms(2019, 4, 3, 10, 20, 30).unwrap();
        assert_eq!(parse_time("20190403T102030Z"), Some(expected));
        assert_eq!(parse_time("20190403T102030"), Some(expected));
        assert_eq!(
            parse_time("20190403"),
            Some(Utc.with_ymd_and_hms(2019, 4, 3, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_time("yesterday"), None);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("PT1H30M"), Some(Duration::minutes(90)));
        assert_eq!(parse_duration("-PT15M"), Some(Duration::minutes(-15)));
        assert_eq!(parse_duration("P1DT2S"), Some(Duration::seconds(86402)));
        assert_eq!(parse_duration("P2W"), Some(Duration::days(14)));
        assert_eq!(parse_duration("PT0S"), Some(Duration::zero()));
        assert_eq!(parse_duration("1H"), None);
        assert_eq!(parse_duration("PT5"), None);
        assert_eq!(parse_duration("P1H"), None);
    }

    #[test]
    fn test_parse_client_upload() {
        let body = "BEGIN:VCALENDAR
VERSION:2.0
PRODID:-//Client//EN
BEGIN:VTODO
UID:abc-123
DTSTAMP:20190403T102030Z
SUMMARY:Buy milk
DESCRIPTION:Two litres\\, skimmed\\nfrom the corner shop
PRIORITY:1
DTSTART:20190403T090000Z
DURATION:PT2H
DUE:20190405
STATUS:COMPLETED
COMPLETED:20190404T120000Z
RRULE:FREQ=DAILY;INTERVAL=2
X-APPLE-CALENDAR-COLOR:#e66465FF
BEGIN:VALARM
TRIGGER:-PT30M
ACTION:DISPLAY
END:VALARM
END:VTODO
END:VCALENDAR
";
        let task = parse_todo(body).unwrap();
        assert_eq!(task.uid, "abc-123");
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "Two litres, skimmed\nfrom the corner shop");
        assert_eq!(task.priority, 8);
        assert!(task.done);
        assert_eq!(task.done_at, parse_time("20190404T120000Z"));
        assert_eq!(task.due_date, parse_time("20190405"));
        assert_eq!(task.end_date, parse_time("20190403T110000Z"));
        assert_eq!(task.repeat_after, 2 * 86400);
        assert_eq!(task.hex_color, "e66465");
        assert_eq!(task.updated, parse_time("20190403T102030Z").unwrap());
        assert_eq!(task.reminder_dates, vec![parse_time("20190403T083000Z").unwrap()]);
    }

    #[test]
    fn test_monthly_rule_and_unknown_priority() {
        let body = "BEGIN:VCALENDAR
VERSION:2.0
BEGIN:VTODO
UID:rent
SUMMARY:Rent
PRIORITY:high
RRULE:FREQ=MONTHLY;BYMONTHDAY=05
END:VTODO
END:VCALENDAR
";
        let task = parse_todo(body).unwrap();
        assert_eq!(task.priority, 0);
        assert_eq!(task.repeat_mode, RepeatMode::Month);
        assert_eq!(task.repeat_after, 0);
    }

    #[test]
    fn test_rejects_calendar_without_todo() {
        let body = "BEGIN:VCALENDAR\nVERSION:2.0\nEND:VCALENDAR\n";
        assert!(matches!(parse_todo(body), Err(Error::BadRequest(_))));
        assert!(matches!(parse_todo(""), Err(Error::BadRequest(_))));
    }

    fn todo_with(lines: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\nVERSION:2.0\nBEGIN:VTODO\nUID:big\nSUMMARY:Big\nDTSTART:20200102T080000Z\n{lines}\nEND:VTODO\nEND:VCALENDAR\n"
        )
    }

    #[test]
    fn test_oversized_durations_are_dropped() {
        assert_eq!(parse_duration("P99999999999999999D"), None);
        assert_eq!(parse_duration("P9223372036854775807S"), None);

        let task = parse_todo(&todo_with("DURATION:P99999999W")).unwrap();
        assert_eq!(task.end_date, None);
        assert_eq!(task.start_date, parse_time("20200102T080000Z"));

        let task = parse_todo(&todo_with("DURATION:P99999999999999999D")).unwrap();
        assert_eq!(task.end_date, None);
    }

    #[test]
    fn test_oversized_recurrence_is_dropped() {
        let task = parse_todo(&todo_with("RRULE:FREQ=WEEKLY;INTERVAL=9223372036854775807")).unwrap();
        assert_eq!(task.repeat_after, 0);
        assert_eq!(task.repeat_mode, RepeatMode::Default);

        let task = parse_todo(&todo_with("RRULE:FREQ=DAILY;INTERVAL=-3")).unwrap();
        assert_eq!(task.repeat_after, 0);
    }

    #[test]
    fn test_oversized_alarm_is_dropped() {
        let task = parse_todo(&todo_with(
            "BEGIN:VALARM\nTRIGGER:-P99999999W\nACTION:DISPLAY\nEND:VALARM\nBEGIN:VALARM\nTRIGGER:-PT5M\nACTION:DISPLAY\nEND:VALARM",
        ))
        .unwrap();
        assert_eq!(task.reminder_dates, vec![parse_time("20200102T075500Z").unwrap()]);
    }

    #[test]
    fn test_reads_back_rendered_todo() {
        let start = Utc.with_ymd_and_hms(2020, 1, 2, 8, 0, 0).unwrap();
        let todo = Todo {
            uid: "round".into(),
            summary: "Water plants".into(),
            description: "Every\nsecond day".into(),
            timestamp: start,
            start: Some(start),
            priority: 9,
            repeat_after: 172_800,
            alarms: vec![Alarm {
                time: start - Duration::minutes(10),
                description: String::new(),
            }],
            updated: start,
            ..Default::default()
        };
        let config = Config {
            name: "Garden".into(),
            prod_id: crate::caldav::PROD_ID.into(),
            color: String::new(),
        };

        let task = parse_todo(&todos_to_ical(&config, &[todo])).unwrap();
        assert_eq!(task.uid, "round");
        assert_eq!(task.title, "Water plants");
        assert_eq!(task.description, "Every\nsecond day");
        assert_eq!(task.priority, 8);
        assert_eq!(task.start_date, Some(start));
        assert_eq!(task.repeat_after, 172_800);
        assert_eq!(task.reminder_dates, vec![start - Duration::minutes(10)]);
    }
}

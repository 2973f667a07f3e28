use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use super::{Alarm, Config, Event, Todo};
use crate::types::RepeatMode;

/// `YYYYMMDDTHHMMSSZ` in UTC.
#[must_use]
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Maps the internal 1-9 priority (9 highest) onto the iCalendar tiers
/// (1 highest, 5 medium, 9 lowest). 0 means unset.
#[must_use]
pub fn priority_to_ical(priority: i64) -> i64 {
    match priority {
        i64::MIN..=0 => 0,
        1..=3 => 9,
        4..=6 => 5,
        _ => 1,
    }
}

fn color_lines(color: &str) -> String {
    if color.is_empty() {
        return String::new();
    }
    let hash = if color.starts_with('#') { "" } else { "#" };
    let color = format!("{hash}{color}FF");
    format!("\nX-APPLE-CALENDAR-COLOR:{color}\nX-OUTLOOK-COLOR:{color}\nX-FUNAMBOL-COLOR:{color}")
}

fn generated_uid(timestamp: &DateTime<Utc>, summary: &str) -> String {
    let digest = Sha256::digest(summary.as_bytes());
    format!("{}{}", format_time(timestamp), hex::encode(digest))
}

fn escape_description(description: &str) -> String {
    description.replace("\r\n", "\\n").replace('\n', "\\n")
}

/// Hours, minutes and seconds the way durations are spelled in triggers,
/// e.g. `1H30M0S`, `15M0S` or `0S`.
fn duration_parts(duration: Duration) -> String {
    let total = duration.num_seconds().abs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}H{minutes}M{seconds}S")
    } else if minutes > 0 {
        format!("{minutes}M{seconds}S")
    } else {
        format!("{seconds}S")
    }
}

/// Signed offset of an alarm from the event start, e.g. `-PT15M0S`.
#[must_use]
pub fn alarm_trigger(start: &DateTime<Utc>, alarm: &DateTime<Utc>) -> String {
    let diff = *alarm - *start;
    let sign = if diff < Duration::zero() { "-" } else { "" };
    format!("{sign}PT{}", duration_parts(diff))
}

fn calendar_header(config: &Config) -> String {
    format!(
        "BEGIN:VCALENDAR\nVERSION:2.0\nMETHOD:PUBLISH\nX-PUBLISHED-TTL:PT4H\nX-WR-CALNAME:{}\nPRODID:-//{}//EN{}",
        config.name,
        config.prod_id,
        color_lines(&config.color)
    )
}

fn push_alarm(out: &mut String, trigger: &str, alarm: &Alarm, fallback_description: &str) {
    let description = if alarm.description.is_empty() {
        fallback_description
    } else {
        &alarm.description
    };
    out.push_str(&format!(
        "\nBEGIN:VALARM\n{trigger}\nACTION:DISPLAY\nDESCRIPTION:{description}\nEND:VALARM"
    ));
}

/// Renders a VEVENT calendar.
#[must_use]
pub fn events_to_ical(config: &Config, events: &[Event]) -> String {
    let mut out = calendar_header(config);

    for event in events {
        let uid = if event.uid.is_empty() {
            generated_uid(&event.timestamp, &event.summary)
        } else {
            event.uid.clone()
        };

        out.push_str(&format!(
            "\nBEGIN:VEVENT\nUID:{uid}\nSUMMARY:{}{}\nDESCRIPTION:{}\nDTSTAMP:{}\nDTSTART:{}\nDTEND:{}",
            event.summary,
            color_lines(&event.color),
            escape_description(&event.description),
            format_time(&event.timestamp),
            format_time(&event.start),
            format_time(&event.end),
        ));

        for alarm in &event.alarms {
            let trigger = format!("TRIGGER:{}", alarm_trigger(&event.start, &alarm.time));
            push_alarm(&mut out, &trigger, alarm, &event.summary);
        }

        out.push_str("\nEND:VEVENT");
    }

    out.push_str("\nEND:VCALENDAR");
    out
}

fn todo_alarm_trigger(todo: &Todo, alarm: &Alarm) -> String {
    match todo.start.or(todo.due_date) {
        Some(reference) => format!("TRIGGER:{}", alarm_trigger(&reference, &alarm.time)),
        None => format!("TRIGGER;VALUE=DATE-TIME:{}", format_time(&alarm.time)),
    }
}

/// Renders a VTODO calendar.
#[must_use]
pub fn todos_to_ical(config: &Config, todos: &[Todo]) -> String {
    let mut out = calendar_header(config);

    for todo in todos {
        let uid = if todo.uid.is_empty() {
            generated_uid(&todo.timestamp, &todo.summary)
        } else {
            todo.uid.clone()
        };

        out.push_str(&format!(
            "\nBEGIN:VTODO\nUID:{uid}\nDTSTAMP:{}\nSUMMARY:{}{}",
            format_time(&todo.timestamp),
            todo.summary,
            color_lines(&todo.color),
        ));

        if let Some(start) = &todo.start {
            out.push_str(&format!("\nDTSTART:{}", format_time(start)));
            if let Some(duration) = todo.duration.filter(|d| !d.is_zero()) {
                if todo.due_date.is_none() {
                    out.push_str(&format!("\nDURATION:PT{}", duration_parts(duration)));
                }
            }
        }
        if let Some(end) = &todo.end {
            out.push_str(&format!("\nDTEND:{}", format_time(end)));
        }
        if !todo.description.is_empty() {
            out.push_str(&format!("\nDESCRIPTION:{}", escape_description(&todo.description)));
        }
        if let Some(completed) = &todo.completed {
            out.push_str(&format!("\nCOMPLETED:{}\nSTATUS:COMPLETED", format_time(completed)));
        }
        if !todo.related_to_uid.is_empty() {
            out.push_str(&format!("\nRELATED-TO:{}", todo.related_to_uid));
        }
        if let Some(due) = &todo.due_date {
            out.push_str(&format!("\nDUE:{}", format_time(due)));
        }
        if let Some(created) = &todo.created {
            out.push_str(&format!("\nCREATED:{}", format_time(created)));
        }
        if todo.priority != 0 {
            out.push_str(&format!("\nPRIORITY:{}", priority_to_ical(todo.priority)));
        }

        if todo.repeat_mode == RepeatMode::Month {
            match &todo.due_date {
                Some(due) => out.push_str(&format!("\nRRULE:FREQ=MONTHLY;BYMONTHDAY={}", due.format("%d"))),
                None => out.push_str("\nRRULE:FREQ=MONTHLY"),
            }
        } else if todo.repeat_after > 0 {
            out.push_str(&format!("\nRRULE:FREQ=SECONDLY;INTERVAL={}", todo.repeat_after));
        }

        for alarm in &todo.alarms {
            let trigger = todo_alarm_trigger(todo, alarm);
            push_alarm(&mut out, &trigger, alarm, &todo.summary);
        }

        out.push_str(&format!("\nLAST-MODIFIED:{}", format_time(&todo.updated)));
        out.push_str("\nEND:VTODO");
    }

    out.push_str("\nEND:VCALENDAR");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 12, 1, h, m, 0).unwrap()
    }

    fn config() -> Config {
        Config {
            name: "test".into(),
            prod_id: "RandomProdID which is not random".into(),
            color: String::new(),
        }
    }

    #[test]
    fn test_priority_tiers() {
        assert_eq!(priority_to_ical(0), 0);
        assert_eq!(priority_to_ical(1), 9);
        assert_eq!(priority_to_ical(3), 9);
        assert_eq!(priority_to_ical(4), 5);
        assert_eq!(priority_to_ical(6), 5);
        assert_eq!(priority_to_ical(7), 1);
        assert_eq!(priority_to_ical(9), 1);
    }

    #[test]
    fn test_alarm_trigger() {
        assert_eq!(alarm_trigger(&at(1, 0), &at(0, 45)), "-PT15M0S");
        assert_eq!(alarm_trigger(&at(1, 0), &at(2, 30)), "PT1H30M0S");
        assert_eq!(alarm_trigger(&at(1, 0), &at(1, 0)), "PT0S");
    }

    #[test]
    fn test_events_feed() {
        let events = vec![Event {
            summary: "Event #1".into(),
            description: "Lorem\nIpsum".into(),
            uid: "randommduid".into(),
            timestamp: at(1, 12),
            start: at(1, 12),
            end: at(3, 12),
            alarms: vec![Alarm {
                time: at(1, 0),
                description: String::new(),
            }],
            color: String::new(),
        }];

        let expected = "BEGIN:VCALENDAR
VERSION:2.0
METHOD:PUBLISH
X-PUBLISHED-TTL:PT4H
X-WR-CALNAME:test
PRODID:-//RandomProdID which is not random//EN
BEGIN:VEVENT
UID:randommduid
SUMMARY:Event #1
DESCRIPTION:Lorem\\nIpsum
DTSTAMP:20181201T011200Z
DTSTART:20181201T011200Z
DTEND:20181201T031200Z
BEGIN:VALARM
TRIGGER:-PT12M0S
ACTION:DISPLAY
DESCRIPTION:Event #1
END:VALARM
END:VEVENT
END:VCALENDAR";
        assert_eq!(events_to_ical(&config(), &events), expected);
    }

    #[test]
    fn test_todo_feed_with_colors_and_repeat() {
        let todos = vec![Todo {
            uid: "uid-1".into(),
            summary: "Todo #1".into(),
            description: "Lorem Ipsum".into(),
            color: "affffe".into(),
            timestamp: at(1, 12),
            start: Some(at(1, 12)),
            duration: Some(Duration::minutes(90)),
            priority: 9,
            repeat_after: 86400,
            created: Some(at(1, 0)),
            updated: at(1, 12),
            ..Default::default()
        }];

        let expected = "BEGIN:VCALENDAR
VERSION:2.0
METHOD:PUBLISH
X-PUBLISHED-TTL:PT4H
X-WR-CALNAME:test
PRODID:-//RandomProdID which is not random//EN
BEGIN:VTODO
UID:uid-1
DTSTAMP:20181201T011200Z
SUMMARY:Todo #1
X-APPLE-CALENDAR-COLOR:#affffeFF
X-OUTLOOK-COLOR:#affffeFF
X-FUNAMBOL-COLOR:#affffeFF
DTSTART:20181201T011200Z
DURATION:PT1H30M0S
DESCRIPTION:Lorem Ipsum
CREATED:20181201T010000Z
PRIORITY:1
RRULE:FREQ=SECONDLY;INTERVAL=86400
LAST-MODIFIED:20181201T011200Z
END:VTODO
END:VCALENDAR";
        assert_eq!(todos_to_ical(&config(), &todos), expected);
    }

    #[test]
    fn test_todo_monthly_done_and_absolute_alarm() {
        let todos = vec![Todo {
            uid: "uid-2".into(),
            summary: "Rent".into(),
            timestamp: at(1, 12),
            due_date: Some(Utc.with_ymd_and_hms(2018, 12, 5, 9, 0, 0).unwrap()),
            completed: Some(at(2, 0)),
            repeat_mode: RepeatMode::Month,
            alarms: vec![Alarm {
                time: at(8, 0),
                description: "Pay".into(),
            }],
            updated: at(2, 0),
            ..Default::default()
        }];

        let ical = todos_to_ical(&config(), &todos);
        assert!(ical.contains("\nCOMPLETED:20181201T020000Z\nSTATUS:COMPLETED\n"));
        assert!(ical.contains("\nDUE:20181205T090000Z\n"));
        assert!(ical.contains("\nRRULE:FREQ=MONTHLY;BYMONTHDAY=05\n"));
        assert!(ical.contains("\nTRIGGER:-PT97H0M0S\nACTION:DISPLAY\nDESCRIPTION:Pay\n"));

        let mut floating = todos[0].clone();
        floating.due_date = None;
        let ical = todos_to_ical(&config(), &[floating]);
        assert!(ical.contains("\nTRIGGER;VALUE=DATE-TIME:20181201T080000Z\n"));
    }

    #[test]
    fn test_generated_uid() {
        let todos = vec![Todo {
            summary: "Todo".into(),
            timestamp: at(1, 12),
            updated: at(1, 12),
            ..Default::default()
        }];
        let ical = todos_to_ical(&config(), &todos);
        let uid = ical.lines().find_map(|l| l.strip_prefix("UID:")).unwrap();
        assert!(uid.starts_with("20181201T011200Z"));
        assert_eq!(uid.len(), 16 + 64);
    }
}

use std::str::FromStr;

use chrono::Utc;

use super::{Alarm, Config, Event, PROD_ID, Todo, events_to_ical, parse_todo, todos_to_ical};
use crate::access::{Rights, load_list, require};
use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::events::Dispatcher;
use crate::service::{Window, tasks};
use crate::store::Session;
use crate::types::{List, RelationKind, Task};

/// Which component type a list calendar is rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarComponent {
    #[default]
    Todo,
    Event,
}

impl FromStr for CalendarComponent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "" | "vtodo" | "todo" => Ok(Self::Todo),
            "vevent" | "event" => Ok(Self::Event),
            other => Err(Error::BadRequest(format!("unknown calendar component '{other}'"))),
        }
    }
}

fn calendar_config(list: &List) -> Config {
    Config {
        name: list.title.clone(),
        prod_id: PROD_ID.to_string(),
        color: list.hex_color.clone(),
    }
}

fn alarms(task: &Task) -> Vec<Alarm> {
    task.reminder_dates
        .iter()
        .map(|time| Alarm {
            time: *time,
            description: task.title.clone(),
        })
        .collect()
}

fn task_to_todo(s: &Session<'_>, task: &Task) -> Result<Todo> {
    let related_to_uid = s
        .related_tasks(task.id)?
        .into_iter()
        .find(|(kind, _)| *kind == RelationKind::Parenttask)
        .map(|(_, parent)| parent.uid)
        .unwrap_or_default();

    let duration = match (task.start_date, task.end_date) {
        (Some(start), Some(end)) => Some(end - start),
        _ => None,
    };

    Ok(Todo {
        timestamp: task.updated,
        uid: task.uid.clone(),
        summary: task.title.clone(),
        description: task.description.clone(),
        completed: if task.done { task.done_at } else { None },
        priority: task.priority,
        related_to_uid,
        color: task.hex_color.clone(),
        start: task.start_date,
        end: task.end_date,
        due_date: task.due_date,
        duration,
        repeat_after: task.repeat_after,
        repeat_mode: task.repeat_mode,
        alarms: alarms(task),
        created: Some(task.created),
        updated: task.updated,
    })
}

/// Tasks without any date cannot be placed in a calendar and are skipped.
fn task_to_event(task: &Task) -> Option<Event> {
    let start = task.start_date.or(task.due_date)?;
    let end = task.end_date.or(task.due_date).unwrap_or(start);

    Some(Event {
        summary: task.title.clone(),
        description: task.description.clone(),
        uid: task.uid.clone(),
        alarms: alarms(task),
        color: task.hex_color.clone(),
        timestamp: task.updated,
        start,
        end,
    })
}

fn find_by_uid(s: &Session<'_>, list_id: i64, uid: &str) -> Result<Task> {
    s.get_task_by_uid(list_id, uid)?
        .ok_or_else(|| Error::TaskUidDoesNotExist { uid: uid.to_string() })
}

/// Renders every task of a list as one calendar.
pub fn list_calendar(s: &Session<'_>, auth: &Auth, list_id: i64, component: CalendarComponent) -> Result<String> {
    let list = load_list(s, list_id)?;
    let tasks = tasks::read_all(s, auth, list_id, &Window::all())?.items;
    let config = calendar_config(&list);

    let ical = match component {
        CalendarComponent::Todo => {
            let todos = tasks
                .iter()
                .map(|task| task_to_todo(s, task))
                .collect::<Result<Vec<_>>>()?;
            todos_to_ical(&config, &todos)
        }
        CalendarComponent::Event => {
            let events: Vec<Event> = tasks.iter().filter_map(task_to_event).collect();
            events_to_ical(&config, &events)
        }
    };
    Ok(ical)
}

/// One task as a single-VTODO calendar.
pub fn get_task(s: &Session<'_>, auth: &Auth, list_id: i64, uid: &str) -> Result<String> {
    let list = load_list(s, list_id)?;
    require(list.can_read(s, auth)?)?;
    let found = find_by_uid(s, list_id, uid)?;
    let task = tasks::read_one(s, auth, found.id)?;
    Ok(todos_to_ical(&calendar_config(&list), &[task_to_todo(s, &task)?]))
}

/// Stores an uploaded VTODO, updating the task with the same uid when one
/// exists in the list and creating it otherwise.
///
/// Fields the calendar does not carry (bucket, assignees, labels, progress)
/// are kept from the stored task.
pub fn put_task(
    s: &Session<'_>,
    auth: &Auth,
    events: &dyn Dispatcher,
    list_id: i64,
    uid: &str,
    body: &str,
) -> Result<Task> {
    let mut task = parse_todo(body)?;
    if task.uid.is_empty() {
        task.uid = uid.to_string();
    }
    task.list_id = list_id;
    if task.done && task.done_at.is_none() {
        task.done_at = Some(Utc::now());
    }

    match s.get_task_by_uid(list_id, &task.uid)? {
        Some(existing) => {
            let existing = tasks::read_one(s, auth, existing.id)?;
            task.id = existing.id;
            task.bucket_id = existing.bucket_id;
            task.assignees = existing.assignees;
            task.percent_done = existing.percent_done;
            task.position = existing.position;
            tasks::update(s, auth, &mut task)?;
            tracing::debug!(task_id = task.id, uid = %task.uid, "Updated task from caldav");
        }
        None => {
            tasks::create(s, auth, events, &mut task)?;
            tracing::debug!(task_id = task.id, uid = %task.uid, "Created task from caldav");
        }
    }
    Ok(task)
}

pub fn delete_task(s: &Session<'_>, auth: &Auth, list_id: i64, uid: &str) -> Result<()> {
    let list = load_list(s, list_id)?;
    require(list.can_read(s, auth)?)?;
    let task = find_by_uid(s, list_id, uid)?;
    tasks::delete(s, auth, task.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use crate::types::{ListUser, Right};
    use chrono::{Duration, TimeZone};

    const UPLOAD: &str = "BEGIN:VCALENDAR
VERSION:2.0
PRODID:-//Client//EN
BEGIN:VTODO
UID:client-1
DTSTAMP:20190403T102030Z
SUMMARY:Call the plumber
PRIORITY:1
DUE:20190410T090000Z
BEGIN:VALARM
TRIGGER:-PT1H
ACTION:DISPLAY
END:VALARM
END:VTODO
END:VCALENDAR
";

    #[test]
    fn test_component_from_query() {
        assert_eq!("vevent".parse::<CalendarComponent>().unwrap(), CalendarComponent::Event);
        assert_eq!("".parse::<CalendarComponent>().unwrap(), CalendarComponent::Todo);
        assert!("vjournal".parse::<CalendarComponent>().is_err());
    }

    #[test]
    fn test_put_creates_then_updates() {
        let fx = Fixture::new();
        let s = fx.session();
        let auth = fx.auth(&fx.owner);

        let created = put_task(&s, &auth, &fx.events, fx.list.id, "client-1", UPLOAD).unwrap();
        assert_eq!(created.title, "Call the plumber");
        assert_eq!(created.priority, 8);
        assert_eq!(created.bucket_id, fx.bucket.id);
        assert_eq!(
            created.reminder_dates,
            vec![Utc.with_ymd_and_hms(2019, 4, 10, 8, 0, 0).unwrap()]
        );

        let renamed = UPLOAD.replace("Call the plumber", "Call the electrician");
        let updated = put_task(&s, &auth, &fx.events, fx.list.id, "client-1", &renamed).unwrap();
        assert_eq!(updated.id, created.id);

        let page = tasks::read_all(&s, &auth, fx.list.id, &Window::all()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "Call the electrician");
    }

    #[test]
    fn test_calendar_needs_read_access() {
        let fx = Fixture::new();
        let s = fx.session();
        put_task(&s, &fx.auth(&fx.owner), &fx.events, fx.list.id, "client-1", UPLOAD).unwrap();

        let result = list_calendar(&s, &fx.auth(&fx.bob), fx.list.id, CalendarComponent::Todo);
        assert!(matches!(result, Err(Error::Forbidden)));

        let mut relation = ListUser {
            username: "bob".into(),
            list_id: fx.list.id,
            right: Right::READ,
            ..Default::default()
        };
        crate::service::sharing::create(&s, &fx.auth(&fx.owner), &fx.events, &mut relation).unwrap();

        let ical = list_calendar(&s, &fx.auth(&fx.bob), fx.list.id, CalendarComponent::Todo).unwrap();
        assert!(ical.starts_with("BEGIN:VCALENDAR\nVERSION:2.0\nMETHOD:PUBLISH\nX-PUBLISHED-TTL:PT4H\nX-WR-CALNAME:Groceries\n"));
        assert!(ical.contains("\nUID:client-1\n"));
        assert!(!ical.contains("ORGANIZER"));
        assert!(ical.contains("\nTRIGGER:-PT1H0M0S\n"));

        let other = UPLOAD.replace("client-1", "client-2");
        let put = put_task(&s, &fx.auth(&fx.bob), &fx.events, fx.list.id, "client-2", &other);
        assert!(matches!(put, Err(Error::Forbidden)));
    }

    #[test]
    fn test_non_reader_cannot_tell_missing_uids() {
        let fx = Fixture::new();
        let s = fx.session();
        put_task(&s, &fx.auth(&fx.owner), &fx.events, fx.list.id, "client-1", UPLOAD).unwrap();
        let stranger = fx.auth(&fx.bob);

        for uid in ["client-1", "missing"] {
            assert!(matches!(get_task(&s, &stranger, fx.list.id, uid), Err(Error::Forbidden)));
            assert!(matches!(delete_task(&s, &stranger, fx.list.id, uid), Err(Error::Forbidden)));
        }
    }

    #[test]
    fn test_event_feed_skips_undated_tasks() {
        let fx = Fixture::new();
        let s = fx.session();
        let auth = fx.auth(&fx.owner);
        let start = Utc.with_ymd_and_hms(2021, 6, 1, 9, 0, 0).unwrap();

        let mut dated = Task {
            title: "Dentist".into(),
            list_id: fx.list.id,
            start_date: Some(start),
            end_date: Some(start + Duration::hours(1)),
            ..Default::default()
        };
        tasks::create(&s, &auth, &fx.events, &mut dated).unwrap();
        let mut undated = Task {
            title: "Someday".into(),
            list_id: fx.list.id,
            ..Default::default()
        };
        tasks::create(&s, &auth, &fx.events, &mut undated).unwrap();

        let ical = list_calendar(&s, &auth, fx.list.id, CalendarComponent::Event).unwrap();
        assert_eq!(ical.matches("BEGIN:VEVENT").count(), 1);
        assert!(ical.contains("\nDTSTART:20210601T090000Z\nDTEND:20210601T100000Z"));
    }

    #[test]
    fn test_get_and_delete_by_uid() {
        let fx = Fixture::new();
        let s = fx.session();
        let auth = fx.auth(&fx.owner);
        put_task(&s, &auth, &fx.events, fx.list.id, "client-1", UPLOAD).unwrap();

        let ical = get_task(&s, &auth, fx.list.id, "client-1").unwrap();
        assert_eq!(ical.matches("BEGIN:VTODO").count(), 1);
        assert!(!ical.contains("ORGANIZER"));

        delete_task(&s, &auth, fx.list.id, "client-1").unwrap();
        assert!(matches!(
            get_task(&s, &auth, fx.list.id, "client-1"),
            Err(Error::TaskUidDoesNotExist { .. })
        ));
    }
}

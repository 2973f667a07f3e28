//! Date arithmetic for repeating tasks marked done.

use chrono::{DateTime, Duration, Months, Utc};

use crate::types::{RepeatMode, Task};

/// Applies the done transition from `original` to `task` at `now`.
///
/// A repeating task that becomes done is rescheduled and stays undone.
/// `done_at` is stamped whenever the task becomes done and cleared when it
/// is reopened.
pub fn apply_done_transition(original: &Task, task: &mut Task, now: DateTime<Utc>) {
    if !original.done && task.done {
        match task.repeat_mode {
            RepeatMode::Default => add_repeat_intervals(original, task, now),
            RepeatMode::Month => add_one_month(original, task),
            RepeatMode::FromCurrentDate => reschedule_from(original, task, now),
        }
        task.done_at = Some(now);
    } else if original.done && !task.done {
        task.done_at = None;
    } else {
        task.done_at = original.done_at;
    }
}

/// The repeat interval of a task, `None` when it does not repeat.
fn interval(task: &Task) -> Option<Duration> {
    if task.repeat_after <= 0 {
        return None;
    }
    let interval = Duration::try_seconds(task.repeat_after);
    if interval.is_none() {
        tracing::warn!(task_id = task.id, repeat_after = task.repeat_after, "repeat interval out of range");
    }
    interval
}

/// Adds the interval at least once, then until the date lies after `now`.
/// A date that would leave the representable range is kept as it is.
fn advance_past(date: DateTime<Utc>, interval: Duration, now: DateTime<Utc>) -> DateTime<Utc> {
    let step = interval.num_seconds();
    let behind = (now - date).num_seconds();
    let steps = if behind < 0 { 1 } else { behind / step + 1 };

    step.checked_mul(steps)
        .and_then(Duration::try_seconds)
        .and_then(|offset| date.checked_add_signed(offset))
        .unwrap_or_else(|| {
            tracing::warn!(%date, step, "repeated date out of range");
            date
        })
}

fn add_repeat_intervals(original: &Task, task: &mut Task, now: DateTime<Utc>) {
    let Some(interval) = interval(original) else {
        return;
    };

    task.due_date = original.due_date.map(|d| advance_past(d, interval, now));
    task.start_date = original.start_date.map(|d| advance_past(d, interval, now));
    task.end_date = original.end_date.map(|d| advance_past(d, interval, now));
    task.reminder_dates = original
        .reminder_dates
        .iter()
        .map(|d| advance_past(*d, interval, now))
        .collect();
    task.done = false;
}

fn add_one_month(original: &Task, task: &mut Task) {
    let shift = |d: DateTime<Utc>| d.checked_add_months(Months::new(1)).unwrap_or(d);

    task.due_date = original.due_date.map(shift);
    task.start_date = original.start_date.map(shift);
    task.end_date = original.end_date.map(shift);
    task.reminder_dates = original.reminder_dates.iter().copied().map(shift).collect();
    task.done = false;
}

/// New dates are `now + interval`, keeping their distance to the reference
/// date: the due date, else the first reminder, else the start date.
fn reschedule_from(original: &Task, task: &mut Task, now: DateTime<Utc>) {
    let Some(interval) = interval(original) else {
        return;
    };

    let reference = original
        .due_date
        .or_else(|| original.reminder_dates.first().copied())
        .or(original.start_date)
        .or(original.end_date);
    let Some(reference) = reference else {
        task.done = false;
        return;
    };

    let shift = |d: DateTime<Utc>| {
        (d - reference)
            .checked_add(&interval)
            .and_then(|offset| now.checked_add_signed(offset))
            .unwrap_or(d)
    };

    task.due_date = original.due_date.map(shift);
    task.start_date = original.start_date.map(shift);
    task.end_date = original.end_date.map(shift);
    task.reminder_dates = original.reminder_dates.iter().copied().map(shift).collect();
    task.done = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 31, hour, 0, 0).unwrap()
    }

    fn repeating(mode: RepeatMode, repeat_after: i64) -> Task {
        Task {
            title: "Water plants".into(),
            due_date: Some(at(12)),
            repeat_after,
            repeat_mode: mode,
            ..Default::default()
        }
    }

    fn mark_done(original: &Task, now: DateTime<Utc>) -> Task {
        let mut task = original.clone();
        task.done = true;
        apply_done_transition(original, &mut task, now);
        task
    }

    #[test]
    fn test_default_mode_advances_by_interval() {
        let original = repeating(RepeatMode::Default, 3600);
        let task = mark_done(&original, at(10));
        assert!(!task.done);
        assert_eq!(task.due_date, Some(at(13)));
        assert_eq!(task.done_at, Some(at(10)));
    }

    #[test]
    fn test_default_mode_catches_up_past_now() {
        let original = repeating(RepeatMode::Default, 3600);
        let task = mark_done(&original, at(15));
        assert_eq!(task.due_date, Some(at(16)));
    }

    #[test]
    fn test_no_interval_stays_done() {
        let original = repeating(RepeatMode::Default, 0);
        let task = mark_done(&original, at(10));
        assert!(task.done);
        assert_eq!(task.due_date, Some(at(12)));
        assert_eq!(task.done_at, Some(at(10)));
    }

    #[test]
    fn test_month_mode_adds_calendar_month() {
        let original = repeating(RepeatMode::Month, 0);
        let task = mark_done(&original, at(10));
        assert!(!task.done);
        assert_eq!(
            task.due_date,
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_from_current_date_keeps_offsets() {
        let mut original = repeating(RepeatMode::FromCurrentDate, 7200);
        original.start_date = Some(at(11));
        original.reminder_dates = vec![at(9)];

        let task = mark_done(&original, at(20));
        assert!(!task.done);
        assert_eq!(task.due_date, Some(at(22)));
        assert_eq!(task.start_date, Some(at(21)));
        assert_eq!(task.reminder_dates, vec![at(19)]);
    }

    #[test]
    fn test_decades_old_due_date_catches_up_at_once() {
        let mut original = repeating(RepeatMode::Default, 1);
        original.due_date = Some(Utc.with_ymd_and_hms(1980, 1, 1, 0, 0, 0).unwrap());

        let now = at(10);
        let task = mark_done(&original, now);
        assert!(!task.done);
        assert_eq!(task.due_date, Some(now + Duration::seconds(1)));
    }

    #[test]
    fn test_out_of_range_interval_keeps_dates() {
        for mode in [RepeatMode::Default, RepeatMode::FromCurrentDate] {
            let original = repeating(mode, i64::MAX);
            let task = mark_done(&original, at(10));
            assert!(task.done);
            assert_eq!(task.due_date, Some(at(12)));
        }

        let original = repeating(RepeatMode::Default, i64::MAX / 1000);
        let task = mark_done(&original, at(10));
        assert_eq!(task.due_date, Some(at(12)));
    }

    #[test]
    fn test_reopening_clears_done_at() {
        let mut original = repeating(RepeatMode::Default, 0);
        original.done = true;
        original.done_at = Some(at(8));

        let mut task = original.clone();
        task.done = false;
        apply_done_transition(&original, &mut task, at(10));
        assert_eq!(task.done_at, None);
    }
}

//! Tasks with their reminders, assignees, relations and attachments.

use chrono::Utc;
use uuid::Uuid;

use super::buckets::{check_limit, load_bucket};
use super::repeat::apply_done_transition;
use super::{Paged, Window};
use crate::access::{Rights, load_list, load_task, require};
use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::events::{Dispatcher, Event};
use crate::files::FileStorage;
use crate::store::Session;
use crate::types::{Bucket, List, Task, TaskAttachment, TaskRelation, User};

use super::lists::DEFAULT_BUCKET_TITLE;

/// Longest accepted repeat interval, in seconds: one hundred years.
pub const MAX_REPEAT_AFTER: i64 = 100 * 366 * 86_400;

fn validate(task: &Task) -> Result<()> {
    if task.title.trim().is_empty() {
        return Err(Error::TaskCannotBeEmpty);
    }
    if !(0..=9).contains(&task.priority) {
        return Err(Error::InvalidTaskPriority {
            priority: task.priority,
        });
    }
    if !(0..=MAX_REPEAT_AFTER).contains(&task.repeat_after) {
        return Err(Error::InvalidRepeatInterval {
            repeat_after: task.repeat_after,
        });
    }
    Ok(())
}

fn identifier(list: &List, index: i64) -> String {
    if list.identifier.is_empty() {
        format!("#{index}")
    } else {
        format!("{}-{index}", list.identifier)
    }
}

/// The list's first bucket, created when the list has none left.
fn default_bucket(s: &Session<'_>, list_id: i64, created_by_id: i64) -> Result<Bucket> {
    if let Some(bucket) = s.default_bucket(list_id)? {
        return Ok(bucket);
    }
    let mut bucket = Bucket {
        title: DEFAULT_BUCKET_TITLE.to_string(),
        list_id,
        created_by_id,
        ..Default::default()
    };
    s.create_bucket(&mut bucket)?;
    Ok(bucket)
}

fn bucket_in_list(s: &Session<'_>, bucket_id: i64, list_id: i64) -> Result<Bucket> {
    let bucket = load_bucket(s, bucket_id)?;
    if bucket.list_id != list_id {
        return Err(Error::BucketDoesNotBelongToList { bucket_id, list_id });
    }
    Ok(bucket)
}

/// Assignees may be given by id or by username.
fn resolve_assignees(s: &Session<'_>, assignees: &[User]) -> Result<Vec<User>> {
    assignees
        .iter()
        .map(|wanted| {
            let found = if wanted.id > 0 {
                s.get_user(wanted.id)?
            } else {
                s.get_user_by_username(&wanted.username)?
            };
            found.ok_or_else(|| Error::UserDoesNotExist {
                user: if wanted.id > 0 {
                    wanted.id.to_string()
                } else {
                    wanted.username.clone()
                },
            })
        })
        .collect()
}

fn store_details(s: &Session<'_>, task: &mut Task) -> Result<()> {
    task.reminder_dates.sort();
    s.set_task_reminders(task.id, &task.reminder_dates)?;

    let assignees = resolve_assignees(s, &task.assignees)?;
    let ids: Vec<i64> = assignees.iter().map(|u| u.id).collect();
    s.set_task_assignees(task.id, &ids)?;
    task.assignees = assignees;
    Ok(())
}

/// Loads reminders, assignees and labels onto a bare task row.
fn add_details(s: &Session<'_>, list: &List, task: &mut Task) -> Result<()> {
    task.reminder_dates = s.task_reminders(task.id)?;
    task.assignees = s.task_assignees(task.id)?;
    for user in &mut task.assignees {
        user.email.clear();
    }
    task.labels = s.task_labels(task.id, "")?;
    task.identifier = identifier(list, task.index);
    Ok(())
}

/// Creates a task in `task.list_id`.
///
/// Without a bucket the task lands in the list's default bucket. Landing in
/// the done bucket marks it done.
pub fn create(s: &Session<'_>, auth: &Auth, events: &dyn Dispatcher, task: &mut Task) -> Result<()> {
    validate(task)?;
    require(task.can_create(s, auth)?)?;
    let list = load_list(s, task.list_id)?;

    let bucket = if task.bucket_id == 0 {
        default_bucket(s, list.id, auth.id())?
    } else {
        bucket_in_list(s, task.bucket_id, list.id)?
    };
    check_limit(s, &bucket)?;
    task.bucket_id = bucket.id;
    if bucket.is_done_bucket {
        task.done = true;
    }

    if task.uid.is_empty() {
        task.uid = Uuid::new_v4().to_string();
    }
    task.done_at = task.done.then(Utc::now);
    task.index = s.next_task_index(list.id)?;
    task.identifier = identifier(&list, task.index);
    task.created_by_id = auth.id();

    s.create_task(task)?;
    store_details(s, task)?;
    s.touch_list(list.id)?;

    events.dispatch(Event::TaskCreated {
        task: task.clone(),
        doer_id: auth.id(),
    })?;

    tracing::debug!(task_id = task.id, list_id = list.id, "Created task");
    Ok(())
}

/// Replaces the editable fields of a task.
///
/// `list_id == 0` keeps the task in its list. Moving to another list without
/// naming a bucket puts it into that list's default bucket.
pub fn update(s: &Session<'_>, auth: &Auth, task: &mut Task) -> Result<()> {
    let mut original = load_task(s, task.id)?;
    original.reminder_dates = s.task_reminders(original.id)?;
    require(task.can_update(s, auth)?)?;
    validate(task)?;

    if task.list_id == 0 {
        task.list_id = original.list_id;
    }
    let list = load_list(s, task.list_id)?;
    let moved_list = task.list_id != original.list_id;

    let bucket_id = match task.bucket_id {
        0 if moved_list => default_bucket(s, list.id, auth.id())?.id,
        0 => original.bucket_id,
        id => id,
    };
    let mut bucket = bucket_in_list(s, bucket_id, list.id)?;

    let done_bucket = s.done_bucket(list.id)?;
    if task.done && !original.done {
        if let Some(done_bucket) = &done_bucket {
            bucket = done_bucket.clone();
        }
    }
    if bucket.id != original.bucket_id {
        check_limit(s, &bucket)?;
    }
    if bucket.is_done_bucket {
        task.done = true;
    } else if done_bucket.as_ref().is_some_and(|b| b.id == original.bucket_id) && original.done {
        task.done = false;
    }
    task.bucket_id = bucket.id;

    apply_done_transition(&original, task, Utc::now());
    if bucket.is_done_bucket && !task.done {
        // A repeating task left undone goes back to the default bucket.
        task.bucket_id = default_bucket(s, list.id, auth.id())?.id;
    }

    if task.uid.is_empty() {
        task.uid = original.uid.clone();
    }
    task.index = if moved_list {
        s.next_task_index(list.id)?
    } else {
        original.index
    };
    task.identifier = identifier(&list, task.index);
    task.created_by_id = original.created_by_id;
    task.created = original.created;

    s.update_task(task)?;
    store_details(s, task)?;
    s.touch_list(list.id)?;
    Ok(())
}

pub fn delete(s: &Session<'_>, auth: &Auth, task_id: i64) -> Result<()> {
    let task = load_task(s, task_id)?;
    require(task.can_delete(s, auth)?)?;
    s.delete_task(task_id)?;
    s.touch_list(task.list_id)?;
    tracing::debug!(task_id, "Deleted task");
    Ok(())
}

/// A task with everything attached to it.
pub fn read_one(s: &Session<'_>, auth: &Auth, task_id: i64) -> Result<Task> {
    let mut task = load_task(s, task_id)?;
    require(task.can_read(s, auth)?)?;
    let list = load_list(s, task.list_id)?;

    add_details(s, &list, &mut task)?;
    for (kind, related) in s.related_tasks(task.id)? {
        task.related_tasks.entry(kind).or_default().push(related);
    }
    task.attachments = s.task_attachments(task.id)?;
    Ok(task)
}

/// Tasks of one list, undone first, searchable by title.
pub fn read_all(s: &Session<'_>, auth: &Auth, list_id: i64, window: &Window) -> Result<Paged<Task>> {
    let list = load_list(s, list_id)?;
    require(list.can_read(s, auth)?)?;

    let mut items = s.list_tasks(list_id, &window.search, window.limit, window.offset)?;
    for task in &mut items {
        add_details(s, &list, task)?;
    }
    let total = s.count_tasks(list_id, &window.search)?;

    Ok(Paged {
        items,
        total,
        limit: window.limit,
    })
}

/// Relates two tasks and stores the inverse relation on the other task.
pub fn create_relation(s: &Session<'_>, auth: &Auth, relation: &mut TaskRelation) -> Result<()> {
    if relation.task_id == relation.other_task_id {
        return Err(Error::RelationTasksCannotBeTheSame {
            task_id: relation.task_id,
        });
    }
    require(relation.can_create(s, auth)?)?;

    if s.task_relation_exists(relation.task_id, relation.other_task_id, relation.relation_kind)? {
        return Err(Error::RelationAlreadyExists {
            kind: relation.relation_kind,
            task_id: relation.task_id,
            other_task_id: relation.other_task_id,
        });
    }

    relation.created_by_id = auth.id();
    relation.created = Utc::now();
    s.create_task_relation(relation)?;

    let inverse = TaskRelation {
        task_id: relation.other_task_id,
        other_task_id: relation.task_id,
        relation_kind: relation.relation_kind.inverse(),
        created_by_id: relation.created_by_id,
        created: relation.created,
    };
    if !s.task_relation_exists(inverse.task_id, inverse.other_task_id, inverse.relation_kind)? {
        s.create_task_relation(&inverse)?;
    }
    Ok(())
}

/// Removes a relation together with its inverse.
pub fn delete_relation(s: &Session<'_>, auth: &Auth, relation: &TaskRelation) -> Result<()> {
    require(relation.can_delete(s, auth)?)?;

    if !s.delete_task_relation(relation.task_id, relation.other_task_id, relation.relation_kind)? {
        return Err(Error::RelationDoesNotExist {
            kind: relation.relation_kind,
            task_id: relation.task_id,
            other_task_id: relation.other_task_id,
        });
    }
    s.delete_task_relation(
        relation.other_task_id,
        relation.task_id,
        relation.relation_kind.inverse(),
    )?;
    Ok(())
}

/// Stores an uploaded file and attaches it to the task.
pub fn add_attachment(
    s: &Session<'_>,
    auth: &Auth,
    files: &dyn FileStorage,
    task_id: i64,
    name: &str,
    content: &[u8],
) -> Result<TaskAttachment> {
    let task = load_task(s, task_id)?;
    require(task.can_update(s, auth)?)?;

    let file = files.create(s, content, name, auth.id())?;
    s.create_task_attachment(task_id, &file, auth.id())
}

/// An attachment with its file contents.
pub fn read_attachment(
    s: &Session<'_>,
    auth: &Auth,
    files: &dyn FileStorage,
    task_id: i64,
    attachment_id: i64,
) -> Result<(TaskAttachment, Vec<u8>)> {
    let task = load_task(s, task_id)?;
    require(task.can_read(s, auth)?)?;

    let attachment = s
        .task_attachments(task_id)?
        .into_iter()
        .find(|a| a.id == attachment_id)
        .ok_or(Error::TaskAttachmentDoesNotExist { attachment_id })?;
    let content = files.read(&attachment.file)?;
    Ok((attachment, content))
}

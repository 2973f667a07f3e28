use std::collections::BTreeMap;

use chrono::Utc;

use super::namespaces::page_slice;
use super::{Paged, Window};
use crate::access::{Rights, load_label, load_task, require};
use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::store::Session;
use crate::types::{Label, LabelTask};

fn validate(label: &Label) -> Result<()> {
    if label.title.trim().is_empty() {
        return Err(Error::BadRequest("the label title must not be empty".to_string()));
    }
    Ok(())
}

pub fn create(s: &Session<'_>, auth: &Auth, label: &mut Label) -> Result<()> {
    require(label.can_create(s, auth)?)?;
    validate(label)?;

    label.created_by_id = auth.id();
    s.create_label(label)
}

pub fn read_one(s: &Session<'_>, auth: &Auth, label_id: i64) -> Result<Label> {
    let label = load_label(s, label_id)?;
    require(label.can_read(s, auth)?)?;
    Ok(label)
}

pub fn update(s: &Session<'_>, auth: &Auth, label: &mut Label) -> Result<()> {
    let original = load_label(s, label.id)?;
    require(label.can_update(s, auth)?)?;
    validate(label)?;

    label.created_by_id = original.created_by_id;
    label.created = original.created;
    s.update_label(label)
}

pub fn delete(s: &Session<'_>, auth: &Auth, label_id: i64) -> Result<()> {
    let label = load_label(s, label_id)?;
    require(label.can_delete(s, auth)?)?;
    s.delete_label(label_id)?;
    Ok(())
}

/// Labels the caller created plus every label used on a task they can read.
pub fn read_all(s: &Session<'_>, auth: &Auth, window: &Window) -> Result<Paged<Label>> {
    let mut found = BTreeMap::new();

    let list_ids: Vec<i64> = match auth {
        Auth::LinkShare(share) => vec![share.list_id],
        Auth::User(user) => {
            for label in s.labels_created_by(user.id, &window.search)? {
                found.insert(label.id, label);
            }
            s.list_user_lists(user.id, "", true)?
                .into_iter()
                .map(|list| list.id)
                .collect()
        }
    };
    for list_id in list_ids {
        for label in s.labels_on_list_tasks(list_id, &window.search)? {
            found.entry(label.id).or_insert(label);
        }
    }

    let all: Vec<Label> = found.into_values().collect();
    let total = all.len() as i64;
    Ok(Paged {
        items: page_slice(all, window),
        total,
        limit: window.limit,
    })
}

/// Puts a label on a task.
pub fn add_to_task(s: &Session<'_>, auth: &Auth, label_task: &mut LabelTask) -> Result<()> {
    require(label_task.can_create(s, auth)?)?;

    if s.label_is_on_task(label_task.label_id, label_task.task_id)? {
        return Err(Error::LabelIsAlreadyOnTask {
            label_id: label_task.label_id,
            task_id: label_task.task_id,
        });
    }

    label_task.id = s.add_label_to_task(label_task.label_id, label_task.task_id)?;
    label_task.created = Utc::now();
    Ok(())
}

pub fn remove_from_task(s: &Session<'_>, auth: &Auth, label_task: &LabelTask) -> Result<()> {
    require(label_task.can_delete(s, auth)?)?;

    if !s.remove_label_from_task(label_task.label_id, label_task.task_id)? {
        return Err(Error::LabelDoesNotExist {
            label_id: label_task.label_id,
        });
    }
    Ok(())
}

/// Labels on one task.
pub fn read_all_for_task(s: &Session<'_>, auth: &Auth, task_id: i64, window: &Window) -> Result<Paged<Label>> {
    let task = load_task(s, task_id)?;
    require(task.can_read(s, auth)?)?;

    let all = s.task_labels(task_id, &window.search)?;
    let total = all.len() as i64;
    Ok(Paged {
        items: page_slice(all, window),
        total,
        limit: window.limit,
    })
}

/// Makes the task carry exactly `labels`: missing ones are added, the rest removed.
pub fn bulk_set(s: &Session<'_>, auth: &Auth, task_id: i64, labels: &[Label]) -> Result<Vec<Label>> {
    let task = load_task(s, task_id)?;
    require(task.can_update(s, auth)?)?;

    let current = s.task_labels(task_id, "")?;
    for label in &current {
        if !labels.iter().any(|l| l.id == label.id) {
            s.remove_label_from_task(label.id, task_id)?;
        }
    }

    for label in labels {
        if current.iter().any(|l| l.id == label.id) {
            continue;
        }
        let mut label_task = LabelTask {
            label_id: label.id,
            task_id,
            ..Default::default()
        };
        add_to_task(s, auth, &mut label_task)?;
    }

    s.task_labels(task_id, "")
}

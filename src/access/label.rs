use super::{Rights, list_access, load_list};
use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::store::Session;
use crate::types::{Label, LabelTask, Task};

pub fn load_label(s: &Session<'_>, label_id: i64) -> Result<Label> {
    s.get_label(label_id)?.ok_or(Error::LabelDoesNotExist { label_id })
}

/// A label is visible to its creator and to anyone who can read a task carrying it.
fn has_access_to_label(s: &Session<'_>, auth: &Auth, label: &Label) -> Result<bool> {
    if auth.id() == label.created_by_id {
        return Ok(true);
    }
    for list_id in s.lists_with_label(label.id)? {
        let list = load_list(s, list_id)?;
        if list_access(s, auth, &list)?.can_read() {
            return Ok(true);
        }
    }
    Ok(false)
}

impl Rights for Label {
    fn can_read(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        let label = load_label(s, self.id)?;
        has_access_to_label(s, auth, &label)
    }

    fn can_create(&self, _s: &Session<'_>, auth: &Auth) -> Result<bool> {
        Ok(!auth.is_link_share())
    }

    /// Only the creator may change a label.
    fn can_update(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        if auth.is_link_share() {
            return Ok(false);
        }
        let label = load_label(s, self.id)?;
        Ok(label.created_by_id == auth.id())
    }

    fn can_delete(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        self.can_update(s, auth)
    }
}

impl Rights for LabelTask {
    fn can_read(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        Task { id: self.task_id, ..Default::default() }.can_read(s, auth)
    }

    fn can_create(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        let label = load_label(s, self.label_id)?;
        if !has_access_to_label(s, auth, &label)? {
            return Err(Error::UserHasNoAccessToLabel {
                label_id: self.label_id,
            });
        }
        Task { id: self.task_id, ..Default::default() }.can_update(s, auth)
    }

    fn can_update(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        self.can_create(s, auth)
    }

    fn can_delete(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        Task { id: self.task_id, ..Default::default() }.can_update(s, auth)
    }
}

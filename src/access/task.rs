use super::{Rights, list_access, list_write_check, load_list};
use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::store::Session;
use crate::types::{Task, TaskRelation};

pub fn load_task(s: &Session<'_>, task_id: i64) -> Result<Task> {
    s.get_task(task_id)?.ok_or(Error::TaskDoesNotExist { task_id })
}

fn can_write_task_list(s: &Session<'_>, auth: &Auth, list_id: i64) -> Result<bool> {
    let list = load_list(s, list_id)?;
    list_write_check(s, auth, &list)
}

impl Rights for Task {
    fn can_read(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        let task = load_task(s, self.id)?;
        let list = load_list(s, task.list_id)?;
        Ok(list_access(s, auth, &list)?.can_read())
    }

    fn can_create(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        can_write_task_list(s, auth, self.list_id)
    }

    /// Moving a task also needs write access on the destination list.
    fn can_update(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        let original = load_task(s, self.id)?;
        if !can_write_task_list(s, auth, original.list_id)? {
            return Ok(false);
        }
        if self.list_id != 0 && self.list_id != original.list_id {
            return can_write_task_list(s, auth, self.list_id);
        }
        Ok(true)
    }

    fn can_delete(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        let original = load_task(s, self.id)?;
        can_write_task_list(s, auth, original.list_id)
    }
}

impl Rights for TaskRelation {
    fn can_read(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        Task { id: self.task_id, ..Default::default() }.can_read(s, auth)
    }

    /// Needs write on the base task and read on the other one.
    fn can_create(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        let base = Task { id: self.task_id, ..Default::default() };
        if !base.can_update(s, auth)? {
            return Ok(false);
        }
        Task { id: self.other_task_id, ..Default::default() }.can_read(s, auth)
    }

    fn can_update(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        self.can_create(s, auth)
    }

    fn can_delete(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        Task { id: self.task_id, ..Default::default() }.can_update(s, auth)
    }
}

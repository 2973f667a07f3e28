//! Kanban buckets. A list always keeps at least one bucket and at most one
//! done bucket.

use std::collections::HashMap;

use serde::Serialize;

use crate::access::{Rights, load_list, require};
use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::store::Session;
use crate::types::{Bucket, Task};

#[derive(Debug, Clone, Serialize)]
pub struct BucketWithTasks {
    #[serde(flatten)]
    pub bucket: Bucket,
    pub tasks: Vec<Task>,
}

pub(crate) fn load_bucket(s: &Session<'_>, bucket_id: i64) -> Result<Bucket> {
    s.get_bucket(bucket_id)?
        .ok_or(Error::BucketDoesNotExist { bucket_id })
}

/// Fails when one more task would exceed the bucket's limit. A limit of 0
/// means unlimited.
pub(crate) fn check_limit(s: &Session<'_>, bucket: &Bucket) -> Result<()> {
    if bucket.limit > 0 && s.count_tasks_in_bucket(bucket.id)? >= bucket.limit {
        return Err(Error::BucketLimitExceeded {
            bucket_id: bucket.id,
            limit: bucket.limit,
        });
    }
    Ok(())
}

fn validate(s: &Session<'_>, bucket: &Bucket) -> Result<()> {
    if bucket.title.trim().is_empty() {
        return Err(Error::BadRequest("the bucket title must not be empty".to_string()));
    }
    if bucket.limit < 0 {
        return Err(Error::BadRequest("the bucket limit must not be negative".to_string()));
    }
    if bucket.is_done_bucket {
        if let Some(done) = s.done_bucket(bucket.list_id)? {
            if done.id != bucket.id {
                return Err(Error::OnlyOneDoneBucketPerList {
                    bucket_id: done.id,
                    list_id: bucket.list_id,
                });
            }
        }
    }
    Ok(())
}

pub fn create(s: &Session<'_>, auth: &Auth, bucket: &mut Bucket) -> Result<()> {
    require(bucket.can_create(s, auth)?)?;
    validate(s, bucket)?;

    bucket.created_by_id = auth.id();
    s.create_bucket(bucket)?;
    tracing::debug!(bucket_id = bucket.id, list_id = bucket.list_id, "Created bucket");
    Ok(())
}

pub fn update(s: &Session<'_>, auth: &Auth, bucket: &mut Bucket) -> Result<()> {
    require(bucket.can_update(s, auth)?)?;
    let original = load_bucket(s, bucket.id)?;

    bucket.list_id = original.list_id;
    bucket.created_by_id = original.created_by_id;
    bucket.created = original.created;
    validate(s, bucket)?;

    s.update_bucket(bucket)
}

/// Deletes a bucket and moves its tasks into the list's default bucket.
pub fn delete(s: &Session<'_>, auth: &Auth, list_id: i64, bucket_id: i64) -> Result<()> {
    let scope = Bucket {
        id: bucket_id,
        list_id,
        ..Default::default()
    };
    require(scope.can_delete(s, auth)?)?;

    if s.count_buckets(list_id)? <= 1 {
        return Err(Error::CannotRemoveLastBucket { bucket_id, list_id });
    }

    s.delete_bucket(bucket_id)?;
    let default = s
        .default_bucket(list_id)?
        .ok_or(Error::CannotRemoveLastBucket { bucket_id, list_id })?;
    s.move_bucket_tasks(bucket_id, default.id)?;

    tracing::debug!(bucket_id, list_id, moved_to = default.id, "Deleted bucket");
    Ok(())
}

/// All buckets of a list, each with its tasks.
pub fn read_all(s: &Session<'_>, auth: &Auth, list_id: i64) -> Result<Vec<BucketWithTasks>> {
    let list = load_list(s, list_id)?;
    require(list.can_read(s, auth)?)?;

    let mut by_bucket: HashMap<i64, Vec<Task>> = HashMap::new();
    for task in s.list_tasks(list_id, "", -1, 0)? {
        by_bucket.entry(task.bucket_id).or_default().push(task);
    }

    Ok(s.list_buckets(list_id)?
        .into_iter()
        .map(|bucket| BucketWithTasks {
            tasks: by_bucket.remove(&bucket.id).unwrap_or_default(),
            bucket,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    fn new_bucket(fx: &Fixture, title: &str) -> Bucket {
        Bucket {
            title: title.to_string(),
            list_id: fx.list.id,
            ..Default::default()
        }
    }

    #[test]
    fn test_last_bucket_cannot_be_deleted() {
        let fx = Fixture::new();
        let s = fx.session();
        let result = delete(&s, &fx.auth(&fx.owner), fx.list.id, fx.bucket.id);
        assert!(matches!(result, Err(Error::CannotRemoveLastBucket { .. })));
        assert_eq!(s.count_buckets(fx.list.id).unwrap(), 1);
    }

    #[test]
    fn test_delete_moves_tasks_to_default_bucket() {
        let fx = Fixture::new();
        let s = fx.session();
        let auth = fx.auth(&fx.owner);

        let mut doing = new_bucket(&fx, "Doing");
        doing.position = 10.0;
        create(&s, &auth, &mut doing).unwrap();

        let mut task = Task {
            title: "Milk".into(),
            list_id: fx.list.id,
            bucket_id: doing.id,
            created_by_id: fx.owner.id,
            ..Default::default()
        };
        s.create_task(&mut task).unwrap();

        delete(&s, &auth, fx.list.id, doing.id).unwrap();
        let moved = s.get_task(task.id).unwrap().unwrap();
        assert_eq!(moved.bucket_id, fx.bucket.id);
    }

    #[test]
    fn test_only_one_done_bucket() {
        let fx = Fixture::new();
        let s = fx.session();
        let auth = fx.auth(&fx.owner);

        let mut done = new_bucket(&fx, "Done");
        done.is_done_bucket = true;
        create(&s, &auth, &mut done).unwrap();

        let mut other = new_bucket(&fx, "Also done");
        other.is_done_bucket = true;
        let result = create(&s, &auth, &mut other);
        assert!(matches!(result, Err(Error::OnlyOneDoneBucketPerList { .. })));

        done.title = "Finished".into();
        update(&s, &auth, &mut done).unwrap();
    }

    #[test]
    fn test_archived_namespace_blocks_bucket_writes() {
        let fx = Fixture::new();
        let s = fx.session();
        let mut namespace = fx.namespace.clone();
        namespace.is_archived = true;
        s.update_namespace(&mut namespace).unwrap();

        let mut bucket = new_bucket(&fx, "Later");
        let result = create(&s, &fx.auth(&fx.owner), &mut bucket);
        assert!(matches!(result, Err(Error::NamespaceIsArchived { .. })));
    }

    #[test]
    fn test_update_rejects_bucket_of_other_list() {
        let fx = Fixture::new();
        let s = fx.session();
        let mut bucket = fx.bucket.clone();
        bucket.list_id = fx.list.id + 1;
        let result = update(&s, &fx.auth(&fx.owner), &mut bucket);
        assert!(matches!(result, Err(Error::BucketDoesNotBelongToList { .. })));
    }

    #[test]
    fn test_read_all_groups_tasks() {
        let fx = Fixture::new();
        let s = fx.session();
        let mut task = Task {
            title: "Eggs".into(),
            list_id: fx.list.id,
            bucket_id: fx.bucket.id,
            created_by_id: fx.owner.id,
            ..Default::default()
        };
        s.create_task(&mut task).unwrap();

        let buckets = read_all(&s, &fx.auth(&fx.owner), fx.list.id).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].tasks[0].title, "Eggs");

        let result = read_all(&s, &fx.auth(&fx.bob), fx.list.id);
        assert!(matches!(result, Err(Error::Forbidden)));
    }

    #[test]
    fn test_check_limit() {
        let fx = Fixture::new();
        let s = fx.session();
        let mut bucket = fx.bucket.clone();
        bucket.limit = 1;
        check_limit(&s, &bucket).unwrap();

        let mut task = Task {
            title: "Bread".into(),
            list_id: fx.list.id,
            bucket_id: bucket.id,
            created_by_id: fx.owner.id,
            ..Default::default()
        };
        s.create_task(&mut task).unwrap();
        assert!(matches!(check_limit(&s, &bucket), Err(Error::BucketLimitExceeded { limit: 1, .. })));
    }
}

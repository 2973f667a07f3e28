use super::{Rights, list_access, list_write_check, load_list};
use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::store::Session;
use crate::types::Bucket;

fn load_bucket_of_list(s: &Session<'_>, bucket_id: i64, list_id: i64) -> Result<Bucket> {
    let bucket = s
        .get_bucket(bucket_id)?
        .ok_or(Error::BucketDoesNotExist { bucket_id })?;
    if list_id != 0 && bucket.list_id != list_id {
        return Err(Error::BucketDoesNotBelongToList { bucket_id, list_id });
    }
    Ok(bucket)
}

impl Rights for Bucket {
    fn can_read(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        let list = load_list(s, self.list_id)?;
        Ok(list_access(s, auth, &list)?.can_read())
    }

    fn can_create(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        let list = load_list(s, self.list_id)?;
        list_write_check(s, auth, &list)
    }

    fn can_update(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        let bucket = load_bucket_of_list(s, self.id, self.list_id)?;
        let list = load_list(s, bucket.list_id)?;
        list_write_check(s, auth, &list)
    }

    fn can_delete(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        self.can_update(s, auth)
    }
}

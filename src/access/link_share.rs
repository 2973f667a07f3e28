use super::{Rights, list_access, list_write_check, load_list};
use crate::auth::Auth;
use crate::error::Result;
use crate::store::Session;
use crate::types::{LinkSharing, Right};

/// Creating or removing a link share needs write access on the list, and
/// admin access to hand out an admin link. Link shares cannot manage links.
fn can_manage_link_share(share: &LinkSharing, s: &Session<'_>, auth: &Auth) -> Result<bool> {
    if auth.is_link_share() {
        return Ok(false);
    }
    let list = load_list(s, share.list_id)?;
    if !list_write_check(s, auth, &list)? {
        return Ok(false);
    }
    if share.right == Right::ADMIN {
        return Ok(list_access(s, auth, &list)?.is_admin());
    }
    Ok(true)
}

impl Rights for LinkSharing {
    fn can_read(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        let list = load_list(s, self.list_id)?;
        Ok(list_access(s, auth, &list)?.can_read())
    }

    fn can_create(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        can_manage_link_share(self, s, auth)
    }

    fn can_update(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        can_manage_link_share(self, s, auth)
    }

    fn can_delete(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        can_manage_link_share(self, s, auth)
    }
}

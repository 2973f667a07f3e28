use super::{Rights, list_access, load_list, load_namespace, namespace_access};
use crate::auth::Auth;
use crate::error::Result;
use crate::store::Session;
use crate::types::{ListUser, NamespaceUser, TeamList, TeamNamespace};

// Managing who a resource is shared with takes admin on the resource.
// Link shares are refused outright, whatever right they carry.

fn is_list_admin(s: &Session<'_>, auth: &Auth, list_id: i64) -> Result<bool> {
    if auth.is_link_share() {
        return Ok(false);
    }
    let list = load_list(s, list_id)?;
    Ok(list_access(s, auth, &list)?.is_admin())
}

fn is_namespace_admin(s: &Session<'_>, auth: &Auth, namespace_id: i64) -> Result<bool> {
    if auth.is_link_share() {
        return Ok(false);
    }
    let namespace = load_namespace(s, namespace_id)?;
    Ok(namespace_access(s, auth, &namespace)?.is_admin())
}

fn can_read_list(s: &Session<'_>, auth: &Auth, list_id: i64) -> Result<bool> {
    let list = load_list(s, list_id)?;
    Ok(list_access(s, auth, &list)?.can_read())
}

fn can_read_namespace(s: &Session<'_>, auth: &Auth, namespace_id: i64) -> Result<bool> {
    let namespace = load_namespace(s, namespace_id)?;
    Ok(namespace_access(s, auth, &namespace)?.can_read())
}

macro_rules! sharing_rights {
    ($relation:ty, $parent:ident, $read:ident, $admin:ident) => {
        impl Rights for $relation {
            fn can_read(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
                $read(s, auth, self.$parent)
            }

            fn can_create(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
                $admin(s, auth, self.$parent)
            }

            fn can_update(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
                $admin(s, auth, self.$parent)
            }

            fn can_delete(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
                $admin(s, auth, self.$parent)
            }
        }
    };
}

sharing_rights!(ListUser, list_id, can_read_list, is_list_admin);
sharing_rights!(TeamList, list_id, can_read_list, is_list_admin);
sharing_rights!(NamespaceUser, namespace_id, can_read_namespace, is_namespace_admin);
sharing_rights!(TeamNamespace, namespace_id, can_read_namespace, is_namespace_admin);

use super::{Access, GrantSource, Resolver, Rights, load_namespace, namespace_access, shared_right};
use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::store::{Session, ShareTable};
use crate::types::{List, Right};

pub fn load_list(s: &Session<'_>, list_id: i64) -> Result<List> {
    s.get_list(list_id)?.ok_or(Error::ListDoesNotExist { list_id })
}

/// Resolves the caller's right on a list, highest grant wins:
/// namespace owner, list owner, direct list shares, inherited namespace
/// shares, then a link share for this very list.
pub fn list_access(s: &Session<'_>, auth: &Auth, list: &List) -> Result<Access> {
    let mut resolver = Resolver::new();

    match auth {
        Auth::LinkShare(share) => {
            resolver.consider(
                GrantSource::LinkShare,
                (share.list_id == list.id).then_some(share.right),
            );
        }
        Auth::User(user) => {
            resolver.consider_with(GrantSource::NamespaceOwner, || {
                let owner = s.get_namespace(list.namespace_id)?.map(|ns| ns.owner_id);
                Ok((owner == Some(user.id)).then_some(Right::ADMIN))
            })?;
            resolver.consider(
                GrantSource::ListOwner,
                (list.owner_id == user.id).then_some(Right::ADMIN),
            );
            resolver.consider_with(GrantSource::ListShare, || {
                shared_right(s, &[ShareTable::LIST_USERS, ShareTable::LIST_TEAMS], list.id, user.id)
            })?;
            resolver.consider_with(GrantSource::NamespaceShare, || {
                shared_right(
                    s,
                    &[ShareTable::NAMESPACE_USERS, ShareTable::NAMESPACE_TEAMS],
                    list.namespace_id,
                    user.id,
                )
            })?;
        }
    }

    Ok(resolver.finish())
}

/// Fails when the list or its namespace is archived.
pub fn ensure_list_writable(s: &Session<'_>, list: &List) -> Result<()> {
    if list.is_archived {
        return Err(Error::ListIsArchived { list_id: list.id });
    }
    let namespace = load_namespace(s, list.namespace_id)?;
    if namespace.is_archived {
        return Err(Error::NamespaceIsArchived {
            namespace_id: namespace.id,
        });
    }
    Ok(())
}

/// Write-class check on a list: archived state fails even for admins.
pub fn list_write_check(s: &Session<'_>, auth: &Auth, list: &List) -> Result<bool> {
    let access = list_access(s, auth, list)?;
    ensure_list_writable(s, list)?;
    Ok(access.can_write())
}

impl Rights for List {
    fn can_read(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        let list = load_list(s, self.id)?;
        Ok(list_access(s, auth, &list)?.can_read())
    }

    fn can_create(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        if auth.is_link_share() {
            return Ok(false);
        }
        if self.namespace_id == 0 {
            return Err(Error::ListMustBelongToANamespace);
        }
        if self.namespace_id < 0 {
            return Err(Error::ListCannotBelongToAPseudoNamespace);
        }

        let namespace = load_namespace(s, self.namespace_id)?;
        let access = namespace_access(s, auth, &namespace)?;
        if namespace.is_archived {
            return Err(Error::NamespaceIsArchived {
                namespace_id: namespace.id,
            });
        }
        Ok(access.can_write())
    }

    fn can_update(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        let original = load_list(s, self.id)?;

        if self.namespace_id != 0 && self.namespace_id != original.namespace_id {
            if self.namespace_id < 0 {
                return Err(Error::ListCannotBelongToAPseudoNamespace);
            }
            let target = load_namespace(s, self.namespace_id)?;
            if !namespace_access(s, auth, &target)?.can_write() {
                return Ok(false);
            }
        }

        match list_write_check(s, auth, &original) {
            // Un-archiving an archived list is the one write it accepts.
            Err(Error::ListIsArchived { .. }) if !self.is_archived => {
                let namespace = load_namespace(s, original.namespace_id)?;
                if namespace.is_archived {
                    return Err(Error::NamespaceIsArchived {
                        namespace_id: namespace.id,
                    });
                }
                Ok(list_access(s, auth, &original)?.can_write())
            }
            other => other,
        }
    }

    fn can_delete(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        let list = load_list(s, self.id)?;
        Ok(list_access(s, auth, &list)?.is_admin())
    }
}

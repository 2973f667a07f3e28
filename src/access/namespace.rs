use super::{Access, GrantSource, Resolver, Rights, shared_right};
use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::store::{Session, ShareTable};
use crate::types::{Namespace, Right};

pub fn load_namespace(s: &Session<'_>, namespace_id: i64) -> Result<Namespace> {
    s.get_namespace(namespace_id)?
        .ok_or(Error::NamespaceDoesNotExist { namespace_id })
}

/// Resolves the caller's right on a namespace. Link shares never see namespaces.
pub fn namespace_access(s: &Session<'_>, auth: &Auth, namespace: &Namespace) -> Result<Access> {
    let Auth::User(user) = auth else {
        return Ok(Access::none());
    };

    let mut resolver = Resolver::new();
    resolver.consider(
        GrantSource::NamespaceOwner,
        (namespace.owner_id == user.id).then_some(Right::ADMIN),
    );
    resolver.consider_with(GrantSource::NamespaceShare, || {
        shared_right(
            s,
            &[ShareTable::NAMESPACE_USERS, ShareTable::NAMESPACE_TEAMS],
            namespace.id,
            user.id,
        )
    })?;

    Ok(resolver.finish())
}

impl Rights for Namespace {
    fn can_read(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        if self.id == Namespace::SHARED_LISTS_ID {
            return Ok(!auth.is_link_share());
        }
        let namespace = load_namespace(s, self.id)?;
        Ok(namespace_access(s, auth, &namespace)?.can_read())
    }

    fn can_create(&self, _s: &Session<'_>, auth: &Auth) -> Result<bool> {
        Ok(!auth.is_link_share())
    }

    fn can_update(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        let namespace = load_namespace(s, self.id)?;
        Ok(namespace_access(s, auth, &namespace)?.is_admin())
    }

    fn can_delete(&self, s: &Session<'_>, auth: &Auth) -> Result<bool> {
        let namespace = load_namespace(s, self.id)?;
        Ok(namespace_access(s, auth, &namespace)?.is_admin())
    }
}

use serde::Serialize;

use super::{Paged, Window};
use crate::access::{Rights, load_namespace, require};
use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::store::Session;
use crate::types::{List, Namespace};

/// A namespace together with the lists the caller can see in it.
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceWithLists {
    #[serde(flatten)]
    pub namespace: Namespace,
    pub lists: Vec<List>,
}

fn shared_lists_namespace(owner_id: i64) -> Namespace {
    Namespace {
        id: Namespace::SHARED_LISTS_ID,
        title: "Shared Lists".to_string(),
        description: "Lists of other users shared with you via teams or directly.".to_string(),
        owner_id,
        ..Default::default()
    }
}

pub fn create(s: &Session<'_>, auth: &Auth, namespace: &mut Namespace) -> Result<()> {
    require(namespace.can_create(s, auth)?)?;
    let user = auth.require_user()?;

    if namespace.title.trim().is_empty() {
        return Err(Error::NamespaceNameCannotBeEmpty);
    }

    namespace.owner_id = user.id;
    s.create_namespace(namespace)?;
    tracing::debug!(namespace_id = namespace.id, "Created namespace");
    Ok(())
}

pub fn read_one(s: &Session<'_>, auth: &Auth, namespace_id: i64) -> Result<Namespace> {
    let scope = Namespace {
        id: namespace_id,
        ..Default::default()
    };
    require(scope.can_read(s, auth)?)?;

    if namespace_id == Namespace::SHARED_LISTS_ID {
        return Ok(shared_lists_namespace(auth.id()));
    }
    load_namespace(s, namespace_id)
}

/// Title, description, color and the archived flag can change. An archived
/// namespace only accepts being un-archived.
pub fn update(s: &Session<'_>, auth: &Auth, namespace: &mut Namespace) -> Result<()> {
    if namespace.is_pseudo() {
        return Err(Error::Forbidden);
    }
    let original = load_namespace(s, namespace.id)?;
    require(namespace.can_update(s, auth)?)?;

    if original.is_archived && namespace.is_archived {
        return Err(Error::NamespaceIsArchived {
            namespace_id: original.id,
        });
    }
    if namespace.title.trim().is_empty() {
        return Err(Error::NamespaceNameCannotBeEmpty);
    }

    namespace.owner_id = original.owner_id;
    namespace.created = original.created;
    s.update_namespace(namespace)
}

/// Deletes the namespace with every list, task and share below it.
pub fn delete(s: &Session<'_>, auth: &Auth, namespace_id: i64) -> Result<()> {
    let namespace = load_namespace(s, namespace_id)?;
    require(namespace.can_delete(s, auth)?)?;
    s.delete_namespace(namespace_id)?;
    tracing::debug!(namespace_id, "Deleted namespace");
    Ok(())
}

/// Every namespace the user reaches, each with its lists, followed by the
/// "Shared Lists" pseudo namespace when lists were shared with the user
/// directly.
pub fn read_all(
    s: &Session<'_>,
    auth: &Auth,
    window: &Window,
    include_archived: bool,
) -> Result<Paged<NamespaceWithLists>> {
    let user = auth.require_user()?;

    let mut all = Vec::new();
    for namespace in s.list_user_namespaces(user.id, &window.search, include_archived)? {
        let lists = s.lists_in_namespace(namespace.id, include_archived)?;
        all.push(NamespaceWithLists { namespace, lists });
    }

    let shared = s.lists_shared_directly(user.id, include_archived)?;
    if !shared.is_empty() {
        all.push(NamespaceWithLists {
            namespace: shared_lists_namespace(user.id),
            lists: shared,
        });
    }

    let total = all.len() as i64;
    let items = page_slice(all, window);
    Ok(Paged {
        items,
        total,
        limit: window.limit,
    })
}

/// Applies a window to results that were collected in memory.
pub(crate) fn page_slice<T>(items: Vec<T>, window: &Window) -> Vec<T> {
    let skip = usize::try_from(window.offset).unwrap_or(0);
    match usize::try_from(window.limit) {
        Ok(limit) if window.limit > 0 => items.into_iter().skip(skip).take(limit).collect(),
        _ => items.into_iter().skip(skip).collect(),
    }
}

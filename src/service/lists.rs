use super::namespaces::page_slice;
use super::{Paged, Window};
use crate::access::{Rights, load_list, require};
use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::files::FileStorage;
use crate::store::Session;
use crate::types::{Bucket, List};

/// Title of the bucket every new list starts with.
pub const DEFAULT_BUCKET_TITLE: &str = "Backlog";

fn validate(s: &Session<'_>, list: &List) -> Result<()> {
    if list.title.trim().is_empty() {
        return Err(Error::ListTitleCannotBeEmpty);
    }
    if !list.identifier.is_empty() && s.list_identifier_taken(&list.identifier, list.id)? {
        return Err(Error::ListIdentifierIsNotUnique {
            identifier: list.identifier.clone(),
        });
    }
    Ok(())
}

/// Creates a list in `list.namespace_id` together with its default bucket.
pub fn create(s: &Session<'_>, auth: &Auth, list: &mut List) -> Result<()> {
    require(list.can_create(s, auth)?)?;
    let user = auth.require_user()?;
    validate(s, list)?;

    list.owner_id = user.id;
    list.background_file_id = None;
    s.create_list(list)?;

    let mut bucket = Bucket {
        title: DEFAULT_BUCKET_TITLE.to_string(),
        list_id: list.id,
        created_by_id: user.id,
        ..Default::default()
    };
    s.create_bucket(&mut bucket)?;
    s.touch_namespace(list.namespace_id)?;

    tracing::debug!(list_id = list.id, namespace_id = list.namespace_id, "Created list");
    Ok(())
}

pub fn read_one(s: &Session<'_>, auth: &Auth, list_id: i64) -> Result<List> {
    let list = load_list(s, list_id)?;
    require(list.can_read(s, auth)?)?;
    Ok(list)
}

/// Replaces the editable fields of a list. `namespace_id == 0` keeps the
/// current namespace; any other value moves the list.
pub fn update(s: &Session<'_>, auth: &Auth, list: &mut List) -> Result<()> {
    let original = load_list(s, list.id)?;
    require(list.can_update(s, auth)?)?;

    if list.namespace_id == 0 {
        list.namespace_id = original.namespace_id;
    }
    validate(s, list)?;

    list.owner_id = original.owner_id;
    list.background_file_id = original.background_file_id;
    list.created = original.created;
    s.update_list(list)
}

pub fn delete(s: &Session<'_>, auth: &Auth, list_id: i64) -> Result<()> {
    let list = load_list(s, list_id)?;
    require(list.can_delete(s, auth)?)?;
    s.delete_list(list_id)?;
    s.touch_namespace(list.namespace_id)?;
    tracing::debug!(list_id, "Deleted list");
    Ok(())
}

/// Lists the caller can read. A link share only ever sees its own list.
pub fn read_all(
    s: &Session<'_>,
    auth: &Auth,
    window: &Window,
    include_archived: bool,
) -> Result<Paged<List>> {
    let all = match auth {
        Auth::LinkShare(share) => vec![load_list(s, share.list_id)?],
        Auth::User(user) => s.list_user_lists(user.id, &window.search, include_archived)?,
    };

    let total = all.len() as i64;
    Ok(Paged {
        items: page_slice(all, window),
        total,
        limit: window.limit,
    })
}

/// Points the list background at an already stored file.
pub fn set_background(s: &Session<'_>, auth: &Auth, list_id: i64, file_id: i64) -> Result<List> {
    let list = load_list(s, list_id)?;
    require(list.can_update(s, auth)?)?;
    s.get_file(file_id)?.ok_or(Error::FileDoesNotExist { file_id })?;

    s.set_list_background(list_id, file_id)?;
    load_list(s, list_id)
}

/// Stores `content` and makes it the list background.
pub fn upload_background(
    s: &Session<'_>,
    auth: &Auth,
    files: &dyn FileStorage,
    list_id: i64,
    name: &str,
    content: &[u8],
) -> Result<List> {
    let list = load_list(s, list_id)?;
    require(list.can_update(s, auth)?)?;

    let file = files.create(s, content, name, auth.id())?;
    s.set_list_background(list_id, file.id)?;
    load_list(s, list_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use crate::types::{Namespace, Right};

    fn new_list(fx: &Fixture, title: &str) -> List {
        List {
            title: title.to_string(),
            namespace_id: fx.namespace.id,
            ..Default::default()
        }
    }

    #[test]
    fn test_create_adds_default_bucket() {
        let fx = Fixture::new();
        let s = fx.session();
        let mut list = new_list(&fx, "Chores");
        create(&s, &fx.auth(&fx.owner), &mut list).unwrap();

        assert_eq!(list.owner_id, fx.owner.id);
        let buckets = s.list_buckets(list.id).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].title, DEFAULT_BUCKET_TITLE);
    }

    #[test]
    fn test_create_validation() {
        let fx = Fixture::new();
        let s = fx.session();
        let auth = fx.auth(&fx.owner);

        let mut list = new_list(&fx, "");
        assert!(matches!(create(&s, &auth, &mut list), Err(Error::ListTitleCannotBeEmpty)));

        let mut list = List {
            title: "Orphan".into(),
            ..Default::default()
        };
        assert!(matches!(create(&s, &auth, &mut list), Err(Error::ListMustBelongToANamespace)));

        list.namespace_id = Namespace::SHARED_LISTS_ID;
        assert!(matches!(
            create(&s, &auth, &mut list),
            Err(Error::ListCannotBelongToAPseudoNamespace)
        ));

        let mut first = new_list(&fx, "First");
        first.identifier = "ABC".into();
        create(&s, &auth, &mut first).unwrap();
        let mut second = new_list(&fx, "Second");
        second.identifier = "ABC".into();
        assert!(matches!(
            create(&s, &auth, &mut second),
            Err(Error::ListIdentifierIsNotUnique { .. })
        ));
    }

    #[test]
    fn test_create_in_foreign_namespace_is_forbidden() {
        let fx = Fixture::new();
        let s = fx.session();
        let mut list = new_list(&fx, "Sneaky");
        assert!(matches!(create(&s, &fx.auth(&fx.bob), &mut list), Err(Error::Forbidden)));
    }

    #[test]
    fn test_archived_list_accepts_only_unarchive() {
        let fx = Fixture::new();
        let s = fx.session();
        let auth = fx.auth(&fx.owner);

        let mut list = fx.list.clone();
        list.is_archived = true;
        update(&s, &auth, &mut list).unwrap();

        list.title = "Renamed".into();
        assert!(matches!(update(&s, &auth, &mut list), Err(Error::ListIsArchived { .. })));

        list.is_archived = false;
        update(&s, &auth, &mut list).unwrap();
        assert_eq!(load_list(&s, fx.list.id).unwrap().title, "Renamed");
    }

    #[test]
    fn test_unarchive_blocked_by_archived_namespace() {
        let fx = Fixture::new();
        let s = fx.session();
        let auth = fx.auth(&fx.owner);

        let mut list = fx.list.clone();
        list.is_archived = true;
        update(&s, &auth, &mut list).unwrap();

        let mut namespace = fx.namespace.clone();
        namespace.is_archived = true;
        s.update_namespace(&mut namespace).unwrap();

        list.is_archived = false;
        assert!(matches!(update(&s, &auth, &mut list), Err(Error::NamespaceIsArchived { .. })));
    }

    #[test]
    fn test_read_all_for_link_share() {
        let fx = Fixture::new();
        let auth = fx.link_share_auth(Right::READ);
        let s = fx.session();
        let page = read_all(&s, &auth, &Window::all(), false).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, fx.list.id);
    }

    #[test]
    fn test_delete_requires_admin() {
        let fx = Fixture::new();
        let s = fx.session();
        assert!(matches!(delete(&s, &fx.auth(&fx.bob), fx.list.id), Err(Error::Forbidden)));
        delete(&s, &fx.auth(&fx.owner), fx.list.id).unwrap();
        assert!(matches!(
            read_one(&s, &fx.auth(&fx.owner), fx.list.id),
            Err(Error::ListDoesNotExist { .. })
        ));
    }

    #[test]
    fn test_background_upload_and_set() {
        let fx = Fixture::new();
        let s = fx.session();
        let auth = fx.auth(&fx.owner);

        let list = upload_background(&s, &auth, &fx.files, fx.list.id, "bg.png", b"png").unwrap();
        let file_id = list.background_file_id.unwrap();
        assert_eq!(set_background(&s, &auth, fx.list.id, file_id).unwrap().background_file_id, Some(file_id));

        let result = set_background(&s, &auth, fx.list.id, 999);
        assert!(matches!(result, Err(Error::FileDoesNotExist { file_id: 999 })));
    }
}

//! Sharing relations: lists and namespaces shared with users and teams.
//!
//! All four relation kinds follow the same contract, implemented once here
//! over [`SharingRelation`].

use super::{Paged, Window};
use crate::access::{Rights, load_list, load_namespace, require};
use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::events::{Dispatcher, Event};
use crate::store::{Session, ShareRow, ShareTable};
use crate::types::{
    List, ListUser, Namespace, NamespaceUser, Right, Team, TeamList, TeamNamespace, TeamWithRight,
    User, UserWithRight,
};

/// The resource a relation grants access to.
enum Parent {
    List(List),
    Namespace(Namespace),
}

impl Parent {
    fn load(s: &Session<'_>, table: ShareTable, id: i64) -> Result<Self> {
        if table.parent_column == "list_id" {
            Ok(Parent::List(load_list(s, id)?))
        } else {
            Ok(Parent::Namespace(load_namespace(s, id)?))
        }
    }

    fn owner_id(&self) -> i64 {
        match self {
            Parent::List(list) => list.owner_id,
            Parent::Namespace(namespace) => namespace.owner_id,
        }
    }

    fn touch(&self, s: &Session<'_>) -> Result<()> {
        match self {
            Parent::List(list) => s.touch_list(list.id),
            Parent::Namespace(namespace) => s.touch_namespace(namespace.id),
        }
    }

    fn shared_event(self, principal: Principal, doer_id: i64) -> Event {
        match (self, principal) {
            (Parent::List(list), Principal::User(user)) => Event::ListSharedWithUser { list, user, doer_id },
            (Parent::List(list), Principal::Team(team)) => Event::ListSharedWithTeam { list, team, doer_id },
            (Parent::Namespace(namespace), Principal::User(user)) => {
                Event::NamespaceSharedWithUser { namespace, user, doer_id }
            }
            (Parent::Namespace(namespace), Principal::Team(team)) => {
                Event::NamespaceSharedWithTeam { namespace, team, doer_id }
            }
        }
    }
}

/// Who a relation shares with.
pub enum Principal {
    User(User),
    Team(Team),
}

impl Principal {
    fn id(&self) -> i64 {
        match self {
            Principal::User(user) => user.id,
            Principal::Team(team) => team.id,
        }
    }
}

/// A stored grant of a right on a list or namespace to a user or team.
pub trait SharingRelation: Rights {
    const TABLE: ShareTable;

    fn parent_id(&self) -> i64;

    fn right(&self) -> Right;

    /// Looks up the user or team this relation names.
    fn resolve_principal(&mut self, s: &Session<'_>) -> Result<Principal>;

    fn apply_row(&mut self, row: &ShareRow);
}

fn resolve_user(s: &Session<'_>, username: &str) -> Result<User> {
    s.get_user_by_username(username)?
        .ok_or_else(|| Error::UserDoesNotExist {
            user: username.to_string(),
        })
}

fn resolve_team(s: &Session<'_>, team_id: i64) -> Result<Team> {
    s.get_team(team_id)?.ok_or(Error::TeamDoesNotExist { team_id })
}

impl SharingRelation for ListUser {
    const TABLE: ShareTable = ShareTable::LIST_USERS;

    fn parent_id(&self) -> i64 {
        self.list_id
    }

    fn right(&self) -> Right {
        self.right
    }

    fn resolve_principal(&mut self, s: &Session<'_>) -> Result<Principal> {
        let user = resolve_user(s, &self.username)?;
        self.user_id = user.id;
        Ok(Principal::User(user))
    }

    fn apply_row(&mut self, row: &ShareRow) {
        self.id = row.id;
        self.created = row.created;
        self.updated = row.updated;
    }
}

impl SharingRelation for NamespaceUser {
    const TABLE: ShareTable = ShareTable::NAMESPACE_USERS;

    fn parent_id(&self) -> i64 {
        self.namespace_id
    }

    fn right(&self) -> Right {
        self.right
    }

    fn resolve_principal(&mut self, s: &Session<'_>) -> Result<Principal> {
        let user = resolve_user(s, &self.username)?;
        self.user_id = user.id;
        Ok(Principal::User(user))
    }

    fn apply_row(&mut self, row: &ShareRow) {
        self.id = row.id;
        self.created = row.created;
        self.updated = row.updated;
    }
}

impl SharingRelation for TeamList {
    const TABLE: ShareTable = ShareTable::LIST_TEAMS;

    fn parent_id(&self) -> i64 {
        self.list_id
    }

    fn right(&self) -> Right {
        self.right
    }

    fn resolve_principal(&mut self, s: &Session<'_>) -> Result<Principal> {
        Ok(Principal::Team(resolve_team(s, self.team_id)?))
    }

    fn apply_row(&mut self, row: &ShareRow) {
        self.id = row.id;
        self.created = row.created;
        self.updated = row.updated;
    }
}

impl SharingRelation for TeamNamespace {
    const TABLE: ShareTable = ShareTable::NAMESPACE_TEAMS;

    fn parent_id(&self) -> i64 {
        self.namespace_id
    }

    fn right(&self) -> Right {
        self.right
    }

    fn resolve_principal(&mut self, s: &Session<'_>) -> Result<Principal> {
        Ok(Principal::Team(resolve_team(s, self.team_id)?))
    }

    fn apply_row(&mut self, row: &ShareRow) {
        self.id = row.id;
        self.created = row.created;
        self.updated = row.updated;
    }
}

fn already_has_access(principal: &Principal, parent_id: i64) -> Error {
    match principal {
        Principal::User(user) => Error::UserAlreadyHasAccess {
            user_id: user.id,
            id: parent_id,
        },
        Principal::Team(team) => Error::TeamAlreadyHasAccess {
            team_id: team.id,
            id: parent_id,
        },
    }
}

fn does_not_have_access(principal: &Principal, parent_id: i64) -> Error {
    match principal {
        Principal::User(user) => Error::UserDoesNotHaveAccess {
            user_id: user.id,
            id: parent_id,
        },
        Principal::Team(team) => Error::TeamDoesNotHaveAccess {
            team_id: team.id,
            id: parent_id,
        },
    }
}

/// Shares the parent with the relation's user or team.
///
/// The owner of the parent already has implicit admin access and cannot be
/// added. The duplicate check runs before the insert; the table's unique
/// constraint catches whatever slips through concurrently.
pub fn create<R: SharingRelation>(
    s: &Session<'_>,
    auth: &Auth,
    events: &dyn Dispatcher,
    relation: &mut R,
) -> Result<()> {
    relation.right().is_valid()?;
    require(relation.can_create(s, auth)?)?;

    let parent_id = relation.parent_id();
    let parent = Parent::load(s, R::TABLE, parent_id)?;
    let principal = relation.resolve_principal(s)?;

    if let Principal::User(user) = &principal {
        if user.id == parent.owner_id() {
            return Err(already_has_access(&principal, parent_id));
        }
    }

    if s.share_exists(R::TABLE, parent_id, principal.id())? {
        return Err(already_has_access(&principal, parent_id));
    }

    let row = s.create_share(R::TABLE, parent_id, principal.id(), relation.right())?;
    relation.apply_row(&row);

    parent.touch(s)?;
    events.dispatch(parent.shared_event(principal, auth.id()))?;

    tracing::debug!(
        table = R::TABLE.table,
        parent_id,
        right = %relation.right(),
        "Created sharing relation"
    );
    Ok(())
}

/// Revokes the relation's user or team from the parent.
pub fn delete<R: SharingRelation>(s: &Session<'_>, auth: &Auth, relation: &mut R) -> Result<()> {
    require(relation.can_delete(s, auth)?)?;

    let parent_id = relation.parent_id();
    let parent = Parent::load(s, R::TABLE, parent_id)?;
    let principal = relation.resolve_principal(s)?;

    if !s.delete_share(R::TABLE, parent_id, principal.id())? {
        return Err(does_not_have_access(&principal, parent_id));
    }

    parent.touch(s)
}

/// Changes only the right of an existing relation.
pub fn update<R: SharingRelation>(s: &Session<'_>, auth: &Auth, relation: &mut R) -> Result<()> {
    relation.right().is_valid()?;
    require(relation.can_update(s, auth)?)?;

    let parent_id = relation.parent_id();
    let parent = Parent::load(s, R::TABLE, parent_id)?;
    let principal = relation.resolve_principal(s)?;

    if !s.update_share_right(R::TABLE, parent_id, principal.id(), relation.right())? {
        return Err(does_not_have_access(&principal, parent_id));
    }
    if let Some(row) = s.get_share(R::TABLE, parent_id, principal.id())? {
        relation.apply_row(&row);
    }

    parent.touch(s)
}

fn need_read_access(table: ShareTable, parent_id: i64, auth: &Auth) -> Error {
    if table.parent_column == "list_id" {
        Error::NeedToHaveListReadAccess {
            list_id: parent_id,
            user_id: auth.id(),
        }
    } else {
        Error::NeedToHaveNamespaceReadAccess {
            namespace_id: parent_id,
            user_id: auth.id(),
        }
    }
}

/// Users a list or namespace is shared with, emails stripped.
pub fn read_all_users<R: SharingRelation>(
    s: &Session<'_>,
    auth: &Auth,
    scope: &R,
    window: &Window,
) -> Result<Paged<UserWithRight>> {
    let parent_id = scope.parent_id();
    if !scope.can_read(s, auth)? {
        return Err(need_read_access(R::TABLE, parent_id, auth));
    }

    let mut items = s.shared_users(R::TABLE, parent_id, &window.search, window.limit, window.offset)?;
    for item in &mut items {
        item.user.email.clear();
    }
    let total = s.count_shared_users(R::TABLE, parent_id, &window.search)?;

    Ok(Paged {
        items,
        total,
        limit: window.limit,
    })
}

/// Teams a list or namespace is shared with.
pub fn read_all_teams<R: SharingRelation>(
    s: &Session<'_>,
    auth: &Auth,
    scope: &R,
    window: &Window,
) -> Result<Paged<TeamWithRight>> {
    let parent_id = scope.parent_id();
    if !scope.can_read(s, auth)? {
        return Err(need_read_access(R::TABLE, parent_id, auth));
    }

    let items = s.shared_teams(R::TABLE, parent_id, &window.search, window.limit, window.offset)?;
    let total = s.count_shared_teams(R::TABLE, parent_id, &window.search)?;

    Ok(Paged {
        items,
        total,
        limit: window.limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{Rights, list_access};
    use crate::events::testing::RecordingDispatcher;
    use crate::testing::Fixture;

    fn share_list_with(fx: &Fixture, username: &str, right: Right) -> Result<ListUser> {
        let s = fx.session();
        let mut relation = ListUser {
            username: username.to_string(),
            list_id: fx.list.id,
            right,
            ..Default::default()
        };
        create(&s, &fx.auth(&fx.owner), &fx.events, &mut relation)?;
        s.commit()?;
        Ok(relation)
    }

    #[test]
    fn test_create_list_user_grants_access_and_dispatches() {
        let fx = Fixture::new();
        let relation = share_list_with(&fx, "bob", Right::READ_WRITE).unwrap();
        assert!(relation.id > 0);
        assert_eq!(relation.user_id, fx.bob.id);

        let s = fx.session();
        let access = list_access(&s, &fx.auth(&fx.bob), &fx.list).unwrap();
        assert!(access.can_write());
        assert!(!access.is_admin());
        assert_eq!(fx.events.names(), vec!["list.shared.user"]);
    }

    #[test]
    fn test_create_rejects_owner() {
        let fx = Fixture::new();
        let result = share_list_with(&fx, "owner", Right::READ);
        assert!(matches!(result, Err(Error::UserAlreadyHasAccess { .. })));
    }

    #[test]
    fn test_create_rejects_duplicate() {
        let fx = Fixture::new();
        share_list_with(&fx, "bob", Right::READ).unwrap();
        let result = share_list_with(&fx, "bob", Right::ADMIN);
        assert!(matches!(result, Err(Error::UserAlreadyHasAccess { .. })));
    }

    #[test]
    fn test_create_rejects_invalid_right() {
        let fx = Fixture::new();
        let result = share_list_with(&fx, "bob", Right::new(3));
        assert!(matches!(result, Err(Error::InvalidRight { .. })));
    }

    #[test]
    fn test_create_unknown_user() {
        let fx = Fixture::new();
        let result = share_list_with(&fx, "nobody", Right::READ);
        assert!(matches!(result, Err(Error::UserDoesNotExist { .. })));
    }

    #[test]
    fn test_create_unknown_team() {
        let fx = Fixture::new();
        let s = fx.session();
        let mut relation = TeamList {
            team_id: 999,
            list_id: fx.list.id,
            ..Default::default()
        };
        let result = create(&s, &fx.auth(&fx.owner), &fx.events, &mut relation);
        assert!(matches!(result, Err(Error::TeamDoesNotExist { team_id: 999 })));
    }

    #[test]
    fn test_dispatch_failure_aborts() {
        let fx = Fixture::new();
        let failing = RecordingDispatcher::failing();
        {
            let s = fx.session();
            let mut relation = ListUser {
                username: "bob".into(),
                list_id: fx.list.id,
                ..Default::default()
            };
            let result = create(&s, &fx.auth(&fx.owner), &failing, &mut relation);
            assert!(matches!(result, Err(Error::EventDispatch(_))));
        }

        let s = fx.session();
        assert!(!s.share_exists(ShareTable::LIST_USERS, fx.list.id, fx.bob.id).unwrap());
    }

    #[test]
    fn test_writer_cannot_manage_shares_but_owner_can() {
        let fx = Fixture::new();
        share_list_with(&fx, "bob", Right::READ_WRITE).unwrap();

        let s = fx.session();
        let mut relation = ListUser {
            username: "bob".into(),
            list_id: fx.list.id,
            ..Default::default()
        };
        let result = delete(&s, &fx.auth(&fx.bob), &mut relation);
        assert!(matches!(result, Err(Error::Forbidden)));

        delete(&s, &fx.auth(&fx.owner), &mut relation).unwrap();
        let list = List { id: fx.list.id, ..Default::default() };
        assert!(!list.can_read(&s, &fx.auth(&fx.bob)).unwrap());
    }

    #[test]
    fn test_delete_missing_relation() {
        let fx = Fixture::new();
        let s = fx.session();
        let mut relation = ListUser {
            username: "bob".into(),
            list_id: fx.list.id,
            ..Default::default()
        };
        let result = delete(&s, &fx.auth(&fx.owner), &mut relation);
        assert!(matches!(result, Err(Error::UserDoesNotHaveAccess { .. })));
    }

    #[test]
    fn test_update_changes_right_only() {
        let fx = Fixture::new();
        share_list_with(&fx, "bob", Right::READ).unwrap();

        let s = fx.session();
        let mut relation = ListUser {
            username: "bob".into(),
            list_id: fx.list.id,
            right: Right::ADMIN,
            ..Default::default()
        };
        update(&s, &fx.auth(&fx.owner), &mut relation).unwrap();
        assert!(list_access(&s, &fx.auth(&fx.bob), &fx.list).unwrap().is_admin());

        relation.right = Right::new(-1);
        let result = update(&s, &fx.auth(&fx.owner), &mut relation);
        assert!(matches!(result, Err(Error::InvalidRight { .. })));
    }

    #[test]
    fn test_link_share_cannot_manage_sharing() {
        let fx = Fixture::new();
        let link = fx.link_share_auth(Right::ADMIN);
        let s = fx.session();

        let user_relation = ListUser {
            username: "bob".into(),
            list_id: fx.list.id,
            ..Default::default()
        };
        assert!(!user_relation.can_create(&s, &link).unwrap());
        assert!(!user_relation.can_update(&s, &link).unwrap());
        assert!(!user_relation.can_delete(&s, &link).unwrap());

        let team_relation = TeamList {
            team_id: fx.team.id,
            list_id: fx.list.id,
            ..Default::default()
        };
        assert!(!team_relation.can_create(&s, &link).unwrap());
        assert!(!team_relation.can_delete(&s, &link).unwrap());
    }

    #[test]
    fn test_team_namespace_share_is_inherited() {
        let fx = Fixture::new();
        let s = fx.session();
        let mut relation = TeamNamespace {
            team_id: fx.team.id,
            namespace_id: fx.namespace.id,
            right: Right::READ_WRITE,
            ..Default::default()
        };
        create(&s, &fx.auth(&fx.owner), &fx.events, &mut relation).unwrap();

        let access = list_access(&s, &fx.auth(&fx.carol), &fx.list).unwrap();
        assert!(access.can_write());
        assert!(!list_access(&s, &fx.auth(&fx.bob), &fx.list).unwrap().can_read());
        assert_eq!(fx.events.names(), vec!["namespace.shared.team"]);
    }

    #[test]
    fn test_read_all_users_requires_read_and_strips_email() {
        let fx = Fixture::new();
        share_list_with(&fx, "bob", Right::READ).unwrap();

        let s = fx.session();
        let scope = ListUser {
            list_id: fx.list.id,
            ..Default::default()
        };
        let page = read_all_users(&s, &fx.auth(&fx.bob), &scope, &Window::all()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].user.username, "bob");
        assert!(page.items[0].user.email.is_empty());

        let result = read_all_users(&s, &fx.auth(&fx.carol), &scope, &Window::all());
        assert!(matches!(result, Err(Error::NeedToHaveListReadAccess { .. })));
    }

    #[test]
    fn test_read_all_teams_paginates() {
        let fx = Fixture::new();
        let s = fx.session();
        let second = fx.create_team(&s, "second");
        for team_id in [fx.team.id, second.id] {
            let mut relation = TeamList {
                team_id,
                list_id: fx.list.id,
                ..Default::default()
            };
            create(&s, &fx.auth(&fx.owner), &fx.events, &mut relation).unwrap();
        }

        let scope = TeamList {
            list_id: fx.list.id,
            ..Default::default()
        };
        let window = Window {
            search: String::new(),
            limit: 1,
            offset: 1,
        };
        let page = read_all_teams(&s, &fx.auth(&fx.owner), &scope, &window).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].team.name, "second");
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages(), 2);
    }
}

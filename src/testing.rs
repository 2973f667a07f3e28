//! Test fixture: a fresh SQLite store seeded with users, a team, a
//! namespace and a list.

use tempfile::TempDir;

use crate::auth::{Auth, LinkShareAuth, random_alphanumeric};
use crate::events::testing::RecordingDispatcher;
use crate::files::LocalFileStorage;
use crate::store::{Session, SqliteStore, Store, transact};
use crate::types::{Bucket, LinkSharing, List, Namespace, Right, SharingType, Team, User};

pub(crate) struct Fixture {
    pub dir: TempDir,
    pub store: SqliteStore,
    pub events: RecordingDispatcher,
    pub files: LocalFileStorage,
    /// Owns `namespace` and `list`.
    pub owner: User,
    pub bob: User,
    /// Member of `team`.
    pub carol: User,
    pub team: Team,
    pub namespace: Namespace,
    pub list: List,
    pub bucket: Bucket,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::new(dir.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        let (owner, bob, carol, team, namespace, list, bucket) = transact(&store, |s| {
            let owner = s.create_user("owner", "owner@example.com")?;
            let bob = s.create_user("bob", "bob@example.com")?;
            let carol = s.create_user("carol", "carol@example.com")?;

            let mut team = Team {
                name: "crew".to_string(),
                created_by_id: owner.id,
                ..Default::default()
            };
            s.create_team(&mut team)?;
            s.add_team_member(team.id, carol.id, false)?;

            let mut namespace = Namespace {
                title: "Home".to_string(),
                owner_id: owner.id,
                ..Default::default()
            };
            s.create_namespace(&mut namespace)?;

            let mut list = List {
                title: "Groceries".to_string(),
                namespace_id: namespace.id,
                owner_id: owner.id,
                ..Default::default()
            };
            s.create_list(&mut list)?;

            let mut bucket = Bucket {
                title: "Backlog".to_string(),
                list_id: list.id,
                created_by_id: owner.id,
                ..Default::default()
            };
            s.create_bucket(&mut bucket)?;

            Ok((owner, bob, carol, team, namespace, list, bucket))
        })
        .unwrap();

        let files = LocalFileStorage::new(dir.path());

        Self {
            dir,
            store,
            events: RecordingDispatcher::default(),
            files,
            owner,
            bob,
            carol,
            team,
            namespace,
            list,
            bucket,
        }
    }

    pub fn session(&self) -> Session<'_> {
        self.store.session().unwrap()
    }

    pub fn auth(&self, user: &User) -> Auth {
        Auth::User(user.clone())
    }

    pub fn create_team(&self, s: &Session<'_>, name: &str) -> Team {
        let mut team = Team {
            name: name.to_string(),
            created_by_id: self.owner.id,
            ..Default::default()
        };
        s.create_team(&mut team).unwrap();
        team
    }

    /// Stores a password-less link share on `list` and returns its principal.
    pub fn link_share_auth(&self, right: Right) -> Auth {
        let share = transact(&self.store, |s| {
            let mut share = LinkSharing {
                hash: random_alphanumeric(40),
                list_id: self.list.id,
                right,
                sharing_type: SharingType::WithoutPassword,
                shared_by_id: self.owner.id,
                ..Default::default()
            };
            s.create_link_share(&mut share)?;
            Ok(share)
        })
        .unwrap();

        Auth::LinkShare(LinkShareAuth {
            id: share.id,
            hash: share.hash,
            list_id: share.list_id,
            right: share.right,
            shared_by_id: share.shared_by_id,
        })
    }
}

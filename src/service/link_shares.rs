//! Link shares: hash-addressed, optionally password-protected access to one
//! list for people without an account.

use serde::Serialize;

use super::{Paged, Window};
use crate::access::{Rights, load_list, require};
use crate::auth::{Auth, LinkShareTokens, random_alphanumeric};
use crate::error::{Error, Result};
use crate::events::{Dispatcher, Event};
use crate::store::Session;
use crate::types::{LinkSharing, SharingType};

/// Length of the public share hash.
pub const HASH_LENGTH: usize = 40;

/// What a successful link share login hands back.
#[derive(Debug, Clone, Serialize)]
pub struct LinkShareLogin {
    pub token: String,
    pub list_id: i64,
    pub right: crate::types::Right,
}

fn share_not_found(share_id: i64, hash: &str) -> Error {
    Error::ListShareDoesNotExist {
        share_id,
        hash: hash.to_string(),
    }
}

pub fn load_link_share(s: &Session<'_>, share_id: i64) -> Result<LinkSharing> {
    s.get_link_share(share_id)?
        .ok_or_else(|| share_not_found(share_id, ""))
}

/// Bcrypt hash of a share password. Slow on purpose, so callers run it
/// outside any open session.
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| Error::Internal(format!("failed to hash link share password: {e}")))
}

/// Creates a share on `share.list_id`. A share given a `password_hash` from
/// [`hash_password`] is password protected. The returned share never
/// carries the password.
pub fn create(
    s: &Session<'_>,
    auth: &Auth,
    events: &dyn Dispatcher,
    share: &mut LinkSharing,
    password_hash: Option<String>,
) -> Result<()> {
    share.right.is_valid()?;
    require(share.can_create(s, auth)?)?;

    share.hash = random_alphanumeric(HASH_LENGTH);
    share.shared_by_id = auth.id();

    match password_hash {
        Some(hash) => {
            share.password = hash;
            share.sharing_type = SharingType::WithPassword;
        }
        None => {
            share.password.clear();
            share.sharing_type = SharingType::WithoutPassword;
        }
    }

    s.create_link_share(share)?;
    share.password.clear();
    share.shared_by = auth.user().cloned();

    events.dispatch(Event::LinkShareCreated {
        share: share.clone(),
        doer_id: auth.id(),
    })?;

    tracing::debug!(share_id = share.id, list_id = share.list_id, "Created link share");
    Ok(())
}

/// Checks a supplied password against a stored share.
pub fn verify_password(share: &LinkSharing, password: &str) -> Result<()> {
    if share.sharing_type != SharingType::WithPassword {
        return Ok(());
    }
    if password.is_empty() {
        return Err(Error::LinkSharePasswordRequired { share_id: share.id });
    }
    match bcrypt::verify(password, &share.password) {
        Ok(true) => Ok(()),
        Ok(false) => Err(Error::LinkSharePasswordInvalid { share_id: share.id }),
        Err(e) => {
            tracing::warn!(share_id = share.id, "Stored link share password is unreadable: {e}");
            Err(Error::LinkSharePasswordInvalid { share_id: share.id })
        }
    }
}

/// The share behind a public hash, password included.
pub fn find_by_hash(s: &Session<'_>, hash: &str) -> Result<LinkSharing> {
    s.get_link_share_by_hash(hash)?
        .ok_or_else(|| share_not_found(0, hash))
}

/// Checks the password of a share loaded with [`find_by_hash`] and mints a
/// stateless token for it. Needs no session.
pub fn login(tokens: &LinkShareTokens, share: &LinkSharing, password: &str) -> Result<LinkShareLogin> {
    verify_password(share, password)?;

    Ok(LinkShareLogin {
        token: tokens.issue(share)?,
        list_id: share.list_id,
        right: share.right,
    })
}

fn attach_shared_by(s: &Session<'_>, share: &mut LinkSharing) -> Result<()> {
    share.password.clear();
    share.shared_by = s.get_user(share.shared_by_id)?.map(|mut user| {
        user.email.clear();
        user
    });
    Ok(())
}

pub fn read_one(s: &Session<'_>, auth: &Auth, share_id: i64) -> Result<LinkSharing> {
    let mut share = load_link_share(s, share_id)?;
    require(share.can_read(s, auth)?)?;
    attach_shared_by(s, &mut share)?;
    Ok(share)
}

/// All shares of a list, searchable by hash.
pub fn read_all(s: &Session<'_>, auth: &Auth, list_id: i64, window: &Window) -> Result<Paged<LinkSharing>> {
    let list = load_list(s, list_id)?;
    require(list.can_read(s, auth)?)?;

    let mut items = s.list_link_shares(list_id, &window.search, window.limit, window.offset)?;
    for share in &mut items {
        attach_shared_by(s, share)?;
    }
    let total = s.count_link_shares(list_id, &window.search)?;

    Ok(Paged {
        items,
        total,
        limit: window.limit,
    })
}

/// Removes a share. Tokens already issued for it stay valid until they expire.
pub fn delete(s: &Session<'_>, auth: &Auth, list_id: i64, share_id: i64) -> Result<()> {
    let share = load_link_share(s, share_id)?;
    if share.list_id != list_id {
        return Err(share_not_found(share_id, ""));
    }
    require(share.can_delete(s, auth)?)?;
    s.delete_link_share(share_id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::list_access;
    use crate::testing::Fixture;
    use crate::types::Right;

    fn tokens() -> LinkShareTokens {
        LinkShareTokens::new(b"test-secret".to_vec(), 3600)
    }

    fn create_share(fx: &Fixture, right: Right, password: &str) -> LinkSharing {
        let s = fx.session();
        let mut share = LinkSharing {
            list_id: fx.list.id,
            right,
            password: password.to_string(),
            ..Default::default()
        };
        let hash = (!password.is_empty()).then(|| hash_password(password).unwrap());
        create(&s, &fx.auth(&fx.owner), &fx.events, &mut share, hash).unwrap();
        s.commit().unwrap();
        share
    }

    #[test]
    fn test_create_generates_hash_and_clears_password() {
        let fx = Fixture::new();
        let share = create_share(&fx, Right::READ, "");
        assert_eq!(share.hash.len(), HASH_LENGTH);
        assert_eq!(share.sharing_type, SharingType::WithoutPassword);
        assert_eq!(share.shared_by_id, fx.owner.id);
        assert!(share.password.is_empty());
        assert_eq!(fx.events.names(), vec!["link_share.created"]);

        let json = serde_json::to_value(&share).unwrap();
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_password_scenario() {
        let fx = Fixture::new();
        let share = create_share(&fx, Right::READ_WRITE, "1234");
        assert_eq!(share.sharing_type, SharingType::WithPassword);

        let s = fx.session();
        let stored = find_by_hash(&s, &share.hash).unwrap();
        drop(s);
        assert_ne!(stored.password, "1234");

        let result = login(&tokens(), &stored, "");
        assert!(matches!(result, Err(Error::LinkSharePasswordRequired { .. })));

        let result = login(&tokens(), &stored, "wrong");
        assert!(matches!(result, Err(Error::LinkSharePasswordInvalid { .. })));

        let issued = login(&tokens(), &stored, "1234").unwrap();
        assert_eq!(issued.right, Right::READ_WRITE);
        let principal = tokens().verify(&issued.token).unwrap();
        assert_eq!(principal.right, Right::READ_WRITE);
        assert_eq!(principal.list_id, fx.list.id);
    }

    #[test]
    fn test_login_needs_no_session() {
        let fx = Fixture::new();
        let share = create_share(&fx, Right::READ, "1234");
        let stored = find_by_hash(&fx.session(), &share.hash).unwrap();

        let busy = fx.session();
        assert!(login(&tokens(), &stored, "1234").is_ok());
        assert!(verify_password(&stored, "1234").is_ok());
        assert!(bcrypt::verify("pw", &hash_password("pw").unwrap()).unwrap());
        busy.commit().unwrap();
    }

    #[test]
    fn test_authenticate_unknown_hash() {
        let fx = Fixture::new();
        let s = fx.session();
        let result = find_by_hash(&s, "nope");
        assert!(matches!(result, Err(Error::ListShareDoesNotExist { .. })));
    }

    #[test]
    fn test_token_principal_resolves_share_right() {
        let fx = Fixture::new();
        let share = create_share(&fx, Right::READ, "");
        let s = fx.session();
        let issued = login(&tokens(), &find_by_hash(&s, &share.hash).unwrap(), "").unwrap();
        let auth = Auth::LinkShare(tokens().verify(&issued.token).unwrap());

        let access = list_access(&s, &auth, &fx.list).unwrap();
        assert!(access.can_read());
        assert!(!access.can_write());
    }

    #[test]
    fn test_reader_cannot_create() {
        let fx = Fixture::new();
        let s = fx.session();
        let mut share = LinkSharing {
            list_id: fx.list.id,
            right: Right::READ,
            ..Default::default()
        };
        let result = create(&s, &fx.auth(&fx.bob), &fx.events, &mut share, None);
        assert!(matches!(result, Err(Error::Forbidden)));
    }

    #[test]
    fn test_read_all_scrubs_passwords_and_attaches_sharer() {
        let fx = Fixture::new();
        create_share(&fx, Right::READ, "secret");
        create_share(&fx, Right::READ, "");

        let s = fx.session();
        let page = read_all(&s, &fx.auth(&fx.owner), fx.list.id, &Window::all()).unwrap();
        assert_eq!(page.total, 2);
        for share in &page.items {
            assert!(share.password.is_empty());
            assert_eq!(share.shared_by.as_ref().unwrap().username, "owner");
        }

        let result = read_all(&s, &fx.auth(&fx.bob), fx.list.id, &Window::all());
        assert!(matches!(result, Err(Error::Forbidden)));
    }

    #[test]
    fn test_delete_checks_list() {
        let fx = Fixture::new();
        let share = create_share(&fx, Right::READ, "");
        let s = fx.session();

        let result = delete(&s, &fx.auth(&fx.owner), fx.list.id + 1, share.id);
        assert!(matches!(result, Err(Error::ListShareDoesNotExist { .. })));

        delete(&s, &fx.auth(&fx.owner), fx.list.id, share.id).unwrap();
        assert!(s.get_link_share(share.id).unwrap().is_none());
    }
}

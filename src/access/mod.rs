//! Access resolution: who may read or change what.
//!
//! Every shareable entity implements [`Rights`]. Rights on lists are resolved
//! by [`list_access`], which feeds the ownership and sharing grants into a
//! [`Resolver`]; all other entities delegate to their list or namespace.

mod bucket;
mod label;
mod link_share;
mod list;
mod namespace;
mod resolver;
mod sharing;
mod task;

pub use label::load_label;
pub use list::{ensure_list_writable, list_access, list_write_check, load_list};
pub use namespace::{load_namespace, namespace_access};
pub use resolver::{Access, GrantSource, Resolver};
pub use task::load_task;

use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::store::{Session, ShareTable};
use crate::types::Right;

/// Capability checks for one entity. `Ok(false)` means the principal lacks
/// the right; errors are reserved for missing entities and archived state.
pub trait Rights {
    fn can_read(&self, s: &Session<'_>, auth: &Auth) -> Result<bool>;
    fn can_create(&self, s: &Session<'_>, auth: &Auth) -> Result<bool>;
    fn can_update(&self, s: &Session<'_>, auth: &Auth) -> Result<bool>;
    fn can_delete(&self, s: &Session<'_>, auth: &Auth) -> Result<bool>;
}

/// Turns a failed capability check into `Forbidden`.
pub fn require(allowed: bool) -> Result<()> {
    if allowed { Ok(()) } else { Err(Error::Forbidden) }
}

/// Highest right a user holds on `parent_id` through any of the relation tables.
fn shared_right(
    s: &Session<'_>,
    tables: &[ShareTable],
    parent_id: i64,
    user_id: i64,
) -> Result<Option<Right>> {
    let mut best = None;
    for table in tables {
        let right = s.share_right_for_user(*table, parent_id, user_id)?;
        best = best.max(right);
    }
    Ok(best)
}

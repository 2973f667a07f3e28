use chrono::Utc;
use serde::Deserialize;

use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::store::Session;
use crate::types::{AvatarProvider, User};

/// The settings a user changes from the general settings page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub name: String,
    pub email_reminders_enabled: bool,
    pub discoverable_by_name: bool,
    pub discoverable_by_email: bool,
    pub overdue_tasks_reminders_enabled: bool,
}

/// The caller as currently stored, settings included. Link shares have no
/// settings.
pub fn current(s: &Session<'_>, auth: &Auth) -> Result<User> {
    let user = auth.require_user()?;
    s.get_user(user.id)?.ok_or_else(|| Error::UserDoesNotExist {
        user: user.username.clone(),
    })
}

pub fn update_general_settings(
    s: &Session<'_>,
    auth: &Auth,
    settings: &GeneralSettings,
) -> Result<User> {
    let mut user = current(s, auth)?;
    user.name = settings.name.clone();
    user.settings.email_reminders_enabled = settings.email_reminders_enabled;
    user.settings.discoverable_by_name = settings.discoverable_by_name;
    user.settings.discoverable_by_email = settings.discoverable_by_email;
    user.settings.overdue_tasks_reminders_enabled = settings.overdue_tasks_reminders_enabled;
    user.updated = Utc::now();
    s.update_user_settings(&user)?;
    Ok(user)
}

pub fn set_avatar_provider(s: &Session<'_>, auth: &Auth, provider: &str) -> Result<User> {
    let provider: AvatarProvider = provider.parse()?;
    let mut user = current(s, auth)?;
    user.settings.avatar_provider = provider;
    user.updated = Utc::now();
    s.update_user_settings(&user)?;
    Ok(user)
}

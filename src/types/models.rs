use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::Right;
use crate::error::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(skip)]
    pub settings: UserSettings,
}

/// Preferences only the user themselves can see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub email_reminders_enabled: bool,
    pub discoverable_by_name: bool,
    pub discoverable_by_email: bool,
    pub overdue_tasks_reminders_enabled: bool,
    pub avatar_provider: AvatarProvider,
}

/// Where clients should take the user's avatar from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarProvider {
    #[default]
    Default,
    Initials,
    Gravatar,
    Upload,
}

impl AvatarProvider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AvatarProvider::Default => "default",
            AvatarProvider::Initials => "initials",
            AvatarProvider::Gravatar => "gravatar",
            AvatarProvider::Upload => "upload",
        }
    }
}

impl FromStr for AvatarProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "default" => AvatarProvider::Default,
            "initials" => AvatarProvider::Initials,
            "gravatar" => AvatarProvider::Gravatar,
            "upload" => AvatarProvider::Upload,
            _ => {
                return Err(Error::InvalidAvatarProvider {
                    provider: s.to_string(),
                });
            }
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(skip)]
    pub token_hash: String,
    #[serde(skip)]
    pub token_lookup: String,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_by_id: i64,
    pub members: Vec<TeamMember>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamMember {
    pub id: i64,
    #[serde(skip)]
    pub team_id: i64,
    pub user_id: i64,
    pub username: String,
    pub admin: bool,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Namespace {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub owner_id: i64,
    pub is_archived: bool,
    pub hex_color: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Namespace {
    /// Id of the virtual namespace holding lists shared directly with a user.
    pub const SHARED_LISTS_ID: i64 = -1;

    #[must_use]
    pub fn is_pseudo(&self) -> bool {
        self.id < 0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct List {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub identifier: String,
    pub hex_color: String,
    pub namespace_id: i64,
    pub owner_id: i64,
    pub is_archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_file_id: Option<i64>,
    pub position: f64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// A kanban column of a list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Bucket {
    pub id: i64,
    pub title: String,
    pub list_id: i64,
    /// Maximum number of tasks in this bucket, 0 means unlimited.
    pub limit: i64,
    pub is_done_bucket: bool,
    pub position: f64,
    pub created_by_id: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// How a repeating task moves its dates forward once it is marked done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum RepeatMode {
    /// Add `repeat_after` seconds to every date.
    #[default]
    Default,
    /// Add one calendar month to every date.
    Month,
    /// Schedule relative to the moment the task was marked done.
    FromCurrentDate,
}

impl From<RepeatMode> for i64 {
    fn from(mode: RepeatMode) -> Self {
        match mode {
            RepeatMode::Default => 0,
            RepeatMode::Month => 1,
            RepeatMode::FromCurrentDate => 2,
        }
    }
}

impl TryFrom<i64> for RepeatMode {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Default),
            1 => Ok(Self::Month),
            2 => Ok(Self::FromCurrentDate),
            other => Err(format!("invalid repeat mode {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub done: bool,
    pub done_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub reminder_dates: Vec<DateTime<Utc>>,
    pub list_id: i64,
    /// Repeat interval in seconds, 0 disables repetition.
    pub repeat_after: i64,
    pub repeat_mode: RepeatMode,
    /// 0 is unset, 1 lowest, 9 highest.
    pub priority: i64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub assignees: Vec<User>,
    pub labels: Vec<Label>,
    pub hex_color: String,
    pub percent_done: f64,
    pub identifier: String,
    pub index: i64,
    pub uid: String,
    pub related_tasks: BTreeMap<RelationKind, Vec<Task>>,
    pub attachments: Vec<TaskAttachment>,
    pub bucket_id: i64,
    pub position: f64,
    pub created_by_id: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub hex_color: String,
    pub created_by_id: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelTask {
    pub id: i64,
    pub task_id: i64,
    pub label_id: i64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Subtask,
    Parenttask,
    Related,
    Duplicateof,
    Duplicates,
    Blocking,
    Blocked,
    Precedes,
    Follows,
    Copiedfrom,
    Copiedto,
}

impl RelationKind {
    /// The kind stored on the other task when a relation is created.
    #[must_use]
    pub fn inverse(self) -> RelationKind {
        use RelationKind::*;
        match self {
            Subtask => Parenttask,
            Parenttask => Subtask,
            Related => Related,
            Duplicateof => Duplicates,
            Duplicates => Duplicateof,
            Blocking => Blocked,
            Blocked => Blocking,
            Precedes => Follows,
            Follows => Precedes,
            Copiedfrom => Copiedto,
            Copiedto => Copiedfrom,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        use RelationKind::*;
        match self {
            Subtask => "subtask",
            Parenttask => "parenttask",
            Related => "related",
            Duplicateof => "duplicateof",
            Duplicates => "duplicates",
            Blocking => "blocking",
            Blocked => "blocked",
            Precedes => "precedes",
            Follows => "follows",
            Copiedfrom => "copiedfrom",
            Copiedto => "copiedto",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use RelationKind::*;
        Ok(match s {
            "subtask" => Subtask,
            "parenttask" => Parenttask,
            "related" => Related,
            "duplicateof" => Duplicateof,
            "duplicates" => Duplicates,
            "blocking" => Blocking,
            "blocked" => Blocked,
            "precedes" => Precedes,
            "follows" => Follows,
            "copiedfrom" => Copiedfrom,
            "copiedto" => Copiedto,
            _ => return Err(Error::InvalidRelationKind),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRelation {
    pub task_id: i64,
    pub other_task_id: i64,
    pub relation_kind: RelationKind,
    #[serde(default)]
    pub created_by_id: i64,
    #[serde(default)]
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct File {
    pub id: i64,
    pub name: String,
    pub size: i64,
    pub created_by_id: i64,
    pub created: DateTime<Utc>,
    /// Raw bytes, only ever read from import payloads.
    #[serde(skip_serializing, deserialize_with = "deserialize_base64")]
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskAttachment {
    pub id: i64,
    pub task_id: i64,
    pub created_by_id: i64,
    pub file: File,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListUser {
    pub id: i64,
    /// Username of the user the list is shared with.
    #[serde(rename = "user_id")]
    pub username: String,
    #[serde(skip)]
    pub user_id: i64,
    pub list_id: i64,
    pub right: Right,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceUser {
    pub id: i64,
    #[serde(rename = "user_id")]
    pub username: String,
    #[serde(skip)]
    pub user_id: i64,
    pub namespace_id: i64,
    pub right: Right,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamList {
    pub id: i64,
    pub team_id: i64,
    pub list_id: i64,
    pub right: Right,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamNamespace {
    pub id: i64,
    pub team_id: i64,
    pub namespace_id: i64,
    pub right: Right,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserWithRight {
    #[serde(flatten)]
    pub user: User,
    pub right: Right,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamWithRight {
    #[serde(flatten)]
    pub team: Team,
    pub right: Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum SharingType {
    #[default]
    Undefined,
    WithoutPassword,
    WithPassword,
}

impl From<SharingType> for i64 {
    fn from(t: SharingType) -> Self {
        match t {
            SharingType::Undefined => 0,
            SharingType::WithoutPassword => 1,
            SharingType::WithPassword => 2,
        }
    }
}

impl TryFrom<i64> for SharingType {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Undefined),
            1 => Ok(Self::WithoutPassword),
            2 => Ok(Self::WithPassword),
            other => Err(format!("invalid sharing type {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSharing {
    pub id: i64,
    pub hash: String,
    pub name: String,
    pub list_id: i64,
    pub right: Right,
    pub sharing_type: SharingType,
    /// Plain password on input, bcrypt hash once stored. Never serialized.
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub shared_by: Option<User>,
    #[serde(skip)]
    pub shared_by_id: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

pub(crate) fn deserialize_base64<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    let encoded: Option<String> = Option::deserialize(deserializer)?;
    match encoded {
        Some(s) if !s.is_empty() => STANDARD.decode(s).map_err(serde::de::Error::custom),
        _ => Ok(Vec::new()),
    }
}

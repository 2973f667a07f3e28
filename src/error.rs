use thiserror::Error;

use crate::types::{RelationKind, Right};

/// Broad classification of a failure, used by transports to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    PreconditionFailed,
    InvalidInput,
    Unauthorized,
    Internal,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("failed to dispatch event: {0}")]
    EventDispatch(String),

    #[error("token lookup collision")]
    TokenLookupCollision,

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("invalid token format")]
    InvalidTokenFormat,

    #[error("token expired")]
    TokenExpired,

    #[error("bad request: {0}")]
    BadRequest(String),

    // Users and teams
    #[error("a user with the username '{username}' already exists")]
    UsernameExists { username: String },

    #[error("the username must not be empty")]
    UsernameCannotBeEmpty,

    #[error("the user '{user}' does not exist")]
    UserDoesNotExist { user: String },

    #[error("'{provider}' is not a valid avatar provider")]
    InvalidAvatarProvider { provider: String },

    #[error("the team does not exist [team id: {team_id}]")]
    TeamDoesNotExist { team_id: i64 },

    #[error("the team name must not be empty")]
    TeamNameCannotBeEmpty,

    #[error("the user is already a member of that team [team id: {team_id}, user id: {user_id}]")]
    UserIsMemberOfTeam { team_id: i64, user_id: i64 },

    // Namespaces
    #[error("the namespace does not exist [namespace id: {namespace_id}]")]
    NamespaceDoesNotExist { namespace_id: i64 },

    #[error("the namespace title must not be empty")]
    NamespaceNameCannotBeEmpty,

    #[error("you need to have namespace read access [namespace id: {namespace_id}, user id: {user_id}]")]
    NeedToHaveNamespaceReadAccess { namespace_id: i64, user_id: i64 },

    #[error("the namespace is archived and can therefore only be accessed read only [namespace id: {namespace_id}]")]
    NamespaceIsArchived { namespace_id: i64 },

    // Lists
    #[error("the list does not exist [list id: {list_id}]")]
    ListDoesNotExist { list_id: i64 },

    #[error("you need to have read access to this list [list id: {list_id}, user id: {user_id}]")]
    NeedToHaveListReadAccess { list_id: i64, user_id: i64 },

    #[error("the list title must not be empty")]
    ListTitleCannotBeEmpty,

    #[error("the list share does not exist [share id: {share_id}, hash: {hash}]")]
    ListShareDoesNotExist { share_id: i64, hash: String },

    #[error("the list identifier is not unique [identifier: {identifier}]")]
    ListIdentifierIsNotUnique { identifier: String },

    #[error("the list is archived and can therefore only be accessed read only [list id: {list_id}]")]
    ListIsArchived { list_id: i64 },

    #[error("a list cannot belong to a pseudo namespace")]
    ListCannotBelongToAPseudoNamespace,

    #[error("a list needs to belong to a namespace")]
    ListMustBelongToANamespace,

    // Tasks
    #[error("the task title must not be empty")]
    TaskCannotBeEmpty,

    #[error("the task does not exist [task id: {task_id}]")]
    TaskDoesNotExist { task_id: i64 },

    #[error("no task with this uid exists in the list [uid: {uid}]")]
    TaskUidDoesNotExist { uid: String },

    #[error("the task priority must be between 0 and 9 [priority: {priority}]")]
    InvalidTaskPriority { priority: i64 },

    #[error("the repeat interval must be between 0 and 100 years [repeat_after: {repeat_after}]")]
    InvalidRepeatInterval { repeat_after: i64 },

    #[error("the relation kind is invalid")]
    InvalidRelationKind,

    #[error("the task relation already exists [task id: {task_id}, other task id: {other_task_id}, kind: {kind}]")]
    RelationAlreadyExists {
        kind: RelationKind,
        task_id: i64,
        other_task_id: i64,
    },

    #[error("the task relation does not exist [task id: {task_id}, other task id: {other_task_id}, kind: {kind}]")]
    RelationDoesNotExist {
        kind: RelationKind,
        task_id: i64,
        other_task_id: i64,
    },

    #[error("a task cannot be related to itself [task id: {task_id}]")]
    RelationTasksCannotBeTheSame { task_id: i64 },

    #[error("the task attachment does not exist [attachment id: {attachment_id}]")]
    TaskAttachmentDoesNotExist { attachment_id: i64 },

    #[error("the file does not exist [file id: {file_id}]")]
    FileDoesNotExist { file_id: i64 },

    // Sharing relations
    #[error("the team already has access to that resource [team id: {team_id}, id: {id}]")]
    TeamAlreadyHasAccess { team_id: i64, id: i64 },

    #[error("the team does not have access to that resource [team id: {team_id}, id: {id}]")]
    TeamDoesNotHaveAccess { team_id: i64, id: i64 },

    #[error("the user already has access to that resource [user id: {user_id}, id: {id}]")]
    UserAlreadyHasAccess { user_id: i64, id: i64 },

    #[error("the user does not have access to that resource [user id: {user_id}, id: {id}]")]
    UserDoesNotHaveAccess { user_id: i64, id: i64 },

    // Labels
    #[error("the label already exists on that task [label id: {label_id}, task id: {task_id}]")]
    LabelIsAlreadyOnTask { label_id: i64, task_id: i64 },

    #[error("the label does not exist [label id: {label_id}]")]
    LabelDoesNotExist { label_id: i64 },

    #[error("you don't have access to this label [label id: {label_id}]")]
    UserHasNoAccessToLabel { label_id: i64 },

    // Rights
    #[error("the right is invalid [right: {right}]")]
    InvalidRight { right: Right },

    // Buckets
    #[error("the bucket does not exist [bucket id: {bucket_id}]")]
    BucketDoesNotExist { bucket_id: i64 },

    #[error("the bucket does not belong to that list [bucket id: {bucket_id}, list id: {list_id}]")]
    BucketDoesNotBelongToList { bucket_id: i64, list_id: i64 },

    #[error("you cannot remove the last bucket of a list [bucket id: {bucket_id}, list id: {list_id}]")]
    CannotRemoveLastBucket { bucket_id: i64, list_id: i64 },

    #[error("you cannot add the task to this bucket as it already exceeded the limit [bucket id: {bucket_id}, limit: {limit}]")]
    BucketLimitExceeded { bucket_id: i64, limit: i64 },

    #[error("there can be only one done bucket per list [bucket id: {bucket_id}, list id: {list_id}]")]
    OnlyOneDoneBucketPerList { bucket_id: i64, list_id: i64 },

    // Link shares
    #[error("this link share requires a password for authentication, but none was provided")]
    LinkSharePasswordRequired { share_id: i64 },

    #[error("the provided link share password is invalid")]
    LinkSharePasswordInvalid { share_id: i64 },

    #[error("the link share token is invalid")]
    LinkShareTokenInvalid,

    // OpenID
    #[error("the openid provider does not exist [key: {key}]")]
    OpenIdProviderDoesNotExist { key: String },
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        use Error::*;
        match self {
            Database(_) | Io(_) | Config(_) | Internal(_) | EventDispatch(_)
            | TokenLookupCollision => ErrorKind::Internal,

            Unauthorized | InvalidTokenFormat | TokenExpired | LinkShareTokenInvalid => {
                ErrorKind::Unauthorized
            }

            Forbidden
            | NeedToHaveNamespaceReadAccess { .. }
            | NeedToHaveListReadAccess { .. }
            | UserHasNoAccessToLabel { .. }
            | LinkSharePasswordInvalid { .. } => ErrorKind::Forbidden,

            UserDoesNotExist { .. }
            | TeamDoesNotExist { .. }
            | NamespaceDoesNotExist { .. }
            | ListDoesNotExist { .. }
            | ListShareDoesNotExist { .. }
            | TaskDoesNotExist { .. }
            | TaskUidDoesNotExist { .. }
            | RelationDoesNotExist { .. }
            | TaskAttachmentDoesNotExist { .. }
            | FileDoesNotExist { .. }
            | TeamDoesNotHaveAccess { .. }
            | UserDoesNotHaveAccess { .. }
            | LabelDoesNotExist { .. }
            | BucketDoesNotExist { .. }
            | OpenIdProviderDoesNotExist { .. } => ErrorKind::NotFound,

            UsernameExists { .. }
            | UserIsMemberOfTeam { .. }
            | RelationAlreadyExists { .. }
            | TeamAlreadyHasAccess { .. }
            | UserAlreadyHasAccess { .. }
            | LabelIsAlreadyOnTask { .. } => ErrorKind::Conflict,

            NamespaceIsArchived { .. }
            | ListIsArchived { .. }
            | ListCannotBelongToAPseudoNamespace
            | ListMustBelongToANamespace
            | CannotRemoveLastBucket { .. }
            | BucketLimitExceeded { .. }
            | OnlyOneDoneBucketPerList { .. }
            | LinkSharePasswordRequired { .. } => ErrorKind::PreconditionFailed,

            BadRequest(_)
            | UsernameCannotBeEmpty
            | InvalidAvatarProvider { .. }
            | TeamNameCannotBeEmpty
            | NamespaceNameCannotBeEmpty
            | ListTitleCannotBeEmpty
            | ListIdentifierIsNotUnique { .. }
            | TaskCannotBeEmpty
            | InvalidTaskPriority { .. }
            | InvalidRepeatInterval { .. }
            | InvalidRelationKind
            | RelationTasksCannotBeTheSame { .. }
            | InvalidRight { .. }
            | BucketDoesNotBelongToList { .. } => ErrorKind::InvalidInput,
        }
    }

    /// Stable numeric code sent to API clients alongside the message.
    /// Generic failures share code 0.
    #[must_use]
    pub fn code(&self) -> i64 {
        use Error::*;
        match self {
            UsernameExists { .. } => 1001,
            UsernameCannotBeEmpty => 1004,
            UserDoesNotExist { .. } => 1005,
            ListDoesNotExist { .. } => 3001,
            NeedToHaveListReadAccess { .. } => 3004,
            ListTitleCannotBeEmpty => 3005,
            ListShareDoesNotExist { .. } => 3006,
            ListIdentifierIsNotUnique { .. } => 3007,
            ListIsArchived { .. } => 3008,
            ListCannotBelongToAPseudoNamespace => 3009,
            ListMustBelongToANamespace => 3010,
            TaskCannotBeEmpty => 4001,
            TaskDoesNotExist { .. } | TaskUidDoesNotExist { .. } => 4002,
            InvalidRelationKind => 4007,
            RelationAlreadyExists { .. } => 4008,
            RelationDoesNotExist { .. } => 4009,
            RelationTasksCannotBeTheSame { .. } => 4010,
            TaskAttachmentDoesNotExist { .. } => 4011,
            InvalidTaskPriority { .. } => 4020,
            InvalidRepeatInterval { .. } => 4022,
            FileDoesNotExist { .. } => 4021,
            NamespaceDoesNotExist { .. } => 5001,
            NamespaceNameCannotBeEmpty => 5006,
            NeedToHaveNamespaceReadAccess { .. } => 5009,
            NamespaceIsArchived { .. } => 5012,
            TeamNameCannotBeEmpty => 6001,
            TeamDoesNotExist { .. } => 6002,
            TeamAlreadyHasAccess { .. } => 6004,
            UserIsMemberOfTeam { .. } => 6005,
            TeamDoesNotHaveAccess { .. } => 6007,
            UserAlreadyHasAccess { .. } => 7002,
            UserDoesNotHaveAccess { .. } => 7003,
            LabelIsAlreadyOnTask { .. } => 8001,
            LabelDoesNotExist { .. } => 8002,
            UserHasNoAccessToLabel { .. } => 8003,
            InvalidRight { .. } => 9001,
            BucketDoesNotExist { .. } => 10001,
            BucketDoesNotBelongToList { .. } => 10002,
            CannotRemoveLastBucket { .. } => 10003,
            BucketLimitExceeded { .. } => 10004,
            OnlyOneDoneBucketPerList { .. } => 10005,
            LinkSharePasswordRequired { .. } => 13001,
            LinkSharePasswordInvalid { .. } => 13002,
            LinkShareTokenInvalid => 13003,
            OpenIdProviderDoesNotExist { .. } => 14001,
            _ => 0,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archived_errors_are_preconditions() {
        assert_eq!(
            Error::ListIsArchived { list_id: 1 }.kind(),
            ErrorKind::PreconditionFailed
        );
        assert_eq!(
            Error::NamespaceIsArchived { namespace_id: 1 }.kind(),
            ErrorKind::PreconditionFailed
        );
    }

    #[test]
    fn test_codes() {
        assert_eq!(Error::ListDoesNotExist { list_id: 3 }.code(), 3001);
        assert_eq!(
            Error::InvalidRight {
                right: Right::new(7)
            }
            .code(),
            9001
        );
        assert_eq!(Error::Forbidden.code(), 0);
        assert_eq!(
            Error::UserAlreadyHasAccess { user_id: 1, id: 2 }.kind(),
            ErrorKind::Conflict
        );
    }
}

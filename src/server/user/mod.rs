mod buckets;
mod labels;
mod link_shares;
mod lists;
mod migration;
mod namespaces;
mod openid;
mod settings;
mod sharing;
mod tasks;
mod teams;

use std::sync::Arc;

use axum::{
    Router,
    extract::Multipart,
    routing::{delete, get, post, put},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::server::AppState;
use crate::server::response::ApiError;

/// Routes of the JSON API. PUT creates and POST updates.
pub fn user_router() -> Router<Arc<AppState>> {
    Router::new()
        // Namespaces
        .route("/namespaces", get(namespaces::list_namespaces))
        .route("/namespaces", put(namespaces::create_namespace))
        .route("/namespaces/{id}", get(namespaces::get_namespace))
        .route("/namespaces/{id}", post(namespaces::update_namespace))
        .route("/namespaces/{id}", delete(namespaces::delete_namespace))
        .route("/namespaces/{id}/lists", put(lists::create_list))
        // Lists
        .route("/lists", get(lists::list_lists))
        .route("/lists/{id}", get(lists::get_list))
        .route("/lists/{id}", post(lists::update_list))
        .route("/lists/{id}", delete(lists::delete_list))
        .route("/lists/{id}", put(tasks::create_task))
        .route("/lists/{id}/tasks", get(tasks::list_tasks))
        .route("/lists/{id}/background", post(lists::set_background))
        .route("/lists/{id}/backgrounds/upload", put(lists::upload_background))
        // Buckets
        .route("/lists/{id}/buckets", get(buckets::list_buckets))
        .route("/lists/{id}/buckets", put(buckets::create_bucket))
        .route("/lists/{id}/buckets/{bucket}", post(buckets::update_bucket))
        .route("/lists/{id}/buckets/{bucket}", delete(buckets::delete_bucket))
        // Tasks
        .route("/tasks/{id}", get(tasks::get_task))
        .route("/tasks/{id}", post(tasks::update_task))
        .route("/tasks/{id}", delete(tasks::delete_task))
        .route("/tasks/{id}/relations", put(tasks::create_relation))
        .route(
            "/tasks/{id}/relations/{kind}/{other}",
            delete(tasks::delete_relation),
        )
        .route("/tasks/{id}/attachments", put(tasks::upload_attachments))
        .route(
            "/tasks/{id}/attachments/{attachment}",
            get(tasks::download_attachment),
        )
        // Labels
        .route("/labels", get(labels::list_labels))
        .route("/labels", put(labels::create_label))
        .route("/labels/{id}", get(labels::get_label))
        .route("/labels/{id}", post(labels::update_label))
        .route("/labels/{id}", delete(labels::delete_label))
        .route("/tasks/{id}/labels", get(labels::list_task_labels))
        .route("/tasks/{id}/labels", put(labels::add_task_label))
        .route("/tasks/{id}/labels/bulk", post(labels::bulk_set_task_labels))
        .route("/tasks/{id}/labels/{label}", delete(labels::remove_task_label))
        // Sharing
        .route("/lists/{id}/users", get(sharing::list_list_users))
        .route("/lists/{id}/users", put(sharing::share_list_with_user))
        .route("/lists/{id}/users/{username}", post(sharing::update_list_user))
        .route("/lists/{id}/users/{username}", delete(sharing::unshare_list_with_user))
        .route("/lists/{id}/teams", get(sharing::list_list_teams))
        .route("/lists/{id}/teams", put(sharing::share_list_with_team))
        .route("/lists/{id}/teams/{team}", post(sharing::update_list_team))
        .route("/lists/{id}/teams/{team}", delete(sharing::unshare_list_with_team))
        .route("/namespaces/{id}/users", get(sharing::list_namespace_users))
        .route("/namespaces/{id}/users", put(sharing::share_namespace_with_user))
        .route(
            "/namespaces/{id}/users/{username}",
            post(sharing::update_namespace_user),
        )
        .route(
            "/namespaces/{id}/users/{username}",
            delete(sharing::unshare_namespace_with_user),
        )
        .route("/namespaces/{id}/teams", get(sharing::list_namespace_teams))
        .route("/namespaces/{id}/teams", put(sharing::share_namespace_with_team))
        .route(
            "/namespaces/{id}/teams/{team}",
            post(sharing::update_namespace_team),
        )
        .route(
            "/namespaces/{id}/teams/{team}",
            delete(sharing::unshare_namespace_with_team),
        )
        // Link shares
        .route("/lists/{id}/shares", get(link_shares::list_shares))
        .route("/lists/{id}/shares", put(link_shares::create_share))
        .route("/lists/{id}/shares/{share}", get(link_shares::get_share))
        .route("/lists/{id}/shares/{share}", delete(link_shares::delete_share))
        .route("/shares/{hash}/auth", post(link_shares::authenticate))
        // Current user
        .route("/user", get(settings::get_current_user))
        .route("/user/settings/general", post(settings::update_general_settings))
        .route("/user/settings/avatar", get(settings::get_avatar_provider))
        .route("/user/settings/avatar", post(settings::set_avatar_provider))
        // Teams
        .route("/teams", get(teams::list_teams))
        .route("/teams", put(teams::create_team))
        .route("/teams/{id}", get(teams::get_team))
        .route("/teams/{id}", delete(teams::delete_team))
        .route("/teams/{id}/members", put(teams::add_member))
        .route("/teams/{id}/members/{username}", delete(teams::remove_member))
        // Migration
        .route("/migration/structure", put(migration::import_structure))
        .route("/migration/{name}/status", get(migration::migration_status))
        // OpenID
        .route("/auth/openid/providers", get(openid::list_providers))
        .route("/auth/openid/providers/{key}", get(openid::get_provider))
}

/// Applies the fields present in `patch` on top of `current`. Fields the
/// client leaves out keep their stored value.
pub(super) fn merged<T>(current: &T, patch: Value) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let Value::Object(fields) = patch else {
        return Err(Error::BadRequest("expected a JSON object".to_string()));
    };

    let mut value = serde_json::to_value(current)
        .map_err(|e| Error::Internal(format!("failed to serialize current state: {e}")))?;
    if let Value::Object(target) = &mut value {
        target.extend(fields);
    }
    serde_json::from_value(value).map_err(|e| Error::BadRequest(e.to_string()))
}

/// Collects every uploaded file of the multipart field `field_name`.
pub(super) async fn read_uploads(
    mut multipart: Multipart,
    field_name: &str,
) -> std::result::Result<Vec<(String, Vec<u8>)>, ApiError> {
    let mut uploads = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        uploads.push((name, content.to_vec()));
    }

    if uploads.is_empty() {
        return Err(ApiError::bad_request(format!(
            "No file uploaded in field '{field_name}'"
        )));
    }
    Ok(uploads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Namespace;

    #[test]
    fn test_merged_keeps_missing_fields() {
        let current = Namespace {
            id: 4,
            title: "Home".into(),
            description: "chores".into(),
            ..Default::default()
        };
        let updated: Namespace = merged(&current, serde_json::json!({"title": "House"})).unwrap();
        assert_eq!(updated.id, 4);
        assert_eq!(updated.title, "House");
        assert_eq!(updated.description, "chores");
    }

    #[test]
    fn test_merged_rejects_non_objects() {
        let current = Namespace::default();
        let result = merged(&current, serde_json::json!([1, 2]));
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }
}

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use super::auth::DavAuth;
use crate::caldav::{self, CalendarComponent};
use crate::server::AppState;
use crate::server::dto::CalendarQuery;
use crate::server::response::{ApiError, with_session};

const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

fn strip_ics_suffix(file: &str) -> &str {
    file.strip_suffix(".ics").unwrap_or(file)
}

fn calendar_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, CALENDAR_CONTENT_TYPE)], body).into_response()
}

pub async fn get_calendar(
    DavAuth(auth): DavAuth,
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<i64>,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, ApiError> {
    let component: CalendarComponent = query.component.parse()?;
    let body = with_session(&state, |s| caldav::list_calendar(s, &auth, list_id, component))?;

    Ok(calendar_response(body))
}

pub async fn get_task(
    DavAuth(auth): DavAuth,
    State(state): State<Arc<AppState>>,
    Path((list_id, file)): Path<(i64, String)>,
) -> Result<Response, ApiError> {
    let uid = strip_ics_suffix(&file);
    let body = with_session(&state, |s| caldav::get_task(s, &auth, list_id, uid))?;

    Ok(calendar_response(body))
}

pub async fn put_task(
    DavAuth(auth): DavAuth,
    State(state): State<Arc<AppState>>,
    Path((list_id, file)): Path<(i64, String)>,
    body: String,
) -> Result<Response, ApiError> {
    let uid = strip_ics_suffix(&file);
    let task = with_session(&state, |s| {
        caldav::put_task(s, &auth, state.events.as_ref(), list_id, uid, &body)
    })?;
    tracing::debug!(task_id = task.id, list_id, "Stored calendar object");

    let etag = format!("\"{}\"", task.updated.timestamp());
    let location = format!(
        "{}/dav/lists/{list_id}/{}.ics",
        state.public_base_url.as_deref().unwrap_or("").trim_end_matches('/'),
        task.uid
    );
    Ok((
        StatusCode::CREATED,
        [(header::ETAG, etag), (header::LOCATION, location)],
    )
        .into_response())
}

pub async fn delete_task(
    DavAuth(auth): DavAuth,
    State(state): State<Arc<AppState>>,
    Path((list_id, file)): Path<(i64, String)>,
) -> Result<StatusCode, ApiError> {
    let uid = strip_ics_suffix(&file);
    with_session(&state, |s| caldav::delete_task(s, &auth, list_id, uid))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ics_suffix() {
        assert_eq!(strip_ics_suffix("abc-123.ics"), "abc-123");
        assert_eq!(strip_ics_suffix("abc-123"), "abc-123");
    }
}

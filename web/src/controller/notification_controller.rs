use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::notification::IndexParams;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::notification as NotificationApi;
use domain::{notifications::Model, Id};
use serde_json::json;
use service::config::ApiVersion;

use log::*;

/// GET the authenticated user's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(ApiVersion, IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved notifications", body = [domain::notifications::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET notifications for user {} ({params:?})", user.id);

    let notifications =
        NotificationApi::find_by_user(app_state.db_conn_ref(), user.id, params.unread_only)
            .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), notifications)))
}

/// POST create a notification for any user. If the recipient has an open
/// notification stream it receives the new notification immediately.
#[utoipa::path(
    post,
    path = "/api/notifications",
    params(ApiVersion),
    request_body = domain::notifications::Model,
    responses(
        (status = 201, description = "Successfully created a new notification", body = domain::notifications::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipient not found"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(notification_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST notification from user {} to user {}",
        user.id, notification_model.user_id
    );

    let notification = NotificationApi::create(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        notification_model,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), notification)),
    ))
}

/// PUT mark a single notification as read
#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the notification to mark read"),
    ),
    responses(
        (status = 200, description = "Notification marked read", body = domain::notifications::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Notification belongs to another user"),
        (status = 404, description = "Notification not found"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn mark_read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT mark notification {id} read for user {}", user.id);

    let notification = NotificationApi::mark_read(app_state.db_conn_ref(), user.id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), notification)))
}

/// PUT mark every unread notification of the authenticated user as read
#[utoipa::path(
    put,
    path = "/api/notifications/read_all",
    params(ApiVersion),
    responses(
        (status = 200, description = "Number of notifications that were marked read"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn mark_all_read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let updated = NotificationApi::mark_all_read(app_state.db_conn_ref(), user.id).await?;

    info!("Marked {updated} notification(s) read for user {}", user.id);

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        json!({ "updated": updated }),
    )))
}

/// GET the number of unread notifications for badge rendering
#[utoipa::path(
    get,
    path = "/api/notifications/unread_count",
    params(ApiVersion),
    responses(
        (status = 200, description = "Unread notification count"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn unread_count(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let count = NotificationApi::unread_count(app_state.db_conn_ref(), user.id).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        json!({ "unread_count": count }),
    )))
}

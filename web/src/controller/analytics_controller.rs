use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::analytics::IndexParams;
use crate::{AppState, Error};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::analytics as AnalyticsApi;
use domain::analytics_snapshots::Model;
use service::config::ApiVersion;

use log::*;

/// GET the authenticated user's analytics snapshots, newest first
#[utoipa::path(
    get,
    path = "/api/analytics",
    params(ApiVersion, IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved analytics snapshots", body = [domain::analytics_snapshots::Model]),
        (status = 400, description = "Unknown platform"),
        (status = 401, description = "Unauthorized"),
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
    debug!("GET analytics for user {} ({params:?})", user.id);

    let snapshots = AnalyticsApi::find_by_user(
        app_state.db_conn_ref(),
        user.id,
        params.platform,
        Some(params.effective_limit()),
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), snapshots)))
}

/// POST record a new analytics snapshot for the authenticated user. Their
/// open analytics stream receives it as an `analytics-update` frame.
#[utoipa::path(
    post,
    path = "/api/analytics",
    params(ApiVersion),
    request_body = domain::analytics_snapshots::Model,
    responses(
        (status = 201, description = "Snapshot recorded", body = domain::analytics_snapshots::Model),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Negative counters or engagement rate outside 0..=1"),
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
    Json(snapshot_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST {} analytics snapshot for user {}",
        snapshot_model.platform, user.id
    );

    let snapshot = AnalyticsApi::record_snapshot(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        user.id,
        snapshot_model,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), snapshot)),
    ))
}

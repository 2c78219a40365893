use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::AppState;
use ::sse::{connection_stream, Channel};
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use domain::Id;
use futures::{Stream, StreamExt};
use log::*;
use std::convert::Infallible;
use std::future;

/// GET open the authenticated user's notification stream
#[utoipa::path(
    get,
    path = "/api/notifications/sse",
    responses(
        (status = 200, description = "text/event-stream of connected, heartbeat and notification frames", body = String, content_type = "text/event-stream"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub(crate) async fn notifications_sse(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    open_stream(&app_state, Channel::Notifications, user.id)
}

/// GET open the authenticated user's analytics stream
#[utoipa::path(
    get,
    path = "/api/analytics/sse",
    responses(
        (status = 200, description = "text/event-stream of connected, heartbeat and analytics-update frames", body = String, content_type = "text/event-stream"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub(crate) async fn analytics_sse(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    open_stream(&app_state, Channel::Analytics, user.id)
}

// Heartbeats come from the stream itself, so no axum keep-alive comments are
// layered on top.
fn open_stream(
    app_state: &AppState,
    channel: Channel,
    user_id: Id,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Establishing {channel} stream for user {user_id}");

    let frames = connection_stream(app_state.sse_manager.clone(), channel, user_id.to_string())
        .filter_map(move |event| {
            let frame = match event.to_frame() {
                Ok(frame) => Some(Ok(frame)),
                Err(err) => {
                    error!("Dropping unserializable {channel} event for user {user_id}: {err}");
                    None
                }
            };
            future::ready(frame)
        });

    Sse::new(frames)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use crate::test_support::{app_state, login_cookie, next_frame, with_auth_layers};
    use ::sse::message::Event as StreamEvent;
    use ::sse::Channel;
    use axum::body::Body;
    use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
    use chrono::Utc;
    use domain::{users, Id};
    use password_auth::generate_hash;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn creator() -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Id::new_v4(),
            email: "streamer@creatorcompass.io".to_string(),
            first_name: "Sam".to_string(),
            last_name: "Streamer".to_string(),
            display_name: Some("samstreams".to_string()),
            password: generate_hash("password"),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn stream_requires_a_session() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let app = with_auth_layers(crate::router::define_routes(app_state(&db)), &db);

        for uri in ["/api/notifications/sse", "/api/analytics/sse"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn stream_starts_with_connected_and_relays_published_events() {
        let user = creator();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .append_query_results([[user.clone()]])
                .append_query_results([[user.clone()]])
                .append_query_results([[user.clone()]])
                .into_connection(),
        );
        let state = app_state(&db);
        let manager = state.sse_manager.clone();
        let app = with_auth_layers(crate::router::define_routes(state), &db);

        let cookie = login_cookie(&app, &user).await;

        let request = Request::builder()
            .uri("/api/notifications/sse")
            .header("cookie", cookie)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/event-stream"
        );
        let user_id = user.id.to_string();
        assert!(manager.is_connected(Channel::Notifications, &user_id));
        assert!(!manager.is_connected(Channel::Analytics, &user_id));

        let mut body = response.into_body();
        let connected = next_frame(&mut body).await;
        assert!(
            connected.starts_with("data: {\"type\":\"connected\""),
            "{connected}"
        );
        assert!(connected.ends_with("\n\n"));

        manager.publish(
            Channel::Notifications,
            &user_id,
            StreamEvent::Notification {
                notification: json!({"title": "New follower"}),
            },
        );
        let relayed = next_frame(&mut body).await;
        assert_eq!(
            relayed,
            "data: {\"type\":\"notification\",\"notification\":{\"title\":\"New follower\"}}\n\n"
        );

        drop(body);
        assert!(!manager.is_connected(Channel::Notifications, &user_id));
    }
}

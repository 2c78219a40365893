use crate::{
    controller::{
        analytics_controller, health_check_controller, notification_controller,
        user_session_controller,
    },
    middleware::auth::require_auth,
    sse::handler as sse_handler,
    AppState,
};
use axum::{
    middleware::from_fn,
    routing::{get, post, put},
    Router,
};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// Global definition of the OpenAPI document. A path or schema only shows up
// in RapiDoc if it is listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "CreatorCompass API"
        ),
        paths(
            analytics_controller::index,
            analytics_controller::create,
            health_check_controller::health_check,
            notification_controller::index,
            notification_controller::create,
            notification_controller::mark_read,
            notification_controller::mark_all_read,
            notification_controller::unread_count,
            sse_handler::notifications_sse,
            sse_handler::analytics_sse,
            user_session_controller::login,
            user_session_controller::delete,
        ),
        components(
            schemas(
                domain::analytics_snapshots::Model,
                domain::notifications::Model,
                domain::notification_kind::NotificationKind,
                domain::platform::Platform,
                domain::users::Model,
                domain::user::Credentials,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "creator_compass", description = "CreatorCompass notifications and channel analytics API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Cookie session authentication for the OpenAPI document.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "id",
                    "Session id value returned from successful login via Set-Cookie header",
                ))),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(user_session_routes())
        .merge(user_session_protected_routes(app_state.clone()))
        .merge(notification_routes(app_state.clone()))
        .merge(analytics_routes(app_state.clone()))
        .merge(stream_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

pub fn user_session_routes() -> Router {
    Router::new().route("/login", post(user_session_controller::login))
}

pub fn user_session_protected_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/delete", get(user_session_controller::delete))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn notification_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/notifications",
            get(notification_controller::index).post(notification_controller::create),
        )
        .route(
            "/api/notifications/:id/read",
            put(notification_controller::mark_read),
        )
        .route(
            "/api/notifications/read_all",
            put(notification_controller::mark_all_read),
        )
        .route(
            "/api/notifications/unread_count",
            get(notification_controller::unread_count),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn analytics_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/analytics",
            get(analytics_controller::index).post(analytics_controller::create),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

/// Long-lived `text/event-stream` endpoints. EventSource cannot send custom
/// headers, so these skip the `x-version` check.
fn stream_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/notifications/sse",
            get(sse_handler::notifications_sse),
        )
        .route("/api/analytics/sse", get(sse_handler::analytics_sse))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

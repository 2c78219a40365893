use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, COOKIE},
    HeaderName, HeaderValue, Method,
};
use axum_login::AuthManagerLayerBuilder;
use domain::error::Error as DomainError;
use domain::events::EventPublisher;
use domain::user::Backend;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::{ApiVersion, Config};
use std::sync::Arc;
use time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

mod controller;
mod error;
mod extractors;
mod middleware;
mod params;
mod router;
mod sse;

pub use error::{Error, Result};

/// Everything a request handler can reach: database and config from
/// `service`, plus the stream registry and the event publisher.
#[derive(Clone)]
pub struct AppState {
    pub service_state: service::AppState,
    pub sse_manager: Arc<::sse::Manager>,
    pub event_publisher: Arc<EventPublisher>,
}

impl AppState {
    pub fn new(
        service_state: service::AppState,
        sse_manager: Arc<::sse::Manager>,
        event_publisher: EventPublisher,
    ) -> Self {
        Self {
            service_state,
            sse_manager,
            event_publisher: Arc::new(event_publisher),
        }
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.service_state.db_conn_ref()
    }

    pub fn database_connection(&self) -> &Arc<DatabaseConnection> {
        &self.service_state.database_connection
    }

    pub fn config(&self) -> &Config {
        &self.service_state.config
    }
}

pub async fn init_server(app_state: AppState) -> Result<()> {
    let pool = app_state.db_conn_ref().get_postgres_connection_pool();

    // Sessions live next to the application tables so one migration story
    // covers both.
    let session_store = PostgresStore::new(pool.clone())
        .with_schema_name(service::DB_SCHEMA)
        .and_then(|store| store.with_table_name("authorized_sessions"))
        .map_err(|reason| {
            DomainError::other(
                std::io::Error::new(std::io::ErrorKind::InvalidInput, reason),
                "Invalid session store identifiers",
            )
        })?;
    session_store
        .migrate()
        .await
        .map_err(|err| DomainError::other(err, "Session store migration failed"))?;

    let session_expiry = app_state.config().backend_session_expiry_seconds as i64;
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(app_state.config().is_production())
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(session_expiry)));

    let backend = Backend::new(app_state.database_connection());
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    let server_url = format!(
        "{}:{}",
        app_state.config().interface,
        app_state.config().port
    );
    let listener = TcpListener::bind(&server_url)
        .await
        .map_err(|err| DomainError::other(err, "Failed to bind listener"))?;

    let allowed_origins: Vec<HeaderValue> = app_state
        .config()
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring malformed CORS origin: {origin}");
                None
            }
        })
        .collect();

    info!("CORS allowed origins: {allowed_origins:?}");

    let cors_layer = CorsLayer::new()
        .allow_methods([
            Method::DELETE,
            Method::GET,
            Method::OPTIONS,
            Method::PATCH,
            Method::POST,
            Method::PUT,
        ])
        .allow_credentials(true)
        .allow_headers([
            AUTHORIZATION,
            ACCEPT,
            CACHE_CONTROL,
            COOKIE,
            CONTENT_TYPE,
            HeaderName::from_static(ApiVersion::field_name()),
        ])
        .allow_origin(allowed_origins);

    info!("Server starting... listening for connections on http://{server_url}");

    axum::serve(
        listener,
        router::define_routes(app_state)
            .layer(cors_layer)
            .layer(auth_layer)
            .into_make_service(),
    )
    .await
    .map_err(|err| DomainError::other(err, "Server terminated unexpectedly"))?;

    Ok(())
}

use events::EventPublisher;
use log::*;
use service::{config::Config, logging::Logger, AppState};
use sse::{Manager, SseDomainEventHandler};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();

    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
    }

    info!(
        "Starting CreatorCompass backend ({} environment, API version {})",
        config.runtime_env(),
        config.api_version()
    );

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let sse_manager = Arc::new(Manager::with_heartbeat_interval(
        config.sse_heartbeat_interval(),
    ));
    info!(
        "Stream heartbeat interval: {}s",
        sse_manager.heartbeat_interval().as_secs()
    );

    let event_publisher = EventPublisher::new()
        .with_handler(Arc::new(SseDomainEventHandler::new(Arc::clone(&sse_manager))));

    let app_state = web::AppState::new(AppState::new(config, &db), sse_manager, event_publisher);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server exited with error: {e}");
        std::process::exit(1);
    }
}

use listing_chat_service::{
    config, db, error,
    routes,
    services::listing_directory::PgListingDirectory,
    state::AppState,
    websocket::{gateway::BroadcastGateway, pubsub, ConnectionRegistry},
};
use std::sync::Arc;
use tokio::task::JoinHandle;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    listing_chat_service::logging::init_tracing();
    let cfg = Arc::new(config::Config::from_env()?);

    // Initialize DB pool and run embedded migrations
    let db = db::init_pool(&cfg.database_url)
        .await
        .map_err(|e| error::AppError::StartServer(format!("db: {e}")))?;

    let registry = ConnectionRegistry::new();

    // Redis is the optional cross-instance fanout transport; without it
    // broadcasting stays in-process.
    let redis = match cfg.redis_url.as_deref() {
        Some(url) => match redis::Client::open(url) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "invalid REDIS_URL, cross-instance fanout disabled");
                None
            }
        },
        None => {
            tracing::info!("REDIS_URL not set, cross-instance fanout disabled");
            None
        }
    };

    if let Some(client) = redis.clone() {
        let listener_registry = registry.clone();
        let _psub_listener: JoinHandle<()> = tokio::spawn(async move {
            if let Err(e) = pubsub::start_psub_listener(client, listener_registry).await {
                tracing::error!(error = %e, "redis pub/sub listener failed");
            }
        });
    }

    let gateway = Arc::new(BroadcastGateway::new(Some(registry.clone()), redis));
    let listings = Arc::new(PgListingDirectory::new(db.clone()));

    let state = AppState {
        db,
        registry,
        gateway,
        listings,
        config: cfg.clone(),
    };

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting listing-chat-service");

    let app = routes::build_router().with_state(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| error::AppError::StartServer(format!("bind: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| error::AppError::StartServer(e.to_string()))?;

    Ok(())
}

use crate::{
    config::Config, services::listing_directory::ListingDirectory, websocket::gateway::BroadcastGateway,
    websocket::ConnectionRegistry,
};
use sqlx::{Pool, Postgres};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Postgres>,
    pub registry: ConnectionRegistry,
    pub gateway: Arc<BroadcastGateway>,
    pub listings: Arc<dyn ListingDirectory>,
    pub config: Arc<Config>,
}

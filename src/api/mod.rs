//! HTTP surface: room endpoints, websocket upgrade and hub status

mod dto;
mod extractor;
mod room;
mod router;
mod status;
mod websocket;

pub use dto::{CreateRoomRequest, ListRoomsQuery};
pub use router::make_app;

use crate::{conn::Hub, core::Error, store::Store, Config};
use std::sync::Arc;

// ========================// AppState //======================== //

pub struct AppState {
    pub config: Config,
    pub store: Arc<Store>,
    pub hub: Hub,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>, Error> {
        let store = Arc::new(Store::new(&config).await?);
        let hub = Hub::spawn(config.hub_capacity);

        Ok(Arc::new(Self { config, store, hub }))
    }
}

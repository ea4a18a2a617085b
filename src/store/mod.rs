//! Defines the methods for data storage.

use crate::{core::Error, Config};
use sqlx::{postgres::PgPoolOptions, PgPool};

mod message;
mod model;
mod room;

pub use model::*;

#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub async fn new(config: &Config) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;

        let store = Self { pool };
        store.init().await?;

        Ok(store)
    }

    /// Initialize database by running the embedded migrations
    async fn init(&self) -> Result<(), Error> {
        sqlx::migrate!().run(&self.pool).await?;
        tracing::info!("db was successfully initialized");
        Ok(())
    }
}

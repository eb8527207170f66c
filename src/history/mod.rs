mod rest;
mod storage;
mod types;

pub use rest::RestMessageStore;
pub use storage::{LibsqlMessageStore, MessageStore};
pub use types::*;

use crate::{
    Result,
    config::{StoreBackend, StoreConfig},
};
use std::sync::Arc;
use tracing::info;

/// Builds the configured store handle. The handle is passed into the chat
/// session explicitly; there is no process-wide client.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn MessageStore>> {
    match config.backend {
        StoreBackend::Rest => {
            info!("Using REST message store at {}", config.url);
            Ok(Arc::new(RestMessageStore::new(
                &config.url,
                &config.api_key,
                &config.table,
            )?))
        }
        StoreBackend::Local => {
            info!("Using local message store at {}", config.database_path);
            Ok(Arc::new(
                LibsqlMessageStore::new(&config.database_path, &config.table).await?,
            ))
        }
    }
}

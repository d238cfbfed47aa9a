use crate::config::ServerConfig;
use bantay_storage::ConsoleStore;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConsoleStore>,
    pub start_time: DateTime<Utc>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<ConsoleStore>, config: ServerConfig) -> Self {
        Self {
            store,
            start_time: Utc::now(),
            config: Arc::new(config),
        }
    }

    /// Root of uploaded files, `<data_dir>/uploads`.
    pub fn uploads_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.data_dir).join("uploads")
    }
}

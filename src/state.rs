use std::sync::Arc;
use std::time::Duration;

use crate::commands::db::FeedbackStore;

pub struct AppState {
    pub store: Arc<dyn FeedbackStore>,
    pub persistence_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn FeedbackStore>, persistence_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            store,
            persistence_timeout,
        })
    }
}

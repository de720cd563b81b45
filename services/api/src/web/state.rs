//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use sungura_core::ports::{ChatLogService, CompletionService};

/// The shared application state, created once at startup and passed to all handlers.
/// Handlers never mutate it; each request is processed in isolation.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub completion: Arc<dyn CompletionService>,
    /// `None` when persistence is not configured.
    pub chat_log: Option<Arc<dyn ChatLogService>>,
}

impl AppState {
    pub fn persistence_enabled(&self) -> bool {
        self.chat_log.is_some()
    }
}

// Application state module
// Everything a request handler needs, passed explicitly instead of globals

use super::types::Config;
use crate::contact::{ContactStore, WriterHandle};

/// Application state
pub struct AppState {
    pub config: Config,
    /// Read side of the contacts file
    pub store: ContactStore,
    /// Write side, funneled through the single writer task
    pub writer: WriterHandle,
}

impl AppState {
    /// Create `AppState` from an initialized store and a running writer
    pub const fn new(config: Config, store: ContactStore, writer: WriterHandle) -> Self {
        Self {
            config,
            store,
            writer,
        }
    }
}

//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::StationDataCache;
use crate::registry::StationRegistry;

/// Shared application state.
///
/// Generic over the observation source so tests can swap the upstream.
pub struct AppState<S> {
    /// Station catalogue and coverage, read-only after startup
    pub registry: Arc<StationRegistry>,

    /// Per-station observations
    pub cache: Arc<StationDataCache<S>>,
}

impl<S> AppState<S> {
    pub fn new(registry: StationRegistry, cache: StationDataCache<S>) -> Self {
        Self {
            registry: Arc::new(registry),
            cache: Arc::new(cache),
        }
    }
}

// Derived Clone would require `S: Clone`
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            cache: self.cache.clone(),
        }
    }
}

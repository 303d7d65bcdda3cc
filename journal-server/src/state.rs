use journal_core::data::CandleStore;
use journal_core::engine::CandleService;
use std::sync::Arc;

/// Shared state handed to every route.
pub struct AppState {
    pub candles: CandleService<dyn CandleStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn CandleStore>) -> Self {
        Self {
            candles: CandleService::new(store),
        }
    }
}

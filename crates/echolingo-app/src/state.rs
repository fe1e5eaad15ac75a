use std::sync::Arc;

use echolingo_lookup::Lookup;
use echolingo_store::LexiconStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LexiconStore>,
    pub lookup: Arc<Lookup>,
    /// Same provider, longer initial backoff; serves the batch import path
    pub batch_lookup: Arc<Lookup>,
}

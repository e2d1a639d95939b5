use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::GenerativeClient;
use crate::resume::extraction::TextExtractor;
use crate::storage::FileStore;
use crate::store::SessionStore;

/// Shared application state injected into all route handlers via Axum
/// extractors. Every external dependency sits behind a trait object so
/// tests can substitute scripted doubles.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub llm: Arc<dyn GenerativeClient>,
    pub files: Arc<dyn FileStore>,
    pub extractor: Arc<dyn TextExtractor>,
    pub config: Config,
}

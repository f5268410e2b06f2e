//! Shared handler state.

use std::collections::HashMap;
use std::sync::Arc;

use lifestream_application::use_cases::{SearchService, UploadService};

/// Dependencies every handler can reach.
pub struct AppState {
    /// Upload handshake and read paths
    pub upload: Arc<UploadService>,
    /// The query path
    pub search: Arc<SearchService>,
    /// Provider names by concern, reported by `/health`
    pub provider_names: HashMap<String, String>,
}

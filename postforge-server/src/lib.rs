pub mod config;
pub mod error;
pub mod leads;
pub mod routes;

use std::sync::Arc;

use postforge_core::Runnable;
use postforge_prompt::{ComposedPrompt, GenerationResult};

pub use config::ServerConfig;
pub use error::ApiError;
pub use leads::{LeadRecord, LeadRecorder, LeadStore, MemoryLeadStore, RestLeadStore};
pub use routes::router;

pub type SharedGenerator = Arc<dyn Runnable<ComposedPrompt, GenerationResult> + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub generator: Option<SharedGenerator>,
    pub leads: LeadRecorder,
}

impl AppState {
    pub fn new(generator: Option<SharedGenerator>, leads: LeadRecorder) -> Self {
        Self { generator, leads }
    }
}

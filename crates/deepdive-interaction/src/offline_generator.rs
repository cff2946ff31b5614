use async_trait::async_trait;
use deepdive_core::generation::{GenerationError, GenerationRequest, TextGenerator};

/// Generator that never reaches a model, so every line comes from the
/// persona banks.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn complete(&self, _request: GenerationRequest) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable("offline mode".to_string()))
    }

    fn name(&self) -> &str {
        "offline"
    }
}

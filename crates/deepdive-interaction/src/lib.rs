//! Text-generation adapters and prompt templates for Deep Dive personas.

pub mod claude_api_generator;
pub mod offline_generator;
pub mod openai_compatible_generator;
pub mod prompts;

use deepdive_core::config::{GenerationConfig, ProviderKind};
use deepdive_core::generation::TextGenerator;
use std::sync::Arc;

pub use claude_api_generator::ClaudeApiGenerator;
pub use offline_generator::OfflineGenerator;
pub use openai_compatible_generator::OpenAiCompatibleGenerator;

/// Builds the generator described by `config`.
///
/// Providers that need an API key fall back to [`OfflineGenerator`] when
/// none is configured.
pub fn build_generator(config: &GenerationConfig) -> Arc<dyn TextGenerator> {
    let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty());

    match (config.provider, api_key) {
        (ProviderKind::Offline, _) => Arc::new(OfflineGenerator),
        (ProviderKind::Claude, Some(key)) => {
            let model = config
                .models
                .first()
                .cloned()
                .unwrap_or_else(|| claude_api_generator::DEFAULT_CLAUDE_MODEL.to_string());
            let mut generator = ClaudeApiGenerator::new(key, model);
            if let Some(url) = &config.base_url {
                generator = generator.with_base_url(url.clone());
            }
            Arc::new(generator)
        }
        (ProviderKind::OpenAiCompatible, Some(key)) => {
            let mut generator = OpenAiCompatibleGenerator::new(key, config.models.clone());
            if let Some(url) = &config.base_url {
                generator = generator.with_base_url(url.clone());
            }
            Arc::new(generator)
        }
        (provider, None) => {
            tracing::warn!(
                "No API key configured for {:?}; persona content will come from the built-in banks",
                provider
            );
            Arc::new(OfflineGenerator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_falls_back_to_offline() {
        let config = GenerationConfig {
            provider: ProviderKind::Claude,
            ..GenerationConfig::default()
        };
        assert_eq!(build_generator(&config).name(), "offline");
    }

    #[test]
    fn test_provider_selection() {
        let mut config = GenerationConfig {
            provider: ProviderKind::OpenAiCompatible,
            api_key: Some("sk".to_string()),
            ..GenerationConfig::default()
        };
        assert_eq!(build_generator(&config).name(), "openai_compatible");

        config.provider = ProviderKind::Claude;
        assert_eq!(build_generator(&config).name(), "claude");

        config.provider = ProviderKind::Offline;
        assert_eq!(build_generator(&config).name(), "offline");
    }
}

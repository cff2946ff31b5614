use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::thread::ThreadId;

/// Which text-generation backend to use.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// No network; every line comes from the persona banks.
    #[default]
    Offline,
    Claude,
    OpenAiCompatible,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "offline" | "none" => Ok(ProviderKind::Offline),
            "claude" | "anthropic" => Ok(ProviderKind::Claude),
            "open_ai_compatible" | "openai" | "openrouter" => Ok(ProviderKind::OpenAiCompatible),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// Root of `config.toml`. Every section and field has a default.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RootConfig {
    pub generation: GenerationConfig,
    pub storage: StorageConfig,
    pub scoring: ScoringConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub provider: ProviderKind,
    /// Models tried in order; the first one that answers wins.
    pub models: Vec<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Offline,
            models: Vec::new(),
            base_url: None,
            api_key: None,
            timeout_ms: 8_000,
            max_tokens: 300,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory.
    pub data_dir: Option<PathBuf>,
    pub active_session_key: String,
    pub history_key: String,
    /// Completed sessions kept in the history list; oldest are dropped first.
    pub history_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            active_session_key: "deep_dive:active_session".to_string(),
            history_key: "deep_dive:history".to_string(),
            history_limit: 20,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Own-thread keyword hits in one answer that earn an interrupt in round 2.
    pub strong_signal_hits: u32,
    /// Additional keywords per thread name, merged into the built-in lexicon.
    pub extra_keywords: BTreeMap<String, Vec<String>>,
}

impl ScoringConfig {
    /// Extra keywords for one thread.
    pub fn extra_keywords_for(&self, thread: ThreadId) -> &[String] {
        self.extra_keywords
            .get(thread.as_ref())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Keys in `extra_keywords` that do not name a thread.
    pub fn unknown_keyword_threads(&self) -> Vec<&str> {
        self.extra_keywords
            .keys()
            .filter(|name| name.parse::<ThreadId>().is_err())
            .map(String::as_str)
            .collect()
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            strong_signal_hits: 3,
            extra_keywords: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: RootConfig = toml::from_str("").unwrap();
        assert_eq!(config, RootConfig::default());
        assert_eq!(config.generation.timeout_ms, 8_000);
        assert_eq!(config.storage.active_session_key, "deep_dive:active_session");
        assert_eq!(config.storage.history_limit, 20);
        assert_eq!(config.scoring.strong_signal_hits, 3);
    }

    #[test]
    fn test_partial_sections() {
        let config: RootConfig = toml::from_str(
            r#"
            [generation]
            provider = "open_ai_compatible"
            models = ["anthropic/claude-3-haiku", "openai/gpt-4o-mini"]

            [scoring.extra_keywords]
            social = ["roommate"]
            "#,
        )
        .unwrap();

        assert_eq!(config.generation.provider, ProviderKind::OpenAiCompatible);
        assert_eq!(config.generation.models.len(), 2);
        assert_eq!(config.generation.max_tokens, 300);
        assert_eq!(
            config.scoring.extra_keywords_for(ThreadId::Social),
            &["roommate".to_string()]
        );
        assert!(config.scoring.extra_keywords_for(ThreadId::Pragmatic).is_empty());
        assert!(config.scoring.unknown_keyword_threads().is_empty());
    }

    #[test]
    fn test_provider_aliases() {
        assert_eq!("Anthropic".parse::<ProviderKind>(), Ok(ProviderKind::Claude));
        assert_eq!("openrouter".parse::<ProviderKind>(), Ok(ProviderKind::OpenAiCompatible));
        assert!("gpt".parse::<ProviderKind>().is_err());
    }
}

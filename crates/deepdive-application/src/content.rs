//! Persona content with bounded generation and bank fallback.
//!
//! Every line a persona says goes through [`ContentGenerator`]. A generation
//! call that fails, times out or returns nothing usable is replaced by a line
//! from that persona's probe bank, so a round can always complete.

use deepdive_core::config::GenerationConfig;
use deepdive_core::generation::{GenerationError, GenerationRequest, TextGenerator};
use deepdive_core::persona::{self, PersonaId, template};
use deepdive_interaction::{OfflineGenerator, prompts};
use std::sync::Arc;
use std::time::Duration;

/// Token budget for single-line content (probes, follow-ups, debate lines).
const LINE_MAX_TOKENS: u32 = 150;

/// Wraps a [`TextGenerator`] with a timeout and the persona banks.
#[derive(Clone)]
pub struct ContentGenerator {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
    max_tokens: u32,
}

impl ContentGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &GenerationConfig) -> Self {
        Self {
            generator,
            timeout: Duration::from_millis(config.timeout_ms),
            max_tokens: config.max_tokens,
        }
    }

    /// Bank-only content; no model is ever called.
    pub fn offline() -> Self {
        Self::new(Arc::new(OfflineGenerator), &GenerationConfig::default())
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn line_tokens(&self) -> u32 {
        self.max_tokens.min(LINE_MAX_TOKENS)
    }

    /// Runs one generation call under the configured timeout.
    pub async fn complete(
        &self,
        request: Result<GenerationRequest, GenerationError>,
    ) -> Result<String, GenerationError> {
        let request = request?;
        match tokio::time::timeout(self.timeout, self.generator.complete(request)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => Ok(text),
            Ok(Ok(_)) => Err(GenerationError::Empty),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(GenerationError::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    /// Generates one in-character line, or falls back to `fallback`.
    async fn line_or(
        &self,
        persona: PersonaId,
        what: &str,
        request: Result<GenerationRequest, GenerationError>,
        fallback: impl FnOnce() -> String,
    ) -> String {
        let name = persona::profile(persona).name;
        match self.complete(request).await {
            Ok(text) => {
                let line = clean_line(&text, name);
                if line.is_empty() {
                    fallback()
                } else {
                    line
                }
            }
            Err(GenerationError::Unavailable(reason)) => {
                tracing::trace!("{} for {} from bank ({})", what, name, reason);
                fallback()
            }
            Err(err) => {
                tracing::warn!(
                    "Generation of {} for {} via {} failed, using bank: {}",
                    what,
                    name,
                    self.generator.name(),
                    err
                );
                fallback()
            }
        }
    }

    pub async fn opening_probe(&self, persona: PersonaId, problem: &str) -> String {
        let profile = persona::profile(persona);
        let request = prompts::opening_probe(profile, problem, self.line_tokens());
        self.line_or(persona, "opening probe", request, || {
            let placeholders = template::Placeholders::extract("", problem);
            template::render(template::pick(profile.probes.opening), &placeholders)
        })
        .await
    }

    pub async fn follow_up(
        &self,
        persona: PersonaId,
        problem: &str,
        answer: &str,
        interrupt: bool,
    ) -> String {
        let profile = persona::profile(persona);
        let request = prompts::follow_up(profile, problem, answer, interrupt, self.line_tokens());
        self.line_or(persona, "follow-up", request, || {
            let bank = if interrupt {
                profile.probes.interrupt
            } else {
                profile.probes.follow_up
            };
            let placeholders = template::Placeholders::extract(answer, problem);
            template::render(template::pick(bank), &placeholders)
        })
        .await
    }

    /// A debate line from `speaker` aimed at `target`.
    pub async fn debate_line(
        &self,
        speaker: PersonaId,
        target: PersonaId,
        problem: &str,
        answers_context: &str,
        previous: Option<&str>,
    ) -> String {
        let speaker_profile = persona::profile(speaker);
        let target_profile = persona::profile(target);
        let request = prompts::debate_line(
            speaker_profile,
            target_profile,
            problem,
            answers_context,
            previous,
            self.line_tokens(),
        );
        self.line_or(speaker, "debate line", request, || {
            let placeholders = template::Placeholders::extract(answers_context, problem)
                .with_other(target_profile.name);
            template::render(template::pick(speaker_profile.probes.challenge), &placeholders)
        })
        .await
    }
}

/// Trims model output down to the line itself: no speaker prefix, no wrapping quotes.
pub fn clean_line(text: &str, speaker: &str) -> String {
    let mut line = text.trim();

    if let Some(rest) = line.strip_prefix(speaker) {
        if let Some(rest) = rest.trim_start().strip_prefix(':') {
            line = rest.trim_start();
        }
    }

    for (open, close) in [('"', '"'), ('\u{201c}', '\u{201d}')] {
        if line.len() >= 2 && line.starts_with(open) && line.ends_with(close) {
            line = line[open.len_utf8()..line.len() - close.len_utf8()].trim();
        }
    }

    line.to_string()
}

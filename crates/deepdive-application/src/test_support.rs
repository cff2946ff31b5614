//! Test doubles for [`TextGenerator`].

use async_trait::async_trait;
use deepdive_core::generation::{GenerationError, GenerationRequest, TextGenerator};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Returns scripted replies in order, then reports `Empty`.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(GenerationError::Empty)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Always fails with a server error.
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn complete(&self, _request: GenerationRequest) -> Result<String, GenerationError> {
        Err(GenerationError::Status {
            status: 503,
            body: "overloaded".to_string(),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Answers only after `delay`.
pub struct SlowGenerator {
    delay: Duration,
}

impl SlowGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl TextGenerator for SlowGenerator {
    async fn complete(&self, _request: GenerationRequest) -> Result<String, GenerationError> {
        tokio::time::sleep(self.delay).await;
        Ok("too late".to_string())
    }

    fn name(&self) -> &str {
        "slow"
    }
}

use serde::{Deserialize, Serialize};

use crate::persona::PersonaId;
use crate::thread::ThreadId;

/// One terminal interpretation of the user's problem, owned by one thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub thread_id: ThreadId,
    pub persona_id: PersonaId,
    pub title: String,
    pub diagnosis: String,
    /// A single falsifiable experiment the user can run within one to two weeks.
    pub test: String,
    /// Cost of ignoring this thread.
    pub consequence: String,
}

//! Persona identifiers, lookup tables and profile data types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DeepDiveError;
use crate::thread::ThreadId;

/// Persona → thread lookup table, indexed by persona id - 1.
const PERSONA_THREADS: [ThreadId; 4] = [
    ThreadId::Social,        // 1
    ThreadId::Psychological, // 2
    ThreadId::Analytical,    // 3
    ThreadId::Pragmatic,     // 4
];

/// Thread → persona lookup table, indexed by [`ThreadId::priority`].
const THREAD_PERSONAS: [PersonaId; 4] = [
    PersonaId(4), // pragmatic
    PersonaId(2), // psychological
    PersonaId(3), // analytical
    PersonaId(1), // social
];

/// Identifier of one of the four council personas (1–4).
///
/// Serialized as a bare number; out-of-range values are rejected on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PersonaId(u8);

impl PersonaId {
    /// All personas in id order.
    pub const ALL: [PersonaId; 4] = [PersonaId(1), PersonaId(2), PersonaId(3), PersonaId(4)];

    pub fn new(id: u8) -> Option<Self> {
        (1..=4).contains(&id).then_some(Self(id))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// The thread this persona owns.
    pub fn thread(self) -> ThreadId {
        PERSONA_THREADS[self.index()]
    }

    /// Zero-based position, always in `0..4`.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    pub fn for_thread(thread: ThreadId) -> Self {
        THREAD_PERSONAS[thread.priority()]
    }
}

impl TryFrom<u8> for PersonaId {
    type Error = DeepDiveError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        PersonaId::new(value)
            .ok_or_else(|| DeepDiveError::not_found("persona", value.to_string()))
    }
}

impl From<PersonaId> for u8 {
    fn from(id: PersonaId) -> Self {
        id.0
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Question banks a persona draws from when generation is unavailable.
///
/// Entries may contain `{{ topic }}`, `{{ quote }}`, `{{ person }}`,
/// `{{ assumption }}`, `{{ thing }}`, `{{ amount }}`, `{{ place }}` and
/// `{{ other }}` placeholders, filled by [`super::template`].
#[derive(Debug)]
pub struct ProbeBank {
    pub opening: &'static [&'static str],
    pub follow_up: &'static [&'static str],
    pub challenge: &'static [&'static str],
    pub sulk: &'static [&'static str],
    pub interrupt: &'static [&'static str],
}

/// Default hypothesis wording used when generation is unavailable.
#[derive(Debug)]
pub struct HypothesisFraming {
    /// Diagnosis when the thread has answers to ground it.
    pub diagnosis: &'static str,
    /// Diagnosis when the thread was never activated.
    pub uninformed_diagnosis: &'static str,
    /// A concrete one-to-two week experiment.
    pub test: &'static str,
    pub consequence: &'static str,
    /// Consequence when the thread was never activated.
    pub uninformed_consequence: &'static str,
}

/// Static description of a persona: identity, voice and fallback content.
#[derive(Debug)]
pub struct PersonaProfile {
    pub id: PersonaId,
    pub name: &'static str,
    pub school: &'static str,
    pub voice: &'static str,
    pub system_prompt: &'static str,
    pub probes: ProbeBank,
    pub hypothesis: HypothesisFraming,
}

impl PersonaProfile {
    pub fn thread(&self) -> ThreadId {
        self.id.thread()
    }
}

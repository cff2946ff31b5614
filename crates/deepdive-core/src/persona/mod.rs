//! Persona domain module.
//!
//! The council has four fixed personas. Each owns exactly one thread; the
//! mapping lives in two lookup tables rather than in per-persona types, so
//! behavior that differs by persona is driven by [`PersonaProfile`] data.

mod model;
mod preset;
pub mod template;

pub use model::{HypothesisFraming, PersonaId, PersonaProfile, ProbeBank};
pub use preset::profile;

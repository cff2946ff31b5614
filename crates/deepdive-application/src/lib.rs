//! Application layer for Deep Dive.
//!
//! This crate runs the four-round investigation: it coordinates the domain
//! rules in `deepdive-core` with persistence and text generation, and exposes
//! the whole flow through [`DeepDiveUseCase`].

pub mod content;
pub mod debate;
pub mod deep_dive_usecase;
pub mod hypothesis;
pub mod round_controller;

#[cfg(test)]
mod test_support;

pub use content::ContentGenerator;
pub use debate::DebateOrchestrator;
pub use deep_dive_usecase::{DeepDiveUseCase, StartOutcome};
pub use hypothesis::HypothesisSynthesizer;
pub use round_controller::{AnswerOutcome, RoundController};

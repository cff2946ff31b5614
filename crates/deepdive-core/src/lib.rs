//! Domain model for the Deep Dive investigation engine.
//!
//! Everything here is synchronous and storage-agnostic. Collaborators
//! (persistence, text generation) are described as traits in [`store`] and
//! [`generation`]; adapters live in the infrastructure and interaction crates.

pub mod config;
pub mod error;
pub mod generation;
pub mod persona;
pub mod profile;
pub mod scoring;
pub mod session;
pub mod store;
pub mod sulk;
pub mod thread;
pub mod triage;

// Re-export common error type
pub use error::DeepDiveError;

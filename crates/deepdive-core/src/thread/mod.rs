//! Thread domain module.
//!
//! A thread is one interpretive lens on the user's problem. Each thread is
//! owned by exactly one persona (see [`crate::persona`]).

mod model;

pub use model::{Thread, ThreadId};

mod exchange;
mod hypothesis;
mod model;
mod phase;

pub use exchange::{Exchange, ExchangeKind};
pub use hypothesis::Hypothesis;
pub use model::{DeepDiveSession, SESSION_FORMAT_VERSION};
pub use phase::{Phase, Stage};

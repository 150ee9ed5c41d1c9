pub mod automaton;
pub mod engine;
pub mod error;
pub mod filter;
pub mod normalizer;
pub mod pipeline;
pub mod sink;

pub use combtools::Event;
pub use engine::Combinations;
pub use error::{Error, Result};
pub use sink::CombinationRecord;

//! A single traffic signal whose phase flips between red and green at
//! randomized intervals, announced to waiting observers through a blocking
//! latest-value channel.

pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod phase;

pub use channel::Channel;
pub use config::CycleConfig;
pub use engine::PhaseEngine;
pub use error::EngineError;
pub use phase::Phase;

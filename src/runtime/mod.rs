//! Session orchestration.

pub mod engine;

pub use engine::{EngineState, MenuEngine, MenuView, Outcome, OutcomeStatus, Step, ViewItem};

mod engine;
mod sequencer;

pub use engine::{TimerEngine, TimerStatus, MAX_SESSION_SECS, MIN_SESSION_SECS};
pub use sequencer::{SessionSequencer, SessionType};

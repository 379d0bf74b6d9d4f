//! # Flowdoro Core Library
//!
//! Core business logic for the Flowdoro adaptive focus timer. All
//! operations are available through this library; the CLI binary (and any
//! future GUI shell) is a thin layer over the same core.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a wall-clock-based countdown state machine that
//!   requires the caller to periodically invoke `tick()`
//! - **Flow Tracker**: rating history, Flow streaks, daily goal progress
//! - **Policies**: pure rule tables mapping a session rating to the next
//!   work duration and break requirement
//! - **Controller**: wires the pieces together behind injected
//!   notification/signal/persistence collaborators
//! - **Storage**: SQLite-based session history and state snapshots,
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`FlowTimer`]: the orchestrating controller
//! - [`TimerEngine`]: core countdown state machine
//! - [`FlowTracker`]: rating and streak bookkeeping
//! - [`DurationPolicy`] / [`BreakPolicy`]: the adaptive rule tables
//! - [`Database`] / [`Config`]: persistence and configuration

pub mod controller;
pub mod error;
pub mod events;
pub mod flow;
pub mod hooks;
pub mod policy;
pub mod storage;
pub mod timer;

pub use controller::{DurationPreferences, FlowTimer, TimerSettings};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use flow::{DailyProgress, FlowRating, FlowTracker};
pub use hooks::{Notifier, NullNotifier, NullSignalHook, SignalHook};
pub use policy::{
    AdjustmentReason, BreakDecision, BreakPolicy, BreakType, DurationAdjustment, DurationPolicy,
    MAX_NO_BREAK_SESSIONS,
};
pub use storage::{Config, Database, MemoryStore, StateStore};
pub use timer::{SessionSequencer, SessionType, TimerEngine, TimerStatus};

//! Loop detection subsystem for tool calls.
//!
//! Tracks, per session and per call signature, how many consecutive calls
//! produced the same output. Two independent breakers stop runaway loops:
//! a per-signature breaker for poll-style calls and a session-wide breaker
//! for generic calls.

mod classify;
mod config;
mod fingerprint;
mod service;
mod signature;
mod state;
mod types;

pub use classify::classify;
pub use config::LoopDetectionConfig;
pub use fingerprint::ProgressFingerprint;
pub use service::LoopDetector;
pub use signature::CallSignature;
pub use state::{LoopStateStore, Observation, RepetitionRecord, SessionLoopState};
pub use types::{LoopDetectionError, LoopTrip, LoopVerdict, ToolClass};

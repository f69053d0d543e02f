pub mod controller;
pub mod state;

pub use controller::{EngagementSnapshot, EngagementTimer};
pub use state::{rounded_seconds, EngagementSession, EngagementState, PauseReason};

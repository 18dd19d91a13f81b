//! Session: The connection-lifecycle state machine and its liveness policy.
//!
//! ```text
//! Connecting ──Opened──▶ AwaitingStatus ──"200 ..."──▶ Streaming
//!     │                        │                           │
//!     │ ConnectFailed          │ "401 ..."                 │ stale / remote close
//!     ▼                        ▼                           ▼
//!   Closed ◀───────────────── Closed ◀────────────────── Closed
//! ```
//!
//! The machine is pure: events go in with a timestamp, effects come out.
//! The owner (the client event loop) performs the actual I/O.

mod liveness;
mod machine;

pub use liveness::{LivenessMonitor, HEARTBEAT_INTERVAL, STALE_AFTER};
pub use machine::{
    CloseReason, Effect, Notice, SessionEvent, SessionStatus, StreamSession, HEARTBEAT,
    LIVENESS_PROBE, STATUS_OK, STATUS_UNAUTHORIZED,
};

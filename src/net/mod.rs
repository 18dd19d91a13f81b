//! Networking: Actor threads feeding the single event loop.
//!
//! Two dedicated threads serve each session, both communicating over
//! crossbeam channels and both scoped to the session's lifetime:
//!
//! ```text
//! ┌───────────────┐   TransportEnvelope    ┌──────────────┐
//! │ Socket Thread │ ─────────────────────▶ │              │
//! └───────────────┘                        │  Event Loop  │
//!         ▲         TransportCommand       │   (client)   │
//!         └──────────────────────────────  │              │
//! ┌───────────────┐        Instant         │              │
//! │ Ticker Thread │ ─────────────────────▶ │              │
//! └───────────────┘                        └──────────────┘
//! ```
//!
//! Every envelope carries the generation of the session that produced
//! it; the event loop ignores envelopes from superseded sessions.

mod messages;
mod ticker;
mod transport;

pub use messages::{TransportCommand, TransportEnvelope, TransportEvent};
pub use ticker::{StaleTicker, STALE_POLL_INTERVAL};
pub use transport::{log_endpoint, EndpointError, SocketActor, LOG_PATH};

//! # Taillight
//!
//! A reconnecting WebSocket client for tailing live logs.
//!
//! Taillight opens a persistent connection to a log-producing server,
//! renders incoming lines as escaped, colorized markup as they arrive,
//! answers the server's liveness probes, and transparently re-authenticates
//! when the server rejects the session.
//!
//! ## Core Concepts
//!
//! - **Explicit state machine**: one dispatch function `(event, now) ->
//!   effects` drives connect, authenticate, stream, and close
//! - **Liveness policy as data**: heartbeat and staleness decisions are a
//!   pure function of two timestamps, testable without a transport
//! - **Actor threads**: the socket reader and the staleness ticker run on
//!   dedicated threads, feeding one event loop over crossbeam channels
//! - **Sticky autoscroll**: new content follows the bottom of the view only
//!   when the viewer was already there
//!
//! ## Example
//!
//! ```rust,ignore
//! use taillight::{ClientConfig, TailClient, Transcript};
//!
//! let config = ClientConfig::new("http://localhost:8080".parse()?);
//! let mut client = TailClient::new(config, ui, Transcript::default());
//! client.run()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod auth;
pub mod client;
pub mod net;
pub mod render;
pub mod session;

// Re-exports for convenience
pub use auth::{CredentialStore, StoreError};
pub use client::{ClientConfig, ClientError, SessionOutcome, TailClient, UserInterface};
pub use net::{SocketActor, StaleTicker, TransportCommand, TransportEnvelope, TransportEvent};
pub use render::{LogView, Surface, Transcript};
pub use session::{
    CloseReason, Effect, LivenessMonitor, Notice, SessionEvent, SessionStatus, StreamSession,
};

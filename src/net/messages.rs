//! Message types for the transport actor.
//!
//! These enums define the protocol between the socket thread and the
//! client event loop.

/// Events from the socket thread.
///
/// These are sent from the transport actor to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The WebSocket handshake completed.
    Opened,

    /// A text frame arrived.
    Frame(String),

    /// The connection never opened.
    ConnectFailed {
        /// Human-readable cause, for logging.
        error: String,
    },

    /// The connection closed — remotely, on request, or on error.
    Closed,
}

/// A transport event tagged with its session's generation.
///
/// The event loop drops envelopes whose generation is not the current
/// one, so a late event from a superseded session cannot mutate state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEnvelope {
    /// Generation of the session that produced the event.
    pub generation: u64,
    /// The event itself.
    pub event: TransportEvent,
}

/// Commands sent to the socket thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    /// Send a text frame.
    Send(String),

    /// Close the connection.
    Close,
}

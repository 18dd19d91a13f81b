//! Stream session: The connection-lifecycle state machine.
//!
//! One `StreamSession` models one connection from open to close. It is
//! deliberately transport-free: the owner feeds it events together with
//! the current instant, and it answers with a list of effects to carry
//! out. That keeps the authentication, heartbeat, and staleness logic
//! unit-testable with nothing but synthesized events.
//!
//! # Protocol
//!
//! The first inbound frame is a status line (`"<code> <free-text>"`); it
//! is the only frame ever parsed for structure. Afterwards every frame is
//! an opaque payload, except the reserved `"PING"` liveness probe, which
//! is consumed without being rendered. The session answers with the
//! reserved `"PONG"` heartbeat, only ever in response to inbound traffic.

use std::time::Instant;

use super::liveness::LivenessMonitor;

/// Reserved inbound payload that keeps the connection warm without
/// carrying log content. Never rendered.
pub const LIVENESS_PROBE: &str = "PING";

/// Reserved outbound payload acknowledging liveness to the server.
pub const HEARTBEAT: &str = "PONG";

/// Status code on which the session proceeds to streaming.
pub const STATUS_OK: u16 = 200;

/// Status code on which the session closes and asks for a credential.
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// Lifecycle states of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Connection attempt in flight.
    Connecting,
    /// Connected; the first (status) frame has not arrived yet.
    AwaitingStatus,
    /// Authenticated (or tolerated); payloads are flowing.
    Streaming,
    /// Terminal. A new connection always means a new session.
    Closed,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The connection never opened.
    Unreachable,
    /// The server rejected the credential on the status frame.
    Unauthorized,
    /// No inbound traffic within the liveness window.
    Stale,
    /// The transport closed from the far side or mid-stream.
    Remote,
}

/// User-visible notices surfaced through the UI collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The connection attempt failed outright.
    Unreachable,
    /// An authenticated session ended.
    Closed,
}

impl Notice {
    /// The display text for this notice.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Unreachable => "Unable to Connect",
            Self::Closed => "Connection Closed",
        }
    }
}

/// Events fed into the session by its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The transport finished its handshake.
    Opened,
    /// A text frame arrived.
    Frame(String),
    /// The connection attempt failed before opening.
    ConnectFailed,
    /// The transport closed, for whatever reason.
    TransportClosed,
    /// Periodic staleness poll.
    Tick,
}

/// Side effects requested by the session.
///
/// The session never performs I/O itself; the owner applies these in
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Forward a payload to the renderer, verbatim.
    Render(String),
    /// Surface a notice through the UI collaborator.
    Notify(Notice),
    /// Send the reserved heartbeat payload.
    SendHeartbeat,
    /// Close the transport.
    CloseTransport,
    /// Ask the UI collaborator for a fresh credential.
    RequestCredential,
    /// Cancel this session's staleness ticker.
    StopTicker,
}

/// State machine for one connection's lifecycle.
#[derive(Debug)]
pub struct StreamSession {
    /// Current lifecycle state.
    status: SessionStatus,
    /// Status code remembered from the first frame, when it parsed.
    auth_status: Option<u16>,
    /// Why the session ended, once it has.
    close_reason: Option<CloseReason>,
    /// Liveness tracking, armed on the transition to streaming.
    liveness: Option<LivenessMonitor>,
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamSession {
    /// Create a session in the connecting state.
    pub const fn new() -> Self {
        Self {
            status: SessionStatus::Connecting,
            auth_status: None,
            close_reason: None,
            liveness: None,
        }
    }

    /// Current lifecycle state.
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Status code from the first frame, if one parsed.
    pub const fn auth_status(&self) -> Option<u16> {
        self.auth_status
    }

    /// Why the session closed, once it has.
    pub const fn close_reason(&self) -> Option<CloseReason> {
        self.close_reason
    }

    /// Dispatch one event, returning the effects to apply in order.
    ///
    /// Events arriving after the session closed are ignored; `Closed` is
    /// terminal.
    pub fn handle(&mut self, event: SessionEvent, now: Instant) -> Vec<Effect> {
        match (self.status, event) {
            (SessionStatus::Closed, _) => Vec::new(),

            (SessionStatus::Connecting, SessionEvent::Opened) => {
                self.status = SessionStatus::AwaitingStatus;
                Vec::new()
            }

            (SessionStatus::Connecting, SessionEvent::ConnectFailed) => {
                self.status = SessionStatus::Closed;
                self.close_reason = Some(CloseReason::Unreachable);
                vec![Effect::Notify(Notice::Unreachable), Effect::StopTicker]
            }

            (SessionStatus::AwaitingStatus, SessionEvent::Frame(line)) => {
                self.handle_status_frame(&line, now)
            }

            (SessionStatus::Streaming, SessionEvent::Frame(chunk)) => {
                self.handle_payload_frame(chunk, now)
            }

            (SessionStatus::Streaming, SessionEvent::Tick) => self.handle_tick(now),

            (_, SessionEvent::TransportClosed) => self.handle_transport_closed(),

            // Everything else (early frames, ticks before streaming,
            // duplicate opens) is noise.
            _ => Vec::new(),
        }
    }

    /// Interpret the very first frame as a status line.
    ///
    /// The leading whitespace-delimited token is parsed as an integer
    /// code. Unauthorized closes the session and requests a credential;
    /// every other outcome, including an unparsable token, falls through
    /// to streaming.
    fn handle_status_frame(&mut self, line: &str, now: Instant) -> Vec<Effect> {
        self.auth_status = line
            .split_whitespace()
            .next()
            .and_then(|token| token.parse::<u16>().ok());

        if self.auth_status == Some(STATUS_UNAUTHORIZED) {
            self.status = SessionStatus::Closed;
            self.close_reason = Some(CloseReason::Unauthorized);
            return vec![
                Effect::CloseTransport,
                Effect::RequestCredential,
                Effect::StopTicker,
            ];
        }

        self.status = SessionStatus::Streaming;
        self.liveness = Some(LivenessMonitor::armed(now));
        Vec::new()
    }

    /// Handle an opaque payload frame while streaming.
    fn handle_payload_frame(&mut self, chunk: String, now: Instant) -> Vec<Effect> {
        let Some(liveness) = self.liveness.as_mut() else {
            return Vec::new();
        };

        liveness.record_inbound(now);

        let mut effects = Vec::new();
        if chunk != LIVENESS_PROBE {
            effects.push(Effect::Render(chunk));
        }
        if liveness.should_heartbeat(now) {
            liveness.record_heartbeat(now);
            effects.push(Effect::SendHeartbeat);
        }
        effects
    }

    /// Handle a staleness poll while streaming.
    ///
    /// Fires at most once: the first stale tick stops the ticker and
    /// closes the transport, and the recorded reason guards against a
    /// straggler tick arriving before the close completes.
    fn handle_tick(&mut self, now: Instant) -> Vec<Effect> {
        let stale = self
            .liveness
            .as_ref()
            .is_some_and(|liveness| liveness.is_stale(now));

        if !stale || self.close_reason.is_some() {
            return Vec::new();
        }

        self.close_reason = Some(CloseReason::Stale);
        vec![Effect::StopTicker, Effect::CloseTransport]
    }

    /// Handle the transport reporting closure.
    ///
    /// The "Connection Closed" notice is shown only when the session had
    /// streamed with an OK status; an auth rejection already told the
    /// user what happened.
    fn handle_transport_closed(&mut self) -> Vec<Effect> {
        self.status = SessionStatus::Closed;
        if self.close_reason.is_none() {
            self.close_reason = Some(CloseReason::Remote);
        }

        let mut effects = Vec::new();
        if self.auth_status == Some(STATUS_OK) {
            effects.push(Effect::Notify(Notice::Closed));
        }
        effects.push(Effect::StopTicker);
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Drive a session to the streaming state at `t0`.
    fn streaming(t0: Instant) -> StreamSession {
        let mut session = StreamSession::new();
        assert!(session.handle(SessionEvent::Opened, t0).is_empty());
        assert!(session
            .handle(SessionEvent::Frame("200 OK".into()), t0)
            .is_empty());
        assert_eq!(session.status(), SessionStatus::Streaming);
        session
    }

    fn renders(effects: &[Effect]) -> Vec<&str> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Render(chunk) => Some(chunk.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_ok_then_ping_then_payload_renders_once() {
        let t0 = Instant::now();
        let mut session = streaming(t0);

        let mut all = Vec::new();
        all.extend(session.handle(SessionEvent::Frame("PING".into()), t0 + Duration::from_secs(1)));
        all.extend(session.handle(SessionEvent::Frame("hello".into()), t0 + Duration::from_secs(2)));

        assert_eq!(renders(&all), vec!["hello"]);
    }

    #[test]
    fn test_unauthorized_closes_and_requests_credential() {
        let t0 = Instant::now();
        let mut session = StreamSession::new();
        session.handle(SessionEvent::Opened, t0);

        let effects = session.handle(SessionEvent::Frame("401 Unauthorized".into()), t0);
        assert_eq!(
            effects,
            vec![
                Effect::CloseTransport,
                Effect::RequestCredential,
                Effect::StopTicker,
            ]
        );
        assert_eq!(session.status(), SessionStatus::Closed);
        assert_eq!(session.close_reason(), Some(CloseReason::Unauthorized));

        // Nothing from the aborted session is rendered, and a straggling
        // close event changes nothing.
        assert!(session.handle(SessionEvent::TransportClosed, t0).is_empty());
    }

    #[test]
    fn test_unknown_status_falls_through_to_streaming() {
        let t0 = Instant::now();
        let mut session = StreamSession::new();
        session.handle(SessionEvent::Opened, t0);
        session.handle(SessionEvent::Frame("503 Service Unavailable".into()), t0);

        assert_eq!(session.status(), SessionStatus::Streaming);
        assert_eq!(session.auth_status(), Some(503));

        // Not the OK code, so closing stays silent.
        let effects = session.handle(SessionEvent::TransportClosed, t0);
        assert_eq!(effects, vec![Effect::StopTicker]);
    }

    #[test]
    fn test_unparsable_status_falls_through_to_streaming() {
        let t0 = Instant::now();
        let mut session = StreamSession::new();
        session.handle(SessionEvent::Opened, t0);
        session.handle(SessionEvent::Frame("ready to stream".into()), t0);

        assert_eq!(session.status(), SessionStatus::Streaming);
        assert_eq!(session.auth_status(), None);
    }

    #[test]
    fn test_status_frame_is_never_rendered() {
        let t0 = Instant::now();
        let mut session = StreamSession::new();
        session.handle(SessionEvent::Opened, t0);
        let effects = session.handle(SessionEvent::Frame("200 OK".into()), t0);
        assert!(renders(&effects).is_empty());
    }

    #[test]
    fn test_heartbeat_cadence() {
        let t0 = Instant::now();
        let mut session = streaming(t0);
        let at = |secs| t0 + Duration::from_secs(secs);

        // First inbound frame triggers the first heartbeat of the session.
        let effects = session.handle(SessionEvent::Frame("a".into()), at(5));
        assert!(effects.contains(&Effect::SendHeartbeat));

        // Traffic keeps flowing, but no second heartbeat within 20s of
        // the first.
        let effects = session.handle(SessionEvent::Frame("b".into()), at(10));
        assert!(!effects.contains(&Effect::SendHeartbeat));
        let effects = session.handle(SessionEvent::Frame("c".into()), at(24));
        assert!(!effects.contains(&Effect::SendHeartbeat));

        // 21s after the first heartbeat, the next inbound frame carries one.
        let effects = session.handle(SessionEvent::Frame("d".into()), at(26));
        assert!(effects.contains(&Effect::SendHeartbeat));
    }

    #[test]
    fn test_heartbeat_only_in_response_to_traffic() {
        let t0 = Instant::now();
        let mut session = streaming(t0);

        // Ticks alone never produce a heartbeat, no matter how late.
        let effects = session.handle(SessionEvent::Tick, t0 + Duration::from_secs(30));
        assert!(!effects.contains(&Effect::SendHeartbeat));
    }

    #[test]
    fn test_render_precedes_heartbeat() {
        let t0 = Instant::now();
        let mut session = streaming(t0);

        let effects = session.handle(SessionEvent::Frame("x".into()), t0 + Duration::from_secs(1));
        assert_eq!(
            effects,
            vec![Effect::Render("x".into()), Effect::SendHeartbeat]
        );
    }

    #[test]
    fn test_stale_tick_force_closes_exactly_once() {
        let t0 = Instant::now();
        let mut session = streaming(t0);
        let late = t0 + Duration::from_secs(61);

        let effects = session.handle(SessionEvent::Tick, late);
        assert_eq!(effects, vec![Effect::StopTicker, Effect::CloseTransport]);
        assert_eq!(session.close_reason(), Some(CloseReason::Stale));

        // A straggler tick before the close completes does nothing.
        let effects = session.handle(SessionEvent::Tick, late + Duration::from_secs(6));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_tick_before_streaming_is_inert() {
        let t0 = Instant::now();
        let mut session = StreamSession::new();
        assert!(session
            .handle(SessionEvent::Tick, t0 + Duration::from_secs(600))
            .is_empty());

        session.handle(SessionEvent::Opened, t0);
        assert!(session
            .handle(SessionEvent::Tick, t0 + Duration::from_secs(1200))
            .is_empty());
        assert_eq!(session.status(), SessionStatus::AwaitingStatus);
    }

    #[test]
    fn test_closed_after_streaming_ok_notifies() {
        let t0 = Instant::now();
        let mut session = streaming(t0);

        let effects = session.handle(SessionEvent::TransportClosed, t0);
        assert_eq!(
            effects,
            vec![Effect::Notify(Notice::Closed), Effect::StopTicker]
        );
        assert_eq!(session.status(), SessionStatus::Closed);
        assert_eq!(session.close_reason(), Some(CloseReason::Remote));
    }

    #[test]
    fn test_stale_close_keeps_stale_reason_and_notifies() {
        let t0 = Instant::now();
        let mut session = streaming(t0);
        session.handle(SessionEvent::Tick, t0 + Duration::from_secs(61));

        let effects = session.handle(SessionEvent::TransportClosed, t0 + Duration::from_secs(62));
        assert!(effects.contains(&Effect::Notify(Notice::Closed)));
        assert_eq!(session.close_reason(), Some(CloseReason::Stale));
    }

    #[test]
    fn test_unreachable_notifies_without_retry_effects() {
        let t0 = Instant::now();
        let mut session = StreamSession::new();

        let effects = session.handle(SessionEvent::ConnectFailed, t0);
        assert_eq!(
            effects,
            vec![Effect::Notify(Notice::Unreachable), Effect::StopTicker]
        );
        assert_eq!(session.status(), SessionStatus::Closed);
        assert_eq!(session.close_reason(), Some(CloseReason::Unreachable));
    }

    #[test]
    fn test_closed_is_terminal() {
        let t0 = Instant::now();
        let mut session = streaming(t0);
        session.handle(SessionEvent::TransportClosed, t0);

        assert!(session
            .handle(SessionEvent::Frame("late".into()), t0)
            .is_empty());
        assert!(session.handle(SessionEvent::Tick, t0).is_empty());
        assert!(session.handle(SessionEvent::TransportClosed, t0).is_empty());
    }
}

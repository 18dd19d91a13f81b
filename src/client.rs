//! Client: The event loop that ties the pieces together.
//!
//! `TailClient` owns the credential store, the renderer, and the UI
//! collaborator, and runs one session at a time: it spawns the socket
//! and ticker actors for a generation, pumps their events through the
//! session state machine, and applies the resulting effects. When a
//! session ends it decides — once, in one place — whether another one
//! should be started.

use std::path::PathBuf;
use std::time::Instant;

use crossbeam_channel::{bounded, select, Receiver, Sender};
use tracing::{debug, info};
use url::Url;

use crate::auth::{CredentialStore, StoreError};
use crate::net::{
    log_endpoint, EndpointError, SocketActor, StaleTicker, TransportEnvelope, TransportEvent,
};
use crate::render::{LogView, Surface};
use crate::session::{
    CloseReason, Effect, SessionEvent, SessionStatus, StreamSession, HEARTBEAT,
};

/// The external credential-entry and notice collaborator.
///
/// The core's only contract with the surrounding UI: obtain a credential
/// string when asked, and show short user-visible notices. A `None` from
/// the prompt means the user declined.
pub trait UserInterface {
    /// Ask the user for a fresh credential.
    fn prompt_for_credential(&mut self) -> Option<String>;

    /// Show a user-visible notice.
    fn notify(&mut self, message: &str);
}

/// Configuration for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the log server; the streaming endpoint is derived
    /// from it.
    pub base_url: Url,
    /// Credential file override. Defaults to the per-user config path.
    pub credential_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Create a configuration for the given server.
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            credential_path: None,
        }
    }
}

/// Errors that stop the client outright.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The base URL cannot be turned into a streaming endpoint.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    /// The credential store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No credential path was given and the platform has no default.
    #[error("no credential path available; set one explicitly")]
    NoCredentialPath,
}

/// What to do after a session has fully closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Start a fresh session.
    Reconnect,
    /// Stop; the close was final for this run.
    Finished,
}

/// Decide the follow-up for a closed session.
///
/// A stale close always reconnects; an auth rejection reconnects only
/// when the user actually supplied a new credential. Everything else —
/// unreachable server, remote close, declined prompt — is final.
const fn outcome(reason: Option<CloseReason>, credential_refreshed: bool) -> SessionOutcome {
    match reason {
        Some(CloseReason::Stale) => SessionOutcome::Reconnect,
        Some(CloseReason::Unauthorized) if credential_refreshed => SessionOutcome::Reconnect,
        _ => SessionOutcome::Finished,
    }
}

/// Translate a transport event into a session event.
fn session_event(event: TransportEvent) -> SessionEvent {
    match event {
        TransportEvent::Opened => SessionEvent::Opened,
        TransportEvent::Frame(text) => SessionEvent::Frame(text),
        TransportEvent::ConnectFailed { .. } => SessionEvent::ConnectFailed,
        TransportEvent::Closed => SessionEvent::TransportClosed,
    }
}

/// The log-tailing client.
///
/// Generic over the UI collaborator and the display surface so the whole
/// lifecycle can run against test doubles.
pub struct TailClient<U, S> {
    /// Streaming endpoint derived from the configured base URL.
    endpoint: Url,
    /// Token persistence.
    store: CredentialStore,
    /// Renderer over the display surface.
    view: LogView<S>,
    /// Credential prompt and notices.
    ui: U,
    /// Event channel shared by all socket actors; envelopes carry the
    /// generation that produced them.
    event_tx: Sender<TransportEnvelope>,
    event_rx: Receiver<TransportEnvelope>,
    /// Generation of the most recently started session.
    generation: u64,
}

impl<U: UserInterface, S: Surface> TailClient<U, S> {
    /// Create a client from configuration, a UI collaborator, and a
    /// display surface.
    ///
    /// # Errors
    ///
    /// Fails when the base URL has no streaming equivalent, or when no
    /// credential path is configured and the platform offers no default.
    pub fn new(config: ClientConfig, ui: U, surface: S) -> Result<Self, ClientError> {
        let endpoint = log_endpoint(&config.base_url)?;
        let credential_path = config
            .credential_path
            .or_else(CredentialStore::default_path)
            .ok_or(ClientError::NoCredentialPath)?;

        let (event_tx, event_rx) = bounded(256);

        Ok(Self {
            endpoint,
            store: CredentialStore::new(credential_path),
            view: LogView::new(surface),
            ui,
            event_tx,
            event_rx,
            generation: 0,
        })
    }

    /// Run sessions until a final close.
    ///
    /// Blocks the calling thread; all state transitions happen here, in
    /// response to transport events and ticker ticks.
    pub fn run(&mut self) -> Result<(), ClientError> {
        info!(endpoint = %self.endpoint, "tailing logs");

        loop {
            match self.run_session()? {
                SessionOutcome::Reconnect => {}
                SessionOutcome::Finished => break,
            }
        }

        info!("client finished");
        Ok(())
    }

    /// Run one session from connect to full close.
    fn run_session(&mut self) -> Result<SessionOutcome, ClientError> {
        self.generation += 1;
        let generation = self.generation;
        let credential = self.store.load()?;

        info!(
            generation,
            has_credential = credential.is_some(),
            "starting session"
        );

        let actor = SocketActor::spawn(
            self.endpoint.clone(),
            credential,
            generation,
            self.event_tx.clone(),
        );
        let ticker = StaleTicker::spawn();

        let events = self.event_rx.clone();
        let ticks = ticker.receiver().clone();

        let mut session = StreamSession::new();
        let mut credential_refreshed = false;

        while session.status() != SessionStatus::Closed {
            let step = select! {
                recv(events) -> envelope => match envelope {
                    Ok(env) if env.generation == generation => {
                        Some((session_event(env.event), Instant::now()))
                    }
                    // Superseded generation, or (unreachably) a closed
                    // channel: nothing to dispatch.
                    _ => None,
                },
                recv(ticks) -> tick => tick.ok().map(|at| (SessionEvent::Tick, at)),
            };

            let Some((event, now)) = step else { continue };

            for effect in session.handle(event, now) {
                match effect {
                    Effect::Render(chunk) => self.view.render(&chunk),
                    Effect::Notify(notice) => self.ui.notify(notice.message()),
                    Effect::SendHeartbeat => actor.send(HEARTBEAT),
                    Effect::CloseTransport => actor.close(),
                    Effect::RequestCredential => {
                        credential_refreshed = self.refresh_credential()?;
                    }
                    Effect::StopTicker => ticker.cancel(),
                }
            }
        }

        // Release the session's threads before deciding what comes next;
        // no actor may outlive its generation.
        actor.join();
        ticker.join();

        let next = outcome(session.close_reason(), credential_refreshed);
        debug!(generation, ?next, reason = ?session.close_reason(), "session closed");
        Ok(next)
    }

    /// Prompt for a credential and persist it.
    ///
    /// Returns whether a usable token was stored. Whitespace-only input
    /// counts as declining, matching a credential dialog that refuses an
    /// empty submission.
    fn refresh_credential(&mut self) -> Result<bool, ClientError> {
        match self.ui.prompt_for_credential() {
            Some(token) if !token.trim().is_empty() => {
                self.store.save(token.trim())?;
                info!("credential updated");
                Ok(true)
            }
            _ => {
                debug!("credential entry declined");
                Ok(false)
            }
        }
    }

    /// Get a reference to the renderer.
    pub const fn view(&self) -> &LogView<S> {
        &self.view
    }

    /// Get a mutable reference to the renderer.
    pub const fn view_mut(&mut self) -> &mut LogView<S> {
        &mut self.view
    }

    /// Generation of the most recently started session.
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Transcript;
    use tempfile::tempdir;

    /// Scripted UI double: hands out a fixed prompt answer and records
    /// notices.
    struct ScriptedUi {
        answer: Option<String>,
        prompts: usize,
        notices: Vec<String>,
    }

    impl ScriptedUi {
        fn answering(answer: Option<&str>) -> Self {
            Self {
                answer: answer.map(str::to_string),
                prompts: 0,
                notices: Vec::new(),
            }
        }
    }

    impl UserInterface for ScriptedUi {
        fn prompt_for_credential(&mut self) -> Option<String> {
            self.prompts += 1;
            self.answer.clone()
        }

        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    fn client(answer: Option<&str>) -> (TailClient<ScriptedUi, Transcript>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let mut config = ClientConfig::new("http://localhost:8080".parse().unwrap());
        config.credential_path = Some(dir.path().join("credential.json"));

        let client =
            TailClient::new(config, ScriptedUi::answering(answer), Transcript::default()).unwrap();
        (client, dir)
    }

    #[test]
    fn test_new_rejects_unsupported_scheme() {
        let config = ClientConfig::new("ftp://localhost/".parse().unwrap());
        let result = TailClient::new(
            config,
            ScriptedUi::answering(None),
            Transcript::default(),
        );
        assert!(matches!(result, Err(ClientError::Endpoint(_))));
    }

    #[test]
    fn test_refresh_credential_saves_trimmed_token() {
        let (mut client, _dir) = client(Some("  tok-123  "));

        assert!(client.refresh_credential().unwrap());
        assert_eq!(client.ui.prompts, 1);
        assert_eq!(client.store.load().unwrap(), Some("tok-123".to_string()));
    }

    #[test]
    fn test_refresh_credential_declined() {
        let (mut client, _dir) = client(None);
        assert!(!client.refresh_credential().unwrap());
        assert_eq!(client.store.load().unwrap(), None);
    }

    #[test]
    fn test_refresh_credential_blank_counts_as_declined() {
        let (mut client, _dir) = client(Some("   "));
        assert!(!client.refresh_credential().unwrap());
        assert_eq!(client.store.load().unwrap(), None);
    }

    #[test]
    fn test_outcome_rules() {
        assert_eq!(
            outcome(Some(CloseReason::Stale), false),
            SessionOutcome::Reconnect
        );
        assert_eq!(
            outcome(Some(CloseReason::Unauthorized), true),
            SessionOutcome::Reconnect
        );
        assert_eq!(
            outcome(Some(CloseReason::Unauthorized), false),
            SessionOutcome::Finished
        );
        assert_eq!(
            outcome(Some(CloseReason::Unreachable), false),
            SessionOutcome::Finished
        );
        assert_eq!(
            outcome(Some(CloseReason::Remote), false),
            SessionOutcome::Finished
        );
        assert_eq!(outcome(None, true), SessionOutcome::Finished);
    }

    #[test]
    fn test_session_event_mapping() {
        assert_eq!(
            session_event(TransportEvent::Opened),
            SessionEvent::Opened
        );
        assert_eq!(
            session_event(TransportEvent::Frame("x".into())),
            SessionEvent::Frame("x".into())
        );
        assert_eq!(
            session_event(TransportEvent::ConnectFailed {
                error: "refused".into()
            }),
            SessionEvent::ConnectFailed
        );
        assert_eq!(
            session_event(TransportEvent::Closed),
            SessionEvent::TransportClosed
        );
    }
}

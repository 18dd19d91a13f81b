//! Socket actor: Dedicated thread owning one WebSocket connection.
//!
//! The thread performs the handshake, then alternates between draining
//! outbound commands and reading inbound frames with a short poll
//! timeout, forwarding everything of interest to the event loop as
//! generation-tagged envelopes. It never interprets payloads; protocol
//! decisions belong to the session state machine.

use std::io;
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use tracing::{debug, warn};
use tungstenite::client::IntoClientRequest;
use tungstenite::http::header::COOKIE;
use tungstenite::http::HeaderValue;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Error as WsError, Message, WebSocket};
use url::Url;

use super::messages::{TransportCommand, TransportEnvelope, TransportEvent};
use crate::auth::CREDENTIAL_COOKIE;

/// Path of the streaming endpoint on the log server.
pub const LOG_PATH: &str = "/logs";

/// How long one blocking read may wait before the thread services
/// shutdown and outbound commands again.
const READ_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Derive the streaming endpoint from a base URL.
///
/// The path becomes [`LOG_PATH`] and an `http`/`https` scheme is upgraded
/// to its streaming equivalent; `ws`/`wss` URLs pass through with the
/// path rewritten.
///
/// # Errors
///
/// Returns [`EndpointError::UnsupportedScheme`] for any other scheme.
pub fn log_endpoint(base: &Url) -> Result<Url, EndpointError> {
    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
    };

    let mut endpoint = base.clone();
    endpoint
        .set_scheme(scheme)
        .map_err(|()| EndpointError::UnsupportedScheme(base.scheme().to_string()))?;
    endpoint.set_path(LOG_PATH);
    endpoint.set_query(None);
    endpoint.set_fragment(None);
    Ok(endpoint)
}

/// Errors from deriving the streaming endpoint.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// The base URL's scheme has no streaming equivalent.
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

/// Transport actor owning one WebSocket connection on its own thread.
pub struct SocketActor {
    /// Handle to the socket thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    /// Outbound command channel.
    commands: Sender<TransportCommand>,
}

impl SocketActor {
    /// Spawn the socket thread for one connection attempt.
    ///
    /// Events are delivered on `events` tagged with `generation`. The
    /// stored credential, when present, rides the handshake request as a
    /// cookie.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the socket thread.
    pub fn spawn(
        endpoint: Url,
        credential: Option<String>,
        generation: u64,
        events: Sender<TransportEnvelope>,
    ) -> Self {
        let (command_tx, command_rx) = bounded::<TransportCommand>(16);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name(format!("taillight-socket-{generation}"))
            .spawn(move || {
                Self::run_loop(
                    &endpoint,
                    credential.as_deref(),
                    generation,
                    &events,
                    &command_rx,
                    &shutdown_clone,
                );
            })
            .expect("Failed to spawn socket thread");

        Self {
            handle: Some(handle),
            shutdown,
            commands: command_tx,
        }
    }

    /// Queue a text frame for sending.
    pub fn send(&self, payload: impl Into<String>) {
        let _ = self.commands.send(TransportCommand::Send(payload.into()));
    }

    /// Ask the thread to close the connection.
    pub fn close(&self) {
        let _ = self.commands.send(TransportCommand::Close);
    }

    /// Signal the socket thread to shut down.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Shut down and wait for the socket thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main socket loop: connect, then pump commands and frames.
    fn run_loop(
        endpoint: &Url,
        credential: Option<&str>,
        generation: u64,
        events: &Sender<TransportEnvelope>,
        commands: &Receiver<TransportCommand>,
        shutdown: &Arc<AtomicBool>,
    ) {
        let emit = |event: TransportEvent| {
            let _ = events.send(TransportEnvelope { generation, event });
        };

        let mut socket = match Self::open(endpoint, credential) {
            Ok(socket) => socket,
            Err(err) => {
                warn!(generation, url = %endpoint, error = %err, "unable to connect");
                emit(TransportEvent::ConnectFailed {
                    error: err.to_string(),
                });
                return;
            }
        };

        debug!(generation, url = %endpoint, "log stream opened");
        emit(TransportEvent::Opened);

        loop {
            if shutdown.load(Ordering::Relaxed) {
                let _ = socket.close(None);
                break;
            }

            // Outbound first, so a heartbeat never waits behind a quiet
            // read poll.
            loop {
                match commands.try_recv() {
                    Ok(TransportCommand::Send(payload)) => {
                        if let Err(err) = socket.send(Message::Text(payload)) {
                            warn!(generation, error = %err, "send failed");
                            emit(TransportEvent::Closed);
                            return;
                        }
                    }
                    Ok(TransportCommand::Close) => {
                        let _ = socket.close(None);
                        emit(TransportEvent::Closed);
                        return;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        // Owner is gone; nobody is listening anymore.
                        let _ = socket.close(None);
                        return;
                    }
                }
            }

            match socket.read() {
                Ok(Message::Text(text)) => emit(TransportEvent::Frame(text)),
                Ok(Message::Close(_)) => {
                    emit(TransportEvent::Closed);
                    break;
                }
                // Binary frames and protocol-level ping/pong are not part
                // of the log protocol.
                Ok(_) => {}
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                    emit(TransportEvent::Closed);
                    break;
                }
                Err(WsError::Io(err)) if is_poll_timeout(&err) => {}
                Err(err) => {
                    warn!(generation, error = %err, "read failed");
                    emit(TransportEvent::Closed);
                    break;
                }
            }
        }
    }

    /// Open the connection and configure the read poll timeout.
    fn open(
        endpoint: &Url,
        credential: Option<&str>,
    ) -> Result<WebSocket<MaybeTlsStream<TcpStream>>, WsError> {
        let mut request = endpoint.as_str().into_client_request()?;

        if let Some(token) = credential {
            let cookie = format!("{CREDENTIAL_COOKIE}={token}");
            let value = HeaderValue::from_str(&cookie)
                .map_err(|err| WsError::HttpFormat(err.into()))?;
            request.headers_mut().insert(COOKIE, value);
        }

        let (socket, _response) = tungstenite::connect(request)?;

        if let MaybeTlsStream::Plain(stream) = socket.get_ref() {
            stream.set_read_timeout(Some(READ_POLL_INTERVAL))?;
        }

        Ok(socket)
    }
}

impl Drop for SocketActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Check whether a read error is just the poll timeout expiring.
fn is_poll_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

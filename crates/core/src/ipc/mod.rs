//! Remote Invocation Service
//!
//! The owner exposes one operation, "run action X", to later launches.
//! Messages are bincode-encoded and framed as a u32 little-endian length
//! followed by the payload. One request and one response per connection.
//!
//! Architecture:
//! - Owner: [`RemoteEndpoint::bind`] starts a listener thread. Each decoded
//!   request is handed to the event loop as an [`IncomingCall`]; the listener
//!   writes back whatever the loop replies.
//! - Follower: [`invoke`] connects (retrying while the owner finishes
//!   starting up), sends the request and maps the response to a `Result`.

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as platform;

#[cfg(windows)]
mod named_pipe;
#[cfg(windows)]
use named_pipe as platform;

pub use platform::Endpoint;

use crate::error::{HelperError, Result};
use crossbeam_channel::{bounded, Sender};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{self, ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Largest accepted frame payload
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// How long the listener waits for the event loop to pick up a call
const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Follower -> Owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteRequest {
    /// Same effect as picking `action` from the tray menu
    RunAction { action: String },
}

/// Owner -> Follower
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteResponse {
    /// Action is now displayed
    Accepted,
    /// Name is not a known action; nothing changed
    InvalidAction { name: String },
    /// Action is known but could not be opened
    Failed { reason: String },
}

/// A decoded request waiting for the event loop's answer.
///
/// Either the event loop or the timed-out listener claims the call, never
/// both: a call the listener gave up on must not run.
#[derive(Debug)]
pub struct IncomingCall {
    pub request: RemoteRequest,
    reply: Sender<RemoteResponse>,
    claimed: Arc<AtomicBool>,
}

impl IncomingCall {
    /// Take the call for handling. False when the caller was already
    /// answered with a timeout.
    pub fn claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::AcqRel)
    }

    pub fn respond(self, response: RemoteResponse) {
        if self.reply.send(response).is_err() {
            tracing::warn!("Remote caller went away before the reply was sent");
        }
    }
}

/// Write one length-prefixed bincode frame
pub fn write_frame<W: Write, T: Serialize>(writer: &mut W, message: &T) -> io::Result<()> {
    let payload =
        bincode::serialize(message).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            format!("frame of {} bytes exceeds limit", payload.len()),
        ));
    }

    writer.write_all(&(payload.len() as u32).to_le_bytes())?;
    writer.write_all(&payload)?;
    writer.flush()
}

/// Read one length-prefixed bincode frame
pub fn read_frame<R: Read, T: DeserializeOwned>(reader: &mut R) -> io::Result<T> {
    let mut header = [0u8; 4];
    reader.read_exact(&mut header)?;
    let len = u32::from_le_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds limit", len),
        ));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    bincode::deserialize(&payload).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
}

/// Owner side of one connection: read a request, ask the event loop, reply
pub fn serve_connection<S: Read + Write>(
    stream: &mut S,
    calls: &Sender<IncomingCall>,
) -> io::Result<()> {
    let request: RemoteRequest = read_frame(stream)?;
    tracing::info!("Remote call received: {:?}", request);

    let (reply_tx, reply_rx) = bounded(1);
    let claimed = Arc::new(AtomicBool::new(false));
    let call = IncomingCall {
        request,
        reply: reply_tx,
        claimed: Arc::clone(&claimed),
    };

    let response = if calls.send(call).is_err() {
        RemoteResponse::Failed {
            reason: "event loop is not running".to_string(),
        }
    } else {
        match reply_rx.recv_timeout(REPLY_TIMEOUT) {
            Ok(response) => response,
            Err(_) if !claimed.swap(true, Ordering::AcqRel) => {
                tracing::warn!("Event loop did not pick up the remote call in time");
                RemoteResponse::Failed {
                    reason: "event loop did not answer in time".to_string(),
                }
            }
            // The event loop took the call just before the deadline
            Err(_) => reply_rx
                .recv_timeout(REPLY_TIMEOUT)
                .unwrap_or_else(|_| RemoteResponse::Failed {
                    reason: "event loop stopped while handling the call".to_string(),
                }),
        }
    };

    write_frame(stream, &response)
}

/// Follower side of one connection: send a request, wait for the reply
pub fn exchange<S: Read + Write>(
    stream: &mut S,
    request: &RemoteRequest,
) -> io::Result<RemoteResponse> {
    write_frame(stream, request)?;
    read_frame(stream)
}

/// Owner's registered endpoint. Lives as long as the owner process.
pub struct RemoteEndpoint {
    endpoint: Endpoint,
    _listener: JoinHandle<()>,
}

impl RemoteEndpoint {
    /// Expose the endpoint; decoded calls are delivered on `calls`.
    ///
    /// Only the instance owner may call this.
    pub fn bind(endpoint: Endpoint, calls: Sender<IncomingCall>) -> Result<Self> {
        let mut listener = platform::bind(&endpoint)
            .map_err(|e| HelperError::io(endpoint.path(), e))?;
        tracing::info!("Remote endpoint listening on {}", endpoint.path().display());

        let listener_thread = std::thread::Builder::new()
            .name("remote-endpoint".to_string())
            .spawn(move || loop {
                match listener.accept() {
                    Ok(mut stream) => {
                        if let Err(e) = serve_connection(&mut stream, &calls) {
                            tracing::warn!("Remote call failed: {}", e);
                        }
                        platform::finish(stream);
                    }
                    Err(e) => {
                        tracing::error!("Failed to accept remote connection: {}", e);
                        std::thread::sleep(CONNECT_RETRY_DELAY);
                    }
                }
            })
            .map_err(|e| HelperError::io(endpoint.path(), e))?;

        Ok(Self {
            endpoint,
            _listener: listener_thread,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

fn connect_with_retry(endpoint: &Endpoint) -> Result<platform::Stream> {
    let mut last_error = None;
    for attempt in 1..=CONNECT_ATTEMPTS {
        match platform::connect(endpoint) {
            Ok(stream) => {
                tracing::debug!("Connected to {} on attempt {}", endpoint.path().display(), attempt);
                return Ok(stream);
            }
            Err(e) => {
                tracing::debug!("Connect attempt {} failed: {}", attempt, e);
                last_error = Some(e);
                std::thread::sleep(CONNECT_RETRY_DELAY);
            }
        }
    }

    Err(HelperError::RemoteUnreachable(format!(
        "{}: {}",
        endpoint.path().display(),
        last_error.map_or_else(|| "no attempts made".to_string(), |e| e.to_string())
    )))
}

/// Forward `action` to the running owner.
///
/// `Ok(())` only when the owner accepted and displayed the action.
pub fn invoke(endpoint: &Endpoint, action: &str) -> Result<()> {
    let mut stream = connect_with_retry(endpoint)?;
    let request = RemoteRequest::RunAction {
        action: action.to_string(),
    };

    let response = exchange(&mut stream, &request).map_err(|e| match e.kind() {
        ErrorKind::InvalidData => HelperError::Protocol(e.to_string()),
        _ => HelperError::RemoteUnreachable(e.to_string()),
    })?;

    match response {
        RemoteResponse::Accepted => {
            tracing::info!("Running instance accepted '{}'", action);
            Ok(())
        }
        RemoteResponse::InvalidAction { name } => Err(HelperError::InvalidRemoteAction(name)),
        RemoteResponse::Failed { reason } => Err(HelperError::RemoteFailed(reason)),
    }
}

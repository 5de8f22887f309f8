//! Unix domain socket transport

use std::io;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Read/write timeout on an established connection. The owner may wait up
/// to two reply timeouts before answering; the follower must outlast that
/// to receive the typed reply.
const IO_TIMEOUT: Duration = Duration::from_secs(super::REPLY_TIMEOUT.as_secs() * 3);

pub type Stream = UnixStream;

/// Socket path the owner listens on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    path: PathBuf,
}

impl Endpoint {
    /// `<runtime dir>/<key>.sock`
    pub fn for_identity(key: &str, runtime_dir: &Path) -> Self {
        Self {
            path: runtime_dir.join(format!("{}.sock", key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub struct Listener {
    inner: UnixListener,
}

impl Listener {
    pub fn accept(&mut self) -> io::Result<Stream> {
        let (stream, _) = self.inner.accept()?;
        configure(&stream)?;
        Ok(stream)
    }
}

/// Bind the owner's socket.
///
/// A leftover socket file from a crashed owner is removed first; the caller
/// holds the instance marker, so no live owner can be using it.
pub fn bind(endpoint: &Endpoint) -> io::Result<Listener> {
    match std::fs::remove_file(&endpoint.path) {
        Ok(()) => tracing::debug!("Removed stale socket {}", endpoint.path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let inner = UnixListener::bind(&endpoint.path)?;
    // Owner-only access
    std::fs::set_permissions(&endpoint.path, std::fs::Permissions::from_mode(0o600))?;
    Ok(Listener { inner })
}

pub fn connect(endpoint: &Endpoint) -> io::Result<Stream> {
    let stream = UnixStream::connect(&endpoint.path)?;
    configure(&stream)?;
    Ok(stream)
}

/// Close the server side of a served connection
pub fn finish(stream: Stream) {
    let _ = stream.shutdown(std::net::Shutdown::Both);
}

fn configure(stream: &UnixStream) -> io::Result<()> {
    stream.set_read_timeout(Some(IO_TIMEOUT))?;
    stream.set_write_timeout(Some(IO_TIMEOUT))
}

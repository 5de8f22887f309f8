/// Error taxonomy shared by every core module
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HelperError>;

#[derive(Debug, Error)]
pub enum HelperError {
    /// Action name not in the fixed set
    #[error("invalid action: `{0}`")]
    InvalidAction(String),

    /// Vault or local file could not be read, written or created
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cursor store error: {0}")]
    CursorStore(#[from] rusqlite::Error),

    /// Follower could not reach the owner's endpoint
    #[error("running instance unreachable: {0}")]
    RemoteUnreachable(String),

    /// Owner rejected the forwarded action name
    #[error("running instance rejected action `{0}`")]
    InvalidRemoteAction(String),

    /// Owner accepted the call but could not open the action
    #[error("running instance failed to run action: {0}")]
    RemoteFailed(String),

    /// Malformed frame on the IPC transport
    #[error("IPC protocol error: {0}")]
    Protocol(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl HelperError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HelperError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from disk I/O (as opposed to a bad name or transport)
    pub fn is_io(&self) -> bool {
        matches!(self, HelperError::Io { .. })
    }
}

//! Instance Guard
//!
//! Decides whether this process is the single running instance (Owner) or
//! must hand its request to the one that is (Follower).
//!
//! The marker is an exclusive OS lock on `<runtime dir>/<identity>.lock`.
//! The lock belongs to the open file handle, so it disappears when the owner
//! exits for any reason, including a crash. The file itself may linger; only
//! the lock matters.

use crate::error::{HelperError, Result};
use crate::ipc::Endpoint;
use std::fs::{File, OpenOptions, TryLockError};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name under which the application is known to other processes
#[derive(Debug, Clone)]
pub struct InstanceIdentity {
    key: String,
    runtime_dir: PathBuf,
}

impl InstanceIdentity {
    pub fn new(key: &str, runtime_dir: &Path) -> Self {
        Self {
            key: key.to_string(),
            runtime_dir: runtime_dir.to_path_buf(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn lock_path(&self) -> PathBuf {
        self.runtime_dir.join(format!("{}.lock", self.key))
    }

    /// Where the owner exposes its remote-invocation endpoint
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::for_identity(&self.key, &self.runtime_dir)
    }

    /// Try to become the owner. Never blocks.
    pub fn acquire(&self) -> Result<Role> {
        acquire(&self.lock_path())
    }
}

/// Outcome of [`acquire`]
#[derive(Debug)]
pub enum Role {
    /// This process holds the marker until it exits
    Owner(InstanceGuard),
    /// Another process holds the marker
    Follower,
}

impl Role {
    pub fn is_owner(&self) -> bool {
        matches!(self, Role::Owner(_))
    }
}

/// Held for the lifetime of the owning process
#[derive(Debug)]
pub struct InstanceGuard {
    _file: File,
    path: PathBuf,
}

impl InstanceGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Take the exclusive marker at `lock_path`
pub fn acquire(lock_path: &Path) -> Result<Role> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .map_err(|e| HelperError::io(lock_path, e))?;

    match file.try_lock() {
        Ok(()) => {
            // pid is informational only
            let pid = std::process::id().to_string();
            if let Err(e) = file.set_len(0).and_then(|_| file.write_all(pid.as_bytes())) {
                tracing::warn!("Failed to record pid in {}: {}", lock_path.display(), e);
            }
            tracing::info!("Acquired instance marker {}", lock_path.display());
            Ok(Role::Owner(InstanceGuard {
                _file: file,
                path: lock_path.to_path_buf(),
            }))
        }
        Err(TryLockError::WouldBlock) => {
            tracing::info!("Another instance holds {}", lock_path.display());
            Ok(Role::Follower)
        }
        Err(TryLockError::Error(e)) => Err(HelperError::io(lock_path, e)),
    }
}

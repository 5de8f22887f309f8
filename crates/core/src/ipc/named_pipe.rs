//! Windows named pipe transport
//!
//! The owner creates one pipe instance at a time and waits for a client;
//! clients open the pipe like a file. Reads are blocking: a follower that
//! stalls mid-request only blocks the listener thread, never the event loop.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::windows::io::{FromRawHandle, RawHandle};
use std::path::{Path, PathBuf};

use ::windows::core::PCWSTR;
use ::windows::Win32::Foundation::{CloseHandle, ERROR_PIPE_CONNECTED, HANDLE};
use ::windows::Win32::Storage::FileSystem::PIPE_ACCESS_DUPLEX;
use ::windows::Win32::System::Pipes::{
    ConnectNamedPipe, CreateNamedPipeW, PIPE_READMODE_BYTE, PIPE_TYPE_BYTE, PIPE_WAIT,
};

pub type Stream = File;

/// `\\.\pipe\<key>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    path: PathBuf,
}

impl Endpoint {
    pub fn for_identity(key: &str, _runtime_dir: &Path) -> Self {
        Self {
            path: PathBuf::from(format!(r"\\.\pipe\{}", key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub struct Listener {
    name: Vec<u16>,
    /// Instance created ahead of the next accept
    pending: Option<HANDLE>,
}

// HANDLE is a plain kernel handle value; ownership moves with the listener
unsafe impl Send for Listener {}

impl Listener {
    pub fn accept(&mut self) -> io::Result<Stream> {
        let handle = match self.pending.take() {
            Some(handle) => handle,
            None => create_instance(&self.name)?,
        };

        if let Err(e) = unsafe { ConnectNamedPipe(handle, None) } {
            // Client connected between create and connect
            if e.code() != ERROR_PIPE_CONNECTED.to_hresult() {
                unsafe {
                    let _ = CloseHandle(handle);
                }
                return Err(io::Error::other(e));
            }
        }

        Ok(unsafe { File::from_raw_handle(handle.0 as RawHandle) })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            unsafe {
                let _ = CloseHandle(handle);
            }
        }
    }
}

fn create_instance(name: &[u16]) -> io::Result<HANDLE> {
    let handle = unsafe {
        CreateNamedPipeW(
            PCWSTR(name.as_ptr()),
            PIPE_ACCESS_DUPLEX,
            PIPE_TYPE_BYTE | PIPE_READMODE_BYTE | PIPE_WAIT,
            1,    // Max instances
            8192, // Out buffer size
            8192, // In buffer size
            0,    // Default timeout
            None, // Default security
        )
    };

    if handle.is_invalid() {
        return Err(io::Error::last_os_error());
    }
    Ok(handle)
}

/// Create the first pipe instance so name conflicts surface at startup
pub fn bind(endpoint: &Endpoint) -> io::Result<Listener> {
    let name: Vec<u16> = endpoint
        .path
        .to_string_lossy()
        .encode_utf16()
        .chain(Some(0))
        .collect();
    let first = create_instance(&name)?;
    Ok(Listener {
        name,
        pending: Some(first),
    })
}

pub fn connect(endpoint: &Endpoint) -> io::Result<Stream> {
    OpenOptions::new().read(true).write(true).open(&endpoint.path)
}

/// Wait until the client has read the reply, then close our end
pub fn finish(stream: Stream) {
    // FlushFileBuffers on a pipe blocks until the client drained it
    let _ = stream.sync_all();
}

//! Obsidian Helper Core Library
//!
//! Everything the desktop binary needs except the window and tray toolkits.
//!
//! Architecture:
//! - First launch becomes the Owner (instance module) and runs the Session
//!   Controller (session module) behind a window
//! - Later launches become Followers and forward their action over IPC
//!   (ipc module), then exit
//! - Notes live in the vault (handlers module); caret positions in a small
//!   SQLite file (cursor_store module)

pub mod action;
pub mod config;
pub mod cursor_store;
pub mod error;
pub mod handlers;
pub mod hotkeys;
pub mod instance;
pub mod ipc;
pub mod session;
pub mod text_offset;

pub use action::Action;
pub use error::{HelperError, Result};
pub use session::{NoteView, Session, SessionState, Status};

//! Session Controller
//!
//! Owns the "which action is displayed" state and is the only code that
//! changes it. Tray clicks, hotkeys, the startup `--action` flag and remote
//! calls all end up in [`Session::select`].
//!
//! States:
//! - `Idle`: nothing loaded; window hidden unless it shows an open failure
//! - `Editing(action)`: window visible, handler for `action` loaded
//!
//! Switching while edits are unsaved discards them; the user gets a warning
//! in the newly displayed note and the loss is logged.

use crate::action::Action;
use crate::cursor_store::CursorStore;
use crate::error::{HelperError, Result};
use crate::handlers::{NoteHandler, Vault};
use crate::ipc::{IncomingCall, RemoteRequest, RemoteResponse};
use crate::text_offset::char_len;

/// Message shown alongside the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Warning(String),
    Error(String),
}

/// The window and text-edit widget, as seen by the session.
///
/// Cursor offsets are character offsets into the full text.
pub trait NoteView {
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str);
    fn cursor(&self) -> usize;
    /// `offset` is always within `0..=char count` of the current text
    fn set_cursor(&mut self, offset: usize);
    /// Title and submit button label
    fn set_action(&mut self, action: Action);
    fn set_status(&mut self, status: Option<Status>);
    fn show(&mut self);
    fn hide(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Editing(Action),
}

struct ActiveNote {
    handler: Box<dyn NoteHandler>,
    /// Text as loaded, to detect unsaved edits
    loaded: String,
}

impl ActiveNote {
    fn action(&self) -> Action {
        self.handler.action()
    }
}

pub struct Session<V: NoteView> {
    vault: Vault,
    cursors: CursorStore,
    view: V,
    active: Option<ActiveNote>,
}

impl<V: NoteView> Session<V> {
    /// Starts `Idle`
    pub fn new(vault: Vault, cursors: CursorStore, view: V) -> Self {
        Self {
            vault,
            cursors,
            view,
            active: None,
        }
    }

    pub fn state(&self) -> SessionState {
        match &self.active {
            Some(active) => SessionState::Editing(active.action()),
            None => SessionState::Idle,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Direct widget access for edits that do not change session state
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Display `action`: load its content, restore its cursor, show the window.
    ///
    /// On failure the state does not change. The error is reported in the
    /// view, which is shown empty if nothing was displayed.
    pub fn select(&mut self, action: Action) -> Result<()> {
        let handler = self.vault.handler(action);
        let text = match handler.open() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to open {}: {}", action, e);
                self.view
                    .set_status(Some(Status::Error(format!("Could not open {}: {}", action.label(), e))));
                if self.active.is_none() {
                    // Nothing on screen to carry the error; show an empty window
                    self.view.set_text("");
                    self.view.show();
                }
                return Err(e);
            }
        };

        let discarded = self.unsaved_action();
        if let Some(previous) = discarded {
            tracing::warn!("Discarding unsaved {} edits to show {}", previous, action);
        }

        let end = char_len(&text);
        let offset = match self.cursors.get(action) {
            Ok(Some(offset)) => offset.min(end),
            Ok(None) => end,
            Err(e) => {
                tracing::warn!("Failed to read cursor for {}: {}", action, e);
                end
            }
        };

        self.view.set_text(&text);
        self.view.set_cursor(offset);
        self.view.set_action(action);
        self.view.set_status(discarded.map(|previous| {
            Status::Warning(format!("Unsaved {} edits were discarded", previous.label()))
        }));
        self.view.show();

        tracing::info!("Editing {} ({} chars, cursor {})", action, end, offset);
        self.active = Some(ActiveNote {
            handler,
            loaded: text,
        });
        Ok(())
    }

    /// Save the displayed text and hide the window.
    ///
    /// If the save fails the window stays up with the text intact.
    pub fn submit(&mut self) -> Result<()> {
        let Some(active) = &self.active else {
            tracing::debug!("Submit ignored while idle");
            return Ok(());
        };
        let action = active.action();
        let text = self.view.text();
        let cursor = self.view.cursor();

        if let Err(e) = self.cursors.set(action, cursor) {
            tracing::warn!("Failed to persist cursor for {}: {}", action, e);
        }

        if let Err(e) = active.handler.save(&text) {
            tracing::error!("Failed to save {}: {}", action, e);
            self.view
                .set_status(Some(Status::Error(format!("Could not save {}: {}", action.label(), e))));
            return Err(e);
        }

        tracing::info!("Saved {} ({} chars)", action, char_len(&text));
        self.active = None;
        self.view.set_status(None);
        self.view.hide();
        Ok(())
    }

    /// Hide without saving; edits and cursor are dropped
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::info!("Cancelled {} without saving", active.action());
        }
        self.view.set_text("");
        self.view.set_status(None);
        self.view.hide();
    }

    /// Run a request from another launch through the same path as a tray click
    pub fn handle_remote(&mut self, request: RemoteRequest) -> RemoteResponse {
        match request {
            RemoteRequest::RunAction { action } => match action.parse::<Action>() {
                Ok(parsed) => match self.select(parsed) {
                    Ok(()) => RemoteResponse::Accepted,
                    Err(e) => RemoteResponse::Failed {
                        reason: e.to_string(),
                    },
                },
                Err(HelperError::InvalidAction(name)) => {
                    tracing::warn!("Rejected remote call for unknown action '{}'", name);
                    RemoteResponse::InvalidAction { name }
                }
                Err(e) => RemoteResponse::Failed {
                    reason: e.to_string(),
                },
            },
        }
    }

    /// Answer a call from the remote endpoint, unless its caller already gave up
    pub fn serve_call(&mut self, call: IncomingCall) {
        if !call.claim() {
            tracing::warn!("Dropping remote call abandoned by its caller: {:?}", call.request);
            return;
        }
        let response = self.handle_remote(call.request.clone());
        call.respond(response);
    }

    fn unsaved_action(&self) -> Option<Action> {
        self.active
            .as_ref()
            .filter(|active| self.view.text() != active.loaded)
            .map(ActiveNote::action)
    }
}

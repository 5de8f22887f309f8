//! The fixed set of note actions
//!
//! Every entry point (CLI flag, tray menu, hotkey, remote call) names an
//! action by string; parsing happens here and nowhere else.

use crate::error::HelperError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Today's journal page, created from the template on first open
    Journal,
    /// A single free-form scratch file
    Scratchpad,
    /// Append-only bullet list
    DistractionList,
}

impl Action {
    /// All actions, in tray menu order
    pub const ALL: [Action; 3] = [Action::Journal, Action::Scratchpad, Action::DistractionList];

    /// Canonical name used on the command line, in config and in the cursor store
    pub fn name(self) -> &'static str {
        match self {
            Action::Journal => "journal",
            Action::Scratchpad => "scratchpad",
            Action::DistractionList => "distraction_list",
        }
    }

    /// Human-readable label for window title and submit button
    pub fn label(self) -> &'static str {
        match self {
            Action::Journal => "Journal",
            Action::Scratchpad => "Scratchpad",
            Action::DistractionList => "Distraction list",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = HelperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "journal" => Ok(Action::Journal),
            "scratchpad" => Ok(Action::Scratchpad),
            "distraction_list" | "distraction-list" => Ok(Action::DistractionList),
            other => Err(HelperError::InvalidAction(other.to_string())),
        }
    }
}

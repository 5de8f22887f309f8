//! Action Handlers
//!
//! One handler per action, all sharing the open/save contract.
//! [`Vault::handler`] is the only place that maps an action to its handler.

mod distraction_list;
mod journal;
mod scratchpad;

pub use distraction_list::DistractionList;
pub use journal::Journal;
pub use scratchpad::Scratchpad;

use crate::action::Action;
use crate::config::AppConfig;
use crate::error::Result;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Load and persist the note content behind one action
pub trait NoteHandler: Send {
    fn action(&self) -> Action;

    /// Text to place in the editor
    fn open(&self) -> Result<String>;

    /// Persist the submitted text
    fn save(&self, text: &str) -> Result<()>;
}

/// Supplies "today" for journal file names
pub type DateSource = Box<dyn Fn() -> NaiveDate + Send>;

/// Resolved vault paths plus the date source; builds handlers on demand
pub struct Vault {
    journal_dir: PathBuf,
    journal_template: PathBuf,
    scratchpad: PathBuf,
    distraction_list: PathBuf,
    today: DateSource,
}

impl Vault {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            journal_dir: config.journal_dir(),
            journal_template: config.journal_template_path(),
            scratchpad: config.scratchpad_path(),
            distraction_list: config.distraction_list_path(),
            today: Box::new(|| chrono::Local::now().date_naive()),
        }
    }

    /// Replace the local-clock date source
    pub fn with_date_source(mut self, today: impl Fn() -> NaiveDate + Send + 'static) -> Self {
        self.today = Box::new(today);
        self
    }

    pub fn handler(&self, action: Action) -> Box<dyn NoteHandler> {
        match action {
            Action::Journal => Box::new(Journal::new(
                &self.journal_dir,
                &self.journal_template,
                (self.today)(),
            )),
            Action::Scratchpad => Box::new(Scratchpad::new(&self.scratchpad)),
            Action::DistractionList => Box::new(DistractionList::new(&self.distraction_list)),
        }
    }
}

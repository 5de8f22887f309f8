//! Journal handler: one markdown page per calendar day

use super::NoteHandler;
use crate::action::Action;
use crate::error::{HelperError, Result};
use chrono::NaiveDate;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub struct Journal {
    dir: PathBuf,
    template: PathBuf,
    date: NaiveDate,
}

impl Journal {
    pub fn new(dir: &Path, template: &Path, date: NaiveDate) -> Self {
        Self {
            dir: dir.to_path_buf(),
            template: template.to_path_buf(),
            date,
        }
    }

    fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// `<journal_folder>/<YYYY-MM-DD>.md`
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.md", self.iso_date()))
    }

    /// Template bytes verbatim, or a date heading when there is no template
    fn initial_contents(&self) -> Result<Vec<u8>> {
        match fs::read(&self.template) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No journal template at {}", self.template.display());
                Ok(format!("# {}", self.iso_date()).into_bytes())
            }
            Err(e) => Err(HelperError::io(&self.template, e)),
        }
    }

    fn create_page(&self, path: &Path) -> Result<()> {
        let contents = self.initial_contents()?;
        fs::create_dir_all(&self.dir).map_err(|e| HelperError::io(&self.dir, e))?;

        // create_new: never clobber a page that appeared in the meantime
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                file.write_all(&contents)
                    .map_err(|e| HelperError::io(path, e))?;
                tracing::info!("Created journal page {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(HelperError::io(path, e)),
        }
    }
}

impl NoteHandler for Journal {
    fn action(&self) -> Action {
        Action::Journal
    }

    fn open(&self) -> Result<String> {
        let path = self.path();
        if !path.exists() {
            self.create_page(&path)?;
        }
        fs::read_to_string(&path).map_err(|e| HelperError::io(&path, e))
    }

    fn save(&self, text: &str) -> Result<()> {
        let path = self.path();
        fs::write(&path, text).map_err(|e| HelperError::io(&path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_new_page_copies_template_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.md");
        fs::write(&template, "X").unwrap();
        let journal = Journal::new(&dir.path().join("Journal"), &template, date());

        assert_eq!(journal.open().unwrap(), "X");
        assert_eq!(
            fs::read_to_string(dir.path().join("Journal/2024-03-09.md")).unwrap(),
            "X"
        );
    }

    #[test]
    fn test_new_page_without_template_gets_heading() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new(dir.path(), &dir.path().join("missing.md"), date());

        assert_eq!(journal.open().unwrap(), "# 2024-03-09");
    }

    #[test]
    fn test_existing_page_is_not_replaced_by_template() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.md");
        fs::write(&template, "template").unwrap();
        fs::write(dir.path().join("2024-03-09.md"), "already written").unwrap();
        let journal = Journal::new(dir.path(), &template, date());

        assert_eq!(journal.open().unwrap(), "already written");
    }

    #[test]
    fn test_save_overwrites_page() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new(dir.path(), &dir.path().join("missing.md"), date());
        journal.open().unwrap();

        journal.save("short").unwrap();
        assert_eq!(journal.open().unwrap(), "short");
    }

    #[test]
    fn test_unreadable_template_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the template file should be
        let template = dir.path().join("template.md");
        fs::create_dir(&template).unwrap();
        let journal = Journal::new(&dir.path().join("Journal"), &template, date());

        assert!(journal.open().unwrap_err().is_io());
    }
}

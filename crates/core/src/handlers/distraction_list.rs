use super::NoteHandler;
use crate::action::Action;
use crate::error::{HelperError, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write-only bullet list: every submission appends `- <text>\n`
pub struct DistractionList {
    path: PathBuf,
}

impl DistractionList {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl NoteHandler for DistractionList {
    fn action(&self) -> Action {
        Action::DistractionList
    }

    /// Existing entries are never loaded back into the editor
    fn open(&self) -> Result<String> {
        Ok(String::new())
    }

    fn save(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            tracing::debug!("Skipping empty distraction entry");
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| HelperError::io(&self.path, e))?;

        // One write call per entry
        let line = format!("- {}\n", text);
        file.write_all(line.as_bytes())
            .map_err(|e| HelperError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_entries_append_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("distractions.md");
        let list = DistractionList::new(&path);

        list.save("buy milk").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "- buy milk\n");

        list.save("call bank").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "- buy milk\n- call bank\n"
        );
    }

    #[test]
    fn test_open_is_always_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("distractions.md");
        fs::write(&path, "- old entry\n").unwrap();

        assert_eq!(DistractionList::new(&path).open().unwrap(), "");
    }

    #[test]
    fn test_blank_submission_appends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("distractions.md");
        let list = DistractionList::new(&path);

        list.save("  \n").unwrap();
        assert!(!path.exists());
    }
}

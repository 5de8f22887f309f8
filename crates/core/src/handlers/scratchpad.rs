use super::NoteHandler;
use crate::action::Action;
use crate::error::{HelperError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A single fixed file, fully rewritten on save
pub struct Scratchpad {
    path: PathBuf,
}

impl Scratchpad {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl NoteHandler for Scratchpad {
    fn action(&self) -> Action {
        Action::Scratchpad
    }

    fn open(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(HelperError::io(&self.path, e)),
        }
    }

    fn save(&self, text: &str) -> Result<()> {
        fs::write(&self.path, text).map_err(|e| HelperError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_opens_empty_without_creating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scratch.md");
        let pad = Scratchpad::new(&path);

        assert_eq!(pad.open().unwrap(), "");
        assert!(!path.exists());

        pad.save("todo").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "todo");
    }

    #[test]
    fn test_save_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scratch.md");
        fs::write(&path, "a much longer previous text").unwrap();
        let pad = Scratchpad::new(&path);

        pad.save("new").unwrap();
        assert_eq!(pad.open().unwrap(), "new");
    }

    #[test]
    fn test_save_into_missing_folder_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let pad = Scratchpad::new(&dir.path().join("no/such/dir/scratch.md"));

        assert!(pad.save("text").unwrap_err().is_io());
    }
}

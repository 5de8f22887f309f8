/// Configuration module for Obsidian Helper.
///
/// This module provides functionality for:
/// - Parsing `config.toml` (vault location, note file names, hotkeys)
/// - Resolving the vault paths each action reads and writes
/// - Determining the runtime directory used for the instance marker and IPC socket
///
/// # Example
///
/// ```toml
/// obsidian_path = "~/Notes"
/// journal_folder = "Journal"
/// journal_template = "Templates/Journal.md"
/// scratchpad_name = "Scratchpad.md"
/// distraction_list_name = "Distractions.md"
///
/// [shortcuts]
/// journal = "ctrl+alt+j"
/// scratchpad = "ctrl+alt+s"
/// ```
use crate::action::Action;
use crate::error::{HelperError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Application identity: directory names, instance marker and endpoint names
pub const APP_NAME: &str = "ObsidianHelper";

const CONFIG_FILE_NAME: &str = "config.toml";

fn default_cursor_db() -> PathBuf {
    PathBuf::from("cursors.db")
}

/// Application configuration loaded from config.toml
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Vault root
    pub obsidian_path: PathBuf,
    /// Folder (relative to the vault) holding one file per day
    pub journal_folder: String,
    /// Template file (relative to the vault) copied into new journal pages
    pub journal_template: String,
    /// Scratchpad file name (relative to the vault)
    pub scratchpad_name: String,
    /// Distraction list file name (relative to the vault)
    pub distraction_list_name: String,
    /// Cursor database; relative paths resolve against the working directory
    #[serde(default = "default_cursor_db")]
    pub cursor_db: PathBuf,
    /// Action name -> hotkey combo. Missing entries mean no hotkey.
    #[serde(default)]
    pub shortcuts: BTreeMap<String, String>,
}

impl AppConfig {
    /// Parse configuration text and expand `~`/`$VAR` in the vault path
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(contents)
            .map_err(|e| HelperError::Config(format!("invalid config.toml: {}", e)))?;

        let raw = config.obsidian_path.to_string_lossy().into_owned();
        let expanded = shellexpand::full(&raw)
            .map_err(|e| HelperError::Config(format!("cannot expand obsidian_path: {}", e)))?;
        config.obsidian_path = PathBuf::from(expanded.as_ref());

        Ok(config)
    }

    /// `<vault>/<journal_folder>`
    pub fn journal_dir(&self) -> PathBuf {
        self.obsidian_path.join(&self.journal_folder)
    }

    /// `<vault>/<journal_template>`
    pub fn journal_template_path(&self) -> PathBuf {
        self.obsidian_path.join(&self.journal_template)
    }

    /// `<vault>/<scratchpad_name>`
    pub fn scratchpad_path(&self) -> PathBuf {
        self.obsidian_path.join(&self.scratchpad_name)
    }

    /// `<vault>/<distraction_list_name>`
    pub fn distraction_list_path(&self) -> PathBuf {
        self.obsidian_path.join(&self.distraction_list_name)
    }

    /// Configured hotkey combos, keyed by parsed action.
    /// Entries naming an unknown action are logged and skipped.
    pub fn shortcuts(&self) -> Vec<(Action, &str)> {
        self.shortcuts
            .iter()
            .filter_map(|(name, combo)| match name.parse::<Action>() {
                Ok(action) => Some((action, combo.as_str())),
                Err(_) => {
                    tracing::warn!("Ignoring shortcut for unknown action '{}'", name);
                    None
                }
            })
            .collect()
    }
}

/// Load application configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let contents = fs::read_to_string(path).map_err(|e| HelperError::io(path, e))?;
    let config = AppConfig::from_toml_str(&contents)?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Config file location when none is given on the command line.
/// Prefers the platform config dir, falls back to `./config.toml`.
pub fn default_config_path() -> PathBuf {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Directory holding the instance marker and the IPC socket.
/// Uses the per-user runtime dir where the platform has one.
/// Creates directory if it doesn't exist
pub fn get_runtime_directory() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", APP_NAME)
        .ok_or_else(|| HelperError::Config("failed to determine user directories".to_string()))?;

    let dir = project_dirs
        .runtime_dir()
        .unwrap_or_else(|| project_dirs.data_local_dir())
        .to_path_buf();

    fs::create_dir_all(&dir).map_err(|e| HelperError::io(&dir, e))?;

    Ok(dir)
}

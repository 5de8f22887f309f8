//! Command line arguments

use anyhow::Result;
use clap::Parser;
use obsidian_helper_core::Action;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "obsidian_helper", version, about = "Quick capture into an Obsidian vault")]
pub struct Args {
    /// Action to show: journal, scratchpad or distraction_list
    #[arg(long)]
    pub action: Option<String>,

    /// Config file (defaults to the platform config dir, then ./config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Debug-level logging unless RUST_LOG says otherwise
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Requested action, validated before anything else starts
    pub fn action(&self) -> Result<Option<Action>> {
        Ok(self.action.as_deref().map(str::parse::<Action>).transpose()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_flag_parses() {
        let args = Args::parse_from(["obsidian_helper", "--action", "scratchpad"]);
        assert_eq!(args.action().unwrap(), Some(Action::Scratchpad));
    }

    #[test]
    fn test_no_action_is_none() {
        let args = Args::parse_from(["obsidian_helper", "--verbose"]);
        assert!(args.verbose);
        assert_eq!(args.action().unwrap(), None);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let args = Args::parse_from(["obsidian_helper", "--action", "calendar"]);
        let err = args.action().unwrap_err();
        assert!(err.to_string().contains("calendar"));
    }
}

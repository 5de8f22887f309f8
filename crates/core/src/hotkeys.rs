//! Hotkey bindings - parse shortcut strings from config into global hotkeys
//!
//! Uses the global-hotkey crate types. Bindings are built once at startup
//! and never change for the lifetime of the owner.

use crate::action::Action;
use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortcutError {
    #[error("empty shortcut")]
    Empty,

    #[error("unknown key '{0}'")]
    UnknownKey(String),

    #[error("shortcut has modifiers but no key")]
    MissingKey,

    #[error("shortcut has more than one key")]
    MultipleKeys,
}

/// Convert modifier name to global-hotkey Modifiers
fn string_to_modifier(name: &str) -> Option<Modifiers> {
    match name {
        "ctrl" | "control" => Some(Modifiers::CONTROL),
        "alt" | "option" => Some(Modifiers::ALT),
        "shift" => Some(Modifiers::SHIFT),
        "super" | "meta" | "win" | "cmd" => Some(Modifiers::META),
        _ => None,
    }
}

/// Convert key string to global-hotkey Code
fn string_to_code(key: &str) -> Option<Code> {
    match key.to_uppercase().as_str() {
        // Letters
        "A" => Some(Code::KeyA),
        "B" => Some(Code::KeyB),
        "C" => Some(Code::KeyC),
        "D" => Some(Code::KeyD),
        "E" => Some(Code::KeyE),
        "F" => Some(Code::KeyF),
        "G" => Some(Code::KeyG),
        "H" => Some(Code::KeyH),
        "I" => Some(Code::KeyI),
        "J" => Some(Code::KeyJ),
        "K" => Some(Code::KeyK),
        "L" => Some(Code::KeyL),
        "M" => Some(Code::KeyM),
        "N" => Some(Code::KeyN),
        "O" => Some(Code::KeyO),
        "P" => Some(Code::KeyP),
        "Q" => Some(Code::KeyQ),
        "R" => Some(Code::KeyR),
        "S" => Some(Code::KeyS),
        "T" => Some(Code::KeyT),
        "U" => Some(Code::KeyU),
        "V" => Some(Code::KeyV),
        "W" => Some(Code::KeyW),
        "X" => Some(Code::KeyX),
        "Y" => Some(Code::KeyY),
        "Z" => Some(Code::KeyZ),
        // Numbers
        "0" => Some(Code::Digit0),
        "1" => Some(Code::Digit1),
        "2" => Some(Code::Digit2),
        "3" => Some(Code::Digit3),
        "4" => Some(Code::Digit4),
        "5" => Some(Code::Digit5),
        "6" => Some(Code::Digit6),
        "7" => Some(Code::Digit7),
        "8" => Some(Code::Digit8),
        "9" => Some(Code::Digit9),
        // Function keys
        "F1" => Some(Code::F1),
        "F2" => Some(Code::F2),
        "F3" => Some(Code::F3),
        "F4" => Some(Code::F4),
        "F5" => Some(Code::F5),
        "F6" => Some(Code::F6),
        "F7" => Some(Code::F7),
        "F8" => Some(Code::F8),
        "F9" => Some(Code::F9),
        "F10" => Some(Code::F10),
        "F11" => Some(Code::F11),
        "F12" => Some(Code::F12),
        // Named keys
        "SPACE" => Some(Code::Space),
        "ENTER" | "RETURN" => Some(Code::Enter),
        "TAB" => Some(Code::Tab),
        "ESC" | "ESCAPE" => Some(Code::Escape),
        _ => None,
    }
}

/// Parse a combo such as `ctrl+alt+j` into a hotkey
pub fn parse_shortcut(combo: &str) -> Result<HotKey, ShortcutError> {
    let parts: Vec<String> = combo
        .split('+')
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        return Err(ShortcutError::Empty);
    }

    let mut mods = Modifiers::empty();
    let mut code = None;
    for part in &parts {
        if let Some(modifier) = string_to_modifier(part) {
            mods |= modifier;
            continue;
        }
        // Anything that is not a modifier must be the one key
        let parsed =
            string_to_code(part).ok_or_else(|| ShortcutError::UnknownKey(part.clone()))?;
        if code.replace(parsed).is_some() {
            return Err(ShortcutError::MultipleKeys);
        }
    }

    let code = code.ok_or(ShortcutError::MissingKey)?;
    let mods = if mods.is_empty() { None } else { Some(mods) };
    Ok(HotKey::new(mods, code))
}

/// Immutable mapping from registered hotkey to action
#[derive(Debug, Default)]
pub struct HotkeyBindings {
    bindings: Vec<(Action, HotKey)>,
    by_id: HashMap<u32, Action>,
}

impl HotkeyBindings {
    /// Build from `(action, combo)` pairs. Invalid combos are logged and
    /// skipped; a combo already bound keeps its first action.
    pub fn from_shortcuts<'a>(shortcuts: impl IntoIterator<Item = (Action, &'a str)>) -> Self {
        let mut result = Self::default();
        for (action, combo) in shortcuts {
            let hotkey = match parse_shortcut(combo) {
                Ok(hotkey) => hotkey,
                Err(e) => {
                    tracing::warn!("Ignoring shortcut '{}' for {}: {}", combo, action, e);
                    continue;
                }
            };

            if let Some(existing) = result.by_id.get(&hotkey.id()) {
                tracing::warn!(
                    "Shortcut '{}' already bound to {}; ignoring it for {}",
                    combo,
                    existing,
                    action
                );
                continue;
            }

            result.by_id.insert(hotkey.id(), action);
            result.bindings.push((action, hotkey));
        }
        result
    }

    /// Hotkeys to register with the OS
    pub fn hotkeys(&self) -> impl Iterator<Item = &(Action, HotKey)> {
        self.bindings.iter()
    }

    /// Action bound to a fired hotkey id
    pub fn action_for(&self, id: u32) -> Option<Action> {
        self.by_id.get(&id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modifiers_and_key() {
        let hotkey = parse_shortcut("Ctrl+Alt+J").unwrap();
        assert_eq!(
            hotkey,
            HotKey::new(Some(Modifiers::CONTROL | Modifiers::ALT), Code::KeyJ)
        );
    }

    #[test]
    fn test_parse_aliases_and_spacing() {
        assert_eq!(
            parse_shortcut(" cmd + shift + f5 ").unwrap(),
            HotKey::new(Some(Modifiers::META | Modifiers::SHIFT), Code::F5)
        );
        assert_eq!(
            parse_shortcut("control+space").unwrap(),
            HotKey::new(Some(Modifiers::CONTROL), Code::Space)
        );
    }

    #[test]
    fn test_bare_key_has_no_modifiers() {
        assert_eq!(parse_shortcut("f9").unwrap(), HotKey::new(None, Code::F9));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_shortcut(""), Err(ShortcutError::Empty));
        assert_eq!(parse_shortcut("ctrl+alt"), Err(ShortcutError::MissingKey));
        assert_eq!(parse_shortcut("ctrl+a+b"), Err(ShortcutError::MultipleKeys));
        assert!(matches!(
            parse_shortcut("ctrl+pagedown"),
            Err(ShortcutError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ShortcutError::UnknownKey("pagedown".to_string()).to_string(),
            "unknown key 'pagedown'"
        );
        let err: Box<dyn std::error::Error> = Box::new(ShortcutError::MissingKey);
        assert_eq!(err.to_string(), "shortcut has modifiers but no key");
    }

    #[test]
    fn test_bindings_skip_invalid_and_duplicates() {
        let bindings = HotkeyBindings::from_shortcuts([
            (Action::Journal, "ctrl+alt+j"),
            (Action::Scratchpad, "not a key"),
            (Action::DistractionList, "alt+ctrl+j"),
        ]);

        assert_eq!(bindings.hotkeys().count(), 1);
        let journal = parse_shortcut("ctrl+alt+j").unwrap();
        assert_eq!(bindings.action_for(journal.id()), Some(Action::Journal));
    }

    #[test]
    fn test_unbound_id_has_no_action() {
        let bindings = HotkeyBindings::from_shortcuts([(Action::Journal, "ctrl+alt+j")]);
        let other = parse_shortcut("ctrl+alt+k").unwrap();
        assert_eq!(bindings.action_for(other.id()), None);
    }
}

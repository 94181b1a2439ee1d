//! Configurable key bindings for the removal dialog.

use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::infra::config::Keybindings;

/// A key plus modifiers, parsed from strings such as `j`, `space`, or `ctrl+r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Whether `key` triggers this binding. Shift is ignored for characters.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        if key.code != self.code {
            return false;
        }
        let mut modifiers = key.modifiers;
        if matches!(key.code, KeyCode::Char(_)) {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        modifiers == self.modifiers
    }
}

impl FromStr for KeyBinding {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(anyhow!("empty key binding"));
        }
        let mut modifiers = KeyModifiers::NONE;
        let mut parts: Vec<&str> = value.split('+').collect();
        // A trailing "+" is the plus key itself.
        let key = if value.ends_with("++") || value == "+" {
            parts.retain(|part| !part.is_empty());
            "+"
        } else {
            parts.pop().unwrap_or_default()
        };
        for part in parts.iter().filter(|part| !part.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                other => return Err(anyhow!("unknown modifier `{other}`")),
            }
        }

        let code = match key.to_ascii_lowercase().as_str() {
            "space" => KeyCode::Char(' '),
            "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            "backspace" => KeyCode::Backspace,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => KeyCode::Char(ch),
                    _ => return Err(anyhow!("unknown key `{key}`")),
                }
            }
        };

        Ok(Self { code, modifiers })
    }
}

/// Dialog actions that can be rebound in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Up,
    Down,
    Toggle,
    ToggleAll,
    Filter,
    Remove,
}

/// Resolved dialog key bindings.
#[derive(Debug, Clone)]
pub struct DialogKeymap {
    bindings: Vec<(KeyBinding, DialogAction)>,
}

impl DialogKeymap {
    pub fn from_config(config: &Keybindings) -> Result<Self> {
        let entries = [
            ("up", config.up(), DialogAction::Up),
            ("down", config.down(), DialogAction::Down),
            ("toggle", config.toggle(), DialogAction::Toggle),
            ("toggle_all", config.toggle_all(), DialogAction::ToggleAll),
            ("filter", config.filter(), DialogAction::Filter),
            ("remove", config.remove(), DialogAction::Remove),
        ];
        let mut bindings = Vec::with_capacity(entries.len());
        for (name, value, action) in entries {
            let binding = value
                .parse::<KeyBinding>()
                .with_context(|| format!("invalid key binding for `{name}`: {value:?}"))?;
            bindings.push((binding, action));
        }
        Ok(Self { bindings })
    }

    /// The action bound to `key`, if any.
    pub fn action(&self, key: &KeyEvent) -> Option<DialogAction> {
        self.bindings
            .iter()
            .find(|(binding, _)| binding.matches(key))
            .map(|(_, action)| *action)
    }
}

impl Default for DialogKeymap {
    fn default() -> Self {
        let ch = |c| KeyBinding::new(KeyCode::Char(c), KeyModifiers::NONE);
        Self {
            bindings: vec![
                (ch('k'), DialogAction::Up),
                (ch('j'), DialogAction::Down),
                (ch(' '), DialogAction::Toggle),
                (ch('a'), DialogAction::ToggleAll),
                (ch('/'), DialogAction::Filter),
                (
                    KeyBinding::new(KeyCode::Char('r'), KeyModifiers::CONTROL),
                    DialogAction::Remove,
                ),
            ],
        }
    }
}

use crate::action::Command;
use std::collections::BTreeMap;

/// Escape, as delivered by terminals.
pub const ESCAPE: char = '\u{1b}';

/// Character-to-command bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: BTreeMap<char, Command>,
}

impl Default for Keymap {
    /// space, s, p, ], [, r, t for the playback commands; h for markers; q or escape to quit.
    fn default() -> Self {
        let bindings = [
            (' ', Command::TogglePause),
            ('s', Command::EnterSimulate),
            ('p', Command::EnterPlayback),
            (']', Command::StepForward),
            ('[', Command::StepBackward),
            ('r', Command::SeekStart),
            ('t', Command::SeekEnd),
            ('h', Command::ToggleMarkers),
            ('q', Command::Quit),
            (ESCAPE, Command::Quit),
        ]
        .into_iter()
        .collect();
        Self { bindings }
    }
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Command bound to `key`, if any.
    pub fn lookup(&self, key: char) -> Option<Command> {
        let command = self.bindings.get(&key).copied();
        if command.is_none() {
            tracing::trace!(?key, "unbound key");
        }
        command
    }

    /// Bind `key`, returning the command it was bound to before.
    pub fn bind(&mut self, key: char, command: Command) -> Option<Command> {
        self.bindings.insert(key, command)
    }

    /// Translate every bound character of `keys`, skipping the rest.
    pub fn parse(&self, keys: &str) -> Vec<Command> {
        keys.chars().filter_map(|k| self.lookup(k)).collect()
    }

    /// Keys bound to `command`, in key order.
    pub fn keys_for(&self, command: Command) -> Vec<char> {
        self.bindings
            .iter()
            .filter(|&(_, &c)| c == command)
            .map(|(&k, _)| k)
            .collect()
    }

    /// Human-readable keybinding table.
    pub fn help(&self) -> String {
        let mut out = String::from("Keybindings:\n\n");
        for command in Command::ALL {
            let keys: Vec<String> = self
                .keys_for(command)
                .into_iter()
                .map(key_name)
                .collect();
            if keys.is_empty() {
                continue;
            }
            out.push_str(&format!("{}: {}.\n", keys.join(", "), command.describe()));
        }
        out
    }
}

fn key_name(key: char) -> String {
    match key {
        ' ' => "space".into(),
        ESCAPE => "escape".into(),
        k => k.to_string(),
    }
}

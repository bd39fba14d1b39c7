// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Key codes to playback commands.

use crate::config::{KeyBindings, ESCAPE_KEY};

/// Operator commands recognised by the session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Forward,
    Backward,
    PlayPause,
    NextProject,
    PreviousProject,
    Quit,
}

impl Command {
    /// Map a raw key code from the display backend. Unbound keys map to `None`.
    pub fn from_key(code: i32, keys: &KeyBindings) -> Option<Self> {
        if code == ESCAPE_KEY {
            return Some(Command::Quit);
        }
        let bound = |c: char| code == c as i32;
        if bound(keys.forward) {
            Some(Command::Forward)
        } else if bound(keys.backward) {
            Some(Command::Backward)
        } else if bound(keys.play_pause) {
            Some(Command::PlayPause)
        } else if bound(keys.next_project) {
            Some(Command::NextProject)
        } else if bound(keys.previous_project) {
            Some(Command::PreviousProject)
        } else if bound(keys.quit) {
            Some(Command::Quit)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let keys = KeyBindings::default();
        assert_eq!(Command::from_key('d' as i32, &keys), Some(Command::Forward));
        assert_eq!(Command::from_key('a' as i32, &keys), Some(Command::Backward));
        assert_eq!(Command::from_key('s' as i32, &keys), Some(Command::PlayPause));
        assert_eq!(Command::from_key('e' as i32, &keys), Some(Command::NextProject));
        assert_eq!(Command::from_key('w' as i32, &keys), Some(Command::PreviousProject));
        assert_eq!(Command::from_key('q' as i32, &keys), Some(Command::Quit));
        assert_eq!(Command::from_key('x' as i32, &keys), None);
    }

    #[test]
    fn test_escape_always_quits() {
        let keys = KeyBindings {
            quit: 'z',
            ..KeyBindings::default()
        };
        assert_eq!(Command::from_key(ESCAPE_KEY, &keys), Some(Command::Quit));
        assert_eq!(Command::from_key('q' as i32, &keys), None);
    }
}

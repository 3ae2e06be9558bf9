use std::collections::HashMap;

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Navigation Keys
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum NavKey {
    Forward,
    Backward,
    Left,
    Right,
    Ascend,
    Descend,
}

/// Held-input flags. Key state is last-write-wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub ascend: bool,
    pub descend: bool,
}

impl InputState {
    pub const fn set(&mut self, key: NavKey, pressed: bool) {
        match key {
            NavKey::Forward => self.forward = pressed,
            NavKey::Backward => self.backward = pressed,
            NavKey::Left => self.left = pressed,
            NavKey::Right => self.right = pressed,
            NavKey::Ascend => self.ascend = pressed,
            NavKey::Descend => self.descend = pressed,
        }
    }

    #[must_use]
    pub const fn is_held(&self, key: NavKey) -> bool {
        match key {
            NavKey::Forward => self.forward,
            NavKey::Backward => self.backward,
            NavKey::Left => self.left,
            NavKey::Right => self.right,
            NavKey::Ascend => self.ascend,
            NavKey::Descend => self.descend,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub const fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right || self.ascend || self.descend
    }
}

// ============================================================================
// Key Bindings
// ============================================================================

/// Maps host key codes (`KeyboardEvent.code` style names) to navigation keys.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct KeyBindings(HashMap<String, NavKey>);

impl Default for KeyBindings {
    fn default() -> Self {
        Self(
            [
                ("KeyW", NavKey::Forward),
                ("ArrowUp", NavKey::Forward),
                ("KeyS", NavKey::Backward),
                ("ArrowDown", NavKey::Backward),
                ("KeyA", NavKey::Left),
                ("ArrowLeft", NavKey::Left),
                ("KeyD", NavKey::Right),
                ("ArrowRight", NavKey::Right),
                ("Space", NavKey::Ascend),
                ("ShiftLeft", NavKey::Descend),
                ("ShiftRight", NavKey::Descend),
            ]
            .into_iter()
            .map(|(code, key)| (code.to_string(), key))
            .collect(),
        )
    }
}

impl KeyBindings {
    #[must_use]
    pub fn resolve(&self, code: &str) -> Option<NavKey> {
        self.0.get(code).copied()
    }

    pub fn bind(&mut self, code: impl Into<String>, key: NavKey) {
        self.0.insert(code.into(), key);
    }

    pub fn unbind(&mut self, code: &str) -> Option<NavKey> {
        self.0.remove(code)
    }
}

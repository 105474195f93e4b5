/// Keyboard input: held-key tracking and WASD chord resolution.
use std::collections::HashSet;

/// Set of currently-held key identifiers, lowercased on entry.
///
/// Keys stay held until the matching key-up is observed; losing window focus
/// mid-press leaves the key stuck until it is released again.
#[derive(Debug, Default)]
pub struct KeySet {
    held: HashSet<String>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: &str) {
        self.held.insert(key.to_lowercase());
    }

    pub fn release(&mut self, key: &str) {
        self.held.remove(&key.to_lowercase());
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

/// Throttle/steer intent derived from the held keys.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KeyboardSample {
    pub throttle: f32,
    pub steer: f32,
}

/// Resolve the WASD chord: `w` beats `s` on throttle, `a` beats `d` on steer,
/// and neither key held means neutral.
pub fn resolve_keys(keys: &KeySet) -> KeyboardSample {
    let throttle = if keys.is_held("w") {
        1.0
    } else if keys.is_held("s") {
        -1.0
    } else {
        0.0
    };
    let steer = if keys.is_held("a") {
        -1.0
    } else if keys.is_held("d") {
        1.0
    } else {
        0.0
    };
    KeyboardSample { throttle, steer }
}

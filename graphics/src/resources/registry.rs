//! Registry of live textures.
//!
//! The device keeps one `TextureRegistry` so that every live texture can be
//! enumerated (for instance to rebuild all of them after the device is lost)
//! without the registry owning any of them. Each texture stores only its own
//! [`TextureKey`]; the registry holds weak references in creation order.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use super::Texture;

/// Key identifying a texture in its device's registry.
///
/// Keys are handed out in increasing order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureKey(u64);

impl TextureKey {
    /// The numeric value of the key.
    pub fn index(&self) -> u64 {
        self.0
    }
}

/// Non-owning collection of live textures, ordered by creation.
#[derive(Debug, Default)]
pub(crate) struct TextureRegistry {
    next_key: u64,
    entries: BTreeMap<TextureKey, Weak<Texture>>,
}

impl TextureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the key for a texture about to be created.
    pub(crate) fn reserve_key(&mut self) -> TextureKey {
        let key = TextureKey(self.next_key);
        self.next_key += 1;
        key
    }

    /// Start tracking a texture under its reserved key.
    pub(crate) fn insert(&mut self, texture: &Arc<Texture>) {
        self.entries.insert(texture.key(), Arc::downgrade(texture));
    }

    /// Stop tracking a texture. Returns false if the key was not tracked.
    pub(crate) fn remove(&mut self, key: TextureKey) -> bool {
        self.entries.remove(&key).is_some()
    }

    /// Returns true if the key is tracked.
    pub fn contains(&self, key: TextureKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Get a tracked texture, if it is still alive.
    pub fn get(&self, key: TextureKey) -> Option<Arc<Texture>> {
        self.entries.get(&key).and_then(Weak::upgrade)
    }

    /// Number of tracked textures that are still alive.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Keys of all tracked textures, in creation order.
    pub fn keys(&self) -> impl Iterator<Item = TextureKey> + '_ {
        self.entries.keys().copied()
    }

    /// Strong references to every live texture, in creation order.
    pub fn live(&self) -> Vec<Arc<Texture>> {
        self.entries.values().filter_map(Weak::upgrade).collect()
    }

    /// Drop entries whose texture no longer exists. Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, w| w.strong_count() > 0);
        before - self.entries.len()
    }
}

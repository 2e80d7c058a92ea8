use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Fixed-capacity, open-addressed, lossy memo table.
///
/// Each key hashes to exactly one slot; a colliding insert overwrites the
/// slot. There is no probing and no eviction policy beyond that, so a
/// lookup miss is always possible and always safe.
#[derive(Debug)]
pub struct Cache<K, V> {
  slots: Vec<Option<(K, V)>>,
}

impl<K: Hash + Eq, V> Cache<K, V> {
  pub fn with_capacity(capacity: usize) -> Cache<K, V> {
    let mut slots = Vec::new();
    slots.resize_with(capacity, || None);
    Cache { slots }
  }

  fn slot(&self, key: &K) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() % self.slots.len() as u64) as usize
  }

  pub fn get(&self, key: &K) -> Option<&V> {
    if self.slots.is_empty() {
      return None;
    }
    match &self.slots[self.slot(key)] {
      Some((stored, value)) if stored == key => Some(value),
      _ => None,
    }
  }

  /// Store a value. The key must not currently be present.
  pub fn insert(&mut self, key: K, value: V) {
    debug_assert!(self.get(&key).is_none());
    if self.slots.is_empty() {
      return;
    }
    let slot = self.slot(&key);
    self.slots[slot] = Some((key, value));
  }
}

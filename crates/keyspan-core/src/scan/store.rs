use std::{collections::BTreeMap, ops::Bound};

///
/// OrderedStore
///
/// Boundary to a byte-ordered key-value store. Implementations iterate
/// keys in ascending byte-lexicographic order.
///

pub trait OrderedStore {
    type Value: Clone;

    /// First entry with `start <= key < stop`; an empty `stop` is unbounded.
    fn first_in(&self, start: &[u8], stop: &[u8]) -> Option<(Vec<u8>, Self::Value)>;
}

///
/// MemoryStore
///
/// `BTreeMap`-backed store for embedding and tests.
///

#[derive(Clone, Debug)]
pub struct MemoryStore<V> {
    entries: BTreeMap<Vec<u8>, V>,
}

impl<V> MemoryStore<V> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: V) -> Option<V> {
        self.entries.insert(key.into(), value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<Vec<u8>>, V> FromIterator<(K, V)> for MemoryStore<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<V: Clone> OrderedStore for MemoryStore<V> {
    type Value = V;

    fn first_in(&self, start: &[u8], stop: &[u8]) -> Option<(Vec<u8>, V)> {
        let upper = if stop.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(stop)
        };
        if let Bound::Excluded(stop) = upper
            && start >= stop
        {
            return None;
        }

        self.entries
            .range::<[u8], _>((Bound::Included(start), upper))
            .next()
            .map(|(key, value)| (key.clone(), value.clone()))
    }
}

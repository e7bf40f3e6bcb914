//! The two emission primitives: `Emitter` (map phase, the in-memory shuffle) and
//! `Collector` (reduce phase). Mappers only ever see an `Emitter` and reducers only a
//! `Collector`, so neither can emit into the wrong phase.

use ahash::RandomState;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

fn fixed_state() -> RandomState {
    // Fixed seeds keep hashing identical across runs.
    RandomState::with_seeds(
        0x6d61_7072_6564_0001,
        0x0f1e_2d3c_4b5a_6978,
        0x5eed_cafe_f00d_beef,
        0x1357_2468_9bdf_aced,
    )
}

/// Intermediate store: key -> values in emission order. Keys iterate in order of
/// first emission.
pub struct Emitter<K, V> {
    index: HashMap<K, usize, RandomState>,
    entries: Vec<(K, Vec<V>)>,
    values: usize,
}

impl<K: Hash + Eq + Clone, V> Default for Emitter<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone, V> Emitter<K, V> {
    pub fn new() -> Self {
        Self { index: HashMap::with_hasher(fixed_state()), entries: Vec::new(), values: 0 }
    }

    /// Append `value` to the list for `key`, creating the list on first use.
    pub fn emit_intermediate(&mut self, key: K, value: V) {
        self.values += 1;
        if let Some(&i) = self.index.get(&key) {
            self.entries[i].1.push(value);
            return;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, vec![value]));
    }

    /// Values emitted so far under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&[V]>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&i| self.entries[i].1.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> + '_ {
        self.entries.iter().map(|(k, vs)| (k, vs.as_slice()))
    }

    /// Distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total `emit_intermediate` calls.
    pub fn value_count(&self) -> usize {
        self.values
    }

    /// Append everything `other` holds, as if its emissions had happened after ours.
    pub fn merge(&mut self, other: Emitter<K, V>) {
        for (key, vs) in other.entries {
            self.values += vs.len();
            match self.index.get(&key) {
                Some(&i) => self.entries[i].1.extend(vs),
                None => {
                    self.index.insert(key.clone(), self.entries.len());
                    self.entries.push((key, vs));
                }
            }
        }
    }

    /// Hand the grouped state to the reduce phase.
    pub fn into_groups(self) -> Vec<(K, Vec<V>)> {
        self.entries
    }
}

/// Result collector: append-only, in emission order.
pub struct Collector<O> {
    items: Vec<O>,
}

impl<O> Default for Collector<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Collector<O> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn emit(&mut self, item: O) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[O] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn append(&mut self, other: Collector<O>) {
        self.items.extend(other.items);
    }

    pub fn into_items(self) -> Vec<O> {
        self.items
    }
}

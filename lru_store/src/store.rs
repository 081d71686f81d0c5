use std::{
    borrow::Borrow,
    hash::Hash,
    num::NonZeroUsize,
};

use tracing::{
    debug,
    trace,
};

use crate::{
    config::StoreConfig,
    error::{
        Result,
        StoreError,
    },
    iter::{
        IntoIter,
        Iter,
        Keys,
        Values,
    },
    linked_hashmap::{
        Entry,
        LinkedHashMap,
    },
};

/// A fixed-capacity key/value store with least-recently-used eviction.
///
/// Entries are kept in a single recency order. The front holds the entry that
/// has gone longest without being used and the back holds the one used most
/// recently. [`set`](Self::set), [`get`](Self::get),
/// [`get_mut`](Self::get_mut) and
/// [`get_or_insert_with`](Self::get_or_insert_with) count as a use and move
/// the entry to the back. [`peek`](Self::peek), [`has`](Self::has) and every
/// iterator leave the order untouched.
///
/// When inserting a new key into a full store, the entry at the front is
/// evicted.
///
/// # Time Complexity
/// - Get/Set/Delete: O(1) average, O(n) worst case
/// - Peek/Has: O(1) average, O(n) worst case
/// - Pop/Clear: O(1)
///
/// # Examples
///
/// ```rust
/// use std::num::NonZeroUsize;
///
/// use lru_store::LruStore;
///
/// let mut store = LruStore::new(NonZeroUsize::new(3).unwrap());
/// store.set("a", 1);
/// store.set("b", 2);
/// store.set("c", 3);
///
/// store.get("a"); // Mark as recently used
/// store.set("d", 4); // Evicts "b"
///
/// assert_eq!(
///     store.entries().collect::<Vec<_>>(),
///     [(&"c", &3), (&"a", &1), (&"d", &4)]
/// );
/// ```
#[derive(Clone)]
pub struct LruStore<K, V> {
    map: LinkedHashMap<K, V>,
    capacity: NonZeroUsize,
}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for LruStore<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruStore")
            .field("capacity", &self.capacity)
            .field("map", &self.map)
            .finish()
    }
}

impl<K: Hash + Eq, V> LruStore<K, V> {
    /// Creates an empty store holding at most `capacity` entries.
    ///
    /// Any non-zero capacity is accepted. Storage for small capacities is
    /// reserved up front; very large ones grow as entries arrive.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use lru_store::LruStore;
    ///
    /// let store: LruStore<String, u64> = LruStore::new(NonZeroUsize::new(100).unwrap());
    /// assert_eq!(store.capacity(), 100);
    /// assert!(store.is_empty());
    /// ```
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            map: LinkedHashMap::with_capacity(capacity.get()),
            capacity,
        }
    }

    /// Creates a store and feeds it `entries` in order, as if by repeated
    /// calls to [`set`](Self::set).
    ///
    /// If `entries` yields more distinct keys than `capacity`, the earliest
    /// ones are evicted and the store ends up holding the last `capacity`
    /// pairs in their original order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use lru_store::LruStore;
    ///
    /// let pairs = [("k0", 0), ("k1", 1), ("k2", 2)];
    /// let store = LruStore::with_entries(NonZeroUsize::new(2).unwrap(), pairs);
    /// assert_eq!(store.keys().collect::<Vec<_>>(), [&"k1", &"k2"]);
    /// ```
    pub fn with_entries<I>(capacity: NonZeroUsize, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut store = Self::new(capacity);
        store.extend(entries);
        debug!(
            capacity = capacity.get(),
            len = store.len(),
            "built store from initial entries"
        );
        store
    }

    /// Like [`new`](Self::new), but takes a plain `usize` and rejects zero.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ZeroCapacity`] if `capacity` is 0.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lru_store::{
    ///     LruStore,
    ///     StoreError,
    /// };
    ///
    /// assert!(LruStore::<u32, u32>::try_new(4).is_ok());
    /// assert_eq!(
    ///     LruStore::<u32, u32>::try_new(0).unwrap_err(),
    ///     StoreError::ZeroCapacity
    /// );
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or(StoreError::ZeroCapacity)?;
        Ok(Self::new(capacity))
    }

    /// Like [`with_entries`](Self::with_entries), but takes a plain `usize`
    /// and rejects zero.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ZeroCapacity`] if `capacity` is 0. `entries` is
    /// not consumed in that case.
    pub fn try_with_entries<I>(capacity: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let capacity = NonZeroUsize::new(capacity).ok_or(StoreError::ZeroCapacity)?;
        Ok(Self::with_entries(capacity, entries))
    }

    /// Builds an empty store from a [`StoreConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ZeroCapacity`] if the configured capacity is 0.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let capacity = config.nonzero_capacity()?;
        let map = if config.preallocate {
            LinkedHashMap::with_capacity(capacity.get())
        } else {
            LinkedHashMap::default()
        };
        debug!(
            capacity = capacity.get(),
            preallocate = config.preallocate,
            "built store from config"
        );
        Ok(Self { map, capacity })
    }

    /// Returns the value for `key` and marks the entry as most recently
    /// used.
    ///
    /// Returns `None` without touching the store if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use lru_store::LruStore;
    ///
    /// let mut store = LruStore::new(NonZeroUsize::new(5).unwrap());
    /// store.set("a", 1);
    /// store.set("b", 2);
    ///
    /// assert_eq!(store.get("a"), Some(&1));
    /// assert_eq!(store.get("z"), None);
    /// assert_eq!(store.entries().collect::<Vec<_>>(), [(&"b", &2), (&"a", &1)]);
    /// ```
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_mut(key).map(|v| &*v)
    }

    /// Mutable version of [`get`](Self::get). Marks the entry as most
    /// recently used.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let ptr = self.map.get_ptr(key)?;
        self.map.move_to_tail(ptr);
        self.map.ptr_get_mut(ptr)
    }

    /// Returns the value for `key` without changing its position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use lru_store::LruStore;
    ///
    /// let mut store = LruStore::new(NonZeroUsize::new(5).unwrap());
    /// store.set("a", 1);
    /// store.set("b", 2);
    ///
    /// assert_eq!(store.peek("a"), Some(&1));
    /// assert_eq!(store.entries().collect::<Vec<_>>(), [(&"a", &1), (&"b", &2)]);
    /// ```
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key)
    }

    /// Mutable version of [`peek`](Self::peek). The entry keeps its position
    /// even if the value is modified.
    pub fn peek_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get_mut(key)
    }

    /// Returns `true` if the store holds `key`. Does not count as a use.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Alias for [`has`](Self::has).
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.has(key)
    }

    /// Stores `value` under `key` and marks the entry as most recently used.
    ///
    /// If `key` is already present its value is replaced in place and
    /// nothing is evicted. Otherwise the entry is appended, and if that
    /// pushes the store over capacity the least recently used entry is
    /// removed and returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use lru_store::LruStore;
    ///
    /// let mut store = LruStore::new(NonZeroUsize::new(2).unwrap());
    /// assert_eq!(store.set("a", 1), None);
    /// assert_eq!(store.set("b", 2), None);
    /// assert_eq!(store.set("a", 10), None); // update, "b" is now oldest
    /// assert_eq!(store.set("c", 3), Some(("b", 2)));
    /// assert_eq!(store.entries().collect::<Vec<_>>(), [(&"a", &10), (&"c", &3)]);
    /// ```
    pub fn set(&mut self, key: K, value: V) -> Option<(K, V)> {
        match self.map.insert_tail(key, value) {
            Some(_) => None,
            None => self.evict_overflow(),
        }
    }

    /// Returns the value for `key`, inserting `or_insert(&key)` first if it
    /// is absent. Either way the entry becomes the most recently used.
    ///
    /// Inserting into a full store evicts the least recently used entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use lru_store::LruStore;
    ///
    /// let mut store = LruStore::new(NonZeroUsize::new(3).unwrap());
    /// let value = store.get_or_insert_with(1, |&key| format!("value_{key}"));
    /// assert_eq!(value, "value_1");
    ///
    /// let value = store.get_or_insert_with(1, |&key| format!("other_{key}"));
    /// assert_eq!(value, "value_1");
    /// ```
    pub fn get_or_insert_with(&mut self, key: K, or_insert: impl FnOnce(&K) -> V) -> &V {
        let ptr = match self.map.entry(key) {
            Entry::Occupied(occupied) => occupied.ptr(),
            Entry::Vacant(vacant) => {
                let value = or_insert(vacant.key());
                vacant.insert_tail(value)
            }
        };
        self.map.move_to_tail(ptr);
        self.evict_overflow();
        &self.map[ptr]
    }

    /// Removes `key`, returning `true` if it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use lru_store::LruStore;
    ///
    /// let mut store = LruStore::new(NonZeroUsize::new(3).unwrap());
    /// store.set("a", 1);
    ///
    /// assert!(store.delete("a"));
    /// assert!(!store.has("a"));
    /// assert!(!store.delete("a"));
    /// ```
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove(key).is_some()
    }

    /// Removes `key` and returns its value, if present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.remove(key).map(|(_, value)| value)
    }

    /// Removes every entry whose predicate returns `false`.
    ///
    /// `f` sees the entries from least to most recently used. Survivors keep
    /// their relative order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use lru_store::LruStore;
    ///
    /// let mut store = LruStore::with_entries(NonZeroUsize::new(5).unwrap(), (1..=5).map(|i| (i, i)));
    /// store.retain(|key, _| key % 2 == 1);
    /// assert_eq!(store.keys().copied().collect::<Vec<_>>(), [1, 3, 5]);
    /// ```
    pub fn retain(&mut self, f: impl FnMut(&K, &mut V) -> bool) {
        self.map.retain(f);
    }

    fn evict_overflow(&mut self) -> Option<(K, V)> {
        if self.map.len() <= self.capacity.get() {
            return None;
        }

        let evicted = self.map.pop_head();
        trace!(
            capacity = self.capacity.get(),
            len = self.map.len(),
            "evicted least recently used entry"
        );
        evicted
    }
}

impl<K, V> LruStore<K, V> {
    /// Removes and returns the least recently used entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use lru_store::LruStore;
    ///
    /// let mut store = LruStore::new(NonZeroUsize::new(3).unwrap());
    /// store.set(1, "one");
    /// store.set(2, "two");
    ///
    /// assert_eq!(store.pop(), Some((1, "one")));
    /// assert_eq!(store.len(), 1);
    /// ```
    pub fn pop(&mut self) -> Option<(K, V)> {
        self.map.pop_head()
    }

    /// Returns the least recently used entry, the next one to be evicted.
    pub fn oldest(&self) -> Option<(&K, &V)> {
        self.map.ptr_get_entry(self.map.head_ptr())
    }

    /// Returns the most recently used entry.
    pub fn newest(&self) -> Option<(&K, &V)> {
        self.map.ptr_get_entry(self.map.tail_ptr())
    }

    /// Removes all entries. The capacity is unchanged.
    pub fn clear(&mut self) {
        debug!(cleared = self.map.len(), "clearing store");
        self.map.clear();
    }

    /// Returns the number of entries currently stored.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Alias for [`len`](Self::len).
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the maximum number of entries the store can hold.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Returns an iterator over `(&K, &V)` from least to most recently used.
    ///
    /// Iterating does not count as a use.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use lru_store::LruStore;
    ///
    /// let mut store = LruStore::new(NonZeroUsize::new(3).unwrap());
    /// store.set("A", 1);
    /// store.set("B", 2);
    /// store.set("C", 3);
    /// store.get("A");
    ///
    /// let items: Vec<_> = store.iter().collect();
    /// assert_eq!(items, [(&"B", &2), (&"C", &3), (&"A", &1)]);
    ///
    /// // Walk from the most recently used instead.
    /// let newest_first: Vec<_> = store.iter().rev().map(|(k, _)| *k).collect();
    /// assert_eq!(newest_first, ["A", "C", "B"]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.map)
    }

    /// Alias for [`iter`](Self::iter).
    pub fn entries(&self) -> Iter<'_, K, V> {
        self.iter()
    }

    /// Returns an iterator over the keys from least to most recently used.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values from least to most recently used.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Calls `f(value, key)` for each entry from least to most recently used.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use lru_store::LruStore;
    ///
    /// let store = LruStore::with_entries(NonZeroUsize::new(2).unwrap(), [("a", 1), ("b", 2)]);
    /// let mut seen = Vec::new();
    /// store.for_each(|value, key| seen.push((*key, *value)));
    /// assert_eq!(seen, [("a", 1), ("b", 2)]);
    /// ```
    pub fn for_each(&self, mut f: impl FnMut(&V, &K)) {
        for (key, value) in self.iter() {
            f(value, key);
        }
    }

    /// Shrinks the internal storage as much as the live entries allow.
    pub fn shrink_to_fit(&mut self) {
        self.map.shrink_to_fit();
    }

    #[doc(hidden)]
    #[cfg(all(debug_assertions, feature = "internal-debugging"))]
    pub fn debug_validate(&self) {
        assert!(
            self.len() <= self.capacity(),
            "Store holds {} entries with capacity {}",
            self.len(),
            self.capacity()
        );
        self.map.debug_validate();
    }
}

impl<K, V> IntoIterator for LruStore<K, V> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    /// Consumes the store, yielding entries from least to most recently
    /// used.
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.map)
    }
}

impl<'a, K, V> IntoIterator for &'a LruStore<K, V> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Hash + Eq, V> Extend<(K, V)> for LruStore<K, V> {
    /// Applies [`LruStore::set`] to each pair in order.
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

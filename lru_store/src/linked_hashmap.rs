use std::{
    borrow::Borrow,
    hash::{
        BuildHasher,
        Hash,
    },
    ops::{
        Index,
        IndexMut,
    },
};

use hashbrown::{
    HashTable,
    hash_table,
};
use slab::Slab;

use crate::RandomState;

/// Index of a node in the slab, with `usize::MAX` standing in for "no node".
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub(crate) struct Ptr(usize);

impl std::fmt::Debug for Ptr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "Ptr(null)")
        } else {
            write!(f, "Ptr({})", self.0)
        }
    }
}

impl Default for Ptr {
    fn default() -> Self {
        Ptr::null()
    }
}

impl Ptr {
    pub(crate) const fn null() -> Self {
        Ptr(usize::MAX)
    }

    pub(crate) fn is_null(self) -> bool {
        self == Ptr::null()
    }

    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert_ne!(index, usize::MAX, "Index must not be usize::MAX");
        Ptr(index)
    }

    pub(crate) fn get(self) -> Option<usize> {
        if self.is_null() { None } else { Some(self.0) }
    }

    pub(crate) fn optional(self) -> Option<Ptr> {
        if self.is_null() { None } else { Some(self) }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LLNode<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    hash: u64,
    pub(crate) prev: Ptr,
    pub(crate) next: Ptr,
}

/// Upper bound on the number of nodes reserved up front.
pub(crate) const MAX_PREALLOCATION: usize = 1 << 16;

/// Hash-indexed doubly linked list.
///
/// The head is the least recently used entry and the tail the most recently
/// used one. `prev` of the head and `next` of the tail are null.
#[derive(Clone)]
pub(crate) struct LinkedHashMap<K, V> {
    head: Ptr,
    tail: Ptr,
    nodes: Slab<LLNode<K, V>>,
    table: HashTable<Ptr>,
    hasher: RandomState,
}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for LinkedHashMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        struct Order<'a, K, V>(&'a LinkedHashMap<K, V>);

        impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for Order<'_, K, V> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut list = f.debug_list();
                let mut ptr = self.0.head;
                while let Some((key, value)) = self.0.ptr_get_entry(ptr) {
                    list.entry(&(key, value));
                    ptr = self.0.next_ptr(ptr).unwrap_or_default();
                }
                list.finish()
            }
        }

        f.debug_struct("LinkedHashMap")
            .field("len", &self.len())
            .field("head", &self.key_for_ptr(self.head))
            .field("tail", &self.key_for_ptr(self.tail))
            .field("order", &Order(self))
            .finish()
    }
}

impl<K, V> Default for LinkedHashMap<K, V> {
    fn default() -> Self {
        LinkedHashMap {
            head: Ptr::null(),
            tail: Ptr::null(),
            nodes: Slab::new(),
            table: HashTable::new(),
            hasher: RandomState::default(),
        }
    }
}

impl<K, V> LinkedHashMap<K, V> {
    /// Reserves room for up to `capacity` nodes, clamped to
    /// [`MAX_PREALLOCATION`]. Anything beyond that is allocated on demand.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_PREALLOCATION);
        LinkedHashMap {
            head: Ptr::null(),
            tail: Ptr::null(),
            nodes: Slab::with_capacity(capacity),
            table: HashTable::with_capacity(capacity),
            hasher: RandomState::default(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.table.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn head_ptr(&self) -> Ptr {
        self.head
    }

    pub(crate) fn tail_ptr(&self) -> Ptr {
        self.tail
    }

    pub(crate) fn next_ptr(&self, ptr: Ptr) -> Option<Ptr> {
        self.nodes.get(ptr.get()?)?.next.optional()
    }

    pub(crate) fn prev_ptr(&self, ptr: Ptr) -> Option<Ptr> {
        self.nodes.get(ptr.get()?)?.prev.optional()
    }

    pub(crate) fn ptr_get(&self, ptr: Ptr) -> Option<&V> {
        Some(&self.nodes.get(ptr.get()?)?.value)
    }

    pub(crate) fn ptr_get_mut(&mut self, ptr: Ptr) -> Option<&mut V> {
        Some(&mut self.nodes.get_mut(ptr.get()?)?.value)
    }

    pub(crate) fn ptr_get_entry(&self, ptr: Ptr) -> Option<(&K, &V)> {
        let node = self.nodes.get(ptr.get()?)?;
        Some((&node.key, &node.value))
    }

    pub(crate) fn key_for_ptr(&self, ptr: Ptr) -> Option<&K> {
        Some(&self.nodes.get(ptr.get()?)?.key)
    }

    fn unlink(&mut self, ptr: Ptr) {
        let node = &mut self.nodes[ptr.0];
        let prev = std::mem::take(&mut node.prev);
        let next = std::mem::take(&mut node.next);

        match prev.get() {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next.get() {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }
    }

    fn link_as_tail(&mut self, ptr: Ptr) {
        let old_tail = self.tail;
        let node = &mut self.nodes[ptr.0];
        node.prev = old_tail;
        node.next = Ptr::null();

        match old_tail.get() {
            Some(old_tail) => self.nodes[old_tail].next = ptr,
            None => self.head = ptr,
        }
        self.tail = ptr;
    }

    /// Relinks `ptr` after the current tail. Returns `None` if `ptr` is not
    /// a live node.
    pub(crate) fn move_to_tail(&mut self, ptr: Ptr) -> Option<()> {
        let index = ptr.get()?;
        if !self.nodes.contains(index) {
            return None;
        }
        if ptr == self.tail {
            return Some(());
        }

        self.unlink(ptr);
        self.link_as_tail(ptr);
        Some(())
    }

    pub(crate) fn remove_ptr(&mut self, ptr: Ptr) -> Option<(K, V)> {
        let index = ptr.get()?;
        if !self.nodes.contains(index) {
            return None;
        }

        self.unlink(ptr);
        let node = self.nodes.remove(index);
        match self.table.find_entry(node.hash, |&p| p == ptr) {
            Ok(occupied) => {
                occupied.remove();
            }
            Err(_) => {
                #[cfg(debug_assertions)]
                unreachable!("Pointer not found in table: {ptr:?}");
            }
        }

        Some((node.key, node.value))
    }

    pub(crate) fn pop_head(&mut self) -> Option<(K, V)> {
        self.remove_ptr(self.head)
    }

    /// Removes every entry for which `f` returns false, walking head to tail.
    pub(crate) fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        let mut ptr = self.head;
        while let Some(index) = ptr.get() {
            let node = &mut self.nodes[index];
            let next = node.next;
            if !f(&node.key, &mut node.value) {
                self.remove_ptr(ptr);
            }
            ptr = next;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.table.clear();
        self.nodes.clear();
        self.head = Ptr::null();
        self.tail = Ptr::null();
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        // Slab only releases trailing vacant slots, live `Ptr`s never move.
        self.table.shrink_to_fit(|ptr| self.nodes[ptr.0].hash);
        self.nodes.shrink_to_fit();
    }

    pub(crate) fn into_parts(self) -> (Slab<LLNode<K, V>>, Ptr, Ptr) {
        (self.nodes, self.head, self.tail)
    }

    #[cfg(all(debug_assertions, feature = "internal-debugging"))]
    pub(crate) fn debug_validate(&self) {
        assert_eq!(
            self.nodes.len(),
            self.table.len(),
            "Slab and table should have the same length"
        );

        if self.is_empty() {
            assert!(self.head.is_null(), "Head of empty map should be null");
            assert!(self.tail.is_null(), "Tail of empty map should be null");
            return;
        }

        assert!(
            self.nodes[self.head.0].prev.is_null(),
            "Head should not have a previous link"
        );
        assert!(
            self.nodes[self.tail.0].next.is_null(),
            "Tail should not have a next link"
        );

        let mut walked = 0;
        let mut prev = Ptr::null();
        let mut ptr = self.head;
        while let Some(index) = ptr.get() {
            let node = &self.nodes[index];
            assert_eq!(node.prev, prev, "Broken back link at {ptr:?}");
            assert!(
                self.table.find(node.hash, |&p| p == ptr).is_some(),
                "Node {ptr:?} is missing from the table"
            );
            walked += 1;
            assert!(walked <= self.len(), "Cycle detected in list");
            prev = ptr;
            ptr = node.next;
        }

        assert_eq!(prev, self.tail, "Walk should end at the tail");
        assert_eq!(walked, self.len(), "Walk should visit every node");
    }
}

impl<K: Hash + Eq, V> LinkedHashMap<K, V> {
    fn hash_key<Q>(&self, key: &Q) -> u64
    where
        Q: Hash + ?Sized,
    {
        self.hasher.hash_one(key)
    }

    pub(crate) fn get_ptr<Q>(&self, key: &Q) -> Option<Ptr>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_key(key);
        self.table
            .find(hash, |ptr| <K as Borrow<Q>>::borrow(&self.nodes[ptr.0].key) == key)
            .copied()
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ptr_get(self.get_ptr(key)?)
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let ptr = self.get_ptr(key)?;
        self.ptr_get_mut(ptr)
    }

    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_ptr(key).is_some()
    }

    pub(crate) fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        let hash = self.hash_key(&key);
        match self.table.entry(
            hash,
            |ptr| self.nodes[ptr.0].key == key,
            |ptr| self.nodes[ptr.0].hash,
        ) {
            hash_table::Entry::Occupied(entry) => Entry::Occupied(OccupiedEntry {
                node: &mut self.nodes[entry.get().0],
                entry,
            }),
            hash_table::Entry::Vacant(entry) => Entry::Vacant(VacantEntry {
                key,
                hash,
                entry,
                nodes: &mut self.nodes,
                head: &mut self.head,
                tail: &mut self.tail,
            }),
        }
    }

    /// Inserts at the tail, or overwrites and moves an existing entry there.
    /// Returns the replaced value.
    pub(crate) fn insert_tail(&mut self, key: K, value: V) -> Option<V> {
        match self.entry(key) {
            Entry::Occupied(occupied) => {
                let ptr = occupied.ptr();
                let old = occupied.insert_no_move(value);
                self.move_to_tail(ptr);
                Some(old)
            }
            Entry::Vacant(vacant) => {
                vacant.insert_tail(value);
                None
            }
        }
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let ptr = self.get_ptr(key)?;
        self.remove_ptr(ptr)
    }
}

impl<K, V> Index<Ptr> for LinkedHashMap<K, V> {
    type Output = V;

    fn index(&self, index: Ptr) -> &Self::Output {
        &self.nodes[index.0].value
    }
}

impl<K, V> IndexMut<Ptr> for LinkedHashMap<K, V> {
    fn index_mut(&mut self, index: Ptr) -> &mut Self::Output {
        &mut self.nodes[index.0].value
    }
}

pub(crate) enum Entry<'a, K, V> {
    Occupied(OccupiedEntry<'a, K, V>),
    Vacant(VacantEntry<'a, K, V>),
}

pub(crate) struct OccupiedEntry<'a, K, V> {
    entry: hash_table::OccupiedEntry<'a, Ptr>,
    node: &'a mut LLNode<K, V>,
}

impl<K, V> OccupiedEntry<'_, K, V> {
    pub(crate) fn ptr(&self) -> Ptr {
        *self.entry.get()
    }

    pub(crate) fn insert_no_move(self, value: V) -> V {
        std::mem::replace(&mut self.node.value, value)
    }
}

pub(crate) struct VacantEntry<'a, K, V> {
    key: K,
    hash: u64,
    entry: hash_table::VacantEntry<'a, Ptr>,
    nodes: &'a mut Slab<LLNode<K, V>>,
    head: &'a mut Ptr,
    tail: &'a mut Ptr,
}

impl<K, V> VacantEntry<'_, K, V> {
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn insert_tail(self, value: V) -> Ptr {
        let prev = *self.tail;
        let ptr = Ptr::from_index(self.nodes.insert(LLNode {
            key: self.key,
            value,
            hash: self.hash,
            prev,
            next: Ptr::null(),
        }));

        match prev.get() {
            Some(prev) => self.nodes[prev].next = ptr,
            None => *self.head = ptr,
        }
        *self.tail = ptr;
        self.entry.insert(ptr);
        ptr
    }
}

//! Property tests comparing `LruStore` against a plain vector model.
//!
//! The model keeps `(key, value)` pairs oldest first and implements every
//! operation by linear search, which makes its behavior easy to trust.

use std::num::NonZeroUsize;

use lru_store::LruStore;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Set { key: u8, value: u32 },
    Get { key: u8 },
    Peek { key: u8 },
    Has { key: u8 },
    Delete { key: u8 },
    Pop,
    Retain { modulus: u8 },
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // A small key space keeps hits, updates and evictions all frequent.
    let key = 0u8..24;
    prop_oneof![
        6 => (key.clone(), any::<u32>()).prop_map(|(key, value)| Op::Set { key, value }),
        3 => key.clone().prop_map(|key| Op::Get { key }),
        2 => key.clone().prop_map(|key| Op::Peek { key }),
        1 => key.clone().prop_map(|key| Op::Has { key }),
        2 => key.prop_map(|key| Op::Delete { key }),
        1 => Just(Op::Pop),
        1 => (2u8..5).prop_map(|modulus| Op::Retain { modulus }),
        1 => Just(Op::Clear),
    ]
}

struct Model {
    capacity: usize,
    entries: Vec<(u8, u32)>,
}

impl Model {
    fn position(&self, key: u8) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    fn set(&mut self, key: u8, value: u32) -> Option<(u8, u32)> {
        if let Some(index) = self.position(key) {
            self.entries.remove(index);
            self.entries.push((key, value));
            return None;
        }
        self.entries.push((key, value));
        if self.entries.len() > self.capacity {
            Some(self.entries.remove(0))
        } else {
            None
        }
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        let index = self.position(key)?;
        let entry = self.entries.remove(index);
        self.entries.push(entry);
        Some(entry.1)
    }

    fn peek(&self, key: u8) -> Option<u32> {
        self.position(key).map(|index| self.entries[index].1)
    }

    fn delete(&mut self, key: u8) -> bool {
        match self.position(key) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    fn pop(&mut self) -> Option<(u8, u32)> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }
}

fn snapshot(store: &LruStore<u8, u32>) -> Vec<(u8, u32)> {
    store.entries().map(|(k, v)| (*k, *v)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Every operation agrees with the model, and the full order agrees after
    // every step.
    #[test]
    fn prop_matches_model(
        capacity in 1usize..12,
        ops in prop::collection::vec(op_strategy(), 1..200),
    ) {
        let mut store = LruStore::new(NonZeroUsize::new(capacity).unwrap());
        let mut model = Model { capacity, entries: Vec::new() };

        for op in ops {
            match op {
                Op::Set { key, value } => {
                    prop_assert_eq!(store.set(key, value), model.set(key, value));
                }
                Op::Get { key } => {
                    prop_assert_eq!(store.get(&key).copied(), model.get(key));
                }
                Op::Peek { key } => {
                    prop_assert_eq!(store.peek(&key).copied(), model.peek(key));
                }
                Op::Has { key } => {
                    prop_assert_eq!(store.has(&key), model.position(key).is_some());
                }
                Op::Delete { key } => {
                    prop_assert_eq!(store.delete(&key), model.delete(key));
                }
                Op::Pop => {
                    prop_assert_eq!(store.pop(), model.pop());
                }
                Op::Retain { modulus } => {
                    store.retain(|k, _| k % modulus != 0);
                    model.entries.retain(|(k, _)| k % modulus != 0);
                }
                Op::Clear => {
                    store.clear();
                    model.entries.clear();
                }
            }

            prop_assert!(store.size() <= store.capacity());
            prop_assert_eq!(store.size(), model.entries.len());
            prop_assert_eq!(snapshot(&store), model.entries.clone());
            prop_assert_eq!(store.oldest().map(|(k, v)| (*k, *v)), model.entries.first().copied());
            prop_assert_eq!(store.newest().map(|(k, v)| (*k, *v)), model.entries.last().copied());
        }
    }

    // Reads through `peek`, `has` and the iterators never change the order.
    #[test]
    fn prop_silent_reads_keep_order(
        keys in prop::collection::vec(0u8..32, 1..40),
        probes in prop::collection::vec(0u8..40, 0..40),
    ) {
        let mut store = LruStore::new(NonZeroUsize::new(16).unwrap());
        for (i, key) in keys.iter().enumerate() {
            store.set(*key, i as u32);
        }

        let before = snapshot(&store);
        for probe in &probes {
            let _ = store.peek(probe);
            let _ = store.has(probe);
            let _ = store.keys().count();
            let _ = store.values().rev().count();
        }
        prop_assert_eq!(snapshot(&store), before);
    }

    // Seeding with more pairs than fit keeps exactly the last `capacity`
    // distinct keys, in the order they were last written.
    #[test]
    fn prop_with_entries_keeps_tail(
        capacity in 1usize..10,
        pairs in prop::collection::vec((0u8..16, any::<u32>()), 0..40),
    ) {
        let store = LruStore::with_entries(NonZeroUsize::new(capacity).unwrap(), pairs.clone());

        let mut model = Model { capacity, entries: Vec::new() };
        for (key, value) in pairs {
            model.set(key, value);
        }
        prop_assert_eq!(snapshot(&store), model.entries);
    }

    // The owned iterator, the borrowed one and `for_each` all agree, in
    // both directions.
    #[test]
    fn prop_iterators_agree(
        pairs in prop::collection::vec((any::<u8>(), any::<u32>()), 0..60),
    ) {
        let store = LruStore::with_entries(NonZeroUsize::new(32).unwrap(), pairs);
        let borrowed = snapshot(&store);

        let mut visited = Vec::new();
        store.for_each(|v, k| visited.push((*k, *v)));
        prop_assert_eq!(&visited, &borrowed);

        let mut reversed: Vec<_> = store.iter().rev().map(|(k, v)| (*k, *v)).collect();
        reversed.reverse();
        prop_assert_eq!(&reversed, &borrowed);

        prop_assert_eq!(store.keys().len(), borrowed.len());
        prop_assert_eq!(store.into_iter().collect::<Vec<_>>(), borrowed);
    }
}

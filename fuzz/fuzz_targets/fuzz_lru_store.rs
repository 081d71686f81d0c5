#![no_main]
use std::num::NonZeroUsize;

use fuzz_lib::{
    Model,
    StoreOperation,
};
use libfuzzer_sys::fuzz_target;
use lru_store::LruStore;

fn snapshot(store: &LruStore<u8, u8>) -> Vec<(u8, u8)> {
    store.iter().map(|(k, v)| (*k, *v)).collect()
}

fuzz_target!(|data: (u8, Vec<StoreOperation>)| {
    let (size, operations) = data;
    let size = size.max(1) as usize;

    let mut store = LruStore::<u8, u8>::new(NonZeroUsize::new(size).unwrap());
    let mut model = Model::new(size);

    for operation in operations {
        store.debug_validate();

        match operation {
            StoreOperation::Set(k, v) => {
                let evicted = store.set(k, v);
                assert_eq!(
                    evicted,
                    model.set(k, v),
                    "Set evicted the wrong entry: {k} {v} {store:#?}"
                );
                assert_eq!(
                    store.newest(),
                    Some((&k, &v)),
                    "Set did not move {k} to the back: {store:#?}"
                );
            }
            StoreOperation::Get(k) => {
                let value = store.get(&k).copied();
                assert_eq!(value, model.touch(k), "Get mismatch for {k}: {store:#?}");
            }
            StoreOperation::GetMut(k, v) => {
                if let Some(value) = store.get_mut(&k) {
                    *value = v;
                }
                if model.touch(k).is_some() {
                    if let Some(last) = model.entries.last_mut() {
                        last.1 = v;
                    }
                }
            }
            StoreOperation::Peek(k) => {
                let before = snapshot(&store);
                let value = store.peek(&k).copied();
                assert_eq!(
                    value,
                    model.position(k).map(|i| model.entries[i].1),
                    "Peek mismatch for {k}: {store:#?}"
                );
                assert_eq!(before, snapshot(&store), "Peek altered the order for {k}");
            }
            StoreOperation::PeekMut(k, v) => {
                if let Some(value) = store.peek_mut(&k) {
                    *value = v;
                }
                if let Some(i) = model.position(k) {
                    model.entries[i].1 = v;
                }
            }
            StoreOperation::Has(k) => {
                assert_eq!(
                    store.has(&k),
                    model.position(k).is_some(),
                    "Has mismatch for {k}: {store:#?}"
                );
            }
            StoreOperation::Delete(k) => {
                let expected = match model.position(k) {
                    Some(i) => {
                        model.entries.remove(i);
                        true
                    }
                    None => false,
                };
                assert_eq!(store.delete(&k), expected, "Delete mismatch for {k}");
                assert!(!store.has(&k), "Store still holds {k} after delete");
            }
            StoreOperation::Pop => {
                let expected = if model.entries.is_empty() {
                    None
                } else {
                    Some(model.entries.remove(0))
                };
                assert_eq!(store.pop(), expected, "Pop returned the wrong entry");
            }
            StoreOperation::Clear => {
                store.clear();
                model.entries.clear();
                assert!(store.is_empty(), "Clear left entries: {store:#?}");
            }
            StoreOperation::GetOrInsertWith(k, v) => {
                let before = store.peek(&k).copied();
                let value = *store.get_or_insert_with(k, |ik| {
                    assert_eq!(k, *ik, "Key mismatch in get_or_insert_with: {ik} != {k}");
                    v
                });
                assert_eq!(value, before.unwrap_or(v));
                if before.is_some() {
                    model.touch(k);
                } else {
                    model.set(k, v);
                }
            }
            StoreOperation::Retain => {
                store.retain(|k, _| k % 2 == 0);
                model.entries.retain(|(k, _)| k % 2 == 0);
            }
            StoreOperation::Iter => {
                let forward = snapshot(&store);
                let mut backward: Vec<_> = store.iter().rev().map(|(k, v)| (*k, *v)).collect();
                backward.reverse();
                assert_eq!(forward, backward, "Iterators disagree: {store:#?}");

                let mut visited = Vec::new();
                store.for_each(|v, k| visited.push((*k, *v)));
                assert_eq!(forward, visited, "for_each disagrees: {store:#?}");
            }
        }

        assert!(store.len() <= size, "Store size exceeded: {store:#?}");
        assert_eq!(store.capacity(), size, "Store capacity altered");
        assert_eq!(snapshot(&store), model.entries, "Order diverged: {store:#?}");
    }

    store.debug_validate();
});

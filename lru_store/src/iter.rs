//! Iterators over an [`LruStore`](crate::LruStore).
//!
//! Every iterator walks the store from the least recently used entry to the
//! most recently used one, and can be reversed to walk the other way. None of
//! them touch the recency order.

use std::iter::FusedIterator;

use slab::Slab;

use crate::linked_hashmap::{
    LLNode,
    LinkedHashMap,
    Ptr,
};

/// Borrowing iterator over `(&K, &V)` pairs in eviction order.
///
/// Created by [`LruStore::iter`](crate::LruStore::iter) and
/// [`LruStore::entries`](crate::LruStore::entries).
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    map: &'a LinkedHashMap<K, V>,
    front: Ptr,
    back: Ptr,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(map: &'a LinkedHashMap<K, V>) -> Self {
        Iter {
            map,
            front: map.head_ptr(),
            back: map.tail_ptr(),
            remaining: map.len(),
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            map: self.map,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let ptr = self.front;
        self.front = self.map.next_ptr(ptr).unwrap_or_default();
        self.remaining -= 1;
        self.map.ptr_get_entry(ptr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let ptr = self.back;
        self.back = self.map.prev_ptr(ptr).unwrap_or_default();
        self.remaining -= 1;
        self.map.ptr_get_entry(ptr)
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Borrowing iterator over keys in eviction order.
///
/// Created by [`LruStore::keys`](crate::LruStore::keys).
#[derive(Debug)]
pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Borrowing iterator over values in eviction order.
///
/// Created by [`LruStore::values`](crate::LruStore::values).
#[derive(Debug)]
pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// Owning iterator over `(K, V)` pairs in eviction order.
///
/// Created by the [`IntoIterator`] implementation of
/// [`LruStore`](crate::LruStore).
pub struct IntoIter<K, V> {
    nodes: Slab<LLNode<K, V>>,
    front: Ptr,
    back: Ptr,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(map: LinkedHashMap<K, V>) -> Self {
        let (nodes, front, back) = map.into_parts();
        IntoIter { nodes, front, back }
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntoIter")
            .field("remaining", &self.nodes.len())
            .finish()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.front.get()?;
        let node = self.nodes.remove(index);

        if self.nodes.is_empty() {
            self.front = Ptr::null();
            self.back = Ptr::null();
        } else {
            self.front = node.next;
        }
        Some((node.key, node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.nodes.len(), Some(self.nodes.len()))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let index = self.back.get()?;
        let node = self.nodes.remove(index);

        if self.nodes.is_empty() {
            self.front = Ptr::null();
            self.back = Ptr::null();
        } else {
            self.back = node.prev;
        }
        Some((node.key, node.value))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

#[cfg(test)]
mod tests {
    use ntest::timeout;

    use super::*;

    fn filled(n: i32) -> LinkedHashMap<i32, String> {
        let mut map = LinkedHashMap::default();
        for i in 0..n {
            map.insert_tail(i, i.to_string());
        }
        map
    }

    #[test]
    #[timeout(1000)]
    fn test_iter_forward_and_back() {
        let map = filled(4);
        let forward: Vec<_> = Iter::new(&map).map(|(k, _)| *k).collect();
        let backward: Vec<_> = Iter::new(&map).rev().map(|(k, _)| *k).collect();
        assert_eq!(forward, [0, 1, 2, 3]);
        assert_eq!(backward, [3, 2, 1, 0]);
    }

    #[test]
    #[timeout(1000)]
    fn test_iter_meets_in_the_middle() {
        let map = filled(5);
        let mut iter = Iter::new(&map);
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next().map(|(k, _)| *k), Some(0));
        assert_eq!(iter.next_back().map(|(k, _)| *k), Some(4));
        assert_eq!(iter.next().map(|(k, _)| *k), Some(1));
        assert_eq!(iter.next_back().map(|(k, _)| *k), Some(3));
        assert_eq!(iter.len(), 1);
        assert_eq!(iter.next().map(|(k, _)| *k), Some(2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    #[timeout(1000)]
    fn test_iter_empty() {
        let map: LinkedHashMap<i32, i32> = LinkedHashMap::default();
        let mut iter = Iter::new(&map);
        assert_eq!(iter.len(), 0);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    #[timeout(1000)]
    fn test_iter_clone_is_independent() {
        let map = filled(3);
        let mut iter = Iter::new(&map);
        iter.next();
        let cloned = iter.clone();
        assert_eq!(iter.count(), 2);
        assert_eq!(cloned.map(|(k, _)| *k).collect::<Vec<_>>(), [1, 2]);
    }

    #[test]
    #[timeout(1000)]
    fn test_keys_and_values() {
        let map = filled(3);
        let keys = Keys {
            inner: Iter::new(&map),
        };
        let values = Values {
            inner: Iter::new(&map),
        };
        assert_eq!(keys.len(), 3);
        assert_eq!(keys.rev().copied().collect::<Vec<_>>(), [2, 1, 0]);
        assert_eq!(values.cloned().collect::<Vec<_>>(), ["0", "1", "2"]);
    }

    #[test]
    #[timeout(1000)]
    fn test_into_iter_after_reordering() {
        let mut map = filled(4);
        map.insert_tail(1, "one".to_string());
        map.remove(&2);

        let items: Vec<_> = IntoIter::new(map).collect();
        assert_eq!(
            items,
            [
                (0, "0".to_string()),
                (3, "3".to_string()),
                (1, "one".to_string())
            ]
        );
    }

    #[test]
    #[timeout(1000)]
    fn test_into_iter_both_ends() {
        let mut iter = IntoIter::new(filled(3));
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next_back(), Some((2, "2".to_string())));
        assert_eq!(iter.next(), Some((0, "0".to_string())));
        assert_eq!(iter.next_back(), Some((1, "1".to_string())));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    #[timeout(1000)]
    fn test_into_iter_partial_drop() {
        let mut iter = IntoIter::new(filled(10));
        assert_eq!(iter.next().map(|(k, _)| k), Some(0));
        drop(iter);
    }
}

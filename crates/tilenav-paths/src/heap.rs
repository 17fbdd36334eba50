//! Fixed-capacity binary min-heap with in-place priority updates.
//!
//! Unlike [`std::collections::BinaryHeap`], [`Heap`] tracks where every item
//! currently sits, which gives O(1) [`contains`](Heap::contains) and an
//! O(log n) [`update_item`](Heap::update_item) after a key improves. Items
//! are identified by a stable arena id ([`HeapItem::heap_id`]); the heap
//! keeps a side table from id to array slot, so ids must be smaller than
//! the capacity and unique among the items currently held.

/// An item that can live in a [`Heap`].
pub trait HeapItem {
    /// Stable identity of the item, `< capacity` of the heap it goes into.
    fn heap_id(&self) -> usize;
}

const VACANT: usize = usize::MAX;

/// Array-backed binary heap; the item comparing smallest is on top.
///
/// Invariants: every parent is `<=` both children, and `slots[id]` is the
/// array index of the item with that id (or `VACANT`).
#[derive(Debug, Clone)]
pub struct Heap<T> {
    items: Vec<T>,
    slots: Vec<usize>,
}

impl<T: HeapItem + Ord> Heap<T> {
    /// Create an empty heap able to hold ids `0..capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            slots: vec![VACANT; capacity],
        }
    }

    /// Maximum number of items (and exclusive upper bound for ids).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The top item without removing it.
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    /// Insert an item.
    ///
    /// # Panics
    ///
    /// If the id is out of range or already present in the heap.
    pub fn add(&mut self, item: T) {
        let id = item.heap_id();
        assert!(
            id < self.capacity(),
            "heap id {id} exceeds capacity {}",
            self.capacity()
        );
        assert!(self.slots[id] == VACANT, "heap id {id} added twice");
        let slot = self.items.len();
        self.items.push(item);
        self.slots[id] = slot;
        self.sift_up(slot);
    }

    /// Remove and return the top item.
    pub fn remove_first(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let last = self.items.len() - 1;
        self.swap(0, last);
        let first = self.items.pop()?;
        self.slots[first.heap_id()] = VACANT;
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        Some(first)
    }

    /// Replace the stored item that has the same id as `item` and restore
    /// order by sifting up.
    ///
    /// Only valid when `item` compares `<=` to the one it replaces (a
    /// priority improvement); a worsened key would break the heap.
    ///
    /// # Panics
    ///
    /// If no item with that id is in the heap.
    pub fn update_item(&mut self, item: T) {
        let id = item.heap_id();
        let slot = self.slots.get(id).copied().unwrap_or(VACANT);
        assert!(slot != VACANT, "heap id {id} is not in the heap");
        debug_assert!(item <= self.items[slot], "update_item must not worsen a key");
        self.items[slot] = item;
        self.sift_up(slot);
    }

    /// Whether an item with the same id is currently in the heap.
    #[inline]
    pub fn contains(&self, item: &T) -> bool {
        let id = item.heap_id();
        match self.slots.get(id) {
            Some(&slot) if slot != VACANT => self.items[slot].heap_id() == id,
            _ => false,
        }
    }

    /// Remove every item, keeping the capacity.
    pub fn clear(&mut self) {
        for item in self.items.drain(..) {
            self.slots[item.heap_id()] = VACANT;
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        self.items.swap(a, b);
        self.slots[self.items[a].heap_id()] = a;
        self.slots[self.items[b].heap_id()] = b;
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.items[i] < self.items[parent] {
                self.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * i + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut best = left;
            if right < len && self.items[right] < self.items[left] {
                best = right;
            }
            if self.items[best] < self.items[i] {
                self.swap(i, best);
                i = best;
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct Entry {
        key: i32,
        id: usize,
    }

    impl HeapItem for Entry {
        fn heap_id(&self) -> usize {
            self.id
        }
    }

    fn check_invariants(h: &Heap<Entry>) {
        for (i, item) in h.items.iter().enumerate() {
            assert_eq!(h.slots[item.id], i, "cached slot out of date");
            if i > 0 {
                assert!(h.items[(i - 1) / 2] <= *item, "parent does not dominate");
            }
        }
        let occupied = h.slots.iter().filter(|&&s| s != VACANT).count();
        assert_eq!(occupied, h.len());
    }

    #[test]
    fn pops_in_order() {
        let mut h = Heap::with_capacity(8);
        for (id, key) in [5, 1, 7, 3, 3, 0].into_iter().enumerate() {
            h.add(Entry { key, id });
        }
        let keys: Vec<i32> = std::iter::from_fn(|| h.remove_first().map(|e| e.key)).collect();
        assert_eq!(keys, vec![0, 1, 3, 3, 5, 7]);
        assert!(h.remove_first().is_none());
    }

    #[test]
    fn update_item_moves_improved_key_to_top() {
        let mut h = Heap::with_capacity(4);
        h.add(Entry { key: 10, id: 0 });
        h.add(Entry { key: 20, id: 1 });
        h.add(Entry { key: 30, id: 2 });
        h.update_item(Entry { key: 5, id: 2 });
        check_invariants(&h);
        assert_eq!(h.peek(), Some(&Entry { key: 5, id: 2 }));
    }

    #[test]
    fn contains_tracks_membership() {
        let mut h = Heap::with_capacity(4);
        let a = Entry { key: 1, id: 0 };
        let b = Entry { key: 2, id: 3 };
        h.add(a);
        h.add(b);
        assert!(h.contains(&a));
        assert!(h.contains(&Entry { key: 99, id: 3 }));
        assert!(!h.contains(&Entry { key: 1, id: 1 }));
        assert!(!h.contains(&Entry { key: 1, id: 100 }));
        h.remove_first();
        assert!(!h.contains(&a));
        h.clear();
        assert!(h.is_empty());
        assert!(!h.contains(&b));
    }

    #[test]
    #[should_panic(expected = "added twice")]
    fn adding_same_id_twice_panics() {
        let mut h = Heap::with_capacity(2);
        h.add(Entry { key: 1, id: 1 });
        h.add(Entry { key: 2, id: 1 });
    }

    #[test]
    #[should_panic(expected = "exceeds capacity")]
    fn id_beyond_capacity_panics() {
        let mut h = Heap::with_capacity(2);
        h.add(Entry { key: 1, id: 2 });
    }

    #[test]
    fn matches_sorted_oracle_under_random_operations() {
        const CAP: usize = 64;
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _round in 0..50 {
            let mut heap = Heap::with_capacity(CAP);
            let mut oracle: Vec<Entry> = Vec::new();
            for _op in 0..400 {
                match rng.random_range(0..3u32) {
                    0 if oracle.len() < CAP => {
                        let free: Vec<usize> = (0..CAP)
                            .filter(|id| !oracle.iter().any(|e| e.id == *id))
                            .collect();
                        let id = free[rng.random_range(0..free.len())];
                        let e = Entry {
                            key: rng.random_range(-100..100),
                            id,
                        };
                        heap.add(e);
                        oracle.push(e);
                    }
                    1 if !oracle.is_empty() => {
                        let k = rng.random_range(0..oracle.len());
                        let improved = Entry {
                            key: oracle[k].key - rng.random_range(0..50),
                            id: oracle[k].id,
                        };
                        heap.update_item(improved);
                        oracle[k] = improved;
                    }
                    _ => {
                        oracle.sort();
                        let expected = if oracle.is_empty() {
                            None
                        } else {
                            Some(oracle.remove(0))
                        };
                        assert_eq!(heap.remove_first(), expected);
                    }
                }
                assert_eq!(heap.len(), oracle.len());
                check_invariants(&heap);
            }
        }
    }
}

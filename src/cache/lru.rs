//! LRU Tracker Module
//!
//! Recency ordering for cache eviction, kept as a doubly-linked list whose
//! nodes live in a slot arena and are addressed by stable index handles.

// == LRU Handle ==
/// Stable reference to a key's position in the recency list.
///
/// A handle stays valid until the key is removed or evicted; after that its
/// slot may be reused for another key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LruHandle(usize);

#[derive(Debug)]
struct Slot {
    key: String,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// Every operation is O(1).
#[derive(Debug, Default)]
pub struct LruTracker {
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty tracker with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    // == Push Front ==
    /// Inserts a key at the most-recently-used position.
    ///
    /// The caller owns uniqueness: pushing a key that is already tracked
    /// creates a second, independent position.
    pub fn push_front(&mut self, key: String) -> LruHandle {
        let slot = Slot {
            key,
            prev: None,
            next: self.head,
        };

        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(slot);
                idx
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };

        if let Some(old_head) = self.head {
            self.slot_mut(old_head).prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
        self.len += 1;

        LruHandle(idx)
    }

    // == Touch ==
    /// Marks a key as recently used (moves it to the head).
    pub fn touch(&mut self, handle: LruHandle) {
        if self.head == Some(handle.0) {
            return;
        }
        self.unlink(handle.0);
        let old_head = self.head;
        {
            let slot = self.slot_mut(handle.0);
            slot.prev = None;
            slot.next = old_head;
        }
        if let Some(old_head) = old_head {
            self.slot_mut(old_head).prev = Some(handle.0);
        }
        self.head = Some(handle.0);
        if self.tail.is_none() {
            self.tail = Some(handle.0);
        }
    }

    // == Remove ==
    /// Removes a key from the tracker, returning it.
    ///
    /// Returns `None` for a handle whose slot is already vacant.
    pub fn remove(&mut self, handle: LruHandle) -> Option<String> {
        self.slots.get(handle.0)?.as_ref()?;
        self.unlink(handle.0);
        let slot = self.slots[handle.0].take()?;
        self.free.push(handle.0);
        self.len -= 1;
        Some(slot.key)
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let tail = self.tail?;
        self.remove(LruHandle(tail))
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&str> {
        let tail = self.tail?;
        self.slots[tail].as_ref().map(|slot| slot.key.as_str())
    }

    /// Returns the key stored behind `handle`, if the slot is occupied.
    pub fn key(&self, handle: LruHandle) -> Option<&str> {
        self.slots
            .get(handle.0)?
            .as_ref()
            .map(|slot| slot.key.as_str())
    }

    /// Iterates keys from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let idx = cursor?;
            let slot = self.slots[idx].as_ref()?;
            cursor = slot.next;
            Some(slot.key.as_str())
        })
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Detaches a slot from its neighbours and fixes up head/tail.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let slot = self.slot_mut(idx);
            (slot.prev.take(), slot.next.take())
        };

        match prev {
            Some(prev) => self.slot_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slot_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }

    fn slot_mut(&mut self, idx: usize) -> &mut Slot {
        match self.slots[idx].as_mut() {
            Some(slot) => slot,
            None => unreachable!("linked slot {idx} is vacant"),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn order(lru: &LruTracker) -> Vec<&str> {
        lru.iter().collect()
    }

    #[test]
    fn test_lru_new() {
        let lru = LruTracker::new();
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.peek_oldest(), None);
    }

    #[test]
    fn test_lru_push_front() {
        let mut lru = LruTracker::new();

        lru.push_front("key1".to_string());
        lru.push_front("key2".to_string());
        lru.push_front("key3".to_string());

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.peek_oldest(), Some("key1"));
        assert_eq!(order(&lru), vec!["key3", "key2", "key1"]);
    }

    #[test]
    fn test_lru_touch_existing_key() {
        let mut lru = LruTracker::new();

        let k1 = lru.push_front("key1".to_string());
        lru.push_front("key2".to_string());
        lru.push_front("key3".to_string());

        lru.touch(k1);

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.peek_oldest(), Some("key2"));
        assert_eq!(order(&lru), vec!["key1", "key3", "key2"]);
    }

    #[test]
    fn test_lru_touch_head_is_noop() {
        let mut lru = LruTracker::new();

        lru.push_front("a".to_string());
        let b = lru.push_front("b".to_string());
        lru.touch(b);

        assert_eq!(order(&lru), vec!["b", "a"]);
    }

    #[test]
    fn test_lru_touch_tail_single_element() {
        let mut lru = LruTracker::new();

        let a = lru.push_front("a".to_string());
        lru.touch(a);

        assert_eq!(order(&lru), vec!["a"]);
        assert_eq!(lru.peek_oldest(), Some("a"));
    }

    #[test]
    fn test_lru_evict_oldest() {
        let mut lru = LruTracker::new();

        lru.push_front("key1".to_string());
        lru.push_front("key2".to_string());
        lru.push_front("key3".to_string());

        assert_eq!(lru.evict_oldest(), Some("key1".to_string()));
        assert_eq!(lru.len(), 2);

        assert_eq!(lru.evict_oldest(), Some("key2".to_string()));
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_lru_evict_empty() {
        let mut lru = LruTracker::new();
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_remove_middle() {
        let mut lru = LruTracker::new();

        lru.push_front("key1".to_string());
        let k2 = lru.push_front("key2".to_string());
        lru.push_front("key3".to_string());

        assert_eq!(lru.remove(k2), Some("key2".to_string()));

        assert_eq!(lru.len(), 2);
        assert_eq!(order(&lru), vec!["key3", "key1"]);
    }

    #[test]
    fn test_lru_remove_twice_is_harmless() {
        let mut lru = LruTracker::new();

        let k1 = lru.push_front("key1".to_string());
        lru.push_front("key2".to_string());

        assert!(lru.remove(k1).is_some());
        assert!(lru.remove(k1).is_none());
        assert_eq!(lru.len(), 1);
        assert_eq!(order(&lru), vec!["key2"]);
    }

    #[test]
    fn test_lru_slots_are_reused() {
        let mut lru = LruTracker::with_capacity(2);

        let a = lru.push_front("a".to_string());
        lru.remove(a);
        let b = lru.push_front("b".to_string());

        assert_eq!(a, b);
        assert_eq!(lru.key(b), Some("b"));
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_lru_order_after_multiple_touches() {
        let mut lru = LruTracker::new();

        let a = lru.push_front("a".to_string());
        let b = lru.push_front("b".to_string());
        let c = lru.push_front("c".to_string());

        // [c, b, a] -> touch a -> [a, c, b] -> touch c -> [c, a, b] -> touch b -> [b, c, a]
        lru.touch(a);
        lru.touch(c);
        lru.touch(b);

        assert_eq!(lru.evict_oldest(), Some("a".to_string()));
        assert_eq!(lru.evict_oldest(), Some("c".to_string()));
        assert_eq!(lru.evict_oldest(), Some("b".to_string()));
        assert!(lru.is_empty());
    }
}

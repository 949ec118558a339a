//! Recency list: a doubly linked list whose nodes live in a [`SlotArena`].
//!
//! Nodes are addressed by [`SlotId`], so callers can keep a position and
//! later move or unlink it in O(1) without raw pointers. The front is the
//! most recently placed node, the back the oldest.
//!
//! ```text
//!   arena slot   value   links.prev   links.next
//!   ─────────────────────────────────────────────
//!   #0           A       -            #2
//!   #2           B       #0           #1
//!   #1           C       #2           -
//!
//!   front ─► #0 ◄──► #2 ◄──► #1 ◄── back
//! ```
//!
//! Every operation is O(1) except iteration and `drain_with`.

use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Links {
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    links: Links,
}

/// Arena-backed doubly linked list with stable node ids.
#[derive(Debug)]
pub struct IntrusiveList<T> {
    nodes: SlotArena<Node<T>>,
    front: Option<SlotId>,
    back: Option<SlotId>,
}

impl<T> Default for IntrusiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntrusiveList<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Reserves room for `capacity` nodes up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotArena::with_capacity(capacity),
            front: None,
            back: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.nodes.contains(id)
    }

    pub fn front_id(&self) -> Option<SlotId> {
        self.front
    }

    pub fn back_id(&self) -> Option<SlotId> {
        self.back
    }

    pub fn front(&self) -> Option<&T> {
        self.get(self.front?)
    }

    pub fn back(&self) -> Option<&T> {
        self.get(self.back?)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.nodes.get(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.nodes.get_mut(id).map(|node| &mut node.value)
    }

    /// Walks front to back, yielding each node id with its value.
    pub fn iter_entries(&self) -> impl Iterator<Item = (SlotId, &T)> + '_ {
        let mut cursor = self.front;
        std::iter::from_fn(move || {
            let id = cursor?;
            let node = self.nodes.get(id)?;
            cursor = node.links.next;
            Some((id, &node.value))
        })
    }

    pub fn push_front(&mut self, value: T) -> SlotId {
        let id = self.nodes.insert(Node {
            value,
            links: Links::default(),
        });
        self.splice_front(id);
        id
    }

    pub fn pop_back(&mut self) -> Option<(SlotId, T)> {
        let id = self.back?;
        let value = self.remove(id)?;
        Some((id, value))
    }

    /// Unlinks `id` and returns its value. `None` if the id is stale.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let links = self.unlink(id)?;
        debug_assert_eq!(links, Links::default());
        self.nodes.remove(id).map(|node| node.value)
    }

    /// Relinks `id` at the front. Returns `false` if the id is stale.
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if self.front == Some(id) {
            return true;
        }
        if self.unlink(id).is_none() {
            return false;
        }
        self.splice_front(id);
        true
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.front = None;
        self.back = None;
    }

    /// Empties the list, handing each value to `f` from front to back.
    ///
    /// Each node is fully unlinked before `f` sees it, so a panic in `f`
    /// leaves the remaining nodes as a valid list.
    pub fn drain_with(&mut self, mut f: impl FnMut(SlotId, T)) {
        while let Some(id) = self.front {
            let Some(value) = self.remove(id) else {
                break;
            };
            f(id, value);
        }
        self.clear();
    }

    fn links_mut(&mut self, id: SlotId) -> Option<&mut Links> {
        self.nodes.get_mut(id).map(|node| &mut node.links)
    }

    /// Links a detached node in as the new front.
    fn splice_front(&mut self, id: SlotId) {
        let old_front = self.front;
        if let Some(links) = self.links_mut(id) {
            *links = Links {
                prev: None,
                next: old_front,
            };
        }
        match old_front.and_then(|front| self.links_mut(front)) {
            Some(links) => links.prev = Some(id),
            None => self.back = Some(id),
        }
        self.front = Some(id);
    }

    /// Detaches `id` from its neighbours, leaving it with empty links.
    /// Returns the links it now holds, or `None` for a stale id.
    fn unlink(&mut self, id: SlotId) -> Option<Links> {
        let Links { prev, next } = std::mem::take(self.links_mut(id)?);

        match prev.and_then(|p| self.links_mut(p)) {
            Some(links) => links.next = next,
            None => self.front = next,
        }
        match next.and_then(|n| self.links_mut(n)) {
            Some(links) => links.prev = prev,
            None => self.back = prev,
        }
        self.nodes.get(id).map(|node| node.links)
    }

    /// Panics if the links disagree with the arena or with each other.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.front.is_none(), self.back.is_none());

        let mut expected_prev = None;
        let mut walked = 0usize;
        for (id, _) in self.iter_entries() {
            walked += 1;
            assert!(walked <= self.len(), "cycle in recency list");
            let links = self.nodes.get(id).map(|node| node.links);
            assert_eq!(links.and_then(|l| l.prev), expected_prev);
            expected_prev = Some(id);
        }

        assert_eq!(expected_prev, self.back);
        assert_eq!(walked, self.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order<T: Copy>(list: &IntrusiveList<T>) -> Vec<T> {
        list.iter_entries().map(|(_, value)| *value).collect()
    }

    fn abc() -> (IntrusiveList<&'static str>, [SlotId; 3]) {
        let mut list = IntrusiveList::new();
        let c = list.push_front("c");
        let b = list.push_front("b");
        let a = list.push_front("a");
        (list, [a, b, c])
    }

    #[test]
    fn push_front_places_newest_first() {
        let (list, _) = abc();
        assert_eq!(order(&list), vec!["a", "b", "c"]);
        assert_eq!(list.front(), Some(&"a"));
        assert_eq!(list.back(), Some(&"c"));
        list.debug_validate_invariants();
    }

    #[test]
    fn move_to_front_from_each_position() {
        let (mut list, [a, b, c]) = abc();

        assert!(list.move_to_front(a));
        assert_eq!(order(&list), vec!["a", "b", "c"]);

        assert!(list.move_to_front(c));
        assert_eq!(order(&list), vec!["c", "a", "b"]);
        assert_eq!(list.back_id(), Some(b));

        assert!(list.move_to_front(b));
        assert_eq!(order(&list), vec!["b", "c", "a"]);
        list.debug_validate_invariants();
    }

    #[test]
    fn remove_relinks_neighbours() {
        let (mut list, [a, b, c]) = abc();

        assert_eq!(list.remove(b), Some("b"));
        assert_eq!(order(&list), vec!["a", "c"]);

        assert_eq!(list.remove(a), Some("a"));
        assert_eq!(list.front_id(), Some(c));
        assert_eq!(list.back_id(), Some(c));

        assert_eq!(list.remove(c), Some("c"));
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        list.debug_validate_invariants();
    }

    #[test]
    fn pop_back_returns_oldest() {
        let (mut list, [a, b, c]) = abc();
        assert_eq!(list.pop_back(), Some((c, "c")));
        list.move_to_front(a);
        assert_eq!(list.pop_back(), Some((b, "b")));
        assert_eq!(list.pop_back(), Some((a, "a")));
        assert_eq!(list.pop_back(), None);
    }

    #[test]
    fn stale_ids_are_rejected() {
        let mut list = IntrusiveList::new();
        let old = list.push_front(1);
        list.remove(old);
        let new = list.push_front(2);

        assert_eq!(old.index(), new.index());
        assert!(!list.contains(old));
        assert!(!list.move_to_front(old));
        assert_eq!(list.remove(old), None);
        assert_eq!(list.get(new), Some(&2));
    }

    #[test]
    fn drain_with_visits_front_to_back() {
        let (mut list, ids) = abc();
        let mut seen = Vec::new();
        list.drain_with(|id, value| seen.push((id, value)));

        assert_eq!(seen, vec![(ids[0], "a"), (ids[1], "b"), (ids[2], "c")]);
        assert!(list.is_empty());
        assert_eq!(list.front_id(), None);
        list.debug_validate_invariants();
    }

    #[test]
    fn panic_in_drain_callback_leaves_valid_list() {
        let (mut list, [_, b, c]) = abc();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            list.drain_with(|_, value| {
                if value == "b" {
                    panic!("callback failed");
                }
            });
        }));

        assert!(result.is_err());
        assert_eq!(list.len(), 1);
        assert!(!list.contains(b));
        assert_eq!(list.front_id(), Some(c));
        assert_eq!(list.back_id(), Some(c));
        list.debug_validate_invariants();
    }

    #[test]
    fn clear_then_reuse() {
        let (mut list, [a, ..]) = abc();
        list.clear();
        assert!(!list.contains(a));
        assert_eq!(list.pop_back(), None);

        list.push_front("d");
        assert_eq!(order(&list), vec!["d"]);
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut list = IntrusiveList::new();
        let id = list.push_front(10);
        *list.get_mut(id).unwrap() += 5;
        assert_eq!(list.get(id), Some(&15));
    }
}

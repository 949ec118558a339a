//! Bounded recency queue with observer notifications.
//!
//! `EvictionQueue` keeps elements ordered from most recently used (front) to
//! least recently used (back). Inserting into a full queue evicts the back
//! element first. Every mutation is reported to the per-call hook and then to
//! each registered [`QueueObserver`], in registration order.
//!
//! ## Architecture
//!
//! ```text
//!   EvictionQueue<T>
//!   ┌──────────────────────────────────────────────────────────┐
//!   │ id: QueueId            (unique per queue, lives in handles)│
//!   │ list: IntrusiveList<T> front = MRU, back = LRU            │
//!   │ observers: Vec<Box<dyn QueueObserver<T> + Send>>          │
//!   └──────────────────────────────────────────────────────────┘
//!
//!   insert(v), len == capacity:
//!     pop back ─► Deleted{Evicted} ─► push front ─► Inserted
//!
//!   transfer(h, dest):
//!     unlink h ─► Deleted{Transferred} (source) ─► dest.insert ─► Inserted (dest)
//! ```
//!
//! ## Handles
//!
//! A [`QueueHandle`] names one element of one queue. It carries the owning
//! queue's id and a generational slot id, so a handle from another queue, or
//! one whose element is gone, is detected rather than aliasing a live element.
//! Mutating calls panic on such handles; lookups return `None`.
//!
//! ## Capacity zero
//!
//! A zero-capacity queue accepts the insert, reports `Inserted`, and then
//! evicts the element straight away. The returned handle is already stale.
//!
//! ## Purge
//!
//! [`EvictionQueue::purge`] drops all elements and observers without
//! notifying anyone. The queue is unusable afterwards: mutating calls panic,
//! read-only calls see an empty queue.
//!
//! ## Performance
//! - `insert` / `touch` / `remove` / `transfer`: O(1) plus observer cost
//! - `clear`: O(n)

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{debug, trace};

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::observer::{BoxedObserver, NoopObserver, QueueEvent, QueueObserver, RemovalCause};
use crate::ds::slot_arena::SlotId;
use crate::error::InvariantError;

static NEXT_QUEUE_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique identity of an [`EvictionQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueId(u32);

impl QueueId {
    fn next() -> Self {
        Self(NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Reference to one element of one queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueHandle {
    queue: QueueId,
    slot: SlotId,
}

impl QueueHandle {
    /// Id of the queue that issued this handle.
    pub fn queue_id(self) -> QueueId {
        self.queue
    }
}

pub struct EvictionQueue<T> {
    id: QueueId,
    list: IntrusiveList<T>,
    capacity: usize,
    observers: Vec<BoxedObserver<T>>,
    evictions: u64,
    purged: bool,
}

fn notify<T, H>(hook: &mut H, observers: &mut [BoxedObserver<T>], event: QueueEvent<'_, T>)
where
    H: QueueObserver<T> + ?Sized,
{
    hook.on_event(event);
    for observer in observers.iter_mut() {
        observer.on_event(event);
    }
}

impl<T> EvictionQueue<T> {
    /// Creates an empty queue holding at most `capacity` elements.
    pub fn new(capacity: usize) -> Self {
        Self::with_observers(capacity, Vec::new())
    }

    /// Creates an empty queue with observers already registered.
    pub fn with_observers(capacity: usize, observers: Vec<BoxedObserver<T>>) -> Self {
        Self {
            id: QueueId::next(),
            list: IntrusiveList::with_capacity(capacity),
            capacity,
            observers,
            evictions: 0,
            purged: false,
        }
    }

    /// Registers an observer; it sees every event after those already registered.
    pub fn add_observer<O>(&mut self, observer: O)
    where
        O: QueueObserver<T> + Send + 'static,
    {
        self.assert_live("add_observer");
        self.observers.push(Box::new(observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn id(&self) -> QueueId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Number of elements dropped from the back to make room.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn is_purged(&self) -> bool {
        self.purged
    }

    /// Returns `true` if `handle` names a live element of this queue.
    pub fn contains(&self, handle: QueueHandle) -> bool {
        handle.queue == self.id && self.list.contains(handle.slot)
    }

    pub fn get(&self, handle: QueueHandle) -> Option<&T> {
        if handle.queue != self.id {
            return None;
        }
        self.list.get(handle.slot)
    }

    pub fn get_mut(&mut self, handle: QueueHandle) -> Option<&mut T> {
        if handle.queue != self.id {
            return None;
        }
        self.list.get_mut(handle.slot)
    }

    /// Most recently used element.
    pub fn front(&self) -> Option<(QueueHandle, &T)> {
        let slot = self.list.front_id()?;
        self.list.get(slot).map(|value| (self.handle(slot), value))
    }

    /// Least recently used element; the next eviction victim.
    pub fn back(&self) -> Option<(QueueHandle, &T)> {
        let slot = self.list.back_id()?;
        self.list.get(slot).map(|value| (self.handle(slot), value))
    }

    /// Iterates from front (MRU) to back (LRU).
    pub fn iter(&self) -> impl Iterator<Item = (QueueHandle, &T)> + '_ {
        let id = self.id;
        self.list
            .iter_entries()
            .map(move |(slot, value)| (QueueHandle { queue: id, slot }, value))
    }

    pub fn insert(&mut self, value: T) -> QueueHandle {
        self.insert_with(value, &mut NoopObserver)
    }

    /// Inserts `value` at the front, evicting the back element first if the
    /// queue is full. `hook` sees every event before the registered observers.
    pub fn insert_with<H>(&mut self, value: T, hook: &mut H) -> QueueHandle
    where
        H: QueueObserver<T> + ?Sized,
    {
        self.assert_live("insert");
        if self.capacity > 0 && self.list.len() >= self.capacity {
            self.evict_back(hook);
        }

        let slot = self.list.push_front(value);
        let handle = self.handle(slot);
        if let Some(value) = self.list.get(slot) {
            notify(
                hook,
                &mut self.observers,
                QueueEvent::Inserted { handle, value },
            );
        }

        if self.capacity == 0 {
            self.evict_back(hook);
        }
        handle
    }

    pub fn touch(&mut self, handle: QueueHandle) {
        self.touch_with(handle, &mut NoopObserver)
    }

    /// Moves the element to the front.
    ///
    /// # Panics
    ///
    /// If `handle` is stale, belongs to another queue, or the queue was purged.
    pub fn touch_with<H>(&mut self, handle: QueueHandle, hook: &mut H)
    where
        H: QueueObserver<T> + ?Sized,
    {
        let slot = self.live_slot(handle, "touch");
        self.list.move_to_front(slot);
        if let Some(value) = self.list.get(slot) {
            notify(
                hook,
                &mut self.observers,
                QueueEvent::Touched { handle, value },
            );
        }
    }

    pub fn remove(&mut self, handle: QueueHandle) -> T {
        self.remove_with(handle, &mut NoopObserver)
    }

    /// Unlinks the element and returns it.
    ///
    /// # Panics
    ///
    /// If `handle` is stale, belongs to another queue, or the queue was purged.
    pub fn remove_with<H>(&mut self, handle: QueueHandle, hook: &mut H) -> T
    where
        H: QueueObserver<T> + ?Sized,
    {
        self.take(handle, RemovalCause::Removed, hook, "remove")
    }

    pub fn transfer(&mut self, handle: QueueHandle, dest: &mut EvictionQueue<T>) -> QueueHandle {
        self.transfer_with(handle, dest, &mut NoopObserver)
    }

    /// Moves the element to the front of `dest`.
    ///
    /// The source reports `Deleted { Transferred }`, then `dest` inserts the
    /// value as usual, which may evict from `dest`. The returned handle
    /// belongs to `dest`; it is stale if `dest` has zero capacity.
    ///
    /// # Panics
    ///
    /// If `handle` is not a live element of this queue, or either queue was purged.
    pub fn transfer_with<H>(
        &mut self,
        handle: QueueHandle,
        dest: &mut EvictionQueue<T>,
        hook: &mut H,
    ) -> QueueHandle
    where
        H: QueueObserver<T> + ?Sized,
    {
        dest.assert_live("transfer");
        let value = self.take(handle, RemovalCause::Transferred, hook, "transfer");
        dest.insert_with(value, hook)
    }

    pub fn clear(&mut self) {
        self.clear_with(&mut NoopObserver)
    }

    /// Drops every element front to back, reporting `Deleted { Cleared }` for each.
    pub fn clear_with<H>(&mut self, hook: &mut H)
    where
        H: QueueObserver<T> + ?Sized,
    {
        self.assert_live("clear");
        let id = self.id;
        let observers = &mut self.observers;
        self.list.drain_with(|slot, value| {
            notify(
                hook,
                observers.as_mut_slice(),
                QueueEvent::Deleted {
                    handle: QueueHandle { queue: id, slot },
                    value: &value,
                    cause: RemovalCause::Cleared,
                },
            );
        });
    }

    /// Releases all elements and observers. Idempotent.
    pub fn purge(&mut self) {
        if self.purged {
            return;
        }
        let released = self.list.len();
        self.list = IntrusiveList::new();
        self.observers = Vec::new();
        self.purged = true;
        debug!(queue = self.id.get(), released, "purged eviction queue");
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.purged {
            if !self.list.is_empty() || !self.observers.is_empty() {
                return Err(InvariantError::new(
                    "purged queue still holds elements or observers",
                ));
            }
            return Ok(());
        }
        if self.capacity > 0 && self.list.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "queue {} holds {} elements, capacity is {}",
                self.id.get(),
                self.list.len(),
                self.capacity
            )));
        }
        if self.capacity == 0 && !self.list.is_empty() {
            return Err(InvariantError::new("zero-capacity queue holds elements"));
        }
        let walked = self.list.iter_entries().count();
        if walked != self.list.len() {
            return Err(InvariantError::new(format!(
                "list walk found {walked} elements, len is {}",
                self.list.len()
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.list.debug_validate_invariants();
        assert!(self.list.len() <= self.capacity);
    }

    fn handle(&self, slot: SlotId) -> QueueHandle {
        QueueHandle {
            queue: self.id,
            slot,
        }
    }

    fn assert_live(&self, op: &str) {
        assert!(!self.purged, "EvictionQueue::{op} called after purge");
    }

    fn live_slot(&self, handle: QueueHandle, op: &str) -> SlotId {
        self.assert_live(op);
        assert_eq!(
            handle.queue, self.id,
            "EvictionQueue::{op}: handle belongs to another queue"
        );
        assert!(
            self.list.contains(handle.slot),
            "EvictionQueue::{op}: stale handle {handle:?}"
        );
        handle.slot
    }

    fn take<H>(&mut self, handle: QueueHandle, cause: RemovalCause, hook: &mut H, op: &str) -> T
    where
        H: QueueObserver<T> + ?Sized,
    {
        let slot = self.live_slot(handle, op);
        let Some(value) = self.list.remove(slot) else {
            unreachable!("live slot vanished during {op}");
        };
        notify(
            hook,
            &mut self.observers,
            QueueEvent::Deleted {
                handle,
                value: &value,
                cause,
            },
        );
        value
    }

    fn evict_back<H>(&mut self, hook: &mut H)
    where
        H: QueueObserver<T> + ?Sized,
    {
        let Some((slot, value)) = self.list.pop_back() else {
            return;
        };
        self.evictions += 1;
        let handle = self.handle(slot);
        trace!(
            queue = self.id.get(),
            len = self.list.len(),
            capacity = self.capacity,
            "evicted back element"
        );
        notify(
            hook,
            &mut self.observers,
            QueueEvent::Deleted {
                handle,
                value: &value,
                cause: RemovalCause::Evicted,
            },
        );
    }
}

impl<T> fmt::Debug for EvictionQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvictionQueue")
            .field("id", &self.id)
            .field("len", &self.list.len())
            .field("capacity", &self.capacity)
            .field("observers", &self.observers.len())
            .field("purged", &self.purged)
            .finish_non_exhaustive()
    }
}

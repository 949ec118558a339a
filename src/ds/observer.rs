//! Observer contract for [`EvictionQueue`](crate::ds::EvictionQueue).
//!
//! Every queue mutation is reported as a [`QueueEvent`]. Observers receive
//! events synchronously, before the queue call returns:
//!
//! ```text
//!   queue.insert_with(v, hook)
//!     │
//!     ├─ (evict back)  ─► hook ─► observer[0] ─► observer[1] ...   Deleted { Evicted }
//!     └─ (push front)  ─► hook ─► observer[0] ─► observer[1] ...   Inserted
//! ```
//!
//! The per-call hook is how a cache façade keeps its lookup index in step with
//! the queue; registered observers are for instrumentation. Observers only get
//! `&mut self`, so they cannot call back into the queue that is notifying them.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ds::eviction_queue::QueueHandle;

/// Why an element left a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// Dropped from the back to make room for an insert.
    Evicted,
    /// Removed explicitly by handle.
    Removed,
    /// Moved into another queue.
    Transferred,
    /// Dropped by `clear`.
    Cleared,
}

/// A single queue mutation, carrying the affected handle and value.
pub enum QueueEvent<'a, T> {
    Inserted {
        handle: QueueHandle,
        value: &'a T,
    },
    Touched {
        handle: QueueHandle,
        value: &'a T,
    },
    Deleted {
        handle: QueueHandle,
        value: &'a T,
        cause: RemovalCause,
    },
}

impl<'a, T> QueueEvent<'a, T> {
    /// Handle of the element the event is about. Stale for `Deleted`.
    pub fn handle(&self) -> QueueHandle {
        match *self {
            QueueEvent::Inserted { handle, .. }
            | QueueEvent::Touched { handle, .. }
            | QueueEvent::Deleted { handle, .. } => handle,
        }
    }

    pub fn value(&self) -> &'a T {
        match *self {
            QueueEvent::Inserted { value, .. }
            | QueueEvent::Touched { value, .. }
            | QueueEvent::Deleted { value, .. } => value,
        }
    }

    pub fn is_eviction(&self) -> bool {
        matches!(
            self,
            QueueEvent::Deleted {
                cause: RemovalCause::Evicted,
                ..
            }
        )
    }
}

impl<T> Clone for QueueEvent<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for QueueEvent<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for QueueEvent<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueEvent::Inserted { handle, value } => f
                .debug_struct("Inserted")
                .field("handle", handle)
                .field("value", value)
                .finish(),
            QueueEvent::Touched { handle, value } => f
                .debug_struct("Touched")
                .field("handle", handle)
                .field("value", value)
                .finish(),
            QueueEvent::Deleted {
                handle,
                value,
                cause,
            } => f
                .debug_struct("Deleted")
                .field("handle", handle)
                .field("value", value)
                .field("cause", cause)
                .finish(),
        }
    }
}

/// Receives queue events synchronously.
///
/// Implementations must not assume anything about the queue beyond the event
/// itself; the queue is mutably borrowed for the duration of the call.
pub trait QueueObserver<T> {
    fn on_event(&mut self, event: QueueEvent<'_, T>);
}

impl<T, O> QueueObserver<T> for &mut O
where
    O: QueueObserver<T> + ?Sized,
{
    fn on_event(&mut self, event: QueueEvent<'_, T>) {
        (**self).on_event(event)
    }
}

impl<T, O> QueueObserver<T> for Box<O>
where
    O: QueueObserver<T> + ?Sized,
{
    fn on_event(&mut self, event: QueueEvent<'_, T>) {
        (**self).on_event(event)
    }
}

/// Observer owned by a queue once registered.
pub type BoxedObserver<T> = Box<dyn QueueObserver<T> + Send>;

/// Ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl<T> QueueObserver<T> for NoopObserver {
    #[inline]
    fn on_event(&mut self, _event: QueueEvent<'_, T>) {}
}

/// An observer backed by a closure.
///
/// ```
/// use evictkit::ds::{EvictionQueue, FnObserver, QueueEvent};
///
/// let mut queue = EvictionQueue::new(1);
/// queue.add_observer(FnObserver(|event: QueueEvent<'_, u32>| {
///     if event.is_eviction() {
///         println!("evicted {}", event.value());
///     }
/// }));
/// queue.insert(1);
/// queue.insert(2);
/// ```
pub struct FnObserver<F>(pub F);

impl<T, F> QueueObserver<T> for FnObserver<F>
where
    F: FnMut(QueueEvent<'_, T>),
{
    fn on_event(&mut self, event: QueueEvent<'_, T>) {
        (self.0)(event)
    }
}

impl<F> fmt::Debug for FnObserver<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnObserver").finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct Counts {
    inserted: AtomicU64,
    touched: AtomicU64,
    deleted: AtomicU64,
    evicted: AtomicU64,
}

/// Counts events by kind. Clones share the same counters, so one clone can be
/// registered on a queue while another is kept for reading.
///
/// ```
/// use evictkit::ds::{EventCounter, EvictionQueue};
///
/// let counter = EventCounter::new();
/// let mut queue = EvictionQueue::new(2);
/// queue.add_observer(counter.clone());
///
/// queue.insert("a");
/// queue.insert("b");
/// queue.insert("c");
///
/// assert_eq!(counter.inserted(), 3);
/// assert_eq!(counter.evicted(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct EventCounter {
    counts: Arc<Counts>,
}

impl EventCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inserted(&self) -> u64 {
        self.counts.inserted.load(Ordering::Relaxed)
    }

    pub fn touched(&self) -> u64 {
        self.counts.touched.load(Ordering::Relaxed)
    }

    /// All deletions, evictions included.
    pub fn deleted(&self) -> u64 {
        self.counts.deleted.load(Ordering::Relaxed)
    }

    pub fn evicted(&self) -> u64 {
        self.counts.evicted.load(Ordering::Relaxed)
    }
}

impl<T> QueueObserver<T> for EventCounter {
    fn on_event(&mut self, event: QueueEvent<'_, T>) {
        let counter = match event {
            QueueEvent::Inserted { .. } => &self.counts.inserted,
            QueueEvent::Touched { .. } => &self.counts.touched,
            QueueEvent::Deleted { cause, .. } => {
                if cause == RemovalCause::Evicted {
                    self.counts.evicted.fetch_add(1, Ordering::Relaxed);
                }
                &self.counts.deleted
            },
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

pub mod eviction_queue;
pub mod intrusive_list;
pub mod observer;
pub mod slot_arena;

pub use eviction_queue::{EvictionQueue, QueueHandle, QueueId};
pub use intrusive_list::IntrusiveList;
pub use observer::{
    BoxedObserver, EventCounter, FnObserver, NoopObserver, QueueEvent, QueueObserver, RemovalCause,
};
pub use slot_arena::{SlotArena, SlotId};

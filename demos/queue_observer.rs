use evictkit::ds::{EvictionQueue, FnObserver, QueueEvent};

fn main() {
    let mut queue: EvictionQueue<&'static str> = EvictionQueue::new(2);
    queue.add_observer(FnObserver(|event: QueueEvent<'_, &'static str>| match event {
        QueueEvent::Inserted { value, .. } => println!("inserted {value}"),
        QueueEvent::Touched { value, .. } => println!("touched {value}"),
        QueueEvent::Deleted { value, cause, .. } => println!("deleted {value} ({cause:?})"),
    }));

    let a = queue.insert("a");
    queue.insert("b");
    queue.touch(a);
    queue.insert("c");

    let mut spill = EvictionQueue::new(4);
    let oldest = queue.back().map(|(handle, _)| handle);
    if let Some(handle) = oldest {
        queue.transfer(handle, &mut spill);
    }
    println!("queue={} spill={}", queue.len(), spill.len());

    queue.clear();
    assert!(queue.is_empty());
}

// Expected output:
// inserted a
// inserted b
// touched a
// deleted b (Evicted)
// inserted c
// deleted a (Transferred)
// queue=1 spill=1
// deleted c (Cleared)

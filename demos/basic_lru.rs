use evictkit::ds::EventCounter;
use evictkit::policy::lru::SimpleLru;
use evictkit::traits::{CoreCache, LruCacheTrait};

fn main() {
    let evictions = EventCounter::new();
    let mut cache: SimpleLru<u32, String> = SimpleLru::new(2);
    cache.add_observer(evictions.clone());

    cache.insert(1, "alpha".to_string());
    cache.insert(2, "beta".to_string());

    if let Some(value) = cache.get(&1) {
        println!("hit 1: {value}");
    }

    cache.insert(3, "gamma".to_string());

    println!("contains 2? {}", cache.contains(&2));
    println!("lru entry: {:?}", cache.peek_lru());
    println!("evictions: {}", evictions.evicted());
}

// Expected output:
// hit 1: alpha
// contains 2? false
// lru entry: Some((1, "alpha"))
// evictions: 1
//
// Explanation: capacity=2; after get(&1), key 1 is MRU and key 2 is LRU.
// Inserting key 3 evicts key 2, leaving key 1 at the LRU end.

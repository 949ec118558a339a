use evictkit::policy::lru_k::LrukCache;
use evictkit::traits::{CoreCache, LrukCacheTrait};

fn main() {
    // k=2, two history slots, two protected slots.
    let mut cache: LrukCache<&str, u32> = LrukCache::new(2, 2, 2);

    cache.insert("hot", 1);
    cache.get(&"hot");
    cache.get(&"hot");
    println!("hot tier: {:?}", cache.tier_of(&"hot"));

    for (i, key) in ["scan-a", "scan-b", "scan-c"].into_iter().enumerate() {
        cache.insert(key, i as u32);
    }

    println!("hot survives scan? {}", cache.contains(&"hot"));
    println!("scan-a survives scan? {}", cache.contains(&"scan-a"));
    println!(
        "history={} cache={}",
        cache.history_len(),
        cache.cache_len()
    );
}

// Expected output:
// hot tier: Some(Cache)
// hot survives scan? true
// scan-a survives scan? false
// history=2 cache=1
//
// Explanation: two gets promote "hot" into the protected tier. The scan only
// churns the two-slot history tier, evicting "scan-a".

pub(crate) use super::*;

fn rule(a: &str, c: &str) -> AssociationRule {
    AssociationRule {
        antecedent_item: a.to_string(),
        consequent_item: c.to_string(),
        support: 0.5,
        confidence: 1.0,
        lift: 2.0,
    }
}

#[test]
fn test_cache_key_equality() {
    assert_eq!(CacheKey::new(10, 0.01, 0.1), CacheKey::new(10, 0.01, 0.1));
    assert_ne!(CacheKey::new(10, 0.01, 0.1), CacheKey::new(11, 0.01, 0.1));
    assert_ne!(CacheKey::new(10, 0.01, 0.1), CacheKey::new(10, 0.02, 0.1));
    assert_ne!(CacheKey::new(10, 0.01, 0.1), CacheKey::new(10, 0.01, 0.2));
}

#[test]
fn test_cache_key_accessors() {
    let key = CacheKey::new(42, 0.05, 0.3);
    assert_eq!(key.transaction_count(), 42);
    assert_eq!(key.min_support(), 0.05);
    assert_eq!(key.min_confidence(), 0.3);
    assert_eq!(key.to_string(), "association_rules_42_0.05_0.3");
}

#[test]
fn test_no_cache_always_misses() {
    let cache = NoCache;
    let key = CacheKey::new(1, 0.1, 0.1);
    cache.set(key, vec![rule("a", "b")], Duration::from_secs(60));
    assert!(cache.get(&key).is_none());
}

#[test]
fn test_in_memory_hit_returns_rules_verbatim() {
    let cache = InMemoryRuleCache::new();
    let key = CacheKey::new(3, 0.5, 0.1);
    let rules = vec![rule("b", "a"), rule("a", "b")];
    cache.set(key, rules.clone(), Duration::from_secs(60));

    assert_eq!(cache.get(&key), Some(rules));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn test_in_memory_miss() {
    let cache = InMemoryRuleCache::new();
    assert!(cache.get(&CacheKey::new(3, 0.5, 0.1)).is_none());
    assert_eq!(cache.stats().misses, 1);
    assert!(cache.is_empty());
}

#[test]
fn test_in_memory_expired_entry_misses() {
    let cache = InMemoryRuleCache::new();
    let key = CacheKey::new(3, 0.5, 0.1);
    cache.set(key, vec![rule("a", "b")], Duration::ZERO);

    assert!(cache.get(&key).is_none());
    assert!(cache.is_empty(), "expired entry removed on lookup");
    let stats = cache.stats();
    assert_eq!(stats.expirations, 1);
    assert_eq!(stats.misses, 1);
}

#[test]
fn test_purge_expired() {
    let cache = InMemoryRuleCache::new();
    cache.set(CacheKey::new(1, 0.5, 0.1), vec![], Duration::ZERO);
    cache.set(CacheKey::new(2, 0.5, 0.1), vec![], Duration::from_secs(3600));

    assert_eq!(cache.purge_expired(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_invalidate_all() {
    let cache = InMemoryRuleCache::new();
    cache.set(CacheKey::new(1, 0.5, 0.1), vec![rule("a", "b")], Duration::from_secs(60));
    cache.set(CacheKey::new(2, 0.5, 0.1), vec![rule("a", "b")], Duration::from_secs(60));
    cache.invalidate_all();
    assert!(cache.is_empty());
}

#[test]
fn test_hit_rate() {
    let cache = InMemoryRuleCache::new();
    assert_eq!(cache.stats().hit_rate(), 0.0);

    let key = CacheKey::new(1, 0.5, 0.1);
    cache.set(key, vec![], Duration::from_secs(60));
    let _ = cache.get(&key);
    let _ = cache.get(&key);
    let _ = cache.get(&CacheKey::new(9, 0.5, 0.1));

    assert!((cache.stats().hit_rate() - 0.666).abs() < 0.01);
}

#[test]
fn test_shared_through_arc() {
    let cache = Arc::new(InMemoryRuleCache::new());
    let handle = Arc::clone(&cache);
    let key = CacheKey::new(5, 0.1, 0.1);
    handle.set(key, vec![rule("x", "y")], Duration::from_secs(60));
    assert!(RuleCache::get(&cache, &key).is_some());
}

#[test]
fn test_capacity_evicts_least_recently_used() {
    let cache = InMemoryRuleCache::new().with_max_entries(2);
    let ttl = Duration::from_secs(60);
    let (k1, k2, k3) = (
        CacheKey::new(1, 0.5, 0.1),
        CacheKey::new(2, 0.5, 0.1),
        CacheKey::new(3, 0.5, 0.1),
    );

    cache.set(k1, vec![rule("a", "b")], ttl);
    std::thread::sleep(Duration::from_millis(2));
    cache.set(k2, vec![rule("c", "d")], ttl);
    std::thread::sleep(Duration::from_millis(2));
    // Touch k1 so k2 becomes the oldest access
    assert!(cache.get(&k1).is_some());
    std::thread::sleep(Duration::from_millis(2));
    cache.set(k3, vec![rule("e", "f")], ttl);

    assert_eq!(cache.len(), 2);
    assert!(cache.get(&k1).is_some());
    assert!(cache.get(&k2).is_none());
    assert!(cache.get(&k3).is_some());
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_capacity_evicts_least_frequently_used() {
    let cache = InMemoryRuleCache::new()
        .with_max_entries(2)
        .with_policy(EvictionPolicy::LFU);
    let ttl = Duration::from_secs(60);
    let (k1, k2, k3) = (
        CacheKey::new(1, 0.5, 0.1),
        CacheKey::new(2, 0.5, 0.1),
        CacheKey::new(3, 0.5, 0.1),
    );

    cache.set(k1, vec![], ttl);
    cache.set(k2, vec![], ttl);
    let _ = cache.get(&k1);
    let _ = cache.get(&k1);
    let _ = cache.get(&k2);
    cache.set(k3, vec![], ttl);

    assert!(cache.get(&k1).is_some());
    assert!(cache.get(&k2).is_none());
}

#[test]
fn test_fixed_policy_rejects_new_keys_when_full() {
    let cache = InMemoryRuleCache::new()
        .with_max_entries(1)
        .with_policy(EvictionPolicy::Fixed);
    let ttl = Duration::from_secs(60);
    let (k1, k2) = (CacheKey::new(1, 0.5, 0.1), CacheKey::new(2, 0.5, 0.1));

    cache.set(k1, vec![rule("a", "b")], ttl);
    cache.set(k2, vec![rule("c", "d")], ttl);
    assert!(cache.get(&k2).is_none());
    assert_eq!(cache.stats().rejected, 1);

    // Overwriting an existing key is not an insert
    cache.set(k1, vec![rule("x", "y")], ttl);
    assert_eq!(cache.get(&k1), Some(vec![rule("x", "y")]));
    assert!(!EvictionPolicy::Fixed.supports_eviction());
}

#[test]
fn test_set_purges_expired_entries() {
    let cache = InMemoryRuleCache::new();
    for count in 0..10 {
        cache.set(CacheKey::new(count, 0.5, 0.1), vec![], Duration::ZERO);
    }
    // Each insert drops the previous expired entry
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().expirations, 9);
}

#[test]
fn test_growing_transaction_counts_stay_bounded() {
    let cache = InMemoryRuleCache::new().with_max_entries(8);
    for count in 0..200 {
        cache.set(CacheKey::new(count, 0.5, 0.1), vec![rule("a", "b")], Duration::from_secs(60));
        assert!(cache.len() <= 8);
    }
    assert_eq!(cache.stats().evictions, 192);
    assert!(cache.get(&CacheKey::new(199, 0.5, 0.1)).is_some());
}

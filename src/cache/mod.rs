//! Rule-list cache.
//!
//! Mining results are memoized by the shape of the request: how many
//! transactions went in and which thresholds were used. The engine only
//! talks to the [`RuleCache`] trait, so the backing store is the caller's
//! choice:
//!
//! - [`InMemoryRuleCache`]: process-local map with per-entry TTL and a
//!   capacity bound enforced by an [`EvictionPolicy`]
//! - [`NoCache`]: always misses
//!
//! A hit returns the stored rule list verbatim.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::mining::AssociationRule;

/// Identity of a mining request.
///
/// Thresholds are kept as raw `f64` bits so the key is `Eq + Hash`; two
/// requests share an entry only when their thresholds are bit-identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    transaction_count: usize,
    min_support_bits: u64,
    min_confidence_bits: u64,
}

impl CacheKey {
    /// Key for `transaction_count` transactions mined at the given thresholds.
    #[must_use]
    pub fn new(transaction_count: usize, min_support: f64, min_confidence: f64) -> Self {
        Self {
            transaction_count,
            min_support_bits: min_support.to_bits(),
            min_confidence_bits: min_confidence.to_bits(),
        }
    }

    /// Number of transactions mined.
    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    /// Minimum support threshold.
    #[must_use]
    pub fn min_support(&self) -> f64 {
        f64::from_bits(self.min_support_bits)
    }

    /// Minimum confidence threshold.
    #[must_use]
    pub fn min_confidence(&self) -> f64 {
        f64::from_bits(self.min_confidence_bits)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "association_rules_{}_{}_{}",
            self.transaction_count,
            self.min_support(),
            self.min_confidence()
        )
    }
}

/// Key-value store for mined rule lists.
///
/// Implementations use interior mutability so one cache can be shared by
/// concurrent callers.
pub trait RuleCache {
    /// Cached rules for `key`, or `None` on a miss or expired entry.
    fn get(&self, key: &CacheKey) -> Option<Vec<AssociationRule>>;

    /// Store `rules` under `key` for `ttl`.
    fn set(&self, key: CacheKey, rules: Vec<AssociationRule>, ttl: Duration);
}

impl<C: RuleCache + ?Sized> RuleCache for Arc<C> {
    fn get(&self, key: &CacheKey) -> Option<Vec<AssociationRule>> {
        (**self).get(key)
    }

    fn set(&self, key: CacheKey, rules: Vec<AssociationRule>, ttl: Duration) {
        (**self).set(key, rules, ttl);
    }
}

/// Cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl RuleCache for NoCache {
    fn get(&self, _key: &CacheKey) -> Option<Vec<AssociationRule>> {
        None
    }

    fn set(&self, _key: CacheKey, _rules: Vec<AssociationRule>, _ttl: Duration) {}
}

/// Default cap on stored rule lists.
pub const DEFAULT_MAX_ENTRIES: usize = 64;

/// Which entry makes room when the cache is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EvictionPolicy {
    /// Least Recently Used: evicts the entry read or written longest ago
    #[default]
    LRU,

    /// Least Frequently Used: evicts the entry with the fewest hits,
    /// oldest access first on ties
    LFU,

    /// No eviction: new keys are dropped once the cache is full
    Fixed,
}

impl EvictionPolicy {
    /// Get human-readable description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::LRU => "Least Recently Used - evicts oldest accessed entry",
            Self::LFU => "Least Frequently Used - evicts least accessed entry",
            Self::Fixed => "Fixed - no eviction, new keys rejected when full",
        }
    }

    /// Check if this policy supports eviction
    #[must_use]
    pub const fn supports_eviction(&self) -> bool {
        !matches!(self, Self::Fixed)
    }
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing usable
    pub misses: u64,
    /// Entries dropped because their TTL ran out
    pub expirations: u64,
    /// Entries dropped to stay within capacity
    pub evictions: u64,
    /// New keys not stored because a `Fixed` cache was full
    pub rejected: u64,
}

impl CacheStats {
    /// Get hit rate (0.0 - 1.0)
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone)]
struct CachedRules {
    rules: Vec<AssociationRule>,
    cached_at: Instant,
    ttl: Duration,
    last_access: Instant,
    hits: u64,
}

impl CachedRules {
    /// Entries are valid while their age is strictly below the TTL.
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.cached_at) >= self.ttl
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, CachedRules>,
    stats: CacheStats,
}

impl CacheState {
    fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let purged = before - self.entries.len();
        self.stats.expirations += purged as u64;
        purged
    }

    fn victim(&self, policy: EvictionPolicy) -> Option<CacheKey> {
        let entries = self.entries.iter();
        match policy {
            EvictionPolicy::LRU => entries
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(key, _)| *key),
            EvictionPolicy::LFU => entries
                .min_by_key(|(_, entry)| (entry.hits, entry.last_access))
                .map(|(key, _)| *key),
            EvictionPolicy::Fixed => None,
        }
    }
}

/// Process-local rule cache with per-entry TTL and a capacity bound.
///
/// Expired entries are removed on lookup and before every insert. When
/// a new key arrives at capacity, the [`EvictionPolicy`] picks the entry
/// to drop.
#[derive(Debug)]
pub struct InMemoryRuleCache {
    state: Mutex<CacheState>,
    max_entries: usize,
    policy: EvictionPolicy,
}

impl Default for InMemoryRuleCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRuleCache {
    /// Create an empty LRU cache holding up to [`DEFAULT_MAX_ENTRIES`] lists
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            max_entries: DEFAULT_MAX_ENTRIES,
            policy: EvictionPolicy::default(),
        }
    }

    /// Set the capacity (at least one entry).
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// Set the eviction policy.
    #[must_use]
    pub fn with_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Capacity in entries.
    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Eviction policy.
    #[must_use]
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    fn state(&self) -> std::sync::MutexGuard<'_, CacheState> {
        // A panic mid-update leaves at worst a stale entry
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }

    /// Snapshot of the cache counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.state().stats
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) {
        let mut state = self.state();
        let dropped = state.entries.len();
        state.entries.clear();
        tracing::debug!(dropped, "rule cache invalidated");
    }

    /// Remove expired entries, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        self.state().purge_expired(Instant::now())
    }
}

impl RuleCache for InMemoryRuleCache {
    fn get(&self, key: &CacheKey) -> Option<Vec<AssociationRule>> {
        let now = Instant::now();
        let mut guard = self.state();
        let state = &mut *guard;

        let expired = match state.entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.last_access = now;
                entry.hits += 1;
                let rules = entry.rules.clone();
                state.stats.hits += 1;
                return Some(rules);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            state.entries.remove(key);
            state.stats.expirations += 1;
        }
        state.stats.misses += 1;
        None
    }

    fn set(&self, key: CacheKey, rules: Vec<AssociationRule>, ttl: Duration) {
        let now = Instant::now();
        let mut state = self.state();
        state.purge_expired(now);

        if !state.entries.contains_key(&key) && state.entries.len() >= self.max_entries {
            match state.victim(self.policy) {
                Some(victim) => {
                    state.entries.remove(&victim);
                    state.stats.evictions += 1;
                    tracing::debug!(%victim, policy = ?self.policy, "evicted cached rules");
                }
                None => {
                    state.stats.rejected += 1;
                    tracing::debug!(%key, "rule cache full, entry not stored");
                    return;
                }
            }
        }

        let entry = CachedRules {
            rules,
            cached_at: now,
            ttl,
            last_access: now,
            hits: 0,
        };
        state.entries.insert(key, entry);
    }
}

#[cfg(test)]
mod tests;

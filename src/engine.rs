//! Association rule engine: extraction, mining, caching and persistence.
//!
//! ```text
//! orders ──► TransactionExtractor ──► FrequentItemsetMiner ──► RuleGenerator
//!                                              ▲                    │
//!                                          RuleCache ◄──────────────┤
//!                                                                   ▼
//!                                               RulePersister ──► RuleStore
//! ```
//!
//! The engine owns no global state: cache, lock and store are injected,
//! so it is a pure function of its inputs plus those collaborators.

use serde::{Deserialize, Serialize};

use crate::cache::{CacheKey, InMemoryRuleCache, RuleCache};
use crate::config::MiningConfig;
use crate::error::Result;
use crate::lock::{InMemoryRebuildLock, RebuildGuard, RebuildLock};
use crate::mining::{self, sort_rules, AssociationRule};
use crate::store::{InMemoryRuleStore, RulePersister, RuleStore};
use crate::transaction::{Order, Transaction, TransactionExtractor};

/// Thresholds for one mining or rebuild request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum support
    pub min_support: f64,
    /// Minimum confidence
    pub min_confidence: f64,
    /// Lift floor for persisted rules
    pub min_lift: f64,
}

impl From<&MiningConfig> for Thresholds {
    fn from(config: &MiningConfig) -> Self {
        Self {
            min_support: config.min_support,
            min_confidence: config.min_confidence,
            min_lift: config.min_lift,
        }
    }
}

/// Counts reported by a completed rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildSummary {
    /// Transactions mined after extraction and caps
    pub transactions: usize,
    /// Rules produced by the miner
    pub rules_mined: usize,
    /// Rows written to the store after lift and duplicate filtering
    pub rules_created: usize,
}

/// Result of asking for a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// The rule table was replaced.
    Completed(RebuildSummary),
    /// Another rebuild holds the lock; nothing was done.
    AlreadyInProgress,
}

impl RebuildOutcome {
    /// Summary of a completed rebuild.
    #[must_use]
    pub fn summary(&self) -> Option<&RebuildSummary> {
        match self {
            Self::Completed(summary) => Some(summary),
            Self::AlreadyInProgress => None,
        }
    }
}

/// Mines, caches and persists association rules.
///
/// # Example
///
/// ```
/// use basket_rules::config::MiningConfig;
/// use basket_rules::engine::{AssociationRuleEngine, RebuildOutcome};
/// use basket_rules::transaction::Order;
///
/// let engine = AssociationRuleEngine::in_memory(
///     MiningConfig::new().with_min_support(0.5),
/// ).unwrap();
///
/// let orders = vec![
///     Order::from_items(["tea", "honey"]),
///     Order::from_items(["tea", "honey"]),
///     Order::from_items(["tea", "lemon"]),
/// ];
/// let outcome = engine.rebuild(&orders, &engine.default_thresholds()).unwrap();
/// assert!(matches!(outcome, RebuildOutcome::Completed(_)));
/// assert!(!engine.stored_rules().unwrap().is_empty());
/// ```
#[derive(Debug)]
pub struct AssociationRuleEngine<C = InMemoryRuleCache, L = InMemoryRebuildLock, S = InMemoryRuleStore>
{
    config: MiningConfig,
    cache: C,
    lock: L,
    store: S,
}

impl AssociationRuleEngine {
    /// Engine backed by in-memory cache, lock and store. The cache is
    /// sized from the configuration.
    pub fn in_memory(config: MiningConfig) -> Result<Self> {
        let cache = InMemoryRuleCache::new()
            .with_max_entries(config.cache_max_entries)
            .with_policy(config.cache_policy);
        Self::new(
            config,
            cache,
            InMemoryRebuildLock::new(),
            InMemoryRuleStore::new(),
        )
    }
}

impl<C: RuleCache, L: RebuildLock, S: RuleStore> AssociationRuleEngine<C, L, S> {
    /// Create an engine after validating `config`.
    pub fn new(config: MiningConfig, cache: C, lock: L, store: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache,
            lock,
            store,
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    /// Injected cache.
    #[must_use]
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Injected rebuild lock.
    #[must_use]
    pub fn lock(&self) -> &L {
        &self.lock
    }

    /// Injected rule store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Thresholds taken from the configuration.
    #[must_use]
    pub fn default_thresholds(&self) -> Thresholds {
        Thresholds::from(&self.config)
    }

    /// Extractor carrying the configured caps.
    #[must_use]
    pub fn extractor(&self) -> TransactionExtractor {
        TransactionExtractor::new()
            .with_max_transactions(self.config.max_transactions)
            .with_max_items_per_transaction(self.config.max_items_per_transaction)
    }

    /// Mine rules with the configured thresholds.
    #[must_use]
    pub fn mine(&self, transactions: &[Transaction]) -> Vec<AssociationRule> {
        self.mine_with(
            transactions,
            self.config.min_support,
            self.config.min_confidence,
        )
    }

    /// Mine rules at explicit thresholds, consulting the cache first.
    ///
    /// Caps are applied before the cache key is computed, so the key
    /// reflects what was actually mined. Fewer than two transactions
    /// yield no rules.
    #[must_use]
    pub fn mine_with(
        &self,
        transactions: &[Transaction],
        min_support: f64,
        min_confidence: f64,
    ) -> Vec<AssociationRule> {
        let capped = self.extractor().cap(transactions);
        if capped.len() < 2 {
            tracing::debug!(transactions = capped.len(), "not enough transactions to mine");
            return Vec::new();
        }

        let key = CacheKey::new(capped.len(), min_support, min_confidence);
        if let Some(rules) = self.cache.get(&key) {
            tracing::debug!(%key, rules = rules.len(), "rule cache hit");
            return rules;
        }

        let rules = mining::mine(&capped, min_support, min_confidence);
        tracing::info!(
            transactions = capped.len(),
            rules = rules.len(),
            min_support,
            min_confidence,
            "mined association rules"
        );
        self.cache.set(key, rules.clone(), self.config.cache_ttl());
        rules
    }

    /// Rebuild the stored rule table from `orders`.
    ///
    /// Returns [`RebuildOutcome::AlreadyInProgress`] at once if another
    /// rebuild holds the lock. The lock is released on every exit path,
    /// including errors. A store failure leaves whatever the store holds
    /// at that point; there is no rollback.
    pub fn rebuild(&self, orders: &[Order], thresholds: &Thresholds) -> Result<RebuildOutcome> {
        self.config
            .clone()
            .with_min_support(thresholds.min_support)
            .with_min_confidence(thresholds.min_confidence)
            .with_min_lift(thresholds.min_lift)
            .validate()?;

        let Some(_guard) = RebuildGuard::try_acquire(&self.lock, self.config.lock_ttl()) else {
            tracing::info!("rule rebuild already in progress, skipping");
            return Ok(RebuildOutcome::AlreadyInProgress);
        };

        let transactions = self.extractor().extract(orders);
        let rules = self.mine_with(
            &transactions,
            thresholds.min_support,
            thresholds.min_confidence,
        );
        let rules_created =
            RulePersister::new(thresholds.min_lift).persist(&self.store, &rules)?;

        Ok(RebuildOutcome::Completed(RebuildSummary {
            transactions: transactions.len(),
            rules_mined: rules.len(),
            rules_created,
        }))
    }

    /// Post-commit hook run after a new order is saved.
    ///
    /// Rebuilds with the configured thresholds. Failures are logged and
    /// swallowed so they never fail the order commit; `None` signals one.
    pub fn on_order_committed(&self, orders: &[Order]) -> Option<RebuildOutcome> {
        match self.rebuild(orders, &self.default_thresholds()) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!(error = %e, "rule rebuild after order commit failed");
                None
            }
        }
    }

    /// Stored rules in presentation order.
    pub fn stored_rules(&self) -> Result<Vec<AssociationRule>> {
        let mut rules = self.store.all()?;
        sort_rules(&mut rules);
        Ok(rules)
    }
}

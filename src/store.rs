//! Persisted rule table and the writer that replaces it.
//!
//! Replacement is delete-all then bulk-insert. The two steps are not
//! atomic: a concurrent reader may see an empty or partial table while a
//! rebuild is in flight.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{BasketError, Result};
use crate::mining::AssociationRule;

/// Table of accepted rules, owned outside the engine.
pub trait RuleStore {
    /// Delete every stored rule, returning how many were removed.
    fn delete_all(&self) -> Result<usize>;

    /// Insert `rules`, returning how many rows were created.
    fn insert_many(&self, rules: Vec<AssociationRule>) -> Result<usize>;

    /// Every stored rule, in insertion order.
    fn all(&self) -> Result<Vec<AssociationRule>>;
}

impl<S: RuleStore + ?Sized> RuleStore for Arc<S> {
    fn delete_all(&self) -> Result<usize> {
        (**self).delete_all()
    }

    fn insert_many(&self, rules: Vec<AssociationRule>) -> Result<usize> {
        (**self).insert_many(rules)
    }

    fn all(&self) -> Result<Vec<AssociationRule>> {
        (**self).all()
    }
}

/// Process-local [`RuleStore`].
#[derive(Debug, Default)]
pub struct InMemoryRuleStore {
    rows: RwLock<Vec<AssociationRule>>,
}

impl InMemoryRuleStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `rules`.
    #[must_use]
    pub fn with_rules(rules: Vec<AssociationRule>) -> Self {
        Self {
            rows: RwLock::new(rules),
        }
    }

    /// Number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True when no rows are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RuleStore for InMemoryRuleStore {
    fn delete_all(&self) -> Result<usize> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| BasketError::Store("rule table lock poisoned".to_string()))?;
        let removed = rows.len();
        rows.clear();
        Ok(removed)
    }

    fn insert_many(&self, rules: Vec<AssociationRule>) -> Result<usize> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| BasketError::Store("rule table lock poisoned".to_string()))?;
        let created = rules.len();
        rows.extend(rules);
        Ok(created)
    }

    fn all(&self) -> Result<Vec<AssociationRule>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| BasketError::Store("rule table lock poisoned".to_string()))?;
        Ok(rows.clone())
    }
}

/// Writes a freshly mined rule set over the previous one.
///
/// The lift floor is applied here, after mining; the miner itself filters
/// on support and confidence only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulePersister {
    min_lift: f64,
}

impl RulePersister {
    /// Persister dropping rules with lift below `min_lift`.
    #[must_use]
    pub fn new(min_lift: f64) -> Self {
        Self { min_lift }
    }

    /// Lift floor.
    #[must_use]
    pub fn min_lift(&self) -> f64 {
        self.min_lift
    }

    /// Keep rules at or above the lift floor, first occurrence of each
    /// (antecedent, consequent) pair only.
    #[must_use]
    pub fn select(&self, rules: &[AssociationRule]) -> Vec<AssociationRule> {
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut selected = Vec::new();
        for rule in rules {
            if rule.lift < self.min_lift {
                continue;
            }
            if !seen.insert(rule.key()) {
                continue;
            }
            selected.push(rule.clone());
        }
        selected
    }

    /// Replace the stored rules with `rules`, returning rows created.
    pub fn persist<S: RuleStore + ?Sized>(
        &self,
        store: &S,
        rules: &[AssociationRule],
    ) -> Result<usize> {
        let selected = self.select(rules);
        let skipped = rules.len() - selected.len();
        let removed = store.delete_all()?;
        let created = store.insert_many(selected)?;
        tracing::info!(
            removed,
            created,
            skipped,
            min_lift = self.min_lift,
            "replaced stored association rules"
        );
        Ok(created)
    }
}

impl Default for RulePersister {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MIN_LIFT)
    }
}

//! Mining thresholds and runtime caps.
//!
//! Every knob has a default, so a config file only needs the fields it
//! overrides:
//!
//! ```
//! use basket_rules::config::MiningConfig;
//!
//! let config = MiningConfig::from_json_str(r#"{"min_support": 0.05}"#).unwrap();
//! assert_eq!(config.min_support, 0.05);
//! assert_eq!(config.max_transactions, 3000);
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{EvictionPolicy, DEFAULT_MAX_ENTRIES};
use crate::error::{BasketError, Result};

/// Default minimum support (1% of transactions).
pub const DEFAULT_MIN_SUPPORT: f64 = 0.01;
/// Default minimum confidence.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.1;
/// Default lift floor applied when persisting rules.
pub const DEFAULT_MIN_LIFT: f64 = 0.0;
/// Default cap on transactions per mining run.
pub const DEFAULT_MAX_TRANSACTIONS: usize = 3000;
/// Default cap on distinct items per transaction.
pub const DEFAULT_MAX_ITEMS_PER_TRANSACTION: usize = 20;
/// Default lifetime of cached rule lists (30 minutes).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30 * 60;
/// Default lifetime of the rebuild lock (10 minutes).
pub const DEFAULT_LOCK_TTL_SECS: u64 = 10 * 60;

/// Whole seconds in `ttl`, rounding any fraction up so a nonzero TTL
/// never becomes zero.
fn ceil_secs(ttl: Duration) -> u64 {
    ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0))
}

/// Configuration for a mining run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MiningConfig {
    /// Minimum support, fraction in (0, 1]
    pub min_support: f64,
    /// Minimum confidence, fraction in [0, 1]
    pub min_confidence: f64,
    /// Lift floor used by the persister only
    pub min_lift: f64,
    /// Transactions beyond this count are dropped
    pub max_transactions: usize,
    /// Items beyond this count are dropped from each transaction
    pub max_items_per_transaction: usize,
    /// Cache entry lifetime in seconds
    pub cache_ttl_secs: u64,
    /// Rule lists kept by the in-memory cache
    pub cache_max_entries: usize,
    /// Which cached list makes room when the cache is full
    pub cache_policy: EvictionPolicy,
    /// Rebuild lock lifetime in seconds
    pub lock_ttl_secs: u64,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            min_support: DEFAULT_MIN_SUPPORT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            min_lift: DEFAULT_MIN_LIFT,
            max_transactions: DEFAULT_MAX_TRANSACTIONS,
            max_items_per_transaction: DEFAULT_MAX_ITEMS_PER_TRANSACTION,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            cache_policy: EvictionPolicy::default(),
            lock_ttl_secs: DEFAULT_LOCK_TTL_SECS,
        }
    }
}

impl MiningConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum support threshold.
    #[must_use]
    pub fn with_min_support(mut self, min_support: f64) -> Self {
        self.min_support = min_support;
        self
    }

    /// Set the minimum confidence threshold.
    #[must_use]
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Set the lift floor applied when persisting.
    #[must_use]
    pub fn with_min_lift(mut self, min_lift: f64) -> Self {
        self.min_lift = min_lift;
        self
    }

    /// Set the transaction cap.
    #[must_use]
    pub fn with_max_transactions(mut self, max_transactions: usize) -> Self {
        self.max_transactions = max_transactions;
        self
    }

    /// Set the per-transaction item cap.
    #[must_use]
    pub fn with_max_items_per_transaction(mut self, max_items: usize) -> Self {
        self.max_items_per_transaction = max_items;
        self
    }

    /// Set the cache TTL.
    ///
    /// The TTL has whole-second resolution. Fractions round up, so only
    /// `Duration::ZERO` turns caching off.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ceil_secs(ttl);
        self
    }

    /// Set the cache capacity and eviction policy.
    #[must_use]
    pub fn with_cache_capacity(mut self, max_entries: usize, policy: EvictionPolicy) -> Self {
        self.cache_max_entries = max_entries;
        self.cache_policy = policy;
        self
    }

    /// Set the rebuild lock TTL, with the same rounding as
    /// [`with_cache_ttl`](Self::with_cache_ttl).
    #[must_use]
    pub fn with_lock_ttl(mut self, ttl: Duration) -> Self {
        self.lock_ttl_secs = ceil_secs(ttl);
        self
    }

    /// Cache entry lifetime.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Rebuild lock lifetime.
    #[must_use]
    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_secs)
    }

    /// Check every field against its valid range.
    pub fn validate(&self) -> Result<()> {
        if self.min_support.is_nan() || self.min_support <= 0.0 || self.min_support > 1.0 {
            return Err(BasketError::invalid_threshold(
                "min_support",
                self.min_support,
                "(0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(BasketError::invalid_threshold(
                "min_confidence",
                self.min_confidence,
                "[0, 1]",
            ));
        }
        if self.min_lift.is_nan() || self.min_lift < 0.0 {
            return Err(BasketError::invalid_threshold(
                "min_lift",
                self.min_lift,
                ">= 0",
            ));
        }
        if self.max_transactions == 0 {
            return Err(BasketError::invalid_threshold("max_transactions", 0, "> 0"));
        }
        if self.cache_max_entries == 0 {
            return Err(BasketError::invalid_threshold("cache_max_entries", 0, "> 0"));
        }
        if self.max_items_per_transaction < 2 {
            return Err(BasketError::invalid_threshold(
                "max_items_per_transaction",
                self.max_items_per_transaction,
                ">= 2",
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BasketError::Config(format!("Failed to parse JSON config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            BasketError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = MiningConfig::default();
        assert_eq!(config.min_support, 0.01);
        assert_eq!(config.min_confidence, 0.1);
        assert_eq!(config.min_lift, 0.0);
        assert_eq!(config.max_transactions, 3000);
        assert_eq!(config.max_items_per_transaction, 20);
        assert_eq!(config.cache_ttl(), Duration::from_secs(1800));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = MiningConfig::new()
            .with_min_support(0.2)
            .with_min_confidence(0.5)
            .with_min_lift(1.2)
            .with_max_transactions(100)
            .with_max_items_per_transaction(5)
            .with_cache_ttl(Duration::from_secs(60));
        assert_eq!(config.min_support, 0.2);
        assert_eq!(config.min_confidence, 0.5);
        assert_eq!(config.min_lift, 1.2);
        assert_eq!(config.max_transactions, 100);
        assert_eq!(config.max_items_per_transaction, 5);
        assert_eq!(config.cache_ttl_secs, 60);
    }

    #[test]
    fn test_sub_second_ttl_rounds_up() {
        let config = MiningConfig::new()
            .with_cache_ttl(Duration::from_millis(250))
            .with_lock_ttl(Duration::from_millis(1500));
        assert_eq!(config.cache_ttl(), Duration::from_secs(1));
        assert_eq!(config.lock_ttl(), Duration::from_secs(2));

        let disabled = MiningConfig::new().with_cache_ttl(Duration::ZERO);
        assert_eq!(disabled.cache_ttl(), Duration::ZERO);
    }

    #[test]
    fn test_cache_capacity() {
        let config = MiningConfig::new().with_cache_capacity(8, EvictionPolicy::LFU);
        assert_eq!(config.cache_max_entries, 8);
        assert_eq!(config.cache_policy, EvictionPolicy::LFU);
        assert!(config.validate().is_ok());

        let parsed =
            MiningConfig::from_json_str(r#"{"cache_max_entries": 4, "cache_policy": "Fixed"}"#)
                .unwrap();
        assert_eq!(parsed.cache_policy, EvictionPolicy::Fixed);

        let err = MiningConfig::new()
            .with_cache_capacity(0, EvictionPolicy::LRU)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("cache_max_entries"));
    }

    #[test]
    fn test_validate_rejects_zero_support() {
        let err = MiningConfig::new().with_min_support(0.0).validate().unwrap_err();
        assert!(err.to_string().contains("min_support"));
    }

    #[test]
    fn test_validate_rejects_support_above_one() {
        assert!(MiningConfig::new().with_min_support(1.01).validate().is_err());
        assert!(MiningConfig::new().with_min_support(1.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nan() {
        assert!(MiningConfig::new()
            .with_min_support(f64::NAN)
            .validate()
            .is_err());
        assert!(MiningConfig::new().with_min_lift(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_confidence_and_caps() {
        assert!(MiningConfig::new()
            .with_min_confidence(-0.1)
            .validate()
            .is_err());
        assert!(MiningConfig::new()
            .with_max_transactions(0)
            .validate()
            .is_err());
        assert!(MiningConfig::new()
            .with_max_items_per_transaction(1)
            .validate()
            .is_err());
        assert!(MiningConfig::new().with_min_lift(-1.0).validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = MiningConfig::from_json_str(r#"{"min_confidence": 0.4}"#).unwrap();
        assert_eq!(config.min_confidence, 0.4);
        assert_eq!(config.min_support, DEFAULT_MIN_SUPPORT);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = MiningConfig::from_json_str(r#"{"min_sup": 0.4}"#).unwrap_err();
        assert!(matches!(err, BasketError::Config(_)));
    }

    #[test]
    fn test_invalid_json_value_rejected() {
        let err = MiningConfig::from_json_str(r#"{"min_support": 2.0}"#).unwrap_err();
        assert!(matches!(err, BasketError::InvalidThreshold { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"min_support": 0.05, "max_transactions": 500}}"#).unwrap();

        let config = MiningConfig::load(file.path()).unwrap();
        assert_eq!(config.min_support, 0.05);
        assert_eq!(config.max_transactions, 500);
    }

    #[test]
    fn test_load_missing_file() {
        let err = MiningConfig::load("/nonexistent/basket.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}

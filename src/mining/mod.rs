//! Pattern mining for "bought together" association rules.
//!
//! # Algorithms
//!
//! - [`FrequentItemsetMiner`]: bitmap-pruned 1- and 2-itemset discovery
//! - [`RuleGenerator`]: directional rules with confidence and lift
//! - [`Apriori`]: both steps behind a fit/get API
//!
//! # Example
//!
//! ```
//! use basket_rules::mining::Apriori;
//!
//! // Each transaction is the distinct items of one order
//! let transactions = vec![
//!     vec!["milk".to_string(), "bread".to_string()],
//!     vec!["milk".to_string(), "bread".to_string()],
//!     vec!["milk".to_string(), "eggs".to_string()],
//! ];
//!
//! let mut apriori = Apriori::new()
//!     .with_min_support(0.5)
//!     .with_min_confidence(0.1);
//!
//! apriori.fit(&transactions);
//!
//! for rule in apriori.get_rules() {
//!     println!("{} => {} (conf={:.2}, lift={:.2})",
//!         rule.antecedent_item, rule.consequent_item, rule.confidence, rule.lift);
//! }
//! ```

pub mod bitmap;
pub mod itemsets;
pub mod rules;

pub use bitmap::{PairMask, TransactionBitmap};
pub use itemsets::{FrequentItemsetMiner, FrequentItemsets, ItemSet, ItemSupport};
pub use rules::{lift, rule_order, sort_rules, AssociationRule, RuleGenerator};

use crate::config::{DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_SUPPORT};

/// Apriori-style frequent pair mining and rule generation.
///
/// Only 1- and 2-itemsets are mined; rules are single item to single item.
///
/// # Parameters
///
/// - `min_support`: Minimum support threshold (0.0 to 1.0], default 0.01
/// - `min_confidence`: Minimum confidence threshold [0.0 to 1.0], default 0.1
#[derive(Debug, Clone)]
pub struct Apriori {
    min_support: f64,
    min_confidence: f64,
    frequent_itemsets: FrequentItemsets,
    rules: Vec<AssociationRule>,
}

impl Apriori {
    /// Create a new Apriori instance with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_support: DEFAULT_MIN_SUPPORT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            frequent_itemsets: FrequentItemsets::default(),
            rules: Vec::new(),
        }
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

    /// Fit on transaction data, replacing any previous results.
    ///
    /// Fewer than two transactions cannot support a rule and leave both
    /// the itemsets and the rules empty.
    pub fn fit<T: AsRef<[String]>>(&mut self, transactions: &[T]) {
        if transactions.len() < 2 {
            self.frequent_itemsets = FrequentItemsets::default();
            self.rules = Vec::new();
            return;
        }

        self.frequent_itemsets = FrequentItemsetMiner::new(self.min_support).mine(transactions);
        self.rules = RuleGenerator::new(self.min_confidence).generate(&self.frequent_itemsets);
    }

    /// The frequent itemsets found by the last `fit`.
    #[must_use]
    pub fn get_frequent_itemsets(&self) -> &FrequentItemsets {
        &self.frequent_itemsets
    }

    /// Rules from the last `fit`, sorted by lift then confidence descending.
    #[must_use]
    pub fn get_rules(&self) -> Vec<AssociationRule> {
        self.rules.clone()
    }

    /// Consume the miner, returning its rules.
    #[must_use]
    pub fn into_rules(self) -> Vec<AssociationRule> {
        self.rules
    }
}

impl Default for Apriori {
    fn default() -> Self {
        Self::new()
    }
}

/// Mine sorted association rules from raw transactions in one call.
#[must_use]
pub fn mine<T: AsRef<[String]>>(
    transactions: &[T],
    min_support: f64,
    min_confidence: f64,
) -> Vec<AssociationRule> {
    let mut apriori = Apriori::new()
        .with_min_support(min_support)
        .with_min_confidence(min_confidence);
    apriori.fit(transactions);
    apriori.into_rules()
}

//! basket-rules: "frequently bought together" rules from order history.
//!
//! Orders become transactions, transactions become frequent 1- and
//! 2-itemsets through a bitmap-pruned Apriori pass, and frequent pairs
//! become directional rules scored by support, confidence and lift.
//!
//! # Quick Start
//!
//! ```
//! use basket_rules::mining::mine;
//!
//! let transactions = vec![
//!     vec!["a".to_string(), "b".to_string()],
//!     vec!["a".to_string(), "b".to_string()],
//!     vec!["a".to_string(), "c".to_string()],
//! ];
//!
//! let rules = mine(&transactions, 0.5, 0.1);
//! // Same lift, higher confidence first
//! let b_a = rules.iter().position(|r| r.key() == ("b", "a")).unwrap();
//! let a_b = rules.iter().position(|r| r.key() == ("a", "b")).unwrap();
//! assert!(b_a < a_b);
//! ```
//!
//! # Modules
//!
//! - [`transaction`]: Orders, transactions and the capped extractor
//! - [`mining`]: Frequent itemset miner, rule generator, `Apriori`
//! - [`cache`]: Rule-list cache keyed by request shape
//! - [`lock`]: Advisory non-blocking rebuild lock
//! - [`store`]: Persisted rule table and the replacing writer
//! - [`engine`]: Orchestration of all of the above
//! - [`analysis`]: Listings, top-N reports, formula breakdowns
//! - [`config`]: Thresholds and caps

pub mod analysis;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod lock;
pub mod mining;
pub mod store;
pub mod transaction;

pub use config::MiningConfig;
pub use engine::{AssociationRuleEngine, RebuildOutcome, RebuildSummary, Thresholds};
pub use error::{BasketError, Result};
pub use mining::{mine, Apriori, AssociationRule};
pub use transaction::{Order, OrderLine, Transaction, TransactionExtractor};

//! Frequent 1- and 2-itemset discovery.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::bitmap::{PairMask, TransactionBitmap};

/// An unordered set of one or two items.
///
/// Pairs are stored with their items sorted, so `pair("b", "a")` and
/// `pair("a", "b")` compare and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemSet {
    /// A single item
    Single(String),
    /// Two distinct items, smaller identifier first
    Pair(String, String),
}

impl ItemSet {
    /// Single-item set.
    #[must_use]
    pub fn single(item: impl Into<String>) -> Self {
        Self::Single(item.into())
    }

    /// Two-item set in canonical order.
    #[must_use]
    pub fn pair(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self::Pair(a, b)
        } else {
            Self::Pair(b, a)
        }
    }

    /// Number of items (1 or 2).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Pair(..) => 2,
        }
    }

    /// Always false.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `item` belongs to the set.
    #[must_use]
    pub fn contains(&self, item: &str) -> bool {
        match self {
            Self::Single(a) => a == item,
            Self::Pair(a, b) => a == item || b == item,
        }
    }
}

impl fmt::Display for ItemSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(a) => write!(f, "{{{a}}}"),
            Self::Pair(a, b) => write!(f, "{{{a}, {b}}}"),
        }
    }
}

/// Occurrence count and support of one frequent itemset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemSupport {
    /// Transactions containing the itemset
    pub count: usize,
    /// `count / total_transactions`
    pub support: f64,
}

/// Frequent itemsets of one mining run, in two tiers.
///
/// Lookups for itemsets that were pruned return a support of zero through
/// [`FrequentItemsets::single_support`] and
/// [`FrequentItemsets::pair_support`]; use [`FrequentItemsets::get`] to
/// tell "pruned" apart from "frequent".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequentItemsets {
    total_transactions: usize,
    min_count: usize,
    singles: BTreeMap<String, ItemSupport>,
    pairs: BTreeMap<(String, String), ItemSupport>,
}

impl FrequentItemsets {
    /// Number of transactions supports were computed over.
    #[must_use]
    pub fn total_transactions(&self) -> usize {
        self.total_transactions
    }

    /// Minimum occurrence count an itemset needed to be kept.
    #[must_use]
    pub fn min_count(&self) -> usize {
        self.min_count
    }

    /// Frequent 1-itemsets keyed by item.
    #[must_use]
    pub fn singles(&self) -> &BTreeMap<String, ItemSupport> {
        &self.singles
    }

    /// Frequent 2-itemsets keyed by their canonical (sorted) item pair.
    #[must_use]
    pub fn pairs(&self) -> &BTreeMap<(String, String), ItemSupport> {
        &self.pairs
    }

    /// Entry for `itemset`, if it was frequent.
    #[must_use]
    pub fn get(&self, itemset: &ItemSet) -> Option<ItemSupport> {
        match itemset {
            ItemSet::Single(a) => self.singles.get(a).copied(),
            ItemSet::Pair(a, b) => self.pairs.get(&(a.clone(), b.clone())).copied(),
        }
    }

    /// Support of a single item, zero when it was pruned.
    #[must_use]
    pub fn single_support(&self, item: &str) -> f64 {
        self.singles.get(item).map_or(0.0, |s| s.support)
    }

    /// Support of an unordered pair, zero when it was pruned.
    #[must_use]
    pub fn pair_support(&self, a: &str, b: &str) -> f64 {
        let key = if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        self.pairs.get(&key).map_or(0.0, |s| s.support)
    }

    /// Every frequent itemset with its support, singles first.
    pub fn iter(&self) -> impl Iterator<Item = (ItemSet, f64)> + '_ {
        let singles = self
            .singles
            .iter()
            .map(|(item, s)| (ItemSet::Single(item.clone()), s.support));
        let pairs = self
            .pairs
            .iter()
            .map(|((a, b), s)| (ItemSet::Pair(a.clone(), b.clone()), s.support));
        singles.chain(pairs)
    }

    /// Total number of frequent itemsets across both tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.singles.len() + self.pairs.len()
    }

    /// True when nothing was frequent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.pairs.is_empty()
    }
}

/// Two-pass, bitmap-pruned miner for frequent 1- and 2-itemsets.
///
/// # Algorithm
///
/// 1. Count every item; keep those seen in at least
///    `floor(min_support * T)` transactions and give each a dense index.
/// 2. Encode each transaction as a bitmap over the kept items only,
///    dropping transactions with no frequent item.
/// 3. For every pair of kept items count the bitmaps containing both.
///
/// Items pruned in step 1 never reach step 3, which is `O(k^2 * T)` in the
/// number of frequent items `k`.
///
/// # Example
///
/// ```
/// use basket_rules::mining::{FrequentItemsetMiner, ItemSet};
///
/// let transactions = vec![
///     vec!["a".to_string(), "b".to_string()],
///     vec!["a".to_string(), "b".to_string()],
///     vec!["a".to_string(), "c".to_string()],
/// ];
/// let itemsets = FrequentItemsetMiner::new(0.5).mine(&transactions);
/// assert_eq!(itemsets.single_support("a"), 1.0);
/// assert!(itemsets.get(&ItemSet::pair("b", "a")).is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequentItemsetMiner {
    min_support: f64,
}

impl FrequentItemsetMiner {
    /// Create a miner with the given minimum support.
    #[must_use]
    pub fn new(min_support: f64) -> Self {
        Self { min_support }
    }

    /// Minimum support threshold.
    #[must_use]
    pub fn min_support(&self) -> f64 {
        self.min_support
    }

    /// Minimum occurrence count for `total` transactions.
    ///
    /// Never below one, so an itemset that never occurs is never frequent.
    #[must_use]
    pub fn min_count(&self, total: usize) -> usize {
        let threshold = (self.min_support * total as f64).floor();
        if threshold.is_nan() || threshold < 1.0 {
            1
        } else {
            threshold as usize
        }
    }

    /// Mine frequent itemsets from `transactions`.
    ///
    /// Items repeated within one transaction count once.
    pub fn mine<T: AsRef<[String]>>(&self, transactions: &[T]) -> FrequentItemsets {
        let total = transactions.len();
        if total == 0 {
            return FrequentItemsets::default();
        }
        let min_count = self.min_count(total);
        let n = total as f64;

        // Pass 1: item counts
        let mut item_counts: HashMap<&str, usize> = HashMap::new();
        for transaction in transactions {
            let mut seen = HashSet::new();
            for item in transaction.as_ref() {
                if seen.insert(item.as_str()) {
                    *item_counts.entry(item.as_str()).or_insert(0) += 1;
                }
            }
        }

        let mut frequent: Vec<(&str, usize)> = item_counts
            .into_iter()
            .filter(|&(_, count)| count >= min_count)
            .collect();
        frequent.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let index: HashMap<&str, usize> = frequent
            .iter()
            .enumerate()
            .map(|(i, &(item, _))| (item, i))
            .collect();

        let singles: BTreeMap<String, ItemSupport> = frequent
            .iter()
            .map(|&(item, count)| {
                (
                    item.to_string(),
                    ItemSupport {
                        count,
                        support: count as f64 / n,
                    },
                )
            })
            .collect();

        let k = frequent.len();
        let mut pairs = BTreeMap::new();
        if k >= 2 {
            let bitmaps = Self::encode(transactions, &index, k);

            // Pass 2: pair counts over surviving bitmaps
            for i in 0..k {
                for j in (i + 1)..k {
                    let mask = PairMask::new(i, j);
                    let count = bitmaps.iter().filter(|b| b.contains_mask(&mask)).count();
                    if count >= min_count {
                        pairs.insert(
                            (frequent[i].0.to_string(), frequent[j].0.to_string()),
                            ItemSupport {
                                count,
                                support: count as f64 / n,
                            },
                        );
                    }
                }
            }
        }

        tracing::debug!(
            transactions = total,
            min_count,
            frequent_items = k,
            frequent_pairs = pairs.len(),
            "mined frequent itemsets"
        );

        FrequentItemsets {
            total_transactions: total,
            min_count,
            singles,
            pairs,
        }
    }

    /// Bitmap per transaction over frequent items; empty bitmaps dropped.
    fn encode<T: AsRef<[String]>>(
        transactions: &[T],
        index: &HashMap<&str, usize>,
        k: usize,
    ) -> Vec<TransactionBitmap> {
        transactions
            .iter()
            .filter_map(|transaction| {
                let mut bitmap = TransactionBitmap::new(k);
                for item in transaction.as_ref() {
                    if let Some(&i) = index.get(item.as_str()) {
                        bitmap.set(i);
                    }
                }
                (!bitmap.is_zero()).then_some(bitmap)
            })
            .collect()
    }
}

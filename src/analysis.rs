//! Read-side views over mined rules.
//!
//! These back the consumer surface: paginated listing, top-N reports per
//! metric, per-pair formula breakdowns and "frequently bought together"
//! lookups.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mining::rules::ratio;
use crate::mining::{lift, sort_rules, AssociationRule};

/// Default page size for rule listings.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// How many rules a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Listing {
    /// The first `n` rules in presentation order
    Top(usize),
    /// Every rule
    All,
}

impl Default for Listing {
    fn default() -> Self {
        Self::Top(DEFAULT_PAGE_SIZE)
    }
}

/// Rules in presentation order, truncated per `listing`.
#[must_use]
pub fn list_rules(rules: &[AssociationRule], listing: Listing) -> Vec<AssociationRule> {
    let mut sorted = rules.to_vec();
    sort_rules(&mut sorted);
    if let Listing::Top(n) = listing {
        sorted.truncate(n);
    }
    sorted
}

/// Top rules ranked separately by each metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleAnalysis {
    /// Highest support first
    pub by_support: Vec<AssociationRule>,
    /// Highest confidence first
    pub by_confidence: Vec<AssociationRule>,
    /// Highest lift first
    pub by_lift: Vec<AssociationRule>,
}

fn top_by(rules: &[AssociationRule], n: usize, metric: fn(&AssociationRule) -> f64) -> Vec<AssociationRule> {
    let mut ranked = rules.to_vec();
    // Stable sort over presentation order keeps ties deterministic
    sort_rules(&mut ranked);
    ranked.sort_by(|a, b| metric(b).total_cmp(&metric(a)));
    ranked.truncate(n);
    ranked
}

/// Top `n` rules by support, by confidence and by lift.
#[must_use]
pub fn analyze(rules: &[AssociationRule], n: usize) -> RuleAnalysis {
    RuleAnalysis {
        by_support: top_by(rules, n, |r| r.support),
        by_confidence: top_by(rules, n, |r| r.confidence),
        by_lift: top_by(rules, n, |r| r.lift),
    }
}

/// Consequents of rules fired by `item`, strongest first, without repeats.
#[must_use]
pub fn recommend_for(rules: &[AssociationRule], item: &str, limit: usize) -> Vec<String> {
    let mut fired: Vec<AssociationRule> = rules
        .iter()
        .filter(|r| r.antecedent_item == item)
        .cloned()
        .collect();
    sort_rules(&mut fired);

    let mut seen = HashSet::new();
    fired
        .into_iter()
        .map(|r| r.consequent_item)
        .filter(|c| seen.insert(c.clone()))
        .take(limit)
        .collect()
}

/// Raw counts and derived metrics for one item pair, recomputed from
/// transactions without any threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairExplanation {
    /// First item
    pub item_a: String,
    /// Second item
    pub item_b: String,
    /// Transactions examined
    pub total_transactions: usize,
    /// Transactions containing `item_a`
    pub count_a: usize,
    /// Transactions containing `item_b`
    pub count_b: usize,
    /// Transactions containing both
    pub count_both: usize,
    /// support(a)
    pub support_a: f64,
    /// support(b)
    pub support_b: f64,
    /// support({a, b})
    pub support_both: f64,
    /// confidence(a → b)
    pub confidence_a_to_b: f64,
    /// confidence(b → a)
    pub confidence_b_to_a: f64,
    /// lift, identical in both directions
    pub lift: f64,
}

impl PairExplanation {
    /// Each formula with its literal numbers substituted.
    #[must_use]
    pub fn formulas(&self) -> Vec<String> {
        let (a, b) = (&self.item_a, &self.item_b);
        let n = self.total_transactions;
        vec![
            format!("support({a}) = {} / {n} = {:.4}", self.count_a, self.support_a),
            format!("support({b}) = {} / {n} = {:.4}", self.count_b, self.support_b),
            format!(
                "support({a}, {b}) = {} / {n} = {:.4}",
                self.count_both, self.support_both
            ),
            format!(
                "confidence({a}→{b}) = {:.4} / {:.4} = {:.4}",
                self.support_both, self.support_a, self.confidence_a_to_b
            ),
            format!(
                "confidence({b}→{a}) = {:.4} / {:.4} = {:.4}",
                self.support_both, self.support_b, self.confidence_b_to_a
            ),
            format!(
                "lift({a}, {b}) = {:.4} / ({:.4} × {:.4}) = {:.4}",
                self.support_both, self.support_a, self.support_b, self.lift
            ),
        ]
    }
}

impl fmt::Display for PairExplanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.formulas() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Recompute support, confidence and lift for `item_a` and `item_b`.
#[must_use]
pub fn explain_pair<T: AsRef<[String]>>(
    transactions: &[T],
    item_a: &str,
    item_b: &str,
) -> PairExplanation {
    let (mut count_a, mut count_b, mut count_both) = (0, 0, 0);
    for transaction in transactions {
        let items = transaction.as_ref();
        let has_a = items.iter().any(|i| i == item_a);
        let has_b = items.iter().any(|i| i == item_b);
        count_a += usize::from(has_a);
        count_b += usize::from(has_b);
        count_both += usize::from(has_a && has_b);
    }

    let n = transactions.len();
    let support = |count: usize| ratio(count as f64, n as f64);
    let (support_a, support_b, support_both) = (support(count_a), support(count_b), support(count_both));

    PairExplanation {
        item_a: item_a.to_string(),
        item_b: item_b.to_string(),
        total_transactions: n,
        count_a,
        count_b,
        count_both,
        support_a,
        support_b,
        support_both,
        confidence_a_to_b: ratio(support_both, support_a),
        confidence_b_to_a: ratio(support_both, support_b),
        lift: lift(support_both, support_a, support_b),
    }
}

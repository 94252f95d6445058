//! Directional rules derived from frequent pairs.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::itemsets::FrequentItemsets;

/// Association rule: antecedent => consequent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRule {
    /// Item already in the basket
    pub antecedent_item: String,
    /// Item suggested alongside it
    pub consequent_item: String,
    /// Support: P(antecedent ∧ consequent), shared by both directions
    pub support: f64,
    /// Confidence: P(consequent | antecedent)
    pub confidence: f64,
    /// Lift: support / (P(antecedent) * P(consequent))
    pub lift: f64,
}

impl AssociationRule {
    /// The (antecedent, consequent) pair identifying this rule.
    #[must_use]
    pub fn key(&self) -> (&str, &str) {
        (&self.antecedent_item, &self.consequent_item)
    }
}

impl fmt::Display for AssociationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} => {} (support={:.4}, confidence={:.4}, lift={:.4})",
            self.antecedent_item, self.consequent_item, self.support, self.confidence, self.lift
        )
    }
}

/// `numerator / denominator`, or zero when the denominator is not positive.
#[inline]
#[must_use]
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Lift of a pair given its support and both single-item supports.
#[inline]
#[must_use]
pub fn lift(pair_support: f64, support_a: f64, support_b: f64) -> f64 {
    ratio(pair_support, support_a * support_b)
}

/// Presentation order: lift desc, confidence desc, then antecedent and
/// consequent ascending.
#[must_use]
pub fn rule_order(a: &AssociationRule, b: &AssociationRule) -> Ordering {
    b.lift
        .total_cmp(&a.lift)
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| a.antecedent_item.cmp(&b.antecedent_item))
        .then_with(|| a.consequent_item.cmp(&b.consequent_item))
}

/// Sort rules into presentation order.
pub fn sort_rules(rules: &mut [AssociationRule]) {
    rules.sort_by(rule_order);
}

/// Turns frequent pairs into confidence-filtered directional rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleGenerator {
    min_confidence: f64,
}

impl RuleGenerator {
    /// Create a generator with the given minimum confidence.
    #[must_use]
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    /// Minimum confidence threshold.
    #[must_use]
    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Generate rules for every frequent pair.
    ///
    /// Each direction of a pair is kept or dropped on its own confidence,
    /// so a pair yields zero, one or two rules. Output is sorted by
    /// [`rule_order`].
    #[must_use]
    pub fn generate(&self, itemsets: &FrequentItemsets) -> Vec<AssociationRule> {
        let mut rules = Vec::new();

        for ((x, y), pair) in itemsets.pairs() {
            let support_x = itemsets.single_support(x);
            let support_y = itemsets.single_support(y);
            let lift = lift(pair.support, support_x, support_y);

            for (antecedent, consequent, antecedent_support) in
                [(x, y, support_x), (y, x, support_y)]
            {
                let confidence = ratio(pair.support, antecedent_support);
                if confidence >= self.min_confidence && confidence > 0.0 {
                    rules.push(AssociationRule {
                        antecedent_item: antecedent.clone(),
                        consequent_item: consequent.clone(),
                        support: pair.support,
                        confidence,
                        lift,
                    });
                }
            }
        }

        sort_rules(&mut rules);
        tracing::debug!(
            pairs = itemsets.pairs().len(),
            rules = rules.len(),
            min_confidence = self.min_confidence,
            "generated association rules"
        );
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mining::FrequentItemsetMiner;

    fn rule(a: &str, c: &str, confidence: f64, lift: f64) -> AssociationRule {
        AssociationRule {
            antecedent_item: a.to_string(),
            consequent_item: c.to_string(),
            support: 0.5,
            confidence,
            lift,
        }
    }

    fn tx(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ratio_guards_zero() {
        assert_eq!(ratio(0.5, 0.0), 0.0);
        assert_eq!(ratio(0.5, 0.25), 2.0);
        assert_eq!(lift(0.5, 0.0, 0.5), 0.0);
    }

    #[test]
    fn test_rule_order_lift_then_confidence() {
        let mut rules = vec![
            rule("a", "b", 0.9, 1.0),
            rule("c", "d", 0.5, 2.0),
            rule("e", "f", 0.95, 1.0),
        ];
        sort_rules(&mut rules);
        assert_eq!(rules[0].key(), ("c", "d"));
        assert_eq!(rules[1].key(), ("e", "f"));
        assert_eq!(rules[2].key(), ("a", "b"));
    }

    #[test]
    fn test_rule_order_ties_by_name() {
        let mut rules = vec![rule("b", "a", 1.0, 1.0), rule("a", "c", 1.0, 1.0), rule("a", "b", 1.0, 1.0)];
        sort_rules(&mut rules);
        assert_eq!(rules[0].key(), ("a", "b"));
        assert_eq!(rules[1].key(), ("a", "c"));
        assert_eq!(rules[2].key(), ("b", "a"));
    }

    #[test]
    fn test_generate_both_directions() {
        let transactions = vec![tx(&["a", "b"]), tx(&["a", "b"]), tx(&["a", "c"])];
        let itemsets = FrequentItemsetMiner::new(0.5).mine(&transactions);
        let rules = RuleGenerator::new(0.1).generate(&itemsets);

        let a_b = rules.iter().find(|r| r.key() == ("a", "b")).unwrap();
        let b_a = rules.iter().find(|r| r.key() == ("b", "a")).unwrap();
        assert!((a_b.confidence - 2.0 / 3.0).abs() < 1e-12);
        assert!((b_a.confidence - 1.0).abs() < 1e-12);
        assert!((a_b.lift - 1.0).abs() < 1e-12);
        assert_eq!(a_b.lift, b_a.lift);
        assert_eq!(a_b.support, b_a.support);
    }

    #[test]
    fn test_generate_filters_each_direction() {
        // a is everywhere, b only twice: b => a is certain, a => b is not
        let transactions = vec![
            tx(&["a", "b"]),
            tx(&["a", "b"]),
            tx(&["a", "c"]),
            tx(&["a", "c"]),
        ];
        let itemsets = FrequentItemsetMiner::new(0.5).mine(&transactions);
        let rules = RuleGenerator::new(0.8).generate(&itemsets);

        assert!(rules.iter().any(|r| r.key() == ("b", "a")));
        assert!(!rules.iter().any(|r| r.key() == ("a", "b")));
        for r in &rules {
            assert!(r.confidence >= 0.8);
        }
    }

    #[test]
    fn test_generate_empty() {
        let rules = RuleGenerator::new(0.1).generate(&FrequentItemsets::default());
        assert!(rules.is_empty());
    }

    #[test]
    fn test_display() {
        let r = rule("milk", "bread", 0.75, 1.5);
        assert_eq!(
            r.to_string(),
            "milk => bread (support=0.5000, confidence=0.7500, lift=1.5000)"
        );
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(rule("a", "b", 1.0, 2.0)).unwrap();
        assert_eq!(json["antecedent_item"], "a");
        assert_eq!(json["consequent_item"], "b");
        assert_eq!(json["lift"], 2.0);
    }
}

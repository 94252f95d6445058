//! Orders and the transactions mined from them.
//!
//! An [`Order`] is what the shop persists: an ordered list of lines, each an
//! item and a quantity. A [`Transaction`] is the distinct items of one order
//! that bought at least two things. Single-item orders carry no
//! co-occurrence information and never become transactions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_MAX_ITEMS_PER_TRANSACTION, DEFAULT_MAX_TRANSACTIONS};
use crate::error::{BasketError, Result};

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Item (product) identifier
    pub item: String,
    /// Units purchased
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl OrderLine {
    /// Create a new order line
    #[must_use]
    pub fn new(item: impl Into<String>, quantity: u32) -> Self {
        Self {
            item: item.into(),
            quantity,
        }
    }
}

/// A persisted order, as handed over by the order store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Lines in checkout order
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Create an order from its lines
    #[must_use]
    pub fn new(lines: Vec<OrderLine>) -> Self {
        Self { lines }
    }

    /// Build an order with quantity 1 for every item.
    #[must_use]
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: items.into_iter().map(|item| OrderLine::new(item, 1)).collect(),
        }
    }

    /// Distinct purchased items in order of first appearance.
    ///
    /// Lines with zero quantity are skipped.
    #[must_use]
    pub fn distinct_items(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut items = Vec::new();
        for line in &self.lines {
            if line.quantity > 0 && seen.insert(line.item.as_str()) {
                items.push(line.item.clone());
            }
        }
        items
    }
}

/// Distinct items of one multi-item order.
///
/// Always holds at least two items, with no duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Transaction {
    items: Vec<String>,
}

impl Transaction {
    /// Build a transaction, dropping duplicate items.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::InsufficientItems`] when fewer than two
    /// distinct items remain.
    pub fn new<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let items: Vec<String> = items
            .into_iter()
            .map(Into::into)
            .filter(|item: &String| seen.insert(item.clone()))
            .collect();
        if items.len() < 2 {
            return Err(BasketError::InsufficientItems { found: items.len() });
        }
        Ok(Self { items })
    }

    /// Items in order of first appearance.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Number of distinct items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the transaction contains `item`.
    #[must_use]
    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    /// Keep only the first `max_items` items.
    ///
    /// Returns `None` when truncation would leave fewer than two items.
    #[must_use]
    pub fn truncated(mut self, max_items: usize) -> Option<Self> {
        if max_items < 2 {
            return None;
        }
        self.items.truncate(max_items);
        Some(self)
    }
}

impl AsRef<[String]> for Transaction {
    fn as_ref(&self) -> &[String] {
        &self.items
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let items = Vec::<String>::deserialize(deserializer)?;
        Self::new(items).map_err(serde::de::Error::custom)
    }
}

/// Converts orders into capped transaction lists.
///
/// Caps are silent truncations: the first `max_transactions` qualifying
/// orders are kept, not a sample of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionExtractor {
    max_transactions: usize,
    max_items_per_transaction: usize,
}

impl Default for TransactionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionExtractor {
    /// Create an extractor with the default caps (3000 transactions, 20 items).
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_transactions: DEFAULT_MAX_TRANSACTIONS,
            max_items_per_transaction: DEFAULT_MAX_ITEMS_PER_TRANSACTION,
        }
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

    /// Transaction cap.
    #[must_use]
    pub fn max_transactions(&self) -> usize {
        self.max_transactions
    }

    /// Per-transaction item cap.
    #[must_use]
    pub fn max_items_per_transaction(&self) -> usize {
        self.max_items_per_transaction
    }

    /// Extract transactions from orders.
    ///
    /// Orders with fewer than two distinct purchased items are dropped.
    #[must_use]
    pub fn extract(&self, orders: &[Order]) -> Vec<Transaction> {
        let transactions: Vec<Transaction> = orders
            .iter()
            .filter_map(|order| {
                let mut items = order.distinct_items();
                items.truncate(self.max_items_per_transaction);
                Transaction::new(items).ok()
            })
            .take(self.max_transactions)
            .collect();

        tracing::debug!(
            orders = orders.len(),
            transactions = transactions.len(),
            "extracted transactions"
        );
        transactions
    }

    /// Apply both caps to an already-built transaction list.
    #[must_use]
    pub fn cap(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .take(self.max_transactions)
            .filter_map(|t| t.clone().truncated(self.max_items_per_transaction))
            .collect()
    }
}

/// Accepted shapes of a transaction input file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TransactionInput {
    Orders(Vec<Order>),
    Raw(Vec<Vec<String>>),
}

/// Parse transactions from JSON.
///
/// Accepts either an array of orders (`[{"lines": [{"item": "a",
/// "quantity": 1}]}]`) or an array of item arrays (`[["a", "b"]]`).
/// Entries with fewer than two distinct items are dropped; caps from
/// `extractor` apply.
pub fn parse_transactions(json: &str, extractor: &TransactionExtractor) -> Result<Vec<Transaction>> {
    let input: TransactionInput = serde_json::from_str(json)?;
    let transactions = match input {
        TransactionInput::Orders(orders) => extractor.extract(&orders),
        TransactionInput::Raw(raw) => {
            let built: Vec<Transaction> = raw
                .into_iter()
                .filter_map(|items| Transaction::new(items).ok())
                .collect();
            extractor.cap(&built)
        }
    };
    Ok(transactions)
}

/// Read and parse a transaction file; see [`parse_transactions`].
pub fn load_transactions<P: AsRef<std::path::Path>>(
    path: P,
    extractor: &TransactionExtractor,
) -> Result<Vec<Transaction>> {
    let json = std::fs::read_to_string(path)?;
    parse_transactions(&json, extractor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_orders_json() {
        let json = r#"[
            {"lines": [{"item": "a", "quantity": 2}, {"item": "b"}]},
            {"lines": [{"item": "c", "quantity": 1}]}
        ]"#;
        let transactions = parse_transactions(json, &TransactionExtractor::new()).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].items(), &["a", "b"]);
    }

    #[test]
    fn test_parse_raw_json() {
        let json = r#"[["a", "b"], ["c"], ["d", "e", "f"]]"#;
        let extractor = TransactionExtractor::new().with_max_items_per_transaction(2);
        let transactions = parse_transactions(json, &extractor).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[1].items(), &["d", "e"]);
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_transactions("{\"not\": \"a list\"}", &TransactionExtractor::new())
            .unwrap_err();
        assert!(matches!(err, BasketError::Json(_)));
    }

    #[test]
    fn test_load_transactions_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[["x", "y"], ["x", "z"]]"#).unwrap();
        let transactions = load_transactions(file.path(), &TransactionExtractor::new()).unwrap();
        assert_eq!(transactions.len(), 2);
    }

    #[test]
    fn test_transaction_requires_two_items() {
        assert!(Transaction::new(["a", "b"]).is_ok());
        let err = Transaction::new(["a"]).unwrap_err();
        assert!(matches!(err, BasketError::InsufficientItems { found: 1 }));
    }

    #[test]
    fn test_transaction_dedups_items() {
        let t = Transaction::new(["a", "b", "a", "c", "b"]).unwrap();
        assert_eq!(t.items(), &["a", "b", "c"]);
        assert!(Transaction::new(["a", "a"]).is_err());
    }

    #[test]
    fn test_transaction_contains() {
        let t = Transaction::new(["milk", "bread"]).unwrap();
        assert!(t.contains("milk"));
        assert!(!t.contains("eggs"));
        assert_eq!(t.len(), 2);
        assert!(!t.is_empty());
    }

    #[test]
    fn test_transaction_deserialize_validates() {
        let t: Transaction = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(t.items(), &["a", "b"]);
        assert!(serde_json::from_str::<Transaction>(r#"["a"]"#).is_err());
    }

    #[test]
    fn test_order_distinct_items_skips_zero_quantity() {
        let order = Order::new(vec![
            OrderLine::new("a", 2),
            OrderLine::new("b", 0),
            OrderLine::new("a", 1),
            OrderLine::new("c", 1),
        ]);
        assert_eq!(order.distinct_items(), vec!["a", "c"]);
    }

    #[test]
    fn test_extract_drops_single_item_orders() {
        let orders = vec![
            Order::from_items(["a"]),
            Order::from_items(["a", "b"]),
            Order::from_items(["c", "c"]),
        ];
        let transactions = TransactionExtractor::new().extract(&orders);
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].items(), &["a", "b"]);
    }

    #[test]
    fn test_extract_empty() {
        assert!(TransactionExtractor::new().extract(&[]).is_empty());
    }

    #[test]
    fn test_extract_caps_transactions_in_order() {
        let orders: Vec<Order> = (0..10)
            .map(|i| Order::from_items([format!("x{i}"), format!("y{i}")]))
            .collect();
        let transactions = TransactionExtractor::new()
            .with_max_transactions(3)
            .extract(&orders);
        assert_eq!(transactions.len(), 3);
        assert_eq!(transactions[0].items()[0], "x0");
        assert_eq!(transactions[2].items()[0], "x2");
    }

    #[test]
    fn test_extract_cap_counts_only_qualifying_orders() {
        let orders = vec![
            Order::from_items(["solo"]),
            Order::from_items(["a", "b"]),
            Order::from_items(["c", "d"]),
        ];
        let transactions = TransactionExtractor::new()
            .with_max_transactions(2)
            .extract(&orders);
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[1].items(), &["c", "d"]);
    }

    #[test]
    fn test_extract_caps_items() {
        let orders = vec![Order::from_items(["a", "b", "c", "d"])];
        let transactions = TransactionExtractor::new()
            .with_max_items_per_transaction(2)
            .extract(&orders);
        assert_eq!(transactions[0].items(), &["a", "b"]);
    }

    #[test]
    fn test_cap_prebuilt_transactions() {
        let transactions = vec![
            Transaction::new(["a", "b", "c"]).unwrap(),
            Transaction::new(["d", "e"]).unwrap(),
        ];
        let capped = TransactionExtractor::new()
            .with_max_transactions(1)
            .with_max_items_per_transaction(2)
            .cap(&transactions);
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].items(), &["a", "b"]);
    }
}

//! Inventory aggregation: per-item quantities and their total gralat value.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};
use trade_core::{RatioEntry, RatioTable, SubscriptionId, Subscribers};
use trade_econ::{is_quantity_text, parse_amount, quantity_value, total_value, ConvertError};

/// Reasons a quantity edit is refused. The previous quantity is kept.
#[derive(Debug, Error, PartialEq)]
pub enum QuantityError {
    #[error("unknown item: {0}")]
    UnknownItem(String),
    #[error("malformed quantity {text:?} for {item}")]
    Malformed { item: String, text: String },
    #[error("quantity {text:?} for {item} would overflow the total")]
    Overflow { item: String, text: String },
}

/// One row of the inventory in display order.
#[derive(Clone, Debug, PartialEq)]
pub struct InventoryLine<'a> {
    pub entry: &'a RatioEntry,
    /// Text as typed; empty when unset.
    pub raw: &'a str,
    pub quantity: Decimal,
    /// `quantity * ratio` in gralats.
    pub value: Decimal,
}

impl InventoryLine<'_> {
    /// Rows with a positive quantity are highlighted and show their value.
    pub fn is_active(&self) -> bool {
        self.quantity > Decimal::ZERO
    }
}

/// Holds the quantity typed for each item of a ratio table.
///
/// The total is never stored: every read recomputes it from the current
/// quantities. Subscribers are told about every change of the total,
/// synchronously, from inside the mutating call.
#[derive(Debug)]
pub struct InventoryAggregator {
    table: RatioTable,
    // Parallel to `table.entries()`.
    raw: Vec<String>,
    subscribers: Subscribers<Decimal>,
}

impl InventoryAggregator {
    pub fn new(table: RatioTable) -> Self {
        let raw = vec![String::new(); table.len()];
        Self {
            table,
            raw,
            subscribers: Subscribers::new(),
        }
    }

    pub fn table(&self) -> &RatioTable {
        &self.table
    }

    /// Current text for `item`, or `None` when the item is unknown.
    pub fn quantity_text(&self, item: &str) -> Option<&str> {
        self.table.position(item).map(|i| self.raw[i].as_str())
    }

    /// Store `raw` as the quantity of `item`.
    ///
    /// Accepts unsigned decimal text or the empty string (unset). Returns the
    /// new total when it changed.
    pub fn set_quantity(&mut self, item: &str, raw: &str) -> Result<Option<Decimal>, QuantityError> {
        let idx = self
            .table
            .position(item)
            .ok_or_else(|| QuantityError::UnknownItem(item.to_string()))?;
        if !is_quantity_text(raw) {
            warn!(item, text = raw, "rejected malformed quantity");
            return Err(QuantityError::Malformed {
                item: item.to_string(),
                text: raw.to_string(),
            });
        }
        let too_long = parse_amount(raw) == Err(ConvertError::Overflow);
        if too_long || self.checked_total_with(idx, raw).is_none() {
            warn!(item, text = raw, "rejected quantity overflowing the total");
            return Err(QuantityError::Overflow {
                item: item.to_string(),
                text: raw.to_string(),
            });
        }
        let before = self.total();
        self.raw[idx] = raw.to_string();
        debug!(item, text = raw, "quantity set");
        Ok(self.publish_if_changed(before))
    }

    /// Sum of `quantity * ratio`; unset and unparseable quantities add 0.
    pub fn total(&self) -> Decimal {
        // Overflowing edits are refused, so saturation is never reached.
        self.lines()
            .fold(Decimal::ZERO, |acc, line| acc.saturating_add(line.value))
    }

    /// Reset every quantity to unset. Returns the new total when it changed.
    pub fn clear_all(&mut self) -> Option<Decimal> {
        let before = self.total();
        for raw in self.raw.iter_mut() {
            raw.clear();
        }
        debug!("inventory cleared");
        self.publish_if_changed(before)
    }

    pub fn lines(&self) -> impl Iterator<Item = InventoryLine<'_>> + '_ {
        self.table
            .iter()
            .zip(self.raw.iter())
            .map(|(entry, raw)| {
                let quantity = quantity_value(raw);
                InventoryLine {
                    entry,
                    raw: raw.as_str(),
                    quantity,
                    value: quantity.saturating_mul(entry.ratio),
                }
            })
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Decimal) + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn checked_total_with(&self, idx: usize, candidate: &str) -> Option<Decimal> {
        let pairs = self.table.iter().enumerate().map(|(i, entry)| {
            let raw = if i == idx { candidate } else { self.raw[i].as_str() };
            (quantity_value(raw), entry.ratio)
        });
        total_value(pairs).ok()
    }

    fn publish_if_changed(&mut self, before: Decimal) -> Option<Decimal> {
        let after = self.total();
        if after == before {
            return None;
        }
        self.subscribers.notify(&after);
        Some(after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn builtin() -> InventoryAggregator {
        InventoryAggregator::new(RatioTable::builtin())
    }

    #[test]
    fn mushrooms_scenario() {
        let mut inv = builtin();
        assert_eq!(
            inv.set_quantity("Mushrooms", "20").unwrap(),
            Some(Decimal::new(100, 0))
        );
        assert_eq!(inv.total(), Decimal::new(100, 0));
    }

    #[test]
    fn malformed_text_keeps_previous_value() {
        let mut inv = builtin();
        inv.set_quantity("Ores", "3").unwrap();
        let err = inv.set_quantity("Ores", "3a").unwrap_err();
        assert_eq!(
            err,
            QuantityError::Malformed {
                item: "Ores".into(),
                text: "3a".into()
            }
        );
        assert_eq!(inv.quantity_text("Ores"), Some("3"));
        assert_eq!(inv.total(), Decimal::new(15, 0));
    }

    #[test]
    fn unknown_item_is_rejected() {
        let mut inv = builtin();
        assert_eq!(
            inv.set_quantity("Dirt", "1"),
            Err(QuantityError::UnknownItem("Dirt".into()))
        );
    }

    #[test]
    fn partial_text_counts_as_zero() {
        let mut inv = builtin();
        inv.set_quantity("Paper", ".").unwrap();
        assert_eq!(inv.quantity_text("Paper"), Some("."));
        assert_eq!(inv.total(), Decimal::ZERO);
        inv.set_quantity("Paper", ".5").unwrap();
        assert_eq!(inv.total(), Decimal::new(2, 0));
    }

    #[test]
    fn overflowing_quantity_is_rejected() {
        let mut inv = builtin();
        let huge = "79228162514264337593543950335";
        assert!(matches!(
            inv.set_quantity("Gold / Diamonds", huge),
            Err(QuantityError::Overflow { .. })
        ));
        assert_eq!(inv.quantity_text("Gold / Diamonds"), Some(""));
        let unparseable = "9".repeat(40);
        assert!(inv.set_quantity("Paper", &unparseable).is_err());
    }

    #[test]
    fn notifies_only_on_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut inv = builtin();
        {
            let seen = Rc::clone(&seen);
            inv.subscribe(move |t| seen.borrow_mut().push(*t));
        }
        inv.set_quantity("Mushrooms", "20").unwrap();
        // Same numeric value, no notification.
        assert_eq!(inv.set_quantity("Mushrooms", "20.").unwrap(), None);
        inv.set_quantity("Starfish", "1").unwrap();
        inv.clear_all();
        assert_eq!(inv.clear_all(), None);
        assert_eq!(
            *seen.borrow(),
            vec![Decimal::new(100, 0), Decimal::new(107, 0), Decimal::ZERO]
        );
    }

    #[test]
    fn lines_follow_table_order() {
        let mut inv = builtin();
        inv.set_quantity("Emeralds", "2").unwrap();
        let lines: Vec<_> = inv.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0].entry.name, "Mushrooms");
        assert!(!lines[0].is_active());
        let emeralds = &lines[3];
        assert_eq!(emeralds.entry.name, "Emeralds");
        assert!(emeralds.is_active());
        assert_eq!(emeralds.value, Decimal::new(16, 0));
    }

    proptest! {
        #[test]
        fn total_is_exact_sum(qtys in proptest::collection::vec(proptest::option::of(0u32..100_000), 13)) {
            let mut inv = builtin();
            let mut expected = Decimal::ZERO;
            let names: Vec<String> = inv.table().iter().map(|e| e.name.clone()).collect();
            for (i, q) in qtys.iter().enumerate() {
                let entry_ratio = inv.table().entries()[i].ratio;
                match q {
                    Some(q) => {
                        inv.set_quantity(&names[i], &q.to_string()).unwrap();
                        expected += Decimal::from(*q) * entry_ratio;
                    }
                    None => {
                        inv.set_quantity(&names[i], "").unwrap();
                    }
                }
            }
            prop_assert_eq!(inv.total(), expected);
            inv.clear_all();
            prop_assert_eq!(inv.total(), Decimal::ZERO);
        }
    }
}

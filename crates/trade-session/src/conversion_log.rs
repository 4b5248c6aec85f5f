//! Append-only conversion log with a derived running total.

use chrono::Local;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use tracing::{debug, info};
use trade_core::{ConversionDirection, ConversionEvent};
use trade_econ::{format_fixed, format_plain};

const ID_LEN: usize = 9;
const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Record of every conversion in the session, in arrival order.
///
/// Entries are never edited or removed individually; `clear` drops them all.
#[derive(Debug)]
pub struct ConversionLog {
    entries: Vec<ConversionEvent>,
    rng: ChaCha8Rng,
}

impl ConversionLog {
    /// `seed` makes generated ids reproducible; `None` seeds from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            entries: Vec::new(),
            rng,
        }
    }

    /// Record an event.
    ///
    /// A missing (or already used) id is replaced by a fresh one and a
    /// missing timestamp is set to the local wall-clock time.
    pub fn append(&mut self, mut event: ConversionEvent) -> &ConversionEvent {
        if event.id.is_empty() || self.contains_id(&event.id) {
            event.id = self.fresh_id();
        }
        if event.timestamp.is_empty() {
            event.timestamp = Local::now().format("%H:%M:%S").to_string();
        }
        debug!(id = %event.id, tro = %event.tro_amount, "conversion logged");
        let idx = self.entries.len();
        self.entries.push(event);
        &self.entries[idx]
    }

    pub fn clear(&mut self) {
        info!(entries = self.entries.len(), "conversion log cleared");
        self.entries.clear();
    }

    /// Sum of `tro_amount` over the current entries.
    pub fn total_tro(&self) -> Decimal {
        self.entries
            .iter()
            .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.tro_amount))
    }

    /// Entries in display order, most recent first.
    pub fn newest_first(&self) -> impl DoubleEndedIterator<Item = &ConversionEvent> + '_ {
        self.entries.iter().rev()
    }

    pub fn arrival_order(&self) -> &[ConversionEvent] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn contains_id(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let id: String = (0..ID_LEN)
                .map(|_| ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())] as char)
                .collect();
            if !self.contains_id(&id) {
                return id;
            }
        }
    }
}

/// Body line of a log card, e.g. "100 gralats @ 2:1" or "10.00 Tro → 13 rocks".
pub fn describe_entry(e: &ConversionEvent) -> String {
    match e.direction {
        ConversionDirection::ForwardToTro => format!(
            "{} {} @ {}:1",
            format_plain(e.input_amount),
            e.input_unit_label,
            format_plain(e.ratio)
        ),
        ConversionDirection::ReverseFromTro => format!(
            "{} Tro → {} {}",
            format_fixed(e.tro_amount),
            format_plain(e.input_amount),
            e.input_unit_label
        ),
    }
}

/// Result line of a log card, e.g. "= 50.00 Tro".
pub fn entry_result(e: &ConversionEvent) -> String {
    format!("= {} Tro", format_fixed(e.tro_amount))
}

//! A single bidirectional currency ⇄ Tro converter.

use rust_decimal::Decimal;
use tracing::debug;
use trade_core::{ConversionDirection, ConversionEvent, ConverterId, ConverterSpec};
use trade_econ::{
    convert_forward, convert_reverse, format_fixed, format_plain, is_amount_text, parse_amount,
    round_tro, ConvertError,
};

/// The three editable fields of a converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConverterField {
    /// Currency amount (rocks or gralats).
    Amount,
    /// Currency units per Tro.
    Ratio,
    /// Tro amount.
    Tro,
}

/// Snapshot of a converter for the display layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConverterView {
    pub id: ConverterId,
    pub title: String,
    pub unit_label: String,
    pub amount: String,
    pub ratio: String,
    pub tro: String,
    pub result_message: Option<String>,
}

/// Field state of one converter card.
///
/// Edits only store text. A conversion runs when a field's confirm action
/// fires; confirming the Tro field converts in reverse, confirming the
/// amount or ratio field converts forward.
#[derive(Clone, Debug)]
pub struct ConverterUnit {
    spec: ConverterSpec,
    amount: String,
    ratio: String,
    tro: String,
    result_message: Option<String>,
}

impl ConverterUnit {
    pub fn new(spec: ConverterSpec) -> Self {
        let ratio = format_plain(spec.default_ratio);
        Self {
            spec,
            amount: String::new(),
            ratio,
            tro: String::new(),
            result_message: None,
        }
    }

    pub fn spec(&self) -> &ConverterSpec {
        &self.spec
    }

    pub fn id(&self) -> &ConverterId {
        &self.spec.id
    }

    pub fn field(&self, field: ConverterField) -> &str {
        match field {
            ConverterField::Amount => &self.amount,
            ConverterField::Ratio => &self.ratio,
            ConverterField::Tro => &self.tro,
        }
    }

    /// Summary of the last conversion, e.g. "100 Gralats = 50.00 Tro".
    pub fn result_message(&self) -> Option<&str> {
        self.result_message.as_deref()
    }

    /// Replace a field's text. Off-pattern text is refused and the field
    /// keeps its previous value. Never converts.
    pub fn edit(&mut self, field: ConverterField, raw: &str) -> Result<(), ConvertError> {
        if !is_amount_text(raw) {
            return Err(ConvertError::NotANumber(raw.to_string()));
        }
        let slot = match field {
            ConverterField::Amount => &mut self.amount,
            ConverterField::Ratio => &mut self.ratio,
            ConverterField::Tro => &mut self.tro,
        };
        *slot = raw.to_string();
        Ok(())
    }

    /// Run the confirm action of `source`.
    ///
    /// The Tro field converts in reverse when it holds a number; anything
    /// else falls back to a forward conversion of the amount field. On error
    /// no field and no message changes.
    pub fn confirm(&mut self, source: ConverterField) -> Result<ConversionEvent, ConvertError> {
        let ratio = parse_amount(&self.ratio)?;
        if source == ConverterField::Tro {
            if let Ok(tro) = parse_amount(&self.tro) {
                return self.reverse(tro, ratio);
            }
        }
        let amount = parse_amount(&self.amount)?;
        self.forward(amount, ratio)
    }

    /// Follow an external value such as the inventory total.
    ///
    /// Zero clears the amount instead of writing "0". Either way the Tro
    /// field and message are cleared so no stale result is shown.
    pub fn apply_external(&mut self, value: Decimal) {
        self.amount = if value.is_zero() {
            String::new()
        } else {
            format_plain(value)
        };
        self.tro.clear();
        self.result_message = None;
    }

    pub fn view(&self) -> ConverterView {
        ConverterView {
            id: self.spec.id.clone(),
            title: self.spec.title.clone(),
            unit_label: self.spec.unit_label.clone(),
            amount: self.amount.clone(),
            ratio: self.ratio.clone(),
            tro: self.tro.clone(),
            result_message: self.result_message.clone(),
        }
    }

    fn forward(&mut self, amount: Decimal, ratio: Decimal) -> Result<ConversionEvent, ConvertError> {
        let tro = round_tro(convert_forward(amount, ratio)?);
        self.tro = format_fixed(tro);
        self.result_message = Some(format!(
            "{} {} = {} Tro",
            format_plain(amount),
            self.spec.unit_label,
            self.tro
        ));
        debug!(converter = %self.spec.id, %amount, %ratio, %tro, "forward conversion");
        Ok(ConversionEvent::unstamped(
            self.spec.category,
            amount,
            ratio,
            tro,
            ConversionDirection::ForwardToTro,
        ))
    }

    fn reverse(&mut self, tro: Decimal, ratio: Decimal) -> Result<ConversionEvent, ConvertError> {
        let amount = round_tro(convert_reverse(tro, ratio)?);
        self.amount = format_fixed(amount);
        self.result_message = Some(format!(
            "{} Tro = {} {}",
            format_plain(tro),
            self.amount,
            self.spec.unit_label
        ));
        debug!(converter = %self.spec.id, %tro, %ratio, %amount, "reverse conversion");
        Ok(ConversionEvent::unstamped(
            self.spec.category,
            amount,
            ratio,
            tro,
            ConversionDirection::ReverseFromTro,
        ))
    }
}

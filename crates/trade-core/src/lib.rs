#![deny(warnings)]

//! Core domain models and invariants for the Tro exchange.
//!
//! This crate defines the serializable types shared by the conversion engine
//! (ratio table, converter descriptions, conversion events) together with
//! validation helpers that guarantee their basic invariants.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

mod notify;

pub use notify::{SubscriptionId, Subscribers};

/// One tradeable item and how many of it make up one gralat unit of value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioEntry {
    /// Display name, also the lookup key (e.g. "Mushrooms").
    pub name: String,
    /// Gralats per item (> 0).
    pub ratio: Decimal,
    /// Opaque display token, usually an emoji.
    #[serde(default)]
    pub icon: String,
}

impl RatioEntry {
    pub fn new(name: impl Into<String>, ratio: Decimal, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ratio,
            icon: icon.into(),
        }
    }
}

/// Ordered, validated collection of ratio entries.
///
/// Display order is the insertion order; lookups go by name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RatioEntry>", into = "Vec<RatioEntry>")]
pub struct RatioTable {
    entries: Vec<RatioEntry>,
}

impl RatioTable {
    /// Build a table, rejecting empty names, non-positive ratios and duplicates.
    pub fn new(entries: Vec<RatioEntry>) -> Result<Self, ValidationError> {
        validate_ratio_entries(&entries)?;
        Ok(Self { entries })
    }

    /// The official item ratios shipped with the exchange.
    pub fn builtin() -> Self {
        let d = |n: i64| Decimal::new(n, 0);
        Self {
            entries: vec![
                RatioEntry::new("Mushrooms", d(5), "🍄"),
                RatioEntry::new("Ores", d(5), "🪨"),
                RatioEntry::new("Rubys / Sapphires", d(7), "💎"),
                RatioEntry::new("Emeralds", d(8), "💚"),
                RatioEntry::new("Gold / Diamonds", d(10), "✨"),
                RatioEntry::new("Paper", d(4), "📄"),
                RatioEntry::new("Tires", d(6), "🛞"),
                RatioEntry::new("Bottles", d(5), "🍼"),
                RatioEntry::new("Newspaper", d(4), "📰"),
                RatioEntry::new("Aerolatas", d(3), "🫧"),
                RatioEntry::new("Sandscall", d(5), "🐚"),
                RatioEntry::new("Sand Dollars", d(5), "🏖️"),
                RatioEntry::new("Starfish", d(7), "⭐"),
            ],
        }
    }

    pub fn entries(&self) -> &[RatioEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RatioEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of an item in display order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&RatioEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

impl TryFrom<Vec<RatioEntry>> for RatioTable {
    type Error = ValidationError;

    fn try_from(entries: Vec<RatioEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<RatioTable> for Vec<RatioEntry> {
    fn from(table: RatioTable) -> Self {
        table.entries
    }
}

impl Default for RatioTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Which currency a converter (and the events it emits) deals in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionCategory {
    /// Mined rocks.
    PrimaryUnit,
    /// Gralats, including the value of sellable items.
    SecondaryUnit,
}

impl ConversionCategory {
    /// Lowercase unit label stored on log entries.
    pub fn input_label(self) -> &'static str {
        match self {
            ConversionCategory::PrimaryUnit => "rocks",
            ConversionCategory::SecondaryUnit => "gralats",
        }
    }
}

/// Direction a conversion was computed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionDirection {
    /// Currency amount divided by ratio.
    ForwardToTro,
    /// Tro amount multiplied by ratio.
    ReverseFromTro,
}

/// A completed conversion, as recorded in the session log.
///
/// `id` and `timestamp` are left empty by converters and filled in by the
/// log on append.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionEvent {
    #[serde(default)]
    pub id: String,
    pub category: ConversionCategory,
    pub input_amount: Decimal,
    pub input_unit_label: String,
    pub ratio: Decimal,
    pub tro_amount: Decimal,
    pub direction: ConversionDirection,
    #[serde(default)]
    pub timestamp: String,
}

impl ConversionEvent {
    /// Event descriptor without id or timestamp.
    pub fn unstamped(
        category: ConversionCategory,
        input_amount: Decimal,
        ratio: Decimal,
        tro_amount: Decimal,
        direction: ConversionDirection,
    ) -> Self {
        Self {
            id: String::new(),
            category,
            input_amount,
            input_unit_label: category.input_label().to_string(),
            ratio,
            tro_amount,
            direction,
            timestamp: String::new(),
        }
    }
}

/// Identifier of a converter instance within a session.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConverterId(pub String);

impl ConverterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConverterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// External value a converter's amount field can follow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalBinding {
    /// Total gralat value of the inventory.
    InventoryTotal,
}

/// Static description of a converter instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterSpec {
    pub id: ConverterId,
    /// Card title, e.g. "Rocks ⇄ Tro".
    pub title: String,
    pub category: ConversionCategory,
    /// Label of the amount field, used in result messages (e.g. "Rocks").
    pub unit_label: String,
    /// Ratio pre-filled in the ratio field (> 0).
    pub default_ratio: Decimal,
    #[serde(default)]
    pub binding: Option<ExternalBinding>,
}

impl ConverterSpec {
    /// Mined rocks converter, 1.3 rocks per Tro.
    pub fn rocks() -> Self {
        Self {
            id: ConverterId::new("rocks"),
            title: "Rocks ⇄ Tro".to_string(),
            category: ConversionCategory::PrimaryUnit,
            unit_label: "Rocks".to_string(),
            default_ratio: Decimal::new(13, 1),
            binding: None,
        }
    }

    /// Gralat converter, 2.0 gralats per Tro, fed by the inventory total.
    pub fn gralats() -> Self {
        Self {
            id: ConverterId::new("gralats"),
            title: "Gralats ⇄ Tro".to_string(),
            category: ConversionCategory::SecondaryUnit,
            unit_label: "Gralats".to_string(),
            default_ratio: Decimal::new(20, 1),
            binding: Some(ExternalBinding::InventoryTotal),
        }
    }
}

/// The two converters of the default session layout.
pub fn default_converters() -> Vec<ConverterSpec> {
    vec![ConverterSpec::rocks(), ConverterSpec::gralats()]
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Names and ids must contain something other than whitespace.
    #[error("name must not be empty")]
    EmptyName,
    /// Ratios must be strictly positive.
    #[error("ratio for {name} must be > 0, got {ratio}")]
    NonPositiveRatio { name: String, ratio: Decimal },
    /// Item names are lookup keys and must be unique.
    #[error("duplicate item name: {0}")]
    DuplicateItem(String),
    /// Converter ids must be unique within a session.
    #[error("duplicate converter id: {0}")]
    DuplicateConverter(String),
    /// Converters need a unit label for their result messages.
    #[error("converter {0} has an empty unit label")]
    EmptyUnitLabel(String),
    /// Input and Tro amounts disagree beyond rounding.
    #[error("event amounts are inconsistent with ratio {ratio}")]
    InconsistentEvent { ratio: Decimal },
}

/// Validate a single ratio entry.
pub fn validate_ratio_entry(e: &RatioEntry) -> Result<(), ValidationError> {
    if e.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if e.ratio <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveRatio {
            name: e.name.clone(),
            ratio: e.ratio,
        });
    }
    Ok(())
}

/// Validate entries and name uniqueness.
pub fn validate_ratio_entries(entries: &[RatioEntry]) -> Result<(), ValidationError> {
    let mut names: BTreeSet<&str> = BTreeSet::new();
    for e in entries {
        validate_ratio_entry(e)?;
        if !names.insert(e.name.as_str()) {
            return Err(ValidationError::DuplicateItem(e.name.clone()));
        }
    }
    Ok(())
}

/// Validate a converter description.
pub fn validate_converter_spec(s: &ConverterSpec) -> Result<(), ValidationError> {
    if s.id.0.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if s.unit_label.trim().is_empty() {
        return Err(ValidationError::EmptyUnitLabel(s.id.0.clone()));
    }
    if s.default_ratio <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveRatio {
            name: s.id.0.clone(),
            ratio: s.default_ratio,
        });
    }
    Ok(())
}

/// Validate a set of converters, including id uniqueness.
pub fn validate_converters(specs: &[ConverterSpec]) -> Result<(), ValidationError> {
    let mut ids: BTreeSet<&ConverterId> = BTreeSet::new();
    for s in specs {
        validate_converter_spec(s)?;
        if !ids.insert(&s.id) {
            return Err(ValidationError::DuplicateConverter(s.id.0.clone()));
        }
    }
    Ok(())
}

/// Check `input_amount == tro_amount * ratio` up to two-decimal rounding.
///
/// Forward events round the Tro side, so the product may drift by up to
/// half a cent times the ratio; reverse events round the input side by at
/// most half a cent.
pub fn validate_event(e: &ConversionEvent) -> Result<(), ValidationError> {
    let inconsistent = || ValidationError::InconsistentEvent { ratio: e.ratio };
    if e.ratio <= Decimal::ZERO {
        return Err(inconsistent());
    }
    let half_cent = Decimal::new(5, 3);
    let tolerance = half_cent
        .checked_mul(e.ratio)
        .and_then(|t| t.checked_add(half_cent))
        .ok_or_else(inconsistent)?;
    let diff = e
        .tro_amount
        .checked_mul(e.ratio)
        .and_then(|product| e.input_amount.checked_sub(product))
        .ok_or_else(inconsistent)?;
    if diff.abs() > tolerance {
        return Err(inconsistent());
    }
    Ok(())
}

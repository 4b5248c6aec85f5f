#![deny(warnings)]

//! Stateful conversion engine for the Tro exchange.
//!
//! A [`Session`] owns an [`InventoryAggregator`], a set of
//! [`ConverterUnit`]s and a [`ConversionLog`]. User actions go in through
//! [`Session::dispatch`]; every state change comes back out as a
//! [`SessionEvent`], both as the return value and through subscribers.

pub mod config;
pub mod conversion_log;
pub mod converter;
pub mod inventory;
pub mod session;

pub use config::{ConfigError, SessionConfig};
pub use conversion_log::{describe_entry, entry_result, ConversionLog};
pub use converter::{ConverterField, ConverterUnit, ConverterView};
pub use inventory::{InventoryAggregator, InventoryLine, QuantityError};
pub use session::{Session, SessionAction, SessionEvent};

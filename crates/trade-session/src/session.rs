//! Session controller: wires the inventory into its bound converters and
//! every converter into the conversion log.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use trade_core::{ConversionEvent, ConverterId, ExternalBinding, SubscriptionId, Subscribers};

use crate::config::{ConfigError, SessionConfig};
use crate::conversion_log::ConversionLog;
use crate::converter::{ConverterField, ConverterUnit, ConverterView};
use crate::inventory::InventoryAggregator;

/// Discrete user actions accepted from the display layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionAction {
    SetQuantity {
        item: String,
        text: String,
    },
    ClearInventory,
    EditField {
        converter: ConverterId,
        field: ConverterField,
        text: String,
    },
    /// Confirm action (Enter key or the calculate button) on one field.
    Confirm {
        converter: ConverterId,
        field: ConverterField,
    },
    ClearLog,
}

/// Change notifications, published after an action has been fully applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    InventoryTotalChanged(Decimal),
    InventoryCleared,
    ConverterUpdated(ConverterView),
    ConversionLogged(ConversionEvent),
    LogCleared,
}

/// The whole conversion engine behind one screen.
///
/// The inventory, the converters and the log each keep their own state;
/// the session only moves values between them and hands out read-only
/// views. Rejected input is logged and dropped, so no action can fail.
#[derive(Debug)]
pub struct Session {
    inventory: InventoryAggregator,
    converters: Vec<ConverterUnit>,
    log: ConversionLog,
    subscribers: Subscribers<SessionEvent>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            items = config.ratios.len(),
            converters = config.converters.len(),
            "session started"
        );
        Ok(Self::build(config))
    }

    /// Apply one action, notify subscribers, and return the same events.
    pub fn dispatch(&mut self, action: SessionAction) -> Vec<SessionEvent> {
        let events = self.apply(action);
        for event in &events {
            self.subscribers.notify(event);
        }
        events
    }

    pub fn set_quantity(&mut self, item: &str, text: &str) -> Vec<SessionEvent> {
        self.dispatch(SessionAction::SetQuantity {
            item: item.to_string(),
            text: text.to_string(),
        })
    }

    pub fn clear_inventory(&mut self) -> Vec<SessionEvent> {
        self.dispatch(SessionAction::ClearInventory)
    }

    pub fn edit_field(
        &mut self,
        converter: &ConverterId,
        field: ConverterField,
        text: &str,
    ) -> Vec<SessionEvent> {
        self.dispatch(SessionAction::EditField {
            converter: converter.clone(),
            field,
            text: text.to_string(),
        })
    }

    pub fn confirm(&mut self, converter: &ConverterId, field: ConverterField) -> Vec<SessionEvent> {
        self.dispatch(SessionAction::Confirm {
            converter: converter.clone(),
            field,
        })
    }

    /// The calculate button: a forward conversion from the amount field.
    pub fn calculate(&mut self, converter: &ConverterId) -> Vec<SessionEvent> {
        self.confirm(converter, ConverterField::Amount)
    }

    pub fn clear_log(&mut self) -> Vec<SessionEvent> {
        self.dispatch(SessionAction::ClearLog)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn inventory(&self) -> &InventoryAggregator {
        &self.inventory
    }

    pub fn inventory_total(&self) -> Decimal {
        self.inventory.total()
    }

    pub fn converters(&self) -> &[ConverterUnit] {
        &self.converters
    }

    pub fn converter(&self, id: &ConverterId) -> Option<&ConverterUnit> {
        self.converters.iter().find(|c| c.id() == id)
    }

    pub fn log(&self) -> &ConversionLog {
        &self.log
    }

    pub fn total_tro(&self) -> Decimal {
        self.log.total_tro()
    }

    fn build(config: SessionConfig) -> Self {
        let SessionConfig {
            rng_seed,
            ratios,
            converters,
        } = config;
        Self {
            inventory: InventoryAggregator::new(ratios),
            converters: converters.into_iter().map(ConverterUnit::new).collect(),
            log: ConversionLog::new(rng_seed),
            subscribers: Subscribers::new(),
        }
    }

    fn apply(&mut self, action: SessionAction) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        match action {
            SessionAction::SetQuantity { item, text } => {
                match self.inventory.set_quantity(&item, &text) {
                    Ok(Some(total)) => self.propagate_total(total, &mut events),
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "quantity edit ignored"),
                }
            }
            SessionAction::ClearInventory => {
                events.push(SessionEvent::InventoryCleared);
                if let Some(total) = self.inventory.clear_all() {
                    self.propagate_total(total, &mut events);
                }
            }
            SessionAction::EditField {
                converter,
                field,
                text,
            } => {
                let Some(unit) = find_unit(&mut self.converters, &converter) else {
                    warn!(%converter, "edit for unknown converter ignored");
                    return events;
                };
                match unit.edit(field, &text) {
                    Ok(()) => events.push(SessionEvent::ConverterUpdated(unit.view())),
                    Err(e) => warn!(%converter, ?field, error = %e, "field edit ignored"),
                }
            }
            SessionAction::Confirm { converter, field } => {
                let Some(unit) = find_unit(&mut self.converters, &converter) else {
                    warn!(%converter, "confirm for unknown converter ignored");
                    return events;
                };
                match unit.confirm(field) {
                    Ok(event) => {
                        events.push(SessionEvent::ConverterUpdated(unit.view()));
                        let logged = self.log.append(event).clone();
                        events.push(SessionEvent::ConversionLogged(logged));
                    }
                    Err(e) => debug!(%converter, ?field, error = %e, "nothing to convert"),
                }
            }
            SessionAction::ClearLog => {
                self.log.clear();
                events.push(SessionEvent::LogCleared);
            }
        }
        events
    }

    fn propagate_total(&mut self, total: Decimal, events: &mut Vec<SessionEvent>) {
        events.push(SessionEvent::InventoryTotalChanged(total));
        for unit in self
            .converters
            .iter_mut()
            .filter(|u| u.spec().binding == Some(ExternalBinding::InventoryTotal))
        {
            unit.apply_external(total);
            events.push(SessionEvent::ConverterUpdated(unit.view()));
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        // The built-in table and converters are always valid.
        Self::build(SessionConfig::default())
    }
}

fn find_unit<'a>(
    units: &'a mut [ConverterUnit],
    id: &ConverterId,
) -> Option<&'a mut ConverterUnit> {
    units.iter_mut().find(|u| u.id() == id)
}

//! Plain-text views of a session.

use std::fmt::Write;
use trade_econ::{format_fixed, format_plain};
use trade_session::{describe_entry, entry_result, ConverterView, Session, SessionEvent};

pub fn inventory(session: &Session) -> String {
    let inv = session.inventory();
    let mut out = format!("Inventory: {} G\n", format_plain(inv.total()));
    for line in inv.lines() {
        let qty = if line.raw.is_empty() { "-" } else { line.raw };
        let _ = write!(
            out,
            "  {} {:<18} {:>3}:1 {:>8}",
            line.entry.icon,
            line.entry.name,
            format_plain(line.entry.ratio),
            qty
        );
        if line.is_active() {
            let _ = write!(out, "  +{} G", format_plain(line.value));
        }
        out.push('\n');
    }
    out
}

pub fn converter(view: &ConverterView) -> String {
    let blank = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
    let mut out = format!(
        "{} [{}]\n  {}: {}  ratio: {}:1  Tro: {}",
        view.title,
        view.id,
        view.unit_label,
        blank(view.amount.as_str()),
        blank(view.ratio.as_str()),
        blank(view.tro.as_str())
    );
    if let Some(msg) = &view.result_message {
        let _ = write!(out, "\n  ✔ {msg}");
    }
    out
}

pub fn converters(session: &Session) -> String {
    session
        .converters()
        .iter()
        .map(|c| converter(&c.view()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn log(session: &Session) -> String {
    let log = session.log();
    let mut out = format!("Conversion Log ({})\n", log.len());
    if log.is_empty() {
        out.push_str("  No conversions yet\n");
    }
    for e in log.newest_first() {
        let _ = writeln!(
            out,
            "  [{}] {:<8} {}  {}",
            e.timestamp,
            e.input_unit_label,
            describe_entry(e),
            entry_result(e)
        );
    }
    let _ = write!(out, "Total Trade Value: {} Tro", format_fixed(log.total_tro()));
    out
}

pub fn overview(session: &Session) -> String {
    format!(
        "{}\n{}\nSession Total: {} Tro",
        inventory(session),
        converters(session),
        format_fixed(session.total_tro())
    )
}

/// One line per event, for echoing what an action changed.
pub fn events(events: &[SessionEvent]) -> String {
    if events.is_empty() {
        return "(no change)".to_string();
    }
    events
        .iter()
        .map(|e| match e {
            SessionEvent::InventoryTotalChanged(total) => {
                format!("inventory total: {} G", format_plain(*total))
            }
            SessionEvent::InventoryCleared => "inventory cleared".to_string(),
            SessionEvent::ConverterUpdated(view) => converter(view),
            SessionEvent::ConversionLogged(entry) => format!(
                "logged {}: {} {}",
                entry.id,
                describe_entry(entry),
                entry_result(entry)
            ),
            SessionEvent::LogCleared => "log cleared".to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

use crate::formatter::format_outage;
use crate::message::NotificationMessage;
use crate::outage::{BusNumber, OutageRow};
use std::collections::HashMap;

/// Formatted outage messages per bus, in the order the rows were published.
/// A bus without an entry has no active outage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutageIndex(HashMap<BusNumber, Vec<NotificationMessage>>);

impl OutageIndex {
    pub fn build(rows: &[OutageRow]) -> Self {
        let mut index: HashMap<BusNumber, Vec<NotificationMessage>> = HashMap::new();
        for row in rows {
            index
                .entry(row.bus.clone())
                .or_default()
                .push(format_outage(row, &row.school));
        }
        OutageIndex(index)
    }

    pub fn outages_for(&self, bus: &BusNumber) -> &[NotificationMessage] {
        self.0.get(bus).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has_outages(&self, bus: &BusNumber) -> bool {
        !self.outages_for(bus).is_empty()
    }

    pub fn bus_count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

use crate::contracts::SubscriberContracts;
use crate::recipient::Recipient;
use crate::resolver;
use bus_schedule::outage_index::OutageIndex;

pub use crate::resolver::ResolvedNotification;

impl SubscriberContracts {
    pub fn resolve_notification(
        recipient: &Recipient,
        outages: &OutageIndex,
    ) -> Option<ResolvedNotification> {
        resolver::resolve(recipient, outages)
    }
}

use crate::recipient::Recipient;
use bus_schedule::formatter::format_running_as_scheduled;
use bus_schedule::message::NotificationMessage;
use bus_schedule::outage_index::OutageIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedNotification {
    /// An outage affecting the recipient's bus and school. Subject to
    /// comparison against the previous cycle.
    Outage(NotificationMessage),
    /// Confirmation for an always-notify recipient whose bus has no outage.
    /// Sent every cycle.
    RunningAsScheduled(NotificationMessage),
}

impl ResolvedNotification {
    pub fn message(&self) -> &NotificationMessage {
        match self {
            Self::Outage(message) => message,
            Self::RunningAsScheduled(message) => message,
        }
    }
}

pub(crate) fn resolve(recipient: &Recipient, outages: &OutageIndex) -> Option<ResolvedNotification> {
    let bus_outages = outages.outages_for(&recipient.bus);

    if bus_outages.is_empty() {
        return recipient.always_notify.then(|| {
            ResolvedNotification::RunningAsScheduled(format_running_as_scheduled(
                &recipient.bus,
                &recipient.school,
            ))
        });
    }

    // Only the first outage naming the school is surfaced.
    bus_outages
        .iter()
        .find(|message| message.normalized().contains(&recipient.school))
        .cloned()
        .map(ResolvedNotification::Outage)
}

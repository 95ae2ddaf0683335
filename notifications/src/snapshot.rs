use bus_schedule::message::NotificationMessage;
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use subscribers::recipient::PhoneNumber;

/// Messages computed for each phone number in one cycle. Phone numbers keep
/// the order they were first added in; equality ignores that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationSnapshot(IndexMap<PhoneNumber, Vec<NotificationMessage>>);

impl NotificationSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, phone_number: PhoneNumber, message: NotificationMessage) {
        self.0.entry(phone_number).or_default().push(message);
    }

    pub fn extend(
        &mut self,
        phone_number: PhoneNumber,
        messages: impl IntoIterator<Item = NotificationMessage>,
    ) {
        self.0.entry(phone_number).or_default().extend(messages);
    }

    pub fn messages_for(&self, phone_number: &PhoneNumber) -> &[NotificationMessage] {
        self.0
            .get(phone_number)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn phone_numbers(&self) -> impl Iterator<Item = &PhoneNumber> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PhoneNumber, &[NotificationMessage])> {
        self.0
            .iter()
            .map(|(phone_number, messages)| (phone_number, messages.as_slice()))
    }

    pub fn message_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(PhoneNumber, NotificationMessage)> for NotificationSnapshot {
    fn from_iter<T: IntoIterator<Item = (PhoneNumber, NotificationMessage)>>(iter: T) -> Self {
        let mut snapshot = NotificationSnapshot::new();
        for (phone_number, message) in iter {
            snapshot.push(phone_number, message);
        }
        snapshot
    }
}

/// Persistence of the snapshot derived in the previous cycle.
pub trait SnapshotStore: Send + Sync {
    /// An absent snapshot is empty history, not an error.
    fn load(&self) -> anyhow::Result<NotificationSnapshot>;

    fn save(&self, snapshot: &NotificationSnapshot) -> anyhow::Result<()>;
}

use crate::snapshot::NotificationSnapshot;
use bus_schedule::formatter::reverse_message;
use bus_schedule::message::{NormalizedMessage, NotificationMessage};
use indexmap::IndexSet;
use std::collections::HashSet;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Send the current snapshot as is.
    Resend,
    /// Send only what changed since the previous snapshot.
    AgainstPrevious,
}

impl From<bool> for Comparison {
    fn from(compare: bool) -> Self {
        if compare {
            Comparison::AgainstPrevious
        } else {
            Comparison::Resend
        }
    }
}

pub struct Reconciler;

impl Reconciler {
    /// Computes what to transmit this cycle. When comparing, a phone number
    /// whose messages are unchanged (ignoring case) receives nothing; otherwise
    /// it receives its new messages followed by a reversal of every message
    /// that is no longer current.
    #[tracing::instrument(skip_all, fields(?comparison), level = "info")]
    pub fn reconcile(
        current: &NotificationSnapshot,
        previous: &NotificationSnapshot,
        comparison: Comparison,
    ) -> NotificationSnapshot {
        if comparison == Comparison::Resend {
            return current.clone();
        }

        let phone_numbers = current
            .phone_numbers()
            .chain(previous.phone_numbers())
            .collect::<IndexSet<_>>();

        let mut outgoing = NotificationSnapshot::new();
        let mut unchanged = 0;
        for phone_number in phone_numbers {
            let now = MessageSet::new(current.messages_for(phone_number));
            let before = MessageSet::new(previous.messages_for(phone_number));

            if now.keys == before.keys {
                unchanged += 1;
                continue;
            }

            let fresh = now.missing_from(&before.keys).cloned();
            let cleared = before.missing_from(&now.keys).map(reverse_message);
            outgoing.extend(phone_number.clone(), fresh.chain(cleared));
        }

        info!(
            changed = outgoing.len(),
            unchanged, "Compared notifications against the previous cycle"
        );
        outgoing
    }
}

/// Messages of one phone number, deduplicated by their normalized form.
struct MessageSet<'a> {
    ordered: Vec<(NormalizedMessage, &'a NotificationMessage)>,
    keys: HashSet<NormalizedMessage>,
}

impl<'a> MessageSet<'a> {
    fn new(messages: &'a [NotificationMessage]) -> Self {
        let mut keys = HashSet::with_capacity(messages.len());
        let ordered = messages
            .iter()
            .filter_map(|message| {
                let key = message.normalized();
                keys.insert(key.clone()).then_some((key, message))
            })
            .collect();
        Self { ordered, keys }
    }

    fn missing_from<'b>(
        &'b self,
        other: &'b HashSet<NormalizedMessage>,
    ) -> impl Iterator<Item = &'a NotificationMessage> + 'b {
        self.ordered
            .iter()
            .filter(|(key, _)| !other.contains(key))
            .map(|(_, message)| *message)
    }
}

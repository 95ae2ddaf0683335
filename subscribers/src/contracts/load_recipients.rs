use crate::contracts::SubscriberContracts;
use crate::recipient::Recipient;
use tracing::info;

pub use crate::file_access::RecipientsFile;

/// Supplies the recipients to consider this cycle, in file order.
pub trait RecipientStore: Send + Sync {
    fn load(&self) -> anyhow::Result<Vec<Recipient>>;
}

impl SubscriberContracts {
    #[tracing::instrument(err, skip(store), level = "info")]
    pub fn load_recipients(store: &dyn RecipientStore) -> anyhow::Result<Vec<Recipient>> {
        let recipients = store.load()?;
        let always_notify = recipients
            .iter()
            .filter(|recipient| recipient.always_notify)
            .count();
        info!(
            recipients = recipients.len(),
            always_notify, "Recipients loaded"
        );
        Ok(recipients)
    }
}

pub mod sms;

use crate::config::DebugChannel;
use crate::snapshot::NotificationSnapshot;
use async_trait::async_trait;
use bus_schedule::message::NotificationMessage;
use std::sync::Arc;
use subscribers::recipient::PhoneNumber;
use tracing::{debug, error, info};

/// Delivers one text message. Retries and acknowledgements are the
/// transport's own business.
#[async_trait]
pub trait MessagingTransport: Send + Sync {
    async fn send(&self, body: &str, from: &PhoneNumber, to: &PhoneNumber) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn merge(self, other: DispatchReport) -> DispatchReport {
        DispatchReport {
            delivered: self.delivered + other.delivered,
            failed: self.failed + other.failed,
        }
    }
}

pub struct Dispatcher {
    transport: Arc<dyn MessagingTransport>,
    from: PhoneNumber,
    debug: DebugChannel,
    prefix: Option<String>,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn MessagingTransport>,
        from: PhoneNumber,
        debug: DebugChannel,
        prefix: Option<String>,
    ) -> Self {
        Self {
            transport,
            from,
            debug,
            prefix: prefix.filter(|prefix| !prefix.is_empty()),
        }
    }

    pub fn debug_recipient(&self) -> &PhoneNumber {
        &self.debug.to_phone
    }

    /// Sends every message in order, one at a time. A failed delivery is
    /// reported to the debug channel and does not stop the remaining ones.
    #[tracing::instrument(skip_all, fields(recipients = snapshot.len()), level = "info")]
    pub async fn dispatch(&self, snapshot: &NotificationSnapshot) -> DispatchReport {
        let mut report = DispatchReport::default();
        for (phone_number, messages) in snapshot.iter() {
            for message in messages {
                let body = self.body(message);
                match self.transport.send(&body, &self.from, phone_number).await {
                    Ok(()) => {
                        debug!(%phone_number, "Notification delivered");
                        report.delivered += 1;
                    }
                    Err(err) => {
                        error!(%phone_number, error = ?err, "Failed to deliver notification");
                        report.failed += 1;
                        self.report_failure(&err, phone_number, message).await;
                    }
                }
            }
        }
        info!(
            delivered = report.delivered,
            failed = report.failed,
            "Dispatch finished"
        );
        report
    }

    fn body(&self, message: &NotificationMessage) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix} - {message}"),
            None => message.to_string(),
        }
    }

    async fn report_failure(
        &self,
        err: &anyhow::Error,
        phone_number: &PhoneNumber,
        message: &NotificationMessage,
    ) {
        let body = format!("Bus Error: {err:#} / Phone: {phone_number} / Message: {message}");
        if let Err(err) = self
            .transport
            .send(&body, &self.debug.from_phone, &self.debug.to_phone)
            .await
        {
            error!(error = ?err, "Failed to report a delivery failure to the debug channel");
        }
    }
}

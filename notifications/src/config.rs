use secrecy::Secret;
use serde::Deserialize;
use subscribers::recipient::PhoneNumber;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct TwilioConfig {
    pub host: Url,
    pub account_sid: String,
    pub auth_token: Secret<String>,
    /// Sender of every recipient notification.
    pub from_phone: PhoneNumber,
}

/// Fixed destination for diagnostics about the notifier itself.
#[derive(Debug, Deserialize, Clone)]
pub struct DebugChannel {
    pub from_phone: PhoneNumber,
    pub to_phone: PhoneNumber,
}

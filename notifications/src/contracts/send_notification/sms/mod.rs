use crate::config::TwilioConfig;
use crate::contracts::send_notification::MessagingTransport;
use anyhow::Context;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use shared_kernel::http_client::{BasicAuth, HttpClient};
use subscribers::recipient::PhoneNumber;
use tracing::debug;
use url::Url;

/// Sends text messages through the Twilio Messages API.
pub struct TwilioSms {
    config: TwilioConfig,
}

impl TwilioSms {
    pub fn new(config: TwilioConfig) -> Self {
        Self { config }
    }

    fn messages_url(&self) -> anyhow::Result<Url> {
        let path = format!("2010-04-01/Accounts/{}/Messages.json", self.config.account_sid);
        self.config
            .host
            .join(&path)
            .with_context(|| format!("Invalid messages url {}{path}", self.config.host))
    }
}

#[derive(Serialize)]
struct MessageForm<'a> {
    #[serde(rename = "Body")]
    body: &'a str,
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "To")]
    to: &'a str,
}

#[derive(Deserialize, Debug)]
struct CreatedMessage {
    sid: String,
}

#[async_trait]
impl MessagingTransport for TwilioSms {
    #[tracing::instrument(skip(self, body), level = "debug")]
    async fn send(&self, body: &str, from: &PhoneNumber, to: &PhoneNumber) -> anyhow::Result<()> {
        let url = self.messages_url()?;
        let auth = BasicAuth {
            username: &self.config.account_sid,
            password: self.config.auth_token.expose_secret(),
        };
        let form = MessageForm {
            body,
            from: from.as_str(),
            to: to.as_str(),
        };

        let created = HttpClient::post_form::<CreatedMessage, _>(url, auth, &form).await?;
        debug!(sid = %created.sid, "Message accepted");
        Ok(())
    }
}

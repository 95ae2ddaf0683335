use crate::config::ScheduleSettings;
use crate::contracts::read_schedule::ScheduleSource;
use async_trait::async_trait;
use shared_kernel::http_client::HttpClient;
use url::Url;

/// Downloads the published schedule page.
pub struct WebPageReader {
    url: Url,
}

impl WebPageReader {
    pub fn new(settings: &ScheduleSettings) -> Self {
        Self {
            url: settings.url.clone(),
        }
    }
}

#[async_trait]
impl ScheduleSource for WebPageReader {
    #[tracing::instrument(err, skip(self), fields(url = %self.url), level = "info")]
    async fn fetch(&self) -> anyhow::Result<String> {
        HttpClient::get_text(self.url.clone()).await
    }
}

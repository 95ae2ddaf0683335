use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleSettings {
    /// Page publishing the bus outage table.
    pub url: Url,
}

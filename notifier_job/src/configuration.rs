use anyhow::Context;
use bus_schedule::config::ScheduleSettings;
use file_store::configuration::StorageSettings;
use notifications::config::{DebugChannel, TwilioConfig};
use serde::Deserialize;
use shared_kernel::configuration::config;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelemetrySettings {
    pub export_traces: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub schedule: ScheduleSettings,
    pub storage: StorageSettings,
    pub twilio: TwilioConfig,
    pub debug: DebugChannel,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    pub fn parse() -> anyhow::Result<Settings> {
        config::<Settings>().context("Failed to deserialize settings to notifier settings")
    }
}

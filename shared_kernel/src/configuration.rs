use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Loads `Settings` from `./configuration` relative to the working directory.
pub fn config<Settings: DeserializeOwned>() -> anyhow::Result<Settings> {
    let base_path = std::env::current_dir().context("Failed to determine the current directory")?;
    config_from(&base_path)
}

/// Reads `configuration/base.yaml` (`test.yaml` under test) below `base_path`
/// and overlays `APP_` prefixed environment variables, e.g. `APP_TWILIO__AUTH_TOKEN`.
pub fn config_from<Settings: DeserializeOwned>(base_path: &Path) -> anyhow::Result<Settings> {
    let configuration_directory = base_path.join("configuration");
    let file = if cfg!(test) { "test.yaml" } else { "base.yaml" };
    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join(file)))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .with_context(|| {
            format!(
                "Failed to build configuration from {}",
                configuration_directory.display()
            )
        })?;

    settings
        .try_deserialize::<Settings>()
        .context("Failed to deserialize settings")
}

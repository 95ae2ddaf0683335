pub mod configuration;
pub mod schedule_logs;
pub mod snapshot_file;

use bus_schedule::web_page_reader::WebPageReader;
use clap::Parser;
use file_store::schedule_logs::ScheduleLogs;
use file_store::snapshot_file::JsonSnapshotFile;
use notifications::contracts::reconcile::Comparison;
use notifications::contracts::send_notification::sms::TwilioSms;
use notifications::contracts::send_notification::Dispatcher;
use notifier_job::cli::Cli;
use notifier_job::configuration::Settings;
use notifier_job::cycle::NotificationCycle;
use std::sync::Arc;
use subscribers::contracts::load_recipients::RecipientsFile;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::parse()?;
    shared_kernel::tracing::config_telemetry(
        "bus_outage_notifier",
        settings.telemetry.export_traces,
    )?;
    let result = start(cli, settings).await;
    shared_kernel::tracing::shutdown_global_tracer_provider();
    result
}

async fn start(cli: Cli, settings: Settings) -> anyhow::Result<()> {
    let dispatcher = Dispatcher::new(
        Arc::new(TwilioSms::new(settings.twilio.clone())),
        settings.twilio.from_phone.clone(),
        settings.debug.clone(),
        cli.prefix,
    );

    let mut cycle = NotificationCycle::new(
        Arc::new(WebPageReader::new(&settings.schedule)),
        Arc::new(RecipientsFile::new(&settings.storage.recipients_file)),
        Arc::new(JsonSnapshotFile::new(&settings.storage.snapshot_file)),
        dispatcher,
    )
    .comparing(Comparison::from(cli.compare));

    if cli.log {
        cycle = cycle.with_archive(Arc::new(ScheduleLogs::new(
            &settings.storage.logs_dir,
            settings.storage.log_threshold,
        )));
    }

    let report = cycle.run().await?;
    info!(
        schema_valid = report.schema_valid,
        sent = report.sent,
        always_sent = report.always_sent,
        failed = report.failed,
        "Notification cycle finished"
    );
    Ok(())
}

use anyhow::Context;
use bus_schedule::contracts::archive_schedule::ScheduleArchive;
use bus_schedule::contracts::read_schedule::{Schedule, ScheduleReader, ScheduleSource};
use bus_schedule::message::NotificationMessage;
use bus_schedule::outage_index::OutageIndex;
use bus_schedule::schema::ColumnMap;
use itertools::Itertools;
use notifications::contracts::reconcile::{Comparison, Reconciler};
use notifications::contracts::send_notification::Dispatcher;
use notifications::snapshot::{NotificationSnapshot, SnapshotStore};
use std::sync::Arc;
use subscribers::contracts::load_recipients::RecipientStore;
use subscribers::contracts::resolve_notification::ResolvedNotification;
use subscribers::contracts::SubscriberContracts;
use subscribers::recipient::Recipient;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub schema_valid: bool,
    /// Outage and reversal texts delivered.
    pub sent: usize,
    /// "Running as scheduled" texts delivered.
    pub always_sent: usize,
    pub failed: usize,
}

/// One fetch, reconciliation and delivery pass.
pub struct NotificationCycle {
    source: Arc<dyn ScheduleSource>,
    archive: Option<Arc<dyn ScheduleArchive>>,
    recipients: Arc<dyn RecipientStore>,
    snapshots: Arc<dyn SnapshotStore>,
    dispatcher: Dispatcher,
    comparison: Comparison,
}

impl NotificationCycle {
    pub fn new(
        source: Arc<dyn ScheduleSource>,
        recipients: Arc<dyn RecipientStore>,
        snapshots: Arc<dyn SnapshotStore>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            source,
            archive: None,
            recipients,
            snapshots,
            dispatcher,
            comparison: Comparison::Resend,
        }
    }

    pub fn with_archive(mut self, archive: Arc<dyn ScheduleArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn comparing(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    #[tracing::instrument(err, skip(self), fields(comparison = ?self.comparison), level = "info")]
    pub async fn run(&self) -> anyhow::Result<CycleReport> {
        let raw_document = self
            .source
            .fetch()
            .await
            .context("Failed to fetch the schedule")?;

        if let Some(archive) = &self.archive {
            archive.archive(&raw_document)?;
        }

        let outages = match ScheduleReader::read(&raw_document)? {
            Schedule::Published(outages) => outages,
            Schedule::InvalidSchema(columns) => return Ok(self.report_invalid_schema(&columns).await),
        };

        let recipients = SubscriberContracts::load_recipients(self.recipients.as_ref())?;
        let (current, always) = derive_snapshots(&recipients, &outages);

        let previous = match self.comparison {
            Comparison::AgainstPrevious => self.snapshots.load()?,
            Comparison::Resend => NotificationSnapshot::new(),
        };
        let texts = Reconciler::reconcile(&current, &previous, self.comparison);

        let texts_report = self.dispatcher.dispatch(&texts).await;
        info!(texts = ?texts, "Normal texts sent");
        let always_report = self.dispatcher.dispatch(&always).await;
        info!(texts = ?always, "Always texts sent");

        self.snapshots.save(&current)?;

        Ok(CycleReport {
            schema_valid: true,
            sent: texts_report.delivered,
            always_sent: always_report.delivered,
            failed: texts_report.merge(always_report).failed,
        })
    }

    async fn report_invalid_schema(&self, columns: &ColumnMap) -> CycleReport {
        let diagnostic = NotificationMessage::new(format!(
            "Error: Table does not have proper schema.\n\n{}",
            columns.keys().join(", ")
        ));
        let diagnostics = NotificationSnapshot::from_iter([(
            self.dispatcher.debug_recipient().clone(),
            diagnostic,
        )]);

        let report = self.dispatcher.dispatch(&diagnostics).await;
        CycleReport {
            schema_valid: false,
            sent: report.delivered,
            always_sent: 0,
            failed: report.failed,
        }
    }
}

/// Splits what each recipient should hear into the snapshot that is compared
/// against history and the one that is always sent.
fn derive_snapshots(
    recipients: &[Recipient],
    outages: &OutageIndex,
) -> (NotificationSnapshot, NotificationSnapshot) {
    let mut current = NotificationSnapshot::new();
    let mut always = NotificationSnapshot::new();
    for recipient in recipients {
        let phone_number = recipient.phone_number.clone();
        match SubscriberContracts::resolve_notification(recipient, outages) {
            Some(ResolvedNotification::Outage(message)) => current.push(phone_number, message),
            Some(ResolvedNotification::RunningAsScheduled(message)) => {
                always.push(phone_number, message)
            }
            None => {}
        }
    }
    info!(
        recipients = current.len(),
        always_notify = always.len(),
        "Notifications derived"
    );
    (current, always)
}

#[cfg(test)]
mod tests {
    use super::{CycleReport, NotificationCycle};
    use async_trait::async_trait;
    use bus_schedule::contracts::archive_schedule::ScheduleArchive;
    use bus_schedule::contracts::read_schedule::ScheduleSource;
    use bus_schedule::message::NotificationMessage;
    use notifications::config::DebugChannel;
    use notifications::contracts::reconcile::Comparison;
    use notifications::contracts::send_notification::{Dispatcher, MessagingTransport};
    use notifications::snapshot::{NotificationSnapshot, SnapshotStore};
    use rstest::rstest;
    use std::sync::{Arc, Mutex};
    use subscribers::contracts::load_recipients::RecipientStore;
    use subscribers::recipient::{PhoneNumber, Recipient};

    const DEBUG_PHONE: &str = "555-9999";

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body><script>
    $('#grid').DataTable({{
        data: dataArray,
        columns: [
            {{ "title": "Bus" }},
            {{ "title": "Sub Bus" }},
            {{ "title": "Schools" }},
            {{ "title": "Schedules" }},
            {{ "title": "Impact" }}
        ]
    }});
    var dataArray = [{rows}];
</script></body></html>"#
        )
    }

    struct Page(Mutex<String>);

    impl Page {
        fn new(document: String) -> Arc<Self> {
            Arc::new(Self(Mutex::new(document)))
        }

        fn publish(&self, document: String) {
            *self.0.lock().unwrap() = document;
        }
    }

    #[async_trait]
    impl ScheduleSource for Page {
        async fn fetch(&self) -> anyhow::Result<String> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    struct Recipients(Vec<Recipient>);

    impl RecipientStore for Recipients {
        fn load(&self) -> anyhow::Result<Vec<Recipient>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct Snapshots {
        stored: Mutex<Option<NotificationSnapshot>>,
    }

    impl SnapshotStore for Snapshots {
        fn load(&self) -> anyhow::Result<NotificationSnapshot> {
            Ok(self.stored.lock().unwrap().clone().unwrap_or_default())
        }

        fn save(&self, snapshot: &NotificationSnapshot) -> anyhow::Result<()> {
            *self.stored.lock().unwrap() = Some(snapshot.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Archive(Mutex<Vec<String>>);

    impl ScheduleArchive for Archive {
        fn archive(&self, raw_document: &str) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(raw_document.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Phones {
        unreachable: Vec<String>,
        inbox: Mutex<Vec<(String, String)>>,
    }

    impl Phones {
        fn take(&self) -> Vec<(String, String)> {
            std::mem::take(&mut *self.inbox.lock().unwrap())
        }
    }

    #[async_trait]
    impl MessagingTransport for Phones {
        async fn send(
            &self,
            body: &str,
            _from: &PhoneNumber,
            to: &PhoneNumber,
        ) -> anyhow::Result<()> {
            if self.unreachable.iter().any(|phone| to == phone.as_str()) {
                anyhow::bail!("unreachable");
            }
            self.inbox
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn recipient(phone: &str, bus: &str, school: &str, always: bool) -> Recipient {
        Recipient {
            phone_number: PhoneNumber::from(phone),
            bus: bus.into(),
            school: school.to_string(),
            always_notify: always,
        }
    }

    struct Harness {
        page: Arc<Page>,
        snapshots: Arc<Snapshots>,
        phones: Arc<Phones>,
        cycle: NotificationCycle,
    }

    fn harness(
        document: String,
        recipients: Vec<Recipient>,
        comparison: Comparison,
        prefix: Option<&str>,
        phones: Phones,
    ) -> Harness {
        let page = Page::new(document);
        let snapshots = Arc::new(Snapshots::default());
        let phones = Arc::new(phones);
        let dispatcher = Dispatcher::new(
            phones.clone(),
            PhoneNumber::from("555-0001"),
            DebugChannel {
                from_phone: PhoneNumber::from("555-0000"),
                to_phone: PhoneNumber::from(DEBUG_PHONE),
            },
            prefix.map(String::from),
        );
        let cycle = NotificationCycle::new(
            page.clone(),
            Arc::new(Recipients(recipients)),
            snapshots.clone(),
            dispatcher,
        )
        .comparing(comparison);
        Harness {
            page,
            snapshots,
            phones,
            cycle,
        }
    }

    #[tokio::test]
    async fn test_outage_is_announced_and_its_clearance_reversed() {
        let h = harness(
            page("['12','','Oak','AM','minor'],['40','7','Pine','PM','late']"),
            vec![recipient("555-1", "12", "oak", false)],
            Comparison::AgainstPrevious,
            None,
            Phones::default(),
        );

        h.cycle.run().await.unwrap();
        let inbox = h.phones.take();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].0, "555-1");
        assert!(inbox[0].1.contains("Bus # -- 12"));
        assert!(inbox[0].1.contains("Impact -- MINOR"));

        h.page.publish(page("['40','7','Pine','PM','late']"));
        let report = h.cycle.run().await.unwrap();

        let inbox = h.phones.take();
        assert_eq!(report.sent, 1);
        assert_eq!(inbox.len(), 1);
        let reversal = &inbox[0].1;
        assert!(reversal.starts_with("Bus is now running:"));
        assert!(reversal.contains("Time -- AM"));
        assert!(reversal.contains("School -- Oak"));
        assert!(reversal.contains("Sub # -- NO SUB!"));
        assert!(!reversal.contains("Impact"));
    }

    #[tokio::test]
    async fn test_unchanged_outage_is_not_repeated_when_comparing() {
        let h = harness(
            page("['12','','Oak','AM','minor']"),
            vec![recipient("555-1", "12", "oak", false)],
            Comparison::AgainstPrevious,
            None,
            Phones::default(),
        );

        h.cycle.run().await.unwrap();
        h.phones.take();
        let report = h.cycle.run().await.unwrap();

        assert_eq!(report.sent, 0);
        assert!(h.phones.take().is_empty());
    }

    #[tokio::test]
    async fn test_outage_is_repeated_without_comparison() {
        let h = harness(
            page("['12','','Oak','AM','minor']"),
            vec![recipient("555-1", "12", "oak", false)],
            Comparison::Resend,
            None,
            Phones::default(),
        );

        h.cycle.run().await.unwrap();
        h.cycle.run().await.unwrap();

        assert_eq!(h.phones.take().len(), 2);
    }

    #[rstest]
    #[case(Comparison::Resend)]
    #[case(Comparison::AgainstPrevious)]
    #[tokio::test]
    async fn test_always_notify_recipient_hears_every_cycle(#[case] comparison: Comparison) {
        let h = harness(
            page("['40','7','Pine','PM','late']"),
            vec![recipient("555-2", "12", "school", true)],
            comparison,
            None,
            Phones::default(),
        );

        for _ in 0..2 {
            let report = h.cycle.run().await.unwrap();
            assert_eq!(report.always_sent, 1);
            assert_eq!(
                h.phones.take(),
                vec![(
                    "555-2".to_string(),
                    "Bus 12 School is running as scheduled.".to_string()
                )]
            );
        }
        assert!(h.snapshots.load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recipients_are_texted_in_file_order() {
        let h = harness(
            page("['12','','Oak','AM','minor'],['40','7','Pine','PM','late']"),
            vec![
                recipient("555-9", "12", "oak", false),
                recipient("555-1", "40", "pine", false),
                recipient("555-5", "3", "elm", true),
                recipient("555-0", "4", "ash", true),
            ],
            Comparison::Resend,
            None,
            Phones::default(),
        );

        h.cycle.run().await.unwrap();

        let order = h
            .phones
            .take()
            .into_iter()
            .map(|(phone, _)| phone)
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["555-9", "555-1", "555-5", "555-0"]);
    }

    #[tokio::test]
    async fn test_outage_at_another_school_sends_nothing() {
        let h = harness(
            page("['12','','Pine','AM','minor']"),
            vec![
                recipient("555-1", "12", "oak", false),
                recipient("555-2", "12", "oak", true),
            ],
            Comparison::AgainstPrevious,
            None,
            Phones::default(),
        );

        let report = h.cycle.run().await.unwrap();

        assert_eq!(report, CycleReport {
            schema_valid: true,
            ..Default::default()
        });
        assert!(h.phones.take().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_schema_only_reaches_the_debug_phone() {
        let document = page("['12','','Oak','AM','minor']").replace("Impact", "Severity");
        let h = harness(
            document,
            vec![recipient("555-1", "12", "oak", false)],
            Comparison::AgainstPrevious,
            Some("TEST"),
            Phones::default(),
        );
        let previous = NotificationSnapshot::from_iter([(
            PhoneNumber::from("555-1"),
            NotificationMessage::new("kept"),
        )]);
        h.snapshots.save(&previous).unwrap();

        let report = h.cycle.run().await.unwrap();

        assert!(!report.schema_valid);
        assert_eq!(
            h.phones.take(),
            vec![(
                DEBUG_PHONE.to_string(),
                "TEST - Error: Table does not have proper schema.\n\nbus, sub bus, schools, schedules, severity"
                    .to_string()
            )]
        );
        assert_eq!(h.snapshots.load().unwrap(), previous);
    }

    #[tokio::test]
    async fn test_saved_snapshot_is_the_unfiltered_one() {
        let h = harness(
            page("['12','','Oak','AM','minor']"),
            vec![recipient("555-1", "12", "oak", false)],
            Comparison::AgainstPrevious,
            None,
            Phones::default(),
        );
        h.cycle.run().await.unwrap();
        let first = h.snapshots.load().unwrap();

        h.cycle.run().await.unwrap();

        assert_eq!(h.snapshots.load().unwrap(), first);
        assert_eq!(first.message_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_reported_and_others_still_sent() {
        let h = harness(
            page("['12','','Oak','AM','minor']"),
            vec![
                recipient("555-1", "12", "oak", false),
                recipient("555-2", "12", "oak", false),
            ],
            Comparison::Resend,
            Some("TEST"),
            Phones {
                unreachable: vec!["555-1".to_string()],
                ..Default::default()
            },
        );

        let report = h.cycle.run().await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.sent, 1);
        let inbox = h.phones.take();
        assert_eq!(inbox[0].0, DEBUG_PHONE);
        assert!(inbox[0]
            .1
            .starts_with("Bus Error: unreachable / Phone: 555-1 / Message: Affected Bus:"));
        assert_eq!(inbox[1].0, "555-2");
        assert!(inbox[1].1.starts_with("TEST - Affected Bus:"));
    }

    #[tokio::test]
    async fn test_fetched_page_is_archived_when_configured() {
        let document = page("");
        let archive = Arc::new(Archive::default());
        let h = harness(
            document.clone(),
            vec![],
            Comparison::Resend,
            None,
            Phones::default(),
        );
        let cycle = h.cycle.with_archive(archive.clone());

        cycle.run().await.unwrap();

        assert_eq!(*archive.0.lock().unwrap(), vec![document]);
    }
}

/// Keeps a copy of every schedule page that was fetched.
pub trait ScheduleArchive: Send + Sync {
    fn archive(&self, raw_document: &str) -> anyhow::Result<()>;
}

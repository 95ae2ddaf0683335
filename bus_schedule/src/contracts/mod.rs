pub mod archive_schedule;
pub mod read_schedule;

pub mod config;
pub mod contracts;
pub mod extraction;
pub mod formatter;
pub mod message;
pub mod outage;
pub mod outage_index;
pub mod schema;
pub mod web_page_reader;

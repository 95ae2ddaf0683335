pub mod load_recipients;
pub mod resolve_notification;

#[derive(Debug)]
pub struct SubscriberContracts;

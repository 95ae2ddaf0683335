pub mod reconcile;
pub mod send_notification;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendered text delivered to a recipient. Original casing is kept in every
/// stored or emitted copy; comparisons go through [`NotificationMessage::normalized`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationMessage(String);

/// Case-insensitive comparison key of a [`NotificationMessage`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NormalizedMessage(String);

impl NotificationMessage {
    pub fn new(text: impl Into<String>) -> Self {
        NotificationMessage(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn normalized(&self) -> NormalizedMessage {
        NormalizedMessage(self.0.to_lowercase())
    }
}

impl NormalizedMessage {
    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(&needle.to_lowercase())
    }
}

impl fmt::Display for NotificationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NotificationMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<NotificationMessage> for String {
    fn from(message: NotificationMessage) -> Self {
        message.0
    }
}

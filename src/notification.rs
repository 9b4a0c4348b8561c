//! Diagnostics collected during catalog resolution
//!
//! Recoverable problems never abort a resolution pass and are never
//! printed; they are gathered here and handed to the caller with the
//! resulting [`ItemTree`](crate::ItemTree).

use std::fmt;

/// Category of a recoverable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationType {
    /// A single record could not be decoded and was skipped
    SkippedRecord,
    /// An item definition was missing or malformed
    MetadataWarning,
    /// A name collision or an anomalous nesting in the catalog paths
    StructuralConflict,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationType::SkippedRecord => "SkippedRecord",
            NotificationType::MetadataWarning => "MetadataWarning",
            NotificationType::StructuralConflict => "StructuralConflict",
        };
        f.write_str(name)
    }
}

/// One recoverable condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub notification_type: NotificationType,
    pub message: String,
    /// Item or table the condition refers to, when known
    pub subject: Option<String>,
}

impl Notification {
    pub fn new(notification_type: NotificationType, message: impl Into<String>) -> Self {
        Self {
            notification_type,
            message: message.into(),
            subject: None,
        }
    }

    /// Attach the name of the item or table concerned.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subject {
            Some(subject) => write!(f, "[{}] {}: {}", self.notification_type, subject, self.message),
            None => write!(f, "[{}] {}", self.notification_type, self.message),
        }
    }
}

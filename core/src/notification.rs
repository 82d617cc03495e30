//! Notification collaborator: fire-and-forget toasts shown to the user.

use serde::{Deserialize, Serialize};

/// Visual weight of a toast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Neutral confirmation
    #[default]
    Info,
    /// Failure the user should act on
    Destructive,
}

/// A user-facing toast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    /// Short headline
    pub title: String,
    /// One-sentence detail
    pub description: String,
    /// Visual weight
    pub severity: Severity,
}

impl Toast {
    /// A neutral toast.
    #[must_use]
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    /// A destructive (error) toast.
    #[must_use]
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }
}

/// Sink for toasts. Delivery is best effort and never reports failure.
pub trait Notifier: Send + Sync {
    /// Show a toast.
    fn notify(&self, toast: Toast);
}

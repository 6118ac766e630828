//! User-facing notices.

use std::time::Duration;

/// How serious a notice is. Each severity stays on screen for its own
/// amount of time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Neutral information.
    Info,
    /// An action completed.
    Success,
    /// Something went wrong.
    Error,
}

impl Severity {
    /// How long a notice of this severity stays visible.
    #[inline]
    pub fn auto_dismiss(self) -> Duration {
        match self {
            Severity::Success => Duration::from_secs(3),
            Severity::Info => Duration::from_secs(4),
            Severity::Error => Duration::from_secs(5),
        }
    }
}

/// An ephemeral notice for the user.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Notification {
    /// Severity of the notice.
    pub severity: Severity,
    /// Text to show.
    pub message: String,
    /// How long to show it for.
    pub duration: Duration,
}

impl Notification {
    /// Creates a notice with the default duration for `severity`.
    #[inline]
    pub fn new<S: Into<String>>(severity: Severity, message: S) -> Self {
        Self {
            severity,
            message: message.into(),
            duration: severity.auto_dismiss(),
        }
    }

    /// Creates an [`Severity::Info`] notice.
    #[inline]
    pub fn info<S: Into<String>>(message: S) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Creates a [`Severity::Success`] notice.
    #[inline]
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self::new(Severity::Success, message)
    }

    /// Creates a [`Severity::Error`] notice.
    #[inline]
    pub fn error<S: Into<String>>(message: S) -> Self {
        Self::new(Severity::Error, message)
    }
}

/// Somewhere to deliver notices to.
///
/// Implementations must not block: notices are emitted from inside the
/// session's state updates. Any `Fn(Notification)` closure is a sink.
pub trait NotificationSink: Send + Sync + 'static {
    /// Delivers a notice.
    fn notify(&self, notification: Notification);
}

impl<F> NotificationSink for F
where
    F: Fn(Notification) + Send + Sync + 'static,
{
    #[inline]
    fn notify(&self, notification: Notification) {
        self(notification)
    }
}

/// A sink that writes notices to the log. Used when no sink is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: Notification) {
        let Notification {
            severity, message, ..
        } = notification;
        match severity {
            Severity::Error => warn!(target: "docqa::notice", "{message}"),
            Severity::Info | Severity::Success => {
                info!(target: "docqa::notice", "{message}")
            }
        }
    }
}

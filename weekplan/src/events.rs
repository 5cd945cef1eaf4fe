//! Change notifications from the planner to whatever renders it.
//!
//! The planner never blocks on its observers: events are sent with
//! `try_send` and dropped when the channel is full or closed.

/// Severity of a toast message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A short user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self::with_level(ToastLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(ToastLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(ToastLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(ToastLevel::Error, message)
    }

    fn with_level(level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Toast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Something observers should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannerEvent {
    /// Any task bucket changed; re-read the task views.
    TasksChanged,
    /// The category list changed.
    CategoriesChanged,
    /// The goal list changed.
    GoalsChanged,
    /// A message to show the user.
    Toast(Toast),
}

/// Sending half shared by the planner and the reminder jobs.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: tokio::sync::mpsc::Sender<PlannerEvent>,
}

impl EventSink {
    /// Creates a sink and its receiver with room for `buffer` events.
    #[must_use]
    pub fn channel(buffer: usize) -> (Self, tokio::sync::mpsc::Receiver<PlannerEvent>) {
        let (tx, rx) = tokio::sync::mpsc::channel(buffer.max(1));
        (Self { tx }, rx)
    }

    /// Best-effort delivery; a full or closed channel drops the event.
    pub fn emit(&self, event: PlannerEvent) {
        if let Err(err) = self.tx.try_send(event) {
            tracing::debug!(error = %err, "planner event dropped");
        }
    }

    pub fn toast(&self, toast: Toast) {
        self.emit(PlannerEvent::Toast(toast));
    }
}

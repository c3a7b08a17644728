//! Actions that commands return to communicate with the app

/// Outcome of a command or key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action needed
    None,

    /// Show notification in status bar
    Notify(String, NotifyLevel),

    /// Request quit
    Quit,
}

impl Action {
    pub fn info(message: impl Into<String>) -> Self {
        Action::Notify(message.into(), NotifyLevel::Info)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Action::Notify(message.into(), NotifyLevel::Warn)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Action::Notify(message.into(), NotifyLevel::Error)
    }
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
    Error,
}

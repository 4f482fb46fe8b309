//! Shell session lifecycle state.

/// Lifecycle state of a persistent shell session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Session has been created but the child has not been started.
    #[default]
    NotStarted,
    /// Child process is alive and accepting commands.
    Running,
    /// Session was stopped; pipes and child have been released.
    Stopped,
}

impl SessionState {
    /// Check if session can accept commands.
    pub fn can_execute(&self) -> bool {
        matches!(self, SessionState::Running)
    }

    /// Check if this is a terminal state.
    pub fn is_stopped(&self) -> bool {
        matches!(self, SessionState::Stopped)
    }
}

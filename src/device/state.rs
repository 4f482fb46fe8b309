//! Device facade connection state machine.

/// Connection state of a device facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    /// Shell is being started and probed with `pwd`.
    Connecting,
    Connected,
}

impl ConnectionState {
    /// Check if transition to target state is valid.
    ///
    /// Valid transitions:
    /// - Disconnected -> Connecting
    /// - Connecting -> Connected
    /// - Connecting -> Disconnected
    /// - Connected -> Disconnected
    pub fn can_transition_to(&self, target: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (*self, target),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Disconnected)
                | (Connected, Disconnected)
        )
    }

    /// Attempt to transition to a new state.
    pub fn transition_to(&mut self, target: ConnectionState) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::AdbShellError::InvalidStateTransition {
                from: *self,
                to: target,
            })
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_cycle() {
        let mut state = ConnectionState::default();
        assert_eq!(state, ConnectionState::Disconnected);

        assert!(state.transition_to(ConnectionState::Connecting).is_ok());
        assert!(state.transition_to(ConnectionState::Connected).is_ok());
        assert!(state.is_connected());
        assert!(state.transition_to(ConnectionState::Disconnected).is_ok());
        assert!(!state.is_connected());
    }

    #[test]
    fn test_failed_connect() {
        let mut state = ConnectionState::Connecting;
        assert!(state.transition_to(ConnectionState::Disconnected).is_ok());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut state = ConnectionState::Disconnected;
        assert!(state.transition_to(ConnectionState::Connected).is_err());
        assert_eq!(state, ConnectionState::Disconnected);

        let mut state = ConnectionState::Connected;
        assert!(state.transition_to(ConnectionState::Connecting).is_err());
        assert_eq!(state, ConnectionState::Connected);
    }
}

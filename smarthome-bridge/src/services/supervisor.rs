use std::time::Duration;

use rumqttc::{ConnectReturnCode, ConnectionError};

use crate::configs::Reconnect;
use crate::errors::SessionError;
use crate::services::backoff::Backoff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Subscribed,
}

/// Connection lifecycle and reconnect policy of the broker session.
///
/// Before the first successful session, an authentication refusal is fatal
/// and other failures are retried at most `max_initial_attempts` times. Once a
/// session has been established, every failure is retried with backoff.
#[derive(Debug)]
pub struct Supervisor {
    state: SessionState,
    backoff: Backoff,
    max_initial_attempts: u32,
    failed_attempts: u32,
    established: bool,
}

impl Supervisor {
    pub fn new(reconnect: &Reconnect) -> Self {
        Self {
            state: SessionState::Disconnected,
            backoff: Backoff::from_settings(reconnect),
            max_initial_attempts: reconnect.max_initial_attempts,
            failed_attempts: 0,
            established: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_established(&self) -> bool {
        self.established
    }

    pub fn on_connecting(&mut self) {
        self.state = SessionState::Connecting;
    }

    /// CONNACK accepted and the subscription has been issued.
    pub fn on_subscribed(&mut self) {
        self.state = SessionState::Subscribed;
        self.established = true;
        self.failed_attempts = 0;
        self.backoff.reset();
    }

    /// Broker closed the session in an orderly way.
    pub fn on_disconnect(&mut self) {
        self.state = SessionState::Disconnected;
    }

    /// Returns how long to wait before polling again, or the fatal error.
    pub fn on_error(&mut self, error: ConnectionError) -> Result<Duration, SessionError> {
        self.state = SessionState::Disconnected;

        if self.established {
            return Ok(self.backoff.next_delay());
        }

        if let ConnectionError::ConnectionRefused(code) = &error {
            if is_auth_refusal(*code) {
                return Err(SessionError::AuthenticationRejected(*code));
            }
        }

        self.failed_attempts += 1;
        if self.failed_attempts >= self.max_initial_attempts {
            return Err(SessionError::InitialConnectExhausted {
                attempts: self.failed_attempts,
                source: error,
            });
        }

        Ok(self.backoff.next_delay())
    }
}

fn is_auth_refusal(code: ConnectReturnCode) -> bool {
    matches!(
        code,
        ConnectReturnCode::BadUserNamePassword | ConnectReturnCode::NotAuthorized
    )
}

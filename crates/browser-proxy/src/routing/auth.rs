//! Proxy authentication challenge handling
//!
//! A [`ProxyAuthenticator`] lives for exactly one connection attempt. It
//! tracks whether the proxy has challenged the attempt with a 407 and allows
//! a single credentialed retry:
//!
//! ```text
//! AwaitingConnect ──(no challenge)──────────────────────────▶ Succeeded
//! AwaitingConnect ──407──▶ ChallengeReceived ──▶ Retried ──▶ Succeeded | Failed
//! AwaitingConnect ──407, no credentials──────────────────────▶ Failed
//! ```

use crate::routing::config::Credentials;

/// HTTP status a proxy uses to demand credentials
pub const PROXY_AUTHENTICATION_REQUIRED: u16 = 407;

/// Where an attempt is in the challenge/retry cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    AwaitingConnect,
    ChallengeReceived,
    Retried,
    Succeeded,
    Failed,
}

impl AuthState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuthState::Succeeded | AuthState::Failed)
    }
}

/// What the transport should do after reporting a proxy status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    /// Authentication is settled; continue with the response as-is
    Proceed,
    /// Reissue the request with the header from [`ProxyAuthenticator::begin_retry`]
    Retry,
    /// Give up and surface the reason to the caller
    Fail(String),
}

/// Single-retry proxy authentication state machine
#[derive(Debug)]
pub struct ProxyAuthenticator<'a> {
    credentials: Option<&'a Credentials>,
    state: AuthState,
}

impl<'a> ProxyAuthenticator<'a> {
    pub fn new(credentials: Option<&'a Credentials>) -> Self {
        Self {
            credentials,
            state: AuthState::AwaitingConnect,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// `Proxy-Authorization` value for the current attempt.
    ///
    /// Credentials are only sent once the proxy has asked for them.
    pub fn authorization(&self) -> Option<String> {
        match self.state {
            AuthState::Retried => self.credentials.map(Credentials::basic_authorization),
            _ => None,
        }
    }

    /// Records the status the proxy answered the current attempt with
    pub fn on_status(&mut self, status: u16) -> AuthAction {
        let challenged = status == PROXY_AUTHENTICATION_REQUIRED;

        match self.state {
            AuthState::AwaitingConnect if !challenged => {
                self.state = AuthState::Succeeded;
                AuthAction::Proceed
            }
            AuthState::AwaitingConnect => {
                if self.credentials.is_some() {
                    self.state = AuthState::ChallengeReceived;
                    AuthAction::Retry
                } else {
                    self.state = AuthState::Failed;
                    AuthAction::Fail(
                        "proxy requires authentication but no credentials are configured"
                            .to_string(),
                    )
                }
            }
            AuthState::Retried if !challenged => {
                self.state = AuthState::Succeeded;
                AuthAction::Proceed
            }
            AuthState::Retried => {
                self.state = AuthState::Failed;
                AuthAction::Fail("proxy rejected the configured credentials".to_string())
            }
            AuthState::ChallengeReceived => {
                self.state = AuthState::Failed;
                AuthAction::Fail("status reported before the retry was started".to_string())
            }
            AuthState::Succeeded | AuthState::Failed => {
                AuthAction::Fail("authentication already settled for this attempt".to_string())
            }
        }
    }

    /// Moves from `ChallengeReceived` to `Retried` and returns the header to attach.
    ///
    /// Returns `None` if no retry is pending.
    pub fn begin_retry(&mut self) -> Option<String> {
        if self.state != AuthState::ChallengeReceived {
            return None;
        }
        self.state = AuthState::Retried;
        self.authorization()
    }
}

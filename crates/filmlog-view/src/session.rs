//! Explicit session context shared by every view.

use std::sync::Arc;

use anyhow::{Context, Result};
use filmlog_api::{LocalAuthApi, SessionHook};
use tokio::sync::watch;
use tracing::instrument;

/// Login state of the current viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthStatus {
    /// `check_auth` has not answered yet.
    #[default]
    Unknown,
    /// Logged in as `member_no`.
    Authenticated {
        /// Member number of the viewer.
        member_no: u64,
    },
    /// No valid session.
    Anonymous,
}

impl AuthStatus {
    /// Member number when authenticated.
    #[must_use]
    pub const fn member_no(self) -> Option<u64> {
        match self {
            Self::Authenticated { member_no } => Some(member_no),
            Self::Unknown | Self::Anonymous => None,
        }
    }

    /// Whether `check_auth` has answered.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Cloneable handle to the viewer's session.
///
/// All clones observe the same state. The client's blacklist interceptor
/// flips it to [`AuthStatus::Anonymous`] through [`SessionHook`].
#[derive(Debug, Clone)]
pub struct Session {
    tx: Arc<watch::Sender<AuthStatus>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session in the [`AuthStatus::Unknown`] state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthStatus::Unknown);
        Self { tx: Arc::new(tx) }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> AuthStatus {
        *self.tx.borrow()
    }

    /// Member number of the logged-in viewer.
    #[must_use]
    pub fn member_no(&self) -> Option<u64> {
        self.status().member_no()
    }

    /// Whether a viewer is logged in.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.member_no().is_some()
    }

    /// Gate for views that render only for a logged-in viewer.
    ///
    /// `None` both while unresolved and when anonymous.
    #[must_use]
    pub fn require_member(&self) -> Option<u64> {
        self.member_no()
    }

    /// Marks the viewer as logged in.
    pub fn set_authenticated(&self, member_no: u64) {
        self.tx
            .send_replace(AuthStatus::Authenticated { member_no });
    }

    /// Marks the viewer as logged out.
    pub fn set_anonymous(&self) {
        self.tx.send_replace(AuthStatus::Anonymous);
    }

    /// Receiver notified on every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.tx.subscribe()
    }

    /// Waits until the status is no longer [`AuthStatus::Unknown`].
    pub async fn resolved(&self) -> AuthStatus {
        let mut rx = self.tx.subscribe();
        let result = rx.wait_for(|status| status.is_resolved()).await;
        match result {
            Ok(status) => *status,
            Err(_) => self.status(),
        }
    }

    /// Resolves the session once through `member/check_auth`.
    ///
    /// Any failure leaves the viewer anonymous.
    #[instrument(skip_all)]
    pub async fn initialize(&self, api: &(impl LocalAuthApi + Sync)) -> AuthStatus {
        match api.check_auth().await {
            Ok(auth) => {
                tracing::debug!(member_no = auth.member_no, "session authenticated");
                self.set_authenticated(auth.member_no);
            }
            Err(err) => {
                tracing::debug!(error = %err, "no valid session");
                self.set_anonymous();
            }
        }
        self.status()
    }

    /// Logs in and resolves the member number.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the session
    /// cannot be verified afterwards.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        api: &(impl LocalAuthApi + Sync),
        username: &str,
        password: &str,
    ) -> Result<AuthStatus> {
        if let Err(err) = api.login(username, password).await {
            self.set_anonymous();
            return Err(err.context("login failed"));
        }
        match api.check_auth().await {
            Ok(auth) => {
                self.set_authenticated(auth.member_no);
                tracing::info!(member_no = auth.member_no, "logged in");
                Ok(self.status())
            }
            Err(err) => {
                self.set_anonymous();
                Err(err).context("login succeeded but the session could not be verified")
            }
        }
    }

    /// Logs out. The session ends anonymous even when the request fails.
    ///
    /// # Errors
    ///
    /// Returns the logout request error after clearing local state.
    #[instrument(skip_all)]
    pub async fn logout(&self, api: &(impl LocalAuthApi + Sync)) -> Result<()> {
        let result = api.logout().await;
        self.set_anonymous();
        result.context("logout request failed")
    }
}

impl SessionHook for Session {
    fn on_forced_logout(&self) {
        tracing::warn!("session ended by the server");
        self.set_anonymous();
    }
}

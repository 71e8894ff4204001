//! Device-authorization login and credential lifecycle for one client.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::clock::{Clock, TokioClock};
use super::device_code::{ActivationStatus, DeviceCodePoll, DeviceCodeSession};
use super::error::AuthError;
use super::oauth::TadoOAuth;
use super::store::TokenStore;
use super::token::TokenCredential;
use crate::config::TadoConfig;

/// Drives the OAuth2 device-authorization grant and keeps the resulting
/// credential fresh.
///
/// Each coordinator owns exactly one session/credential pair, so separate
/// accounts use separate coordinators. Share one between tasks with `Arc`.
///
/// # Example
/// ```no_run
/// use tado_client::auth::DeviceFlowCoordinator;
/// use tado_client::config::TadoConfig;
///
/// # async fn example() -> Result<(), tado_client::auth::AuthError> {
/// let coordinator = DeviceFlowCoordinator::new(TadoConfig::default());
/// let session = coordinator.begin_device_flow().await?;
/// println!("Visit {}", session.verification_url());
/// let credential = coordinator.await_activation().await?;
/// println!("Logged in, token expires at {}", credential.expires_at);
/// # Ok(())
/// # }
/// ```
pub struct DeviceFlowCoordinator {
    config: TadoConfig,
    oauth: TadoOAuth,
    clock: Arc<dyn Clock>,
    store: Option<Arc<dyn TokenStore>>,
    flow: Mutex<FlowState>,
    credential: RwLock<Option<TokenCredential>>,
    refresh_gate: tokio::sync::Mutex<()>,
}

#[derive(Debug, Default)]
struct FlowState {
    status: ActivationStatus,
    session: Option<DeviceCodeSession>,
    /// Bumped whenever the current session is replaced or discarded.
    generation: u64,
}

impl fmt::Debug for DeviceFlowCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceFlowCoordinator")
            .field("status", &self.activation_status())
            .field("profile", &self.config.profile)
            .field("store", &self.store.as_ref().map(|_| ".."))
            .finish()
    }
}

impl DeviceFlowCoordinator {
    pub fn new(config: TadoConfig) -> Self {
        let oauth = TadoOAuth::new(reqwest::Client::new(), &config);
        Self {
            config,
            oauth,
            clock: Arc::new(TokioClock),
            store: None,
            flow: Mutex::new(FlowState::default()),
            credential: RwLock::new(None),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Use a host-owned HTTP client (proxy, TLS and pool settings).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.oauth = TadoOAuth::new(client, &self.config);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Persist credentials under the configured profile after activation
    /// and after every refresh.
    pub fn with_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Start from a previously issued refresh token; the first
    /// [`refresh_if_expired`](Self::refresh_if_expired) exchanges it.
    pub fn with_refresh_token(self, refresh_token: impl Into<String>) -> Self {
        self.restore(TokenCredential::from_refresh_token(refresh_token));
        self
    }

    pub fn config(&self) -> &TadoConfig {
        &self.config
    }

    /// Clock used for poll scheduling, shared with the REST client's backoff.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Install a persisted credential and mark the device as activated.
    /// Any pending session is abandoned.
    pub fn restore(&self, credential: TokenCredential) {
        let mut flow = self.flow();
        flow.generation += 1;
        flow.session = None;
        flow.status = ActivationStatus::Completed;
        *self.credential_slot_mut() = Some(credential);
    }

    /// Load the credential for the configured profile from the token store.
    ///
    /// Returns `false` when no store is configured or nothing is saved.
    pub fn restore_from_store(&self) -> Result<bool, AuthError> {
        let Some(store) = &self.store else {
            return Ok(false);
        };
        match store.load(&self.config.profile)? {
            Some(credential) => {
                tracing::debug!(profile = %self.config.profile, "Restored tado credential from store");
                self.restore(credential);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Start a new device-flow session.
    ///
    /// A session that is still pending is invalidated: loops polling it fail
    /// with [`AuthError::SessionSuperseded`].
    pub async fn begin_device_flow(&self) -> Result<DeviceCodeSession, AuthError> {
        if self.activation_status() == ActivationStatus::Completed {
            return Err(AuthError::AlreadyActivated);
        }

        let session = self.oauth.start_device_code(self.clock.now()).await?;

        let mut flow = self.flow();
        if flow.status == ActivationStatus::Completed {
            return Err(AuthError::AlreadyActivated);
        }
        if flow.session.is_some() {
            tracing::debug!("Replacing pending device flow session");
        }
        flow.generation += 1;
        flow.session = Some(session.clone());
        flow.status = ActivationStatus::Pending;

        tracing::info!(
            verification_url = %session.verification_url(),
            user_code = %session.user_code,
            expires_at = %session.expires_at.format("%Y-%m-%d %H:%M:%S"),
            "Waiting for user to authorize the device"
        );
        Ok(session)
    }

    /// Verification URL of the current session with the user code embedded.
    pub fn verification_url(&self) -> Option<String> {
        self.flow().session.as_ref().map(DeviceCodeSession::verification_url)
    }

    pub fn user_code(&self) -> Option<String> {
        self.flow().session.as_ref().map(|session| session.user_code.clone())
    }

    pub fn activation_status(&self) -> ActivationStatus {
        self.flow().status
    }

    /// Time left before the activation ceiling of the current session.
    pub fn activation_time_remaining(&self) -> Option<Duration> {
        let flow = self.flow();
        let session = flow.session.as_ref()?;
        let ceiling = session.started_at + self.config.activation_timeout;
        Some(ceiling.saturating_duration_since(self.clock.now()))
    }

    /// Poll until the user authorizes the current session.
    ///
    /// Once activated, further calls return the cached credential without
    /// touching the network. Dropping the returned future abandons the
    /// session and leaves the status at `PENDING`.
    pub async fn await_activation(&self) -> Result<TokenCredential, AuthError> {
        let (session, generation) = {
            let flow = self.flow();
            let status = flow.status;
            match (status, flow.session.clone()) {
                (ActivationStatus::Completed, _) => {
                    return self.credential().ok_or(AuthError::NotAuthenticated);
                }
                (ActivationStatus::Pending, Some(session)) => (session, flow.generation),
                _ => return Err(AuthError::NotStarted),
            }
        };
        self.poll_until_activated(session, generation).await
    }

    /// Like [`await_activation`](Self::await_activation) for an explicit
    /// session handle. A handle that is no longer current fails without
    /// sending any request.
    pub async fn await_activation_of(
        &self,
        session: &DeviceCodeSession,
    ) -> Result<TokenCredential, AuthError> {
        let generation = {
            let flow = self.flow();
            let status = flow.status;
            let is_current = flow
                .session
                .as_ref()
                .is_some_and(|current| current.device_code == session.device_code);
            match status {
                ActivationStatus::Completed => {
                    return self.credential().ok_or(AuthError::NotAuthenticated);
                }
                ActivationStatus::Pending if is_current => flow.generation,
                _ => return Err(AuthError::SessionSuperseded),
            }
        };
        self.poll_until_activated(session.clone(), generation).await
    }

    /// [`await_activation`](Self::await_activation) that gives up with
    /// [`AuthError::Cancelled`] when `cancel` fires.
    pub async fn await_activation_until(
        &self,
        cancel: &CancellationToken,
    ) -> Result<TokenCredential, AuthError> {
        tokio::select! {
            result = self.await_activation() => result,
            _ = cancel.cancelled() => {
                tracing::info!("Device activation cancelled by host");
                Err(AuthError::Cancelled)
            }
        }
    }

    async fn poll_until_activated(
        &self,
        session: DeviceCodeSession,
        generation: u64,
    ) -> Result<TokenCredential, AuthError> {
        let started_at = session.started_at;
        let ceiling = started_at + self.config.activation_timeout;
        let server_deadline = session.server_deadline();
        let mut interval = session.interval;
        let mut attempt: u32 = 0;

        loop {
            let now = self.clock.now();
            let wake = now + interval;
            if wake >= ceiling && ceiling <= server_deadline {
                self.clock.sleep(ceiling.saturating_duration_since(now)).await;
                let elapsed_secs = self.clock.now().saturating_duration_since(started_at).as_secs();
                tracing::warn!(elapsed_secs, attempts = attempt, "Device activation timed out");
                return Err(AuthError::AuthorizationTimeout { elapsed_secs });
            }
            if wake >= server_deadline {
                self.clock.sleep(server_deadline.saturating_duration_since(now)).await;
                tracing::warn!(attempts = attempt, "Device code expired before authorization");
                return Err(AuthError::AuthorizationExpired);
            }

            self.clock.sleep(interval).await;
            self.ensure_current(generation)?;
            attempt += 1;

            let budget = ceiling.saturating_duration_since(self.clock.now());
            match self.oauth.poll_device_code(&session, budget).await {
                Ok(DeviceCodePoll::Pending) => {
                    tracing::debug!(attempt, "Authorization pending, continuing to poll");
                }
                Ok(DeviceCodePoll::SlowDown) => {
                    interval += self.config.slow_down_increment;
                    tracing::debug!(
                        attempt,
                        interval_secs = interval.as_secs(),
                        "Authorization server asked to slow down"
                    );
                }
                Ok(DeviceCodePoll::Authorized { credential }) => {
                    return self.complete_activation(generation, credential);
                }
                Ok(DeviceCodePoll::AccessDenied) => {
                    tracing::warn!(attempt, "Device authorization denied");
                    return Err(AuthError::AuthorizationDenied);
                }
                Ok(DeviceCodePoll::Expired) => {
                    tracing::warn!(attempt, "Device code expired");
                    return Err(AuthError::AuthorizationExpired);
                }
                Err(err) if err.is_transient() => {
                    tracing::warn!(attempt, error = %err, "Transient failure while polling, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn ensure_current(&self, generation: u64) -> Result<(), AuthError> {
        let flow = self.flow();
        if flow.generation == generation && flow.status == ActivationStatus::Pending {
            Ok(())
        } else {
            Err(AuthError::SessionSuperseded)
        }
    }

    fn complete_activation(
        &self,
        generation: u64,
        credential: TokenCredential,
    ) -> Result<TokenCredential, AuthError> {
        {
            let mut flow = self.flow();
            if flow.generation != generation {
                return Err(AuthError::SessionSuperseded);
            }
            flow.generation += 1;
            flow.session = None;
            flow.status = ActivationStatus::Completed;
            *self.credential_slot_mut() = Some(credential.clone());
        }
        self.persist(&credential);
        tracing::info!(expires_at = %credential.expires_at, "Device activation completed");
        Ok(credential)
    }

    /// Return a usable credential, exchanging the refresh token first when
    /// the access token is expired or about to expire.
    ///
    /// Concurrent callers share a single refresh request.
    pub async fn refresh_if_expired(&self) -> Result<TokenCredential, AuthError> {
        let skew = self.config.refresh_skew;
        if let Some(current) = self.credential().filter(|cred| !cred.is_expired(skew)) {
            return Ok(current);
        }

        let _gate = self.refresh_gate.lock().await;
        let generation = self.flow().generation;
        let current = self.credential().ok_or(AuthError::NotAuthenticated)?;
        if !current.is_expired(skew) {
            return Ok(current);
        }
        let Some(refresh_token) = current.refresh_token.as_deref() else {
            self.forget_credential();
            return Err(AuthError::ReauthorizationRequired);
        };

        tracing::debug!("Refreshing tado access token");
        match self.oauth.refresh(refresh_token).await {
            Ok(refreshed) => {
                {
                    let flow = self.flow();
                    // logout() or restore() ran while the exchange was in flight.
                    if flow.generation != generation {
                        drop(flow);
                        tracing::debug!("Discarding refresh result for a replaced credential");
                        return self.credential().ok_or(AuthError::NotAuthenticated);
                    }
                    *self.credential_slot_mut() = Some(refreshed.clone());
                }
                self.persist(&refreshed);
                tracing::debug!(expires_at = %refreshed.expires_at, "Tado access token refreshed");
                Ok(refreshed)
            }
            Err(AuthError::ReauthorizationRequired) => {
                tracing::warn!("Refresh token rejected, device flow must be restarted");
                if self.flow().generation == generation {
                    self.forget_credential();
                }
                Err(AuthError::ReauthorizationRequired)
            }
            Err(err) => Err(err),
        }
    }

    /// Current credential, if any. Never performs I/O.
    pub fn credential(&self) -> Option<TokenCredential> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.credential().map(|cred| cred.access_token)
    }

    /// Current refresh token, for hosts that persist it themselves.
    pub fn refresh_token(&self) -> Option<String> {
        self.credential().and_then(|cred| cred.refresh_token)
    }

    /// Drop the credential (and its stored copy) and return to `NOT_STARTED`.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.reset_state();
        match &self.store {
            Some(store) => store.clear(&self.config.profile),
            None => Ok(()),
        }
    }

    fn forget_credential(&self) {
        self.reset_state();
        if let Some(store) = &self.store {
            if let Err(err) = store.clear(&self.config.profile) {
                tracing::warn!(error = %err, "Failed to clear stored tado credential");
            }
        }
    }

    fn reset_state(&self) {
        let mut flow = self.flow();
        flow.generation += 1;
        flow.session = None;
        flow.status = ActivationStatus::NotStarted;
        *self.credential_slot_mut() = None;
    }

    fn persist(&self, credential: &TokenCredential) {
        if let Some(store) = &self.store {
            if let Err(err) = store.save(&self.config.profile, credential) {
                tracing::warn!(
                    error = %err,
                    profile = %self.config.profile,
                    "Failed to persist tado credential"
                );
            }
        }
    }

    fn flow(&self) -> MutexGuard<'_, FlowState> {
        self.flow.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn credential_slot_mut(&self) -> std::sync::RwLockWriteGuard<'_, Option<TokenCredential>> {
        self.credential.write().unwrap_or_else(PoisonError::into_inner)
    }
}

//! Device authorization flow and credential state
//!
//! Tracks device-code sessions from `Pending` to `Authorized` and holds the
//! active Seedr credential for the rest of the process. Session state moves
//! one way only; a denied or abandoned request never transitions and is
//! evicted once its advertised lifetime has elapsed, after which it answers
//! as an unknown code.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::api::device::{DeviceAuthClient, DeviceCodeGrant, TokenPoll};
use crate::api::seedr::SeedrError;
use crate::models::Credential;

// =============================================================================
// Sessions
// =============================================================================

/// Per-session authorization state (one-way: Pending → Authorized)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Pending,
    Authorized { token: String },
}

/// One in-flight device authorization, keyed by device_code
#[derive(Debug, Clone)]
pub struct DeviceSession {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub expires_in: u64,
    pub interval: u64,
    pub created_at: Instant,
    pub state: SessionState,
}

impl DeviceSession {
    fn from_grant(grant: DeviceCodeGrant) -> Self {
        Self {
            device_code: grant.device_code,
            user_code: grant.user_code,
            verification_uri: grant.verification_uri,
            expires_in: grant.expires_in,
            interval: grant.interval,
            created_at: Instant::now(),
            state: SessionState::Pending,
        }
    }

    /// True once the session has outlived its advertised lifetime
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= Duration::from_secs(self.expires_in)
    }
}

/// In-memory session store with TTL eviction
///
/// Sessions are keyed by device_code, so distinct authorizations never
/// contend; the mutex serializes concurrent polls for the same code.
#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, DeviceSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh Pending session for a grant
    pub fn insert(&self, grant: DeviceCodeGrant) -> DeviceSession {
        let session = DeviceSession::from_grant(grant);
        let mut inner = self.lock();
        inner.retain(|_, s| !s.is_expired());
        inner.insert(session.device_code.clone(), session.clone());
        session
    }

    /// Look up a live session, evicting expired ones on the way
    pub fn get(&self, device_code: &str) -> Option<DeviceSession> {
        let mut inner = self.lock();
        inner.retain(|_, s| !s.is_expired());
        inner.get(device_code).cloned()
    }

    /// Transition a session to Authorized; no-op on unknown codes
    ///
    /// An already-authorized session keeps its original token.
    pub fn mark_authorized(&self, device_code: &str, token: &str) {
        let mut inner = self.lock();
        if let Some(session) = inner.get_mut(device_code) {
            if session.state == SessionState::Pending {
                session.state = SessionState::Authorized {
                    token: token.to_string(),
                };
            }
        }
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        let mut inner = self.lock();
        inner.retain(|_, s| !s.is_expired());
        inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, DeviceSession>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// Holder for the process-wide active credential
///
/// Seeded from configuration at startup and replaced when a device flow
/// completes. Absence means every storage call answers unauthorized.
#[derive(Default)]
pub struct CredentialStore {
    inner: Mutex<Option<Credential>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an already-known credential
    pub fn with_credential(credential: Option<Credential>) -> Self {
        Self {
            inner: Mutex::new(credential),
        }
    }

    pub fn get(&self) -> Option<Credential> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, credential: Credential) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(credential);
    }
}

// =============================================================================
// Authorization Flow
// =============================================================================

/// Result of polling one device code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Grant completed; same token on every subsequent poll
    Authorized { access_token: String },
    /// Not approved yet; poll again after `interval` seconds
    Pending { interval: u64 },
    /// Never issued, or expired and evicted
    UnknownCode,
}

/// Device authorization flow: start a session, poll it to completion
///
/// This type never schedules its own polling loop; callers re-invoke
/// [`AuthFlow::poll`] at the advertised interval.
pub struct AuthFlow {
    client: DeviceAuthClient,
    sessions: SessionStore,
    credentials: Arc<CredentialStore>,
}

impl AuthFlow {
    pub fn new(client: DeviceAuthClient, credentials: Arc<CredentialStore>) -> Self {
        Self {
            client,
            sessions: SessionStore::new(),
            credentials,
        }
    }

    /// Request a device/user code pair and register a Pending session
    pub async fn start(&self) -> Result<DeviceSession, SeedrError> {
        let grant = self.client.request_device_code().await?;
        let session = self.sessions.insert(grant);
        tracing::info!(
            user_code = %session.user_code,
            expires_in = session.expires_in,
            "device authorization started"
        );
        Ok(session)
    }

    /// Poll one device code
    ///
    /// An already-authorized session answers from the store without another
    /// token-endpoint call, returning the same token every time.
    pub async fn poll(&self, device_code: &str) -> Result<PollOutcome, SeedrError> {
        let Some(session) = self.sessions.get(device_code) else {
            return Ok(PollOutcome::UnknownCode);
        };

        if let SessionState::Authorized { token } = session.state {
            return Ok(PollOutcome::Authorized {
                access_token: token,
            });
        }

        match self.client.exchange(device_code).await? {
            TokenPoll::Authorized { access_token } => {
                self.sessions.mark_authorized(device_code, &access_token);
                self.credentials.set(Credential::device_flow(&access_token));
                tracing::info!("device authorization completed");
                Ok(PollOutcome::Authorized { access_token })
            }
            TokenPoll::Pending => Ok(PollOutcome::Pending {
                interval: session.interval,
            }),
        }
    }

    /// Session store, for inspection in tests
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

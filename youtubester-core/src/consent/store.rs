//! Consent state store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::StatusError;
use crate::events::{emit, ConsentEvent, ConsentObserver};

/// Whether the session holds YouTube write access.
///
/// `Unknown` only appears before the first refresh completes. After that the
/// value is always the last server answer: a status query, or a call the
/// server rejected for missing write consent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WriteAccess {
    /// No answer from the server yet.
    #[default]
    Unknown,
    /// The server reported write access.
    Granted,
    /// The server reported no write access, or could not be asked.
    Denied,
}

impl WriteAccess {
    /// True only for [`WriteAccess::Granted`].
    pub fn is_granted(self) -> bool {
        matches!(self, WriteAccess::Granted)
    }

    /// True until the first refresh lands.
    pub fn is_unknown(self) -> bool {
        matches!(self, WriteAccess::Unknown)
    }

    /// The tri-state as an optional boolean.
    pub fn as_option(self) -> Option<bool> {
        match self {
            WriteAccess::Unknown => None,
            WriteAccess::Granted => Some(true),
            WriteAccess::Denied => Some(false),
        }
    }
}

impl fmt::Display for WriteAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteAccess::Unknown => write!(f, "Unknown"),
            WriteAccess::Granted => write!(f, "Granted"),
            WriteAccess::Denied => write!(f, "Denied"),
        }
    }
}

/// Body of the server's auth status endpoint.
///
/// Only `hasWriteAccess` matters here; everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    /// Whether the session may write to YouTube. Absent means no.
    #[serde(default)]
    pub has_write_access: Option<bool>,
}

/// Source of the session's current permissions.
///
/// Implementations issue the credentialed "who am I" request.
#[async_trait]
pub trait AuthStatusSource: Send + Sync {
    /// Fetch the current auth status from the server.
    async fn fetch_auth_status(&self) -> Result<AuthStatus, StatusError>;
}

/// Single source of truth for whether the session holds write access.
///
/// Create one per running client, wrap it in an [`Arc`] and hand it to every
/// consumer. Tests build a fresh instance per case.
///
/// The value is a hint between refreshes: another task may refresh it at any
/// time. Callers that need a decision use the consent flow, which re-checks.
///
/// ```rust
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use youtubester_core::consent::{AuthStatus, AuthStatusSource};
/// use youtubester_core::{ConsentStore, StatusError, WriteAccess};
///
/// struct Server;
///
/// #[async_trait]
/// impl AuthStatusSource for Server {
///     async fn fetch_auth_status(&self) -> Result<AuthStatus, StatusError> {
///         Ok(AuthStatus { has_write_access: Some(true) })
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let store = ConsentStore::new(Arc::new(Server));
/// assert_eq!(store.current(), WriteAccess::Unknown);
///
/// store.refresh().await;
/// assert_eq!(store.current(), WriteAccess::Granted);
/// # });
/// ```
pub struct ConsentStore {
    source: Arc<dyn AuthStatusSource>,
    state: watch::Sender<WriteAccess>,
    bootstrapped: AtomicBool,
    observer: Option<ConsentObserver>,
}

impl ConsentStore {
    /// Create a store in the `Unknown` state.
    pub fn new(source: Arc<dyn AuthStatusSource>) -> Self {
        let (state, _) = watch::channel(WriteAccess::Unknown);
        Self {
            source,
            state,
            bootstrapped: AtomicBool::new(false),
            observer: None,
        }
    }

    /// Attach an event observer.
    pub fn with_observer(mut self, observer: ConsentObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Last known value.
    pub fn current(&self) -> WriteAccess {
        *self.state.borrow()
    }

    /// Receiver that is notified every time a refresh lands.
    pub fn subscribe(&self) -> watch::Receiver<WriteAccess> {
        self.state.subscribe()
    }

    /// Re-query the server and store the answer.
    ///
    /// Write access is recorded only when the server explicitly says so.
    /// Errors, missing fields and `false` all store [`WriteAccess::Denied`].
    /// Concurrent refreshes are independent; the last one to land wins.
    pub async fn refresh(&self) {
        let access = match self.source.fetch_auth_status().await {
            Ok(status) => {
                if status.has_write_access == Some(true) {
                    WriteAccess::Granted
                } else {
                    WriteAccess::Denied
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to refresh write access state");
                emit(
                    &self.observer,
                    ConsentEvent::RefreshFailed {
                        error: e.to_string(),
                    },
                );
                WriteAccess::Denied
            }
        };

        tracing::debug!(%access, "write access state refreshed");
        self.state.send_replace(access);
        emit(&self.observer, ConsentEvent::StateRefreshed { access });
    }

    /// Record that the server rejected a call for missing write consent.
    ///
    /// The stored value becomes [`WriteAccess::Denied`] so the next consent
    /// check asks the user again instead of trusting an outdated grant.
    pub fn revoke(&self) {
        let previous = self.state.send_replace(WriteAccess::Denied);
        if previous.is_granted() {
            tracing::info!("write access revoked by the server");
            emit(&self.observer, ConsentEvent::AccessRevoked);
        }
    }

    /// Run the initial refresh in the background.
    ///
    /// Only the first call spawns a refresh; later calls return `None`. Must
    /// be called from within a tokio runtime.
    pub fn bootstrap(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            return None;
        }

        let store = Arc::clone(self);
        Some(tokio::spawn(async move { store.refresh().await }))
    }
}

impl fmt::Debug for ConsentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsentStore")
            .field("state", &self.current())
            .field("bootstrapped", &self.bootstrapped.load(Ordering::SeqCst))
            .finish()
    }
}

//! Write guard: the choke point for calls that may need write access.

use std::future::Future;
use std::sync::Arc;

use super::endpoint::{ClassificationSet, EndpointKey};
use super::flow::ConsentProvider;
use crate::error::GuardError;
use crate::events::{emit, ConsentEvent, ConsentObserver};

/// Lets the guard recognise a server-side "write consent required" failure.
///
/// Implement this on the error type of guarded calls. Only errors that return
/// `true` are eligible for the re-consent retry; everything else propagates
/// untouched.
pub trait ConsentSignal {
    /// True if this failure means the session lacks write consent.
    fn is_write_consent_required(&self) -> bool;
}

/// One outgoing API call: method, path and the function that performs it.
///
/// `invoke` may be called twice (original attempt and one retry), so it
/// builds a fresh request future each time.
pub struct CallDescriptor<F> {
    pub method: String,
    pub path: String,
    pub invoke: F,
}

impl<F> CallDescriptor<F> {
    pub fn new(method: impl Into<String>, path: impl Into<String>, invoke: F) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            invoke,
        }
    }

    /// Normalized key of this call.
    pub fn key(&self) -> EndpointKey {
        EndpointKey::new(&self.method, &self.path)
    }
}

/// Routes calls through pre-authorization and the late-detection retry.
///
/// The classification table only saves a round trip. The retry on a
/// consent-required error is what actually enforces correctness, so endpoints
/// missing from the table (or consent revoked mid-session) still recover.
///
/// # Example
///
/// ```rust,ignore
/// let guard = WriteGuard::new(ClassificationSet::generated(), Arc::new(flow));
///
/// let result = guard
///     .call("POST", "/api/videos/copy-template", || client.copy_template(&request))
///     .await?;
/// ```
pub struct WriteGuard {
    classification: ClassificationSet,
    consent: Arc<dyn ConsentProvider>,
    observer: Option<ConsentObserver>,
}

impl WriteGuard {
    pub fn new(classification: ClassificationSet, consent: Arc<dyn ConsentProvider>) -> Self {
        Self {
            classification,
            consent,
            observer: None,
        }
    }

    /// Attach an event observer.
    pub fn with_observer(mut self, observer: ConsentObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn classification(&self) -> &ClassificationSet {
        &self.classification
    }

    /// Shorthand for [`Self::call_with_guard`].
    pub async fn call<T, E, F, Fut>(
        &self,
        method: &str,
        path: &str,
        invoke: F,
    ) -> Result<T, GuardError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ConsentSignal,
    {
        self.call_with_guard(CallDescriptor::new(method, path, invoke))
            .await
    }

    /// Run a call with write-consent handling.
    ///
    /// - Classified endpoint: obtain consent first; without it the call is
    ///   refused with [`GuardError::WriteAccessRequired`] and never invoked.
    /// - Consent-required failure: drop the cached grant, obtain consent
    ///   again and re-invoke exactly once, returning whatever that attempt
    ///   produces. If consent still
    ///   cannot be obtained, the original failure is returned.
    /// - Any other failure is returned immediately.
    pub async fn call_with_guard<T, E, F, Fut>(
        &self,
        call: CallDescriptor<F>,
    ) -> Result<T, GuardError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ConsentSignal,
    {
        let key = call.key();
        let mut invoke = call.invoke;

        if self.classification.contains(&key) {
            tracing::debug!(endpoint = %key, "write-protected endpoint, ensuring consent");
            emit(
                &self.observer,
                ConsentEvent::ConsentRequired {
                    endpoint: key.to_string(),
                },
            );

            if !self.consent.ensure_consent().await {
                tracing::info!(endpoint = %key, "write consent not obtained, call refused");
                return Err(GuardError::WriteAccessRequired);
            }
        }

        let error = match invoke().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if !error.is_write_consent_required() {
            return Err(GuardError::Call(error));
        }

        tracing::info!(endpoint = %key, "server requires write consent, re-authorizing");
        emit(
            &self.observer,
            ConsentEvent::LateConsentRequired {
                endpoint: key.to_string(),
            },
        );

        self.consent.invalidate();
        if !self.consent.ensure_consent().await {
            return Err(GuardError::Call(error));
        }

        emit(
            &self.observer,
            ConsentEvent::CallRetried {
                endpoint: key.to_string(),
            },
        );
        invoke().await.map_err(GuardError::Call)
    }
}

impl std::fmt::Debug for WriteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteGuard")
            .field("classification", &self.classification)
            .finish()
    }
}

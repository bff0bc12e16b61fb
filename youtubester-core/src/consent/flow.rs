//! Popup-based consent flow.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::popup::{consent_start_url, PopupFeatures, PopupHandle, PopupHost};
use super::store::ConsentStore;
use crate::events::{emit, ConsentEvent, ConsentObserver};

/// Default server path that starts the write-consent login
pub const DEFAULT_CONSENT_START_PATH: &str = "/api/auth/login/google/write";

/// Anything that can obtain write consent on demand.
///
/// The write guard depends on this rather than on [`ConsentFlow`] directly.
#[async_trait]
pub trait ConsentProvider: Send + Sync {
    /// Make sure the session holds write access.
    ///
    /// Returns `true` once the server confirms write access, `false` if it
    /// could not be obtained in-page.
    async fn ensure_consent(&self) -> bool;

    /// Drop any cached grant after the server rejected a call for missing
    /// write consent, so the next [`ensure_consent`](Self::ensure_consent)
    /// asks again.
    fn invalidate(&self) {}
}

/// Configuration for the consent popup
#[derive(Debug, Clone)]
pub struct ConsentConfig {
    /// Server path that starts the elevated login (default: `/api/auth/login/google/write`)
    pub consent_start_path: String,
    /// Target name of the popup window (default: `YouTube Write Access`)
    pub popup_name: String,
    /// Popup width in pixels (default: 600)
    pub popup_width: u32,
    /// Popup height in pixels (default: 700)
    pub popup_height: u32,
    /// How often to check whether the popup closed (default: 500ms)
    pub poll_interval: Duration,
    /// Give up waiting for the popup after this long (default: never)
    pub max_wait: Option<Duration>,
    /// Share one in-flight popup between concurrent callers (default: false)
    pub coalesce_popups: bool,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            consent_start_path: DEFAULT_CONSENT_START_PATH.to_string(),
            popup_name: "YouTube Write Access".to_string(),
            popup_width: 600,
            popup_height: 700,
            poll_interval: Duration::from_millis(500),
            max_wait: None,
            coalesce_popups: false,
        }
    }
}

impl ConsentConfig {
    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set a maximum wait for the popup
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Share one popup between concurrent callers
    pub fn coalesced(mut self) -> Self {
        self.coalesce_popups = true;
        self
    }
}

enum PopupOutcome {
    Closed,
    TimedOut,
}

/// Obtains write access through a popup window.
///
/// The popup's content is cross-origin, so closing it without granting looks
/// exactly like granting. The flow therefore always asks the server again
/// after the popup goes away.
pub struct ConsentFlow {
    store: Arc<ConsentStore>,
    host: Arc<dyn PopupHost>,
    config: ConsentConfig,
    in_flight: tokio::sync::Mutex<()>,
    observer: Option<ConsentObserver>,
}

impl ConsentFlow {
    /// Create a flow with the default configuration
    pub fn new(store: Arc<ConsentStore>, host: Arc<dyn PopupHost>) -> Self {
        Self::with_config(store, host, ConsentConfig::default())
    }

    /// Create a flow with a custom configuration
    pub fn with_config(
        store: Arc<ConsentStore>,
        host: Arc<dyn PopupHost>,
        config: ConsentConfig,
    ) -> Self {
        Self {
            store,
            host,
            config,
            in_flight: tokio::sync::Mutex::new(()),
            observer: None,
        }
    }

    /// Attach an event observer
    pub fn with_observer(mut self, observer: ConsentObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The store this flow refreshes
    pub fn store(&self) -> &Arc<ConsentStore> {
        &self.store
    }

    /// The active configuration
    pub fn config(&self) -> &ConsentConfig {
        &self.config
    }

    /// Make sure the session holds write access, opening a popup if needed.
    ///
    /// 1. Already granted: returns `true` without opening anything.
    /// 2. Opens a centered popup on the consent start URL.
    /// 3. Popup blocked: navigates the page there instead and returns `false`.
    /// 4. Waits for the popup to close, refreshes the store and returns
    ///    whether write access is now held.
    pub async fn ensure_consent(&self) -> bool {
        if self.store.current().is_granted() {
            return true;
        }

        if !self.config.coalesce_popups {
            return self.run_popup().await;
        }

        let _guard = self.in_flight.lock().await;
        // Another caller may have finished a popup while we waited.
        if self.store.current().is_granted() {
            return true;
        }
        self.run_popup().await
    }

    async fn run_popup(&self) -> bool {
        let return_url = self.host.current_location();
        let url = consent_start_url(&self.config.consent_start_path, &return_url);
        let features = PopupFeatures::centered(
            self.host.viewport(),
            self.config.popup_width,
            self.config.popup_height,
        );

        let Some(popup) = self
            .host
            .open_popup(&url, &self.config.popup_name, &features)
        else {
            tracing::info!(%url, "consent popup blocked, navigating instead");
            emit(&self.observer, ConsentEvent::PopupBlocked { url: url.clone() });
            self.host.navigate(&url);
            return false;
        };

        tracing::debug!(%url, "consent popup opened");
        emit(&self.observer, ConsentEvent::PopupOpened { url });

        let started = Instant::now();
        match self.wait_for_close(popup.as_ref()).await {
            PopupOutcome::Closed => {
                let waited = started.elapsed();
                tracing::debug!(?waited, "consent popup closed");
                emit(&self.observer, ConsentEvent::PopupClosed { waited });
            }
            PopupOutcome::TimedOut => {
                let waited = started.elapsed();
                tracing::warn!(?waited, "consent popup timed out, closing it");
                popup.close();
                emit(&self.observer, ConsentEvent::PopupTimedOut { waited });
            }
        }

        self.store.refresh().await;
        self.store.current().is_granted()
    }

    async fn wait_for_close(&self, popup: &dyn PopupHandle) -> PopupOutcome {
        let poll = async {
            loop {
                tokio::time::sleep(self.config.poll_interval).await;
                if popup.is_closed() {
                    return;
                }
            }
        };

        match self.config.max_wait {
            Some(max_wait) => match tokio::time::timeout(max_wait, poll).await {
                Ok(()) => PopupOutcome::Closed,
                Err(_) => PopupOutcome::TimedOut,
            },
            None => {
                poll.await;
                PopupOutcome::Closed
            }
        }
    }
}

#[async_trait]
impl ConsentProvider for ConsentFlow {
    async fn ensure_consent(&self) -> bool {
        ConsentFlow::ensure_consent(self).await
    }

    fn invalidate(&self) {
        self.store.revoke();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::popup::{Navigator, Viewport};
    use crate::consent::store::{AuthStatus, AuthStatusSource, WriteAccess};
    use crate::error::StatusError;
    use doubles::*;

    // Local doubles so these tests run without the `test-utils` feature.
    mod doubles {
        use super::*;
        use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
        use std::sync::Mutex;

        pub struct Source {
            pub granted: AtomicBool,
            pub calls: AtomicUsize,
        }

        impl Source {
            pub fn new(granted: bool) -> Arc<Self> {
                Arc::new(Self {
                    granted: AtomicBool::new(granted),
                    calls: AtomicUsize::new(0),
                })
            }
        }

        #[async_trait]
        impl AuthStatusSource for Source {
            async fn fetch_auth_status(&self) -> Result<AuthStatus, StatusError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(AuthStatus {
                    has_write_access: Some(self.granted.load(Ordering::SeqCst)),
                })
            }
        }

        pub struct Popup {
            pub closed: Arc<AtomicBool>,
            pub closed_by_flow: Arc<AtomicBool>,
        }

        impl PopupHandle for Popup {
            fn is_closed(&self) -> bool {
                self.closed.load(Ordering::SeqCst)
            }

            fn close(&self) {
                self.closed_by_flow.store(true, Ordering::SeqCst);
                self.closed.store(true, Ordering::SeqCst);
            }
        }

        pub struct Host {
            pub blocked: bool,
            pub closed: Arc<AtomicBool>,
            pub closed_by_flow: Arc<AtomicBool>,
            pub opened: Mutex<Vec<(String, String, PopupFeatures)>>,
            pub navigations: Mutex<Vec<String>>,
        }

        impl Host {
            pub fn new(blocked: bool) -> Arc<Self> {
                Arc::new(Self {
                    blocked,
                    closed: Arc::new(AtomicBool::new(false)),
                    closed_by_flow: Arc::new(AtomicBool::new(false)),
                    opened: Mutex::new(Vec::new()),
                    navigations: Mutex::new(Vec::new()),
                })
            }

            pub fn open_count(&self) -> usize {
                self.opened.lock().unwrap().len()
            }
        }

        impl Navigator for Host {
            fn current_location(&self) -> String {
                "/videos/template?src=abc".to_string()
            }

            fn navigate(&self, url: &str) {
                self.navigations.lock().unwrap().push(url.to_string());
            }
        }

        impl PopupHost for Host {
            fn viewport(&self) -> Viewport {
                Viewport {
                    screen_left: 0.0,
                    screen_top: 0.0,
                    width: 1600.0,
                    height: 900.0,
                }
            }

            fn open_popup(
                &self,
                url: &str,
                name: &str,
                features: &PopupFeatures,
            ) -> Option<Box<dyn PopupHandle>> {
                self.opened
                    .lock()
                    .unwrap()
                    .push((url.to_string(), name.to_string(), *features));
                if self.blocked {
                    return None;
                }
                Some(Box::new(Popup {
                    closed: self.closed.clone(),
                    closed_by_flow: self.closed_by_flow.clone(),
                }))
            }
        }
    }

    use std::sync::atomic::Ordering;

    const EXPECTED_URL: &str =
        "/api/auth/login/google/write?returnUrl=%2Fvideos%2Ftemplate%3Fsrc%3Dabc";

    /// Close the popup after `after` and flip the server answer to `granted`.
    fn close_popup_later(host: &Arc<Host>, source: &Arc<Source>, after: Duration, granted: bool) {
        let closed = host.closed.clone();
        let source = source.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            source.granted.store(granted, Ordering::SeqCst);
            closed.store(true, Ordering::SeqCst);
        });
    }

    #[test]
    fn test_config_defaults() {
        let config = ConsentConfig::default();
        assert_eq!(config.consent_start_path, "/api/auth/login/google/write");
        assert_eq!(config.popup_name, "YouTube Write Access");
        assert_eq!((config.popup_width, config.popup_height), (600, 700));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert!(config.max_wait.is_none());
        assert!(!config.coalesce_popups);
    }

    #[test]
    fn test_config_builders() {
        let config = ConsentConfig::default()
            .with_poll_interval(Duration::from_millis(50))
            .with_max_wait(Duration::from_secs(60))
            .coalesced();
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert_eq!(config.max_wait, Some(Duration::from_secs(60)));
        assert!(config.coalesce_popups);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_granted_opens_nothing() {
        let source = Source::new(true);
        let store = Arc::new(ConsentStore::new(source.clone()));
        store.refresh().await;
        let host = Host::new(false);
        let flow = ConsentFlow::new(store, host.clone());

        assert!(flow.ensure_consent().await);
        assert_eq!(host.open_count(), 0);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_popup_grant_then_close() {
        let source = Source::new(false);
        let store = Arc::new(ConsentStore::new(source.clone()));
        let host = Host::new(false);
        let flow = ConsentFlow::new(store.clone(), host.clone());

        close_popup_later(&host, &source, Duration::from_secs(3), true);

        assert!(flow.ensure_consent().await);
        assert_eq!(store.current(), WriteAccess::Granted);

        let opened = host.opened.lock().unwrap();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].0, EXPECTED_URL);
        assert_eq!(opened[0].1, "YouTube Write Access");
        assert_eq!(
            opened[0].2,
            PopupFeatures {
                width: 600,
                height: 700,
                top: 100,
                left: 500
            }
        );
        assert!(host.navigations.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidated_grant_opens_popup_again() {
        let source = Source::new(true);
        let store = Arc::new(ConsentStore::new(source.clone()));
        store.refresh().await;
        let host = Host::new(false);
        let flow = ConsentFlow::new(store.clone(), host.clone());

        ConsentProvider::invalidate(&flow);
        assert_eq!(store.current(), WriteAccess::Denied);

        close_popup_later(&host, &source, Duration::from_secs(1), true);

        assert!(flow.ensure_consent().await);
        assert_eq!(host.open_count(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.current(), WriteAccess::Granted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_popup_closed_without_granting() {
        let source = Source::new(false);
        let store = Arc::new(ConsentStore::new(source.clone()));
        let host = Host::new(false);
        let flow = ConsentFlow::new(store.clone(), host.clone());

        close_popup_later(&host, &source, Duration::from_secs(1), false);

        assert!(!flow.ensure_consent().await);
        assert_eq!(store.current(), WriteAccess::Denied);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_popup_navigates_once() {
        let source = Source::new(false);
        let store = Arc::new(ConsentStore::new(source.clone()));
        let host = Host::new(true);
        let flow = ConsentFlow::new(store.clone(), host.clone());

        assert!(!flow.ensure_consent().await);

        assert_eq!(
            *host.navigations.lock().unwrap(),
            vec![EXPECTED_URL.to_string()]
        );
        // No refresh: the page is leaving.
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.current(), WriteAccess::Unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_waits_for_interval() {
        let source = Source::new(true);
        let store = Arc::new(ConsentStore::new(source.clone()));
        let host = Host::new(false);
        host.closed.store(true, Ordering::SeqCst);
        let flow = ConsentFlow::new(store, host.clone());

        let started = Instant::now();
        assert!(flow.ensure_consent().await);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_wait_closes_popup_and_refreshes() {
        let source = Source::new(false);
        let store = Arc::new(ConsentStore::new(source.clone()));
        let host = Host::new(false);
        let flow = ConsentFlow::with_config(
            store.clone(),
            host.clone(),
            ConsentConfig::default().with_max_wait(Duration::from_secs(30)),
        );

        let started = Instant::now();
        assert!(!flow.ensure_consent().await);

        assert!(started.elapsed() >= Duration::from_secs(30));
        assert!(host.closed_by_flow.load(Ordering::SeqCst));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.current(), WriteAccess::Denied);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_calls_open_independent_popups() {
        let source = Source::new(false);
        let store = Arc::new(ConsentStore::new(source.clone()));
        let host = Host::new(false);
        let flow = ConsentFlow::new(store, host.clone());

        close_popup_later(&host, &source, Duration::from_secs(2), true);

        let (a, b) = tokio::join!(flow.ensure_consent(), flow.ensure_consent());
        assert!(a && b);
        assert_eq!(host.open_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_coalesced_calls_share_one_popup() {
        let source = Source::new(false);
        let store = Arc::new(ConsentStore::new(source.clone()));
        let host = Host::new(false);
        let flow =
            ConsentFlow::with_config(store, host.clone(), ConsentConfig::default().coalesced());

        close_popup_later(&host, &source, Duration::from_secs(2), true);

        let (a, b) = tokio::join!(flow.ensure_consent(), flow.ensure_consent());
        assert!(a && b);
        assert_eq!(host.open_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flow_emits_popup_events() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let source = Source::new(false);
        let store = Arc::new(ConsentStore::new(source.clone()));
        let host = Host::new(true);
        let flow = ConsentFlow::new(store, host).with_observer(Arc::new(
            move |e: &ConsentEvent| sink.lock().unwrap().push(e.clone()),
        ));

        flow.ensure_consent().await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![ConsentEvent::PopupBlocked {
                url: EXPECTED_URL.to_string()
            }]
        );
    }
}

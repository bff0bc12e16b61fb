//! Test utilities for youtubester-core.
//!
//! Doubles for the browser and the status endpoint so the consent protocol
//! can be exercised without a window or a server.
//!
//! Enable with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! youtubester-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use youtubester_core::test_utils::{MockPopupHost, StaticAuthStatus};
//! use youtubester_core::{ConsentFlow, ConsentStore};
//!
//! let status = Arc::new(StaticAuthStatus::denied());
//! let host = Arc::new(MockPopupHost::new("/replies").with_auto_close());
//!
//! // Simulate the user granting access inside the popup.
//! let on_open = status.clone();
//! host.on_open(move |_url| on_open.set_write_access(true));
//!
//! let store = Arc::new(ConsentStore::new(status));
//! let flow = ConsentFlow::new(store, host.clone());
//! assert!(flow.ensure_consent().await);
//! assert_eq!(host.opened_urls().len(), 1);
//! ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::consent::{
    AuthStatus, AuthStatusSource, Navigator, PopupFeatures, PopupHandle, PopupHost, Viewport,
};
use crate::error::StatusError;

/// Status source with a settable answer.
pub struct StaticAuthStatus {
    answer: Mutex<Result<AuthStatus, StatusError>>,
    calls: AtomicUsize,
}

impl StaticAuthStatus {
    /// Reports write access.
    pub fn granted() -> Self {
        Self::with_answer(Ok(AuthStatus {
            has_write_access: Some(true),
        }))
    }

    /// Reports no write access.
    pub fn denied() -> Self {
        Self::with_answer(Ok(AuthStatus {
            has_write_access: Some(false),
        }))
    }

    /// Fails every query with `error`.
    pub fn failing(error: StatusError) -> Self {
        Self::with_answer(Err(error))
    }

    fn with_answer(answer: Result<AuthStatus, StatusError>) -> Self {
        Self {
            answer: Mutex::new(answer),
            calls: AtomicUsize::new(0),
        }
    }

    /// Change what the "server" reports from now on.
    pub fn set_write_access(&self, granted: bool) {
        *self.answer.lock().unwrap() = Ok(AuthStatus {
            has_write_access: Some(granted),
        });
    }

    /// Number of status queries served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthStatusSource for StaticAuthStatus {
    async fn fetch_auth_status(&self) -> Result<AuthStatus, StatusError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.lock().unwrap().clone()
    }
}

/// A popup opened by [`MockPopupHost`].
#[derive(Clone)]
pub struct MockPopup {
    closed: Arc<AtomicBool>,
    closed_by_flow: Arc<AtomicBool>,
}

impl MockPopup {
    fn new(closed: bool) -> Self {
        Self {
            closed: Arc::new(AtomicBool::new(closed)),
            closed_by_flow: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Simulate the user closing the window.
    pub fn close_by_user(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Whether the flow itself closed the window (timeout).
    pub fn was_closed_by_flow(&self) -> bool {
        self.closed_by_flow.load(Ordering::SeqCst)
    }
}

impl PopupHandle for MockPopup {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.closed_by_flow.store(true, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }
}

type OpenCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Browser double recording popups and navigations.
pub struct MockPopupHost {
    location: String,
    viewport: Viewport,
    blocked: AtomicBool,
    auto_close: bool,
    popups: Mutex<Vec<(String, PopupFeatures, MockPopup)>>,
    navigations: Mutex<Vec<String>>,
    on_open: Mutex<Option<OpenCallback>>,
}

impl MockPopupHost {
    /// Host whose current page is `location` (path plus query).
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            viewport: Viewport {
                screen_left: 0.0,
                screen_top: 0.0,
                width: 1280.0,
                height: 800.0,
            },
            blocked: AtomicBool::new(false),
            auto_close: false,
            popups: Mutex::new(Vec::new()),
            navigations: Mutex::new(Vec::new()),
            on_open: Mutex::new(None),
        }
    }

    /// Popups report closed from the first poll on.
    pub fn with_auto_close(mut self) -> Self {
        self.auto_close = true;
        self
    }

    /// Use a specific window geometry.
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Make every popup attempt fail, as a popup blocker would.
    pub fn block_popups(&self) {
        self.blocked.store(true, Ordering::SeqCst);
    }

    /// Run `callback` with the URL each time a popup opens.
    pub fn on_open(&self, callback: impl Fn(&str) + Send + Sync + 'static) {
        *self.on_open.lock().unwrap() = Some(Box::new(callback));
    }

    /// URLs of every popup opened so far.
    pub fn opened_urls(&self) -> Vec<String> {
        self.popups
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _, _)| url.clone())
            .collect()
    }

    /// Features of every popup opened so far.
    pub fn opened_features(&self) -> Vec<PopupFeatures> {
        self.popups
            .lock()
            .unwrap()
            .iter()
            .map(|(_, features, _)| *features)
            .collect()
    }

    /// Handles of every popup opened so far.
    pub fn popups(&self) -> Vec<MockPopup> {
        self.popups
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, popup)| popup.clone())
            .collect()
    }

    /// Full-page navigations so far.
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

impl Navigator for MockPopupHost {
    fn current_location(&self) -> String {
        self.location.clone()
    }

    fn navigate(&self, url: &str) {
        self.navigations.lock().unwrap().push(url.to_string());
    }
}

impl PopupHost for MockPopupHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn open_popup(
        &self,
        url: &str,
        _name: &str,
        features: &PopupFeatures,
    ) -> Option<Box<dyn PopupHandle>> {
        if self.blocked.load(Ordering::SeqCst) {
            return None;
        }

        let popup = MockPopup::new(self.auto_close);
        self.popups
            .lock()
            .unwrap()
            .push((url.to_string(), *features, popup.clone()));

        if let Some(callback) = self.on_open.lock().unwrap().as_ref() {
            callback(url);
        }

        Some(Box::new(popup))
    }
}

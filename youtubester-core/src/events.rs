use std::sync::Arc;
use std::time::Duration;

use crate::consent::WriteAccess;

/// Events emitted while negotiating write consent
///
/// These let status indicators and diagnostics follow the consent protocol
/// without polling the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsentEvent {
    // ===== Consent State =====
    /// The store was updated from the server
    StateRefreshed {
        /// New stored value
        access: WriteAccess,
    },

    /// The server rejected a call for missing write consent while the store
    /// still reported access as granted
    AccessRevoked,

    /// The status query failed; the store now reports no write access
    RefreshFailed {
        /// Error message
        error: String,
    },

    // ===== Popup Lifecycle =====
    /// A consent popup was opened
    PopupOpened {
        /// Consent start URL
        url: String,
    },

    /// The browser refused to open the popup; the page is navigating instead
    PopupBlocked {
        /// Consent start URL the page navigates to
        url: String,
    },

    /// The popup was closed by the user or the provider
    PopupClosed {
        /// How long the flow waited
        waited: Duration,
    },

    /// The popup stayed open past the configured maximum wait
    PopupTimedOut {
        /// How long the flow waited
        waited: Duration,
    },

    // ===== Guard =====
    /// A classified endpoint needs consent before the call
    ConsentRequired {
        /// Normalized `"METHOD /path"` key
        endpoint: String,
    },

    /// The server rejected a call for missing write consent
    LateConsentRequired {
        /// Normalized `"METHOD /path"` key
        endpoint: String,
    },

    /// The call is being re-invoked after fresh consent
    CallRetried {
        /// Normalized `"METHOD /path"` key
        endpoint: String,
    },
}

/// Callback type for consent events
pub type ConsentObserver = Arc<dyn Fn(&ConsentEvent) + Send + Sync>;

pub(crate) fn emit(observer: &Option<ConsentObserver>, event: ConsentEvent) {
    if let Some(callback) = observer {
        callback(&event);
    }
}

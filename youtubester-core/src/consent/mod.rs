//! Write-consent step-up authorization.
//!
//! Reading from YouTube needs only the basic session. Writing (posting
//! replies, copying templates) needs an extra grant the user gives through a
//! popup. This module negotiates that grant on demand and replays the call
//! that needed it.
//!
//! # Overview
//!
//! - **[`ClassificationSet`]**: Static table of endpoints known to need write access
//! - **[`ConsentStore`]**: Shared tri-state [`WriteAccess`], refreshed from the server
//! - **[`ConsentFlow`]**: Opens the consent popup and waits for it to close
//! - **[`WriteGuard`]**: Wraps calls, pre-authorizes and retries once on a consent error
//!
//! # Failure Polarity
//!
//! Classification fails **open**: an endpoint missing from the table is called
//! without pre-authorization and recovered by the guard's retry. Permission
//! state fails **closed**: if the server cannot be asked, the store reports
//! [`WriteAccess::Denied`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use youtubester_core::consent::{ClassificationSet, ConsentFlow, ConsentStore, WriteGuard};
//!
//! let store = Arc::new(ConsentStore::new(status_source));
//! store.bootstrap();
//!
//! let flow = Arc::new(ConsentFlow::new(store.clone(), popup_host));
//! let guard = WriteGuard::new(ClassificationSet::generated(), flow);
//!
//! let approved = guard
//!     .call("POST", "/api/replies/approve", || client.approve_replies(&decisions))
//!     .await?;
//! ```

mod endpoint;
mod flow;
mod guard;
mod popup;
mod requires_write;
mod store;

pub use endpoint::{
    collect_requires_write_entries, render_requires_write_module, ClassificationSet, EndpointKey,
    REQUIRES_WRITE_EXTENSION,
};
pub use flow::{ConsentConfig, ConsentFlow, ConsentProvider, DEFAULT_CONSENT_START_PATH};
pub use guard::{CallDescriptor, ConsentSignal, WriteGuard};
pub use popup::{consent_start_url, Navigator, PopupFeatures, PopupHandle, PopupHost, Viewport};
pub use store::{AuthStatus, AuthStatusSource, ConsentStore, WriteAccess};

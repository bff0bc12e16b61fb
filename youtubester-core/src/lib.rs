//! # YouTubester Core
//!
//! Client-side coordination for YouTube write access in the YouTubester
//! dashboard.
//!
//! The backend holds the user's Google session. Some operations (posting
//! approved replies, copying a video template) need an elevated YouTube
//! write scope that the user grants separately, out of band, in a popup.
//! This crate decides when that grant is needed, runs the popup round trip,
//! and replays the call that needed it.
//!
//! ## Modules
//!
//! - [`consent`]: classification table, consent store, popup flow and write guard
//! - [`events`]: observable [`ConsentEvent`]s for status indicators and diagnostics
//! - [`error`]: [`GuardError`] and [`StatusError`]
//!
//! Browser access goes through the [`consent::PopupHost`] trait, and the
//! server's status query through [`consent::AuthStatusSource`], so the
//! protocol runs the same in a wasm front-end, a native shell or a test.
//!
//! ## Testing
//!
//! Enable the `test-utils` feature for ready-made doubles:
//!
//! ```toml
//! [dev-dependencies]
//! youtubester-core = { version = "...", features = ["test-utils"] }
//! ```

pub mod consent;
pub mod error;
pub mod events;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use consent::{
    ClassificationSet, ConsentConfig, ConsentFlow, ConsentStore, WriteAccess, WriteGuard,
};
pub use error::{GuardError, StatusError};
pub use events::{ConsentEvent, ConsentObserver};

//! Typed client for the YouTubester dashboard backend
//!
//! Covers the endpoints the dashboard uses: the session (`/api/auth/*`),
//! the channel's videos and template copy (`/api/videos*`) and AI reply
//! review (`/api/replies*`). Calls that change the channel on YouTube go
//! through [`GuardedApi`], which obtains YouTube write access on demand.
//!
//! # Quick Start
//!
//! ```no_run
//! use youtubester_api::{ListVideosParams, Youtubester};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Youtubester::from_env()?;
//!
//! let page = client
//!     .list_videos(&ListVideosParams::default().title("tutorial"))
//!     .await?;
//! for video in page.items {
//!     println!("{} {:?}", video.video_id, video.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Write Access
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use youtubester_api::{GuardedApi, Youtubester};
//!
//! // `host` is the browser integration implementing `PopupHost`
//! let api = GuardedApi::new(Youtubester::from_env()?, host);
//! api.bootstrap();
//!
//! // Opens the consent popup first if the session lacks write access
//! let result = api.approve_replies(&decisions).await?;
//! println!("{} posted, {} failed", result.succeeded, result.failed);
//! ```
//!
//! # Error Handling
//!
//! Failed requests return [`ApiError`]. A 403 carrying
//! `code: "WRITE_CONSENT_REQUIRED"` is recognised by the write guard and
//! triggers one re-consent and retry; a 401 can be turned into a login
//! redirect with [`auth::redirect_on_unauthorized`].

pub mod auth;
pub mod client;
pub mod error;
pub mod guarded;
pub mod replies;
pub mod videos;

pub use auth::{login_url, AuthService, RouteDecision, User, UserSession};
pub use client::{AuthMe, Youtubester, YoutubesterBuilder, DEFAULT_API_BASE};
pub use error::{ApiError, ProblemDetails, WRITE_CONSENT_REQUIRED_CODE};
pub use guarded::{GuardedApi, GuardedApiBuilder, GuardedResult};
pub use replies::{ApproveRepliesResult, DraftDecisionDto, Reply, ReplyStatus, MAX_REPLY_LEN};
pub use videos::{
    AiSuggestionOptions, CopyTemplateForm, CopyVideoTemplateRequest, ListVideosParams,
    VideoListItemDto, VideoPage,
};

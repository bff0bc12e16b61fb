//! API facade that routes mutating calls through the write guard.

use std::sync::Arc;
use tokio::task::JoinHandle;
use youtubester_core::consent::{ClassificationSet, ConsentConfig, ConsentFlow, PopupHost};
use youtubester_core::{ConsentObserver, ConsentStore, GuardError, WriteAccess, WriteGuard};

use crate::client::{Youtubester, APPROVE_REPLIES_PATH, COPY_TEMPLATE_PATH, REPLY_PATH_TEMPLATE};
use crate::error::ApiError;
use crate::replies::{ApproveRepliesResult, DraftDecisionDto, Reply};
use crate::videos::{CopyVideoTemplateRequest, ListVideosParams, VideoPage};

/// Result of a guarded call
pub type GuardedResult<T> = Result<T, GuardError<ApiError>>;

/// The dashboard's view of the API.
///
/// Reads go straight to the client. Writes go through a [`WriteGuard`] so
/// missing YouTube write access is obtained in a popup and the call replayed.
///
/// # Example
///
/// ```rust,ignore
/// let api = GuardedApi::builder(Youtubester::from_env()?, host).build();
/// api.bootstrap();
///
/// match api.copy_template(&form.to_request()).await {
///     Ok(()) => println!("Template copied"),
///     Err(e) if e.is_write_access_required() => println!("{}", e),
///     Err(e) => return Err(e.into()),
/// }
/// ```
#[derive(Debug)]
pub struct GuardedApi {
    client: Youtubester,
    store: Arc<ConsentStore>,
    guard: WriteGuard,
}

impl GuardedApi {
    /// Build with the generated classification table and default consent config
    pub fn new(client: Youtubester, host: Arc<dyn PopupHost>) -> Self {
        Self::builder(client, host).build()
    }

    pub fn builder(client: Youtubester, host: Arc<dyn PopupHost>) -> GuardedApiBuilder {
        GuardedApiBuilder {
            client,
            host,
            config: ConsentConfig::default(),
            classification: None,
            observer: None,
        }
    }

    /// Assemble from already-built pieces.
    pub fn from_parts(client: Youtubester, store: Arc<ConsentStore>, guard: WriteGuard) -> Self {
        Self {
            client,
            store,
            guard,
        }
    }

    pub fn client(&self) -> &Youtubester {
        &self.client
    }

    pub fn store(&self) -> &Arc<ConsentStore> {
        &self.store
    }

    pub fn guard(&self) -> &WriteGuard {
        &self.guard
    }

    /// Current write access, for status indicators
    pub fn write_access(&self) -> WriteAccess {
        self.store.current()
    }

    /// Start the initial consent-state refresh. Only the first call spawns it.
    pub fn bootstrap(&self) -> Option<JoinHandle<()>> {
        self.store.bootstrap()
    }

    // ===== Reads =====

    pub async fn list_videos(&self, params: &ListVideosParams) -> Result<VideoPage, ApiError> {
        self.client.list_videos(params).await
    }

    pub async fn list_replies(&self) -> Result<Vec<Reply>, ApiError> {
        self.client.list_replies().await
    }

    // ===== Writes =====

    /// Copy a video template, obtaining write access first if needed.
    pub async fn copy_template(&self, request: &CopyVideoTemplateRequest) -> GuardedResult<()> {
        self.guard
            .call("POST", COPY_TEMPLATE_PATH, || self.client.copy_template(request))
            .await
    }

    /// Post approved replies, obtaining write access first if needed.
    pub async fn approve_replies(
        &self,
        decisions: &[DraftDecisionDto],
    ) -> GuardedResult<ApproveRepliesResult> {
        self.guard
            .call("POST", APPROVE_REPLIES_PATH, || {
                self.client.approve_replies(decisions)
            })
            .await
    }

    /// Discard a suggested reply.
    ///
    /// Classified by its route template, so every id is pre-authorized.
    pub async fn delete_reply(&self, id: &str) -> GuardedResult<()> {
        self.guard
            .call("DELETE", REPLY_PATH_TEMPLATE, || self.client.delete_reply(id))
            .await
    }
}

/// Builder for [`GuardedApi`]
pub struct GuardedApiBuilder {
    client: Youtubester,
    host: Arc<dyn PopupHost>,
    config: ConsentConfig,
    classification: Option<ClassificationSet>,
    observer: Option<ConsentObserver>,
}

impl GuardedApiBuilder {
    /// Popup and polling configuration
    pub fn config(mut self, config: ConsentConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a classification other than the generated table
    pub fn classification(mut self, classification: ClassificationSet) -> Self {
        self.classification = Some(classification);
        self
    }

    /// Observe consent events from the store, the flow and the guard
    pub fn observer(mut self, observer: ConsentObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> GuardedApi {
        let mut store = ConsentStore::new(Arc::new(self.client.clone()));
        if let Some(observer) = &self.observer {
            store = store.with_observer(observer.clone());
        }
        let store = Arc::new(store);

        let mut flow = ConsentFlow::with_config(store.clone(), self.host, self.config);
        if let Some(observer) = &self.observer {
            flow = flow.with_observer(observer.clone());
        }

        let classification = self
            .classification
            .unwrap_or_else(ClassificationSet::generated);
        let mut guard = WriteGuard::new(classification, Arc::new(flow));
        if let Some(observer) = self.observer {
            guard = guard.with_observer(observer);
        }

        GuardedApi::from_parts(self.client, store, guard)
    }
}

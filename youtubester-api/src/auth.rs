//! Sign-in, sign-out and the signed-in user.
//!
//! The backend owns the Google session; the client only learns whether a
//! session cookie is valid by asking `GET /api/auth/me`.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use youtubester_core::consent::Navigator;

use crate::client::{AuthMe, Youtubester};
use crate::error::ApiError;

/// Server route that starts the Google sign-in
pub const LOGIN_START_PATH: &str = "/api/auth/login/google";

/// Client-side login page
pub const LOGIN_PAGE_PATH: &str = "/login";

/// URL that starts Google sign-in and comes back to `return_url`.
pub fn login_url(return_url: Option<&str>) -> String {
    match return_url.filter(|r| !r.is_empty()) {
        Some(return_url) => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("returnUrl", return_url)
                .finish();
            format!("{}?{}", LOGIN_START_PATH, query)
        }
        None => LOGIN_START_PATH.to_string(),
    }
}

/// Login page URL that sends the user back to `location` afterwards.
pub fn login_page_url(location: &str) -> String {
    format!(
        "{}?returnUrl={}",
        LOGIN_PAGE_PATH,
        urlencoding::encode(location)
    )
}

/// Send the user to the login page when `err` is a 401.
///
/// Nothing happens when the current page already is the login page. Returns
/// whether a navigation was issued.
pub fn redirect_on_unauthorized(err: &ApiError, nav: &dyn Navigator) -> bool {
    if !err.is_unauthorized() {
        return false;
    }

    let location = nav.current_location();
    if location.starts_with(LOGIN_PAGE_PATH) {
        return false;
    }

    tracing::info!(%location, "Session expired, redirecting to login");
    nav.navigate(&login_page_url(&location));
    true
}

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

impl From<AuthMe> for User {
    fn from(me: AuthMe) -> Self {
        Self {
            email: me.email.unwrap_or_default(),
            name: me.name.unwrap_or_default(),
            picture: me.picture,
        }
    }
}

/// Login and logout against the backend
#[derive(Clone, Debug)]
pub struct AuthService {
    client: Youtubester,
}

impl AuthService {
    pub fn new(client: Youtubester) -> Self {
        Self { client }
    }

    /// The signed-in user, or `None` when there is no valid session.
    ///
    /// Every failure, 401 or otherwise, reads as signed out.
    pub async fn current_user(&self) -> Option<User> {
        match self.client.auth_me().await {
            Ok(me) => Some(me.into()),
            Err(e) => {
                tracing::debug!(error = %e, "No current user");
                None
            }
        }
    }

    /// Start Google sign-in with a full-page navigation.
    pub fn login(&self, nav: &dyn Navigator, return_url: Option<&str>) {
        nav.navigate(&login_url(return_url));
    }

    /// End the session and go to the login page.
    ///
    /// A failed logout request still navigates.
    pub async fn logout(&self, nav: &dyn Navigator) {
        if let Err(e) = self.client.logout().await {
            tracing::warn!(error = %e, "Logout request failed");
        }
        nav.navigate(LOGIN_PAGE_PATH);
    }
}

/// What a protected page should do right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// The session check is still running
    Loading,
    /// Not signed in; go to this login URL
    Redirect(String),
    /// Signed in; show the page
    Render,
}

#[derive(Debug)]
struct SessionState {
    user: Option<User>,
    loading: bool,
}

/// Signed-in state shared by the pages
#[derive(Debug)]
pub struct UserSession {
    auth: AuthService,
    state: RwLock<SessionState>,
}

impl UserSession {
    /// A session that is loading until [`initialize`](Self::initialize) runs.
    pub fn new(auth: AuthService) -> Self {
        Self {
            auth,
            state: RwLock::new(SessionState {
                user: None,
                loading: true,
            }),
        }
    }

    /// First session check.
    pub async fn initialize(&self) {
        self.state.write().loading = true;
        self.refresh_user().await;
        self.state.write().loading = false;
    }

    /// Ask the server who is signed in.
    pub async fn refresh_user(&self) {
        let user = self.auth.current_user().await;
        self.state.write().user = user;
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().user.is_some()
    }

    pub fn user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Decide what a protected page at `location` (path plus query) shows.
    pub fn route_decision(&self, location: &str) -> RouteDecision {
        let state = self.state.read();
        if state.loading {
            RouteDecision::Loading
        } else if state.user.is_none() {
            RouteDecision::Redirect(login_page_url(location))
        } else {
            RouteDecision::Render
        }
    }

    /// Forget the user locally and log out on the server.
    pub async fn logout(&self, nav: &dyn Navigator) {
        self.state.write().user = None;
        self.auth.logout(nav).await;
    }
}

//! Browser seams for the consent flow.
//!
//! The flow never touches a real window directly. A host implementation
//! (wasm front-end, embedded webview, test double) provides location,
//! navigation and popup windows.

use std::fmt;

/// Page location and navigation.
pub trait Navigator: Send + Sync {
    /// Current page path plus query string, e.g. `/replies?page=2`.
    fn current_location(&self) -> String;

    /// Full-page navigation to `url`.
    fn navigate(&self, url: &str);
}

/// A window the consent flow opened.
///
/// The popup's content is cross-origin, so all the flow can observe is
/// whether it is still open.
pub trait PopupHandle: Send + Sync {
    /// True once the window has been closed.
    fn is_closed(&self) -> bool;

    /// Close the window.
    fn close(&self);
}

/// Host able to open popup windows.
pub trait PopupHost: Navigator {
    /// Screen position and inner size of the current window.
    fn viewport(&self) -> Viewport;

    /// Open a new window, or `None` if the browser blocked it.
    fn open_popup(
        &self,
        url: &str,
        name: &str,
        features: &PopupFeatures,
    ) -> Option<Box<dyn PopupHandle>>;
}

/// Geometry of the window the popup is centered over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Window's left edge on the (possibly multi-monitor) screen
    pub screen_left: f64,
    /// Window's top edge on the screen
    pub screen_top: f64,
    /// Inner width
    pub width: f64,
    /// Inner height
    pub height: f64,
}

/// Window features of a centered, fixed-size popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupFeatures {
    pub width: i64,
    pub height: i64,
    pub top: i64,
    pub left: i64,
}

impl PopupFeatures {
    /// Center a `width` x `height` popup over `viewport`.
    pub fn centered(viewport: Viewport, width: u32, height: u32) -> Self {
        let width = f64::from(width);
        let height = f64::from(height);
        let left = viewport.screen_left + (viewport.width - width) / 2.0;
        let top = viewport.screen_top + (viewport.height - height) / 2.0;

        Self {
            width: js_round(width),
            height: js_round(height),
            top: js_round(top),
            left: js_round(left),
        }
    }
}

impl fmt::Display for PopupFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scrollbars=yes,width={},height={},top={},left={}",
            self.width, self.height, self.top, self.left
        )
    }
}

/// Round half toward positive infinity, as browsers do for window features.
fn js_round(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// URL that starts the write-consent login, returning to `return_url`.
pub fn consent_start_url(start_path: &str, return_url: &str) -> String {
    format!("{}?returnUrl={}", start_path, urlencoding::encode(return_url))
}

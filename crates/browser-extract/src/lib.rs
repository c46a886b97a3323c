//! Headless-Chromium support for the handful of hosts whose players only
//! assemble their stream URL in JavaScript. The launcher finds or fetches
//! a Chromium build; the capture half watches the page's own network
//! traffic for the first media request.

pub mod capture;
pub mod launcher;

pub use capture::{capture_media_request, CapturedRequest};
pub use launcher::{launch_browser, BrowserHandle, LaunchOptions};

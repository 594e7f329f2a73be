// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client layer for the shell
//!
//! Used for the page host's default resource loads and for the native
//! re-issue of intercepted requests.

mod client;
mod request;
mod response;

pub use client::{HttpClient, HttpClientConfig};
pub use request::Request;
pub use response::Response;

/// Default user agent string (Android system WebView on a recent Chrome)
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Linux; Android 14; K; wv) AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/120.0.0.0 Mobile Safari/537.36";

/// Common HTTP headers
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const ACCESS_CONTROL_ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
    pub const ACCESS_CONTROL_ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
    pub const ACCESS_CONTROL_ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
}

/// Remove the `wv` token Android appends to WebView user agents.
///
/// Some map libraries refuse to run when they detect an embedded WebView.
pub fn strip_webview_marker(user_agent: &str) -> String {
    let stripped = user_agent.replace("; wv)", ")").replace("wv", "");
    // collapse the "; ;" or double spaces left behind
    let mut out = String::with_capacity(stripped.len());
    let mut prev_space = false;
    for c in stripped.chars() {
        if c == ' ' {
            if prev_space {
                continue;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
        out.push(c);
    }
    out.replace("; ;", ";").replace("; )", ")")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_webview_marker() {
        let ua = strip_webview_marker(DEFAULT_USER_AGENT);
        assert!(!ua.contains("wv"));
        assert!(ua.starts_with("Mozilla/5.0 (Linux; Android 14; K) AppleWebKit"));
    }

    #[test]
    fn test_strip_without_marker() {
        let ua = "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101";
        assert_eq!(strip_webview_marker(ua), ua);
    }
}

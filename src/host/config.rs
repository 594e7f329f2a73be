// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Shell and page configuration

use std::time::Duration;

use crate::bridge::{BridgeConfig, NoticeMessages, PollConfig};
use crate::http::{strip_webview_marker, HttpClientConfig, DEFAULT_USER_AGENT};

/// Page the shell opens on launch
pub const DEFAULT_START_URL: &str = "https://meomeokno.vercel.app/";

/// Environment variable overriding the start URL
pub const START_URL_ENV: &str = "MEOMEOKNO_URL";

/// Mixed content handling for secure pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixedContentMode {
    AlwaysAllow,
    CompatibilityMode,
    NeverAllow,
}

/// Web settings applied to the hosted page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebSettings {
    pub javascript_enabled: bool,
    /// Install `localStorage`/`sessionStorage`
    pub dom_storage_enabled: bool,
    // The fields below mirror the Android WebView settings the app ships
    // with. They are carried in the config but have no effect in the page host.
    pub database_enabled: bool,
    pub allow_file_access: bool,
    pub allow_content_access: bool,
    pub load_with_overview_mode: bool,
    pub use_wide_view_port: bool,
    pub mixed_content_mode: MixedContentMode,
    pub javascript_can_open_windows_automatically: bool,
    pub support_multiple_windows: bool,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            javascript_enabled: true,
            dom_storage_enabled: true,
            database_enabled: true,
            allow_file_access: true,
            allow_content_access: true,
            load_with_overview_mode: true,
            use_wide_view_port: true,
            mixed_content_mode: MixedContentMode::AlwaysAllow,
            javascript_can_open_windows_automatically: true,
            support_multiple_windows: false,
        }
    }
}

/// Shell configuration
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// First page loaded
    pub start_url: String,
    /// User agent, webview marker already stripped
    pub user_agent: String,
    /// Request timeout; none by default
    pub timeout: Option<Duration>,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Global name of the native bridge object
    pub bridge_name: String,
    /// Page settings
    pub settings: WebSettings,
    /// Location bridge settings
    pub bridge: BridgeConfig,
    /// Cap on timer callbacks per page tick
    pub max_timer_executions: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            user_agent: strip_webview_marker(DEFAULT_USER_AGENT),
            timeout: None,
            proxy: None,
            bridge_name: "Android".to_string(),
            settings: WebSettings::default(),
            bridge: BridgeConfig::default(),
            max_timer_executions: 1000,
        }
    }
}

impl ShellConfig {
    /// Create a new shell config
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config with the start URL taken from `MEOMEOKNO_URL` when set
    pub fn from_env() -> Self {
        match std::env::var(START_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::default().start_url(url.trim()),
            _ => Self::default(),
        }
    }

    /// Set start URL
    pub fn start_url(mut self, url: impl Into<String>) -> Self {
        self.start_url = url.into();
        self
    }

    /// Set user agent; the `wv` marker is removed
    pub fn user_agent(mut self, user_agent: impl AsRef<str>) -> Self {
        self.user_agent = strip_webview_marker(user_agent.as_ref());
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set the bridge object name
    pub fn bridge_name(mut self, name: impl Into<String>) -> Self {
        self.bridge_name = name.into();
        self
    }

    /// Enable/disable JavaScript
    pub fn javascript_enabled(mut self, enabled: bool) -> Self {
        self.settings.javascript_enabled = enabled;
        self
    }

    /// Replace the page settings
    pub fn settings(mut self, settings: WebSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the callback readiness poll
    pub fn poll(mut self, poll: PollConfig) -> Self {
        self.bridge.poll = poll;
        self
    }

    /// Set the notice texts
    pub fn messages(mut self, messages: NoticeMessages) -> Self {
        self.bridge.messages = messages;
        self
    }

    /// HTTP client settings derived from this config
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout,
            proxy: self.proxy.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ShellConfig::default();
        assert_eq!(config.start_url, "https://meomeokno.vercel.app/");
        assert_eq!(config.bridge_name, "Android");
        assert!(config.timeout.is_none());
        assert!(!config.user_agent.contains("; wv)"));
        assert_eq!(config.bridge.request_code, 1000);
        assert_eq!(config.settings.mixed_content_mode, MixedContentMode::AlwaysAllow);
        assert!(!config.settings.support_multiple_windows);
    }

    #[test]
    fn test_builder() {
        let config = ShellConfig::new()
            .start_url("http://localhost:5173/")
            .user_agent("Mozilla/5.0 (Linux; Android 14; wv) Chrome/120")
            .timeout(Duration::from_secs(5))
            .bridge_name("Native")
            .javascript_enabled(false);

        assert_eq!(config.start_url, "http://localhost:5173/");
        assert_eq!(config.user_agent, "Mozilla/5.0 (Linux; Android 14) Chrome/120");
        assert_eq!(config.bridge_name, "Native");
        assert!(!config.settings.javascript_enabled);

        let http = config.http_config();
        assert_eq!(http.timeout, Some(Duration::from_secs(5)));
        assert_eq!(http.user_agent, config.user_agent);
    }
}

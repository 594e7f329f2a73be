// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request and response views exchanged with the page host

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Content type used when upstream does not send one
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Text encoding reported for every proxied response
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Read-only view of a request the page is about to make
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptedRequest {
    /// Full request URL
    pub url: String,
    /// HTTP method as reported by the page ("GET", "POST", ...)
    pub method: String,
}

impl InterceptedRequest {
    /// Create a new request view
    pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
        }
    }

    /// Shorthand for a GET
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, "GET")
    }
}

/// A response handed to the page in place of its own fetch
#[derive(Debug, Clone)]
pub struct ProxiedResponse {
    /// Upstream status code
    pub status_code: u16,
    /// Upstream reason phrase
    pub status_message: String,
    /// MIME type without parameters
    pub content_type: String,
    /// Text encoding
    pub encoding: String,
    /// Response headers exposed to the page
    pub headers: BTreeMap<String, String>,
    /// Upstream body, passed through untouched
    pub body: Bytes,
}

impl ProxiedResponse {
    /// Header lookup, case-insensitive on the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as text, lossy conversion
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut headers = BTreeMap::new();
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        let resp = ProxiedResponse {
            status_code: 204,
            status_message: "No Content".to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            encoding: DEFAULT_ENCODING.to_string(),
            headers,
            body: Bytes::new(),
        };

        assert_eq!(resp.header("access-control-allow-origin"), Some("*"));
        assert!(resp.header("content-length").is_none());
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Native re-fetch of place-search requests with permissive CORS headers
//!
//! The hosted app runs under the page's origin and cannot get past the
//! Places API CORS policy. The shell has no such restriction, so it performs
//! the fetch itself and hands the page a response that allows any origin.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::event::{InterceptedRequest, ProxiedResponse, DEFAULT_CONTENT_TYPE, DEFAULT_ENCODING};
use super::interceptor_trait::{InterceptAction, RequestInterceptor};
use crate::error::Result;
use crate::http::{headers, HttpClient, Request};

/// URL fragment identifying the place-search endpoint
pub const PLACES_API_PATTERN: &str = "maps.googleapis.com/maps/api/place";

/// Headers added to every proxied response, regardless of upstream
pub const CORS_HEADERS: [(&str, &str); 3] = [
    (headers::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (headers::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
    (headers::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Authorization"),
];

/// Strip parameters (`; charset=...`) from a content type.
///
/// Missing or blank values become `application/json`.
pub fn normalize_content_type(raw: Option<&str>) -> String {
    let mime = raw
        .map(|ct| ct.split(';').next().unwrap_or("").trim())
        .unwrap_or("");
    if mime.is_empty() {
        DEFAULT_CONTENT_TYPE.to_string()
    } else {
        mime.to_string()
    }
}

/// Interception rule that launders matching requests through a native fetch
pub struct CorsProxy {
    client: HttpClient,
    pattern: String,
}

impl CorsProxy {
    /// Proxy for the Places API
    pub fn new(client: HttpClient) -> Self {
        Self::with_pattern(client, PLACES_API_PATTERN)
    }

    /// Proxy any URL containing `pattern`
    pub fn with_pattern(client: HttpClient, pattern: impl Into<String>) -> Self {
        Self {
            client,
            pattern: pattern.into(),
        }
    }

    /// URL fragment this rule matches
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[async_trait]
impl RequestInterceptor for CorsProxy {
    fn name(&self) -> &str {
        "cors-proxy"
    }

    fn should_intercept(&self, request: &InterceptedRequest) -> bool {
        request.url.contains(&self.pattern)
    }

    async fn intercept(&self, request: &InterceptedRequest) -> Result<InterceptAction> {
        tracing::debug!(url = %request.url, method = %request.method, "Proxying request natively");

        let upstream = Request::with_method_name(&request.method, &request.url)?;
        let response = self.client.execute(upstream).await?;

        let mut headers = BTreeMap::new();
        for (name, value) in CORS_HEADERS {
            headers.insert(name.to_string(), value.to_string());
        }

        tracing::debug!(
            url = %request.url,
            status = response.status_code(),
            bytes = response.body_len(),
            time_ms = response.response_time_ms,
            "Proxied response ready"
        );

        Ok(InterceptAction::Respond(ProxiedResponse {
            status_code: response.status_code(),
            status_message: response.status_message().to_string(),
            content_type: normalize_content_type(response.content_type()),
            encoding: DEFAULT_ENCODING.to_string(),
            headers,
            body: response.body,
        }))
    }

    fn priority(&self) -> i32 {
        100
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::network::InterceptorChain;

    fn proxy() -> CorsProxy {
        CorsProxy::with_pattern(HttpClient::new().unwrap(), "/maps/api/place")
    }

    #[test]
    fn test_normalize_content_type() {
        assert_eq!(
            normalize_content_type(Some("application/json; charset=utf-8")),
            "application/json"
        );
        assert_eq!(normalize_content_type(Some("text/html")), "text/html");
        assert_eq!(normalize_content_type(Some("  ; charset=utf-8")), "application/json");
        assert_eq!(normalize_content_type(None), "application/json");
    }

    #[test]
    fn test_default_pattern() {
        let proxy = CorsProxy::new(HttpClient::new().unwrap());
        assert!(proxy.should_intercept(&InterceptedRequest::get(
            "https://maps.googleapis.com/maps/api/place/details/json?place_id=abc&key=k"
        )));
        assert!(!proxy.should_intercept(&InterceptedRequest::get(
            "https://maps.googleapis.com/maps/api/js?key=k"
        )));
        assert!(!proxy.should_intercept(&InterceptedRequest::get(
            "https://meomeokno.vercel.app/"
        )));
    }

    #[tokio::test]
    async fn test_places_details_scenario() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/details/json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"status":"OK","result":{"name":"Gimbap Heaven"}}"#,
                "application/json; charset=utf-8",
            ))
            .mount(&server)
            .await;

        let url = format!("{}/maps/api/place/details/json?place_id=abc", server.uri());
        let response = proxy()
            .intercept(&InterceptedRequest::get(url))
            .await
            .unwrap()
            .into_response()
            .unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.status_message, "OK");
        assert_eq!(response.content_type, "application/json");
        assert_eq!(response.encoding, "UTF-8");
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(
            response.header("Access-Control-Allow-Methods"),
            Some("GET, POST, OPTIONS")
        );
        assert_eq!(
            response.header("Access-Control-Allow-Headers"),
            Some("Content-Type, Authorization")
        );
        assert!(response.text_lossy().contains("Gimbap Heaven"));
    }

    #[tokio::test]
    async fn test_upstream_error_status_is_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/maps/api/place/textsearch/json"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_raw(r#"{"status":"NOT_FOUND"}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let url = format!("{}/maps/api/place/textsearch/json", server.uri());
        let response = proxy()
            .intercept(&InterceptedRequest::new(url, "POST"))
            .await
            .unwrap()
            .into_response()
            .unwrap();

        assert_eq!(response.status_code, 404);
        assert_eq!(response.status_message, "Not Found");
        assert_eq!(response.headers.len(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_falls_back_to_default() {
        let chain = InterceptorChain::new().with(proxy());
        let action = chain
            .intercept(&InterceptedRequest::get(
                "http://127.0.0.1:1/maps/api/place/details/json",
            ))
            .await;
        assert!(action.is_default());
    }

    #[tokio::test]
    async fn test_bad_method_falls_back_to_default() {
        let chain = InterceptorChain::new().with(proxy());
        let action = chain
            .intercept(&InterceptedRequest::new(
                "http://127.0.0.1:1/maps/api/place/details/json",
                "NOT A METHOD",
            ))
            .await;
        assert!(action.is_default());
    }
}

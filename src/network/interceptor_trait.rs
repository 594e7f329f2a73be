// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interceptor trait and the predicate → handler table

use std::sync::Arc;

use async_trait::async_trait;

use super::event::{InterceptedRequest, ProxiedResponse};
use crate::error::Result;

/// A single interception rule
///
/// `should_intercept` is the predicate, `intercept` the handler. A handler
/// that fails is logged by the chain and the request falls back to default
/// handling; the page never sees the error.
///
/// # Example
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use meomeokno::network::{InterceptAction, InterceptedRequest, RequestInterceptor};
/// use meomeokno::Result;
///
/// struct BlockAnalytics;
///
/// #[async_trait]
/// impl RequestInterceptor for BlockAnalytics {
///     fn name(&self) -> &str {
///         "block-analytics"
///     }
///
///     fn should_intercept(&self, request: &InterceptedRequest) -> bool {
///         request.url.contains("google-analytics.com")
///     }
///
///     async fn intercept(&self, _request: &InterceptedRequest) -> Result<InterceptAction> {
///         Ok(InterceptAction::Default)
///     }
/// }
/// ```
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Rule name, used in logs
    fn name(&self) -> &str;

    /// Predicate - return true if this rule handles the request
    fn should_intercept(&self, request: &InterceptedRequest) -> bool;

    /// Handle a matching request
    async fn intercept(&self, request: &InterceptedRequest) -> Result<InterceptAction>;

    /// Priority - higher priority rules are consulted first
    fn priority(&self) -> i32 {
        0
    }
}

/// Outcome of offering a request to the chain
#[derive(Debug, Clone)]
pub enum InterceptAction {
    /// Let the page host perform its own fetch
    Default,
    /// Short-circuit the fetch with this response
    Respond(ProxiedResponse),
}

impl InterceptAction {
    /// Check if this is the pass-through sentinel
    pub fn is_default(&self) -> bool {
        matches!(self, InterceptAction::Default)
    }

    /// Take the substituted response, if any
    pub fn into_response(self) -> Option<ProxiedResponse> {
        match self {
            InterceptAction::Respond(response) => Some(response),
            InterceptAction::Default => None,
        }
    }
}

/// Ordered table of interception rules
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl InterceptorChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    /// Add a rule
    pub fn add<I: RequestInterceptor + 'static>(&mut self, interceptor: I) {
        self.add_shared(Arc::new(interceptor));
    }

    /// Add a rule that is shared elsewhere
    pub fn add_shared(&mut self, interceptor: Arc<dyn RequestInterceptor>) {
        self.interceptors.push(interceptor);
        // stable sort keeps insertion order among equal priorities
        self.interceptors.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Builder-style [`add`](Self::add)
    pub fn with<I: RequestInterceptor + 'static>(mut self, interceptor: I) -> Self {
        self.add(interceptor);
        self
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Check if the chain has no rules
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Rule names in consultation order
    pub fn names(&self) -> Vec<String> {
        self.interceptors.iter().map(|i| i.name().to_string()).collect()
    }

    /// Offer a request to the rules
    ///
    /// The first rule that answers with a response wins. A rule that errors
    /// ends the walk with [`InterceptAction::Default`].
    pub async fn intercept(&self, request: &InterceptedRequest) -> InterceptAction {
        for interceptor in &self.interceptors {
            if !interceptor.should_intercept(request) {
                continue;
            }

            match interceptor.intercept(request).await {
                Ok(InterceptAction::Default) => continue,
                Ok(action) => return action,
                Err(e) => {
                    tracing::error!(
                        rule = interceptor.name(),
                        url = %request.url,
                        method = %request.method,
                        error = %e,
                        "Interception failed, falling back to default handling"
                    );
                    return InterceptAction::Default;
                }
            }
        }
        InterceptAction::Default
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Resource request interception
//!
//! Every resource load the page host performs is offered to an
//! [`InterceptorChain`] first. A rule may answer the request itself, in which
//! case the browser's own fetch is skipped, or hand it back for default
//! handling.

mod cors_proxy;
mod event;
mod interceptor_trait;

pub use cors_proxy::{normalize_content_type, CorsProxy, CORS_HEADERS, PLACES_API_PATTERN};
pub use event::{InterceptedRequest, ProxiedResponse, DEFAULT_CONTENT_TYPE, DEFAULT_ENCODING};
pub use interceptor_trait::{InterceptAction, InterceptorChain, RequestInterceptor};

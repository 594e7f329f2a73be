// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Meomeokno - Native Shell for a Hosted Web App
//!
//! Hosts the meomeokno web app in a headless page and gives it two native
//! capabilities it cannot have in a plain browser context.
//!
//! ## Features
//!
//! - Location bridge: `Android.requestLocation()` asks for permission,
//!   fetches the last known fix and hands `{lat, lng}` to
//!   `window.onNativeLocation`, polling until the page has registered it
//! - CORS proxy: Google Places API requests are re-issued natively and
//!   answered with permissive CORS headers
//! - Page host: boa_engine context on its own thread, wall-clock timers,
//!   console forwarding, back navigation. Only classic scripts run:
//!   `<script type="module">` (what bundlers such as Vite emit) is reported
//!   in [`PageLoad::modules_skipped`] and otherwise ignored
//!
//! ## Example
//!
//! ```rust,no_run
//! use meomeokno::host::{PromptAnswer, SimulatedPermissions, SimulatedPlatform};
//! use meomeokno::{LocationResult, Shell, ShellConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let platform = SimulatedPlatform::new(
//!         SimulatedPermissions::prompt(PromptAnswer::Grant),
//!         Some(LocationResult::new(37.5665, 126.9780)),
//!     );
//!     let shell = Shell::new(ShellConfig::from_env(), platform.services()).await?;
//!
//!     let load = shell.open().await?;
//!     println!("Loaded {} ({} scripts)", load.url, load.scripts_executed);
//!
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod error;
pub mod host;
pub mod http;
pub mod js;
pub mod network;

// Re-exports for convenience

// Shell
pub use host::{PageLoad, Shell, ShellConfig, WebSettings, WebView};

// Location bridge
pub use bridge::{
    delivery_script, BridgeConfig, BridgeHandle, LocationBridge, LocationProvider,
    LocationResult, Notifier, PermissionService, PermissionStatus, PlatformServices, PollConfig,
};

// Errors
pub use error::{Error, Result};

// HTTP
pub use http::{HttpClient, HttpClientConfig, Request, Response};

// JavaScript
pub use js::{ConsoleLevel, ConsoleMessage, JsRuntime, JsRuntimeConfig, JsValue};

// Network
pub use network::{
    CorsProxy, InterceptAction, InterceptedRequest, InterceptorChain, ProxiedResponse,
    RequestInterceptor,
};

/// Meomeokno version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

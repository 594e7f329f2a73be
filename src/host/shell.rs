// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Shell wiring: HTTP client, interceptors, page and location bridge

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::config::ShellConfig;
use super::page::{PageLoad, WebView};
use crate::bridge::{BridgeHandle, LocationBridge, PlatformServices, ScriptEvaluator, UiEvent};
use crate::error::Result;
use crate::http::HttpClient;
use crate::network::{CorsProxy, InterceptorChain};

/// The native shell hosting one page
pub struct Shell {
    config: ShellConfig,
    client: HttpClient,
    chain: InterceptorChain,
    page: Arc<WebView>,
    bridge: BridgeHandle,
    ui_loop: JoinHandle<()>,
}

impl Shell {
    /// Build a shell with the default interceptors (the Places CORS proxy)
    pub async fn new(config: ShellConfig, platform: PlatformServices) -> Result<Self> {
        let client = HttpClient::with_config(config.http_config())?;
        let chain = Self::default_interceptors(&client);
        Self::with_parts(config, platform, client, chain).await
    }

    /// Build a shell around an existing client and interceptor chain
    pub async fn with_parts(
        config: ShellConfig,
        platform: PlatformServices,
        client: HttpClient,
        chain: InterceptorChain,
    ) -> Result<Self> {
        let (events, mut receiver) = mpsc::unbounded_channel::<UiEvent>();
        let bridge = BridgeHandle::new(events.clone());

        let page = Arc::new(WebView::new(
            client.clone(),
            chain.clone(),
            &config,
            Some(bridge.clone()),
        )?);
        let evaluator: Arc<dyn ScriptEvaluator> = page.clone();
        let mut location = LocationBridge::new(platform, evaluator, config.bridge.clone(), events);

        // the UI-owning context: every bridge transition runs here, in order
        let ui_loop = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                tracing::trace!(event = ?event, "UI event");
                location.handle(event);
            }
        });

        tracing::info!(
            start_url = %config.start_url,
            interceptors = ?chain.names(),
            "Shell ready"
        );

        Ok(Self {
            config,
            client,
            chain,
            page,
            bridge,
            ui_loop,
        })
    }

    /// Interceptors every shell installs
    pub fn default_interceptors(client: &HttpClient) -> InterceptorChain {
        InterceptorChain::new().with(CorsProxy::new(client.clone()))
    }

    /// Load the configured start page
    pub async fn open(&self) -> Result<PageLoad> {
        self.page.load_url(&self.config.start_url).await
    }

    /// Back press: go back in the page, or report `false` so the caller exits
    pub async fn back_pressed(&self) -> Result<bool> {
        self.page.go_back().await
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn interceptors(&self) -> &InterceptorChain {
        &self.chain
    }

    /// The hosted page
    pub fn page(&self) -> &Arc<WebView> {
        &self.page
    }

    /// Bridge handle, as exposed to the page
    pub fn bridge(&self) -> &BridgeHandle {
        &self.bridge
    }

    /// Stop the UI loop and the page thread
    pub fn shutdown(&self) {
        self.ui_loop.abort();
        self.page.close();
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::platform::{SimulatedPermissions, SimulatedPlatform};

    #[tokio::test]
    async fn test_default_interceptors() {
        let platform = SimulatedPlatform::new(SimulatedPermissions::granted(), None);
        let shell = Shell::new(ShellConfig::default(), platform.services())
            .await
            .unwrap();
        assert_eq!(shell.interceptors().names(), vec!["cors-proxy".to_string()]);
        assert!(!shell.back_pressed().await.unwrap());
    }
}

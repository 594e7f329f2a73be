// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Native location bridge
//!
//! The page calls `requestLocation()` on the bridge object. The call is
//! posted to the UI loop, which checks the permission, fetches the last
//! known fix and injects a script that hands `{lat, lng}` to
//! `window.onNativeLocation`. Failures end in a notice or a log line; the
//! page only ever sees the callback or silence.

mod flow;
mod location;
mod notify;
mod permission;
mod script;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

pub use flow::{Effect, FlowState, LocationFlow};
pub use location::{LocationProvider, LocationResult};
pub use notify::{Notice, NoticeMessages, Notifier};
pub use permission::{
    Permission, PermissionRequest, PermissionResultSender, PermissionService, PermissionStatus,
    LOCATION_PERMISSION_REQUEST_CODE,
};
pub use script::{
    delivery_script, LocationPayload, PollConfig, CALLBACK_MISSING_MESSAGE, CALLBACK_NAME,
};

use crate::error::{Error, Result};

/// Events handled on the UI-owning context
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The page called `requestLocation()`
    LocationRequested,
    /// A permission prompt was answered
    PermissionResult {
        request_code: i32,
        grants: Vec<PermissionStatus>,
    },
    /// A last-known-location fetch completed
    LocationFetched(Option<LocationResult>),
}

/// Something that can run a script inside the hosted page
#[async_trait]
pub trait ScriptEvaluator: Send + Sync {
    /// Evaluate `script` in the page's global context. Fire-and-forget on
    /// the page side: the result value is discarded.
    async fn evaluate_script(&self, script: String) -> Result<()>;
}

/// Platform services the bridge depends on
#[derive(Clone)]
pub struct PlatformServices {
    pub permissions: Arc<dyn PermissionService>,
    pub location: Arc<dyn LocationProvider>,
    pub notifier: Arc<dyn Notifier>,
}

/// Bridge settings
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Request code for the location permission prompt
    pub request_code: i32,
    /// Callback readiness poll
    pub poll: PollConfig,
    /// Notice texts
    pub messages: NoticeMessages,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            request_code: LOCATION_PERMISSION_REQUEST_CODE,
            poll: PollConfig::default(),
            messages: NoticeMessages::default(),
        }
    }
}

/// Handle the page host uses to reach the bridge
#[derive(Debug, Clone)]
pub struct BridgeHandle {
    events: mpsc::UnboundedSender<UiEvent>,
}

impl BridgeHandle {
    pub fn new(events: mpsc::UnboundedSender<UiEvent>) -> Self {
        Self { events }
    }

    /// `requestLocation()` as exposed to the page
    pub fn request_location(&self) -> Result<()> {
        tracing::debug!("Web requested location");
        self.events
            .send(UiEvent::LocationRequested)
            .map_err(|_| Error::ShellClosed)
    }

    /// Forward a permission prompt result from the platform
    pub fn permission_result(&self, request_code: i32, grants: Vec<PermissionStatus>) -> Result<()> {
        self.events
            .send(UiEvent::PermissionResult {
                request_code,
                grants,
            })
            .map_err(|_| Error::ShellClosed)
    }
}

/// Runs the location flow's effects against the platform and the page
pub struct LocationBridge {
    flow: LocationFlow,
    platform: PlatformServices,
    evaluator: Arc<dyn ScriptEvaluator>,
    config: BridgeConfig,
    events: mpsc::UnboundedSender<UiEvent>,
}

impl LocationBridge {
    /// Create a bridge that posts its async completions to `events`
    pub fn new(
        platform: PlatformServices,
        evaluator: Arc<dyn ScriptEvaluator>,
        config: BridgeConfig,
        events: mpsc::UnboundedSender<UiEvent>,
    ) -> Self {
        Self {
            flow: LocationFlow::new(config.request_code),
            platform,
            evaluator,
            config,
            events,
        }
    }

    /// Current flow state
    pub fn state(&self) -> FlowState {
        self.flow.state()
    }

    /// Handle one UI event. Must run inside a tokio runtime: fetches and
    /// deliveries are spawned, never awaited here.
    pub fn handle(&mut self, event: UiEvent) {
        let effect = match event {
            UiEvent::LocationRequested => {
                let fine = self.platform.permissions.check(Permission::FineLocation);
                Some(self.flow.on_location_requested(fine))
            }
            UiEvent::PermissionResult {
                request_code,
                grants,
            } => {
                let effect = self.flow.on_permission_result(request_code, &grants);
                if effect.is_none() {
                    tracing::debug!(request_code, "Ignoring result for foreign permission request");
                }
                effect
            }
            UiEvent::LocationFetched(location) => Some(self.flow.on_location_fetched(location)),
        };

        if let Some(effect) = effect {
            self.apply(effect);
        }
    }

    fn apply(&self, effect: Effect) {
        match effect {
            Effect::RequestPermissions(request) => {
                tracing::info!(
                    request_code = request.request_code,
                    permissions = ?request.permissions,
                    "Requesting location permissions"
                );
                let results =
                    PermissionResultSender::new(request.request_code, self.events.clone());
                self.platform.permissions.request(&request, results);
            }
            Effect::FetchLocation => {
                let provider = self.platform.location.clone();
                let events = self.events.clone();
                tokio::spawn(async move {
                    let location = match provider.last_known_location().await {
                        Ok(location) => location,
                        Err(e) => {
                            tracing::warn!(error = %e, "Last known location lookup failed");
                            None
                        }
                    };
                    if events.send(UiEvent::LocationFetched(location)).is_err() {
                        tracing::debug!("Shell closed before location arrived");
                    }
                });
            }
            Effect::Deliver(location) => {
                tracing::info!(
                    lat = location.latitude,
                    lng = location.longitude,
                    "Location obtained"
                );
                let script = match delivery_script(location, &self.config.poll) {
                    Ok(script) => script,
                    Err(e) => {
                        tracing::error!(error = %e, "Could not build delivery script");
                        return;
                    }
                };
                let evaluator = self.evaluator.clone();
                tokio::spawn(async move {
                    if let Err(e) = evaluator.evaluate_script(script).await {
                        tracing::error!(error = %e, "Location delivery script failed");
                    }
                });
            }
            Effect::Notify(notice) => {
                match notice {
                    Notice::PermissionDenied => tracing::warn!("Location permission denied"),
                    Notice::LocationUnavailable => tracing::warn!("Location is null"),
                }
                self.platform.notifier.show(self.config.messages.text(notice));
            }
        }
    }
}

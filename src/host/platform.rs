// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Simulated platform services
//!
//! Stand-ins for the permission dialog, the location provider and the
//! toast surface, so the shell runs headless and tests can script them.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::bridge::{
    LocationProvider, LocationResult, Notifier, Permission, PermissionRequest,
    PermissionResultSender, PermissionService, PermissionStatus, PlatformServices,
};
use crate::error::Result;

/// How a simulated user answers the permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    Grant,
    Deny,
}

/// Permission service backed by a scripted prompt answer
#[derive(Debug)]
pub struct SimulatedPermissions {
    granted: RwLock<bool>,
    answer: PromptAnswer,
    requests: Mutex<Vec<PermissionRequest>>,
}

impl SimulatedPermissions {
    /// Location permission already held
    pub fn granted() -> Self {
        Self::new(true, PromptAnswer::Grant)
    }

    /// Not held; the prompt resolves with `answer`
    pub fn prompt(answer: PromptAnswer) -> Self {
        Self::new(false, answer)
    }

    fn new(granted: bool, answer: PromptAnswer) -> Self {
        Self {
            granted: RwLock::new(granted),
            answer,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Prompts shown so far
    pub fn requests(&self) -> Vec<PermissionRequest> {
        self.requests.lock().clone()
    }
}

impl PermissionService for SimulatedPermissions {
    fn check(&self, permission: Permission) -> PermissionStatus {
        match permission {
            Permission::FineLocation | Permission::CoarseLocation if *self.granted.read() => {
                PermissionStatus::Granted
            }
            _ => PermissionStatus::Denied,
        }
    }

    fn request(&self, request: &PermissionRequest, results: PermissionResultSender) {
        self.requests.lock().push(request.clone());

        let status = match self.answer {
            PromptAnswer::Grant => {
                *self.granted.write() = true;
                PermissionStatus::Granted
            }
            PromptAnswer::Deny => PermissionStatus::Denied,
        };
        tracing::debug!(answer = ?self.answer, "Simulated permission prompt answered");

        let grants = vec![status; request.permissions.len()];
        if let Err(e) = results.send(grants) {
            tracing::debug!(error = %e, "Permission result dropped");
        }
    }
}

/// Location provider returning a fixed last-known fix
#[derive(Debug, Default)]
pub struct FixedLocation {
    fix: RwLock<Option<LocationResult>>,
}

impl FixedLocation {
    pub fn new(fix: Option<LocationResult>) -> Self {
        Self {
            fix: RwLock::new(fix),
        }
    }

    /// Replace the cached fix
    pub fn set(&self, fix: Option<LocationResult>) {
        *self.fix.write() = fix;
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn last_known_location(&self) -> Result<Option<LocationResult>> {
        Ok(*self.fix.read())
    }
}

/// Notifier that logs notices and keeps them for inspection
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices shown so far
    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, message: &str) {
        tracing::info!(notice = %message, "Toast");
        self.shown.lock().push(message.to_string());
    }
}

/// A complete simulated platform, keeping typed handles for inspection
#[derive(Clone)]
pub struct SimulatedPlatform {
    pub permissions: Arc<SimulatedPermissions>,
    pub location: Arc<FixedLocation>,
    pub notifier: Arc<RecordingNotifier>,
}

impl SimulatedPlatform {
    pub fn new(permissions: SimulatedPermissions, fix: Option<LocationResult>) -> Self {
        Self {
            permissions: Arc::new(permissions),
            location: Arc::new(FixedLocation::new(fix)),
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    /// Services as seen by the bridge
    pub fn services(&self) -> PlatformServices {
        PlatformServices {
            permissions: self.permissions.clone(),
            location: self.location.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

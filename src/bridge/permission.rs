// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Location permissions

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::UiEvent;
use crate::error::{Error, Result};

/// Request code used for the location permission prompt
pub const LOCATION_PERMISSION_REQUEST_CODE: i32 = 1000;

/// Permissions the shell asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    FineLocation,
    CoarseLocation,
}

impl Permission {
    /// Platform name of the permission
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
            Permission::CoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grant state of one permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// A prompt for a set of permissions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
    pub request_code: i32,
    pub permissions: Vec<Permission>,
}

impl PermissionRequest {
    /// Fine + coarse location, in that order
    pub fn location(request_code: i32) -> Self {
        Self {
            request_code,
            permissions: vec![Permission::FineLocation, Permission::CoarseLocation],
        }
    }
}

/// Return path for a permission prompt's outcome
///
/// Results are posted to the UI loop as an event; the flow picks them up
/// there, not inside the prompt.
#[derive(Debug, Clone)]
pub struct PermissionResultSender {
    request_code: i32,
    events: mpsc::UnboundedSender<UiEvent>,
}

impl PermissionResultSender {
    pub(crate) fn new(request_code: i32, events: mpsc::UnboundedSender<UiEvent>) -> Self {
        Self {
            request_code,
            events,
        }
    }

    /// Request code of the prompt this answers
    pub fn request_code(&self) -> i32 {
        self.request_code
    }

    /// Deliver one status per requested permission, in request order
    pub fn send(self, grants: Vec<PermissionStatus>) -> Result<()> {
        self.events
            .send(UiEvent::PermissionResult {
                request_code: self.request_code,
                grants,
            })
            .map_err(|_| Error::ShellClosed)
    }
}

/// Platform permission checks and prompts
pub trait PermissionService: Send + Sync {
    /// Current grant state, without prompting
    fn check(&self, permission: Permission) -> PermissionStatus;

    /// Show the prompt; the outcome goes through `results` whenever the user answers
    fn request(&self, request: &PermissionRequest, results: PermissionResultSender);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_request() {
        let req = PermissionRequest::location(LOCATION_PERMISSION_REQUEST_CODE);
        assert_eq!(req.request_code, 1000);
        assert_eq!(
            req.permissions,
            vec![Permission::FineLocation, Permission::CoarseLocation]
        );
    }

    #[tokio::test]
    async fn test_result_sender_posts_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sender = PermissionResultSender::new(1000, tx);
        sender.send(vec![PermissionStatus::Granted]).unwrap();

        match rx.recv().await {
            Some(UiEvent::PermissionResult {
                request_code,
                grants,
            }) => {
                assert_eq!(request_code, 1000);
                assert_eq!(grants, vec![PermissionStatus::Granted]);
            }
            other => panic!("Expected PermissionResult, got {:?}", other),
        }
    }

    #[test]
    fn test_send_after_shutdown() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let err = PermissionResultSender::new(1000, tx)
            .send(vec![PermissionStatus::Denied])
            .unwrap_err();
        assert!(err.is_closed());
    }
}

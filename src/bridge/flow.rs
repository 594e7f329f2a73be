// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Permission → fetch → deliver state machine
//!
//! Pure transitions. Each input returns the effect the UI loop should carry
//! out, so the resume-on-grant path can be driven without a platform.

use super::location::LocationResult;
use super::notify::Notice;
use super::permission::{PermissionRequest, PermissionStatus};

/// Where the location flow currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Nothing pending
    Idle,
    /// A permission prompt is showing; resumes on its result
    AwaitingPermission,
    /// Permission held, a location fetch is under way
    Ready,
}

/// Work the UI loop performs after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show the permission prompt
    RequestPermissions(PermissionRequest),
    /// Start a one-shot last-known-location fetch
    FetchLocation,
    /// Inject the delivery script for this fix
    Deliver(LocationResult),
    /// Show a transient notice
    Notify(Notice),
}

/// Location flow for one bridge
#[derive(Debug, Clone)]
pub struct LocationFlow {
    state: FlowState,
    request_code: i32,
}

impl LocationFlow {
    /// Create a flow that tags its prompts with `request_code`
    pub fn new(request_code: i32) -> Self {
        Self {
            state: FlowState::Idle,
            request_code,
        }
    }

    /// Current state
    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Request code of this flow's permission prompts
    pub fn request_code(&self) -> i32 {
        self.request_code
    }

    /// The page called `requestLocation()`; `fine` is the current fine-location grant
    pub fn on_location_requested(&mut self, fine: PermissionStatus) -> Effect {
        if fine.is_granted() {
            self.state = FlowState::Ready;
            Effect::FetchLocation
        } else {
            self.state = FlowState::AwaitingPermission;
            Effect::RequestPermissions(PermissionRequest::location(self.request_code))
        }
    }

    /// The permission prompt was answered
    ///
    /// Only the first status (fine location) decides. Results for other
    /// request codes are not ours and yield no effect.
    pub fn on_permission_result(
        &mut self,
        request_code: i32,
        grants: &[PermissionStatus],
    ) -> Option<Effect> {
        if request_code != self.request_code {
            return None;
        }

        if grants.first().map(|g| g.is_granted()).unwrap_or(false) {
            self.state = FlowState::Ready;
            Some(Effect::FetchLocation)
        } else {
            self.state = FlowState::Idle;
            Some(Effect::Notify(Notice::PermissionDenied))
        }
    }

    /// A location fetch completed
    pub fn on_location_fetched(&mut self, location: Option<LocationResult>) -> Effect {
        self.state = FlowState::Idle;
        match location.filter(LocationResult::is_valid) {
            Some(location) => Effect::Deliver(location),
            None => Effect::Notify(Notice::LocationUnavailable),
        }
    }
}

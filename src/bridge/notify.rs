// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Short user-visible notices (toasts)

/// Notices the bridge can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The user refused the location prompt
    PermissionDenied,
    /// No cached fix was available
    LocationUnavailable,
}

/// Texts shown for each notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeMessages {
    pub permission_denied: String,
    pub location_unavailable: String,
}

impl Default for NoticeMessages {
    fn default() -> Self {
        Self {
            permission_denied: "위치 권한이 거부되었습니다.".to_string(),
            location_unavailable: "위치 정보를 가져올 수 없습니다.".to_string(),
        }
    }
}

impl NoticeMessages {
    /// Text for a notice
    pub fn text(&self, notice: Notice) -> &str {
        match notice {
            Notice::PermissionDenied => &self.permission_denied,
            Notice::LocationUnavailable => &self.location_unavailable,
        }
    }
}

/// Shows transient notices to the user
pub trait Notifier: Send + Sync {
    fn show(&self, message: &str);
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Device location as the bridge sees it

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single location fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationResult {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl LocationResult {
    /// Creates a new location
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true if both coordinates are finite. Anything else cannot be
    /// handed to the page as JSON.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Returns true if the fix lies within WGS84 bounds
    pub fn in_range(&self) -> bool {
        self.is_valid()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Source of the device's last known location
///
/// A single best-effort lookup, not a subscription. `Ok(None)` means the
/// platform has no cached fix.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn last_known_location(&self) -> Result<Option<LocationResult>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_location() {
        assert!(LocationResult::new(37.5, 127.0).is_valid());
        assert!(LocationResult::new(-90.0, 180.0).is_valid());
    }

    #[test]
    fn test_invalid_location() {
        assert!(!LocationResult::new(f64::NAN, 127.0).is_valid());
        assert!(!LocationResult::new(37.5, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_out_of_range_is_still_valid() {
        let location = LocationResult::new(91.0, 0.0);
        assert!(location.is_valid());
        assert!(!location.in_range());
        assert!(LocationResult::new(-90.0, 180.0).in_range());
    }
}

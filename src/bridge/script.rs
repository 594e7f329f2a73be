// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Location delivery script
//!
//! The page registers `onNativeLocation` on its own schedule, which is not
//! ordered with the native permission and location latency. The script
//! polls for the callback a bounded number of times and hands over the
//! payload on first sighting.

use std::time::Duration;

use serde::Serialize;

use super::location::LocationResult;
use crate::error::Result;

/// Global the page must define to receive locations
pub const CALLBACK_NAME: &str = "onNativeLocation";

/// Logged through `console.error` when the callback never shows up
pub const CALLBACK_MISSING_MESSAGE: &str = "window.onNativeLocation is still not defined";

/// Readiness poll settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Spacing between checks
    pub interval: Duration,
    /// Checks before giving up; the first runs immediately
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_attempts: 5,
        }
    }
}

impl PollConfig {
    /// Time between the first and the last check
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// Payload handed to the page callback
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationPayload {
    pub lat: f64,
    pub lng: f64,
}

impl From<LocationResult> for LocationPayload {
    fn from(location: LocationResult) -> Self {
        Self {
            lat: location.latitude,
            lng: location.longitude,
        }
    }
}

/// Build the script that delivers `location` to `window.onNativeLocation`.
///
/// Polling stops before the callback is invoked, so the page sees at most
/// one call even if its handler throws.
pub fn delivery_script(location: LocationResult, poll: &PollConfig) -> Result<String> {
    let payload = serde_json::to_string(&LocationPayload::from(location))?;
    let interval_ms = poll.interval.as_millis().max(1);
    let max_attempts = poll.max_attempts.max(1);

    Ok(format!(
        r#"(function () {{
    var attempts = 0;
    var timer = null;
    var payload = {payload};
    function stop() {{
        if (timer !== null) {{
            clearInterval(timer);
            timer = null;
        }}
    }}
    function attempt() {{
        attempts++;
        if (typeof window.{callback} === 'function') {{
            stop();
            window.{callback}(payload);
            return true;
        }}
        if (attempts >= {max_attempts}) {{
            stop();
            console.error('{missing}');
            return true;
        }}
        return false;
    }}
    if (!attempt()) {{
        timer = setInterval(attempt, {interval_ms});
    }}
}})();"#,
        payload = payload,
        callback = CALLBACK_NAME,
        max_attempts = max_attempts,
        missing = CALLBACK_MISSING_MESSAGE,
        interval_ms = interval_ms,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::js::{ConsoleLevel, JsRuntime, JsValue};

    const RECORDER: &str = "window.received = [];";
    const REGISTER: &str =
        "window.onNativeLocation = function (p) { window.received.push(p.lat + ',' + p.lng); };";

    fn runtime_with_delivery(location: LocationResult) -> JsRuntime {
        let mut runtime = JsRuntime::default_runtime().unwrap();
        runtime.execute(RECORDER).unwrap();
        let script = delivery_script(location, &PollConfig::default()).unwrap();
        runtime.execute(&script).unwrap();
        runtime
    }

    fn received(runtime: &mut JsRuntime) -> String {
        runtime
            .execute("window.received.join('|')")
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_default_budget() {
        assert_eq!(PollConfig::default().budget(), Duration::from_secs(2));
    }

    #[test]
    fn test_payload_serialization() {
        let script = delivery_script(LocationResult::new(37.5, 127.0), &PollConfig::default())
            .unwrap();
        assert!(script.contains(r#"{"lat":37.5,"lng":127.0}"#));
        assert!(script.contains("setInterval(attempt, 500)"));
    }

    #[test]
    fn test_callback_already_defined() {
        let mut runtime = JsRuntime::default_runtime().unwrap();
        runtime.execute(RECORDER).unwrap();
        runtime.execute(REGISTER).unwrap();

        let script =
            delivery_script(LocationResult::new(37.5, 127.0), &PollConfig::default()).unwrap();
        runtime.execute(&script).unwrap();

        assert_eq!(received(&mut runtime), "37.5,127");
        assert!(!runtime.has_pending_timers());
    }

    #[test]
    fn test_callback_defined_late_is_called_once() {
        let mut runtime = runtime_with_delivery(LocationResult::new(37.5, 127.0));
        runtime.advance(700);
        assert_eq!(received(&mut runtime), "");

        runtime.execute(REGISTER).unwrap();
        runtime.advance(5_000);

        assert_eq!(received(&mut runtime), "37.5,127");
        assert!(runtime.take_console().is_empty());
    }

    #[test]
    fn test_last_attempt_at_two_seconds() {
        let mut runtime = runtime_with_delivery(LocationResult::new(1.0, 2.0));
        runtime.advance(1_999);
        runtime.execute(REGISTER).unwrap();
        runtime.advance(1);

        assert_eq!(received(&mut runtime), "1,2");
    }

    #[test]
    fn test_callback_never_defined() {
        let mut runtime = runtime_with_delivery(LocationResult::new(37.5, 127.0));
        runtime.advance(2_000);

        let console = runtime.take_console();
        assert_eq!(console.len(), 1);
        assert_eq!(console[0].level, ConsoleLevel::Error);
        assert_eq!(console[0].message, CALLBACK_MISSING_MESSAGE);
        assert!(!runtime.has_pending_timers());

        // defining it afterwards changes nothing
        runtime.execute(REGISTER).unwrap();
        runtime.advance(10_000);
        assert_eq!(received(&mut runtime), "");
    }

    #[test]
    fn test_throwing_callback_is_not_retried() {
        let mut runtime = JsRuntime::default_runtime().unwrap();
        runtime
            .execute(
                "window.calls = 0; window.onNativeLocation = function () { \
                 window.calls++; throw new Error('page bug'); };",
            )
            .unwrap();

        let script =
            delivery_script(LocationResult::new(37.5, 127.0), &PollConfig::default()).unwrap();
        assert!(runtime.execute(&script).is_err());
        runtime.advance(5_000);

        assert_eq!(runtime.execute("window.calls").unwrap(), JsValue::Number(1.0));
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! JavaScript runtime implementation using boa_engine
//!
//! One runtime per loaded document. The context persists across
//! evaluations so page scripts, injected scripts and timer callbacks all see
//! the same globals. Console output, bridge calls and timer bookkeeping are
//! queued on the JS side and drained into Rust after every evaluation.

use std::collections::BTreeMap;
use std::time::Duration;

use boa_engine::{Context, JsValue as BoaJsValue, Source};
use serde::{Deserialize, Serialize};

use super::timers::{JsIdleResult, TimerQueue};
use super::value::JsValue;
use crate::error::{Error, Result};

/// Largest delay a script may request, as browsers clamp it
const MAX_TIMER_DELAY_MS: u64 = i32::MAX as u64;

/// Page globals installed before any page script runs.
///
/// Called with a JSON config object: `{url, userAgent, bridgeName, domStorage}`.
const PRELUDE: &str = r#"
(function (cfg) {
    var g = globalThis;
    g.window = g;
    g.self = g;
    g.__consoleQueue = [];
    g.__bridgeQueue = [];
    g.__timerOps = [];
    g.__fetchQueue = [];
    g.__currentSource = '';

    function describe(v) {
        if (typeof v === 'string') return v;
        if (v !== null && typeof v === 'object') {
            try { return JSON.stringify(v); } catch (e) { return String(v); }
        }
        return String(v);
    }

    function logger(level) {
        return function () {
            var parts = [];
            for (var i = 0; i < arguments.length; i++) parts.push(describe(arguments[i]));
            g.__consoleQueue.push({ level: level, message: parts.join(' '), source: g.__currentSource });
        };
    }

    g.console = {
        log: logger('log'),
        info: logger('info'),
        warn: logger('warn'),
        error: logger('error'),
        debug: logger('debug')
    };

    var timerSeq = 0;
    var timerFns = {};

    function schedule(fn, ms, repeat, extra) {
        var id = ++timerSeq;
        var callback = typeof fn === 'function' ? fn : Function(String(fn));
        var delay = Number(ms);
        if (!(delay > 0)) delay = 0;
        delay = Math.min(Math.floor(delay), cfg.maxDelay);
        timerFns[id] = { fn: callback, args: extra, repeat: repeat };
        g.__timerOps.push({ op: 'add', id: id, delay: delay, repeat: repeat });
        return id;
    }

    g.setTimeout = function (fn, ms) {
        return schedule(fn, ms, false, Array.prototype.slice.call(arguments, 2));
    };
    g.setInterval = function (fn, ms) {
        return schedule(fn, ms, true, Array.prototype.slice.call(arguments, 2));
    };
    g.clearTimeout = function (id) {
        if (timerFns[id] !== undefined) {
            delete timerFns[id];
            g.__timerOps.push({ op: 'clear', id: id });
        }
    };
    g.clearInterval = g.clearTimeout;

    g.__fireTimer = function (id) {
        var t = timerFns[id];
        if (t === undefined) return;
        if (!t.repeat) delete timerFns[id];
        t.fn.apply(g, t.args);
    };

    g.__drain = function (name) {
        var q = g[name];
        g[name] = [];
        return JSON.stringify(q);
    };

    g.navigator = { userAgent: cfg.userAgent, language: 'ko-KR', platform: 'Linux armv8l' };
    g.location = { href: cfg.url };

    if (cfg.domStorage) {
        var store = {};
        g.localStorage = {
            getItem: function (k) { return Object.prototype.hasOwnProperty.call(store, k) ? store[k] : null; },
            setItem: function (k, v) { store[k] = String(v); },
            removeItem: function (k) { delete store[k]; },
            clear: function () { store = {}; }
        };
        g.sessionStorage = g.localStorage;
    }

    var fetchSeq = 0;
    var fetchPending = {};

    function makeResponse(r) {
        var headers = {};
        for (var k in r.headers) headers[k.toLowerCase()] = r.headers[k];
        return {
            ok: r.status >= 200 && r.status < 300,
            status: r.status,
            statusText: r.statusText,
            url: r.url,
            headers: {
                get: function (n) {
                    var v = headers[String(n).toLowerCase()];
                    return v === undefined ? null : v;
                }
            },
            text: function () { return Promise.resolve(r.body); },
            json: function () {
                return new Promise(function (resolve) { resolve(JSON.parse(r.body)); });
            }
        };
    }

    g.fetch = function (input, init) {
        var method = (init && init.method) ? String(init.method).toUpperCase() : 'GET';
        return new Promise(function (resolve, reject) {
            var id = ++fetchSeq;
            fetchPending[id] = { resolve: resolve, reject: reject };
            g.__fetchQueue.push({ id: id, url: String(input), method: method });
        });
    };

    g.__settleFetch = function (id, ok, payload) {
        var p = fetchPending[id];
        if (p === undefined) return;
        delete fetchPending[id];
        if (ok) p.resolve(makeResponse(payload));
        else p.reject(new TypeError(payload));
    };

    g[cfg.bridgeName] = {
        requestLocation: function () {
            g.__bridgeQueue.push({ method: 'requestLocation', args: [] });
        }
    };
})
"#;

/// JavaScript runtime configuration
#[derive(Debug, Clone)]
pub struct JsRuntimeConfig {
    /// Document URL exposed as `location.href`
    pub url: String,
    /// `navigator.userAgent`
    pub user_agent: String,
    /// Global name of the native bridge object
    pub bridge_name: String,
    /// Install `localStorage`/`sessionStorage`
    pub dom_storage: bool,
    /// Cap on timer callbacks per [`JsRuntime::advance`] call
    pub max_timer_executions: usize,
}

impl Default for JsRuntimeConfig {
    fn default() -> Self {
        Self {
            url: "about:blank".to_string(),
            user_agent: crate::http::DEFAULT_USER_AGENT.to_string(),
            bridge_name: "Android".to_string(),
            dom_storage: true,
            max_timer_executions: 1000,
        }
    }
}

/// Console message captured from the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleMessage {
    pub level: ConsoleLevel,
    pub message: String,
    /// Label of the script that was running when the message was logged
    #[serde(default)]
    pub source: String,
}

/// Console log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    Log,
    Info,
    Warn,
    Error,
    Debug,
}

/// A call the page made on the native bridge object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeCall {
    pub method: String,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

/// A `fetch()` the page started and is waiting on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub id: u32,
    /// As passed by the page, possibly relative
    pub url: String,
    pub method: String,
}

/// Response handed back to a pending page `fetch()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Timer bookkeeping posted by the prelude
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum TimerOp {
    Add { id: u32, delay: u64, repeat: bool },
    Clear { id: u32 },
}

/// JavaScript runtime for one document
pub struct JsRuntime {
    config: JsRuntimeConfig,
    context: Context,
    timers: TimerQueue,
    console_output: Vec<ConsoleMessage>,
    bridge_calls: Vec<BridgeCall>,
    fetches: Vec<FetchRequest>,
}

impl JsRuntime {
    /// Create a runtime and install the page globals
    pub fn new(config: JsRuntimeConfig) -> Result<Self> {
        let mut runtime = Self {
            context: Context::default(),
            timers: TimerQueue::new(),
            console_output: Vec::new(),
            bridge_calls: Vec::new(),
            fetches: Vec::new(),
            config,
        };

        let prelude_config = serde_json::json!({
            "url": runtime.config.url,
            "userAgent": runtime.config.user_agent,
            "bridgeName": runtime.config.bridge_name,
            "domStorage": runtime.config.dom_storage,
            "maxDelay": MAX_TIMER_DELAY_MS,
        });
        let install = format!("{}({});", PRELUDE.trim(), prelude_config);
        runtime
            .context
            .eval(Source::from_bytes(install.as_str()))
            .map_err(|e| Error::js_in(e.to_string(), "prelude"))?;

        Ok(runtime)
    }

    /// Create a runtime with default config
    pub fn default_runtime() -> Result<Self> {
        Self::new(JsRuntimeConfig::default())
    }

    /// Runtime configuration
    pub fn config(&self) -> &JsRuntimeConfig {
        &self.config
    }

    /// Execute JavaScript code
    pub fn execute(&mut self, code: &str) -> Result<JsValue> {
        self.execute_labeled(code, "anonymous")
    }

    /// Execute JavaScript code, tagging console output with `label`
    pub fn execute_labeled(&mut self, code: &str, label: &str) -> Result<JsValue> {
        self.set_current_source(label);
        let result = self.context.eval(Source::from_bytes(code));
        self.context.run_jobs();
        // scripts that throw halfway may still have scheduled timers
        self.sync();

        match result {
            Ok(value) => Ok(Self::convert_value(&value)),
            Err(e) => Err(Error::js_in(e.to_string(), label)),
        }
    }

    /// Run every timer due within the next `ms` milliseconds of virtual time
    pub fn advance(&mut self, ms: u64) -> JsIdleResult {
        let until = self.timers.now_ms().saturating_add(ms);
        self.advance_to(until)
    }

    /// Run every timer due up to virtual time `until_ms`
    pub fn advance_to(&mut self, until_ms: u64) -> JsIdleResult {
        let mut result = JsIdleResult::default();

        loop {
            if result.timers_executed >= self.config.max_timer_executions {
                result.hit_limit = self.timers.has_due(until_ms);
                break;
            }
            let Some(entry) = self.timers.pop_due(until_ms) else {
                break;
            };
            result.timers_executed += 1;
            self.fire_timer(entry.id);
        }

        if !result.hit_limit {
            self.timers.advance_to(until_ms);
        }
        result.now_ms = self.timers.now_ms();
        result
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    /// Time until the next pending timer fires
    pub fn time_until_next_timer(&self) -> Option<Duration> {
        self.timers.time_until_next()
    }

    /// Check if the page has pending timers
    pub fn has_pending_timers(&self) -> bool {
        self.timers.has_pending()
    }

    /// Get console output captured so far
    pub fn console_output(&self) -> &[ConsoleMessage] {
        &self.console_output
    }

    /// Take and clear the captured console output
    pub fn take_console(&mut self) -> Vec<ConsoleMessage> {
        std::mem::take(&mut self.console_output)
    }

    /// Take and clear the bridge calls made by the page
    pub fn take_bridge_calls(&mut self) -> Vec<BridgeCall> {
        std::mem::take(&mut self.bridge_calls)
    }

    /// Take and clear the `fetch()` calls the page started
    pub fn take_fetch_requests(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.fetches)
    }

    /// Settle a pending page `fetch()`; an `Err` rejects it with a `TypeError`
    pub fn settle_fetch(
        &mut self,
        id: u32,
        outcome: std::result::Result<FetchResponse, String>,
    ) -> Result<()> {
        let (ok, payload) = match outcome {
            Ok(response) => (true, serde_json::to_value(response)?),
            Err(message) => (false, serde_json::Value::String(message)),
        };
        self.set_current_source("fetch");
        let code = format!("__settleFetch({}, {}, {});", id, ok, payload);
        let result = self.context.eval(Source::from_bytes(code.as_str()));
        self.context.run_jobs();
        self.sync();
        result
            .map(|_| ())
            .map_err(|e| Error::js_in(e.to_string(), "fetch"))
    }

    fn fire_timer(&mut self, id: u32) {
        self.set_current_source("timer");
        let code = format!("__fireTimer({});", id);
        let result = self.context.eval(Source::from_bytes(code.as_str()));
        self.context.run_jobs();
        if let Err(e) = result {
            // uncaught errors in callbacks surface like they do in a browser
            self.console_output.push(ConsoleMessage {
                level: ConsoleLevel::Error,
                message: format!("Uncaught {}", e),
                source: "timer".to_string(),
            });
        }
        self.sync();
    }

    fn set_current_source(&mut self, label: &str) {
        let code = format!(
            "globalThis.__currentSource = {};",
            serde_json::Value::String(label.to_string())
        );
        let _ = self.context.eval(Source::from_bytes(code.as_str()));
    }

    /// Pull queued console messages, bridge calls and timer ops out of the page
    fn sync(&mut self) {
        for op in self.drain::<TimerOp>("__timerOps") {
            match op {
                TimerOp::Add { id, delay, repeat } => {
                    let delay = delay.min(MAX_TIMER_DELAY_MS);
                    if repeat {
                        self.timers.set_interval(id, delay);
                    } else {
                        self.timers.set_timeout(id, delay);
                    }
                }
                TimerOp::Clear { id } => self.timers.clear_timer(id),
            }
        }

        let console = self.drain::<ConsoleMessage>("__consoleQueue");
        self.console_output.extend(console);

        let calls = self.drain::<BridgeCall>("__bridgeQueue");
        self.bridge_calls.extend(calls);

        let fetches = self.drain::<FetchRequest>("__fetchQueue");
        self.fetches.extend(fetches);
    }

    fn drain<T: serde::de::DeserializeOwned>(&mut self, queue: &str) -> Vec<T> {
        let code = format!("__drain('{}')", queue);
        let raw = match self.context.eval(Source::from_bytes(code.as_str())) {
            Ok(value) => value
                .as_string()
                .map(|s| s.to_std_string_escaped())
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!(queue, error = %e, "Page queue could not be drained");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(queue, error = %e, "Page queue held malformed entries");
                Vec::new()
            }
        }
    }

    /// Convert boa JsValue to our JsValue
    fn convert_value(value: &BoaJsValue) -> JsValue {
        if value.is_undefined() {
            JsValue::Undefined
        } else if value.is_null() {
            JsValue::Null
        } else if let Some(b) = value.as_boolean() {
            JsValue::Boolean(b)
        } else if let Some(n) = value.as_number() {
            JsValue::Number(n)
        } else if let Some(s) = value.as_string() {
            JsValue::String(s.to_std_string_escaped())
        } else if value.is_callable() {
            JsValue::Function
        } else if value.is_object() {
            JsValue::Object
        } else {
            JsValue::Undefined
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_execution() {
        let mut runtime = JsRuntime::default_runtime().unwrap();
        let result = runtime.execute("1 + 2").unwrap();
        assert_eq!(result, JsValue::Number(3.0));
    }

    #[test]
    fn test_globals_persist_between_evaluations() {
        let mut runtime = JsRuntime::default_runtime().unwrap();
        runtime.execute("window.counter = 41;").unwrap();
        let result = runtime.execute("counter + 1").unwrap();
        assert_eq!(result, JsValue::Number(42.0));
    }

    #[test]
    fn test_console_capture() {
        let mut runtime = JsRuntime::default_runtime().unwrap();
        runtime
            .execute_labeled("console.log('test message', {a: 1})", "inline#0")
            .unwrap();
        let output = runtime.take_console();
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].level, ConsoleLevel::Log);
        assert_eq!(output[0].message, "test message {\"a\":1}");
        assert_eq!(output[0].source, "inline#0");
        assert!(runtime.console_output().is_empty());
    }

    #[test]
    fn test_script_error_is_reported() {
        let mut runtime = JsRuntime::default_runtime().unwrap();
        let err = runtime.execute("undefinedFunction()").unwrap_err();
        assert!(matches!(err, Error::JavaScript { .. }));
    }

    #[test]
    fn test_set_timeout_runs_on_virtual_clock() {
        let mut runtime = JsRuntime::default_runtime().unwrap();
        runtime
            .execute("var fired = 0; setTimeout(function () { fired++; }, 300);")
            .unwrap();

        runtime.advance(299);
        assert_eq!(runtime.execute("fired").unwrap(), JsValue::Number(0.0));

        let result = runtime.advance(1);
        assert_eq!(result.timers_executed, 1);
        assert_eq!(result.now_ms, 300);
        assert_eq!(runtime.execute("fired").unwrap(), JsValue::Number(1.0));
        assert!(!runtime.has_pending_timers());
    }

    #[test]
    fn test_clear_interval_from_callback() {
        let mut runtime = JsRuntime::default_runtime().unwrap();
        runtime
            .execute(
                "var ticks = 0; var h = setInterval(function () { \
                 ticks++; if (ticks === 3) clearInterval(h); }, 100);",
            )
            .unwrap();

        runtime.advance(1_000);
        assert_eq!(runtime.execute("ticks").unwrap(), JsValue::Number(3.0));
        assert!(!runtime.has_pending_timers());
    }

    #[test]
    fn test_timer_exception_is_logged() {
        let mut runtime = JsRuntime::default_runtime().unwrap();
        runtime
            .execute("setTimeout(function () { throw new Error('late'); }, 10);")
            .unwrap();
        runtime.advance(10);

        let output = runtime.take_console();
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].level, ConsoleLevel::Error);
        assert!(output[0].message.contains("late"));
    }

    #[test]
    fn test_bridge_object_records_calls() {
        let mut runtime = JsRuntime::default_runtime().unwrap();
        runtime.execute("Android.requestLocation();").unwrap();
        runtime.execute("window.Android.requestLocation();").unwrap();

        let calls = runtime.take_bridge_calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.method == "requestLocation"));
        assert!(runtime.take_bridge_calls().is_empty());
    }

    #[test]
    fn test_fetch_round_trip() {
        let mut runtime = JsRuntime::default_runtime().unwrap();
        runtime
            .execute(
                "window.result = null; \
                 fetch('/api/place', { method: 'post' }) \
                   .then(function (r) { window.cors = r.headers.get('Access-Control-Allow-Origin'); return r.json(); }) \
                   .then(function (j) { window.result = j.status; });",
            )
            .unwrap();

        let requests = runtime.take_fetch_requests();
        assert_eq!(
            requests,
            vec![FetchRequest {
                id: 1,
                url: "/api/place".to_string(),
                method: "POST".to_string(),
            }]
        );

        let mut headers = BTreeMap::new();
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        runtime
            .settle_fetch(
                1,
                Ok(FetchResponse {
                    url: "https://example.com/api/place".to_string(),
                    status: 200,
                    status_text: "OK".to_string(),
                    headers,
                    body: r#"{"status":"OK"}"#.to_string(),
                }),
            )
            .unwrap();

        assert_eq!(
            runtime.execute("window.result + ' ' + window.cors").unwrap(),
            JsValue::String("OK *".to_string())
        );
    }

    #[test]
    fn test_fetch_rejection() {
        let mut runtime = JsRuntime::default_runtime().unwrap();
        runtime
            .execute(
                "window.failure = ''; \
                 fetch('https://example.com/').catch(function (e) { window.failure = e.message; });",
            )
            .unwrap();
        let id = runtime.take_fetch_requests()[0].id;
        runtime
            .settle_fetch(id, Err("Failed to fetch".to_string()))
            .unwrap();

        assert_eq!(
            runtime.execute("window.failure").unwrap(),
            JsValue::String("Failed to fetch".to_string())
        );
    }

    #[test]
    fn test_custom_bridge_name_and_storage() {
        let mut runtime = JsRuntime::new(JsRuntimeConfig {
            bridge_name: "Native".to_string(),
            dom_storage: false,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            runtime.execute("typeof Native.requestLocation").unwrap(),
            JsValue::String("function".to_string())
        );
        assert_eq!(
            runtime.execute("typeof localStorage").unwrap(),
            JsValue::String("undefined".to_string())
        );
    }
}

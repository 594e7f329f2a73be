// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Hosted page
//!
//! The page's JavaScript context is `!Send`, so it lives on a dedicated
//! thread. [`WebView`] is the thread-safe handle: navigation fetches the
//! document and its scripts on the caller's task (through the interceptor
//! chain), then hands them to the page thread to run. The page thread also
//! drives the page's timers against wall time, forwards console output to
//! the log, relays bridge calls to the location bridge and runs the page's
//! own `fetch()` calls through the same interceptor chain on the tokio
//! runtime the view was created on.

use std::collections::{BTreeMap, VecDeque};
use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use reqwest::StatusCode;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use url::Url;

use super::config::{ShellConfig, WebSettings};
use super::scripts::{discover_scripts, PageScript, ScriptRef};
use crate::bridge::{BridgeHandle, ScriptEvaluator};
use crate::error::{Error, Result};
use crate::http::{headers, HttpClient, Request, Response};
use crate::js::{
    BridgeCall, ConsoleLevel, ConsoleMessage, FetchRequest, FetchResponse, JsRuntime,
    JsRuntimeConfig, JsValue,
};
use crate::network::{InterceptAction, InterceptedRequest, InterceptorChain, ProxiedResponse};

/// Log target page console output is forwarded to
pub const CONSOLE_TARGET: &str = "webview_console";

/// Console messages kept per document for [`WebView::console_messages`]
pub const CONSOLE_BUFFER: usize = 500;

/// A fetched resource, whichever path served it
#[derive(Debug, Clone)]
pub struct Resource {
    pub url: String,
    pub status_code: u16,
    pub status_text: String,
    pub content_type: String,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
    /// Served by an interceptor rather than the default loader
    pub intercepted: bool,
}

impl Resource {
    fn from_proxied(url: &str, response: ProxiedResponse) -> Self {
        let mut response_headers = response.headers;
        response_headers.insert(
            headers::CONTENT_TYPE.to_string(),
            format!("{}; charset={}", response.content_type, response.encoding),
        );
        Self {
            url: url.to_string(),
            status_code: response.status_code,
            status_text: response.status_message,
            content_type: response.content_type,
            headers: response_headers,
            body: response.body,
            intercepted: true,
        }
    }

    fn from_response(response: Response) -> Self {
        let headers = response
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        Self {
            url: response.url.to_string(),
            status_code: response.status_code(),
            status_text: response.status_message().to_string(),
            content_type: response.content_type().unwrap_or_default().to_string(),
            headers,
            body: response.body,
            intercepted: false,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn is_html(&self) -> bool {
        self.content_type.to_ascii_lowercase().contains("text/html")
    }

    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    fn into_fetch_response(self) -> FetchResponse {
        let body = self.text_lossy();
        let status_text = if self.status_text.is_empty() {
            StatusCode::from_u16(self.status_code)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or_default()
                .to_string()
        } else {
            self.status_text
        };
        FetchResponse {
            url: self.url,
            status: self.status_code,
            status_text,
            headers: self.headers,
            body,
        }
    }
}

/// Loads resources the way the page would: interceptors first, then the
/// default loader
#[derive(Clone)]
pub struct ResourceLoader {
    client: HttpClient,
    chain: InterceptorChain,
}

impl ResourceLoader {
    pub fn new(client: HttpClient, chain: InterceptorChain) -> Self {
        Self { client, chain }
    }

    pub async fn fetch(&self, request: &InterceptedRequest) -> Result<Resource> {
        match self.chain.intercept(request).await {
            InterceptAction::Respond(response) => {
                Ok(Resource::from_proxied(&request.url, response))
            }
            InterceptAction::Default => {
                let http = Request::with_method_name(&request.method, &request.url)?;
                let response = self.client.execute(http).await?;
                Ok(Resource::from_response(response))
            }
        }
    }
}

/// Outcome of a top-level navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLoad {
    pub url: String,
    pub status_code: u16,
    pub scripts_executed: usize,
    pub script_errors: usize,
    /// `type="module"` scripts found but not run
    pub modules_skipped: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct ScriptReport {
    executed: usize,
    errors: usize,
}

enum PageCommand {
    Load {
        url: String,
        scripts: Vec<PageScript>,
        reply: oneshot::Sender<ScriptReport>,
    },
    Evaluate {
        script: String,
        label: String,
        reply: oneshot::Sender<Result<JsValue>>,
    },
    FetchDone {
        generation: u64,
        id: u32,
        outcome: std::result::Result<Resource, String>,
    },
    Shutdown,
}

/// Handle to the hosted page
pub struct WebView {
    commands: std_mpsc::Sender<PageCommand>,
    loader: ResourceLoader,
    settings: WebSettings,
    history: Arc<RwLock<Vec<String>>>,
    console: Arc<Mutex<VecDeque<ConsoleMessage>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl WebView {
    /// Start the page thread. Bridge calls from the page go to `bridge`.
    pub fn new(
        client: HttpClient,
        chain: InterceptorChain,
        config: &ShellConfig,
        bridge: Option<BridgeHandle>,
    ) -> Result<Self> {
        let (commands, receiver) = std_mpsc::channel();
        let console = Arc::new(Mutex::new(VecDeque::with_capacity(CONSOLE_BUFFER)));

        let template = JsRuntimeConfig {
            url: "about:blank".to_string(),
            user_agent: config.user_agent.clone(),
            bridge_name: config.bridge_name.clone(),
            dom_storage: config.settings.dom_storage_enabled,
            max_timer_executions: config.max_timer_executions,
        };
        let javascript_enabled = config.settings.javascript_enabled;
        let thread_console = console.clone();
        let loader = ResourceLoader::new(client, chain);
        let thread_loader = loader.clone();
        let thread_commands = commands.clone();
        let network = Handle::try_current().ok();
        if network.is_none() {
            tracing::debug!("No tokio runtime, page fetch() calls will be rejected");
        }

        // the JS context is !Send, so the host state is built on its own thread
        let thread = std::thread::Builder::new()
            .name("page-host".to_string())
            .spawn(move || {
                PageThread {
                    template,
                    javascript_enabled,
                    bridge,
                    console: thread_console,
                    loader: thread_loader,
                    network,
                    commands: thread_commands,
                    runtime: None,
                    generation: 0,
                    started: Instant::now(),
                }
                .run(receiver)
            })?;

        Ok(Self {
            commands,
            loader,
            settings: config.settings.clone(),
            history: Arc::new(RwLock::new(Vec::new())),
            console,
            thread: Mutex::new(Some(thread)),
        })
    }

    /// Page settings
    pub fn settings(&self) -> &WebSettings {
        &self.settings
    }

    /// Whether a navigation to `url` is taken over by the shell.
    ///
    /// Never: every navigation stays inside the page.
    pub fn should_override_url_loading(&self, url: &Url) -> bool {
        tracing::debug!(url = %url, "Loading URL in page");
        false
    }

    /// Fetch one resource the way the page would: interceptors first, then
    /// the default loader
    pub async fn fetch(&self, request: &InterceptedRequest) -> Result<Resource> {
        self.loader.fetch(request).await
    }

    /// Navigate the page to `url`
    ///
    /// Replaces the page's JavaScript context. Script failures are logged
    /// and counted, never returned.
    pub async fn load_url(&self, url: &str) -> Result<PageLoad> {
        let load = self.navigate(url).await?;
        self.history.write().push(load.url.clone());
        Ok(load)
    }

    /// Fetch and run a document without touching history
    async fn navigate(&self, url: &str) -> Result<PageLoad> {
        let parsed = Url::parse(url)?;
        if self.should_override_url_loading(&parsed) {
            return Err(Error::other(format!("Navigation to {} was taken over", parsed)));
        }

        tracing::info!(url = %parsed, "Loading page");
        let document = self.fetch(&InterceptedRequest::get(parsed.as_str())).await?;
        if !document.is_success() {
            tracing::warn!(url = %parsed, status = document.status_code, "Page answered with an error status");
        }

        let (scripts, modules_skipped) = if self.settings.javascript_enabled && document.is_html()
        {
            self.collect_scripts(&parsed, &document.text_lossy()).await?
        } else {
            (Vec::new(), 0)
        };
        if modules_skipped > 0 {
            tracing::warn!(
                url = %parsed,
                count = modules_skipped,
                "Module scripts are not supported and were not run"
            );
        }

        let (reply, done) = oneshot::channel();
        self.send(PageCommand::Load {
            url: parsed.to_string(),
            scripts,
            reply,
        })?;
        let report = done.await.map_err(|_| Error::PageClosed)?;

        Ok(PageLoad {
            url: parsed.to_string(),
            status_code: document.status_code,
            scripts_executed: report.executed,
            script_errors: report.errors,
            modules_skipped,
        })
    }

    async fn collect_scripts(&self, base: &Url, html: &str) -> Result<(Vec<PageScript>, usize)> {
        let mut scripts = Vec::new();
        let mut modules = 0;

        for (index, script) in discover_scripts(html)?.into_iter().enumerate() {
            match script {
                ScriptRef::Inline(code) => scripts.push(PageScript {
                    label: format!("{}#inline-{}", base, index),
                    code,
                }),
                ScriptRef::Module(src) => {
                    tracing::debug!(src = ?src, "Skipping module script");
                    modules += 1;
                }
                ScriptRef::External(src) => {
                    let url = match base.join(&src) {
                        Ok(url) => url,
                        Err(e) => {
                            tracing::warn!(src = %src, error = %e, "Bad script URL");
                            continue;
                        }
                    };
                    match self.fetch(&InterceptedRequest::get(url.as_str())).await {
                        Ok(resource) if resource.is_success() => scripts.push(PageScript {
                            label: url.to_string(),
                            code: resource.text_lossy(),
                        }),
                        Ok(resource) => {
                            tracing::warn!(url = %url, status = resource.status_code, "Script not loaded")
                        }
                        Err(e) => tracing::warn!(url = %url, error = %e, "Script not loaded"),
                    }
                }
            }
        }

        Ok((scripts, modules))
    }

    /// Evaluate JavaScript in the page and return its completion value
    pub async fn evaluate(&self, script: &str) -> Result<JsValue> {
        self.evaluate_labeled(script.to_string(), "evaluate").await
    }

    async fn evaluate_labeled(&self, script: String, label: &str) -> Result<JsValue> {
        let (reply, done) = oneshot::channel();
        self.send(PageCommand::Evaluate {
            script,
            label: label.to_string(),
            reply,
        })?;
        done.await.map_err(|_| Error::PageClosed)?
    }

    /// Whether there is a page to go back to
    pub fn can_go_back(&self) -> bool {
        self.history.read().len() >= 2
    }

    /// Navigate to the previous page.
    ///
    /// Returns `false` at the first page, where the caller should close the
    /// shell instead. History is left alone when the reload fails.
    pub async fn go_back(&self) -> Result<bool> {
        let previous = {
            let history = self.history.read();
            match history.len().checked_sub(2) {
                Some(index) => history[index].clone(),
                None => return Ok(false),
            }
        };

        let load = self.navigate(&previous).await?;

        let mut history = self.history.write();
        history.pop();
        if history.last() != Some(&load.url) {
            history.push(load.url);
        }
        Ok(true)
    }

    /// Current URL
    pub fn url(&self) -> Option<String> {
        self.history.read().last().cloned()
    }

    /// Navigation history, oldest first
    pub fn navigation_history(&self) -> Vec<String> {
        self.history.read().clone()
    }

    /// Console messages the current document has logged, newest
    /// [`CONSOLE_BUFFER`] only
    pub fn console_messages(&self) -> Vec<ConsoleMessage> {
        self.console.lock().iter().cloned().collect()
    }

    /// Stop the page thread
    pub fn close(&self) {
        // a send error means the thread is already gone
        let _ = self.commands.send(PageCommand::Shutdown);
        // detached: a long-running page script must not block the caller
        if let Some(thread) = self.thread.lock().take() {
            tracing::debug!(thread = ?thread.thread().name(), "Page host shutting down");
        }
    }

    fn send(&self, command: PageCommand) -> Result<()> {
        self.commands.send(command).map_err(|_| Error::PageClosed)
    }
}

#[async_trait]
impl ScriptEvaluator for WebView {
    async fn evaluate_script(&self, script: String) -> Result<()> {
        self.evaluate_labeled(script, "native").await.map(|_| ())
    }
}

impl Drop for WebView {
    fn drop(&mut self) {
        self.close();
    }
}

/// State owned by the page thread
struct PageThread {
    template: JsRuntimeConfig,
    javascript_enabled: bool,
    bridge: Option<BridgeHandle>,
    console: Arc<Mutex<VecDeque<ConsoleMessage>>>,
    loader: ResourceLoader,
    /// Runtime page fetches are spawned on
    network: Option<Handle>,
    /// Completions are posted back through the command channel
    commands: std_mpsc::Sender<PageCommand>,
    runtime: Option<JsRuntime>,
    /// Bumped per document so late fetch results for a replaced page are dropped
    generation: u64,
    /// Wall time at which the current document's clock started
    started: Instant,
}

impl PageThread {
    fn run(mut self, commands: std_mpsc::Receiver<PageCommand>) {
        loop {
            let wait = self.runtime.as_ref().and_then(|r| r.time_until_next_timer());
            let command = match wait {
                Some(wait) => match commands.recv_timeout(wait) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match commands.recv() {
                    Ok(command) => Some(command),
                    Err(_) => break,
                },
            };

            self.tick();

            match command {
                Some(PageCommand::Shutdown) => break,
                Some(PageCommand::Load {
                    url,
                    scripts,
                    reply,
                }) => {
                    let report = self.load(url, scripts);
                    self.flush();
                    let _ = reply.send(report);
                }
                Some(PageCommand::Evaluate {
                    script,
                    label,
                    reply,
                }) => {
                    let result = self.evaluate(&script, &label);
                    self.flush();
                    let _ = reply.send(result);
                }
                Some(PageCommand::FetchDone {
                    generation,
                    id,
                    outcome,
                }) => {
                    self.settle_fetch(generation, id, outcome);
                    self.flush();
                }
                None => self.flush(),
            }
        }
        tracing::debug!("Page host stopped");
    }

    /// Catch the page clock up with wall time, firing due timers
    fn tick(&mut self) {
        let Some(runtime) = self.runtime.as_mut() else {
            return;
        };
        let elapsed = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let result = runtime.advance_to(elapsed);
        if result.hit_limit {
            tracing::warn!(
                executed = result.timers_executed,
                "Timer budget exhausted, deferring the rest"
            );
        }
    }

    fn load(&mut self, url: String, scripts: Vec<PageScript>) -> ScriptReport {
        self.runtime = None;
        self.generation += 1;
        self.console.lock().clear();
        let mut report = ScriptReport::default();
        if !self.javascript_enabled {
            return report;
        }

        let config = JsRuntimeConfig {
            url,
            ..self.template.clone()
        };
        let runtime = match JsRuntime::new(config) {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::error!(error = %e, "Could not start page JavaScript");
                return report;
            }
        };
        self.started = Instant::now();
        let runtime = self.runtime.insert(runtime);

        for script in scripts {
            report.executed += 1;
            if let Err(e) = runtime.execute_labeled(&script.code, &script.label) {
                report.errors += 1;
                tracing::error!(target: CONSOLE_TARGET, "Uncaught {} -- From {}", e, script.label);
            }
        }
        report
    }

    fn evaluate(&mut self, script: &str, label: &str) -> Result<JsValue> {
        if !self.javascript_enabled {
            return Err(Error::js("JavaScript is disabled"));
        }
        if self.runtime.is_none() {
            self.generation += 1;
            self.started = Instant::now();
            self.runtime = Some(JsRuntime::new(self.template.clone())?);
        }
        match self.runtime.as_mut() {
            Some(runtime) => runtime.execute_labeled(script, label),
            None => Err(Error::js("JavaScript is disabled")),
        }
    }

    /// Forward console output and bridge calls produced since the last flush
    fn flush(&mut self) {
        let Some(runtime) = self.runtime.as_mut() else {
            return;
        };
        let messages = runtime.take_console();
        let calls = runtime.take_bridge_calls();
        let fetches = runtime.take_fetch_requests();
        let base = runtime.config().url.clone();

        for message in &messages {
            forward_console(message);
        }
        if !messages.is_empty() {
            let mut console = self.console.lock();
            for message in messages {
                if console.len() == CONSOLE_BUFFER {
                    console.pop_front();
                }
                console.push_back(message);
            }
        }

        for call in calls {
            self.dispatch(call);
        }

        for request in fetches {
            self.start_fetch(&base, request);
        }
    }

    fn start_fetch(&self, base: &str, request: FetchRequest) {
        let generation = self.generation;
        let id = request.id;

        let url = match Url::parse(base).and_then(|b| b.join(&request.url)) {
            Ok(url) => url,
            Err(e) => {
                self.post_fetch(generation, id, Err(format!("Invalid URL {}: {}", request.url, e)));
                return;
            }
        };
        let Some(network) = self.network.as_ref() else {
            self.post_fetch(generation, id, Err("Network unavailable".to_string()));
            return;
        };

        tracing::debug!(url = %url, method = %request.method, "Page fetch");
        let loader = self.loader.clone();
        let commands = self.commands.clone();
        network.spawn(async move {
            let outcome = loader
                .fetch(&InterceptedRequest::new(url.as_str(), request.method))
                .await
                .map_err(|e| {
                    tracing::warn!(url = %url, error = %e, "Page fetch failed");
                    "Failed to fetch".to_string()
                });
            let _ = commands.send(PageCommand::FetchDone {
                generation,
                id,
                outcome,
            });
        });
    }

    fn post_fetch(&self, generation: u64, id: u32, outcome: std::result::Result<Resource, String>) {
        let _ = self.commands.send(PageCommand::FetchDone {
            generation,
            id,
            outcome,
        });
    }

    fn settle_fetch(
        &mut self,
        generation: u64,
        id: u32,
        outcome: std::result::Result<Resource, String>,
    ) {
        if generation != self.generation {
            tracing::debug!(id, "Dropping fetch result for a replaced document");
            return;
        }
        let Some(runtime) = self.runtime.as_mut() else {
            return;
        };
        if let Err(e) = runtime.settle_fetch(id, outcome.map(Resource::into_fetch_response)) {
            tracing::error!(target: CONSOLE_TARGET, "Uncaught {} -- From fetch", e);
        }
    }

    fn dispatch(&self, call: BridgeCall) {
        match call.method.as_str() {
            "requestLocation" => match &self.bridge {
                Some(bridge) => {
                    if let Err(e) = bridge.request_location() {
                        tracing::debug!(error = %e, "Location request dropped");
                    }
                }
                None => tracing::debug!("No bridge attached, ignoring requestLocation"),
            },
            other => tracing::warn!(method = %other, "Unknown bridge method"),
        }
    }
}

fn forward_console(message: &ConsoleMessage) {
    match message.level {
        ConsoleLevel::Error => tracing::error!(
            target: CONSOLE_TARGET,
            "{} -- From {}",
            message.message,
            message.source
        ),
        ConsoleLevel::Warn => tracing::warn!(
            target: CONSOLE_TARGET,
            "{} -- From {}",
            message.message,
            message.source
        ),
        _ => tracing::debug!(
            target: CONSOLE_TARGET,
            "{} -- From {}",
            message.message,
            message.source
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::UiEvent;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn web_view(bridge: Option<BridgeHandle>) -> WebView {
        let client = HttpClient::new().unwrap();
        WebView::new(client, InterceptorChain::new(), &ShellConfig::default(), bridge).unwrap()
    }

    async fn serve_page(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"<html><head>
<script src="/app.js"></script>
<script>window.inline = 'yes'; console.log('booted');</script>
</head><body></body></html>"#,
                "text/html; charset=utf-8",
            ))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/app.js"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("window.external = 'loaded';", "application/javascript"),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_load_runs_scripts_in_order() {
        let server = MockServer::start().await;
        serve_page(&server).await;

        let page = web_view(None);
        let load = page.load_url(&format!("{}/", server.uri())).await.unwrap();

        assert_eq!(load.status_code, 200);
        assert_eq!(load.scripts_executed, 2);
        assert_eq!(load.script_errors, 0);
        assert_eq!(load.modules_skipped, 0);
        assert_eq!(
            page.evaluate("window.external + '/' + window.inline").await.unwrap(),
            JsValue::String("loaded/yes".to_string())
        );
        assert!(page
            .console_messages()
            .iter()
            .any(|m| m.message == "booted"));
    }

    #[tokio::test]
    async fn test_bridge_call_reaches_ui_loop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let page = web_view(Some(BridgeHandle::new(tx)));

        page.evaluate("Android.requestLocation();").await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap();
        assert_eq!(event, Some(UiEvent::LocationRequested));
    }

    #[tokio::test]
    async fn test_page_fetch_uses_default_loader() {
        let server = MockServer::start().await;
        serve_page(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/menu"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"{"items":3}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let page = web_view(None);
        page.load_url(&format!("{}/", server.uri())).await.unwrap();
        page.evaluate(
            "window.items = null; \
             fetch('/api/menu').then(function (r) { return r.json(); }) \
               .then(function (j) { window.items = j.items; });",
        )
        .await
        .unwrap();

        let mut items = JsValue::Null;
        for _ in 0..40 {
            items = page.evaluate("window.items").await.unwrap();
            if items != JsValue::Null {
                break;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        assert_eq!(items, JsValue::Number(3.0));
    }

    #[tokio::test]
    async fn test_timers_follow_wall_time() {
        let page = web_view(None);
        page.evaluate("window.fired = false; setTimeout(function () { window.fired = true; }, 50);")
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(
            page.evaluate("window.fired").await.unwrap(),
            JsValue::Boolean(true)
        );
    }

    #[tokio::test]
    async fn test_go_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>hi</p>", "text/html"))
            .mount(&server)
            .await;

        let page = web_view(None);
        assert!(!page.go_back().await.unwrap());

        page.load_url(&format!("{}/a", server.uri())).await.unwrap();
        page.load_url(&format!("{}/b", server.uri())).await.unwrap();
        assert!(page.can_go_back());

        assert!(page.go_back().await.unwrap());
        assert_eq!(page.url(), Some(format!("{}/a", server.uri())));
        assert!(!page.can_go_back());
        assert!(!page.go_back().await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_go_back_keeps_history() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>a</p>", "text/html"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<p>a</p>", "text/html")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>b</p>", "text/html"))
            .mount(&server)
            .await;

        let config = ShellConfig::default().timeout(Duration::from_millis(300));
        let client = HttpClient::with_config(config.http_config()).unwrap();
        let page = WebView::new(client, InterceptorChain::new(), &config, None).unwrap();

        page.load_url(&format!("{}/a", server.uri())).await.unwrap();
        page.load_url(&format!("{}/b", server.uri())).await.unwrap();

        assert!(page.go_back().await.is_err());
        assert_eq!(page.url(), Some(format!("{}/b", server.uri())));
        assert!(page.can_go_back());
        assert_eq!(page.navigation_history().len(), 2);
    }

    #[tokio::test]
    async fn test_console_is_per_document_and_bounded() {
        let server = MockServer::start().await;
        serve_page(&server).await;

        let page = web_view(None);
        page.evaluate(&format!(
            "for (var i = 0; i < {}; i++) {{ console.log('line ' + i); }}",
            CONSOLE_BUFFER + 20
        ))
        .await
        .unwrap();

        let messages = page.console_messages();
        assert_eq!(messages.len(), CONSOLE_BUFFER);
        assert_eq!(messages[0].message, "line 20");

        page.load_url(&format!("{}/", server.uri())).await.unwrap();
        let messages = page.console_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "booted");
    }

    #[tokio::test]
    async fn test_script_error_is_counted_not_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "<script>throw new Error('boom');</script><script>window.after = 1;</script>",
                "text/html",
            ))
            .mount(&server)
            .await;

        let page = web_view(None);
        let load = page.load_url(&server.uri()).await.unwrap();
        assert_eq!(load.script_errors, 1);
        assert_eq!(page.evaluate("window.after").await.unwrap(), JsValue::Number(1.0));
    }

    #[tokio::test]
    async fn test_module_scripts_are_counted_not_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"<script type="module" src="/assets/index.js"></script><script>window.classic = 1;</script>"#,
                "text/html",
            ))
            .mount(&server)
            .await;

        let page = web_view(None);
        let load = page.load_url(&format!("{}/", server.uri())).await.unwrap();

        assert_eq!(load.scripts_executed, 1);
        assert_eq!(load.modules_skipped, 1);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_javascript_disabled() {
        let config = ShellConfig::default().javascript_enabled(false);
        let page =
            WebView::new(HttpClient::new().unwrap(), InterceptorChain::new(), &config, None)
                .unwrap();
        assert!(page.evaluate("1 + 1").await.is_err());
    }

    #[test]
    fn test_never_overrides_navigation() {
        let page = web_view(None);
        let url = Url::parse("https://example.com/elsewhere").unwrap();
        assert!(!page.should_override_url_loading(&url));
    }
}

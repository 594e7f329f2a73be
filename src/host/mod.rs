// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Shell host: configuration, the hosted page and platform services

mod config;
mod page;
pub mod platform;
mod scripts;
mod shell;

pub use config::{MixedContentMode, ShellConfig, WebSettings, DEFAULT_START_URL, START_URL_ENV};
pub use page::{PageLoad, Resource, ResourceLoader, WebView, CONSOLE_TARGET};
pub use platform::{
    FixedLocation, PromptAnswer, RecordingNotifier, SimulatedPermissions, SimulatedPlatform,
};
pub use scripts::{discover_scripts, PageScript, ScriptRef};
pub use shell::Shell;

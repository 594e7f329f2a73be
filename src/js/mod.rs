// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! JavaScript runtime using boa_engine
//!
//! Hosts the loaded document's scripts together with the native bridge
//! object and a virtual-clock timer queue.

mod runtime;
mod timers;
mod value;

pub use runtime::{
    BridgeCall, ConsoleLevel, ConsoleMessage, FetchRequest, FetchResponse, JsRuntime,
    JsRuntimeConfig,
};
pub use timers::{JsIdleResult, TimerEntry, TimerQueue};
pub use value::JsValue;

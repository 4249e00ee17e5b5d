// MindTwin Viewer - Headless visualization driver
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

//! # MindTwin Viewer
//!
//! Runtime around the core transforms: a [`Poller`] keeps a [`DriverCell`]
//! fresh from a [`MetricsSource`], and a [`FrameLoop`] turns the latest
//! drivers into [`RenderParams`] for a [`RenderSink`] at a fixed rate.
//!
//! ```text
//! MetricsSource --5s--> Poller --publish--> DriverCell --snapshot--> FrameLoop --> RenderSink
//! ```
//!
//! [`DriverCell`]: mindtwin::DriverCell
//! [`RenderParams`]: mindtwin::RenderParams

pub mod config;
pub mod error;
pub mod frame;
pub mod poller;
pub mod sink;
pub mod source;

pub use config::Args;
pub use error::{FetchError, Result, ViewerError};
pub use frame::{FrameLoop, DEFAULT_FPS};
pub use poller::{Poller, PollerConfig, PollerHandle, PollerState};
pub use sink::{RenderSink, TracingSink};
pub use source::{HttpMetricsSource, MetricsSource};

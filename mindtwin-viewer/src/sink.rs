// MindTwin Viewer - Render sinks
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

//! Write path from the frame loop into a rendering engine.

use mindtwin::RenderParams;
use tracing::{debug, trace};

/// Receives the parameters computed for each frame.
pub trait RenderSink: Send {
    fn apply(&mut self, params: &RenderParams);
}

/// Keeps every frame; handy for tests and capture.
impl RenderSink for Vec<RenderParams> {
    fn apply(&mut self, params: &RenderParams) {
        self.push(*params);
    }
}

/// Headless sink that logs frames instead of drawing them.
///
/// Every frame goes to `trace`; every `summary_every` frames a one-line
/// summary goes to `debug`.
#[derive(Debug, Clone)]
pub struct TracingSink {
    frames: u64,
    summary_every: u64,
}

impl TracingSink {
    pub fn new(summary_every: u64) -> Self {
        Self {
            frames: 0,
            summary_every: summary_every.max(1),
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for TracingSink {
    /// One summary per second at 60 fps.
    fn default() -> Self {
        Self::new(60)
    }
}

impl RenderSink for TracingSink {
    fn apply(&mut self, params: &RenderParams) {
        self.frames += 1;
        trace!(
            frame = self.frames,
            color = %params.color.to_hex(),
            scale = params.scale,
            rot_y = params.rotation.y,
            rot_z = params.rotation.z,
            tilt_x = params.tilt_x,
            "frame"
        );

        if self.frames % self.summary_every == 0 {
            debug!(
                "frame {}: color {} scale {:.3} emissive {:.2} opacity {:.2}",
                self.frames,
                params.color.to_hex(),
                params.scale,
                params.emissive_intensity,
                params.opacity
            );
        }
    }
}

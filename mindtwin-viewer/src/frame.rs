// MindTwin Viewer - Frame loop
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

//! Fixed-rate frame loop.
//!
//! Each tick reads the latest published drivers, advances the [`Animator`]
//! by the measured wall-clock delta and hands the result to a
//! [`RenderSink`]. Reading the cell never waits on the poller.

use mindtwin::{Animator, DriverCell, RenderParams};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::error::{Result, ViewerError};
use crate::sink::RenderSink;

/// Default frame rate.
pub const DEFAULT_FPS: u32 = 60;

/// Drives an [`Animator`] from a [`DriverCell`] into a [`RenderSink`].
pub struct FrameLoop<K> {
    animator: Animator,
    cell: Arc<DriverCell>,
    sink: K,
}

impl<K: RenderSink> FrameLoop<K> {
    pub fn new(animator: Animator, cell: Arc<DriverCell>, sink: K) -> Self {
        Self {
            animator,
            cell,
            sink,
        }
    }

    /// Render one frame `delta` seconds after the previous one.
    pub fn tick(&mut self, delta: f64) -> RenderParams {
        let drivers = self.cell.snapshot();
        let params = self.animator.tick(&drivers, delta);
        self.sink.apply(&params);
        params
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Tick at `fps` until `shutdown` resolves, then return the loop.
    pub async fn run_until<F>(mut self, fps: u32, shutdown: F) -> Result<Self>
    where
        F: Future<Output = ()>,
    {
        if fps == 0 {
            return Err(ViewerError::Config("fps must be positive".to_string()));
        }

        let mut ticker = interval(Duration::from_secs_f64(1.0 / fps as f64));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        let mut last = Instant::now();
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    let now = Instant::now();
                    let delta = now.duration_since(last).as_secs_f64();
                    last = now;
                    self.tick(delta);
                }
            }
        }

        info!(
            "Frame loop stopped after {} frames ({:.1}s of animation)",
            self.animator.frames(),
            self.animator.elapsed()
        );
        Ok(self)
    }
}

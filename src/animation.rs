//! Frame-over-frame animation state.
//!
//! The [`Animator`] is owned by whatever drives the frame loop. It keeps the
//! elapsed clock and the accumulated rotation and threads them through
//! [`VisualMapper::map_frame`] on every tick.

use crate::drivers::Drivers;
use crate::error::{MindtwinError, Result};
use crate::visual::{RenderParams, Rotation, VisualMapper};

/// Animator configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatorConfig {
    /// Longest frame delta honored per tick (seconds). Longer gaps, e.g.
    /// after the view was hidden, advance the animation by this much only.
    pub max_frame_delta: f64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            max_frame_delta: 0.1,
        }
    }
}

/// Running animation: clock plus accumulated rotation.
#[derive(Debug, Clone)]
pub struct Animator {
    mapper: VisualMapper,
    config: AnimatorConfig,
    elapsed: f64,
    rotation: Rotation,
    frames: u64,
}

impl Animator {
    pub fn new(mapper: VisualMapper) -> Self {
        Self {
            mapper,
            config: AnimatorConfig::default(),
            elapsed: 0.0,
            rotation: Rotation::ZERO,
            frames: 0,
        }
    }

    pub fn with_config(mapper: VisualMapper, config: AnimatorConfig) -> Result<Self> {
        if !config.max_frame_delta.is_finite() || config.max_frame_delta <= 0.0 {
            return Err(MindtwinError::invalid(
                "max_frame_delta",
                config.max_frame_delta,
                "must be finite and positive",
            ));
        }
        Ok(Self {
            config,
            ..Self::new(mapper)
        })
    }

    /// Advance by `frame_delta` seconds and produce this frame's parameters.
    pub fn tick(&mut self, drivers: &Drivers, frame_delta: f64) -> RenderParams {
        let delta = if frame_delta.is_finite() {
            frame_delta.clamp(0.0, self.config.max_frame_delta)
        } else {
            0.0
        };
        self.elapsed += delta;

        let params = self
            .mapper
            .map_frame(drivers, self.elapsed, delta, self.rotation);
        self.rotation = params.rotation;
        self.frames += 1;
        params
    }

    /// Seconds of animation time so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Rotation accumulated so far.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Number of ticks so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn mapper(&self) -> &VisualMapper {
        &self.mapper
    }

    /// Back to time zero with no rotation.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.rotation = Rotation::ZERO;
        self.frames = 0;
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(VisualMapper::default())
    }
}

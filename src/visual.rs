//! Per-frame visual mapping.
//!
//! [`VisualMapper::map_frame`] is a pure function of the drivers, the
//! elapsed animation time, the frame delta and the rotation accumulated so
//! far. It is called once per rendered frame and never blocks.
//!
//! | Driver | Drives |
//! |---|---|
//! | emotional balance | hue and lightness, emissive intensity |
//! | energy level | pulse frequency and amplitude |
//! | cognitive load | spin speed |
//! | stress level | opacity |

use crate::color::{Hsl, Rgb};
use crate::drivers::Drivers;
use crate::error::{MindtwinError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Accumulated rotation about the spinning axes, in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Group rotation about Y.
    pub y: f64,
    /// Mesh rotation about Z.
    pub z: f64,
}

impl Rotation {
    pub const ZERO: Rotation = Rotation { y: 0.0, z: 0.0 };

    pub fn new(y: f64, z: f64) -> Self {
        Self { y, z }
    }
}

impl std::ops::Add for Rotation {
    type Output = Rotation;

    fn add(self, rhs: Rotation) -> Rotation {
        Rotation {
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

/// Everything the rendering engine needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    /// Base color (HSL).
    pub hsl: Hsl,
    /// Base color, also used as the emissive color.
    pub color: Rgb,
    /// Uniform scale of the group.
    pub scale: f64,
    /// Rotation added this frame.
    pub rotation_delta: Rotation,
    /// Rotation after this frame (prior + delta).
    pub rotation: Rotation,
    /// Absolute tilt about X, in radians.
    pub tilt_x: f64,
    pub emissive_intensity: f64,
    pub opacity: f64,
    pub transparent: bool,
}

/// Tuning constants for the frame mapping.
///
/// Each mapping is `base + driver * gain`. Gains must be non-negative so
/// the mappings stay monotonic in their driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualConfig {
    /// Hue span (fraction of a turn) covered as balance goes 0 to 1.
    pub hue_span: f64,
    pub saturation: f64,
    pub lightness_base: f64,
    pub lightness_gain: f64,

    /// Pulse angular frequency (rad/s).
    pub pulse_speed_base: f64,
    pub pulse_speed_gain: f64,
    /// Pulse amplitude (fraction of unit scale).
    pub pulse_amount_base: f64,
    pub pulse_amount_gain: f64,

    /// Spin speed (rad/s) about Z.
    pub spin_speed_base: f64,
    pub spin_speed_gain: f64,
    /// Y spin as a fraction of Z spin.
    pub spin_y_ratio: f64,

    /// Tilt oscillation frequency (rad/s) and amplitude (rad).
    pub tilt_speed: f64,
    pub tilt_amplitude: f64,

    pub emissive_base: f64,
    pub emissive_gain: f64,
    pub opacity_base: f64,
    pub opacity_gain: f64,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            hue_span: 0.7,
            saturation: 0.8,
            lightness_base: 0.5,
            lightness_gain: 0.3,
            pulse_speed_base: 2.0,
            pulse_speed_gain: 3.0,
            pulse_amount_base: 0.08,
            pulse_amount_gain: 0.12,
            spin_speed_base: 0.3,
            spin_speed_gain: 0.7,
            spin_y_ratio: 0.3,
            tilt_speed: 0.5,
            tilt_amplitude: 0.2,
            emissive_base: 0.2,
            emissive_gain: 0.3,
            opacity_base: 0.9,
            opacity_gain: 0.1,
        }
    }
}

impl VisualConfig {
    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("hue_span", self.hue_span),
            ("lightness_gain", self.lightness_gain),
            ("pulse_speed_base", self.pulse_speed_base),
            ("pulse_speed_gain", self.pulse_speed_gain),
            ("pulse_amount_base", self.pulse_amount_base),
            ("pulse_amount_gain", self.pulse_amount_gain),
            ("spin_speed_base", self.spin_speed_base),
            ("spin_speed_gain", self.spin_speed_gain),
            ("spin_y_ratio", self.spin_y_ratio),
            ("tilt_speed", self.tilt_speed),
            ("tilt_amplitude", self.tilt_amplitude),
            ("emissive_base", self.emissive_base),
            ("emissive_gain", self.emissive_gain),
            ("opacity_gain", self.opacity_gain),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(MindtwinError::invalid(field, value, "must be finite and >= 0"));
            }
        }

        // a full turn would wrap the calm hue back onto the agitated one
        if self.hue_span >= 1.0 {
            return Err(MindtwinError::invalid("hue_span", self.hue_span, "must be < 1"));
        }
        if !(0.0..=1.0).contains(&self.saturation) {
            return Err(MindtwinError::invalid(
                "saturation",
                self.saturation,
                "must lie in [0, 1]",
            ));
        }
        let max_lightness = self.lightness_base + self.lightness_gain;
        if !(0.0..=1.0).contains(&self.lightness_base) || max_lightness > 1.0 {
            return Err(MindtwinError::invalid(
                "lightness_base",
                self.lightness_base,
                "lightness range must stay inside [0, 1]",
            ));
        }
        let max_amount = self.pulse_amount_base + self.pulse_amount_gain;
        if max_amount >= 1.0 {
            return Err(MindtwinError::invalid(
                "pulse_amount_gain",
                self.pulse_amount_gain,
                "peak pulse amplitude must stay below 1",
            ));
        }
        let max_opacity = self.opacity_base + self.opacity_gain;
        if !(0.0..=1.0).contains(&self.opacity_base) || max_opacity > 1.0 {
            return Err(MindtwinError::invalid(
                "opacity_base",
                self.opacity_base,
                "opacity range must stay inside [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Maps drivers and animation time to [`RenderParams`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VisualMapper {
    config: VisualConfig,
}

impl VisualMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mapper with custom tuning.
    pub fn with_config(config: VisualConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &VisualConfig {
        &self.config
    }

    /// Compute this frame's render parameters.
    ///
    /// `elapsed` and `frame_delta` are in seconds. A negative or non-finite
    /// delta contributes no rotation; a non-finite elapsed time is treated
    /// as zero. Drivers are clamped again before use.
    pub fn map_frame(
        &self,
        drivers: &Drivers,
        elapsed: f64,
        frame_delta: f64,
        prior: Rotation,
    ) -> RenderParams {
        let d = drivers.clamped();
        let elapsed = if elapsed.is_finite() { elapsed } else { 0.0 };
        let delta = if frame_delta.is_finite() && frame_delta > 0.0 {
            frame_delta
        } else {
            0.0
        };
        let prior = wrap_turns(Rotation {
            y: finite_or_zero(prior.y),
            z: finite_or_zero(prior.z),
        });

        let hsl = self.color(d.emotional_balance);

        let rotation_delta = self.rotation_delta(d.cognitive_load, delta);

        RenderParams {
            hsl,
            color: hsl.to_rgb(),
            scale: self.scale(d.energy_level, elapsed),
            rotation_delta,
            rotation: wrap_turns(prior + rotation_delta),
            tilt_x: self.tilt(elapsed),
            emissive_intensity: self.config.emissive_base
                + d.emotional_balance * self.config.emissive_gain,
            opacity: self.config.opacity_base + d.stress_level * self.config.opacity_gain,
            transparent: true,
        }
    }

    /// Color for a given emotional balance: warm at 0, cool at 1.
    pub fn color(&self, emotional_balance: f64) -> Hsl {
        let b = crate::drivers::unit(emotional_balance);
        Hsl::new(
            b * self.config.hue_span,
            self.config.saturation,
            self.config.lightness_base + b * self.config.lightness_gain,
        )
    }

    /// Pulse angular frequency (rad/s) for a given energy level.
    pub fn pulse_speed(&self, energy_level: f64) -> f64 {
        self.config.pulse_speed_base + crate::drivers::unit(energy_level) * self.config.pulse_speed_gain
    }

    /// Pulse amplitude for a given energy level.
    pub fn pulse_amount(&self, energy_level: f64) -> f64 {
        self.config.pulse_amount_base
            + crate::drivers::unit(energy_level) * self.config.pulse_amount_gain
    }

    /// Spin speed about Z (rad/s) for a given cognitive load.
    pub fn spin_speed(&self, cognitive_load: f64) -> f64 {
        self.config.spin_speed_base + crate::drivers::unit(cognitive_load) * self.config.spin_speed_gain
    }

    fn scale(&self, energy_level: f64, elapsed: f64) -> f64 {
        let wave = phase(elapsed, self.pulse_speed(energy_level)).sin();
        let scale = 1.0 + wave * self.pulse_amount(energy_level);
        if scale.is_finite() {
            scale
        } else {
            1.0
        }
    }

    fn rotation_delta(&self, cognitive_load: f64, delta: f64) -> Rotation {
        let z = finite_or_zero(delta * self.spin_speed(cognitive_load));
        Rotation {
            y: z * self.config.spin_y_ratio,
            z,
        }
    }

    fn tilt(&self, elapsed: f64) -> f64 {
        phase(elapsed, self.config.tilt_speed).sin() * self.config.tilt_amplitude
    }
}

/// `elapsed * speed` reduced to one period, so huge clocks cannot overflow
/// into `sin(inf)`.
fn phase(elapsed: f64, speed: f64) -> f64 {
    if speed <= 0.0 || !speed.is_finite() {
        return 0.0;
    }
    let period = TAU / speed;
    finite_or_zero(elapsed.rem_euclid(period) * speed)
}

/// Reduce each angle modulo a full turn once it reaches one.
fn wrap_turns(rotation: Rotation) -> Rotation {
    let wrap = |v: f64| if v.abs() < TAU { v } else { v % TAU };
    Rotation {
        y: wrap(rotation.y),
        z: wrap(rotation.z),
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_default_config_is_valid() {
        assert!(VisualConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = VisualConfig {
            pulse_amount_base: 0.5,
            pulse_amount_gain: 0.6,
            ..Default::default()
        };
        assert!(VisualMapper::with_config(config).is_err());

        let config = VisualConfig {
            spin_speed_gain: -1.0,
            ..Default::default()
        };
        assert!(VisualMapper::with_config(config).is_err());

        let config = VisualConfig {
            opacity_base: 0.95,
            opacity_gain: 0.1,
            ..Default::default()
        };
        assert!(VisualMapper::with_config(config).is_err());
    }

    #[test]
    fn test_color_extremes() {
        let mapper = VisualMapper::new();
        let calm = mapper.color(1.0);
        let agitated = mapper.color(0.0);

        assert_relative_eq!(calm.h, 0.7);
        assert_relative_eq!(calm.l, 0.8);
        assert_eq!(agitated.h, 0.0);
        assert_relative_eq!(agitated.l, 0.5);
        assert_relative_eq!(calm.s, 0.8);
    }

    #[test]
    fn test_calm_is_cool_agitated_is_warm() {
        let mapper = VisualMapper::new();
        let calm = mapper
            .map_frame(&Drivers::new(1.0, 0.5, 0.5, 0.5), 0.0, 0.0, Rotation::ZERO)
            .color;
        let agitated = mapper
            .map_frame(&Drivers::new(0.0, 0.5, 0.5, 0.5), 0.0, 0.0, Rotation::ZERO)
            .color;

        assert!(calm.b > calm.r);
        assert!(agitated.r > agitated.b);
    }

    #[test]
    fn test_scale_at_rest() {
        let mapper = VisualMapper::new();
        let params = mapper.map_frame(&Drivers::neutral(), 0.0, 0.016, Rotation::ZERO);
        assert_relative_eq!(params.scale, 1.0);
    }

    #[test]
    fn test_scale_peak() {
        let mapper = VisualMapper::new();
        let d = Drivers::new(0.5, 1.0, 0.5, 0.5);
        // speed 5 rad/s, peak at t = pi/10
        let t = std::f64::consts::PI / 10.0;
        let params = mapper.map_frame(&d, t, 0.0, Rotation::ZERO);
        assert_abs_diff_eq!(params.scale, 1.2, epsilon = 1e-9);
    }

    #[test]
    fn test_rotation_delta() {
        let mapper = VisualMapper::new();
        let d = Drivers::new(0.5, 0.5, 1.0, 0.5);
        let params = mapper.map_frame(&d, 1.0, 0.5, Rotation::new(1.0, 2.0));

        assert_relative_eq!(params.rotation_delta.z, 0.5);
        assert_relative_eq!(params.rotation_delta.y, 0.15);
        assert_relative_eq!(params.rotation.z, 2.5);
        assert_relative_eq!(params.rotation.y, 1.15);
    }

    #[test]
    fn test_baseline_spin_at_zero_load() {
        let mapper = VisualMapper::new();
        let d = Drivers::new(0.5, 0.5, 0.0, 0.5);
        let params = mapper.map_frame(&d, 0.0, 1.0, Rotation::ZERO);
        assert_relative_eq!(params.rotation_delta.z, 0.3);
    }

    #[test]
    fn test_tilt_independent_of_drivers() {
        let mapper = VisualMapper::new();
        let a = mapper.map_frame(&Drivers::new(0.0, 0.0, 0.0, 0.0), 2.0, 0.0, Rotation::ZERO);
        let b = mapper.map_frame(&Drivers::new(1.0, 1.0, 1.0, 1.0), 2.0, 0.0, Rotation::ZERO);
        assert_eq!(a.tilt_x, b.tilt_x);
        assert_relative_eq!(a.tilt_x, 1.0f64.sin() * 0.2);
    }

    #[test]
    fn test_material() {
        let mapper = VisualMapper::new();
        let params = mapper.map_frame(&Drivers::new(1.0, 0.5, 0.5, 1.0), 0.0, 0.0, Rotation::ZERO);
        assert_relative_eq!(params.emissive_intensity, 0.5);
        assert_relative_eq!(params.opacity, 1.0);
        assert!(params.transparent);

        let params = mapper.map_frame(&Drivers::new(0.0, 0.5, 0.5, 0.0), 0.0, 0.0, Rotation::ZERO);
        assert_relative_eq!(params.emissive_intensity, 0.2);
        assert_relative_eq!(params.opacity, 0.9);
    }

    #[test]
    fn test_full_turn_hue_span_rejected() {
        let config = VisualConfig {
            hue_span: 1.0,
            ..Default::default()
        };
        assert!(VisualMapper::with_config(config).is_err());

        let config = VisualConfig {
            hue_span: 0.9,
            ..Default::default()
        };
        let mapper = VisualMapper::with_config(config).unwrap();
        assert!(mapper.color(1.0).h > mapper.color(0.0).h);
    }

    #[test]
    fn test_huge_clock_keeps_scale_finite() {
        let mapper = VisualMapper::new();
        for elapsed in [1e308, -f64::MAX, f64::MAX, -1.316369229592895e308] {
            let params = mapper.map_frame(&Drivers::neutral(), elapsed, 0.016, Rotation::ZERO);
            assert!(params.scale.is_finite(), "scale at {elapsed}");
            assert!(params.scale > 0.0 && params.scale < 2.0);
            assert!(params.tilt_x.is_finite() && params.tilt_x.abs() <= 0.2);
        }
    }

    #[test]
    fn test_rotation_stays_finite() {
        let mapper = VisualMapper::new();
        let d = Drivers::new(0.5, 0.5, 1.0, 0.5);
        let prior = Rotation::new(f64::MAX, -f64::MAX);
        let params = mapper.map_frame(&d, 1.0, f64::MAX, prior);

        assert!(params.rotation.y.is_finite() && params.rotation.y.abs() < TAU);
        assert!(params.rotation.z.is_finite() && params.rotation.z.abs() < TAU);
    }

    #[test]
    fn test_rotation_wraps_at_full_turn() {
        let mapper = VisualMapper::new();
        let d = Drivers::new(0.5, 0.5, 1.0, 0.5);
        let params = mapper.map_frame(&d, 0.0, 0.5, Rotation::new(0.0, TAU - 0.25));
        assert_abs_diff_eq!(params.rotation.z, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_malformed_input_is_defused() {
        let mapper = VisualMapper::new();
        let bad = Drivers {
            emotional_balance: f64::NAN,
            energy_level: 40.0,
            cognitive_load: -3.0,
            stress_level: f64::INFINITY,
        };
        let params = mapper.map_frame(&bad, f64::NAN, -1.0, Rotation::new(f64::NAN, 0.0));

        assert!(params.scale > 0.0);
        assert_eq!(params.rotation_delta, Rotation::ZERO);
        assert_eq!(params.rotation, Rotation::ZERO);
        assert!(params.opacity <= 1.0);
        assert!(params.color.r.is_finite());
        assert!(params.tilt_x.is_finite());
    }
}

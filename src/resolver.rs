//! Metric resolution: raw backend documents to bounded drivers.
//!
//! Each driver has an ordered list of candidate fields. The first candidate
//! carrying a real number wins; `0` counts as a real number. When no
//! candidate is present the driver takes the neutral value, which is already
//! in driver space and is not rescaled.

use crate::drivers::{Drivers, NEUTRAL};
use crate::error::{MindtwinError, Result};
use crate::raw::RawMetrics;

/// Default upstream scale (producers emit 0-10).
pub const DEFAULT_MAX_SCALE: f64 = 10.0;

/// Where to look for a value in a [`RawMetrics`] document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// A scalar field.
    Field(&'static str),
    /// The first element of a sequence field.
    FirstOf(&'static str),
}

impl Candidate {
    fn lookup(&self, raw: &RawMetrics) -> Option<f64> {
        match *self {
            Candidate::Field(key) => raw.number(key),
            Candidate::FirstOf(key) => raw.first_of(key),
        }
    }

    /// Field name this candidate reads.
    pub fn key(&self) -> &'static str {
        match *self {
            Candidate::Field(key) | Candidate::FirstOf(key) => key,
        }
    }
}

/// Candidates for `emotionalBalance`.
pub const EMOTIONAL_BALANCE: &[Candidate] = &[
    Candidate::Field("emotionalBalance"),
    Candidate::Field("emotionalStability"),
];

/// Candidates for `energyLevel`.
pub const ENERGY_LEVEL: &[Candidate] = &[
    Candidate::Field("energyLevel"),
    Candidate::FirstOf("energyTrend"),
];

/// Candidates for `cognitiveLoad`.
pub const COGNITIVE_LOAD: &[Candidate] = &[
    Candidate::Field("cognitiveLoad"),
    Candidate::Field("cognitiveLoadAvg"),
];

/// Candidates for `stressLevel`.
pub const STRESS_LEVEL: &[Candidate] = &[
    Candidate::Field("stressLevel"),
    Candidate::Field("averageStress"),
];

/// First present value among `candidates`, in order.
pub fn first_present(raw: &RawMetrics, candidates: &[Candidate]) -> Option<f64> {
    candidates.iter().find_map(|c| c.lookup(raw))
}

/// Resolver configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverConfig {
    /// Upstream maximum; resolved values are divided by this.
    pub max_scale: f64,
    /// Driver value used when no candidate is present.
    pub neutral: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_scale: DEFAULT_MAX_SCALE,
            neutral: NEUTRAL,
        }
    }
}

impl ResolverConfig {
    /// Configuration for producers that already emit `[0, 1]`.
    pub fn unit_scale() -> Self {
        Self {
            max_scale: 1.0,
            ..Default::default()
        }
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.max_scale.is_finite() || self.max_scale <= 0.0 {
            return Err(MindtwinError::invalid(
                "max_scale",
                self.max_scale,
                "must be finite and positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.neutral) {
            return Err(MindtwinError::invalid(
                "neutral",
                self.neutral,
                "must lie in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Turns raw metrics documents into [`Drivers`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricResolver {
    config: ResolverConfig,
}

impl MetricResolver {
    /// Create a resolver with the default 0-10 scale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with a custom configuration.
    pub fn with_config(config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve all four drivers.
    pub fn resolve(&self, raw: &RawMetrics) -> Drivers {
        Drivers {
            emotional_balance: self.resolve_one(raw, EMOTIONAL_BALANCE),
            energy_level: self.resolve_one(raw, ENERGY_LEVEL),
            cognitive_load: self.resolve_one(raw, COGNITIVE_LOAD),
            stress_level: self.resolve_one(raw, STRESS_LEVEL),
        }
    }

    /// Resolve a fetch outcome. A failed fetch yields the neutral drivers.
    pub fn resolve_or_neutral<E>(&self, fetched: std::result::Result<RawMetrics, E>) -> Drivers {
        match fetched {
            Ok(raw) => self.resolve(&raw),
            Err(_) => self.neutral(),
        }
    }

    /// Drivers with every field at the configured neutral value.
    pub fn neutral(&self) -> Drivers {
        let n = self.config.neutral;
        Drivers {
            emotional_balance: n,
            energy_level: n,
            cognitive_load: n,
            stress_level: n,
        }
    }

    /// Resolve a single driver from its candidate list.
    pub fn resolve_one(&self, raw: &RawMetrics, candidates: &[Candidate]) -> f64 {
        match first_present(raw, candidates) {
            Some(value) => self.normalize(value),
            None => {
                #[cfg(feature = "logging")]
                log::debug!(
                    "no value for {:?}, using neutral {}",
                    candidates.first().map(Candidate::key),
                    self.config.neutral
                );
                self.config.neutral
            }
        }
    }

    /// `clamp(value / max_scale, 0, 1)`.
    pub fn normalize(&self, value: f64) -> f64 {
        let scaled = value / self.config.max_scale;
        if scaled.is_nan() {
            self.config.neutral
        } else {
            scaled.clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_is_present() {
        let resolver = MetricResolver::new();
        let raw = RawMetrics::new()
            .with("stressLevel", 0.0)
            .with("averageStress", 8.0);
        assert_eq!(resolver.resolve(&raw).stress_level, 0.0);
    }

    #[test]
    fn test_falls_back_to_secondary() {
        let resolver = MetricResolver::new();
        let raw = RawMetrics::new().with("averageStress", 8.0);
        assert_relative_eq!(resolver.resolve(&raw).stress_level, 0.8);
    }

    #[test]
    fn test_empty_is_neutral() {
        let resolver = MetricResolver::new();
        assert_eq!(resolver.resolve(&RawMetrics::new()), Drivers::neutral());
    }

    #[test]
    fn test_energy_trend_first_element() {
        let resolver = MetricResolver::new();
        let raw = RawMetrics::new().with_sequence("energyTrend", &[3.0, 9.0]);
        assert_relative_eq!(resolver.resolve(&raw).energy_level, 0.3);

        let raw = RawMetrics::new().with_sequence("energyTrend", &[]);
        assert_eq!(resolver.resolve(&raw).energy_level, NEUTRAL);
    }

    #[test]
    fn test_all_secondary_fields() {
        let resolver = MetricResolver::new();
        let raw = RawMetrics::new()
            .with("emotionalStability", 7.0)
            .with_sequence("energyTrend", &[2.0])
            .with("cognitiveLoadAvg", 4.0)
            .with("averageStress", 6.0);
        let d = resolver.resolve(&raw);

        assert_relative_eq!(d.emotional_balance, 0.7);
        assert_relative_eq!(d.energy_level, 0.2);
        assert_relative_eq!(d.cognitive_load, 0.4);
        assert_relative_eq!(d.stress_level, 0.6);
    }

    #[test]
    fn test_primary_wins_over_secondary() {
        let resolver = MetricResolver::new();
        let raw = RawMetrics::new()
            .with("emotionalBalance", 2.0)
            .with("emotionalStability", 9.0);
        assert_relative_eq!(resolver.resolve(&raw).emotional_balance, 0.2);
    }

    #[test]
    fn test_null_primary_falls_through() {
        let resolver = MetricResolver::new();
        let raw = RawMetrics::from_json(r#"{"cognitiveLoad": null, "cognitiveLoadAvg": 5}"#).unwrap();
        assert_relative_eq!(resolver.resolve(&raw).cognitive_load, 0.5);
    }

    #[test]
    fn test_out_of_range_clamps() {
        let resolver = MetricResolver::new();
        let raw = RawMetrics::new()
            .with("emotionalBalance", -4.0)
            .with("energyLevel", 250.0);
        let d = resolver.resolve(&raw);
        assert_eq!(d.emotional_balance, 0.0);
        assert_eq!(d.energy_level, 1.0);
    }

    #[test]
    fn test_failed_fetch_is_neutral() {
        let resolver = MetricResolver::new();
        let failed: std::result::Result<RawMetrics, &str> = Err("connection refused");
        assert_eq!(resolver.resolve_or_neutral(failed), Drivers::neutral());
    }

    #[test]
    fn test_unit_scale() {
        let resolver = MetricResolver::with_config(ResolverConfig::unit_scale()).unwrap();
        let raw = RawMetrics::new().with("stressLevel", 0.35);
        assert_relative_eq!(resolver.resolve(&raw).stress_level, 0.35);
    }

    #[test]
    fn test_invalid_config() {
        for max_scale in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let config = ResolverConfig {
                max_scale,
                ..Default::default()
            };
            assert!(MetricResolver::with_config(config).is_err());
        }

        let config = ResolverConfig {
            neutral: 1.5,
            ..Default::default()
        };
        assert!(MetricResolver::with_config(config).is_err());
    }

    #[test]
    fn test_candidate_keys() {
        assert_eq!(ENERGY_LEVEL[1].key(), "energyTrend");
        assert_eq!(STRESS_LEVEL[0].key(), "stressLevel");
    }
}

//! # MindTwin - patient metrics to brain visualization
//!
//! Turns loosely-typed patient metrics documents into four bounded drivers
//! and maps those drivers to per-frame render parameters for a 3D brain
//! visualization.
//!
//! ## Key Features
//!
//! - **Fallback resolution**: ordered candidate fields per driver, nullish
//!   (not falsy) presence, neutral default
//! - **Normalization**: 0-10 upstream scale to `[0, 1]`, always clamped
//! - **Deterministic frames**: color, pulse, spin, tilt and material as a
//!   pure function of drivers and time
//! - **Atomic publication**: whole-snapshot handoff between the poller and
//!   the frame loop
//!
//! ## Quick Start
//!
//! ```rust
//! use mindtwin::{Animator, MetricResolver, RawMetrics};
//!
//! let resolver = MetricResolver::new();
//! let raw = RawMetrics::from_json(r#"{"averageStress": 8, "energyTrend": [4, 6]}"#).unwrap();
//! let drivers = resolver.resolve(&raw);
//! assert!((drivers.stress_level - 0.8).abs() < 1e-9);
//! assert_eq!(drivers.emotional_balance, 0.5);
//!
//! let mut animator = Animator::default();
//! let frame = animator.tick(&drivers, 1.0 / 60.0);
//! assert!(frame.scale > 0.0);
//! assert!(frame.opacity >= 0.9);
//! ```
//!
//! ## Modules
//!
//! - [`raw`]: Raw metrics documents
//! - [`drivers`]: The four drivers and the publication cell
//! - [`resolver`]: Candidate fallback and normalization
//! - [`visual`]: Per-frame mapping
//! - [`animation`]: Frame-over-frame state
//! - [`color`]: HSL/RGB conversion

// Modules
pub mod animation;
pub mod color;
pub mod drivers;
pub mod error;
pub mod raw;
pub mod resolver;
pub mod visual;

// Re-exports for convenient access
pub use animation::{Animator, AnimatorConfig};
pub use color::{Hsl, Rgb};
pub use drivers::{DriverCell, Drivers, NEUTRAL};
pub use error::{MindtwinError, Result};
pub use raw::RawMetrics;
pub use resolver::{Candidate, MetricResolver, ResolverConfig, DEFAULT_MAX_SCALE};
pub use visual::{RenderParams, Rotation, VisualConfig, VisualMapper};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default metrics refresh period in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

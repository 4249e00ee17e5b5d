//! The four normalized visualization drivers and their publication cell.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Neutral midpoint substituted for any driver with no source data.
pub const NEUTRAL: f64 = 0.5;

/// Four bounded scalars driving the brain visualization.
///
/// Every field lies in `[0, 1]`. Construct through [`Drivers::new`] (which
/// clamps) or [`Drivers::neutral`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drivers {
    /// 0 = agitated, 1 = calm/positive
    pub emotional_balance: f64,
    /// 0 = depleted, 1 = high energy
    pub energy_level: f64,
    /// 0 = minimal load, 1 = maximal load
    pub cognitive_load: f64,
    /// 0 = relaxed, 1 = maximally stressed
    pub stress_level: f64,
}

impl Drivers {
    /// Create drivers, clamping each value into `[0, 1]`.
    pub fn new(emotional_balance: f64, energy_level: f64, cognitive_load: f64, stress_level: f64) -> Self {
        Self {
            emotional_balance,
            energy_level,
            cognitive_load,
            stress_level,
        }
        .clamped()
    }

    /// All four drivers at the neutral midpoint.
    pub const fn neutral() -> Self {
        Self {
            emotional_balance: NEUTRAL,
            energy_level: NEUTRAL,
            cognitive_load: NEUTRAL,
            stress_level: NEUTRAL,
        }
    }

    /// Copy with every field clamped into `[0, 1]`; NaN becomes neutral.
    pub fn clamped(self) -> Self {
        Self {
            emotional_balance: unit(self.emotional_balance),
            energy_level: unit(self.energy_level),
            cognitive_load: unit(self.cognitive_load),
            stress_level: unit(self.stress_level),
        }
    }

    /// Check that every field is inside `[0, 1]`.
    pub fn is_bounded(&self) -> bool {
        [
            self.emotional_balance,
            self.energy_level,
            self.cognitive_load,
            self.stress_level,
        ]
        .iter()
        .all(|v| (0.0..=1.0).contains(v))
    }

    /// Percentages for display overlays, rounded to whole numbers.
    pub fn percentages(&self) -> [u8; 4] {
        [
            self.emotional_balance,
            self.energy_level,
            self.cognitive_load,
            self.stress_level,
        ]
        .map(|v| (unit(v) * 100.0).round() as u8)
    }
}

impl Default for Drivers {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Clamp into `[0, 1]`. NaN maps to the neutral midpoint.
pub(crate) fn unit(value: f64) -> f64 {
    if value.is_nan() {
        NEUTRAL
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Shared slot holding the latest complete [`Drivers`] snapshot.
///
/// The poller publishes whole values and the frame loop reads whole values,
/// so a frame sees either the previous snapshot or the new one.
#[derive(Debug)]
pub struct DriverCell {
    current: RwLock<Drivers>,
    generation: AtomicU64,
}

impl DriverCell {
    /// Create a cell holding `initial`.
    pub fn new(initial: Drivers) -> Self {
        Self {
            current: RwLock::new(initial.clamped()),
            generation: AtomicU64::new(0),
        }
    }

    /// Replace the snapshot. Returns the new generation.
    pub fn publish(&self, drivers: Drivers) -> u64 {
        let drivers = drivers.clamped();
        let mut slot = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = drivers;
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Copy out the latest snapshot.
    pub fn snapshot(&self) -> Drivers {
        *self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of publications so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl Default for DriverCell {
    fn default() -> Self {
        Self::new(Drivers::neutral())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_neutral() {
        let d = Drivers::neutral();
        assert_eq!(d, Drivers::new(0.5, 0.5, 0.5, 0.5));
        assert_eq!(Drivers::default(), d);
    }

    #[test]
    fn test_new_clamps() {
        let d = Drivers::new(-3.0, 7.0, f64::NAN, f64::INFINITY);
        assert_eq!(d.emotional_balance, 0.0);
        assert_eq!(d.energy_level, 1.0);
        assert_eq!(d.cognitive_load, NEUTRAL);
        assert_eq!(d.stress_level, 1.0);
        assert!(d.is_bounded());
    }

    #[test]
    fn test_percentages() {
        let d = Drivers::new(0.254, 1.0, 0.0, 0.5);
        assert_eq!(d.percentages(), [25, 100, 0, 50]);
    }

    #[test]
    fn test_serialization_field_names() {
        let json = serde_json::to_string(&Drivers::neutral()).unwrap();
        assert!(json.contains("\"emotionalBalance\""));
        assert!(json.contains("\"stressLevel\""));
    }

    #[test]
    fn test_cell_publish_and_snapshot() {
        let cell = DriverCell::default();
        assert_eq!(cell.generation(), 0);
        assert_eq!(cell.snapshot(), Drivers::neutral());

        let g = cell.publish(Drivers::new(0.1, 0.2, 0.3, 0.4));
        assert_eq!(g, 1);
        assert_eq!(cell.snapshot(), Drivers::new(0.1, 0.2, 0.3, 0.4));
    }

    #[test]
    fn test_cell_never_yields_mixed_snapshot() {
        let cell = Arc::new(DriverCell::new(Drivers::new(0.0, 0.0, 0.0, 0.0)));
        let writer = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                for i in 0..2000 {
                    let v = if i % 2 == 0 { 1.0 } else { 0.0 };
                    cell.publish(Drivers::new(v, v, v, v));
                }
            })
        };

        for _ in 0..2000 {
            let d = cell.snapshot();
            assert_eq!(d.emotional_balance, d.energy_level);
            assert_eq!(d.energy_level, d.cognitive_load);
            assert_eq!(d.cognitive_load, d.stress_level);
        }

        writer.join().unwrap();
        assert_eq!(cell.generation(), 2000);
    }
}

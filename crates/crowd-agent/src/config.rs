use std::f64::consts::FRAC_PI_4;

/// Tuning for direction requests.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BehaviorConfig {
    /// Minimum angular divergence (radians) between the held orientation and
    /// the flow-field suggestion before the orientation is replaced.
    pub orientation_threshold: f64,

    /// A last move shorter than this counts as stalled.
    pub stall_distance: f64,

    /// Sway is multiplied by this when stalled.
    pub stall_sway_multiplier: f64,

    /// Sway is drawn uniformly from `[-max_sway, max_sway)`.
    pub max_sway: f64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            orientation_threshold: 0.1,
            stall_distance:        0.05,
            stall_sway_multiplier: 2.5,
            max_sway:              FRAC_PI_4,
        }
    }
}

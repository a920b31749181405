/// Physical parameters of agents.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionConfig {
    /// Agent body radius, in tiles.  Two agents never come closer than
    /// twice this.
    pub radius: f64,

    /// Distance covered per tick at full speed, in tiles.  At most one.
    pub step_size: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self { radius: 0.2, step_size: 0.2 }
    }
}

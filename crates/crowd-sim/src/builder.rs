//! Fluent builder for constructing a [`Sim`].

use crowd_agent::{BehaviorConfig, DestinationSet, PositionStore, RegionMonitor};
use crowd_core::{Circle, GroupId, SimConfig, SimRng};
use crowd_grid::Grid;
use crowd_motion::{MotionConfig, MovementResolver};

use crate::sim::Admission;
use crate::{Group, PauseControl, Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`]: total ticks, seed, tick duration, thread count
/// - [`Grid`]: the venue map
/// - [`DestinationSet`]: destinations, with the exit registered via
///   [`DestinationSet::push_exit`]
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                         |
/// |------------------------|---------------------------------|
/// | `.regions(m)`          | no monitored regions            |
/// | `.entrances(v)`        | none (agents placed manually)   |
/// | `.population(n, g)`    | 0 agents, 1 group               |
/// | `.spawn_per_tick(n)`   | 1                               |
/// | `.reporters(n)`        | every agent reports             |
/// | `.behavior(cfg)`       | `BehaviorConfig::default()`     |
/// | `.motion(cfg)`         | `MotionConfig::default()`       |
/// | `.pause_control(p)`    | a fresh, unpaused gate          |
pub struct SimBuilder {
    config:         SimConfig,
    grid:           Grid,
    destinations:   DestinationSet,
    regions:        RegionMonitor,
    entrances:      Vec<Circle>,
    total_people:   u32,
    total_groups:   u32,
    spawn_per_tick: u32,
    reporter_cap:   Option<u32>,
    behavior:       BehaviorConfig,
    motion:         MotionConfig,
    pause:          PauseControl,
}

impl SimBuilder {
    pub fn new(config: SimConfig, grid: Grid, destinations: DestinationSet) -> Self {
        Self {
            config,
            grid,
            destinations,
            regions:        RegionMonitor::default(),
            entrances:      Vec::new(),
            total_people:   0,
            total_groups:   1,
            spawn_per_tick: 1,
            reporter_cap:   None,
            behavior:       BehaviorConfig::default(),
            motion:         MotionConfig::default(),
            pause:          PauseControl::new(),
        }
    }

    pub fn regions(mut self, regions: RegionMonitor) -> Self {
        self.regions = regions;
        self
    }

    pub fn entrances(mut self, entrances: Vec<Circle>) -> Self {
        self.entrances = entrances;
        self
    }

    /// Admit `total` agents over the run, split round-robin into `groups`.
    pub fn population(mut self, total: u32, groups: u32) -> Self {
        self.total_people = total;
        self.total_groups = groups;
        self
    }

    pub fn spawn_per_tick(mut self, n: u32) -> Self {
        self.spawn_per_tick = n;
        self
    }

    /// Let at most `cap` agents report region transitions.  Reporters are
    /// drawn at random from the admissions so the cap is filled by the time
    /// the whole population is in.
    pub fn reporters(mut self, cap: u32) -> Self {
        self.reporter_cap = Some(cap);
        self
    }

    pub fn behavior(mut self, behavior: BehaviorConfig) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    /// Share an existing gate, e.g. one already handed to a control thread.
    pub fn pause_control(mut self, pause: PauseControl) -> Self {
        self.pause = pause;
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`].  Flow fields are
    /// not built here; call [`Sim::generate_flow_fields`].
    pub fn build(self) -> SimResult<Sim> {
        if self.config.tick_duration_secs == 0 {
            return Err(SimError::Config("tick_duration_secs must be positive".into()));
        }
        if self.total_groups == 0 {
            return Err(SimError::Config("at least one group is required".into()));
        }
        if self.total_people > 0 && self.entrances.is_empty() {
            return Err(SimError::Config(format!("{} people to admit but no entrances", self.total_people)));
        }
        if self.motion.radius <= 0.0 || self.motion.step_size <= 0.0 {
            return Err(SimError::Config("agent radius and step size must be positive".into()));
        }
        if self.motion.step_size > 1.0 {
            return Err(SimError::Config(format!(
                "step size {} exceeds one tile per tick",
                self.motion.step_size
            )));
        }
        if self.destinations.exit().is_none() {
            log::warn!("no exit destination: agents will never leave");
        }

        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimError::Config(format!("thread pool: {e}")))?,
            ),
            None => None,
        };

        let groups = (0..self.total_groups).map(|g| Group::new(GroupId(g))).collect();

        Ok(Sim {
            clock: self.config.make_clock(),
            rng: SimRng::new(self.config.seed),
            config: self.config,
            grid: self.grid,
            destinations: self.destinations,
            regions: self.regions,
            positions: PositionStore::new(),
            groups,
            entrances: self.entrances,
            behavior: self.behavior,
            resolver: MovementResolver::new(self.motion),
            membership: Default::default(),
            admission: Admission {
                total:    self.total_people,
                per_tick: self.spawn_per_tick,
                admitted: 0,
                reporter_cap: self.reporter_cap,
                reporters: 0,
            },
            next_agent: 0,
            pause: self.pause,
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}

//! The `Sim` struct and its tick loop.

use std::time::Instant;

use crowd_agent::{
    AgentError, BehaviorConfig, DecideContext, DestinationSet, Individual, PositionStore, Preferences,
    RegionMonitor, RegionTransition,
};
use crowd_core::{AgentId, AgentRng, Circle, DestinationId, GroupId, SimClock, SimConfig, SimRng, Vec2};
use crowd_grid::{FlowField, FlowFieldBuilder, Grid};
use crowd_motion::{MovementResolver, occupancy};

use crate::{Group, MoveRequest, PauseControl, SPAWN_ATTEMPTS, SimError, SimObserver, SimResult, TickSummary, plan_all, try_spawn};

#[cfg(feature = "fx-hash")]
type AgentMap<V> = rustc_hash::FxHashMap<AgentId, V>;
#[cfg(not(feature = "fx-hash"))]
type AgentMap<V> = std::collections::HashMap<AgentId, V>;

/// How many agents enter, and how fast.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Admission {
    pub total:        u32,
    pub per_tick:     u32,
    pub admitted:     u32,
    /// `None` lets every agent report.
    pub reporter_cap: Option<u32>,
    pub reporters:    u32,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The tick controller.  Owns the venue, the population and the clock.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub config: SimConfig,

    /// Current tick, simulated time, and the position-buffer parity.
    pub clock: SimClock,

    /// Walls, occupancy, hit counts and flow fields.
    pub grid: Grid,

    pub destinations: DestinationSet,
    pub regions:      RegionMonitor,

    /// Double-buffered positions of every live agent.
    pub positions: PositionStore,

    /// The population, partitioned into scheduling groups.
    pub groups: Vec<Group>,

    pub entrances: Vec<Circle>,
    pub behavior:  BehaviorConfig,
    pub resolver:  MovementResolver,

    pub(crate) membership: AgentMap<usize>,
    pub(crate) admission:  Admission,
    pub(crate) rng:        SimRng,
    pub(crate) next_agent: u32,
    pub(crate) pause:      PauseControl,

    #[cfg(feature = "parallel")]
    pub(crate) pool: Option<rayon::ThreadPool>,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick to `config.end_tick()`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer)?;
        }
        log::info!("run finished at {} with {} live agents", self.clock.current_tick, self.agent_count());
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Run one tick, blocking first while paused.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickSummary> {
        self.pause.wait_while_paused();

        let tick = self.clock.current_tick;
        observer.on_tick_start(tick);
        let (summary, transitions) = self.process_tick()?;
        if !transitions.is_empty() {
            observer.on_transitions(tick, &transitions);
        }

        self.clock.advance();

        observer.on_tick_end(tick, &summary);
        let interval = self.config.output_interval_ticks;
        if interval > 0 && tick.0.is_multiple_of(interval) {
            observer.on_snapshot(tick, &self.positions, self.clock.parity());
        }
        Ok(summary)
    }

    /// Build a flow field for every destination that has regions, replacing
    /// any existing ones.  Runs on the Rayon pool with the `parallel`
    /// feature.
    pub fn generate_flow_fields(&mut self) {
        let started = Instant::now();
        let targets: Vec<(DestinationId, Vec<Circle>)> = self
            .destinations
            .iter()
            .filter(|d| !d.regions.is_empty())
            .map(|d| (d.id, d.regions.clone()))
            .collect();

        let fields: Vec<FlowField> = {
            let builder = FlowFieldBuilder::new(&self.grid);

            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                let build = || -> Vec<FlowField> {
                    targets.par_iter().map(|(id, regions)| builder.build(*id, regions)).collect()
                };
                match &self.pool {
                    Some(pool) => pool.install(build),
                    None => build(),
                }
            }

            #[cfg(not(feature = "parallel"))]
            {
                targets.iter().map(|(id, regions)| builder.build(*id, regions)).collect()
            }
        };

        let count = fields.len();
        for field in fields {
            self.grid.flow_fields.insert(field);
        }
        log::info!("generated {count} flow fields in {:.2?}", started.elapsed());
    }

    /// Admit a new agent at `p` with freshly generated preferences.
    pub fn admit_at(&mut self, p: Vec2) -> SimResult<AgentId> {
        let (tx, ty) = p.tile();
        if !self.grid.is_walkable(tx, ty)? {
            return Err(SimError::NotWalkable(p));
        }

        let id = AgentId(self.next_agent);
        self.next_agent += 1;

        let group = id.index() % self.groups.len();
        let mut rng = AgentRng::new(self.config.seed, id);
        let preferences = Preferences::generate(&self.destinations, &mut rng);
        let mut individual = Individual::new(id, GroupId(group as u32), preferences, self.resolver.config.step_size, rng);
        individual.reports = self.pick_reporter();

        self.positions.insert(id, p);
        occupancy::place(&mut self.grid, id, p)?;
        self.groups[group].members.push(individual);
        self.membership.insert(id, group);
        self.admission.admitted += 1;
        Ok(id)
    }

    /// Try to admit one agent at a random entrance.  `Ok(None)` when no
    /// collision-free point was found; the caller retries next tick.
    pub fn spawn_agent(&mut self) -> SimResult<Option<AgentId>> {
        let spot = try_spawn(
            &self.grid,
            &self.positions,
            &self.entrances,
            self.resolver.config.radius,
            SPAWN_ATTEMPTS,
            &mut self.rng,
        );
        spot.map(|p| self.admit_at(p)).transpose()
    }

    /// Reopen a destination.  Returns `true` if it was closed.
    pub fn open_destination(&mut self, id: DestinationId) -> SimResult<bool> {
        let changed = self.destinations.open(id)?;
        if changed {
            log::info!("destination {id} opened");
        }
        Ok(changed)
    }

    /// Close a destination.  Agents heading to or dwelling at it choose
    /// again on their next decision.  Returns `true` if it was open.
    pub fn close_destination(&mut self, id: DestinationId) -> SimResult<bool> {
        let changed = self.destinations.close(id)?;
        if changed {
            log::info!("destination {id} closed");
        }
        Ok(changed)
    }

    /// Handle for pausing the loop from another thread.
    pub fn pause_control(&self) -> PauseControl {
        self.pause.clone()
    }

    /// Agents currently in the venue.
    pub fn agent_count(&self) -> usize {
        self.positions.len()
    }

    /// Agents admitted since the start, including those who have left.
    pub fn admitted(&self) -> u32 {
        self.admission.admitted
    }

    pub fn individual(&self, agent: AgentId) -> Option<&Individual> {
        let &group = self.membership.get(&agent)?;
        self.groups[group].members.iter().find(|m| m.id == agent)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick(&mut self) -> SimResult<(TickSummary, Vec<RegionTransition>)> {
        let tick = self.clock.current_tick;
        let now = self.clock.current_unix_secs();
        let mut summary = TickSummary { tick, unix_secs: now, ..TickSummary::default() };

        // ── Admission ─────────────────────────────────────────────────────
        for _ in 0..self.admission.per_tick {
            if self.admission.admitted >= self.admission.total {
                break;
            }
            if self.spawn_agent()?.is_some() {
                summary.spawned += 1;
            }
        }

        // ── Fan-out / fan-in ──────────────────────────────────────────────
        let requests = self.plan(now)?;

        // ── Movement (sequential, ascending AgentId) ──────────────────────
        let mut transitions = Vec::new();
        for request in requests {
            let moved = self.apply(request, now, &mut transitions)?;
            if moved.distance > 0.0 {
                summary.moved += 1;
            }
            if moved.exited {
                summary.exited += 1;
            }
        }

        summary.live = self.positions.len();
        summary.transitions = transitions.len();
        Ok((summary, transitions))
    }

    fn plan(&mut self, now: i64) -> SimResult<Vec<MoveRequest>> {
        let ctx = DecideContext {
            now,
            parity:       self.clock.parity(),
            grid:         &self.grid,
            destinations: &self.destinations,
            positions:    &self.positions,
            config:       &self.behavior,
        };
        let groups = self.groups.as_mut_slice();

        #[cfg(feature = "parallel")]
        let requests = match &self.pool {
            Some(pool) => pool.install(|| plan_all(groups, &ctx)),
            None => plan_all(groups, &ctx),
        };

        #[cfg(not(feature = "parallel"))]
        let requests = plan_all(groups, &ctx);

        Ok(requests?)
    }

    /// Resolve and commit one move, then run region detection and the exit
    /// check for the mover.
    fn apply(&mut self, request: MoveRequest, now: i64, transitions: &mut Vec<RegionTransition>) -> SimResult<Applied> {
        let agent = request.agent;
        let movement = self.resolver.apply(
            &mut self.grid,
            &mut self.positions,
            agent,
            self.clock.parity(),
            request.heading,
            request.step,
        )?;

        let &group = self.membership.get(&agent).ok_or(AgentError::UnknownAgent(agent))?;
        let individual = self.groups[group].get_mut(agent).ok_or(AgentError::UnknownAgent(agent))?;
        individual.last_move = movement.distance;
        // Non-reporters still track which regions they are in.
        let mut muted = Vec::new();
        let out = if individual.reports { &mut *transitions } else { &mut muted };
        self.regions.update(agent, &mut individual.inside, movement.to, now, out);

        let at_exit = self.destinations.exit().is_some_and(|d| d.contains(movement.to));
        if at_exit {
            self.regions.leave_all(agent, &mut individual.inside, now, out);
            self.remove_agent(agent, movement.to)?;
            log::debug!("{agent} left the venue at {}", movement.to);
        }
        Ok(Applied { distance: movement.distance, exited: at_exit })
    }

    /// Decide whether the agent being admitted reports its transitions.
    /// Each admission takes a free slot with probability
    /// `slots / not yet admitted`, so a capped run fills exactly its cap.
    fn pick_reporter(&mut self) -> bool {
        let Some(cap) = self.admission.reporter_cap else {
            return true;
        };
        let slots = cap.saturating_sub(self.admission.reporters);
        if slots == 0 {
            return false;
        }
        let remaining = self.admission.total.saturating_sub(self.admission.admitted);
        let reports = remaining <= slots || self.rng.gen_range(0..remaining) < slots;
        if reports {
            self.admission.reporters += 1;
        }
        reports
    }

    fn remove_agent(&mut self, agent: AgentId, at: Vec2) -> SimResult<()> {
        if let Some(group) = self.membership.remove(&agent) {
            self.groups[group].remove(agent);
        }
        self.positions.remove(agent);
        occupancy::remove(&mut self.grid, agent, at)?;
        Ok(())
    }
}

struct Applied {
    distance: f64,
    exited:   bool,
}

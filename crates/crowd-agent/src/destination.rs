//! Destinations agents can travel to.

use crowd_core::{AgentRng, Circle, DestinationId, Vec2};

use crate::{AgentError, AgentResult};

// ── EventWindow ───────────────────────────────────────────────────────────────

/// A scheduled event at a destination.  Drives both preference weights
/// (through `popularity`) and dwell time (agents stay until it ends).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventWindow {
    pub name:       String,
    /// Unix seconds, exclusive.
    pub start:      i64,
    /// Unix seconds, exclusive.
    pub end:        i64,
    pub popularity: f64,
}

impl EventWindow {
    /// Strictly after `start` and strictly before `end`.
    #[inline]
    pub fn is_active(&self, t: i64) -> bool {
        self.start < t && t < self.end
    }
}

// ── Destination ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Destination {
    /// Assigned by [`DestinationSet::push`].
    pub id:              DestinationId,
    pub name:            String,
    /// The union of these circles is "inside".
    pub regions:         Vec<Circle>,
    pub open:            bool,
    pub mean_dwell_secs: f64,
    /// Variance of the dwell time, in seconds².
    pub dwell_var_secs:  f64,
    pub events:          Vec<EventWindow>,
}

impl Destination {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id:              DestinationId::INVALID,
            name:            name.into(),
            regions:         Vec::new(),
            open:            true,
            mean_dwell_secs: 0.0,
            dwell_var_secs:  0.0,
            events:          Vec::new(),
        }
    }

    pub fn with_region(mut self, region: Circle) -> Self {
        self.regions.push(region);
        self
    }

    pub fn with_dwell(mut self, mean_secs: f64, var_secs: f64) -> Self {
        self.mean_dwell_secs = mean_secs;
        self.dwell_var_secs = var_secs;
        self
    }

    pub fn with_event(mut self, event: EventWindow) -> Self {
        self.events.push(event);
        self
    }

    /// `true` if `p` lies strictly inside any region.  Always `false` for a
    /// destination without regions.
    pub fn contains(&self, p: Vec2) -> bool {
        self.regions.iter().any(|r| r.contains(p))
    }

    /// Open and has at least one region.
    #[inline]
    pub fn is_selectable(&self) -> bool {
        self.open && !self.regions.is_empty()
    }

    /// Centre of the region closest to `p`.
    pub fn nearest_center(&self, p: Vec2) -> Option<Vec2> {
        self.regions
            .iter()
            .map(|r| r.center)
            .min_by(|a, b| a.distance_sq(p).total_cmp(&b.distance_sq(p)))
    }

    /// The active event at `t` that ends first.
    pub fn next_event_to_end(&self, t: i64) -> Option<&EventWindow> {
        self.events
            .iter()
            .filter(|e| e.is_active(t))
            .min_by_key(|e| e.end)
    }

    /// When an agent arriving at `now` should leave.
    ///
    /// An active event wins: the agent stays until the earliest-ending one
    /// finishes.  Otherwise the dwell is drawn from a normal distribution
    /// around the mean, clamped at zero.
    pub fn leave_time(&self, now: i64, rng: &mut AgentRng) -> i64 {
        if let Some(event) = self.next_event_to_end(now) {
            return event.end;
        }
        let std_dev = self.dwell_var_secs.max(0.0).sqrt();
        let dwell = rng.normal(self.mean_dwell_secs, std_dev).max(0.0);
        now + dwell.round() as i64
    }
}

// ── DestinationSet ────────────────────────────────────────────────────────────

/// All destinations, indexed densely by `DestinationId`.  IDs are assigned in
/// insertion order and never reused.
#[derive(Clone, Debug, Default)]
pub struct DestinationSet {
    list: Vec<Destination>,
    exit: Option<DestinationId>,
}

impl DestinationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a destination and return its new ID.
    pub fn push(&mut self, mut destination: Destination) -> AgentResult<DestinationId> {
        let id = DestinationId::try_from(self.list.len())
            .ok()
            .filter(|id| *id != DestinationId::INVALID)
            .ok_or(AgentError::TooManyDestinations)?;
        destination.id = id;
        self.list.push(destination);
        Ok(id)
    }

    /// Register the exit destination.  It is selectable like any other;
    /// reaching it removes the agent from the simulation.
    pub fn push_exit(&mut self, destination: Destination) -> AgentResult<DestinationId> {
        let id = self.push(destination)?;
        self.exit = Some(id);
        Ok(id)
    }

    #[inline]
    pub fn get(&self, id: DestinationId) -> Option<&Destination> {
        self.list.get(id.index())
    }

    pub fn get_mut(&mut self, id: DestinationId) -> Option<&mut Destination> {
        self.list.get_mut(id.index())
    }

    #[inline]
    pub fn exit(&self) -> Option<&Destination> {
        self.exit.and_then(|id| self.get(id))
    }

    #[inline]
    pub fn exit_id(&self) -> Option<DestinationId> {
        self.exit
    }

    pub fn iter(&self) -> impl Iterator<Item = &Destination> + '_ {
        self.list.iter()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Open `id`.  Returns `true` if it was closed.
    pub fn open(&mut self, id: DestinationId) -> AgentResult<bool> {
        let d = self.get_mut(id).ok_or(AgentError::UnknownDestination(id))?;
        let changed = !d.open;
        d.open = true;
        Ok(changed)
    }

    /// Close `id`.  Returns `true` if it was open.
    pub fn close(&mut self, id: DestinationId) -> AgentResult<bool> {
        let d = self.get_mut(id).ok_or(AgentError::UnknownDestination(id))?;
        let changed = d.open;
        d.open = false;
        Ok(changed)
    }
}

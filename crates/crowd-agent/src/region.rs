//! Monitored regions (geofences) and enter/exit detection.
//!
//! Regions are independent of destinations: they exist to report footfall.
//! Each agent carries an [`InsideSet`] bit per region; after every move the
//! monitor compares the agent's new position against every region and emits
//! a [`RegionTransition`] for each bit that flips.

use crowd_core::{AgentId, Circle, RegionId, Vec2};

// ── Region ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    /// Dense index into the monitor's region list.
    pub id:          RegionId,
    /// Identifier reported to the analytics backend.
    pub external_id: i32,
    /// Backend event this region belongs to.
    pub event_id:    i32,
    pub name:        String,
    pub area:        Circle,
}

// ── InsideSet ─────────────────────────────────────────────────────────────────

/// Growable bitset of "currently inside" flags, indexed by `RegionId`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InsideSet {
    words: Vec<u64>,
}

impl InsideSet {
    #[inline]
    pub fn contains(&self, region: RegionId) -> bool {
        let i = region.index();
        self.words.get(i / 64).is_some_and(|w| w & (1 << (i % 64)) != 0)
    }

    /// Set or clear one flag.  Returns `true` if the flag changed.
    pub fn set(&mut self, region: RegionId, inside: bool) -> bool {
        let i = region.index();
        if self.words.len() <= i / 64 {
            if !inside {
                return false;
            }
            self.words.resize(i / 64 + 1, 0);
        }
        let mask = 1u64 << (i % 64);
        let word = &mut self.words[i / 64];
        let was = *word & mask != 0;
        if inside {
            *word |= mask;
        } else {
            *word &= !mask;
        }
        was != inside
    }

    /// Regions currently flagged, ascending.
    pub fn iter(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &w)| {
            (0..64u32)
                .filter(move |b| w & (1u64 << b) != 0)
                .map(move |b| RegionId((wi * 64) as u32 + b))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }
}

// ── RegionTransition ──────────────────────────────────────────────────────────

/// An agent entering or leaving a monitored region.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionTransition {
    pub agent:       AgentId,
    pub event_id:    i32,
    pub region_id:   i32,
    pub entering:    bool,
    /// Unix seconds.
    pub occurred_at: i64,
}

// ── RegionMonitor ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct RegionMonitor {
    regions: Vec<Region>,
}

impl RegionMonitor {
    /// Build from regions in any order; IDs are reassigned densely.
    pub fn new(regions: Vec<Region>) -> Self {
        let regions = regions
            .into_iter()
            .enumerate()
            .map(|(i, r)| Region { id: RegionId(i as u32), ..r })
            .collect();
        Self { regions }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn find_external(&self, external_id: i32) -> Option<&Region> {
        self.regions.iter().find(|r| r.external_id == external_id)
    }

    fn transition(region: &Region, agent: AgentId, entering: bool, now: i64) -> RegionTransition {
        RegionTransition {
            agent,
            event_id: region.event_id,
            region_id: region.external_id,
            entering,
            occurred_at: now,
        }
    }

    /// Compare `pos` against every region and append a transition for each
    /// region the agent entered or left.
    pub fn update(
        &self,
        agent: AgentId,
        inside: &mut InsideSet,
        pos: Vec2,
        now: i64,
        out: &mut Vec<RegionTransition>,
    ) {
        for region in &self.regions {
            let now_inside = region.area.contains(pos);
            if inside.set(region.id, now_inside) {
                out.push(Self::transition(region, agent, now_inside, now));
            }
        }
    }

    /// Emit an exit for every region the agent is still inside and clear
    /// the set.  Used when the agent leaves the simulation.
    pub fn leave_all(&self, agent: AgentId, inside: &mut InsideSet, now: i64, out: &mut Vec<RegionTransition>) {
        for id in inside.iter() {
            if let Some(region) = self.regions.get(id.index()) {
                out.push(Self::transition(region, agent, false, now));
            }
        }
        inside.clear();
    }
}

//! Scheduling groups and the per-tick fan-out/fan-in.
//!
//! Agents are partitioned into a fixed number of groups when admitted.  Each
//! tick one task per group runs [`Individual::decide`] for every member; the
//! tasks only read the shared world, so they need no locks.  The controller
//! waits for all of them and merges the requests in ascending `AgentId`
//! order so that the sequential movement phase is deterministic however the
//! tasks were scheduled.

use crowd_agent::{AgentResult, DecideContext, Individual};
use crowd_core::{AgentId, GroupId};

/// One agent's request for the movement phase.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MoveRequest {
    pub agent:   AgentId,
    /// `None` to stand still this tick.
    pub heading: Option<f64>,
    pub step:    f64,
}

// ── Group ─────────────────────────────────────────────────────────────────────

pub struct Group {
    pub id:      GroupId,
    pub members: Vec<Individual>,
}

impl Group {
    pub fn new(id: GroupId) -> Self {
        Self { id, members: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get_mut(&mut self, agent: AgentId) -> Option<&mut Individual> {
        self.members.iter_mut().find(|m| m.id == agent)
    }

    /// Remove a member.  Member order is not preserved.
    pub fn remove(&mut self, agent: AgentId) -> Option<Individual> {
        let i = self.members.iter().position(|m| m.id == agent)?;
        Some(self.members.swap_remove(i))
    }

    /// Decide every member's heading for this tick.
    pub fn plan(&mut self, ctx: &DecideContext<'_>) -> AgentResult<Vec<MoveRequest>> {
        self.members
            .iter_mut()
            .map(|m| {
                let heading = m.decide(ctx)?;
                Ok(MoveRequest { agent: m.id, heading, step: m.step_size })
            })
            .collect()
    }
}

// ── Fan-out / fan-in ──────────────────────────────────────────────────────────

/// Run every group's [`Group::plan`] and return all requests sorted by
/// agent.  With the `parallel` feature the groups run on the current Rayon
/// pool; the call returns only once every group has finished.
pub fn plan_all(groups: &mut [Group], ctx: &DecideContext<'_>) -> AgentResult<Vec<MoveRequest>> {
    #[cfg(not(feature = "parallel"))]
    let per_group: Vec<Vec<MoveRequest>> = groups
        .iter_mut()
        .map(|g| g.plan(ctx))
        .collect::<AgentResult<_>>()?;

    #[cfg(feature = "parallel")]
    let per_group: Vec<Vec<MoveRequest>> = {
        use rayon::prelude::*;
        groups
            .par_iter_mut()
            .map(|g| g.plan(ctx))
            .collect::<AgentResult<_>>()?
    };

    let mut requests: Vec<MoveRequest> = per_group.into_iter().flatten().collect();
    requests.sort_unstable_by_key(|r| r.agent);
    Ok(requests)
}

//! Per-agent destination preferences and weighted sampling.
//!
//! Every agent holds one [`Preference`] per destination: a weight for each
//! of the destination's event windows.  The weight at time `t` is the
//! largest weight among windows active at `t`, or 0 when none is.

use crowd_core::{AgentRng, DestinationId};

use crate::{DestinationSet, EventWindow};

/// Scale applied to `popularity · U(0, 1)` when generating window weights.
const WEIGHT_SCALE: f64 = 20.0;

// ── Preference ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Preference {
    pub destination: DestinationId,
    /// `(start, end, weight)` with exclusive bounds in Unix seconds.
    pub windows: Vec<(i64, i64, f64)>,
}

impl Preference {
    /// Draw a random weight for each of the destination's events.
    pub fn generate(destination: DestinationId, events: &[EventWindow], rng: &mut AgentRng) -> Self {
        let windows = events
            .iter()
            .map(|e| (e.start, e.end, e.popularity * rng.unit() * WEIGHT_SCALE))
            .collect();
        Self { destination, windows }
    }

    pub fn weight_at(&self, t: i64) -> f64 {
        self.windows
            .iter()
            .filter(|(start, end, _)| *start < t && t < *end)
            .map(|&(_, _, w)| w)
            .fold(0.0, f64::max)
    }
}

// ── Preferences ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Preferences(pub Vec<Preference>);

impl Preferences {
    /// One randomly weighted preference per destination.
    pub fn generate(destinations: &DestinationSet, rng: &mut AgentRng) -> Self {
        Preferences(
            destinations
                .iter()
                .map(|d| Preference::generate(d.id, &d.events, rng))
                .collect(),
        )
    }

    /// Pick a destination for time `t` among the currently selectable ones.
    /// Returns `None` when nothing is selectable.
    pub fn choose(&self, t: i64, destinations: &DestinationSet, rng: &mut AgentRng) -> Option<DestinationId> {
        let candidates: Vec<(DestinationId, f64)> = self
            .0
            .iter()
            .filter(|p| destinations.get(p.destination).is_some_and(|d| d.is_selectable()))
            .map(|p| (p.destination, p.weight_at(t)))
            .collect();
        sample_destination(&candidates, rng.unit())
    }
}

// ── Sampling ──────────────────────────────────────────────────────────────────

/// Weighted choice with one uniform draw `u ∈ [0, 1)`.
///
/// Weights are normalised to sum to 1 and the first candidate whose
/// cumulative weight strictly exceeds `u` wins, so zero-weight candidates are
/// never picked.  A zero (or non-finite) total selects the first candidate;
/// a floating-point shortfall at the top of the range selects the last
/// candidate with positive weight.
pub fn sample_destination(candidates: &[(DestinationId, f64)], u: f64) -> Option<DestinationId> {
    let (first, _) = *candidates.first()?;

    let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let total: f64 = candidates.iter().map(|&(_, w)| clean(w)).sum();
    if total <= 0.0 || !total.is_finite() {
        return Some(first);
    }

    let mut cumulative = 0.0;
    for &(id, w) in candidates {
        cumulative += clean(w) / total;
        if u < cumulative {
            return Some(id);
        }
    }
    candidates.iter().rev().find(|&&(_, w)| clean(w) > 0.0).map(|&(id, _)| id)
}

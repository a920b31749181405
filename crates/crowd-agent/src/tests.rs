//! Unit tests for crowd-agent.

#[cfg(test)]
mod helpers {
    use crowd_core::{AgentId, AgentRng, Circle, DestinationId, GroupId, Vec2};
    use crowd_grid::{FlowFieldBuilder, Grid};

    use crate::{Destination, DestinationSet, Individual, Preference, Preferences};

    /// 5×5 open floor with two destinations: `d0` on tile (4, 2) with a
    /// 60 s dwell and a flow field, `d1` on tile (0, 4) with no flow field.
    pub fn world() -> (Grid, DestinationSet, DestinationId, DestinationId) {
        let mut grid = Grid::parse(".....\n.....\n.....\n.....\n.....\n").unwrap();
        let mut dests = DestinationSet::new();
        let d0 = dests
            .push(
                Destination::new("stage")
                    .with_region(Circle::new(Vec2::tile_center(4, 2), 0.5))
                    .with_dwell(60.0, 0.0),
            )
            .unwrap();
        let d1 = dests
            .push(Destination::new("bar").with_region(Circle::new(Vec2::tile_center(0, 4), 0.5)))
            .unwrap();
        let field = FlowFieldBuilder::new(&grid).build(d0, &dests.get(d0).unwrap().regions);
        grid.flow_fields.insert(field);
        (grid, dests, d0, d1)
    }

    /// Zero weights everywhere, so the first selectable destination wins.
    pub fn flat_preferences(dests: &DestinationSet) -> Preferences {
        Preferences(
            dests
                .iter()
                .map(|d| Preference { destination: d.id, windows: Vec::new() })
                .collect(),
        )
    }

    /// Always prefers `favourite`.
    pub fn favour(dests: &DestinationSet, favourite: DestinationId) -> Preferences {
        Preferences(
            dests
                .iter()
                .map(|d| {
                    let windows = if d.id == favourite { vec![(i64::MIN, i64::MAX, 1.0)] } else { Vec::new() };
                    Preference { destination: d.id, windows }
                })
                .collect(),
        )
    }

    pub fn individual(prefs: Preferences) -> Individual {
        Individual::new(AgentId(0), GroupId(0), prefs, 0.2, AgentRng::new(7, AgentId(0)))
    }
}

// ── Position ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod position {
    use crowd_core::{AgentId, Parity, SimClock, Vec2};

    use crate::{AgentError, Position, PositionStore};

    #[test]
    fn writes_are_invisible_until_the_flip() {
        let mut store = PositionStore::new();
        let a = AgentId(0);
        store.insert(a, Vec2::new(1.0, 1.0));

        let mut clock = SimClock::new(0, 1);
        store.write(a, clock.parity(), Vec2::new(2.0, 1.0)).unwrap();
        assert_eq!(store.committed(a, clock.parity()).unwrap(), Vec2::new(1.0, 1.0));
        assert_eq!(store.latest(a).unwrap(), Vec2::new(2.0, 1.0));

        clock.advance();
        assert_eq!(store.committed(a, clock.parity()).unwrap(), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn one_write_per_tick_keeps_slots_in_step() {
        let mut p = Position::new(Vec2::ZERO);
        let mut parity = Parity::A;
        for i in 1..=5 {
            let next = Vec2::new(i as f64, 0.0);
            p.write(parity, next);
            assert_eq!(p.read_committed(parity), Vec2::new((i - 1) as f64, 0.0));
            parity = parity.other();
            assert_eq!(p.read_committed(parity), next);
            assert_eq!(p.read_latest(), next);
        }
    }

    #[test]
    fn fresh_position_is_valid_under_both_parities() {
        let p = Position::new(Vec2::new(3.0, 4.0));
        assert_eq!(p.read_committed(Parity::A), p.read_committed(Parity::B));
    }

    #[test]
    fn removal_leaves_hole_and_ids_are_not_shifted() {
        let mut store = PositionStore::new();
        for i in 0..3 {
            store.insert(AgentId(i), Vec2::new(i as f64, 0.0));
        }
        assert!(store.remove(AgentId(1)).is_some());
        assert!(store.remove(AgentId(1)).is_none());
        assert_eq!(store.len(), 2);
        assert_eq!(store.agent_ids().collect::<Vec<_>>(), vec![AgentId(0), AgentId(2)]);
        assert_eq!(store.latest(AgentId(2)).unwrap(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn unknown_agent_is_an_error() {
        let mut store = PositionStore::new();
        assert!(matches!(store.committed(AgentId(9), Parity::A), Err(AgentError::UnknownAgent(AgentId(9)))));
        assert!(store.write(AgentId(9), Parity::A, Vec2::ZERO).is_err());
    }
}

// ── Preferences ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod preference {
    use crowd_core::{AgentId, AgentRng, DestinationId};

    use crate::{EventWindow, Preference, sample_destination};

    const D0: DestinationId = DestinationId(0);
    const D1: DestinationId = DestinationId(1);
    const D2: DestinationId = DestinationId(2);

    #[test]
    fn zero_weight_is_never_picked() {
        for u in [0.0, 0.3, 0.999_999] {
            assert_eq!(sample_destination(&[(D0, 0.0), (D1, 1.0)], u), Some(D1));
        }
    }

    #[test]
    fn all_zero_weights_pick_first() {
        assert_eq!(sample_destination(&[(D0, 0.0), (D1, 0.0)], 0.7), Some(D0));
    }

    #[test]
    fn empty_candidates_pick_nothing() {
        assert_eq!(sample_destination(&[], 0.5), None);
    }

    #[test]
    fn cumulative_boundaries() {
        let c = [(D0, 1.0), (D1, 1.0), (D2, 2.0)];
        assert_eq!(sample_destination(&c, 0.0), Some(D0));
        assert_eq!(sample_destination(&c, 0.24), Some(D0));
        assert_eq!(sample_destination(&c, 0.25), Some(D1));
        assert_eq!(sample_destination(&c, 0.5), Some(D2));
        assert_eq!(sample_destination(&c, 0.999_999_999), Some(D2));
    }

    #[test]
    fn shortfall_falls_back_to_last_positive() {
        assert_eq!(sample_destination(&[(D0, 1.0), (D1, 1.0), (D2, 0.0)], 1.0), Some(D1));
    }

    #[test]
    fn weight_is_max_of_active_windows() {
        let p = Preference { destination: D0, windows: vec![(0, 10, 3.0), (5, 20, 7.0)] };
        assert_eq!(p.weight_at(0), 0.0);
        assert_eq!(p.weight_at(3), 3.0);
        assert_eq!(p.weight_at(7), 7.0);
        assert_eq!(p.weight_at(15), 7.0);
        assert_eq!(p.weight_at(20), 0.0);
    }

    #[test]
    fn generated_weights_scale_with_popularity() {
        let events = [
            EventWindow { name: "gig".into(), start: 0, end: 100, popularity: 1.0 },
            EventWindow { name: "none".into(), start: 0, end: 100, popularity: 0.0 },
        ];
        let mut rng = AgentRng::new(1, AgentId(3));
        let p = Preference::generate(D0, &events, &mut rng);
        assert_eq!(p.windows.len(), 2);
        assert!((0.0..20.0).contains(&p.windows[0].2));
        assert_eq!(p.windows[1].2, 0.0);
    }
}

// ── Destinations ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod destination {
    use crowd_core::{AgentId, AgentRng, Circle, DestinationId, Vec2};

    use crate::{AgentError, Destination, DestinationSet, EventWindow};

    fn rng() -> AgentRng {
        AgentRng::new(42, AgentId(0))
    }

    #[test]
    fn ids_follow_insertion_order() {
        let mut set = DestinationSet::new();
        let a = set.push(Destination::new("a")).unwrap();
        let exit = set.push_exit(Destination::new("exit")).unwrap();
        assert_eq!((a, exit), (DestinationId(0), DestinationId(1)));
        assert_eq!(set.exit_id(), Some(exit));
        assert_eq!(set.exit().unwrap().name, "exit");
    }

    #[test]
    fn open_close_report_change() {
        let mut set = DestinationSet::new();
        let a = set.push(Destination::new("a")).unwrap();
        assert!(!set.open(a).unwrap());
        assert!(set.close(a).unwrap());
        assert!(!set.close(a).unwrap());
        assert!(set.open(a).unwrap());
        assert!(matches!(set.close(DestinationId(5)), Err(AgentError::UnknownDestination(_))));
    }

    #[test]
    fn selectable_needs_open_and_a_region() {
        let mut d = Destination::new("a");
        assert!(!d.is_selectable());
        d = d.with_region(Circle::new(Vec2::new(1.0, 1.0), 1.0));
        assert!(d.is_selectable());
        d.open = false;
        assert!(!d.is_selectable());
    }

    #[test]
    fn active_event_sets_leave_time() {
        let d = Destination::new("a")
            .with_dwell(10.0, 100.0)
            .with_event(EventWindow { name: "late".into(), start: 0, end: 500, popularity: 1.0 })
            .with_event(EventWindow { name: "early".into(), start: 0, end: 300, popularity: 1.0 });
        assert_eq!(d.leave_time(50, &mut rng()), 300);
    }

    #[test]
    fn event_bounds_are_exclusive() {
        let d = Destination::new("a")
            .with_dwell(5.0, 0.0)
            .with_event(EventWindow { name: "e".into(), start: 100, end: 200, popularity: 1.0 });
        assert_eq!(d.leave_time(100, &mut rng()), 105);
        assert_eq!(d.leave_time(200, &mut rng()), 205);
        assert_eq!(d.leave_time(150, &mut rng()), 200);
    }

    #[test]
    fn zero_variance_dwell_is_the_mean() {
        let d = Destination::new("a").with_dwell(90.0, 0.0);
        assert_eq!(d.leave_time(1_000, &mut rng()), 1_090);
    }

    #[test]
    fn dwell_is_never_negative() {
        let d = Destination::new("a").with_dwell(-50.0, 1.0);
        let mut r = rng();
        for _ in 0..50 {
            assert!(d.leave_time(1_000, &mut r) >= 1_000);
        }
    }

    #[test]
    fn nearest_center_picks_closest_region() {
        let d = Destination::new("a")
            .with_region(Circle::new(Vec2::new(10.0, 0.0), 1.0))
            .with_region(Circle::new(Vec2::new(2.0, 0.0), 1.0));
        assert_eq!(d.nearest_center(Vec2::ZERO), Some(Vec2::new(2.0, 0.0)));
        assert!(d.contains(Vec2::new(2.5, 0.0)));
        assert!(!d.contains(Vec2::new(3.0, 0.0)));
    }
}

// ── Regions ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod region {
    use crowd_core::{AgentId, Circle, RegionId, Vec2};

    use crate::{InsideSet, Region, RegionMonitor};

    fn monitor() -> RegionMonitor {
        let region = |external_id, x| Region {
            id: RegionId::INVALID,
            external_id,
            event_id: 9,
            name: format!("r{external_id}"),
            area: Circle::new(Vec2::new(x, 0.0), 1.0),
        };
        RegionMonitor::new(vec![region(101, 0.0), region(202, 1.5)])
    }

    #[test]
    fn inside_set_grows_past_one_word() {
        let mut s = InsideSet::default();
        assert!(s.is_empty());
        assert!(!s.set(RegionId(130), false));
        assert!(s.set(RegionId(130), true));
        assert!(!s.set(RegionId(130), true));
        assert!(s.set(RegionId(3), true));
        assert!(s.contains(RegionId(130)));
        assert!(!s.contains(RegionId(64)));
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![RegionId(3), RegionId(130)]);
        assert!(s.set(RegionId(3), false));
        assert!(!s.is_empty());
    }

    #[test]
    fn ids_are_reassigned_densely() {
        let m = monitor();
        assert_eq!(m.regions()[1].id, RegionId(1));
        assert_eq!(m.find_external(202).unwrap().id, RegionId(1));
        assert!(m.find_external(7).is_none());
    }

    #[test]
    fn enter_then_leave_emits_one_transition_each() {
        let m = monitor();
        let agent = AgentId(4);
        let mut inside = InsideSet::default();
        let mut out = Vec::new();

        m.update(agent, &mut inside, Vec2::new(-3.0, 0.0), 10, &mut out);
        assert!(out.is_empty());

        m.update(agent, &mut inside, Vec2::new(0.8, 0.0), 11, &mut out);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|t| t.entering && t.occurred_at == 11 && t.event_id == 9));

        out.clear();
        m.update(agent, &mut inside, Vec2::new(0.8, 0.0), 12, &mut out);
        assert!(out.is_empty());

        m.update(agent, &mut inside, Vec2::new(2.0, 0.0), 13, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!((out[0].region_id, out[0].entering), (101, false));
    }

    #[test]
    fn leave_all_exits_every_region() {
        let m = monitor();
        let agent = AgentId(1);
        let mut inside = InsideSet::default();
        let mut out = Vec::new();
        m.update(agent, &mut inside, Vec2::new(0.8, 0.0), 1, &mut out);
        out.clear();

        m.leave_all(agent, &mut inside, 5, &mut out);
        assert_eq!(out.iter().map(|t| t.region_id).collect::<Vec<_>>(), vec![101, 202]);
        assert!(out.iter().all(|t| !t.entering && t.occurred_at == 5));
        assert!(inside.is_empty());
    }
}

// ── Individual ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod individual {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    use crowd_core::{AgentId, Parity, Vec2, angle_between};

    use super::helpers::{favour, flat_preferences, individual, world};
    use crate::{AgentState, BehaviorConfig, DecideContext, PositionStore};

    fn store_at(p: Vec2) -> PositionStore {
        let mut s = PositionStore::new();
        s.insert(AgentId(0), p);
        s
    }

    #[test]
    fn no_target_chooses_and_heads_down_the_field() {
        let (grid, dests, d0, _) = world();
        let positions = store_at(Vec2::tile_center(0, 2));
        let config = BehaviorConfig::default();
        let ctx = DecideContext { now: 0, parity: Parity::A, grid: &grid, destinations: &dests, positions: &positions, config: &config };

        let mut ind = individual(flat_preferences(&dests));
        let heading = ind.decide(&ctx).unwrap().unwrap();
        assert_eq!(ind.state, AgentState::Travelling(d0));
        // Stalled on the first tick, so sway is amplified.
        assert!(angle_between(heading, 0.0) <= FRAC_PI_4 * config.stall_sway_multiplier + 1e-9);
    }

    #[test]
    fn arrival_starts_dwell_and_expiry_reselects() {
        let (grid, dests, d0, d1) = world();
        let positions = store_at(Vec2::tile_center(4, 2));
        let config = BehaviorConfig::default();
        let mut ind = individual(flat_preferences(&dests));
        ind.state = AgentState::Travelling(d0);

        let at = |now| DecideContext { now, parity: Parity::A, grid: &grid, destinations: &dests, positions: &positions, config: &config };

        assert_eq!(ind.decide(&at(100)).unwrap(), None);
        assert_eq!(ind.state, AgentState::Dwelling { target: d0, leave_at: 160 });

        assert_eq!(ind.decide(&at(159)).unwrap(), None);
        assert!(matches!(ind.state, AgentState::Dwelling { leave_at: 160, .. }));

        ind.preferences = favour(&dests, d1);
        assert!(ind.decide(&at(160)).unwrap().is_some());
        assert_eq!(ind.state, AgentState::Travelling(d1));
    }

    #[test]
    fn closed_target_forces_reselection() {
        let (grid, mut dests, d0, d1) = world();
        let positions = store_at(Vec2::tile_center(0, 2));
        let config = BehaviorConfig::default();
        let mut ind = individual(flat_preferences(&dests));
        ind.state = AgentState::Dwelling { target: d0, leave_at: i64::MAX };

        dests.close(d0).unwrap();
        let ctx = DecideContext { now: 0, parity: Parity::A, grid: &grid, destinations: &dests, positions: &positions, config: &config };
        ind.decide(&ctx).unwrap();
        assert_eq!(ind.state, AgentState::Travelling(d1));
    }

    #[test]
    fn nothing_selectable_stays_put() {
        let (grid, mut dests, d0, d1) = world();
        dests.close(d0).unwrap();
        dests.close(d1).unwrap();
        let positions = store_at(Vec2::tile_center(0, 2));
        let config = BehaviorConfig::default();
        let ctx = DecideContext { now: 0, parity: Parity::A, grid: &grid, destinations: &dests, positions: &positions, config: &config };

        let mut ind = individual(flat_preferences(&dests));
        assert_eq!(ind.decide(&ctx).unwrap(), None);
        assert_eq!(ind.state, AgentState::NoTarget);
    }

    #[test]
    fn small_divergence_keeps_orientation_and_sway() {
        let (grid, dests, d0, _) = world();
        let positions = store_at(Vec2::tile_center(0, 2));
        let config = BehaviorConfig::default();
        let ctx = DecideContext { now: 0, parity: Parity::A, grid: &grid, destinations: &dests, positions: &positions, config: &config };

        let mut ind = individual(flat_preferences(&dests));
        ind.state = AgentState::Travelling(d0);
        ind.last_move = 0.2;
        ind.orientation = 0.0625;
        ind.sway = 0.125;
        assert_eq!(ind.decide(&ctx).unwrap(), Some(0.1875));
        assert_eq!(ind.orientation, 0.0625);
    }

    #[test]
    fn large_divergence_adopts_suggestion() {
        let (grid, dests, d0, _) = world();
        let positions = store_at(Vec2::tile_center(0, 2));
        let config = BehaviorConfig::default();
        let ctx = DecideContext { now: 0, parity: Parity::A, grid: &grid, destinations: &dests, positions: &positions, config: &config };

        let mut ind = individual(flat_preferences(&dests));
        ind.state = AgentState::Travelling(d0);
        ind.last_move = 0.2;
        ind.orientation = 2.0;
        let heading = ind.decide(&ctx).unwrap().unwrap();
        assert_eq!(ind.orientation, 0.0);
        assert!(ind.sway.abs() <= FRAC_PI_4);
        assert_eq!(heading, ind.sway);
    }

    #[test]
    fn missing_field_falls_back_to_straight_line() {
        let (grid, dests, _, d1) = world();
        // d1 sits directly south of (0, 2) and has no flow field.
        let positions = store_at(Vec2::tile_center(0, 2));
        let config = BehaviorConfig::default();
        let ctx = DecideContext { now: 0, parity: Parity::A, grid: &grid, destinations: &dests, positions: &positions, config: &config };

        let mut ind = individual(favour(&dests, d1));
        ind.last_move = 0.2;
        ind.decide(&ctx).unwrap();
        assert_eq!(ind.state, AgentState::Travelling(d1));
        assert!((ind.orientation - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn stalled_sway_stays_within_amplified_bound() {
        let (grid, dests, d0, _) = world();
        let positions = store_at(Vec2::tile_center(0, 2));
        let config = BehaviorConfig::default();
        let ctx = DecideContext { now: 0, parity: Parity::A, grid: &grid, destinations: &dests, positions: &positions, config: &config };
        let bound = config.max_sway * config.stall_sway_multiplier;

        let mut ind = individual(flat_preferences(&dests));
        ind.state = AgentState::Travelling(d0);
        for _ in 0..200 {
            ind.last_move = 0.0;
            ind.decide(&ctx).unwrap();
            assert!(ind.sway.abs() <= bound);
            assert_eq!(ind.orientation, 0.0);
        }
    }

    #[test]
    fn unknown_agent_propagates() {
        let (grid, dests, _, _) = world();
        let positions = PositionStore::new();
        let config = BehaviorConfig::default();
        let ctx = DecideContext { now: 0, parity: Parity::A, grid: &grid, destinations: &dests, positions: &positions, config: &config };
        assert!(individual(flat_preferences(&dests)).decide(&ctx).is_err());
    }
}

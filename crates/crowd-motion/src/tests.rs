//! Unit tests for crowd-motion.

#[cfg(test)]
mod helpers {
    use crowd_agent::PositionStore;
    use crowd_core::{AgentId, Vec2};
    use crowd_grid::Grid;

    use crate::occupancy;

    /// Place each agent at its position, IDs in order.
    pub fn populate(grid: &mut Grid, at: &[Vec2]) -> PositionStore {
        let mut positions = PositionStore::new();
        for (i, &p) in at.iter().enumerate() {
            let id = AgentId(i as u32);
            positions.insert(id, p);
            occupancy::place(grid, id, p).unwrap();
        }
        positions
    }

    pub fn open(n: usize) -> Grid {
        Grid::parse(&(".".repeat(n) + "\n").repeat(n)).unwrap()
    }
}

// ── Occupancy ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod occupancy {
    use crowd_core::{AgentId, Vec2};

    use super::helpers::open;
    use crate::{MotionError, occupancy};

    #[test]
    fn place_lists_and_counts_hit() {
        let mut g = open(3);
        occupancy::place(&mut g, AgentId(4), Vec2::new(1.2, 2.9)).unwrap();
        let t = g.tile(1, 2).unwrap();
        assert_eq!(t.occupants, vec![AgentId(4)]);
        assert_eq!(t.hits, 1);
    }

    #[test]
    fn relocate_within_tile_is_a_noop() {
        let mut g = open(3);
        occupancy::place(&mut g, AgentId(0), Vec2::new(0.1, 0.1)).unwrap();
        assert!(!occupancy::relocate(&mut g, AgentId(0), Vec2::new(0.1, 0.1), Vec2::new(0.9, 0.9)).unwrap());
        assert_eq!(g.tile(0, 0).unwrap().hits, 1);
    }

    #[test]
    fn relocate_across_boundary_moves_listing() {
        let mut g = open(3);
        occupancy::place(&mut g, AgentId(0), Vec2::new(0.9, 0.5)).unwrap();
        assert!(occupancy::relocate(&mut g, AgentId(0), Vec2::new(0.9, 0.5), Vec2::new(1.1, 0.5)).unwrap());
        assert!(g.tile(0, 0).unwrap().occupants.is_empty());
        assert_eq!(g.tile(1, 0).unwrap().occupants, vec![AgentId(0)]);
        assert_eq!(g.tile(1, 0).unwrap().hits, 1);
    }

    #[test]
    fn removing_an_absent_agent_fails() {
        let mut g = open(2);
        let err = occupancy::remove(&mut g, AgentId(9), Vec2::new(0.5, 0.5)).err().unwrap();
        assert!(matches!(err, MotionError::NotOccupying { x: 0, y: 0, .. }));
    }

    #[test]
    fn neighbours_skip_off_grid_tiles() {
        let mut g = open(3);
        occupancy::place(&mut g, AgentId(0), Vec2::new(0.5, 0.5)).unwrap();
        occupancy::place(&mut g, AgentId(1), Vec2::new(1.5, 1.5)).unwrap();
        occupancy::place(&mut g, AgentId(2), Vec2::new(2.5, 2.5)).unwrap();
        let mut near: Vec<_> = occupancy::neighbours(&g, 0, 0, 1).collect();
        near.sort();
        assert_eq!(near, vec![AgentId(0), AgentId(1)]);
    }
}

// ── Wall clipping ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod walls {
    use std::f64::consts::{FRAC_PI_4, PI};

    use crowd_core::{AgentId, Vec2};
    use crowd_grid::{Grid, GridError};
    use proptest::prelude::*;

    use super::helpers::populate;
    use crate::{MotionConfig, MotionError, MovementResolver};

    fn resolver() -> MovementResolver {
        MovementResolver::new(MotionConfig::default())
    }

    #[test]
    fn free_move_covers_full_step() {
        let mut g = Grid::parse(".....\n.....\n.....\n").unwrap();
        let from = Vec2::new(2.5, 1.5);
        let pos = populate(&mut g, &[from]);
        let to = resolver().resolve(&g, &pos, AgentId(0), from, 0.0, 0.2).unwrap();
        assert!((to.x - 2.7).abs() < 1e-12);
        assert_eq!(to.y, 1.5);
    }

    #[test]
    fn slides_along_wall() {
        let mut g = Grid::parse("#####\n#...#\n#...#\n#####\n").unwrap();
        let from = Vec2::new(2.5, 1.25);
        let pos = populate(&mut g, &[from]);
        let to = resolver().resolve(&g, &pos, AgentId(0), from, -FRAC_PI_4, 0.2).unwrap();
        assert!((to.y - 1.2).abs() < 1e-12, "y clipped to one radius from the wall");
        assert!((to.x - (2.5 + 0.2 * FRAC_PI_4.cos())).abs() < 1e-12, "x motion kept");
    }

    #[test]
    fn head_on_wall_stops_one_radius_short() {
        let mut g = Grid::parse("..#\n").unwrap();
        let from = Vec2::new(1.5, 0.5);
        let pos = populate(&mut g, &[from]);
        let to = resolver().resolve(&g, &pos, AgentId(0), from, 0.0, 0.5).unwrap();
        assert!((to.x - 1.8).abs() < 1e-12);
    }

    #[test]
    fn blocked_edge_clips_like_a_wall() {
        let mut g = Grid::parse(".>.\n").unwrap();
        let from = Vec2::new(1.5, 0.5);
        let pos = populate(&mut g, &[from]);
        let r = resolver();
        let east = r.resolve(&g, &pos, AgentId(0), from, 0.0, 0.5).unwrap();
        assert!((east.x - 1.8).abs() < 1e-12);
        let west = r.resolve(&g, &pos, AgentId(0), from, std::f64::consts::PI, 0.5).unwrap();
        assert!((west.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn map_edge_behaves_as_wall() {
        let mut g = Grid::parse("..\n").unwrap();
        let from = Vec2::new(1.7, 0.5);
        let pos = populate(&mut g, &[from]);
        let to = resolver().resolve(&g, &pos, AgentId(0), from, 0.0, 1.0).unwrap();
        assert!((to.x - 1.8).abs() < 1e-12);
    }

    #[test]
    fn never_pulled_backwards_when_already_close_to_wall() {
        let mut g = Grid::parse("..#\n").unwrap();
        let from = Vec2::new(1.9, 0.5);
        let pos = populate(&mut g, &[from]);
        let to = resolver().resolve(&g, &pos, AgentId(0), from, 0.0, 0.2).unwrap();
        assert_eq!(to, from);
    }

    #[test]
    fn step_over_a_tile_stops_at_the_far_wall() {
        let mut g = Grid::parse("...#..\n").unwrap();
        let from = Vec2::new(1.95, 0.5);
        let pos = populate(&mut g, &[from]);
        let to = resolver().resolve(&g, &pos, AgentId(0), from, 0.0, 1.1).unwrap();
        assert!((to.x - 2.8).abs() < 1e-12);
        assert_eq!(to.tile(), (2, 0));
    }

    #[test]
    fn step_west_over_a_tile_stops_at_the_far_wall() {
        let mut g = Grid::parse("#...\n").unwrap();
        let from = Vec2::new(2.1, 0.5);
        let pos = populate(&mut g, &[from]);
        let to = resolver().resolve(&g, &pos, AgentId(0), from, PI, 1.0).unwrap();
        assert!((to.x - 1.2).abs() < 1e-12);
    }

    #[test]
    fn diagonal_into_convex_corner_slides_along_it() {
        // Only (1, 1) is a wall; the x walk enters column 1 and the y walk
        // is then stopped by the wall below it.
        let mut g = Grid::parse("..\n.#\n").unwrap();
        let from = Vec2::new(0.7, 0.7);
        let pos = populate(&mut g, &[from]);
        let to = resolver().resolve(&g, &pos, AgentId(0), from, FRAC_PI_4, 0.6).unwrap();
        assert!((to.x - (0.7 + 0.6 * FRAC_PI_4.cos())).abs() < 1e-12);
        assert!((to.y - 0.8).abs() < 1e-12);
        assert_eq!(to.tile(), (1, 0));
    }

    #[test]
    fn diagonal_past_a_wall_through_an_open_tile() {
        let mut g = Grid::parse("..\n#.\n").unwrap();
        let from = Vec2::new(0.6, 0.6);
        let pos = populate(&mut g, &[from]);
        let to = resolver().resolve(&g, &pos, AgentId(0), from, FRAC_PI_4, 0.8).unwrap();
        assert!((to.distance(from) - 0.8).abs() < 1e-12, "full step kept");
        assert_eq!(to.tile(), (1, 1));
    }

    #[test]
    fn cut_short_inside_a_wall_tile_holds_still() {
        // The straight line from `from` to (1.3, 1.5) clips the wall at
        // (0, 1); the neighbour ahead would stop the agent inside it.
        let mut g = Grid::parse("..\n#.\n").unwrap();
        let from = Vec2::new(0.5, 0.9);
        let ahead = Vec2::new(0.5 + 0.8 * 0.85, 0.9 + 0.6 * 0.85);
        let pos = populate(&mut g, &[from, ahead]);
        let heading = 0.6f64.atan2(0.8);
        let to = resolver().resolve(&g, &pos, AgentId(0), from, heading, 1.0).unwrap();
        assert_eq!(to, from);
    }

    proptest! {
        #[test]
        fn endpoint_is_always_walkable(
            cells in proptest::collection::vec(proptest::bool::weighted(0.7), 16),
            start in 0usize..16,
            other in 0usize..16,
            fx in 0.0f64..1.0, fy in 0.0f64..1.0,
            heading in -PI..PI,
            step in 0.0f64..=1.0,
        ) {
            prop_assume!(cells[start] && cells[other]);
            let text: String = cells
                .chunks(4)
                .map(|row| row.iter().map(|&open| if open { '.' } else { '#' }).chain(['\n']).collect::<String>())
                .collect();
            let mut g = Grid::parse(&text).unwrap();
            let at = |i: usize, dx: f64, dy: f64| Vec2::new((i % 4) as f64 + dx, (i / 4) as f64 + dy);
            let from = at(start, fx, fy);
            let pos = populate(&mut g, &[from, at(other, 0.5, 0.5)]);

            let to = resolver().resolve(&g, &pos, AgentId(0), from, heading, step).unwrap();
            let (x, y) = to.tile();
            prop_assert!(g.is_walkable(x, y).unwrap(), "{from:?} -> {to:?} ends in a wall");
        }
    }

    #[test]
    fn start_outside_grid_is_fatal() {
        let g = Grid::parse("..\n").unwrap();
        let pos = crowd_agent::PositionStore::new();
        let err = resolver().resolve(&g, &pos, AgentId(0), Vec2::new(-0.5, 0.5), 0.0, 0.2).err().unwrap();
        assert!(matches!(err, MotionError::Grid(GridError::OutOfBounds { x: -1, y: 0 })));
    }
}

// ── Agent clipping ────────────────────────────────────────────────────────────

#[cfg(test)]
mod agents {
    use std::f64::consts::PI;

    use crowd_core::{AgentId, Parity, Vec2};
    use proptest::prelude::*;

    use super::helpers::{open, populate};
    use crate::{MotionConfig, MovementResolver};

    const R: f64 = 0.2;

    #[test]
    fn stops_at_first_contact() {
        let mut g = open(4);
        let a = Vec2::new(1.0, 1.5);
        let b = Vec2::new(1.5, 1.5);
        let pos = populate(&mut g, &[a, b]);
        let to = MovementResolver::default().resolve(&g, &pos, AgentId(0), a, 0.0, 0.2).unwrap();
        assert!((to.distance(b) - 2.0 * R).abs() < 1e-9);
    }

    #[test]
    fn glancing_neighbour_does_not_block() {
        let mut g = open(4);
        let a = Vec2::new(1.0, 1.5);
        let b = Vec2::new(1.3, 1.95);
        let pos = populate(&mut g, &[a, b]);
        let to = MovementResolver::default().resolve(&g, &pos, AgentId(0), a, 0.0, 0.2).unwrap();
        assert!((to.x - 1.2).abs() < 1e-12);
    }

    #[test]
    fn overlapping_pair_on_collision_course_holds_still() {
        let mut g = open(4);
        let eps = 0.01;
        let a = Vec2::new(1.5, 1.5);
        let b = Vec2::new(1.5 + 2.0 * R - eps, 1.5);
        let mut pos = populate(&mut g, &[a, b]);
        let r = MovementResolver::default();

        let ma = r.apply(&mut g, &mut pos, AgentId(0), Parity::A, Some(0.0), 0.2).unwrap();
        let mb = r.apply(&mut g, &mut pos, AgentId(1), Parity::A, Some(PI), 0.2).unwrap();
        assert_eq!(ma.distance + mb.distance, 0.0);
        assert!(ma.to.distance(mb.to) >= 2.0 * R - eps - 1e-9);
    }

    #[test]
    fn overlapping_agent_may_back_away() {
        let mut g = open(4);
        let a = Vec2::new(1.5, 1.5);
        let b = Vec2::new(1.8, 1.5);
        let pos = populate(&mut g, &[a, b]);
        let to = MovementResolver::default().resolve(&g, &pos, AgentId(0), a, PI, 0.2).unwrap();
        assert!((to.x - 1.3).abs() < 1e-12);
    }

    #[test]
    fn later_mover_sees_earlier_move() {
        let mut g = open(4);
        let a = Vec2::new(1.0, 1.5);
        let b = Vec2::new(1.7, 1.5);
        let mut pos = populate(&mut g, &[a, b]);
        let r = MovementResolver::default();

        // b steps west first; a then only has 0.1 of room.
        r.apply(&mut g, &mut pos, AgentId(1), Parity::A, Some(PI), 0.2).unwrap();
        let ma = r.apply(&mut g, &mut pos, AgentId(0), Parity::A, Some(0.0), 0.2).unwrap();
        assert!((ma.distance - 0.1).abs() < 1e-9);
    }

    #[test]
    fn standing_agent_is_carried_forward() {
        let mut g = open(3);
        let a = Vec2::new(1.5, 1.5);
        let mut pos = populate(&mut g, &[a]);
        let m = MovementResolver::default().apply(&mut g, &mut pos, AgentId(0), Parity::A, None, 0.2).unwrap();
        assert_eq!(m.distance, 0.0);
        assert_eq!(pos.committed(AgentId(0), Parity::B).unwrap(), a);
    }

    #[test]
    fn apply_updates_occupancy_on_tile_change() {
        let mut g = open(3);
        let a = Vec2::new(0.9, 0.5);
        let mut pos = populate(&mut g, &[a]);
        let cfg = MotionConfig { radius: 0.1, step_size: 0.2 };
        let m = MovementResolver::new(cfg).apply(&mut g, &mut pos, AgentId(0), Parity::A, Some(0.0), 0.2).unwrap();
        assert!(m.changed_tile);
        assert_eq!(g.tile(1, 0).unwrap().occupants, vec![AgentId(0)]);
        assert!(g.tile(0, 0).unwrap().occupants.is_empty());
    }

    proptest! {
        #[test]
        fn never_closes_to_overlap(
            ax in 1.0f64..5.0, ay in 1.0f64..5.0,
            bx in 1.0f64..5.0, by in 1.0f64..5.0,
            heading in -PI..PI,
        ) {
            let mut g = open(6);
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            let mut pos = populate(&mut g, &[a, b]);
            let before = a.distance(b);

            let m = MovementResolver::default()
                .apply(&mut g, &mut pos, AgentId(0), Parity::A, Some(heading), 0.2)
                .unwrap();
            let after = m.to.distance(b);
            prop_assert!(after >= before.min(2.0 * R) - 1e-9);
            prop_assert!(m.distance <= 0.2 + 1e-12);
        }
    }
}

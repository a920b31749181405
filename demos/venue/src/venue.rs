//! A synthetic two-hall venue: entrance hall with a bar and toilets on the
//! west, stage hall on the east, two doorways in the dividing wall.

use anyhow::Result;

use crowd_agent::{Destination, DestinationSet, EventWindow, Region, RegionMonitor};
use crowd_core::{Circle, RegionId, Vec2};
use crowd_grid::Grid;

pub const WIDTH:  i64 = 40;
pub const HEIGHT: i64 = 24;

/// Everything the builder needs besides the config.
pub struct Venue {
    pub grid:         Grid,
    pub destinations: DestinationSet,
    pub regions:      RegionMonitor,
    pub entrances:    Vec<Circle>,
}

/// Text floor plan: outer walls, a dividing wall at x = 20 with two
/// doorways, and a bar counter.
fn floor_plan() -> String {
    let mut text = String::new();
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let border = x == 0 || y == 0 || x == WIDTH - 1 || y == HEIGHT - 1;
            let divider = x == 20 && !(5..8).contains(&y) && !(15..18).contains(&y);
            let counter = y == 3 && (5..10).contains(&x);
            text.push(if border || divider || counter { '#' } else { '.' });
        }
        text.push('\n');
    }
    text
}

fn circle(x: i64, y: i64, r: f64) -> Circle {
    Circle::new(Vec2::tile_center(x, y), r)
}

fn event(name: &str, start: i64, end: i64, popularity: f64) -> EventWindow {
    EventWindow { name: name.into(), start, end, popularity }
}

/// Build the venue for a run starting at `start` and lasting `secs`.
pub fn build(start: i64, secs: i64) -> Result<Venue> {
    let grid = Grid::parse(&floor_plan())?;
    let end = start + secs;

    let mut destinations = DestinationSet::new();
    destinations.push(
        Destination::new("stage")
            .with_region(circle(34, 12, 2.5))
            .with_event(event("headline set", start + secs / 6, start + secs * 5 / 6, 1.0)),
    )?;
    destinations.push(
        Destination::new("bar")
            .with_region(circle(7, 5, 1.5))
            .with_dwell(120.0, 900.0)
            .with_event(event("bar open", start, end, 0.4)),
    )?;
    destinations.push(
        Destination::new("toilets")
            .with_region(circle(15, 20, 1.0))
            .with_dwell(90.0, 400.0)
            .with_event(event("always", start, end, 0.2)),
    )?;
    destinations.push_exit(
        Destination::new("exit")
            .with_region(circle(2, 21, 1.0))
            .with_event(event("curfew", start + secs * 2 / 3, end, 0.8)),
    )?;

    let region = |external_id, area, name: &str| Region {
        id: RegionId::INVALID,
        external_id,
        event_id: 1,
        name: name.into(),
        area,
    };
    let regions = RegionMonitor::new(vec![
        region(101, circle(34, 12, 5.0), "stage front"),
        region(102, circle(7, 5, 3.0), "bar"),
    ]);

    Ok(Venue {
        grid,
        destinations,
        regions,
        entrances: vec![circle(3, HEIGHT / 2, 1.5)],
    })
}

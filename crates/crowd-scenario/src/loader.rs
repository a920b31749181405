//! Turning documents into a ready-to-run venue.

use std::path::Path;

use crowd_agent::{Destination, DestinationSet, EventWindow, RegionMonitor};
use crowd_core::{Circle, GeoPoint, SimConfig, Vec2};
use crowd_grid::Grid;

use crate::region::{load_regions, project_regions};
use crate::{CoordDoc, DestinationDoc, RegionDoc, ScenarioDoc, ScenarioError, ScenarioResult};

/// A fully resolved venue: map, destinations, geofences and crowd size.
#[derive(Debug)]
pub struct Scenario {
    /// File stem of the scenario document, used to name outputs.
    pub name:            String,
    pub grid:            Grid,
    /// Scenario destinations in file order, then the exit.
    pub destinations:    DestinationSet,
    pub regions:         RegionMonitor,
    pub entrances:       Vec<Circle>,
    pub start_unix_secs: i64,
    pub end_unix_secs:   i64,
    pub total_people:    u32,
    pub total_groups:    u32,
    pub spawn_per_tick:  u32,
}

impl Scenario {
    /// Load a scenario document, its text map and its geofence file.
    pub fn load(path: &Path) -> ScenarioResult<Self> {
        let doc: ScenarioDoc = serde_json::from_str(&read(path)?)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));

        let map_path = base.join(&doc.map);
        if map_path.extension().and_then(|e| e.to_str()) != Some("txt") {
            return Err(ScenarioError::UnsupportedMap(map_path));
        }
        let grid = Grid::parse(&read(&map_path)?)?;
        let regions = load_regions(&base.join(&doc.regions))?;

        let mut scenario = Self::from_document(doc, grid, &regions)?;
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            scenario.name = stem.to_string();
        }
        Ok(scenario)
    }

    /// Resolve a parsed document against an already-built grid and the
    /// geofence documents.
    pub fn from_document(doc: ScenarioDoc, grid: Grid, region_docs: &[RegionDoc]) -> ScenarioResult<Self> {
        if doc.end < doc.start {
            return Err(ScenarioError::EmptyWindow { start: doc.start, end: doc.end });
        }
        let origin = GeoPoint::new(doc.lat, doc.lng);
        let regions = RegionMonitor::new(project_regions(region_docs, origin, grid.width(), grid.height()));

        let mut destinations = DestinationSet::new();
        for d in &doc.destinations {
            destinations.push(destination(d, &regions)?)?;
        }
        destinations.push_exit(destination(&doc.exit, &regions)?)?;

        log::info!(
            "scenario: {}x{} map, {} destinations, {} regions, {} people in {} groups",
            grid.width(),
            grid.height(),
            destinations.len(),
            regions.len(),
            doc.total_people,
            doc.total_groups
        );

        Ok(Self {
            name: String::from("scenario"),
            grid,
            destinations,
            regions,
            entrances: doc.entrances.iter().map(|&c| circle(c)).collect(),
            start_unix_secs: doc.start,
            end_unix_secs: doc.end,
            total_people: doc.total_people,
            total_groups: doc.total_groups,
            spawn_per_tick: doc.spawn_per_tick,
        })
    }

    /// A run configuration spanning the scenario's time window.
    pub fn sim_config(&self, tick_duration_secs: u32, seed: u64) -> SimConfig {
        SimConfig {
            start_unix_secs: self.start_unix_secs,
            tick_duration_secs,
            total_ticks: SimConfig::ticks_between(self.start_unix_secs, self.end_unix_secs, tick_duration_secs),
            seed,
            ..SimConfig::default()
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read(path: &Path) -> ScenarioResult<String> {
    std::fs::read_to_string(path).map_err(|source| ScenarioError::Io { path: path.to_path_buf(), source })
}

fn circle(c: CoordDoc) -> Circle {
    Circle::new(Vec2::tile_center(c.x, c.y), c.r)
}

fn destination(doc: &DestinationDoc, regions: &RegionMonitor) -> ScenarioResult<Destination> {
    let mut d = Destination::new(doc.name.clone()).with_dwell(doc.mean_use_time, doc.use_time_var);
    d.open = !doc.closed;
    d.regions = doc.coords.iter().map(|&c| circle(c)).collect();

    if doc.region_id > 0 {
        let region = regions.find_external(doc.region_id).ok_or_else(|| ScenarioError::UnknownRegion {
            destination: doc.name.clone(),
            region_id:   doc.region_id,
        })?;
        let (x, y) = region.area.center.tile();
        d.regions.push(Circle::new(Vec2::tile_center(x, y), region.area.radius));
    }

    d.events = doc
        .events
        .iter()
        .map(|e| EventWindow {
            name:       e.name.clone(),
            start:      e.start,
            end:        e.end,
            popularity: e.popularity,
        })
        .collect();

    if d.regions.is_empty() {
        log::warn!("destination {:?} has no regions and can never be chosen", d.name);
    }
    Ok(d)
}

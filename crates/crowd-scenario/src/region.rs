//! Geofence loading.

use std::io::Read;
use std::path::Path;

use crowd_agent::Region;
use crowd_core::{Circle, GeoPoint, RegionId, Vec2};

use crate::{RegionDoc, ScenarioError, ScenarioResult};

/// Read a geofence file.
pub fn load_regions(path: &Path) -> ScenarioResult<Vec<RegionDoc>> {
    let file = std::fs::File::open(path).map_err(|source| ScenarioError::Io { path: path.to_path_buf(), source })?;
    load_regions_reader(std::io::BufReader::new(file))
}

/// Like [`load_regions`] but accepts any `Read` source.
pub fn load_regions_reader<R: Read>(reader: R) -> ScenarioResult<Vec<RegionDoc>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Convert documents to monitored regions in venue coordinates.
///
/// Regions without local coordinates (`X == 0 || Y == 0`) are projected
/// from lat/lng around `origin`.  Regions that land outside a
/// `width × height` map are kept but logged.
pub fn project_regions(docs: &[RegionDoc], origin: GeoPoint, width: u32, height: u32) -> Vec<Region> {
    docs.iter()
        .enumerate()
        .map(|(i, doc)| {
            let center = if doc.x == 0.0 || doc.y == 0.0 {
                GeoPoint::new(doc.lat, doc.lng).to_local(origin)
            } else {
                Vec2::new(doc.x, doc.y)
            };
            if center.x < 0.0 || center.x > width as f64 || center.y < 0.0 || center.y > height as f64 {
                log::warn!(
                    "region {} ({}) lies outside the {}x{} map at {}",
                    doc.region_id,
                    doc.name,
                    width,
                    height,
                    center
                );
            }
            Region {
                id:          RegionId(i as u32),
                external_id: doc.region_id,
                event_id:    doc.event_id,
                name:        doc.name.clone(),
                area:        Circle::new(center, doc.radius),
            }
        })
        .collect()
}

//! On-disk document formats.
//!
//! # Scenario
//!
//! ```json
//! {
//!   "map": "venue.txt",
//!   "regions": "regions.json",
//!   "lat": 51.5, "lng": -0.12,
//!   "start": 1530000000, "end": 1530036000,
//!   "entrance": [{ "x": 3, "y": 40, "r": 2.5 }],
//!   "exit": { "name": "Exit", "coords": [{ "x": 3, "y": 41, "r": 2 }] },
//!   "totalPeople": 500, "totalGroups": 8, "spawnPerTick": 2,
//!   "Destinations": [
//!     { "name": "Main stage", "regionId": 7, "meanUseTime": 1800, "useTimeVar": 90000,
//!       "events": [{ "name": "Headliner", "start": 1530020000, "end": 1530027200, "popularity": 3 }] }
//!   ]
//! }
//! ```
//!
//! Times are Unix seconds, given as a number or a string, or RFC 3339
//! strings such as `"2018-06-26T10:00:00Z"`.  Paths are relative to the
//! scenario file.
//!
//! # Geofences
//!
//! A JSON array of regions.  A region whose `X` or `Y` is zero (or
//! missing) is placed by projecting its `lat`/`lng` around the scenario
//! origin.
//!
//! ```json
//! [{ "regionID": 7, "name": "Stage", "lat": 51.5003, "lng": -0.1201,
//!    "radius": 12, "eventID": 1 }]
//! ```

use serde::{Deserialize, Deserializer};

#[derive(Clone, Debug, Deserialize)]
pub struct ScenarioDoc {
    pub map:     String,
    pub regions: String,
    #[serde(default)]
    pub lat:     f64,
    #[serde(default)]
    pub lng:     f64,
    #[serde(deserialize_with = "unix_secs")]
    pub start:   i64,
    #[serde(deserialize_with = "unix_secs")]
    pub end:     i64,
    #[serde(rename = "entrance")]
    pub entrances: Vec<CoordDoc>,
    pub exit:      DestinationDoc,
    #[serde(rename = "totalPeople")]
    pub total_people: u32,
    #[serde(rename = "totalGroups")]
    pub total_groups: u32,
    /// Admission attempts per tick.
    #[serde(rename = "spawnPerTick", default = "default_spawn_per_tick")]
    pub spawn_per_tick: u32,
    #[serde(rename = "Destinations", alias = "destinations", default)]
    pub destinations: Vec<DestinationDoc>,
}

fn default_spawn_per_tick() -> u32 {
    1
}

// ── Times ─────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTime {
    Secs(i64),
    Text(String),
}

fn unix_secs<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    match RawTime::deserialize(de)? {
        RawTime::Secs(secs) => Ok(secs),
        RawTime::Text(text) => parse_time(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("`{text}` is neither Unix seconds nor an RFC 3339 time"))),
    }
}

/// Unix seconds from `"1530000000"` or `"2018-06-26T08:00:00Z"`.
pub fn parse_time(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(secs) = text.parse::<i64>() {
        return Some(secs);
    }
    chrono::DateTime::parse_from_rfc3339(text).ok().map(|t| t.timestamp())
}

// ── Parts ─────────────────────────────────────────────────────────────────────

/// A circle given by its centre tile and radius in tiles.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct CoordDoc {
    pub x: i64,
    pub y: i64,
    pub r: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DestinationDoc {
    pub name:   String,
    #[serde(default)]
    pub coords: Vec<CoordDoc>,
    /// Geofence whose circle is added to `coords`; 0 means none.
    #[serde(rename = "regionId", default)]
    pub region_id: i32,
    #[serde(default)]
    pub events: Vec<EventDoc>,
    #[serde(rename = "meanUseTime", default)]
    pub mean_use_time: f64,
    #[serde(rename = "useTimeVar", default)]
    pub use_time_var:  f64,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EventDoc {
    pub name:       String,
    #[serde(deserialize_with = "unix_secs")]
    pub start:      i64,
    #[serde(deserialize_with = "unix_secs")]
    pub end:        i64,
    pub popularity: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RegionDoc {
    #[serde(rename = "regionID", default)]
    pub region_id: i32,
    #[serde(default)]
    pub name:      String,
    #[serde(rename = "type", default)]
    pub kind:      String,
    #[serde(default)]
    pub lat:       f64,
    #[serde(default)]
    pub lng:       f64,
    #[serde(default)]
    pub radius:    f64,
    #[serde(rename = "eventID", default)]
    pub event_id:  i32,
    #[serde(rename = "X", default)]
    pub x:         f64,
    #[serde(rename = "Y", default)]
    pub y:         f64,
}

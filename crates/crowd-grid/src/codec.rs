//! Persisted flow-field pixel codec.
//!
//! Each tile becomes one RGBA8 pixel.  Hue carries the direction angle and
//! value carries the distance squashed through a sigmoid centred on 200
//! steps; saturation is always 1.  A tile with no direction is encoded as
//! fully transparent black.  The mapping is lossy: directions round to the
//! hue resolution of 8-bit channels and distances lose precision far from
//! the sigmoid centre.
//!
//! ```text
//! hue   = (θ + π) / 2π · 360
//! value = sigmoid(-(d - 200) / 200)
//! ```

use std::f64::consts::PI;

use crowd_core::{DestinationId, angle_between};

use crate::{FlowField, Grid, GridError, GridResult};

const DISTANCE_CENTRE: f64 = 200.0;
const DISTANCE_SCALE: f64 = 200.0;

/// Pixel reserved for "no direction".
pub const NO_DIRECTION: [u8; 4] = [0, 0, 0, 0];

#[inline]
fn sigmoid(a: f64) -> f64 {
    1.0 / (1.0 + (-a).exp())
}

#[inline]
fn logit(v: f64) -> f64 {
    -((1.0 / v) - 1.0).ln()
}

#[inline]
fn channel(f: f64) -> u8 {
    // Saturating float→int cast truncates toward zero.
    (f * 255.0) as u8
}

/// Encode one tile's direction and distance.
pub fn encode_pixel(direction: Option<f64>, distance: f64) -> [u8; 4] {
    let Some(theta) = direction else {
        return NO_DIRECTION;
    };

    let h = (theta + PI) / (2.0 * PI) * 360.0;
    let v = sigmoid(-(distance - DISTANCE_CENTRE) / DISTANCE_SCALE);

    // HSV → RGB with s = 1.
    let c = v;
    let hp = h / 60.0;
    let x = c * (1.0 - ((hp % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if hp <= 1.0 {
        (c + m, x + m, m)
    } else if hp <= 2.0 {
        (x + m, c + m, m)
    } else if hp <= 3.0 {
        (m, c + m, x + m)
    } else if hp <= 4.0 {
        (m, x + m, c + m)
    } else if hp <= 5.0 {
        (x + m, m, c + m)
    } else if hp <= 6.0 {
        (c + m, m, x + m)
    } else {
        log::debug!("direction {theta} outside [-π, π]; encoding as no direction");
        return NO_DIRECTION;
    };

    [channel(r), channel(g), channel(b), 255]
}

/// Decode one pixel into `(direction, distance)`.  The reserved pixel
/// decodes to no direction at distance 0.
pub fn decode_pixel(px: [u8; 4]) -> (Option<f64>, f64) {
    if px == NO_DIRECTION {
        return (None, 0.0);
    }
    let r = px[0] as f64 / 255.0;
    let g = px[1] as f64 / 255.0;
    let b = px[2] as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);

    let mut h = if max == min {
        0.0
    } else if max == r {
        60.0 * ((g - b) / (max - min))
    } else if max == g {
        60.0 * (2.0 + (b - r) / (max - min))
    } else {
        60.0 * (4.0 + (r - g) / (max - min))
    };
    if h < 0.0 {
        h += 360.0;
    }

    let mut theta = (h / 360.0) * (2.0 * PI) - PI;
    if theta > PI {
        theta -= 2.0 * PI;
    } else if theta < -PI {
        theta += 2.0 * PI;
    }

    let distance = DISTANCE_CENTRE - DISTANCE_SCALE * logit(max);
    (Some(theta), distance)
}

// ── Whole fields ──────────────────────────────────────────────────────────────

/// A flow field as an RGBA8 image plus the worst round-trip error observed
/// while encoding it.
#[derive(Clone, Debug)]
pub struct EncodedField {
    pub width:  u32,
    pub height: u32,
    /// Row-major RGBA8 pixels.
    pub rgba: Vec<u8>,
    /// Largest angular error (radians) over tiles with a direction.
    pub max_direction_error: f64,
    /// Largest distance error (steps) over tiles with a direction.
    pub max_distance_error: f64,
}

/// Encode a whole field, measuring decode error as it goes.
pub fn encode_field(field: &FlowField) -> EncodedField {
    let mut rgba = Vec::with_capacity(field.distances().len() * 4);
    let mut max_direction_error = 0.0f64;
    let mut max_distance_error = 0.0f64;

    for (&distance, &direction) in field.distances().iter().zip(field.directions()) {
        let px = encode_pixel(direction, distance);
        rgba.extend_from_slice(&px);

        if let Some(theta) = direction {
            match decode_pixel(px) {
                (Some(back), back_distance) => {
                    max_direction_error = max_direction_error.max(angle_between(theta, back));
                    max_distance_error = max_distance_error.max((distance - back_distance).abs());
                }
                (None, _) => log::warn!("encoded direction {theta} decoded as absent"),
            }
        }
    }

    log::debug!(
        "encoded flow field for {}: max direction error {max_direction_error:.4} rad, \
         max distance error {max_distance_error:.3}",
        field.destination
    );

    EncodedField {
        width: field.width(),
        height: field.height(),
        rgba,
        max_direction_error,
        max_distance_error,
    }
}

/// Decode a persisted field for `destination` against `grid`.  Wall tiles
/// get `+∞` distance whatever their pixel says.
pub fn decode_field(grid: &Grid, destination: DestinationId, rgba: &[u8]) -> GridResult<FlowField> {
    let expected = grid.tile_count() * 4;
    if rgba.len() != expected {
        return Err(GridError::PixelBuffer { expected, actual: rgba.len() });
    }
    let (distance, direction): (Vec<f64>, Vec<Option<f64>>) = rgba
        .chunks_exact(4)
        .zip(grid.tiles())
        .map(|(c, tile)| {
            if !tile.walkable {
                return (f64::INFINITY, None);
            }
            let (dir, d) = decode_pixel([c[0], c[1], c[2], c[3]]);
            (d, dir)
        })
        .unzip();
    FlowField::from_parts(destination, grid.width(), grid.height(), distance, direction)
}

//! Addressing of quadrants on a world recursively split into four equal parts.
//!
//! The world is divided into a grid of `2^NR_LEVELS` by `2^NR_LEVELS` cells. A *quad path* is a `u64` in which every pair of bits, starting from the most significant used pair, selects one of four quadrants at successive levels. Within each pair the longitude (x) bit is the more significant one, which gives the quadrant order:
//!
//! | Index | Quadrant |
//! |-------|----------|
//! | 0     | SW       |
//! | 1     | NW       |
//! | 2     | SE       |
//! | 3     | NE       |

use crate::bbox::{LatLon, MIN_LAT, MIN_LON};

/// The number of times the world can be subdivided.
pub const NR_LEVELS: u8 = 24;
/// The number of quadrants every cell is split into.
pub const TILES_PER_LEVEL: usize = 4;
/// South-west quadrant index.
pub const SW_INDEX: u8 = 0;
/// North-west quadrant index.
pub const NW_INDEX: u8 = 1;
/// South-east quadrant index.
pub const SE_INDEX: u8 = 2;
/// North-east quadrant index.
pub const NE_INDEX: u8 = 3;

const WORLD_PARTS: u64 = 1 << NR_LEVELS;
const X_PARTS: f64 = 360.0;
const Y_PARTS: f64 = 180.0;
/// Width of a grid cell at the deepest level. A power of two fraction of 360, hence exact.
const X_UNIT: f64 = X_PARTS / WORLD_PARTS as f64;
const Y_UNIT: f64 = Y_PARTS / WORLD_PARTS as f64;

/// The coordinate at which the specified grid cell starts. Exact, and equal to the corresponding bucket edge.
#[inline(always)]
fn cell_start(cell: u64, min: f64, unit: f64) -> f64 {
    cell as f64 * unit + min
}
/// Returns the cell containing `coord`, consistently with `cell_start`: a coordinate on a cell boundary belongs to the cell which starts there.
fn cell_of(coord: f64, min: f64, unit: f64) -> u64 {
    let approx = ((coord - min) / unit).floor();
    // Points on (or past) the far edge of the world belong to the last cell
    let mut cell = if approx.is_nan() || approx <= 0.0 {
        0
    } else if approx >= WORLD_PARTS as f64 {
        WORLD_PARTS - 1
    } else {
        approx as u64
    };
    // The division may round across a boundary
    if cell > 0 && cell_start(cell, min, unit) > coord {
        cell -= 1;
    } else if cell + 1 < WORLD_PARTS && cell_start(cell + 1, min, unit) <= coord {
        cell += 1;
    }
    cell
}

/// Converts a longitude into a grid column.
#[inline]
pub fn lon_to_x(lon: f64) -> u64 {
    cell_of(lon, MIN_LON, X_UNIT)
}
/// Converts a latitude into a grid row.
#[inline]
pub fn lat_to_y(lat: f64) -> u64 {
    cell_of(lat, MIN_LAT, Y_UNIT)
}

/// Interleaves a grid column and row into a full-depth quad path.
pub fn xy_to_tile(x: u64, y: u64) -> u64 {
    let mut tile = 0;
    for i in (0..NR_LEVELS).rev() {
        let xbit = (x >> i) & 1;
        let ybit = (y >> i) & 1;
        tile <<= 2;
        tile |= (xbit << 1) | ybit;
    }
    tile
}

/// Returns the full-depth quad path of the grid cell containing the point.
#[inline]
pub fn quad_tile(point: LatLon) -> u64 {
    xy_to_tile(lon_to_x(point.lon), lat_to_y(point.lat))
}

/// Extracts the quadrant selected by a quad path when descending from the specified level to the next one.
///
/// # Panics
/// Will panic if `level >= NR_LEVELS`, since there is no level below the deepest one.
#[inline]
pub fn index_of_tile(level: u8, quad: u64) -> u8 {
    assert!(
        level < NR_LEVELS,
        "\
quadrants exist only below levels 0 to {}, but level {} was requested",
        NR_LEVELS - 1,
        level,
    );
    let shift = 2 * u32::from(NR_LEVELS - level - 1);
    ((quad >> shift) & 0b11) as u8
}

/// Returns the index of the quadrant which contains the point when a cell at the specified level is subdivided.
///
/// # Example
/// ```rust
/// use quadbuckets::{LatLon, quad_tiling::{self, SW_INDEX, NE_INDEX, NW_INDEX}};
///
/// assert_eq!(quad_tiling::index(LatLon::new(-45.0, -90.0), 0), SW_INDEX);
/// assert_eq!(quad_tiling::index(LatLon::new(45.0, 90.0), 0), NE_INDEX);
/// // One level down, the north-east quadrant is split again:
/// assert_eq!(quad_tiling::index(LatLon::new(80.0, 10.0), 1), NW_INDEX);
/// ```
#[inline]
pub fn index(point: LatLon, level: u8) -> u8 {
    index_of_tile(level, quad_tile(point))
}

/// Returns the bottom-left corner of the cell addressed by a quad path.
///
/// Only the bits which are set matter, so a path addressing a cell at a shallow level gives the corner of that cell.
pub fn tile_to_lat_lon(quad: u64) -> LatLon {
    let mut x_unit = X_PARTS / 2.0;
    let mut y_unit = Y_PARTS / 2.0;
    let mut shift = u32::from(NR_LEVELS) * 2 - 2;
    let mut x = 0.0;
    let mut y = 0.0;
    for _ in 0..NR_LEVELS {
        let bits = (quad >> shift) & 0b11;
        if bits & 0b10 != 0 {
            x += x_unit;
        }
        if bits & 0b01 != 0 {
            y += y_unit;
        }
        x_unit /= 2.0;
        y_unit /= 2.0;
        shift = shift.saturating_sub(2);
    }
    LatLon::new(y + MIN_LAT, x + MIN_LON)
}

/// Returns the quad path of the `index`-th child of the cell at `level` addressed by `parent_quad`.
#[inline]
pub fn child_quad(parent_quad: u64, level: u8, index: u8) -> u64 {
    debug_assert!(index < TILES_PER_LEVEL as u8, "quadrant index {} out of range", index);
    let shift = 2 * u32::from(NR_LEVELS - (level + 1));
    parent_quad | (u64::from(index) << shift)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrants_at_top_level() {
        assert_eq!(index(LatLon::new(-45.0, -90.0), 0), SW_INDEX);
        assert_eq!(index(LatLon::new(45.0, -90.0), 0), NW_INDEX);
        assert_eq!(index(LatLon::new(-45.0, 90.0), 0), SE_INDEX);
        assert_eq!(index(LatLon::new(45.0, 90.0), 0), NE_INDEX);
    }

    #[test]
    fn world_edges_stay_in_the_grid() {
        assert_eq!(lon_to_x(180.0), WORLD_PARTS - 1);
        assert_eq!(lat_to_y(90.0), WORLD_PARTS - 1);
        assert_eq!(lon_to_x(-180.0), 0);
        assert_eq!(lon_to_x(-500.0), 0);
        assert_eq!(index(LatLon::new(90.0, 180.0), 0), NE_INDEX);
    }

    #[test]
    fn boundaries_belong_to_the_upper_cell() {
        assert_eq!(lon_to_x(0.0), WORLD_PARTS / 2);
        assert_eq!(lon_to_x(-f64::EPSILON), WORLD_PARTS / 2 - 1);
        let edge = cell_start(12345, MIN_LAT, Y_UNIT);
        assert_eq!(lat_to_y(edge), 12345);
        assert_eq!(tile_to_lat_lon(xy_to_tile(0, 12345)).lat, edge);
    }

    #[test]
    fn corner_of_child_cells() {
        assert_eq!(tile_to_lat_lon(0), LatLon::new(-90.0, -180.0));
        let ne = child_quad(0, 0, NE_INDEX);
        assert_eq!(tile_to_lat_lon(ne), LatLon::new(0.0, 0.0));
        let ne_nw = child_quad(ne, 1, NW_INDEX);
        assert_eq!(tile_to_lat_lon(ne_nw), LatLon::new(45.0, 0.0));
        assert_eq!(index_of_tile(0, ne_nw), NE_INDEX);
        assert_eq!(index_of_tile(1, ne_nw), NW_INDEX);
    }

    #[test]
    fn tile_of_point_matches_cell_corner() {
        let point = LatLon::new(48.8566, 2.3522);
        let corner = tile_to_lat_lon(quad_tile(point));
        assert!(corner.lat <= point.lat && point.lat - corner.lat < 1e-4);
        assert!(corner.lon <= point.lon && point.lon - corner.lon < 1e-4);
    }
}

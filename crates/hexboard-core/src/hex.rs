//! Hex coordinate system using axial coordinates (q, r).
//!
//! This module provides the identities every other part of the board is keyed by:
//! - `HexCoord`: identifies individual hex tiles
//! - `CornerKey`: identifies corners where settlements are placed
//! - `EdgeKey`: identifies the sides between two corners where roads are placed
//!
//! Tiles are flat-topped. A tile at (q, r) is centred at
//! `x = 3/2 * q`, `z = sqrt(3) * (r + q/2)` (scaled by the hex size), and its six
//! corners sit at angles 0°, 60°, ..., 300° around that centre.
//!
//! Corners are identified on an integer lattice rather than by rounded floating
//! point positions: `u = 2x / size` and `v = 2z / (sqrt(3) * size)` are always
//! integers for a corner, so the same corner reached from any of the (up to three)
//! tiles touching it yields the same key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lattice offsets of a tile's six corners relative to its centre, in rotational order.
const CORNER_U: [i32; 6] = [2, 1, -1, -2, -1, 1];
const CORNER_V: [i32; 6] = [0, 1, 1, 0, -1, -1];

/// Largest radius a disk of tiles may have. Corner lattice coordinates of such a
/// disk stay far inside `i32` and its tile count inside a 32-bit `usize`.
pub const MAX_DISK_RADIUS: u32 = 1024;

/// How far (in lattice units) a world point may sit from a lattice point and still snap to it.
const SNAP_TOLERANCE: f64 = 0.1;

fn sqrt_3() -> f64 {
    3.0_f64.sqrt()
}

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` selects the column
/// - `r` selects the row within the column
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// The six neighboring hexes
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),
            HexCoord::new(self.q + 1, self.r - 1),
            HexCoord::new(self.q, self.r - 1),
            HexCoord::new(self.q - 1, self.r),
            HexCoord::new(self.q - 1, self.r + 1),
            HexCoord::new(self.q, self.r + 1),
        ]
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Every coordinate within `radius` steps of the origin.
    ///
    /// Ordered by `q` then `r`, which is the order tiles receive terrain and
    /// number tokens in. Always yields `3R² + 3R + 1` coordinates, or `None` when
    /// `radius` exceeds [`MAX_DISK_RADIUS`].
    pub fn disk(radius: u32) -> Option<Vec<HexCoord>> {
        let size = Self::disk_size(radius)?;
        let radius = i32::try_from(radius).ok()?;
        let mut coords = Vec::with_capacity(size);
        for q in -radius..=radius {
            let r1 = (-radius).max(-q - radius);
            let r2 = radius.min(-q + radius);
            for r in r1..=r2 {
                coords.push(HexCoord::new(q, r));
            }
        }
        Some(coords)
    }

    /// Number of tiles in a disk of the given radius, `None` above [`MAX_DISK_RADIUS`]
    pub fn disk_size(radius: u32) -> Option<usize> {
        if radius > MAX_DISK_RADIUS {
            return None;
        }
        let r = usize::try_from(radius).ok()?;
        r.checked_mul(r)?.checked_mul(3)?.checked_add(r.checked_mul(3)?)?.checked_add(1)
    }

    /// The six corners of this hex, counter-clockwise starting from the +x corner
    pub fn corners(&self) -> [CornerKey; 6] {
        let base_u = 3 * self.q;
        let base_v = 2 * self.r + self.q;
        std::array::from_fn(|i| CornerKey::new(base_u + CORNER_U[i], base_v + CORNER_V[i]))
    }

    /// The six sides of this hex, each joining consecutive corners (wrapping)
    pub fn edges(&self) -> [EdgeKey; 6] {
        let corners = self.corners();
        std::array::from_fn(|i| EdgeKey::new(corners[i], corners[(i + 1) % 6]))
    }

    /// World-space centre of this hex (x, z) for the given hex size (centre-to-corner radius)
    pub fn to_world(&self, hex_size: f64) -> (f64, f64) {
        let x = hex_size * 1.5 * self.q as f64;
        let z = hex_size * sqrt_3() * (self.r as f64 + self.q as f64 / 2.0);
        (x, z)
    }

    /// The hex containing a world-space point
    pub fn from_world(x: f64, z: f64, hex_size: f64) -> Self {
        let q = (2.0 / 3.0 * x) / hex_size;
        let r = (-1.0 / 3.0 * x + sqrt_3() / 3.0 * z) / hex_size;
        Self::axial_round(q, r)
    }

    /// Round fractional axial coordinates to nearest hex
    fn axial_round(q: f64, r: f64) -> Self {
        let s = -q - r;

        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();

        let q_diff = (rq - q).abs();
        let r_diff = (rr - r).abs();
        let s_diff = (rs - s).abs();

        if q_diff > r_diff && q_diff > s_diff {
            rq = -rr - rs;
        } else if r_diff > s_diff {
            rr = -rq - rs;
        }

        Self::new(rq as i32, rr as i32)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Corner key - identifies a corner where up to 3 hexes meet.
///
/// `u` counts half hex sizes along x, `v` counts `sqrt(3)/2` hex sizes along z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CornerKey {
    pub u: i32,
    pub v: i32,
}

impl CornerKey {
    pub const fn new(u: i32, v: i32) -> Self {
        Self { u, v }
    }

    /// World-space position (x, z) of this corner
    pub fn to_world(&self, hex_size: f64) -> (f64, f64) {
        (
            self.u as f64 * hex_size / 2.0,
            self.v as f64 * hex_size * sqrt_3() / 2.0,
        )
    }

    /// Snap a world-space point to the corner lattice.
    ///
    /// Returns `None` when the point is not close to a lattice point. A returned key
    /// may still not exist on a given board; look it up through the graph.
    pub fn from_world(x: f64, z: f64, hex_size: f64) -> Option<Self> {
        if hex_size <= 0.0 {
            return None;
        }
        let u = 2.0 * x / hex_size;
        let v = 2.0 * z / (sqrt_3() * hex_size);
        let (ru, rv) = (u.round(), v.round());
        if (u - ru).abs() > SNAP_TOLERANCE || (v - rv).abs() > SNAP_TOLERANCE {
            return None;
        }
        Some(Self::new(ru as i32, rv as i32))
    }
}

impl fmt::Display for CornerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.u, self.v)
    }
}

/// Errors from parsing the text form of a key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("malformed corner key `{0}`, expected `u,v`")]
    Corner(String),

    #[error("malformed edge key `{0}`, expected `u,v/u,v`")]
    Edge(String),
}

impl FromStr for CornerKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || KeyParseError::Corner(s.to_string());
        let (u, v) = s.split_once(',').ok_or_else(malformed)?;
        let u = u.trim().parse().map_err(|_| malformed())?;
        let v = v.trim().parse().map_err(|_| malformed())?;
        Ok(Self::new(u, v))
    }
}

/// Edge key - identifies the side joining two corners.
///
/// The endpoints are stored in sorted order, so the same side discovered from either
/// neighbouring tile (or walked in either direction) always yields the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    a: CornerKey,
    b: CornerKey,
}

impl EdgeKey {
    /// Create an edge key from its two endpoints, in either order
    pub fn new(x: CornerKey, y: CornerKey) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    /// The two endpoint corners, smaller key first
    pub fn endpoints(&self) -> [CornerKey; 2] {
        [self.a, self.b]
    }

    /// The endpoint opposite `corner`, or `None` if `corner` is not an endpoint
    pub fn other_end(&self, corner: CornerKey) -> Option<CornerKey> {
        if corner == self.a {
            Some(self.b)
        } else if corner == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    /// World-space midpoint (x, z)
    pub fn midpoint(&self, hex_size: f64) -> (f64, f64) {
        let (x1, z1) = self.a.to_world(hex_size);
        let (x2, z2) = self.b.to_world(hex_size);
        ((x1 + x2) / 2.0, (z1 + z2) / 2.0)
    }

    /// World-space distance between the endpoints
    pub fn length(&self, hex_size: f64) -> f64 {
        let (x1, z1) = self.a.to_world(hex_size);
        let (x2, z2) = self.b.to_world(hex_size);
        ((x2 - x1).powi(2) + (z2 - z1).powi(2)).sqrt()
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.a, self.b)
    }
}

impl FromStr for EdgeKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || KeyParseError::Edge(s.to_string());
        let (a, b) = s.split_once('/').ok_or_else(malformed)?;
        let a = a.parse::<CornerKey>().map_err(|_| malformed())?;
        let b = b.parse::<CornerKey>().map_err(|_| malformed())?;
        Ok(Self::new(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_hex_neighbors() {
        let center = HexCoord::new(0, 0);
        let neighbors = center.neighbors();

        let unique: HashSet<_> = neighbors.iter().collect();
        assert_eq!(unique.len(), 6);

        for neighbor in &neighbors {
            assert_eq!(center.distance_to(neighbor), 1);
        }
    }

    #[test]
    fn test_hex_distance() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(2, -1);
        assert_eq!(a.distance_to(&b), 2);

        let c = HexCoord::new(-3, 3);
        assert_eq!(a.distance_to(&c), 3);
    }

    #[test]
    fn test_disk_sizes() {
        for radius in 0..5 {
            let disk = HexCoord::disk(radius).unwrap();
            assert_eq!(Some(disk.len()), HexCoord::disk_size(radius));
            let unique: HashSet<_> = disk.iter().collect();
            assert_eq!(unique.len(), disk.len());
            for coord in &disk {
                assert!(coord.distance_to(&HexCoord::default()) <= radius);
            }
        }
        assert_eq!(HexCoord::disk(2).map(|d| d.len()), Some(19));
    }

    #[test]
    fn test_oversized_disk_is_refused() {
        assert_eq!(HexCoord::disk_size(MAX_DISK_RADIUS), Some(3 * 1024 * 1024 + 3 * 1024 + 1));
        assert_eq!(HexCoord::disk_size(MAX_DISK_RADIUS + 1), None);
        assert_eq!(HexCoord::disk_size(u32::MAX), None);
        assert!(HexCoord::disk(u32::MAX).is_none());

        // The outermost corner of the largest disk is still representable
        let edge = HexCoord::new(MAX_DISK_RADIUS as i32, 0);
        assert_eq!(edge.corners()[0], CornerKey::new(3 * 1024 + 2, 1024));
    }

    #[test]
    fn test_corner_keys_match_geometry() {
        let size = 1.7;
        for hex in HexCoord::disk(2).unwrap() {
            let (cx, cz) = hex.to_world(size);
            for (i, corner) in hex.corners().iter().enumerate() {
                let angle = i as f64 * std::f64::consts::PI / 3.0;
                let (x, z) = corner.to_world(size);
                assert!((x - (cx + angle.cos() * size)).abs() < EPSILON);
                assert!((z - (cz + angle.sin() * size)).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn test_shared_corners_have_identical_keys() {
        // Computing a corner independently from each tile touching it must agree
        let size = 1.0;
        for hex in HexCoord::disk(2).unwrap() {
            for neighbor in hex.neighbors() {
                let ours: HashSet<_> = hex.corners().into_iter().collect();
                let theirs: HashSet<_> = neighbor.corners().into_iter().collect();
                let shared: Vec<_> = ours.intersection(&theirs).copied().collect();
                assert_eq!(shared.len(), 2, "{hex} and {neighbor} share one side");

                for key in shared {
                    let (x, z) = key.to_world(size);
                    assert_eq!(CornerKey::from_world(x, z, size), Some(key));
                }

                let ours: HashSet<_> = hex.edges().into_iter().collect();
                let theirs: HashSet<_> = neighbor.edges().into_iter().collect();
                assert_eq!(ours.intersection(&theirs).count(), 1);
            }
        }
    }

    #[test]
    fn test_corner_snapping() {
        let size = 2.0;
        let key = CornerKey::new(5, -3);
        let (x, z) = key.to_world(size);

        assert_eq!(CornerKey::from_world(x + 0.01, z - 0.01, size), Some(key));
        assert_eq!(CornerKey::from_world(x + 0.5, z, size), None);
        assert_eq!(CornerKey::from_world(x, z, 0.0), None);
    }

    #[test]
    fn test_edge_canonical_equality() {
        let a = CornerKey::new(2, 0);
        let b = CornerKey::new(1, 1);

        assert_eq!(EdgeKey::new(a, b), EdgeKey::new(b, a));
        assert_eq!(EdgeKey::new(a, b).other_end(a), Some(b));
        assert_eq!(EdgeKey::new(a, b).other_end(CornerKey::new(9, 9)), None);
    }

    #[test]
    fn test_hex_edges_have_unit_length() {
        let hex = HexCoord::new(1, -2);
        let edges = hex.edges();

        let unique: HashSet<_> = edges.iter().collect();
        assert_eq!(unique.len(), 6);
        for edge in edges {
            assert!((edge.length(1.5) - 1.5).abs() < EPSILON);
        }
    }

    #[test]
    fn test_world_round_trip() {
        let original = HexCoord::new(3, -2);
        let (x, z) = original.to_world(60.0);
        assert_eq!(HexCoord::from_world(x, z, 60.0), original);
        assert_eq!(HexCoord::from_world(x + 20.0, z - 10.0, 60.0), original);
    }

    #[test]
    fn test_key_text_form() {
        let edge = EdgeKey::new(CornerKey::new(-1, 1), CornerKey::new(-2, 0));
        assert_eq!(edge.to_string(), "-2,0/-1,1");
        assert_eq!("-1,1/-2,0".parse::<EdgeKey>(), Ok(edge));
        assert_eq!("4, -3".parse::<CornerKey>(), Ok(CornerKey::new(4, -3)));
        assert!("4;-3".parse::<CornerKey>().is_err());
        assert!("1,2".parse::<EdgeKey>().is_err());
    }
}

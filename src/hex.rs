use serde::{Deserialize, Serialize};

/// Direction around a hex cell, fixed clockwise order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    NE,
    E,
    SE,
    SW,
    W,
    NW,
}

/// All six directions in their fixed clockwise order.
pub const DIRECTIONS: [Direction; 6] = [
    Direction::NE,
    Direction::E,
    Direction::SE,
    Direction::SW,
    Direction::W,
    Direction::NW,
];

impl Direction {
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The direction three steps around the clock. This is a cheap geometric
    /// guess; callers that need the true return direction for a specific
    /// cell should use `return_direction` instead, since odd-row offset
    /// coordinates can disagree with it at grid boundaries.
    pub fn opposite(&self) -> Direction {
        DIRECTIONS[(self.index() + 3) % 6]
    }
}

impl From<usize> for Direction {
    fn from(i: usize) -> Self {
        DIRECTIONS[i % 6]
    }
}

// Neighbour offsets in odd-row offset coordinates, keyed by row parity.
// Derived from axial coordinates q = x - (z - z.rem_euclid(2)) / 2, r = z,
// walking the six unit axial steps NE(+1,-1) E(+1,0) SE(0,+1) SW(-1,+1)
// W(-1,0) NW(0,-1) and converting back to offset space.
const NEIGHBOUR_OFFSETS_EVEN_ROW: [(i64, i64); 6] = [
    (0, -1),  // NE
    (1, 0),   // E
    (0, 1),   // SE
    (-1, 1),  // SW
    (-1, 0),  // W
    (-1, -1), // NW
];

const NEIGHBOUR_OFFSETS_ODD_ROW: [(i64, i64); 6] = [
    (1, -1), // NE
    (1, 0),  // E
    (1, 1),  // SE
    (0, 1),  // SW
    (-1, 0), // W
    (0, -1), // NW
];

/// Offset to the neighbour in `dir`, given the row (`z`) the stepping cell
/// sits in. Odd and even rows are staggered differently in this coordinate
/// system, so the table is keyed by row parity rather than being a single
/// fixed 6-entry table.
pub fn neighbour_offset(z: i64, dir: Direction) -> (i64, i64) {
    let table = if z.rem_euclid(2) == 0 {
        &NEIGHBOUR_OFFSETS_EVEN_ROW
    } else {
        &NEIGHBOUR_OFFSETS_ODD_ROW
    };
    table[dir.index()]
}

/// True if the offset cell `(col, row)` lies within a hex disc of radius `R`
/// centred at the origin. Used by callers to clip a rectangular grid to a
/// hex-shaped playable area.
pub fn in_radius(col: i64, row: i64, radius: i64) -> bool {
    let q = col - (row - row.rem_euclid(2)) / 2;
    let r = row;
    let x = q;
    let z = r;
    let y = -x - z;
    x.abs().max(y.abs()).max(z.abs()) <= radius
}

/// Rotate an edge-labelled record by `r` steps clockwise: the terrain that
/// sat at direction `i` at rotation 0 ends up at direction `(i + r) mod 6`.
pub fn rotate_edges<T: Copy + Default>(edges: [T; 6], r: u8) -> [T; 6] {
    let mut out = [T::default(); 6];
    for i in 0..6 {
        out[(i + r as usize) % 6] = edges[i];
    }
    out
}

/// The direction `d'` such that stepping from `(x, z)` by `dir` and then
/// from the neighbour by `d'` lands back at `(x, z)`. Computed by brute
/// force rather than assumed to be the geometric opposite, since odd-row
/// offset coordinates can break that assumption at parity boundaries.
pub fn return_direction(x: i64, z: i64, dir: Direction) -> Direction {
    let (dx, dz) = neighbour_offset(z, dir);
    let (nx, nz) = (x + dx, z + dz);
    for candidate in DIRECTIONS {
        let (rdx, rdz) = neighbour_offset(nz, candidate);
        if nx + rdx == x && nz + rdz == z {
            return candidate;
        }
    }
    unreachable!("no return direction found for a well-formed offset table")
}

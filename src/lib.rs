//! Hex wave function collapse core: a tile library, a hex neighbour model
//! in odd-row offset coordinates, an adjacency index, and a seeded,
//! restart-on-contradiction solver. Rendering, mesh placement, and GUI
//! binding are out of scope; callers take the returned placements and map
//! them into their own world space.

pub mod adjacency;
pub mod cell;
pub mod error;
pub mod hex;
pub mod rng;
pub mod solver;
pub mod tile;
pub mod wasm;

pub use adjacency::{AdjacencyIndex, StateInfo, StateKey};
pub use cell::Cell;
pub use error::WfcError;
pub use hex::{Direction, DIRECTIONS};
pub use rng::Mulberry32;
pub use solver::{
    CollapseEvent, Contradiction, LogFn, Placement, SeedSpec, Solver, SolverOptions,
};
pub use tile::{EdgeTerrain, TileLibrary, TilePrototype, TileType};

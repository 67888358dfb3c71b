use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::adjacency::{AdjacencyIndex, StateKey};
use crate::cell::Cell;
use crate::error::WfcError;
use crate::hex::{return_direction, Direction, DIRECTIONS};
use crate::rng::Mulberry32;
use crate::tile::{EdgeTerrain, TileLibrary, TileType};

const ENTROPY_JITTER_SCALE: f64 = 1e-3;

/// A pre-placed tile the solver must honour before any random collapse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeedSpec {
    pub x: usize,
    pub z: usize,
    pub tile_type: TileType,
    pub rotation: u8,
    pub level: u8,
}

/// One cell's final, chosen state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub grid_x: usize,
    pub grid_z: usize,
    pub tile_type: TileType,
    pub rotation: u8,
    pub level: u8,
}

/// One entry in the collapse trace, in the order collapses actually
/// happened (seeds first, then weighted-random collapses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapseEvent {
    pub x: usize,
    pub z: usize,
    pub tile_type: TileType,
    pub rotation: u8,
    pub level: u8,
}

/// Diagnostic describing the most recent contradiction, whether it came
/// from incompatible seeds or from a mid-solve restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contradiction {
    pub failed_x: usize,
    pub failed_z: usize,
    pub direction: Option<Direction>,
    pub message: String,
}

pub type LogFn = Box<dyn Fn(&str, &str) + Send + Sync>;

fn noop_log(_message: &str, _tag: &str) {}

/// Construction options. `max_level` and `tile_types` default to the full
/// range and full set the adjacency index was built with when left `None`.
pub struct SolverOptions {
    pub weights: HashMap<TileType, f64>,
    pub seed: Option<u32>,
    pub max_restarts: u32,
    pub tile_types: Option<HashSet<TileType>>,
    pub max_level: Option<u8>,
    /// When set, two `grass` edges are considered compatible regardless of
    /// `edge_level`, allowing a vertical cliff-like jump. Off by default:
    /// strict level matching everywhere.
    pub grass_spans_levels: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            weights: HashMap::new(),
            seed: None,
            max_restarts: 10,
            tile_types: None,
            max_level: None,
            grass_spans_levels: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct NeighbourDesc {
    dir: Direction,
    return_dir: Direction,
    nx: usize,
    nz: usize,
}

/// Owns the grid, the neighbour table, the propagation stack, the
/// deterministic RNG, the restart counter, and the collapse trace for one
/// family of solve attempts. Does not mutate the adjacency index it was
/// built with, which may be shared with any number of other solvers.
pub struct Solver {
    width: usize,
    height: usize,
    index: Arc<AdjacencyIndex>,
    options: SolverOptions,
    rng: Mulberry32,
    state_weights: Vec<f64>,
    allowed_states: HashSet<StateKey>,
    grid: Vec<Cell>,
    neighbours: Vec<Vec<NeighbourDesc>>,
    stack: Vec<usize>,
    restart_count: u32,
    collapse_trace: Vec<CollapseEvent>,
    last_contradiction: Option<Contradiction>,
    log: LogFn,
}

enum LoopResult {
    Success,
    Contradiction,
}

impl Solver {
    pub fn new(
        width: usize,
        height: usize,
        index: Arc<AdjacencyIndex>,
        library: &TileLibrary,
        options: SolverOptions,
        log: Option<LogFn>,
    ) -> Result<Solver, WfcError> {
        let max_level = options.max_level.unwrap_or_else(|| index.max_level());
        if max_level > index.max_level() {
            return Err(WfcError::InvalidMaxLevel {
                requested: max_level,
                built_for: index.max_level(),
            });
        }

        let tile_types: HashSet<TileType> = match &options.tile_types {
            Some(types) => types.clone(),
            None => index.states().iter().map(|s| s.tile_type).collect(),
        };
        for t in &tile_types {
            if library.get(*t).is_none() {
                return Err(WfcError::UnknownTileType(*t));
            }
        }

        let allowed_states: HashSet<StateKey> = (0..index.states().len() as StateKey)
            .filter(|&key| {
                let info = index.state_info(key);
                tile_types.contains(&info.tile_type) && info.level <= max_level
            })
            .collect();

        let mut state_weights = vec![1.0; index.states().len()];
        for (key, weight) in state_weights.iter_mut().enumerate() {
            let info = index.state_info(key as StateKey);
            *weight = options
                .weights
                .get(&info.tile_type)
                .copied()
                .or_else(|| library.get(info.tile_type).map(|p| p.weight as f64))
                .unwrap_or(1.0);
        }

        let rng = match options.seed {
            Some(seed) => Mulberry32::new(seed),
            None => Mulberry32::from_entropy(),
        };

        Ok(Solver {
            width,
            height,
            index,
            options,
            rng,
            state_weights,
            allowed_states,
            grid: Vec::new(),
            neighbours: Vec::new(),
            stack: Vec::new(),
            restart_count: 0,
            collapse_trace: Vec::new(),
            last_contradiction: None,
            log: log.unwrap_or_else(|| Box::new(noop_log)),
        })
    }

    pub fn restart_count(&self) -> u32 {
        self.restart_count
    }

    pub fn last_contradiction(&self) -> Option<&Contradiction> {
        self.last_contradiction.as_ref()
    }

    pub fn collapse_order(&self) -> &[CollapseEvent] {
        &self.collapse_trace
    }

    fn index_of(&self, x: usize, z: usize) -> usize {
        z * self.width + x
    }

    fn coords_of(&self, idx: usize) -> (usize, usize) {
        (idx % self.width, idx / self.width)
    }

    /// Clears the collapse trace and propagation stack, allocates a fresh
    /// grid in full superposition, and precomputes each cell's in-bounds
    /// neighbour descriptors. Called at the start of `solve` and again on
    /// every restart.
    fn init(&mut self) {
        self.collapse_trace.clear();
        self.stack.clear();

        self.grid = (0..self.width * self.height)
            .map(|_| Cell::new(self.allowed_states.clone()))
            .collect();

        self.neighbours = (0..self.width * self.height)
            .map(|idx| {
                let (x, z) = self.coords_of(idx);
                DIRECTIONS
                    .iter()
                    .filter_map(|&dir| {
                        let (dx, dz) = crate::hex::neighbour_offset(z as i64, dir);
                        let nx = x as i64 + dx;
                        let nz = z as i64 + dz;
                        if nx < 0 || nz < 0 || nx >= self.width as i64 || nz >= self.height as i64
                        {
                            return None;
                        }
                        let return_dir = return_direction(x as i64, z as i64, dir);
                        Some(NeighbourDesc {
                            dir,
                            return_dir,
                            nx: nx as usize,
                            nz: nz as usize,
                        })
                    })
                    .collect()
            })
            .collect();
    }

    fn state_weight(&self, key: StateKey) -> f64 {
        self.state_weights[key as usize]
    }

    /// Applies every in-bounds seed, collapsing its cell, checking it
    /// against any already-collapsed neighbour (typically an earlier
    /// seed), and pushing it onto the propagation stack. Out-of-bounds
    /// seeds are silently skipped; an already-collapsed target cell is
    /// left as-is. Returns `false` the moment two seeds turn out to be
    /// mutually incompatible.
    fn apply_seeds(&mut self, seeds: &[SeedSpec]) -> bool {
        for seed in seeds {
            if seed.x >= self.width || seed.z >= self.height {
                (self.log)(
                    &format!(
                        "seed at ({}, {}) is out of bounds for a {}x{} grid, skipping",
                        seed.x, seed.z, self.width, self.height
                    ),
                    "warn",
                );
                continue;
            }

            let idx = self.index_of(seed.x, seed.z);
            if self.grid[idx].collapsed {
                continue;
            }

            let key = match self.index.key_of(seed.tile_type, seed.rotation, seed.level) {
                Some(key) if self.allowed_states.contains(&key) => key,
                _ => {
                    self.last_contradiction = Some(Contradiction {
                        failed_x: seed.x,
                        failed_z: seed.z,
                        direction: None,
                        message: format!(
                            "seed (type={}, rotation={}, level={}) is not a valid state for this solver's configuration",
                            seed.tile_type, seed.rotation, seed.level
                        ),
                    });
                    return false;
                }
            };

            self.grid[idx].collapse_to(key);
            self.collapse_trace.push(CollapseEvent {
                x: seed.x,
                z: seed.z,
                tile_type: seed.tile_type,
                rotation: seed.rotation,
                level: seed.level,
            });
            self.stack.push(idx);

            for desc in self.neighbours[idx].clone() {
                let neighbour_idx = self.index_of(desc.nx, desc.nz);
                if !self.grid[neighbour_idx].collapsed {
                    continue;
                }
                let neighbour_key = self.grid[neighbour_idx].chosen.unwrap();
                let (terrain_a, level_a) = self.index.state_edge(key, desc.dir);
                let (terrain_b, level_b) = self.index.state_edge(neighbour_key, desc.return_dir);
                if !self.edges_compatible(terrain_a, level_a, terrain_b, level_b) {
                    self.last_contradiction = Some(Contradiction {
                        failed_x: seed.x,
                        failed_z: seed.z,
                        direction: Some(desc.dir),
                        message: format!(
                            "seed at ({}, {}) conflicts with already-seeded neighbour at ({}, {})",
                            seed.x, seed.z, desc.nx, desc.nz
                        ),
                    });
                    return false;
                }
            }
        }
        true
    }

    fn edges_compatible(
        &self,
        terrain_a: EdgeTerrain,
        level_a: u8,
        terrain_b: EdgeTerrain,
        level_b: u8,
    ) -> bool {
        if terrain_a != terrain_b {
            return false;
        }
        if self.options.grass_spans_levels && terrain_a == EdgeTerrain::Grass {
            return true;
        }
        level_a == level_b
    }

    /// States from the index that can sit at `dir` from an edge of
    /// `(terrain, edge_level)`, relaxed across levels for grass edges when
    /// `grass_spans_levels` is set.
    fn candidates_for(&self, terrain: EdgeTerrain, dir: Direction, edge_level: u8) -> Vec<StateKey> {
        if self.options.grass_spans_levels && terrain == EdgeTerrain::Grass {
            let max_level = self.options.max_level.unwrap_or_else(|| self.index.max_level());
            let mut out = Vec::new();
            for level in 0..=max_level {
                out.extend_from_slice(self.index.candidates(terrain, dir, level));
            }
            out
        } else {
            self.index.candidates(terrain, dir, edge_level).to_vec()
        }
    }

    /// Iterative worklist over the propagation stack. Returns `false` and
    /// records a contradiction descriptor the moment a neighbour's
    /// possibility set is reduced to empty.
    fn propagate(&mut self) -> bool {
        while let Some(idx) = self.stack.pop() {
            let current_possibilities = self.grid[idx].possibilities.clone();
            let descs = self.neighbours[idx].clone();

            for desc in descs {
                let neighbour_idx = self.index_of(desc.nx, desc.nz);
                if self.grid[neighbour_idx].collapsed {
                    continue;
                }

                let mut allowed_in_neighbour: HashSet<StateKey> = HashSet::new();
                let mut seen_edges: HashSet<(EdgeTerrain, u8)> = HashSet::new();
                for &state_key in &current_possibilities {
                    let edge = self.index.state_edge(state_key, desc.dir);
                    if !seen_edges.insert(edge) {
                        continue;
                    }
                    let (terrain, edge_level) = edge;
                    allowed_in_neighbour
                        .extend(self.candidates_for(terrain, desc.return_dir, edge_level));
                }

                let neighbour = &mut self.grid[neighbour_idx];
                let before = neighbour.possibilities.len();
                if neighbour
                    .possibilities
                    .iter()
                    .all(|k| allowed_in_neighbour.contains(k))
                {
                    continue;
                }

                neighbour
                    .possibilities
                    .retain(|k| allowed_in_neighbour.contains(k));
                let after = neighbour.possibilities.len();

                if after == 0 {
                    self.last_contradiction = Some(Contradiction {
                        failed_x: desc.nx,
                        failed_z: desc.nz,
                        direction: Some(desc.dir),
                        message: format!(
                            "cell ({}, {}) has no remaining states compatible with its {} neighbour",
                            desc.nx, desc.nz, before
                        ),
                    });
                    return false;
                }

                if after < before {
                    self.stack.push(neighbour_idx);
                }
            }
        }
        true
    }

    fn select_min_entropy_cell(&mut self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for idx in 0..self.grid.len() {
            let cell = &self.grid[idx];
            if cell.collapsed || cell.possibilities.is_empty() {
                continue;
            }
            let jitter = self.rng.next_f64() * ENTROPY_JITTER_SCALE;
            let entropy = cell.entropy(jitter);
            if best.map_or(true, |(_, best_entropy)| entropy < best_entropy) {
                best = Some((idx, entropy));
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn collapse_index(&mut self, idx: usize) {
        let mut keys: Vec<StateKey> = self.grid[idx].possibilities.iter().copied().collect();
        keys.sort_unstable();

        let total: f64 = keys.iter().map(|&k| self.state_weight(k)).sum();
        let roll = self.rng.next_f64() * total;

        let mut running = 0.0;
        let mut chosen = *keys.last().expect("possibility set is non-empty");
        for &k in &keys {
            running += self.state_weight(k);
            if roll < running {
                chosen = k;
                break;
            }
        }

        let (x, z) = self.coords_of(idx);
        self.grid[idx].collapse_to(chosen);
        self.stack.push(idx);

        let info = self.index.state_info(chosen);
        self.collapse_trace.push(CollapseEvent {
            x,
            z,
            tile_type: info.tile_type,
            rotation: info.rotation,
            level: info.level,
        });
    }

    fn run_loop(&mut self) -> LoopResult {
        loop {
            match self.select_min_entropy_cell() {
                None => return LoopResult::Success,
                Some(idx) => {
                    self.collapse_index(idx);
                    if !self.propagate() {
                        return LoopResult::Contradiction;
                    }
                }
            }
        }
    }

    fn extract(&self) -> Vec<Placement> {
        let mut placements = Vec::with_capacity(self.grid.len());
        for idx in 0..self.grid.len() {
            let (x, z) = self.coords_of(idx);
            let key = self.grid[idx]
                .chosen
                .expect("extract called on a fully collapsed grid");
            let info = self.index.state_info(key);
            placements.push(Placement {
                grid_x: x,
                grid_z: z,
                tile_type: info.tile_type,
                rotation: info.rotation,
                level: info.level,
            });
        }
        placements
    }

    /// Builds a fresh grid, applies `seeds`, propagates, and then
    /// repeatedly selects the lowest-entropy cell, weighted-collapses it,
    /// and propagates again until every cell is collapsed or the
    /// configured restart budget is exhausted. The RNG stream persists
    /// across restarts so the run as a whole stays deterministic under a
    /// fixed seed.
    pub fn solve(&mut self, seeds: &[SeedSpec]) -> Option<Vec<Placement>> {
        self.restart_count = 0;
        self.last_contradiction = None;
        loop {
            self.init();

            if self.allowed_states.is_empty() {
                (self.log)(
                    "configured tile set produced no usable states",
                    "error",
                );
                self.last_contradiction = Some(Contradiction {
                    failed_x: 0,
                    failed_z: 0,
                    direction: None,
                    message: "no states available for the configured tile types and max_level"
                        .into(),
                });
                return None;
            }

            if !self.apply_seeds(seeds) {
                (self.log)("seeding produced a contradiction", "error");
                return None;
            }

            if !self.propagate() {
                (self.log)("seed propagation produced a contradiction", "error");
                return None;
            }

            match self.run_loop() {
                LoopResult::Success => return Some(self.extract()),
                LoopResult::Contradiction => {
                    if self.restart_count >= self.options.max_restarts {
                        (self.log)("restart budget exhausted, giving up", "error");
                        return None;
                    }
                    self.restart_count += 1;
                    (self.log)(
                        &format!(
                            "contradiction, restart {}/{}",
                            self.restart_count, self.options.max_restarts
                        ),
                        "warn",
                    );
                }
            }
        }
    }
}

use std::sync::Arc;

use wasm_bindgen::prelude::*;

use crate::adjacency::AdjacencyIndex;
use crate::error::WfcError;
use crate::solver::{CollapseEvent, Contradiction, Placement, SeedSpec, Solver, SolverOptions};
use crate::tile::TileLibrary;

impl From<WfcError> for JsValue {
    fn from(error: WfcError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

/// Thin JSON-speaking wrapper around `Solver` for a JS/three.js renderer:
/// load a tile library, configure a run, solve, and read back placements.
/// The core itself defines no wire protocol; this is just one binding.
#[wasm_bindgen]
pub struct WfcSolver {
    width: usize,
    height: usize,
    seed: Option<u32>,
    max_restarts: u32,
    max_level: Option<u8>,
    grass_spans_levels: bool,
    library: Option<TileLibrary>,
    solver: Option<Solver>,
    result: Option<Vec<Placement>>,
}

#[wasm_bindgen]
impl WfcSolver {
    #[wasm_bindgen(constructor)]
    pub fn new(width: usize, height: usize, seed: Option<u32>) -> WfcSolver {
        WfcSolver {
            width,
            height,
            seed,
            max_restarts: 10,
            max_level: None,
            grass_spans_levels: false,
            library: None,
            solver: None,
            result: None,
        }
    }

    #[wasm_bindgen]
    pub fn set_max_restarts(&mut self, max_restarts: u32) {
        self.max_restarts = max_restarts;
    }

    #[wasm_bindgen]
    pub fn set_max_level(&mut self, max_level: Option<u8>) {
        self.max_level = max_level;
    }

    #[wasm_bindgen]
    pub fn set_grass_spans_levels(&mut self, enabled: bool) {
        self.grass_spans_levels = enabled;
    }

    /// Loads a tile library from JSON and rebuilds the adjacency index and
    /// solver for the configured grid.
    #[wasm_bindgen]
    pub fn load_library(&mut self, library_json: &str) -> Result<(), JsValue> {
        let library = TileLibrary::from_json(library_json)?;

        let tile_types: Vec<u32> = library.tile_types().copied().collect();
        let levels = self.max_level.unwrap_or(0);
        let index = AdjacencyIndex::build(&library, &tile_types, levels)?;

        let options = SolverOptions {
            seed: self.seed,
            max_restarts: self.max_restarts,
            max_level: self.max_level,
            grass_spans_levels: self.grass_spans_levels,
            ..SolverOptions::default()
        };

        let solver = Solver::new(
            self.width,
            self.height,
            Arc::new(index),
            &library,
            options,
            None,
        )?;

        self.library = Some(library);
        self.solver = Some(solver);
        self.result = None;
        Ok(())
    }

    /// Runs the solver against the given seed cells (JSON array of
    /// `SeedSpec`). Returns `true` on success, `false` on a reported
    /// contradiction (check `get_last_contradiction` for detail).
    #[wasm_bindgen]
    pub fn solve(&mut self, seeds_json: &str) -> Result<bool, JsValue> {
        let seeds: Vec<SeedSpec> = serde_json::from_str(seeds_json)
            .map_err(|e| JsValue::from_str(&format!("invalid seeds JSON: {e}")))?;

        match &mut self.solver {
            Some(solver) => match solver.solve(&seeds) {
                Some(placements) => {
                    self.result = Some(placements);
                    Ok(true)
                }
                None => {
                    self.result = None;
                    Ok(false)
                }
            },
            None => Err(JsValue::from_str(
                "solver not initialized, call load_library() first",
            )),
        }
    }

    #[wasm_bindgen]
    pub fn get_placements(&self) -> Result<JsValue, JsValue> {
        match &self.result {
            Some(placements) => serde_wasm_bindgen::to_value(placements)
                .map_err(|e| JsValue::from_str(&e.to_string())),
            None => Err(JsValue::from_str("no placements available, solve() first")),
        }
    }

    #[wasm_bindgen]
    pub fn get_collapse_order(&self) -> Result<JsValue, JsValue> {
        let solver = self
            .solver
            .as_ref()
            .ok_or_else(|| JsValue::from_str("solver not initialized"))?;
        let trace: &[CollapseEvent] = solver.collapse_order();
        serde_wasm_bindgen::to_value(trace).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn get_last_contradiction(&self) -> Result<JsValue, JsValue> {
        let solver = self
            .solver
            .as_ref()
            .ok_or_else(|| JsValue::from_str("solver not initialized"))?;
        match solver.last_contradiction() {
            Some(c) => {
                let c: Contradiction = c.clone();
                serde_wasm_bindgen::to_value(&c).map_err(|e| JsValue::from_str(&e.to_string()))
            }
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen]
    pub fn get_restart_count(&self) -> Result<u32, JsValue> {
        self.solver
            .as_ref()
            .map(|s| s.restart_count())
            .ok_or_else(|| JsValue::from_str("solver not initialized"))
    }
}

use std::collections::HashSet;

use crate::adjacency::StateKey;

/// Per grid position: a possibility set, a collapsed flag, and (once
/// collapsed) the chosen state.
#[derive(Debug, Clone)]
pub struct Cell {
    pub possibilities: HashSet<StateKey>,
    pub collapsed: bool,
    pub chosen: Option<StateKey>,
}

impl Cell {
    pub fn new(possibilities: HashSet<StateKey>) -> Self {
        Cell {
            possibilities,
            collapsed: false,
            chosen: None,
        }
    }

    /// `+infinity` when collapsed; otherwise `ln(|possibilities|) + jitter`.
    /// `jitter` is drawn by the caller from the solver's RNG so the random
    /// draw sequence stays reproducible.
    pub fn entropy(&self, jitter: f64) -> f64 {
        if self.collapsed {
            f64::INFINITY
        } else {
            (self.possibilities.len() as f64).ln() + jitter
        }
    }

    pub fn collapse_to(&mut self, state: StateKey) {
        self.possibilities.clear();
        self.possibilities.insert(state);
        self.collapsed = true;
        self.chosen = Some(state);
    }

    pub fn remove(&mut self, state: StateKey) -> bool {
        self.possibilities.remove(&state)
    }
}

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::WfcError;
use crate::hex::{rotate_edges, Direction};

pub type TileType = u32;

/// A terrain tag on one of a tile's six edges. Two cells touching on an
/// edge are compatible iff their facing edges share the same tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeTerrain {
    Grass,
    Road,
    River,
    Ocean,
    Coast,
}

impl Default for EdgeTerrain {
    fn default() -> Self {
        EdgeTerrain::Grass
    }
}

fn default_weight() -> u32 {
    1
}

/// A tile prototype as authored, at rotation 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilePrototype {
    pub tile_type: TileType,
    /// Terrain at each direction, at rotation 0.
    pub edges: [EdgeTerrain; 6],
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Directions whose outgoing edge sits at `base_level + level_increment`
    /// instead of `base_level`. Empty for flat tiles.
    #[serde(default)]
    pub high_edges: Vec<Direction>,
    /// Elevation jump of the high edges. Undefined (treated as 0) for flat
    /// tiles.
    #[serde(default)]
    pub level_increment: u8,
}

impl TilePrototype {
    pub fn is_slope(&self) -> bool {
        self.level_increment > 0 && !self.high_edges.is_empty()
    }

    pub fn rotated_edges(&self, rotation: u8) -> [EdgeTerrain; 6] {
        rotate_edges(self.edges, rotation)
    }

    pub fn rotated_high_edges(&self, rotation: u8) -> HashSet<Direction> {
        let mut flags = [false; 6];
        for d in &self.high_edges {
            flags[d.index()] = true;
        }
        let rotated = rotate_edges(flags, rotation);
        rotated
            .iter()
            .enumerate()
            .filter(|(_, high)| **high)
            .map(|(i, _)| Direction::from(i))
            .collect()
    }
}

/// A static library of tile prototypes keyed by type id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileLibrary {
    tiles: HashMap<TileType, TilePrototype>,
}

impl TileLibrary {
    pub fn new() -> Self {
        TileLibrary {
            tiles: HashMap::new(),
        }
    }

    pub fn add_tile(&mut self, prototype: TilePrototype) {
        self.tiles.insert(prototype.tile_type, prototype);
    }

    pub fn get(&self, tile_type: TileType) -> Option<&TilePrototype> {
        self.tiles.get(&tile_type)
    }

    pub fn tile_types(&self) -> impl Iterator<Item = &TileType> {
        self.tiles.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn to_json_string(&self) -> Result<String, WfcError> {
        serde_json::to_string(self).map_err(|e| WfcError::JsonParseError(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<TileLibrary, WfcError> {
        let library: TileLibrary =
            serde_json::from_str(json).map_err(|e| WfcError::JsonParseError(e.to_string()))?;
        if library.is_empty() {
            return Err(WfcError::EmptyTileSet("no tiles defined in the library".into()));
        }
        Ok(library)
    }
}

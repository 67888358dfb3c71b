use std::collections::HashMap;

use crate::error::WfcError;
use crate::hex::{Direction, DIRECTIONS};
use crate::tile::{EdgeTerrain, TileLibrary, TileType};

/// Identifies one `(type, rotation, level)` triple. Implementations are
/// free to choose any packing; this one indexes a flat `Vec<StateInfo>`.
pub type StateKey = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateInfo {
    pub tile_type: TileType,
    pub rotation: u8,
    pub level: u8,
}

/// Precomputed, immutable index built once from a tile library. Safe to
/// share read-only across any number of concurrent solver instances.
#[derive(Debug, Clone)]
pub struct AdjacencyIndex {
    states: Vec<StateInfo>,
    state_edges: Vec<[(EdgeTerrain, u8); 6]>,
    by_edge: HashMap<(EdgeTerrain, Direction, u8), Vec<StateKey>>,
    key_lookup: HashMap<(TileType, u8, u8), StateKey>,
    max_level: u8,
}

impl AdjacencyIndex {
    /// Builds the index for every `type` in `tile_types`, every rotation,
    /// and every level in `0..=max_level` a flat or slope tile can occupy.
    pub fn build(
        library: &TileLibrary,
        tile_types: &[TileType],
        max_level: u8,
    ) -> Result<AdjacencyIndex, WfcError> {
        let mut sorted_types: Vec<TileType> = tile_types.to_vec();
        sorted_types.sort_unstable();
        sorted_types.dedup();

        let mut states = Vec::new();
        let mut state_edges = Vec::new();
        let mut by_edge: HashMap<(EdgeTerrain, Direction, u8), Vec<StateKey>> = HashMap::new();
        let mut key_lookup = HashMap::new();

        for tile_type in sorted_types {
            let proto = library
                .get(tile_type)
                .ok_or(WfcError::UnknownTileType(tile_type))?;

            for rotation in 0..6u8 {
                let levels: Vec<u8> = if proto.is_slope() {
                    if proto.level_increment > max_level {
                        Vec::new()
                    } else {
                        (0..=(max_level - proto.level_increment)).collect()
                    }
                } else {
                    (0..=max_level).collect()
                };

                for level in levels {
                    let rotated_edges = proto.rotated_edges(rotation);
                    let rotated_high = proto.rotated_high_edges(rotation);

                    let mut edge_vec = [(EdgeTerrain::Grass, 0u8); 6];
                    for dir in DIRECTIONS {
                        let terrain = rotated_edges[dir.index()];
                        let edge_level = if rotated_high.contains(&dir) {
                            level + proto.level_increment
                        } else {
                            level
                        };
                        edge_vec[dir.index()] = (terrain, edge_level);
                    }

                    let key = states.len() as StateKey;
                    states.push(StateInfo {
                        tile_type,
                        rotation,
                        level,
                    });
                    state_edges.push(edge_vec);
                    key_lookup.insert((tile_type, rotation, level), key);

                    for dir in DIRECTIONS {
                        let (terrain, edge_level) = edge_vec[dir.index()];
                        by_edge
                            .entry((terrain, dir, edge_level))
                            .or_default()
                            .push(key);
                    }
                }
            }
        }

        Ok(AdjacencyIndex {
            states,
            state_edges,
            by_edge,
            key_lookup,
            max_level,
        })
    }

    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    pub fn states(&self) -> &[StateInfo] {
        &self.states
    }

    pub fn state_info(&self, key: StateKey) -> StateInfo {
        self.states[key as usize]
    }

    pub fn state_edge(&self, key: StateKey, dir: Direction) -> (EdgeTerrain, u8) {
        self.state_edges[key as usize][dir.index()]
    }

    pub fn key_of(&self, tile_type: TileType, rotation: u8, level: u8) -> Option<StateKey> {
        self.key_lookup.get(&(tile_type, rotation, level)).copied()
    }

    /// States that can legally sit at `dir` from a cell whose edge in that
    /// direction is `(terrain, edge_level)`. A three-level indexed lookup;
    /// missing keys return the empty slice rather than panicking, since a
    /// state claiming an edge the index has no candidates for indicates a
    /// build-time inconsistency that should surface as a contradiction, not
    /// a crash.
    pub fn candidates(&self, terrain: EdgeTerrain, dir: Direction, edge_level: u8) -> &[StateKey] {
        self.by_edge
            .get(&(terrain, dir, edge_level))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::Direction;
    use crate::tile::TilePrototype;

    fn grass_road_library() -> TileLibrary {
        let mut lib = TileLibrary::new();
        lib.add_tile(TilePrototype {
            tile_type: 1,
            edges: [EdgeTerrain::Grass; 6],
            weight: 100,
            high_edges: vec![],
            level_increment: 0,
        });
        let mut road_edges = [EdgeTerrain::Grass; 6];
        road_edges[Direction::E.index()] = EdgeTerrain::Road;
        road_edges[Direction::W.index()] = EdgeTerrain::Road;
        lib.add_tile(TilePrototype {
            tile_type: 2,
            edges: road_edges,
            weight: 10,
            high_edges: vec![],
            level_increment: 0,
        });
        lib
    }

    #[test]
    fn every_state_is_recoverable_via_by_edge() {
        let lib = grass_road_library();
        let index = AdjacencyIndex::build(&lib, &[1, 2], 0).unwrap();
        for (key, edges) in index.state_edges.iter().enumerate() {
            let key = key as StateKey;
            for dir in DIRECTIONS {
                let (terrain, level) = edges[dir.index()];
                let bucket = index.candidates(terrain, dir, level);
                assert!(bucket.contains(&key));
            }
        }
    }

    #[test]
    fn flat_tiles_span_every_level() {
        let lib = grass_road_library();
        let index = AdjacencyIndex::build(&lib, &[1], 2).unwrap();
        let levels: Vec<u8> = index.states().iter().map(|s| s.level).collect();
        assert!(levels.contains(&0));
        assert!(levels.contains(&1));
        assert!(levels.contains(&2));
    }

    #[test]
    fn slope_tiles_stop_short_of_max_level() {
        let mut lib = TileLibrary::new();
        lib.add_tile(TilePrototype {
            tile_type: 1,
            edges: [EdgeTerrain::Grass; 6],
            weight: 1,
            high_edges: vec![Direction::NE, Direction::E, Direction::SE],
            level_increment: 1,
        });
        let index = AdjacencyIndex::build(&lib, &[1], 1).unwrap();
        let levels: Vec<u8> = index.states().iter().map(|s| s.level).collect();
        assert_eq!(levels, vec![0]);
    }

    #[test]
    fn unknown_tile_type_is_rejected() {
        let lib = grass_road_library();
        assert!(matches!(
            AdjacencyIndex::build(&lib, &[1, 99], 0),
            Err(WfcError::UnknownTileType(99))
        ));
    }
}

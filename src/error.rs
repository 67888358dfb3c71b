use std::fmt;

/// Construction-time failures. Mid-solve contradictions are not exceptions;
/// they are reported through `Solver::last_contradiction` and a `None`
/// return from `solve`, not through this type.
#[derive(Debug, Clone, PartialEq)]
pub enum WfcError {
    /// `options.tile_types` named a type absent from the library.
    UnknownTileType(u32),
    /// `options.max_level` exceeds the level range the adjacency index was
    /// built for.
    InvalidMaxLevel { requested: u8, built_for: u8 },
    /// The configured tile set produced no usable states at all.
    EmptyTileSet(String),
    JsonParseError(String),
}

impl fmt::Display for WfcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WfcError::UnknownTileType(t) => write!(f, "unknown tile type: {}", t),
            WfcError::InvalidMaxLevel {
                requested,
                built_for,
            } => write!(
                f,
                "max_level {} exceeds the level range the index was built for ({})",
                requested, built_for
            ),
            WfcError::EmptyTileSet(msg) => write!(f, "empty tile set: {}", msg),
            WfcError::JsonParseError(msg) => write!(f, "JSON parse error: {}", msg),
        }
    }
}

impl std::error::Error for WfcError {}

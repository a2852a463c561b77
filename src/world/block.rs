//! Block materials sampled by agents

use serde::{Deserialize, Serialize};

/// Material of a single voxel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockMaterial {
    #[default]
    Air,
    Water,
    Grass,
    Dirt,
    Sand,
    Stone,
    Wood,
    Leaves,
    /// Gas-like; some archetypes pass straight through it
    Cloud,
    Bedrock,
}

impl BlockMaterial {
    /// Returns true if the block obstructs movement by default
    ///
    /// Archetypes may still exempt gas-like blocks such as `Cloud`.
    pub fn is_solid(&self) -> bool {
        !matches!(self, BlockMaterial::Air | BlockMaterial::Water)
    }

    pub fn is_liquid(&self) -> bool {
        matches!(self, BlockMaterial::Water)
    }
}

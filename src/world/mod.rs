//! Voxel world queries consumed by agents and spawners
//!
//! Terrain generation lives elsewhere; the kernel only reads blocks and
//! column heights through [`VoxelWorld`] and never mutates them.

pub mod block;
pub mod voxel_map;

use glam::Vec3;

pub use block::BlockMaterial;
pub use voxel_map::VoxelMap;

/// Highest water layer when a world does not say otherwise
pub const DEFAULT_WATER_LEVEL: i32 = 12;

/// Read-only block lookups over a discretized terrain
pub trait VoxelWorld {
    /// Material of the block at integer coordinates
    fn block(&self, x: i32, y: i32, z: i32) -> BlockMaterial;

    /// Y of the topmost solid block in a column
    fn spawn_height(&self, x: i32, z: i32) -> i32;

    /// Y of the highest block layer filled with water
    fn water_level(&self) -> i32 {
        DEFAULT_WATER_LEVEL
    }

    /// Material of the block containing a world-space point
    fn block_at(&self, p: Vec3) -> BlockMaterial {
        self.block(p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32)
    }

    /// World-space height of the water surface
    fn water_surface(&self) -> f32 {
        self.water_level() as f32 + 1.0
    }
}

//! In-memory voxel terrain
//!
//! Column heights plus sparse per-block overrides. Uses hash maps keyed by
//! integer coordinates for O(1) lookup, so unbounded terrain costs nothing
//! until a column or block is customised.

use ahash::AHashMap;

use super::{BlockMaterial, VoxelWorld};

/// Depth of the dirt layer under the surface block
const DIRT_DEPTH: i32 = 3;

/// Heightmap terrain with a flat water table
#[derive(Debug, Clone)]
pub struct VoxelMap {
    default_height: i32,
    water_level: i32,
    columns: AHashMap<(i32, i32), i32>,
    overrides: AHashMap<(i32, i32, i32), BlockMaterial>,
    /// Highest solid override per column
    override_tops: AHashMap<(i32, i32), i32>,
}

impl VoxelMap {
    /// Uniform terrain whose surface block sits at `default_height`
    pub fn new(default_height: i32, water_level: i32) -> Self {
        Self {
            default_height,
            water_level,
            columns: AHashMap::new(),
            overrides: AHashMap::new(),
            override_tops: AHashMap::new(),
        }
    }

    /// Build a rectangular region from a height function
    ///
    /// Columns outside the region keep `default_height`.
    pub fn from_fn(
        origin: (i32, i32),
        size: (u32, u32),
        default_height: i32,
        water_level: i32,
        height: impl Fn(i32, i32) -> i32,
    ) -> Self {
        let mut map = Self::new(default_height, water_level);
        for dz in 0..size.1 as i32 {
            for dx in 0..size.0 as i32 {
                let (x, z) = (origin.0 + dx, origin.1 + dz);
                map.set_column(x, z, height(x, z));
            }
        }
        map
    }

    /// Builder form of [`set_column`](Self::set_column)
    pub fn with_column(mut self, x: i32, z: i32, height: i32) -> Self {
        self.set_column(x, z, height);
        self
    }

    /// Set the surface height of one column; negative heights leave a hole
    pub fn set_column(&mut self, x: i32, z: i32, height: i32) {
        self.columns.insert((x, z), height);
    }

    /// Override a single block
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: BlockMaterial) {
        self.overrides.insert((x, y, z), block);
        if block.is_solid() {
            let top = self.override_tops.entry((x, z)).or_insert(y);
            *top = (*top).max(y);
        } else if self.override_tops.get(&(x, z)) == Some(&y) {
            self.recompute_override_top(x, z);
        }
    }

    /// Rescan a column's solid overrides after its top was cleared
    fn recompute_override_top(&mut self, x: i32, z: i32) {
        let top = self
            .overrides
            .iter()
            .filter(|(&(bx, _, bz), block)| bx == x && bz == z && block.is_solid())
            .map(|(&(_, by, _), _)| by)
            .max();
        match top {
            Some(y) => {
                self.override_tops.insert((x, z), y);
            }
            None => {
                self.override_tops.remove(&(x, z));
            }
        }
    }

    /// Override every block in an inclusive box
    pub fn fill(&mut self, min: (i32, i32, i32), max: (i32, i32, i32), block: BlockMaterial) {
        for y in min.1..=max.1 {
            for z in min.2..=max.2 {
                for x in min.0..=max.0 {
                    self.set_block(x, y, z, block);
                }
            }
        }
    }

    /// Surface height of a column, ignoring overrides
    pub fn column_height(&self, x: i32, z: i32) -> i32 {
        self.columns
            .get(&(x, z))
            .copied()
            .unwrap_or(self.default_height)
    }

    fn generated_block(&self, x: i32, y: i32, z: i32) -> BlockMaterial {
        if y < 0 {
            return BlockMaterial::Air;
        }

        let height = self.column_height(x, z);
        if y > height {
            return if y <= self.water_level {
                BlockMaterial::Water
            } else {
                BlockMaterial::Air
            };
        }

        if y == height {
            if height <= self.water_level {
                BlockMaterial::Sand
            } else {
                BlockMaterial::Grass
            }
        } else if y == 0 {
            BlockMaterial::Bedrock
        } else if y > height - DIRT_DEPTH {
            BlockMaterial::Dirt
        } else {
            BlockMaterial::Stone
        }
    }
}

impl VoxelWorld for VoxelMap {
    fn block(&self, x: i32, y: i32, z: i32) -> BlockMaterial {
        match self.overrides.get(&(x, y, z)) {
            Some(block) => *block,
            None => self.generated_block(x, y, z),
        }
    }

    fn spawn_height(&self, x: i32, z: i32) -> i32 {
        let height = self.column_height(x, z);
        match self.override_tops.get(&(x, z)) {
            Some(&top) => top.max(height),
            None => height,
        }
    }

    fn water_level(&self) -> i32 {
        self.water_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_terrain_layers() {
        let map = VoxelMap::new(10, 5);
        assert_eq!(map.block(0, 10, 0), BlockMaterial::Grass);
        assert_eq!(map.block(0, 9, 0), BlockMaterial::Dirt);
        assert_eq!(map.block(0, 4, 0), BlockMaterial::Stone);
        assert_eq!(map.block(0, 0, 0), BlockMaterial::Bedrock);
        assert_eq!(map.block(0, 11, 0), BlockMaterial::Air);
        assert_eq!(map.spawn_height(123, -456), 10);
    }

    #[test]
    fn test_low_columns_fill_with_water() {
        let map = VoxelMap::new(10, 12).with_column(3, 3, 4);
        assert_eq!(map.block(3, 4, 3), BlockMaterial::Sand);
        assert_eq!(map.block(3, 5, 3), BlockMaterial::Water);
        assert_eq!(map.block(3, 12, 3), BlockMaterial::Water);
        assert_eq!(map.block(3, 13, 3), BlockMaterial::Air);
        assert_eq!(map.spawn_height(3, 3), 4);
    }

    #[test]
    fn test_hole_column_is_open_to_the_void() {
        let map = VoxelMap::new(10, -100).with_column(0, 0, -1);
        for y in -20..20 {
            assert_eq!(map.block(0, y, 0), BlockMaterial::Air);
        }
    }

    #[test]
    fn test_overrides_win_and_raise_spawn_height() {
        let mut map = VoxelMap::new(10, 5);
        map.set_block(2, 14, 2, BlockMaterial::Wood);
        assert_eq!(map.block(2, 14, 2), BlockMaterial::Wood);
        assert_eq!(map.spawn_height(2, 2), 14);

        map.set_block(2, 10, 2, BlockMaterial::Air);
        assert_eq!(map.block(2, 10, 2), BlockMaterial::Air);
    }

    #[test]
    fn test_clearing_override_lowers_spawn_height() {
        let mut map = VoxelMap::new(10, 5);
        map.set_block(2, 16, 2, BlockMaterial::Stone);
        map.set_block(2, 20, 2, BlockMaterial::Stone);
        assert_eq!(map.spawn_height(2, 2), 20);

        // The lower override becomes the top again
        map.set_block(2, 20, 2, BlockMaterial::Air);
        assert_eq!(map.spawn_height(2, 2), 16);

        // Clearing a block under the top leaves it alone
        map.set_block(2, 12, 2, BlockMaterial::Stone);
        map.set_block(2, 12, 2, BlockMaterial::Water);
        assert_eq!(map.spawn_height(2, 2), 16);

        map.set_block(2, 16, 2, BlockMaterial::Air);
        assert_eq!(map.spawn_height(2, 2), 10);
    }

    #[test]
    fn test_fill_box() {
        let mut map = VoxelMap::new(0, -1);
        map.fill((0, 1, 0), (1, 2, 1), BlockMaterial::Stone);
        assert_eq!(map.block(1, 2, 1), BlockMaterial::Stone);
        assert_eq!(map.block(2, 2, 1), BlockMaterial::Air);
    }

    #[test]
    fn test_from_fn_region() {
        let map = VoxelMap::from_fn((0, 0), (4, 4), 7, 2, |x, z| x + z);
        assert_eq!(map.column_height(3, 3), 6);
        assert_eq!(map.column_height(10, 10), 7);
    }
}

//! Block address mapping for the console's tiled thumbnail layout.
//!
//! The 64×64-block thumbnail is stored as nested tiles, outermost first:
//!
//! 1. four sectors (quarters) in row-major order,
//! 2. four rows per sector, stored in the order 0, 2, 1, 3,
//! 3. four finer rows per row, stored in natural order,
//! 4. groups of 4×2 blocks, whose order alternates between two patterns
//!    depending on the parity of the stage 2 row,
//! 5. the eight blocks of a group, stored as two 2×2 halves.
//!
//! [`SwizzleGeometry::source_block_index`] maps a destination block
//! coordinate back to its position in the stored stream.

/// Storage order of the four rows inside a sector.
const ROW_ORDER: [usize; 4] = [0, 2, 1, 3];
/// Group order used on even stage 2 rows.
const GROUP_ORDER_EVEN: [usize; 8] = [0, 4, 1, 5, 2, 6, 3, 7];
/// Group order used on odd stage 2 rows.
const GROUP_ORDER_ODD: [usize; 8] = [2, 6, 3, 7, 0, 4, 1, 5];
/// Storage order of the blocks within a 4×2 group.
const CELL_ORDER: [usize; 8] = [0, 1, 4, 5, 2, 3, 6, 7];

pub const GROUP_WIDTH: usize = 4;
pub const GROUP_HEIGHT: usize = 2;
pub const BLOCKS_PER_GROUP: usize = GROUP_WIDTH * GROUP_HEIGHT;

/// Grid size of the only layout seen in the wild (256×256 pixels).
pub const NATIVE_BLOCKS: usize = 64;

/// Sizes derived from the block grid. Recomputed per image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwizzleGeometry {
    pub blocks_wide: usize,
    pub blocks_high: usize,
    pub sector_size_x: usize,
    pub sector_size_y: usize,
    pub rows_per_stage2: usize,
    pub rows_per_stage3: usize,
    pub groups_per_row: usize,
}

/// Every intermediate value of one block's address computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwizzleStages {
    /// Sector, 0..4.
    pub stage1: usize,
    /// Row within the sector, 0..4, and its storage slot.
    pub stage2: usize,
    pub stage2_order: usize,
    /// Finer row within the row, 0..4.
    pub stage3: usize,
    /// Group index and its storage slot (0..8).
    pub stage4: usize,
    pub stage4_order: usize,
    /// Block within the group, 0..8, and its storage slot.
    pub stage5: usize,
    pub stage5_order: usize,
    /// Block coordinate relative to the sector origin.
    pub local_x: usize,
    pub local_y: usize,
}

impl SwizzleGeometry {
    /// Geometry for a grid of `blocks_wide` × `blocks_high` blocks.
    ///
    /// Divisors are clamped to 1, so grids smaller than the native tiling
    /// still produce an address (0 for a single block) instead of dividing
    /// by zero. Those addresses are only meaningful for
    /// [`is_native`](Self::is_native) geometries.
    pub fn new(blocks_wide: usize, blocks_high: usize) -> Self {
        let sector_size_x = (blocks_wide / 2).max(1);
        let sector_size_y = (blocks_high / 2).max(1);
        let rows_per_stage2 = (sector_size_y / 4).max(1);
        let rows_per_stage3 = (rows_per_stage2 / 4).max(1);
        let groups_per_row = (sector_size_x / GROUP_WIDTH).max(1);

        Self {
            blocks_wide,
            blocks_high,
            sector_size_x,
            sector_size_y,
            rows_per_stage2,
            rows_per_stage3,
            groups_per_row,
        }
    }

    /// Geometry for an image of `width` × `height` pixels (4×4 blocks).
    pub fn for_image(width: usize, height: usize) -> Self {
        Self::new(width.div_ceil(4), height.div_ceil(4))
    }

    pub fn block_count(&self) -> usize {
        self.blocks_wide * self.blocks_high
    }

    /// True when the grid matches the 64×64 layout the tiling was recovered
    /// from; only then is the mapping a bijection.
    pub fn is_native(&self) -> bool {
        self.blocks_wide == NATIVE_BLOCKS && self.blocks_high == NATIVE_BLOCKS
    }

    pub fn stages(&self, bx: usize, by: usize) -> SwizzleStages {
        let (stage1, local_x, local_y) = self.sector(bx, by);
        let stage2 = self.row(local_y);
        let stage3 = self.finer_row(local_y);
        let (stage4, stage4_order) = self.group(local_x, local_y, stage2);
        let stage5 = Self::cell(local_x, local_y);

        SwizzleStages {
            stage1,
            stage2,
            stage2_order: ROW_ORDER[stage2 % ROW_ORDER.len()],
            stage3,
            stage4,
            stage4_order,
            stage5,
            stage5_order: CELL_ORDER[stage5],
            local_x,
            local_y,
        }
    }

    /// Index of the stored block that lands at destination block (`bx`, `by`).
    pub fn source_block_index(&self, bx: usize, by: usize) -> usize {
        self.stages(bx, by).source_index(self)
    }

    fn sector(&self, bx: usize, by: usize) -> (usize, usize, usize) {
        let stage1 = (by / self.sector_size_y) * 2 + bx / self.sector_size_x;
        (stage1, bx % self.sector_size_x, by % self.sector_size_y)
    }

    fn row(&self, local_y: usize) -> usize {
        local_y / self.rows_per_stage2
    }

    fn finer_row(&self, local_y: usize) -> usize {
        (local_y % self.rows_per_stage2) / self.rows_per_stage3
    }

    fn group(&self, local_x: usize, local_y: usize, stage2: usize) -> (usize, usize) {
        let group_x = local_x / GROUP_WIDTH;
        let group_y = local_y / GROUP_HEIGHT;
        let stage4 = group_y * self.groups_per_row + group_x;
        let pattern = if stage2 % 2 == 1 {
            &GROUP_ORDER_ODD
        } else {
            &GROUP_ORDER_EVEN
        };
        (stage4, pattern[stage4 % pattern.len()])
    }

    fn cell(local_x: usize, local_y: usize) -> usize {
        (local_y % GROUP_HEIGHT) * GROUP_WIDTH + local_x % GROUP_WIDTH
    }
}

impl SwizzleStages {
    pub fn source_index(&self, geometry: &SwizzleGeometry) -> usize {
        let sector = self.stage1 * geometry.sector_size_x * geometry.sector_size_y;
        let row = self.stage2_order * geometry.sector_size_x * geometry.rows_per_stage2;
        let finer_row = self.stage3 * geometry.sector_size_x * geometry.rows_per_stage3;
        let group = self.stage4_order * BLOCKS_PER_GROUP;
        sector + row + finer_row + group + self.stage5_order
    }
}

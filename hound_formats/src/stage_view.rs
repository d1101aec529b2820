//! Debug views that paint each block by one swizzle stage instead of decoding
//! it. Used to check a tiling hypothesis against a known thumbnail.

use std::fmt;
use std::str::FromStr;

use crate::dxt1::Bgra;
use crate::swizzle::{SwizzleGeometry, SwizzleStages};
use crate::thumbnail::ThumbnailImage;

/// Red, orange, yellow, green, cyan, light blue, blue, purple.
const STAGE_COLORS: [Bgra; 8] = [
    [0, 0, 255, 255],
    [0, 128, 255, 255],
    [0, 255, 255, 255],
    [0, 255, 0, 255],
    [255, 255, 0, 255],
    [255, 128, 0, 255],
    [255, 0, 0, 255],
    [128, 0, 255, 255],
];
const EDGE: Bgra = [255, 255, 255, 255];
const INTERIOR: Bgra = [0, 0, 0, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwizzleStage {
    /// Sector quarters across the whole image.
    Sector,
    /// Row storage slot, sector 0 only.
    Row,
    /// Finer rows, first row of sector 0 only.
    FinerRow,
    /// Group storage slot wherever stage 1 and stage 3 are both zero.
    Group,
    /// Block slot within the first group of sector 0.
    Cell,
    /// Sector outlines.
    Boundaries,
}

impl SwizzleStage {
    pub const ALL: [SwizzleStage; 6] = [
        SwizzleStage::Sector,
        SwizzleStage::Row,
        SwizzleStage::FinerRow,
        SwizzleStage::Group,
        SwizzleStage::Cell,
        SwizzleStage::Boundaries,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SwizzleStage::Sector => "sector",
            SwizzleStage::Row => "row",
            SwizzleStage::FinerRow => "finer-row",
            SwizzleStage::Group => "group",
            SwizzleStage::Cell => "cell",
            SwizzleStage::Boundaries => "boundaries",
        }
    }

    fn color(self, stages: &SwizzleStages, geometry: &SwizzleGeometry) -> Bgra {
        let slot = match self {
            SwizzleStage::Sector => Some(stages.stage1),
            SwizzleStage::Row if stages.stage1 == 0 => Some(stages.stage2_order),
            SwizzleStage::FinerRow if stages.stage1 == 0 && stages.stage2 == 0 => {
                Some(stages.stage3)
            }
            SwizzleStage::Group if stages.stage1 == 0 && stages.stage3 == 0 => {
                Some(stages.stage4_order)
            }
            SwizzleStage::Cell
                if stages.stage1 == 0
                    && stages.stage2 == 0
                    && stages.stage3 == 0
                    && stages.stage4 == 0 =>
            {
                Some(stages.stage5_order)
            }
            _ => None,
        };

        match slot {
            Some(slot) => STAGE_COLORS.get(slot).copied().unwrap_or(EDGE),
            None => boundary_color(stages, geometry),
        }
    }
}

impl fmt::Display for SwizzleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwizzleStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SwizzleStage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == wanted)
            .or_else(|| match wanted.as_str() {
                "1" => Some(SwizzleStage::Sector),
                "2" => Some(SwizzleStage::Row),
                "3" => Some(SwizzleStage::FinerRow),
                "4" => Some(SwizzleStage::Group),
                "5" => Some(SwizzleStage::Cell),
                _ => None,
            })
            .ok_or_else(|| {
                let names: Vec<&str> = SwizzleStage::ALL.iter().map(|s| s.as_str()).collect();
                format!(
                    "unknown swizzle stage '{s}' (expected 1-5 or one of {})",
                    names.join(", ")
                )
            })
    }
}

fn boundary_color(stages: &SwizzleStages, geometry: &SwizzleGeometry) -> Bgra {
    let on_edge = stages.local_x == 0
        || stages.local_x == geometry.sector_size_x - 1
        || stages.local_y == 0
        || stages.local_y == geometry.sector_size_y - 1;
    if on_edge { EDGE } else { INTERIOR }
}

/// Paint a `width` × `height` image with one colour per 4×4 block chosen by
/// `stage`.
pub fn visualize_stage(width: u32, height: u32, stage: SwizzleStage) -> ThumbnailImage {
    let (w, h) = (width as usize, height as usize);
    let mut bgra = vec![0u8; w * h * 4];
    let geometry = SwizzleGeometry::for_image(w, h);

    for by in 0..geometry.blocks_high {
        for bx in 0..geometry.blocks_wide {
            let stages = geometry.stages(bx, by);
            let color = stage.color(&stages, &geometry);
            for y in (by * 4)..(by * 4 + 4).min(h) {
                for x in (bx * 4)..(bx * 4 + 4).min(w) {
                    let offset = (y * w + x) * 4;
                    bgra[offset..offset + 4].copy_from_slice(&color);
                }
            }
        }
    }

    ThumbnailImage::from_bgra(width, height, bgra)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sector_view_colours_quarters() {
        let image = visualize_stage(256, 256, SwizzleStage::Sector);
        assert_eq!(image.pixel(0, 0), Some(STAGE_COLORS[0]));
        assert_eq!(image.pixel(255, 0), Some(STAGE_COLORS[1]));
        assert_eq!(image.pixel(0, 255), Some(STAGE_COLORS[2]));
        assert_eq!(image.pixel(255, 255), Some(STAGE_COLORS[3]));
    }

    #[test]
    fn row_view_shows_storage_slots_in_first_sector() {
        let image = visualize_stage(256, 256, SwizzleStage::Row);
        // Block rows 8..16 are row 1, stored in slot 2.
        assert_eq!(image.pixel(40, 8 * 4), Some(STAGE_COLORS[2]));
        assert_eq!(image.pixel(40, 16 * 4), Some(STAGE_COLORS[1]));
        // Outside sector 0 falls back to the boundary view.
        assert_eq!(image.pixel(128, 40), Some(EDGE));
        assert_eq!(image.pixel(140, 40), Some(INTERIOR));
    }

    #[test]
    fn cell_view_only_marks_first_group() {
        let image = visualize_stage(256, 256, SwizzleStage::Cell);
        assert_eq!(image.pixel(4 * 2, 0), Some(STAGE_COLORS[4]));
        assert_eq!(image.pixel(4 * 2, 4), Some(STAGE_COLORS[6]));
        assert_eq!(image.pixel(4 * 8, 4 * 8), Some(INTERIOR));
    }

    #[test]
    fn group_view_uses_odd_pattern_on_odd_rows() {
        let image = visualize_stage(256, 256, SwizzleStage::Group);
        // Block (4, 8): stage2 = 1, stage3 = 0, group 1 -> odd pattern slot 6.
        assert_eq!(image.pixel(4 * 4, 8 * 4), Some(STAGE_COLORS[6]));
        // Block (4, 0): stage2 = 0 -> even pattern slot 4.
        assert_eq!(image.pixel(4 * 4, 0), Some(STAGE_COLORS[4]));
        // Block (4, 2): stage3 = 1 falls back to the boundary view.
        assert_eq!(image.pixel(4 * 4, 2 * 4), Some(INTERIOR));
        assert_eq!(image.pixel(0, 2 * 4), Some(EDGE));
    }

    #[test]
    fn finer_row_view_only_covers_first_row() {
        let image = visualize_stage(256, 256, SwizzleStage::FinerRow);
        // Block rows 0..8 of sector 0 are row 0; pairs of rows are finer rows.
        assert_eq!(image.pixel(40, 0), Some(STAGE_COLORS[0]));
        assert_eq!(image.pixel(40, 6 * 4), Some(STAGE_COLORS[3]));
        // Block row 8 starts row 1.
        assert_eq!(image.pixel(40, 8 * 4), Some(INTERIOR));
        assert_eq!(image.pixel(0, 8 * 4), Some(EDGE));
    }

    #[test]
    fn boundaries_view_outlines_each_sector() {
        let image = visualize_stage(256, 256, SwizzleStage::Boundaries);
        for (x, y) in [(0, 0), (124, 40), (128, 40), (40, 124), (40, 128), (255, 255)] {
            assert_eq!(image.pixel(x, y), Some(EDGE), "({x}, {y})");
        }
        for (x, y) in [(40, 40), (168, 40), (40, 168), (168, 168)] {
            assert_eq!(image.pixel(x, y), Some(INTERIOR), "({x}, {y})");
        }
    }

    #[test]
    fn parses_names_and_numbers() {
        assert_eq!("group".parse::<SwizzleStage>(), Ok(SwizzleStage::Group));
        assert_eq!("Finer-Row".parse::<SwizzleStage>(), Ok(SwizzleStage::FinerRow));
        assert_eq!("1".parse::<SwizzleStage>(), Ok(SwizzleStage::Sector));
        assert!("6".parse::<SwizzleStage>().is_err());
    }
}

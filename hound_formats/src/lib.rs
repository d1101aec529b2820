pub mod dxt1;
pub mod error;
pub mod header;
pub mod record;
pub mod stage_view;
pub mod swizzle;
pub mod thumbnail;

/// Bytes between the image header offset and the first DXT1 block.
pub const PAYLOAD_PREAMBLE_LEN: usize = 16;

pub use dxt1::{DXT1_BLOCK_LEN, Dxt1Block};
pub use error::ThumbnailError;
pub use header::{BuildHeader, BuildTimestamp, HEADER_LEN, parse_header, peek_image_header_offset};
pub use record::{BuildRecord, ScannedBuild, load_thumbnail, read_build_header, scan_build_folders};
pub use stage_view::{SwizzleStage, visualize_stage};
pub use swizzle::{SwizzleGeometry, SwizzleStages};
pub use thumbnail::{THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH, ThumbnailImage, decode_thumbnail};

use crate::dxt1::{Bgra, DXT1_BLOCK_LEN, Dxt1Block};
use crate::swizzle::SwizzleGeometry;

pub const THUMBNAIL_WIDTH: u32 = 256;
pub const THUMBNAIL_HEIGHT: u32 = 256;

/// Decoded BGRA8888 raster. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailImage {
    width: u32,
    height: u32,
    bgra: Vec<u8>,
}

impl ThumbnailImage {
    pub(crate) fn from_bgra(width: u32, height: u32, bgra: Vec<u8>) -> Self {
        debug_assert_eq!(bgra.len(), width as usize * height as usize * 4);
        Self {
            width,
            height,
            bgra,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel bytes in B, G, R, A order, rows top to bottom.
    pub fn as_bgra(&self) -> &[u8] {
        &self.bgra
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Bgra> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut pixel = [0u8; 4];
        pixel.copy_from_slice(&self.bgra[offset..offset + 4]);
        Some(pixel)
    }

    pub fn to_rgba8888(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.bgra.len());
        for chunk in self.bgra.chunks_exact(4) {
            rgba.extend_from_slice(&[chunk[2], chunk[1], chunk[0], chunk[3]]);
        }
        rgba
    }
}

/// Untile and decompress a swizzled DXT1 payload into a `width` × `height`
/// image.
///
/// Blocks whose source lies past the end of `payload` stay transparent black;
/// a short payload yields a partial image, never an error.
pub fn decode_thumbnail(payload: &[u8], width: u32, height: u32) -> ThumbnailImage {
    let (w, h) = (width as usize, height as usize);
    let mut bgra = vec![0u8; w * h * 4];
    let geometry = SwizzleGeometry::for_image(w, h);

    if !geometry.is_native() && geometry.block_count() > 1 {
        log::warn!(
            "thumbnail {width}x{height} does not match the native 256x256 tiling; blocks may be misplaced"
        );
    }

    let mut skipped = 0usize;
    for by in 0..geometry.blocks_high {
        for bx in 0..geometry.blocks_wide {
            let index = geometry.source_block_index(bx, by);
            let Some(block) = index
                .checked_mul(DXT1_BLOCK_LEN)
                .and_then(|offset| Dxt1Block::at(payload, offset))
            else {
                skipped += 1;
                continue;
            };
            block.decode_into(&mut bgra, w, h, bx * 4, by * 4);
        }
    }

    log::debug!(
        "decoded {width}x{height} thumbnail from {} payload bytes ({} blocks, {skipped} past end of payload)",
        payload.len(),
        geometry.block_count()
    );

    ThumbnailImage::from_bgra(width, height, bgra)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dxt1::rgb565_to_bgra;

    const WHITE_BLOCK: [u8; 8] = [0xFF, 0xFF, 0x00, 0x00, 0, 0, 0, 0];

    fn payload_of(blocks: usize, block: &[u8; 8]) -> Vec<u8> {
        block.iter().copied().cycle().take(blocks * 8).collect()
    }

    #[test]
    fn decoding_is_deterministic() {
        let payload: Vec<u8> = (0..64 * 64 * 8).map(|i| (i * 31 % 251) as u8).collect();
        let first = decode_thumbnail(&payload, 256, 256);
        let second = decode_thumbnail(&payload, 256, 256);
        assert_eq!(first, second);
    }

    #[test]
    fn uniform_payload_fills_every_pixel() {
        let payload = payload_of(64 * 64, &WHITE_BLOCK);
        let image = decode_thumbnail(&payload, 256, 256);
        assert_eq!(image.as_bgra().len(), 256 * 256 * 4);
        assert!(image.as_bgra().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn block_lands_at_unswizzled_position() {
        // Mark stored block 1024 (the first block of sector 1) with a solid colour.
        let mut payload = vec![0u8; 64 * 64 * 8];
        // color0 == color1 == pure green, every code 0.
        payload[1024 * 8..1024 * 8 + 4].copy_from_slice(&[0x07, 0xE0, 0x07, 0xE0]);
        let image = decode_thumbnail(&payload, 256, 256);

        let green = rgb565_to_bgra(0x07E0);
        for y in 0..4 {
            for x in 128..132 {
                assert_eq!(image.pixel(x, y), Some(green));
            }
        }
        assert_eq!(image.pixel(132, 0), Some(rgb565_to_bgra(0)));
        assert_eq!(image.pixel(0, 0), Some(rgb565_to_bgra(0)));
    }

    #[test]
    fn truncated_payload_leaves_missing_blocks_transparent() {
        // Only the first sector's worth of blocks is present.
        let payload = payload_of(1024, &WHITE_BLOCK);
        let image = decode_thumbnail(&payload, 256, 256);

        for y in 0..256 {
            for x in 0..256 {
                let expected = if x < 128 && y < 128 { [0xFF; 4] } else { [0; 4] };
                assert_eq!(image.pixel(x, y), Some(expected), "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn partial_trailing_block_is_skipped() {
        let mut payload = payload_of(1, &WHITE_BLOCK);
        payload.truncate(7);
        let image = decode_thumbnail(&payload, 4, 4);
        assert!(image.as_bgra().iter().all(|&b| b == 0));
    }

    #[test]
    fn empty_payload_and_empty_image() {
        let image = decode_thumbnail(&[], 256, 256);
        assert!(image.as_bgra().iter().all(|&b| b == 0));

        let empty = decode_thumbnail(&WHITE_BLOCK, 0, 0);
        assert!(empty.as_bgra().is_empty());
    }

    #[test]
    fn single_block_image_decodes_first_block() {
        // color0 0xF800 > color1 0x001F: four colour mode with codes 0, 1, 2, 3
        // laid out in index slots 0..4 (raster pixels 4..8).
        let block = [0xF8, 0x00, 0x00, 0x1F, 0b1110_0100, 0, 0, 0];
        let image = decode_thumbnail(&block, 4, 4);

        let palette = Dxt1Block::new(&block).palette();
        assert_eq!(image.pixel(0, 1), Some(palette[0]));
        assert_eq!(image.pixel(1, 1), Some(palette[1]));
        assert_eq!(image.pixel(2, 1), Some(palette[2]));
        assert_eq!(image.pixel(3, 1), Some(palette[3]));
        assert_eq!(image.pixel(0, 0), Some(palette[0]));
        assert_eq!(image.pixel(4, 0), None);
    }

    #[test]
    fn converts_to_rgba() {
        let image = ThumbnailImage::from_bgra(1, 1, vec![1, 2, 3, 4]);
        assert_eq!(image.to_rgba8888(), vec![3, 2, 1, 4]);
    }
}

//! DXT1 (BC1) block decoding for the thumbnail payload.
//!
//! The console stores the two base colours as big-endian RGB565 and walks the
//! 2-bit index word with its pixel rows swapped in pairs, so a block's rows
//! come out in the order 1, 0, 3, 2 relative to a PC BC1 decoder.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

pub const DXT1_BLOCK_LEN: usize = 8;

/// Bit position (in 2-bit units) of each raster pixel's palette code.
const PIXEL_CODE_SLOT: [u32; 16] = [4, 5, 6, 7, 0, 1, 2, 3, 12, 13, 14, 15, 8, 9, 10, 11];

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// A BGRA8888 pixel.
pub type Bgra = [u8; 4];

/// Read-only view over one 8-byte block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dxt1Block<'a> {
    bytes: &'a [u8; DXT1_BLOCK_LEN],
}

impl<'a> Dxt1Block<'a> {
    pub fn new(bytes: &'a [u8; DXT1_BLOCK_LEN]) -> Self {
        Self { bytes }
    }

    /// Borrow the block starting at `offset`, if all 8 bytes are present.
    pub fn at(data: &'a [u8], offset: usize) -> Option<Self> {
        let end = offset.checked_add(DXT1_BLOCK_LEN)?;
        let bytes = data.get(offset..end)?.try_into().ok()?;
        Some(Self { bytes })
    }

    pub fn color0(&self) -> u16 {
        BigEndian::read_u16(&self.bytes[0..2])
    }

    pub fn color1(&self) -> u16 {
        BigEndian::read_u16(&self.bytes[2..4])
    }

    pub fn indices(&self) -> u32 {
        LittleEndian::read_u32(&self.bytes[4..8])
    }

    /// Punch-through (1-bit alpha) mode is selected when `color0 <= color1`.
    pub fn has_alpha(&self) -> bool {
        self.color0() <= self.color1()
    }

    pub fn palette(&self) -> [Bgra; 4] {
        let c0 = rgb565_to_bgra(self.color0());
        let c1 = rgb565_to_bgra(self.color1());
        if self.has_alpha() {
            [c0, c1, interpolate(c0, c1, 1, 1), TRANSPARENT]
        } else {
            [c0, c1, interpolate(c0, c1, 2, 1), interpolate(c0, c1, 1, 2)]
        }
    }

    /// Palette code (0..4) of the pixel at raster position `pixel` (0..16).
    pub fn code(&self, pixel: usize) -> usize {
        ((self.indices() >> (2 * PIXEL_CODE_SLOT[pixel])) & 0x3) as usize
    }

    /// The 16 pixels of the block in raster order.
    pub fn decode(&self) -> [Bgra; 16] {
        let palette = self.palette();
        std::array::from_fn(|pixel| palette[self.code(pixel)])
    }

    /// Write the block into a BGRA8888 image at pixel (`x`, `y`); pixels past
    /// the image edge are dropped.
    ///
    /// `dst` must hold at least `width * height * 4` bytes; a smaller buffer
    /// is left untouched.
    pub fn decode_into(&self, dst: &mut [u8], width: usize, height: usize, x: usize, y: usize) {
        let needed = width.checked_mul(height).and_then(|n| n.checked_mul(4));
        if needed.is_none_or(|needed| dst.len() < needed) {
            log::debug!(
                "skipping DXT1 block: {} byte buffer is too small for {width}x{height}",
                dst.len()
            );
            return;
        }
        for (pixel, color) in self.decode().iter().enumerate() {
            let dst_x = x + pixel % 4;
            let dst_y = y + pixel / 4;
            if dst_x >= width || dst_y >= height {
                continue;
            }
            let offset = (dst_y * width + dst_x) * 4;
            dst[offset..offset + 4].copy_from_slice(color);
        }
    }
}

/// Expand RGB565 to opaque BGRA8888 by replicating high bits into low bits.
pub fn rgb565_to_bgra(value: u16) -> Bgra {
    let r = ((value >> 11) & 0x1F) as u8;
    let g = ((value >> 5) & 0x3F) as u8;
    let b = (value & 0x1F) as u8;
    [(b << 3) | (b >> 2), (g << 2) | (g >> 4), (r << 3) | (r >> 2), 0xFF]
}

/// Weighted average of the colour channels, truncating. Alpha stays opaque.
fn interpolate(c0: Bgra, c1: Bgra, w0: u32, w1: u32) -> Bgra {
    let mix = |a: u8, b: u8| ((u32::from(a) * w0 + u32::from(b) * w1) / (w0 + w1)) as u8;
    [mix(c0[0], c1[0]), mix(c0[1], c1[1]), mix(c0[2], c1[2]), 0xFF]
}

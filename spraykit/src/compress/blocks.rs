//! Per-block fixups layered over the BC1/BC3 kernels.
//!
//! BC1 colour block (8 bytes): two little-endian RGB565 endpoints followed by
//! a little-endian u32 of 2-bit indices, pixel `i` (row-major) at bits
//! `2i..2i+2`. With `c0 > c1` the palette has four opaque colours; with
//! `c0 <= c1` it has three and index 3 decodes as transparent black.
//!
//! BC2 block (16 bytes): eight bytes of 4-bit alpha, pixel `i` in byte
//! `i / 2`, low nibble first, followed by a four-colour BC1 block.

use crate::alpha::AlphaThreshold;

/// Pixels of one 4×4 block, row-major RGBA.
pub(super) type BlockPixels = [[u8; 4]; 16];

/// Index of the transparent palette entry in three-colour mode.
const TRANSPARENT_INDEX: u32 = 3;

fn pack_565(r: u8, g: u8, b: u8) -> u16 {
    (u16::from(r) & 0xF8) << 8 | (u16::from(g) & 0xFC) << 3 | u16::from(b) >> 3
}

fn unpack_565(c: u16) -> [i32; 3] {
    let r = i32::from((c >> 11) & 0x1F);
    let g = i32::from((c >> 5) & 0x3F);
    let b = i32::from(c & 0x1F);
    [r << 3 | r >> 2, g << 2 | g >> 4, b << 3 | b >> 2]
}

fn endpoints(block: &[u8]) -> (u16, u16) {
    (
        u16::from_le_bytes([block[0], block[1]]),
        u16::from_le_bytes([block[2], block[3]]),
    )
}

fn indices(block: &[u8]) -> u32 {
    u32::from_le_bytes([block[4], block[5], block[6], block[7]])
}

fn write_block(block: &mut [u8], c0: u16, c1: u16, indices: u32) {
    block[0..2].copy_from_slice(&c0.to_le_bytes());
    block[2..4].copy_from_slice(&c1.to_le_bytes());
    block[4..8].copy_from_slice(&indices.to_le_bytes());
}

/// Forces a BC1 colour block into four-colour mode.
///
/// Engines decode DXT1 with the three-colour rule, so a block whose
/// endpoints end up ordered `c0 <= c1` would turn index 3 transparent.
/// Swapped endpoints are swapped back with their indices remapped; equal
/// endpoints become a flat block of that colour.
pub(super) fn force_four_colour(block: &mut [u8]) {
    let (c0, c1) = endpoints(block);
    if c0 > c1 {
        return;
    }
    if c0 == c1 {
        // Keep the colour on one endpoint and point every pixel at it
        if c0 < u16::MAX {
            write_block(block, c0 + 1, c0, 0x5555_5555);
        } else {
            write_block(block, c0, c0 - 1, 0);
        }
        return;
    }

    // 0 <-> 1, 2 <-> 3: flipping the low bit of every index
    let remapped = indices(block) ^ 0x5555_5555;
    write_block(block, c1, c0, remapped);
}

/// Re-encodes a block containing transparent pixels in three-colour mode.
///
/// Opaque blocks are left as the kernel produced them, after
/// [`force_four_colour`]. Endpoints are the two opaque pixels farthest
/// apart; each opaque pixel takes the nearest of the three palette colours.
/// Pixels whose alpha is below `threshold` are stored transparent.
pub(super) fn punch_through(block: &mut [u8], pixels: &BlockPixels, threshold: AlphaThreshold) {
    let opaque: Vec<&[u8; 4]> = pixels
        .iter()
        .filter(|px| !threshold.is_below(px[3]))
        .collect();

    if opaque.len() == pixels.len() {
        force_four_colour(block);
        return;
    }

    if opaque.is_empty() {
        write_block(block, 0, 0, u32::MAX);
        return;
    }

    let (a, b) = farthest_pair(&opaque);
    let a = pack_565(a[0], a[1], a[2]);
    let b = pack_565(b[0], b[1], b[2]);
    let (c0, c1) = (a.min(b), a.max(b));

    let p0 = unpack_565(c0);
    let p1 = unpack_565(c1);
    let p2 = [
        (p0[0] + p1[0]) / 2,
        (p0[1] + p1[1]) / 2,
        (p0[2] + p1[2]) / 2,
    ];
    let palette = [p0, p1, p2];

    let mut bits = 0u32;
    for (i, px) in pixels.iter().enumerate() {
        let index = if threshold.is_below(px[3]) {
            TRANSPARENT_INDEX
        } else {
            nearest(&palette, px)
        };
        bits |= index << (2 * i);
    }

    write_block(block, c0, c1, bits);
}

fn farthest_pair<'a>(pixels: &[&'a [u8; 4]]) -> (&'a [u8; 4], &'a [u8; 4]) {
    let mut best = (pixels[0], pixels[0]);
    let mut best_distance = 0;
    for (i, a) in pixels.iter().enumerate() {
        for b in &pixels[i + 1..] {
            let d: i32 = (0..3)
                .map(|c| {
                    let d = i32::from(a[c]) - i32::from(b[c]);
                    d * d
                })
                .sum();
            if d > best_distance {
                best = (*a, *b);
                best_distance = d;
            }
        }
    }
    best
}

fn nearest(palette: &[[i32; 3]; 3], px: &[u8; 4]) -> u32 {
    let distance = |p: &[i32; 3]| {
        (0..3)
            .map(|c| {
                let d = p[c] - i32::from(px[c]);
                d * d
            })
            .sum::<i32>()
    };

    let mut best = 0;
    let mut best_distance = distance(&palette[0]);
    for (i, entry) in palette.iter().enumerate().skip(1) {
        let d = distance(entry);
        if d < best_distance {
            best = i as u32;
            best_distance = d;
        }
    }
    best
}

/// Builds a BC2 block from a BC3 block of the same pixels.
///
/// The colour half is shared between the two layouts; the alpha half is
/// replaced by explicit 4-bit alpha rounded from the source.
pub(super) fn explicit_alpha(bc3_block: &[u8], pixels: &BlockPixels, out: &mut [u8]) {
    for (i, pair) in pixels.chunks_exact(2).enumerate() {
        let lo = quantize_4bit(pair[0][3]);
        let hi = quantize_4bit(pair[1][3]);
        out[i] = lo | hi << 4;
    }
    out[8..16].copy_from_slice(&bc3_block[8..16]);
    force_four_colour(&mut out[8..16]);
}

fn quantize_4bit(alpha: u8) -> u8 {
    ((u32::from(alpha) * 15 + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_bc1(block: &[u8]) -> [[i32; 4]; 16] {
        let (c0, c1) = endpoints(block);
        let p0 = unpack_565(c0);
        let p1 = unpack_565(c1);
        let palette: [[i32; 4]; 4] = if c0 > c1 {
            [
                [p0[0], p0[1], p0[2], 255],
                [p1[0], p1[1], p1[2], 255],
                [
                    (2 * p0[0] + p1[0]) / 3,
                    (2 * p0[1] + p1[1]) / 3,
                    (2 * p0[2] + p1[2]) / 3,
                    255,
                ],
                [
                    (p0[0] + 2 * p1[0]) / 3,
                    (p0[1] + 2 * p1[1]) / 3,
                    (p0[2] + 2 * p1[2]) / 3,
                    255,
                ],
            ]
        } else {
            [
                [p0[0], p0[1], p0[2], 255],
                [p1[0], p1[1], p1[2], 255],
                [
                    (p0[0] + p1[0]) / 2,
                    (p0[1] + p1[1]) / 2,
                    (p0[2] + p1[2]) / 2,
                    255,
                ],
                [0, 0, 0, 0],
            ]
        };
        let bits = indices(block);
        let mut out = [[0; 4]; 16];
        for (i, px) in out.iter_mut().enumerate() {
            *px = palette[((bits >> (2 * i)) & 3) as usize];
        }
        out
    }

    #[test]
    fn test_pack_565_truncates() {
        assert_eq!(pack_565(255, 255, 255), 0xFFFF);
        assert_eq!(pack_565(0x07, 0x03, 0x07), 0);
        assert_eq!(pack_565(0xF8, 0, 0), 0xF800);
    }

    #[test]
    fn test_punch_through_marks_transparent_pixels() {
        let mut pixels: BlockPixels = [[200, 40, 40, 255]; 16];
        pixels[0] = [0, 0, 0, 0];
        pixels[15] = [10, 10, 10, 127];
        pixels[5] = [40, 200, 40, 255];

        let mut block = [0u8; 8];
        punch_through(&mut block, &pixels, AlphaThreshold::default());

        let (c0, c1) = endpoints(&block);
        assert!(c0 <= c1, "three-colour mode requires c0 <= c1");

        let decoded = decode_bc1(&block);
        assert_eq!(decoded[0][3], 0);
        assert_eq!(decoded[15][3], 0);
        for (i, px) in decoded.iter().enumerate() {
            if i != 0 && i != 15 {
                assert_eq!(px[3], 255, "pixel {i} should be opaque");
            }
        }
        // Red pixels decode reddish, the green one greenish
        assert!(decoded[1][0] > decoded[1][1]);
        assert!(decoded[5][1] > decoded[5][0]);
    }

    #[test]
    fn test_punch_through_fully_transparent() {
        let pixels: BlockPixels = [[1, 2, 3, 0]; 16];
        let mut block = [0xAAu8; 8];
        punch_through(&mut block, &pixels, AlphaThreshold::default());
        assert_eq!(block, [0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_punch_through_leaves_opaque_four_colour_block() {
        let pixels: BlockPixels = [[9, 9, 9, 255]; 16];
        let mut block = [0u8; 8];
        write_block(&mut block, 0xF800, 0x001F, 0x1234_5678);
        let before = block;
        punch_through(&mut block, &pixels, AlphaThreshold::default());
        assert_eq!(block, before);
    }

    #[test]
    fn test_punch_through_follows_threshold() {
        let mut pixels: BlockPixels = [[200, 40, 40, 255]; 16];
        pixels[3] = [200, 40, 40, 60];

        // -1 keeps every pixel opaque
        let mut block = [0u8; 8];
        write_block(&mut block, 0xF800, 0x001F, 0);
        let before = block;
        punch_through(&mut block, &pixels, AlphaThreshold::DISABLED);
        assert_eq!(block, before);

        // 61 makes only the faint pixel transparent
        let mut block = [0u8; 8];
        punch_through(&mut block, &pixels, AlphaThreshold::new(61));
        let decoded = decode_bc1(&block);
        assert_eq!(decoded[3][3], 0);
        assert_eq!(decoded[0][3], 255);

        // 256 makes the whole block transparent
        let mut block = [0u8; 8];
        punch_through(&mut block, &pixels, AlphaThreshold::new(256));
        assert_eq!(block, [0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_force_four_colour_swaps_endpoints() {
        let mut block = [0u8; 8];
        // c0 < c1 with every pixel on index 0 (= c0)
        write_block(&mut block, 0x0010, 0x8000, 0);
        force_four_colour(&mut block);

        let (c0, c1) = endpoints(&block);
        assert_eq!((c0, c1), (0x8000, 0x0010));
        // Pixels now reference index 1, still colour 0x0010
        assert_eq!(indices(&block), 0x5555_5555);
    }

    #[test]
    fn test_force_four_colour_equal_endpoints() {
        let mut block = [0u8; 8];
        write_block(&mut block, 0x1234, 0x1234, 0xFFFF_FFFF);
        force_four_colour(&mut block);
        let (c0, c1) = endpoints(&block);
        assert!(c0 > c1);
        let decoded = decode_bc1(&block);
        let expected = unpack_565(0x1234);
        for px in decoded {
            assert_eq!([px[0], px[1], px[2]], expected);
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn test_explicit_alpha_nibbles() {
        let mut pixels: BlockPixels = [[0, 0, 0, 255]; 16];
        pixels[0][3] = 0;
        pixels[1][3] = 255;
        pixels[2][3] = 128;
        pixels[3][3] = 8;

        let mut bc3 = [0u8; 16];
        write_block(&mut bc3[8..16], 0xFFFF, 0x0000, 0);
        let mut out = [0u8; 16];
        explicit_alpha(&bc3, &pixels, &mut out);

        assert_eq!(out[0], 0xF0);
        // 128 -> 8, 8 -> 0
        assert_eq!(out[1], 0x08);
        assert!(out[2..8].iter().all(|&b| b == 0xFF));
        assert_eq!(&out[8..16], &bc3[8..16]);
    }

    #[test]
    fn test_quantize_4bit_rounds() {
        assert_eq!(quantize_4bit(0), 0);
        assert_eq!(quantize_4bit(8), 0);
        assert_eq!(quantize_4bit(9), 1);
        assert_eq!(quantize_4bit(255), 15);
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pixel geometry of the reserved time-code corner.
//!
//! The four time-code fields are painted as solid `n x n` blocks. Days sit
//! in the corner block; hours, minutes and seconds are each painted twice,
//! once down the first block column and once along the first block row,
//! forming an L inside the `4n x 4n` corner. Reading only uses the column.

/// Number of time-code fields (days, hours, minutes, seconds).
pub const FIELD_COUNT: usize = 4;

/// Thickness of the overlay band handed to renderers, in pixels.
#[cfg(feature = "camera-opencv")]
pub const OVERLAY_BAND: u32 = 60;

/// An axis-aligned pixel rectangle (x = column, y = row).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Square rectangle at block coordinates `(col, row)` for block size `n`.
    fn block(col: u32, row: u32, n: u32) -> Self {
        Self::new(col * n, row * n, n, n)
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// Side length of the reserved corner region for block size `n`.
pub fn reserved_side(n: u32) -> u32 {
    FIELD_COUNT as u32 * n
}

/// Rectangles a field is painted into. Field 0 (days) has a single block.
pub fn field_blocks(field: usize, n: u32) -> Vec<PixelRect> {
    debug_assert!(field < FIELD_COUNT);
    let k = field as u32;
    if k == 0 {
        vec![PixelRect::block(0, 0, n)]
    } else {
        vec![PixelRect::block(0, k, n), PixelRect::block(k, 0, n)]
    }
}

/// Neighbourhood averaged when reading a field back.
///
/// A 3x3 window centred in the field's column block, shrinking to the
/// single centre pixel when blocks are smaller than 3 pixels.
pub fn sample_window(field: usize, n: u32) -> PixelRect {
    let side = if n >= 3 { 3 } else { 1 };
    let centre = n / 2;
    let x = centre - side / 2;
    let y = field as u32 * n + centre - side / 2;
    PixelRect::new(x, y, side, side)
}

/// Band reserved for the textual overlay next to the time-code corner.
///
/// Landscape frames get a band along the top edge, portrait frames one down
/// the left edge. The band starts one block in so the days block stays
/// visible.
#[cfg(feature = "camera-opencv")]
pub fn overlay_band(width: u32, height: u32, n: u32, landscape: bool) -> PixelRect {
    if landscape {
        PixelRect::new(n, 0, width.saturating_sub(n), OVERLAY_BAND.min(height))
    } else {
        PixelRect::new(0, n, OVERLAY_BAND.min(width), height.saturating_sub(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_stay_inside_reserved_corner() {
        let n = 15;
        let side = reserved_side(n);
        assert_eq!(side, 60);

        for field in 0..FIELD_COUNT {
            for rect in field_blocks(field, n) {
                assert!(rect.right() <= side);
                assert!(rect.bottom() <= side);
                assert_eq!(rect.width, n);
                assert_eq!(rect.height, n);
            }
        }
    }

    #[test]
    fn test_field_layout_is_l_shaped() {
        let n = 10;
        assert_eq!(field_blocks(0, n), vec![PixelRect::new(0, 0, 10, 10)]);
        assert_eq!(
            field_blocks(2, n),
            vec![PixelRect::new(0, 20, 10, 10), PixelRect::new(20, 0, 10, 10)]
        );
    }

    fn contains(rect: &PixelRect, x: u32, y: u32) -> bool {
        x >= rect.x && x < rect.right() && y >= rect.y && y < rect.bottom()
    }

    #[test]
    fn test_sample_window_inside_column_block() {
        for n in [1, 2, 3, 8, 15, 16] {
            for field in 0..FIELD_COUNT {
                let window = sample_window(field, n);
                let column_block = field_blocks(field, n)[0];
                assert!(contains(&column_block, window.x, window.y));
                assert!(contains(&column_block, window.right() - 1, window.bottom() - 1));
            }
        }
    }

    #[test]
    #[cfg(feature = "camera-opencv")]
    fn test_overlay_band_orientation() {
        let top = overlay_band(1280, 960, 15, true);
        assert_eq!(top, PixelRect::new(15, 0, 1265, 60));

        let left = overlay_band(960, 1280, 15, false);
        assert_eq!(left, PixelRect::new(0, 15, 60, 1265));
    }
}

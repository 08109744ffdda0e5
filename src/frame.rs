//! Borrowed frame view
//!
//! The camera collaborator owns pixel buffers; the detection layer only ever
//! borrows them for the duration of one evaluation tick. `Frame` validates
//! geometry once so that feature extraction can stay total.

use crate::error::VigilError;

/// Bytes per pixel: packed RGB, one byte per channel.
pub const FRAME_CHANNELS: usize = 3;

/// A borrowed, geometry-checked view of one decoded RGB frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pixels: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> Frame<'a> {
    /// Wrap a row-major RGB8 buffer, checking that its length matches the
    /// declared dimensions.
    pub fn new(pixels: &'a [u8], width: usize, height: usize) -> Result<Self, VigilError> {
        let expected = width * height * FRAME_CHANNELS;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(VigilError::FrameGeometry {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Iterate pixels as `[r, g, b]` triples.
    pub fn rgb_pixels(&self) -> impl Iterator<Item = [u8; 3]> + 'a {
        self.pixels
            .chunks_exact(FRAME_CHANNELS)
            .map(|p| [p[0], p[1], p[2]])
    }
}

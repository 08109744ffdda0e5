//! Frame feature extraction
//!
//! This module reduces a full pixel buffer to a [`FeatureSummary`]:
//! - Mean Rec.601 luma as a brightness estimate
//! - 16-bin normalized histograms over the HSV channels
//!
//! Extraction is deterministic and total; geometry problems are caught when
//! the [`Frame`](crate::frame::Frame) is constructed, never here.

use crate::frame::Frame;
use crate::types::{FeatureSummary, HIST_BINS};

/// Guard against division by zero when normalizing degenerate histograms.
const NORM_EPSILON: f64 = 1e-7;

/// Hue channel range, matching the OpenCV 8-bit convention (degrees / 2).
const HUE_RANGE: f64 = 180.0;

/// Saturation and value channel range.
const SV_RANGE: f64 = 256.0;

/// Stateless extractor producing one summary per frame.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Summarize a frame into brightness plus HSV histograms.
    pub fn extract(frame: &Frame<'_>) -> FeatureSummary {
        let mut luma_sum = 0.0;
        let mut hue = [0.0; HIST_BINS];
        let mut saturation = [0.0; HIST_BINS];
        let mut value = [0.0; HIST_BINS];

        for [r, g, b] in frame.rgb_pixels() {
            luma_sum += luma(r, g, b);

            let (h, s, v) = rgb_to_hsv(r, g, b);
            hue[bin_index(h, HUE_RANGE)] += 1.0;
            saturation[bin_index(s, SV_RANGE)] += 1.0;
            value[bin_index(v, SV_RANGE)] += 1.0;
        }

        normalize(&mut hue);
        normalize(&mut saturation);
        normalize(&mut value);

        FeatureSummary {
            brightness: luma_sum / (frame.pixel_count() as f64 * 255.0),
            hue,
            saturation,
            value,
        }
    }
}

/// Rec.601 luma, the same weighting OpenCV uses for grayscale conversion.
fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

/// Convert one pixel to OpenCV-convention HSV: hue in `[0, 180)`,
/// saturation and value in `[0, 255]`.
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64;
    let g = g as f64;
    let b = b as f64;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let mut hue_deg = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if hue_deg < 0.0 {
        hue_deg += 360.0;
    }

    let s = if max == 0.0 { 0.0 } else { delta / max * 255.0 };

    (hue_deg / 2.0, s, max)
}

fn bin_index(channel_value: f64, range: f64) -> usize {
    ((channel_value * HIST_BINS as f64 / range) as usize).min(HIST_BINS - 1)
}

fn normalize(hist: &mut [f64; HIST_BINS]) {
    let sum: f64 = hist.iter().sum();
    for bin in hist.iter_mut() {
        *bin /= sum + NORM_EPSILON;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(rgb: [u8; 3], width: usize, height: usize) -> Vec<u8> {
        rgb.iter()
            .copied()
            .cycle()
            .take(width * height * 3)
            .collect()
    }

    #[test]
    fn test_black_frame_has_zero_brightness() {
        let buffer = solid_frame([0, 0, 0], 8, 8);
        let frame = Frame::new(&buffer, 8, 8).unwrap();
        let summary = FeatureExtractor::extract(&frame);

        assert_eq!(summary.brightness, 0.0);
        // All mass lands in the first bin of every histogram.
        assert!(summary.hue[0] > 0.99);
        assert!(summary.saturation[0] > 0.99);
        assert!(summary.value[0] > 0.99);
    }

    #[test]
    fn test_white_frame_has_full_brightness() {
        let buffer = solid_frame([255, 255, 255], 8, 8);
        let frame = Frame::new(&buffer, 8, 8).unwrap();
        let summary = FeatureExtractor::extract(&frame);

        assert!((summary.brightness - 1.0).abs() < 1e-6);
        // Achromatic: hue 0, saturation 0, value in the top bin.
        assert!(summary.hue[0] > 0.99);
        assert!(summary.saturation[0] > 0.99);
        assert!(summary.value[HIST_BINS - 1] > 0.99);
    }

    #[test]
    fn test_pure_red_lands_in_low_hue_bin() {
        let buffer = solid_frame([255, 0, 0], 4, 4);
        let frame = Frame::new(&buffer, 4, 4).unwrap();
        let summary = FeatureExtractor::extract(&frame);

        assert!(summary.hue[0] > 0.99);
        assert!(summary.saturation[HIST_BINS - 1] > 0.99);
        assert!((summary.brightness - 0.299).abs() < 0.01);
    }

    #[test]
    fn test_pure_green_hue() {
        // Green: 120 degrees -> 60 in OpenCV half-degrees -> bin 60/180*16 = 5.
        let buffer = solid_frame([0, 255, 0], 4, 4);
        let frame = Frame::new(&buffer, 4, 4).unwrap();
        let summary = FeatureExtractor::extract(&frame);

        assert!(summary.hue[5] > 0.99);
    }

    #[test]
    fn test_histograms_are_normalized() {
        let buffer: Vec<u8> = (0..8 * 8 * 3).map(|i| (i * 7 % 256) as u8).collect();
        let frame = Frame::new(&buffer, 8, 8).unwrap();
        let summary = FeatureExtractor::extract(&frame);

        for hist in [&summary.hue, &summary.saturation, &summary.value] {
            let sum: f64 = hist.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4);
            assert!(hist.iter().all(|&bin| bin >= 0.0));
        }
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let buffer: Vec<u8> = (0..4 * 4 * 3).map(|i| (i * 13 % 256) as u8).collect();
        let frame = Frame::new(&buffer, 4, 4).unwrap();
        assert_eq!(
            FeatureExtractor::extract(&frame),
            FeatureExtractor::extract(&frame)
        );
    }
}

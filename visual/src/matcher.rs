//! Locating a template image inside a screenshot.
//!
//! Scores are mean-subtracted normalized cross-correlation, assembled from
//! imageproc's raw cross-correlation and integral images; this module also
//! prepares grayscale inputs, picks the best position and maps it back to
//! screen coordinates.

use image::{GrayImage, RgbaImage};
use imageproc::integral_image::{integral_image, integral_squared_image, sum_image_pixels};
use imageproc::template_matching::{find_extremes, match_template_parallel, MatchTemplateMethod};
use serde::Serialize;
use std::path::Path;

use crate::{AutomationError, Point, ScreenshotResult};

/// The best match of a template on screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
    /// Centre of the matched region, in logical screen coordinates
    pub center: Point,
    /// Top-left corner of the matched region, in logical screen coordinates
    pub top_left: Point,
    /// Size of the template in screenshot pixels
    pub width: u32,
    pub height: u32,
    /// Mean-subtracted normalized cross-correlation score in `[-1, 1]`
    pub score: f32,
}

/// Decode an image file into the grayscale form used for matching.
pub fn load_template(path: &Path) -> Result<GrayImage, AutomationError> {
    let image = image::open(path).map_err(|source| AutomationError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_luma8())
}

pub fn to_gray(image: &RgbaImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// Windows (and templates) whose mean squared deviation is below this many
/// gray levels squared count as flat: they have no shape to correlate.
const FLAT_VARIANCE: f64 = 1.0;

/// Best-scoring position of `template` in `haystack`, in pixel coordinates.
///
/// The score is the mean-subtracted normalized cross-correlation
/// (`TM_CCOEFF_NORMED` in OpenCV terms), in `[-1, 1]`: brightness alone does
/// not make a match, and flat screen regions score 0. Returns `None` when the
/// template is empty, flat, or does not fit inside the haystack.
pub fn best_match(haystack: &GrayImage, template: &GrayImage) -> Option<((u32, u32), f32)> {
    let (tw, th) = template.dimensions();
    let (hw, hh) = haystack.dimensions();
    if tw == 0 || th == 0 || tw > hw || th > hh {
        return None;
    }

    let n = f64::from(tw) * f64::from(th);
    let template_mean = template.pixels().map(|p| f64::from(p[0])).sum::<f64>() / n;
    let template_energy: f64 = template
        .pixels()
        .map(|p| (f64::from(p[0]) - template_mean).powi(2))
        .sum();
    if template_energy < n * FLAT_VARIANCE {
        return None;
    }

    // Σ t·i per window; centring uses Σ (t - t̄)·i = Σ t·i - t̄·Σ i
    let mut scores =
        match_template_parallel(haystack, template, MatchTemplateMethod::CrossCorrelation);
    let sums = integral_image::<_, u64>(haystack);
    let squares = integral_squared_image::<_, u64>(haystack);

    for (x, y, score) in scores.enumerate_pixels_mut() {
        let (right, bottom) = (x + tw - 1, y + th - 1);
        let [sum] = sum_image_pixels(&sums, x, y, right, bottom);
        let [squared] = sum_image_pixels(&squares, x, y, right, bottom);
        let sum = sum as f64;
        let window_energy = squared as f64 - sum * sum / n;

        score[0] = if window_energy < n * FLAT_VARIANCE {
            0.0
        } else {
            let covariance = f64::from(score[0]) - template_mean * sum;
            (covariance / (template_energy * window_energy).sqrt()).clamp(-1.0, 1.0) as f32
        };
    }

    let extremes = find_extremes(&scores);
    Some((extremes.max_value_location, extremes.max_value))
}

/// Find `template` in `screenshot`, accepting it only if it scores at least `confidence`.
pub fn locate(
    screenshot: &ScreenshotResult,
    template: &GrayImage,
    confidence: f64,
) -> Option<MatchResult> {
    let haystack = to_gray(&screenshot.image);
    let ((x, y), score) = best_match(&haystack, template)?;
    if f64::from(score) < confidence {
        return None;
    }

    let (width, height) = template.dimensions();
    Some(MatchResult {
        center: screenshot.to_screen(x + width / 2, y + height / 2),
        top_left: screenshot.to_screen(x, y),
        width,
        height,
        score,
    })
}

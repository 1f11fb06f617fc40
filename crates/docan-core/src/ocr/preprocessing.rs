//! Image preprocessing for OCR.

use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

/// Convert to grayscale and binarize with Otsu's global threshold.
pub fn binarize(image: &DynamicImage) -> DynamicImage {
    let gray = image.to_luma8();
    let threshold = otsu_threshold(&gray);
    debug!("Otsu threshold: {}", threshold);

    DynamicImage::ImageLuma8(apply_threshold(&gray, threshold))
}

/// Compute the threshold maximizing between-class variance.
///
/// Pixels strictly above the returned level belong to the foreground class.
pub fn otsu_threshold(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }

    let weighted_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut background_weight = 0u64;
    let mut background_sum = 0f64;
    let mut best_threshold = 0u8;
    let mut best_variance = 0f64;

    for (level, &count) in histogram.iter().enumerate() {
        background_weight += count;
        if background_weight == 0 {
            continue;
        }

        let foreground_weight = total - background_weight;
        if foreground_weight == 0 {
            break;
        }

        background_sum += level as f64 * count as f64;
        let background_mean = background_sum / background_weight as f64;
        let foreground_mean = (weighted_sum - background_sum) / foreground_weight as f64;

        let diff = background_mean - foreground_mean;
        let variance = background_weight as f64 * foreground_weight as f64 * diff * diff;

        if variance > best_variance {
            best_variance = variance;
            best_threshold = level as u8;
        }
    }

    best_threshold
}

fn apply_threshold(image: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut result = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let output = if pixel[0] > threshold { 255 } else { 0 };
        result.put_pixel(x, y, Luma([output]));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone(dark: u8, light: u8) -> GrayImage {
        GrayImage::from_fn(8, 8, |x, _| if x < 4 { Luma([dark]) } else { Luma([light]) })
    }

    #[test]
    fn test_otsu_separates_two_tones() {
        let image = two_tone(40, 200);
        let threshold = otsu_threshold(&image);

        assert!((40..200).contains(&threshold));
    }

    #[test]
    fn test_binarize_outputs_black_and_white() {
        let image = DynamicImage::ImageLuma8(two_tone(30, 220));
        let binary = binarize(&image).to_luma8();

        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(7, 7)[0], 255);
        assert!(binary.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_uniform_image() {
        let image = GrayImage::from_pixel(4, 4, Luma([128]));
        assert_eq!(otsu_threshold(&image), 0);
    }
}

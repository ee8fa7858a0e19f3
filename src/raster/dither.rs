//! # Grayscale to 1-bit Conversion
//!
//! Pixel sources come in as `image` crate buffers. This module flattens
//! them onto white, converts to an ink intensity (0.0 = white, 1.0 =
//! black) and reduces that to a [`RasterImage`].
//!
//! ## Methods
//!
//! | Method | Speed | Look |
//! |--------|-------|------|
//! | Threshold | Fastest | Hard edges, banding on gradients |
//! | Bayer | Fast | Regular halftone screen |
//! | Floyd-Steinberg | Slower | Fine noise, best for photos |
//!
//! Floyd-Steinberg is the default; it is what most imaging libraries do
//! when converting to 1-bit.
//!
//! ## Bayer Matrix
//!
//! ```text
//!     0   1   2   3   4   5   6   7   (x mod 8)
//!   ┌───┬───┬───┬───┬───┬───┬───┬───┐
//! 0 │ 0 │32 │ 8 │40 │ 2 │34 │10 │42 │
//! 1 │48 │16 │56 │24 │50 │18 │58 │26 │
//! 2 │12 │44 │ 4 │36 │14 │46 │ 6 │38 │
//! 3 │60 │28 │52 │20 │62 │30 │54 │22 │
//! 4 │ 3 │35 │11 │43 │ 1 │33 │ 9 │41 │
//! 5 │51 │19 │59 │27 │49 │17 │57 │25 │
//! 6 │15 │47 │ 7 │39 │13 │45 │ 5 │37 │
//! 7 │63 │31 │55 │23 │61 │29 │53 │21 │
//!   └───┴───┴───┴───┴───┴───┴───┴───┘
//! (y mod 8)
//! ```
//!
//! Thresholds are `(value + 0.5) / 64`, so pure white never prints and
//! pure black always does.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::RasterImage;

/// Bayer 8x8 ordered dithering matrix, values 0-63.
pub const BAYER8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// How to reduce gray levels to black and white.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dithering {
    /// Black where intensity is above one half
    Threshold,
    /// Ordered 8x8 Bayer screen
    Bayer,
    /// Error diffusion
    #[default]
    FloydSteinberg,
}

/// Bayer threshold for a pixel position, in (0, 1).
#[inline]
pub fn bayer_threshold(x: usize, y: usize) -> f32 {
    (BAYER8[y & 7][x & 7] as f32 + 0.5) / 64.0
}

/// Ink intensity of every pixel, row-major.
///
/// Transparent areas count as white paper. Luminance uses the ITU-R 601
/// weights.
pub fn intensity(image: &DynamicImage) -> Vec<f32> {
    let rgba = image.to_rgba8();
    rgba.pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            let alpha = a as f32 / 255.0;
            let over_white = |c: u8| c as f32 * alpha + 255.0 * (1.0 - alpha);
            let luma =
                0.299 * over_white(r) + 0.587 * over_white(g) + 0.114 * over_white(b);
            1.0 - luma / 255.0
        })
        .collect()
}

/// Reduce an intensity buffer to a bitmap.
///
/// `levels.len()` must be `width * height`; missing pixels read as white.
pub fn dither(levels: &[f32], width: usize, height: usize, method: Dithering) -> RasterImage {
    match method {
        Dithering::Threshold => RasterImage::from_fn(width, height, |x, y| {
            levels.get(y * width + x).is_some_and(|&v| v > 0.5)
        }),
        Dithering::Bayer => RasterImage::from_fn(width, height, |x, y| {
            levels
                .get(y * width + x)
                .is_some_and(|&v| v > bayer_threshold(x, y))
        }),
        Dithering::FloydSteinberg => floyd_steinberg(levels, width, height),
    }
}

fn floyd_steinberg(levels: &[f32], width: usize, height: usize) -> RasterImage {
    let mut buf: Vec<f32> = (0..width * height)
        .map(|i| levels.get(i).copied().unwrap_or(0.0))
        .collect();
    let mut bits = vec![false; width * height];

    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            let old = buf[i];
            let ink = old > 0.5;
            bits[i] = ink;
            let err = old - if ink { 1.0 } else { 0.0 };

            if x + 1 < width {
                buf[i + 1] += err * 7.0 / 16.0;
            }
            if y + 1 < height {
                let below = i + width;
                if x > 0 {
                    buf[below - 1] += err * 3.0 / 16.0;
                }
                buf[below] += err * 5.0 / 16.0;
                if x + 1 < width {
                    buf[below + 1] += err * 1.0 / 16.0;
                }
            }
        }
    }

    RasterImage {
        width,
        height,
        bits,
    }
}

impl RasterImage {
    /// Convert any `image` crate buffer to a printable bitmap.
    ///
    /// ```
    /// use escpos_forge::raster::RasterImage;
    /// use escpos_forge::raster::dither::Dithering;
    /// use image::{DynamicImage, GrayImage, Luma};
    ///
    /// let img = GrayImage::from_fn(4, 1, |x, _| Luma([if x < 2 { 0 } else { 255 }]));
    /// let raster = RasterImage::from_image(&DynamicImage::ImageLuma8(img), Dithering::Threshold);
    /// assert_eq!(raster.row(0), &[true, true, false, false]);
    /// ```
    pub fn from_image(image: &DynamicImage, method: Dithering) -> Self {
        let (width, height) = (image.width() as usize, image.height() as usize);
        dither(&intensity(image), width, height, method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    #[test]
    fn test_bayer_matrix_values() {
        let mut seen = [false; 64];
        for row in &BAYER8 {
            for &val in row {
                assert!(!seen[val as usize], "Duplicate value {}", val);
                seen[val as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_extremes_for_every_method() {
        for method in [Dithering::Threshold, Dithering::Bayer, Dithering::FloydSteinberg] {
            let black = dither(&[1.0; 64], 8, 8, method);
            let white = dither(&[0.0; 64], 8, 8, method);
            assert!((0..8).all(|y| black.row(y).iter().all(|&b| b)), "{method:?}");
            assert!((0..8).all(|y| white.row(y).iter().all(|&b| !b)), "{method:?}");
        }
    }

    #[test]
    fn test_gray_prints_about_half() {
        for method in [Dithering::Bayer, Dithering::FloydSteinberg] {
            let img = dither(&[0.5; 256], 16, 16, method);
            let count: usize = (0..16).map(|y| img.row(y).iter().filter(|&&b| b).count()).sum();
            assert!((112..=144).contains(&count), "{method:?} printed {count}");
        }
    }

    #[test]
    fn test_transparent_is_white() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let raster = RasterImage::from_image(&DynamicImage::ImageRgba8(img), Dithering::Threshold);
        assert!(raster.row(0).iter().chain(raster.row(1)).all(|&b| !b));
    }

    #[test]
    fn test_opaque_black_is_ink() {
        let img = RgbaImage::from_pixel(3, 1, Rgba([0, 0, 0, 255]));
        let levels = intensity(&DynamicImage::ImageRgba8(img));
        assert_eq!(levels, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_dimensions_preserved() {
        let img = GrayImage::from_pixel(13, 5, Luma([128]));
        let raster = RasterImage::from_image(&DynamicImage::ImageLuma8(img), Dithering::default());
        assert_eq!((raster.width(), raster.height()), (13, 5));
    }

    #[test]
    fn test_dithering_names() {
        let d: Dithering = serde_json::from_str(r#""floyd-steinberg""#).unwrap();
        assert_eq!(d, Dithering::FloydSteinberg);
    }
}

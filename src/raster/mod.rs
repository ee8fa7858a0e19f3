//! # Raster Image Encoding
//!
//! Turns a 1-bit [`RasterImage`] into printer commands, choosing the image
//! command from the profile and splitting the bitmap so every command fits
//! the printer.
//!
//! ## Pipeline
//!
//! ```text
//! RasterImage
//!     │  center (optional): pad to media width, extra column on the right
//!     ▼
//! vertical strips of ≤ max width, left to right
//!     │
//!     ▼
//! horizontal bands of ≤ fragment height, top to bottom
//!     │
//!     ▼
//! one command per band: GS v 0 | ESC * | GS ( L
//! ```
//!
//! ## Implementation Choice
//!
//! Without an explicit [`ImageOptions::implementation`], the first feature
//! the profile supports wins: `bitImageRaster`, then `bitImageColumn`, then
//! `graphics`.
//!
//! ## Example
//!
//! ```
//! use escpos_forge::profile::CapabilityDatabase;
//! use escpos_forge::raster::{self, ImageOptions, RasterImage};
//!
//! let db = CapabilityDatabase::builtin().unwrap();
//! let profile = db.resolve("TM-T88V").unwrap();
//!
//! let image = RasterImage::from_fn(16, 2, |x, _| x % 2 == 0);
//! let commands = raster::encode(&image, &profile, &ImageOptions::default()).unwrap();
//!
//! assert_eq!(commands.len(), 1);
//! assert_eq!(&commands[0][..8], &[0x1D, 0x76, 0x30, 0x00, 0x02, 0x00, 0x02, 0x00]);
//! ```

pub mod dither;

use serde::{Deserialize, Serialize};

use crate::Command;
use crate::error::{EscposError, Result};
use crate::profile::CapabilityProfile;
use crate::protocol::commands::{self, LF, LineSpacingUnit};
use crate::protocol::graphics;

/// Printable width assumed when the profile does not declare one (58mm paper).
pub const DEFAULT_MAX_WIDTH_PX: u32 = 384;

/// Tallest band sent in one command unless the caller or profile says otherwise.
pub const DEFAULT_FRAGMENT_HEIGHT: u32 = 960;

// ============================================================================
// RASTER IMAGE
// ============================================================================

/// An immutable 1-bit bitmap, row-major, `true` = printed dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl RasterImage {
    /// Wrap a row-major pixel buffer.
    ///
    /// Fails with [`EscposError::InvalidParameter`] if `bits.len()` is not
    /// `width * height`.
    pub fn new(width: usize, height: usize, bits: Vec<bool>) -> Result<Self> {
        if bits.len() != width * height {
            return Err(EscposError::InvalidParameter(format!(
                "{} pixels for a {}x{} image",
                bits.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> bool,
    {
        let mut bits = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// An all-white image.
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the dot at (x, y) prints. Out-of-range reads are white.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    /// One row of pixels.
    pub fn row(&self, y: usize) -> &[bool] {
        &self.bits[y * self.width..(y + 1) * self.width]
    }

    /// Width in bytes once packed, 8 dots per byte.
    #[inline]
    pub fn width_bytes(&self) -> usize {
        self.width.div_ceil(8)
    }

    /// All rows packed MSB-first, each row padded to whole bytes.
    pub fn to_raster_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.width_bytes() * self.height);
        for y in 0..self.height {
            data.extend(pack_row(self.row(y)));
        }
        data
    }

    /// Copy out the rectangle starting at (x, y), clipped to the image.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> Self {
        let width = width.min(self.width.saturating_sub(x));
        let height = height.min(self.height.saturating_sub(y));
        Self::from_fn(width, height, |cx, cy| self.get(x + cx, y + cy))
    }

    /// Add white columns on either side.
    pub fn pad_horizontal(&self, left: usize, right: usize) -> Self {
        Self::from_fn(self.width + left + right, self.height, |x, y| {
            x >= left && self.get(x - left, y)
        })
    }

    /// Center within `target` columns. Extra odd column goes right.
    pub fn centered(&self, target: usize) -> Self {
        if self.width >= target {
            return self.clone();
        }
        let left = (target - self.width) / 2;
        self.pad_horizontal(left, target - self.width - left)
    }
}

/// Pack a row of pixels into bytes, MSB = leftmost, `true` = 1.
///
/// The last byte is padded with zeros (white) on the right.
///
/// ```
/// use escpos_forge::raster::pack_row;
///
/// assert_eq!(pack_row(&[true, true, false, false, true, false, true, false]), vec![0xCA]);
/// assert_eq!(pack_row(&[true; 12]), vec![0xFF, 0xF0]);
/// ```
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; pixels.len().div_ceil(8)];
    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            bytes[i / 8] |= 0x80 >> (i % 8);
        }
    }
    bytes
}

// ============================================================================
// OPTIONS
// ============================================================================

/// Image command family, named after the profile feature that enables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageImpl {
    /// `GS v 0`
    BitImageRaster,
    /// `ESC *`
    BitImageColumn,
    /// `GS ( L`
    Graphics,
}

impl ImageImpl {
    /// Preference order when the caller does not choose.
    pub const PREFERENCE: [ImageImpl; 3] = [
        ImageImpl::BitImageRaster,
        ImageImpl::BitImageColumn,
        ImageImpl::Graphics,
    ];

    /// Profile feature flag for this command family.
    pub fn feature(self) -> &'static str {
        match self {
            Self::BitImageRaster => "bitImageRaster",
            Self::BitImageColumn => "bitImageColumn",
            Self::Graphics => "graphics",
        }
    }

    /// First family in [`PREFERENCE`](Self::PREFERENCE) order the profile supports.
    pub fn best_for(profile: &CapabilityProfile) -> Option<Self> {
        Self::PREFERENCE
            .into_iter()
            .find(|i| profile.supports(i.feature()))
    }
}

/// What to do with an image wider than the printable width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidePolicy {
    /// Emit it as several strips, left to right
    #[default]
    Split,
    /// Fail with [`EscposError::ImageWidth`]
    Reject,
}

/// Options for [`encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    pub high_density_vertical: bool,
    pub high_density_horizontal: bool,
    /// Command family; `None` picks from the profile
    pub implementation: Option<ImageImpl>,
    /// Center on the media width before splitting
    pub center: bool,
    /// Rows per command; `None` uses the profile's `maxRowsPerCommand`,
    /// then [`DEFAULT_FRAGMENT_HEIGHT`]
    pub fragment_height: Option<u32>,
    pub wide_policy: WidePolicy,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            high_density_vertical: true,
            high_density_horizontal: true,
            implementation: None,
            center: false,
            fragment_height: None,
            wide_policy: WidePolicy::Split,
        }
    }
}

// ============================================================================
// ENCODER
// ============================================================================

/// Printable width for `profile`, or [`DEFAULT_MAX_WIDTH_PX`].
pub fn max_width_px(profile: &CapabilityProfile) -> u32 {
    profile.media_width_px().unwrap_or(DEFAULT_MAX_WIDTH_PX)
}

/// Encode `image` as printer commands, one per strip and band.
///
/// # Errors
///
/// - [`EscposError::NotSupported`] if the profile has no usable image command
/// - [`EscposError::ImageWidth`] if the image is too wide and the policy is
///   [`WidePolicy::Reject`]
/// - [`EscposError::InvalidParameter`] for an empty image or a zero
///   fragment height
pub fn encode(
    image: &RasterImage,
    profile: &CapabilityProfile,
    options: &ImageOptions,
) -> Result<Vec<Command>> {
    if image.is_empty() {
        return Err(EscposError::InvalidParameter(format!(
            "empty image ({}x{})",
            image.width(),
            image.height()
        )));
    }

    let implementation = match options.implementation {
        Some(chosen) if profile.supports(chosen.feature()) => chosen,
        Some(chosen) => {
            return Err(EscposError::NotSupported(format!(
                "{} on profile {}",
                chosen.feature(),
                profile.id()
            )));
        }
        None => ImageImpl::best_for(profile).ok_or_else(|| {
            EscposError::NotSupported(format!("no image command on profile {}", profile.id()))
        })?,
    };

    let fragment_height = options
        .fragment_height
        .or(profile.media().max_rows_per_command)
        .unwrap_or(DEFAULT_FRAGMENT_HEIGHT) as usize;
    if fragment_height == 0 {
        return Err(EscposError::InvalidParameter("fragment height 0".into()));
    }

    let max_width = max_width_px(profile) as usize;
    if max_width == 0 {
        return Err(EscposError::ImageWidth(format!(
            "profile {} has no printable width",
            profile.id()
        )));
    }

    let centered;
    let image = if options.center {
        match profile.media_width_px() {
            Some(target) => {
                centered = image.centered(target as usize);
                &centered
            }
            None => {
                tracing::warn!(
                    profile = profile.id(),
                    "media width unknown, image not centered"
                );
                image
            }
        }
    } else {
        image
    };

    if image.width() > max_width && options.wide_policy == WidePolicy::Reject {
        return Err(EscposError::ImageWidth(format!(
            "{} > {}",
            image.width(),
            max_width
        )));
    }

    let mut out = Vec::new();
    for left in (0..image.width()).step_by(max_width) {
        let strip = image.crop(left, 0, max_width, image.height());
        for top in (0..strip.height()).step_by(fragment_height) {
            let band = strip.crop(0, top, strip.width(), fragment_height);
            out.push(encode_band(&band, implementation, options)?);
        }
    }

    tracing::debug!(
        width = image.width(),
        height = image.height(),
        commands = out.len(),
        implementation = implementation.feature(),
        "encoded image"
    );
    Ok(out)
}

fn encode_band(band: &RasterImage, implementation: ImageImpl, options: &ImageOptions) -> Result<Command> {
    let too_big = |what: &str| {
        EscposError::InvalidParameter(format!(
            "{} of {}x{} image exceeds command limits",
            what,
            band.width(),
            band.height()
        ))
    };
    let width = u16::try_from(band.width()).map_err(|_| too_big("width"))?;
    let height = u16::try_from(band.height()).map_err(|_| too_big("height"))?;
    let hdh = options.high_density_horizontal;
    let hdv = options.high_density_vertical;

    Ok(match implementation {
        ImageImpl::BitImageRaster => graphics::raster(
            graphics::raster_density(hdh, hdv),
            band.width_bytes() as u16,
            height,
            &band.to_raster_bytes(),
        ),
        ImageImpl::Graphics => {
            let scale = |high: bool| if high { 1 } else { 2 };
            let mut cmd =
                graphics::graphics_store(scale(hdh), scale(hdv), width, height, &band.to_raster_bytes());
            cmd.extend(graphics::graphics_print());
            cmd
        }
        ImageImpl::BitImageColumn => column_format(band, width, hdh, hdv),
    })
}

/// `ESC *` slices of 8 or 24 dots, bracketed by a 16/180" line spacing
/// and a line spacing reset.
fn column_format(image: &RasterImage, width: u16, hdh: bool, hdv: bool) -> Command {
    let line_height = if hdv { 24 } else { 8 };
    let bytes_per_column = line_height / 8;
    let mode = graphics::column_mode(hdh, hdv);

    let mut out = commands::line_spacing(LineSpacingUnit::OneEightieth, 16);
    for top in (0..image.height()).step_by(line_height) {
        let mut data = Vec::with_capacity(image.width() * bytes_per_column);
        for x in 0..image.width() {
            for chunk in 0..bytes_per_column {
                let mut byte = 0u8;
                for bit in 0..8 {
                    if image.get(x, top + chunk * 8 + bit) {
                        byte |= 0x80 >> bit;
                    }
                }
                data.push(byte);
            }
        }
        out.extend(graphics::column_slice(mode, width, &data));
        out.push(LF);
    }
    out.extend(commands::line_spacing_reset());
    out
}

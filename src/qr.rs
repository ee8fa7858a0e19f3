//! # QR Codes
//!
//! Printers with the `qrCode` feature get the native `GS ( k` sequence:
//!
//! ```text
//! GS ( k ... 1 A  model      select model
//! GS ( k ... 1 C  size       module size in dots
//! GS ( k ... 1 E  level      error correction
//! GS ( k ... 1 P 0 data      store
//! GS ( k ... 1 Q 0           print
//! ```
//!
//! Everything else gets the symbol drawn with the `qrcode` crate and sent
//! through the image encoder. Only model 2 can be drawn in software.

use qrcode::{Color, EcLevel, QrCode};

use crate::Command;
use crate::error::{EscposError, Result};
use crate::profile::CapabilityProfile;
use crate::protocol::barcode::qr::{self, QrErrorLevel, QrModel};
use crate::protocol::text::{self, Alignment};
use crate::raster::{self, ImageImpl, ImageOptions, RasterImage, WidePolicy};

/// Module size range in dots.
pub const SIZE_RANGE: std::ops::RangeInclusive<u8> = 1..=16;

/// Largest payload the store function can frame.
const MAX_PAYLOAD: usize = 65533 - 3;

/// Quiet zone in modules around a software-drawn symbol.
const SOFTWARE_BORDER: usize = 1;

/// How to print a QR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrOptions {
    pub error_level: QrErrorLevel,
    /// Module size in dots
    pub size: u8,
    pub model: QrModel,
    pub center: bool,
    /// Draw in software even when the printer has native QR
    pub force_software: bool,
    /// Image command for the software path; `None` picks from the profile
    pub implementation: Option<ImageImpl>,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            error_level: QrErrorLevel::L,
            size: 3,
            model: QrModel::Model2,
            center: false,
            force_software: false,
            implementation: None,
        }
    }
}

/// Produce the commands for one QR code.
///
/// An empty payload produces no commands.
///
/// ```
/// use escpos_forge::profile::CapabilityDatabase;
/// use escpos_forge::qr::{self, QrOptions};
///
/// let db = CapabilityDatabase::builtin().unwrap();
/// let profile = db.resolve("TM-T88V").unwrap();
/// let commands = qr::render(&profile, "https://example.com", &QrOptions::default()).unwrap();
/// // model, size, level, store, print
/// assert_eq!(commands.len(), 5);
/// ```
pub fn render(profile: &CapabilityProfile, content: &str, options: &QrOptions) -> Result<Vec<Command>> {
    if !SIZE_RANGE.contains(&options.size) {
        return Err(EscposError::InvalidParameter(format!(
            "QR module size {} outside 1-16",
            options.size
        )));
    }
    if content.is_empty() {
        return Ok(Vec::new());
    }

    if profile.supports("qrCode") && !options.force_software {
        return native(content, options);
    }

    if options.model != QrModel::Model2 {
        return Err(EscposError::NotSupported(format!(
            "{:?} QR codes need native support, profile {} has none",
            options.model,
            profile.id()
        )));
    }
    tracing::debug!(profile = profile.id(), "drawing QR code in software");

    let image = draw(content, options)?;
    let image_options = ImageOptions {
        implementation: options.implementation,
        center: options.center,
        wide_policy: WidePolicy::Reject,
        ..ImageOptions::default()
    };
    raster::encode(&image, profile, &image_options)
}

fn native(content: &str, options: &QrOptions) -> Result<Vec<Command>> {
    if content.len() > MAX_PAYLOAD {
        return Err(EscposError::InvalidParameter(format!(
            "QR payload of {} bytes exceeds {}",
            content.len(),
            MAX_PAYLOAD
        )));
    }

    let mut out = Vec::with_capacity(6);
    if options.center {
        out.push(text::align(Alignment::Center));
    }
    out.push(qr::set_model(options.model));
    out.push(qr::set_module_size(options.size));
    out.push(qr::set_error_correction(options.error_level));
    out.push(qr::store(content.as_bytes()));
    out.push(qr::print());
    Ok(out)
}

/// Draw the symbol with each module `size` dots square.
fn draw(content: &str, options: &QrOptions) -> Result<RasterImage> {
    let level = match options.error_level {
        QrErrorLevel::L => EcLevel::L,
        QrErrorLevel::M => EcLevel::M,
        QrErrorLevel::Q => EcLevel::Q,
        QrErrorLevel::H => EcLevel::H,
    };
    let code = QrCode::with_error_correction_level(content.as_bytes(), level)
        .map_err(|e| EscposError::InvalidParameter(format!("cannot encode QR payload: {e:?}")))?;

    let modules = code.width();
    let colors = code.to_colors();
    let scale = options.size as usize;
    let side = (modules + 2 * SOFTWARE_BORDER) * scale;

    Ok(RasterImage::from_fn(side, side, |x, y| {
        let (mx, my) = (x / scale, y / scale);
        let inside = SOFTWARE_BORDER..modules + SOFTWARE_BORDER;
        inside.contains(&mx)
            && inside.contains(&my)
            && colors[(my - SOFTWARE_BORDER) * modules + (mx - SOFTWARE_BORDER)] == Color::Dark
    }))
}

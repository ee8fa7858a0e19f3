//! # ESC/POS Graphics Commands
//!
//! This module implements the three bit image commands found on ESC/POS
//! printers. Which ones a printer understands is declared by its capability
//! profile (`bitImageRaster`, `bitImageColumn`, `graphics`).
//!
//! ## Graphics Modes Overview
//!
//! | Mode | Command | Data layout | Profile feature |
//! |------|---------|-------------|-----------------|
//! | Raster | GS v 0 | Row-major, 8 dots/byte | `bitImageRaster` |
//! | Column | ESC * | 8 or 24 dot vertical slices | `bitImageColumn` |
//! | Graphics | GS ( L / GS 8 L | Row-major, stored then printed | `graphics` |
//!
//! ## Bit Packing
//!
//! Raster data is packed as bytes where each bit represents one dot:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! Byte value 0xAA = 10101010 = █░█░█░█░
//! ```
//!
//! Column data uses the same bit order but vertically: bit 7 is the top dot
//! of a slice.

use super::commands::{ESC, GS, u16_le};

// ============================================================================
// RASTER BIT IMAGE (GS v 0)
// ============================================================================

/// # Print Raster Bit Image (GS v 0 m xL xH yL yH d1...dk)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS v 0 m xL xH yL yH d1...dk |
/// | Hex     | 1D 76 30 m xL xH yL yH d1...dk |
/// | Decimal | 29 118 48 m xL xH yL yH d1...dk |
///
/// ## Parameters
///
/// - `m`: Density. Bit 0 halves horizontal density, bit 1 halves vertical
///   density (0 = normal, 3 = quadruple size).
/// - `xL, xH`: Width in **bytes**, little-endian
/// - `yL, yH`: Height in dots, little-endian
/// - `d1...dk`: k = width_bytes × height bytes, row-major
///
/// ## Example
///
/// ```
/// use escpos_forge::protocol::graphics;
///
/// // A single black dot
/// let cmd = graphics::raster(0, 1, 1, &[0x80]);
/// assert_eq!(cmd, vec![0x1D, 0x76, 0x30, 0x00, 0x01, 0x00, 0x01, 0x00, 0x80]);
/// ```
pub fn raster(density: u8, width_bytes: u16, height: u16, data: &[u8]) -> Vec<u8> {
    debug_assert!(
        data.len() == width_bytes as usize * height as usize,
        "Raster data length mismatch. Expected {} ({} bytes × {} rows), got {}",
        width_bytes as usize * height as usize,
        width_bytes,
        height,
        data.len()
    );

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(8 + data.len());
    cmd.extend_from_slice(&[GS, b'v', b'0', density, xl, xh, yl, yh]);
    cmd.extend_from_slice(data);
    cmd
}

/// Density byte for `GS v 0`.
#[inline]
pub fn raster_density(high_density_horizontal: bool, high_density_vertical: bool) -> u8 {
    (if high_density_horizontal { 0 } else { 1 }) + (if high_density_vertical { 0 } else { 2 })
}

// ============================================================================
// COLUMN BIT IMAGE (ESC *)
// ============================================================================

/// # Select Bit-Image Mode (ESC * m nL nH d1...dk)
///
/// Prints one horizontal slice of an image. Each column of the slice is one
/// byte (8-dot modes) or three bytes (24-dot modes), top dot in the MSB.
///
/// ## Parameters
///
/// - `m`: Mode. 0/1 = 8-dot single/double density, 32/33 = 24-dot
///   single/double density.
/// - `nL, nH`: Width in **dots**, little-endian
///
/// The caller follows each slice with `LF` and brackets the whole image
/// with a 16-dot line spacing and a line spacing reset, so the slices butt
/// against each other.
pub fn column_slice(mode: u8, width_dots: u16, data: &[u8]) -> Vec<u8> {
    let [nl, nh] = u16_le(width_dots);

    let mut cmd = Vec::with_capacity(5 + data.len());
    cmd.extend_from_slice(&[ESC, b'*', mode, nl, nh]);
    cmd.extend_from_slice(data);
    cmd
}

/// Mode byte for `ESC *`.
#[inline]
pub fn column_mode(high_density_horizontal: bool, high_density_vertical: bool) -> u8 {
    (if high_density_horizontal { 1 } else { 0 }) + (if high_density_vertical { 32 } else { 0 })
}

// ============================================================================
// GRAPHICS (GS ( L / GS 8 L)
// ============================================================================

/// Wrap a graphics function payload (`m fn data`) in its length header.
///
/// Payloads that fit a 16-bit length use `GS ( L pL pH`; larger ones use the
/// extended `GS 8 L p1 p2 p3 p4` form.
fn graphics_function(function: u8, data: &[u8]) -> Vec<u8> {
    let len = data.len() + 2;

    let mut cmd = Vec::with_capacity(8 + data.len());
    if let Ok(short) = u16::try_from(len) {
        cmd.extend_from_slice(&[GS, b'(', b'L']);
        cmd.extend_from_slice(&u16_le(short));
    } else {
        cmd.extend_from_slice(&[GS, b'8', b'L']);
        cmd.extend_from_slice(&(len as u32).to_le_bytes());
    }
    cmd.push(b'0');
    cmd.push(function);
    cmd.extend_from_slice(data);
    cmd
}

/// # Store Raster Graphics in the Print Buffer (GS ( L fn=112)
///
/// ## Parameters
///
/// - `xm`, `ym`: Horizontal / vertical scale (1 = normal, 2 = double)
/// - `width_dots`, `height`: Image size in dots
/// - `data`: Row-major packed raster, width rounded up to whole bytes
///
/// ## Example
///
/// ```
/// use escpos_forge::protocol::graphics;
///
/// let cmd = graphics::graphics_store(1, 1, 1, 1, &[0x80]);
/// assert_eq!(&cmd[..5], &[0x1D, 0x28, 0x4C, 0x0B, 0x00]);
/// ```
pub fn graphics_store(xm: u8, ym: u8, width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(8 + data.len());
    // tone '0' = monochrome, colour '1' = first colour
    payload.extend_from_slice(&[b'0', xm, ym, b'1']);
    payload.extend_from_slice(&u16_le(width_dots));
    payload.extend_from_slice(&u16_le(height));
    payload.extend_from_slice(data);
    graphics_function(b'p', &payload)
}

/// # Print Stored Graphics (GS ( L fn=50)
#[inline]
pub fn graphics_print() -> Vec<u8> {
    graphics_function(b'2', &[])
}

// ============================================================================
// TESTS
// ============================================================================

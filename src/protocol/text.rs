//! # ESC/POS Text Styling Commands
//!
//! | Style | Command | Effect |
//! |-------|---------|--------|
//! | Alignment | ESC a n | Left / center / right |
//! | Bold | ESC E n | **Emphasized** text |
//! | Underline | ESC - n | 1-dot or 2-dot underline |
//! | Font | ESC M n | Character font selection |
//! | Size | ESC ! n / GS ! n | Double or custom width and height |
//! | Invert | GS B n | White on black |
//! | Flip | ESC { n | Upside-down printing |
//! | Smooth | GS b n | Smoothing for large text |
//! | Density | GS \| n | Print darkness |
//!
//! Text bytes themselves are produced by [`crate::magic`], which also owns
//! codepage switching.

use super::commands::{ESC, GS};

// ============================================================================
// TEXT ALIGNMENT
// ============================================================================

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// # Select Justification (ESC a n)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC a n |
/// | Hex     | 1B 61 n |
/// | Decimal | 27 97 n |
///
/// Takes effect at the start of the next line. Also applies to barcodes and
/// images, which is how hardware barcodes get centered.
///
/// ## Example
///
/// ```
/// use escpos_forge::protocol::text::{align, Alignment};
///
/// assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

// ============================================================================
// EMPHASIS
// ============================================================================

/// # Turn Emphasized Mode On/Off (ESC E n)
#[inline]
pub fn bold(enabled: bool) -> Vec<u8> {
    vec![ESC, b'E', enabled as u8]
}

/// Underline thickness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Underline {
    #[default]
    Off = 0,
    Single = 1,
    Double = 2,
}

/// # Turn Underline Mode On/Off (ESC - n)
#[inline]
pub fn underline(mode: Underline) -> Vec<u8> {
    vec![ESC, b'-', mode as u8]
}

// ============================================================================
// FONT SELECTION
// ============================================================================

/// # Select Character Font (ESC M n)
///
/// `n` is the font index from the printer profile's `fonts` table; use
/// [`crate::profile::CapabilityProfile::font`] to validate it first.
#[inline]
pub fn font(n: u8) -> Vec<u8> {
    vec![ESC, b'M', n]
}

// ============================================================================
// CHARACTER SIZE
// ============================================================================

/// Preset sizes available through the print mode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextSize {
    #[default]
    Normal = 0x00,
    DoubleHeight = 0x10,
    DoubleWidth = 0x20,
    /// Double width and height
    Quad = 0x30,
}

/// # Select Print Mode (ESC ! n)
///
/// Only the size bits are set; the other mode bits are cleared, so bold and
/// underline set through `ESC !` are reset as well.
#[inline]
pub fn print_mode(size: TextSize) -> Vec<u8> {
    vec![ESC, b'!', size as u8]
}

/// Valid multiplier range for [`character_size`].
pub const SIZE_MULTIPLIERS: std::ops::RangeInclusive<u8> = 1..=8;

/// # Select Character Size (GS ! n)
///
/// Width multiplier in the high nibble, height in the low one, each stored
/// as `multiplier - 1`. Multipliers outside 1-8 are clamped.
///
/// ```
/// use escpos_forge::protocol::text::character_size;
///
/// assert_eq!(character_size(3, 2), vec![0x1D, 0x21, 0x21]);
/// ```
pub fn character_size(width: u8, height: u8) -> Vec<u8> {
    let w = width.clamp(1, 8) - 1;
    let h = height.clamp(1, 8) - 1;
    vec![GS, b'!', (w << 4) | h]
}

// ============================================================================
// PRINT EFFECTS
// ============================================================================

/// # Turn White/Black Reverse Printing On/Off (GS B n)
#[inline]
pub fn invert(enabled: bool) -> Vec<u8> {
    vec![GS, b'B', enabled as u8]
}

/// # Turn Upside-Down Printing On/Off (ESC { n)
#[inline]
pub fn flip(enabled: bool) -> Vec<u8> {
    vec![ESC, b'{', enabled as u8]
}

/// # Turn Smoothing On/Off (GS b n)
#[inline]
pub fn smooth(enabled: bool) -> Vec<u8> {
    vec![GS, b'b', enabled as u8]
}

/// Valid levels for [`density`], lightest first.
pub const DENSITY_LEVELS: std::ops::RangeInclusive<u8> = 0..=8;

/// `GS |` argument per density level. 0-4 go from -50% to the default in
/// 12.5% steps, 5-8 are +50% down to +12.5%.
const DENSITY_BYTES: [u8; 9] = [0, 1, 2, 3, 4, 8, 7, 6, 5];

/// # Select Print Density (GS | n)
///
/// Levels above 8 are clamped.
#[inline]
pub fn density(level: u8) -> Vec<u8> {
    vec![GS, b'|', DENSITY_BYTES[level.min(8) as usize]]
}

//! # ESC/POS Protocol Commands
//!
//! This module implements the basic ESC/POS commands shared by every printer
//! profile: initialization, codepage selection, paper feed, tab stops,
//! cutting and the small peripherals (cash drawer, buzzer, panel buttons,
//! line display).
//!
//! ## Escape Sequence Structure
//!
//! Commands follow these patterns:
//! - Single byte: `LF`, `NUL`
//! - Two bytes: `ESC @`, `ESC 2`
//! - Multi-byte with parameters: `ESC t n`, `GS V m`, `GS v 0 m xL xH yL yH`
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// NUL - Terminator for function type A barcodes and tab lists
pub const NUL: u8 = 0x00;

/// HT (Horizontal Tab) - Move to the next tab stop
pub const HT: u8 = 0x09;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

/// VT (Vertical Tab)
pub const VT: u8 = 0x0B;

/// FF (Form Feed) - End of page in page mode, print and recover otherwise
pub const FF: u8 = 0x0C;

/// CR (Carriage Return) - Ignored by most printers with auto line feed on
pub const CR: u8 = 0x0D;

/// ESC (Escape) - Command prefix byte
///
/// Most ESC/POS commands begin with ESC (0x1B). This byte signals the start
/// of a control sequence rather than printable text.
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
///
/// Used for graphics, barcodes, cutting and 2D symbols.
/// - Hex: 0x1D, Decimal: 29
pub const GS: u8 = 0x1D;

// ============================================================================
// INITIALIZATION COMMANDS
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and resets the printer modes to their power-on
/// defaults.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
/// | Decimal | 27 64 |
///
/// ## What Gets Reset
///
/// - Print buffer is cleared
/// - Character table goes back to the printer's default (usually 0)
/// - Text formatting and alignment
/// - Line spacing
///
/// ## Example
///
/// ```
/// use escpos_forge::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// Device selected by `ESC = n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peripheral {
    Printer = 1,
    /// A customer display daisy-chained in front of the printer
    LineDisplay = 2,
}

/// # Select Peripheral Device (ESC = n)
///
/// Data after this command goes only to the selected device until the next
/// `ESC =`.
#[inline]
pub fn select_peripheral(device: Peripheral) -> Vec<u8> {
    vec![ESC, b'=', device as u8]
}

/// # Reset Printer Hardware (ESC ? LF NUL)
#[inline]
pub fn reset_hardware() -> Vec<u8> {
    vec![ESC, b'?', LF, NUL]
}

// ============================================================================
// CHARACTER CODE TABLE
// ============================================================================

/// # Select Character Code Table (ESC t n)
///
/// Switches the printer's active codepage. `n` is the index the printer
/// profile declares for that codepage, not a universal number: the same
/// codepage can live at different indices on different models.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC t n |
/// | Hex     | 1B 74 n |
/// | Decimal | 27 116 n |
///
/// ## Example
///
/// ```
/// use escpos_forge::protocol::commands;
///
/// assert_eq!(commands::select_codepage(19), vec![0x1B, 0x74, 0x13]);
/// ```
#[inline]
pub fn select_codepage(n: u8) -> Vec<u8> {
    vec![ESC, b't', n]
}

// ============================================================================
// PAPER FEED COMMANDS
// ============================================================================

/// # Print and Feed n Lines (ESC d n)
///
/// Prints the line buffer and feeds `n` lines (0-255).
#[inline]
pub fn print_and_feed(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

/// # Set Horizontal Tab Positions (ESC D n1 ... nk NUL)
///
/// Each position is a column count from the start of the line and must be
/// larger than the one before it. An empty list clears every tab stop.
///
/// ## Example
///
/// ```
/// use escpos_forge::protocol::commands;
///
/// assert_eq!(commands::set_tab_stops(&[8, 16]), vec![0x1B, 0x44, 8, 16, 0x00]);
/// ```
pub fn set_tab_stops(positions: &[u8]) -> Vec<u8> {
    let mut cmd = Vec::with_capacity(positions.len() + 3);
    cmd.extend_from_slice(&[ESC, b'D']);
    cmd.extend_from_slice(positions);
    cmd.push(NUL);
    cmd
}

/// # Select Default Line Spacing (ESC 2)
#[inline]
pub fn line_spacing_reset() -> Vec<u8> {
    vec![ESC, b'2']
}

/// Line spacing units understood by ESC/POS printers.
///
/// | Divisor | Command | Range |
/// |---------|---------|-------|
/// | 1/60 inch | ESC A n | 0-85 |
/// | 1/180 inch | ESC 3 n | 0-255 |
/// | 1/360 inch | ESC + n | 0-255 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSpacingUnit {
    Sixtieth,
    #[default]
    OneEightieth,
    ThreeSixtieth,
}

impl LineSpacingUnit {
    /// Parse the divisor (60, 180 or 360).
    pub fn from_divisor(divisor: u16) -> Option<Self> {
        match divisor {
            60 => Some(Self::Sixtieth),
            180 => Some(Self::OneEightieth),
            360 => Some(Self::ThreeSixtieth),
            _ => None,
        }
    }

    /// Largest spacing value the command accepts.
    pub fn max_spacing(self) -> u8 {
        match self {
            Self::Sixtieth => 85,
            Self::OneEightieth | Self::ThreeSixtieth => 255,
        }
    }

    fn command_byte(self) -> u8 {
        match self {
            Self::Sixtieth => b'A',
            Self::OneEightieth => b'3',
            Self::ThreeSixtieth => b'+',
        }
    }
}

/// # Set Line Spacing (ESC 3 n / ESC A n / ESC + n)
///
/// The caller is responsible for keeping `spacing` within
/// [`LineSpacingUnit::max_spacing`].
#[inline]
pub fn line_spacing(unit: LineSpacingUnit, spacing: u8) -> Vec<u8> {
    vec![ESC, unit.command_byte(), spacing]
}

// ============================================================================
// CUTTER CONTROL COMMANDS
// ============================================================================

/// # Full Cut (GS V 0)
///
/// ## Protocol Details
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS V 0   |
/// | Hex     | 1D 56 00 |
/// | Decimal | 29 86 0  |
#[inline]
pub fn cut_full() -> Vec<u8> {
    vec![GS, b'V', 0]
}

/// # Partial Cut (GS V 1)
///
/// Leaves a small uncut hinge so the receipt does not fall.
#[inline]
pub fn cut_partial() -> Vec<u8> {
    vec![GS, b'V', 1]
}

/// # Feed to Cutter and Cut Without Extra Feed (GS V 66 0)
///
/// Function B of `GS V` with a feed amount of zero: the printer moves the
/// last printed line past the cutter and cuts.
#[inline]
pub fn cut_no_feed() -> Vec<u8> {
    vec![GS, b'V', 66, 0]
}

// ============================================================================
// PERIPHERALS
// ============================================================================

/// # Generate Pulse (ESC p m t1 t2)
///
/// Kicks the cash drawer connected to connector pin 2 (`m = 0`) or pin 5
/// (`m = 1`). `t1`/`t2` are the on/off times in 2ms units.
#[inline]
pub fn drawer_pulse(m: u8, on_time: u8, off_time: u8) -> Vec<u8> {
    vec![ESC, b'p', m, on_time, off_time]
}

/// # Internal Buzzer (ESC B n t)
///
/// Beeps `times` times (1-9) for `duration` (1-9) units each. Only some
/// models have a buzzer.
#[inline]
pub fn buzzer(times: u8, duration: u8) -> Vec<u8> {
    vec![ESC, b'B', times, duration]
}

/// # Enable/Disable Panel Buttons (ESC c 5 n)
///
/// `n = 0` enables the buttons, `n = 1` disables them. Lasts until the next
/// `ESC @` or power cycle.
#[inline]
pub fn panel_buttons(enabled: bool) -> Vec<u8> {
    vec![ESC, b'c', b'5', !enabled as u8]
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Encode a u16 value as little-endian bytes [low, high]
///
/// ESC/POS uses little-endian encoding for all multi-byte integers.
///
/// ## Example
///
/// ```
/// use escpos_forge::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(576), [0x40, 0x02]); // 576 = 0x0240
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_select_codepage() {
        assert_eq!(select_codepage(0), vec![0x1B, 0x74, 0x00]);
        assert_eq!(select_codepage(255), vec![0x1B, 0x74, 0xFF]);
    }

    #[test]
    fn test_print_and_feed() {
        assert_eq!(print_and_feed(6), vec![0x1B, 0x64, 0x06]);
    }

    #[test]
    fn test_line_spacing_units() {
        assert_eq!(line_spacing(LineSpacingUnit::OneEightieth, 30), vec![0x1B, b'3', 30]);
        assert_eq!(line_spacing(LineSpacingUnit::Sixtieth, 85), vec![0x1B, b'A', 85]);
        assert_eq!(line_spacing(LineSpacingUnit::ThreeSixtieth, 1), vec![0x1B, b'+', 1]);
        assert_eq!(LineSpacingUnit::from_divisor(90), None);
        assert_eq!(LineSpacingUnit::Sixtieth.max_spacing(), 85);
    }

    #[test]
    fn test_cuts() {
        assert_eq!(cut_full(), vec![0x1D, 0x56, 0x00]);
        assert_eq!(cut_partial(), vec![0x1D, 0x56, 0x01]);
        assert_eq!(cut_no_feed(), vec![0x1D, 0x56, 0x42, 0x00]);
    }

    #[test]
    fn test_drawer_pulse() {
        assert_eq!(drawer_pulse(0, 50, 50), vec![0x1B, 0x70, 0x00, 0x32, 0x32]);
    }

    #[test]
    fn test_tab_stops() {
        assert_eq!(set_tab_stops(&[]), vec![0x1B, 0x44, 0x00]);
        assert_eq!(set_tab_stops(&[8, 16, 24]), vec![0x1B, 0x44, 8, 16, 24, 0x00]);
    }

    #[test]
    fn test_peripherals() {
        assert_eq!(select_peripheral(Peripheral::Printer), vec![0x1B, 0x3D, 0x01]);
        assert_eq!(select_peripheral(Peripheral::LineDisplay), vec![0x1B, 0x3D, 0x02]);
        assert_eq!(reset_hardware(), vec![0x1B, 0x3F, 0x0A, 0x00]);
        assert_eq!(panel_buttons(true), vec![0x1B, 0x63, 0x35, 0x00]);
        assert_eq!(panel_buttons(false), vec![0x1B, 0x63, 0x35, 0x01]);
    }

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x0000), [0x00, 0x00]);
        assert_eq!(u16_le(0x00FF), [0xFF, 0x00]);
        assert_eq!(u16_le(0xFF00), [0x00, 0xFF]);
        assert_eq!(u16_le(0x1234), [0x34, 0x12]);
    }
}

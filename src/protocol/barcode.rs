//! # ESC/POS Barcode Commands
//!
//! Raw byte builders for 1D barcodes (`GS k`) and QR codes (`GS ( k`).
//! Validation and the hardware/software decision live in
//! [`crate::barcode`]; everything here assumes its input is already valid.
//!
//! ## 1D Barcode Sequence
//!
//! ```text
//! GS h n        barcode height in dots (1-255)
//! GS w n        module width (2-6)
//! GS f n        HRI font (0 = A, 1 = B)
//! GS H n        HRI position (0 off, 1 above, 2 below, 3 both)
//! GS k m ...    the symbol itself, function type A or B
//! ```
//!
//! ## Function Types
//!
//! | Type | Framing | `m` range |
//! |------|---------|-----------|
//! | A | `GS k m d1...dn NUL` | 0-6 |
//! | B | `GS k m n d1...dn` | 65-78 |

use super::commands::{GS, NUL};

// ============================================================================
// 1D BARCODE COMMANDS
// ============================================================================

/// 1D Barcode command builders
pub mod barcode1d {
    use super::{GS, NUL};

    /// # Set Barcode Height (GS h n)
    #[inline]
    pub fn height(dots: u8) -> Vec<u8> {
        vec![GS, b'h', dots]
    }

    /// # Set Barcode Module Width (GS w n)
    #[inline]
    pub fn width(module: u8) -> Vec<u8> {
        vec![GS, b'w', module]
    }

    /// # Select HRI Font (GS f n)
    #[inline]
    pub fn hri_font(n: u8) -> Vec<u8> {
        vec![GS, b'f', n]
    }

    /// # Select HRI Print Position (GS H n)
    #[inline]
    pub fn hri_position(n: u8) -> Vec<u8> {
        vec![GS, b'H', n]
    }

    /// # Print Barcode, Function Type A (GS k m d1...dn NUL)
    ///
    /// ## Example
    ///
    /// ```
    /// use escpos_forge::protocol::barcode::barcode1d;
    ///
    /// let cmd = barcode1d::function_a(2, b"4006381333931");
    /// assert_eq!(&cmd[..3], &[0x1D, 0x6B, 0x02]);
    /// assert_eq!(cmd.last(), Some(&0x00));
    /// ```
    pub fn function_a(m: u8, data: &[u8]) -> Vec<u8> {
        let mut cmd = Vec::with_capacity(4 + data.len());
        cmd.extend_from_slice(&[GS, b'k', m]);
        cmd.extend_from_slice(data);
        cmd.push(NUL);
        cmd
    }

    /// # Print Barcode, Function Type B (GS k m n d1...dn)
    ///
    /// `data` must be at most 255 bytes; the length byte is `data.len()`.
    ///
    /// ## Example
    ///
    /// ```
    /// use escpos_forge::protocol::barcode::barcode1d;
    ///
    /// let cmd = barcode1d::function_b(73, b"{B012ABCDabcd");
    /// assert_eq!(&cmd[..4], &[0x1D, 0x6B, 73, 13]);
    /// ```
    pub fn function_b(m: u8, data: &[u8]) -> Vec<u8> {
        debug_assert!(data.len() <= 255, "function B payload exceeds 255 bytes");

        let mut cmd = Vec::with_capacity(4 + data.len());
        cmd.extend_from_slice(&[GS, b'k', m, data.len() as u8]);
        cmd.extend_from_slice(data);
        cmd
    }
}

// ============================================================================
// QR CODE COMMANDS (GS ( k, cn = 49)
// ============================================================================

/// QR Code command builders
///
/// Every QR function shares the framing `GS ( k pL pH cn fn [m] data`, where
/// `pL pH` counts everything after itself.
pub mod qr {
    use super::GS;
    use crate::protocol::commands::u16_le;

    const CN_QR: u8 = b'1';

    fn function(fn_code: u8, m: Option<u8>, data: &[u8]) -> Vec<u8> {
        let len = data.len() + 2 + usize::from(m.is_some());
        let [pl, ph] = u16_le(len as u16);

        let mut cmd = Vec::with_capacity(5 + len);
        cmd.extend_from_slice(&[GS, b'(', b'k', pl, ph, CN_QR, fn_code]);
        if let Some(m) = m {
            cmd.push(m);
        }
        cmd.extend_from_slice(data);
        cmd
    }

    /// QR model selection
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum QrModel {
        Model1 = 1,
        #[default]
        Model2 = 2,
        Micro = 3,
    }

    /// Error correction level
    ///
    /// | Level | Recovery |
    /// |-------|----------|
    /// | L | ~7% |
    /// | M | ~15% |
    /// | Q | ~25% |
    /// | H | ~30% |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum QrErrorLevel {
        #[default]
        L = 0,
        M = 1,
        Q = 2,
        H = 3,
    }

    /// # Select Model (fn 65)
    pub fn set_model(model: QrModel) -> Vec<u8> {
        function(65, None, &[b'0' + model as u8, 0])
    }

    /// # Set Module Size (fn 67), 1-16 dots
    pub fn set_module_size(size: u8) -> Vec<u8> {
        function(67, None, &[size])
    }

    /// # Select Error Correction Level (fn 69)
    pub fn set_error_correction(level: QrErrorLevel) -> Vec<u8> {
        function(69, None, &[b'0' + level as u8])
    }

    /// # Store Data in the Symbol Storage Area (fn 80)
    ///
    /// The caller keeps `data` under 65533 bytes.
    pub fn store(data: &[u8]) -> Vec<u8> {
        function(80, Some(b'0'), data)
    }

    /// # Print the Stored Symbol (fn 81)
    pub fn print() -> Vec<u8> {
        function(81, Some(b'0'), &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod barcode1d_tests {
        use super::*;

        #[test]
        fn test_setup_commands() {
            assert_eq!(barcode1d::height(64), vec![0x1D, 0x68, 64]);
            assert_eq!(barcode1d::width(3), vec![0x1D, 0x77, 3]);
            assert_eq!(barcode1d::hri_font(1), vec![0x1D, 0x66, 1]);
            assert_eq!(barcode1d::hri_position(2), vec![0x1D, 0x48, 2]);
        }

        #[test]
        fn test_function_a_is_nul_terminated() {
            let cmd = barcode1d::function_a(4, b"ABC");
            assert_eq!(cmd, vec![0x1D, 0x6B, 4, b'A', b'B', b'C', 0x00]);
        }

        #[test]
        fn test_function_b_is_length_prefixed() {
            let cmd = barcode1d::function_b(69, b"ABC");
            assert_eq!(cmd, vec![0x1D, 0x6B, 69, 3, b'A', b'B', b'C']);
        }
    }

    mod qr_tests {
        use super::*;
        use qr::{QrErrorLevel, QrModel};

        #[test]
        fn test_set_model() {
            assert_eq!(
                qr::set_model(QrModel::Model2),
                vec![0x1D, 0x28, 0x6B, 0x04, 0x00, 0x31, 0x41, 0x32, 0x00]
            );
        }

        #[test]
        fn test_set_module_size() {
            assert_eq!(
                qr::set_module_size(3),
                vec![0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x43, 0x03]
            );
        }

        #[test]
        fn test_set_error_correction() {
            assert_eq!(
                qr::set_error_correction(QrErrorLevel::H),
                vec![0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x45, 0x33]
            );
        }

        #[test]
        fn test_store() {
            assert_eq!(
                qr::store(b"1234"),
                vec![0x1D, 0x28, 0x6B, 0x07, 0x00, 0x31, 0x50, 0x30, b'1', b'2', b'3', b'4']
            );
        }

        #[test]
        fn test_print() {
            assert_eq!(qr::print(), vec![0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x51, 0x30]);
        }
    }
}

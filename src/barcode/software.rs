//! Software barcode drawing.
//!
//! Produces the bar/space module sequence for a symbol. The caller scales
//! it to the requested module width and height and prints it as an image.

use barcoders::sym::codabar::Codabar;
use barcoders::sym::code39::Code39;
use barcoders::sym::code93::Code93;
use barcoders::sym::code128::Code128;
use barcoders::sym::ean8::EAN8;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::tf::TF;

use super::Symbology;
use crate::error::{EscposError, Result};

/// Draws symbols as bar/space modules.
pub trait SymbolRenderer {
    /// Whether [`SymbolRenderer::modules`] can draw this symbology at all.
    fn supports(&self, symbology: Symbology) -> bool;

    /// One entry per narrow module, `true` for a bar.
    ///
    /// The payload has already passed the symbology's validation.
    fn modules(&self, symbology: Symbology, payload: &str) -> Result<Vec<bool>>;
}

/// [`SymbolRenderer`] backed by the `barcoders` crate.
///
/// Draws UPC-A, EAN13, EAN8, CODE39, ITF, NW7, CODE93 and CODE128.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarcodersRenderer;

// Code set selectors barcoders expects at the head of a CODE128 payload
const CODE128_SETS: [(&str, char); 3] = [("{A", 'À'), ("{B", 'Ɓ'), ("{C", 'Ć')];

impl SymbolRenderer for BarcodersRenderer {
    fn supports(&self, symbology: Symbology) -> bool {
        matches!(
            symbology,
            Symbology::UpcA
                | Symbology::Ean13
                | Symbology::Ean8
                | Symbology::Code39
                | Symbology::Itf
                | Symbology::Nw7
                | Symbology::Code93
                | Symbology::Code128
        )
    }

    fn modules(&self, symbology: Symbology, payload: &str) -> Result<Vec<bool>> {
        let fail = |e: barcoders::error::Error| {
            EscposError::BarcodeCode(format!("cannot draw {symbology} '{payload}': {e:?}"))
        };

        // barcoders computes check digits itself, so drop any supplied one
        let encoded = match symbology {
            Symbology::UpcA => EAN13::new(format!("0{}", &payload[..11])).map_err(fail)?.encode(),
            Symbology::Ean13 => EAN13::new(&payload[..12]).map_err(fail)?.encode(),
            Symbology::Ean8 => EAN8::new(&payload[..7]).map_err(fail)?.encode(),
            Symbology::Code39 => Code39::new(payload.trim_matches('*')).map_err(fail)?.encode(),
            Symbology::Itf => TF::interleaved(payload).map_err(fail)?.encode(),
            Symbology::Nw7 => Codabar::new(payload.to_ascii_uppercase()).map_err(fail)?.encode(),
            Symbology::Code93 => Code93::new(payload).map_err(fail)?.encode(),
            Symbology::Code128 => Code128::new(code128_payload(payload)).map_err(fail)?.encode(),
            other => {
                return Err(EscposError::BarcodeType(format!(
                    "{other} cannot be drawn in software"
                )));
            }
        };

        Ok(encoded.into_iter().map(|m| m == 1).collect())
    }
}

/// Replace `{A`, `{B` and `{C` selectors with barcoders' set characters.
fn code128_payload(payload: &str) -> String {
    CODE128_SETS
        .iter()
        .fold(payload.to_string(), |acc, (selector, set)| {
            acc.replace(selector, &set.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code128_selectors() {
        assert_eq!(code128_payload("{B012{C34"), "Ɓ012Ć34");
        assert_eq!(code128_payload("{Aabc"), "Àabc");
    }

    #[test]
    fn test_ean13_ignores_supplied_check_digit() {
        let r = BarcodersRenderer;
        let with = r.modules(Symbology::Ean13, "4006381333931").unwrap();
        let without = r.modules(Symbology::Ean13, "400638133393").unwrap();
        assert_eq!(with, without);
        // 95 modules: guards, 12 digits of 7 modules, center guard
        assert_eq!(with.len(), 95);
    }

    #[test]
    fn test_upca_draws_like_ean13_with_leading_zero() {
        let r = BarcodersRenderer;
        assert_eq!(
            r.modules(Symbology::UpcA, "03600029145").unwrap(),
            r.modules(Symbology::Ean13, "003600029145").unwrap()
        );
    }

    #[test]
    fn test_code39_stars_optional() {
        let r = BarcodersRenderer;
        assert_eq!(
            r.modules(Symbology::Code39, "*ABC*").unwrap(),
            r.modules(Symbology::Code39, "ABC").unwrap()
        );
    }

    #[test]
    fn test_modules_start_with_bar() {
        let r = BarcodersRenderer;
        for (symbology, payload) in [
            (Symbology::Ean8, "9638507"),
            (Symbology::Itf, "1234"),
            (Symbology::Nw7, "a1234b"),
            (Symbology::Code128, "{Bhello"),
        ] {
            let modules = r.modules(symbology, payload).unwrap();
            assert_eq!(modules.first(), Some(&true), "{symbology}");
        }
    }

    #[test]
    fn test_unsupported_symbologies() {
        let r = BarcodersRenderer;
        assert!(!r.supports(Symbology::Gs1_128));
        assert!(!r.supports(Symbology::UpcE));
        assert!(matches!(
            r.modules(Symbology::Gs1DataBarLimited, "0123456789012"),
            Err(EscposError::BarcodeType(_))
        ));
    }
}

//! # Barcodes
//!
//! Validates 1D barcode requests and decides how to print them: with the
//! printer's own `GS k` command when the profile supports the symbology
//! under the requested function type, otherwise by drawing the bars in
//! software and sending them as an image.
//!
//! ## Validation Order
//!
//! 1. Symbology name must be known ([`EscposError::BarcodeType`])
//! 2. Height 1-255, module width 2-6 ([`EscposError::BarcodeSize`])
//! 3. Payload length, character set and check digit ([`EscposError::BarcodeCode`])
//!
//! Nothing is emitted unless all three pass.
//!
//! ## Symbology Table
//!
//! | Symbology | Type A `m` | Type B `m` | Software |
//! |-----------|-----------|-----------|----------|
//! | UPC-A | 0 | 65 | yes |
//! | UPC-E | 1 | 66 | no |
//! | EAN13 | 2 | 67 | yes |
//! | EAN8 | 3 | 68 | yes |
//! | CODE39 | 4 | 69 | yes |
//! | ITF | 5 | 70 | yes |
//! | NW7 / CODABAR | 6 | 71 | yes |
//! | CODE93 | - | 72 | yes |
//! | CODE128 | - | 73 | yes |
//! | GS1-128 | - | 74 | no |
//! | GS1 DataBar Omnidirectional | - | 75 | no |
//! | GS1 DataBar Truncated | - | 76 | no |
//! | GS1 DataBar Limited | - | 77 | no |
//! | GS1 DataBar Expanded | - | 78 | no |

mod software;

pub use software::{BarcodersRenderer, SymbolRenderer};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::Command;
use crate::error::{EscposError, Result};
use crate::profile::CapabilityProfile;
use crate::protocol::barcode::barcode1d;
use crate::protocol::text::{self, Alignment};
use crate::raster::{self, ImageImpl, ImageOptions, RasterImage, WidePolicy};

// ============================================================================
// SYMBOLOGIES
// ============================================================================

/// A 1D barcode symbology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbology {
    UpcA,
    UpcE,
    Ean13,
    Ean8,
    Code39,
    Itf,
    /// Also known as Codabar
    Nw7,
    Code93,
    Code128,
    Gs1_128,
    Gs1DataBarOmnidirectional,
    Gs1DataBarTruncated,
    Gs1DataBarLimited,
    Gs1DataBarExpanded,
}

impl Symbology {
    pub const ALL: [Symbology; 14] = [
        Symbology::UpcA,
        Symbology::UpcE,
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::Code39,
        Symbology::Itf,
        Symbology::Nw7,
        Symbology::Code93,
        Symbology::Code128,
        Symbology::Gs1_128,
        Symbology::Gs1DataBarOmnidirectional,
        Symbology::Gs1DataBarTruncated,
        Symbology::Gs1DataBarLimited,
        Symbology::Gs1DataBarExpanded,
    ];

    /// Static format description for this symbology.
    pub fn spec(self) -> &'static BarcodeSpec {
        &SPECS[self as usize]
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().name)
    }
}

impl FromStr for Symbology {
    type Err = EscposError;

    /// Lenient parse: case, spaces and punctuation are ignored, so
    /// `"ean-13"`, `"Ean_13"` and `"EAN13"` are all the same.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let symbology = match key.as_str() {
            "UPCA" | "UPC" => Self::UpcA,
            "UPCE" => Self::UpcE,
            "EAN13" | "JAN13" | "EAN" => Self::Ean13,
            "EAN8" | "JAN8" => Self::Ean8,
            "CODE39" => Self::Code39,
            "ITF" | "INTERLEAVED2OF5" => Self::Itf,
            "NW7" | "CODABAR" => Self::Nw7,
            "CODE93" => Self::Code93,
            "CODE128" => Self::Code128,
            "GS1128" | "EAN128" => Self::Gs1_128,
            "GS1DATABAROMNIDIRECTIONAL" => Self::Gs1DataBarOmnidirectional,
            "GS1DATABARTRUNCATED" => Self::Gs1DataBarTruncated,
            "GS1DATABARLIMITED" => Self::Gs1DataBarLimited,
            "GS1DATABAREXPANDED" => Self::Gs1DataBarExpanded,
            _ => {
                return Err(EscposError::BarcodeType(format!(
                    "not supported or wrong barcode name {s}"
                )));
            }
        };
        Ok(symbology)
    }
}

/// Which `GS k` framing to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionType {
    /// `GS k m d1...dn NUL`
    A,
    /// `GS k m n d1...dn`
    B,
}

impl FunctionType {
    /// Profile feature flag that enables this framing.
    pub fn feature(self) -> &'static str {
        match self {
            Self::A => "barcodeA",
            Self::B => "barcodeB",
        }
    }
}

/// Where the human-readable interpretation is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HriPosition {
    Off = 0,
    Above = 1,
    #[default]
    Below = 2,
    Both = 3,
}

/// Font of the human-readable interpretation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HriFont {
    #[default]
    A = 0,
    B = 1,
}

/// Format rules for one symbology.
#[derive(Debug)]
pub struct BarcodeSpec {
    pub symbology: Symbology,
    pub name: &'static str,
    /// `m` for function type A, if the symbology has one
    pub function_a: Option<u8>,
    /// `m` for function type B
    pub function_b: u8,
    /// Accepted payload lengths, inclusive
    pub lengths: &'static [(usize, usize)],
    pattern: &'static str,
}

impl BarcodeSpec {
    /// `m` value for a function type.
    pub fn m(&self, function_type: FunctionType) -> Option<u8> {
        match function_type {
            FunctionType::A => self.function_a,
            FunctionType::B => Some(self.function_b),
        }
    }

    /// Check a payload against length, character set and check digit.
    pub fn validate(&self, payload: &str) -> Result<()> {
        let len = payload.len();
        let length_ok = self.lengths.iter().any(|&(lo, hi)| (lo..=hi).contains(&len));
        if !length_ok || !PATTERNS[self.symbology as usize].is_match(payload) {
            return Err(EscposError::BarcodeCode(format!(
                "'{}' is not a valid {} payload",
                payload, self.name
            )));
        }

        if let Some(expected) = self.expected_check_digit(payload) {
            let actual = payload.as_bytes()[len - 1] - b'0';
            if actual != expected {
                return Err(EscposError::BarcodeCode(format!(
                    "{} check digit of '{}' should be {}",
                    self.name, payload, expected
                )));
            }
        }
        Ok(())
    }

    /// Check digit the payload should end with, when it carries one.
    ///
    /// An 8-digit UPC-E is checked through its UPC-A expansion.
    fn expected_check_digit(&self, payload: &str) -> Option<u8> {
        if self.symbology == Symbology::UpcE && payload.len() == 8 {
            return Some(gtin_check_digit(&upc_e_to_a(&payload[..7])));
        }
        let full_length = match self.symbology {
            Symbology::Ean13 => 13,
            Symbology::Ean8 => 8,
            Symbology::UpcA | Symbology::UpcE => 12,
            _ => return None,
        };
        (payload.len() == full_length).then(|| gtin_check_digit(&payload[..full_length - 1]))
    }
}

/// Expand a zero-suppressed UPC-E body (number system plus six digits) to
/// the eleven UPC-A digits its check digit is computed over.
///
/// ```
/// use escpos_forge::barcode::upc_e_to_a;
///
/// assert_eq!(upc_e_to_a("0425261"), "04210000526");
/// assert_eq!(upc_e_to_a("0123456"), "01234500006");
/// ```
pub fn upc_e_to_a(body: &str) -> String {
    let (system, d) = body.split_at(1);
    let (d, last) = (&d[..5], &d[5..6]);
    match last {
        "0" | "1" | "2" => format!("{system}{}{last}0000{}", &d[..2], &d[2..5]),
        "3" => format!("{system}{}00000{}", &d[..3], &d[3..5]),
        "4" => format!("{system}{}00000{}", &d[..4], &d[4..5]),
        _ => format!("{system}{d}0000{last}"),
    }
}

/// GS1 mod-10 check digit over ASCII digits.
///
/// ```
/// use escpos_forge::barcode::gtin_check_digit;
///
/// assert_eq!(gtin_check_digit("400638133393"), 1);
/// assert_eq!(gtin_check_digit("9638507"), 4);
/// ```
pub fn gtin_check_digit(digits: &str) -> u8 {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = (b - b'0') as u32;
            if i % 2 == 0 { d * 3 } else { d }
        })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

const CODE39: &str = r"^([0-9A-Z $%+\-./]+|\*[0-9A-Z $%+\-./]+\*)$";
const NW7: &str = r"^[A-Da-d][0-9$+\-./:]+[A-Da-d]$";
const CODE128: &str = r"^\{[A-C][\x00-\x7F]+$";
const DATABAR: &str = r"^[0-9]{13}$";

static SPECS: [BarcodeSpec; 14] = [
    spec(Symbology::UpcA, "UPC-A", Some(0), 65, &[(11, 12)], r"^[0-9]{11,12}$"),
    spec(Symbology::UpcE, "UPC-E", Some(1), 66, &[(7, 8), (11, 12)], r"^([0-9]{7,8}|[0-9]{11,12})$"),
    spec(Symbology::Ean13, "EAN13", Some(2), 67, &[(12, 13)], r"^[0-9]{12,13}$"),
    spec(Symbology::Ean8, "EAN8", Some(3), 68, &[(7, 8)], r"^[0-9]{7,8}$"),
    spec(Symbology::Code39, "CODE39", Some(4), 69, &[(1, 255)], CODE39),
    spec(Symbology::Itf, "ITF", Some(5), 70, &[(2, 255)], r"^([0-9]{2})+$"),
    spec(Symbology::Nw7, "NW7", Some(6), 71, &[(1, 255)], NW7),
    spec(Symbology::Code93, "CODE93", None, 72, &[(1, 255)], r"^[\x00-\x7F]+$"),
    spec(Symbology::Code128, "CODE128", None, 73, &[(2, 255)], CODE128),
    spec(Symbology::Gs1_128, "GS1-128", None, 74, &[(2, 255)], CODE128),
    spec(Symbology::Gs1DataBarOmnidirectional, "GS1 DATABAR OMNIDIRECTIONAL", None, 75, &[(13, 13)], DATABAR),
    spec(Symbology::Gs1DataBarTruncated, "GS1 DATABAR TRUNCATED", None, 76, &[(13, 13)], DATABAR),
    spec(Symbology::Gs1DataBarLimited, "GS1 DATABAR LIMITED", None, 77, &[(13, 13)], r"^[01][0-9]{12}$"),
    spec(
        Symbology::Gs1DataBarExpanded,
        "GS1 DATABAR EXPANDED",
        None,
        78,
        &[(2, 255)],
        r#"^\([0-9][A-Za-z0-9 !"%&'()*+,\-./:;<=>?_{]+$"#,
    ),
];

const fn spec(
    symbology: Symbology,
    name: &'static str,
    function_a: Option<u8>,
    function_b: u8,
    lengths: &'static [(usize, usize)],
    pattern: &'static str,
) -> BarcodeSpec {
    BarcodeSpec {
        symbology,
        name,
        function_a,
        function_b,
        lengths,
        pattern,
    }
}

static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    SPECS
        .iter()
        .map(|s| Regex::new(s.pattern).expect("barcode pattern is a valid regex"))
        .collect()
});

// ============================================================================
// REQUEST
// ============================================================================

/// Valid barcode height range in dots.
pub const HEIGHT_RANGE: std::ops::RangeInclusive<u32> = 1..=255;

/// Valid module width range in dots.
pub const WIDTH_RANGE: std::ops::RangeInclusive<u32> = 2..=6;

/// One barcode to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeRequest {
    /// Symbology name, parsed leniently
    pub symbology: String,
    pub payload: String,
    /// Bar height in dots
    pub height: u32,
    /// Narrow module width in dots
    pub width: u32,
    pub position: HriPosition,
    pub font: HriFont,
    /// `None` picks A when possible, else B
    pub function_type: Option<FunctionType>,
    /// Center the barcode (`ESC a 1` on hardware, image centering in software)
    pub align_center: bool,
    /// Skip the hardware path even when the printer could do it
    pub force_software: bool,
    /// Image command for the software path; `None` picks from the profile
    pub implementation: Option<ImageImpl>,
}

impl BarcodeRequest {
    /// A request with the usual defaults: 64 dots high, module width 3,
    /// HRI below in font A, centered.
    pub fn new(symbology: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            symbology: symbology.into(),
            payload: payload.into(),
            height: 64,
            width: 3,
            position: HriPosition::default(),
            font: HriFont::default(),
            function_type: None,
            align_center: true,
            force_software: false,
            implementation: None,
        }
    }

    /// Set the function type.
    pub fn function_type(mut self, function_type: FunctionType) -> Self {
        self.function_type = Some(function_type);
        self
    }

    /// Draw in software with a specific image command.
    pub fn software(mut self, implementation: ImageImpl) -> Self {
        self.force_software = true;
        self.implementation = Some(implementation);
        self
    }

    /// Set height and module width.
    pub fn size(mut self, height: u32, width: u32) -> Self {
        self.height = height;
        self.width = width;
        self
    }
}

// ============================================================================
// SELECTOR
// ============================================================================

/// Routes barcode requests to the hardware or software path for one profile.
#[derive(Debug, Clone)]
pub struct BarcodeSelector<R = BarcodersRenderer> {
    profile: Arc<CapabilityProfile>,
    renderer: R,
}

impl BarcodeSelector {
    pub fn new(profile: Arc<CapabilityProfile>) -> Self {
        Self::with_renderer(profile, BarcodersRenderer)
    }
}

impl<R: SymbolRenderer> BarcodeSelector<R> {
    /// Use a custom software renderer.
    pub fn with_renderer(profile: Arc<CapabilityProfile>, renderer: R) -> Self {
        Self { profile, renderer }
    }

    /// Validate `request` and produce its commands.
    ///
    /// The hardware path yields the setup commands (`ESC a`, `GS h`, `GS w`,
    /// `GS f`, `GS H`) followed by the `GS k` symbol command. The software
    /// path yields image commands; HRI position and font do not apply to it.
    ///
    /// ```
    /// use escpos_forge::barcode::{BarcodeRequest, BarcodeSelector, FunctionType};
    /// use escpos_forge::profile::CapabilityDatabase;
    ///
    /// let db = CapabilityDatabase::builtin().unwrap();
    /// let selector = BarcodeSelector::new(db.resolve("default").unwrap());
    ///
    /// let request = BarcodeRequest::new("CODE128", "{B012ABCDabcd").function_type(FunctionType::B);
    /// let commands = selector.render(&request).unwrap();
    /// assert_eq!(&commands.last().unwrap()[..4], &[0x1D, 0x6B, 73, 13]);
    /// ```
    pub fn render(&self, request: &BarcodeRequest) -> Result<Vec<Command>> {
        let symbology: Symbology = request.symbology.parse()?;
        let spec = symbology.spec();

        if !HEIGHT_RANGE.contains(&request.height) {
            return Err(EscposError::BarcodeSize(format!("height = {}", request.height)));
        }
        if !WIDTH_RANGE.contains(&request.width) {
            return Err(EscposError::BarcodeSize(format!("width = {}", request.width)));
        }
        spec.validate(&request.payload)?;

        let hardware = if request.force_software {
            None
        } else {
            self.hardware_function(spec, request.function_type)
        };

        match hardware {
            Some(function_type) => {
                tracing::debug!(%symbology, ?function_type, "hardware barcode");
                Ok(hardware_commands(spec, function_type, request))
            }
            None => self.software(symbology, request),
        }
    }

    fn hardware_function(
        &self,
        spec: &BarcodeSpec,
        requested: Option<FunctionType>,
    ) -> Option<FunctionType> {
        let candidates: &[FunctionType] = match requested {
            Some(FunctionType::A) => &[FunctionType::A],
            Some(FunctionType::B) => &[FunctionType::B],
            None => &[FunctionType::A, FunctionType::B],
        };
        candidates
            .iter()
            .copied()
            .find(|&ft| spec.m(ft).is_some() && self.profile.supports(ft.feature()))
    }

    fn software(&self, symbology: Symbology, request: &BarcodeRequest) -> Result<Vec<Command>> {
        // Column and graphics commands before raster for drawn symbols
        let implementation = match request.implementation {
            Some(chosen) if self.profile.supports(chosen.feature()) => Some(chosen),
            Some(chosen) => {
                return Err(EscposError::NotSupported(format!(
                    "{} on profile {}",
                    chosen.feature(),
                    self.profile.id()
                )));
            }
            None => [ImageImpl::Graphics, ImageImpl::BitImageColumn, ImageImpl::BitImageRaster]
                .into_iter()
                .find(|i| self.profile.supports(i.feature())),
        };

        let implementation = match implementation {
            Some(i) if self.renderer.supports(symbology) => i,
            _ => {
                return Err(EscposError::BarcodeType(format!(
                    "profile {} can print {} neither in hardware nor in software",
                    self.profile.id(),
                    symbology
                )));
            }
        };
        tracing::debug!(%symbology, implementation = implementation.feature(), "software barcode");

        let modules = self.renderer.modules(symbology, &request.payload)?;
        let scale = request.width as usize;
        let image = RasterImage::from_fn(modules.len() * scale, request.height as usize, |x, _| {
            modules[x / scale]
        });

        // Strips of a symbol stacked under each other do not scan
        let options = ImageOptions {
            implementation: Some(implementation),
            center: request.align_center,
            wide_policy: WidePolicy::Reject,
            ..ImageOptions::default()
        };
        raster::encode(&image, &self.profile, &options)
    }
}

fn hardware_commands(spec: &BarcodeSpec, function_type: FunctionType, request: &BarcodeRequest) -> Vec<Command> {
    let mut out = Vec::with_capacity(6);
    if request.align_center {
        out.push(text::align(Alignment::Center));
    }
    // Ranges were checked by the caller
    out.push(barcode1d::height(request.height as u8));
    out.push(barcode1d::width(request.width as u8));
    out.push(barcode1d::hri_font(request.font as u8));
    out.push(barcode1d::hri_position(request.position as u8));

    let data = request.payload.as_bytes();
    out.push(match (function_type, spec.m(function_type)) {
        (FunctionType::A, Some(m)) => barcode1d::function_a(m, data),
        _ => barcode1d::function_b(spec.function_b, data),
    });
    out
}

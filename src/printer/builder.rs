//! # Command Builder
//!
//! Accumulates the commands for one printer session. Every method either
//! appends its complete output or, on error, appends nothing.

use std::str::FromStr;
use std::sync::Arc;

use crate::Command;
use crate::barcode::{BarcodeRequest, BarcodeSelector};
use crate::error::{EscposError, Result};
use crate::magic::{EncodingState, MagicEncodeConfig, MagicEncoder};
use crate::profile::CapabilityProfile;
use crate::protocol::commands::{self, LineSpacingUnit, Peripheral};
use crate::protocol::text::{self, Alignment, Underline};
use crate::qr::{self, QrOptions};
use crate::raster::{self, ImageOptions, RasterImage};

use super::columns::{self, ColumnAlign};
use super::style::{CharacterSize, TextStyle};

/// Lines fed before cutting so the last printed line clears the blade.
const CUT_FEED_LINES: u8 = 6;

/// Cash drawer pulse on/off time, in 2ms units.
const DRAWER_PULSE: u8 = 50;

/// Cut type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CutMode {
    #[default]
    Full,
    Partial,
}

impl CutMode {
    fn feature(self) -> &'static str {
        match self {
            Self::Full => "paperFullCut",
            Self::Partial => "paperPartCut",
        }
    }

    fn other(self) -> Self {
        match self {
            Self::Full => Self::Partial,
            Self::Partial => Self::Full,
        }
    }

    fn command(self) -> Command {
        match self {
            Self::Full => commands::cut_full(),
            Self::Partial => commands::cut_partial(),
        }
    }
}

impl FromStr for CutMode {
    type Err = EscposError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "FULL" => Ok(Self::Full),
            "PART" | "PARTIAL" => Ok(Self::Partial),
            _ => Err(EscposError::InvalidParameter(format!("cut mode {s}"))),
        }
    }
}

/// Single-byte control codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    LineFeed,
    FormFeed,
    CarriageReturn,
    HorizontalTab,
    VerticalTab,
}

impl Control {
    fn byte(self) -> u8 {
        match self {
            Self::LineFeed => commands::LF,
            Self::FormFeed => commands::FF,
            Self::CarriageReturn => commands::CR,
            Self::HorizontalTab => commands::HT,
            Self::VerticalTab => commands::VT,
        }
    }
}

impl FromStr for Control {
    type Err = EscposError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "LF" => Ok(Self::LineFeed),
            "FF" => Ok(Self::FormFeed),
            "CR" => Ok(Self::CarriageReturn),
            "HT" => Ok(Self::HorizontalTab),
            "VT" => Ok(Self::VerticalTab),
            _ => Err(EscposError::InvalidParameter(format!("control code {s}"))),
        }
    }
}

/// Hardware-level operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareOp {
    /// `ESC @`
    Init,
    /// `ESC = 1`
    Select,
    /// `ESC ? LF NUL`
    Reset,
}

impl FromStr for HardwareOp {
    type Err = EscposError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INIT" => Ok(Self::Init),
            "SELECT" => Ok(Self::Select),
            "RESET" => Ok(Self::Reset),
            _ => Err(EscposError::InvalidParameter(format!("hardware operation {s}"))),
        }
    }
}

/// Most tab stops `ESC D` accepts.
const MAX_TAB_STOPS: u32 = 32;

/// Builds the byte stream for one printer session.
///
/// Owns the session's [`EncodingState`], so text written through one builder
/// never disturbs another builder's codepage tracking.
///
/// ```
/// use escpos_forge::printer::{CommandBuilder, CutMode};
/// use escpos_forge::profile::CapabilityDatabase;
///
/// let db = CapabilityDatabase::builtin()?;
/// let mut printer = CommandBuilder::new(db.resolve("TM-T88V")?);
/// printer.init().textln("Grüße")?.cut(CutMode::Full, true)?;
///
/// let bytes = printer.into_bytes();
/// assert_eq!(&bytes[..2], b"\x1b@");
/// # Ok::<(), escpos_forge::EscposError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    profile: Arc<CapabilityProfile>,
    encoder: MagicEncoder,
    state: EncodingState,
    commands: Vec<Command>,
}

impl CommandBuilder {
    pub fn new(profile: Arc<CapabilityProfile>) -> Self {
        Self::with_config(profile, MagicEncodeConfig::default())
    }

    pub fn with_config(profile: Arc<CapabilityProfile>, config: MagicEncodeConfig) -> Self {
        Self {
            encoder: MagicEncoder::new(Arc::clone(&profile), config),
            profile,
            state: EncodingState::default(),
            commands: Vec::new(),
        }
    }

    pub fn profile(&self) -> &CapabilityProfile {
        &self.profile
    }

    /// Codepage tracking for this session.
    pub fn state(&self) -> &EncodingState {
        &self.state
    }

    // ===== Printer control =====

    /// `ESC @`. The printer falls back to its default table, so the next
    /// text re-selects a codepage.
    pub fn init(&mut self) -> &mut Self {
        self.state.reset();
        self.push(commands::init())
    }

    /// Append raw bytes unchanged.
    pub fn raw(&mut self, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.push(bytes.into())
    }

    /// `ESC d n`
    pub fn print_and_feed(&mut self, lines: u8) -> &mut Self {
        self.push(commands::print_and_feed(lines))
    }

    /// Init, select or reset the printer hardware.
    pub fn hw(&mut self, op: HardwareOp) -> &mut Self {
        match op {
            HardwareOp::Init => self.init(),
            HardwareOp::Select => self.push(commands::select_peripheral(Peripheral::Printer)),
            HardwareOp::Reset => {
                self.state.reset();
                self.push(commands::reset_hardware())
            }
        }
    }

    /// Send a single control code.
    pub fn control(&mut self, ctl: Control) -> &mut Self {
        self.push(vec![ctl.byte()])
    }

    /// Set `count` tab stops every `tab_size` columns.
    ///
    /// The last stop must stay below column 256. A count of zero clears all
    /// stops.
    pub fn tab_stops(&mut self, count: u32, tab_size: u32) -> Result<&mut Self> {
        if count > MAX_TAB_STOPS || !(1..=255).contains(&tab_size) || count * tab_size >= 256 {
            return Err(EscposError::TabPosition(format!(
                "{count} stops of {tab_size} columns"
            )));
        }
        let positions: Vec<u8> = (1..=count).map(|i| (i * tab_size) as u8).collect();
        Ok(self.push(commands::set_tab_stops(&positions)))
    }

    /// Enable or disable the printer's front panel buttons.
    pub fn panel_buttons(&mut self, enabled: bool) -> &mut Self {
        self.push(commands::panel_buttons(enabled))
    }

    /// Route what follows to a daisy-chained line display, or back to the
    /// printer.
    pub fn linedisplay_select(&mut self, display: bool) -> &mut Self {
        let device = if display { Peripheral::LineDisplay } else { Peripheral::Printer };
        self.push(commands::select_peripheral(device))
    }

    /// Clear the selected line display.
    pub fn linedisplay_clear(&mut self) -> &mut Self {
        self.push(commands::init())
    }

    /// Show `txt` on the line display and select the printer again.
    ///
    /// The display starts from its own default codepage, so the printer's
    /// codepage tracking is left alone.
    pub fn linedisplay(&mut self, txt: &str) -> Result<&mut Self> {
        let mut display_state = EncodingState::default();
        let bytes = self.encoder.encode_bytes(&mut display_state, txt)?;

        self.linedisplay_select(true).linedisplay_clear();
        if !bytes.is_empty() {
            self.push(bytes);
        }
        Ok(self.linedisplay_select(false))
    }

    /// Cut the paper.
    ///
    /// With `feed`, prints and feeds six lines first, then cuts with the
    /// requested mode, or the other one if the printer lacks it. Without
    /// `feed`, sends `GS V 66 0` whatever the profile says.
    pub fn cut(&mut self, mode: CutMode, feed: bool) -> Result<&mut Self> {
        if !feed {
            return Ok(self.push(commands::cut_no_feed()));
        }

        let profile = self.profile();
        let cut = [mode, mode.other()]
            .into_iter()
            .find(|m| profile.supports(m.feature()))
            .ok_or_else(|| {
                EscposError::NotSupported(format!("profile {} has no cutter", profile.id()))
            })?;
        if cut != mode {
            tracing::debug!(requested = ?mode, used = ?cut, "cut mode not supported, using the other");
        }

        self.push(commands::print_and_feed(CUT_FEED_LINES));
        Ok(self.push(cut.command()))
    }

    /// Line spacing in 1/`divisor` inch (60, 180 or 360), or the printer
    /// default with `None`.
    pub fn line_spacing(&mut self, spacing: Option<u8>, divisor: u16) -> Result<&mut Self> {
        let Some(spacing) = spacing else {
            return Ok(self.push(commands::line_spacing_reset()));
        };
        let unit = LineSpacingUnit::from_divisor(divisor).ok_or_else(|| {
            EscposError::InvalidParameter(format!("divisor must be 60, 180 or 360, got {divisor}"))
        })?;
        if spacing > unit.max_spacing() {
            return Err(EscposError::InvalidParameter(format!(
                "spacing {} exceeds {} for divisor {}",
                spacing,
                unit.max_spacing(),
                divisor
            )));
        }
        Ok(self.push(commands::line_spacing(unit, spacing)))
    }

    /// Kick the cash drawer on connector pin 2 or 5.
    pub fn cashdraw(&mut self, pin: u8) -> Result<&mut Self> {
        let m = match pin {
            2 => 0,
            5 => 1,
            _ => {
                return Err(EscposError::InvalidParameter(format!(
                    "cash drawer pin must be 2 or 5, got {pin}"
                )));
            }
        };
        Ok(self.push(commands::drawer_pulse(m, DRAWER_PULSE, DRAWER_PULSE)))
    }

    /// Beep `times` times for `duration` units, both 1-9.
    pub fn buzzer(&mut self, times: u8, duration: u8) -> Result<&mut Self> {
        for (name, value) in [("times", times), ("duration", duration)] {
            if !(1..=9).contains(&value) {
                return Err(EscposError::InvalidParameter(format!(
                    "buzzer {name} must be between 1 and 9, got {value}"
                )));
            }
        }
        Ok(self.push(commands::buzzer(times, duration)))
    }

    // ===== Text =====

    /// Write text, switching codepages as needed.
    pub fn text(&mut self, txt: &str) -> Result<&mut Self> {
        let bytes = self.encoder.encode_bytes(&mut self.state, txt)?;
        if !bytes.is_empty() {
            self.push(bytes);
        }
        Ok(self)
    }

    /// Write text followed by a newline.
    pub fn textln(&mut self, txt: &str) -> Result<&mut Self> {
        self.text(&format!("{txt}\n"))
    }

    /// Write `count` newlines.
    pub fn ln(&mut self, count: usize) -> Result<&mut Self> {
        if count == 0 {
            return Ok(self);
        }
        self.text(&"\n".repeat(count))
    }

    /// Pin the codepage by name or index, or hand it back to automatic
    /// selection with `"AUTO"`.
    pub fn charcode(&mut self, code: &str) -> Result<&mut Self> {
        if code.eq_ignore_ascii_case("AUTO") {
            self.encoder.set_auto(&mut self.state);
            return Ok(self);
        }
        let command = self.encoder.force(&mut self.state, code)?;
        Ok(self.push(command))
    }

    pub fn align(&mut self, alignment: Alignment) -> &mut Self {
        self.push(text::align(alignment))
    }

    pub fn bold(&mut self, enabled: bool) -> &mut Self {
        self.push(text::bold(enabled))
    }

    pub fn underline(&mut self, mode: Underline) -> &mut Self {
        self.push(text::underline(mode))
    }

    /// Select a font by profile name, `"a"`/`"b"`, or index.
    pub fn font(&mut self, font: &str) -> Result<&mut Self> {
        let n = self.profile().font(font)?;
        Ok(self.push(text::font(n)))
    }

    /// Apply the fields of `style` that are set.
    ///
    /// Sent in this order: size, flip, smooth, bold, underline, font,
    /// alignment, density, invert. Nothing is sent if any field is invalid.
    pub fn set(&mut self, style: &TextStyle) -> Result<&mut Self> {
        let mut out = Vec::new();

        match style.size {
            Some(CharacterSize::Custom { width, height }) => {
                for (name, value) in [("width", width), ("height", height)] {
                    if !text::SIZE_MULTIPLIERS.contains(&value) {
                        return Err(EscposError::InvalidParameter(format!(
                            "text {name} must be between 1 and 8, got {value}"
                        )));
                    }
                }
                out.push(text::character_size(width, height));
            }
            Some(CharacterSize::Preset(size)) => out.push(text::print_mode(size)),
            None => {}
        }
        if let Some(flip) = style.flip {
            out.push(text::flip(flip));
        }
        if let Some(smooth) = style.smooth {
            out.push(text::smooth(smooth));
        }
        if let Some(bold) = style.bold {
            out.push(text::bold(bold));
        }
        if let Some(mode) = style.underline {
            out.push(text::underline(mode));
        }
        if let Some(font) = &style.font {
            out.push(text::font(self.profile().font(font)?));
        }
        if let Some(alignment) = style.align {
            out.push(text::align(alignment));
        }
        if let Some(level) = style.density {
            if !text::DENSITY_LEVELS.contains(&level) {
                return Err(EscposError::InvalidParameter(format!(
                    "density must be between 0 and 8, got {level}"
                )));
            }
            out.push(text::density(level));
        }
        if let Some(invert) = style.invert {
            out.push(text::invert(invert));
        }

        Ok(self.extend(out))
    }

    /// Like [`CommandBuilder::set`], with unset fields taken from
    /// [`TextStyle::power_on`].
    pub fn set_with_default(&mut self, style: &TextStyle) -> Result<&mut Self> {
        self.set(&style.clone().or_power_on())
    }

    /// Word-wrap `txt` to the column count of `font`, or to `columns`.
    pub fn block_text(&mut self, txt: &str, font: &str, columns: Option<usize>) -> Result<&mut Self> {
        let width = match columns {
            Some(width) => width,
            None => self.profile().columns(font)? as usize,
        };
        if width == 0 {
            return Err(EscposError::InvalidParameter("block text width 0".into()));
        }
        self.text(&textwrap::fill(txt, width))
    }

    /// Print `texts` side by side, one column each.
    ///
    /// When `widths` or `align` has fewer entries than `texts`, its last
    /// entry repeats. Each printed row ends with a newline.
    pub fn software_columns(
        &mut self,
        texts: &[&str],
        widths: &[usize],
        align: &[ColumnAlign],
    ) -> Result<&mut Self> {
        if texts.is_empty() || widths.is_empty() || align.is_empty() {
            return Err(EscposError::InvalidParameter(
                "columns need at least one text, width and alignment".into(),
            ));
        }
        if widths.contains(&0) {
            return Err(EscposError::InvalidParameter("column width 0".into()));
        }
        let widths = columns::repeat_last(widths, texts.len());
        let align = columns::repeat_last(align, texts.len());

        let mut block = String::new();
        for row in columns::arrange(texts, &widths) {
            for ((cell, &width), &cell_align) in row.iter().zip(&widths).zip(&align) {
                block.push_str(&columns::pad(cell, width, cell_align));
            }
            block.push('\n');
        }
        self.text(&block)
    }

    // ===== Graphics =====

    pub fn image(&mut self, image: &RasterImage, options: &ImageOptions) -> Result<&mut Self> {
        let out = raster::encode(image, self.profile(), options)?;
        Ok(self.extend(out))
    }

    pub fn barcode(&mut self, request: &BarcodeRequest) -> Result<&mut Self> {
        let selector = BarcodeSelector::new(Arc::clone(&self.profile));
        let out = selector.render(request)?;
        Ok(self.extend(out))
    }

    pub fn qr(&mut self, content: &str, options: &QrOptions) -> Result<&mut Self> {
        let out = qr::render(self.profile(), content, options)?;
        Ok(self.extend(out))
    }

    // ===== Output =====

    /// Commands in emission order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop buffered commands, keeping codepage tracking.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    /// The whole stream, ready for a transport.
    pub fn into_bytes(self) -> Vec<u8> {
        self.commands.concat()
    }

    fn push(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    fn extend(&mut self, commands: Vec<Command>) -> &mut Self {
        self.commands.extend(commands);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::FunctionType;
    use crate::magic::ErrorPolicy;
    use crate::profile::CapabilityDatabase;
    use crate::protocol::text::TextSize;
    use pretty_assertions::assert_eq;

    fn builder(id: &str) -> CommandBuilder {
        let db = CapabilityDatabase::builtin().unwrap();
        CommandBuilder::new(db.resolve(id).unwrap())
    }

    fn custom(json: &str) -> CommandBuilder {
        let db = CapabilityDatabase::from_json_str(json).unwrap();
        CommandBuilder::new(db.resolve("p").unwrap())
    }

    #[test]
    fn test_cut_with_feed() {
        let mut b = builder("default");
        b.cut(CutMode::Full, true).unwrap();
        assert_eq!(b.into_bytes(), b"\x1bd\x06\x1dV\x00".to_vec());
    }

    #[test]
    fn test_cut_falls_back_to_other_mode() {
        let mut b = builder("TM-P80");
        b.cut(CutMode::Partial, true).unwrap();
        assert_eq!(b.commands().last(), Some(&vec![0x1D, 0x56, 0x00]));
    }

    #[test]
    fn test_cut_without_feed() {
        let mut b = custom(r#"{"p": {"features": {}}}"#);
        b.cut(CutMode::Partial, false).unwrap();
        assert_eq!(b.into_bytes(), vec![0x1D, 0x56, 66, 0]);
    }

    #[test]
    fn test_cut_needs_cutter() {
        let mut b = custom(r#"{"p": {"features": {"paperFullCut": false}}}"#);
        let err = b.cut(CutMode::Full, true).unwrap_err();
        assert!(matches!(err, EscposError::NotSupported(_)));
        assert!(b.is_empty());
    }

    #[test]
    fn test_cut_mode_names() {
        assert_eq!("part".parse::<CutMode>().unwrap(), CutMode::Partial);
        assert_eq!("FULL".parse::<CutMode>().unwrap(), CutMode::Full);
        assert!("half".parse::<CutMode>().is_err());
    }

    #[test]
    fn test_line_spacing() {
        let mut b = builder("default");
        b.line_spacing(None, 180).unwrap();
        b.line_spacing(Some(30), 180).unwrap();
        b.line_spacing(Some(85), 60).unwrap();
        assert_eq!(
            b.commands(),
            &[b"\x1b2".to_vec(), b"\x1b3\x1e".to_vec(), b"\x1bA\x55".to_vec()]
        );

        assert!(b.line_spacing(Some(86), 60).is_err());
        assert!(b.line_spacing(Some(1), 90).is_err());
        assert_eq!(b.commands().len(), 3);
    }

    #[test]
    fn test_cashdraw_pins() {
        let mut b = builder("default");
        b.cashdraw(2).unwrap().cashdraw(5).unwrap();
        assert_eq!(b.commands(), &[b"\x1bp\x00\x32\x32".to_vec(), b"\x1bp\x01\x32\x32".to_vec()]);
        assert!(matches!(b.cashdraw(3), Err(EscposError::InvalidParameter(_))));
    }

    #[test]
    fn test_buzzer_range() {
        let mut b = builder("default");
        b.buzzer(2, 4).unwrap();
        assert_eq!(b.commands(), &[vec![0x1B, 0x42, 2, 4]]);
        assert!(b.buzzer(0, 4).is_err());
        assert!(b.buzzer(2, 10).is_err());
    }

    #[test]
    fn test_text_switches_codepage_once() {
        let mut b = builder("default");
        b.text("abc").unwrap().text("déf").unwrap();
        // CP437 is the first page and covers both calls
        assert_eq!(b.into_bytes(), b"\x1bt\x00abcd\x82f".to_vec());
    }

    #[test]
    fn test_textln_and_ln() {
        let mut b = builder("default");
        b.textln("hi").unwrap().ln(2).unwrap().ln(0).unwrap();
        assert_eq!(b.into_bytes(), b"\x1bt\x00hi\n\n\n".to_vec());
    }

    #[test]
    fn test_failed_text_appends_nothing() {
        let mut b = builder("default");
        b.text("ok").unwrap();
        let before = b.commands().to_vec();
        let state = *b.state();

        assert!(matches!(b.text("ok ☃"), Err(EscposError::CodepageNotFound { .. })));
        assert_eq!(b.commands(), before.as_slice());
        assert_eq!(*b.state(), state);
    }

    #[test]
    fn test_substitution_policy() {
        let db = CapabilityDatabase::builtin().unwrap();
        let config = MagicEncodeConfig {
            error_policy: ErrorPolicy::Substitute('?'),
            ..MagicEncodeConfig::default()
        };
        let mut b = CommandBuilder::with_config(db.resolve("default").unwrap(), config);
        b.text("☃5").unwrap();
        assert_eq!(b.into_bytes(), b"\x1bt\x00?5".to_vec());
    }

    #[test]
    fn test_charcode_force_and_auto() {
        let mut b = builder("default");
        b.charcode("CP858").unwrap();
        assert_eq!(b.commands(), &[vec![0x1B, 0x74, 19]]);
        assert!(b.state().is_forced());

        b.charcode("auto").unwrap();
        assert!(!b.state().is_forced());
        assert_eq!(b.commands().len(), 1);

        assert!(matches!(b.charcode("KLINGON"), Err(EscposError::CharCode(_))));
    }

    #[test]
    fn test_init_resets_encoding() {
        let mut b = builder("default");
        b.text("a").unwrap().init().text("b").unwrap();
        assert_eq!(b.into_bytes(), b"\x1bt\x00a\x1b@\x1bt\x00b".to_vec());
    }

    #[test]
    fn test_font_from_profile() {
        let mut b = builder("default");
        b.font("b").unwrap();
        assert_eq!(b.commands(), &[vec![0x1B, 0x4D, 1]]);
        assert!(matches!(b.font("Z"), Err(EscposError::NotSupported(_))));
    }

    #[test]
    fn test_styles() {
        let mut b = builder("default");
        b.align(Alignment::Right).bold(true).underline(Underline::Double);
        assert_eq!(b.into_bytes(), b"\x1ba\x02\x1bE\x01\x1b-\x02".to_vec());
    }

    #[test]
    fn test_set_only_sends_given_fields() {
        let mut b = builder("default");
        let style = TextStyle {
            size: Some(CharacterSize::Preset(TextSize::DoubleWidth)),
            bold: Some(true),
            align: Some(Alignment::Center),
            invert: Some(true),
            ..TextStyle::default()
        };
        b.set(&style).unwrap();
        assert_eq!(
            b.commands(),
            &[
                b"\x1b!\x20".to_vec(),
                b"\x1bE\x01".to_vec(),
                b"\x1ba\x01".to_vec(),
                b"\x1dB\x01".to_vec(),
            ]
        );

        b.clear();
        b.set(&TextStyle::default()).unwrap();
        assert!(b.is_empty());
    }

    #[test]
    fn test_set_custom_size_and_density() {
        let mut b = builder("default");
        let style = TextStyle {
            size: Some(CharacterSize::Custom { width: 2, height: 3 }),
            density: Some(8),
            flip: Some(true),
            smooth: Some(true),
            ..TextStyle::default()
        };
        b.set(&style).unwrap();
        assert_eq!(b.into_bytes(), b"\x1d!\x12\x1b{\x01\x1db\x01\x1d|\x05".to_vec());
    }

    #[test]
    fn test_set_invalid_field_appends_nothing() {
        let mut b = builder("default");
        let cases = [
            TextStyle { size: Some(CharacterSize::Custom { width: 9, height: 1 }), ..TextStyle::default() },
            TextStyle { bold: Some(true), density: Some(9), ..TextStyle::default() },
        ];
        for style in cases {
            assert!(matches!(b.set(&style), Err(EscposError::InvalidParameter(_))));
        }
        let bad_font = TextStyle { bold: Some(true), font: Some("Z".into()), ..TextStyle::default() };
        assert!(matches!(b.set(&bad_font), Err(EscposError::NotSupported(_))));
        assert!(b.is_empty());
    }

    #[test]
    fn test_set_with_default_fills_power_on_values() {
        let mut b = builder("default");
        b.set_with_default(&TextStyle { bold: Some(true), ..TextStyle::default() }).unwrap();
        let expected = [
            &b"\x1b!\x00"[..],
            b"\x1b{\x00",
            b"\x1db\x00",
            b"\x1bE\x01",
            b"\x1b-\x00",
            b"\x1bM\x00",
            b"\x1ba\x00",
            b"\x1dB\x00",
        ]
        .concat();
        assert_eq!(b.into_bytes(), expected);
    }

    #[test]
    fn test_control_codes() {
        let mut b = builder("default");
        b.control(Control::FormFeed)
            .control("cr".parse().unwrap())
            .control(Control::HorizontalTab)
            .control(Control::VerticalTab)
            .control(Control::LineFeed);
        assert_eq!(b.into_bytes(), vec![0x0C, 0x0D, 0x09, 0x0B, 0x0A]);
        assert!("BS".parse::<Control>().is_err());
    }

    #[test]
    fn test_tab_stops() {
        let mut b = builder("default");
        b.tab_stops(4, 8).unwrap().tab_stops(0, 8).unwrap();
        assert_eq!(
            b.commands(),
            &[vec![0x1B, 0x44, 8, 16, 24, 32, 0x00], vec![0x1B, 0x44, 0x00]]
        );

        for (count, size) in [(33, 1), (2, 128), (1, 0), (1, 256)] {
            let err = b.tab_stops(count, size).unwrap_err();
            assert!(matches!(err, EscposError::TabPosition(_)), "{count}x{size}");
            assert_eq!(err.result_code(), 70);
        }
        assert!(b.tab_stops(1, 255).is_ok());
        assert_eq!(b.commands().len(), 3);
    }

    #[test]
    fn test_block_text_uses_font_columns() {
        let mut b = builder("default");
        b.block_text("All the presidents men were eating falafel for breakfast.", "a", None)
            .unwrap();
        assert_eq!(
            b.into_bytes(),
            b"\x1bt\x00All the presidents men were eating falafel\nfor breakfast.".to_vec()
        );

        let mut b = builder("default");
        b.block_text("aaa bbb ccc", "a", Some(7)).unwrap();
        assert_eq!(b.into_bytes(), b"\x1bt\x00aaa bbb\nccc".to_vec());

        let mut b = builder("simple");
        assert!(matches!(b.block_text("x", "b", None), Err(EscposError::NotSupported(_))));
        assert!(b.is_empty());
    }

    #[test]
    fn test_software_columns() {
        let mut b = builder("default");
        b.software_columns(&["Tea", "2.50"], &[10, 6], &[ColumnAlign::Left, ColumnAlign::Right])
            .unwrap();
        assert_eq!(b.into_bytes(), b"\x1bt\x00Tea         2.50\n".to_vec());

        let mut b = builder("default");
        b.software_columns(&["a", "b", "c dd"], &[3], &[ColumnAlign::Center]).unwrap();
        assert_eq!(b.into_bytes(), b"\x1bt\x00 a  b  c \n      dd \n".to_vec());
    }

    #[test]
    fn test_software_columns_rejects_empty_layout() {
        let mut b = builder("default");
        assert!(b.software_columns(&[], &[5], &[ColumnAlign::Left]).is_err());
        assert!(b.software_columns(&["x"], &[], &[ColumnAlign::Left]).is_err());
        assert!(b.software_columns(&["x"], &[5], &[]).is_err());
        assert!(b.software_columns(&["x"], &[0], &[ColumnAlign::Left]).is_err());
        assert!(b.is_empty());
    }

    #[test]
    fn test_hardware_and_panel() {
        let mut b = builder("default");
        b.hw(HardwareOp::Select)
            .hw("reset".parse().unwrap())
            .hw(HardwareOp::Init)
            .panel_buttons(false)
            .panel_buttons(true);
        assert_eq!(
            b.into_bytes(),
            b"\x1b=\x01\x1b?\n\x00\x1b@\x1bc5\x01\x1bc5\x00".to_vec()
        );
        assert!("reboot".parse::<HardwareOp>().is_err());
    }

    #[test]
    fn test_linedisplay_keeps_printer_codepage() {
        let mut b = builder("default");
        b.text("a").unwrap().linedisplay("Hi").unwrap().text("b").unwrap();

        let expected = [
            &b"\x1bt\x00a"[..],
            b"\x1b=\x02\x1b@",
            b"\x1bt\x00Hi",
            b"\x1b=\x01",
            b"b",
        ]
        .concat();
        assert_eq!(b.into_bytes(), expected);
    }

    #[test]
    fn test_failed_linedisplay_appends_nothing() {
        let mut b = builder("default");
        assert!(b.linedisplay("☃").is_err());
        assert!(b.is_empty());
    }

    #[test]
    fn test_barcode_and_failed_barcode() {
        let mut b = builder("default");
        let req = BarcodeRequest::new("CODE128", "{B012ABCDabcd").function_type(FunctionType::B);
        b.barcode(&req).unwrap();
        let count = b.commands().len();
        assert_eq!(&b.commands()[count - 1][..4], &[0x1D, 0x6B, 73, 13]);

        assert!(b.barcode(&BarcodeRequest::new("EAN13", "12")).is_err());
        assert_eq!(b.commands().len(), count);
    }

    #[test]
    fn test_image() {
        let mut b = builder("default");
        let image = RasterImage::from_fn(8, 1, |x, _| x == 0);
        b.image(&image, &ImageOptions::default()).unwrap();
        assert_eq!(b.into_bytes(), b"\x1dv0\x00\x01\x00\x01\x00\x80".to_vec());
    }

    #[test]
    fn test_qr_native() {
        let mut b = builder("default");
        b.qr("hi", &QrOptions::default()).unwrap();
        assert_eq!(b.commands().len(), 5);
    }
}

//! Text style changes applied as one batch.

use crate::protocol::text::{Alignment, TextSize, Underline};

/// Character size, either a print mode preset or free multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterSize {
    /// `ESC ! n`
    Preset(TextSize),
    /// `GS ! n`, each multiplier 1-8
    Custom { width: u8, height: u8 },
}

impl Default for CharacterSize {
    fn default() -> Self {
        Self::Preset(TextSize::Normal)
    }
}

/// A set of style changes. Fields left as `None` are not sent.
///
/// ```
/// use escpos_forge::printer::{CharacterSize, TextStyle};
/// use escpos_forge::protocol::text::{Alignment, TextSize};
///
/// let heading = TextStyle {
///     align: Some(Alignment::Center),
///     bold: Some(true),
///     size: Some(CharacterSize::Preset(TextSize::Quad)),
///     ..TextStyle::default()
/// };
/// assert!(heading.font.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub align: Option<Alignment>,
    /// Font name, `"a"`/`"b"` or index, checked against the profile
    pub font: Option<String>,
    pub bold: Option<bool>,
    pub underline: Option<Underline>,
    pub size: Option<CharacterSize>,
    /// Print density 0-8, lightest first
    pub density: Option<u8>,
    /// White on black
    pub invert: Option<bool>,
    /// Smoothing, visible from 4x4 sizes up
    pub smooth: Option<bool>,
    /// Upside-down printing
    pub flip: Option<bool>,
}

impl TextStyle {
    /// The printer's power-on look: left aligned, font A, no emphasis,
    /// normal size, no effects. Density is not part of it.
    pub fn power_on() -> Self {
        Self {
            align: Some(Alignment::Left),
            font: Some("a".to_string()),
            bold: Some(false),
            underline: Some(Underline::Off),
            size: Some(CharacterSize::default()),
            density: None,
            invert: Some(false),
            smooth: Some(false),
            flip: Some(false),
        }
    }

    /// Fill every unset field from [`TextStyle::power_on`].
    pub fn or_power_on(self) -> Self {
        let base = Self::power_on();
        Self {
            align: self.align.or(base.align),
            font: self.font.or(base.font),
            bold: self.bold.or(base.bold),
            underline: self.underline.or(base.underline),
            size: self.size.or(base.size),
            density: self.density,
            invert: self.invert.or(base.invert),
            smooth: self.smooth.or(base.smooth),
            flip: self.flip.or(base.flip),
        }
    }
}

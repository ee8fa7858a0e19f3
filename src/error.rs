//! # Error Types
//!
//! This module defines error types used throughout the escpos-forge library.
//!
//! Every failure here is a deterministic function of the input and the
//! resolved profile, so nothing is retried internally. Encode operations are
//! all-or-nothing: when one of these errors is returned, no bytes were
//! produced for that call.

use thiserror::Error;

/// Main error type for escpos-forge operations
#[derive(Debug, Error)]
pub enum EscposError {
    /// A profile identifier (or an `inherits` target) is not in the database
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// The `inherits` chain loops back onto itself
    #[error("Profile inheritance cycle: {}", .0.join(" -> "))]
    ProfileCycle(Vec<String>),

    /// Text contains a character none of the available codepages can encode
    #[error("No codepage can encode {}", describe_char(.ch))]
    CodepageNotFound { ch: char },

    /// Unknown encoding name, or an encoding the profile does not offer
    #[error("Invalid char code: {0}")]
    CharCode(String),

    /// Unknown barcode symbol, or no way to print it on this profile
    #[error("Barcode type error: {0}")]
    BarcodeType(String),

    /// Barcode module width or height out of range
    #[error("Barcode size is out of range: {0}")]
    BarcodeSize(String),

    /// Barcode payload does not fit the symbol's format
    #[error("Barcode code error: {0}")]
    BarcodeCode(String),

    /// Image cannot be made to fit the printable width
    #[error("Image width error: {0}")]
    ImageWidth(String),

    /// Tab stop count or size out of range
    #[error("Tab position error: {0}")]
    TabPosition(String),

    /// Feature not available in the resolved profile
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Scalar parameter out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Capability database could not be parsed
    #[error("Capability database error: {0}")]
    Database(#[from] serde_json::Error),
}

impl EscposError {
    /// Stable numeric code for each failure class.
    ///
    /// | Code | Error |
    /// |------|-------|
    /// | 10 | `BarcodeType` |
    /// | 20 | `BarcodeSize` |
    /// | 30 | `BarcodeCode` |
    /// | 41 | `ImageWidth` |
    /// | 70 | `TabPosition` |
    /// | 80 | `CharCode`, `CodepageNotFound` |
    /// | 100 | `InvalidParameter` |
    /// | 110 | `NotSupported` |
    /// | 200 | `ProfileNotFound` |
    /// | 210 | `ProfileCycle`, `Database` |
    pub fn result_code(&self) -> u8 {
        match self {
            Self::BarcodeType(_) => 10,
            Self::BarcodeSize(_) => 20,
            Self::BarcodeCode(_) => 30,
            Self::ImageWidth(_) => 41,
            Self::TabPosition(_) => 70,
            Self::CharCode(_) | Self::CodepageNotFound { .. } => 80,
            Self::InvalidParameter(_) => 100,
            Self::NotSupported(_) => 110,
            Self::ProfileNotFound(_) => 200,
            Self::ProfileCycle(_) | Self::Database(_) => 210,
        }
    }
}

fn describe_char(ch: &char) -> String {
    format!("'{}' (U+{:04X})", ch, *ch as u32)
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, EscposError>;

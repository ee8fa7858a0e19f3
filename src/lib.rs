//! # escpos-forge - Capability-Aware ESC/POS Encoding
//!
//! escpos-forge turns high-level printing requests into byte-exact ESC/POS
//! command streams for thermal receipt printers. Which commands are used
//! depends on the printer's capability profile:
//!
//! - **Profiles**: named, inheritable feature sets loaded from a JSON database
//! - **Text**: automatic codepage selection and switching
//! - **Barcodes**: hardware `GS k` when available, drawn in software otherwise
//! - **Images**: raster, column or graphics commands, split to fit
//! - **QR codes**: native `GS ( k` or software fallback
//!
//! Transports are out of scope: the result is a `Vec<u8>` to write anywhere.
//!
//! ## Quick Start
//!
//! ```
//! use escpos_forge::barcode::BarcodeRequest;
//! use escpos_forge::printer::{CommandBuilder, CutMode};
//! use escpos_forge::profile::CapabilityDatabase;
//! use escpos_forge::protocol::text::Alignment;
//!
//! let db = CapabilityDatabase::builtin()?;
//! let mut printer = CommandBuilder::new(db.resolve("TM-T88V")?);
//!
//! printer
//!     .init()
//!     .align(Alignment::Center)
//!     .bold(true)
//!     .textln("Café Olé")?
//!     .bold(false)
//!     .barcode(&BarcodeRequest::new("EAN13", "4006381333931"))?
//!     .cut(CutMode::Partial, true)?;
//!
//! let bytes = printer.into_bytes();
//! assert!(!bytes.is_empty());
//! # Ok::<(), escpos_forge::EscposError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`profile`] | Capability profiles and inheritance resolution |
//! | [`codepage`] | Single-byte character tables |
//! | [`magic`] | Codepage-switching text encoder |
//! | [`barcode`] | 1D barcode validation and path selection |
//! | [`raster`] | 1-bit images and image commands |
//! | [`qr`] | QR codes |
//! | [`printer`] | Session command builder |
//! | [`protocol`] | Raw ESC/POS command builders |
//! | [`error`] | Error types |

pub mod barcode;
pub mod codepage;
pub mod error;
pub mod magic;
pub mod printer;
pub mod profile;
pub mod protocol;
pub mod qr;
pub mod raster;

/// One complete printer command, ready for a transport.
pub type Command = Vec<u8>;

// Re-exports for convenience
pub use error::{EscposError, Result};
pub use magic::{EncodingState, MagicEncoder};
pub use printer::CommandBuilder;
pub use profile::{CapabilityDatabase, CapabilityProfile};
pub use raster::RasterImage;

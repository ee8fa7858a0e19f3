//! # ESC/POS Protocol Implementation
//!
//! This module provides low-level command builders for the ESC/POS protocol.
//! Builders here never consult a printer profile: they turn already-validated
//! parameters into bytes. Capability decisions happen one layer up.
//!
//! ## Module Structure
//!
//! - [`commands`]: Basic printer commands (init, codepage, feed, cut)
//! - [`graphics`]: Raster, column and graphics bit image commands
//! - [`text`]: Text styling (alignment, emphasis, underline, font)
//! - [`barcode`]: 1D barcodes and QR codes
//!
//! ## Usage Example
//!
//! ```
//! use escpos_forge::protocol::{commands, text};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(text::align(text::Alignment::Center));
//! data.extend(text::bold(true));
//! data.extend(b"RECEIPT\n");
//! data.extend(text::bold(false));
//! data.extend(commands::print_and_feed(6));
//! data.extend(commands::cut_full());
//! ```

pub mod barcode;
pub mod commands;
pub mod graphics;
pub mod text;

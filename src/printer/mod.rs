//! # Printer Session
//!
//! [`CommandBuilder`] ties the other modules together for one printer:
//! text goes through [`crate::magic`], barcodes through [`crate::barcode`],
//! images through [`crate::raster`], QR codes through [`crate::qr`]. The
//! finished byte stream is handed to whatever transport the caller uses.

mod builder;
mod columns;
mod style;

pub use builder::{CommandBuilder, Control, CutMode, HardwareOp};
pub use columns::ColumnAlign;
pub use style::{CharacterSize, TextStyle};

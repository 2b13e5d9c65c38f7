//! Driver for DP-EH600 thermal receipt printers attached to a serial line.
//!
//! The printer has no flow control, so every command is followed by a wait
//! sized to what the mechanism has to do. The driver also keeps a shadow copy
//! of the printer modes and skips commands that would not change anything.
//!
//! ```no_run
//! use thermalprinter::{Justify, OutOptions, Printer, PrinterConfig, Style};
//!
//! let mut printer = Printer::open(PrinterConfig::new("/dev/ttyAMA0"))?;
//! printer.out("Hello")?;
//! printer.out_with(
//!     "centered",
//!     &OutOptions::default().style(Style::new().justify(Justify::Center).bold(true)),
//! )?;
//! printer.feed(2)?;
//! printer.close()?;
//! # Ok::<(), thermalprinter::PrinterError>(())
//! ```

mod error;
pub mod printer;

pub use error::{PrinterError, PrinterResult};
pub use printer::{
    Barcode, BarcodeOptions, BarcodePosition, Charset, Chinese, CodePage, Justify, MemoryPort,
    OutOptions, Printable, Printer, PrinterConfig, PrinterMode, Raster, SerialPort, Size, Stats,
    Status, Style, SystemSerialPort, Underline,
};

//! DP-EH600 thermal printer interface
//!
//! Grown from an Adafruit thermal printer port. The command set is the one
//! documented for the DP-EH600 firmware.

mod barcode;
mod bitmap;
mod codepage;
mod command;
mod config;
mod mode;
mod oem;
mod pacing;
mod persian;
mod printer;
mod serial;
mod stats;
mod status;
mod style;

pub use crate::printer::barcode::{BarcodeOptions, CharClass};
pub use crate::printer::bitmap::{Raster, MAX_WIDTH};
pub use crate::printer::codepage::{encode, Printable};
pub use crate::printer::command::{frame, Lead};
pub use crate::printer::config::PrinterConfig;
pub use crate::printer::mode::{OutOptions, PrinterMode, Style};
pub use crate::printer::pacing::Pacing;
pub use crate::printer::persian::{encode_iran_system, reshape};
pub use crate::printer::serial::{MemoryPort, SerialPort, SystemSerialPort};
pub use crate::printer::stats::Stats;
pub use crate::printer::status::Status;
pub use printer::Printer;

use crate::error::PrinterError;
use std::fmt;
use std::str::FromStr;

/// Distances on paper, in dots (8 dots per mm)
type Dots = u32;
type Columns = u8;

/// Declares a firmware enumeration: the Rust variant, the byte the printer
/// expects, and the names accepted when parsing it from text.
macro_rules! constants {
    (@first $first:literal $(| $rest:literal)*) => {
        $first
    };
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal => $($label:literal)|+,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "build-binary", derive(clap::ValueEnum))]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every variant, in firmware order
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Byte sent to the printer for this variant
            pub fn value(self) -> u8 {
                match self {
                    $($name::$variant => $value,)+
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => constants!(@first $($label)|+),)+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = PrinterError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.value() == value)
                    .ok_or_else(|| {
                        PrinterError::Constant(format!(
                            "{} is not a valid {}",
                            value,
                            stringify!($name)
                        ))
                    })
            }
        }

        impl FromStr for $name {
            type Err = PrinterError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalize(s);
                match wanted.as_str() {
                    $($($label)|+ => Ok($name::$variant),)+
                    _ => Err(PrinterError::Constant(format!(
                        "{:?} is not a valid {}",
                        s,
                        stringify!($name)
                    ))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

fn normalize(s: &str) -> String {
    s.trim().to_ascii_uppercase().replace('-', "_")
}

constants! {
    pub enum Underline {
        Off = 0 => "OFF" | "NONE",
        Thin = 1 => "THIN" | "SINGLE",
        Thick = 2 => "THICK" | "DOUBLE",
    }
}

constants! {
    pub enum Justify {
        Left = 0 => "LEFT" | "L",
        Center = 1 => "CENTER" | "C",
        Right = 2 => "RIGHT" | "R",
    }
}

constants! {
    /// Character size, sent with `GS !`
    pub enum Size {
        Small = 0x00 => "SMALL" | "S",
        Medium = 0x01 => "MEDIUM" | "M",
        Large = 0x11 => "LARGE" | "L",
    }
}

impl Size {
    /// Glyph height in dots
    pub fn char_height(self) -> Dots {
        match self {
            Size::Small => 24,
            Size::Medium | Size::Large => 48,
        }
    }

    /// Characters per line
    pub fn max_column(self) -> Columns {
        match self {
            Size::Small | Size::Medium => 32,
            Size::Large => 16,
        }
    }
}

constants! {
    /// Where the human readable text of a barcode goes
    pub enum BarcodePosition {
        Hidden = 0 => "HIDDEN",
        Above = 1 => "ABOVE",
        Below = 2 => "BELOW",
        Both = 3 => "BOTH",
    }
}

constants! {
    /// Encoding of the Chinese character mode
    pub enum Chinese {
        Gbk = 0 => "GBK",
        Utf8 = 1 => "UTF_8" | "UTF8",
        Big5 = 3 => "BIG5",
    }
}

constants! {
    /// International character set, sent with `ESC R`
    pub enum Charset {
        Usa = 0 => "USA",
        France = 1 => "FRANCE",
        Germany = 2 => "GERMANY",
        England = 3 => "ENGLAND" | "UK",
        Denmark = 4 => "DENMARK",
        Sweden = 5 => "SWEDEN",
        Italy = 6 => "ITALY",
        Spain = 7 => "SPAIN",
        Japan = 8 => "JAPAN",
        Norway = 9 => "NORWAY",
        Denmark2 = 10 => "DENMARK2",
        Spain2 = 11 => "SPAIN2",
        LatinAmerica = 12 => "LATIN_AMERICA",
        Korea = 13 => "KOREA",
        SloveniaCroatia = 14 => "SLOVENIA_CROATIA" | "SLOVENIA",
        China = 15 => "CHINA",
    }
}

constants! {
    /// Code page, sent with `ESC t`
    pub enum CodePage {
        /// USA, standard Europe
        Cp437 = 0 => "CP437",
        /// Katakana
        Cp932 = 1 => "CP932" | "KATAKANA",
        Cp850 = 2 => "CP850",
        Cp860 = 3 => "CP860",
        Cp863 = 4 => "CP863",
        Cp865 = 5 => "CP865",
        Cp1251 = 6 => "CYRILLIC" | "CP1251" | "WPC1251",
        Cp866 = 7 => "CP866",
        /// Bulgarian
        Mik = 8 => "MIK",
        Cp755 = 9 => "CP755",
        /// Persian
        Iran = 10 => "IRAN",
        Cp862 = 15 => "CP862",
        Cp1252 = 16 => "CP1252" | "WPC1252",
        Cp1253 = 17 => "CP1253" | "WPC1253",
        Cp852 = 18 => "CP852",
        Cp858 = 19 => "CP858",
        Iran2 = 20 => "IRAN2",
        Latvia = 21 => "LATVIA" | "LATVIAN",
        Cp864 = 22 => "CP864",
        Iso8859_1 = 23 => "ISO_8859_1",
        Cp737 = 24 => "CP737",
        Cp1257 = 25 => "CP1257" | "WPC1257",
        Thai = 26 => "THAI",
        Cp720 = 27 => "CP720",
        Cp855 = 28 => "CP855",
        Cp857 = 29 => "CP857",
        Cp1250 = 30 => "CP1250" | "WPC1250",
        Cp775 = 31 => "CP775",
        Cp1254 = 32 => "CP1254" | "WPC1254",
        Cp1255 = 33 => "CP1255" | "WPC1255",
        Cp1256 = 34 => "CP1256" | "WPC1256",
        Cp1258 = 35 => "CP1258" | "WPC1258",
        Iso8859_2 = 36 => "ISO_8859_2",
        Iso8859_3 = 37 => "ISO_8859_3",
        Iso8859_4 = 38 => "ISO_8859_4",
        Iso8859_5 = 39 => "ISO_8859_5",
        Iso8859_6 = 40 => "ISO_8859_6",
        Iso8859_7 = 41 => "ISO_8859_7",
        Iso8859_8 = 42 => "ISO_8859_8",
        Iso8859_9 = 43 => "ISO_8859_9",
        Iso8859_15 = 44 => "ISO_8859_15",
        Thai2 = 45 => "THAI2",
        Cp856 = 46 => "CP856",
        Cp874 = 47 => "CP874",
    }
}

constants! {
    /// Barcode symbology, sent with `GS k`
    ///
    /// UPC-E, JAN-13 and JAN-8 share their firmware code with UPC-A, EAN-13
    /// and EAN-8; they are available as aliases of those variants.
    pub enum Barcode {
        UpcA = 65 => "UPC_A" | "UPC_E",
        Ean13 = 67 => "EAN13" | "JAN13",
        Ean8 = 68 => "EAN8" | "JAN8",
        Code39 = 69 => "CODE39",
        Itf = 70 => "ITF",
        Codabar = 71 => "CODABAR",
        Code93 = 72 => "CODE93",
        Code128 = 73 => "CODE128",
    }
}

impl Barcode {
    pub const UPC_E: Barcode = Barcode::UpcA;
    pub const JAN13: Barcode = Barcode::Ean13;
    pub const JAN8: Barcode = Barcode::Ean8;
}

const LF: u8 = b'\n';
const FF: u8 = 0xFF;
const DC2: u8 = 18;
const ESC: u8 = 27;
const FS: u8 = 28;
const GS: u8 = 29;

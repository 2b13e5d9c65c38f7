use crate::error::{PrinterError, PrinterResult};
use crate::printer::command::Lead;
use crate::printer::mode::BARCODE_WIDTH_RANGE;
use crate::printer::serial::SerialPort;
use crate::printer::{Barcode, BarcodePosition, Printer};
use std::ops::RangeInclusive;

/// Characters a symbology can encode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// `0`-`9`
    Digits,
    /// Digits, space, `$ % + - . /` and `A`-`Z`
    Code39,
    /// `$ + - . / :`, digits and `A`-`D`
    Codabar,
    /// Any 7-bit value
    Ascii,
}

impl CharClass {
    pub fn contains(self, byte: u8) -> bool {
        match self {
            CharClass::Digits => byte.is_ascii_digit(),
            CharClass::Code39 => matches!(byte, b' ' | b'$' | b'%' | b'+' | b'-'..=b'9' | b'A'..=b'Z'),
            CharClass::Codabar => matches!(byte, b'$' | b'+' | b'-'..=b':' | b'A'..=b'D'),
            CharClass::Ascii => byte < 128,
        }
    }
}

impl Barcode {
    /// Accepted payload lengths
    pub fn length_range(self) -> RangeInclusive<usize> {
        match self {
            Barcode::UpcA => 11..=12,
            Barcode::Ean13 => 12..=13,
            Barcode::Ean8 => 7..=8,
            Barcode::Code39 | Barcode::Codabar | Barcode::Code93 => 1..=255,
            Barcode::Itf | Barcode::Code128 => 2..=255,
        }
    }

    pub fn char_class(self) -> CharClass {
        match self {
            Barcode::UpcA | Barcode::Ean13 | Barcode::Ean8 | Barcode::Itf => CharClass::Digits,
            Barcode::Code39 => CharClass::Code39,
            Barcode::Codabar => CharClass::Codabar,
            Barcode::Code93 | Barcode::Code128 => CharClass::Ascii,
        }
    }

    /// Checks that `data` can be printed with this symbology.
    pub fn validate(self, data: &str) -> PrinterResult<()> {
        let range = self.length_range();
        if !range.contains(&data.len()) {
            return Err(PrinterError::Value(format!(
                "{} needs {} to {} characters, got {}",
                self,
                range.start(),
                range.end(),
                data.len()
            )));
        }
        if self == Barcode::Itf && data.len() % 2 != 0 {
            return Err(PrinterError::Value(format!(
                "ITF needs an even number of digits, got {}",
                data.len()
            )));
        }
        let class = self.char_class();
        if let Some(bad) = data.chars().find(|&c| !u8::try_from(c).is_ok_and(|b| class.contains(b))) {
            return Err(PrinterError::Value(format!(
                "{:?} cannot be encoded with {}",
                bad, self
            )));
        }
        Ok(())
    }
}

/// Barcode geometry to set before printing. Unlike text style overrides,
/// these stay in effect afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BarcodeOptions {
    pub height: Option<u8>,
    pub width: Option<u8>,
    pub left_margin: Option<u8>,
    pub position: Option<BarcodePosition>,
}

impl BarcodeOptions {
    pub fn height(mut self, height: u8) -> Self {
        self.height = Some(height);
        self
    }

    pub fn width(mut self, width: u8) -> Self {
        self.width = Some(width);
        self
    }

    pub fn left_margin(mut self, margin: u8) -> Self {
        self.left_margin = Some(margin);
        self
    }

    pub fn position(mut self, position: BarcodePosition) -> Self {
        self.position = Some(position);
        self
    }

    fn validate(&self) -> PrinterResult<()> {
        if self.height == Some(0) {
            return Err(PrinterError::Value(
                "barcode height must be in 1..=255, got 0".to_string(),
            ));
        }
        if let Some(width) = self.width {
            if !BARCODE_WIDTH_RANGE.contains(&width) {
                return Err(PrinterError::Value(format!(
                    "barcode width must be in 2..=6, got {}",
                    width
                )));
            }
        }
        Ok(())
    }
}

impl<P: SerialPort> Printer<P> {
    pub fn barcode(&mut self, data: &str, barcode_type: Barcode) -> PrinterResult<()> {
        self.barcode_with(data, barcode_type, BarcodeOptions::default())
    }

    /// Prints a barcode: `GS k code len data...`
    ///
    /// Nothing is sent when `data` or `options` are invalid.
    pub fn barcode_with(
        &mut self,
        data: &str,
        barcode_type: Barcode,
        options: BarcodeOptions,
    ) -> PrinterResult<()> {
        barcode_type.validate(data)?;
        options.validate()?;

        if let Some(height) = options.height {
            self.barcode_height(height)?;
        }
        if let Some(width) = options.width {
            self.barcode_width(width)?;
        }
        if let Some(margin) = options.left_margin {
            self.barcode_left_margin(margin)?;
        }
        if let Some(position) = options.position {
            self.barcode_position(position)?;
        }

        let mut payload = Vec::with_capacity(data.len() + 3);
        payload.extend_from_slice(&[b'k', barcode_type.value(), data.len() as u8]);
        payload.extend_from_slice(data.as_bytes());
        self.send_command(Lead::Gs, &payload)?;

        let (height, spacing) = (self.mode().barcode_height, self.mode().line_spacing);
        let duration = self.pacing().barcode(height, spacing);
        self.wait(duration);
        self.add_lines(u64::from(height / spacing) + 1);
        Ok(())
    }
}

//! Mode setters.
//!
//! Each setter checks its argument, compares it with the shadow copy and only
//! talks to the printer when the mode actually changes.

use crate::error::{PrinterError, PrinterResult};
use crate::printer::command::Lead;
use crate::printer::mode::{check_left_margin, check_line_spacing, BARCODE_WIDTH_RANGE};
use crate::printer::serial::SerialPort;
use crate::printer::{
    BarcodePosition, Charset, Chinese, CodePage, Justify, Printer, Size, Underline,
};
use tracing::debug;

impl<P: SerialPort> Printer<P> {
    pub fn bold(&mut self, state: bool) -> PrinterResult<()> {
        if self.mode().bold == state {
            return Ok(());
        }
        self.mode_mut().bold = state;
        self.send_command(Lead::Esc, &[b'E', u8::from(state)])
    }

    pub fn strike(&mut self, state: bool) -> PrinterResult<()> {
        if self.mode().strike == state {
            return Ok(());
        }
        self.mode_mut().strike = state;
        self.send_command(Lead::Esc, &[b'G', u8::from(state)])
    }

    /// White on black printing
    pub fn inverse(&mut self, state: bool) -> PrinterResult<()> {
        if self.mode().inverse == state {
            return Ok(());
        }
        self.mode_mut().inverse = state;
        self.send_command(Lead::Gs, &[b'B', u8::from(state)])
    }

    /// Rotates characters by 90 degrees
    pub fn rotate(&mut self, state: bool) -> PrinterResult<()> {
        if self.mode().rotate == state {
            return Ok(());
        }
        self.mode_mut().rotate = state;
        self.send_command(Lead::Esc, &[b'V', u8::from(state)])
    }

    pub fn upside_down(&mut self, state: bool) -> PrinterResult<()> {
        if self.mode().upside_down == state {
            return Ok(());
        }
        self.mode_mut().upside_down = state;
        self.send_command(Lead::Esc, &[b'{', u8::from(state)])
    }

    pub fn double_height(&mut self, state: bool) -> PrinterResult<()> {
        if self.mode().double_height == state {
            return Ok(());
        }
        let mode = self.mode_mut();
        mode.double_height = state;
        mode.update_geometry();
        self.send_command(Lead::Esc, &[b'!', if state { 0x10 } else { 0x00 }])
    }

    pub fn double_width(&mut self, state: bool) -> PrinterResult<()> {
        if self.mode().double_width == state {
            return Ok(());
        }
        let mode = self.mode_mut();
        mode.double_width = state;
        mode.update_geometry();
        if state {
            self.send_command(Lead::Esc, &[14, 1])
        } else {
            self.send_command(Lead::Esc, &[20, 1])
        }
    }

    pub fn font_b(&mut self, state: bool) -> PrinterResult<()> {
        if self.mode().font_b == state {
            return Ok(());
        }
        self.mode_mut().font_b = state;
        self.send_command(Lead::Esc, &[b'!', u8::from(state)])
    }

    /// Chinese mode: `FS &` on, `FS .` off. While it is on, text is sent as
    /// UTF-8 and code page changes are ignored.
    pub fn chinese(&mut self, state: bool) -> PrinterResult<()> {
        if self.mode().chinese == state {
            return Ok(());
        }
        self.mode_mut().chinese = state;
        self.send_command(Lead::Fs, if state { b"&" } else { b"." })
    }

    pub fn chinese_format(&mut self, format: Chinese) -> PrinterResult<()> {
        if self.mode().chinese_format == format {
            return Ok(());
        }
        self.mode_mut().chinese_format = format;
        self.send_command(Lead::Esc, &[b'9', format.value()])
    }

    pub fn online(&mut self) -> PrinterResult<()> {
        if self.mode().is_online {
            return Ok(());
        }
        self.mode_mut().is_online = true;
        self.send_command(Lead::Esc, &[b'=', 1])
    }

    /// The printer ignores everything but `online` until then.
    pub fn offline(&mut self) -> PrinterResult<()> {
        if !self.mode().is_online {
            return Ok(());
        }
        self.mode_mut().is_online = false;
        self.send_command(Lead::Esc, &[b'=', 0])
    }

    pub fn justify(&mut self, justify: Justify) -> PrinterResult<()> {
        if self.mode().justify == justify {
            return Ok(());
        }
        self.mode_mut().justify = justify;
        self.send_command(Lead::Esc, &[b'a', justify.value()])
    }

    pub fn size(&mut self, size: Size) -> PrinterResult<()> {
        if self.mode().size == size {
            return Ok(());
        }
        let mode = self.mode_mut();
        mode.size = size;
        mode.update_geometry();
        self.send_command(Lead::Gs, &[b'!', size.value()])
    }

    pub fn underline(&mut self, underline: Underline) -> PrinterResult<()> {
        if self.mode().underline == underline {
            return Ok(());
        }
        self.mode_mut().underline = underline;
        self.send_command(Lead::Esc, &[b'-', underline.value()])
    }

    pub fn charset(&mut self, charset: Charset) -> PrinterResult<()> {
        if self.mode().charset == charset {
            return Ok(());
        }
        self.mode_mut().charset = charset;
        self.send_command(Lead::Esc, &[b'R', charset.value()])
    }

    pub fn codepage(&mut self, codepage: CodePage) -> PrinterResult<()> {
        if self.mode().chinese {
            debug!("chinese mode is on, ignoring code page {}", codepage);
            return Ok(());
        }
        if self.mode().codepage == codepage {
            return Ok(());
        }
        self.mode_mut().codepage = codepage;
        self.send_command(Lead::Esc, &[b't', codepage.value()])
    }

    pub fn char_spacing(&mut self, spacing: u8) -> PrinterResult<()> {
        if self.mode().char_spacing == spacing {
            return Ok(());
        }
        self.mode_mut().char_spacing = spacing;
        self.send_command(Lead::Esc, &[b' ', spacing])
    }

    /// Dots between two lines of text, 1..=255
    pub fn line_spacing(&mut self, spacing: u8) -> PrinterResult<()> {
        check_line_spacing(spacing)?;
        if self.mode().line_spacing == spacing {
            return Ok(());
        }
        self.mode_mut().line_spacing = spacing;
        self.send_command(Lead::Esc, &[b'3', spacing])
    }

    /// Left margin in characters, 0..=47
    pub fn left_margin(&mut self, margin: u8) -> PrinterResult<()> {
        check_left_margin(margin)?;
        if self.mode().left_margin == margin {
            return Ok(());
        }
        self.mode_mut().left_margin = margin;
        self.send_command(Lead::Esc, &[b'B', margin])
    }

    /// Left blank in dots
    pub fn left_blank(&mut self, blank: u8) -> PrinterResult<()> {
        if self.mode().left_blank == blank {
            return Ok(());
        }
        self.mode_mut().left_blank = blank;
        self.send_command(Lead::Gs, &[b'L', blank, 0])
    }

    /// Barcode height in dots, 1..=255
    pub fn barcode_height(&mut self, height: u8) -> PrinterResult<()> {
        if height == 0 {
            return Err(PrinterError::Value(
                "barcode height must be in 1..=255, got 0".to_string(),
            ));
        }
        if self.mode().barcode_height == height {
            return Ok(());
        }
        self.mode_mut().barcode_height = height;
        self.send_command(Lead::Gs, &[b'h', height])
    }

    /// Barcode module width, 2..=6
    pub fn barcode_width(&mut self, width: u8) -> PrinterResult<()> {
        if !BARCODE_WIDTH_RANGE.contains(&width) {
            return Err(PrinterError::Value(format!(
                "barcode width must be in 2..=6, got {}",
                width
            )));
        }
        if self.mode().barcode_width == width {
            return Ok(());
        }
        self.mode_mut().barcode_width = width;
        self.send_command(Lead::Gs, &[b'w', width])
    }

    pub fn barcode_left_margin(&mut self, margin: u8) -> PrinterResult<()> {
        if self.mode().barcode_left_margin == margin {
            return Ok(());
        }
        self.mode_mut().barcode_left_margin = margin;
        self.send_command(Lead::Gs, &[b'x', margin])
    }

    pub fn barcode_position(&mut self, position: BarcodePosition) -> PrinterResult<()> {
        if self.mode().barcode_position == position {
            return Ok(());
        }
        self.mode_mut().barcode_position = position;
        self.send_command(Lead::Gs, &[b'H', position.value()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::{MemoryPort, PrinterConfig, PrinterMode};

    fn printer() -> Printer<MemoryPort> {
        let config = PrinterConfig::default().with_stats(false);
        let mut printer = Printer::with_port(MemoryPort::new(), &config).unwrap();
        printer.port_mut().take_written();
        printer
    }

    /// Runs `op` twice: the first call must send `expected`, the second nothing.
    fn assert_once<F>(p: &mut Printer<MemoryPort>, op: F, expected: &[u8])
    where
        F: Fn(&mut Printer<MemoryPort>) -> PrinterResult<()>,
    {
        op(p).unwrap();
        assert_eq!(p.port_mut().take_written(), expected);
        op(p).unwrap();
        assert!(p.port_mut().take_written().is_empty());
    }

    #[test]
    fn test_toggles_are_idempotent() {
        let mut p = printer();
        assert_once(&mut p, |p| p.bold(true), &[27, b'E', 1]);
        assert_once(&mut p, |p| p.bold(false), &[27, b'E', 0]);
        assert_once(&mut p, |p| p.strike(true), &[27, b'G', 1]);
        assert_once(&mut p, |p| p.inverse(true), &[29, b'B', 1]);
        assert_once(&mut p, |p| p.rotate(true), &[27, b'V', 1]);
        assert_once(&mut p, |p| p.upside_down(true), &[27, b'{', 1]);
        assert_once(&mut p, |p| p.font_b(true), &[27, b'!', 1]);
        assert_once(&mut p, |p| p.chinese(true), &[28, b'&']);
        assert_once(&mut p, |p| p.chinese(false), &[28, b'.']);
        assert_once(&mut p, |p| p.offline(), &[27, b'=', 0]);
        assert_once(&mut p, |p| p.online(), &[27, b'=', 1]);
    }

    #[test]
    fn test_enumerated_setters() {
        let mut p = printer();
        assert_once(&mut p, |p| p.justify(Justify::Center), &[27, b'a', 1]);
        assert_once(&mut p, |p| p.underline(Underline::Thick), &[27, b'-', 2]);
        assert_once(&mut p, |p| p.charset(Charset::Japan), &[27, b'R', 8]);
        assert_once(&mut p, |p| p.chinese_format(Chinese::Big5), &[27, b'9', 3]);
        assert_once(&mut p, |p| p.codepage(CodePage::Cp1252), &[27, b't', 16]);
        assert_once(
            &mut p,
            |p| p.barcode_position(BarcodePosition::Both),
            &[29, b'H', 3],
        );
    }

    #[test]
    fn test_size_geometry() {
        let mut p = printer();
        assert_once(&mut p, |p| p.size(Size::Medium), &[29, b'!', 0x01]);
        assert_eq!((p.mode().char_height, p.mode().max_column), (48, 32));
        assert_once(&mut p, |p| p.size(Size::Large), &[29, b'!', 0x11]);
        assert_eq!((p.mode().char_height, p.mode().max_column), (48, 16));
        assert_once(&mut p, |p| p.size(Size::Small), &[29, b'!', 0x00]);
        assert_eq!((p.mode().char_height, p.mode().max_column), (24, 32));
    }

    #[test]
    fn test_double_width_and_height() {
        let mut p = printer();
        assert_once(&mut p, |p| p.double_width(true), &[27, 14, 1]);
        assert_eq!(p.mode().max_column, 16);
        assert_once(&mut p, |p| p.double_width(false), &[27, 20, 1]);
        assert_eq!(p.mode().max_column, 32);
        assert_once(&mut p, |p| p.double_height(true), &[27, b'!', 0x10]);
        assert_eq!(p.mode().char_height, 48);
        assert_once(&mut p, |p| p.double_height(false), &[27, b'!', 0x00]);
        assert_eq!(p.mode().char_height, 24);
    }

    #[test]
    fn test_codepage_ignored_in_chinese_mode() {
        let mut p = printer();
        p.chinese(true).unwrap();
        p.port_mut().take_written();
        p.codepage(CodePage::Iran).unwrap();
        assert!(p.port().written().is_empty());
        assert_eq!(p.mode().codepage, CodePage::Cp437);
    }

    #[test]
    fn test_bounded_integers() {
        let mut p = printer();
        assert_once(&mut p, |p| p.char_spacing(255), &[27, b' ', 255]);
        assert_once(&mut p, |p| p.char_spacing(0), &[27, b' ', 0]);
        assert_once(&mut p, |p| p.line_spacing(255), &[27, b'3', 255]);
        assert_once(&mut p, |p| p.line_spacing(1), &[27, b'3', 1]);
        assert_once(&mut p, |p| p.left_margin(47), &[27, b'B', 47]);
        assert_once(&mut p, |p| p.left_margin(0), &[27, b'B', 0]);
        assert_once(&mut p, |p| p.left_blank(255), &[29, b'L', 255, 0]);
        assert_once(&mut p, |p| p.left_blank(0), &[29, b'L', 0, 0]);
        assert_once(&mut p, |p| p.barcode_height(1), &[29, b'h', 1]);
        assert_once(&mut p, |p| p.barcode_height(255), &[29, b'h', 255]);
        assert_once(&mut p, |p| p.barcode_width(2), &[29, b'w', 2]);
        assert_once(&mut p, |p| p.barcode_width(6), &[29, b'w', 6]);
        assert_once(&mut p, |p| p.barcode_left_margin(255), &[29, b'x', 255]);
        assert_once(&mut p, |p| p.barcode_left_margin(0), &[29, b'x', 0]);
    }

    #[test]
    fn test_out_of_range_sends_nothing() {
        let mut p = printer();
        let before = p.mode().clone();
        assert!(matches!(p.left_margin(48), Err(PrinterError::Value(_))));
        assert!(matches!(p.line_spacing(0), Err(PrinterError::Value(_))));
        assert!(matches!(p.barcode_height(0), Err(PrinterError::Value(_))));
        assert!(matches!(p.barcode_width(1), Err(PrinterError::Value(_))));
        assert!(matches!(p.barcode_width(7), Err(PrinterError::Value(_))));
        assert!(p.port().written().is_empty());
        assert_eq!(p.mode(), &before);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut p = printer();
        p.bold(true).unwrap();
        p.size(Size::Large).unwrap();
        p.codepage(CodePage::Thai).unwrap();
        p.barcode_width(5).unwrap();
        p.offline().unwrap();
        p.feed(2).unwrap();
        p.reset().unwrap();
        assert_eq!(p.mode(), &PrinterMode::default());
        assert_eq!(p.feeds(), 2);
    }
}

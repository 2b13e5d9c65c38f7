use crate::error::{PrinterError, PrinterResult};
use crate::printer::{
    BarcodePosition, Charset, Chinese, CodePage, Columns, Dots, Justify, Size, Underline,
};

pub(crate) const MAX_LEFT_MARGIN: u8 = 47;
pub(crate) const BARCODE_WIDTH_RANGE: std::ops::RangeInclusive<u8> = 2..=6;

/// Host side copy of the printer modes.
///
/// Setters compare against this before sending anything, so a mode that is
/// already active costs no bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterMode {
    pub barcode_height: u8,
    pub barcode_left_margin: u8,
    pub barcode_width: u8,
    pub barcode_position: BarcodePosition,
    pub bold: bool,
    pub charset: Charset,
    pub char_height: Dots,
    pub char_spacing: u8,
    pub chinese: bool,
    pub chinese_format: Chinese,
    pub codepage: CodePage,
    pub double_height: bool,
    pub double_width: bool,
    pub font_b: bool,
    pub inverse: bool,
    pub is_online: bool,
    pub is_sleeping: bool,
    pub justify: Justify,
    pub left_blank: u8,
    pub left_margin: u8,
    pub line_spacing: u8,
    pub max_column: Columns,
    pub rotate: bool,
    pub size: Size,
    pub strike: bool,
    pub underline: Underline,
    pub upside_down: bool,
}

impl Default for PrinterMode {
    fn default() -> Self {
        Self {
            barcode_height: 162,
            barcode_left_margin: 0,
            barcode_width: 3,
            barcode_position: BarcodePosition::Hidden,
            bold: false,
            charset: Charset::Usa,
            char_height: 24,
            char_spacing: 0,
            chinese: false,
            chinese_format: Chinese::Gbk,
            codepage: CodePage::Cp437,
            double_height: false,
            double_width: false,
            font_b: false,
            inverse: false,
            is_online: true,
            is_sleeping: false,
            justify: Justify::Left,
            left_blank: 0,
            left_margin: 0,
            line_spacing: 30,
            max_column: 32,
            rotate: false,
            size: Size::Small,
            strike: false,
            underline: Underline::Off,
            upside_down: false,
        }
    }
}

impl PrinterMode {
    /// Recomputes `char_height` and `max_column` from the size and the
    /// double height/width flags.
    pub(crate) fn update_geometry(&mut self) {
        self.char_height = if self.double_height {
            48
        } else {
            self.size.char_height()
        };
        self.max_column = if self.double_width {
            16
        } else {
            self.size.max_column()
        };
    }
}

pub(crate) fn check_left_margin(margin: u8) -> PrinterResult<()> {
    if margin > MAX_LEFT_MARGIN {
        return Err(PrinterError::Value(format!(
            "left margin must be in 0..={}, got {}",
            MAX_LEFT_MARGIN, margin
        )));
    }
    Ok(())
}

pub(crate) fn check_line_spacing(spacing: u8) -> PrinterResult<()> {
    if spacing == 0 {
        return Err(PrinterError::Value(
            "line spacing must be in 1..=255, got 0".to_string(),
        ));
    }
    Ok(())
}

/// Per-call style overrides for `out_with`.
///
/// Every field that is set gets applied before printing and set back to its
/// default afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    pub bold: Option<bool>,
    pub char_spacing: Option<u8>,
    pub chinese: Option<bool>,
    pub chinese_format: Option<Chinese>,
    pub codepage: Option<CodePage>,
    pub double_height: Option<bool>,
    pub double_width: Option<bool>,
    pub font_b: Option<bool>,
    pub inverse: Option<bool>,
    pub justify: Option<Justify>,
    pub left_margin: Option<u8>,
    pub line_spacing: Option<u8>,
    pub rotate: Option<bool>,
    pub size: Option<Size>,
    pub strike: Option<bool>,
    pub underline: Option<Underline>,
    pub upside_down: Option<bool>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bold(mut self, state: bool) -> Self {
        self.bold = Some(state);
        self
    }

    pub fn char_spacing(mut self, spacing: u8) -> Self {
        self.char_spacing = Some(spacing);
        self
    }

    pub fn chinese(mut self, state: bool) -> Self {
        self.chinese = Some(state);
        self
    }

    pub fn chinese_format(mut self, format: Chinese) -> Self {
        self.chinese_format = Some(format);
        self
    }

    pub fn codepage(mut self, codepage: CodePage) -> Self {
        self.codepage = Some(codepage);
        self
    }

    pub fn double_height(mut self, state: bool) -> Self {
        self.double_height = Some(state);
        self
    }

    pub fn double_width(mut self, state: bool) -> Self {
        self.double_width = Some(state);
        self
    }

    pub fn font_b(mut self, state: bool) -> Self {
        self.font_b = Some(state);
        self
    }

    pub fn inverse(mut self, state: bool) -> Self {
        self.inverse = Some(state);
        self
    }

    pub fn justify(mut self, justify: Justify) -> Self {
        self.justify = Some(justify);
        self
    }

    pub fn left_margin(mut self, margin: u8) -> Self {
        self.left_margin = Some(margin);
        self
    }

    pub fn line_spacing(mut self, spacing: u8) -> Self {
        self.line_spacing = Some(spacing);
        self
    }

    pub fn rotate(mut self, state: bool) -> Self {
        self.rotate = Some(state);
        self
    }

    pub fn size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn strike(mut self, state: bool) -> Self {
        self.strike = Some(state);
        self
    }

    pub fn underline(mut self, underline: Underline) -> Self {
        self.underline = Some(underline);
        self
    }

    pub fn upside_down(mut self, state: bool) -> Self {
        self.upside_down = Some(state);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Style::default()
    }

    /// Range checks, done before anything is sent.
    pub(crate) fn validate(&self) -> PrinterResult<()> {
        if let Some(margin) = self.left_margin {
            check_left_margin(margin)?;
        }
        if let Some(spacing) = self.line_spacing {
            check_line_spacing(spacing)?;
        }
        Ok(())
    }
}

/// Options of `out_with`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutOptions {
    /// Append a newline after the value
    pub line_feed: bool,
    /// Shape the text as Persian and print it right aligned with the `IRAN`
    /// code page
    pub persian: bool,
    pub style: Style,
}

impl Default for OutOptions {
    fn default() -> Self {
        Self {
            line_feed: true,
            persian: false,
            style: Style::default(),
        }
    }
}

impl OutOptions {
    pub fn line_feed(mut self, line_feed: bool) -> Self {
        self.line_feed = line_feed;
        self
    }

    pub fn persian(mut self, persian: bool) -> Self {
        self.persian = persian;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let mode = PrinterMode::default();
        assert_eq!(mode.barcode_height, 162);
        assert_eq!(mode.barcode_width, 3);
        assert_eq!(mode.line_spacing, 30);
        assert_eq!((mode.char_height, mode.max_column), (24, 32));
        assert_eq!(mode.codepage, CodePage::Cp437);
        assert!(mode.is_online);
        assert!(!mode.is_sleeping);
    }

    #[test]
    fn test_style_validation() {
        assert!(Style::new().left_margin(47).validate().is_ok());
        assert!(matches!(
            Style::new().left_margin(48).validate(),
            Err(PrinterError::Value(_))
        ));
        assert!(matches!(
            Style::new().line_spacing(0).validate(),
            Err(PrinterError::Value(_))
        ));
        assert!(Style::new().is_empty());
        assert!(!Style::new().bold(false).is_empty());
    }
}

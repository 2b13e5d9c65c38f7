use crate::error::{PrinterError, PrinterResult};
use crate::printer::command::Lead;
use crate::printer::serial::SerialPort;
use crate::printer::{Dots, Printer};
use bitvec::prelude::*;
use std::fmt;
use std::path::Path;

#[cfg(feature = "image")]
use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, GrayImage};

/// Width of the print head in dots
pub const MAX_WIDTH: Dots = 384;

/// Luma at or above which a pixel is left white
#[cfg(feature = "image")]
const THRESHOLD: u8 = 128;

/// A 1-bit picture in the layout of the raster print command.
///
/// Rows are `row_bytes` wide, the most significant bit is the leftmost
/// pixel and a set bit prints a black dot. Padding bits at the end of a row
/// stay white.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: Dots,
    height: Dots,
    bits: BitVec<u8, Msb0>,
}

impl Raster {
    /// All white raster
    pub fn new(width: Dots, height: Dots) -> Self {
        let row_bits = Self::stride(width) * 8;
        Self {
            width,
            height,
            bits: bitvec![u8, Msb0; 0; row_bits * height as usize],
        }
    }

    /// Wraps data that is already packed, `ceil(width / 8)` bytes per row.
    pub fn from_packed(width: Dots, height: Dots, data: &[u8]) -> PrinterResult<Self> {
        let expected = Self::stride(width) * height as usize;
        if data.len() != expected {
            return Err(PrinterError::Value(format!(
                "a {}x{} raster needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            bits: BitVec::from_slice(data),
        })
    }

    fn stride(width: Dots) -> usize {
        (width as usize + 7) / 8
    }

    fn index(&self, x: Dots, y: Dots) -> usize {
        y as usize * self.row_bytes() * 8 + x as usize
    }

    pub fn width(&self) -> Dots {
        self.width
    }

    pub fn height(&self) -> Dots {
        self.height
    }

    pub fn row_bytes(&self) -> usize {
        Self::stride(self.width)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn get(&self, x: Dots, y: Dots) -> bool {
        x < self.width && y < self.height && self.bits[self.index(x, y)]
    }

    pub fn set(&mut self, x: Dots, y: Dots, black: bool) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.bits.set(idx, black);
        }
    }

    /// Packed rows, ready for the printer
    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }

    /// Converts a picture: 1 bit without dithering, then scaled down to the
    /// head width if it is wider.
    #[cfg(feature = "image")]
    pub fn from_image(img: &DynamicImage) -> PrinterResult<Self> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(PrinterError::Value("image is empty".to_string()));
        }

        let mut gray = img.to_luma8();
        for pixel in gray.pixels_mut() {
            pixel[0] = if pixel[0] >= THRESHOLD { 255 } else { 0 };
        }

        let gray = if width > MAX_WIDTH {
            let scaled = (u64::from(height) * u64::from(MAX_WIDTH) / u64::from(width)).max(1);
            imageops::resize(&gray, MAX_WIDTH, scaled as u32, FilterType::Nearest)
        } else {
            gray
        };
        Ok(Self::from_luma(&gray))
    }

    #[cfg(feature = "image")]
    fn from_luma(img: &GrayImage) -> Self {
        let (width, height) = img.dimensions();
        let mut raster = Self::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels() {
            raster.set(x, y, pixel[0] < THRESHOLD);
        }
        raster
    }
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("row_bytes", &self.row_bytes())
            .finish()
    }
}

/// Text preview, `#` for black dots
impl fmt::Display for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            let row: String = (0..self.width)
                .map(|x| if self.get(x, y) { '#' } else { ' ' })
                .collect();
            writeln!(f, "{}", row.trim_end())?;
        }
        Ok(())
    }
}

impl<P: SerialPort> Printer<P> {
    /// Prints a packed raster: `GS v 48 0 row_lo row_hi height_lo height_hi data...`
    pub fn raster(&mut self, raster: &Raster) -> PrinterResult<()> {
        if raster.is_empty() {
            return Err(PrinterError::Value("image is empty".to_string()));
        }
        if raster.width() > MAX_WIDTH {
            return Err(PrinterError::Value(format!(
                "image is {} dots wide, the head has {}",
                raster.width(),
                MAX_WIDTH
            )));
        }
        let height = u16::try_from(raster.height()).map_err(|_| {
            PrinterError::Value(format!("image is too tall: {} rows", raster.height()))
        })?;
        let row_bytes = raster.row_bytes() as u16;

        let data = raster.as_bytes();
        let mut payload = Vec::with_capacity(data.len() + 7);
        payload.extend_from_slice(&[b'v', 48, 0]);
        payload.extend_from_slice(&row_bytes.to_le_bytes());
        payload.extend_from_slice(&height.to_le_bytes());
        payload.extend_from_slice(data);
        self.send_command(Lead::Gs, &payload)?;

        let spacing = self.mode().line_spacing;
        let duration = self.pacing().image(u32::from(height), spacing);
        self.wait(duration);
        self.add_lines(u64::from(height / u16::from(spacing)) + 1);
        Ok(())
    }

    #[cfg(feature = "image")]
    pub fn image(&mut self, img: &DynamicImage) -> PrinterResult<()> {
        let raster = Raster::from_image(img)?;
        self.raster(&raster)
    }

    /// Loads and prints a picture file.
    ///
    /// Without the `image` feature this only logs a warning.
    pub fn image_file(&mut self, path: impl AsRef<Path>) -> PrinterResult<()> {
        let path = path.as_ref();
        #[cfg(feature = "image")]
        {
            let img = image::open(path).map_err(|e| {
                PrinterError::Image(format!("cannot load {}: {}", path.display(), e))
            })?;
            self.image(&img)
        }
        #[cfg(not(feature = "image"))]
        {
            tracing::warn!(
                "built without image support, not printing {}",
                path.display()
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_stays_white() {
        let mut raster = Raster::new(10, 2);
        raster.set(0, 0, true);
        raster.set(9, 1, true);
        assert_eq!(raster.row_bytes(), 2);
        assert_eq!(raster.as_bytes(), &[0b1000_0000, 0, 0, 0b0100_0000]);
    }

    #[test]
    fn test_from_packed_checks_length() {
        assert!(Raster::from_packed(16, 2, &[0; 4]).is_ok());
        assert!(matches!(
            Raster::from_packed(16, 2, &[0; 3]),
            Err(PrinterError::Value(_))
        ));
    }

    #[test]
    fn test_preview() {
        let raster = Raster::from_packed(8, 2, &[0b1010_0000, 0b0000_0001]).unwrap();
        assert_eq!(raster.to_string(), "# #\n       #\n");
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_threshold_without_dithering() {
        let img = GrayImage::from_fn(8, 1, |x, _| image::Luma([if x < 4 { 127 } else { 128 }]));
        let raster = Raster::from_image(&DynamicImage::ImageLuma8(img)).unwrap();
        assert_eq!(raster.as_bytes(), &[0b1111_0000]);
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_resize_to_head_width() {
        for (width, expected) in [(383, (383, 48)), (384, (384, 48)), (385, (384, 48))] {
            let img = DynamicImage::new_luma8(width, 10);
            let raster = Raster::from_image(&img).unwrap();
            assert_eq!((raster.width(), raster.row_bytes()), expected);
        }
        let raster = Raster::from_image(&DynamicImage::new_luma8(900, 900)).unwrap();
        assert_eq!((raster.row_bytes(), raster.height()), (48, 384));
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_empty_image() {
        let img = DynamicImage::new_luma8(0, 0);
        assert!(matches!(
            Raster::from_image(&img),
            Err(PrinterError::Value(_))
        ));
    }
}

use crate::printer::Dots;
use std::time::Duration;

/// Number of text lines on the self-test page
const TEST_PAGE_LINES: u32 = 26;

/// Estimates how long the printer is busy after each operation.
///
/// There is no flow control on the line, so the driver waits these
/// durations out instead of being told when the printer is ready.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    /// One byte on the wire: start bit, 8 data bits, stop bit and one idle bit.
    pub byte_time: Duration,
    pub dot_print_time: Duration,
    pub dot_feed_time: Duration,
    /// Settling time after commands that change a mode or ask for a reply
    pub command_timeout: Duration,
}

impl Pacing {
    pub fn new(
        baud_rate: u32,
        dot_print_time: Duration,
        dot_feed_time: Duration,
        command_timeout: Duration,
    ) -> Self {
        Self {
            byte_time: Self::byte_time(baud_rate),
            dot_print_time,
            dot_feed_time,
            command_timeout,
        }
    }

    pub fn byte_time(baud_rate: u32) -> Duration {
        Duration::from_secs_f64(11.0 / f64::from(baud_rate.max(1)))
    }

    /// Transmission of `n_bytes` bytes
    pub fn command(&self, n_bytes: usize) -> Duration {
        self.byte_time * n_bytes as u32
    }

    /// Feeding `lines` lines of `char_height` dots
    pub fn feed(&self, lines: u32, char_height: Dots) -> Duration {
        self.dot_feed_time * lines * char_height
    }

    /// Printing `dot_rows` rows of pixels
    pub fn image(&self, dot_rows: u32, line_spacing: u8) -> Duration {
        self.dot_print_time
            .mul_f64(f64::from(dot_rows) / f64::from(line_spacing.max(1)))
    }

    pub fn barcode(&self, barcode_height: u8, line_spacing: u8) -> Duration {
        self.image(u32::from(barcode_height), line_spacing)
    }

    pub fn test_page(&self) -> Duration {
        self.dot_print_time * 24 * TEST_PAGE_LINES
            + self.dot_feed_time * (8 * TEST_PAGE_LINES + 32)
    }
}

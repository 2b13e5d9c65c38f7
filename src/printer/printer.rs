use crate::error::{PrinterError, PrinterResult};
use crate::printer::codepage::encode;
use crate::printer::command::{frame, Lead};
use crate::printer::config::PrinterConfig;
use crate::printer::mode::{OutOptions, PrinterMode, Style};
use crate::printer::pacing::Pacing;
use crate::printer::persian::{encode_iran_system, reshape};
use crate::printer::serial::{SerialPort, SystemSerialPort};
use crate::printer::stats::Stats;
use crate::printer::status::Status;
use crate::printer::{CodePage, Justify, Printable, Size, FF, LF};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// The printer wants a moment after the port opens before the first command
const STARTUP_DELAY: Duration = Duration::from_millis(500);
/// Pause between the wake-up byte and the command that disables sleep
const WAKE_DELAY: Duration = Duration::from_millis(50);

/// A session with one printer.
///
/// The session owns the transport. Dropping it runs [`Printer::close`], which
/// also happens at most once when called explicitly.
pub struct Printer<P: SerialPort> {
    port: P,
    pacing: Pacing,
    mode: PrinterMode,

    baud_rate: u32,
    most_heated_point: u8,
    heat_time: u8,
    heat_interval: u8,

    lines: u64,
    feeds: u64,
    stats_path: Option<PathBuf>,
    closed: bool,
}

impl Printer<SystemSerialPort> {
    /// Opens the serial port named in `config` and sets the printer up.
    pub fn open(config: PrinterConfig) -> PrinterResult<Self> {
        let port = SystemSerialPort::open(
            &config.port,
            config.baud_rate,
            config.read_timeout,
            config.write_timeout,
            config.xon_xoff,
        )?;
        Self::with_port(port, &config)
    }
}

impl<P: SerialPort> Printer<P> {
    /// Starts a session on an already opened transport: heat configuration
    /// (if `run_setup_cmd` is set), then [`Printer::reset`].
    pub fn with_port(port: P, config: &PrinterConfig) -> PrinterResult<Self> {
        let mut printer = Self {
            port,
            pacing: Pacing::new(
                config.baud_rate,
                config.dot_print_time,
                config.dot_feed_time,
                config.command_timeout,
            ),
            mode: PrinterMode::default(),
            baud_rate: config.baud_rate,
            most_heated_point: config.most_heated_point,
            heat_time: config.heat_time,
            heat_interval: config.heat_interval,
            lines: 0,
            feeds: 0,
            stats_path: config.use_stats.then(|| config.stats_file()),
            closed: false,
        };

        printer.port.wait(STARTUP_DELAY);
        if config.run_setup_cmd {
            printer.init(
                config.most_heated_point,
                config.heat_time,
                config.heat_interval,
            )?;
        }
        printer.reset()?;
        debug!("printer ready: {}", printer);

        Ok(printer)
    }

    /// Heat configuration: `ESC 7 most_heated_point heat_time heat_interval`
    pub fn init(
        &mut self,
        most_heated_point: u8,
        heat_time: u8,
        heat_interval: u8,
    ) -> PrinterResult<()> {
        self.most_heated_point = most_heated_point;
        self.heat_time = heat_time;
        self.heat_interval = heat_interval;
        self.send_command(Lead::Esc, &[b'7', most_heated_point, heat_time, heat_interval])
    }

    /// Resets the printer and every shadowed mode to its default.
    /// The session counters are kept.
    pub fn reset(&mut self) -> PrinterResult<()> {
        self.send_command(Lead::Esc, b"@")?;
        self.mode = PrinterMode::default();
        Ok(())
    }

    /// Frames and sends one command, then waits for it to be transmitted.
    pub fn send_command(&mut self, lead: Lead, payload: &[u8]) -> PrinterResult<()> {
        let cmd = frame(lead, payload);
        if cmd.len() <= 16 {
            trace!("command {:?}", cmd);
        } else {
            trace!("command {:?}... ({} bytes)", &cmd[..8], cmd.len());
        }
        self.port.write_bytes(&cmd)?;
        self.port.wait(self.pacing.command(payload.len() + 1));
        Ok(())
    }

    /// Prints a value followed by a newline, with the current style.
    pub fn out(&mut self, data: impl Into<Printable>) -> PrinterResult<()> {
        self.out_with(data, &OutOptions::default())
    }

    /// Prints a value.
    ///
    /// Style overrides in `options` are applied first and each one is set
    /// back to its default once the value is printed.
    pub fn out_with(
        &mut self,
        data: impl Into<Printable>,
        options: &OutOptions,
    ) -> PrinterResult<()> {
        let data = data.into();
        options.style.validate()?;

        let mut style = options.style.clone();
        let persian = if options.persian {
            style.codepage = Some(CodePage::Iran);
            style.justify = Some(Justify::Right);
            Some(match &data {
                Printable::Bytes(bytes) => bytes.clone(),
                other => encode_iran_system(&reshape(&other.to_text().unwrap_or_default())),
            })
        } else {
            None
        };

        self.apply_style(&style)?;

        let mut bytes = match persian {
            Some(bytes) => bytes,
            None => encode(&data, self.mode.codepage, self.mode.chinese),
        };
        if options.line_feed {
            bytes.push(LF);
        }
        self.port.write_bytes(&bytes)?;

        let newlines = bytes.iter().filter(|&&b| b == LF).count() as u32;
        let per_line = if self.mode.size == Size::Small { 1 } else { 2 };
        self.lines += u64::from(newlines) * per_line;
        self.port
            .wait(self.pacing.feed(newlines, self.mode.char_height));

        self.restore_style(&style)
    }

    fn apply_style(&mut self, style: &Style) -> PrinterResult<()> {
        if let Some(state) = style.chinese {
            self.chinese(state)?;
        }
        if let Some(format) = style.chinese_format {
            self.chinese_format(format)?;
        }
        if let Some(codepage) = style.codepage {
            self.codepage(codepage)?;
        }
        if let Some(justify) = style.justify {
            self.justify(justify)?;
        }
        if let Some(size) = style.size {
            self.size(size)?;
        }
        if let Some(state) = style.double_height {
            self.double_height(state)?;
        }
        if let Some(state) = style.double_width {
            self.double_width(state)?;
        }
        if let Some(state) = style.font_b {
            self.font_b(state)?;
        }
        if let Some(state) = style.bold {
            self.bold(state)?;
        }
        if let Some(underline) = style.underline {
            self.underline(underline)?;
        }
        if let Some(state) = style.inverse {
            self.inverse(state)?;
        }
        if let Some(state) = style.strike {
            self.strike(state)?;
        }
        if let Some(state) = style.rotate {
            self.rotate(state)?;
        }
        if let Some(state) = style.upside_down {
            self.upside_down(state)?;
        }
        if let Some(spacing) = style.char_spacing {
            self.char_spacing(spacing)?;
        }
        if let Some(spacing) = style.line_spacing {
            self.line_spacing(spacing)?;
        }
        if let Some(margin) = style.left_margin {
            self.left_margin(margin)?;
        }
        Ok(())
    }

    /// Sets every overridden mode back to its default, in name order.
    fn restore_style(&mut self, style: &Style) -> PrinterResult<()> {
        let default = PrinterMode::default();
        if style.bold.is_some() {
            self.bold(default.bold)?;
        }
        if style.char_spacing.is_some() {
            self.char_spacing(default.char_spacing)?;
        }
        if style.chinese.is_some() {
            self.chinese(default.chinese)?;
        }
        if style.chinese_format.is_some() {
            self.chinese_format(default.chinese_format)?;
        }
        if style.codepage.is_some() {
            self.codepage(default.codepage)?;
        }
        if style.double_height.is_some() {
            self.double_height(default.double_height)?;
        }
        if style.double_width.is_some() {
            self.double_width(default.double_width)?;
        }
        if style.font_b.is_some() {
            self.font_b(default.font_b)?;
        }
        if style.inverse.is_some() {
            self.inverse(default.inverse)?;
        }
        if style.justify.is_some() {
            self.justify(default.justify)?;
        }
        if style.left_margin.is_some() {
            self.left_margin(default.left_margin)?;
        }
        if style.line_spacing.is_some() {
            self.line_spacing(default.line_spacing)?;
        }
        if style.rotate.is_some() {
            self.rotate(default.rotate)?;
        }
        if style.size.is_some() {
            self.size(default.size)?;
        }
        if style.strike.is_some() {
            self.strike(default.strike)?;
        }
        if style.underline.is_some() {
            self.underline(default.underline)?;
        }
        if style.upside_down.is_some() {
            self.upside_down(default.upside_down)?;
        }
        Ok(())
    }

    /// Feeds `lines` lines: `ESC d n`
    pub fn feed(&mut self, lines: u8) -> PrinterResult<()> {
        self.send_command(Lead::Esc, &[b'd', lines])?;
        self.port
            .wait(self.pacing.feed(u32::from(lines), self.mode.char_height));
        self.feeds += u64::from(lines);
        Ok(())
    }

    pub fn lf(&mut self, lines: u8) -> PrinterResult<()> {
        self.feed(lines)
    }

    /// Prints the self-test page
    pub fn test(&mut self) -> PrinterResult<()> {
        self.send_command(Lead::Dc2, b"T")?;
        self.port.wait(self.pacing.test_page());
        Ok(())
    }

    /// Asks the printer for its status.
    ///
    /// When nothing comes back, this fails with a communication error if
    /// `raise_on_error` is set, and returns an all-false status otherwise.
    pub fn status(&mut self, raise_on_error: bool) -> PrinterResult<Status> {
        self.send_command(Lead::Esc, &[b'v', 0])?;
        self.port.wait(self.pacing.command_timeout);

        if self.port.in_waiting()? > 0 {
            if let Some(&byte) = self.port.read_bytes(1)?.first() {
                let status = Status::decode(byte);
                debug!("status byte {:#010b}: {:?}", byte, status);
                return Ok(status);
            }
        }
        if raise_on_error {
            return Err(PrinterError::Communication(
                "no answer to the status request".to_string(),
            ));
        }
        Ok(Status::unknown())
    }

    /// Puts the printer to sleep after `seconds` of inactivity: `ESC 8 lo hi`
    pub fn sleep(&mut self, seconds: u16) -> PrinterResult<()> {
        if self.mode.is_sleeping {
            return Ok(());
        }
        self.mode.is_sleeping = true;
        let [lo, hi] = seconds.to_le_bytes();
        self.send_command(Lead::Esc, &[b'8', lo, hi])
    }

    pub fn wake(&mut self) -> PrinterResult<()> {
        if !self.mode.is_sleeping {
            return Ok(());
        }
        self.mode.is_sleeping = false;
        self.send_command(Lead::None, &[FF])?;
        self.port.wait(WAKE_DELAY);
        // sleep off
        self.send_command(Lead::Esc, &[b'8', 0, 0])
    }

    /// Waits for the output to drain; `clear` also drops unread input.
    pub fn flush(&mut self, clear: bool) -> PrinterResult<()> {
        self.port.flush_output()?;
        if clear {
            self.port.flush_input()?;
        }
        Ok(())
    }

    /// Ends the session: flushes, adds the counters to the statistics file
    /// and closes the transport. Calling it again does nothing.
    pub fn close(&mut self) -> PrinterResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let flushed = self.port.flush_output();
        let saved = self.save_stats();
        self.port.close()?;
        flushed?;
        saved
    }

    fn save_stats(&mut self) -> PrinterResult<()> {
        let Some(path) = &self.stats_path else {
            return Ok(());
        };
        if self.lines == 0 && self.feeds == 0 {
            return Ok(());
        }
        Stats::merge(path, self.feeds, self.lines)?;
        self.lines = 0;
        self.feeds = 0;
        Ok(())
    }

    pub fn mode(&self) -> &PrinterMode {
        &self.mode
    }

    pub(crate) fn mode_mut(&mut self) -> &mut PrinterMode {
        &mut self.mode
    }

    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    /// Lines printed since the session started or the counters were saved
    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub(crate) fn add_lines(&mut self, lines: u64) {
        self.lines += lines;
    }

    /// Lines fed since the session started or the counters were saved
    pub fn feeds(&self) -> u64 {
        self.feeds
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// `(most_heated_point, heat_time, heat_interval)`
    pub fn heat(&self) -> (u8, u8, u8) {
        (self.most_heated_point, self.heat_time, self.heat_interval)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub(crate) fn wait(&mut self, d: Duration) {
        self.port.wait(d);
    }
}

impl<P: SerialPort> Drop for Printer<P> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("error while closing the printer: {}", e);
        }
    }
}

impl<P: SerialPort> fmt::Display for Printer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Printer(baud_rate={}, heat=({}, {}, {}), codepage={}, charset={}, size={}, justify={}, lines={}, feeds={}, online={}, sleeping={})",
            self.baud_rate,
            self.most_heated_point,
            self.heat_time,
            self.heat_interval,
            self.mode.codepage,
            self.mode.charset,
            self.mode.size,
            self.mode.justify,
            self.lines,
            self.feeds,
            self.mode.is_online,
            self.mode.is_sleeping,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::serial::MemoryPort;
    use crate::printer::DC2;

    fn printer() -> Printer<MemoryPort> {
        let config = PrinterConfig::default().with_stats(false);
        let mut printer = Printer::with_port(MemoryPort::new(), &config).unwrap();
        printer.port_mut().take_written();
        printer.port_mut().clear_waits();
        printer
    }

    #[test]
    fn test_constructor_sends_heat_then_reset() {
        let config = PrinterConfig::default().with_stats(false);
        let printer = Printer::with_port(MemoryPort::new(), &config).unwrap();
        assert_eq!(printer.port().written(), &[27, b'7', 3, 80, 12, 27, 64]);
        assert_eq!(printer.heat(), (3, 80, 12));
    }

    #[test]
    fn test_constructor_without_setup() {
        let config = PrinterConfig::default()
            .with_stats(false)
            .with_setup_cmd(false);
        let printer = Printer::with_port(MemoryPort::new(), &config).unwrap();
        assert_eq!(printer.port().written(), &[27, 64]);
    }

    #[test]
    fn test_command_pacing() {
        let mut p = printer();
        p.send_command(Lead::Esc, b"E\x01").unwrap();
        assert_eq!(p.port().waits(), &[p.pacing().byte_time * 3]);
    }

    #[test]
    fn test_feed() {
        let mut p = printer();
        p.feed(0).unwrap();
        p.feed(255).unwrap();
        assert_eq!(p.port().written(), &[27, b'd', 0, 27, b'd', 255]);
        assert_eq!(p.feeds(), 255);
        assert_eq!(p.lines(), 0);
        let expected = p.pacing().dot_feed_time * 255 * 24;
        assert!(p.port().waits().contains(&expected));
    }

    #[test]
    fn test_status() {
        let mut p = printer();
        p.port_mut().push_reply(&[0b0000_0100]);
        let status = p.status(true).unwrap();
        assert_eq!(p.port().written(), &[27, b'v', 0]);
        assert!(!status.paper);
        assert!(status.temp && status.voltage);
        assert!(p.port().waits().contains(&Duration::from_millis(50)));
    }

    #[test]
    fn test_status_without_answer() {
        let mut p = printer();
        assert!(matches!(
            p.status(true),
            Err(PrinterError::Communication(_))
        ));
        assert_eq!(p.status(false).unwrap(), Status::unknown());
    }

    #[test]
    fn test_sleep_and_wake() {
        let mut p = printer();
        p.wake().unwrap();
        assert!(p.port().written().is_empty());
        p.sleep(300).unwrap();
        p.sleep(300).unwrap();
        assert_eq!(p.port_mut().take_written(), vec![27, b'8', 44, 1]);
        assert!(p.mode().is_sleeping);
        p.wake().unwrap();
        assert_eq!(p.port_mut().take_written(), vec![0xFF, 27, b'8', 0, 0]);
        assert!(!p.mode().is_sleeping);
    }

    #[test]
    fn test_test_page() {
        let mut p = printer();
        p.test().unwrap();
        assert_eq!(p.port().written(), &[DC2, b'T']);
        assert_eq!(p.port().waits().last(), Some(&p.pacing().test_page()));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut p = printer();
        p.close().unwrap();
        p.close().unwrap();
        assert!(p.is_closed());
        assert!(p.port().is_closed());
        assert!(matches!(p.feed(1), Err(PrinterError::Transport(_))));
    }

    #[test]
    fn test_display() {
        let p = printer();
        let repr = p.to_string();
        assert!(repr.contains("codepage=CP437"));
        assert!(repr.contains("baud_rate=19200"));
    }
}

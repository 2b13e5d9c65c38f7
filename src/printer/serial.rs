use crate::error::{PrinterError, PrinterResult};
use serial::SerialPort as _;
use serial::SystemPort;
use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// How long `in_waiting` and `flush_input` poll for bytes already received
const POLL_TIMEOUT: Duration = Duration::from_millis(1);

/// Byte transport to the printer.
///
/// `wait` is where the pacing delays end up. The system port sleeps the
/// calling thread, the in-memory port only records the request.
pub trait SerialPort {
    /// Returns once the bytes have been handed to the OS.
    fn write_bytes(&mut self, bytes: &[u8]) -> PrinterResult<()>;

    /// Reads up to `n` bytes. Running into the read timeout yields fewer
    /// bytes, possibly none, and is not an error.
    fn read_bytes(&mut self, n: usize) -> PrinterResult<Vec<u8>>;

    /// Number of received bytes ready to be read.
    fn in_waiting(&mut self) -> PrinterResult<usize>;

    /// Drops everything received but not read yet.
    fn flush_input(&mut self) -> PrinterResult<()>;

    /// Blocks until everything written has left the host.
    fn flush_output(&mut self) -> PrinterResult<()>;

    fn close(&mut self) -> PrinterResult<()>;

    fn wait(&mut self, d: Duration) {
        if d > Duration::ZERO {
            trace!("waiting for {} us", d.as_micros());
            thread::sleep(d);
        }
    }
}

/// A serial device opened through the `serial` crate, 8-N-1.
pub struct SystemSerialPort {
    port: Option<SystemPort>,
    name: String,
    read_timeout: Duration,
    write_timeout: Duration,
    // bytes pulled off the line by `in_waiting` that nobody read yet
    pending: VecDeque<u8>,
}

impl SystemSerialPort {
    pub fn open(
        name: &str,
        baud_rate: u32,
        read_timeout: Duration,
        write_timeout: Duration,
        xon_xoff: bool,
    ) -> PrinterResult<Self> {
        let mut port = serial::open(name)
            .map_err(|e| PrinterError::Transport(format!("cannot open {}: {}", name, e)))?;
        port.reconfigure(&|settings| {
            settings.set_baud_rate(serial::BaudRate::from_speed(baud_rate as usize))?;
            settings.set_char_size(serial::Bits8);
            settings.set_parity(serial::ParityNone);
            settings.set_stop_bits(serial::Stop1);
            settings.set_flow_control(if xon_xoff {
                serial::FlowControl::FlowSoftware
            } else {
                serial::FlowControl::FlowNone
            });
            Ok(())
        })?;
        port.set_timeout(write_timeout)?;
        debug!("opened {} at {} baud", name, baud_rate);

        Ok(Self {
            port: Some(port),
            name: name.to_string(),
            read_timeout,
            write_timeout,
            pending: VecDeque::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn port(&mut self) -> PrinterResult<&mut SystemPort> {
        match self.port.as_mut() {
            Some(port) => Ok(port),
            None => Err(PrinterError::Transport(format!("{} is closed", self.name))),
        }
    }

    /// Moves whatever the OS already has into `pending`, without blocking
    /// longer than `POLL_TIMEOUT`.
    fn poll_input(&mut self) -> PrinterResult<()> {
        let port = self.port()?;
        port.set_timeout(POLL_TIMEOUT)?;
        let mut buf = [0u8; 64];
        let mut received = Vec::new();
        loop {
            match port.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => received.extend_from_slice(&buf[..n]),
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    break
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.pending.extend(received);
        Ok(())
    }
}

impl SerialPort for SystemSerialPort {
    fn write_bytes(&mut self, bytes: &[u8]) -> PrinterResult<()> {
        let timeout = self.write_timeout;
        let port = self.port()?;
        port.set_timeout(timeout)?;
        port.write_all(bytes).map_err(|e| {
            PrinterError::Transport(format!("write of {} bytes failed: {}", bytes.len(), e))
        })?;
        Ok(())
    }

    fn read_bytes(&mut self, n: usize) -> PrinterResult<Vec<u8>> {
        let take = n.min(self.pending.len());
        let mut out: Vec<u8> = self.pending.drain(..take).collect();
        if out.len() == n {
            return Ok(out);
        }

        let timeout = self.read_timeout;
        let port = self.port()?;
        port.set_timeout(timeout)?;
        let mut buf = vec![0u8; n - out.len()];
        match port.read(&mut buf) {
            Ok(read) => out.extend_from_slice(&buf[..read]),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {}
            Err(e) => return Err(e.into()),
        }
        Ok(out)
    }

    fn in_waiting(&mut self) -> PrinterResult<usize> {
        self.poll_input()?;
        Ok(self.pending.len())
    }

    fn flush_input(&mut self) -> PrinterResult<()> {
        self.poll_input()?;
        self.pending.clear();
        Ok(())
    }

    fn flush_output(&mut self) -> PrinterResult<()> {
        self.port()?.flush()?;
        Ok(())
    }

    fn close(&mut self) -> PrinterResult<()> {
        if self.port.take().is_some() {
            debug!("closed {}", self.name);
        }
        Ok(())
    }
}

/// Transport that keeps everything in memory.
///
/// Used for tests and dry runs: written bytes and requested waits are
/// recorded, replies are served from a queue filled with `push_reply`.
#[derive(Debug, Default)]
pub struct MemoryPort {
    written: Vec<u8>,
    replies: VecDeque<u8>,
    waits: Vec<Duration>,
    closed: bool,
}

impl MemoryPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Returns the bytes written so far and starts over with an empty buffer.
    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.written)
    }

    pub fn push_reply(&mut self, bytes: &[u8]) {
        self.replies.extend(bytes);
    }

    pub fn waits(&self) -> &[Duration] {
        &self.waits
    }

    pub fn total_wait(&self) -> Duration {
        self.waits.iter().sum()
    }

    pub fn clear_waits(&mut self) {
        self.waits.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn check_open(&self) -> PrinterResult<()> {
        if self.closed {
            return Err(PrinterError::Transport("memory port is closed".to_string()));
        }
        Ok(())
    }
}

impl SerialPort for MemoryPort {
    fn write_bytes(&mut self, bytes: &[u8]) -> PrinterResult<()> {
        self.check_open()?;
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    fn read_bytes(&mut self, n: usize) -> PrinterResult<Vec<u8>> {
        self.check_open()?;
        let take = n.min(self.replies.len());
        Ok(self.replies.drain(..take).collect())
    }

    fn in_waiting(&mut self) -> PrinterResult<usize> {
        self.check_open()?;
        Ok(self.replies.len())
    }

    fn flush_input(&mut self) -> PrinterResult<()> {
        self.check_open()?;
        self.replies.clear();
        Ok(())
    }

    fn flush_output(&mut self) -> PrinterResult<()> {
        self.check_open()
    }

    fn close(&mut self) -> PrinterResult<()> {
        self.closed = true;
        Ok(())
    }

    fn wait(&mut self, d: Duration) {
        self.waits.push(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_port_records_and_replies() {
        let mut port = MemoryPort::new();
        port.write_bytes(&[27, 64]).unwrap();
        port.push_reply(&[0x04, 0x08]);
        assert_eq!(port.in_waiting().unwrap(), 2);
        assert_eq!(port.read_bytes(1).unwrap(), vec![0x04]);
        assert_eq!(port.read_bytes(5).unwrap(), vec![0x08]);
        assert_eq!(port.read_bytes(1).unwrap(), Vec::<u8>::new());
        assert_eq!(port.take_written(), vec![27, 64]);
        assert!(port.written().is_empty());
    }

    #[test]
    fn test_memory_port_wait_does_not_sleep() {
        let mut port = MemoryPort::new();
        port.wait(Duration::from_secs(3600));
        assert_eq!(port.total_wait(), Duration::from_secs(3600));
    }

    #[test]
    fn test_closed_memory_port_refuses_io() {
        let mut port = MemoryPort::new();
        port.close().unwrap();
        assert!(matches!(
            port.write_bytes(b"x"),
            Err(PrinterError::Transport(_))
        ));
        // closing twice is fine
        port.close().unwrap();
    }
}

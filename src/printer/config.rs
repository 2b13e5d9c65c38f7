use std::path::PathBuf;
use std::time::Duration;

/// Name of the statistics file, in the home directory
const STATS_FILE: &str = ".thermalprinter.json";

/// Everything needed to open a session.
#[derive(Debug, Clone, PartialEq)]
pub struct PrinterConfig {
    pub port: String,
    pub baud_rate: u32,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    /// Software flow control. The DP-EH600 does not send XON/XOFF, and
    /// enabling it can swallow status replies.
    pub xon_xoff: bool,

    /// Heating dots, in units of 8 dots
    pub most_heated_point: u8,
    /// Heating time, in units of 10 us
    pub heat_time: u8,
    /// Heating interval, in units of 10 us
    pub heat_interval: u8,
    /// Send the heat configuration when the session opens
    pub run_setup_cmd: bool,

    /// Add the session counters to the statistics file on close
    pub use_stats: bool,
    pub stats_path: Option<PathBuf>,

    pub dot_print_time: Duration,
    pub dot_feed_time: Duration,
    pub command_timeout: Duration,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyAMA0".to_string(),
            baud_rate: 19200,
            read_timeout: Duration::from_millis(500),
            write_timeout: Duration::from_secs(5),
            xon_xoff: false,
            most_heated_point: 3,
            heat_time: 80,
            heat_interval: 12,
            run_setup_cmd: true,
            use_stats: true,
            stats_path: None,
            dot_print_time: Duration::from_millis(30),
            dot_feed_time: Duration::from_micros(2100),
            command_timeout: Duration::from_millis(50),
        }
    }
}

impl PrinterConfig {
    pub fn new(port: &str) -> Self {
        Self {
            port: port.to_string(),
            ..Self::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_heat(mut self, most_heated_point: u8, heat_time: u8, heat_interval: u8) -> Self {
        self.most_heated_point = most_heated_point;
        self.heat_time = heat_time;
        self.heat_interval = heat_interval;
        self
    }

    pub fn with_setup_cmd(mut self, run_setup_cmd: bool) -> Self {
        self.run_setup_cmd = run_setup_cmd;
        self
    }

    pub fn with_stats(mut self, use_stats: bool) -> Self {
        self.use_stats = use_stats;
        self
    }

    pub fn with_stats_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stats_path = Some(path.into());
        self
    }

    pub fn with_timeouts(mut self, read_timeout: Duration, write_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self.write_timeout = write_timeout;
        self
    }

    pub fn with_xon_xoff(mut self, xon_xoff: bool) -> Self {
        self.xon_xoff = xon_xoff;
        self
    }

    /// Statistics file to use: the configured one, or `~/.thermalprinter.json`.
    pub fn stats_file(&self) -> PathBuf {
        if let Some(path) = &self.stats_path {
            return path.clone();
        }
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(STATS_FILE),
            None => PathBuf::from(STATS_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PrinterConfig::new("/dev/ttyUSB0");
        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 19200);
        assert_eq!(
            (config.most_heated_point, config.heat_time, config.heat_interval),
            (3, 80, 12)
        );
        assert!(config.run_setup_cmd);
        assert!(config.use_stats);
    }

    #[test]
    fn test_stats_file() {
        let config = PrinterConfig::default().with_stats_path("/tmp/stats.json");
        assert_eq!(config.stats_file(), PathBuf::from("/tmp/stats.json"));
        let default = PrinterConfig::default().stats_file();
        assert!(default.ends_with(STATS_FILE));
    }
}

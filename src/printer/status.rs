/// Printer condition, decoded from the reply to `ESC v 0`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    /// Paper is loaded
    pub paper: bool,
    /// Head temperature is fine
    pub temp: bool,
    /// Supply voltage is fine
    pub voltage: bool,
}

const NO_PAPER: u8 = 0b0000_0100;
const BAD_VOLTAGE: u8 = 0b0000_1000;
const OVERHEATED: u8 = 0b0100_0000;

impl Status {
    pub fn decode(byte: u8) -> Self {
        Self {
            paper: byte & NO_PAPER == 0,
            temp: byte & OVERHEATED == 0,
            voltage: byte & BAD_VOLTAGE == 0,
        }
    }

    /// Status reported when the printer did not answer
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        self.paper && self.temp && self.voltage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        assert!(Status::decode(0).is_ok());
        let s = Status::decode(0b0000_0100);
        assert_eq!((s.paper, s.temp, s.voltage), (false, true, true));
        let s = Status::decode(0b0100_1000);
        assert_eq!((s.paper, s.temp, s.voltage), (true, false, false));
        assert!(!Status::unknown().is_ok());
    }
}

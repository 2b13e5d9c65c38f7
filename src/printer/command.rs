use crate::printer::{DC2, ESC, FS, GS};

/// Leading byte of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lead {
    /// The command is the payload alone, e.g. wake-up (`0xFF`)
    None,
    Dc2,
    Esc,
    Fs,
    Gs,
}

impl Lead {
    pub fn byte(self) -> Option<u8> {
        match self {
            Lead::None => None,
            Lead::Dc2 => Some(DC2),
            Lead::Esc => Some(ESC),
            Lead::Fs => Some(FS),
            Lead::Gs => Some(GS),
        }
    }
}

/// Frames one command: leading byte, then the payload.
pub fn frame(lead: Lead, payload: &[u8]) -> Vec<u8> {
    let mut cmd = Vec::with_capacity(payload.len() + 1);
    cmd.extend(lead.byte());
    cmd.extend_from_slice(payload);
    cmd
}

//! Interrupt cause decoding
//!
//! The SCB status word aggregates four latched interrupt causes. The
//! handler reads the raw word once per pass, decodes it here, acknowledges
//! exactly the bits it saw, and dispatches on the decoded struct.

use crate::internal::wire::scb;

/// Decoded SCB interrupt cause bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScbStatus {
    /// A command with its interrupt bit set has completed
    pub cmd_complete: bool,
    /// One or more frames have been received
    pub frame_received: bool,
    /// The command unit left the active state
    pub unit_idle: bool,
    /// The receive unit ran out of resources
    pub receiver_not_ready: bool,
}

impl ScbStatus {
    /// Decodes the cause bits of a raw SCB status word.
    pub const fn from_raw(raw: u16) -> Self {
        Self {
            cmd_complete: raw & scb::ST_CX != 0,
            frame_received: raw & scb::ST_FR != 0,
            unit_idle: raw & scb::ST_CNA != 0,
            receiver_not_ready: raw & scb::ST_RNR != 0,
        }
    }

    /// Re-encodes the latched causes as SCB acknowledge bits.
    pub const fn to_ack(self) -> u16 {
        let mut bits = 0;
        if self.cmd_complete {
            bits |= scb::ST_CX;
        }
        if self.frame_received {
            bits |= scb::ST_FR;
        }
        if self.unit_idle {
            bits |= scb::ST_CNA;
        }
        if self.receiver_not_ready {
            bits |= scb::ST_RNR;
        }
        bits
    }

    /// True when any cause is latched.
    pub const fn any(self) -> bool {
        self.cmd_complete || self.frame_received || self.unit_idle || self.receiver_not_ready
    }
}

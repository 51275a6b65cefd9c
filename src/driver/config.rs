//! Configuration types for the protocol engine

use crate::internal::constants::{SYNC_CMD_POLL_INTERVAL_US, SYNC_CMD_POLL_LIMIT};

/// Default locally-administered MAC address used when none is configured
pub const DEFAULT_MAC_ADDR: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];

/// Engine configuration
///
/// Ring depths are const generic parameters of [`Ie`](crate::driver::Ie);
/// everything that can vary per board without changing memory footprint
/// lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IeConfig {
    /// Size of the shared memory region in bytes
    pub mem_size: usize,
    /// Station MAC address loaded at initialization
    pub mac_address: [u8; 6],
    /// Start in promiscuous mode
    pub promiscuous: bool,
    /// Maximum poll iterations for a synchronous command
    pub cmd_poll_limit: u32,
    /// Spacing between synchronous command polls, microseconds
    pub cmd_poll_interval_us: u32,
}

impl Default for IeConfig {
    fn default() -> Self {
        Self::new(64 * 1024)
    }
}

impl IeConfig {
    /// Create a configuration for a shared region of `mem_size` bytes
    #[must_use]
    pub const fn new(mem_size: usize) -> Self {
        Self {
            mem_size,
            mac_address: DEFAULT_MAC_ADDR,
            promiscuous: false,
            cmd_poll_limit: SYNC_CMD_POLL_LIMIT,
            cmd_poll_interval_us: SYNC_CMD_POLL_INTERVAL_US,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the station MAC address
    #[must_use]
    pub const fn with_mac_address(mut self, addr: [u8; 6]) -> Self {
        self.mac_address = addr;
        self
    }

    /// Enable or disable promiscuous mode at startup
    #[must_use]
    pub const fn with_promiscuous(mut self, enabled: bool) -> Self {
        self.promiscuous = enabled;
        self
    }

    /// Set the synchronous command poll bound
    #[must_use]
    pub const fn with_cmd_poll_limit(mut self, limit: u32) -> Self {
        self.cmd_poll_limit = limit;
        self
    }

    /// Set the synchronous command poll interval
    #[must_use]
    pub const fn with_cmd_poll_interval_us(mut self, us: u32) -> Self {
        self.cmd_poll_interval_us = us;
        self
    }
}

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Not initialized
    #[default]
    Uninitialized,
    /// Initialization handshake complete, rings live
    Running,
}

// =============================================================================
// Unit Tests
// =============================================================================

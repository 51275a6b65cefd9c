//! Command dispatcher
//!
//! Configuration-class commands (address setup, configure, multicast setup,
//! diagnose) are staged in a dedicated area of the shared region, linked
//! with end-of-list set and started through the SCB command-list pointer.
//!
//! Initialization submits them synchronously with a bounded poll. At
//! runtime they run asynchronously, and because the command unit is shared
//! with the transmit chain, a runtime command is deferred while transmit
//! slots are pending and started by the interrupt handler once the queue
//! drains.

use embedded_hal::delay::DelayNs;

use crate::driver::config::State;
use crate::driver::ie::Ie;
use crate::error::{CmdError, CmdResult};
use crate::hal::{DevicePort, MemoryPort};
use crate::internal::constants::{MAC_ADDR_LEN, MAX_MCAST};
use crate::internal::layout::ShmemLayout;
use crate::internal::wire::{cmd, conf, ia, mcast, scb, stat, NULL_OFFSET};

/// Configuration-class command selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum GenCmd {
    /// Load the station MAC address
    AddressSetup,
    /// Load device parameters, including the promiscuous bit
    Configure,
    /// Load the multicast filter list
    McastSetup,
    /// Run the internal self-test
    Diagnose,
}

/// Commands waiting for the transmit queue to drain.
///
/// Only the latest request per kind is kept; reprogramming the same
/// parameter twice before the queue drains only needs the final value.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DeferredCmds {
    address: bool,
    configure: bool,
    mcast: bool,
}

impl DeferredCmds {
    pub(crate) const fn new() -> Self {
        Self {
            address: false,
            configure: false,
            mcast: false,
        }
    }

    fn set(&mut self, kind: GenCmd) {
        match kind {
            GenCmd::AddressSetup => self.address = true,
            GenCmd::Configure => self.configure = true,
            GenCmd::McastSetup => self.mcast = true,
            GenCmd::Diagnose => {}
        }
    }

    fn take_next(&mut self) -> Option<GenCmd> {
        if self.configure {
            self.configure = false;
            return Some(GenCmd::Configure);
        }
        if self.address {
            self.address = false;
            return Some(GenCmd::AddressSetup);
        }
        if self.mcast {
            self.mcast = false;
            return Some(GenCmd::McastSetup);
        }
        None
    }
}

/// Configure command parameter bytes.
///
/// Fifo threshold 8, address length 6 with the header in the buffers,
/// standard interframe spacing and slot time, minimum frame length 64.
/// Byte 8 carries the promiscuous bit.
fn conf_bytes(promiscuous: bool) -> [u8; conf::DATA_LEN] {
    let mut bytes = [
        0x0c, 0x08, 0x26, 0x2e, 0x00, 0x60, 0x00, 0xf2, 0x00, 0x00, 0x40, 0xff,
    ];
    if promiscuous {
        bytes[8] |= 0x01;
    }
    bytes
}

impl<M, D, const NFRAMES: usize, const NRXBUF: usize, const NTXBUF: usize>
    Ie<M, D, NFRAMES, NRXBUF, NTXBUF>
where
    M: MemoryPort,
    D: DevicePort,
{
    // =========================================================================
    // Public Control Surface
    // =========================================================================

    /// Sets the station MAC address.
    ///
    /// While running, an address-setup command is queued asynchronously.
    /// Before initialization the call has no lasting effect because
    /// [`init`](Self::init) loads the address from its configuration.
    pub fn set_address(&mut self, addr: [u8; MAC_ADDR_LEN]) {
        self.mac_addr = addr;
        self.submit_async(GenCmd::AddressSetup);
    }

    /// Enables or disables promiscuous reception.
    pub fn set_promiscuous(&mut self, enabled: bool) {
        self.promiscuous = enabled;
        self.submit_async(GenCmd::Configure);
    }

    /// Replaces the multicast filter list.
    ///
    /// Rejects lists longer than the staging capacity with
    /// [`CmdError::MulticastOverflow`] without touching the active list.
    pub fn set_multicast_list(&mut self, addrs: &[[u8; MAC_ADDR_LEN]]) -> CmdResult<()> {
        if addrs.len() > MAX_MCAST {
            return Err(CmdError::MulticastOverflow);
        }
        self.mcast[..addrs.len()].copy_from_slice(addrs);
        self.mcast_len = addrs.len();
        self.submit_async(GenCmd::McastSetup);
        Ok(())
    }

    /// Runs the coprocessor self-test synchronously.
    ///
    /// Only valid while the transmit queue is empty and no asynchronous
    /// command is outstanding.
    pub fn diagnose<DLY: DelayNs>(&mut self, delay: &mut DLY) -> CmdResult<()> {
        if self.async_cmd.is_some() || !self.tx.is_empty() {
            return Err(CmdError::Failed);
        }
        self.submit_sync(GenCmd::Diagnose, delay)
    }

    // =========================================================================
    // Submission Paths
    // =========================================================================

    /// Stages `kind` in the general command area, end-of-list set.
    fn write_gencmd(&mut self, kind: GenCmd) {
        let g = self.layout.gencmd;
        self.bus.write16(g + cmd::STATUS, 0);
        let op = match kind {
            GenCmd::AddressSetup => cmd::OP_IASETUP,
            GenCmd::Configure => cmd::OP_CONFIGURE,
            GenCmd::McastSetup => cmd::OP_MCSETUP,
            GenCmd::Diagnose => cmd::OP_DIAGNOSE,
        };
        self.bus.write16(g + cmd::OP, op | cmd::FL_EL | cmd::FL_INTR);
        self.bus.write16(g + cmd::LINK, NULL_OFFSET);

        match kind {
            GenCmd::AddressSetup => {
                let addr = self.mac_addr;
                self.bus.copy_out(g + ia::ADDR, &addr);
            }
            GenCmd::Configure => {
                let bytes = conf_bytes(self.promiscuous);
                self.bus.copy_out(g + conf::DATA, &bytes);
            }
            GenCmd::McastSetup => {
                let count = (self.mcast_len * MAC_ADDR_LEN) as u16;
                self.bus.write16(g + mcast::COUNT, count);
                for i in 0..self.mcast_len {
                    let addr = self.mcast[i];
                    self.bus
                        .copy_out(g + mcast::ADDRS + i * MAC_ADDR_LEN, &addr);
                }
            }
            GenCmd::Diagnose => {}
        }
        self.wmb(g, ShmemLayout::GENCMD_SIZE);
    }

    /// Points the command unit at the staging area and starts it.
    fn start_gencmd(&mut self) -> bool {
        let g = self.layout.gencmd;
        self.bus.write16(self.layout.scb + scb::CBL, g as u16);
        self.scb_command(scb::CUC_START)
    }

    /// Stages and runs `kind`, polling for completion with a bounded wait.
    pub(crate) fn submit_sync<DLY: DelayNs>(
        &mut self,
        kind: GenCmd,
        delay: &mut DLY,
    ) -> CmdResult<()> {
        self.write_gencmd(kind);
        if !self.start_gencmd() {
            self.counters.cmd_timeouts += 1;
            return Err(CmdError::Timeout);
        }

        let g = self.layout.gencmd;
        for _ in 0..self.config.cmd_poll_limit {
            self.rmb(g, 2);
            let status = self.bus.read16(g + cmd::STATUS);
            if status & stat::COMPLETE != 0 {
                self.bus.write16(g + cmd::STATUS, 0);
                // Completion latched CX/CNA; clear them here so the
                // interrupt handler has nothing spurious to chase.
                let pending = self.bus.read16(self.layout.scb + scb::STATUS) & scb::ST_WHENCE;
                if pending != 0 {
                    self.scb_ack(pending);
                }
                return if status & stat::OK != 0 {
                    Ok(())
                } else {
                    Err(CmdError::Failed)
                };
            }
            delay.delay_us(self.config.cmd_poll_interval_us);
        }
        self.counters.cmd_timeouts += 1;
        Err(CmdError::Timeout)
    }

    /// Stages and starts `kind` without waiting, deferring while the
    /// command unit is busy with transmit work. Before initialization there
    /// is nothing to submit; `init` programs the configured parameters.
    fn submit_async(&mut self, kind: GenCmd) {
        if self.state != State::Running {
            return;
        }
        if self.async_cmd.is_some() || !self.tx.is_empty() {
            self.deferred.set(kind);
            return;
        }
        self.write_gencmd(kind);
        if self.start_gencmd() {
            self.async_cmd = Some(kind);
        } else {
            self.counters.cmd_timeouts += 1;
            self.deferred.set(kind);
        }
    }

    /// Interrupt-handler half of the asynchronous path: observe an
    /// outstanding command's completion, then start a deferred one if the
    /// transmit queue has drained.
    pub(crate) fn service_async_cmd(&mut self) {
        let g = self.layout.gencmd;
        if self.async_cmd.is_some() {
            self.rmb(g, 2);
            let status = self.bus.read16(g + cmd::STATUS);
            if status & stat::COMPLETE != 0 {
                if status & stat::OK == 0 {
                    self.counters.cmd_failures += 1;
                    #[cfg(feature = "log")]
                    log::warn!("async command completed with error status");
                }
                self.bus.write16(g + cmd::STATUS, 0);
                self.wmb(g, 2);
                self.async_cmd = None;
            }
        }

        if self.async_cmd.is_none() && self.tx.is_empty() {
            if let Some(next) = self.deferred.take_next() {
                self.write_gencmd(next);
                if self.start_gencmd() {
                    self.async_cmd = Some(next);
                } else {
                    self.counters.cmd_timeouts += 1;
                    self.deferred.set(next);
                }
            }
        }

        if self.async_cmd.is_none() {
            self.restart_cu_if_pending();
        }
    }
}

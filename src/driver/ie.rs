//! Core protocol engine
//!
//! [`Ie`] owns all host-side protocol state and the two injected ports. It
//! is the only type that touches the shared region; the receive, transmit
//! and command paths are `impl` extensions in their own modules.
//!
//! # Usage
//!
//! ```ignore
//! use ie586::{Ie, IeConfig};
//!
//! let mut engine: Ie<_, _, 16, 48, 2> = Ie::new(bus, dev);
//! engine.init(IeConfig::new(96 * 1024), &mut delay)?;
//! engine.transmit(&frame)?;
//! // from the interrupt service routine:
//! engine.handle_interrupt(&mut sink);
//! ```

use embedded_hal::delay::DelayNs;

use crate::driver::config::{IeConfig, State};
use crate::driver::interrupt::ScbStatus;
use crate::error::{CmdError, ConfigError, Result};
use crate::hal::{AttentionKind, BarrierKind, DevicePort, FrameSink, IntrPhase, MemoryPort, ResetKind};
use crate::internal::constants::{MAC_ADDR_LEN, MAX_FRAME_SIZE, MAX_MCAST, SCB_ACCEPT_SPINS};
use crate::internal::layout::ShmemLayout;
use crate::internal::ring::RingCursor;
use crate::internal::wire::{iscp, scb, scp};

use super::command::{DeferredCmds, GenCmd};

/// Event counters maintained by the engine.
///
/// The four hardware tallies (CRC, alignment, no-resource, overrun) are
/// harvested out of the SCB during receive drains and accumulated here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Counters {
    /// Frames delivered upstream
    pub rx_frames: u32,
    /// Frames completed with an error status and dropped
    pub rx_dropped: u32,
    /// Frames dropped for a corrupt or over-long buffer chain
    pub rx_malformed: u32,
    /// Receive ring reinitializations after resource exhaustion
    pub rx_restarts: u32,
    /// Transmit commands completed ok
    pub tx_frames: u32,
    /// Transmit commands completed with an error status
    pub tx_errors: u32,
    /// Synchronous commands that exceeded the poll bound
    pub cmd_timeouts: u32,
    /// Asynchronous commands that completed without the OK bit
    pub cmd_failures: u32,
    /// CRC error tally harvested from the SCB
    pub crc_errors: u32,
    /// Alignment error tally harvested from the SCB
    pub align_errors: u32,
    /// Frames the coprocessor discarded for lack of descriptors
    pub no_resources: u32,
    /// Receive DMA overruns harvested from the SCB
    pub overruns: u32,
}

/// Host-side protocol engine for an i82586-class coprocessor.
///
/// Const generic parameters fix the ring depths at compile time:
/// `NFRAMES` receive frame descriptors, `NRXBUF` receive buffer
/// descriptors (≥ `NFRAMES`), `NTXBUF` transmit slots (≥ 2).
///
/// The engine is not reentrant; interrupt-safe sharing is provided by
/// [`SharedIe`](crate::sync::SharedIe) under the `critical-section`
/// feature.
pub struct Ie<M, D, const NFRAMES: usize, const NRXBUF: usize, const NTXBUF: usize>
where
    M: MemoryPort,
    D: DevicePort,
{
    pub(crate) bus: M,
    pub(crate) dev: D,
    pub(crate) config: IeConfig,
    pub(crate) state: State,
    pub(crate) layout: ShmemLayout,

    /// Receive frame descriptor cursor (tail consumes, head holds EOL)
    pub(crate) rfa: RingCursor<NFRAMES>,
    /// Receive buffer descriptor cursor, same convention
    pub(crate) rbufs: RingCursor<NRXBUF>,
    /// Transmit slot cursor (head submits, tail reclaims)
    pub(crate) tx: RingCursor<NTXBUF>,

    pub(crate) mac_addr: [u8; MAC_ADDR_LEN],
    pub(crate) promiscuous: bool,
    pub(crate) mcast: [[u8; MAC_ADDR_LEN]; MAX_MCAST],
    pub(crate) mcast_len: usize,

    /// Asynchronous command the interrupt handler must observe
    pub(crate) async_cmd: Option<GenCmd>,
    /// Commands waiting for the transmit queue to drain
    pub(crate) deferred: DeferredCmds,

    pub(crate) counters: Counters,
    /// Reassembly buffer lent to the frame sink
    pub(crate) assembly: [u8; MAX_FRAME_SIZE],
}

impl<M, D, const NFRAMES: usize, const NRXBUF: usize, const NTXBUF: usize>
    Ie<M, D, NFRAMES, NRXBUF, NTXBUF>
where
    M: MemoryPort,
    D: DevicePort,
{
    /// Creates an engine bound to the given ports.
    ///
    /// Nothing is written to shared memory until [`init`](Self::init).
    pub const fn new(bus: M, dev: D) -> Self {
        Self {
            bus,
            dev,
            config: IeConfig::new(0),
            state: State::Uninitialized,
            layout: ShmemLayout::EMPTY,
            rfa: RingCursor::new(),
            rbufs: RingCursor::new(),
            tx: RingCursor::new(),
            mac_addr: [0; MAC_ADDR_LEN],
            promiscuous: false,
            mcast: [[0; MAC_ADDR_LEN]; MAX_MCAST],
            mcast_len: 0,
            async_cmd: None,
            deferred: DeferredCmds::new(),
            counters: Counters {
                rx_frames: 0,
                rx_dropped: 0,
                rx_malformed: 0,
                rx_restarts: 0,
                tx_frames: 0,
                tx_errors: 0,
                cmd_timeouts: 0,
                cmd_failures: 0,
                crc_errors: 0,
                align_errors: 0,
                no_resources: 0,
                overruns: 0,
            },
            assembly: [0; MAX_FRAME_SIZE],
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Resets the coprocessor and brings the protocol up.
    ///
    /// Writes the SCP → ISCP → SCB handshake chain, builds the receive ring
    /// and transmit slots, releases the device, waits for the coprocessor to
    /// consume the chain, then loads configuration and station address with
    /// synchronous commands and starts the receive unit.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::AlreadyInitialized`] if called twice
    /// - [`ConfigError::InvalidRingDepth`] / [`ConfigError::InsufficientMemory`]
    ///   from layout computation
    /// - [`CmdError::Timeout`] if the coprocessor never responds
    pub fn init<DLY: DelayNs>(&mut self, config: IeConfig, delay: &mut DLY) -> Result<()> {
        if self.state != State::Uninitialized {
            return Err(ConfigError::AlreadyInitialized.into());
        }

        self.layout = ShmemLayout::compute(NFRAMES, NRXBUF, NTXBUF, config.mem_size)?;
        self.config = config;
        self.mac_addr = config.mac_address;
        self.promiscuous = config.promiscuous;

        self.dev.reset(ResetKind::Full);

        // Handshake chain. The coprocessor reads the SCP at its fixed
        // offset, follows it to the ISCP, and clears the ISCP busy word
        // once the SCB offset and base are latched.
        let l = self.layout;
        self.bus.write16(l.scp + scp::SYSBUS, scp::SYSBUS_16BIT);
        self.bus.write24(l.scp + scp::ISCP, l.iscp as u32);

        self.bus.write16(l.iscp + iscp::BUSY, 1);
        self.bus.write16(l.iscp + iscp::SCB, l.scb as u16);
        self.bus.write24(l.iscp + iscp::BASE, 0);

        for word in (0..scb::SIZE).step_by(2) {
            self.bus.write16(l.scb + word, 0);
        }

        self.build_rx_ring();
        self.build_tx_slots();
        self.wmb(0, l.total);

        self.dev.init();
        self.dev.attention(AttentionKind::Command);

        let mut consumed = false;
        for _ in 0..config.cmd_poll_limit {
            self.rmb(l.iscp + iscp::BUSY, 2);
            if self.bus.read16(l.iscp + iscp::BUSY) == 0 {
                consumed = true;
                break;
            }
            delay.delay_us(config.cmd_poll_interval_us);
        }
        if !consumed {
            self.counters.cmd_timeouts += 1;
            return Err(CmdError::Timeout.into());
        }

        // The coprocessor raises CX/CNA after consuming the chain
        let pending = self.bus.read16(l.scb + scb::STATUS) & scb::ST_WHENCE;
        if pending != 0 {
            self.scb_ack(pending);
        }

        self.submit_sync(GenCmd::Configure, delay)?;
        self.submit_sync(GenCmd::AddressSetup, delay)?;

        // Hand the receive ring to the coprocessor
        self.bus.write16(l.scb + scb::RFA, l.rframes as u16);
        if !self.scb_command(scb::RUC_START) {
            self.counters.cmd_timeouts += 1;
            return Err(CmdError::Timeout.into());
        }

        self.state = State::Running;
        Ok(())
    }

    // =========================================================================
    // Interrupt Handling
    // =========================================================================

    /// Processes all pending interrupt causes until the status word reads
    /// quiescent.
    ///
    /// Safe to call spuriously; returns immediately when no cause is
    /// latched or the engine is not running. Reassembled frames are
    /// delivered to `sink` in arrival order.
    pub fn handle_interrupt<S: FrameSink>(&mut self, sink: &mut S) {
        if self.state != State::Running {
            return;
        }
        self.dev.intr_hook(IntrPhase::Enter);

        loop {
            let l = self.layout;
            self.rmb(l.scb + scb::STATUS, 2);
            let raw = self.bus.read16(l.scb + scb::STATUS) & scb::ST_WHENCE;
            let status = ScbStatus::from_raw(raw);
            if !status.any() {
                break;
            }

            self.dev.intr_hook(IntrPhase::Ack);
            self.scb_ack(status.to_ack());

            if status.frame_received {
                self.rx_drain(sink);
            }
            if status.cmd_complete || status.unit_idle {
                self.tx_reclaim();
                self.service_async_cmd();
            }
            if status.receiver_not_ready {
                self.rx_recover();
            }

            self.dev.intr_hook(IntrPhase::Loop);
        }

        self.dev.intr_hook(IntrPhase::Exit);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current lifecycle state.
    pub const fn state(&self) -> State {
        self.state
    }

    /// Event counters accumulated since initialization.
    pub const fn counters(&self) -> Counters {
        self.counters
    }

    /// Station MAC address currently programmed (or staged).
    pub const fn mac_address(&self) -> [u8; MAC_ADDR_LEN] {
        self.mac_addr
    }

    /// Active multicast filter list.
    pub fn multicast_list(&self) -> &[[u8; MAC_ADDR_LEN]] {
        &self.mcast[..self.mcast_len]
    }

    /// Consumes the engine and returns the ports.
    pub fn release(self) -> (M, D) {
        (self.bus, self.dev)
    }

    // =========================================================================
    // SCB Helpers
    // =========================================================================

    /// Write barrier over `len` bytes at `offset`.
    pub(crate) fn wmb(&mut self, offset: usize, len: usize) {
        self.bus.barrier(offset, len, BarrierKind::Write);
    }

    /// Read barrier over `len` bytes at `offset`.
    pub(crate) fn rmb(&mut self, offset: usize, len: usize) {
        self.bus.barrier(offset, len, BarrierKind::Read);
    }

    /// Spins until the coprocessor has accepted the previous SCB command
    /// word (it zeroes the word on acceptance). Returns false if the bound
    /// is exceeded.
    pub(crate) fn scb_wait_accept(&mut self) -> bool {
        let off = self.layout.scb + scb::CMD;
        for _ in 0..SCB_ACCEPT_SPINS {
            self.rmb(off, 2);
            if self.bus.read16(off) == 0 {
                return true;
            }
        }
        false
    }

    /// Issues an SCB command word and raises channel attention.
    pub(crate) fn scb_command(&mut self, cmd: u16) -> bool {
        let off = self.layout.scb + scb::CMD;
        self.bus.write16(off, cmd);
        self.wmb(off, 2);
        self.dev.attention(AttentionKind::Command);
        self.scb_wait_accept()
    }

    /// Acknowledges the given cause bits through the SCB command word.
    pub(crate) fn scb_ack(&mut self, bits: u16) {
        let off = self.layout.scb + scb::CMD;
        self.bus.write16(off, bits & scb::ST_WHENCE);
        self.wmb(off, 2);
        self.dev.attention(AttentionKind::Ack);
        if !self.scb_wait_accept() {
            #[cfg(feature = "log")]
            log::warn!("scb ack not accepted");
        }
    }

    /// True when the command unit status field reads active.
    pub(crate) fn cu_active(&mut self) -> bool {
        let off = self.layout.scb + scb::STATUS;
        self.rmb(off, 2);
        self.bus.read16(off) & scb::CUS_MASK == scb::CUS_ACTIVE
    }
}

// =============================================================================
// Simulation Tests
// =============================================================================

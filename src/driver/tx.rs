//! Transmit engine
//!
//! Each of the `NTXBUF` slots is a {Transmit command, NoOp command, buffer
//! descriptor, buffer} quadruple. The coprocessor's command unit is kept on
//! an always-terminated chain: every transmit command links to its own
//! NoOp, and that NoOp links to itself until the next submission splices a
//! new command behind it. The command unit therefore idles spinning on a
//! NoOp rather than stopping, and submission never has to stop and restart
//! the unit in the common case.
//!
//! # Splice ordering
//!
//! A submission writes the whole new slot (command, buffer descriptor,
//! buffer, self-looped NoOp) and issues a barrier *before* rewriting the
//! resting NoOp's link, and barriers again before raising channel
//! attention. The coprocessor can follow the new link the instant it is
//! written, so everything it leads to must already be visible.

use crate::driver::config::State;
use crate::driver::ie::Ie;
use crate::error::{TxError, TxResult};
use crate::hal::{AttentionKind, DevicePort, MemoryPort};
use crate::internal::constants::{MIN_FRAME_SIZE, TBUF_SIZE};
use crate::internal::ring::RingCursor;
use crate::internal::wire::{cmd, scb, stat, tbd, xmit, NULL_OFFSET};

impl<M, D, const NFRAMES: usize, const NRXBUF: usize, const NTXBUF: usize>
    Ie<M, D, NFRAMES, NRXBUF, NTXBUF>
where
    M: MemoryPort,
    D: DevicePort,
{
    /// Writes the initial transmit slot structures: every NoOp self-looped,
    /// commands and buffer descriptors idle.
    pub(crate) fn build_tx_slots(&mut self) {
        let l = self.layout;
        for i in 0..NTXBUF {
            let n = l.nop(i);
            self.bus.write16(n + cmd::STATUS, 0);
            self.bus.write16(n + cmd::OP, cmd::OP_NOP);
            self.bus.write16(n + cmd::LINK, n as u16);

            let x = l.xmit(i);
            self.bus.write16(x + cmd::STATUS, 0);
            self.bus.write16(x + cmd::OP, cmd::OP_NOP);
            self.bus.write16(x + cmd::LINK, NULL_OFFSET);
            self.bus.write16(x + xmit::TBD, NULL_OFFSET);

            let b = l.xbd(i);
            self.bus.write16(b + tbd::COUNT, 0);
            self.bus.write16(b + tbd::NEXT, NULL_OFFSET);
            self.bus.write24(b + tbd::BUFFER, l.xbuf(i) as u32);
        }
        self.tx.reset();
    }

    /// Submits one frame for transmission.
    ///
    /// Frames shorter than the Ethernet minimum are zero-padded to 60
    /// bytes. Returns [`TxError::RingFull`] when every slot is pending;
    /// the caller decides whether to retry or drop.
    pub fn transmit(&mut self, frame: &[u8]) -> TxResult<()> {
        if self.state != State::Running {
            return Err(TxError::InvalidState);
        }
        if frame.is_empty() {
            return Err(TxError::InvalidLength);
        }
        if frame.len() > TBUF_SIZE {
            return Err(TxError::FrameTooLarge);
        }
        if self.tx.is_full() {
            return Err(TxError::RingFull);
        }

        let slot = self.tx.push();
        let l = self.layout;

        let mut len = frame.len();
        self.bus.copy_out(l.xbuf(slot), frame);
        if len < MIN_FRAME_SIZE {
            let pad = [0u8; MIN_FRAME_SIZE];
            self.bus.copy_out(l.xbuf(slot) + len, &pad[len..]);
            len = MIN_FRAME_SIZE;
        }

        let b = l.xbd(slot);
        self.bus.write16(b + tbd::COUNT, len as u16 | tbd::FL_EOF);
        self.bus.write16(b + tbd::NEXT, NULL_OFFSET);
        self.bus.write24(b + tbd::BUFFER, l.xbuf(slot) as u32);

        // Fresh self-looped resting point for this slot. Also clears any
        // stale link left from the slot's previous trip around the ring.
        let n = l.nop(slot);
        self.bus.write16(n + cmd::STATUS, 0);
        self.bus.write16(n + cmd::OP, cmd::OP_NOP);
        self.bus.write16(n + cmd::LINK, n as u16);

        let x = l.xmit(slot);
        self.bus.write16(x + cmd::STATUS, 0);
        self.bus.write16(x + cmd::OP, cmd::OP_TRANSMIT | cmd::FL_INTR);
        self.bus.write16(x + cmd::LINK, n as u16);
        self.bus.write16(x + xmit::TBD, b as u16);

        // Everything the new link leads to must be visible first
        self.wmb(l.nops, l.gencmd - l.nops);

        let resting = l.nop(RingCursor::<NTXBUF>::prev(slot));
        self.bus.write16(resting + cmd::LINK, x as u16);
        self.wmb(resting + cmd::LINK, 2);

        if self.cu_active() {
            self.dev.attention(AttentionKind::Command);
        } else {
            self.bus.write16(l.scb + scb::CBL, x as u16);
            if !self.scb_command(scb::CUC_START) {
                self.counters.cmd_timeouts += 1;
            }
        }

        Ok(())
    }

    /// Reclaims completed transmit commands from the tail and restarts the
    /// command unit if it drained while work was still queued.
    pub(crate) fn tx_reclaim(&mut self) {
        while !self.tx.is_empty() {
            let x = self.layout.xmit(self.tx.tail);
            self.rmb(x, 2);
            let status = self.bus.read16(x + cmd::STATUS);
            if status & stat::COMPLETE == 0 {
                break;
            }
            if status & stat::OK != 0 {
                self.counters.tx_frames += 1;
            } else {
                self.counters.tx_errors += 1;
                #[cfg(feature = "log")]
                log::debug!("tx: command completed with error status");
            }
            self.bus.write16(x + cmd::STATUS, 0);
            self.wmb(x + cmd::STATUS, 2);
            self.tx.pop();
        }
        self.restart_cu_if_pending();
    }

    /// Covers the window where the command unit goes idle between a
    /// completion and our splice of the next command: if slots are still
    /// pending but the unit is not active, restart it at the oldest one.
    pub(crate) fn restart_cu_if_pending(&mut self) {
        if self.tx.is_empty() || self.async_cmd.is_some() || self.cu_active() {
            return;
        }
        let x = self.layout.xmit(self.tx.tail);
        self.rmb(x, 2);
        if self.bus.read16(x + cmd::STATUS) & (stat::COMPLETE | stat::BUSY) != 0 {
            return;
        }
        let scb_off = self.layout.scb;
        self.bus.write16(scb_off + scb::CBL, x as u16);
        if !self.scb_command(scb::CUC_START) {
            self.counters.cmd_timeouts += 1;
            #[cfg(feature = "log")]
            log::warn!("tx: command unit restart not accepted");
        }
    }
}

// =============================================================================
// Simulation Tests
// =============================================================================

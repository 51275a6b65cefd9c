//! Receive engine
//!
//! Drains completed receive frame descriptors at the ring tail, reassembles
//! multi-segment frames into the host buffer, delivers them upstream and
//! recycles descriptors at the ring head. Also owns ring-starvation
//! recovery and the SCB error-counter harvest.
//!
//! # Ring discipline
//!
//! Both receive rings keep their end-of-list flag one element behind the
//! consumption point. Recycling a consumed element moves the flag onto it
//! first and only then clears the previous carrier, so the coprocessor
//! never observes a ring without a terminator.

use crate::driver::ie::Ie;
use crate::hal::{DevicePort, FrameSink, MemoryPort};
use crate::internal::constants::{MAX_RX_SEGS, RBUF_SIZE};
use crate::internal::ring::RingCursor;
use crate::internal::wire::{rbd, rfd, scb, stat, NULL_OFFSET};

impl<M, D, const NFRAMES: usize, const NRXBUF: usize, const NTXBUF: usize>
    Ie<M, D, NFRAMES, NRXBUF, NTXBUF>
where
    M: MemoryPort,
    D: DevicePort,
{
    /// Writes the initial receive linkage: circular RFD list with the
    /// end-of-list flag on the last element, first RFD pointing at the
    /// buffer descriptor chain, all other RFDs with a null buffer pointer.
    pub(crate) fn build_rx_ring(&mut self) {
        let l = self.layout;

        for i in 0..NFRAMES {
            let f = l.rfd(i);
            self.bus.write16(f + rfd::STATUS, 0);
            let last = if i == NFRAMES - 1 { rfd::FL_EOL } else { 0 };
            self.bus.write16(f + rfd::LAST, last);
            self.bus.write16(f + rfd::LINK, l.rfd(RingCursor::<NFRAMES>::next(i)) as u16);
            let first_rbd = if i == 0 { l.rbd(0) as u16 } else { NULL_OFFSET };
            self.bus.write16(f + rfd::RBD, first_rbd);
        }

        for i in 0..NRXBUF {
            let b = l.rbd(i);
            self.bus.write16(b + rbd::COUNT, 0);
            self.bus.write16(b + rbd::NEXT, l.rbd(RingCursor::<NRXBUF>::next(i)) as u16);
            self.bus.write24(b + rbd::BUFFER, l.rbuf(i) as u32);
            let el = if i == NRXBUF - 1 { rbd::FL_EL } else { 0 };
            self.bus.write16(b + rbd::LEN, RBUF_SIZE as u16 | el);
        }

        self.rfa.reset_rx();
        self.rbufs.reset_rx();
        self.wmb(l.rframes, l.nops - l.rframes);
    }

    /// Processes every completed frame descriptor at the tail.
    pub(crate) fn rx_drain<S: FrameSink>(&mut self, sink: &mut S) {
        loop {
            let idx = self.rfa.tail;
            let f = self.layout.rfd(idx);
            self.rmb(f, rfd::SIZE);
            let status = self.bus.read16(f + rfd::STATUS);
            if status & stat::COMPLETE == 0 {
                break;
            }

            if status & stat::OK != 0 {
                match self.rx_read_frame() {
                    Ok((len, nsegs)) => {
                        sink.frame_received(&self.assembly[..len]);
                        self.counters.rx_frames += 1;
                        self.rx_recycle(idx, nsegs);
                    }
                    Err(nsegs) => {
                        self.counters.rx_malformed += 1;
                        #[cfg(feature = "log")]
                        log::warn!("rx: malformed buffer chain, frame dropped");
                        self.rx_recycle(idx, nsegs);
                    }
                }
            } else {
                let nsegs = self.rx_chain_len();
                self.counters.rx_dropped += 1;
                #[cfg(feature = "log")]
                log::debug!("rx: frame with error status dropped");
                self.rx_recycle(idx, nsegs);
            }
        }

        self.harvest_scb_counters();
    }

    /// Copies one frame's segments into the assembly buffer.
    ///
    /// Returns the frame length and the number of buffer descriptors
    /// consumed, or the number walked when the chain is corrupt (missing
    /// used bit, over-long, or oversized for the assembly buffer).
    fn rx_read_frame(&mut self) -> core::result::Result<(usize, usize), usize> {
        let l = self.layout;
        let mut len = 0usize;
        let mut nsegs = 0usize;

        loop {
            if nsegs == MAX_RX_SEGS {
                return Err(nsegs);
            }
            let idx = (self.rbufs.tail + nsegs) % NRXBUF;
            let b = l.rbd(idx);
            self.rmb(b, rbd::SIZE);
            let count = self.bus.read16(b + rbd::COUNT);
            if count & rbd::FL_USED == 0 {
                return Err(nsegs);
            }
            nsegs += 1;

            let actual = (count & rbd::COUNT_MASK) as usize;
            if actual > RBUF_SIZE || len + actual > self.assembly.len() {
                return Err(nsegs);
            }
            self.bus.copy_in(l.rbuf(idx), &mut self.assembly[len..len + actual]);
            len += actual;

            if count & rbd::FL_EOF != 0 {
                return Ok((len, nsegs));
            }
        }
    }

    /// Counts the buffer descriptors an errored frame consumed, without
    /// copying.
    fn rx_chain_len(&mut self) -> usize {
        let l = self.layout;
        let mut nsegs = 0usize;
        while nsegs < MAX_RX_SEGS {
            let b = l.rbd((self.rbufs.tail + nsegs) % NRXBUF);
            self.rmb(b, rbd::SIZE);
            let count = self.bus.read16(b + rbd::COUNT);
            if count & rbd::FL_USED == 0 {
                break;
            }
            nsegs += 1;
            if count & rbd::FL_EOF != 0 {
                break;
            }
        }
        nsegs
    }

    /// Returns the consumed frame descriptor and its buffer descriptors to
    /// the coprocessor at the ring head.
    fn rx_recycle(&mut self, idx: usize, nsegs: usize) {
        let l = self.layout;

        // Frame descriptor: becomes the new end of list
        let f = l.rfd(idx);
        self.bus.write16(f + rfd::STATUS, 0);
        self.bus.write16(f + rfd::RBD, NULL_OFFSET);
        self.bus.write16(f + rfd::LAST, rfd::FL_EOL);
        self.wmb(f, rfd::SIZE);

        let old = l.rfd(self.rfa.head);
        self.bus.write16(old + rfd::LAST, 0);
        self.wmb(old + rfd::LAST, 2);
        self.rfa.recycle();

        // Buffer descriptors, one at a time in consumption order
        for _ in 0..nsegs {
            let b = l.rbd(self.rbufs.tail);
            self.bus.write16(b + rbd::COUNT, 0);
            self.bus.write16(b + rbd::LEN, RBUF_SIZE as u16 | rbd::FL_EL);
            self.wmb(b, rbd::SIZE);

            let prev = l.rbd(self.rbufs.head);
            self.bus.write16(prev + rbd::LEN, RBUF_SIZE as u16);
            self.wmb(prev + rbd::LEN, 2);
            self.rbufs.recycle();
        }
    }

    /// Rebuilds the receive side after the coprocessor reports resource
    /// exhaustion and restarts the receive unit at the ring base.
    ///
    /// Frames already delivered are not replayed; anything the coprocessor
    /// had buffered but not completed is lost and shows up in the hardware
    /// no-resource tally.
    pub(crate) fn rx_recover(&mut self) {
        self.counters.rx_restarts += 1;
        #[cfg(feature = "log")]
        log::warn!("rx: ring starvation, reinitializing receive ring");

        let l = self.layout;
        self.build_rx_ring();
        self.bus.write16(l.scb + scb::RFA, l.rframes as u16);
        if !self.scb_command(scb::RUC_START) {
            self.counters.cmd_timeouts += 1;
            #[cfg(feature = "log")]
            log::warn!("rx: receive unit restart not accepted");
        }
    }

    /// Folds the SCB error tallies into the host counters and zeroes them.
    fn harvest_scb_counters(&mut self) {
        let l = self.layout;
        let pairs = [
            (scb::CRC_ERRS, 0usize),
            (scb::ALIGN_ERRS, 1),
            (scb::NO_RESOURCES, 2),
            (scb::OVERRUNS, 3),
        ];
        for (off, which) in pairs {
            let v = self.bus.read16(l.scb + off);
            if v == 0 {
                continue;
            }
            self.bus.write16(l.scb + off, 0);
            let tally = match which {
                0 => &mut self.counters.crc_errors,
                1 => &mut self.counters.align_errors,
                2 => &mut self.counters.no_resources,
                _ => &mut self.counters.overruns,
            };
            *tally += u32::from(v);
        }
    }
}

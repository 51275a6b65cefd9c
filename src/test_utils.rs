//! Testing utilities and mock implementations
//!
//! This module provides mock ports and a simulated coprocessor for testing
//! the engine on the host without hardware access. The simulator interprets
//! the same shared-memory structures the real device does: it consumes the
//! handshake chain, walks command chains, produces received frames into the
//! receive rings and latches cause bits in the SCB.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use std::cell::RefCell;
use std::rc::Rc;
use std::vec;
use std::vec::Vec;

use crate::hal::{
    AttentionKind, BarrierKind, DevicePort, FrameSink, IntrPhase, MemoryPort, ResetKind,
};
use crate::internal::constants::{MAC_ADDR_LEN, RBUF_SIZE};
use crate::internal::layout::ShmemLayout;
use crate::internal::wire::{cmd, conf, ia, iscp, mcast, rbd, rfd, scb, stat, tbd, xmit, NULL_OFFSET};

// =============================================================================
// Shared State
// =============================================================================

/// Shared memory region both sides of the simulation access
pub type SharedMem = Rc<RefCell<Vec<u8>>>;

/// Shared event trace recording bus writes and attention signals
pub type SharedTrace = Rc<RefCell<Vec<TraceEvent>>>;

/// One observable interaction with the simulated hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// 16-bit word written at the given region offset
    Write16 { offset: usize },
    /// Channel attention raised
    Attention,
}

pub fn shared_mem(size: usize) -> SharedMem {
    Rc::new(RefCell::new(vec![0u8; size]))
}

fn mem_r16(mem: &SharedMem, off: usize) -> u16 {
    let m = mem.borrow();
    u16::from_le_bytes([m[off], m[off + 1]])
}

fn mem_w16(mem: &SharedMem, off: usize, value: u16) {
    let mut m = mem.borrow_mut();
    m[off..off + 2].copy_from_slice(&value.to_le_bytes());
}

fn mem_r24(mem: &SharedMem, off: usize) -> usize {
    let m = mem.borrow();
    (u32::from_le_bytes([m[off], m[off + 1], m[off + 2], m[off + 3]]) & 0x00ff_ffff) as usize
}

// =============================================================================
// Mock Memory Port
// =============================================================================

/// Memory port backed by a host `Vec`, recording every word write.
pub struct SimBus {
    mem: SharedMem,
    trace: SharedTrace,
}

impl SimBus {
    pub fn new(mem: SharedMem, trace: SharedTrace) -> Self {
        Self { mem, trace }
    }
}

impl MemoryPort for SimBus {
    fn read16(&self, offset: usize) -> u16 {
        mem_r16(&self.mem, offset)
    }

    fn write16(&mut self, offset: usize, value: u16) {
        self.trace.borrow_mut().push(TraceEvent::Write16 { offset });
        mem_w16(&self.mem, offset, value);
    }

    fn write24(&mut self, offset: usize, value: u32) {
        let mut m = self.mem.borrow_mut();
        m[offset..offset + 4].copy_from_slice(&(value & 0x00ff_ffff).to_le_bytes());
    }

    fn copy_in(&self, offset: usize, buf: &mut [u8]) {
        let m = self.mem.borrow();
        buf.copy_from_slice(&m[offset..offset + buf.len()]);
    }

    fn copy_out(&mut self, offset: usize, buf: &[u8]) {
        let mut m = self.mem.borrow_mut();
        m[offset..offset + buf.len()].copy_from_slice(buf);
    }

    fn barrier(&mut self, _offset: usize, _len: usize, _kind: BarrierKind) {
        // Host memory is coherent; ordering is checked through the trace
    }
}

// =============================================================================
// Simulated Coprocessor
// =============================================================================

/// Interpreter for the shared-memory protocol.
///
/// In eager mode (the default) every channel attention runs the command
/// unit to quiescence, which makes synchronous polls succeed immediately.
/// Manual mode only latches SCB commands; tests then advance the command
/// unit one command at a time with [`step_cu`](Self::step_cu) to exercise
/// adversarial interleavings.
pub struct SimCoprocessor {
    mem: SharedMem,
    layout: ShmemLayout,
    nframes: usize,
    nrxbuf: usize,
    eager: bool,

    /// Offset of the command the command unit sits on, if started
    cu: Option<usize>,
    ru_ready: bool,
    rfd_cursor: usize,
    rbd_cursor: usize,

    /// Frames taken off transmit commands, in execution order
    pub transmitted: Vec<Vec<u8>>,
    /// Chain offsets the command unit followed, for link-integrity checks
    pub followed_links: Vec<usize>,
    pub last_iasetup: Option<[u8; MAC_ADDR_LEN]>,
    pub last_config: Option<[u8; conf::DATA_LEN]>,
    pub last_mcast: Vec<[u8; MAC_ADDR_LEN]>,
    /// Receive unit restarts observed (RUC start commands)
    pub ru_starts: usize,
}

impl SimCoprocessor {
    pub fn new(mem: SharedMem, nframes: usize, nrxbuf: usize, ntxbuf: usize) -> Self {
        let size = mem.borrow().len();
        let layout = ShmemLayout::compute(nframes, nrxbuf, ntxbuf, size).unwrap();
        Self {
            mem,
            layout,
            nframes,
            nrxbuf,
            eager: true,
            cu: None,
            ru_ready: false,
            rfd_cursor: 0,
            rbd_cursor: 0,
            transmitted: Vec::new(),
            followed_links: Vec::new(),
            last_iasetup: None,
            last_config: None,
            last_mcast: Vec::new(),
            ru_starts: 0,
        }
    }

    pub fn set_eager(&mut self, eager: bool) {
        self.eager = eager;
    }

    pub fn layout(&self) -> ShmemLayout {
        self.layout
    }

    fn r16(&self, off: usize) -> u16 {
        mem_r16(&self.mem, off)
    }

    fn w16(&self, off: usize, value: u16) {
        mem_w16(&self.mem, off, value);
    }

    fn set_status_bits(&self, bits: u16) {
        let off = self.layout.scb + scb::STATUS;
        self.w16(off, self.r16(off) | bits);
    }

    fn clear_status_bits(&self, bits: u16) {
        let off = self.layout.scb + scb::STATUS;
        self.w16(off, self.r16(off) & !bits);
    }

    fn set_cu_active(&self, active: bool) {
        let off = self.layout.scb + scb::STATUS;
        let mut s = self.r16(off) & !scb::CUS_MASK;
        if active {
            s |= scb::CUS_ACTIVE;
        }
        self.w16(off, s);
    }

    fn set_ru_ready_field(&self, ready: bool) {
        let off = self.layout.scb + scb::STATUS;
        let mut s = self.r16(off) & !scb::RUS_MASK;
        if ready {
            s |= scb::RUS_READY;
        }
        self.w16(off, s);
    }

    /// Reacts to channel attention: consumes the handshake chain on first
    /// contact, acknowledges causes, latches unit-start commands and zeroes
    /// the SCB command word.
    pub fn on_attention(&mut self) {
        let l = self.layout;

        if self.r16(l.iscp + iscp::BUSY) == 1 {
            self.w16(l.iscp + iscp::BUSY, 0);
            self.set_status_bits(scb::ST_CX | scb::ST_CNA);
        }

        let command = self.r16(l.scb + scb::CMD);
        if command != 0 {
            let ack = command & scb::ST_WHENCE;
            if ack != 0 {
                self.clear_status_bits(ack);
            }
            if command & scb::CUC_START != 0 {
                self.cu = Some(self.r16(l.scb + scb::CBL) as usize);
                self.set_cu_active(true);
            }
            if command & scb::RUC_START != 0 {
                let rfa = self.r16(l.scb + scb::RFA) as usize;
                self.rfd_cursor = l.rfd_index(rfa);
                let first = self.r16(rfa + rfd::RBD);
                self.rbd_cursor = if first == NULL_OFFSET {
                    0
                } else {
                    l.rbd_index(first as usize)
                };
                self.ru_ready = true;
                self.set_ru_ready_field(true);
                self.ru_starts += 1;
            }
            self.w16(l.scb + scb::CMD, 0);
        }

        if self.eager {
            self.run_cu(10_000);
        }
    }

    /// Executes one command. Returns false when the unit is idle or
    /// resting on a self-looped NoOp.
    pub fn step_cu(&mut self) -> bool {
        let Some(off) = self.cu else {
            return false;
        };
        let op = self.r16(off + cmd::OP);
        let link = self.r16(off + cmd::LINK) as usize;

        match op & cmd::OP_MASK {
            x if x == cmd::OP_NOP => {
                if link == off {
                    return false;
                }
                assert_ne!(link, NULL_OFFSET as usize, "NoOp link dangling");
                self.followed_links.push(link);
                self.cu = Some(link);
                true
            }
            x if x == cmd::OP_TRANSMIT => {
                let b = self.r16(off + xmit::TBD) as usize;
                assert_ne!(b, NULL_OFFSET as usize, "transmit without buffer descriptor");
                let count = self.r16(b + tbd::COUNT);
                let len = (count & tbd::COUNT_MASK) as usize;
                let buf = mem_r24(&self.mem, b + tbd::BUFFER);
                let bytes = self.mem.borrow()[buf..buf + len].to_vec();
                self.transmitted.push(bytes);
                self.w16(off + cmd::STATUS, stat::COMPLETE | stat::OK);
                self.finish_cmd(op, link)
            }
            other => {
                match other {
                    x if x == cmd::OP_IASETUP => {
                        let mut addr = [0u8; MAC_ADDR_LEN];
                        addr.copy_from_slice(
                            &self.mem.borrow()[off + ia::ADDR..off + ia::ADDR + MAC_ADDR_LEN],
                        );
                        self.last_iasetup = Some(addr);
                    }
                    x if x == cmd::OP_CONFIGURE => {
                        let mut bytes = [0u8; conf::DATA_LEN];
                        bytes.copy_from_slice(
                            &self.mem.borrow()[off + conf::DATA..off + conf::DATA + conf::DATA_LEN],
                        );
                        self.last_config = Some(bytes);
                    }
                    x if x == cmd::OP_MCSETUP => {
                        let count = self.r16(off + mcast::COUNT) as usize;
                        self.last_mcast.clear();
                        for i in 0..count / MAC_ADDR_LEN {
                            let start = off + mcast::ADDRS + i * MAC_ADDR_LEN;
                            let mut addr = [0u8; MAC_ADDR_LEN];
                            addr.copy_from_slice(&self.mem.borrow()[start..start + MAC_ADDR_LEN]);
                            self.last_mcast.push(addr);
                        }
                    }
                    _ => {}
                }
                self.w16(off + cmd::STATUS, stat::COMPLETE | stat::OK);
                self.finish_cmd(op, link)
            }
        }
    }

    fn finish_cmd(&mut self, op: u16, link: usize) -> bool {
        if op & cmd::FL_INTR != 0 {
            self.set_status_bits(scb::ST_CX);
        }
        if op & cmd::FL_EL != 0 {
            self.cu = None;
            self.set_cu_active(false);
            self.set_status_bits(scb::ST_CNA);
        } else {
            assert_ne!(link, NULL_OFFSET as usize, "command link dangling");
            self.followed_links.push(link);
            self.cu = Some(link);
        }
        true
    }

    /// Runs the command unit until it rests or `limit` commands executed.
    pub fn run_cu(&mut self, limit: usize) {
        for _ in 0..limit {
            if !self.step_cu() {
                break;
            }
        }
    }

    /// Produces one received frame into the receive rings.
    ///
    /// Splits across 256-byte buffers exactly as the device would. Returns
    /// false (and latches receiver-not-ready) when descriptors are
    /// exhausted; a delivery that consumes the end-of-list descriptor also
    /// starves the unit.
    pub fn deliver_frame(&mut self, bytes: &[u8], ok: bool) -> bool {
        let l = self.layout;
        if !self.ru_ready {
            self.starve();
            return false;
        }

        let f = l.rfd(self.rfd_cursor);
        if self.r16(f + rfd::STATUS) & stat::COMPLETE != 0 {
            self.starve();
            return false;
        }

        let nsegs = bytes.len().div_ceil(RBUF_SIZE).max(1);
        for s in 0..nsegs {
            let b = l.rbd((self.rbd_cursor + s) % self.nrxbuf);
            if self.r16(b + rbd::COUNT) & rbd::FL_USED != 0 {
                self.starve();
                return false;
            }
        }

        for s in 0..nsegs {
            let idx = (self.rbd_cursor + s) % self.nrxbuf;
            let start = s * RBUF_SIZE;
            let end = bytes.len().min(start + RBUF_SIZE);
            let chunk = &bytes[start..end];
            self.mem.borrow_mut()[l.rbuf(idx)..l.rbuf(idx) + chunk.len()].copy_from_slice(chunk);
            let mut count = chunk.len() as u16 | rbd::FL_USED;
            if s == nsegs - 1 {
                count |= rbd::FL_EOF;
            }
            self.w16(l.rbd(idx) + rbd::COUNT, count);
        }
        self.rbd_cursor = (self.rbd_cursor + nsegs) % self.nrxbuf;

        let was_eol = self.r16(f + rfd::LAST) & rfd::FL_EOL != 0;
        self.w16(f + rfd::STATUS, stat::COMPLETE | if ok { stat::OK } else { 0 });
        self.rfd_cursor = (self.rfd_cursor + 1) % self.nframes;
        self.set_status_bits(scb::ST_FR);
        if was_eol {
            self.starve();
        }
        true
    }

    /// Produces a corrupted frame: the descriptor completes ok but its
    /// buffer chain never carries the end-of-frame flag, so the chain
    /// either runs past `nsegs` used segments or past the host's segment
    /// bound.
    pub fn deliver_runaway_chain(&mut self, nsegs: usize) -> bool {
        let l = self.layout;
        if !self.ru_ready {
            self.starve();
            return false;
        }

        let f = l.rfd(self.rfd_cursor);
        if self.r16(f + rfd::STATUS) & stat::COMPLETE != 0 {
            self.starve();
            return false;
        }

        for s in 0..nsegs {
            let b = l.rbd((self.rbd_cursor + s) % self.nrxbuf);
            if self.r16(b + rbd::COUNT) & rbd::FL_USED != 0 {
                self.starve();
                return false;
            }
        }

        for s in 0..nsegs {
            let idx = (self.rbd_cursor + s) % self.nrxbuf;
            self.w16(l.rbd(idx) + rbd::COUNT, RBUF_SIZE as u16 | rbd::FL_USED);
        }
        self.rbd_cursor = (self.rbd_cursor + nsegs) % self.nrxbuf;

        let was_eol = self.r16(f + rfd::LAST) & rfd::FL_EOL != 0;
        self.w16(f + rfd::STATUS, stat::COMPLETE | stat::OK);
        self.rfd_cursor = (self.rfd_cursor + 1) % self.nframes;
        self.set_status_bits(scb::ST_FR);
        if was_eol {
            self.starve();
        }
        true
    }

    fn starve(&mut self) {
        self.ru_ready = false;
        self.set_ru_ready_field(false);
        self.set_status_bits(scb::ST_RNR);
        let off = self.layout.scb + scb::NO_RESOURCES;
        self.w16(off, self.r16(off).wrapping_add(1));
    }

    /// True when the command unit is started (possibly resting on a NoOp).
    pub fn cu_started(&self) -> bool {
        self.cu.is_some()
    }

    /// True when the receive unit has resources.
    pub fn ru_ready(&self) -> bool {
        self.ru_ready
    }

    /// Drops the command unit to idle as if it drained its chain, for
    /// exercising the host's restart path.
    pub fn force_cu_idle(&mut self) {
        self.cu = None;
        self.set_cu_active(false);
        self.set_status_bits(scb::ST_CNA);
    }
}

// =============================================================================
// Mock Device Port
// =============================================================================

/// Device port that drives the simulated coprocessor directly.
pub struct SimDevice {
    copro: Rc<RefCell<SimCoprocessor>>,
    trace: SharedTrace,
    pub resets: Vec<ResetKind>,
    pub inits: usize,
    pub attentions: Vec<AttentionKind>,
    pub phases: Vec<IntrPhase>,
}

impl SimDevice {
    pub fn new(copro: Rc<RefCell<SimCoprocessor>>, trace: SharedTrace) -> Self {
        Self {
            copro,
            trace,
            resets: Vec::new(),
            inits: 0,
            attentions: Vec::new(),
            phases: Vec::new(),
        }
    }
}

impl DevicePort for SimDevice {
    fn reset(&mut self, kind: ResetKind) {
        self.resets.push(kind);
    }

    fn init(&mut self) {
        self.inits += 1;
    }

    fn attention(&mut self, kind: AttentionKind) {
        self.attentions.push(kind);
        self.trace.borrow_mut().push(TraceEvent::Attention);
        self.copro.borrow_mut().on_attention();
    }

    fn intr_hook(&mut self, phase: IntrPhase) {
        self.phases.push(phase);
    }
}

// =============================================================================
// Frame Sink and Delay
// =============================================================================

/// Sink collecting delivered frames.
#[derive(Debug, Default)]
pub struct VecSink {
    pub frames: Vec<Vec<u8>>,
}

impl FrameSink for VecSink {
    fn frame_received(&mut self, frame: &[u8]) {
        self.frames.push(frame.to_vec());
    }
}

/// Delay that does not sleep; simulation time is event-driven.
pub struct NoopDelay;

impl embedded_hal::delay::DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

// =============================================================================
// Harness
// =============================================================================

/// Everything a simulation test needs, wired together.
pub fn sim_rig(
    nframes: usize,
    nrxbuf: usize,
    ntxbuf: usize,
    mem_size: usize,
) -> (SimBus, SimDevice, Rc<RefCell<SimCoprocessor>>, SharedTrace) {
    let mem = shared_mem(mem_size);
    let trace: SharedTrace = Rc::new(RefCell::new(Vec::new()));
    let copro = Rc::new(RefCell::new(SimCoprocessor::new(
        Rc::clone(&mem),
        nframes,
        nrxbuf,
        ntxbuf,
    )));
    let bus = SimBus::new(mem, Rc::clone(&trace));
    let dev = SimDevice::new(Rc::clone(&copro), Rc::clone(&trace));
    (bus, dev, copro, trace)
}

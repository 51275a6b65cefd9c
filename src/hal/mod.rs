//! Hardware Abstraction Layer
//!
//! Capability traits for everything the engine needs from the platform but
//! does not implement itself: access to the shared memory region, board
//! level device control, and frame delivery upstream.
//!
//! Implementations are bound once at construction of
//! [`Ie`](crate::driver::Ie); the engine never checks for their presence at
//! runtime.
//!
//! # Design
//!
//! The shared region may sit behind a multibus window, a VME mapping, or a
//! plain memory-mapped SRAM, with byte order and access width quirks per
//! board. [`MemoryPort`] hides all of that behind word and block accessors
//! working in region-relative offsets. [`DevicePort`] covers the side-band
//! signals that do not go through memory: hardware reset, channel attention,
//! and the interrupt phase hook some boards need for level-triggered
//! interrupt housekeeping.

/// Direction of a memory barrier around a shared-memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BarrierKind {
    /// Order prior writes before the coprocessor may observe them
    Write,
    /// Order reads after the coprocessor's writes
    Read,
}

/// Kind of device reset being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetKind {
    /// Probe-time reset; the board may skip expensive settling
    Probe,
    /// Full reset before (re)initialization
    Full,
}

/// Reason channel attention is being raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttentionKind {
    /// A new command word or chain is waiting in the SCB
    Command,
    /// Interrupt causes are being acknowledged
    Ack,
}

/// Phase marker passed to the board interrupt hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntrPhase {
    /// Handler entered
    Enter,
    /// Another pass over the status word is starting
    Loop,
    /// Causes are about to be acknowledged
    Ack,
    /// Handler is done
    Exit,
}

/// Word and block access to the shared memory region.
///
/// All offsets are byte offsets relative to the region base. Words are
/// 16-bit little-endian on the wire; implementations translate to the host
/// view. `write24` stores a 24-bit region-relative pointer into a 32-bit
/// aligned doubleword.
pub trait MemoryPort {
    /// Reads one 16-bit word at `offset`.
    fn read16(&self, offset: usize) -> u16;

    /// Writes one 16-bit word at `offset`.
    fn write16(&mut self, offset: usize, value: u16);

    /// Writes a 24-bit pointer value at `offset`.
    fn write24(&mut self, offset: usize, value: u32);

    /// Copies `buf.len()` bytes out of the region starting at `offset`.
    fn copy_in(&self, offset: usize, buf: &mut [u8]);

    /// Copies `buf` into the region starting at `offset`.
    fn copy_out(&mut self, offset: usize, buf: &[u8]);

    /// Issues a memory barrier covering `len` bytes at `offset`.
    ///
    /// Called on both sides of every descriptor ownership transition. On
    /// strongly-ordered buses this may be a no-op, but the engine always
    /// asks.
    fn barrier(&mut self, offset: usize, len: usize, kind: BarrierKind);
}

/// Side-band control of the coprocessor.
pub trait DevicePort {
    /// Asserts hardware reset.
    fn reset(&mut self, kind: ResetKind);

    /// Board-level setup after reset, before the handshake chain is read.
    fn init(&mut self);

    /// Raises channel attention, telling the coprocessor to look at the SCB.
    fn attention(&mut self, kind: AttentionKind);

    /// Interrupt phase hook for boards that need per-phase housekeeping.
    ///
    /// The default does nothing.
    fn intr_hook(&mut self, phase: IntrPhase) {
        let _ = phase;
    }
}

/// Receiver of fully reassembled frames.
///
/// Called once per frame, in arrival order, with the frame bytes borrowed
/// from the engine's assembly buffer. The slice is only valid for the
/// duration of the call.
pub trait FrameSink {
    /// Delivers one received frame.
    fn frame_received(&mut self, frame: &[u8]);
}

impl<T: FrameSink + ?Sized> FrameSink for &mut T {
    fn frame_received(&mut self, frame: &[u8]) {
        (**self).frame_received(frame);
    }
}

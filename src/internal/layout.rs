//! Shared-Region Layout
//!
//! Carves the shared memory region into non-overlapping, 4-byte-aligned
//! ranges for every structure the protocol needs: the SCP/ISCP/SCB handshake
//! chain, the receive frame descriptors, receive buffer descriptors and
//! buffers, the transmit NoOp/command/buffer-descriptor slots and buffers,
//! and one staging area for general commands.
//!
//! The layout is computed once at initialization and never changes; all
//! offsets are relative to the region base, which is also the base the
//! coprocessor resolves 16-bit pointers against.

use crate::error::ConfigError;
use crate::internal::constants::{MAC_ADDR_LEN, MAX_MCAST, RBUF_SIZE, TBUF_SIZE};
use crate::internal::wire;

/// Rounds `off` up to the next 4-byte boundary.
const fn align4(off: usize) -> usize {
    (off + 3) & !3
}

/// Byte offsets of every structure in the shared region.
///
/// Array members store the offset of element zero; elements are contiguous
/// with the strides given by the accessor methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShmemLayout {
    /// System configuration pointer (fixed at the region base)
    pub scp: usize,
    /// Intermediate system configuration pointer
    pub iscp: usize,
    /// System control block
    pub scb: usize,
    /// First receive frame descriptor
    pub rframes: usize,
    /// First receive buffer descriptor
    pub rbds: usize,
    /// First receive buffer
    pub rbufs: usize,
    /// First NoOp command slot
    pub nops: usize,
    /// First transmit command slot
    pub xmits: usize,
    /// First transmit buffer descriptor
    pub xbds: usize,
    /// First transmit buffer
    pub xbufs: usize,
    /// General command staging area
    pub gencmd: usize,
    /// Total bytes used
    pub total: usize,
}

impl ShmemLayout {
    /// Placeholder for the uninitialized engine; every offset zero.
    pub const EMPTY: Self = Self {
        scp: 0,
        iscp: 0,
        scb: 0,
        rframes: 0,
        rbds: 0,
        rbufs: 0,
        nops: 0,
        xmits: 0,
        xbds: 0,
        xbufs: 0,
        gencmd: 0,
        total: 0,
    };

    /// Size of the general command staging area: the largest fixed-size
    /// command body, or a full multicast list, whichever is bigger.
    pub const GENCMD_SIZE: usize = wire::mcast::ADDRS + MAX_MCAST * MAC_ADDR_LEN;

    /// Computes the layout for the requested ring depths.
    ///
    /// Fails when the depths are unusable (`ntxbuf < 2`, empty receive
    /// rings, fewer buffers than frames) or when the result does not fit in
    /// `mem_size` bytes. The total must also stay below the 16-bit null
    /// offset so every structure is reachable through a 16-bit link.
    pub fn compute(
        nframes: usize,
        nrxbuf: usize,
        ntxbuf: usize,
        mem_size: usize,
    ) -> Result<Self, ConfigError> {
        if nframes == 0 || nrxbuf < nframes || ntxbuf < 2 {
            return Err(ConfigError::InvalidRingDepth);
        }

        let scp = 0;
        let iscp = align4(scp + wire::scp::SIZE);
        let scb = align4(iscp + wire::iscp::SIZE);
        let rframes = align4(scb + wire::scb::SIZE);
        let rbds = align4(rframes + nframes * wire::rfd::SIZE);
        let rbufs = align4(rbds + nrxbuf * wire::rbd::SIZE);
        let nops = align4(rbufs + nrxbuf * RBUF_SIZE);
        let xmits = align4(nops + ntxbuf * wire::cmd::NOP_SIZE);
        let xbds = align4(xmits + ntxbuf * wire::xmit::SIZE);
        let xbufs = align4(xbds + ntxbuf * wire::tbd::SIZE);
        let gencmd = align4(xbufs + ntxbuf * Self::XBUF_STRIDE);
        let total = align4(gencmd + Self::GENCMD_SIZE);

        if total > mem_size || total >= wire::NULL_OFFSET as usize {
            return Err(ConfigError::InsufficientMemory);
        }

        Ok(Self {
            scp,
            iscp,
            scb,
            rframes,
            rbds,
            rbufs,
            nops,
            xmits,
            xbds,
            xbufs,
            gencmd,
            total,
        })
    }

    /// Transmit buffer stride (capacity rounded to alignment).
    pub const XBUF_STRIDE: usize = align4(TBUF_SIZE);

    /// Offset of receive frame descriptor `i`.
    pub const fn rfd(&self, i: usize) -> usize {
        self.rframes + i * wire::rfd::SIZE
    }

    /// Offset of receive buffer descriptor `i`.
    pub const fn rbd(&self, i: usize) -> usize {
        self.rbds + i * wire::rbd::SIZE
    }

    /// Offset of receive buffer `i`.
    pub const fn rbuf(&self, i: usize) -> usize {
        self.rbufs + i * RBUF_SIZE
    }

    /// Offset of NoOp command slot `i`.
    pub const fn nop(&self, i: usize) -> usize {
        self.nops + i * wire::cmd::NOP_SIZE
    }

    /// Offset of transmit command slot `i`.
    pub const fn xmit(&self, i: usize) -> usize {
        self.xmits + i * wire::xmit::SIZE
    }

    /// Offset of transmit buffer descriptor `i`.
    pub const fn xbd(&self, i: usize) -> usize {
        self.xbds + i * wire::tbd::SIZE
    }

    /// Offset of transmit buffer `i`.
    pub const fn xbuf(&self, i: usize) -> usize {
        self.xbufs + i * Self::XBUF_STRIDE
    }

    /// Ring index of the receive frame descriptor at `offset`.
    pub const fn rfd_index(&self, offset: usize) -> usize {
        (offset - self.rframes) / wire::rfd::SIZE
    }

    /// Ring index of the receive buffer descriptor at `offset`.
    pub const fn rbd_index(&self, offset: usize) -> usize {
        (offset - self.rbds) / wire::rbd::SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_do_not_overlap() {
        let l = ShmemLayout::compute(16, 48, 2, 64 * 1024).unwrap();
        let ends = [
            (l.scp, l.scp + wire::scp::SIZE),
            (l.iscp, l.iscp + wire::iscp::SIZE),
            (l.scb, l.scb + wire::scb::SIZE),
            (l.rframes, l.rframes + 16 * wire::rfd::SIZE),
            (l.rbds, l.rbds + 48 * wire::rbd::SIZE),
            (l.rbufs, l.rbufs + 48 * RBUF_SIZE),
            (l.nops, l.nops + 2 * wire::cmd::NOP_SIZE),
            (l.xmits, l.xmits + 2 * wire::xmit::SIZE),
            (l.xbds, l.xbds + 2 * wire::tbd::SIZE),
            (l.xbufs, l.xbufs + 2 * ShmemLayout::XBUF_STRIDE),
            (l.gencmd, l.gencmd + ShmemLayout::GENCMD_SIZE),
        ];
        for pair in ends.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "{pair:?}");
        }
        assert!(ends[ends.len() - 1].1 <= l.total);
    }

    #[test]
    fn everything_is_aligned() {
        let l = ShmemLayout::compute(4, 8, 3, 64 * 1024).unwrap();
        for off in [
            l.iscp, l.scb, l.rframes, l.rbds, l.rbufs, l.nops, l.xmits, l.xbds, l.xbufs, l.gencmd,
        ] {
            assert_eq!(off % 4, 0, "offset {off} not aligned");
        }
    }

    #[test]
    fn rejects_bad_depths() {
        assert_eq!(
            ShmemLayout::compute(0, 8, 2, 64 * 1024),
            Err(ConfigError::InvalidRingDepth)
        );
        assert_eq!(
            ShmemLayout::compute(8, 4, 2, 64 * 1024),
            Err(ConfigError::InvalidRingDepth)
        );
        assert_eq!(
            ShmemLayout::compute(8, 8, 1, 64 * 1024),
            Err(ConfigError::InvalidRingDepth)
        );
    }

    #[test]
    fn rejects_region_overflow() {
        assert_eq!(
            ShmemLayout::compute(16, 48, 2, 8 * 1024),
            Err(ConfigError::InsufficientMemory)
        );
        // Depths that would fit in bytes but not within 16-bit links
        assert_eq!(
            ShmemLayout::compute(80, 240, 2, 128 * 1024),
            Err(ConfigError::InsufficientMemory)
        );
    }

    #[test]
    fn accessors_match_strides() {
        let l = ShmemLayout::compute(4, 8, 2, 64 * 1024).unwrap();
        assert_eq!(l.rfd(0), l.rframes);
        assert_eq!(l.rfd(3) - l.rfd(2), wire::rfd::SIZE);
        assert_eq!(l.rbuf(1) - l.rbuf(0), RBUF_SIZE);
        assert_eq!(l.xbuf(1) - l.xbuf(0), ShmemLayout::XBUF_STRIDE);
        assert_eq!(l.rfd_index(l.rfd(3)), 3);
        assert_eq!(l.rbd_index(l.rbd(5)), 5);
    }
}

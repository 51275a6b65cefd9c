//! Centralized Constants
//!
//! This module provides a single source of truth for the magic numbers and
//! configuration constants used throughout the engine.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Frame/Buffer sizes**: Ethernet frame and ring buffer dimensions
//! - **Ring defaults**: Default ring depths
//! - **Timing**: Poll bounds and intervals
//!
//! # Note
//!
//! Shared-memory structure offsets and bit definitions live in
//! `internal::wire` as they describe the coprocessor's view of memory.

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Maximum Ethernet frame size (1500 payload + 14 header + 4 CRC)
pub const MAX_FRAME_SIZE: usize = 1518;

/// Minimum Ethernet frame size excluding CRC; shorter frames are zero-padded
pub const MIN_FRAME_SIZE: usize = 60;

/// Size of each receive buffer segment. Must be a power of two.
pub const RBUF_SIZE: usize = 256;

/// Size of each transmit buffer; equals the maximum Ethernet frame length
pub const TBUF_SIZE: usize = MAX_FRAME_SIZE;

/// MAC address length in bytes
pub const MAC_ADDR_LEN: usize = 6;

/// Upper bound on receive segments per frame; a chain longer than this is
/// treated as corrupted and the frame dropped.
pub const MAX_RX_SEGS: usize = TBUF_SIZE.div_ceil(RBUF_SIZE);

/// Maximum number of staged multicast addresses; the whole list must fit in
/// the general-command staging area.
pub const MAX_MCAST: usize = TBUF_SIZE / MAC_ADDR_LEN;

// =============================================================================
// Ring Defaults
// =============================================================================

/// Default number of receive frame descriptors
pub const DEFAULT_NFRAMES: usize = 16;

/// Receive buffers allocated per frame descriptor (default sizing)
pub const BUFS_PER_FRAME: usize = 3;

/// Default number of receive buffer descriptors
pub const DEFAULT_NRXBUF: usize = DEFAULT_NFRAMES * BUFS_PER_FRAME;

/// Default number of transmit command slots
pub const DEFAULT_NTXBUF: usize = 2;

// =============================================================================
// Timing Constants
// =============================================================================

/// Default maximum poll iterations for a synchronous command completion
pub const SYNC_CMD_POLL_LIMIT: u32 = 10_000;

/// Default spacing between synchronous command polls, in microseconds
pub const SYNC_CMD_POLL_INTERVAL_US: u32 = 10;

/// Maximum spins waiting for the coprocessor to accept an SCB command word.
/// Acceptance is a few bus cycles on real hardware; this bound only guards
/// against a wedged coprocessor.
pub const SCB_ACCEPT_SPINS: u32 = 4096;

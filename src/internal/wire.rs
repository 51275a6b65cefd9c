//! Shared-Memory Wire Format
//!
//! Byte offsets and bit definitions for the structures the coprocessor reads
//! and writes in shared memory. All words are 16-bit little-endian; 24-bit
//! buffer pointers occupy a 32-bit aligned doubleword with the top byte
//! ignored by the coprocessor.
//!
//! Offsets are relative to the start of each structure; absolute positions
//! come from [`super::layout::ShmemLayout`].
//!
//! # Structure map
//!
//! ```text
//! SCP ──► ISCP ──► SCB ──┬──► command chain (NoOp/Transmit/general)
//!                        └──► receive frame area ──► receive buffer chain
//! ```

/// Completion status triple shared by commands and receive frame descriptors.
pub mod stat {
    /// The coprocessor has finished processing this element
    pub const COMPLETE: u16 = 0x8000;

    /// The coprocessor is currently processing this element
    pub const BUSY: u16 = 0x4000;

    /// Processing finished without error
    pub const OK: u16 = 0x2000;
}

/// System configuration pointer. Read once by the coprocessor at startup.
pub mod scp {
    /// Bus-width / sysbus byte (16-bit word)
    pub const SYSBUS: usize = 2;

    /// 24-bit pointer to the ISCP (32-bit aligned doubleword)
    pub const ISCP: usize = 8;

    /// Structure size in bytes
    pub const SIZE: usize = 12;

    /// Sysbus value selecting 16-bit operation
    pub const SYSBUS_16BIT: u16 = 0x0000;
}

/// Intermediate system configuration pointer.
pub mod iscp {
    /// Busy word; host writes 1, the coprocessor clears it when the
    /// handshake chain has been consumed
    pub const BUSY: usize = 0;

    /// 16-bit offset of the SCB
    pub const SCB: usize = 2;

    /// 24-bit base address all 16-bit offsets are relative to
    pub const BASE: usize = 4;

    /// Structure size in bytes
    pub const SIZE: usize = 8;
}

/// System control block. The mailbox both agents poll and poke.
pub mod scb {
    /// Status word, written by the coprocessor
    pub const STATUS: usize = 0;

    /// Command word, written by the host; zeroed by the coprocessor on
    /// acceptance
    pub const CMD: usize = 2;

    /// 16-bit offset of the first command in the command list
    pub const CBL: usize = 4;

    /// 16-bit offset of the first receive frame descriptor
    pub const RFA: usize = 6;

    /// CRC error tally, cleared by the host when harvested
    pub const CRC_ERRS: usize = 8;

    /// Alignment error tally
    pub const ALIGN_ERRS: usize = 10;

    /// Frames lost to descriptor exhaustion
    pub const NO_RESOURCES: usize = 12;

    /// Receive DMA overrun tally
    pub const OVERRUNS: usize = 14;

    /// Structure size in bytes
    pub const SIZE: usize = 16;

    // --- status word bits (also the acknowledge bits in the command word) ---

    /// A command with its interrupt bit set has completed
    pub const ST_CX: u16 = 0x8000;

    /// A frame has been received
    pub const ST_FR: u16 = 0x4000;

    /// The command unit left the active state
    pub const ST_CNA: u16 = 0x2000;

    /// The receive unit left the ready state
    pub const ST_RNR: u16 = 0x1000;

    /// Mask over all four interrupt cause bits
    pub const ST_WHENCE: u16 = 0xf000;

    /// Command unit status field
    pub const CUS_MASK: u16 = 0x0700;

    /// Command unit actively executing the command list
    pub const CUS_ACTIVE: u16 = 0x0200;

    /// Receive unit status field
    pub const RUS_MASK: u16 = 0x0070;

    /// Receive unit ready for incoming frames
    pub const RUS_READY: u16 = 0x0040;

    // --- command word bits ---

    /// Start the command unit at the CBL offset
    pub const CUC_START: u16 = 0x0100;

    /// Start the receive unit at the RFA offset
    pub const RUC_START: u16 = 0x0010;
}

/// Command block header, common to all command variants.
pub mod cmd {
    /// Completion status word (see [`super::stat`])
    pub const STATUS: usize = 0;

    /// Opcode and control flags
    pub const OP: usize = 2;

    /// 16-bit offset of the next command in the chain
    pub const LINK: usize = 4;

    /// Header size; also the full size of a NoOp command
    pub const NOP_SIZE: usize = 8;

    // --- opcodes (low three bits of the OP word) ---

    /// No operation; chain placeholder
    pub const OP_NOP: u16 = 0x0;

    /// Load the individual MAC address
    pub const OP_IASETUP: u16 = 0x1;

    /// Load device configuration parameters
    pub const OP_CONFIGURE: u16 = 0x2;

    /// Load the multicast address list
    pub const OP_MCSETUP: u16 = 0x3;

    /// Transmit one frame
    pub const OP_TRANSMIT: u16 = 0x4;

    /// Run the internal self-test
    pub const OP_DIAGNOSE: u16 = 0x7;

    /// Mask over the opcode field
    pub const OP_MASK: u16 = 0x7;

    // --- control flags in the OP word ---

    /// Last command in the chain; the command unit idles after it
    pub const FL_EL: u16 = 0x8000;

    /// Suspend after this command
    pub const FL_SUSPEND: u16 = 0x4000;

    /// Raise a command-complete interrupt when done
    pub const FL_INTR: u16 = 0x2000;
}

/// Transmit command body (after the common header).
pub mod xmit {
    /// 16-bit offset of the first transmit buffer descriptor
    pub const TBD: usize = 6;

    /// Structure size in bytes
    pub const SIZE: usize = 16;
}

/// Individual-address setup command body.
pub mod ia {
    /// Six address bytes
    pub const ADDR: usize = 6;

    /// Structure size in bytes
    pub const SIZE: usize = 12;
}

/// Configure command body.
pub mod conf {
    /// Start of the parameter bytes
    pub const DATA: usize = 6;

    /// Number of parameter bytes
    pub const DATA_LEN: usize = 12;

    /// Structure size in bytes
    pub const SIZE: usize = 20;
}

/// Multicast setup command body.
pub mod mcast {
    /// Byte count of the address list (16-bit word)
    pub const COUNT: usize = 6;

    /// Start of the packed six-byte addresses
    pub const ADDRS: usize = 8;
}

/// Receive frame descriptor.
pub mod rfd {
    /// Completion status word (see [`super::stat`])
    pub const STATUS: usize = 0;

    /// End-of-list control word
    pub const LAST: usize = 2;

    /// 16-bit offset of the next frame descriptor
    pub const LINK: usize = 4;

    /// 16-bit offset of the first buffer descriptor, or [`super::NULL_OFFSET`]
    pub const RBD: usize = 6;

    /// Structure size in bytes
    pub const SIZE: usize = 24;

    /// End-of-list flag in the control word
    pub const FL_EOL: u16 = 0x8000;

    /// Suspend flag in the control word
    pub const FL_SUSPEND: u16 = 0x4000;
}

/// Receive buffer descriptor.
pub mod rbd {
    /// Actual byte count plus flags, written by the coprocessor
    pub const COUNT: usize = 0;

    /// 16-bit offset of the next buffer descriptor
    pub const NEXT: usize = 2;

    /// 24-bit buffer address (32-bit aligned doubleword)
    pub const BUFFER: usize = 4;

    /// Buffer capacity plus end-of-list flag
    pub const LEN: usize = 8;

    /// Structure size in bytes
    pub const SIZE: usize = 12;

    /// Last segment of the frame
    pub const FL_EOF: u16 = 0x8000;

    /// Set by the coprocessor when it stored bytes into this buffer
    pub const FL_USED: u16 = 0x4000;

    /// Mask over the actual byte count
    pub const COUNT_MASK: u16 = 0x3fff;

    /// End-of-list flag in the capacity word
    pub const FL_EL: u16 = 0x8000;
}

/// Transmit buffer descriptor.
pub mod tbd {
    /// Byte count plus end-of-frame flag
    pub const COUNT: usize = 0;

    /// 16-bit offset of the next buffer descriptor, or [`super::NULL_OFFSET`]
    pub const NEXT: usize = 2;

    /// 24-bit buffer address (32-bit aligned doubleword)
    pub const BUFFER: usize = 4;

    /// Structure size in bytes
    pub const SIZE: usize = 8;

    /// Last buffer of the frame
    pub const FL_EOF: u16 = 0x8000;

    /// Mask over the byte count
    pub const COUNT_MASK: u16 = 0x3fff;
}

/// Null value for 16-bit offset fields
pub const NULL_OFFSET: u16 = 0xffff;

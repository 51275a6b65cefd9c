//! i82586-Class Coprocessor Protocol Engine
//!
//! A `no_std`, `no_alloc` host-side protocol engine for Intel 82586-class
//! Ethernet coprocessors: the device executes DMA autonomously while the
//! host builds descriptor rings and command chains in a shared memory
//! region and coordinates through ownership bits, a mailbox control block
//! and a channel-attention strobe.
//!
//! # Architecture
//!
//! The engine is organized into three layers:
//!
//! 1. **Engine** ([`driver`]): protocol state machine with the receive,
//!    transmit and command paths
//! 2. **Ports** ([`hal`]): injected capabilities for shared-memory access
//!    and board-level device control
//! 3. **Wire format** (`internal`): shared-memory structure layout, private
//!    to the crate
//!
//! The shared region may live on the far side of a multibus or VME window
//! with its own byte order and access-width rules, so the engine never
//! dereferences device memory itself; every access goes through the
//! [`MemoryPort`](hal::MemoryPort) bound at construction.
//!
//! # Features
//!
//! - `defmt`: defmt formatting for public types
//! - `log`: leveled event emission (dropped frames, ring recovery,
//!   command timeouts)
//! - `critical-section`: ISR-safe [`SharedIe`](sync::SharedIe) wrapper
//!
//! # Example
//!
//! ```ignore
//! use ie586::{Ie, IeConfig};
//!
//! // Board-specific port implementations
//! let bus = MultibusWindow::new(0xd0000, 96 * 1024);
//! let dev = BoardControl::new();
//!
//! // 16 receive frames, 48 receive buffers, 2 transmit slots
//! static ENGINE: SharedIe<MultibusWindow, BoardControl, 16, 48, 2> =
//!     SharedIe::new(Ie::new(bus, dev));
//!
//! ENGINE.with(|ie| ie.init(IeConfig::new(96 * 1024), &mut delay))?;
//! ENGINE.with(|ie| ie.transmit(&frame))?;
//!
//! // From the interrupt service routine:
//! ENGINE.with(|ie| ie.handle_interrupt(&mut sink));
//! ```
//!
//! # Memory Requirements
//!
//! Host RAM: one maximum-size frame assembly buffer plus the multicast
//! staging list, about 3 KB per engine. The shared region needs roughly
//! 16 KB for the default ring depths, dominated by the receive buffers.

#![no_std]
#![deny(missing_docs)]
#![deny(unsafe_code)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::similar_names,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod error;
pub mod hal;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "critical-section")]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod test_utils;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{IeConfig, State, DEFAULT_MAC_ADDR};
pub use driver::ie::{Counters, Ie};
pub use driver::interrupt::ScbStatus;
pub use error::{
    CmdError, CmdResult, ConfigError, ConfigResult, Error, Result, TxError, TxResult,
};
pub use hal::{
    AttentionKind, BarrierKind, DevicePort, FrameSink, IntrPhase, MemoryPort, ResetKind,
};

/// Engine with the default ring depths: 16 receive frames, three receive
/// buffers per frame, double-buffered transmit.
pub type IeDefault<M, D> = Ie<M, D, 16, 48, 2>;

/// Small-footprint engine for boards with little shared memory.
pub type IeSmall<M, D> = Ie<M, D, 4, 8, 2>;

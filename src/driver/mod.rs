//! Core engine components.
//!
//! This module contains the building blocks for configuring and operating
//! the protocol engine:
//!
//! - [`config`] - Configuration types and builder pattern
//! - [`interrupt`] - SCB interrupt cause decoding
//! - [`ie`] - The engine itself; the receive, transmit and command paths
//!   extend it from [`rx`], [`tx`] and [`command`]
//!
//! # Example
//!
//! ```ignore
//! use ie586::driver::{Ie, IeConfig};
//!
//! let config = IeConfig::new(96 * 1024)
//!     .with_mac_address([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
//! ```

// Submodules
pub mod config;
pub mod ie;
pub mod interrupt;

mod command;
mod rx;
mod tx;

// Re-exports for convenience
pub use config::{IeConfig, State, DEFAULT_MAC_ADDR};
pub use ie::{Counters, Ie};
pub use interrupt::ScbStatus;

//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`wire`]: Shared-memory structure offsets and status/command bits
//! - [`layout`]: Shared-region allocator for descriptor rings and buffers
//! - [`ring`]: Modulo ring cursors
//! - [`constants`]: Internal constants and magic numbers
//!
//! # Stability
//!
//! **WARNING:** This module is `pub(crate)` only. Do not depend on any types
//! or functions in this module from external code. They are subject to change
//! without notice.

pub(crate) mod constants;
pub(crate) mod layout;
pub(crate) mod ring;
pub(crate) mod wire;

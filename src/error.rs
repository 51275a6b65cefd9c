//! Error types for the protocol engine
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Initialization and layout failures
//! - [`CmdError`]: Coprocessor command failures
//! - [`TxError`]: Transmit submission failures
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most engine methods. Receive-side faults (bad frames, ring
//! starvation) are absorbed and counted rather than surfaced as errors.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and initialization errors
///
/// These errors occur while computing the shared-region layout or bringing
/// the coprocessor through its startup handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Engine already initialized
    AlreadyInitialized,
    /// Requested ring depths do not fit in the shared region
    InsufficientMemory,
    /// Ring depths unusable (no frames, fewer buffers than frames,
    /// fewer than two transmit slots)
    InvalidRingDepth,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::AlreadyInitialized => "already initialized",
            ConfigError::InsufficientMemory => "shared region too small",
            ConfigError::InvalidRingDepth => "invalid ring depth",
        }
    }
}

// =============================================================================
// Command Errors
// =============================================================================

/// Coprocessor command errors
///
/// These errors occur when submitting configuration-class commands
/// (address setup, configure, multicast setup, diagnose).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CmdError {
    /// The coprocessor did not complete the command within the poll bound
    Timeout,
    /// The command completed without the OK bit set
    Failed,
    /// Multicast list exceeds the staging capacity; active list retained
    MulticastOverflow,
}

impl core::fmt::Display for CmdError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CmdError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CmdError::Timeout => "command timed out",
            CmdError::Failed => "command failed",
            CmdError::MulticastOverflow => "multicast list too long",
        }
    }
}

// =============================================================================
// Transmit Errors
// =============================================================================

/// Transmit submission errors
///
/// Returned by [`transmit`](crate::driver::Ie::transmit) so the caller can
/// apply backpressure; frames are never dropped silently on this path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxError {
    /// All transmit slots are pending
    RingFull,
    /// Frame exceeds the transmit buffer capacity
    FrameTooLarge,
    /// Zero-length frame
    InvalidLength,
    /// Engine not running
    InvalidState,
}

impl core::fmt::Display for TxError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TxError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TxError::RingFull => "transmit ring full",
            TxError::FrameTooLarge => "frame too large for buffer",
            TxError::InvalidLength => "invalid frame length",
            TxError::InvalidState => "invalid state for operation",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::InsufficientMemory)) => { /* ... */ }
///     Err(Error::Cmd(CmdError::Timeout)) => { /* ... */ }
///     Err(Error::Tx(TxError::RingFull)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// Command error
    Cmd(CmdError),
    /// Transmit error
    Tx(TxError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Cmd(e) => write!(f, "cmd: {}", e.as_str()),
            Error::Tx(e) => write!(f, "tx: {}", e.as_str()),
        }
    }
}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<CmdError> for Error {
    fn from(e: CmdError) -> Self {
        Error::Cmd(e)
    }
}

impl From<TxError> for Error {
    fn from(e: TxError) -> Self {
        Error::Tx(e)
    }
}

/// Result type alias for engine operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for command operations
pub type CmdResult<T> = core::result::Result<T, CmdError>;

/// Result type alias for transmit operations
pub type TxResult<T> = core::result::Result<T, TxError>;

// =============================================================================
// Unit Tests
// =============================================================================

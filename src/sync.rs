//! ISR-safe engine wrapper using critical sections.
//!
//! The engine itself is deliberately not reentrant: every entry point takes
//! `&mut self`. [`SharedIe`] wraps it for the usual deployment where the
//! control surface runs in thread context and [`handle_interrupt`]
//! (crate::driver::Ie::handle_interrupt) runs in an ISR, with
//! `critical_section` arbitrating.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::driver::Ie;
use crate::hal::{DevicePort, MemoryPort};

/// Cell providing interior mutability with critical section protection.
///
/// Combines `critical_section::Mutex` with `RefCell` for safe mutable access
/// from both normal code and interrupt handlers.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Create a new cell (const, suitable for static initialization).
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Execute a closure with exclusive mutable access.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow_ref_mut(cs);
            f(&mut value)
        })
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .try_borrow_mut()
                .ok()
                .map(|mut value| f(&mut value))
        })
    }
}

// SAFETY: CriticalSectionCell uses critical sections to protect all access.
#[allow(unsafe_code)]
unsafe impl<T> Sync for CriticalSectionCell<T> {}

/// ISR-safe engine wrapper.
///
/// # Example
///
/// ```ignore
/// static ENGINE: SharedIe<Bus, Dev, 16, 48, 2> =
///     SharedIe::new(Ie::new(Bus::new(), Dev::new()));
///
/// ENGINE.with(|ie| {
///     ie.transmit(&data).ok();
/// });
/// ```
pub struct SharedIe<M, D, const NFRAMES: usize, const NRXBUF: usize, const NTXBUF: usize>
where
    M: MemoryPort,
    D: DevicePort,
{
    inner: CriticalSectionCell<Ie<M, D, NFRAMES, NRXBUF, NTXBUF>>,
}

impl<M, D, const NFRAMES: usize, const NRXBUF: usize, const NTXBUF: usize>
    SharedIe<M, D, NFRAMES, NRXBUF, NTXBUF>
where
    M: MemoryPort,
    D: DevicePort,
{
    /// Wrap an engine (const, suitable for static initialization).
    pub const fn new(engine: Ie<M, D, NFRAMES, NRXBUF, NTXBUF>) -> Self {
        Self {
            inner: CriticalSectionCell::new(engine),
        }
    }

    /// Execute a closure with exclusive access to the engine.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Ie<M, D, NFRAMES, NRXBUF, NTXBUF>) -> R,
    {
        self.inner.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Ie<M, D, NFRAMES, NRXBUF, NTXBUF>) -> R,
    {
        self.inner.try_with(f)
    }
}

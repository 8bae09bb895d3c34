// src/sync/interrupt.rs

//! Interrupt line control and the IRQ-masking port lock.

use core::ops::{Deref, DerefMut};

use spin::{Mutex, MutexGuard};

use crate::driverlib::backend::SharedRegisterIo;
use crate::driverlib::intc::Intc;

/// Saved mask state of one interrupt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqState {
    was_masked: bool,
}

impl IrqState {
    pub const UNMASKED: Self = Self { was_masked: false };
    pub const MASKED: Self = Self { was_masked: true };

    pub const fn was_masked(self) -> bool {
        self.was_masked
    }
}

/// Defers and restores a single interrupt line.
///
/// This is the per-line analogue of `local_irq_save` / `local_irq_restore`:
/// a caller masks the line it shares state with, does its work, then puts
/// the line back exactly as it found it.
pub trait InterruptControl {
    /// Mask `irq` and return its previous state.
    fn save_and_mask(&self, irq: u32) -> IrqState;
    /// Return `irq` to a previously saved state.
    fn restore(&self, irq: u32, state: IrqState);

    /// Mask `irq` with no intention of restoring it.
    fn mask(&self, irq: u32) {
        self.save_and_mask(irq);
    }

    fn unmask(&self, irq: u32) {
        self.restore(irq, IrqState::UNMASKED);
    }
}

impl<T: InterruptControl + ?Sized> InterruptControl for &T {
    fn save_and_mask(&self, irq: u32) -> IrqState {
        (**self).save_and_mask(irq)
    }

    fn restore(&self, irq: u32, state: IrqState) {
        (**self).restore(irq, state)
    }
}

/// The controller is driven without a lock. A handler that preempts
/// between the ICMR read and the ICMSR write puts its own line back before
/// returning, so the state read here is still the one being saved.
impl<B: SharedRegisterIo> InterruptControl for Intc<B> {
    fn save_and_mask(&self, irq: u32) -> IrqState {
        let was_masked = self.is_masked(irq);
        if !was_masked {
            self.interrupt_disable(irq);
        }
        IrqState { was_masked }
    }

    fn restore(&self, irq: u32, state: IrqState) {
        if !state.was_masked {
            self.interrupt_enable(irq);
        }
    }
}

/// A spin lock whose holder also keeps one interrupt line masked.
///
/// Acquiring saves and masks the line, then takes the lock. Dropping the
/// guard releases the lock first and restores the line afterwards, so the
/// handler for that line never spins on a lock held by the code it
/// interrupted.
#[derive(Debug)]
pub struct IrqMutex<T> {
    irq: u32,
    inner: Mutex<T>,
}

impl<T> IrqMutex<T> {
    pub const fn new(irq: u32, value: T) -> Self {
        Self {
            irq,
            inner: Mutex::new(value),
        }
    }

    pub const fn irq(&self) -> u32 {
        self.irq
    }

    pub fn lock<'a, C>(&'a self, control: &'a C) -> IrqMutexGuard<'a, T, C>
    where
        C: InterruptControl + ?Sized,
    {
        let saved = control.save_and_mask(self.irq);
        IrqMutexGuard {
            guard: Some(self.inner.lock()),
            control,
            irq: self.irq,
            saved,
        }
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

/// Guard returned by [`IrqMutex::lock`].
pub struct IrqMutexGuard<'a, T, C: InterruptControl + ?Sized> {
    guard: Option<MutexGuard<'a, T>>,
    control: &'a C,
    irq: u32,
    saved: IrqState,
}

impl<T, C: InterruptControl + ?Sized> Deref for IrqMutexGuard<'_, T, C> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.guard {
            Some(guard) => &**guard,
            None => unreachable!("guard is only taken in drop"),
        }
    }
}

impl<T, C: InterruptControl + ?Sized> DerefMut for IrqMutexGuard<'_, T, C> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.guard {
            Some(guard) => &mut **guard,
            None => unreachable!("guard is only taken in drop"),
        }
    }
}

impl<T, C: InterruptControl + ?Sized> Drop for IrqMutexGuard<'_, T, C> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.control.restore(self.irq, self.saved);
    }
}

// src/sync/mod.rs

//! Synchronization primitives
//!
//! Port state is shared between process context and the port's interrupt
//! handler. [`IrqMutex`] keeps the port's interrupt line masked for as long
//! as its guard lives, which rules out the handler running against
//! half-updated queue indices or line settings.

pub mod interrupt;

pub use interrupt::{InterruptControl, IrqMutex, IrqMutexGuard, IrqState};

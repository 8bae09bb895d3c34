// src/lib.rs
//! Ingenic M200 board-support package
//!
//! Register-level accessors for the UART, MSC, OST and INTC blocks, and an
//! interrupt-driven serial port engine built on top of them.
//!
//! - [`driverlib`]: typed register access, one module per peripheral family
//! - [`serial`]: termios translation, the UART interrupt handler with its
//!   transmit queue, the port table and the boot console
//! - [`sync`]: the lock that keeps a port's interrupt line masked while held
//! - [`prom`]: printf-style output for the earliest boot stages
//! - [`board`]: the M200's fixed wiring of all of the above

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod board;
pub mod constants;
pub mod driverlib;
pub mod errors;
pub mod prom;
pub mod serial;
pub mod sync;

#[cfg(test)]
mod testing;

pub use errors::{BspError, ErrorContext};

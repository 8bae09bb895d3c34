// src/driverlib/mod.rs

//! Register-level driver libraries
//!
//! One module per peripheral family:
//! - `uart`: 16550-style UART with module enable and FCR shadow
//! - `msc`: MMC/SD controller command, interrupt and DMA accessors
//! - `ost`: 64-bit operating system timer
//! - `intc`: interrupt line masking
//!
//! Every accessor takes its register block explicitly through a handle that
//! owns a [`RegisterIo`] backend. Mutating accessors report whether the
//! hardware latched the change.

pub mod backend;
pub mod intc;
pub mod memmap;
pub mod msc;
pub mod ost;
pub mod uart;

pub use backend::{MmioBackend, Reg, RegisterExt, RegisterIo, Width};
pub use intc::Intc;
pub use memmap::{Instance, IntcInstance, MscInstance, OstInstance, UartInstance, kseg1};
pub use msc::Msc;
pub use ost::Ost;
pub use uart::{LineFormat, LineStatus, Parity, StopBits, Uart, WordLength};

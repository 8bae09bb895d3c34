// src/serial/mod.rs

//! UART serial port engine.
//!
//! Turns the register accessors in [`crate::driverlib::uart`] into a
//! serial port a host kernel can drive:
//! - termios requests become divisor, frame format and flow control
//! - the interrupt handler drains a transmit queue into the FIFO and
//!   forwards received bytes with their error classification
//! - a polled console writes through the same port lock
//!
//! The host supplies its TTY buffer, IRQ registration and device
//! description through the traits in [`host`].

pub mod error;
pub mod host;
pub mod port;
pub mod table;
pub mod termios;
pub mod timeout;
pub mod xmit;

#[cfg(feature = "console")]
pub mod console;

#[cfg(test)]
mod tests;

pub use error::{AttachError, ConsoleError, HostFault};
pub use host::{Firmware, IrqReturn, ModemLines, PlatformDevice, PortType, RxFlag, SerialHost};
pub use port::{ErrorCounters, SerialPort};
pub use table::PortTable;
pub use termios::{ControlFlags, InputFlags, LineConfig, StatusMasks, Termios};
pub use timeout::{SpinBudget, SpinTimeout, spin_until};
pub use xmit::TransmitQueue;

#[cfg(feature = "console")]
pub use console::{Console, ConsoleOptions};

// src/serial/host.rs

//! Boundary with the host kernel.
//!
//! The engine never talks to a TTY layer, a device tree or an IRQ core
//! directly. Those collaborators implement the traits below.

use bitflags::bitflags;

use super::error::HostFault;

/// Classification attached to every received byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RxFlag {
    Normal,
    Break,
    Parity,
    Overrun,
    Frame,
}

/// Result of an interrupt handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    None,
    Handled,
}

bitflags! {
    /// Modem lines in `TIOCM_*` encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModemLines: u32 {
        const LE = 0x001;
        const DTR = 0x002;
        const RTS = 0x004;
        const CTS = 0x020;
        const CAR = 0x040;
        const RNG = 0x080;
        const DSR = 0x100;
        const LOOP = 0x8000;
    }
}

/// Port type reported by `config_port`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortType {
    Unknown,
    Uart16550,
}

/// Serial-core side of a port: receive buffer and interrupt registration.
pub trait SerialHost {
    /// Queue one received byte with its classification.
    fn insert_char(&mut self, byte: u8, flag: RxFlag);
    /// Hand everything queued since the last push to the line discipline.
    fn flip_buffer_push(&mut self);
    /// A break condition was received.
    fn handle_break(&mut self) {}
    /// Enough transmit room freed up to wake blocked writers.
    fn write_wakeup(&mut self) {}
    fn request_irq(&mut self, irq: u32, name: &'static str) -> Result<(), HostFault>;
    fn free_irq(&mut self, irq: u32);
}

/// A platform device offered to the probe.
pub trait PlatformDevice {
    /// Index of the device under alias `stem` (`serial3` gives 3).
    fn alias_id(&self, stem: &str) -> Option<usize>;
    fn is_compatible(&self, compatible: &str) -> bool;
    /// Start of the first memory resource.
    fn resource_base(&self) -> Option<usize>;
    fn irq(&self) -> Option<u32>;
    /// Rate of the device's functional clock in Hz.
    fn clock_rate(&self) -> Option<u32>;
    /// Apply the `default` pin-control state.
    fn select_default_pins(&mut self) -> Result<(), HostFault>;
}

/// Firmware configuration consulted before any driver probes.
pub trait Firmware {
    /// `linux,stdout-path` from `/chosen`, options included.
    fn stdout_path(&self) -> Option<&str>;
    fn alias_id(&self, path: &str, stem: &str) -> Option<usize>;
    fn resource_base(&self, path: &str) -> Option<usize>;
    fn irq(&self, path: &str) -> Option<u32>;
}

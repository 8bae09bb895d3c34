// src/serial/table.rs

//! Fixed table of UART lines and the platform probe.
//!
//! Each line has exactly one slot. A slot is filled once, either by the
//! early console or by the probe, and the register block it binds is never
//! handed to a second port.

use log::{error, info};
use spin::Once;

use super::error::AttachError;
use super::host::{PlatformDevice, SerialHost};
use super::port::SerialPort;
use crate::constants::{SERIAL_ALIAS_STEM, UART_COMPATIBLE, UART_NR};
use crate::driverlib::backend::RegisterIo;
use crate::driverlib::memmap::{Instance, UartInstance};
use crate::sync::InterruptControl;

/// Ports indexed by serial line number.
pub struct PortTable<B, M> {
    slots: [Once<SerialPort<B, M>>; UART_NR],
}

impl<B, M> Default for PortTable<B, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, M> PortTable<B, M> {
    pub const fn new() -> Self {
        Self {
            slots: [const { Once::new() }; UART_NR],
        }
    }

    /// Port bound to `line`, if any.
    pub fn get(&self, line: usize) -> Option<&SerialPort<B, M>> {
        self.slots.get(line)?.get()
    }

    /// Every bound port, in line order.
    pub fn iter(&self) -> impl Iterator<Item = &SerialPort<B, M>> {
        self.slots.iter().filter_map(Once::get)
    }
}

impl<B: RegisterIo, M: InterruptControl> PortTable<B, M> {
    /// Bind `instance`, creating its port on first use.
    ///
    /// `make_io` runs only when the slot is empty. An existing port keeps
    /// its register block and only takes the new clock rate.
    pub(crate) fn bind<F>(&self, instance: UartInstance, irq: u32, clk_rate: u32, make_io: F, intc: M) -> &SerialPort<B, M>
    where
        F: FnOnce(UartInstance) -> B,
    {
        let mut created = false;
        let port = self.slots[instance.line()].call_once(|| {
            created = true;
            SerialPort::new(instance, irq, make_io(instance), intc, clk_rate)
        });
        if !created {
            port.set_clock_rate(clk_rate);
        }
        port
    }

    /// Attach a platform device.
    ///
    /// Every resource is checked before the slot is touched, so a failed
    /// probe leaves the table as it was.
    pub fn probe<D, F>(&self, device: &mut D, make_io: F, intc: M) -> Result<&SerialPort<B, M>, AttachError>
    where
        D: PlatformDevice + ?Sized,
        F: FnOnce(UartInstance) -> B,
    {
        let result = Self::check(device);
        let (instance, irq, clk_rate) = match result {
            Ok(found) => found,
            Err(err) => {
                error!("m200-uart: probe failed: {}", err);
                return Err(err);
            }
        };

        let port = self.bind(instance, irq, clk_rate, make_io, intc);
        info!(
            "ttyS{}: {} at MMIO {:#x} (irq = {}) is a {}",
            instance.line(),
            instance.name(),
            instance.base(),
            irq,
            port.type_name()
        );
        Ok(port)
    }

    fn check<D: PlatformDevice + ?Sized>(device: &mut D) -> Result<(UartInstance, u32, u32), AttachError> {
        let line = device.alias_id(SERIAL_ALIAS_STEM).ok_or(AttachError::NoAlias)?;
        let instance = UartInstance::from_line(line).ok_or(AttachError::LineOutOfRange(line))?;
        if !device.is_compatible(UART_COMPATIBLE) {
            return Err(AttachError::NotCompatible);
        }
        let irq = device.irq().ok_or(AttachError::MissingIrq)?;
        let base = device.resource_base().ok_or(AttachError::MissingResource)?;
        if UartInstance::from_base(base) != Some(instance) {
            return Err(AttachError::ResourceMismatch { line, base });
        }
        let clk_rate = device.clock_rate().ok_or(AttachError::MissingClock)?;
        device.select_default_pins().map_err(AttachError::Pinctrl)?;
        Ok((instance, irq, clk_rate))
    }

    /// Shut down the port on `line`. The slot stays bound.
    pub fn remove<H: SerialHost + ?Sized>(&self, line: usize, host: &mut H) -> bool {
        match self.get(line) {
            Some(port) => {
                port.shutdown(host);
                true
            }
            None => false,
        }
    }
}

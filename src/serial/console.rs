// src/serial/console.rs

//! Boot console.
//!
//! The console is chosen once from the firmware's stdout path, before the
//! platform probe runs. It binds the port at the boot clock, keeps the
//! port's interrupt line masked and writes synchronously through the port
//! lock. When the probe later attaches the same line it reuses this port.

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use log::{info, warn};
use spin::Once;

use super::error::{AttachError, ConsoleError};
use super::host::Firmware;
use super::port::SerialPort;
use super::table::PortTable;
use super::termios::{ControlFlags, InputFlags, Termios};
use super::timeout::SpinBudget;
use crate::constants::{BOOT_CLOCK_HZ, DEFAULT_CONSOLE_OPTIONS, SERIAL_ALIAS_STEM};
use crate::driverlib::backend::RegisterIo;
use crate::driverlib::memmap::{Instance, UartInstance};
use crate::sync::InterruptControl;

/// Parsed `<baud><parity><bits><flow>` console options, e.g. `115200n8r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleOptions {
    pub baud: u32,
    /// `b'n'`, `b'o'` or `b'e'`
    pub parity: u8,
    pub bits: u8,
    pub rts_cts: bool,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            baud: 115_200,
            parity: b'n',
            bits: 8,
            rts_cts: false,
        }
    }
}

impl ConsoleOptions {
    /// Parse an option string. Missing trailing fields keep their defaults.
    pub fn parse(options: &str) -> Result<Self, ConsoleError> {
        let bytes = options.as_bytes();
        let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return Err(ConsoleError::BadOptions);
        }
        let baud = options[..digits]
            .parse::<u32>()
            .map_err(|_| ConsoleError::BadOptions)?;

        let mut opts = Self {
            baud,
            ..Self::default()
        };
        let mut rest = bytes[digits..].iter().copied().peekable();
        if let Some(&parity) = rest.peek() {
            if matches!(parity, b'n' | b'o' | b'e') {
                opts.parity = parity;
                rest.next();
            }
        }
        if let Some(&bits) = rest.peek() {
            if matches!(bits, b'5'..=b'8') {
                opts.bits = bits - b'0';
                rest.next();
            }
        }
        match rest.next() {
            Some(b'r') => opts.rts_cts = true,
            Some(_) => return Err(ConsoleError::BadOptions),
            None => {}
        }
        if rest.next().is_some() {
            return Err(ConsoleError::BadOptions);
        }
        Ok(opts)
    }

    pub fn termios(&self) -> Termios {
        let mut cflag = ControlFlags::CREAD | ControlFlags::HUPCL | ControlFlags::CLOCAL;
        cflag |= match self.bits {
            5 => ControlFlags::CS5,
            6 => ControlFlags::CS6,
            7 => ControlFlags::CS7,
            _ => ControlFlags::CS8,
        };
        match self.parity {
            b'o' => cflag |= ControlFlags::PARENB | ControlFlags::PARODD,
            b'e' => cflag |= ControlFlags::PARENB,
            _ => {}
        }
        if self.rts_cts {
            cflag |= ControlFlags::CRTSCTS;
        }
        Termios::new(cflag, InputFlags::empty(), self.baud)
    }
}

/// Split a stdout path into node path and option string.
fn split_stdout_path(stdout: &str) -> (&str, &str) {
    match stdout.split_once(':') {
        Some((path, options)) if !options.is_empty() => (path, options),
        Some((path, _)) => (path, DEFAULT_CONSOLE_OPTIONS),
        None => (stdout, DEFAULT_CONSOLE_OPTIONS),
    }
}

/// Process-wide console slot. Bound at most once.
pub struct Console<'t, B, M> {
    port: Once<&'t SerialPort<B, M>>,
    selecting: AtomicBool,
    dropped: AtomicUsize,
    budget: SpinBudget,
}

impl<B, M> Default for Console<'_, B, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t, B, M> Console<'t, B, M> {
    pub const fn new() -> Self {
        Self::with_budget(SpinBudget::console())
    }

    pub const fn with_budget(budget: SpinBudget) -> Self {
        Self {
            port: Once::new(),
            selecting: AtomicBool::new(false),
            dropped: AtomicUsize::new(0),
            budget,
        }
    }

    pub fn port(&self) -> Option<&'t SerialPort<B, M>> {
        self.port.get().copied()
    }

    pub fn is_selected(&self) -> bool {
        self.port.is_completed()
    }

    /// Bytes dropped because the transmitter never became ready.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<'t, B: RegisterIo, M: InterruptControl> Console<'t, B, M> {
    /// Bind the console from firmware configuration.
    ///
    /// Fails with [`ConsoleError::AlreadySelected`] on every call after the
    /// first successful one. A failed selection may be retried.
    pub fn select<F, W>(&self, firmware: &F, table: &'t PortTable<B, M>, make_io: W, intc: M) -> Result<&'t SerialPort<B, M>, ConsoleError>
    where
        F: Firmware + ?Sized,
        W: FnOnce(UartInstance) -> B,
    {
        if self
            .selecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ConsoleError::AlreadySelected);
        }

        match Self::bind(firmware, table, make_io, intc) {
            Ok(port) => Ok(*self.port.call_once(|| port)),
            Err(err) => {
                warn!("console: {}", err);
                self.selecting.store(false, Ordering::Release);
                Err(err)
            }
        }
    }

    fn bind<F, W>(firmware: &F, table: &'t PortTable<B, M>, make_io: W, intc: M) -> Result<&'t SerialPort<B, M>, ConsoleError>
    where
        F: Firmware + ?Sized,
        W: FnOnce(UartInstance) -> B,
    {
        let stdout = firmware.stdout_path().ok_or(ConsoleError::NoStdoutPath)?;
        let (path, options) = split_stdout_path(stdout);

        let line = firmware
            .alias_id(path, SERIAL_ALIAS_STEM)
            .ok_or(AttachError::NoAlias)?;
        let instance = UartInstance::from_line(line).ok_or(AttachError::LineOutOfRange(line))?;
        let base = firmware.resource_base(path).ok_or(AttachError::MissingResource)?;
        if UartInstance::from_base(base) != Some(instance) {
            return Err(AttachError::ResourceMismatch { line, base }.into());
        }
        let irq = firmware.irq(path).ok_or(AttachError::MissingIrq)?;
        let opts = ConsoleOptions::parse(options)?;

        // No handler exists yet; keep the line quiet until startup.
        intc.mask(irq);
        let port = table.bind(instance, irq, BOOT_CLOCK_HZ, make_io, intc);
        port.mark_console();
        let mut termios = opts.termios();
        port.set_termios(&mut termios, None);

        info!("console [ttyS{}] enabled on {} ({})", line, instance.name(), options);
        Ok(port)
    }

    /// Write synchronously. Returns the number of bytes dropped.
    pub fn write(&self, bytes: &[u8]) -> usize {
        let Some(port) = self.port() else {
            return 0;
        };
        let dropped = port.console_write(bytes, self.budget);
        if dropped != 0 {
            self.dropped.fetch_add(dropped, Ordering::Relaxed);
        }
        dropped
    }

    pub fn write_fmt(&self, args: fmt::Arguments<'_>) -> fmt::Result {
        fmt::write(&mut ConsoleWriter { console: self }, args)
    }
}

struct ConsoleWriter<'c, 't, B, M> {
    console: &'c Console<'t, B, M>,
}

impl<B: RegisterIo, M: InterruptControl> fmt::Write for ConsoleWriter<'_, '_, B, M> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.console.write(s.as_bytes());
        Ok(())
    }
}

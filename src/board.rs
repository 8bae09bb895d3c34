// src/board.rs

//! M200 board wiring.
//!
//! Binds the serial engine to the real register windows: the interrupt
//! controller, the port table, the boot console and the boot UART used by
//! the prom formatter.

use core::fmt::{self, Write};

#[cfg(feature = "console")]
use crate::serial::{Console, ConsoleError, Firmware};
use crate::driverlib::backend::MmioBackend;
use crate::driverlib::intc::Intc;
use crate::driverlib::memmap::{INTC_BASE, Instance, IntcInstance, UartInstance, kseg1};
use crate::driverlib::uart::Uart;
use crate::prom::{PromArg, PromBuffer, PromWriter, prom_vsprintf};
use crate::serial::{AttachError, IrqReturn, PlatformDevice, PortTable, SerialHost, SerialPort};

/// UART wired to the boot ROM's debug header.
pub const BOOT_UART: UartInstance = UartInstance::Uart3;

type BoardIntc = &'static Intc<MmioBackend>;

/// A serial port on this board.
pub type BoardPort = SerialPort<MmioBackend, BoardIntc>;

/// The interrupt controller. Every per-line mask change goes through here.
///
/// Shared without a lock: port locks mask their line through it from both
/// thread context and UART handlers.
pub static INTC: Intc<MmioBackend> =
    // SAFETY: the INTC window is fixed and this is its only backend.
    Intc::new(unsafe { MmioBackend::new(kseg1(INTC_BASE), IntcInstance::SPAN) });

/// Serial lines, indexed by `serial` alias number.
pub static PORTS: PortTable<MmioBackend, BoardIntc> = PortTable::new();

#[cfg(feature = "console")]
pub static CONSOLE: Console<'static, MmioBackend, BoardIntc> = Console::new();

fn make_uart_io(instance: UartInstance) -> MmioBackend {
    // SAFETY: the port table runs this at most once per line, and the port
    // it creates is the only owner of the block from then on.
    unsafe { MmioBackend::for_instance(instance) }
}

/// Bind the boot console from the firmware stdout path.
#[cfg(feature = "console")]
pub fn early_console<F: Firmware + ?Sized>(firmware: &F) -> Result<&'static BoardPort, ConsoleError> {
    CONSOLE.select(firmware, &PORTS, make_uart_io, &INTC)
}

/// Attach a UART platform device.
pub fn probe<D: PlatformDevice + ?Sized>(device: &mut D) -> Result<&'static BoardPort, AttachError> {
    PORTS.probe(device, make_uart_io, &INTC)
}

/// Top-level handler for the interrupt of serial line `line`.
pub fn handle_uart_irq<H: SerialHost + ?Sized>(line: usize, host: &mut H) -> IrqReturn {
    match PORTS.get(line) {
        Some(port) => port.handle_irq(host),
        None => IrqReturn::None,
    }
}

#[doc(hidden)]
#[cfg(feature = "console")]
pub fn console_print_impl(args: fmt::Arguments<'_>) {
    let _ = CONSOLE.write_fmt(args);
}

/// Prints through the boot console. Does nothing before a console is bound.
#[cfg(feature = "console")]
#[macro_export]
macro_rules! console_print {
    ($($arg:tt)*) => {
        $crate::board::console_print_impl(format_args!($($arg)*))
    };
}

/// Prints through the boot console, appending a newline.
#[cfg(feature = "console")]
#[macro_export]
macro_rules! console_println {
    () => ($crate::console_print!("\n"));
    ($fmt:expr) => ($crate::console_print!(concat!($fmt, "\n")));
    ($fmt:expr, $($arg:tt)*) => ($crate::console_print!(concat!($fmt, "\n"), $($arg)*));
}

/// Run `f` on the boot UART.
///
/// Once the port table holds the boot line, access goes through that
/// port's lock; before that the block is not owned by anyone yet.
fn with_boot_uart<R>(f: impl FnOnce(&mut Uart<MmioBackend>) -> R) -> R {
    match PORTS.get(BOOT_UART.line()) {
        Some(port) => port.with_uart(f),
        None => {
            let mut uart = Uart::new(BOOT_UART, make_uart_io(BOOT_UART));
            f(&mut uart)
        }
    }
}

/// Blocking output of one byte on the boot UART.
pub fn prom_putchar(byte: u8) {
    with_boot_uart(|uart| crate::prom::prom_putchar(uart, byte));
}

/// printf-style output on the boot UART. Returns the bytes sent.
pub fn prom_printf(template: &str, args: &[PromArg<'_>]) -> usize {
    let mut out = PromBuffer::new();
    let n = prom_vsprintf(&mut out, template, args);
    with_boot_uart(|uart| {
        for &byte in out.as_bytes() {
            crate::prom::prom_putchar(uart, byte);
        }
    });
    n
}

#[doc(hidden)]
pub fn prom_print_impl(args: fmt::Arguments<'_>) {
    #[cfg(feature = "console")]
    if CONSOLE.is_selected() {
        let _ = CONSOLE.write_fmt(args);
        return;
    }
    with_boot_uart(|uart| {
        let _ = PromWriter::new(uart).write_fmt(args);
    });
}

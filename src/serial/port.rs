// src/serial/port.rs

//! One UART line: interrupt handling, line configuration and console output.
//!
//! All mutable state lives in [`PortState`] behind an [`IrqMutex`] keyed on
//! the port's interrupt line. Process-context callers and the interrupt
//! handler go through the same lock, so the transmit queue indices and the
//! line settings are never observed half-updated.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use log::{debug, warn};

use super::error::AttachError;
use super::host::{IrqReturn, ModemLines, PortType, RxFlag, SerialHost};
use super::termios::{self, LineConfig, StatusMasks, Termios};
use super::timeout::{SpinBudget, spin_until};
use super::xmit::TransmitQueue;
use crate::constants::{DEFAULT_CONSOLE_BAUD, UART_TYPE_NAME, UART_XMIT_SIZE, WAKEUP_CHARS};
use crate::driverlib::backend::RegisterIo;
use crate::driverlib::memmap::{Instance, UartInstance};
use crate::driverlib::uart::{LineFormat, LineStatus, ModemControl, ModemStatus, Uart};
use crate::sync::{InterruptControl, IrqMutex, IrqMutexGuard};

/// Running line counters, as reported through `TIOCGICOUNT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorCounters {
    pub rx: u32,
    pub tx: u32,
    pub overrun: u32,
    pub parity: u32,
    pub frame: u32,
    pub brk: u32,
}

/// Lock-protected part of a port.
#[derive(Debug)]
pub struct PortState<B> {
    uart: Uart<B>,
    clk_rate: u32,
    config: LineConfig,
    masks: StatusMasks,
    icount: ErrorCounters,
    xmit: TransmitQueue<UART_XMIT_SIZE>,
    timeout: Duration,
}

impl<B: RegisterIo> PortState<B> {
    fn transmit_chars<H: SerialHost + ?Sized>(&mut self, host: &mut H) {
        while let Some(byte) = self.xmit.peek() {
            // FIFO full: leave TDRIE set and pick up on the next interrupt.
            if !self.uart.char_put_non_blocking(byte) {
                break;
            }
            self.xmit.advance();
            self.icount.tx = self.icount.tx.wrapping_add(1);
        }

        if self.xmit.pending() < WAKEUP_CHARS {
            host.write_wakeup();
        }
        if self.xmit.is_empty() {
            self.uart.tx_stop();
        }
    }

    fn receive_chars<H: SerialHost + ?Sized>(&mut self, mut status: LineStatus, host: &mut H) {
        loop {
            let byte = self.uart.receive_byte();
            self.icount.rx = self.icount.rx.wrapping_add(1);
            let flag = self.classify(status, host);
            if !self.ignored(status) {
                host.insert_char(byte, flag);
            }

            status = self.uart.lsr_get();
            if !status.rx_ready() {
                break;
            }
        }
        host.flip_buffer_push();
    }

    /// Count the errors latched with one byte and pick its flag.
    ///
    /// Counters take break, parity, overrun, framing in that order from the
    /// raw status. The flag takes break from the raw status and the rest
    /// from the bits enabled in the read mask.
    fn classify<H: SerialHost + ?Sized>(&mut self, status: LineStatus, host: &mut H) -> RxFlag {
        if !status.intersects(LineStatus::ERRORS) {
            return RxFlag::Normal;
        }

        let icount = &mut self.icount;
        if status.is_break() {
            icount.brk = icount.brk.wrapping_add(1);
            host.handle_break();
        } else if status.contains(LineStatus::PARER) {
            icount.parity = icount.parity.wrapping_add(1);
        } else if status.contains(LineStatus::OVER) {
            icount.overrun = icount.overrun.wrapping_add(1);
        } else if status.contains(LineStatus::FMER) {
            icount.frame = icount.frame.wrapping_add(1);
        }

        let reported = status & self.masks.read;
        if status.is_break() {
            RxFlag::Break
        } else if reported.contains(LineStatus::PARER) {
            RxFlag::Parity
        } else if reported.contains(LineStatus::OVER) {
            RxFlag::Overrun
        } else if reported.contains(LineStatus::FMER) {
            RxFlag::Frame
        } else {
            RxFlag::Normal
        }
    }

    /// Whether the byte is dropped instead of queued.
    ///
    /// Only errors enabled in the read mask can drop a byte, and an
    /// overrun never does: the byte that carries it was received intact.
    fn ignored(&self, status: LineStatus) -> bool {
        let reported = status & self.masks.read;
        self.masks.ignore.contains(LineStatus::DR)
            || reported.intersects(self.masks.ignore & LineStatus::ERRORS & !LineStatus::OVER)
    }
}

/// A UART line bound to its register block and interrupt.
pub struct SerialPort<B, M> {
    instance: UartInstance,
    irq: u32,
    intc: M,
    console: AtomicBool,
    state: IrqMutex<PortState<B>>,
}

impl<B, M> fmt::Debug for SerialPort<B, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialPort")
            .field("instance", &self.instance)
            .field("irq", &self.irq)
            .field("console", &self.console.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<B: RegisterIo, M: InterruptControl> SerialPort<B, M> {
    /// Bind `io` as the register block of `instance`. Touches no registers.
    pub fn new(instance: UartInstance, irq: u32, io: B, intc: M, clk_rate: u32) -> Self {
        let config = LineConfig::new(DEFAULT_CONSOLE_BAUD, LineFormat::EIGHT_N1);
        Self {
            instance,
            irq,
            intc,
            console: AtomicBool::new(false),
            state: IrqMutex::new(
                irq,
                PortState {
                    uart: Uart::new(instance, io),
                    clk_rate,
                    config,
                    masks: StatusMasks::default(),
                    icount: ErrorCounters::default(),
                    xmit: TransmitQueue::new(),
                    timeout: termios::fifo_timeout(config.format, config.baud),
                },
            ),
        }
    }

    fn lock(&self) -> IrqMutexGuard<'_, PortState<B>, M> {
        self.state.lock(&self.intc)
    }

    pub const fn instance(&self) -> UartInstance {
        self.instance
    }

    pub const fn line(&self) -> usize {
        self.instance.line()
    }

    pub const fn irq(&self) -> u32 {
        self.irq
    }

    pub fn interrupt_control(&self) -> &M {
        &self.intc
    }

    pub const fn type_name(&self) -> &'static str {
        UART_TYPE_NAME
    }

    /// Autoconfiguration always reports a 16550.
    pub fn config_port(&self) -> PortType {
        PortType::Uart16550
    }

    pub fn is_console(&self) -> bool {
        self.console.load(Ordering::Acquire)
    }

    pub(crate) fn mark_console(&self) {
        self.console.store(true, Ordering::Release);
    }

    pub fn clock_rate(&self) -> u32 {
        self.lock().clk_rate
    }

    /// Switch to the platform clock once the clock tree is up.
    pub fn set_clock_rate(&self, hz: u32) {
        self.lock().clk_rate = hz;
    }

    pub fn line_config(&self) -> LineConfig {
        self.lock().config
    }

    pub fn counters(&self) -> ErrorCounters {
        self.lock().icount
    }

    /// Time the line needs to drain a full FIFO at the current settings.
    pub fn timeout(&self) -> Duration {
        self.lock().timeout
    }

    /// Bytes queued for transmission.
    pub fn pending(&self) -> usize {
        self.lock().xmit.pending()
    }

    /// Register the interrupt handler and start receiving.
    pub fn startup<H: SerialHost + ?Sized>(&self, host: &mut H) -> Result<(), AttachError> {
        host.request_irq(self.irq, self.instance.name())
            .map_err(AttachError::IrqRequest)?;
        self.intc.unmask(self.irq);

        let mut port = self.lock();
        if !port.uart.is_enabled() {
            port.uart.enable();
        }
        port.uart.rx_start();
        Ok(())
    }

    /// Quiesce the line and release its interrupt. A console port keeps
    /// its module enabled for polled output.
    pub fn shutdown<H: SerialHost + ?Sized>(&self, host: &mut H) {
        {
            let mut port = self.lock();
            port.uart.tx_stop();
            port.uart.rx_stop();
            port.uart.modem_status_interrupt_disable();
            port.uart.break_control(false);
            port.xmit.clear();
            if !self.is_console() {
                port.uart.disable();
            }
        }
        host.free_irq(self.irq);
    }

    /// Shut the line down and hand the register block back.
    ///
    /// The interrupt line is left masked so nothing can reach the handler
    /// of a port that no longer exists.
    pub fn detach<H: SerialHost + ?Sized>(self, host: &mut H) -> B {
        self.shutdown(host);
        {
            let mut port = self.lock();
            port.uart.disable();
        }
        self.intc.mask(self.irq);
        self.state.into_inner().uart.into_inner()
    }

    /// Apply a termios request: disable, reprogram, re-enable.
    ///
    /// The effective baud rate is written back into `new`.
    pub fn set_termios(&self, new: &mut Termios, old: Option<&Termios>) -> LineConfig {
        let (config, masks) = termios::translate(new, old);
        let mut port = self.lock();

        port.uart.disable();
        let clk = port.clk_rate;
        let latched = port.uart.config_set_exp_clk(clk, config.baud, config.format);
        port.uart.flow_control_set(config.rts_cts);
        port.uart.enable();

        port.config = config;
        port.masks = masks;
        port.timeout = termios::fifo_timeout(config.format, config.baud);
        drop(port);

        if !latched {
            warn!("{}: line settings did not latch", self.instance.name());
        }
        debug!(
            "{}: {} baud {:?} rts/cts={} clk={}",
            self.instance.name(),
            config.baud,
            config.format,
            config.rts_cts,
            clk
        );
        config
    }

    /// Queue bytes for interrupt-driven transmission. Returns how many fit.
    pub fn write(&self, bytes: &[u8]) -> usize {
        let mut port = self.lock();
        let queued = port.xmit.extend_from_slice(bytes);
        if !port.xmit.is_empty() {
            port.uart.tx_start();
        }
        queued
    }

    /// Drop everything queued for transmission.
    pub fn flush_buffer(&self) {
        self.lock().xmit.clear();
    }

    pub fn start_tx(&self) {
        self.lock().uart.tx_start();
    }

    pub fn stop_tx(&self) {
        self.lock().uart.tx_stop();
    }

    pub fn start_rx(&self) {
        self.lock().uart.rx_start();
    }

    pub fn stop_rx(&self) {
        self.lock().uart.rx_stop();
    }

    /// Enable modem-status interrupts.
    pub fn enable_ms(&self) {
        self.lock().uart.modem_status_interrupt_enable();
    }

    pub fn break_ctl(&self, on: bool) {
        self.lock().uart.break_control(on);
    }

    pub fn tx_empty(&self) -> bool {
        self.lock().uart.tx_empty()
    }

    /// Drive RTS and loopback. The SoC has no DTR pin, so DTR is ignored.
    pub fn set_mctrl(&self, lines: ModemLines) {
        let mut port = self.lock();
        for (line, bit) in [
            (ModemLines::RTS, ModemControl::RTS),
            (ModemLines::LOOP, ModemControl::LOOP),
        ] {
            if lines.contains(line) {
                port.uart.modem_control_set(bit);
            } else {
                port.uart.modem_control_clear(bit);
            }
        }
    }

    /// Report modem lines. Loopback routes RTS back, so it reads as RTS;
    /// the unwired carrier and DSR inputs read as asserted.
    pub fn get_mctrl(&self) -> ModemLines {
        let mut port = self.lock();
        let mcr = port.uart.modem_control_get();
        let msr = port.uart.modem_status_get();

        let mut lines = ModemLines::CAR | ModemLines::DSR;
        if mcr.intersects(ModemControl::RTS | ModemControl::LOOP) {
            lines |= ModemLines::RTS;
        }
        if mcr.contains(ModemControl::LOOP) {
            lines |= ModemLines::LOOP;
        }
        if msr.contains(ModemStatus::CTS) {
            lines |= ModemLines::CTS;
        }
        lines
    }

    /// Service one interrupt.
    ///
    /// The line status is sampled once. Transmit work is done if that
    /// sample shows room with TDRIE enabled, receive work if it shows data.
    pub fn handle_irq<H: SerialHost + ?Sized>(&self, host: &mut H) -> IrqReturn {
        let mut port = self.lock();
        let status = port.uart.lsr_get();

        if port.uart.is_tx_interrupt(status) {
            port.transmit_chars(host);
        }
        if port.uart.is_rx_interrupt(status) {
            port.receive_chars(status, host);
        }
        IrqReturn::Handled
    }

    /// Polled console output. `\n` goes out as `\r\n`.
    ///
    /// Each byte gets `budget` attempts at the FIFO; a byte that still does
    /// not fit is dropped. Returns the number of bytes dropped.
    pub fn console_write(&self, bytes: &[u8], budget: SpinBudget) -> usize {
        let mut port = self.lock();
        let mut dropped = 0;
        for &byte in bytes {
            if byte == b'\n' && spin_until(budget, || port.uart.char_put_non_blocking(b'\r')).is_err() {
                dropped += 1;
            }
            if spin_until(budget, || port.uart.char_put_non_blocking(byte)).is_err() {
                dropped += 1;
            }
        }
        dropped
    }

    pub fn register_dump(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        self.lock().uart.register_dump(out)
    }

    /// Run `f` on the raw register handle under the port lock.
    pub fn with_uart<R>(&self, f: impl FnOnce(&mut Uart<B>) -> R) -> R {
        f(&mut self.lock().uart)
    }
}

// src/driverlib/uart.rs

//! UART register layer.
//!
//! The M200 UART is 16550-compatible with registers on a 4-byte stride and
//! a module-enable bit in the FIFO control register. FCR shares its offset
//! with the read-only IIR, so [`Uart`] keeps a shadow of the last FCR value
//! and checks FCR writes against it.

use core::fmt;

use bitflags::bitflags;

use super::backend::{Reg, RegisterExt, RegisterIo};
use super::memmap::{Instance, UartInstance};

/// Register map.
pub mod reg {
    use super::Reg;

    pub const RBR: Reg = Reg::w8("RBR", 0x00);
    pub const THR: Reg = Reg::w8("THR", 0x00);
    pub const DLLR: Reg = Reg::w8("DLLR", 0x00);
    pub const IER: Reg = Reg::w8("IER", 0x04);
    pub const DLHR: Reg = Reg::w8("DLHR", 0x04);
    pub const IIR: Reg = Reg::w8("IIR", 0x08);
    pub const FCR: Reg = Reg::w8("FCR", 0x08);
    pub const LCR: Reg = Reg::w8("LCR", 0x0C);
    pub const MCR: Reg = Reg::w8("MCR", 0x10);
    pub const LSR: Reg = Reg::w8("LSR", 0x14);
    pub const MSR: Reg = Reg::w8("MSR", 0x18);
    pub const SPR: Reg = Reg::w8("SPR", 0x1C);
    pub const ISR: Reg = Reg::w8("ISR", 0x20);
    pub const UMR: Reg = Reg::w8("UMR", 0x24);
    pub const UACR: Reg = Reg::w16("UACR", 0x28);
    pub const RCR: Reg = Reg::w8("RCR", 0x40);
    pub const TCR: Reg = Reg::w8("TCR", 0x44);

    /// Registers rendered by a dump. RBR pops the receive FIFO and IIR
    /// acknowledges interrupts, so neither is read.
    pub const DUMPED: [Reg; 11] = [IER, LCR, MCR, LSR, MSR, SPR, ISR, UMR, UACR, RCR, TCR];
}

bitflags! {
    /// Line status register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LineStatus: u8 {
        /// Receive data ready
        const DR = 1 << 0;
        /// Overrun error
        const OVER = 1 << 1;
        /// Parity error
        const PARER = 1 << 2;
        /// Framing error
        const FMER = 1 << 3;
        /// Break interrupt
        const BI = 1 << 4;
        /// Transmit data request (THR/FIFO has room)
        const TDRQ = 1 << 5;
        /// Transmitter empty
        const TEMT = 1 << 6;
        /// Error somewhere in the receive FIFO
        const FIFOE = 1 << 7;
    }
}

impl LineStatus {
    /// Error bits latched alongside received data.
    pub const ERRORS: Self = Self::OVER.union(Self::PARER).union(Self::FMER).union(Self::BI);

    pub const fn rx_ready(self) -> bool {
        self.contains(Self::DR)
    }

    pub const fn is_break(self) -> bool {
        self.contains(Self::BI)
    }

    pub const fn tx_ready(self) -> bool {
        self.contains(Self::TDRQ)
    }
}

bitflags! {
    /// Interrupt enable register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InterruptEnable: u8 {
        const RDRIE = 1 << 0;
        const TDRIE = 1 << 1;
        const RLSIE = 1 << 2;
        const MSIE = 1 << 3;
        const RTOIE = 1 << 4;
    }
}

bitflags! {
    /// FIFO control register (write-only).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FifoControl: u8 {
        /// FIFO mode enable
        const FME = 1 << 0;
        /// Receive FIFO reset (self-clearing)
        const RFRT = 1 << 1;
        /// Transmit FIFO reset (self-clearing)
        const TFRT = 1 << 2;
        /// DMA mode enable
        const DME = 1 << 3;
        /// UART module enable
        const UME = 1 << 4;
    }
}

bitflags! {
    /// Line control register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LineControl: u8 {
        const WLS0 = 1 << 0;
        const WLS1 = 1 << 1;
        /// Two stop bits
        const SBLS = 1 << 2;
        /// Parity enable
        const PE = 1 << 3;
        /// Even parity select
        const EPE = 1 << 4;
        /// Sticky parity
        const STPAR = 1 << 5;
        /// Set break
        const SBK = 1 << 6;
        /// Divisor latch access
        const DLAB = 1 << 7;
    }
}

bitflags! {
    /// Modem control register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModemControl: u8 {
        const RTS = 1 << 1;
        const LOOP = 1 << 4;
        /// Hardware flow control mode
        const FCM = 1 << 6;
        /// Modem control enable
        const MDCE = 1 << 7;
    }
}

bitflags! {
    /// Modem status register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModemStatus: u8 {
        /// CTS changed since the last read
        const CCTS = 1 << 0;
        /// Current CTS level
        const CTS = 1 << 4;
    }
}

/// Data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordLength {
    Five,
    Six,
    Seven,
    Eight,
}

impl WordLength {
    pub const fn bits(self) -> u32 {
        match self {
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
        }
    }

    const fn wls(self) -> u8 {
        match self {
            Self::Five => 0,
            Self::Six => 1,
            Self::Seven => 2,
            Self::Eight => 3,
        }
    }

    const fn from_wls(wls: u8) -> Self {
        match wls & 0x3 {
            0 => Self::Five,
            1 => Self::Six,
            2 => Self::Seven,
            _ => Self::Eight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopBits {
    One,
    Two,
}

/// Parity mode. Sticky parity transmits a constant parity bit: mark for
/// the odd variant, space for the even one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parity {
    None,
    Odd,
    Even,
    OddSticky,
    EvenSticky,
}

/// Character framing on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineFormat {
    pub word_length: WordLength,
    pub stop_bits: StopBits,
    pub parity: Parity,
}

impl LineFormat {
    /// 8 data bits, no parity, 1 stop bit.
    pub const EIGHT_N1: Self = Self {
        word_length: WordLength::Eight,
        stop_bits: StopBits::One,
        parity: Parity::None,
    };

    /// Pack into line control bits.
    pub fn to_lcr(self) -> LineControl {
        let mut lcr = LineControl::from_bits_retain(self.word_length.wls());
        if self.stop_bits == StopBits::Two {
            lcr |= LineControl::SBLS;
        }
        lcr |= match self.parity {
            Parity::None => LineControl::empty(),
            Parity::Odd => LineControl::PE,
            Parity::Even => LineControl::PE | LineControl::EPE,
            Parity::OddSticky => LineControl::PE | LineControl::STPAR,
            Parity::EvenSticky => LineControl::PE | LineControl::EPE | LineControl::STPAR,
        };
        lcr
    }

    /// Decode line control bits.
    pub fn from_lcr(lcr: LineControl) -> Self {
        let parity = if !lcr.contains(LineControl::PE) {
            Parity::None
        } else {
            match (lcr.contains(LineControl::EPE), lcr.contains(LineControl::STPAR)) {
                (false, false) => Parity::Odd,
                (true, false) => Parity::Even,
                (false, true) => Parity::OddSticky,
                (true, true) => Parity::EvenSticky,
            }
        };
        Self {
            word_length: WordLength::from_wls(lcr.bits()),
            stop_bits: if lcr.contains(LineControl::SBLS) {
                StopBits::Two
            } else {
                StopBits::One
            },
            parity,
        }
    }

    /// Bits on the wire per character, start bit included.
    pub const fn frame_bits(self) -> u32 {
        let parity = match self.parity {
            Parity::None => 0,
            _ => 1,
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        1 + self.word_length.bits() + parity + stop
    }
}

impl Default for LineFormat {
    fn default() -> Self {
        Self::EIGHT_N1
    }
}

/// Oversampling rate programmed into UMR.
const OVERSAMPLE: u32 = 16;

/// Divisor for `baud` at `clk`, rounded to nearest and clamped to 16 bits.
pub const fn divisor_for(clk: u32, baud: u32) -> u16 {
    if baud == 0 {
        return 0;
    }
    let denom = OVERSAMPLE as u64 * baud as u64;
    let div = (clk as u64 + denom / 2) / denom;
    if div == 0 {
        1
    } else if div > u16::MAX as u64 {
        u16::MAX
    } else {
        div as u16
    }
}

/// Handle over one UART register block.
#[derive(Debug)]
pub struct Uart<B> {
    io: B,
    instance: UartInstance,
    fcr: FifoControl,
}

impl<B: RegisterIo> Uart<B> {
    /// Wrap the register block of `instance`.
    pub const fn new(instance: UartInstance, io: B) -> Self {
        Self {
            io,
            instance,
            fcr: FifoControl::empty(),
        }
    }

    pub const fn instance(&self) -> UartInstance {
        self.instance
    }

    pub fn io_mut(&mut self) -> &mut B {
        &mut self.io
    }

    pub fn into_inner(self) -> B {
        self.io
    }

    fn write_fcr(&mut self, value: FifoControl) {
        self.io.write_reg(reg::FCR, u32::from(value.bits()));
        // Reset bits self-clear in hardware.
        self.fcr = value - (FifoControl::RFRT | FifoControl::TFRT);
    }

    /// Last value written to FCR, reset bits excluded.
    pub const fn fifo_control(&self) -> FifoControl {
        self.fcr
    }

    /// Enable the module with both FIFOs reset and enabled.
    pub fn enable(&mut self) -> bool {
        let value = self.fcr | FifoControl::FME | FifoControl::UME | FifoControl::RFRT | FifoControl::TFRT;
        self.write_fcr(value);
        self.fcr.contains(FifoControl::UME)
    }

    /// Disable the module. Line format may only change while disabled.
    pub fn disable(&mut self) -> bool {
        let value = self.fcr - FifoControl::UME;
        self.write_fcr(value);
        !self.fcr.contains(FifoControl::UME)
    }

    pub const fn is_enabled(&self) -> bool {
        self.fcr.contains(FifoControl::UME)
    }

    /// Program divisor and line format for `baud` at module clock `clk`.
    ///
    /// Returns false when `baud` is zero or the line format did not latch.
    pub fn config_set_exp_clk(&mut self, clk: u32, baud: u32, format: LineFormat) -> bool {
        if baud == 0 {
            return false;
        }
        let divisor = divisor_for(clk, baud);
        let lcr = format.to_lcr();

        self.io.write_reg(reg::LCR, u32::from((lcr | LineControl::DLAB).bits()));
        self.io.write_reg(reg::DLLR, u32::from(divisor & 0xFF));
        self.io.write_reg(reg::DLHR, u32::from(divisor >> 8));
        self.io.write_reg(reg::LCR, u32::from(lcr.bits()));
        self.io.write_reg(reg::UMR, OVERSAMPLE);
        self.io.write_reg(reg::UACR, 0);

        self.io.read_reg(reg::LCR) as u8 == lcr.bits()
    }

    /// Read back the programmed baud rate and line format.
    pub fn config_get_exp_clk(&mut self, clk: u32) -> (u32, LineFormat) {
        let lcr = self.io.read_reg(reg::LCR) as u8;
        self.io.write_reg(reg::LCR, u32::from(lcr | LineControl::DLAB.bits()));
        let low = self.io.read_reg(reg::DLLR);
        let high = self.io.read_reg(reg::DLHR);
        self.io.write_reg(reg::LCR, u32::from(lcr));

        let divisor = (high << 8) | low;
        let baud = if divisor == 0 {
            0
        } else {
            clk / (OVERSAMPLE * divisor)
        };
        (baud, LineFormat::from_lcr(LineControl::from_bits_retain(lcr)))
    }

    pub fn lsr_get(&mut self) -> LineStatus {
        LineStatus::from_bits_retain(self.io.read_reg(reg::LSR) as u8)
    }

    pub fn interrupt_enable_get(&mut self) -> InterruptEnable {
        InterruptEnable::from_bits_retain(self.io.read_reg(reg::IER) as u8)
    }

    fn ier_set(&mut self, flags: InterruptEnable) -> bool {
        self.io.set_bits(reg::IER, u32::from(flags.bits()))
    }

    fn ier_clear(&mut self, flags: InterruptEnable) -> bool {
        self.io.clear_bits(reg::IER, u32::from(flags.bits()))
    }

    /// Enable the transmit-data-request interrupt.
    pub fn tx_start(&mut self) -> bool {
        self.ier_set(InterruptEnable::TDRIE)
    }

    pub fn tx_stop(&mut self) -> bool {
        self.ier_clear(InterruptEnable::TDRIE)
    }

    /// Enable receive-data and receive-line-status interrupts.
    pub fn rx_start(&mut self) -> bool {
        self.ier_set(InterruptEnable::RDRIE | InterruptEnable::RLSIE)
    }

    pub fn rx_stop(&mut self) -> bool {
        self.ier_clear(InterruptEnable::RDRIE | InterruptEnable::RLSIE)
    }

    pub fn modem_status_interrupt_enable(&mut self) -> bool {
        self.ier_set(InterruptEnable::MSIE)
    }

    pub fn modem_status_interrupt_disable(&mut self) -> bool {
        self.ier_clear(InterruptEnable::MSIE)
    }

    /// Transmit interrupt pending: room in the FIFO and TDRIE enabled.
    pub fn is_tx_interrupt(&mut self, status: LineStatus) -> bool {
        status.tx_ready() && self.interrupt_enable_get().contains(InterruptEnable::TDRIE)
    }

    pub fn is_rx_interrupt(&self, status: LineStatus) -> bool {
        status.rx_ready()
    }

    pub fn is_rx_break_interrupt(&self, status: LineStatus) -> bool {
        status.is_break()
    }

    /// Queue one byte if the transmit FIFO has room.
    pub fn char_put_non_blocking(&mut self, byte: u8) -> bool {
        if self.lsr_get().tx_ready() {
            self.io.write_reg(reg::THR, u32::from(byte));
            true
        } else {
            false
        }
    }

    /// Queue one byte, spinning until the FIFO has room.
    pub fn char_put(&mut self, byte: u8) {
        while !self.lsr_get().tx_ready() {
            core::hint::spin_loop();
        }
        self.io.write_reg(reg::THR, u32::from(byte));
    }

    /// Read one byte, spinning until one arrives.
    pub fn char_get(&mut self) -> u8 {
        while !self.lsr_get().rx_ready() {
            core::hint::spin_loop();
        }
        self.receive_byte()
    }

    pub fn char_get_non_blocking(&mut self) -> Option<u8> {
        if self.lsr_get().rx_ready() {
            Some(self.receive_byte())
        } else {
            None
        }
    }

    /// Pop the receive FIFO without checking LSR. The caller must have
    /// observed `DR` in a status snapshot.
    pub fn receive_byte(&mut self) -> u8 {
        self.io.read_reg(reg::RBR) as u8
    }

    pub fn chars_avail(&mut self) -> bool {
        self.lsr_get().rx_ready()
    }

    /// Transmit FIFO and shift register both empty.
    pub fn tx_empty(&mut self) -> bool {
        self.lsr_get().contains(LineStatus::TEMT)
    }

    pub fn modem_control_set(&mut self, lines: ModemControl) -> bool {
        self.io.set_bits(reg::MCR, u32::from(lines.bits()))
    }

    pub fn modem_control_clear(&mut self, lines: ModemControl) -> bool {
        self.io.clear_bits(reg::MCR, u32::from(lines.bits()))
    }

    pub fn modem_control_get(&mut self) -> ModemControl {
        ModemControl::from_bits_retain(self.io.read_reg(reg::MCR) as u8)
    }

    pub fn modem_status_get(&mut self) -> ModemStatus {
        ModemStatus::from_bits_retain(self.io.read_reg(reg::MSR) as u8)
    }

    /// Hand RTS/CTS to the hardware flow-control logic, or take it back.
    pub fn flow_control_set(&mut self, rts_cts: bool) -> bool {
        let lines = ModemControl::MDCE | ModemControl::FCM;
        if rts_cts {
            self.modem_control_set(lines)
        } else {
            self.modem_control_clear(lines)
        }
    }

    /// Drive (or release) a break condition on TX.
    pub fn break_control(&mut self, on: bool) -> bool {
        let sbk = u32::from(LineControl::SBK.bits());
        if on {
            self.io.set_bits(reg::LCR, sbk)
        } else {
            self.io.clear_bits(reg::LCR, sbk)
        }
    }

    /// Render every side-effect-free register through `out`.
    pub fn register_dump(&mut self, out: &mut dyn fmt::Write) -> fmt::Result {
        let base = self.instance.base();
        writeln!(out, "{} @ {:#010x}", self.instance.name(), base)?;
        writeln!(out, "  {:<5}({:#010x}) = {:#04x} (shadow)", "FCR", base + reg::FCR.offset, self.fcr.bits())?;
        for r in reg::DUMPED {
            let value = self.io.read_reg(r);
            writeln!(out, "  {:<5}({:#010x}) = {:#06x}", r.name, base + r.offset, value)?;
        }
        Ok(())
    }
}

// src/driverlib/ost.rs

//! Operating system timer register layer.
//!
//! The OST is the 64-bit free-running counter inside the TCU block. Its
//! enable, flag, mask and stop bits each live at bit 15 of a status
//! register that is changed through a write-1-to-set / write-1-to-clear
//! register pair. Readback is always taken from the status register.

use core::fmt;

use super::backend::{Reg, RegisterExt, RegisterIo};
use super::memmap::{Instance, OstInstance};

/// Register map.
pub mod reg {
    use super::Reg;

    pub const ER: Reg = Reg::w16("ER", 0x10);
    pub const ESR: Reg = Reg::w16("ESR", 0x14);
    pub const ECR: Reg = Reg::w16("ECR", 0x18);
    pub const SR: Reg = Reg::w32("SR", 0x1C);
    pub const FR: Reg = Reg::w32("FR", 0x20);
    pub const FSR: Reg = Reg::w32("FSR", 0x24);
    pub const FCR: Reg = Reg::w32("FCR", 0x28);
    pub const SSR: Reg = Reg::w32("SSR", 0x2C);
    pub const MR: Reg = Reg::w32("MR", 0x30);
    pub const MSR: Reg = Reg::w32("MSR", 0x34);
    pub const MCR: Reg = Reg::w32("MCR", 0x38);
    pub const SCR: Reg = Reg::w32("SCR", 0x3C);
    pub const DR: Reg = Reg::w32("DR", 0xE0);
    pub const CNTL: Reg = Reg::w32("CNTL", 0xE4);
    pub const CNTH: Reg = Reg::w32("CNTH", 0xE8);
    pub const CSR: Reg = Reg::w16("CSR", 0xEC);
    pub const CNTHBUF: Reg = Reg::w32("CNTHBUF", 0xFC);

    /// Status and data registers. The set/clear ports are write-only and
    /// reading CNTL re-latches CNTHBUF.
    pub const DUMPED: [Reg; 8] = [ER, SR, FR, MR, DR, CNTH, CSR, CNTHBUF];
}

/// The OST bit in ER/FR/MR/SR and their set/clear ports.
pub const OST_BIT: u32 = 1 << 15;

/// CSR fields.
pub mod csr {
    /// 1: counter keeps running past a compare match.
    pub const CNT_MD: u32 = 1 << 15;
    /// 1: abrupt shutdown.
    pub const SD: u32 = 1 << 9;
    pub const PRESCALE: u32 = 0x7 << 3;
    pub const EXT_EN: u32 = 1 << 2;
    pub const RTC_EN: u32 = 1 << 1;
    pub const PCK_EN: u32 = 1 << 0;
    pub const CLOCK_SOURCE: u32 = EXT_EN | RTC_EN | PCK_EN;
}

/// Input clock divider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prescale {
    Div1,
    Div4,
    Div16,
    Div64,
    Div256,
    Div1024,
}

impl Prescale {
    const fn field(self) -> u32 {
        match self {
            Self::Div1 => 0,
            Self::Div4 => 1,
            Self::Div16 => 2,
            Self::Div64 => 3,
            Self::Div256 => 4,
            Self::Div1024 => 5,
        }
    }

    fn from_field(field: u32) -> Option<Self> {
        match field {
            0 => Some(Self::Div1),
            1 => Some(Self::Div4),
            2 => Some(Self::Div16),
            3 => Some(Self::Div64),
            4 => Some(Self::Div256),
            5 => Some(Self::Div1024),
            _ => None,
        }
    }

    pub const fn divider(self) -> u32 {
        1 << (2 * self.field())
    }
}

/// Counter clock input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockSource {
    Pclk,
    Rtc,
    Extal,
}

impl ClockSource {
    const fn bit(self) -> u32 {
        match self {
            Self::Pclk => csr::PCK_EN,
            Self::Rtc => csr::RTC_EN,
            Self::Extal => csr::EXT_EN,
        }
    }
}

/// What the counter does on a compare match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterMode {
    /// Counter resets to zero on match.
    CompareReset,
    /// Counter keeps running.
    FreeRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShutdownMode {
    Graceful,
    Abrupt,
}

/// Handle over the OST registers.
#[derive(Debug)]
pub struct Ost<B> {
    io: B,
    instance: OstInstance,
}

impl<B: RegisterIo> Ost<B> {
    pub const fn new(io: B) -> Self {
        Self {
            io,
            instance: OstInstance::Ost,
        }
    }

    pub fn io_mut(&mut self) -> &mut B {
        &mut self.io
    }

    pub fn interrupt_number(&self) -> u32 {
        self.instance.irq()
    }

    /// Write the OST bit to `port` and check it reads back as `set` in
    /// `status`.
    fn pulse(&mut self, port: Reg, status: Reg, set: bool) -> bool {
        self.io.write_reg(port, OST_BIT);
        self.io.bits_set(status, OST_BIT) == set
    }

    pub fn counter_enable(&mut self) -> bool {
        self.pulse(reg::ESR, reg::ER, true)
    }

    pub fn counter_disable(&mut self) -> bool {
        self.pulse(reg::ECR, reg::ER, false)
    }

    pub fn is_counter_enabled(&mut self) -> bool {
        self.io.bits_set(reg::ER, OST_BIT)
    }

    /// Compare-match flag. Reading does not clear it.
    pub fn match_flag_get(&mut self) -> bool {
        self.io.bits_set(reg::FR, OST_BIT)
    }

    pub fn match_flag_clear(&mut self) -> bool {
        self.pulse(reg::FCR, reg::FR, false)
    }

    /// Raise the compare-match flag from software.
    pub fn match_flag_force(&mut self) -> bool {
        self.pulse(reg::FSR, reg::FR, true)
    }

    /// Unmask the compare-match interrupt.
    pub fn match_interrupt_enable(&mut self) -> bool {
        self.pulse(reg::MCR, reg::MR, false)
    }

    pub fn match_interrupt_disable(&mut self) -> bool {
        self.pulse(reg::MSR, reg::MR, true)
    }

    /// Gate the counter clock.
    pub fn clock_stop(&mut self) -> bool {
        self.pulse(reg::SSR, reg::SR, true)
    }

    pub fn clock_start(&mut self) -> bool {
        self.pulse(reg::SCR, reg::SR, false)
    }

    pub fn compare_set(&mut self, value: u32) -> bool {
        self.io.write_field(reg::DR, u32::MAX, value)
    }

    pub fn compare_get(&mut self) -> u32 {
        self.io.read_reg(reg::DR)
    }

    /// Read the 64-bit counter. Reading CNTL latches the high word into
    /// CNTHBUF, so the two halves are coherent.
    pub fn counter_get(&mut self) -> u64 {
        let low = self.io.read_reg(reg::CNTL);
        let high = self.io.read_reg(reg::CNTHBUF);
        (u64::from(high) << 32) | u64::from(low)
    }

    /// Preload the counter. Only valid while the counter is disabled.
    pub fn counter_set(&mut self, value: u64) {
        debug_assert!(!self.is_counter_enabled(), "OST counter written while running");
        self.io.write_reg(reg::CNTL, value as u32);
        self.io.write_reg(reg::CNTH, (value >> 32) as u32);
    }

    pub fn prescale_set(&mut self, prescale: Prescale) -> bool {
        self.io.write_field(reg::CSR, csr::PRESCALE, prescale.field())
    }

    pub fn prescale_get(&mut self) -> Option<Prescale> {
        Prescale::from_field(self.io.read_field(reg::CSR, csr::PRESCALE))
    }

    /// Select exactly one clock input.
    pub fn clock_source_set(&mut self, source: ClockSource) -> bool {
        let current = self.io.read_reg(reg::CSR) & !csr::CLOCK_SOURCE;
        self.io.write_reg(reg::CSR, current | source.bit());
        self.io.read_reg(reg::CSR) & csr::CLOCK_SOURCE == source.bit()
    }

    pub fn counter_mode_set(&mut self, mode: CounterMode) -> bool {
        match mode {
            CounterMode::CompareReset => self.io.clear_bits(reg::CSR, csr::CNT_MD),
            CounterMode::FreeRunning => self.io.set_bits(reg::CSR, csr::CNT_MD),
        }
    }

    pub fn shutdown_mode_set(&mut self, mode: ShutdownMode) -> bool {
        match mode {
            ShutdownMode::Graceful => self.io.clear_bits(reg::CSR, csr::SD),
            ShutdownMode::Abrupt => self.io.set_bits(reg::CSR, csr::SD),
        }
    }

    pub fn register_dump(&mut self, out: &mut dyn fmt::Write) -> fmt::Result {
        let base = self.instance.base();
        writeln!(out, "{} @ {:#010x}", self.instance.name(), base)?;
        for r in reg::DUMPED {
            let value = self.io.read_reg(r);
            writeln!(out, "  {:<8}({:#010x}) = {:#010x}", r.name, base + r.offset, value)?;
        }
        Ok(())
    }
}

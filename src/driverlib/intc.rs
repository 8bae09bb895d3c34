// src/driverlib/intc.rs

//! Interrupt controller register layer.
//!
//! Two banks of 32 lines. Masking goes through the write-1 ICMSR/ICMCR
//! ports and is checked on ICMR. A single port write is the whole update,
//! so the controller needs no software lock and can be shared between
//! thread context and every UART handler.

use super::backend::{Reg, RegisterExt, SharedRegisterIo};

/// Register map of bank 0. Bank `n` sits at `n * BANK_STRIDE`.
pub mod reg {
    use super::Reg;

    pub const ICSR: Reg = Reg::w32("ICSR", 0x00);
    pub const ICMR: Reg = Reg::w32("ICMR", 0x04);
    pub const ICMSR: Reg = Reg::w32("ICMSR", 0x08);
    pub const ICMCR: Reg = Reg::w32("ICMCR", 0x0C);
    pub const ICPR: Reg = Reg::w32("ICPR", 0x10);
}

pub const BANK_STRIDE: usize = 0x20;
pub const LINES: u32 = 64;

pub(crate) fn banked(reg: Reg, irq: u32) -> (Reg, u32) {
    debug_assert!(irq < LINES, "interrupt line {} out of range", irq);
    let bank = (irq / 32) as usize;
    let reg = Reg {
        offset: reg.offset + bank * BANK_STRIDE,
        ..reg
    };
    (reg, 1 << (irq % 32))
}

/// Handle over the interrupt controller.
#[derive(Debug)]
pub struct Intc<B> {
    io: B,
}

impl<B> Intc<B> {
    pub const fn new(io: B) -> Self {
        Self { io }
    }

    pub fn io(&self) -> &B {
        &self.io
    }
}

impl<B: SharedRegisterIo> Intc<B> {
    /// Unmask `irq`.
    pub fn interrupt_enable(&self, irq: u32) -> bool {
        let mut io = &self.io;
        let (port, bit) = banked(reg::ICMCR, irq);
        let (status, _) = banked(reg::ICMR, irq);
        io.write_reg(port, bit);
        !io.bits_set(status, bit)
    }

    /// Mask `irq`.
    pub fn interrupt_disable(&self, irq: u32) -> bool {
        let mut io = &self.io;
        let (port, bit) = banked(reg::ICMSR, irq);
        let (status, _) = banked(reg::ICMR, irq);
        io.write_reg(port, bit);
        io.bits_set(status, bit)
    }

    pub fn is_masked(&self, irq: u32) -> bool {
        let mut io = &self.io;
        let (status, bit) = banked(reg::ICMR, irq);
        io.bits_set(status, bit)
    }

    /// Pending after masking.
    pub fn is_pending(&self, irq: u32) -> bool {
        let mut io = &self.io;
        let (pending, bit) = banked(reg::ICPR, irq);
        io.bits_set(pending, bit)
    }
}

#[cfg(test)]
pub(crate) type SimIntc = Intc<core::cell::RefCell<crate::testing::RegisterFile>>;

/// Register file wired with the ICMSR/ICMCR set and clear ports.
#[cfg(test)]
pub(crate) fn sim_intc_regs() -> crate::testing::RegisterFile {
    let mut regs = crate::testing::RegisterFile::new();
    for bank in 0..2 {
        let at = bank * BANK_STRIDE;
        regs.alias(reg::ICMSR.offset + at, reg::ICMR.offset + at, true);
        regs.alias(reg::ICMCR.offset + at, reg::ICMR.offset + at, false);
    }
    regs
}

#[cfg(test)]
pub(crate) fn sim_intc() -> SimIntc {
    Intc::new(core::cell::RefCell::new(sim_intc_regs()))
}

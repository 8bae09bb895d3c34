// src/driverlib/backend.rs

//! Register access backends.
//!
//! The driver libraries never touch memory directly. They go through the
//! [`RegisterIo`] trait, so the same accessor code runs against uncached
//! KSEG1 windows on the SoC and against an in-memory register file on the
//! host.

use core::ptr;

use super::memmap::{Instance, kseg1};

/// Access width of a hardware register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    W8,
    W16,
    W32,
}

/// A named register at a fixed offset from its instance base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg {
    pub name: &'static str,
    pub offset: usize,
    pub width: Width,
}

impl Reg {
    pub const fn w8(name: &'static str, offset: usize) -> Self {
        Self { name, offset, width: Width::W8 }
    }

    pub const fn w16(name: &'static str, offset: usize) -> Self {
        Self { name, offset, width: Width::W16 }
    }

    pub const fn w32(name: &'static str, offset: usize) -> Self {
        Self { name, offset, width: Width::W32 }
    }

    /// Mask covering every bit the register can hold.
    pub const fn width_mask(&self) -> u32 {
        match self.width {
            Width::W8 => 0xFF,
            Width::W16 => 0xFFFF,
            Width::W32 => u32::MAX,
        }
    }
}

/// Minimal abstraction over memory-mapped register access.
///
/// Offsets are relative to the instance base. Narrow accessors default to
/// the 32-bit ones, which is what a little-endian register file with one
/// register per word looks like.
pub trait RegisterIo {
    /// Read a 32-bit register.
    fn read32(&mut self, offset: usize) -> u32;
    /// Write a 32-bit register.
    fn write32(&mut self, offset: usize, value: u32);

    fn read16(&mut self, offset: usize) -> u16 {
        self.read32(offset) as u16
    }

    fn write16(&mut self, offset: usize, value: u16) {
        self.write32(offset, u32::from(value));
    }

    fn read8(&mut self, offset: usize) -> u8 {
        self.read32(offset) as u8
    }

    fn write8(&mut self, offset: usize, value: u8) {
        self.write32(offset, u32::from(value));
    }
}

impl<T: RegisterIo + ?Sized> RegisterIo for &mut T {
    fn read32(&mut self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&mut self, offset: usize, value: u32) {
        (**self).write32(offset, value)
    }

    fn read16(&mut self, offset: usize) -> u16 {
        (**self).read16(offset)
    }

    fn write16(&mut self, offset: usize, value: u16) {
        (**self).write16(offset, value)
    }

    fn read8(&mut self, offset: usize) -> u8 {
        (**self).read8(offset)
    }

    fn write8(&mut self, offset: usize, value: u8) {
        (**self).write8(offset, value)
    }
}

/// Register access through a shared borrow.
///
/// For blocks whose registers are touched from both thread context and
/// interrupt handlers without a software lock. Each call is one bus access,
/// so it is only sound for registers where a single write is the whole
/// update (set/clear ports and read-only status).
pub trait SharedRegisterIo {
    fn load32(&self, offset: usize) -> u32;
    fn store32(&self, offset: usize, value: u32);
}

impl<T: SharedRegisterIo + ?Sized> RegisterIo for &T {
    fn read32(&mut self, offset: usize) -> u32 {
        (**self).load32(offset)
    }

    fn write32(&mut self, offset: usize, value: u32) {
        (**self).store32(offset, value)
    }
}

/// Width-aware helpers shared by every accessor family.
///
/// Every mutating helper reads the register back and reports whether the
/// intended bits now hold. A `false` means the hardware did not latch the
/// write (stuck bit or wrong block), it is not a durability guarantee.
pub trait RegisterExt: RegisterIo {
    fn read_reg(&mut self, reg: Reg) -> u32 {
        match reg.width {
            Width::W8 => u32::from(self.read8(reg.offset)),
            Width::W16 => u32::from(self.read16(reg.offset)),
            Width::W32 => self.read32(reg.offset),
        }
    }

    fn write_reg(&mut self, reg: Reg, value: u32) {
        let value = value & reg.width_mask();
        match reg.width {
            Width::W8 => self.write8(reg.offset, value as u8),
            Width::W16 => self.write16(reg.offset, value as u16),
            Width::W32 => self.write32(reg.offset, value),
        }
    }

    /// Set `mask` in `reg`; true when all of `mask` reads back set.
    fn set_bits(&mut self, reg: Reg, mask: u32) -> bool {
        let value = self.read_reg(reg) | mask;
        self.write_reg(reg, value);
        self.read_reg(reg) & mask == mask
    }

    /// Clear `mask` in `reg`; true when all of `mask` reads back clear.
    fn clear_bits(&mut self, reg: Reg, mask: u32) -> bool {
        let value = self.read_reg(reg) & !mask;
        self.write_reg(reg, value);
        self.read_reg(reg) & mask == 0
    }

    /// Write `value` into the field selected by `mask`, truncating to the
    /// field width. True when the field reads back as the truncated value.
    fn write_field(&mut self, reg: Reg, mask: u32, value: u32) -> bool {
        let shift = mask.trailing_zeros();
        let field = value.wrapping_shl(shift) & mask;
        let current = self.read_reg(reg) & !mask;
        self.write_reg(reg, current | field);
        self.read_reg(reg) & mask == field
    }

    /// Read the field selected by `mask`, shifted down to bit 0.
    fn read_field(&mut self, reg: Reg, mask: u32) -> u32 {
        (self.read_reg(reg) & mask) >> mask.trailing_zeros()
    }

    /// Whether every bit of `mask` is set in `reg`.
    fn bits_set(&mut self, reg: Reg, mask: u32) -> bool {
        self.read_reg(reg) & mask == mask
    }
}

impl<T: RegisterIo + ?Sized> RegisterExt for T {}

/// Volatile MMIO backend over an uncached KSEG1 window.
#[derive(Debug)]
pub struct MmioBackend {
    base: usize,
    span: usize,
}

impl MmioBackend {
    /// Create a backend over `span` bytes starting at virtual address `base`.
    ///
    /// # Safety
    ///
    /// `base..base + span` must be a mapped, uncached device window that no
    /// other live backend aliases.
    pub const unsafe fn new(base: usize, span: usize) -> Self {
        Self { base, span }
    }

    /// Create a backend over the KSEG1 window of a hardware instance.
    ///
    /// # Safety
    ///
    /// The caller must hold exclusive ownership of the instance's register
    /// block for the lifetime of the backend.
    pub unsafe fn for_instance<I: Instance>(instance: I) -> Self {
        // SAFETY: KSEG1 maps every SoC block uncached; exclusivity is the
        // caller's contract.
        unsafe { Self::new(kseg1(instance.base()), I::SPAN) }
    }

    pub const fn base(&self) -> usize {
        self.base
    }

    #[inline]
    fn addr(&self, offset: usize, size: usize) -> usize {
        debug_assert!(
            offset + size <= self.span && offset % size == 0,
            "register offset {:#x} outside window of {:#x} bytes",
            offset,
            self.span
        );
        self.base + offset
    }
}

impl RegisterIo for MmioBackend {
    #[inline]
    fn read32(&mut self, offset: usize) -> u32 {
        let addr = self.addr(offset, 4);
        // SAFETY: addr lies inside the device window handed to `new`.
        unsafe { ptr::read_volatile(addr as *const u32) }
    }

    #[inline]
    fn write32(&mut self, offset: usize, value: u32) {
        let addr = self.addr(offset, 4);
        // SAFETY: addr lies inside the device window handed to `new`.
        unsafe { ptr::write_volatile(addr as *mut u32, value) }
    }

    #[inline]
    fn read16(&mut self, offset: usize) -> u16 {
        let addr = self.addr(offset, 2);
        // SAFETY: as above.
        unsafe { ptr::read_volatile(addr as *const u16) }
    }

    #[inline]
    fn write16(&mut self, offset: usize, value: u16) {
        let addr = self.addr(offset, 2);
        // SAFETY: as above.
        unsafe { ptr::write_volatile(addr as *mut u16, value) }
    }

    #[inline]
    fn read8(&mut self, offset: usize) -> u8 {
        let addr = self.addr(offset, 1);
        // SAFETY: as above.
        unsafe { ptr::read_volatile(addr as *const u8) }
    }

    #[inline]
    fn write8(&mut self, offset: usize, value: u8) {
        let addr = self.addr(offset, 1);
        // SAFETY: as above.
        unsafe { ptr::write_volatile(addr as *mut u8, value) }
    }
}

impl SharedRegisterIo for MmioBackend {
    #[inline]
    fn load32(&self, offset: usize) -> u32 {
        let addr = self.addr(offset, 4);
        // SAFETY: addr lies inside the device window handed to `new`.
        unsafe { ptr::read_volatile(addr as *const u32) }
    }

    #[inline]
    fn store32(&self, offset: usize, value: u32) {
        let addr = self.addr(offset, 4);
        // SAFETY: addr lies inside the device window handed to `new`.
        unsafe { ptr::write_volatile(addr as *mut u32, value) }
    }
}

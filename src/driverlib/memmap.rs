// src/driverlib/memmap.rs

//! Physical memory map and interrupt numbers of the M200 peripherals.
//!
//! Each peripheral family is a closed enum over its hardware instances, so
//! an accessor can never be pointed at a block that does not exist. Raw
//! addresses coming from firmware enter through [`Instance::from_base`].

/// Start of the uncached, unmapped kernel segment.
pub const KSEG1: usize = 0xA000_0000;

/// Mask that strips the segment bits from a kernel-segment address.
const PHYS_MASK: usize = 0x1FFF_FFFF;

/// Translate a physical address into its uncached KSEG1 alias.
pub const fn kseg1(phys: usize) -> usize {
    (phys & PHYS_MASK) | KSEG1
}

/// Translate a KSEG0/KSEG1 (or already physical) address to physical.
pub const fn physical(addr: usize) -> usize {
    addr & PHYS_MASK
}

/// A fixed hardware instance of a peripheral family.
pub trait Instance: Copy + Eq + Sized + 'static {
    /// Size of the register window in bytes.
    const SPAN: usize;
    /// Every instance of the family, in index order.
    const ALL: &'static [Self];

    /// Physical base address of the register block.
    fn base(self) -> usize;
    /// Interrupt line wired to this instance.
    fn irq(self) -> u32;
    /// Short name used in dumps and log lines.
    fn name(self) -> &'static str;

    /// Resolve a physical or KSEG0/KSEG1 address to an instance.
    fn from_base(addr: usize) -> Option<Self> {
        let phys = physical(addr);
        Self::ALL.iter().copied().find(|i| i.base() == phys)
    }

    /// Position of the instance within [`Instance::ALL`].
    fn index(self) -> usize {
        Self::ALL.iter().position(|i| *i == self).unwrap_or(0)
    }
}

/// UART instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UartInstance {
    Uart0,
    Uart1,
    Uart2,
    Uart3,
    Uart4,
}

impl UartInstance {
    /// Instance for a serial line number, if the SoC has one.
    pub const fn from_line(line: usize) -> Option<Self> {
        match line {
            0 => Some(Self::Uart0),
            1 => Some(Self::Uart1),
            2 => Some(Self::Uart2),
            3 => Some(Self::Uart3),
            4 => Some(Self::Uart4),
            _ => None,
        }
    }

    pub const fn line(self) -> usize {
        self as usize
    }
}

impl Instance for UartInstance {
    const SPAN: usize = 0x1000;
    const ALL: &'static [Self] = &[
        Self::Uart0,
        Self::Uart1,
        Self::Uart2,
        Self::Uart3,
        Self::Uart4,
    ];

    fn base(self) -> usize {
        0x1003_0000 + self.line() * 0x1000
    }

    fn irq(self) -> u32 {
        match self {
            Self::Uart0 => 51,
            Self::Uart1 => 50,
            Self::Uart2 => 49,
            Self::Uart3 => 48,
            Self::Uart4 => 34,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Uart0 => "UART0",
            Self::Uart1 => "UART1",
            Self::Uart2 => "UART2",
            Self::Uart3 => "UART3",
            Self::Uart4 => "UART4",
        }
    }

    fn index(self) -> usize {
        self.line()
    }
}

/// MMC/SD controller instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MscInstance {
    Msc0,
    Msc1,
    Msc2,
}

impl Instance for MscInstance {
    const SPAN: usize = 0x1_0000;
    const ALL: &'static [Self] = &[Self::Msc0, Self::Msc1, Self::Msc2];

    fn base(self) -> usize {
        match self {
            Self::Msc0 => 0x1345_0000,
            Self::Msc1 => 0x1346_0000,
            Self::Msc2 => 0x1347_0000,
        }
    }

    fn irq(self) -> u32 {
        match self {
            Self::Msc0 => 37,
            Self::Msc1 => 36,
            Self::Msc2 => 35,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Msc0 => "MSC0",
            Self::Msc1 => "MSC1",
            Self::Msc2 => "MSC2",
        }
    }
}

/// Operating system timer. The OST lives inside the TCU block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OstInstance {
    Ost,
}

impl Instance for OstInstance {
    const SPAN: usize = 0x100;
    const ALL: &'static [Self] = &[Self::Ost];

    fn base(self) -> usize {
        0x1000_2000
    }

    fn irq(self) -> u32 {
        27
    }

    fn name(self) -> &'static str {
        "OST"
    }
}

/// Physical base of the interrupt controller.
pub const INTC_BASE: usize = 0x1000_1000;

/// Interrupt controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntcInstance {
    Intc,
}

impl Instance for IntcInstance {
    const SPAN: usize = 0x40;
    const ALL: &'static [Self] = &[Self::Intc];

    fn base(self) -> usize {
        INTC_BASE
    }

    /// The controller itself is wired to CPU IP2, not to an INTC line.
    fn irq(self) -> u32 {
        2
    }

    fn name(self) -> &'static str {
        "INTC"
    }
}

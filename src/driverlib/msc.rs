// src/driverlib/msc.rs

//! MMC/SD controller register layer.
//!
//! Flat accessors over the MSC command, interrupt and DMA registers. The
//! controller has no driver state of its own here; [`Msc`] only binds a
//! register backend to one of the three instances.
//!
//! Interrupt sources are enabled by clearing their IMASK bit. IFLG bits are
//! latched by hardware and cleared by writing 1.

use core::fmt;

use bitflags::bitflags;

use super::backend::{Reg, RegisterExt, RegisterIo};
use super::memmap::{Instance, MscInstance};

/// Register map.
pub mod reg {
    use super::Reg;

    pub const CTRL: Reg = Reg::w16("CTRL", 0x00);
    pub const STAT: Reg = Reg::w32("STAT", 0x04);
    pub const CLKRT: Reg = Reg::w16("CLKRT", 0x08);
    pub const CMDAT: Reg = Reg::w32("CMDAT", 0x0C);
    pub const RESTO: Reg = Reg::w16("RESTO", 0x10);
    pub const RDTO: Reg = Reg::w32("RDTO", 0x14);
    pub const BLKLEN: Reg = Reg::w16("BLKLEN", 0x18);
    pub const NOB: Reg = Reg::w16("NOB", 0x1C);
    pub const SNOB: Reg = Reg::w32("SNOB", 0x20);
    pub const IMASK: Reg = Reg::w32("IMASK", 0x24);
    pub const IFLG: Reg = Reg::w32("IFLG", 0x28);
    pub const CMD: Reg = Reg::w8("CMD", 0x2C);
    pub const ARG: Reg = Reg::w32("ARG", 0x30);
    pub const RES: Reg = Reg::w16("RES", 0x34);
    pub const RXFIFO: Reg = Reg::w32("RXFIFO", 0x38);
    pub const TXFIFO: Reg = Reg::w32("TXFIFO", 0x3C);
    pub const LPM: Reg = Reg::w32("LPM", 0x40);
    pub const DMAC: Reg = Reg::w32("DMAC", 0x44);
    pub const DMANDA: Reg = Reg::w32("DMANDA", 0x48);
    pub const DMADA: Reg = Reg::w32("DMADA", 0x4C);
    pub const DMALEN: Reg = Reg::w32("DMALEN", 0x50);
    pub const DMACMD: Reg = Reg::w32("DMACMD", 0x54);
    pub const CTRL2: Reg = Reg::w32("CTRL2", 0x58);
    pub const RTCNT: Reg = Reg::w32("RTCNT", 0x5C);

    /// RES and RXFIFO pop on read and TXFIFO is write-only.
    pub const DUMPED: [Reg; 21] = [
        CTRL, STAT, CLKRT, CMDAT, RESTO, RDTO, BLKLEN, NOB, SNOB, IMASK, IFLG, CMD, ARG, LPM,
        DMAC, DMANDA, DMADA, DMALEN, DMACMD, CTRL2, RTCNT,
    ];
}

/// CTRL: start a new operation (self-clearing).
pub const CTRL_START_OP: u32 = 1 << 2;

/// CMDAT fields.
pub mod cmdat {
    pub const RESPONSE_FORMAT: u32 = 0x7;
    pub const DATA_EN: u32 = 1 << 3;
    pub const WRITE_READ: u32 = 1 << 4;
    pub const STREAM_BLOCK: u32 = 1 << 5;
    pub const BUSY: u32 = 1 << 6;
    pub const INIT: u32 = 1 << 7;
    pub const BUS_WIDTH: u32 = 0x3 << 9;
    pub const AUTO_CMD12: u32 = 1 << 16;
}

/// Block length field of BLKLEN.
pub const BLKLEN_MASK: u32 = 0x0FFF;
/// Number-of-blocks field of NOB.
pub const NOB_MASK: u32 = 0xFFFF;
/// Command index field of CMD.
pub const CMD_INDEX_MASK: u32 = 0x3F;
/// Response halfword in RES.
pub const RES_MASK: u32 = 0xFFFF;
/// DMAC: DMA enable.
pub const DMAC_DMAEN: u32 = 1 << 0;

bitflags! {
    /// Interrupt sources shared by IMASK and IFLG.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MscIrq: u32 {
        const DATA_TRAN_DONE = 1 << 0;
        const PRG_DONE = 1 << 1;
        const END_CMD_RES = 1 << 2;
        const SDIO = 1 << 7;
        const DMA_DATA_DONE = 1 << 31;
    }
}

/// Card bus width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusWidth {
    OneBit,
    FourBit,
    EightBit,
}

impl BusWidth {
    const fn field(self) -> u32 {
        match self {
            Self::OneBit => 0b00,
            Self::FourBit => 0b10,
            Self::EightBit => 0b11,
        }
    }

    fn from_field(field: u32) -> Option<Self> {
        match field {
            0b00 => Some(Self::OneBit),
            0b10 => Some(Self::FourBit),
            0b11 => Some(Self::EightBit),
            _ => None,
        }
    }
}

/// Expected command response format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResponseFormat {
    None = 0,
    R1R1b = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
}

/// Handle over one MSC register block.
#[derive(Debug)]
pub struct Msc<B> {
    io: B,
    instance: MscInstance,
}

impl<B: RegisterIo> Msc<B> {
    pub const fn new(instance: MscInstance, io: B) -> Self {
        Self { io, instance }
    }

    pub const fn instance(&self) -> MscInstance {
        self.instance
    }

    /// Interrupt line of this controller.
    pub fn interrupt_number(&self) -> u32 {
        self.instance.irq()
    }

    pub fn io_mut(&mut self) -> &mut B {
        &mut self.io
    }

    pub fn register_dump(&mut self, out: &mut dyn fmt::Write) -> fmt::Result {
        let base = self.instance.base();
        writeln!(out, "{} @ {:#010x}", self.instance.name(), base)?;
        for r in reg::DUMPED {
            let value = self.io.read_reg(r);
            writeln!(out, "  {:<6}({:#010x}) = {:#010x}", r.name, base + r.offset, value)?;
        }
        Ok(())
    }

    pub fn bus_width_set(&mut self, width: BusWidth) -> bool {
        self.io.write_field(reg::CMDAT, cmdat::BUS_WIDTH, width.field())
    }

    /// `None` when the field holds the reserved encoding.
    pub fn bus_width_get(&mut self) -> Option<BusWidth> {
        BusWidth::from_field(self.io.read_field(reg::CMDAT, cmdat::BUS_WIDTH))
    }

    pub fn response_format_set(&mut self, format: ResponseFormat) -> bool {
        self.io.write_field(reg::CMDAT, cmdat::RESPONSE_FORMAT, format as u32)
    }

    pub fn sdio_interrupt_enable(&mut self) -> bool {
        self.io.clear_bits(reg::IMASK, MscIrq::SDIO.bits())
    }

    pub fn sdio_interrupt_disable(&mut self) -> bool {
        self.io.set_bits(reg::IMASK, MscIrq::SDIO.bits())
    }

    /// Read timeout in MSC clock cycles.
    pub fn read_timeout_set(&mut self, clocks: u32) -> bool {
        self.io.write_field(reg::RDTO, u32::MAX, clocks)
    }

    pub fn read_timeout_get(&mut self) -> u32 {
        self.io.read_reg(reg::RDTO)
    }

    pub fn block_count_set(&mut self, count: u32) -> bool {
        self.io.write_field(reg::NOB, NOB_MASK, count)
    }

    pub fn block_count_get(&mut self) -> u32 {
        self.io.read_field(reg::NOB, NOB_MASK)
    }

    pub fn block_size_set(&mut self, size: u32) -> bool {
        self.io.write_field(reg::BLKLEN, BLKLEN_MASK, size)
    }

    pub fn block_size_get(&mut self) -> u32 {
        self.io.read_field(reg::BLKLEN, BLKLEN_MASK)
    }

    pub fn stream_mode_enable(&mut self) -> bool {
        self.io.set_bits(reg::CMDAT, cmdat::STREAM_BLOCK)
    }

    pub fn stream_mode_disable(&mut self) -> bool {
        self.io.clear_bits(reg::CMDAT, cmdat::STREAM_BLOCK)
    }

    /// Expect a busy signal after the command response.
    pub fn busy_set(&mut self) -> bool {
        self.io.set_bits(reg::CMDAT, cmdat::BUSY)
    }

    pub fn busy_clear(&mut self) -> bool {
        self.io.clear_bits(reg::CMDAT, cmdat::BUSY)
    }

    pub fn auto_cmd12_enable(&mut self) -> bool {
        self.io.set_bits(reg::CMDAT, cmdat::AUTO_CMD12)
    }

    pub fn auto_cmd12_disable(&mut self) -> bool {
        self.io.clear_bits(reg::CMDAT, cmdat::AUTO_CMD12)
    }

    pub fn command_index_set(&mut self, index: u32) -> bool {
        self.io.write_field(reg::CMD, CMD_INDEX_MASK, index)
    }

    pub fn command_argument_set(&mut self, argument: u32) -> bool {
        self.io.write_field(reg::ARG, u32::MAX, argument)
    }

    /// Kick off the command programmed into CMD/ARG/CMDAT.
    pub fn new_operation_start(&mut self) {
        let ctrl = self.io.read_reg(reg::CTRL);
        self.io.write_reg(reg::CTRL, ctrl | CTRL_START_OP);
    }

    fn irq_enable(&mut self, source: MscIrq) -> bool {
        self.io.clear_bits(reg::IMASK, source.bits())
    }

    fn irq_disable(&mut self, source: MscIrq) -> bool {
        self.io.set_bits(reg::IMASK, source.bits())
    }

    fn flag_get(&mut self, source: MscIrq) -> bool {
        self.io.bits_set(reg::IFLG, source.bits())
    }

    fn flag_clear(&mut self, source: MscIrq) -> bool {
        self.io.write_reg(reg::IFLG, source.bits());
        self.io.read_reg(reg::IFLG) & source.bits() == 0
    }

    pub fn end_command_response_enable(&mut self) -> bool {
        self.irq_enable(MscIrq::END_CMD_RES)
    }

    pub fn end_command_response_disable(&mut self) -> bool {
        self.irq_disable(MscIrq::END_CMD_RES)
    }

    pub fn end_command_response_flag_get(&mut self) -> bool {
        self.flag_get(MscIrq::END_CMD_RES)
    }

    pub fn end_command_response_flag_clear(&mut self) -> bool {
        self.flag_clear(MscIrq::END_CMD_RES)
    }

    pub fn sdio_interrupt_flag_get(&mut self) -> bool {
        self.flag_get(MscIrq::SDIO)
    }

    /// Next halfword of the command response. Each read pops the response
    /// FIFO.
    pub fn command_response_get(&mut self) -> u32 {
        self.io.read_field(reg::RES, RES_MASK)
    }

    pub fn data_transfer_done_enable(&mut self) -> bool {
        self.irq_enable(MscIrq::DATA_TRAN_DONE)
    }

    pub fn data_transfer_done_disable(&mut self) -> bool {
        self.irq_disable(MscIrq::DATA_TRAN_DONE)
    }

    pub fn data_transfer_done_flag_get(&mut self) -> bool {
        self.flag_get(MscIrq::DATA_TRAN_DONE)
    }

    pub fn data_transfer_done_flag_clear(&mut self) -> bool {
        self.flag_clear(MscIrq::DATA_TRAN_DONE)
    }

    /// Physical address of the first DMA descriptor.
    pub fn dma_descriptor_address_set(&mut self, address: u32) -> bool {
        self.io.write_field(reg::DMANDA, u32::MAX, address)
    }

    pub fn dma_descriptor_address_get(&mut self) -> u32 {
        self.io.read_reg(reg::DMANDA)
    }

    pub fn dma_data_done_enable(&mut self) -> bool {
        self.irq_enable(MscIrq::DMA_DATA_DONE)
    }

    pub fn dma_data_done_disable(&mut self) -> bool {
        self.irq_disable(MscIrq::DMA_DATA_DONE)
    }

    pub fn dma_data_done_flag_get(&mut self) -> bool {
        self.flag_get(MscIrq::DMA_DATA_DONE)
    }

    pub fn dma_data_done_flag_clear(&mut self) -> bool {
        self.flag_clear(MscIrq::DMA_DATA_DONE)
    }

    pub fn dma_enable(&mut self) -> bool {
        self.io.set_bits(reg::DMAC, DMAC_DMAEN)
    }

    pub fn dma_disable(&mut self) -> bool {
        self.io.clear_bits(reg::DMAC, DMAC_DMAEN)
    }

    /// The next command carries a data phase.
    pub fn data_enable(&mut self) -> bool {
        self.io.set_bits(reg::CMDAT, cmdat::DATA_EN)
    }

    pub fn data_disable(&mut self) -> bool {
        self.io.clear_bits(reg::CMDAT, cmdat::DATA_EN)
    }
}

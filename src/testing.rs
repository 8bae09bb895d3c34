// src/testing.rs

//! Host-side register models used by the unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::driverlib::backend::{RegisterIo, SharedRegisterIo};
use crate::serial::{Firmware, HostFault, PlatformDevice, RxFlag, SerialHost};

/// In-memory register file.
///
/// Models the register semantics the accessor families rely on: plain
/// read/write words, write-1-to-clear flags, write-1-to-set/clear aliases
/// that act on a target register, latched reads and stuck bits.
#[derive(Debug, Default)]
pub struct RegisterFile {
    values: HashMap<usize, u32>,
    w1c: HashSet<usize>,
    aliases: HashMap<usize, (usize, bool)>,
    latches: HashMap<usize, (usize, usize)>,
    stuck_low: HashMap<usize, u32>,
    scripts: HashMap<usize, VecDeque<u32>>,
    writes: Vec<(usize, u32)>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register value without going through write semantics.
    pub fn poke(&mut self, offset: usize, value: u32) {
        self.values.insert(offset, value);
    }

    /// Read a register value without side effects.
    pub fn peek(&self, offset: usize) -> u32 {
        self.values.get(&offset).copied().unwrap_or(0)
    }

    /// Writing 1 to a bit of `offset` clears it.
    pub fn write_one_to_clear(&mut self, offset: usize) {
        self.w1c.insert(offset);
    }

    /// Writes to `alias` set (or clear) the written bits in `target`.
    pub fn alias(&mut self, alias: usize, target: usize, set: bool) {
        self.aliases.insert(alias, (target, set));
    }

    /// Reading `trigger` copies `from` into `to`.
    pub fn latch_on_read(&mut self, trigger: usize, from: usize, to: usize) {
        self.latches.insert(trigger, (from, to));
    }

    /// Bits of `mask` at `offset` never latch a 1.
    pub fn stick_low(&mut self, offset: usize, mask: u32) {
        self.stuck_low.insert(offset, mask);
    }

    /// Queue values returned by successive reads of `offset`.
    pub fn script(&mut self, offset: usize, values: &[u32]) {
        self.scripts
            .entry(offset)
            .or_default()
            .extend(values.iter().copied());
    }

    /// Every write that reached `offset`, in order.
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.writes
            .iter()
            .filter(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn total_writes(&self) -> usize {
        self.writes.len()
    }

    fn store(&mut self, offset: usize, value: u32) {
        let stuck = self.stuck_low.get(&offset).copied().unwrap_or(0);
        self.values.insert(offset, value & !stuck);
    }
}

impl SharedRegisterIo for RefCell<RegisterFile> {
    fn load32(&self, offset: usize) -> u32 {
        self.borrow_mut().read32(offset)
    }

    fn store32(&self, offset: usize, value: u32) {
        self.borrow_mut().write32(offset, value)
    }
}

impl RegisterIo for RegisterFile {
    fn read32(&mut self, offset: usize) -> u32 {
        if let Some((from, to)) = self.latches.get(&offset).copied() {
            let latched = self.peek(from);
            self.values.insert(to, latched);
        }
        if let Some(value) = self.scripts.get_mut(&offset).and_then(VecDeque::pop_front) {
            return value;
        }
        self.peek(offset)
    }

    fn write32(&mut self, offset: usize, value: u32) {
        self.writes.push((offset, value));
        if let Some((target, set)) = self.aliases.get(&offset).copied() {
            let current = self.peek(target);
            let next = if set { current | value } else { current & !value };
            self.store(target, next);
        } else if self.w1c.contains(&offset) {
            let current = self.peek(offset);
            self.store(offset, current & !value);
        } else {
            self.store(offset, value);
        }
    }
}

const RBR: usize = 0x00;
const IER: usize = 0x04;
const IIR: usize = 0x08;
const LCR: usize = 0x0C;
const LSR: usize = 0x14;
const LCR_DLAB: u32 = 0x80;
const LSR_DR: u32 = 0x01;
const LSR_TDRQ: u32 = 0x20;
const LSR_TEMT: u32 = 0x40;
/// Divisor latches live behind RBR/IER while DLAB is set.
const DIVISOR_BANK: usize = 0x100;

/// A UART model with a receive FIFO, a bounded transmit FIFO and optional
/// scripted line-status reads.
#[derive(Debug)]
pub struct SimUart {
    pub regs: RegisterFile,
    rx: VecDeque<u8>,
    pub transmitted: Vec<u8>,
    tx_room: usize,
    lsr_script: VecDeque<u32>,
    line_errors: u32,
    pub fcr_writes: Vec<u8>,
    pub lsr_reads: usize,
}

impl Default for SimUart {
    fn default() -> Self {
        Self::new()
    }
}

impl SimUart {
    pub fn new() -> Self {
        Self {
            regs: RegisterFile::new(),
            rx: VecDeque::new(),
            transmitted: Vec::new(),
            tx_room: 64,
            lsr_script: VecDeque::new(),
            line_errors: 0,
            fcr_writes: Vec::new(),
            lsr_reads: 0,
        }
    }

    /// Bytes waiting in the receive FIFO.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    pub fn rx_left(&self) -> usize {
        self.rx.len()
    }

    /// How many more bytes the transmit FIFO accepts.
    pub fn set_tx_room(&mut self, room: usize) {
        self.tx_room = room;
    }

    /// Queue literal line-status values for the next reads.
    pub fn script_lsr(&mut self, values: &[u32]) {
        self.lsr_script.extend(values.iter().copied());
    }

    /// Error bits reported by every computed line-status read.
    pub fn set_line_errors(&mut self, bits: u32) {
        self.line_errors = bits;
    }

    pub fn reg(&self, offset: usize) -> u32 {
        self.regs.peek(offset)
    }

    /// Divisor currently held in DLLR/DLHR.
    pub fn divisor(&self) -> u16 {
        let low = self.regs.peek(DIVISOR_BANK + RBR);
        let high = self.regs.peek(DIVISOR_BANK + IER);
        ((high << 8) | low) as u16
    }

    fn dlab(&self) -> bool {
        self.regs.peek(LCR) & LCR_DLAB != 0
    }

    fn computed_lsr(&self) -> u32 {
        let mut lsr = self.line_errors;
        if !self.rx.is_empty() {
            lsr |= LSR_DR;
        }
        if self.tx_room > 0 {
            lsr |= LSR_TDRQ | LSR_TEMT;
        }
        lsr
    }
}

impl RegisterIo for SimUart {
    fn read32(&mut self, offset: usize) -> u32 {
        match offset {
            RBR | IER if self.dlab() => self.regs.read32(DIVISOR_BANK + offset),
            RBR => self.rx.pop_front().map_or(0, u32::from),
            IIR => 0xC1,
            LSR => {
                self.lsr_reads += 1;
                self.lsr_script
                    .pop_front()
                    .unwrap_or_else(|| self.computed_lsr())
            }
            _ => self.regs.read32(offset),
        }
    }

    fn write32(&mut self, offset: usize, value: u32) {
        match offset {
            RBR | IER if self.dlab() => self.regs.write32(DIVISOR_BANK + offset, value),
            RBR => {
                self.transmitted.push(value as u8);
                self.tx_room = self.tx_room.saturating_sub(1);
            }
            IIR => self.fcr_writes.push(value as u8),
            _ => self.regs.write32(offset, value),
        }
    }
}

/// Serial host that records everything the engine hands it.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub received: Vec<(u8, RxFlag)>,
    pub pushes: usize,
    pub breaks: usize,
    pub wakeups: usize,
    pub requested: Vec<(u32, &'static str)>,
    pub freed: Vec<u32>,
    pub refuse_irq: Option<HostFault>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.received.iter().map(|(b, _)| *b).collect()
    }
}

impl SerialHost for RecordingHost {
    fn insert_char(&mut self, byte: u8, flag: RxFlag) {
        self.received.push((byte, flag));
    }

    fn flip_buffer_push(&mut self) {
        self.pushes += 1;
    }

    fn handle_break(&mut self) {
        self.breaks += 1;
    }

    fn write_wakeup(&mut self) {
        self.wakeups += 1;
    }

    fn request_irq(&mut self, irq: u32, name: &'static str) -> Result<(), HostFault> {
        if let Some(fault) = self.refuse_irq {
            return Err(fault);
        }
        self.requested.push((irq, name));
        Ok(())
    }

    fn free_irq(&mut self, irq: u32) {
        self.freed.push(irq);
    }
}

/// Platform device with every resource present for one UART line.
#[derive(Debug, Clone)]
pub struct FakeDevice {
    pub alias: Option<usize>,
    pub compatible: &'static str,
    pub base: Option<usize>,
    pub irq: Option<u32>,
    pub clock: Option<u32>,
    pub pinctrl: Result<(), HostFault>,
    pub pins_selected: bool,
}

impl FakeDevice {
    /// A well-formed device for `line` with the given base and IRQ.
    pub fn uart(line: usize, base: usize, irq: u32) -> Self {
        Self {
            alias: Some(line),
            compatible: crate::constants::UART_COMPATIBLE,
            base: Some(base),
            irq: Some(irq),
            clock: Some(48_000_000),
            pinctrl: Ok(()),
            pins_selected: false,
        }
    }
}

impl PlatformDevice for FakeDevice {
    fn alias_id(&self, stem: &str) -> Option<usize> {
        assert_eq!(stem, "serial");
        self.alias
    }

    fn is_compatible(&self, compatible: &str) -> bool {
        self.compatible == compatible
    }

    fn resource_base(&self) -> Option<usize> {
        self.base
    }

    fn irq(&self) -> Option<u32> {
        self.irq
    }

    fn clock_rate(&self) -> Option<u32> {
        self.clock
    }

    fn select_default_pins(&mut self) -> Result<(), HostFault> {
        self.pins_selected = self.pinctrl.is_ok();
        self.pinctrl
    }
}

/// Firmware describing a single serial node.
#[derive(Debug, Clone)]
pub struct FakeFirmware {
    pub stdout: Option<String>,
    pub path: &'static str,
    pub alias: Option<usize>,
    pub base: Option<usize>,
    pub irq: Option<u32>,
}

impl FakeFirmware {
    pub fn new(stdout: &str, path: &'static str, line: usize, base: usize, irq: u32) -> Self {
        Self {
            stdout: Some(stdout.to_owned()),
            path,
            alias: Some(line),
            base: Some(base),
            irq: Some(irq),
        }
    }
}

impl Firmware for FakeFirmware {
    fn stdout_path(&self) -> Option<&str> {
        self.stdout.as_deref()
    }

    fn alias_id(&self, path: &str, stem: &str) -> Option<usize> {
        if path == self.path && stem == "serial" { self.alias } else { None }
    }

    fn resource_base(&self, path: &str) -> Option<usize> {
        if path == self.path { self.base } else { None }
    }

    fn irq(&self, path: &str) -> Option<u32> {
        if path == self.path { self.irq } else { None }
    }
}

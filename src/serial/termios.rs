// src/serial/termios.rs

//! Termios to UART line-settings translation.
//!
//! Flag values follow the Linux `termbits` encoding so the host line
//! discipline can pass its settings through unchanged.

use core::time::Duration;

use bitflags::bitflags;

use crate::constants::{FALLBACK_BAUD, MAX_BAUD, TIMEOUT_SLACK_US, UART_FIFO_SIZE};
use crate::driverlib::uart::{LineFormat, LineStatus, Parity, StopBits, WordLength};

bitflags! {
    /// Control modes (`c_cflag`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ControlFlags: u32 {
        const CSIZE = 0o60;
        const CS5 = 0o00;
        const CS6 = 0o20;
        const CS7 = 0o40;
        const CS8 = 0o60;
        const CSTOPB = 0o100;
        const CREAD = 0o200;
        const PARENB = 0o400;
        const PARODD = 0o1000;
        const HUPCL = 0o2000;
        const CLOCAL = 0o4000;
        const CMSPAR = 0o10000000000;
        const CRTSCTS = 0o20000000000;
    }
}

bitflags! {
    /// Input modes (`c_iflag`) that affect receive classification.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InputFlags: u32 {
        const IGNBRK = 0o1;
        const BRKINT = 0o2;
        const IGNPAR = 0o4;
        const PARMRK = 0o10;
        const INPCK = 0o20;
    }
}

/// Requested line settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termios {
    pub cflag: ControlFlags,
    pub iflag: InputFlags,
    pub ispeed: u32,
    pub ospeed: u32,
}

impl Termios {
    pub const fn new(cflag: ControlFlags, iflag: InputFlags, baud: u32) -> Self {
        Self {
            cflag,
            iflag,
            ispeed: baud,
            ospeed: baud,
        }
    }

    /// `baud` 8N1 with the receiver enabled.
    pub const fn raw(baud: u32) -> Self {
        Self::new(
            ControlFlags::CS8.union(ControlFlags::CREAD).union(ControlFlags::CLOCAL),
            InputFlags::empty(),
            baud,
        )
    }

    pub const fn baud(&self) -> u32 {
        self.ospeed
    }

    fn encode_baud(&mut self, baud: u32) {
        self.ispeed = baud;
        self.ospeed = baud;
    }
}

/// Effective line configuration of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineConfig {
    pub baud: u32,
    pub format: LineFormat,
    pub rts_cts: bool,
}

impl LineConfig {
    pub const fn new(baud: u32, format: LineFormat) -> Self {
        Self {
            baud,
            format,
            rts_cts: false,
        }
    }
}

/// Which status bits are reported, and which mark a byte to be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMasks {
    pub read: LineStatus,
    pub ignore: LineStatus,
}

impl Default for StatusMasks {
    fn default() -> Self {
        Self {
            read: LineStatus::OVER | LineStatus::DR,
            ignore: LineStatus::empty(),
        }
    }
}

/// Pick the baud rate to program.
///
/// Zero means hang-up and falls back to 9600. A rate above the hardware
/// limit keeps the previous setting when that one is usable.
pub fn resolve_baud(new: &Termios, old: Option<&Termios>) -> u32 {
    let requested = new.baud();
    if requested == 0 {
        return FALLBACK_BAUD;
    }
    if requested <= MAX_BAUD {
        return requested;
    }
    match old.map(Termios::baud) {
        Some(previous) if previous != 0 && previous <= MAX_BAUD => previous,
        _ => FALLBACK_BAUD,
    }
}

/// Line format requested by `cflag`. Parity bits without PARENB are ignored.
pub fn line_format(cflag: ControlFlags) -> LineFormat {
    let size = cflag & ControlFlags::CSIZE;
    let word_length = if size == ControlFlags::CS5 {
        WordLength::Five
    } else if size == ControlFlags::CS6 {
        WordLength::Six
    } else if size == ControlFlags::CS7 {
        WordLength::Seven
    } else {
        WordLength::Eight
    };
    let stop_bits = if cflag.contains(ControlFlags::CSTOPB) {
        StopBits::Two
    } else {
        StopBits::One
    };
    let parity = if !cflag.contains(ControlFlags::PARENB) {
        Parity::None
    } else {
        let odd = cflag.contains(ControlFlags::PARODD);
        match (odd, cflag.contains(ControlFlags::CMSPAR)) {
            (true, false) => Parity::Odd,
            (false, false) => Parity::Even,
            (true, true) => Parity::OddSticky,
            (false, true) => Parity::EvenSticky,
        }
    };
    LineFormat {
        word_length,
        stop_bits,
        parity,
    }
}

/// Derive the receive status masks from `iflag` and `cflag`.
pub fn status_masks(termios: &Termios) -> StatusMasks {
    let mut masks = StatusMasks::default();
    if termios.iflag.contains(InputFlags::INPCK) {
        masks.read |= LineStatus::FMER | LineStatus::PARER;
    }
    if termios.iflag.intersects(InputFlags::BRKINT | InputFlags::PARMRK) {
        masks.read |= LineStatus::BI;
    }

    if termios.iflag.contains(InputFlags::IGNPAR) {
        masks.ignore |= LineStatus::PARER | LineStatus::FMER;
    }
    if termios.iflag.contains(InputFlags::IGNBRK) {
        masks.ignore |= LineStatus::BI;
        // Overruns are noise too when both are ignored.
        if termios.iflag.contains(InputFlags::IGNPAR) {
            masks.ignore |= LineStatus::OVER;
        }
    }
    if !termios.cflag.contains(ControlFlags::CREAD) {
        masks.ignore |= LineStatus::DR;
    }
    masks
}

/// Resolve a termios request into the configuration to program.
///
/// The effective baud rate is written back into `new` unless the request
/// was a hang-up.
pub fn translate(new: &mut Termios, old: Option<&Termios>) -> (LineConfig, StatusMasks) {
    let baud = resolve_baud(new, old);
    if new.baud() != 0 {
        new.encode_baud(baud);
    }
    let config = LineConfig {
        baud,
        format: line_format(new.cflag),
        rts_cts: new.cflag.contains(ControlFlags::CRTSCTS),
    };
    (config, status_masks(new))
}

/// Time to drain a full FIFO at `baud`, plus slack.
pub fn fifo_timeout(format: LineFormat, baud: u32) -> Duration {
    let baud = u64::from(baud.max(1));
    let bits = u64::from(format.frame_bits()) * UART_FIFO_SIZE as u64;
    Duration::from_micros(bits * 1_000_000 / baud + TIMEOUT_SLACK_US)
}

// src/serial/error.rs

//! Error types for port attach and console selection

use core::fmt;

/// Error code reported by a host collaborator (negative errno style).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostFault(pub i32);

impl fmt::Display for HostFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host error {}", self.0)
    }
}

/// Port attach failure. No partially attached state survives one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachError {
    /// Device has no `serial` alias
    NoAlias,
    /// Alias names a line the SoC does not have
    LineOutOfRange(usize),
    /// Device is not an M200 UART
    NotCompatible,
    /// No register resource
    MissingResource,
    /// Register resource does not match the line's fixed base
    ResourceMismatch { line: usize, base: usize },
    /// No clock rate available
    MissingClock,
    /// No interrupt mapping
    MissingIrq,
    /// Default pin state could not be selected
    Pinctrl(HostFault),
    /// Host refused the interrupt line
    IrqRequest(HostFault),
}

impl AttachError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AttachError::NoAlias => "no serial alias",
            AttachError::LineOutOfRange(_) => "serial line out of range",
            AttachError::NotCompatible => "device not compatible",
            AttachError::MissingResource => "missing register resource",
            AttachError::ResourceMismatch { .. } => "register resource does not match line",
            AttachError::MissingClock => "missing clock",
            AttachError::MissingIrq => "missing interrupt",
            AttachError::Pinctrl(_) => "pin control failed",
            AttachError::IrqRequest(_) => "interrupt request failed",
        }
    }
}

impl fmt::Display for AttachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachError::LineOutOfRange(line) => write!(f, "{} ({})", self.as_str(), line),
            AttachError::ResourceMismatch { line, base } => {
                write!(f, "{} (line {}, base {:#x})", self.as_str(), line, base)
            }
            AttachError::Pinctrl(fault) | AttachError::IrqRequest(fault) => {
                write!(f, "{}: {}", self.as_str(), fault)
            }
            _ => f.write_str(self.as_str()),
        }
    }
}

/// Console selection failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    /// A console is already bound
    AlreadySelected,
    /// Firmware has no stdout path
    NoStdoutPath,
    /// Console port could not be bound
    Attach(AttachError),
    /// Option string did not parse
    BadOptions,
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::AlreadySelected => f.write_str("console already selected"),
            ConsoleError::NoStdoutPath => f.write_str("firmware has no stdout path"),
            ConsoleError::Attach(err) => write!(f, "console port: {}", err),
            ConsoleError::BadOptions => f.write_str("malformed console options"),
        }
    }
}

impl From<AttachError> for ConsoleError {
    fn from(err: AttachError) -> Self {
        ConsoleError::Attach(err)
    }
}

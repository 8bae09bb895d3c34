// src/errors.rs

//! Crate-level error type
//!
//! Subsystems keep their own error enums; [`BspError`] wraps them so board
//! bring-up code can propagate any of them with `?`.

use core::fmt;

use crate::serial::{AttachError, ConsoleError};

/// Top-level board-support error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BspError {
    /// Serial port attach failed
    Attach(AttachError),
    /// Console selection failed
    Console(ConsoleError),
}

impl BspError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BspError::Attach(_) => "serial attach error",
            BspError::Console(_) => "console error",
        }
    }
}

impl fmt::Display for BspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BspError::Attach(e) => write!(f, "{}: {}", self.as_str(), e),
            BspError::Console(e) => write!(f, "{}: {}", self.as_str(), e),
        }
    }
}

impl From<AttachError> for BspError {
    fn from(err: AttachError) -> Self {
        BspError::Attach(err)
    }
}

impl From<ConsoleError> for BspError {
    fn from(err: ConsoleError) -> Self {
        BspError::Console(err)
    }
}

/// Result alias for board bring-up
pub type Result<T> = core::result::Result<T, BspError>;

/// Longer, operator-facing description of an error
pub trait ErrorContext {
    fn context(&self) -> &'static str;
}

impl ErrorContext for AttachError {
    fn context(&self) -> &'static str {
        match self {
            AttachError::NoAlias => "Device tree node has no serialN alias",
            AttachError::LineOutOfRange(_) => "Serial alias names a UART the SoC does not have",
            AttachError::NotCompatible => "Device is not an M200 UART",
            AttachError::MissingResource => "Device has no register resource",
            AttachError::ResourceMismatch { .. } => "Register resource does not belong to the aliased UART",
            AttachError::MissingClock => "UART functional clock is not available",
            AttachError::MissingIrq => "Device has no interrupt",
            AttachError::Pinctrl(_) => "Default pin configuration could not be applied",
            AttachError::IrqRequest(_) => "Interrupt line could not be requested",
        }
    }
}

impl ErrorContext for BspError {
    fn context(&self) -> &'static str {
        match self {
            BspError::Attach(e) => e.context(),
            BspError::Console(ConsoleError::Attach(e)) => e.context(),
            BspError::Console(_) => "Boot console could not be selected",
        }
    }
}

// src/constants.rs

//! Board constants and compile-time configuration
//!
//! This module centralizes the values shared by the serial engine, the
//! console and the boot formatter.

/// Clock fed to the UARTs before the clock tree is brought up (EXTAL).
pub const BOOT_CLOCK_HZ: u32 = 24_000_000;

/// Highest baud rate the UART divisor can express at the boot clock.
pub const MAX_BAUD: u32 = 4_000_000;

/// Baud rate used when a request resolves to no usable rate.
pub const FALLBACK_BAUD: u32 = 9_600;

/// Console options applied when firmware supplies none.
pub const DEFAULT_CONSOLE_OPTIONS: &str = "115200n8";

/// Default console baud rate.
pub const DEFAULT_CONSOLE_BAUD: u32 = 115_200;

/// Depth of the hardware transmit and receive FIFOs.
pub const UART_FIFO_SIZE: usize = 64;

/// Software transmit queue capacity. Must be a power of two.
pub const UART_XMIT_SIZE: usize = 4096;

/// Writers are woken once fewer than this many bytes are pending.
pub const WAKEUP_CHARS: usize = 256;

/// Number of UART lines on the SoC.
pub const UART_NR: usize = 5;

/// Compatible string matched by the platform probe.
pub const UART_COMPATIBLE: &str = "ingenic,m200-uart";

/// Port type reported to the host serial core.
pub const UART_TYPE_NAME: &str = "M200_UART";

/// Device-tree alias stem used to number serial lines.
pub const SERIAL_ALIAS_STEM: &str = "serial";

/// Slack added to every derived character timeout, in microseconds (HZ/50).
pub const TIMEOUT_SLACK_US: u64 = 20_000;

/// Boot formatter output buffer size.
pub const PROM_BUFFER_SIZE: usize = 1024;

const _: () = assert!(UART_XMIT_SIZE.is_power_of_two());

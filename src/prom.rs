// src/prom.rs

//! Boot-time formatter.
//!
//! A printf-style writer for the earliest boot stages, before the console
//! or the logger exists. Output goes straight to a UART through the
//! blocking put accessor.
//!
//! Supported directives: `%d` signed decimal, `%x`/`%X` eight uppercase hex
//! digits, `%c` one byte, `%s` a string, `%%` a literal percent. Anything
//! else, including a directive without a matching argument, is copied to
//! the output unchanged.
//!
//! Zero prints as `0` and `00000000`; the boot ROM's formatter prints
//! nothing for a zero argument.

use core::fmt;

use crate::constants::PROM_BUFFER_SIZE;
use crate::driverlib::backend::RegisterIo;
use crate::driverlib::uart::Uart;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// One argument to [`prom_vsprintf`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromArg<'a> {
    Int(i32),
    Uint(u32),
    Char(u8),
    Str(&'a str),
}

/// Fixed output buffer. Bytes beyond the capacity are discarded.
pub struct PromBuffer {
    buf: [u8; PROM_BUFFER_SIZE],
    len: usize,
}

impl Default for PromBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PromBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; PROM_BUFFER_SIZE],
            len: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    fn push(&mut self, byte: u8) {
        if self.len < PROM_BUFFER_SIZE {
            self.buf[self.len] = byte;
            self.len += 1;
        }
    }

    fn extend(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push(b);
        }
    }

    fn push_decimal(&mut self, value: i64) {
        if value < 0 {
            self.push(b'-');
        }
        let mut magnitude = value.unsigned_abs();
        let mut digits = [0u8; 20];
        let mut n = 0;
        loop {
            digits[n] = b'0' + (magnitude % 10) as u8;
            n += 1;
            magnitude /= 10;
            if magnitude == 0 {
                break;
            }
        }
        for &d in digits[..n].iter().rev() {
            self.push(d);
        }
    }

    fn push_hex(&mut self, value: u32) {
        for shift in (0..8).rev() {
            self.push(HEX_DIGITS[(value >> (shift * 4)) as usize & 0xF]);
        }
    }
}

impl fmt::Debug for PromBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromBuffer").field("len", &self.len).finish()
    }
}

impl fmt::Write for PromBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.extend(s.as_bytes());
        Ok(())
    }
}

/// Render `template` with `args` into `out`. Returns the bytes written.
pub fn prom_vsprintf(out: &mut PromBuffer, template: &str, args: &[PromArg<'_>]) -> usize {
    let start = out.len();
    let mut args = args.iter();
    let mut bytes = template.bytes();

    while let Some(byte) = bytes.next() {
        if byte != b'%' {
            out.push(byte);
            continue;
        }
        let Some(directive) = bytes.next() else {
            out.push(b'%');
            break;
        };
        let rendered = match directive {
            b'%' => {
                out.push(b'%');
                true
            }
            b'd' | b'x' | b'X' | b'c' | b's' => match args.next() {
                Some(arg) => render(out, directive, *arg),
                None => false,
            },
            _ => false,
        };
        if !rendered {
            out.push(b'%');
            out.push(directive);
        }
    }
    out.len() - start
}

fn render(out: &mut PromBuffer, directive: u8, arg: PromArg<'_>) -> bool {
    match (directive, arg) {
        (b'd', PromArg::Int(v)) => out.push_decimal(i64::from(v)),
        (b'd', PromArg::Uint(v)) => out.push_decimal(i64::from(v)),
        (b'x' | b'X', PromArg::Int(v)) => out.push_hex(v as u32),
        (b'x' | b'X', PromArg::Uint(v)) => out.push_hex(v),
        (b'c', PromArg::Char(c)) => out.push(c),
        (b'c', PromArg::Int(v)) => out.push(v as u8),
        (b's', PromArg::Str(s)) => out.extend(s.as_bytes()),
        _ => return false,
    }
    true
}

/// Blocking single-byte output on `uart`.
pub fn prom_putchar<B: RegisterIo>(uart: &mut Uart<B>, byte: u8) {
    uart.char_put(byte);
}

/// Format and send through `uart`. Returns the bytes sent.
pub fn prom_printf<B: RegisterIo>(uart: &mut Uart<B>, template: &str, args: &[PromArg<'_>]) -> usize {
    let mut out = PromBuffer::new();
    let n = prom_vsprintf(&mut out, template, args);
    for &byte in out.as_bytes() {
        prom_putchar(uart, byte);
    }
    n
}

/// `fmt::Write` over a UART, for `write!` during early boot.
pub struct PromWriter<'a, B> {
    uart: &'a mut Uart<B>,
}

impl<'a, B: RegisterIo> PromWriter<'a, B> {
    pub fn new(uart: &'a mut Uart<B>) -> Self {
        Self { uart }
    }
}

impl<B: RegisterIo> fmt::Write for PromWriter<'_, B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            prom_putchar(self.uart, byte);
        }
        Ok(())
    }
}

/// Prints to the boot UART without going through the console.
#[macro_export]
macro_rules! prom_print {
    ($($arg:tt)*) => {
        $crate::board::prom_print_impl(format_args!($($arg)*))
    };
}

/// Prints to the boot UART, appending a newline.
#[macro_export]
macro_rules! prom_println {
    () => ($crate::prom_print!("\n"));
    ($fmt:expr) => ($crate::prom_print!(concat!($fmt, "\n")));
    ($fmt:expr, $($arg:tt)*) => ($crate::prom_print!(concat!($fmt, "\n"), $($arg)*));
}

#[cfg(test)]
mod tests {
    use core::fmt::Write;

    use super::*;
    use crate::driverlib::memmap::UartInstance;
    use crate::testing::SimUart;

    fn sprintf(template: &str, args: &[PromArg<'_>]) -> String {
        let mut out = PromBuffer::new();
        let n = prom_vsprintf(&mut out, template, args);
        assert_eq!(n, out.len());
        String::from_utf8(out.as_bytes().to_vec()).expect("ascii output")
    }

    #[test]
    fn decimal_conversion() {
        assert_eq!(sprintf("%d", &[PromArg::Int(0)]), "0");
        assert_eq!(sprintf("%d", &[PromArg::Int(1234)]), "1234");
        assert_eq!(sprintf("%d", &[PromArg::Int(-56)]), "-56");
        assert_eq!(sprintf("%d", &[PromArg::Int(i32::MIN)]), "-2147483648");
        assert_eq!(sprintf("%d", &[PromArg::Uint(u32::MAX)]), "4294967295");
    }

    #[test]
    fn hex_is_eight_uppercase_digits() {
        assert_eq!(sprintf("%x", &[PromArg::Uint(0x1003_3000)]), "10033000");
        assert_eq!(sprintf("%X", &[PromArg::Uint(0xbeef)]), "0000BEEF");
        assert_eq!(sprintf("%x", &[PromArg::Int(-1)]), "FFFFFFFF");
        assert_eq!(sprintf("%x", &[PromArg::Uint(0)]), "00000000");
    }

    #[test]
    fn chars_strings_and_text() {
        let out = sprintf(
            "cpu%c: %s rev %d\n",
            &[PromArg::Char(b'0'), PromArg::Str("xburst"), PromArg::Int(2)],
        );
        assert_eq!(out, "cpu0: xburst rev 2\n");
    }

    #[test]
    fn unknown_and_unmatched_directives_are_literal() {
        assert_eq!(sprintf("100%% %q", &[]), "100% %q");
        assert_eq!(sprintf("%d and %s", &[PromArg::Int(1)]), "1 and %s");
        assert_eq!(sprintf("%s", &[PromArg::Int(1)]), "%s");
        assert_eq!(sprintf("tail %", &[]), "tail %");
    }

    #[test]
    fn output_is_capped() {
        let long = "x".repeat(PROM_BUFFER_SIZE + 100);
        let mut out = PromBuffer::new();
        let n = prom_vsprintf(&mut out, &long, &[]);
        assert_eq!(n, PROM_BUFFER_SIZE);
        assert_eq!(out.len(), PROM_BUFFER_SIZE);
    }

    #[test]
    fn printf_goes_to_uart() {
        let mut uart = Uart::new(UartInstance::Uart3, SimUart::new());
        let n = prom_printf(&mut uart, "irq %d\n", &[PromArg::Int(48)]);
        assert_eq!(n, 7);
        assert_eq!(uart.io_mut().transmitted, b"irq 48\n");
    }

    #[test]
    fn writer_formats_rust_arguments() {
        let mut uart = Uart::new(UartInstance::Uart3, SimUart::new());
        write!(PromWriter::new(&mut uart), "{}:{:02}", "t", 5).expect("write");
        assert_eq!(uart.io_mut().transmitted, b"t:05");
    }
}

// src/serial/tests.rs

//! Engine scenarios against the simulated UART and interrupt controller.

use core::time::Duration;
use std::cell::RefCell;

use super::*;
use crate::driverlib::backend::{RegisterIo, SharedRegisterIo};
use crate::driverlib::intc::{self, Intc, SimIntc, sim_intc, sim_intc_regs};
use crate::driverlib::memmap::{Instance, UartInstance};
use crate::driverlib::uart::{InterruptEnable, LineStatus, ModemControl, ModemStatus, reg};
use crate::driverlib::LineFormat;
use crate::sync::InterruptControl;
use crate::testing::{FakeDevice, RecordingHost, RegisterFile, SimUart};

type Intctl = SimIntc;
type TestPort = SerialPort<SimUart, Intctl>;

const CLK: u32 = 48_000_000;

fn port_on(instance: UartInstance) -> TestPort {
    SerialPort::new(instance, instance.irq(), SimUart::new(), sim_intc(), CLK)
}

fn port() -> TestPort {
    port_on(UartInstance::Uart3)
}

fn ier(port: &TestPort) -> InterruptEnable {
    port.with_uart(|u| u.interrupt_enable_get())
}

fn masked(port: &TestPort) -> bool {
    port.interrupt_control().is_masked(port.irq())
}

#[test]
fn at_command_drains_and_stops_tx() {
    let port = port();
    let mut termios = Termios::raw(115_200);
    port.set_termios(&mut termios, None);
    let mut host = RecordingHost::new();

    assert_eq!(port.write(b"AT\r\n"), 4);
    assert!(ier(&port).contains(InterruptEnable::TDRIE));

    assert_eq!(port.handle_irq(&mut host), IrqReturn::Handled);
    assert_eq!(port.with_uart(|u| u.io_mut().transmitted.clone()), b"AT\r\n");
    assert_eq!(port.pending(), 0);
    assert!(!ier(&port).contains(InterruptEnable::TDRIE));
    assert_eq!(port.counters().tx, 4);
    assert_eq!(host.wakeups, 1);
    assert!(host.received.is_empty());
}

#[test]
fn full_fifo_leaves_tdrie_set() {
    let port = port();
    let mut host = RecordingHost::new();
    port.with_uart(|u| u.io_mut().set_tx_room(2));

    port.write(b"hello");
    port.handle_irq(&mut host);

    assert_eq!(port.with_uart(|u| u.io_mut().transmitted.clone()), b"he");
    assert_eq!(port.pending(), 3);
    assert!(ier(&port).contains(InterruptEnable::TDRIE));

    port.with_uart(|u| u.io_mut().set_tx_room(64));
    port.handle_irq(&mut host);
    assert_eq!(port.with_uart(|u| u.io_mut().transmitted.clone()), b"hello");
    assert!(!ier(&port).contains(InterruptEnable::TDRIE));
}

#[test]
fn wakeup_waits_for_queue_to_shrink() {
    let port = port();
    let mut host = RecordingHost::new();
    port.with_uart(|u| u.io_mut().set_tx_room(16));

    let payload = [b'x'; 400];
    port.write(&payload);
    port.handle_irq(&mut host);
    assert_eq!(port.pending(), 384);
    assert_eq!(host.wakeups, 0);
}

#[test]
fn receive_stops_when_status_clears() {
    let port = port();
    let mut host = RecordingHost::new();
    port.with_uart(|u| {
        u.io_mut().feed(b"xyz");
        let dr = u32::from(LineStatus::DR.bits());
        u.io_mut().script_lsr(&[dr, dr, 0]);
    });

    port.handle_irq(&mut host);

    assert_eq!(host.received, [(b'x', RxFlag::Normal), (b'y', RxFlag::Normal)]);
    assert_eq!(host.pushes, 1);
    assert_eq!(port.counters().rx, 2);
    assert_eq!(port.with_uart(|u| u.io_mut().rx_left()), 1);
}

#[test]
fn idle_interrupt_changes_nothing() {
    let port = port();
    let mut host = RecordingHost::new();

    port.handle_irq(&mut host);

    assert!(host.received.is_empty());
    assert_eq!(host.pushes, 0);
    assert_eq!(port.counters(), ErrorCounters::default());
    assert!(port.with_uart(|u| u.io_mut().transmitted.is_empty()));
}

#[test]
fn break_wins_over_parity() {
    let port = port();
    let mut host = RecordingHost::new();
    port.with_uart(|u| {
        u.io_mut().feed(&[0]);
        u.io_mut().set_line_errors(u32::from((LineStatus::BI | LineStatus::PARER).bits()));
    });
    let mut termios = Termios::raw(115_200);
    termios.iflag = InputFlags::INPCK;
    port.set_termios(&mut termios, None);

    port.handle_irq(&mut host);

    assert_eq!(host.received, [(0, RxFlag::Break)]);
    assert_eq!(host.breaks, 1);
    let counters = port.counters();
    assert_eq!(counters.brk, 1);
    assert_eq!(counters.parity, 0);
}

#[test]
fn parity_needs_inpck_to_be_reported() {
    let port = port();
    let mut host = RecordingHost::new();
    port.with_uart(|u| {
        u.io_mut().feed(b"ab");
        u.io_mut().set_line_errors(u32::from(LineStatus::PARER.bits()));
        let status = u32::from((LineStatus::DR | LineStatus::PARER).bits());
        u.io_mut().script_lsr(&[status, status, 0]);
    });
    port.handle_irq(&mut host);
    assert_eq!(host.received[0], (b'a', RxFlag::Normal));
    assert_eq!(port.counters().parity, 2);

    let mut termios = Termios::raw(115_200);
    termios.iflag = InputFlags::INPCK;
    port.set_termios(&mut termios, None);
    port.with_uart(|u| {
        u.io_mut().feed(b"c");
        let status = u32::from((LineStatus::DR | LineStatus::PARER).bits());
        u.io_mut().script_lsr(&[status, 0]);
    });
    port.handle_irq(&mut host);
    assert_eq!(host.received.last().copied(), Some((b'c', RxFlag::Parity)));
}

#[test]
fn overrun_is_flagged_by_default() {
    let port = port();
    let mut host = RecordingHost::new();
    port.with_uart(|u| {
        u.io_mut().feed(b"q");
        let status = u32::from((LineStatus::DR | LineStatus::OVER).bits());
        u.io_mut().script_lsr(&[status, 0]);
    });
    port.handle_irq(&mut host);
    assert_eq!(host.received, [(b'q', RxFlag::Overrun)]);
    assert_eq!(port.counters().overrun, 1);
}

#[test]
fn ignored_errors_are_counted_but_dropped() {
    let port = port();
    let mut host = RecordingHost::new();
    let mut termios = Termios::raw(115_200);
    termios.iflag = InputFlags::INPCK | InputFlags::IGNPAR;
    port.set_termios(&mut termios, None);
    port.with_uart(|u| {
        u.io_mut().feed(b"ok!");
        let good = u32::from(LineStatus::DR.bits());
        let bad = u32::from((LineStatus::DR | LineStatus::FMER).bits());
        u.io_mut().script_lsr(&[good, bad, good, 0]);
    });

    port.handle_irq(&mut host);

    assert_eq!(host.bytes(), b"o!");
    assert_eq!(port.counters().frame, 1);
    assert_eq!(port.counters().rx, 3);
}

#[test]
fn unchecked_parity_error_is_delivered() {
    let port = port();
    let mut host = RecordingHost::new();
    let mut termios = Termios::raw(115_200);
    termios.iflag = InputFlags::IGNPAR;
    port.set_termios(&mut termios, None);
    port.with_uart(|u| {
        u.io_mut().feed(b"k");
        let status = u32::from((LineStatus::DR | LineStatus::PARER).bits());
        u.io_mut().script_lsr(&[status, 0]);
    });

    port.handle_irq(&mut host);

    assert_eq!(host.received, [(b'k', RxFlag::Normal)]);
    assert_eq!(port.counters().parity, 1);
}

#[test]
fn overrun_byte_survives_ignore_everything() {
    let port = port();
    let mut host = RecordingHost::new();
    let mut termios = Termios::raw(115_200);
    termios.iflag = InputFlags::IGNBRK | InputFlags::IGNPAR;
    port.set_termios(&mut termios, None);
    port.with_uart(|u| {
        u.io_mut().feed(b"v");
        let status = u32::from((LineStatus::DR | LineStatus::OVER).bits());
        u.io_mut().script_lsr(&[status, 0]);
    });

    port.handle_irq(&mut host);

    assert_eq!(host.received, [(b'v', RxFlag::Overrun)]);
    assert_eq!(port.counters().overrun, 1);
}

#[test]
fn clearing_cread_drops_everything() {
    let port = port();
    let mut host = RecordingHost::new();
    let mut termios = Termios::raw(115_200);
    termios.cflag.remove(ControlFlags::CREAD);
    port.set_termios(&mut termios, None);
    port.with_uart(|u| u.io_mut().feed(b"zz"));

    port.handle_irq(&mut host);

    assert!(host.received.is_empty());
    assert_eq!(host.pushes, 1);
    assert_eq!(port.counters().rx, 2);
}

#[test]
fn set_termios_programs_line() {
    let port = port();
    let mut termios = Termios::raw(115_200);
    termios.cflag |= ControlFlags::CRTSCTS;
    let config = port.set_termios(&mut termios, None);

    assert_eq!(config.baud, 115_200);
    assert_eq!(config.format, LineFormat::EIGHT_N1);
    assert!(config.rts_cts);
    assert_eq!(port.line_config(), config);
    // 48 MHz / (16 * 115200) = 26.04
    assert_eq!(port.with_uart(|u| u.io_mut().divisor()), 26);
    assert_eq!(port.with_uart(|u| u.io_mut().reg(reg::LCR.offset)), 0x03);
    let mcr = port.with_uart(|u| u.modem_control_get());
    assert!(mcr.contains(ModemControl::MDCE | ModemControl::FCM));
    assert!(port.with_uart(|u| u.is_enabled()));
    // 64 frames of 10 bits at 115200 plus 20 ms
    assert_eq!(port.timeout(), Duration::from_micros(5_555 + 20_000));
}

#[test]
fn module_is_disabled_while_reprogramming() {
    let port = port();
    port.with_uart(|u| u.enable());
    port.set_termios(&mut Termios::raw(9_600), None);

    let writes = port.with_uart(|u| u.io_mut().fcr_writes.clone());
    let ume = 0x10;
    let n = writes.len();
    assert!(n >= 3);
    assert_eq!(writes[n - 2] & ume, 0, "disabled before reprogramming");
    assert_eq!(writes[n - 1] & ume, ume, "enabled afterwards");
}

#[test]
fn excessive_baud_keeps_previous_rate() {
    let port = port();
    let old = Termios::raw(57_600);
    let mut new = Termios::raw(5_000_000);
    let config = port.set_termios(&mut new, Some(&old));
    assert_eq!(config.baud, 57_600);
    assert_eq!(new.baud(), 57_600);
}

#[test]
fn hangup_falls_back_without_reencoding() {
    let port = port();
    let mut termios = Termios::raw(0);
    let config = port.set_termios(&mut termios, None);
    assert_eq!(config.baud, 9_600);
    assert_eq!(termios.baud(), 0);
}

#[test]
fn modem_lines_round_trip() {
    let port = port();
    assert_eq!(port.get_mctrl(), ModemLines::CAR | ModemLines::DSR);

    port.set_mctrl(ModemLines::RTS | ModemLines::DTR);
    let lines = port.get_mctrl();
    assert!(lines.contains(ModemLines::RTS));
    assert!(!lines.contains(ModemLines::DTR));

    port.set_mctrl(ModemLines::LOOP);
    let lines = port.get_mctrl();
    assert!(lines.contains(ModemLines::LOOP | ModemLines::RTS));
    assert!(!port.with_uart(|u| u.modem_control_get()).contains(ModemControl::RTS));

    port.set_mctrl(ModemLines::empty());
    port.with_uart(|u| u.io_mut().regs.poke(reg::MSR.offset, u32::from(ModemStatus::CTS.bits())));
    assert_eq!(port.get_mctrl(), ModemLines::CAR | ModemLines::DSR | ModemLines::CTS);
}

#[test]
fn startup_and_shutdown() {
    let port = port();
    let mut host = RecordingHost::new();
    port.interrupt_control().mask(port.irq());

    port.startup(&mut host).expect("irq granted");
    assert_eq!(host.requested, [(48, "UART3")]);
    assert!(!masked(&port));
    assert!(port.with_uart(|u| u.is_enabled()));
    assert!(ier(&port).contains(InterruptEnable::RDRIE | InterruptEnable::RLSIE));

    port.write(b"pending");
    port.break_ctl(true);
    port.shutdown(&mut host);
    assert_eq!(host.freed, [48]);
    assert!(ier(&port).is_empty());
    assert_eq!(port.pending(), 0);
    assert!(!port.with_uart(|u| u.is_enabled()));
    assert_eq!(port.with_uart(|u| u.io_mut().reg(reg::LCR.offset)) & 0x40, 0);
}

#[test]
fn startup_reports_refused_irq() {
    let port = port();
    let mut host = RecordingHost::new();
    host.refuse_irq = Some(HostFault(-16));
    assert_eq!(port.startup(&mut host), Err(AttachError::IrqRequest(HostFault(-16))));
    assert!(ier(&port).is_empty());
}

#[test]
fn console_port_stays_enabled_on_shutdown() {
    let port = port();
    let mut host = RecordingHost::new();
    port.mark_console();
    port.startup(&mut host).expect("irq granted");
    port.shutdown(&mut host);
    assert!(port.with_uart(|u| u.is_enabled()));
}

#[test]
fn detach_returns_quiet_backend() {
    let port = port();
    let mut host = RecordingHost::new();
    port.startup(&mut host).expect("irq granted");
    port.write(b"abc");

    let sim = port.detach(&mut host);
    assert_eq!(host.freed, [48]);
    assert_eq!(sim.reg(reg::IER.offset), 0);
    assert_eq!(sim.fcr_writes.last().map(|v| v & 0x10), Some(0));
}

#[test]
fn lock_masks_line_only_while_held() {
    let port = port();
    let seen = port.with_uart(|_| masked(&port));
    assert!(seen);
    assert!(!masked(&port));
}

/// Interrupt controller that runs a pending handler right after the next
/// mask write lands, the way a line raised mid-acquisition would.
struct PreemptingIntc {
    regs: RefCell<RegisterFile>,
    pending: RefCell<Option<Box<dyn Fn()>>>,
}

impl SharedRegisterIo for PreemptingIntc {
    fn load32(&self, offset: usize) -> u32 {
        self.regs.borrow_mut().read32(offset)
    }

    fn store32(&self, offset: usize, value: u32) {
        self.regs.borrow_mut().write32(offset, value);
        let (icmsr, _) = intc::banked(intc::reg::ICMSR, 48);
        if offset == icmsr.offset {
            let handler = self.pending.borrow_mut().take();
            if let Some(handler) = handler {
                handler();
            }
        }
    }
}

#[test]
fn irq_on_another_line_during_lock_acquisition() {
    type SharedPort = SerialPort<SimUart, &'static Intc<PreemptingIntc>>;

    let intc: &'static Intc<PreemptingIntc> = Box::leak(Box::new(Intc::new(PreemptingIntc {
        regs: RefCell::new(sim_intc_regs()),
        pending: RefCell::new(None),
    })));
    let new_port = |instance: UartInstance| -> &'static SharedPort {
        Box::leak(Box::new(SerialPort::new(instance, instance.irq(), SimUart::new(), intc, CLK)))
    };
    let uart3 = new_port(UartInstance::Uart3);
    let uart0 = new_port(UartInstance::Uart0);
    let host: &'static RefCell<RecordingHost> = Box::leak(Box::new(RefCell::new(RecordingHost::new())));

    uart0.with_uart(|u| u.io_mut().feed(b"!"));
    *intc.io().pending.borrow_mut() = Some(Box::new(move || {
        assert_eq!(uart0.handle_irq(&mut *host.borrow_mut()), IrqReturn::Handled);
    }));

    assert_eq!(uart3.write(b"hi"), 2);

    assert!(intc.io().pending.borrow().is_none(), "handler ran inside the acquisition");
    assert_eq!(host.borrow().bytes(), b"!");
    assert!(!intc.is_masked(uart0.irq()));
    assert!(!intc.is_masked(uart3.irq()));
    assert_eq!(uart3.pending(), 2);
}

#[test]
fn console_write_expands_newlines() {
    let port = port();
    let dropped = port.console_write(b"ok\n", SpinBudget::short());
    assert_eq!(dropped, 0);
    assert_eq!(port.with_uart(|u| u.io_mut().transmitted.clone()), b"ok\r\n");
}

#[test]
fn console_write_drops_when_fifo_stuck() {
    let port = port();
    port.with_uart(|u| u.io_mut().set_tx_room(1));
    let dropped = port.console_write(b"abc", SpinBudget::short());
    assert_eq!(dropped, 2);
    assert_eq!(port.with_uart(|u| u.io_mut().transmitted.clone()), b"a");
}

#[test]
fn write_is_bounded_by_queue() {
    let port = port();
    let big = vec![b'.'; crate::constants::UART_XMIT_SIZE + 10];
    assert_eq!(port.write(&big), crate::constants::UART_XMIT_SIZE);
    port.flush_buffer();
    assert_eq!(port.pending(), 0);
}

#[test]
fn dump_names_the_instance() {
    let port = port_on(UartInstance::Uart1);
    let mut out = String::new();
    port.register_dump(&mut out).expect("dump");
    assert!(out.starts_with("UART1 @ 0x10031000"));
    assert_eq!(port.type_name(), "M200_UART");
    assert_eq!(port.config_port(), PortType::Uart16550);
}

fn make_io(_: UartInstance) -> SimUart {
    SimUart::new()
}

#[test]
fn probe_binds_line_from_alias() {
    let table: PortTable<SimUart, Intctl> = PortTable::new();
    let mut device = FakeDevice::uart(2, 0x1003_2000, 49);

    let port = table.probe(&mut device, make_io, sim_intc()).expect("probe");
    assert_eq!(port.line(), 2);
    assert_eq!(port.irq(), 49);
    assert_eq!(port.clock_rate(), 48_000_000);
    assert!(device.pins_selected);
    assert!(table.get(2).is_some());
    assert_eq!(table.iter().count(), 1);
}

#[test]
fn probe_accepts_kseg1_resource() {
    let table: PortTable<SimUart, Intctl> = PortTable::new();
    let mut device = FakeDevice::uart(0, 0xB003_0000, 51);
    assert!(table.probe(&mut device, make_io, sim_intc()).is_ok());
}

#[test]
fn probe_failures_leave_table_empty() {
    let table: PortTable<SimUart, Intctl> = PortTable::new();
    let cases: [(fn(&mut FakeDevice), AttachError); 7] = [
        (|d| d.alias = None, AttachError::NoAlias),
        (|d| d.alias = Some(7), AttachError::LineOutOfRange(7)),
        (|d| d.compatible = "ingenic,jz4780-uart", AttachError::NotCompatible),
        (|d| d.irq = None, AttachError::MissingIrq),
        (|d| d.base = None, AttachError::MissingResource),
        (|d| d.clock = None, AttachError::MissingClock),
        (|d| d.pinctrl = Err(HostFault(-22)), AttachError::Pinctrl(HostFault(-22))),
    ];
    for (breakage, expected) in cases {
        let mut device = FakeDevice::uart(1, 0x1003_1000, 50);
        breakage(&mut device);
        let err = table
            .probe(&mut device, make_io, sim_intc())
            .expect_err("probe must fail");
        assert_eq!(err, expected);
    }
    assert_eq!(table.iter().count(), 0);
}

#[test]
fn probe_rejects_base_of_other_line() {
    let table: PortTable<SimUart, Intctl> = PortTable::new();
    let mut device = FakeDevice::uart(1, 0x1003_3000, 50);
    let err = table
        .probe(&mut device, make_io, sim_intc())
        .expect_err("mismatch");
    assert_eq!(err, AttachError::ResourceMismatch { line: 1, base: 0x1003_3000 });
}

#[test]
fn second_probe_reuses_port() {
    let table: PortTable<SimUart, Intctl> = PortTable::new();
    let mut device = FakeDevice::uart(3, 0x1003_3000, 48);
    let first = table.probe(&mut device, make_io, sim_intc()).expect("probe");
    first.write(b"kept");

    device.clock = Some(12_000_000);
    let second = table
        .probe(&mut device, |_| panic!("register block bound twice"), sim_intc())
        .expect("probe");
    assert!(core::ptr::eq(first, second));
    assert_eq!(second.clock_rate(), 12_000_000);
    assert_eq!(second.pending(), 4);
}

#[test]
fn remove_shuts_down_bound_line() {
    let table: PortTable<SimUart, Intctl> = PortTable::new();
    let mut host = RecordingHost::new();
    let mut device = FakeDevice::uart(4, 0x1003_4000, 34);
    let port = table.probe(&mut device, make_io, sim_intc()).expect("probe");
    port.startup(&mut host).expect("irq granted");

    assert!(table.remove(4, &mut host));
    assert_eq!(host.freed, [34]);
    assert!(!table.remove(0, &mut host));
}

#[cfg(feature = "console")]
mod console {
    use super::*;
    use crate::testing::FakeFirmware;

    fn firmware(stdout: &str) -> FakeFirmware {
        FakeFirmware::new(stdout, "serial3", 3, 0x1003_3000, 48)
    }

    #[test]
    fn select_binds_console_once() {
        let table: PortTable<SimUart, Intctl> = PortTable::new();
        let console: Console<'_, SimUart, Intctl> = Console::new();

        let port = console
            .select(&firmware("serial3:57600n8"), &table, make_io, sim_intc())
            .expect("console");
        assert!(port.is_console());
        assert_eq!(port.clock_rate(), crate::constants::BOOT_CLOCK_HZ);
        assert_eq!(port.line_config().baud, 57_600);
        assert!(masked(port));
        assert!(core::ptr::eq(console.port().expect("bound"), port));

        let again = console.select(&firmware("serial3"), &table, make_io, sim_intc());
        assert_eq!(again.err(), Some(ConsoleError::AlreadySelected));
    }

    #[test]
    fn default_options_apply() {
        let table: PortTable<SimUart, Intctl> = PortTable::new();
        let console: Console<'_, SimUart, Intctl> = Console::new();
        let port = console
            .select(&firmware("serial3"), &table, make_io, sim_intc())
            .expect("console");
        assert_eq!(port.line_config().baud, 115_200);
        assert_eq!(port.line_config().format, LineFormat::EIGHT_N1);
    }

    #[test]
    fn failed_select_can_be_retried() {
        let table: PortTable<SimUart, Intctl> = PortTable::new();
        let console: Console<'_, SimUart, Intctl> = Console::new();

        let mut fw = firmware("serial3");
        fw.stdout = None;
        let err = console.select(&fw, &table, make_io, sim_intc());
        assert_eq!(err.err(), Some(ConsoleError::NoStdoutPath));

        let mut fw = firmware("serial3");
        fw.base = Some(0x1003_0000);
        let err = console.select(&fw, &table, make_io, sim_intc());
        assert_eq!(
            err.err(),
            Some(ConsoleError::Attach(AttachError::ResourceMismatch { line: 3, base: 0x1003_0000 }))
        );

        let err = console.select(&firmware("serial3:fast"), &table, make_io, sim_intc());
        assert_eq!(err.err(), Some(ConsoleError::BadOptions));
        assert!(table.get(3).is_none());

        assert!(console.select(&firmware("serial3"), &table, make_io, sim_intc()).is_ok());
        assert!(console.is_selected());
    }

    #[test]
    fn probe_after_console_keeps_console_port() {
        let table: PortTable<SimUart, Intctl> = PortTable::new();
        let console: Console<'_, SimUart, Intctl> = Console::new();
        let early = console
            .select(&firmware("serial3"), &table, make_io, sim_intc())
            .expect("console");

        let mut device = FakeDevice::uart(3, 0x1003_3000, 48);
        let probed = table.probe(&mut device, make_io, sim_intc()).expect("probe");
        assert!(core::ptr::eq(early, probed));
        assert!(probed.is_console());
        assert_eq!(probed.clock_rate(), 48_000_000);
    }

    #[test]
    fn writes_go_out_polled() {
        let table: PortTable<SimUart, Intctl> = PortTable::new();
        let console: Console<'_, SimUart, Intctl> = Console::with_budget(SpinBudget::short());
        assert_eq!(console.write(b"lost"), 0, "unbound console writes nothing");

        let port = console
            .select(&firmware("serial3"), &table, make_io, sim_intc())
            .expect("console");
        console.write_fmt(format_args!("boot {}\n", 7)).expect("fmt");
        assert_eq!(port.with_uart(|u| u.io_mut().transmitted.clone()), b"boot 7\r\n");

        port.with_uart(|u| u.io_mut().set_tx_room(0));
        assert_eq!(console.write(b"xy"), 2);
        assert_eq!(console.dropped(), 2);
    }
}

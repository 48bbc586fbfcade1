//! Command dispatch and the cooperative scheduler
//!
//! The console owns the device, the serial port, the line assembler, and
//! the dump cursor. One call to [`Console::tick`] runs the fixed two-step
//! schedule: emit at most one dump page, then drain whatever input bytes
//! are pending. Everything is single-owner and runs to completion inside
//! the tick - no locking, no suspension.
//!
//! Protocol summary (115200 baud, `\r` terminated, every byte echoed):
//!
//! | line | effect |
//! |---|---|
//! | `id`   | print JEDEC, manufacturer, and unique IDs |
//! | `cap`  | print capacity in decimal bytes |
//! | `dump` | stream the whole device as hex rows, one page per tick |
//! | `wipe` | erase the whole device |
//! | 67-char row | program 16 bytes at the row's address |
//!
//! Anything else is silently ignored.

use core::fmt::Write as _;

use embedded_io::{Read, ReadReady, Write};
use heapless::String;

use crate::device::FlashDevice;
use crate::dump::DumpCursor;
use crate::error::{Error, Result};
use crate::hex;
use crate::line::{LineAssembler, TERMINATOR};
use crate::row;

/// Largest page the dump path can buffer.
pub const MAX_PAGE: usize = 256;

/// Serial flash console bound to a device and a byte port.
pub struct Console<D, P> {
    device: D,
    port: P,
    line: LineAssembler,
    dump: DumpCursor,
    faulted: bool,
}

impl<D, P> Console<D, P>
where
    D: FlashDevice,
    P: Read + Write + ReadReady,
{
    /// Bind a console to a device and a serial port.
    pub fn new(device: D, port: P) -> Self {
        Self {
            device,
            port,
            line: LineAssembler::new(),
            dump: DumpCursor::new(),
            faulted: false,
        }
    }

    /// Run one scheduler tick: at most one dump page, then drain input.
    ///
    /// The dump step runs first so a burst of input can never starve an
    /// active dump; input is drained promptly once the page is out.
    /// Device failures are reported on the port and latched, not
    /// returned; only transport failures surface as [`Error::Io`].
    pub fn tick(&mut self) -> Result<()> {
        self.dump_step()?;
        self.drain_input()
    }

    /// True while a dump has pages left to emit.
    pub fn dump_active(&self) -> bool {
        self.dump.is_active()
    }

    /// True once any device operation has failed. The flag is sticky;
    /// commands are still accepted and attempted afterwards.
    pub fn faulted(&self) -> bool {
        self.faulted
    }

    /// The serial port, e.g. for host-side session management.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Mutable access to the serial port.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// The flash device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutable access to the flash device.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    fn dump_step(&mut self) -> Result<()> {
        let Some(addr) = self.dump.step() else {
            return Ok(());
        };
        let len = (self.dump.page_size() as usize).min(MAX_PAGE);
        let mut page = [0u8; MAX_PAGE];
        match self.device.read(addr, &mut page[..len]) {
            Ok(()) => {
                for (i, chunk) in page[..len].chunks(row::ROW_BYTES).enumerate() {
                    let mut bytes = [0u8; row::ROW_BYTES];
                    bytes[..chunk.len()].copy_from_slice(chunk);
                    let rendered = row::render(addr + (i * row::ROW_BYTES) as u32, &bytes);
                    self.write_port(&rendered)?;
                    self.write_port(b"\n")?;
                }
                self.dump.advance();
            }
            Err(err) => {
                // cursor untouched: the same page is retried next tick
                log::warn!("dump read at {:#010x} failed", addr);
                self.report_device_error(err)?;
            }
        }
        Ok(())
    }

    fn drain_input(&mut self) -> Result<()> {
        while self.read_ready()? {
            let mut byte = [0u8; 1];
            let n = self.port.read(&mut byte).map_err(|err| {
                log::warn!("serial read failed: {:?}", err);
                Error::Io
            })?;
            if n == 0 {
                // transport closed; nothing more to drain
                break;
            }
            self.accept(byte[0])?;
        }
        Ok(())
    }

    fn read_ready(&mut self) -> Result<bool> {
        self.port.read_ready().map_err(|err| {
            log::warn!("serial poll failed: {:?}", err);
            Error::Io
        })
    }

    /// Consume one input byte: echo it, assemble it, dispatch on a
    /// completed line.
    fn accept(&mut self, byte: u8) -> Result<()> {
        self.write_port(&[byte])?;
        if byte == TERMINATOR {
            self.write_port(b"\n")?;
        }
        if let Some(cmd) = self.line.feed(byte) {
            self.dispatch(&cmd)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, cmd: &[u8]) -> Result<()> {
        match cmd {
            b"id" => self.cmd_id(),
            b"cap" => self.cmd_cap(),
            b"dump" => {
                self.dump
                    .start(self.device.capacity(), self.device.page_size());
                Ok(())
            }
            b"wipe" => self.cmd_wipe(),
            _ if row::is_write_line(cmd) => self.cmd_write_line(cmd),
            _ => {
                // unknown input is ignored at the protocol level
                log::debug!("ignoring unrecognized line ({} bytes)", cmd.len());
                Ok(())
            }
        }
    }

    fn cmd_id(&mut self) -> Result<()> {
        match self.identify() {
            Ok((jedec, manufacturer, unique)) => {
                self.write_port(&hex::encode::<6>(u64::from(jedec)))?;
                self.write_port(b"\n")?;
                self.write_port(&hex::encode::<4>(u64::from(manufacturer)))?;
                self.write_port(b"\n")?;
                self.write_port(&hex::encode::<8>(unique >> 32))?;
                self.write_port(&hex::encode::<8>(unique & 0xffff_ffff))?;
                self.write_port(b"\n")
            }
            Err(err) => self.report_device_error(err),
        }
    }

    fn identify(&mut self) -> Result<(u32, u16, u64)> {
        Ok((
            self.device.jedec_id()?,
            self.device.manufacturer_id()?,
            self.device.unique_id()?,
        ))
    }

    fn cmd_cap(&mut self) -> Result<()> {
        let mut text: String<12> = String::new();
        // a u32 in decimal always fits
        let _ = write!(text, "{}", self.device.capacity());
        self.write_port(text.as_bytes())?;
        self.write_port(b"\n")
    }

    fn cmd_wipe(&mut self) -> Result<()> {
        log::debug!("erasing whole chip");
        match self.device.chip_erase() {
            Ok(()) => Ok(()),
            Err(err) => self.report_device_error(err),
        }
    }

    fn cmd_write_line(&mut self, cmd: &[u8]) -> Result<()> {
        let (addr, payload) = row::parse(cmd);

        // echo the decoded record so the operator can confirm what is
        // about to be committed
        self.write_port(&hex::encode::<8>(u64::from(addr)))?;
        self.write_port(b" -> ")?;
        for &b in &payload {
            self.write_port(&hex::encode::<2>(u64::from(b)))?;
            self.write_port(b" ")?;
        }
        self.write_port(b"\n")?;

        match self.device.program(addr, &payload) {
            Ok(()) => Ok(()),
            Err(err) => {
                log::warn!("program at {:#010x} failed", addr);
                self.report_device_error(err)
            }
        }
    }

    /// Flat report-and-flag handling for device failures: print a message,
    /// latch the fault on console and driver, carry on.
    fn report_device_error(&mut self, err: Error) -> Result<()> {
        self.faulted = true;
        self.device.set_fault();
        let msg: &[u8] = match err {
            Error::ReadFailed => b"Reading chip failed",
            Error::WriteFailed => b"Writing chip failed",
            Error::EraseFailed => b"Erasing chip failed",
            Error::InitFailed => b"Initializing chip failed",
            Error::Io => return Err(Error::Io),
        };
        self.write_port(msg)?;
        self.write_port(b"\n")
    }

    fn write_port(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.write_all(bytes).map_err(|err| {
            log::warn!("serial write failed: {:?}", err);
            Error::Io
        })
    }
}

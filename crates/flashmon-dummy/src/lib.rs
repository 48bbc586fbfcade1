//! flashmon-dummy - In-memory flash chip emulator
//!
//! Emulates the external SPI flash the console talks to: NOR semantics
//! (erase to `0xFF`, programming clears bits 1 -> 0), configurable geometry
//! and identification, and per-operation fault injection. Useful for
//! testing the protocol and for the host-side simulator, without hardware.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use flashmon_core::error::{Error, Result};
use flashmon_core::FlashDevice;

/// Geometry and identification of the emulated chip
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// 24-bit JEDEC identifier
    pub jedec_id: u32,
    /// 16-bit manufacturer/device identifier
    pub manufacturer_id: u16,
    /// 64-bit factory unique identifier
    pub unique_id: u64,
    /// Total size in bytes
    pub capacity: u32,
    /// Page size in bytes
    pub page_size: u32,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            jedec_id: 0xEF4018, // Winbond W25Q128FV
            manufacturer_id: 0xEF17,
            unique_id: 0xd16a_99cc_0f45_23b7,
            capacity: 16 * 1024 * 1024,
            page_size: 256,
        }
    }
}

/// Dummy flash chip
///
/// Emulates a flash device in memory. Reads, programs, and erases are
/// bounds-checked; injected faults make the corresponding operation fail
/// until cleared, which exercises the console's report-and-flag path.
#[cfg(feature = "alloc")]
pub struct DummyFlash {
    config: DummyConfig,
    data: Vec<u8>,
    fault: bool,
    fail_reads: bool,
    fail_programs: bool,
    fail_erases: bool,
}

#[cfg(feature = "alloc")]
impl DummyFlash {
    /// Create an erased chip with the given configuration.
    ///
    /// The geometry must be usable by the console's dump path: a nonzero
    /// page size, a multiple of the 16-byte row, no larger than the
    /// console's page buffer.
    pub fn new(config: DummyConfig) -> Result<Self> {
        if config.page_size == 0
            || config.page_size % 16 != 0
            || config.page_size as usize > flashmon_core::console::MAX_PAGE
        {
            log::error!("unusable page size {}", config.page_size);
            return Err(Error::InitFailed);
        }
        let data = vec![0xFF; config.capacity as usize];
        Ok(Self {
            config,
            data,
            fault: false,
            fail_reads: false,
            fail_programs: false,
            fail_erases: false,
        })
    }

    /// Create a chip pre-filled with `initial_data`.
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Result<Self> {
        let mut flash = Self::new(config)?;
        let len = core::cmp::min(initial_data.len(), flash.data.len());
        flash.data[..len].copy_from_slice(&initial_data[..len]);
        Ok(flash)
    }

    /// Get a reference to the chip contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the chip contents
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// State of the sticky error latch
    pub fn fault(&self) -> bool {
        self.fault
    }

    /// Make subsequent reads (including identification) fail
    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make subsequent program operations fail
    pub fn fail_programs(&mut self, fail: bool) {
        self.fail_programs = fail;
    }

    /// Make subsequent erases fail
    pub fn fail_erases(&mut self, fail: bool) {
        self.fail_erases = fail;
    }

    fn check_range(&self, addr: u32, len: usize, err: Error) -> Result<()> {
        let end = addr as u64 + len as u64;
        if end > self.data.len() as u64 {
            log::error!("access {:#010x}+{} beyond capacity", addr, len);
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(feature = "alloc")]
impl FlashDevice for DummyFlash {
    fn capacity(&self) -> u32 {
        self.config.capacity
    }

    fn page_size(&self) -> u32 {
        self.config.page_size
    }

    fn jedec_id(&mut self) -> Result<u32> {
        if self.fail_reads {
            return Err(Error::ReadFailed);
        }
        Ok(self.config.jedec_id & 0x00ff_ffff)
    }

    fn manufacturer_id(&mut self) -> Result<u16> {
        if self.fail_reads {
            return Err(Error::ReadFailed);
        }
        Ok(self.config.manufacturer_id)
    }

    fn unique_id(&mut self) -> Result<u64> {
        if self.fail_reads {
            return Err(Error::ReadFailed);
        }
        Ok(self.config.unique_id)
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        if self.fail_reads {
            return Err(Error::ReadFailed);
        }
        self.check_range(addr, buf.len(), Error::ReadFailed)?;
        let addr = addr as usize;
        buf.copy_from_slice(&self.data[addr..addr + buf.len()]);
        Ok(())
    }

    fn program(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        if self.fail_programs {
            return Err(Error::WriteFailed);
        }
        self.check_range(addr, data.len(), Error::WriteFailed)?;
        // NOR programming only clears bits
        for (i, &byte) in data.iter().enumerate() {
            self.data[addr as usize + i] &= byte;
        }
        Ok(())
    }

    fn chip_erase(&mut self) -> Result<()> {
        if self.fail_erases {
            return Err(Error::EraseFailed);
        }
        self.data.fill(0xFF);
        Ok(())
    }

    fn set_fault(&mut self) {
        self.fault = true;
    }
}


/// End-to-end console tests: the full protocol stack driven through an
/// in-memory serial port against the emulated chip.
#[cfg(test)]
mod console_tests {
    use core::convert::Infallible;
    use std::collections::VecDeque;

    use flashmon_core::Console;

    use super::*;

    /// In-memory serial port: scripted input, captured output.
    #[derive(Default)]
    struct MockPort {
        input: VecDeque<u8>,
        output: Vec<u8>,
    }

    impl embedded_io::ErrorType for MockPort {
        type Error = Infallible;
    }

    impl embedded_io::Read for MockPort {
        fn read(&mut self, buf: &mut [u8]) -> core::result::Result<usize, Infallible> {
            match self.input.pop_front() {
                Some(b) if !buf.is_empty() => {
                    buf[0] = b;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    impl embedded_io::ReadReady for MockPort {
        fn read_ready(&mut self) -> core::result::Result<bool, Infallible> {
            Ok(!self.input.is_empty())
        }
    }

    impl embedded_io::Write for MockPort {
        fn write(&mut self, buf: &[u8]) -> core::result::Result<usize, Infallible> {
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> core::result::Result<(), Infallible> {
            Ok(())
        }
    }

    fn console_for(config: DummyConfig) -> Console<DummyFlash, MockPort> {
        Console::new(DummyFlash::new(config).unwrap(), MockPort::default())
    }

    fn send(console: &mut Console<DummyFlash, MockPort>, bytes: &[u8]) {
        console.port_mut().input.extend(bytes.iter().copied());
    }

    fn take_output(console: &mut Console<DummyFlash, MockPort>) -> Vec<u8> {
        std::mem::take(&mut console.port_mut().output)
    }

    #[test]
    fn test_id_command() {
        let mut console = console_for(DummyConfig::default());
        send(&mut console, b"id\r");
        console.tick().unwrap();
        assert_eq!(
            take_output(&mut console),
            b"id\r\nef4018\nef17\nd16a99cc0f4523b7\n"
        );
    }

    #[test]
    fn test_cap_command() {
        let mut console = console_for(DummyConfig::default());
        send(&mut console, b"cap\r");
        console.tick().unwrap();
        assert_eq!(take_output(&mut console), b"cap\r\n16777216\n");
    }

    #[test]
    fn test_empty_line_fires_nothing() {
        let mut console = console_for(DummyConfig::default());
        send(&mut console, b"\r");
        console.tick().unwrap();
        assert_eq!(take_output(&mut console), b"\r\n");
    }

    #[test]
    fn test_wrong_case_command_is_ignored() {
        let mut console = console_for(DummyConfig::default());
        send(&mut console, b"DUMP\r");
        console.tick().unwrap();
        console.tick().unwrap();
        assert_eq!(take_output(&mut console), b"DUMP\r\n");
        assert!(!console.dump_active());
    }

    fn two_page_chip() -> DummyFlash {
        let config = DummyConfig {
            capacity: 512,
            page_size: 256,
            ..DummyConfig::default()
        };
        let pattern: Vec<u8> = (0..512).map(|i| i as u8).collect();
        DummyFlash::with_data(config, &pattern).unwrap()
    }

    #[test]
    fn test_dump_streams_one_page_per_tick() {
        let mut console = Console::new(two_page_chip(), MockPort::default());

        send(&mut console, b"dump\r");
        console.tick().unwrap();
        assert_eq!(take_output(&mut console), b"dump\r\n");
        assert!(console.dump_active());

        // first page
        console.tick().unwrap();
        let page0 = String::from_utf8(take_output(&mut console)).unwrap();
        let rows: Vec<&str> = page0.lines().collect();
        assert_eq!(rows.len(), 16);
        assert!(rows[0].starts_with("00000000: 0001 0203"));
        assert!(rows[15].starts_with("000000f0: f0f1"));
        assert_eq!(rows[0].len(), 67);

        // second page
        console.tick().unwrap();
        let page1 = String::from_utf8(take_output(&mut console)).unwrap();
        assert_eq!(page1.lines().count(), 16);
        assert!(page1.starts_with("00000100: 0001"));
        assert!(!console.dump_active());

        // reset tick and steady idle: no further output
        console.tick().unwrap();
        assert!(take_output(&mut console).is_empty());
        console.tick().unwrap();
        assert!(take_output(&mut console).is_empty());
    }

    #[test]
    fn test_dump_skips_partial_trailing_page() {
        let config = DummyConfig {
            capacity: 256 * 3 + 10,
            page_size: 256,
            ..DummyConfig::default()
        };
        let mut console = console_for(config);

        send(&mut console, b"dump\r");
        console.tick().unwrap();
        take_output(&mut console);

        let mut rows = 0;
        for _ in 0..3 {
            console.tick().unwrap();
            rows += String::from_utf8(take_output(&mut console))
                .unwrap()
                .lines()
                .count();
        }
        assert_eq!(rows, 48);

        // the trailing 10 bytes are never emitted
        console.tick().unwrap();
        console.tick().unwrap();
        assert!(take_output(&mut console).is_empty());
    }

    #[test]
    fn test_commands_interleave_with_active_dump() {
        let mut console = Console::new(two_page_chip(), MockPort::default());

        send(&mut console, b"dump\r");
        console.tick().unwrap();
        take_output(&mut console);

        // the page goes out before the queued command is answered
        send(&mut console, b"cap\r");
        console.tick().unwrap();
        let output = String::from_utf8(take_output(&mut console)).unwrap();
        assert!(output.starts_with("00000000: "));
        assert!(output.ends_with("cap\r\n512\n"));
        assert!(console.dump_active());
    }

    #[test]
    fn test_dump_restarts_while_active() {
        let mut console = Console::new(two_page_chip(), MockPort::default());

        send(&mut console, b"dump\r");
        console.tick().unwrap();
        console.tick().unwrap();
        take_output(&mut console);

        send(&mut console, b"dump\r");
        console.tick().unwrap();
        take_output(&mut console);

        // back to page zero
        console.tick().unwrap();
        let output = String::from_utf8(take_output(&mut console)).unwrap();
        assert!(output.starts_with("00000000: "));
    }

    #[test]
    fn test_dump_read_failure_retries_same_page() {
        let mut console = Console::new(two_page_chip(), MockPort::default());

        send(&mut console, b"dump\r");
        console.tick().unwrap();
        take_output(&mut console);

        console.device_mut().fail_reads(true);
        console.tick().unwrap();
        assert_eq!(take_output(&mut console), b"Reading chip failed\n");
        assert!(console.dump_active());
        assert!(console.faulted());

        console.device_mut().fail_reads(false);
        console.tick().unwrap();
        let output = String::from_utf8(take_output(&mut console)).unwrap();
        assert!(output.starts_with("00000000: "));
    }

    const WRITE_LINE: &[u8] =
        b"00000010: 4142 4344 4546 4748 494a 4b4c 4d4e 4f50  ABCDEFGHIJKLMNOP";

    #[test]
    fn test_write_line_echoes_decode_and_programs() {
        let mut console = console_for(DummyConfig {
            capacity: 1024,
            ..DummyConfig::default()
        });

        send(&mut console, WRITE_LINE);
        send(&mut console, b"\r");
        console.tick().unwrap();

        let mut expected = WRITE_LINE.to_vec();
        expected.extend_from_slice(b"\r\n");
        expected.extend_from_slice(
            b"00000010 -> 41 42 43 44 45 46 47 48 49 4a 4b 4c 4d 4e 4f 50 \n",
        );
        assert_eq!(take_output(&mut console), expected);
        assert_eq!(&console.device().data()[0x10..0x20], b"ABCDEFGHIJKLMNOP");
    }

    #[test]
    fn test_wipe_erases_chip() {
        let mut console = console_for(DummyConfig {
            capacity: 1024,
            ..DummyConfig::default()
        });
        console.device_mut().data_mut().fill(0);

        send(&mut console, b"wipe\r");
        console.tick().unwrap();
        assert_eq!(take_output(&mut console), b"wipe\r\n");
        assert!(console.device().data().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_wipe_failure_reports_and_latches() {
        let mut console = console_for(DummyConfig::default());
        console.device_mut().fail_erases(true);

        send(&mut console, b"wipe\r");
        console.tick().unwrap();
        assert_eq!(take_output(&mut console), b"wipe\r\nErasing chip failed\n");
        assert!(console.faulted());
        assert!(console.device().fault());

        // the fault is sticky but commands are still accepted
        send(&mut console, b"cap\r");
        console.tick().unwrap();
        assert_eq!(take_output(&mut console), b"cap\r\n16777216\n");
        assert!(console.faulted());
    }

    #[test]
    fn test_id_failure_reports() {
        let mut console = console_for(DummyConfig::default());
        console.device_mut().fail_reads(true);

        send(&mut console, b"id\r");
        console.tick().unwrap();
        assert_eq!(take_output(&mut console), b"id\r\nReading chip failed\n");
        assert!(console.faulted());
    }
}

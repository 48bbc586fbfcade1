//! Flash device seam
//!
//! The console drives the chip through this trait. The electrical driver,
//! bus wiring, and bootstrap live outside the crate; an in-memory emulator
//! (`flashmon-dummy`) implements it for tests and the host simulator.

use crate::error::Result;

/// Byte-addressable flash device as seen by the console.
///
/// Geometry is queried once per session and treated as read-only.
/// Operation failures map onto the device variants of [`crate::Error`];
/// after reporting one, the console calls [`FlashDevice::set_fault`] so a
/// driver with a sticky error latch records it. The latch is never
/// cleared; subsequent commands are still attempted.
pub trait FlashDevice {
    /// Total addressable bytes.
    fn capacity(&self) -> u32;

    /// Program/dump page size in bytes (256 on the reference chip).
    fn page_size(&self) -> u32;

    /// 24-bit JEDEC identifier.
    fn jedec_id(&mut self) -> Result<u32>;

    /// 16-bit manufacturer/device identifier.
    fn manufacturer_id(&mut self) -> Result<u16>;

    /// 64-bit factory unique identifier.
    fn unique_id(&mut self) -> Result<u64>;

    /// Read `buf.len()` bytes starting at `addr`.
    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()>;

    /// Program `data` starting at `addr`. The console never passes more
    /// than one page.
    fn program(&mut self, addr: u32, data: &[u8]) -> Result<()>;

    /// Erase the entire device.
    fn chip_erase(&mut self) -> Result<()>;

    /// Latch the driver's persistent error condition, if it has one.
    fn set_fault(&mut self) {}
}

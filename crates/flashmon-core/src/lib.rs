//! flashmon-core - Serial console protocol for SPI flash monitors
//!
//! This crate implements the protocol core of a firmware-resident flash
//! console: line framing, command dispatch, the paged dump scheduler, and
//! the hex-dump write-line codec. It is `no_std` so the same code runs on
//! the target and in host-side tests.
//!
//! The flash driver and the serial transport are external collaborators.
//! The driver sits behind [`device::FlashDevice`]; the transport is any
//! `embedded-io` byte port.
//!
//! # Features
//!
//! - `std` - Enable standard library support (`std::error::Error` impls)
//!
//! # Example
//!
//! ```ignore
//! use flashmon_core::Console;
//!
//! let mut console = Console::new(flash, serial);
//! loop {
//!     console.tick()?;
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

pub mod console;
pub mod device;
pub mod dump;
pub mod error;
pub mod hex;
pub mod line;
pub mod row;

pub use console::Console;
pub use device::FlashDevice;
pub use error::{Error, Result};

//! Chip profiles
//!
//! A profile is a RON file describing the emulated chip, e.g.:
//!
//! ```ron
//! (
//!     name: "W25Q128FV",
//!     jedec_id: 0xEF4018,
//!     manufacturer_id: 0xEF17,
//!     unique_id: 0xd16a99cc0f4523b7,
//!     capacity: 16777216,
//!     page_size: 256,
//! )
//! ```

use std::fs;
use std::path::Path;

use flashmon_dummy::DummyConfig;
use serde::Deserialize;

use crate::error::AppError;

/// Geometry and identification of an emulated chip, as loaded from disk.
#[derive(Debug, Deserialize)]
pub struct ChipProfile {
    pub name: String,
    pub jedec_id: u32,
    pub manufacturer_id: u16,
    pub unique_id: u64,
    pub capacity: u32,
    pub page_size: u32,
}

impl ChipProfile {
    /// Load a profile from a RON file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path)?;
        ron::from_str(&text).map_err(|source| AppError::Profile {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl From<&ChipProfile> for DummyConfig {
    fn from(profile: &ChipProfile) -> Self {
        Self {
            jedec_id: profile.jedec_id,
            manufacturer_id: profile.manufacturer_id,
            unique_id: profile.unique_id,
            capacity: profile.capacity,
            page_size: profile.page_size,
        }
    }
}

//! NVS-backed settings store.
//!
//! The C3 has no EEPROM, so the byte-addressed store is emulated with one NVS
//! blob. The blob is mirrored in RAM; reads come from the mirror and every
//! field write rewrites the blob. A missing blob reads as erased EEPROM
//! (all `0xFF`).

use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
use esp_idf_svc::sys::{EspError, ESP_ERR_INVALID_ARG};

use crate::traits::{Field, SettingsStore, FIELD_SIZE};

/// Size of the emulated EEPROM in bytes.
pub const STORAGE_SIZE: usize = 64;

const BLOB_KEY: &str = "eeprom";

/// Emulated EEPROM in one NVS namespace.
///
/// # Example
///
/// ```ignore
/// use esp_idf_svc::nvs::EspDefaultNvsPartition;
/// use rs_pumptimer::hal::esp32::Esp32Storage;
///
/// let store = Esp32Storage::new(EspDefaultNvsPartition::take()?, "pumptimer")?;
/// ```
pub struct Esp32Storage {
    nvs: EspNvs<NvsDefault>,
    mirror: [u8; STORAGE_SIZE],
}

impl Esp32Storage {
    /// Opens (or creates) `namespace` and loads the blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace cannot be opened or read.
    pub fn new(partition: EspDefaultNvsPartition, namespace: &str) -> Result<Self, EspError> {
        let nvs = EspNvs::new(partition, namespace, true)?;
        let mut mirror = [0xFF; STORAGE_SIZE];

        let mut buf = [0u8; STORAGE_SIZE];
        match nvs.get_blob(BLOB_KEY, &mut buf)? {
            Some(stored) => {
                let len = stored.len().min(STORAGE_SIZE);
                mirror[..len].copy_from_slice(&stored[..len]);
                log::info!("settings blob loaded ({} bytes)", len);
            }
            None => log::warn!("no settings blob, starting erased"),
        }

        Ok(Self { nvs, mirror })
    }

    fn span(offset: usize) -> Result<core::ops::Range<usize>, EspError> {
        offset
            .checked_add(FIELD_SIZE)
            .filter(|&end| end <= STORAGE_SIZE)
            .map(|end| offset..end)
            .ok_or_else(invalid_arg)
    }
}

fn invalid_arg() -> EspError {
    EspError::from_infallible::<ESP_ERR_INVALID_ARG>()
}

impl SettingsStore for Esp32Storage {
    type Error = EspError;

    fn read_field(&mut self, offset: usize) -> Result<Field, Self::Error> {
        let span = Self::span(offset)?;
        let mut raw = [0u8; FIELD_SIZE];
        raw.copy_from_slice(&self.mirror[span]);
        Ok(Field::from_le_bytes(raw))
    }

    fn write_field(&mut self, offset: usize, value: Field) -> Result<(), Self::Error> {
        let span = Self::span(offset)?;
        self.mirror[span].copy_from_slice(&value.to_le_bytes());
        self.nvs.set_blob(BLOB_KEY, &self.mirror)
    }
}

//! Fixed-offset settings storage.
//!
//! Mirrors the EEPROM access pattern of boards in the field: integer-sized
//! fields at byte offsets, no header and no checksum. The typed layout on top
//! of this lives in [`crate::settings::PersistedRecord`].

/// Native integer width of a persisted field (16-bit, little-endian).
pub type Field = i16;

/// Size in bytes of one persisted [`Field`].
pub const FIELD_SIZE: usize = core::mem::size_of::<Field>();

/// Byte-addressed store of integer fields.
///
/// # Implementation Notes
///
/// - Fields are little-endian [`Field`]s starting at `offset`
/// - Erased storage reads back as all-ones (`-1`)
/// - Writes are slow and wear the medium; callers only write on user action
pub trait SettingsStore {
    /// Error type for storage operations.
    type Error;

    /// Reads the field stored at `offset`.
    fn read_field(&mut self, offset: usize) -> Result<Field, Self::Error>;

    /// Writes `value` at `offset`.
    fn write_field(&mut self, offset: usize, value: Field) -> Result<(), Self::Error>;

    /// Writes `value` only if it differs from what is stored.
    ///
    /// Returns true when a write happened.
    fn update_field(&mut self, offset: usize, value: Field) -> Result<bool, Self::Error> {
        if self.read_field(offset)? == value {
            return Ok(false);
        }
        self.write_field(offset, value)?;
        Ok(true)
    }
}

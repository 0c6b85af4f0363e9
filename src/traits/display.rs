//! Character display sink.
//!
//! The presenter renders into anything implementing [`CharDisplay`]: an
//! HD44780-style LCD, a text grid drawn on an OLED, or
//! [`MockDisplay`](crate::hal::MockDisplay) in tests.

/// Cursor-addressed character display.
///
/// # Example
///
/// ```
/// use rs_pumptimer::traits::CharDisplay;
/// use rs_pumptimer::hal::MockDisplay;
///
/// let mut lcd = MockDisplay::new(16, 2);
/// lcd.clear().unwrap();
/// lcd.write_line(1, "hello").unwrap();
/// assert_eq!(lcd.line(1), "hello");
/// ```
pub trait CharDisplay {
    /// Error type for display operations.
    type Error;

    /// Blanks every cell and homes the cursor.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Moves the write cursor to `col`, `row` (both zero-based).
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), Self::Error>;

    /// Writes text at the cursor, advancing it. Text past the last column is
    /// dropped.
    fn write_text(&mut self, text: &str) -> Result<(), Self::Error>;

    /// Writes `text` at the start of `row`.
    fn write_line(&mut self, row: u8, text: &str) -> Result<(), Self::Error> {
        self.set_cursor(0, row)?;
        self.write_text(text)
    }
}

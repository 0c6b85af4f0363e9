//! SSD1306 OLED used as a 16×2 character display.
//!
//! # Wiring
//!
//! - SDA → GPIO8 (also has onboard LED)
//! - SCL → GPIO9 (also shared with BOOT button)
//! - VCC → 3.3V
//! - GND → GND

use crate::traits::CharDisplay;
use embedded_graphics::{
    mono_font::{ascii::FONT_7X14, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use esp_idf_hal::i2c::I2cDriver;
use ssd1306::{mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306};

/// SSD1306 display type alias for cleaner code.
type DisplayDriver<'d> = Ssd1306<
    I2CInterface<I2cDriver<'d>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// Glyph cell width in pixels.
const CELL_WIDTH: i32 = 7;

/// Row pitch in pixels; two rows centred on the 64 px panel.
const ROW_HEIGHT: i32 = 24;

/// Top of the first row.
const TOP_MARGIN: i32 = 10;

/// SSD1306 OLED presented as a character grid.
///
/// ```text
/// ┌────────────────────────────┐
/// │                            │
/// │  08:05 ON   52 V           │  row 0
/// │                            │
/// │  20 min      5 A           │  row 1
/// │                            │
/// └────────────────────────────┘
/// ```
///
/// Glyphs the ASCII font lacks (the check mark) are drawn as `*`.
pub struct Esp32Display<'d> {
    display: DisplayDriver<'d>,
    cursor: (u8, u8),
    columns: u8,
}

impl<'d> Esp32Display<'d> {
    /// Creates and initializes the display.
    ///
    /// # Arguments
    ///
    /// * `i2c` - I2C driver configured for GPIO8/9
    /// * `columns` - characters per row to allow (at most 18 fit)
    ///
    /// # Errors
    ///
    /// Returns an error if display initialization fails.
    pub fn new(i2c: I2cDriver<'d>, columns: u8) -> Result<Self, DisplayError> {
        let interface = I2CDisplayInterface::new(i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        display.init()?;
        display.clear(BinaryColor::Off)?;
        display.flush()?;

        Ok(Self {
            display,
            cursor: (0, 0),
            columns,
        })
    }

    fn origin(col: u8, row: u8) -> Point {
        Point::new(
            4 + i32::from(col) * CELL_WIDTH,
            TOP_MARGIN + i32::from(row) * ROW_HEIGHT,
        )
    }
}

impl CharDisplay for Esp32Display<'_> {
    type Error = DisplayError;

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.display.clear(BinaryColor::Off)?;
        self.cursor = (0, 0);
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), Self::Error> {
        self.cursor = (col, row);
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), Self::Error> {
        let (col, row) = self.cursor;
        let room = usize::from(self.columns.saturating_sub(col));

        let mut glyphs: heapless::String<32> = heapless::String::new();
        for ch in text.chars().take(room) {
            let ch = if ch.is_ascii() { ch } else { '*' };
            if glyphs.push(ch).is_err() {
                break;
            }
        }
        let count = glyphs.chars().count() as u8;

        let origin = Self::origin(col, row);
        Rectangle::new(
            origin,
            Size::new(u32::from(count) * CELL_WIDTH as u32, 14),
        )
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
        .draw(&mut self.display)?;

        let style = MonoTextStyle::new(&FONT_7X14, BinaryColor::On);
        Text::with_baseline(&glyphs, origin, style, Baseline::Top).draw(&mut self.display)?;

        self.cursor = (col.saturating_add(count), row);
        self.display.flush()?;
        Ok(())
    }
}

/// Display error type.
#[derive(Debug)]
pub struct DisplayError;

impl From<display_interface::DisplayError> for DisplayError {
    fn from(_: display_interface::DisplayError) -> Self {
        DisplayError
    }
}

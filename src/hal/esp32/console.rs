//! Log-backed display for boards without a screen.

use core::convert::Infallible;

use crate::traits::CharDisplay;

/// Character display that prints changed rows to the log.
///
/// The controller redraws every tick, so only rows whose text differs from
/// what was last printed are logged.
pub struct ConsoleDisplay {
    columns: usize,
    rows: Vec<Vec<char>>,
    printed: Vec<String>,
    cursor: (usize, usize),
}

impl ConsoleDisplay {
    /// Creates a blank `columns` × `rows` console.
    pub fn new(columns: u8, rows: u8) -> Self {
        let columns = usize::from(columns);
        let rows = usize::from(rows);
        Self {
            columns,
            rows: vec![vec![' '; columns]; rows],
            printed: vec![String::new(); rows],
            cursor: (0, 0),
        }
    }

    fn flush_row(&mut self, row: usize) {
        let (Some(cells), Some(printed)) = (self.rows.get(row), self.printed.get_mut(row)) else {
            return;
        };
        let text: String = cells.iter().collect::<String>().trim_end().into();
        if *printed != text {
            log::info!("[lcd {}] {}", row, text);
            *printed = text;
        }
    }
}

impl CharDisplay for ConsoleDisplay {
    type Error = Infallible;

    fn clear(&mut self) -> Result<(), Infallible> {
        for row in &mut self.rows {
            row.fill(' ');
        }
        self.cursor = (0, 0);
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), Infallible> {
        self.cursor = (usize::from(col), usize::from(row));
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), Infallible> {
        let (mut col, row) = self.cursor;
        if let Some(cells) = self.rows.get_mut(row) {
            for ch in text.chars().take(self.columns.saturating_sub(col)) {
                cells[col] = ch;
                col += 1;
            }
        }
        self.cursor = (col, row);
        self.flush_row(row);
        Ok(())
    }
}

//! Tolerance-keyed table.

use super::{TableError, EPSILON};

/// Table addressed by an exact integer key and an approximate real key.
///
/// Each row holds up to `width` `(key, value)` pairs, filled left to right.
/// [`get`](Self::get) scans a row in order and returns the value of the
/// first pair whose key lies within [`EPSILON`] of the query; the scan
/// stops at the first unfilled slot.
///
/// # Examples
/// ```
/// use u_nonparametric::tables::Approximate1KeyTable;
/// let mut table = Approximate1KeyTable::new(4, 3);
/// table.add_row(2, &[(0.381, 0.05), (0.417, 0.01)]).unwrap();
/// assert_eq!(table.get(2, 0.3825), Some(0.05));
/// assert_eq!(table.get(2, 0.400), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Approximate1KeyTable {
    rows: usize,
    width: usize,
    cells: Vec<Option<(f64, f64)>>,
}

impl Approximate1KeyTable {
    /// Creates an empty table with `rows` rows of `width` pairs.
    pub fn new(rows: usize, width: usize) -> Self {
        Self {
            rows,
            width,
            cells: vec![None; rows * width],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Resets every cell.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Resets one row. Out-of-range rows are ignored.
    pub fn erase(&mut self, row: usize) {
        if row < self.rows {
            self.cells[row * self.width..(row + 1) * self.width].fill(None);
        }
    }

    /// Replaces row `row` with `pairs`; trailing slots become unfilled.
    ///
    /// # Errors
    /// `RowOutOfRange` or `WidthMismatch` when `pairs` does not fit.
    pub fn add_row(&mut self, row: usize, pairs: &[(f64, f64)]) -> Result<(), TableError> {
        self.check_row(row)?;
        if pairs.len() > self.width {
            return Err(TableError::WidthMismatch {
                expected: self.width,
                got: pairs.len(),
            });
        }
        let base = row * self.width;
        for slot in 0..self.width {
            self.cells[base + slot] = pairs.get(slot).copied();
        }
        Ok(())
    }

    /// Writes a single pair.
    pub fn set(&mut self, row: usize, slot: usize, key: f64, value: f64) -> Result<(), TableError> {
        self.check_row(row)?;
        if slot >= self.width {
            return Err(TableError::SlotOutOfRange {
                slot,
                width: self.width,
            });
        }
        self.cells[row * self.width + slot] = Some((key, value));
        Ok(())
    }

    /// Value stored under `key` (within [`EPSILON`]) in row `row`.
    ///
    /// First match in slot order wins; `None` on a miss or an out-of-range row.
    pub fn get(&self, row: usize, key: f64) -> Option<f64> {
        if row >= self.rows || key.is_nan() {
            return None;
        }
        self.cells[row * self.width..(row + 1) * self.width]
            .iter()
            .map_while(|cell| *cell)
            .find(|(k, _)| (k - key).abs() <= EPSILON)
            .map(|(_, v)| v)
    }

    fn check_row(&self, row: usize) -> Result<(), TableError> {
        if row >= self.rows {
            return Err(TableError::RowOutOfRange {
                row,
                rows: self.rows,
            });
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn key_found_inside_epsilon(x in 0.0_f64..10.0, offset in -0.0019_f64..0.0019) {
            let mut t = Approximate1KeyTable::new(1, 1);
            t.add_row(0, &[(x, 42.0)]).unwrap();
            prop_assert_eq!(t.get(0, x + offset), Some(42.0));
        }

        #[test]
        fn key_missed_outside_epsilon(x in 0.0_f64..10.0, offset in 0.0021_f64..1.0) {
            let mut t = Approximate1KeyTable::new(1, 1);
            t.add_row(0, &[(x, 42.0)]).unwrap();
            prop_assert_eq!(t.get(0, x + offset), None);
            prop_assert_eq!(t.get(0, x - offset), None);
        }
    }
}

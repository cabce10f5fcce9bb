//! Critical-value tables.

use tracing::{trace, warn};

use super::{TableError, ALL};

/// Critical values of an upper-tail statistic, one row per exact key.
///
/// Each slot of a row belongs to a significance level (its *header*). The
/// headers are fixed at construction and must be strictly monotone; the
/// critical values of a row, read in ascending-p order, must not increase
/// (a smaller p needs a larger statistic). Rows are checked when written,
/// so a mis-ordered reference row is rejected instead of silently producing
/// wrong bounds.
///
/// # Examples
/// ```
/// use u_nonparametric::tables::{Critical1KeyTable, ALL};
/// let mut table = Critical1KeyTable::new(5, &[0.01, 0.05, 0.10]).unwrap();
/// table.add_row(4, &[0.417, 0.381, 0.352]).unwrap();
/// assert_eq!(table.estimate(4, 0.39), 0.05);
/// assert_eq!(table.estimate(4, 0.30), ALL);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Critical1KeyTable {
    rows: usize,
    headers: Vec<f64>,
    /// Slot indices sorted by ascending header.
    order: Vec<usize>,
    cells: Vec<Option<f64>>,
}

impl Critical1KeyTable {
    /// Creates an empty table of `rows` rows, one slot per header.
    ///
    /// # Errors
    /// `HeadersNotMonotonic` if `headers` is empty, not strictly increasing
    /// or decreasing, or holds a level outside `(0, 1]`.
    pub fn new(rows: usize, headers: &[f64]) -> Result<Self, TableError> {
        let in_range = headers.iter().all(|&h| h > 0.0 && h <= 1.0);
        let increasing = headers.windows(2).all(|w| w[0] < w[1]);
        let decreasing = headers.windows(2).all(|w| w[0] > w[1]);
        if headers.is_empty() || !in_range || !(increasing || decreasing) {
            return Err(TableError::HeadersNotMonotonic);
        }

        let order = if increasing {
            (0..headers.len()).collect()
        } else {
            (0..headers.len()).rev().collect()
        };

        Ok(Self {
            rows,
            headers: headers.to_vec(),
            order,
            cells: vec![None; rows * headers.len()],
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Significance level of slot `slot`.
    pub fn header(&self, slot: usize) -> Option<f64> {
        self.headers.get(slot).copied()
    }

    pub fn headers(&self) -> &[f64] {
        &self.headers
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Resets one row. Out-of-range rows are ignored.
    pub fn erase(&mut self, row: usize) {
        if row < self.rows {
            let w = self.width();
            self.cells[row * w..(row + 1) * w].fill(None);
        }
    }

    /// Fills row `row` with one critical value per header.
    pub fn add_row(&mut self, row: usize, values: &[f64]) -> Result<(), TableError> {
        let values: Vec<Option<f64>> = values.iter().map(|&v| Some(v)).collect();
        self.add_partial_row(row, &values)
    }

    /// Fills row `row`; `None` marks a level the reference does not chart.
    pub fn add_partial_row(&mut self, row: usize, values: &[Option<f64>]) -> Result<(), TableError> {
        self.check_row(row)?;
        if values.len() != self.width() {
            return Err(TableError::WidthMismatch {
                expected: self.width(),
                got: values.len(),
            });
        }
        self.check_ordering(row, values)?;
        let w = self.width();
        self.cells[row * w..(row + 1) * w].copy_from_slice(values);
        Ok(())
    }

    /// Writes one cell, keeping the row ordering valid.
    pub fn set(&mut self, row: usize, slot: usize, value: f64) -> Result<(), TableError> {
        self.check_row(row)?;
        if slot >= self.width() {
            return Err(TableError::SlotOutOfRange {
                slot,
                width: self.width(),
            });
        }
        let mut candidate = self.row(row).to_vec();
        candidate[slot] = Some(value);
        self.check_ordering(row, &candidate)?;
        let w = self.width();
        self.cells[row * w + slot] = Some(value);
        Ok(())
    }

    pub fn get(&self, row: usize, slot: usize) -> Option<f64> {
        if row >= self.rows || slot >= self.width() {
            return None;
        }
        self.cells[row * self.width() + slot]
    }

    /// `true` if row `row` holds at least one critical value.
    pub fn is_filled(&self, row: usize) -> bool {
        row < self.rows && self.row(row).iter().any(Option::is_some)
    }

    /// Smallest tabulated p-value whose critical value the statistic reaches.
    ///
    /// Returns [`ALL`] when the statistic is below every critical value of
    /// the row, the row is empty or out of range, or the statistic is NaN.
    pub fn estimate(&self, row: usize, statistic: f64) -> f64 {
        if row >= self.rows {
            trace!(row, rows = self.rows, "critical table row out of range");
            return ALL;
        }
        self.estimate_in(self.row(row), statistic)
    }

    /// Row `row`, or a linear interpolation between the nearest filled rows
    /// below and above it when the row itself was never filled.
    ///
    /// `None` if the row is out of range or not bracketed by filled rows.
    pub fn interpolate_row(&self, row: usize) -> Option<Vec<Option<f64>>> {
        if row >= self.rows {
            return None;
        }
        if self.is_filled(row) {
            return Some(self.row(row).to_vec());
        }
        let lo = (0..row).rev().find(|&r| self.is_filled(r))?;
        let hi = (row + 1..self.rows).find(|&r| self.is_filled(r))?;
        let frac = (row - lo) as f64 / (hi - lo) as f64;
        let interpolated = self
            .row(lo)
            .iter()
            .zip(self.row(hi))
            .map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => Some(a + frac * (b - a)),
                _ => None,
            })
            .collect();
        Some(interpolated)
    }

    /// [`estimate`](Self::estimate) against [`interpolate_row`](Self::interpolate_row).
    pub fn estimate_interpolated(&self, row: usize, statistic: f64) -> f64 {
        match self.interpolate_row(row) {
            Some(criticals) => self.estimate_in(&criticals, statistic),
            None => {
                trace!(row, "no bracketing rows to interpolate");
                ALL
            }
        }
    }

    /// Scans `criticals` (laid out like a row of this table) in ascending-p
    /// order and returns the first level whose critical value is reached.
    pub(crate) fn estimate_in(&self, criticals: &[Option<f64>], statistic: f64) -> f64 {
        if statistic.is_nan() {
            return ALL;
        }
        self.order
            .iter()
            .find(|&&slot| matches!(criticals.get(slot), Some(Some(c)) if *c <= statistic))
            .map_or(ALL, |&slot| self.headers[slot])
    }

    fn row(&self, row: usize) -> &[Option<f64>] {
        let w = self.width();
        &self.cells[row * w..(row + 1) * w]
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

    fn check_ordering(&self, row: usize, values: &[Option<f64>]) -> Result<(), TableError> {
        let mut previous: Option<f64> = None;
        for &slot in &self.order {
            let Some(value) = values[slot] else {
                continue;
            };
            if value.is_nan() || previous.is_some_and(|p| value > p) {
                warn!(row, level = self.headers[slot], "rejected out-of-order critical value");
                return Err(TableError::NonMonotonicRow {
                    row,
                    level: self.headers[slot],
                });
            }
            previous = Some(value);
        }
        Ok(())
    }
}

/// Critical values keyed by two exact integers.
///
/// Same semantics as [`Critical1KeyTable`]; cell `(i, j)` is stored in row
/// `i * dim2 + j` of an inner one-key table. Keys outside `dim1 × dim2` are
/// rejected on write and read as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Critical2KeyTable {
    dim1: usize,
    dim2: usize,
    inner: Critical1KeyTable,
}

impl Critical2KeyTable {
    pub fn new(dim1: usize, dim2: usize, headers: &[f64]) -> Result<Self, TableError> {
        Ok(Self {
            dim1,
            dim2,
            inner: Critical1KeyTable::new(dim1 * dim2, headers)?,
        })
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.dim1, self.dim2)
    }

    pub fn width(&self) -> usize {
        self.inner.width()
    }

    pub fn header(&self, slot: usize) -> Option<f64> {
        self.inner.header(slot)
    }

    pub fn headers(&self) -> &[f64] {
        self.inner.headers()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn erase(&mut self, i: usize, j: usize) {
        if let Some(row) = self.flat(i, j) {
            self.inner.erase(row);
        }
    }

    pub fn add_row(&mut self, i: usize, j: usize, values: &[f64]) -> Result<(), TableError> {
        let row = self.flat_checked(i, j)?;
        self.inner.add_row(row, values)
    }

    pub fn add_partial_row(
        &mut self,
        i: usize,
        j: usize,
        values: &[Option<f64>],
    ) -> Result<(), TableError> {
        let row = self.flat_checked(i, j)?;
        self.inner.add_partial_row(row, values)
    }

    pub fn set(&mut self, i: usize, j: usize, slot: usize, value: f64) -> Result<(), TableError> {
        let row = self.flat_checked(i, j)?;
        self.inner.set(row, slot, value)
    }

    pub fn get(&self, i: usize, j: usize, slot: usize) -> Option<f64> {
        self.flat(i, j).and_then(|row| self.inner.get(row, slot))
    }

    pub fn is_filled(&self, i: usize, j: usize) -> bool {
        self.flat(i, j).is_some_and(|row| self.inner.is_filled(row))
    }

    /// Smallest tabulated p-value reached by `statistic` at `(i, j)`, or
    /// [`ALL`].
    pub fn estimate(&self, i: usize, j: usize, statistic: f64) -> f64 {
        match self.flat(i, j) {
            Some(row) => self.inner.estimate(row, statistic),
            None => {
                trace!(i, j, "critical table keys out of range");
                ALL
            }
        }
    }

    fn flat(&self, i: usize, j: usize) -> Option<usize> {
        (i < self.dim1 && j < self.dim2).then(|| i * self.dim2 + j)
    }

    fn flat_checked(&self, i: usize, j: usize) -> Result<usize, TableError> {
        self.flat(i, j).ok_or(TableError::RowOutOfRange {
            row: i.saturating_mul(self.dim2).saturating_add(j),
            rows: self.dim1 * self.dim2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: [f64; 3] = [0.001, 0.01, 0.05];

    fn page_like() -> Critical2KeyTable {
        let mut t = Critical2KeyTable::new(4, 5, &LEVELS).unwrap();
        t.add_row(3, 4, &[56.0, 55.0, 54.0]).unwrap();
        t.add_partial_row(3, 2, &[None, None, Some(28.0)]).unwrap();
        t
    }

    #[test]
    fn test_headers_validated() {
        assert!(Critical1KeyTable::new(2, &[]).is_err());
        assert!(Critical1KeyTable::new(2, &[0.05, 0.05]).is_err());
        assert!(Critical1KeyTable::new(2, &[0.01, 0.10, 0.05]).is_err());
        assert!(Critical1KeyTable::new(2, &[0.0, 0.05]).is_err());
        assert!(Critical1KeyTable::new(2, &[0.10, 0.05, 0.01]).is_ok());
    }

    #[test]
    fn test_get_header() {
        let t = page_like();
        assert_eq!(t.header(0), Some(0.001));
        assert_eq!(t.header(2), Some(0.05));
        assert_eq!(t.header(3), None);
    }

    #[test]
    fn test_estimate_smallest_reached_level() {
        let t = page_like();
        assert_eq!(t.estimate(3, 4, 56.0), 0.001);
        assert_eq!(t.estimate(3, 4, 60.0), 0.001);
        assert_eq!(t.estimate(3, 4, 55.0), 0.01);
        assert_eq!(t.estimate(3, 4, 54.5), 0.05);
    }

    #[test]
    fn test_estimate_below_every_threshold_is_all() {
        let t = page_like();
        assert_eq!(t.estimate(3, 4, 53.0), ALL);
        assert_eq!(t.estimate(3, 4, f64::NAN), ALL);
    }

    #[test]
    fn test_estimate_skips_uncharted_levels() {
        let t = page_like();
        assert_eq!(t.estimate(3, 2, 28.0), 0.05);
        assert_eq!(t.estimate(3, 2, 27.0), ALL);
    }

    #[test]
    fn test_estimate_missing_row() {
        let t = page_like();
        assert_eq!(t.estimate(1, 1, 100.0), ALL);
        assert_eq!(t.estimate(9, 9, 100.0), ALL);
    }

    #[test]
    fn test_descending_headers_scan_ascending_p() {
        let mut t = Critical1KeyTable::new(1, &[0.20, 0.10, 0.01]).unwrap();
        t.add_row(0, &[0.30, 0.35, 0.42]).unwrap();
        assert_eq!(t.estimate(0, 0.50), 0.01);
        assert_eq!(t.estimate(0, 0.36), 0.10);
        assert_eq!(t.estimate(0, 0.31), 0.20);
    }

    #[test]
    fn test_rejects_out_of_order_row() {
        let mut t = Critical1KeyTable::new(2, &LEVELS).unwrap();
        let err = t.add_row(0, &[54.0, 55.0, 56.0]).unwrap_err();
        assert_eq!(err, TableError::NonMonotonicRow { row: 0, level: 0.01 });
        assert!(!t.is_filled(0));
    }

    #[test]
    fn test_set_keeps_ordering() {
        let mut t = Critical1KeyTable::new(1, &LEVELS).unwrap();
        t.set(0, 1, 10.0).unwrap();
        assert!(t.set(0, 2, 11.0).is_err());
        assert_eq!(t.get(0, 2), None);
        t.set(0, 2, 9.0).unwrap();
        assert_eq!(t.get(0, 2), Some(9.0));
    }

    #[test]
    fn test_set_writes_later_rows() {
        let mut t = Critical1KeyTable::new(3, &LEVELS).unwrap();
        t.set(2, 0, 12.0).unwrap();
        t.set(2, 2, 8.0).unwrap();
        assert_eq!(t.get(2, 0), Some(12.0));
        assert_eq!(t.get(2, 1), None);
        assert_eq!(t.get(2, 2), Some(8.0));
        assert!(!t.is_filled(1));
        assert_eq!(t.estimate(2, 9.0), 0.05);
    }

    #[test]
    fn test_write_bounds() {
        let mut t = page_like();
        assert!(t.add_row(4, 0, &[3.0, 2.0, 1.0]).is_err());
        assert!(t.add_row(0, 5, &[3.0, 2.0, 1.0]).is_err());
        assert!(t.add_row(0, 0, &[2.0, 1.0]).is_err());
        assert!(t.set(0, 0, 3, 1.0).is_err());
        assert_eq!(t.get(0, 7, 0), None);
    }

    #[test]
    fn test_erase_and_clear() {
        let mut t = page_like();
        t.erase(3, 4);
        assert!(!t.is_filled(3, 4));
        assert!(t.is_filled(3, 2));
        t.clear();
        assert!(!t.is_filled(3, 2));
    }

    #[test]
    fn test_interpolate_between_filled_rows() {
        let mut t = Critical1KeyTable::new(31, &[0.01, 0.05]).unwrap();
        t.add_row(20, &[0.231, 0.190]).unwrap();
        t.add_row(25, &[0.200, 0.173]).unwrap();

        let row = t.interpolate_row(22).unwrap();
        let expected = 0.231 + 0.4 * (0.200 - 0.231);
        assert!((row[0].unwrap() - expected).abs() < 1e-12);

        assert_eq!(t.interpolate_row(20).unwrap()[1], Some(0.190));
        assert!(t.interpolate_row(10).is_none());
        assert!(t.interpolate_row(27).is_none());

        assert_eq!(t.estimate_interpolated(22, 0.22), 0.01);
        assert_eq!(t.estimate(22, 0.22), ALL);
    }
}

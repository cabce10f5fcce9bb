//! Sparse dense-grid tables with permissive bounds.
//!
//! Reads outside the grid return `None`, writes outside it are dropped.
//! The exact-distribution builders fill these tables incrementally and only
//! for the cells that are defined, so "absent" is an ordinary state here.

/// Two-key grid of optional values.
///
/// # Examples
/// ```
/// use u_nonparametric::tables::Incomplete2KeyTable;
/// let mut table = Incomplete2KeyTable::new(3, 3);
/// assert!(table.set(1, 1, 7.0));
/// assert_eq!(table.get(1, 1), Some(7.0));
/// assert_eq!(table.get(5, 5), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Incomplete2KeyTable {
    dim1: usize,
    dim2: usize,
    cells: Vec<Option<f64>>,
}

impl Incomplete2KeyTable {
    pub fn new(dim1: usize, dim2: usize) -> Self {
        Self {
            dim1,
            dim2,
            cells: vec![None; dim1 * dim2],
        }
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.dim1, self.dim2)
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Stores `value` at `(i, j)`; returns `false` (and stores nothing) when
    /// the cell is outside the grid.
    pub fn set(&mut self, i: usize, j: usize, value: f64) -> bool {
        match self.index(i, j) {
            Some(idx) => {
                self.cells[idx] = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.index(i, j).and_then(|idx| self.cells[idx])
    }

    pub fn erase(&mut self, i: usize, j: usize) {
        if let Some(idx) = self.index(i, j) {
            self.cells[idx] = None;
        }
    }

    /// Number of defined cells.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn index(&self, i: usize, j: usize) -> Option<usize> {
        (i < self.dim1 && j < self.dim2).then(|| i * self.dim2 + j)
    }
}

/// Three-key grid of optional values.
#[derive(Debug, Clone, PartialEq)]
pub struct Incomplete3KeyTable {
    dim1: usize,
    dim2: usize,
    dim3: usize,
    cells: Vec<Option<f64>>,
}

impl Incomplete3KeyTable {
    pub fn new(dim1: usize, dim2: usize, dim3: usize) -> Self {
        Self {
            dim1,
            dim2,
            dim3,
            cells: vec![None; dim1 * dim2 * dim3],
        }
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.dim1, self.dim2, self.dim3)
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f64) -> bool {
        match self.index(i, j, k) {
            Some(idx) => {
                self.cells[idx] = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<f64> {
        self.index(i, j, k).and_then(|idx| self.cells[idx])
    }

    pub fn erase(&mut self, i: usize, j: usize, k: usize) {
        if let Some(idx) = self.index(i, j, k) {
            self.cells[idx] = None;
        }
    }

    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn index(&self, i: usize, j: usize, k: usize) -> Option<usize> {
        (i < self.dim1 && j < self.dim2 && k < self.dim3)
            .then(|| (i * self.dim2 + j) * self.dim3 + k)
    }
}

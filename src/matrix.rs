//! The matrix value type shared by the workspace and the algebra engine.

use approx::AbsDiffEq;
use smol_str::SmolStr;
use std::{
    fmt::{self, Debug, Display, Formatter},
    ops::{Index, IndexMut},
};

/// Identifies a matrix inside a [`Workspace`][crate::Workspace].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatrixId(pub u32);

impl Display for MatrixId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A dense MxN matrix of `f64` values laid out row-major in memory, tagged
/// with the identity its workspace knows it by.
///
/// A freshly computed matrix is anonymous (id 0, empty name) until the host
/// tags it with [`Matrix::with_id`]/[`Matrix::with_name`] and registers it.
/// Equality compares dimensions and cell values; the registry identity is
/// not part of the comparison, so results can be compared by value.
#[derive(Clone)]
pub struct Matrix {
    id: MatrixId,
    name: SmolStr,
    rows: usize,
    cols: usize,
    cells: Box<[f64]>,
}

impl Matrix {
    /// Create a zero-filled matrix. Both dimensions must be at least 1.
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix::init(rows, cols, |_, _| 0.0)
    }

    /// Create a new [`Matrix`] by invoking some `fn(row, col) -> f64`
    /// function for each cell.
    pub fn init<F>(rows: usize, cols: usize, mut get_cell: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        assert!(rows >= 1, "A matrix has at least one row");
        assert!(cols >= 1, "A matrix has at least one column");

        let mut cells = Vec::with_capacity(rows * cols);

        for row in 0..rows {
            for col in 0..cols {
                cells.push(get_cell(row, col));
            }
        }

        Matrix {
            id: MatrixId::default(),
            name: SmolStr::default(),
            rows,
            cols,
            cells: cells.into_boxed_slice(),
        }
    }

    /// Create a matrix from rows of values. Every row must have the same
    /// length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        assert!(!rows.is_empty(), "A matrix has at least one row");

        let cols = rows[0].len();
        assert!(
            rows.iter().all(|row| row.len() == cols),
            "Every row has the same number of entries"
        );

        Matrix::init(rows.len(), cols, |row, col| rows[row][col])
    }

    /// The n×n matrix with ones on the diagonal.
    pub fn identity(n: usize) -> Self {
        Matrix::init(n, n, |row, col| if row == col { 1.0 } else { 0.0 })
    }

    pub fn with_id(mut self, id: MatrixId) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = name.into();
        self
    }

    pub fn id(&self) -> MatrixId { self.id }

    pub fn name(&self) -> &str { &self.name }

    pub fn set_name(&mut self, name: impl Into<SmolStr>) {
        self.name = name.into();
    }

    pub fn rows(&self) -> usize { self.rows }

    pub fn cols(&self) -> usize { self.cols }

    pub fn is_square(&self) -> bool { self.rows == self.cols }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&f64> {
        if row < self.rows && col < self.cols {
            self.cells.get(self.index(row, col))
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut f64> {
        if row < self.rows && col < self.cols {
            let index = self.index(row, col);
            self.cells.get_mut(index)
        } else {
            None
        }
    }

    /// Iterate over the rows as slices, top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.cells.chunks_exact(self.cols)
    }

    /// Change the dimensions, keeping the overlapping values and
    /// zero-filling anything new.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        let resized = Matrix::init(rows, cols, |row, col| {
            self.get(row, col).copied().unwrap_or(0.0)
        });

        self.rows = resized.rows;
        self.cols = resized.cols;
        self.cells = resized.cells;
    }

    /// Swap two rows in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        assert!(a < self.rows, "Row index out of bounds");
        assert!(b < self.rows, "Row index out of bounds");

        for col in 0..self.cols {
            let i = self.index(a, col);
            let j = self.index(b, col);
            self.cells.swap(i, j);
        }
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self.cells == other.cells
    }
}

impl AbsDiffEq for Matrix {
    type Epsilon = f64;

    fn default_epsilon() -> f64 { f64::default_epsilon() }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self
                .cells
                .iter()
                .zip(other.cells.iter())
                .all(|(a, b)| f64::abs_diff_eq(a, b, epsilon))
    }
}

impl Debug for Matrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter_rows()).finish()
    }
}

impl Display for Matrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            for (i, value) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", value)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(row < self.rows, "Row index out of bounds");
        assert!(col < self.cols, "Column index out of bounds");

        self.get(row, col)
            .expect("We've already done bounds checks")
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        assert!(row < self.rows, "Row index out of bounds");
        assert!(col < self.cols, "Column index out of bounds");

        self.get_mut(row, col)
            .expect("We've already done bounds checks")
    }
}

impl<const R: usize, const C: usize> From<[[f64; C]; R]> for Matrix {
    fn from(cells: [[f64; C]; R]) -> Self {
        Matrix::init(R, C, |row, col| cells[row][col])
    }
}

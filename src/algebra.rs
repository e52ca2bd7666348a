//! Pure numeric operations over [`Matrix`] values.
//!
//! Every function takes its operands by reference and returns a fresh
//! matrix; elimination and pivoting work on private copies, so callers
//! never observe their inputs changing.

use crate::matrix::Matrix;
use std::fmt::{self, Display, Formatter};

/// Scaled pivot magnitudes below this are treated as zero during
/// elimination.
pub const SINGULARITY_THRESHOLD: f64 = 0.01;

/// Possible errors that may occur while operating on matrices.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AlgebraError {
    /// The operand dimensions don't satisfy the operation's contract.
    DimensionMismatch,
    /// A pivot fell below [`SINGULARITY_THRESHOLD`] during elimination.
    Singular,
}

impl Display for AlgebraError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AlgebraError::DimensionMismatch => {
                write!(f, "The matrix dimensions don't agree")
            },
            AlgebraError::Singular => write!(f, "The matrix is singular"),
        }
    }
}

impl std::error::Error for AlgebraError {}

/// Add two matrices elementwise.
pub fn add(a: &Matrix, b: &Matrix) -> Result<Matrix, AlgebraError> {
    if a.rows() != b.rows() || a.cols() != b.cols() {
        return Err(AlgebraError::DimensionMismatch);
    }

    Ok(Matrix::init(a.rows(), a.cols(), |row, col| {
        a[(row, col)] + b[(row, col)]
    }))
}

/// Subtract `b` from `a` elementwise.
pub fn subtract(a: &Matrix, b: &Matrix) -> Result<Matrix, AlgebraError> {
    if a.rows() != b.rows() || a.cols() != b.cols() {
        return Err(AlgebraError::DimensionMismatch);
    }

    Ok(Matrix::init(a.rows(), a.cols(), |row, col| {
        a[(row, col)] - b[(row, col)]
    }))
}

/// Multiply `a` by `b`.
pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix, AlgebraError> {
    if a.cols() != b.rows() {
        return Err(AlgebraError::DimensionMismatch);
    }

    Ok(Matrix::init(a.rows(), b.cols(), |row, col| {
        let mut sum = 0.0;

        for k in 0..a.cols() {
            sum += a[(row, k)] * b[(k, col)];
        }

        sum
    }))
}

/// Invert a square matrix via LU decomposition with scaled partial
/// pivoting.
///
/// The decomposition is computed once, then each unit basis vector is
/// forward- and back-substituted through it to produce one column of the
/// inverse.
pub fn inverse(m: &Matrix) -> Result<Matrix, AlgebraError> {
    if !m.is_square() {
        return Err(AlgebraError::DimensionMismatch);
    }

    let n = m.rows();
    let mut lu = m.clone();
    let mut perm = RowPermutation::identity(n);
    let scale = scale_factors(m);

    decompose(&mut lu, &mut perm, &scale)?;

    let mut result = Matrix::new(n, n);

    for col in 0..n {
        let mut rhs = vec![0.0; n];
        rhs[col] = 1.0;

        let x = substitute(&lu, &perm, rhs);

        for row in 0..n {
            result[(row, col)] = x[row];
        }
    }

    Ok(result)
}

/// Solve `a·x = b` for a square `a` and a column vector `b` using Gauss
/// elimination with scaled partial pivoting.
///
/// Unlike [`inverse`], the working rows are swapped physically, with the
/// right-hand side and the scale vector travelling along.
pub fn solve_system(a: &Matrix, b: &Matrix) -> Result<Matrix, AlgebraError> {
    if !a.is_square() || a.cols() != b.rows() || b.cols() != 1 {
        return Err(AlgebraError::DimensionMismatch);
    }

    let n = a.rows();
    let mut a = a.clone();
    let mut b = b.clone();
    let mut scale = scale_factors(&a);

    for k in 0..n - 1 {
        pivot_swap(&mut a, &mut b, &mut scale, k);

        if pivot_ratio(a[(k, k)], scale[k]) < SINGULARITY_THRESHOLD {
            return Err(AlgebraError::Singular);
        }

        for i in k + 1..n {
            let factor = a[(i, k)] / a[(k, k)];

            for j in k + 1..n {
                a[(i, j)] -= factor * a[(k, j)];
            }

            b[(i, 0)] -= factor * b[(k, 0)];
        }
    }

    if pivot_ratio(a[(n - 1, n - 1)], scale[n - 1]) < SINGULARITY_THRESHOLD {
        return Err(AlgebraError::Singular);
    }

    let mut x = Matrix::new(n, 1);
    x[(n - 1, 0)] = b[(n - 1, 0)] / a[(n - 1, n - 1)];

    for i in (0..n - 1).rev() {
        let mut sum = 0.0;

        for j in i + 1..n {
            sum += a[(i, j)] * x[(j, 0)];
        }

        x[(i, 0)] = (b[(i, 0)] - sum) / a[(i, i)];
    }

    Ok(x)
}

/// Logical row order used while pivoting: maps an elimination position to
/// the physical storage row, so choosing a pivot never moves matrix data.
#[derive(Debug, Clone, PartialEq)]
struct RowPermutation {
    order: Vec<usize>,
}

impl RowPermutation {
    fn identity(n: usize) -> Self {
        RowPermutation {
            order: (0..n).collect(),
        }
    }

    fn row(&self, position: usize) -> usize { self.order[position] }

    fn swap(&mut self, a: usize, b: usize) {
        self.order.swap(a, b);
    }
}

/// The largest absolute entry of each row, used to normalize pivot
/// candidates before comparing them.
fn scale_factors(m: &Matrix) -> Vec<f64> {
    (0..m.rows())
        .map(|row| {
            (0..m.cols())
                .map(|col| m[(row, col)].abs())
                .fold(0.0, f64::max)
        })
        .collect()
}

/// A row whose largest entry is zero has no usable pivot at all; reporting
/// ratio 0 sends it below the singularity threshold instead of dividing
/// zero by zero.
fn pivot_ratio(value: f64, scale: f64) -> f64 {
    if scale == 0.0 {
        0.0
    } else {
        (value / scale).abs()
    }
}

/// Decompose `a` in place: multipliers are stored below the diagonal (L)
/// and the eliminated rows on and above it (U), with the row order tracked
/// in `perm` rather than by moving data.
fn decompose(
    a: &mut Matrix,
    perm: &mut RowPermutation,
    scale: &[f64],
) -> Result<(), AlgebraError> {
    let n = a.rows();

    for k in 0..n - 1 {
        pivot(a, perm, scale, k);

        let pivot_row = perm.row(k);
        if pivot_ratio(a[(pivot_row, k)], scale[pivot_row])
            < SINGULARITY_THRESHOLD
        {
            return Err(AlgebraError::Singular);
        }

        for i in k + 1..n {
            let row = perm.row(i);
            let factor = a[(row, k)] / a[(pivot_row, k)];

            a[(row, k)] = factor;

            for j in k + 1..n {
                a[(row, j)] -= factor * a[(pivot_row, j)];
            }
        }
    }

    let last = perm.row(n - 1);
    if pivot_ratio(a[(last, n - 1)], scale[last]) < SINGULARITY_THRESHOLD {
        return Err(AlgebraError::Singular);
    }

    Ok(())
}

/// Pick the candidate row with the largest scaled magnitude in column `k`
/// and swap it into position `k` of the permutation. Ties keep the
/// earliest candidate.
fn pivot(a: &Matrix, perm: &mut RowPermutation, scale: &[f64], k: usize) {
    let n = a.rows();

    let mut p = k;
    let mut big = pivot_ratio(a[(perm.row(k), k)], scale[perm.row(k)]);

    for i in k + 1..n {
        let ratio = pivot_ratio(a[(perm.row(i), k)], scale[perm.row(i)]);

        if ratio > big {
            big = ratio;
            p = i;
        }
    }

    perm.swap(k, p);
}

/// Forward- then back-substitute one right-hand side through a decomposed
/// matrix, reading the rows in permuted order.
fn substitute(lu: &Matrix, perm: &RowPermutation, mut rhs: Vec<f64>) -> Vec<f64> {
    let n = lu.rows();

    for i in 1..n {
        let row = perm.row(i);
        let mut sum = rhs[row];

        for j in 0..i {
            sum -= lu[(row, j)] * rhs[perm.row(j)];
        }

        rhs[row] = sum;
    }

    let mut x = vec![0.0; n];
    let last = perm.row(n - 1);
    x[n - 1] = rhs[last] / lu[(last, n - 1)];

    for i in (0..n - 1).rev() {
        let row = perm.row(i);
        let mut sum = 0.0;

        for j in i + 1..n {
            sum += lu[(row, j)] * x[j];
        }

        x[i] = (rhs[row] - sum) / lu[(row, i)];
    }

    x
}

/// The physically-swapping pivot step used by [`solve_system`].
fn pivot_swap(a: &mut Matrix, b: &mut Matrix, scale: &mut [f64], k: usize) {
    let n = a.rows();

    let mut p = k;
    let mut big = pivot_ratio(a[(k, k)], scale[k]);

    for i in k + 1..n {
        let ratio = pivot_ratio(a[(i, k)], scale[i]);

        if ratio > big {
            big = ratio;
            p = i;
        }
    }

    if p != k {
        a.swap_rows(k, p);
        b.swap_rows(k, p);
        scale.swap(k, p);
    }
}

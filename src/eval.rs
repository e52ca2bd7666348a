//! Executing a postfix token sequence against a workspace.

use crate::{
    algebra::{self, AlgebraError},
    matrix::{Matrix, MatrixId},
    parse::{parse, ParseError, Token},
    workspace::Workspace,
};
use std::fmt::{self, Display, Formatter};

/// Evaluate an expression against the matrices registered in `workspace`.
///
/// The expression is parsed to postfix and executed as a stack machine:
/// a matrix reference pushes a copy of the registered value, an operator
/// pops its operands and pushes the computed result. Any failure aborts
/// the evaluation immediately; the workspace is never modified.
pub fn resolve(
    expression: &str,
    workspace: &Workspace,
) -> Result<Matrix, EvaluationError> {
    let postfix = parse(expression)?;
    let mut stack: Vec<Matrix> = Vec::new();

    for token in postfix {
        let value = match token {
            Token::MatrixRef(id) => workspace
                .find(id)
                .cloned()
                .ok_or(EvaluationError::MatrixNotFound { id })?,
            Token::Plus => {
                let (a, b) = pop_operands(&mut stack)?;
                algebra::add(&a, &b)?
            },
            Token::Minus => {
                let (a, b) = pop_operands(&mut stack)?;
                algebra::subtract(&a, &b)?
            },
            Token::Times => {
                let (a, b) = pop_operands(&mut stack)?;
                algebra::multiply(&a, &b)?
            },
            Token::Inverse => {
                let operand = stack
                    .pop()
                    .ok_or(EvaluationError::MalformedExpression)?;
                algebra::inverse(&operand)?
            },
            // parentheses never survive the postfix conversion
            Token::OpenParen | Token::CloseParen => {
                return Err(EvaluationError::MalformedExpression)
            },
        };

        stack.push(value);
    }

    let result = stack.pop().ok_or(EvaluationError::MalformedExpression)?;

    if !stack.is_empty() {
        return Err(EvaluationError::MalformedExpression);
    }

    Ok(result)
}

/// Pop a binary operator's operands. The top of the stack is the operand
/// that appeared *second* in the source, so it comes back as `b` and the
/// operation applies in source order.
fn pop_operands(
    stack: &mut Vec<Matrix>,
) -> Result<(Matrix, Matrix), EvaluationError> {
    let b = stack.pop().ok_or(EvaluationError::MalformedExpression)?;
    let a = stack.pop().ok_or(EvaluationError::MalformedExpression)?;

    Ok((a, b))
}

/// The closed set of ways an evaluation can fail.
///
/// Parse-level and algebra-level failures both fold into this one
/// enumeration, so a host switches over a single status.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// The expression couldn't be parsed, or its operand/operator
    /// structure doesn't add up.
    MalformedExpression,
    /// An operation was applied to matrices with incompatible dimensions.
    DimensionMismatch,
    /// The expression inverts a singular matrix.
    SingularMatrix,
    /// The expression references an id the workspace doesn't contain.
    MatrixNotFound { id: MatrixId },
}

impl From<ParseError> for EvaluationError {
    fn from(_: ParseError) -> Self { EvaluationError::MalformedExpression }
}

impl From<AlgebraError> for EvaluationError {
    fn from(e: AlgebraError) -> Self {
        match e {
            AlgebraError::DimensionMismatch => {
                EvaluationError::DimensionMismatch
            },
            AlgebraError::Singular => EvaluationError::SingularMatrix,
        }
    }
}

impl Display for EvaluationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::MalformedExpression => {
                write!(f, "The expression is malformed")
            },
            EvaluationError::DimensionMismatch => {
                write!(f, "The matrix dimensions don't agree")
            },
            EvaluationError::SingularMatrix => {
                write!(f, "A singular matrix can't be inverted")
            },
            EvaluationError::MatrixNotFound { id } => {
                write!(f, "No matrix with id {}", id)
            },
        }
    }
}

impl std::error::Error for EvaluationError {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a workspace with the given matrices registered as ids 1, 2, …
    fn workspace_of(matrices: Vec<Matrix>) -> Workspace {
        matrices
            .into_iter()
            .enumerate()
            .map(|(i, m)| m.with_id(MatrixId(i as u32 + 1)))
            .collect()
    }

    #[test]
    fn resolving_a_lone_reference_copies_the_value() {
        let workspace = workspace_of(vec![Matrix::from([[1.0, 2.0]])]);

        let got = resolve("[1]", &workspace).unwrap();

        assert_eq!(got, Matrix::from([[1.0, 2.0]]));
        assert_eq!(got.id(), MatrixId(1));
    }

    #[test]
    fn addition_of_identity_and_values() {
        let workspace = workspace_of(vec![
            Matrix::identity(2),
            Matrix::from([[1.0, 2.0], [3.0, 4.0]]),
        ]);

        let got = resolve("[1] + [2]", &workspace).unwrap();

        assert_eq!(got, Matrix::from([[2.0, 2.0], [3.0, 5.0]]));
    }

    #[test]
    fn subtraction_applies_in_source_order() {
        let workspace = workspace_of(vec![
            Matrix::from([[5.0]]),
            Matrix::from([[2.0]]),
        ]);

        let got = resolve("[1] - [2]", &workspace).unwrap();

        assert_eq!(got, Matrix::from([[3.0]]));
    }

    #[test]
    fn multiplication_applies_in_source_order() {
        let a = Matrix::from([[1.0, 2.0], [3.0, 4.0]]);
        let b = Matrix::from([[0.0, 1.0], [1.0, 0.0]]);
        let workspace = workspace_of(vec![a, b]);

        let got = resolve("[1] * [2]", &workspace).unwrap();

        // a·b, not b·a
        assert_eq!(got, Matrix::from([[2.0, 1.0], [4.0, 3.0]]));
    }

    #[test]
    fn inverse_times_original_approximates_identity() {
        let workspace =
            workspace_of(vec![Matrix::from([[4.0, 7.0], [2.0, 6.0]])]);

        let got = resolve("[1] ^-1 * [1]", &workspace).unwrap();

        approx::assert_abs_diff_eq!(
            got,
            Matrix::identity(2),
            epsilon = 1e-9
        );
    }

    #[test]
    fn inverting_a_singular_matrix_aborts() {
        let workspace = workspace_of(vec![
            Matrix::from([
                [1.0, 2.0, 3.0],
                [2.0, 4.0, 6.0],
                [4.0, 8.0, 12.0],
            ]),
            Matrix::from([[1.0], [10.0], [2.0]]),
        ]);

        let got = resolve("[1] ^-1 * [2]", &workspace);

        assert_eq!(got, Err(EvaluationError::SingularMatrix));
    }

    #[test]
    fn parenthesised_grouping_changes_the_result() {
        let workspace = workspace_of(vec![
            Matrix::from([[1.0, 1.0], [1.0, 1.0]]),
            Matrix::from([[2.0, 0.0], [0.0, 2.0]]),
            Matrix::from([[1.0, 2.0], [3.0, 4.0]]),
        ]);

        let grouped =
            resolve("( [1] + [2] ) * [3]", &workspace).unwrap();
        let ungrouped = resolve("[1] + [2] * [3]", &workspace).unwrap();

        assert_ne!(grouped, ungrouped);
        assert_eq!(grouped, Matrix::from([[6.0, 10.0], [10.0, 14.0]]));
        assert_eq!(ungrouped, Matrix::from([[3.0, 5.0], [7.0, 9.0]]));
    }

    #[test]
    fn missing_operand_is_malformed() {
        let workspace = workspace_of(vec![Matrix::identity(2)]);

        let got = resolve("[1] +", &workspace);

        assert_eq!(got, Err(EvaluationError::MalformedExpression));
    }

    #[test]
    fn missing_inverse_operand_is_malformed() {
        let got = resolve("^-1", &workspace_of(vec![Matrix::identity(2)]));

        assert_eq!(got, Err(EvaluationError::MalformedExpression));
    }

    #[test]
    fn lone_close_paren_is_malformed() {
        let workspace = workspace_of(vec![Matrix::identity(2)]);

        let got = resolve(")", &workspace);

        assert_eq!(got, Err(EvaluationError::MalformedExpression));
    }

    #[test]
    fn leftover_operands_are_malformed() {
        let workspace =
            workspace_of(vec![Matrix::identity(2), Matrix::identity(2)]);

        let got = resolve("[1] [2]", &workspace);

        assert_eq!(got, Err(EvaluationError::MalformedExpression));
    }

    #[test]
    fn empty_expression_is_malformed() {
        let got = resolve("", &Workspace::new());

        assert_eq!(got, Err(EvaluationError::MalformedExpression));
    }

    #[test]
    fn unknown_references_are_reported_with_their_id() {
        let workspace = workspace_of(vec![Matrix::identity(2)]);

        let got = resolve("[99]", &workspace);

        assert_eq!(
            got,
            Err(EvaluationError::MatrixNotFound { id: MatrixId(99) })
        );
    }

    #[test]
    fn incompatible_operands_are_a_dimension_mismatch() {
        let workspace =
            workspace_of(vec![Matrix::identity(2), Matrix::identity(3)]);

        assert_eq!(
            resolve("[1] + [2]", &workspace),
            Err(EvaluationError::DimensionMismatch)
        );
        assert_eq!(
            resolve("[1] * [2]", &workspace),
            Err(EvaluationError::DimensionMismatch)
        );
    }

    #[test]
    fn inverting_a_non_square_matrix_is_a_dimension_mismatch() {
        let workspace = workspace_of(vec![Matrix::new(2, 3)]);

        let got = resolve("[1] ^-1", &workspace);

        assert_eq!(got, Err(EvaluationError::DimensionMismatch));
    }

    #[test]
    fn resolution_is_idempotent() {
        let workspace = workspace_of(vec![
            Matrix::from([[4.0, 7.0], [2.0, 6.0]]),
            Matrix::from([[1.0], [2.0]]),
        ]);

        let first = resolve("[1] ^-1 * [2]", &workspace).unwrap();
        let second = resolve("[1] ^-1 * [2]", &workspace).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn evaluation_leaves_the_workspace_untouched() {
        let workspace =
            workspace_of(vec![Matrix::from([[4.0, 7.0], [2.0, 6.0]])]);
        let before = workspace.clone();

        let _ = resolve("[1] ^-1", &workspace).unwrap();

        assert_eq!(workspace, before);
        assert_eq!(
            workspace.find(MatrixId(1)).unwrap(),
            &Matrix::from([[4.0, 7.0], [2.0, 6.0]])
        );
    }
}

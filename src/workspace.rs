//! The registry of matrices an expression can reference, plus the
//! generators a host uses to tag new entries.

use crate::{
    eval::{self, EvaluationError},
    matrix::{Matrix, MatrixId},
};
use smol_str::SmolStr;
use std::iter::{Extend, FromIterator};

/// The set of matrices an expression can reference, keyed by id.
///
/// The workspace is a registry, not an allocator: callers tag matrices
/// with ids (usually from an [`IdGenerator`]) and guarantee uniqueness
/// themselves. Iteration follows insertion order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Workspace {
    matrices: Vec<Matrix>,
}

impl Workspace {
    pub fn new() -> Self { Workspace::default() }

    /// Register a matrix. The caller guarantees its id isn't already in
    /// use.
    pub fn add(&mut self, matrix: Matrix) {
        self.matrices.push(matrix);
    }

    /// Find a registered matrix by id.
    pub fn find(&self, id: MatrixId) -> Option<&Matrix> {
        self.matrices.iter().find(|m| m.id() == id)
    }

    /// Remove the matrix with the given id. Removing an unknown id does
    /// nothing.
    pub fn remove(&mut self, id: MatrixId) {
        if let Some(index) = self.matrices.iter().position(|m| m.id() == id)
        {
            self.matrices.remove(index);
        }
    }

    pub fn len(&self) -> usize { self.matrices.len() }

    pub fn is_empty(&self) -> bool { self.matrices.is_empty() }

    /// Iterate over the registered matrices in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Matrix> + '_ {
        self.matrices.iter()
    }

    /// Evaluate an expression against this workspace.
    pub fn resolve(
        &self,
        expression: &str,
    ) -> Result<Matrix, EvaluationError> {
        eval::resolve(expression, self)
    }
}

impl Extend<Matrix> for Workspace {
    fn extend<T: IntoIterator<Item = Matrix>>(&mut self, iter: T) {
        self.matrices.extend(iter);
    }
}

impl FromIterator<Matrix> for Workspace {
    fn from_iter<T: IntoIterator<Item = Matrix>>(iter: T) -> Self {
        Workspace {
            matrices: Vec::from_iter(iter),
        }
    }
}

impl<'a> IntoIterator for &'a Workspace {
    type IntoIter = std::slice::Iter<'a, Matrix>;
    type Item = &'a Matrix;

    fn into_iter(self) -> Self::IntoIter { self.matrices.iter() }
}

impl IntoIterator for Workspace {
    type IntoIter = std::vec::IntoIter<Matrix>;
    type Item = Matrix;

    fn into_iter(self) -> Self::IntoIter { self.matrices.into_iter() }
}

/// Hands out workspace ids, counting up from 1.
///
/// The counter is an explicit value rather than process-wide state, so
/// every host (and every test) runs its own sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct IdGenerator {
    next: u32,
}

impl IdGenerator {
    pub fn new() -> Self { IdGenerator { next: 1 } }

    pub fn next_id(&mut self) -> MatrixId {
        let id = MatrixId(self.next);
        self.next += 1;

        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self { IdGenerator::new() }
}

/// Hands out display names `M1`, `M2`, …
#[derive(Debug, Clone, PartialEq)]
pub struct NameGenerator {
    next: u32,
}

impl NameGenerator {
    pub fn new() -> Self { NameGenerator { next: 1 } }

    pub fn next_name(&mut self) -> SmolStr {
        let name = SmolStr::new(format!("M{}", self.next));
        self.next += 1;

        name
    }
}

impl Default for NameGenerator {
    fn default() -> Self { NameGenerator::new() }
}

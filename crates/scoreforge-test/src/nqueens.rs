//! N-Queens test fixtures.
//!
//! One queen per column; the row is the variable. Conflicts are counted
//! per unordered pair of assigned queens sharing a row or a diagonal.

use scoreforge_core::SimpleScore;

use crate::unique_pairs;

/// A queen in a fixed column.
#[derive(Clone, Debug, PartialEq)]
pub struct Queen {
    pub id: i64,
    pub column: i64,
    pub row: Option<i64>,
}

impl Queen {
    pub fn new(id: i64, column: i64, row: Option<i64>) -> Self {
        Self { id, column, row }
    }

    /// Creates a queen with an assigned row.
    pub fn assigned(id: i64, column: i64, row: i64) -> Self {
        Self::new(id, column, Some(row))
    }

    /// Creates a queen with no row assigned.
    pub fn unassigned(id: i64, column: i64) -> Self {
        Self::new(id, column, None)
    }

    /// `row - column`, equal for queens on one ascending diagonal.
    pub fn ascending_diagonal(&self) -> Option<i64> {
        self.row.map(|row| row - self.column)
    }

    /// `row + column`, equal for queens on one descending diagonal.
    pub fn descending_diagonal(&self) -> Option<i64> {
        self.row.map(|row| row + self.column)
    }
}

/// Queens in columns `0..rows.len()` at the given rows.
pub fn board(rows: &[i64]) -> Vec<Queen> {
    rows.iter()
        .enumerate()
        .map(|(i, &row)| Queen::assigned(i as i64, i as i64, row))
        .collect()
}

fn count_pairs(queens: &[Queen], key: impl Fn(&Queen) -> Option<i64>) -> i64 {
    unique_pairs(queens)
        .filter(|(a, b)| matches!((key(a), key(b)), (Some(x), Some(y)) if x == y))
        .count() as i64
}

pub fn row_conflicts(queens: &[Queen]) -> i64 {
    count_pairs(queens, |q| q.row)
}

pub fn ascending_diagonal_conflicts(queens: &[Queen]) -> i64 {
    count_pairs(queens, Queen::ascending_diagonal)
}

pub fn descending_diagonal_conflicts(queens: &[Queen]) -> i64 {
    count_pairs(queens, Queen::descending_diagonal)
}

/// Row plus both diagonal conflicts.
pub fn calculate_conflicts(queens: &[Queen]) -> i64 {
    row_conflicts(queens)
        + ascending_diagonal_conflicts(queens)
        + descending_diagonal_conflicts(queens)
}

/// One point of penalty per conflicting pair.
pub fn score(queens: &[Queen]) -> SimpleScore {
    SimpleScore::of(-calculate_conflicts(queens))
}

//! Shared test fixtures for ScoreForge crates.
//!
//! This crate provides plain data types and brute-force reference scorers.
//! It does NOT depend on `scoreforge-scoring`, so the scoring crate can use
//! it as a dev-dependency and compare its incremental results against
//! these straightforward recalculations.
//!
//! - [`nqueens`] - N-Queens queens and conflict counting
//! - [`shift`] - Employee shift scheduling
//! - [`lesson`] - Timetabled lessons with room and interval conflicts
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! scoreforge-test = { workspace = true }
//! ```
//!
//! ```
//! use scoreforge_test::nqueens::{self, Queen};
//!
//! let queens = nqueens::board(&[0, 1, 0]);
//! assert_eq!(nqueens::row_conflicts(&queens), 1);
//! ```

pub mod lesson;
pub mod nqueens;
pub mod shift;

pub use lesson::Lesson;
pub use nqueens::Queen;
pub use shift::{Employee, Shift};

/// Visits every unordered pair `(i, j)` with `i < j`.
pub fn unique_pairs<T>(items: &[T]) -> impl Iterator<Item = (&T, &T)> {
    items
        .iter()
        .enumerate()
        .flat_map(move |(i, a)| items[i + 1..].iter().map(move |b| (a, b)))
}

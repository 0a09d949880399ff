//! Score director implementations.
//!
//! A score director owns the working facts and answers score queries.
//!
//! # Score Director Types
//!
//! - [`StreamScoreDirector`] - Incremental scoring through a live network
//! - [`SimpleScoreDirector`] - Full recalculation (baseline)

mod factory;
mod simple;
mod stream;
mod traits;


pub use factory::ScoreDirectorFactory;
pub use simple::SimpleScoreDirector;
pub use stream::StreamScoreDirector;
pub use traits::ScoreDirector;

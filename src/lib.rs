//! Committee assignment, defense scheduling and grading of final-year
//! projects.
//!
//! Every operation works on a [`model::Roster`] snapshot provided by the
//! caller; nothing is persisted here.

pub mod checks;
pub mod committee;
pub mod error;
pub mod export;
pub mod grading;
pub mod model;
pub mod schedule;

#[cfg(test)]
mod testing;

pub use error::Error;

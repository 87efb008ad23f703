//! CLI command implementations.
//!
//! Each command returns the [`Outcome`](crate::outcome::Outcome) it wants
//! reported; `main` classifies it and hands it to the terminator.

pub mod check;
pub mod classify;
pub mod list;
pub mod lookup;
pub mod run;
pub mod select;

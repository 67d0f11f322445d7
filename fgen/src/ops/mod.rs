//! Core operations.
//!
//! This module contains the business logic for fgen commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod clean;
pub mod generate;
pub mod project;

pub use check::check;
pub use clean::clean;
pub use generate::generate;

//! CLI command implementations.

pub mod list;
pub mod run;

pub use list::{ListCommand, RateCommand};
pub use run::{RunCommand, RunReport};

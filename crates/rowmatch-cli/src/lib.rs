//! Library side of the rowmatch CLI: logging setup and command result types.

pub mod logging;
pub mod types;

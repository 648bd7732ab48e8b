//! Subcommand handlers.

pub(crate) mod audit;
pub(crate) mod categorize;
pub(crate) mod check;
pub(crate) mod config;

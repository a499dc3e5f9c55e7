//! CLI subcommands.

pub mod clear;
pub mod load;
pub mod query;
pub mod status;

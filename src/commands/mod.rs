//! One module per CLI subcommand.

pub mod migrate;
pub mod serve;

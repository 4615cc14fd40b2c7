//! Runtime settings and fixed values.
//!
//! `Config` is read once from the environment at startup; the constants cover
//! roles, rating bounds and session transport names.

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;

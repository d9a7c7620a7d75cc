//! Settings schema and loading.
//!
//! Layered configuration: struct defaults, then an optional TOML file, then
//! `ADAGIO__`-prefixed environment variables.

mod load;
mod schema;

pub use load::{default_config_path, resolve_config_path};
pub use schema::*;

#[cfg(test)]
mod tests;

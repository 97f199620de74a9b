mod defaults;
mod io;
mod schema;
mod validate;

pub use io::load_config;
#[cfg(test)]
pub(crate) use io::parse_config;
pub use schema::{Config, Nsca, RawCheck, RawThreshold, RuntimeConfig};
pub use validate::ConfigError;

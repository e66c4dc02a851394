pub mod config;
pub mod incident;

pub use config::Config;
pub use incident::*;

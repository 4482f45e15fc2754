pub mod schema;

pub use schema::{BootstrapConfig, Config, HashingConfig, LoggingConfig};

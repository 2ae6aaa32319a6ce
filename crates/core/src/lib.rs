pub mod config;
pub mod error;
pub mod record;
pub mod rule;

pub use config::Config;
pub use error::ConfigError;
pub use record::StreamRecord;
pub use rule::Rule;

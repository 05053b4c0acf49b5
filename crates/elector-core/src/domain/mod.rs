//! Domain model (identity, round outcome, config, errors).

pub mod config;
pub mod errors;
pub mod ids;
pub mod outcome;

pub use self::config::ElectionConfig;
pub use self::errors::{ConfigError, IdentityError, StoreError};
pub use self::ids::RunnerId;
pub use self::outcome::RoundOutcome;

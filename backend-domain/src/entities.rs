// Domain entities
pub mod attack;
pub mod config;
pub mod query;

pub use attack::*;
pub use config::*;
pub use query::*;

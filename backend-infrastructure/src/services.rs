pub mod retention_service;

pub use retention_service::*;

pub mod schema;
pub mod sqlite_attacks;

pub use sqlite_attacks::*;

// Domain value objects
pub mod identity;
pub mod world;

pub use identity::*;
pub use world::*;

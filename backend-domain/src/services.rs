// Domain services
pub mod fingerprint;
pub mod preparation;
pub mod retention;

pub use fingerprint::*;
pub use preparation::*;
pub use retention::*;

//! Watson mixture math utilities.

pub mod math;

pub use math::bounds::*;
pub use math::series::*;
pub use math::stable::*;

//! Core math modules.

pub mod bounds;
pub mod series;
pub mod stable;

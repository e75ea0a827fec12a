//! Internal support: the generational body arena, math conversions, and
//! logging helpers.

pub mod arena;
pub(crate) mod logging;
pub(crate) mod math;

pub use arena::BodyHandle;

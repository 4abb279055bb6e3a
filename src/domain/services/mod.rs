//! Domain services shared across layers.

mod error;

pub use error::*;

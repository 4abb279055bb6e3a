mod persona;
mod turn;

pub use persona::*;
pub use turn::*;

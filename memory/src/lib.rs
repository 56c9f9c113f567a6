mod memory;
mod range;
mod slice;

pub use memory::{Error, Memory};
pub use range::Range;
pub use slice::Slice;

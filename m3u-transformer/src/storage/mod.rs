mod source;
mod transformation;

pub use source::*;
pub use transformation::*;

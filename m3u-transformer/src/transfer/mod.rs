mod document;
mod render;

pub use document::*;
pub use render::*;

//! Pure transformations over playlist items and whole playlists.
//!
//! Item transformations never modify an item in place; they return the item
//! wrapped in an overlay carrying the new attribute values. Playlist
//! transformations consume an ordered item list and produce another one.

mod filter;
mod item;
mod playlist;
mod select;

pub use filter::*;
pub use item::*;
pub use playlist::*;
pub use select::*;

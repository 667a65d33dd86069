mod item;
mod playlist;

pub use item::*;
pub use playlist::*;

pub mod directives {
    pub const EXTM3U: &str = "#EXTM3U";
    pub const EXTINF: &str = "#EXTINF";
    /// Prefix of a metadata line carrying the runtime, attributes and title
    pub const EXTINF_PREFIX: &str = "#EXTINF:";
    pub const COMMENT: char = '#';
}

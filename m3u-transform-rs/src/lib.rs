//! # m3u-transform-rs
//! A library for parsing, transforming and generating extended m3u playlists
//!
//! # Example
//! ```rust
//! use m3u_transform_rs::{descriptor::compile_str, format::M3uPlaylist};
//!
//! // 1. Parse
//! let playlist: M3uPlaylist = r#"#EXTM3U
//! #EXTINF:-1 tvg-name="News HD" country="PT",News HD
//! http://example.com/news-hd
//! #EXTINF:-1 tvg-name="News SD" country="PT",News SD
//! http://example.com/news-sd"#
//!     .parse()
//!     .unwrap();
//!
//! // 2. Transform
//! let transformation = compile_str(r#"
//! attributes:
//!   - tag:
//!       source: "tvg-name"
//!       target: "quality"
//!       values: ["SD", "HD"]
//! select-by-attribute:
//!   grouping:
//!     attributes: ["tvg-name"]
//!   selection-attribute: "quality"
//!   preference: ["SD", "HD"]
//! "#).unwrap();
//! let result = playlist.transform(transformation.as_ref());
//! assert_eq!(result.len(), 1);
//!
//! // 3. Generate
//! println!("{}", result);
//! ```

mod builder;
pub mod descriptor;
pub mod format;
mod parser;
pub mod transformation;
pub use parser::*;

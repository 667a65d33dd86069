use std::fmt::Display;

use crate::format::{M3uItem, M3uPlaylist, directives};

impl Display for M3uPlaylist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // header
        writeln!(f, "{}", directives::EXTM3U)?;

        // items
        for it in self.items.iter() {
            it.fmt(f)?;
        }

        Ok(())
    }
}

impl Display for M3uItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // #EXTINF:runtime attributes...,title
        write!(f, "{}{}", directives::EXTINF_PREFIX, self.runtime())?;
        for (key, value) in self.attributes() {
            // attributes cleared by an overlay are not written
            let Some(value) = value else {
                continue;
            };

            match (value.contains('"'), value.contains('\'')) {
                (true, false) => write!(f, " {}='{}'", key, value)?,
                // no quote style can hold both, so `"` degrades to `'`
                (true, true) => write!(f, " {}=\"{}\"", key, value.replace('"', "'"))?,
                _ => write!(f, " {}=\"{}\"", key, value)?,
            }
        }
        writeln!(f, ",{}", self.title())?;

        writeln!(f, "{}", self.link())?;

        Ok(())
    }
}

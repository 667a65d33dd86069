use crate::format::M3uItem;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct M3uPlaylist {
    /// Items of this playlist, in source order
    pub items: Vec<M3uItem>,
}

impl M3uPlaylist {
    pub fn new(items: Vec<M3uItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<M3uItem>> for M3uPlaylist {
    fn from(items: Vec<M3uItem>) -> Self {
        Self { items }
    }
}

impl IntoIterator for M3uPlaylist {
    type Item = M3uItem;
    type IntoIter = std::vec::IntoIter<M3uItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

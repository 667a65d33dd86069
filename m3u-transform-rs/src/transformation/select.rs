use std::collections::HashMap;

use smol_str::SmolStr;

use crate::{format::M3uItem, transformation::PlaylistTransformation};

/// Derives the key under which items are considered duplicates of each other
pub trait Grouping: Send + Sync {
    fn key(&self, item: &M3uItem) -> String;
}

impl<F> Grouping for F
where
    F: Fn(&M3uItem) -> String + Send + Sync,
{
    fn key(&self, item: &M3uItem) -> String {
        self(item)
    }
}

/// Concatenation of the given attribute values, a missing attribute contributing nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributesGrouping {
    attributes: Vec<SmolStr>,
}

impl AttributesGrouping {
    pub fn new(attributes: impl IntoIterator<Item = impl Into<SmolStr>>) -> Self {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }
}

impl Grouping for AttributesGrouping {
    fn key(&self, item: &M3uItem) -> String {
        let mut key = String::new();
        for attribute in self.attributes.iter() {
            if let Some(value) = item.attribute(attribute) {
                key.push_str(&value);
            }
        }
        key
    }
}

/// Keeps one item per group, picked by how `selection_attribute` ranks in `preference`.
///
/// The rank of an item is `1 - index` of its value in `preference`, `2` when
/// the value is not listed, and the lowest rank wins. An item lacking the
/// attribute outranks every item that has it. The *last* listed preference is
/// therefore the most wanted value: with `preference: [SD, HD]` an `HD` item
/// beats an `SD` item. Ties keep the item that came first.
///
/// Groups are emitted in the order of their first item.
pub struct SelectByAttribute {
    grouping: Box<dyn Grouping>,
    selection_attribute: SmolStr,
    preference: Vec<SmolStr>,
}

impl SelectByAttribute {
    pub fn new(
        grouping: Box<dyn Grouping>,
        selection_attribute: impl Into<SmolStr>,
        preference: impl IntoIterator<Item = impl Into<SmolStr>>,
    ) -> Self {
        Self {
            grouping,
            selection_attribute: selection_attribute.into(),
            preference: preference.into_iter().map(Into::into).collect(),
        }
    }

    /// `None` for a missing attribute, which orders before any `Some`
    fn rank(&self, item: &M3uItem) -> Option<i64> {
        let value = item.attribute(&self.selection_attribute)?;
        let index = self
            .preference
            .iter()
            .position(|x| *x == value)
            .map_or(-1, |x| x as i64);

        Some(1 - index)
    }
}

impl PlaylistTransformation for SelectByAttribute {
    fn apply(&self, items: Vec<M3uItem>) -> Vec<M3uItem> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<Vec<M3uItem>> = Vec::new();

        for item in items {
            let key = self.grouping.key(&item);
            match positions.get(&key) {
                Some(&position) => groups[position].push(item),
                None => {
                    positions.insert(key, groups.len());
                    groups.push(vec![item]);
                }
            }
        }

        groups
            .into_iter()
            .filter_map(|group| group.into_iter().min_by_key(|item| self.rank(item)))
            .collect()
    }
}

use std::{fmt, sync::Arc};

use smol_str::SmolStr;

/// Produces the new value of an attribute from its current value (which may be absent)
pub type ValueTransformation = Arc<dyn Fn(Option<&str>) -> Option<SmolStr> + Send + Sync>;

/// A transformation that ignores the current value and always yields `value`
pub fn fixed_value(value: Option<SmolStr>) -> ValueTransformation {
    Arc::new(move |_: Option<&str>| value.clone())
}

/// One playlist entry as read from the source text.
///
/// Never mutated after parsing: edits are layered on top through [`M3uItem`] overlays.
#[derive(Debug, Clone, PartialEq)]
pub struct M3uEntry {
    /// Duration in seconds, `-1` for live or unknown
    pub runtime: f64,
    pub title: SmolStr,
    pub link: SmolStr,
    /// Attributes of the `#EXTINF` line, in source order, names unique
    pub attributes: Vec<(SmolStr, SmolStr)>,
}

impl Default for M3uEntry {
    fn default() -> Self {
        Self {
            runtime: -1.0,
            title: SmolStr::default(),
            link: SmolStr::default(),
            attributes: Vec::new(),
        }
    }
}

impl M3uEntry {
    pub fn attribute(&self, name: &str) -> Option<&SmolStr> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Appends an attribute, ignoring the name if it is already present
    pub fn push_attribute(&mut self, name: impl Into<SmolStr>, value: impl Into<SmolStr>) {
        let name = name.into();
        if self.attribute(&name).is_none() {
            self.attributes.push((name, value.into()));
        }
    }
}

/// Ordered set of attribute overrides applied by one overlay layer
#[derive(Clone, Default)]
pub struct AttributeOverrides(Vec<(SmolStr, ValueTransformation)>);

impl AttributeOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transformation for `name`, replacing an earlier one for the same name
    pub fn insert(&mut self, name: impl Into<SmolStr>, transformation: ValueTransformation) {
        let name = name.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = transformation,
            None => self.0.push((name, transformation)),
        }
    }

    pub fn with(mut self, name: impl Into<SmolStr>, transformation: ValueTransformation) -> Self {
        self.insert(name, transformation);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ValueTransformation> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, transformation)| transformation)
    }

    pub fn names(&self) -> impl Iterator<Item = &SmolStr> {
        self.0.iter().map(|(key, _)| key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

enum ItemLayer {
    Entry(M3uEntry),
    Overlay {
        base: M3uItem,
        overrides: AttributeOverrides,
    },
}

/// A playlist item: a parsed entry, possibly seen through a chain of overlays.
///
/// Cloning is cheap and never copies the attribute list. Every overlay keeps a
/// handle to the item it wraps, so lookups resolve lazily from the outermost
/// layer down to the parsed entry.
#[derive(Clone)]
pub struct M3uItem(Arc<ItemLayer>);

impl M3uItem {
    pub fn new(entry: M3uEntry) -> Self {
        Self(Arc::new(ItemLayer::Entry(entry)))
    }

    /// The parsed entry at the bottom of the overlay chain
    pub fn entry(&self) -> &M3uEntry {
        let mut current = self;
        loop {
            match current.0.as_ref() {
                ItemLayer::Entry(entry) => return entry,
                ItemLayer::Overlay { base, .. } => current = base,
            }
        }
    }

    pub fn runtime(&self) -> f64 {
        self.entry().runtime
    }

    pub fn title(&self) -> &str {
        &self.entry().title
    }

    pub fn link(&self) -> &str {
        &self.entry().link
    }

    /// Current value of an attribute, with every overlay applied
    pub fn attribute(&self, name: &str) -> Option<SmolStr> {
        match self.0.as_ref() {
            ItemLayer::Entry(entry) => entry.attribute(name).cloned(),
            ItemLayer::Overlay { base, overrides } => {
                let current = base.attribute(name);
                match overrides.get(name) {
                    Some(transformation) => transformation(current.as_deref()),
                    None => current,
                }
            }
        }
    }

    /// Attribute names in output order: the entry's own names first, then names
    /// introduced by overlays in the order they were first added
    pub fn attribute_names(&self) -> Vec<SmolStr> {
        match self.0.as_ref() {
            ItemLayer::Entry(entry) => entry.attributes.iter().map(|(k, _)| k.clone()).collect(),
            ItemLayer::Overlay { base, overrides } => {
                let mut names = base.attribute_names();
                for name in overrides.names() {
                    if !names.contains(name) {
                        names.push(name.clone());
                    }
                }
                names
            }
        }
    }

    /// Every attribute name paired with its resolved value
    pub fn attributes(&self) -> Vec<(SmolStr, Option<SmolStr>)> {
        self.attribute_names()
            .into_iter()
            .map(|name| {
                let value = self.attribute(&name);
                (name, value)
            })
            .collect()
    }

    /// Wraps this item in a new overlay layer
    pub fn overlay(&self, overrides: AttributeOverrides) -> Self {
        if overrides.is_empty() {
            return self.clone();
        }

        Self(Arc::new(ItemLayer::Overlay {
            base: self.clone(),
            overrides,
        }))
    }

    /// Overlay that pins `name` to `value`
    pub fn with_attribute(&self, name: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        self.overlay(AttributeOverrides::new().with(name, fixed_value(Some(value.into()))))
    }

    /// Number of overlay layers above the parsed entry
    pub fn depth(&self) -> usize {
        match self.0.as_ref() {
            ItemLayer::Entry(_) => 0,
            ItemLayer::Overlay { base, .. } => base.depth() + 1,
        }
    }
}

impl From<M3uEntry> for M3uItem {
    fn from(value: M3uEntry) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for M3uItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("M3uItem")
            .field("runtime", &self.runtime())
            .field("title", &self.title())
            .field("link", &self.link())
            .field("attributes", &self.attributes())
            .finish()
    }
}

/// Two items are equal when everything observable through them is equal,
/// regardless of how many overlay layers produced it
impl PartialEq for M3uItem {
    fn eq(&self, other: &Self) -> bool {
        self.runtime() == other.runtime()
            && self.title() == other.title()
            && self.link() == other.link()
            && self.attributes() == other.attributes()
    }
}

use smol_str::SmolStr;

use crate::format::{AttributeOverrides, M3uItem, fixed_value};

/// A pure function from one playlist item to another
pub trait ItemTransformation: Send + Sync {
    fn apply(&self, item: M3uItem) -> M3uItem;
}

impl<F> ItemTransformation for F
where
    F: Fn(M3uItem) -> M3uItem + Send + Sync,
{
    fn apply(&self, item: M3uItem) -> M3uItem {
        self(item)
    }
}

/// Replaces the first occurrence of `original` in an attribute value.
///
/// Items without the attribute, or whose value does not contain `original`,
/// are returned untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeEdit {
    attribute: SmolStr,
    original: SmolStr,
    replacement: SmolStr,
}

impl AttributeEdit {
    pub fn new(
        attribute: impl Into<SmolStr>,
        original: impl Into<SmolStr>,
        replacement: impl Into<SmolStr>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            original: original.into(),
            replacement: replacement.into(),
        }
    }
}

impl ItemTransformation for AttributeEdit {
    fn apply(&self, item: M3uItem) -> M3uItem {
        let Some(value) = item.attribute(&self.attribute) else {
            return item;
        };
        if !value.contains(self.original.as_str()) {
            return item;
        }

        let edited = value.replacen(self.original.as_str(), &self.replacement, 1);
        item.overlay(
            AttributeOverrides::new().with(self.attribute.clone(), fixed_value(Some(edited.into()))),
        )
    }
}

/// Moves a known tag out of one attribute into another.
///
/// The first of `tags` found inside `source` is removed from it (whitespace
/// is then collapsed and trimmed) and written to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTag {
    source: SmolStr,
    target: SmolStr,
    tags: Vec<SmolStr>,
}

impl AttributeTag {
    pub fn new(
        source: impl Into<SmolStr>,
        target: impl Into<SmolStr>,
        tags: impl IntoIterator<Item = impl Into<SmolStr>>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

impl ItemTransformation for AttributeTag {
    fn apply(&self, item: M3uItem) -> M3uItem {
        let Some(value) = item.attribute(&self.source) else {
            return item;
        };
        let Some(tag) = self.tags.iter().find(|x| value.contains(x.as_str())) else {
            return item;
        };

        let cleaned = value
            .replace(tag.as_str(), "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        item.overlay(
            AttributeOverrides::new()
                .with(self.source.clone(), fixed_value(Some(cleaned.into())))
                .with(self.target.clone(), fixed_value(Some(tag.clone()))),
        )
    }
}

/// Applies transformations in list order, each one seeing the result of the previous
#[derive(Default)]
pub struct ItemTransformationComposite {
    transformations: Vec<Box<dyn ItemTransformation>>,
}

impl ItemTransformationComposite {
    pub fn new(transformations: Vec<Box<dyn ItemTransformation>>) -> Self {
        Self { transformations }
    }

    pub fn len(&self) -> usize {
        self.transformations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }
}

impl ItemTransformation for ItemTransformationComposite {
    fn apply(&self, item: M3uItem) -> M3uItem {
        self.transformations
            .iter()
            .fold(item, |item, transformation| transformation.apply(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::M3uEntry;

    fn item(attributes: &[(&str, &str)]) -> M3uItem {
        let mut entry = M3uEntry {
            title: "Some movie".into(),
            link: "http://some.server.com/movie".into(),
            ..Default::default()
        };
        for (name, value) in attributes {
            entry.push_attribute(*name, *value);
        }
        entry.into()
    }

    #[test]
    fn test_edit() {
        let edit = AttributeEdit::new("group-title", "Movie:", "Movies:");
        let edited = edit.apply(item(&[("group-title", "Movie: Foo")]));
        assert_eq!(edited.attribute("group-title").unwrap(), "Movies: Foo");
    }

    #[test]
    fn test_edit_first_occurrence_only() {
        let edit = AttributeEdit::new("name", "a", "o");
        let edited = edit.apply(item(&[("name", "banana")]));
        assert_eq!(edited.attribute("name").unwrap(), "bonana");
    }

    #[test]
    fn test_edit_no_op() {
        let edit = AttributeEdit::new("name", "Movie:", "Movies:");

        let missing = item(&[("id", "10")]);
        let edited = edit.apply(missing.clone());
        assert_eq!(edited, missing);
        assert_eq!(edited.depth(), 0);

        let unmatched = item(&[("name", "Series: Foo")]);
        let edited = edit.apply(unmatched.clone());
        assert_eq!(edited, unmatched);
        assert_eq!(edited.attribute_names(), vec!["name"]);
    }

    #[test]
    fn test_tag() {
        let tag = AttributeTag::new("tvg-name", "quality", ["SD", "HD", "4K"]);
        let tagged = tag.apply(item(&[("tvg-name", "Show 4K")]));
        assert_eq!(tagged.attribute("quality").unwrap(), "4K");
        assert_eq!(tagged.attribute("tvg-name").unwrap(), "Show");
        assert_eq!(tagged.attribute_names(), vec!["tvg-name", "quality"]);
    }

    #[test]
    fn test_tag_collapses_whitespace() {
        let tag = AttributeTag::new("tvg-name", "country", ["PT"]);
        let tagged = tag.apply(item(&[("tvg-name", " RTP  PT   1 ")]));
        assert_eq!(tagged.attribute("tvg-name").unwrap(), "RTP 1");
        assert_eq!(tagged.attribute("country").unwrap(), "PT");
    }

    #[test]
    fn test_tag_first_candidate_wins() {
        // "HD" is listed before "FHD" and is a substring of it
        let tag = AttributeTag::new("tvg-name", "quality", ["SD", "HD", "FHD"]);
        let tagged = tag.apply(item(&[("tvg-name", "beIN SPORTS 1 FHD QA")]));
        assert_eq!(tagged.attribute("quality").unwrap(), "HD");
        assert_eq!(tagged.attribute("tvg-name").unwrap(), "beIN SPORTS 1 F QA");
    }

    #[test]
    fn test_tag_no_op() {
        let tag = AttributeTag::new("tvg-name", "quality", ["SD", "HD"]);
        let untagged = item(&[("tvg-name", "Show 4K")]);
        let result = tag.apply(untagged.clone());
        assert_eq!(result, untagged);
        assert_eq!(result.attribute("quality"), None);

        let missing = item(&[]);
        assert_eq!(tag.apply(missing.clone()), missing);
    }

    #[test]
    fn test_composite_edits_many_fields() {
        let composite = ItemTransformationComposite::new(vec![
            Box::new(AttributeEdit::new("name", "Some", "Whatever")),
            Box::new(AttributeEdit::new("id", "1", "9")),
        ]);
        let edited = composite.apply(item(&[
            ("name", "Movie: Some Movie [Multi-subs]"),
            ("id", "10"),
        ]));

        assert_eq!(edited.attribute("id").unwrap(), "90");
        assert_eq!(
            edited.attribute("name").unwrap(),
            "Movie: Whatever Movie [Multi-subs]"
        );
    }

    #[test]
    fn test_composite_edits_in_order() {
        let composite = ItemTransformationComposite::new(vec![
            Box::new(AttributeEdit::new("name", "Some", "Whatever")),
            Box::new(AttributeEdit::new("name", "Whatever", "Real Nice")),
        ]);
        let edited = composite.apply(item(&[
            ("name", "Movie: Some Movie [Multi-subs]"),
            ("id", "10"),
        ]));

        assert_eq!(edited.attribute("id").unwrap(), "10");
        assert_eq!(
            edited.attribute("name").unwrap(),
            "Movie: Real Nice Movie [Multi-subs]"
        );
    }

    #[test]
    fn test_composite_tag_after_edit() {
        let composite = ItemTransformationComposite::new(vec![
            Box::new(AttributeEdit::new("tvg-name", "UHD", "4K")),
            Box::new(AttributeTag::new("tvg-name", "quality", ["SD", "4K"])),
        ]);
        let result = composite.apply(item(&[("tvg-name", "Show UHD")]));

        assert_eq!(result.attribute("quality").unwrap(), "4K");
        assert_eq!(result.attribute("tvg-name").unwrap(), "Show");
    }

    #[test]
    fn test_empty_composite_and_closure() {
        let source = item(&[("id", "1")]);
        assert_eq!(ItemTransformationComposite::default().apply(source.clone()), source);

        let closure = |item: M3uItem| item.with_attribute("id", "2");
        assert_eq!(closure.apply(source).attribute("id").unwrap(), "2");
    }
}

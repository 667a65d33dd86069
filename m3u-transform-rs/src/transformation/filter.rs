use smol_str::SmolStr;

use crate::{format::M3uItem, transformation::PlaylistTransformation};

/// A predicate over one playlist item
pub trait Filter: Send + Sync {
    fn matches(&self, item: &M3uItem) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&M3uItem) -> bool + Send + Sync,
{
    fn matches(&self, item: &M3uItem) -> bool {
        self(item)
    }
}

/// Keeps items whose attribute value is one of `values`.
///
/// A `None` in `values` matches items that lack the attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFilter {
    attribute: SmolStr,
    values: Vec<Option<SmolStr>>,
}

impl AttributeFilter {
    pub fn new(attribute: impl Into<SmolStr>, values: Vec<Option<SmolStr>>) -> Self {
        Self {
            attribute: attribute.into(),
            values,
        }
    }

    pub fn any_of(
        attribute: impl Into<SmolStr>,
        values: impl IntoIterator<Item = impl Into<SmolStr>>,
    ) -> Self {
        Self::new(attribute, values.into_iter().map(|x| Some(x.into())).collect())
    }
}

impl Filter for AttributeFilter {
    fn matches(&self, item: &M3uItem) -> bool {
        let value = item.attribute(&self.attribute);
        self.values.contains(&value)
    }
}

/// Logical AND of its filters, evaluated left to right
#[derive(Default)]
pub struct FilterComposite {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterComposite {
    pub fn new(filters: Vec<Box<dyn Filter>>) -> Self {
        Self { filters }
    }
}

impl Filter for FilterComposite {
    fn matches(&self, item: &M3uItem) -> bool {
        self.filters.iter().all(|filter| filter.matches(item))
    }
}

/// AND-composes filters; no filters match everything, a single filter is returned as is
pub fn compose_filters(mut filters: Vec<Box<dyn Filter>>) -> Box<dyn Filter> {
    match filters.len() {
        0 => Box::new(|_: &M3uItem| true),
        1 => filters.remove(0),
        _ => Box::new(FilterComposite::new(filters)),
    }
}

/// Playlist stage keeping only the items matched by a filter
pub struct FilterTransformation {
    filter: Box<dyn Filter>,
}

impl FilterTransformation {
    pub fn new(filter: Box<dyn Filter>) -> Self {
        Self { filter }
    }
}

impl PlaylistTransformation for FilterTransformation {
    fn apply(&self, mut items: Vec<M3uItem>) -> Vec<M3uItem> {
        items.retain(|item| self.filter.matches(item));
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::M3uEntry;

    fn item(attributes: &[(&str, &str)]) -> M3uItem {
        let mut entry = M3uEntry::default();
        for (name, value) in attributes {
            entry.push_attribute(*name, *value);
        }
        entry.into()
    }

    #[test]
    fn test_attribute_filter() {
        let filter = AttributeFilter::any_of("country", ["QA", "BG"]);
        assert!(filter.matches(&item(&[("country", "QA")])));
        assert!(filter.matches(&item(&[("country", "BG")])));
        assert!(!filter.matches(&item(&[("country", "PT")])));
        assert!(!filter.matches(&item(&[("country", "qa")])));
        assert!(!filter.matches(&item(&[])));
    }

    #[test]
    fn test_attribute_filter_absent_value() {
        let filter = AttributeFilter::new("country", vec![None, Some("PT".into())]);
        assert!(filter.matches(&item(&[])));
        assert!(filter.matches(&item(&[("country", "PT")])));
        assert!(!filter.matches(&item(&[("country", "")])));
    }

    #[test]
    fn test_attribute_filter_sees_overlay() {
        let filter = AttributeFilter::any_of("quality", ["HD"]);
        let source = item(&[("tvg-name", "Show HD")]);
        assert!(!filter.matches(&source));
        assert!(filter.matches(&source.with_attribute("quality", "HD")));
    }

    #[test]
    fn test_compose_filters() {
        let items = [
            item(&[("country", "PT"), ("quality", "HD")]),
            item(&[("country", "PT"), ("quality", "SD")]),
            item(&[("country", "QA"), ("quality", "HD")]),
            item(&[]),
        ];

        let none = compose_filters(vec![]);
        assert!(items.iter().all(|x| none.matches(x)));

        let one = compose_filters(vec![Box::new(AttributeFilter::any_of("country", ["PT"]))]);
        assert_eq!(items.iter().filter(|x| one.matches(x)).count(), 2);

        let both = compose_filters(vec![
            Box::new(AttributeFilter::any_of("country", ["PT"])),
            Box::new(AttributeFilter::any_of("quality", ["HD"])),
        ]);
        let matched = items.iter().filter(|x| both.matches(x)).collect::<Vec<_>>();
        assert_eq!(matched, vec![&items[0]]);
    }

    #[test]
    fn test_filter_transformation() {
        let transformation = FilterTransformation::new(Box::new(AttributeFilter::any_of(
            "country",
            ["QA", "BG"],
        )));
        let result = transformation.apply(vec![
            item(&[("id", "1"), ("country", "QA")]),
            item(&[("id", "2"), ("country", "PT")]),
            item(&[("id", "3"), ("country", "BG")]),
        ]);

        let ids = result
            .iter()
            .filter_map(|x| x.attribute("id"))
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["1", "3"]);
    }
}

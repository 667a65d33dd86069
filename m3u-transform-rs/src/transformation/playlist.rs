use crate::{
    format::{M3uItem, M3uPlaylist},
    transformation::ItemTransformation,
};

/// A pure function from an ordered list of items to another
pub trait PlaylistTransformation: Send + Sync {
    fn apply(&self, items: Vec<M3uItem>) -> Vec<M3uItem>;
}

impl<F> PlaylistTransformation for F
where
    F: Fn(Vec<M3uItem>) -> Vec<M3uItem> + Send + Sync,
{
    fn apply(&self, items: Vec<M3uItem>) -> Vec<M3uItem> {
        self(items)
    }
}

impl M3uPlaylist {
    pub fn transform(self, transformation: &dyn PlaylistTransformation) -> Self {
        Self::new(transformation.apply(self.items))
    }
}

/// Playlist stage applying an item transformation to every item
pub struct AttributeTransformation {
    transformation: Box<dyn ItemTransformation>,
}

impl AttributeTransformation {
    pub fn new(transformation: Box<dyn ItemTransformation>) -> Self {
        Self { transformation }
    }
}

impl PlaylistTransformation for AttributeTransformation {
    fn apply(&self, items: Vec<M3uItem>) -> Vec<M3uItem> {
        items
            .into_iter()
            .map(|item| self.transformation.apply(item))
            .collect()
    }
}

/// Runs its stages in list order, feeding the output of each into the next
#[derive(Default)]
pub struct TransformationComposite {
    transformations: Vec<Box<dyn PlaylistTransformation>>,
}

impl TransformationComposite {
    pub fn new(transformations: Vec<Box<dyn PlaylistTransformation>>) -> Self {
        Self { transformations }
    }
}

impl PlaylistTransformation for TransformationComposite {
    fn apply(&self, items: Vec<M3uItem>) -> Vec<M3uItem> {
        self.transformations
            .iter()
            .fold(items, |items, transformation| transformation.apply(items))
    }
}

/// Sequential composition; a single stage is returned unwrapped
pub fn compose(
    mut transformations: Vec<Box<dyn PlaylistTransformation>>,
) -> Box<dyn PlaylistTransformation> {
    if transformations.len() == 1 {
        return transformations.remove(0);
    }
    Box::new(TransformationComposite::new(transformations))
}

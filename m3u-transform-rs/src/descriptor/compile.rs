use log::debug;
use serde_yaml::Value;

use super::{
    DescriptorError, FilterDescriptor, ItemTransformationDescriptor,
    PlaylistTransformationDescriptor, SelectByAttributeDescriptor, StageDescriptor,
};
use crate::transformation::{
    compose, compose_filters, AttributeEdit, AttributeFilter, AttributeTag,
    AttributeTransformation, AttributesGrouping, Filter, FilterTransformation, ItemTransformation,
    ItemTransformationComposite, PlaylistTransformation, SelectByAttribute,
};

impl ItemTransformationDescriptor {
    pub fn compile(&self) -> Box<dyn ItemTransformation> {
        match self {
            Self::Tag(x) => Box::new(AttributeTag::new(
                x.source.clone(),
                x.target.clone(),
                x.values.iter().cloned(),
            )),
            Self::Replace(x) => Box::new(AttributeEdit::new(
                x.attribute.clone(),
                x.original.clone(),
                x.replacement.clone(),
            )),
        }
    }
}

impl FilterDescriptor {
    pub fn compile(&self) -> Box<dyn Filter> {
        match self {
            Self::Attribute(constraints) => compose_filters(
                constraints
                    .iter()
                    .map(|x| {
                        Box::new(AttributeFilter::new(x.name.clone(), x.values.clone()))
                            as Box<dyn Filter>
                    })
                    .collect(),
            ),
        }
    }
}

impl SelectByAttributeDescriptor {
    pub fn compile(&self) -> SelectByAttribute {
        SelectByAttribute::new(
            Box::new(AttributesGrouping::new(self.grouping.iter().cloned())),
            self.selection_attribute.clone(),
            self.preference.iter().cloned(),
        )
    }
}

impl StageDescriptor {
    pub fn compile(&self) -> Box<dyn PlaylistTransformation> {
        match self {
            Self::Attributes(items) => Box::new(AttributeTransformation::new(Box::new(
                ItemTransformationComposite::new(items.iter().map(|x| x.compile()).collect()),
            ))),
            Self::Filter(filters) => Box::new(FilterTransformation::new(compose_filters(
                filters.iter().map(|x| x.compile()).collect(),
            ))),
            Self::SelectByAttribute(x) => Box::new(x.compile()),
        }
    }
}

impl PlaylistTransformationDescriptor {
    /// Builds the pipeline running every stage in document order.
    /// A descriptor without stages yields the identity transformation.
    pub fn compile(&self) -> Box<dyn PlaylistTransformation> {
        debug!(
            "Compiling transformation with {} stage(s): [{}]",
            self.stages.len(),
            self.stages
                .iter()
                .map(|x| x.key())
                .collect::<Vec<_>>()
                .join(", ")
        );
        compose(self.stages.iter().map(|x| x.compile()).collect())
    }
}

pub fn compile(descriptor: &PlaylistTransformationDescriptor) -> Box<dyn PlaylistTransformation> {
    descriptor.compile()
}

pub fn compile_value(value: &Value) -> Result<Box<dyn PlaylistTransformation>, DescriptorError> {
    Ok(PlaylistTransformationDescriptor::try_from(value)?.compile())
}

pub fn compile_str(source: &str) -> Result<Box<dyn PlaylistTransformation>, DescriptorError> {
    Ok(source.parse::<PlaylistTransformationDescriptor>()?.compile())
}

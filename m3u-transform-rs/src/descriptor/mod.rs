//! Declarative transformation descriptors.
//!
//! A descriptor is decoded from an ordered document tree ([`serde_yaml::Value`],
//! whose mappings keep the keys in the order they were written) into the typed
//! model below, then compiled into a [`PlaylistTransformation`] pipeline.
//! Stages run in the order their keys appear in the document.
//!
//! ```yaml
//! filter:
//!   - attribute:
//!       country: ["QA", "BG"]
//! attributes:
//!   - tag:
//!       source: "tvg-name"
//!       target: "quality"
//!       values: ["SD", "FHD", "HD", "4K"]
//!   - replace:
//!       attribute: "group-title"
//!       original: "Movie:"
//!       replacement: "Movies:"
//! select-by-attribute:
//!   grouping:
//!     attributes: ["tvg-name", "country"]
//!   selection-attribute: "quality"
//!   preference: ["SD", "FHD", "HD"]
//! ```
//!
//! [`PlaylistTransformation`]: crate::transformation::PlaylistTransformation

mod compile;
mod decode;

use std::{error::Error, fmt::Display};

use smol_str::SmolStr;

pub use compile::*;

pub mod keys {
    pub const TAG: &str = "tag";
    pub const REPLACE: &str = "replace";
    pub const ATTRIBUTE: &str = "attribute";
    pub const ATTRIBUTES: &str = "attributes";
    pub const FILTER: &str = "filter";
    pub const SELECT_BY_ATTRIBUTE: &str = "select-by-attribute";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDescriptor {
    pub source: SmolStr,
    pub target: SmolStr,
    pub values: Vec<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDescriptor {
    pub attribute: SmolStr,
    pub original: SmolStr,
    pub replacement: SmolStr,
}

/// One entry of an `attributes` stage, keyed by `tag` or `replace`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemTransformationDescriptor {
    Tag(TagDescriptor),
    Replace(EditDescriptor),
}

/// Allowed values for one attribute; `None` stands for "attribute absent"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeConstraint {
    pub name: SmolStr,
    pub values: Vec<Option<SmolStr>>,
}

/// One entry of a `filter` stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDescriptor {
    /// Every constraint must hold
    Attribute(Vec<AttributeConstraint>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectByAttributeDescriptor {
    /// Attributes whose concatenated values form the group key
    pub grouping: Vec<SmolStr>,
    pub selection_attribute: SmolStr,
    pub preference: Vec<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageDescriptor {
    Attributes(Vec<ItemTransformationDescriptor>),
    Filter(Vec<FilterDescriptor>),
    SelectByAttribute(SelectByAttributeDescriptor),
}

impl StageDescriptor {
    /// The document key this stage was declared under
    pub fn key(&self) -> &'static str {
        match self {
            Self::Attributes(_) => keys::ATTRIBUTES,
            Self::Filter(_) => keys::FILTER,
            Self::SelectByAttribute(_) => keys::SELECT_BY_ATTRIBUTE,
        }
    }
}

/// A whole transformation: its stages in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistTransformationDescriptor {
    pub stages: Vec<StageDescriptor>,
}

#[derive(Debug)]
pub enum DescriptorError {
    /// A node that must hold exactly one variant key holds none or several
    AmbiguousNode { path: String, keys: Vec<String> },
    UnknownVariant { path: String, key: String },
    UnknownStage { key: String },
    MissingField { path: String, field: &'static str },
    InvalidType { path: String, expected: &'static str },
    Yaml(serde_yaml::Error),
}

impl Display for DescriptorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AmbiguousNode { path, keys } => write!(
                f,
                "Expected exactly one key at `{}` to identify its type, found {}: [{}]",
                path,
                keys.len(),
                keys.join(", ")
            ),
            Self::UnknownVariant { path, key } => {
                write!(f, "Unknown type `{}` at `{}`", key, path)
            }
            Self::UnknownStage { key } => write!(f, "Unknown transformation type `{}`", key),
            Self::MissingField { path, field } => {
                write!(f, "Missing field `{}` at `{}`", field, path)
            }
            Self::InvalidType { path, expected } => {
                write!(f, "Expected {} at `{}`", expected, path)
            }
            Self::Yaml(e) => e.fmt(f),
        }
    }
}

impl Error for DescriptorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Yaml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for DescriptorError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

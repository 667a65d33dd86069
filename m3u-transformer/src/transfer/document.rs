use std::{
    error::Error,
    fmt::{self, Display},
    str::FromStr,
};

use m3u_transform_rs::{
    descriptor::{DescriptorError, PlaylistTransformationDescriptor},
    transformation::PlaylistTransformation,
};
use serde::Deserialize;
use serde_yaml::Value;
use url::Url;

#[derive(Deserialize)]
struct RawDocument {
    url: String,
    #[serde(default)]
    transformation: Value,
}

/// A stored document: where the playlist comes from and how to rewrite it.
///
/// ```yaml
/// url: "http://example.com/source.m3u"
/// transformation:
///   filter:
///     - attribute:
///         country: ["PT"]
/// ```
pub struct TransformedPlaylist {
    pub url: Url,
    pub descriptor: PlaylistTransformationDescriptor,
    pub pipeline: Box<dyn PlaylistTransformation>,
}

impl fmt::Debug for TransformedPlaylist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformedPlaylist")
            .field("url", &self.url.as_str())
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum DocumentError {
    Yaml(serde_yaml::Error),
    InvalidUrl(url::ParseError),
    Descriptor(DescriptorError),
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml(e) => write!(f, "Invalid document: {}", e),
            Self::InvalidUrl(e) => write!(f, "Invalid source url: {}", e),
            Self::Descriptor(e) => write!(f, "Invalid transformation: {}", e),
        }
    }
}

impl Error for DocumentError {}

impl From<serde_yaml::Error> for DocumentError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

impl From<url::ParseError> for DocumentError {
    fn from(value: url::ParseError) -> Self {
        Self::InvalidUrl(value)
    }
}

impl From<DescriptorError> for DocumentError {
    fn from(value: DescriptorError) -> Self {
        Self::Descriptor(value)
    }
}

impl FromStr for TransformedPlaylist {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: RawDocument = serde_yaml::from_str(s)?;
        let url = Url::parse(&raw.url)?;
        let descriptor = PlaylistTransformationDescriptor::try_from(&raw.transformation)?;
        let pipeline = descriptor.compile();

        Ok(Self {
            url,
            descriptor,
            pipeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let document: TransformedPlaylist = r#"
url: "http://example.com/source.m3u"
transformation:
  filter:
    - attribute:
        country: ["PT"]
  attributes:
    - replace:
        attribute: "group-title"
        original: "Movie:"
        replacement: "Movies:"
"#
        .parse()
        .unwrap();

        assert_eq!(document.url.as_str(), "http://example.com/source.m3u");
        assert_eq!(document.descriptor.stages.len(), 2);
    }

    #[test]
    fn test_transformation_is_optional() {
        let document: TransformedPlaylist = "url: http://example.com/a.m3u".parse().unwrap();
        assert!(document.descriptor.stages.is_empty());
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            "transformation: {}".parse::<TransformedPlaylist>(),
            Err(DocumentError::Yaml(_))
        ));
        assert!(matches!(
            "url: /relative/source.m3u".parse::<TransformedPlaylist>(),
            Err(DocumentError::InvalidUrl(_))
        ));
        assert!(matches!(
            "url: http://example.com/a.m3u\ntransformation:\n  sort: {}\n"
                .parse::<TransformedPlaylist>(),
            Err(DocumentError::Descriptor(DescriptorError::UnknownStage { .. }))
        ));
    }
}

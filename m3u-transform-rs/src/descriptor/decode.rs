use std::str::FromStr;

use serde_yaml::{Mapping, Value};
use smol_str::SmolStr;

use super::{
    keys, AttributeConstraint, DescriptorError, EditDescriptor, FilterDescriptor,
    ItemTransformationDescriptor, PlaylistTransformationDescriptor, SelectByAttributeDescriptor,
    StageDescriptor, TagDescriptor,
};

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_owned()
    } else {
        format!("{}.{}", path, name)
    }
}

fn index(path: &str, i: usize) -> String {
    format!("{}[{}]", path, i)
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_owned(),
        other => format!("{:?}", other),
    }
}

fn expect_mapping<'v>(value: &'v Value, path: &str) -> Result<&'v Mapping, DescriptorError> {
    value.as_mapping().ok_or_else(|| DescriptorError::InvalidType {
        path: path.to_owned(),
        expected: "a mapping",
    })
}

fn expect_sequence<'v>(value: &'v Value, path: &str) -> Result<&'v [Value], DescriptorError> {
    match value {
        Value::Sequence(x) => Ok(x.as_slice()),
        _ => Err(DescriptorError::InvalidType {
            path: path.to_owned(),
            expected: "a list",
        }),
    }
}

fn field<'v>(
    mapping: &'v Mapping,
    path: &str,
    name: &'static str,
) -> Result<&'v Value, DescriptorError> {
    mapping.get(name).ok_or_else(|| DescriptorError::MissingField {
        path: path.to_owned(),
        field: name,
    })
}

fn scalar_text(value: &Value, path: &str) -> Result<SmolStr, DescriptorError> {
    match value {
        Value::String(s) => Ok(SmolStr::new(s)),
        Value::Number(n) => Ok(SmolStr::new(n.to_string())),
        Value::Bool(b) => Ok(SmolStr::new(b.to_string())),
        _ => Err(DescriptorError::InvalidType {
            path: path.to_owned(),
            expected: "a scalar",
        }),
    }
}

fn text_field(mapping: &Mapping, path: &str, name: &'static str) -> Result<SmolStr, DescriptorError> {
    scalar_text(field(mapping, path, name)?, &join(path, name))
}

fn text_list_field(
    mapping: &Mapping,
    path: &str,
    name: &'static str,
) -> Result<Vec<SmolStr>, DescriptorError> {
    let value = field(mapping, path, name)?;
    let path = join(path, name);
    expect_sequence(value, &path)?
        .iter()
        .enumerate()
        .map(|(i, x)| scalar_text(x, &index(&path, i)))
        .collect()
}

/// The only key of a node whose single key names its variant
fn single_key<'v>(mapping: &'v Mapping, path: &str) -> Result<(String, &'v Value), DescriptorError> {
    let mut entries = mapping.iter();
    match (entries.next(), entries.next()) {
        (Some((key, value)), None) => Ok((key_text(key), value)),
        _ => Err(DescriptorError::AmbiguousNode {
            path: path.to_owned(),
            keys: mapping.keys().map(key_text).collect(),
        }),
    }
}

fn decode_list<T>(
    value: &Value,
    path: &str,
    decode: fn(&Value, &str) -> Result<T, DescriptorError>,
) -> Result<Vec<T>, DescriptorError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    expect_sequence(value, path)?
        .iter()
        .enumerate()
        .map(|(i, x)| decode(x, &index(path, i)))
        .collect()
}

impl TagDescriptor {
    pub(crate) fn decode(value: &Value, path: &str) -> Result<Self, DescriptorError> {
        let mapping = expect_mapping(value, path)?;
        Ok(Self {
            source: text_field(mapping, path, "source")?,
            target: text_field(mapping, path, "target")?,
            values: text_list_field(mapping, path, "values")?,
        })
    }
}

impl EditDescriptor {
    pub(crate) fn decode(value: &Value, path: &str) -> Result<Self, DescriptorError> {
        let mapping = expect_mapping(value, path)?;
        Ok(Self {
            attribute: text_field(mapping, path, "attribute")?,
            original: text_field(mapping, path, "original")?,
            replacement: text_field(mapping, path, "replacement")?,
        })
    }
}

impl ItemTransformationDescriptor {
    pub(crate) fn decode(value: &Value, path: &str) -> Result<Self, DescriptorError> {
        let (key, inner) = single_key(expect_mapping(value, path)?, path)?;
        let inner_path = join(path, &key);
        match key.as_str() {
            keys::TAG => Ok(Self::Tag(TagDescriptor::decode(inner, &inner_path)?)),
            keys::REPLACE => Ok(Self::Replace(EditDescriptor::decode(inner, &inner_path)?)),
            _ => Err(DescriptorError::UnknownVariant {
                path: path.to_owned(),
                key,
            }),
        }
    }
}

impl AttributeConstraint {
    fn decode(name: &Value, value: &Value, path: &str) -> Result<Self, DescriptorError> {
        let name = key_text(name);
        let path = join(path, &name);
        let values = match value {
            Value::Null => vec![None],
            Value::Sequence(values) => values
                .iter()
                .enumerate()
                .map(|(i, x)| match x {
                    Value::Null => Ok(None),
                    x => scalar_text(x, &index(&path, i)).map(Some),
                })
                .collect::<Result<Vec<_>, _>>()?,
            x => vec![Some(scalar_text(x, &path)?)],
        };

        Ok(Self {
            name: name.into(),
            values,
        })
    }
}

impl FilterDescriptor {
    pub(crate) fn decode(value: &Value, path: &str) -> Result<Self, DescriptorError> {
        let (key, inner) = single_key(expect_mapping(value, path)?, path)?;
        let inner_path = join(path, &key);
        match key.as_str() {
            keys::ATTRIBUTE => {
                let constraints = expect_mapping(inner, &inner_path)?
                    .iter()
                    .map(|(name, values)| AttributeConstraint::decode(name, values, &inner_path))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::Attribute(constraints))
            }
            _ => Err(DescriptorError::UnknownVariant {
                path: path.to_owned(),
                key,
            }),
        }
    }
}

impl SelectByAttributeDescriptor {
    pub(crate) fn decode(value: &Value, path: &str) -> Result<Self, DescriptorError> {
        let mapping = expect_mapping(value, path)?;
        let grouping_path = join(path, "grouping");
        let grouping = expect_mapping(field(mapping, path, "grouping")?, &grouping_path)?;

        Ok(Self {
            grouping: text_list_field(grouping, &grouping_path, keys::ATTRIBUTES)?,
            selection_attribute: text_field(mapping, path, "selection-attribute")?,
            preference: text_list_field(mapping, path, "preference")?,
        })
    }
}

impl PlaylistTransformationDescriptor {
    pub(crate) fn decode(value: &Value) -> Result<Self, DescriptorError> {
        if value.is_null() {
            return Ok(Self::default());
        }

        let mut stages = Vec::new();
        for (key, value) in expect_mapping(value, "<root>")? {
            let key = key_text(key);
            let stage = match key.as_str() {
                keys::ATTRIBUTES => StageDescriptor::Attributes(decode_list(
                    value,
                    keys::ATTRIBUTES,
                    ItemTransformationDescriptor::decode,
                )?),
                keys::FILTER => StageDescriptor::Filter(decode_list(
                    value,
                    keys::FILTER,
                    FilterDescriptor::decode,
                )?),
                keys::SELECT_BY_ATTRIBUTE => StageDescriptor::SelectByAttribute(
                    SelectByAttributeDescriptor::decode(value, keys::SELECT_BY_ATTRIBUTE)?,
                ),
                _ => return Err(DescriptorError::UnknownStage { key }),
            };
            stages.push(stage);
        }

        Ok(Self { stages })
    }
}

impl TryFrom<&Value> for ItemTransformationDescriptor {
    type Error = DescriptorError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::decode(value, "")
    }
}

impl TryFrom<&Value> for FilterDescriptor {
    type Error = DescriptorError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::decode(value, "")
    }
}

impl TryFrom<&Value> for SelectByAttributeDescriptor {
    type Error = DescriptorError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::decode(value, "")
    }
}

impl TryFrom<&Value> for PlaylistTransformationDescriptor {
    type Error = DescriptorError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::decode(value)
    }
}

impl FromStr for PlaylistTransformationDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_yaml::from_str(s)?;
        Self::decode(&value)
    }
}

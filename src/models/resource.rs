use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifying `(type, id)` pair used by JSON:API relationships
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(deserialize_with = "crate::parsers::deserializers::deserialize_id")]
    pub id: String,
}

impl ResourceRef {
    pub fn new(resource_type: &str, id: &str) -> Self {
        Self { resource_type: resource_type.to_string(), id: id.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RelationshipData {
    One(ResourceRef),
    Many(Vec<ResourceRef>),
}

/// A single named relationship; `data` is absent when the service only sent links
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<RelationshipData>,
}

impl Relationship {
    pub fn to_one(target: ResourceRef) -> Self {
        Self { data: Some(RelationshipData::One(target)) }
    }

    pub fn to_many(targets: Vec<ResourceRef>) -> Self {
        Self { data: Some(RelationshipData::Many(targets)) }
    }

    /// All referenced targets, regardless of cardinality
    pub fn targets(&self) -> &[ResourceRef] {
        match &self.data {
            Some(RelationshipData::One(target)) => std::slice::from_ref(target),
            Some(RelationshipData::Many(targets)) => targets,
            None => &[],
        }
    }

    /// The first referenced target, if any
    pub fn first(&self) -> Option<&ResourceRef> {
        self.targets().first()
    }
}

/// One JSON:API resource as delivered by the service
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(deserialize_with = "crate::parsers::deserializers::deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::null_as_default")]
    pub attributes: Map<String, Value>,
    /// Relationships in the order the service sent them
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_relationships")]
    pub relationships: Vec<(String, Relationship)>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::null_as_default")]
    pub meta: Map<String, Value>,
}

impl RawResource {
    pub fn new(resource_type: &str, id: &str) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
            attributes: Map::new(),
            relationships: Vec::new(),
            meta: Map::new(),
        }
    }

    pub fn key(&self) -> ResourceRef {
        ResourceRef::new(&self.resource_type, &self.id)
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// String view of an attribute, accepting numbers as well
    pub fn attribute_str(&self, name: &str) -> Option<String> {
        match self.attributes.get(name)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|(rel_name, _)| rel_name == name).map(|(_, rel)| rel)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    One(Box<RawResource>),
    Many(Vec<RawResource>),
}

/// A complete response: primary data, side-loaded resources and pagination meta
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub data: Option<PrimaryData>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::null_as_default")]
    pub included: Vec<RawResource>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::null_as_default")]
    pub meta: Map<String, Value>,
}

impl Payload {
    /// Primary resources as a slice, regardless of cardinality
    pub fn primary(&self) -> &[RawResource] {
        match &self.data {
            Some(PrimaryData::One(resource)) => std::slice::from_ref(&**resource),
            Some(PrimaryData::Many(resources)) => resources,
            None => &[],
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self.data, Some(PrimaryData::One(_)))
    }
}

/// Lookup of side-loaded resources by `(type, id)`, scoped to one payload
#[derive(Debug, Default)]
pub struct IncludedIndex<'a> {
    by_type: HashMap<&'a str, HashMap<&'a str, &'a RawResource>>,
}

impl<'a> IncludedIndex<'a> {
    pub fn build(included: &'a [RawResource]) -> Self {
        let mut by_type: HashMap<&'a str, HashMap<&'a str, &'a RawResource>> = HashMap::new();
        for resource in included {
            by_type
                .entry(resource.resource_type.as_str())
                .or_default()
                .insert(resource.id.as_str(), resource);
        }
        Self { by_type }
    }

    pub fn get(&self, target: &ResourceRef) -> Option<&'a RawResource> {
        self.by_type.get(target.resource_type.as_str())?.get(target.id.as_str()).copied()
    }

    pub fn len(&self) -> usize {
        self.by_type.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cleaned, link-free resource; keys keep insertion order
pub type CleanResource = Map<String, Value>;

/// Response wrapper handed to callers before encoding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub data: Value,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webapp_url: Option<String>,
}

impl Envelope {
    pub fn new(data: Value) -> Self {
        Self { data, meta: Map::new(), included: Vec::new(), webapp_url: None }
    }

    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = meta;
        self
    }
}

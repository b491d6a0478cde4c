//! OCSF schema documents
//!
//! Typed views of what the schema server returns. Fields the server adds
//! beyond the ones modeled here are kept in `extra` rather than rejected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Profiles keyed by name
pub type Profiles = BTreeMap<String, OcsfProfile>;
/// Extensions keyed by name
pub type Extensions = BTreeMap<String, OcsfExtension>;

/// A member of an enumerated attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcsfEnumMember {
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Deprecation notice attached to an attribute, class or object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcsfDeprecationInfo {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub since: Option<String>,
}

/// An attribute of a class, object or profile
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OcsfAttribute {
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Data type name (e.g., "string_t", "object_t")
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    /// "required", "recommended" or "optional"
    #[serde(default)]
    pub requirement: Option<String>,
    #[serde(default)]
    pub is_array: Option<bool>,
    /// Object name when `type_name` is "object_t"
    #[serde(default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    /// Profile that contributes this attribute, if any
    #[serde(default)]
    pub profile: Option<String>,
    /// Caption attribute paired with an enum id
    #[serde(default)]
    pub sibling: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_members: Option<BTreeMap<String, OcsfEnumMember>>,
    #[serde(rename = "@deprecated", default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<OcsfDeprecationInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An event class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcsfClass {
    pub name: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uid: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, OcsfAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<String>>,
    #[serde(rename = "@deprecated", default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<OcsfDeprecationInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A shared object type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcsfObject {
    pub name: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, OcsfAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<String>>,
    #[serde(rename = "@deprecated", default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<OcsfDeprecationInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named bundle of attributes overlaying classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcsfProfile {
    pub name: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub meta: Option<String>,
    /// Contributed attributes, ordered by name
    #[serde(default)]
    pub attributes: BTreeMap<String, OcsfAttribute>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An add-on package to the base schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcsfExtension {
    pub name: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uid: Option<i64>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The export document served for one version
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SchemaDocument {
    #[serde(default)]
    pub version: Option<String>,
    pub classes: BTreeMap<String, OcsfClass>,
    pub objects: BTreeMap<String, OcsfObject>,
    #[serde(default)]
    pub types: BTreeMap<String, Value>,
    #[serde(default)]
    pub base_event: Option<OcsfClass>,
}

/// A complete schema for one concrete version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcsfSchema {
    pub version: String,
    pub classes: BTreeMap<String, OcsfClass>,
    pub objects: BTreeMap<String, OcsfObject>,
    /// Data type dictionary, passed through unmodified
    #[serde(default)]
    pub types: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_event: Option<OcsfClass>,
    /// Present only when profiles were requested
    #[serde(default)]
    pub profiles: Option<Profiles>,
    /// Present only when extensions were requested
    #[serde(default)]
    pub extensions: Option<Extensions>,
}

impl OcsfSchema {
    pub(crate) fn from_document(version: impl Into<String>, document: SchemaDocument) -> Self {
        let version = version.into();
        if let Some(reported) = document.version.as_deref() {
            if reported != version {
                tracing::debug!(requested = %version, reported, "server reported a different schema version");
            }
        }
        Self {
            version,
            classes: document.classes,
            objects: document.objects,
            types: document.types,
            base_event: document.base_event,
            profiles: None,
            extensions: None,
        }
    }

    pub fn class(&self, name: &str) -> Option<&OcsfClass> {
        self.classes.get(name)
    }

    pub fn object(&self, name: &str) -> Option<&OcsfObject> {
        self.objects.get(name)
    }

    /// Look up a class by its numeric uid
    pub fn class_by_uid(&self, uid: i64) -> Option<&OcsfClass> {
        self.classes.values().find(|c| c.uid == Some(uid))
    }
}

//! JSON:API document encoding and decoding
//!
//! The Scalr API speaks `application/vnd.api+json`. Responses are decoded
//! into loosely typed [`ResourceObject`]s first and then turned into typed
//! records through [`Resource::from_object`], resolving relationships
//! against the document's `included` array.

use crate::error::{Result, ScalrError};
use crate::pagination::Pagination;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Media type for every request and response body
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// A typed record that can be decoded from a JSON:API resource object
pub trait Resource: Sized {
    /// JSON:API `type` member, e.g. `"workspaces"`
    const TYPE: &'static str;

    /// Decode `object`, embedding related records found in `included`
    fn from_object(object: ResourceObject, included: &Included) -> Result<Self>;
}

/// `{ "type": ..., "id": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl Identifier {
    pub fn new(kind: &str, id: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            id: id.into(),
        }
    }
}

/// Relationship linkage: a single identifier or a list of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    One(Identifier),
    Many(Vec<Identifier>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<Linkage>,
}

/// Resource object as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,
}

impl ResourceObject {
    /// Resource object for a create request, no id yet
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            id: None,
            attributes: Map::new(),
            relationships: BTreeMap::new(),
        }
    }

    /// Resource object for an update request
    pub fn with_id(kind: &str, id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::new(kind)
        }
    }

    /// Set attributes from a serializable struct
    ///
    /// Fields that serialize to nothing (skipped `None`s) are not sent, so
    /// an update only touches what the caller set.
    pub fn attributes_from<A: Serialize>(mut self, attributes: &A) -> Result<Self> {
        match serde_json::to_value(attributes)? {
            Value::Object(map) => self.attributes = map,
            Value::Null => {}
            other => {
                return Err(ScalrError::Decode(format!(
                    "attributes must serialize to an object, got {other}"
                )));
            }
        }
        Ok(self)
    }

    pub fn relate_one(mut self, name: &str, kind: &str, id: &str) -> Self {
        self.relationships.insert(
            name.to_string(),
            Relationship {
                data: Some(Linkage::One(Identifier::new(kind, id))),
            },
        );
        self
    }

    pub fn relate_many<I, S>(mut self, name: &str, kind: &str, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = ids.into_iter().map(|id| Identifier::new(kind, id)).collect();
        self.relationships.insert(
            name.to_string(),
            Relationship {
                data: Some(Linkage::Many(ids)),
            },
        );
        self
    }

    /// The object's id, or a decode error when the service omitted it
    pub fn require_id(&self) -> Result<String> {
        self.id
            .clone()
            .ok_or_else(|| ScalrError::Decode(format!("{} object without id", self.kind)))
    }

    /// Decode the attributes member into a typed struct
    pub fn attributes<A: DeserializeOwned>(&self) -> Result<A> {
        Ok(serde_json::from_value(Value::Object(self.attributes.clone()))?)
    }

    /// Resolve a to-one relationship, embedding the included record if present
    pub fn to_one<T: Resource>(&self, name: &str, included: &Included) -> Result<Option<Related<T>>> {
        match self.relationships.get(name).and_then(|r| r.data.as_ref()) {
            Some(Linkage::One(identifier)) => Ok(Some(Related::resolve(identifier, included)?)),
            Some(Linkage::Many(_)) => Err(ScalrError::Decode(format!(
                "relationship '{name}' on {} is a list, expected a single reference",
                self.kind
            ))),
            None => Ok(None),
        }
    }

    /// Resolve a to-many relationship; a missing relationship is an empty list
    pub fn to_many<T: Resource>(&self, name: &str, included: &Included) -> Result<Vec<Related<T>>> {
        match self.relationships.get(name).and_then(|r| r.data.as_ref()) {
            Some(Linkage::Many(identifiers)) => identifiers
                .iter()
                .map(|identifier| Related::resolve(identifier, included))
                .collect(),
            Some(Linkage::One(identifier)) => Ok(vec![Related::resolve(identifier, included)?]),
            None => Ok(Vec::new()),
        }
    }
}

/// Reference to a related resource, with the record itself when it was included
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Related<T> {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<T>,
}

impl<T> Related<T> {
    /// A bare reference
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource: None,
        }
    }
}

impl<T: Resource> Related<T> {
    fn resolve(identifier: &Identifier, included: &Included) -> Result<Self> {
        // Embedded records are decoded without their own includes so that
        // mutually referencing resources cannot recurse.
        let resource = included
            .get(&identifier.kind, &identifier.id)
            .map(|object| T::from_object(object.clone(), &Included::default()))
            .transpose()?;
        Ok(Self {
            id: identifier.id.clone(),
            resource,
        })
    }
}

/// Index over a document's `included` array keyed by `(type, id)`
#[derive(Debug, Default)]
pub struct Included {
    objects: HashMap<(String, String), ResourceObject>,
}

impl Included {
    pub fn new(objects: Vec<ResourceObject>) -> Self {
        let objects = objects
            .into_iter()
            .filter_map(|object| {
                let id = object.id.clone()?;
                Some(((object.kind.clone(), id), object))
            })
            .collect();
        Self { objects }
    }

    pub fn get(&self, kind: &str, id: &str) -> Option<&ResourceObject> {
        self.objects.get(&(kind.to_string(), id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Response document; `D` is a single object or a list
#[derive(Debug, Deserialize)]
pub struct Document<D> {
    pub data: D,
    #[serde(default)]
    pub included: Vec<ResourceObject>,
    #[serde(default)]
    pub meta: Meta,
}

impl Document<ResourceObject> {
    /// Decode the primary resource
    pub fn into_resource<T: Resource>(self) -> Result<T> {
        check_kind::<T>(&self.data)?;
        let included = Included::new(self.included);
        T::from_object(self.data, &included)
    }
}

impl Document<Vec<ResourceObject>> {
    /// Decode every primary resource, keeping the service's order
    pub fn into_resources<T: Resource>(self) -> Result<(Vec<T>, Meta)> {
        let included = Included::new(self.included);
        let items = self
            .data
            .into_iter()
            .map(|object| {
                check_kind::<T>(&object)?;
                T::from_object(object, &included)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((items, self.meta))
    }
}

fn check_kind<T: Resource>(object: &ResourceObject) -> Result<()> {
    if object.kind == T::TYPE {
        Ok(())
    } else {
        Err(ScalrError::Decode(format!(
            "expected resource of type '{}', got '{}'",
            T::TYPE,
            object.kind
        )))
    }
}

/// Request body wrapper: `{ "data": { ... } }`
#[derive(Debug, Serialize)]
pub struct RequestDocument {
    pub data: ResourceObject,
}

/// One entry of a JSON:API `errors` array
#[derive(Debug, Default, Deserialize)]
pub struct ErrorObject {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub source: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorDocument {
    pub errors: Vec<ErrorObject>,
}

impl ErrorDocument {
    /// Summary line plus per-error details for an error response body
    ///
    /// Bodies that are not JSON:API error documents fall back to the raw text.
    /// An error document with no usable entries falls back to `fallback`.
    pub fn summarize(body: &str, fallback: &str) -> (String, Vec<String>) {
        let parsed: Option<ErrorDocument> = serde_json::from_str(body).ok();
        let is_error_document = parsed.is_some();
        let document = parsed.unwrap_or_default();
        let details: Vec<String> = document
            .errors
            .iter()
            .filter_map(|e| match (&e.title, &e.detail) {
                (Some(title), Some(detail)) if title != detail => {
                    Some(format!("{title}: {detail}"))
                }
                (_, Some(detail)) => Some(detail.clone()),
                (Some(title), None) => Some(title.clone()),
                (None, None) => None,
            })
            .collect();

        let message = match details.first() {
            Some(first) => first.clone(),
            None if !is_error_document && !body.trim().is_empty() => body.trim().to_string(),
            None => fallback.to_string(),
        };
        (message, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Thing {
        id: String,
        name: String,
        parent: Option<Related<Box<Thing>>>,
    }

    #[derive(Deserialize)]
    struct ThingAttributes {
        name: String,
    }

    impl Resource for Thing {
        const TYPE: &'static str = "things";

        fn from_object(object: ResourceObject, included: &Included) -> Result<Self> {
            let attrs: ThingAttributes = object.attributes()?;
            Ok(Self {
                id: object.require_id()?,
                name: attrs.name,
                parent: object.to_one("parent", included)?,
            })
        }
    }

    impl Resource for Box<Thing> {
        const TYPE: &'static str = Thing::TYPE;

        fn from_object(object: ResourceObject, included: &Included) -> Result<Self> {
            Thing::from_object(object, included).map(Box::new)
        }
    }

    #[test]
    fn test_decode_with_included() {
        let body = json!({
            "data": {
                "type": "things",
                "id": "thing-2",
                "attributes": {"name": "child"},
                "relationships": {"parent": {"data": {"type": "things", "id": "thing-1"}}}
            },
            "included": [
                {"type": "things", "id": "thing-1", "attributes": {"name": "root"}}
            ]
        });
        let document: Document<ResourceObject> = serde_json::from_value(body).unwrap();
        let thing: Thing = document.into_resource().unwrap();

        assert_eq!(thing.name, "child");
        let parent = thing.parent.unwrap();
        assert_eq!(parent.id, "thing-1");
        assert_eq!(parent.resource.unwrap().name, "root");
    }

    #[test]
    fn test_decode_reference_without_include() {
        let body = json!({
            "data": {
                "type": "things",
                "id": "thing-2",
                "attributes": {"name": "child"},
                "relationships": {"parent": {"data": {"type": "things", "id": "thing-1"}}}
            }
        });
        let document: Document<ResourceObject> = serde_json::from_value(body).unwrap();
        let thing: Thing = document.into_resource().unwrap();
        assert_eq!(thing.parent, Some(Related::id("thing-1")));
    }

    #[test]
    fn test_null_relationship_is_none() {
        let body = json!({
            "data": {
                "type": "things",
                "id": "thing-1",
                "attributes": {"name": "root"},
                "relationships": {"parent": {"data": null}}
            }
        });
        let document: Document<ResourceObject> = serde_json::from_value(body).unwrap();
        let thing: Thing = document.into_resource().unwrap();
        assert!(thing.parent.is_none());
    }

    #[test]
    fn test_wrong_type_is_decode_error() {
        let body = json!({"data": {"type": "others", "id": "o-1", "attributes": {"name": "x"}}});
        let document: Document<ResourceObject> = serde_json::from_value(body).unwrap();
        let result: Result<Thing> = document.into_resource();
        assert!(matches!(result, Err(ScalrError::Decode(_))));
    }

    #[test]
    fn test_request_object_skips_unset_attributes() {
        #[derive(Serialize)]
        struct Patch {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(rename = "auto-apply", skip_serializing_if = "Option::is_none")]
            auto_apply: Option<bool>,
        }

        let object = ResourceObject::with_id("workspaces", "ws-1")
            .attributes_from(&Patch {
                name: None,
                auto_apply: Some(false),
            })
            .unwrap();
        let body = serde_json::to_value(RequestDocument { data: object }).unwrap();

        assert_eq!(
            body,
            json!({"data": {"type": "workspaces", "id": "ws-1", "attributes": {"auto-apply": false}}})
        );
    }

    #[test]
    fn test_relate_many() {
        let object = ResourceObject::new("teams").relate_many("users", "users", ["user-1", "user-2"]);
        let body = serde_json::to_value(&object).unwrap();
        assert_eq!(
            body["relationships"]["users"]["data"],
            json!([{"type": "users", "id": "user-1"}, {"type": "users", "id": "user-2"}])
        );
    }

    #[test]
    fn test_error_summary() {
        let body = r#"{"errors":[{"status":"422","title":"Invalid Attribute","detail":"Name has already been taken"}]}"#;
        let (message, details) = ErrorDocument::summarize(body, "Unprocessable Entity");
        assert_eq!(message, "Invalid Attribute: Name has already been taken");
        assert_eq!(details.len(), 1);

        let (message, details) = ErrorDocument::summarize("", "Not Found");
        assert_eq!(message, "Not Found");
        assert!(details.is_empty());

        let (message, _) = ErrorDocument::summarize("upstream timeout", "Bad Gateway");
        assert_eq!(message, "upstream timeout");
    }

    #[test]
    fn test_empty_error_document_uses_reason() {
        let (message, details) = ErrorDocument::summarize(r#"{"errors":[]}"#, "Forbidden");
        assert_eq!(message, "Forbidden");
        assert!(details.is_empty());

        let (message, _) =
            ErrorDocument::summarize(r#"{"errors":[{"status":"500"}]}"#, "Internal Server Error");
        assert_eq!(message, "Internal Server Error");

        let (message, _) =
            ErrorDocument::summarize(r#"{"message":"rate limited"}"#, "Too Many Requests");
        assert_eq!(message, r#"{"message":"rate limited"}"#);
    }
}

//! Ordered-alternative parsing of the CMS's entity and collection envelopes.
//!
//! The CMS has shipped several envelope generations; payloads from any of
//! them may still arrive (stale caches, mixed API versions, relation
//! sub-documents). Parsing tries each known shape in order and falls through
//! to [`Envelope::Unknown`] instead of erroring.

use serde_json::Value as Json;

/// The envelope generations recognized for a single entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `{ id, attributes: { …fields } }` — classic versioned envelope.
    Attributes { id: i64, attributes: Json },

    /// `{ id, documentId, …fields }` — flattened envelope with a secondary
    /// document identifier.
    FlatDocument {
        id: i64,
        document_id: String,
        fields: Json,
    },

    /// `{ id | _id, …fields }` — minimal flattened fallback.
    Flat { id: i64, fields: Json },

    /// Anything else. Callers substitute a sentinel entity.
    Unknown,
}

impl Envelope {
    /// Probe `raw` against the known shapes, first match wins.
    pub fn parse(raw: &Json) -> Envelope {
        let Some(obj) = raw.as_object() else {
            return Envelope::Unknown;
        };

        if let Some(attributes) = obj.get("attributes").filter(|a| a.is_object()) {
            return Envelope::Attributes {
                id: coerce_id(obj.get("id")),
                attributes: attributes.clone(),
            };
        }

        if let Some(document_id) = obj.get("documentId").and_then(Json::as_str) {
            return Envelope::FlatDocument {
                id: coerce_id(obj.get("id")),
                document_id: document_id.to_string(),
                fields: raw.clone(),
            };
        }

        if obj.contains_key("id") || obj.contains_key("_id") {
            return Envelope::Flat {
                id: coerce_id(obj.get("id").or_else(|| obj.get("_id"))),
                fields: raw.clone(),
            };
        }

        Envelope::Unknown
    }

    pub fn id(&self) -> i64 {
        match self {
            Envelope::Attributes { id, .. }
            | Envelope::FlatDocument { id, .. }
            | Envelope::Flat { id, .. } => *id,
            Envelope::Unknown => 0,
        }
    }

    /// The entity's field table, regardless of which envelope carried it.
    pub fn fields(&self) -> Option<&Json> {
        match self {
            Envelope::Attributes { attributes, .. } => Some(attributes),
            Envelope::FlatDocument { fields, .. } | Envelope::Flat { fields, .. } => Some(fields),
            Envelope::Unknown => None,
        }
    }
}

/// Entity ids are non-negative integers; numeric strings are accepted,
/// anything else coerces to 0.
fn coerce_id(value: Option<&Json>) -> i64 {
    match value {
        Some(Json::Number(n)) => n.as_i64().unwrap_or(0).max(0),
        Some(Json::String(s)) => s.parse::<i64>().unwrap_or(0).max(0),
        _ => 0,
    }
}

/// A collection payload reduced to its item list and optional pagination
/// metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<'a> {
    pub items: &'a [Json],
    pub pagination: Option<&'a Json>,
}

/// Probe a collection response. Recognized, in order:
/// standard envelope (`{data: […], meta}`), a bare array, and the alternate
/// list keys `items` / `results` / `<entity_key>`.
pub fn parse_collection<'a>(raw: &'a Json, entity_key: &str) -> Option<Collection<'a>> {
    let meta_pagination = raw.get("meta").and_then(|m| m.get("pagination"));

    if let Some(items) = raw.get("data").and_then(Json::as_array) {
        return Some(Collection {
            items,
            pagination: meta_pagination,
        });
    }

    if let Some(items) = raw.as_array() {
        return Some(Collection {
            items,
            pagination: None,
        });
    }

    for key in ["items", "results", entity_key] {
        if let Some(items) = raw.get(key).and_then(Json::as_array) {
            return Some(Collection {
                items,
                pagination: meta_pagination.or_else(|| raw.get("pagination")),
            });
        }
    }

    None
}

/// Reduce a single-entity response to the entity payload: unwraps a `data`
/// envelope when present, passes bare objects through, and maps JSON `null`
/// (entity absent) to `None`.
pub fn parse_single(raw: &Json) -> Option<&Json> {
    match raw.get("data") {
        Some(Json::Null) => None,
        Some(data) => Some(data),
        None if raw.is_null() => None,
        None => Some(raw),
    }
}

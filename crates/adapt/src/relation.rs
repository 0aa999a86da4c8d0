//! Embedded relation unwrapping.
//!
//! Relation fields (category, author, tags, media) arrive in several layouts
//! depending on which envelope generation produced the parent document.

use serde_json::Value as Json;

/// What an embedded relation field resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Related<'a> {
    /// A JSON object carrying the related entity (possibly itself enveloped).
    Entity(&'a Json),
    /// A bare string identifier, e.g. `"Nutrition"`.
    Name(&'a str),
    /// No usable relation; callers substitute a sentinel.
    Absent,
}

/// Resolve a relation field, trying in order: `{data: …}` wrapper, inline
/// object, bare string identifier, array-wrapped single item, absence.
pub fn resolve(field: Option<&Json>) -> Related<'_> {
    let Some(value) = field else {
        return Related::Absent;
    };

    if let Some(obj) = value.as_object() {
        if let Some(data) = obj.get("data") {
            return match data {
                Json::Null => Related::Absent,
                Json::Array(arr) => first_of(arr),
                other => Related::Entity(other),
            };
        }
        return Related::Entity(value);
    }

    if let Some(name) = value.as_str() {
        return Related::Name(name);
    }

    if let Some(arr) = value.as_array() {
        return first_of(arr);
    }

    Related::Absent
}

/// Relation lists: unwrap an optional `{data: […]}` envelope down to the
/// item slice. A single bare object is treated as a one-item list.
pub fn resolve_many(field: Option<&Json>) -> Vec<&Json> {
    let Some(value) = field else {
        return Vec::new();
    };

    let list = match value {
        Json::Array(arr) => Some(arr),
        Json::Object(obj) => match obj.get("data") {
            Some(Json::Array(arr)) => Some(arr),
            Some(Json::Null) | None => None,
            Some(_) => None,
        },
        _ => None,
    };

    match list {
        Some(arr) => arr.iter().collect(),
        None if value.is_object() && value.get("data").is_none() => vec![value],
        None => Vec::new(),
    }
}

fn first_of(arr: &[Json]) -> Related<'_> {
    match arr.first() {
        Some(Json::String(name)) => Related::Name(name),
        Some(item) if item.is_object() => Related::Entity(item),
        _ => Related::Absent,
    }
}

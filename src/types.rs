//! Person record model and the static relation-field table.

use serde::Serialize;
use serde_json::{Map, Value};

/// Bookkeeping fields returned by the API but never persisted.
pub const EXCLUDED_FIELDS: &[&str] = &["created", "edited", "url"];

/// Pairs a relation field on the person record with the attribute to
/// extract from each related resource.
#[derive(Debug, Clone, Copy)]
pub struct RelationField {
    /// Field on the person record holding a list of resource URLs.
    pub field: &'static str,
    /// Attribute read from each related resource.
    pub detail_field: &'static str,
}

/// Relation fields resolved during enrichment, in processing order.
pub const RELATION_FIELDS: &[RelationField] = &[
    RelationField {
        field: "films",
        detail_field: "title",
    },
    RelationField {
        field: "species",
        detail_field: "name",
    },
    RelationField {
        field: "starships",
        detail_field: "name",
    },
    RelationField {
        field: "vehicles",
        detail_field: "name",
    },
];

/// Columns persisted for each person, bound by name from the record.
pub const PERSON_COLUMNS: &[&str] = &[
    "name",
    "height",
    "mass",
    "hair_color",
    "skin_color",
    "eye_color",
    "birth_year",
    "gender",
    "homeworld",
    "films",
    "species",
    "starships",
    "vehicles",
];

/// An enriched person record.
///
/// Wraps the JSON object returned by the API minus the excluded
/// bookkeeping fields. Relation fields start as URL arrays and are
/// replaced in place with one joined string of display names before the
/// record reaches the persister.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct PersonRecord {
    fields: Map<String, Value>,
}

impl PersonRecord {
    /// Wrap a fetched JSON object, dropping the bookkeeping fields.
    pub fn from_json(mut fields: Map<String, Value>) -> Self {
        for field in EXCLUDED_FIELDS {
            fields.remove(*field);
        }
        Self { fields }
    }

    /// URL list of a relation field, if present and still unresolved.
    pub fn relation_urls(&self, field: &str) -> Option<Vec<String>> {
        self.fields.get(field)?.as_array().map(|urls| {
            urls.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
    }

    /// Replace a relation field's URL list with its joined display names.
    pub fn resolve_relation(&mut self, field: &str, joined: String) {
        self.fields.insert(field.to_string(), Value::String(joined));
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Text value of a field, for binding into a row by name.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Relation fields still holding an unresolved URL list.
    pub fn unresolved_relations(&self) -> Vec<&'static str> {
        RELATION_FIELDS
            .iter()
            .filter(|relation| {
                matches!(self.fields.get(relation.field), Some(Value::Array(_)))
            })
            .map(|relation| relation.field)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

//! Typed-value encoding used by the hosted document store.
//!
//! Every field travels wrapped in a single-key object naming its type, e.g.
//! `{"stringValue": "Dana"}`. Integers are carried as decimal strings.

use serde_json::{Map, Number, Value, json};
use shared::{
    RemoteFailure,
    services::{Direction, Document, Fields, Query},
};

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => json!({ "integerValue": integer.to_string() }),
            None => json!({ "doubleValue": number.as_f64() }),
        },
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(name, value)| (name.clone(), encode_value(value)))
            .collect(),
    )
}

/// Unwrap a typed value. Timestamps, references and bytes become strings.
///
/// # Errors
/// [`RemoteFailure::Decode`] for an unknown or malformed wrapper.
pub fn decode_value(value: &Value) -> Result<Value, RemoteFailure> {
    let Some((kind, inner)) = value.as_object().and_then(|map| map.iter().next()) else {
        return Err(RemoteFailure::decode("typed value is not an object"));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "doubleValue" | "stringValue" | "timestampValue" | "referenceValue"
        | "bytesValue" | "geoPointValue" => Ok(inner.clone()),
        "integerValue" => match inner {
            Value::String(text) => text
                .parse::<i64>()
                .map(|integer| Value::Number(Number::from(integer)))
                .map_err(|_| RemoteFailure::decode(format!("bad integer {text:?}"))),
            Value::Number(_) => Ok(inner.clone()),
            _ => Err(RemoteFailure::decode("integer value has the wrong type")),
        },
        "arrayValue" => inner
            .get("values")
            .and_then(Value::as_array)
            .map_or_else(|| Ok(Vec::new()), |values| values.iter().map(decode_value).collect())
            .map(Value::Array),
        "mapValue" => match inner.get("fields") {
            Some(fields) => decode_fields(fields).map(Value::Object),
            None => Ok(Value::Object(Map::new())),
        },
        other => Err(RemoteFailure::decode(format!("unknown value type {other}"))),
    }
}

/// # Errors
/// [`RemoteFailure::Decode`] when any field fails to decode.
pub fn decode_fields(fields: &Value) -> Result<Fields, RemoteFailure> {
    let Some(fields) = fields.as_object() else {
        return Err(RemoteFailure::decode("fields is not an object"));
    };
    fields
        .iter()
        .map(|(name, value)| decode_value(value).map(|decoded| (name.clone(), decoded)))
        .collect()
}

/// A wire document: the id is the last segment of its resource name.
///
/// # Errors
/// [`RemoteFailure::Decode`] without a name or with undecodable fields.
pub fn decode_document(document: &Value) -> Result<Document, RemoteFailure> {
    let id = document
        .get("name")
        .and_then(Value::as_str)
        .and_then(|name| name.rsplit('/').next())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| RemoteFailure::decode("document has no name"))?;
    let fields = match document.get("fields") {
        Some(fields) => decode_fields(fields)?,
        None => Fields::new(),
    };
    Ok(Document::new(id, fields))
}

/// Body of a `:runQuery` request against `collection`.
pub fn encode_query(collection: &str, query: &Query) -> Value {
    let mut structured = Map::new();
    structured.insert("from".into(), json!([{ "collectionId": collection }]));

    let filters: Vec<Value> = query
        .filters
        .iter()
        .map(|filter| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": filter.field },
                    "op": "EQUAL",
                    "value": encode_value(&filter.value),
                }
            })
        })
        .collect();
    match filters.len() {
        0 => {}
        1 => {
            structured.insert("where".into(), filters[0].clone());
        }
        _ => {
            structured.insert(
                "where".into(),
                json!({ "compositeFilter": { "op": "AND", "filters": filters } }),
            );
        }
    }

    if let Some(order) = &query.order_by {
        let direction = match order.direction {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        };
        structured.insert(
            "orderBy".into(),
            json!([{ "field": { "fieldPath": order.field }, "direction": direction }]),
        );
    }
    if let Some(limit) = query.limit {
        structured.insert("limit".into(), json!(limit));
    }

    json!({ "structuredQuery": structured })
}

/// Documents in a `:runQuery` response; rows without a document are skipped.
///
/// # Errors
/// [`RemoteFailure::Decode`] when the response is not a list or a document
/// fails to decode.
pub fn decode_query_response(response: &Value) -> Result<Vec<Document>, RemoteFailure> {
    let Some(rows) = response.as_array() else {
        return Err(RemoteFailure::decode("query response is not a list"));
    };
    rows.iter()
        .filter_map(|row| row.get("document"))
        .map(decode_document)
        .collect()
}

use crate::models::errors::RemoteFailure;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Field map of a stored document.
pub type Fields = Map<String, Value>;

/// A document as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decode the fields into `T`.
    ///
    /// # Errors
    /// Returns [`RemoteFailure::Decode`] when the fields do not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, RemoteFailure> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|err| RemoteFailure::decode(format!("document {}: {err}", self.id)))
    }

    /// Read a string field, treating anything else as absent.
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Encode a serializable value into a field map.
///
/// # Errors
/// Returns [`RemoteFailure::Decode`] when `value` is not a JSON object.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, RemoteFailure> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RemoteFailure::decode(format!(
            "expected an object, got {other}"
        ))),
        Err(err) => Err(RemoteFailure::decode(err.to_string())),
    }
}

/// Equality filter on a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    #[must_use]
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        document.fields.get(&self.field) == Some(&self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Filters, ordering and limit for [`DocumentStore::query_collection`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluate the query locally over `documents`.
    ///
    /// Ordering compares strings and numbers; missing fields sort first.
    #[must_use]
    pub fn apply(&self, documents: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut matched: Vec<Document> = documents
            .into_iter()
            .filter(|doc| self.filters.iter().all(|filter| filter.matches(doc)))
            .collect();
        if let Some(order) = &self.order_by {
            matched.sort_by(|a, b| {
                let ordering =
                    compare_values(a.fields.get(&order.field), b.fields.get(&order.field));
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Hosted document database.
///
/// Used for the `users`, `email_index`, `calendarEvents` and `activityLogs`
/// collections.
#[async_trait(?Send)]
pub trait DocumentStore {
    /// Fetch one document; `Ok(None)` when it does not exist.
    ///
    /// # Errors
    /// Returns a [`RemoteFailure`] when the store cannot be reached.
    async fn get_document(&self, collection: &str, id: &str)
    -> Result<Option<Document>, RemoteFailure>;

    /// Create or replace a document.
    ///
    /// # Errors
    /// Returns a [`RemoteFailure`] when the write fails.
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), RemoteFailure>;

    /// Merge `fields` into an existing document.
    ///
    /// # Errors
    /// Returns a [`RemoteFailure`] when the write fails or the document does
    /// not exist.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), RemoteFailure>;

    /// Create a document with a store-assigned id and return that id.
    ///
    /// # Errors
    /// Returns a [`RemoteFailure`] when the write fails.
    async fn add_document(&self, collection: &str, fields: Fields) -> Result<String, RemoteFailure>;

    /// # Errors
    /// Returns a [`RemoteFailure`] when the delete fails.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), RemoteFailure>;

    /// # Errors
    /// Returns a [`RemoteFailure`] when the query fails.
    async fn query_collection(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, RemoteFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, value: Value) -> Document {
        match value {
            Value::Object(fields) => Document::new(id, fields),
            _ => panic!("object expected"),
        }
    }

    #[test]
    fn query_filters_orders_and_limits() {
        let docs = vec![
            doc("a", json!({ "userId": "u1", "timestamp": "2025-01-02" })),
            doc("b", json!({ "userId": "u2", "timestamp": "2025-01-03" })),
            doc("c", json!({ "userId": "u1", "timestamp": "2025-01-05" })),
            doc("d", json!({ "userId": "u1" })),
        ];

        let query = Query::all()
            .filter(Filter::equals("userId", "u1"))
            .order_by("timestamp", Direction::Descending)
            .limit(2);
        let ids: Vec<String> = query.apply(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn decode_reports_document_id() {
        let document = doc("bad", json!({ "timestamp": 5 }));
        let err = document
            .decode::<crate::models::ActivityEntry>()
            .unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn to_fields_requires_an_object() {
        assert!(to_fields(&json!({ "a": 1 })).is_ok());
        assert!(to_fields(&"plain").is_err());
    }
}

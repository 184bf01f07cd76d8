// Catalog CRUD endpoints, generic over the resource kind
//
// The backend is inconsistent about envelopes: lists come back bare,
// under the resource's collection key, or under `items`/`data`; single
// entities come back bare or under the entity key. Everything is
// normalized here so callers only ever see `Listing<R>` and `R`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{EntityId, Resource};

/// Sort order sent as `ordem`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side list filter. Absent or blank fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub active: Option<bool>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

impl ListQuery {
    /// Query pairs in the backend's parameter names.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = non_blank(self.category.as_deref()) {
            pairs.push(("categoria", category.to_owned()));
        }
        if let Some(search) = non_blank(self.search.as_deref()) {
            pairs.push(("busca", search.to_owned()));
        }
        if let Some(active) = self.active {
            pairs.push(("ativo", active.to_string()));
        }
        if let Some(field) = non_blank(self.sort_field.as_deref()) {
            pairs.push(("ordenar", field.to_owned()));
        }
        if let Some(direction) = self.sort_direction {
            pairs.push(("ordem", direction.to_string()));
        }
        pairs
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A normalized list response.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Normalize any list shape into a [`Listing`].
///
/// The array is read from a bare body or from `collection_key`, `items`
/// or `data` inside an object (with optional `total`). A body that
/// carries no array at all (null, a bare message, a scalar) is an empty
/// listing. A missing `total` defaults to the item count. Only items
/// that fail to decode are an error.
pub fn normalize_listing<T: DeserializeOwned>(
    body: Value,
    collection_key: &str,
) -> Result<Listing<T>, Error> {
    let (raw_items, total) = match body {
        arr @ Value::Array(_) => (arr, None),
        Value::Object(mut map) => {
            let total = map.get("total").and_then(Value::as_u64);
            let items = [collection_key, "items", "data"]
                .iter()
                .find_map(|key| match map.remove(*key) {
                    Some(arr @ Value::Array(_)) => Some(arr),
                    _ => None,
                });
            match items {
                Some(items) => (items, total),
                None => {
                    warn_empty(collection_key, &Value::Object(map));
                    (Value::Array(Vec::new()), total)
                }
            }
        }
        Value::Null => (Value::Array(Vec::new()), None),
        other => {
            warn_empty(collection_key, &other);
            (Value::Array(Vec::new()), None)
        }
    };

    let items: Vec<T> = serde_json::from_value(raw_items.clone()).map_err(|e| Error::Deserialization {
        message: format!("invalid list item: {e}"),
        body: raw_items.to_string(),
    })?;
    let total = total.unwrap_or_else(|| u64::try_from(items.len()).unwrap_or(u64::MAX));
    Ok(Listing { items, total })
}

fn warn_empty(collection_key: &str, body: &Value) {
    let preview: String = body.to_string().chars().take(200).collect();
    warn!(
        collection = collection_key,
        body = %preview,
        "list response carries no array, treating as empty"
    );
}

/// Extract a single entity from a bare body or `{ <entity_key>: {...} }`.
///
/// Returns `None` when the body carries no entity at all (e.g. only a
/// `message`), which some mutation endpoints do.
pub fn unwrap_entity<T: DeserializeOwned>(body: Value, entity_key: &str) -> Result<Option<T>, Error> {
    let raw = match body {
        Value::Null => return Ok(None),
        Value::Object(mut map) => match map.remove(entity_key) {
            Some(inner @ Value::Object(_)) => inner,
            _ if map.contains_key("id") => Value::Object(map),
            _ => return Ok(None),
        },
        other => other,
    };
    serde_json::from_value(raw.clone())
        .map(Some)
        .map_err(|e| Error::Deserialization {
            message: format!("invalid entity: {e}"),
            body: raw.to_string(),
        })
}

impl ApiClient {
    /// `GET /api/<resource>` with the given filter.
    pub async fn list<R: Resource>(&self, query: &ListQuery) -> Result<Listing<R>, Error> {
        let body: Value = self.get_with_query(R::PATH, &query.to_pairs()).await?;
        normalize_listing(body, R::COLLECTION_KEY)
    }

    /// `GET /api/<resource>/:id`.
    pub async fn fetch<R: Resource>(&self, id: &EntityId) -> Result<R, Error> {
        let body: Value = self.get(&item_path::<R>(id)).await?;
        let preview = body.to_string();
        unwrap_entity(body, R::ENTITY_KEY)?.ok_or_else(|| Error::Deserialization {
            message: format!("{} response carries no entity", R::LABEL),
            body: preview,
        })
    }

    /// `POST /api/<resource>`. Returns the created entity when echoed back.
    pub async fn create<R: Resource>(&self, draft: &R::Draft) -> Result<Option<R>, Error> {
        let body: Value = self.post(R::PATH, draft).await?;
        unwrap_entity(body, R::ENTITY_KEY)
    }

    /// `PUT /api/<resource>/:id`. Returns the updated entity when echoed back.
    pub async fn update<R: Resource>(&self, id: &EntityId, patch: &R::Patch) -> Result<Option<R>, Error> {
        let body: Value = self.put(&item_path::<R>(id), patch).await?;
        unwrap_entity(body, R::ENTITY_KEY)
    }

    /// `DELETE /api/<resource>/:id`.
    pub async fn remove<R: Resource>(&self, id: &EntityId) -> Result<(), Error> {
        self.delete(&item_path::<R>(id)).await
    }
}

fn item_path<R: Resource>(id: &EntityId) -> String {
    format!("{}/{id}", R::PATH)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::Product;
    use serde_json::json;

    fn product(id: u64) -> Value {
        json!({"id": id, "nome": format!("P{id}"), "preco": 10})
    }

    #[test]
    fn query_omits_absent_and_blank_fields() {
        let query = ListQuery {
            category: Some("  ".into()),
            search: Some("mouse".into()),
            active: Some(false),
            sort_field: None,
            sort_direction: Some(SortDirection::Asc),
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("busca", "mouse".to_owned()),
                ("ativo", "false".to_owned()),
                ("ordem", "asc".to_owned()),
            ]
        );
        assert!(ListQuery::default().to_pairs().is_empty());
    }

    #[test]
    fn listing_accepts_every_envelope() {
        let bare: Listing<Product> = normalize_listing(json!([product(1), product(2)]), "produtos").unwrap();
        assert_eq!(bare.total, 2);

        let keyed: Listing<Product> =
            normalize_listing(json!({"produtos": [product(1)], "total": 40}), "produtos").unwrap();
        assert_eq!((keyed.items.len(), keyed.total), (1, 40));

        let items: Listing<Product> = normalize_listing(json!({"items": [product(1), product(2)]}), "produtos").unwrap();
        assert_eq!(items.total, 2);

        let empty: Listing<Product> = normalize_listing(Value::Null, "produtos").unwrap();
        assert_eq!((empty.items.len(), empty.total), (0, 0));
    }

    #[test]
    fn listing_without_array_is_empty() {
        let message: Listing<Product> =
            normalize_listing(json!({"message": "sem produtos"}), "produtos").unwrap();
        assert_eq!((message.items.len(), message.total), (0, 0));

        let counted: Listing<Product> = normalize_listing(json!({"total": 0}), "produtos").unwrap();
        assert!(counted.items.is_empty());

        let scalar: Listing<Product> = normalize_listing(json!("ok"), "produtos").unwrap();
        assert_eq!(scalar.total, 0);
    }

    #[test]
    fn listing_rejects_bad_items() {
        let err = normalize_listing::<Product>(json!({"produtos": [{"nome": 3}]}), "produtos").unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }

    #[test]
    fn entity_unwraps_wrapped_and_bare() {
        let wrapped: Option<Product> =
            unwrap_entity(json!({"message": "ok", "produto": product(5)}), "produto").unwrap();
        assert_eq!(wrapped.unwrap().id, EntityId::Number(5));

        let bare: Option<Product> = unwrap_entity(product(6), "produto").unwrap();
        assert_eq!(bare.unwrap().id, EntityId::Number(6));

        let none: Option<Product> = unwrap_entity(json!({"message": "Removido"}), "produto").unwrap();
        assert!(none.is_none());
    }
}

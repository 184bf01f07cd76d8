// ── Wire models ──
//
// Typed mirrors of the backend's JSON. Field names on the wire are the
// backend's (`nome`, `preco`, `ativo`, ...); Rust names are English.
// Prices serialize as JSON numbers and deserialize from numbers or strings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

// ── EntityId ────────────────────────────────────────────────────────

/// Backend-assigned identifier.
///
/// The reference backend uses integer primary keys, but string ids are
/// accepted so a different backend does not break deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(u64),
    Text(String),
}

impl EntityId {
    pub fn as_number(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        let trimmed = s.trim();
        trimmed
            .parse::<u64>()
            .map_or_else(|_| Self::Text(trimmed.to_owned()), Self::Number)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

// ── Resource contract ───────────────────────────────────────────────

/// A catalog entity kind exposed by the backend under `/api/<resource>`.
///
/// Ties the entity type to its URL path, the JSON keys the backend may
/// wrap it in, and the payload types used for create and update.
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Full body sent on create.
    type Draft: Serialize + Send + Sync;
    /// Partial body sent on update; absent fields are not serialized.
    type Patch: Serialize + Default + Send + Sync;

    /// Path relative to the base URL, e.g. `api/produtos`.
    const PATH: &'static str;
    /// Key holding the array in a wrapped list response, e.g. `produtos`.
    const COLLECTION_KEY: &'static str;
    /// Key holding the entity in a wrapped single response, e.g. `produto`.
    const ENTITY_KEY: &'static str;
    /// Human-readable singular name used in messages.
    const LABEL: &'static str;

    fn id(&self) -> &EntityId;

    /// The update body equivalent to `{ "ativo": active }`.
    fn toggle_patch(active: bool) -> Self::Patch;
}

// ── Products ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: EntityId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(
        rename = "preco",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub price: Decimal,
    #[serde(rename = "estoque", default)]
    pub stock: u32,
    #[serde(rename = "categoria", default)]
    pub category: String,
    #[serde(rename = "ativo", default = "default_true")]
    pub active: bool,
    #[serde(rename = "imagem_url", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(
        rename = "data_criacao",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for `POST /api/produtos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "preco", with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "estoque", default)]
    pub stock: u32,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "ativo", default = "default_true")]
    pub active: bool,
    #[serde(rename = "imagem_url", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Body for `PUT /api/produtos/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(rename = "nome", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        rename = "preco",
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    #[serde(rename = "estoque", default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(rename = "categoria", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "ativo", default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(rename = "imagem_url", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Resource for Product {
    type Draft = ProductDraft;
    type Patch = ProductPatch;

    const PATH: &'static str = "api/produtos";
    const COLLECTION_KEY: &'static str = "produtos";
    const ENTITY_KEY: &'static str = "produto";
    const LABEL: &'static str = "Product";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn toggle_patch(active: bool) -> ProductPatch {
        ProductPatch {
            active: Some(active),
            ..ProductPatch::default()
        }
    }
}

// ── Cars ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: EntityId,
    #[serde(rename = "marca", default)]
    pub brand: String,
    #[serde(rename = "modelo")]
    pub model: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "ano", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(
        rename = "preco",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub price: Decimal,
    #[serde(rename = "quilometragem", default)]
    pub mileage: u32,
    #[serde(rename = "categoria", default)]
    pub category: String,
    #[serde(rename = "ativo", default = "default_true")]
    pub active: bool,
    #[serde(rename = "imagem_url", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(
        rename = "data_criacao",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for `POST /api/carros`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarDraft {
    #[serde(rename = "marca")]
    pub brand: String,
    #[serde(rename = "modelo")]
    pub model: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "ano", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(rename = "preco", with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "quilometragem", default)]
    pub mileage: u32,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "ativo", default = "default_true")]
    pub active: bool,
    #[serde(rename = "imagem_url", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Body for `PUT /api/carros/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarPatch {
    #[serde(rename = "marca", default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(rename = "modelo", default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "ano", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(
        rename = "preco",
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    #[serde(rename = "quilometragem", default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
    #[serde(rename = "categoria", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "ativo", default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(rename = "imagem_url", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Resource for Car {
    type Draft = CarDraft;
    type Patch = CarPatch;

    const PATH: &'static str = "api/carros";
    const COLLECTION_KEY: &'static str = "carros";
    const ENTITY_KEY: &'static str = "carro";
    const LABEL: &'static str = "Car";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn toggle_patch(active: bool) -> CarPatch {
        CarPatch {
            active: Some(active),
            ..CarPatch::default()
        }
    }
}

// ── Users ───────────────────────────────────────────────────────────

/// The authenticated user's profile as returned by `/login` and `/api/perfil`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: EntityId,
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(
        rename = "data_criacao",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for `PUT /api/perfil`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(rename = "nome", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// ── Dashboard ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    #[serde(rename = "categoria", default)]
    pub category: String,
    #[serde(default)]
    pub total: u64,
}

/// Aggregate figures from `GET /api/dashboard/stats`. Missing fields are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(rename = "total_produtos", default)]
    pub total_products: u64,
    #[serde(rename = "produtos_ativos", default)]
    pub active_products: u64,
    #[serde(rename = "produtos_inativos", default)]
    pub inactive_products: u64,
    #[serde(
        rename = "valor_total_estoque",
        default,
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub stock_value: Decimal,
    #[serde(rename = "produtos_estoque_baixo", default)]
    pub low_stock_products: u64,
    #[serde(rename = "produtos_por_categoria", default)]
    pub products_by_category: Vec<CategoryCount>,
}

/// One entry of `GET /api/dashboard/atividades`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(rename = "descricao", alias = "mensagem", default)]
    pub description: String,
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(
        rename = "data",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub at: Option<DateTime<Utc>>,
}

// ── Helpers ─────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

/// Parse the timestamp shapes the backend emits: RFC 3339, Python's
/// `isoformat()` without offset (assumed UTC), or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}

/// Unparseable timestamps become `None` instead of failing the whole entity.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => parse_timestamp(&s),
        Some(serde_json::Value::Number(n)) => {
            n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0))
        }
        _ => None,
    })
}

// ── Store-level domain types ──
//
// Filter state, list results and notifications. Wire entities live in
// `vitrine-api` and are re-exported from the crate root.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::time::Instant;
use uuid::Uuid;
use vitrine_api::{ListQuery, SortDirection};

/// Field the default filter sorts on.
pub const DEFAULT_SORT_FIELD: &str = "data_criacao";

// ── Filter ──────────────────────────────────────────────────────────

/// The list contract held by an entity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub active: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_field: String,
    pub sort_direction: SortDirection,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            active: Some(true),
            min_price: None,
            max_price: None,
            sort_field: DEFAULT_SORT_FIELD.to_owned(),
            sort_direction: SortDirection::Desc,
        }
    }
}

impl Filter {
    /// Shallow merge: fields present in `patch` replace ours, the rest stay.
    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(search) = patch.search {
            self.search = search;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        if let Some(min_price) = patch.min_price {
            self.min_price = min_price;
        }
        if let Some(max_price) = patch.max_price {
            self.max_price = max_price;
        }
        if let Some(field) = patch.sort_field {
            self.sort_field = field;
        }
        if let Some(direction) = patch.sort_direction {
            self.sort_direction = direction;
        }
    }

    /// The server-side part of the filter. The price range is applied
    /// client-side and never sent.
    pub fn to_query(&self) -> ListQuery {
        ListQuery {
            category: self.category.clone(),
            search: self.search.clone(),
            active: self.active,
            sort_field: Some(self.sort_field.clone()),
            sort_direction: Some(self.sort_direction),
        }
    }

    pub fn has_price_range(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }
}

/// Partial filter update.
///
/// The outer `Option` says whether the field is being set at all; the
/// inner one (for nullable fields) allows clearing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub category: Option<Option<String>>,
    pub search: Option<Option<String>>,
    pub active: Option<Option<bool>>,
    pub min_price: Option<Option<Decimal>>,
    pub max_price: Option<Option<Decimal>>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

impl FilterPatch {
    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = Some(category);
        self
    }

    pub fn search(mut self, search: Option<String>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn active(mut self, active: Option<bool>) -> Self {
        self.active = Some(active);
        self
    }

    pub fn price_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_price = Some(min);
        self.max_price = Some(max);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_field = Some(field.into());
        self.sort_direction = Some(direction);
        self
    }

    pub fn preset(self, preset: SortPreset) -> Self {
        let (field, direction) = preset.field_and_direction();
        self.sort(field, direction)
    }
}

/// Named sort orders offered by the search helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SortPreset {
    PriceAsc,
    PriceDesc,
    NameAsc,
    Recent,
}

impl SortPreset {
    pub fn field_and_direction(self) -> (&'static str, SortDirection) {
        match self {
            Self::PriceAsc => ("preco", SortDirection::Asc),
            Self::PriceDesc => ("preco", SortDirection::Desc),
            Self::NameAsc => ("nome", SortDirection::Asc),
            Self::Recent => (DEFAULT_SORT_FIELD, SortDirection::Desc),
        }
    }
}

// ── Collection results ──────────────────────────────────────────────

/// Where a list result came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Live,
    /// Built-in dataset served while the backend is unreachable.
    Fallback,
}

/// A normalized list result; `total` is the filtered count.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub source: DataSource,
}

impl<T> Default for CollectionResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            source: DataSource::Live,
        }
    }
}

// ── Notifications ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

/// A transient message; expires `ttl` after it was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
    pub ttl: Duration,
    pub raised_at: Instant,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
            ttl,
            raised_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= self.ttl
    }
}

// ── Theme ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

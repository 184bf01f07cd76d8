// ── Catalog entity behaviour ──
//
// What the pipeline and stores need to know about an entity kind beyond
// its wire shape: which text is searchable, how to read price, category
// and status, and how each sortable field compares.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use strum::Display;
use vitrine_api::{Car, Product, Resource};

use crate::validation::Validate;

/// Category shown for entities without one.
pub const UNCATEGORIZED: &str = "Outros";

pub const PRODUCT_CATEGORIES: &[&str] = &[
    "Eletronicos",
    "Livros",
    "Escritorio",
    "Acessorios",
    "Cursos",
    UNCATEGORIZED,
];

pub const CAR_CATEGORIES: &[&str] = &["SUV", "Sedan", "Hatch", "Picape", "Esportivo", UNCATEGORIZED];

/// A typed value extracted from an entity for sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Decimal(Decimal),
    Integer(i64),
    Timestamp(DateTime<Utc>),
    /// Already folded for case- and accent-insensitive comparison.
    Text(String),
    /// The entity has no value for the field; sorts first ascending.
    Missing,
}

impl SortKey {
    pub fn text(value: &str) -> Self {
        Self::Text(fold(value))
    }

    pub fn timestamp(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Self::Missing, Self::Timestamp)
    }

    /// Total order within a variant; mismatched variants compare equal so
    /// a stable sort leaves them where they were.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Decimal(a), Self::Decimal(b)) => a.cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Missing, _) => Ordering::Less,
            (_, Self::Missing) => Ordering::Greater,
            _ => Ordering::Equal,
        }
    }
}

/// An entity kind the filter/sort pipeline and entity stores can manage.
pub trait Catalogable: Resource<Draft: Validate, Patch: Validate> {
    /// Allowed `categoria` values.
    const CATEGORIES: &'static [&'static str];
    /// Wire names of the fields `sort_key` understands.
    const SORT_FIELDS: &'static [&'static str];

    /// Text the free-text search looks at.
    fn search_fields(&self) -> Vec<&str>;
    fn category(&self) -> &str;
    fn price(&self) -> Decimal;
    fn is_active(&self) -> bool;
    /// Human-readable one-line name.
    fn title(&self) -> String;
    /// Value for `field`, or `None` when the field is not sortable.
    fn sort_key(&self, field: &str) -> Option<SortKey>;
}

impl Catalogable for Product {
    const CATEGORIES: &'static [&'static str] = PRODUCT_CATEGORIES;
    const SORT_FIELDS: &'static [&'static str] = &["nome", "preco", "estoque", "categoria", "data_criacao"];

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str()]
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn price(&self) -> Decimal {
        self.price
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn title(&self) -> String {
        self.name.clone()
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        Some(match field {
            "nome" => SortKey::text(&self.name),
            "preco" => SortKey::Decimal(self.price),
            "estoque" => SortKey::Integer(i64::from(self.stock)),
            "categoria" => SortKey::text(&self.category),
            "data_criacao" => SortKey::timestamp(self.created_at),
            _ => return None,
        })
    }
}

impl Catalogable for Car {
    const CATEGORIES: &'static [&'static str] = CAR_CATEGORIES;
    const SORT_FIELDS: &'static [&'static str] = &[
        "nome",
        "marca",
        "modelo",
        "ano",
        "preco",
        "quilometragem",
        "categoria",
        "data_criacao",
    ];

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.brand.as_str(),
            self.model.as_str(),
            self.description.as_str(),
        ]
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn price(&self) -> Decimal {
        self.price
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn title(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_owned()
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        Some(match field {
            "nome" => SortKey::text(&self.title()),
            "marca" => SortKey::text(&self.brand),
            "modelo" => SortKey::text(&self.model),
            "ano" => self.year.map_or(SortKey::Missing, |y| SortKey::Integer(i64::from(y))),
            "preco" => SortKey::Decimal(self.price),
            "quilometragem" => SortKey::Integer(i64::from(self.mileage)),
            "categoria" => SortKey::text(&self.category),
            "data_criacao" => SortKey::timestamp(self.created_at),
            _ => return None,
        })
    }
}

// ── Stock levels ────────────────────────────────────────────────────

/// Stock status bands used by the dashboard and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum StockLevel {
    Critical,
    Low,
    Normal,
    High,
}

impl StockLevel {
    pub fn of(stock: u32) -> Self {
        match stock {
            0..=5 => Self::Critical,
            6..=10 => Self::Low,
            11..=20 => Self::Normal,
            _ => Self::High,
        }
    }
}

// ── Text folding ────────────────────────────────────────────────────

/// Lowercase and strip Latin diacritics so "Eletrônicos" == "eletronicos".
pub fn fold(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            'ý' | 'ÿ' => 'y',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_ignores_case_and_accents() {
        assert_eq!(fold("Eletrônicos"), "eletronicos");
        assert_eq!(fold("ÁGUA Ç"), "agua c");
    }

    #[test]
    fn missing_sorts_before_values() {
        assert_eq!(SortKey::Missing.compare(&SortKey::Integer(1)), Ordering::Less);
        assert_eq!(SortKey::Integer(2).compare(&SortKey::Missing), Ordering::Greater);
        assert_eq!(
            SortKey::text("Ábaco").compare(&SortKey::text("abacaxi")),
            Ordering::Greater
        );
    }

    #[test]
    fn stock_levels_follow_thresholds() {
        assert_eq!(StockLevel::of(0), StockLevel::Critical);
        assert_eq!(StockLevel::of(5), StockLevel::Critical);
        assert_eq!(StockLevel::of(10), StockLevel::Low);
        assert_eq!(StockLevel::of(20), StockLevel::Normal);
        assert_eq!(StockLevel::of(21), StockLevel::High);
    }

    #[test]
    fn every_sort_field_yields_a_key() {
        let car: Car = serde_json::from_value(serde_json::json!({
            "id": 1, "marca": "Fiat", "modelo": "Uno", "preco": 1000
        }))
        .unwrap_or_else(|e| panic!("fixture must parse: {e}"));
        for field in Car::SORT_FIELDS {
            assert!(car.sort_key(field).is_some(), "{field}");
        }
        assert!(car.sort_key("cor").is_none());
        assert_eq!(car.title(), "Fiat Uno");
    }
}

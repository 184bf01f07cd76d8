// ── Filter/sort pipeline ──
//
// Pure functions over entity slices: text → category → active → price
// range → sort. Every stage passes its input through unchanged when its
// criterion is absent.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use vitrine_api::SortDirection;

use crate::catalog::{Catalogable, fold};
use crate::model::Filter;

/// Case- and accent-insensitive substring matcher over searchable fields.
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Returns `None` for blank queries.
    pub fn new(query: &str) -> Option<Self> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            needle: fold(trimmed),
        })
    }

    pub fn matches<E: Catalogable>(&self, entity: &E) -> bool {
        entity
            .search_fields()
            .iter()
            .any(|field| fold(field).contains(&self.needle))
    }
}

/// Run the whole pipeline for `filter`.
pub fn apply<E: Catalogable>(items: &[E], filter: &Filter) -> Vec<E> {
    let categories: BTreeSet<String> = filter
        .category
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect();

    let matched = by_text(items.to_vec(), filter.search.as_deref());
    let matched = by_category(matched, &categories);
    let matched = by_active(matched, filter.active);
    let matched = by_price_range(matched, filter.min_price, filter.max_price);
    sort_by_field(matched, &filter.sort_field, filter.sort_direction)
}

pub fn by_text<E: Catalogable>(items: Vec<E>, query: Option<&str>) -> Vec<E> {
    match query.and_then(TextMatcher::new) {
        Some(matcher) => items.into_iter().filter(|e| matcher.matches(e)).collect(),
        None => items,
    }
}

/// Keep entities whose category is in `categories`; an empty set keeps all.
pub fn by_category<E: Catalogable>(items: Vec<E>, categories: &BTreeSet<String>) -> Vec<E> {
    if categories.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|e| categories.contains(e.category()))
        .collect()
}

pub fn by_active<E: Catalogable>(items: Vec<E>, active: Option<bool>) -> Vec<E> {
    match active {
        Some(wanted) => items.into_iter().filter(|e| e.is_active() == wanted).collect(),
        None => items,
    }
}

/// Inclusive `[min, max]` on price; either bound may be absent.
pub fn by_price_range<E: Catalogable>(
    items: Vec<E>,
    min: Option<Decimal>,
    max: Option<Decimal>,
) -> Vec<E> {
    if min.is_none() && max.is_none() {
        return items;
    }
    items
        .into_iter()
        .filter(|e| {
            let price = e.price();
            min.is_none_or(|lo| price >= lo) && max.is_none_or(|hi| price <= hi)
        })
        .collect()
}

/// Stable sort on `field`. Unknown fields leave the order untouched.
pub fn sort_by_field<E: Catalogable>(
    mut items: Vec<E>,
    field: &str,
    direction: SortDirection,
) -> Vec<E> {
    if !E::SORT_FIELDS.contains(&field) {
        return items;
    }
    items.sort_by(|a, b| {
        let (Some(ka), Some(kb)) = (a.sort_key(field), b.sort_key(field)) else {
            return std::cmp::Ordering::Equal;
        };
        let ord = ka.compare(&kb);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    items
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::FilterPatch;
    use serde_json::json;
    use vitrine_api::{EntityId, Product};

    fn product(id: u64, name: &str, price: i64, category: &str, active: bool) -> Product {
        serde_json::from_value(json!({
            "id": id,
            "nome": name,
            "descricao": format!("{name} description"),
            "preco": price,
            "estoque": 1,
            "categoria": category,
            "ativo": active,
            "data_criacao": format!("2024-01-{:02}T00:00:00", id)
        }))
        .unwrap()
    }

    fn fixtures() -> Vec<Product> {
        vec![
            product(1, "Notebook", 3500, "Eletronicos", true),
            product(2, "Livro de Rust", 120, "Livros", true),
            product(3, "Mouse", 80, "Acessorios", false),
            product(4, "Curso Vue", 120, "Cursos", true),
        ]
    }

    fn ids(items: &[Product]) -> Vec<u64> {
        items.iter().filter_map(|p| p.id.as_number()).collect()
    }

    #[test]
    fn unset_category_returns_every_category() {
        let filter = Filter {
            active: None,
            ..Filter::default()
        };
        assert_eq!(apply(&fixtures(), &filter).len(), 4);
    }

    #[test]
    fn text_match_is_case_and_accent_insensitive() {
        let mut items = fixtures();
        items.push(product(5, "Fone Eletrônico", 200, "Eletronicos", true));
        assert_eq!(ids(&by_text(items.clone(), Some("RUST"))), vec![2]);
        assert_eq!(ids(&by_text(items.clone(), Some("eletronico"))), vec![5]);
        assert_eq!(by_text(items, Some("   ")).len(), 5);
    }

    #[test]
    fn category_set_filters_membership() {
        let set: BTreeSet<String> = ["Livros".to_owned(), "Cursos".to_owned()].into();
        assert_eq!(ids(&by_category(fixtures(), &set)), vec![2, 4]);
    }

    #[test]
    fn price_range_is_inclusive() {
        let kept = by_price_range(fixtures(), Some(Decimal::from(80)), Some(Decimal::from(120)));
        assert_eq!(ids(&kept), vec![2, 3, 4]);
        let open = by_price_range(fixtures(), Some(Decimal::from(121)), None);
        assert_eq!(ids(&open), vec![1]);
    }

    #[test]
    fn price_sort_orders_both_ways_and_is_stable() {
        let asc = sort_by_field(fixtures(), "preco", SortDirection::Asc);
        assert_eq!(ids(&asc), vec![3, 2, 4, 1]);

        let desc = sort_by_field(fixtures(), "preco", SortDirection::Desc);
        assert_eq!(ids(&desc), vec![1, 2, 4, 3]);
    }

    #[test]
    fn unknown_sort_field_keeps_input_order() {
        let items = fixtures();
        let sorted = sort_by_field(items.clone(), "cor", SortDirection::Asc);
        assert_eq!(sorted, items);
    }

    #[test]
    fn full_pipeline_applies_every_stage() {
        let mut filter = Filter::default();
        filter.merge(
            FilterPatch::default()
                .search(Some("o".into()))
                .price_range(None, Some(Decimal::from(1000)))
                .sort("nome", SortDirection::Asc),
        );
        let result = apply(&fixtures(), &filter);
        assert_eq!(ids(&result), vec![4, 2]);
        assert!(result.iter().all(|p| p.active));
        assert_eq!(result[0].id, EntityId::Number(4));
    }
}

// Built-in catalog served in degraded mode when the backend is unreachable.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use vitrine_api::{Car, EntityId, Product};

fn day(month: u32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2024, month, day, 12, 0, 0).single()
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: u64,
    name: &str,
    description: &str,
    cents: i64,
    stock: u32,
    category: &str,
    active: bool,
    created: (u32, u32),
) -> Product {
    Product {
        id: EntityId::Number(id),
        name: name.to_owned(),
        description: description.to_owned(),
        price: Decimal::new(cents, 2),
        stock,
        category: category.to_owned(),
        active,
        image_url: None,
        created_at: day(created.0, created.1),
    }
}

pub fn sample_products() -> Vec<Product> {
    vec![
        product(1, "Notebook Pro 14", "Notebook com 16GB de RAM e SSD de 512GB", 549_900, 8, "Eletronicos", true, (1, 10)),
        product(2, "Fone Bluetooth", "Fone sem fio com cancelamento de ruído", 29_990, 25, "Eletronicos", true, (2, 3)),
        product(3, "Programando em Rust", "Livro introdutório à linguagem Rust", 12_900, 14, "Livros", true, (2, 18)),
        product(4, "Cadeira Ergonômica", "Cadeira com apoio lombar ajustável", 89_900, 4, "Escritorio", true, (3, 7)),
        product(5, "Mouse sem fio", "Mouse óptico 1600 DPI", 7_990, 40, "Acessorios", true, (3, 22)),
        product(6, "Curso de Vue.js", "Curso online com certificado", 19_900, 999, "Cursos", false, (4, 2)),
        product(7, "Caneca Térmica", "Mantém a bebida quente por 6 horas", 4_990, 3, "Outros", true, (4, 15)),
    ]
}

#[allow(clippy::too_many_arguments)]
fn car(
    id: u64,
    brand: &str,
    model: &str,
    year: u16,
    cents: i64,
    mileage: u32,
    category: &str,
    active: bool,
    created: (u32, u32),
) -> Car {
    Car {
        id: EntityId::Number(id),
        brand: brand.to_owned(),
        model: model.to_owned(),
        description: String::new(),
        year: Some(year),
        price: Decimal::new(cents, 2),
        mileage,
        category: category.to_owned(),
        active,
        image_url: None,
        created_at: day(created.0, created.1),
    }
}

pub fn sample_cars() -> Vec<Car> {
    vec![
        car(1, "Jeep", "Compass", 2022, 15_990_000, 32_000, "SUV", true, (1, 5)),
        car(2, "Toyota", "Corolla", 2021, 12_450_000, 41_500, "Sedan", true, (1, 28)),
        car(3, "Volkswagen", "Gol", 2018, 4_290_000, 88_000, "Hatch", true, (2, 14)),
        car(4, "Fiat", "Toro", 2023, 13_900_000, 12_000, "Picape", true, (3, 9)),
        car(5, "Chevrolet", "Camaro", 2019, 32_000_000, 25_000, "Esportivo", false, (4, 1)),
    ]
}

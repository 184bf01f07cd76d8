// ── Form validation ──
//
// Checked before any network call. Each rule failure is recorded per
// field; the first failure for a field wins.

use std::collections::BTreeMap;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use url::Url;
use vitrine_api::{CarDraft, CarPatch, ProductDraft, ProductPatch, ProfilePatch};

use crate::catalog::{CAR_CATEGORIES, PRODUCT_CATEGORIES};
use crate::error::CoreError;

pub const NAME_MIN_LEN: usize = 3;
pub const DESCRIPTION_MAX_LEN: usize = 500;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PRICE_MAX: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);
pub const QUANTITY_MAX: u32 = 999_999;
const FIRST_CAR_YEAR: u16 = 1886;

/// A payload that can be checked locally before it is sent.
pub trait Validate {
    fn validate(&self) -> Result<(), CoreError>;
}

/// Per-field error accumulator.
#[derive(Debug, Default)]
struct Rules {
    errors: BTreeMap<String, String>,
}

impl Rules {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_owned())
            .or_insert_with(|| message.into());
    }

    fn min_len(&mut self, field: &str, label: &str, value: &str, min: usize) {
        let len = value.trim().chars().count();
        if len == 0 {
            self.fail(field, format!("{label} is required"));
        } else if len < min {
            self.fail(field, format!("{label} must have at least {min} characters"));
        }
    }

    fn max_len(&mut self, field: &str, label: &str, value: &str, max: usize) {
        if value.trim().chars().count() > max {
            self.fail(field, format!("{label} must have at most {max} characters"));
        }
    }

    fn price(&mut self, value: Decimal) {
        if value.is_sign_negative() || value > PRICE_MAX {
            self.fail("preco", "Invalid price");
        }
    }

    fn quantity(&mut self, field: &str, label: &str, value: u32) {
        if value > QUANTITY_MAX {
            self.fail(field, format!("{label} must be a whole number between 0 and {QUANTITY_MAX}"));
        }
    }

    fn category(&mut self, value: &str, allowed: &[&str]) {
        if !allowed.contains(&value) {
            self.fail("categoria", "Invalid category");
        }
    }

    fn image_url(&mut self, value: Option<&str>) {
        if let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) {
            if Url::parse(raw).is_err() {
                self.fail("imagem_url", "Invalid image URL");
            }
        }
    }

    fn email(&mut self, value: &str) {
        if value.trim().is_empty() {
            self.fail("email", "Email is required");
        } else if !is_valid_email(value) {
            self.fail("email", "Invalid email");
        }
    }

    fn year(&mut self, value: u16) {
        let latest = u16::try_from(Utc::now().year() + 1).unwrap_or(u16::MAX);
        if !(FIRST_CAR_YEAR..=latest).contains(&value) {
            self.fail("ano", "Invalid year");
        }
    }

    fn finish(self) -> Result<(), CoreError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::invalid(self.errors))
        }
    }
}

/// `local@domain.tld` with no whitespace, one `@`, and a dot in the domain.
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .rsplit_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

// ── Catalog payloads ────────────────────────────────────────────────

impl Validate for ProductDraft {
    fn validate(&self) -> Result<(), CoreError> {
        let mut rules = Rules::default();
        rules.min_len("nome", "Name", &self.name, NAME_MIN_LEN);
        rules.max_len("descricao", "Description", &self.description, DESCRIPTION_MAX_LEN);
        rules.price(self.price);
        rules.quantity("estoque", "Stock", self.stock);
        rules.category(&self.category, PRODUCT_CATEGORIES);
        rules.image_url(self.image_url.as_deref());
        rules.finish()
    }
}

impl Validate for ProductPatch {
    fn validate(&self) -> Result<(), CoreError> {
        let mut rules = Rules::default();
        if let Some(name) = &self.name {
            rules.min_len("nome", "Name", name, NAME_MIN_LEN);
        }
        if let Some(description) = &self.description {
            rules.max_len("descricao", "Description", description, DESCRIPTION_MAX_LEN);
        }
        if let Some(price) = self.price {
            rules.price(price);
        }
        if let Some(stock) = self.stock {
            rules.quantity("estoque", "Stock", stock);
        }
        if let Some(category) = &self.category {
            rules.category(category, PRODUCT_CATEGORIES);
        }
        rules.image_url(self.image_url.as_deref());
        rules.finish()
    }
}

impl Validate for CarDraft {
    fn validate(&self) -> Result<(), CoreError> {
        let mut rules = Rules::default();
        rules.min_len("marca", "Brand", &self.brand, 1);
        rules.min_len("modelo", "Model", &self.model, 1);
        rules.max_len("descricao", "Description", &self.description, DESCRIPTION_MAX_LEN);
        if let Some(year) = self.year {
            rules.year(year);
        }
        rules.price(self.price);
        rules.quantity("quilometragem", "Mileage", self.mileage);
        rules.category(&self.category, CAR_CATEGORIES);
        rules.image_url(self.image_url.as_deref());
        rules.finish()
    }
}

impl Validate for CarPatch {
    fn validate(&self) -> Result<(), CoreError> {
        let mut rules = Rules::default();
        if let Some(brand) = &self.brand {
            rules.min_len("marca", "Brand", brand, 1);
        }
        if let Some(model) = &self.model {
            rules.min_len("modelo", "Model", model, 1);
        }
        if let Some(description) = &self.description {
            rules.max_len("descricao", "Description", description, DESCRIPTION_MAX_LEN);
        }
        if let Some(year) = self.year {
            rules.year(year);
        }
        if let Some(price) = self.price {
            rules.price(price);
        }
        if let Some(mileage) = self.mileage {
            rules.quantity("quilometragem", "Mileage", mileage);
        }
        if let Some(category) = &self.category {
            rules.category(category, CAR_CATEGORIES);
        }
        rules.image_url(self.image_url.as_deref());
        rules.finish()
    }
}

impl Validate for ProfilePatch {
    fn validate(&self) -> Result<(), CoreError> {
        let mut rules = Rules::default();
        if let Some(name) = &self.name {
            rules.min_len("nome", "Name", name, NAME_MIN_LEN);
        }
        if let Some(email) = &self.email {
            rules.email(email);
        }
        rules.finish()
    }
}

// ── Account forms ───────────────────────────────────────────────────

pub fn validate_login(email: &str, password: &SecretString) -> Result<(), CoreError> {
    let mut rules = Rules::default();
    rules.email(email);
    if password.expose_secret().trim().is_empty() {
        rules.fail("senha", "Password is required");
    }
    rules.finish()
}

pub fn validate_registration(
    name: &str,
    email: &str,
    password: &SecretString,
) -> Result<(), CoreError> {
    let mut rules = Rules::default();
    rules.min_len("nome", "Name", name, NAME_MIN_LEN);
    rules.email(email);
    let password = password.expose_secret();
    if password.is_empty() {
        rules.fail("senha", "Password is required");
    } else if password.chars().count() < PASSWORD_MIN_LEN {
        rules.fail(
            "senha",
            format!("Password must have at least {PASSWORD_MIN_LEN} characters"),
        );
    }
    rules.finish()
}

// Dashboard endpoints: aggregate stats, recent activity, category names.

use serde_json::Value;

use crate::catalog::normalize_listing;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Activity, DashboardStats};

impl ApiClient {
    /// `GET /api/dashboard/stats`.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, Error> {
        let body: Value = self.get("api/dashboard/stats").await?;
        let body = match body {
            Value::Null => return Ok(DashboardStats::default()),
            Value::Object(mut map) => match map.remove("stats") {
                Some(inner @ Value::Object(_)) => inner,
                _ => Value::Object(map),
            },
            other => other,
        };
        serde_json::from_value(body.clone()).map_err(|e| Error::Deserialization {
            message: format!("invalid dashboard stats: {e}"),
            body: body.to_string(),
        })
    }

    /// `GET /api/dashboard/atividades`, newest first as the backend sends them.
    pub async fn dashboard_activities(&self) -> Result<Vec<Activity>, Error> {
        let body: Value = self.get("api/dashboard/atividades").await?;
        Ok(normalize_listing(body, "atividades")?.items)
    }

    /// `GET /api/categorias`. Entries may be plain names or objects
    /// carrying `nome` / `categoria`.
    pub async fn categories(&self) -> Result<Vec<String>, Error> {
        let body: Value = self.get("api/categorias").await?;
        let listing = normalize_listing::<Value>(body, "categorias")?;
        Ok(listing.items.iter().filter_map(category_name).collect())
    }
}

fn category_name(entry: &Value) -> Option<String> {
    match entry {
        Value::String(name) => Some(name.clone()),
        Value::Object(map) => ["nome", "categoria", "name"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_owned),
        _ => None,
    }
    .filter(|name| !name.trim().is_empty())
}

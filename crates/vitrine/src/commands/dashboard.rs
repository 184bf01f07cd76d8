//! Dashboard and category handlers.

use std::fmt::Write as _;

use serde::Serialize;
use tabled::Tabled;
use vitrine_core::{Activity, DashboardStats};

use crate::error::CliError;
use crate::output;

use super::Context;

#[derive(Serialize)]
struct Overview<'a> {
    stats: &'a DashboardStats,
    recent_activity: &'a [Activity],
}

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "When")]
    at: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Activity")]
    description: String,
}

impl From<&Activity> for ActivityRow {
    fn from(a: &Activity) -> Self {
        Self {
            at: a
                .at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            kind: a.kind.clone().unwrap_or_default(),
            description: a.description.clone(),
        }
    }
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Products")]
    total: u64,
}

fn detail(overview: &Overview<'_>) -> String {
    let s = overview.stats;
    let mut out = String::new();
    let _ = writeln!(out, "Products:        {}", s.total_products);
    let _ = writeln!(out, "  active:        {}", s.active_products);
    let _ = writeln!(out, "  inactive:      {}", s.inactive_products);
    let _ = writeln!(out, "  low stock:     {}", s.low_stock_products);
    let _ = writeln!(out, "Stock value:     R$ {:.2}", s.stock_value.round_dp(2));

    if !s.products_by_category.is_empty() {
        let rows: Vec<CategoryRow> = s
            .products_by_category
            .iter()
            .map(|c| CategoryRow {
                category: c.category.clone(),
                total: c.total,
            })
            .collect();
        let _ = write!(out, "\n{}\n", output::render_table(&rows));
    }

    if overview.recent_activity.is_empty() {
        out.push_str("\nNo recent activity");
    } else {
        let rows: Vec<ActivityRow> = overview.recent_activity.iter().map(ActivityRow::from).collect();
        let _ = write!(out, "\nRecent activity\n{}", output::render_table(&rows));
    }
    out.trim_end().to_owned()
}

pub async fn overview(ctx: &Context) -> Result<(), CliError> {
    let dashboard = &ctx.session.dashboard;
    tokio::try_join!(dashboard.load_stats(), dashboard.load_activities())?;

    let stats = dashboard.stats();
    let activities = dashboard.activities();
    let overview = Overview {
        stats: &stats,
        recent_activity: &activities,
    };
    let out = output::render_single(ctx.output, &overview, detail, |o| {
        o.stats.total_products.to_string()
    })?;
    ctx.print(&out);
    Ok(())
}

#[derive(Tabled)]
struct NameRow {
    #[tabled(rename = "Category")]
    name: String,
}

pub async fn categories(ctx: &Context) -> Result<(), CliError> {
    let dashboard = &ctx.session.dashboard;
    dashboard.load_categories().await?;
    let names = dashboard.categories();
    let out = output::render_list(
        ctx.output,
        names.as_slice(),
        |n| NameRow { name: n.clone() },
        Clone::clone,
    )?;
    ctx.print(&out);
    Ok(())
}

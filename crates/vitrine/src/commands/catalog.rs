//! Product and car command handlers.
//!
//! Both catalogs share one command shape; `CatalogView` supplies the
//! per-kind table row and detail view.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tabled::Tabled;
use vitrine_core::service::{Draft, Patch};
use vitrine_core::{
    Car, Catalogable, DataSource, EntityId, EntityStore, FilterPatch, Product, Resource,
    ResourceService, StockLevel,
};

use crate::cli::{CatalogArgs, CatalogCommand, ListArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::Context;
use super::util;

// ── Per-kind presentation ───────────────────────────────────────────

pub trait CatalogView: Catalogable {
    type Row: Tabled;
    /// Subcommand path that lists this kind, for error hints.
    const LIST_COMMAND: &'static str;

    fn row(&self) -> Self::Row;
    fn detail(&self) -> String;
}

fn money(value: Decimal) -> String {
    format!("R$ {:.2}", value.round_dp(2))
}

fn status(active: bool) -> &'static str {
    if active { "active" } else { "inactive" }
}

#[derive(Tabled)]
pub struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Stock")]
    stock: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

impl CatalogView for Product {
    type Row = ProductRow;
    const LIST_COMMAND: &'static str = "products list";

    fn row(&self) -> ProductRow {
        ProductRow {
            id: self.id.to_string(),
            name: self.name.clone(),
            category: self.category.clone(),
            price: money(self.price),
            stock: format!("{} ({})", self.stock, StockLevel::of(self.stock)),
            status: status(self.active),
        }
    }

    fn detail(&self) -> String {
        let mut lines = vec![
            format!("ID:          {}", self.id),
            format!("Name:        {}", self.name),
            format!("Category:    {}", self.category),
            format!("Price:       {}", money(self.price)),
            format!("Stock:       {} ({})", self.stock, StockLevel::of(self.stock)),
            format!("Status:      {}", status(self.active)),
        ];
        if !self.description.is_empty() {
            lines.push(format!("Description: {}", self.description));
        }
        if let Some(ref url) = self.image_url {
            lines.push(format!("Image:       {url}"));
        }
        if let Some(created) = self.created_at {
            lines.push(format!("Created:     {}", created.format("%Y-%m-%d %H:%M")));
        }
        lines.join("\n")
    }
}

#[derive(Tabled)]
pub struct CarRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Car")]
    title: String,
    #[tabled(rename = "Year")]
    year: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Mileage")]
    mileage: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

impl CatalogView for Car {
    type Row = CarRow;
    const LIST_COMMAND: &'static str = "cars list";

    fn row(&self) -> CarRow {
        CarRow {
            id: self.id.to_string(),
            title: self.title(),
            year: self.year.map(|y| y.to_string()).unwrap_or_default(),
            category: self.category.clone(),
            price: money(self.price),
            mileage: format!("{} km", self.mileage),
            status: status(self.active),
        }
    }

    fn detail(&self) -> String {
        let mut lines = vec![
            format!("ID:          {}", self.id),
            format!("Brand:       {}", self.brand),
            format!("Model:       {}", self.model),
            format!(
                "Year:        {}",
                self.year.map_or_else(|| "-".into(), |y| y.to_string())
            ),
            format!("Category:    {}", self.category),
            format!("Price:       {}", money(self.price)),
            format!("Mileage:     {} km", self.mileage),
            format!("Status:      {}", status(self.active)),
        ];
        if !self.description.is_empty() {
            lines.push(format!("Description: {}", self.description));
        }
        if let Some(created) = self.created_at {
            lines.push(format!("Created:     {}", created.format("%Y-%m-%d %H:%M")));
        }
        lines.join("\n")
    }
}

// ── Handler ─────────────────────────────────────────────────────────

fn filter_patch(list: ListArgs) -> FilterPatch {
    let patch = FilterPatch::default()
        .category(list.category)
        .search(list.search)
        .active(list.status.as_flag())
        .price_range(list.min_price, list.max_price);
    match (list.preset, list.sort) {
        (Some(preset), _) => patch.preset(preset.into()),
        (None, Some(field)) => patch.sort(field, list.order.into()),
        (None, None) => patch,
    }
}

fn print_entity<E: CatalogView>(ctx: &Context, entity: &E) -> Result<(), CliError> {
    let out = output::render_single(ctx.output, entity, E::detail, |e| e.id().to_string())?;
    ctx.print(&out);
    Ok(())
}

pub async fn handle<S>(
    store: &EntityStore<S>,
    args: CatalogArgs,
    ctx: &Context,
) -> Result<(), CliError>
where
    S: ResourceService,
    S::Entity: CatalogView,
    Draft<S>: DeserializeOwned,
    Patch<S>: DeserializeOwned,
{
    let hint = |err: vitrine_core::CoreError| {
        CliError::from(err).with_list_command(<S::Entity as CatalogView>::LIST_COMMAND)
    };

    match args.command {
        CatalogCommand::List(list) => {
            store.set_filter(filter_patch(list));
            store.load().await?;
            let snapshot = store.snapshot();
            let out = output::render_list(
                ctx.output,
                &snapshot.items,
                <S::Entity as CatalogView>::row,
                |e| e.id().to_string(),
            )?;
            ctx.print(&out);
            if ctx.output == OutputFormat::Table && !ctx.quiet {
                let note = match snapshot.source {
                    DataSource::Live => String::new(),
                    DataSource::Fallback => " (sample data)".into(),
                };
                eprintln!("{} of {} shown{note}", snapshot.items.len(), snapshot.total);
            }
            Ok(())
        }

        CatalogCommand::Get { id } => {
            let entity = store.fetch(&EntityId::from(id)).await.map_err(hint)?;
            print_entity(ctx, &entity)
        }

        CatalogCommand::Create(payload) => {
            let draft: Draft<S> = util::read_payload(&payload)?;
            if let Some(created) = store.create(&draft).await? {
                print_entity(ctx, &created)?;
            }
            Ok(())
        }

        CatalogCommand::Update { id, payload } => {
            let patch: Patch<S> = util::read_payload(&payload)?;
            if let Some(updated) = store
                .update(&EntityId::from(id), &patch)
                .await
                .map_err(hint)?
            {
                print_entity(ctx, &updated)?;
            }
            Ok(())
        }

        CatalogCommand::Delete { id } => {
            let label = <S::Entity as Resource>::LABEL;
            if !util::confirm(
                &format!("Delete {} {id}? This cannot be undone.", label.to_lowercase()),
                "delete",
                ctx.yes,
            )? {
                return Ok(());
            }
            store.delete(&EntityId::from(id)).await.map_err(hint)
        }

        CatalogCommand::Activate { id } => {
            store.set_active(&EntityId::from(id), true).await.map_err(hint)
        }

        CatalogCommand::Deactivate { id } => {
            store.set_active(&EntityId::from(id), false).await.map_err(hint)
        }
    }
}

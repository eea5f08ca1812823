//! List properties command.

use anyhow::{Result, bail};
use estately_business::{ListPropertiesCommand, ListingCategory, ListingsState, PropertySummary};
use estately_states::StateCtx;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::instrument;

use crate::context::flush_and_await;
use crate::output::Output;

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "★")]
    favourite: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Photos")]
    photos: usize,
}

impl ListRow {
    fn new(property: &PropertySummary, favourite: bool) -> Self {
        Self {
            favourite: if favourite { "★" } else { "" },
            id: property.id.clone(),
            name: truncate_str(&property.name, 28),
            location: truncate_str(property.display_location(), 28),
            price: property.display_price(),
            status: property.status_label().to_owned(),
            photos: property.photos.len(),
        }
    }
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    } else {
        s.to_owned()
    }
}

#[instrument(skip_all, name = "list", fields(search = %search, category = %category))]
pub async fn run_list(
    ctx: &mut StateCtx,
    search: &str,
    category: ListingCategory,
    favourites_only: bool,
) -> Result<()> {
    let out = Output::new();

    ctx.enqueue_command::<ListPropertiesCommand>();
    flush_and_await(ctx).await;

    let listings = ctx.state::<ListingsState>();
    if let Some(error) = listings.error() {
        bail!("{error}");
    }

    let mut visible = listings.visible(search, category);
    if favourites_only {
        visible.retain(|p| listings.is_favourite(&p.id));
    }
    if visible.is_empty() {
        if favourites_only {
            out.dim(format!("No favourite properties found in {category}."));
        } else {
            out.dim(format!("No properties found in {category}."));
        }
        return Ok(());
    }

    let rows: Vec<ListRow> = visible
        .iter()
        .map(|p| ListRow::new(p, listings.is_favourite(&p.id)))
        .collect();
    let mut table = Table::new(&rows);
    table.with(Style::rounded());

    out.header(category.label());
    out.print(table.to_string());
    out.count("Showing", rows.len());
    Ok(())
}

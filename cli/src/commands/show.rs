//! Show a single property.

use anyhow::{Result, bail};
use estately_business::{
    GetPropertyCommand, PropertyDetailsInput, PropertyDetailsState, PropertyRecord, Route,
};
use estately_states::StateCtx;
use tracing::instrument;

use crate::context::flush_and_await;
use crate::output::Output;

#[instrument(skip_all, name = "show", fields(property_id = %id))]
pub async fn run_show(ctx: &mut StateCtx, id: String) -> Result<()> {
    let out = Output::new();

    ctx.set(Route::PropertyDetails(id.clone()));
    ctx.set(PropertyDetailsInput { id: Some(id) });
    ctx.enqueue_command::<GetPropertyCommand>();
    flush_and_await(ctx).await;

    match ctx.state::<PropertyDetailsState>() {
        PropertyDetailsState::Loaded(record) => {
            print_record(&out, record);
            Ok(())
        }
        PropertyDetailsState::NotFound => bail!("Property not found"),
        PropertyDetailsState::Failed(message) => bail!("{message}"),
        PropertyDetailsState::Idle | PropertyDetailsState::Loading => {
            bail!("Property lookup did not complete")
        }
    }
}

fn print_record(out: &Output, record: &PropertyRecord) {
    out.newline();
    out.header(&record.name);
    out.divider(40);
    out.labeled_indent("Price", record.display_price(), 2);
    out.labeled_indent("Location", record.display_location(), 2);
    out.labeled_indent("Status", record.status_label(), 2);
    if let Some(marker) = record.marker() {
        out.labeled_indent("Map", format!("{:.5}, {:.5}", marker.lat, marker.lng), 2);
    }

    if !record.description.trim().is_empty() {
        out.newline();
        out.print(&record.description);
    }

    let details = &record.more_details;
    out.newline();
    if let Some(kind) = &details.property_type {
        out.labeled_indent("Type", kind.label(), 2);
    }
    out.labeled_indent("Bedrooms", details.bedrooms, 2);
    out.labeled_indent("Bathrooms", details.bathrooms, 2);
    out.labeled_indent("Kitchens", details.kitchens, 2);
    let amenities = details.amenities();
    if !amenities.is_empty() {
        out.labeled_indent("Amenities", amenities.join(", "), 2);
    }

    if !record.photos.is_empty() {
        out.newline();
        out.dim("Photos:");
        for url in &record.photos {
            out.print(format!("  {url}"));
        }
    }
}

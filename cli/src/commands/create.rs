//! Interactive property creation wizard.
//!
//! Each step renders the fields it owns, writes them into the form store and then
//! asks to move on. Leaving a step runs its validation; errors are printed and the
//! same step is shown again.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use estately_business::{
    DraftPatch, FormSession, GeoPosition, MoreDetails, PhotoFile, PropertyDraft, PropertyStatus,
    PropertyType, Route, SubmissionState, WizardError, WizardStep, format_price, remove_photo,
    select_photo, submit_property,
};
use estately_states::StateCtx;
use inquire::{Confirm, CustomType, MultiSelect, Select, Text};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::{info, instrument};

use crate::context::{flush_and_await, show_notifications};
use crate::output::Output;

const AMENITIES: [&str; 5] = ["Furnished", "Parking", "Pet Friendly", "Swimming Pool", "Gym"];

/// What the user picked at the bottom of a step.
enum Nav {
    Next,
    Back,
    Cancel,
}

/// How the wizard ended.
enum Outcome {
    Created,
    Cancelled,
}

#[instrument(skip_all, name = "create_property")]
pub async fn run_create(ctx: &mut StateCtx) -> Result<()> {
    let out = Output::new();
    ctx.set(Route::CreateProperty);
    ctx.reset_form();

    match wizard_loop(ctx, &out).await? {
        Outcome::Created => {
            show_notifications(ctx, &out);
        }
        Outcome::Cancelled => {
            ctx.reset_form();
            ctx.set(Route::Listings);
            out.dim("Property creation cancelled.");
        }
    }
    Ok(())
}

async fn wizard_loop(ctx: &mut StateCtx, out: &Output) -> Result<Outcome> {
    loop {
        let step = ctx.form().current_step;
        out.step(step.index() + 1, WizardStep::ALL.len(), step);

        let nav = match step {
            WizardStep::BasicInfo => basic_info(ctx)?,
            WizardStep::Photos => photos(ctx, out).await?,
            WizardStep::MapPosition => map_position(ctx, out)?,
            WizardStep::MoreDetails => more_details(ctx)?,
            WizardStep::Review => match review(ctx, out).await? {
                Some(outcome) => return Ok(outcome),
                None => continue,
            },
        };

        match nav {
            Nav::Next => {
                if let Err(e) = ctx.advance() {
                    report(out, &e);
                }
            }
            Nav::Back => {
                if let Err(e) = ctx.retreat() {
                    report(out, &e);
                }
            }
            Nav::Cancel => return Ok(Outcome::Cancelled),
        }
    }
}

fn report(out: &Output, error: &WizardError) {
    match error {
        WizardError::StepInvalid { errors, .. } => out.field_errors(errors),
        other => out.warning(other),
    }
}

fn navigate(first: bool) -> Result<Nav> {
    let mut options = vec!["Next"];
    if !first {
        options.push("Back");
    }
    options.push("Cancel");

    let choice = Select::new("Continue?", options)
        .prompt()
        .context("Failed to read navigation choice")?;
    Ok(match choice {
        "Next" => Nav::Next,
        "Back" => Nav::Back,
        _ => Nav::Cancel,
    })
}

fn text(label: &str, current: &str) -> Result<String> {
    Text::new(label)
        .with_initial_value(current)
        .prompt()
        .with_context(|| format!("Failed to read {}", label.trim_end_matches(':')))
}

fn basic_info(ctx: &mut StateCtx) -> Result<Nav> {
    let draft = ctx.form().draft.clone();

    let name = text("Name:", &draft.name)?;
    let description = text("Description:", &draft.description)?;
    let price = text("Price:", &draft.price)?;
    let location = text("Location:", &draft.location)?;

    let statuses = PropertyStatus::ALL;
    let current = draft
        .property_status
        .as_ref()
        .and_then(|s| statuses.iter().position(|known| known == s))
        .unwrap_or(0);
    let picked = Select::new("Status:", statuses.iter().map(PropertyStatus::label).collect())
        .with_starting_cursor(current)
        .raw_prompt()
        .context("Failed to read status")?;
    let status = statuses[picked.index].clone();

    ctx.update_form_data(
        DraftPatch::new()
            .name(name)
            .description(description)
            .price(price)
            .location(location)
            .property_status(status),
    );
    navigate(true)
}

async fn photos(ctx: &mut StateCtx, out: &Output) -> Result<Nav> {
    loop {
        ctx.sync_updates();
        let form = ctx.form();
        if form.draft.photos.is_empty() {
            out.dim("No photos yet.");
        } else {
            for (i, url) in form.draft.photos.iter().enumerate() {
                out.print(format!("  {}. {url}", i + 1));
            }
        }

        let mut options = vec!["Add photo"];
        if !form.draft.photos.is_empty() {
            options.push("Remove photo");
        }
        options.extend(["Next", "Back", "Cancel"]);

        let choice = Select::new("Photos:", options)
            .prompt()
            .context("Failed to read photo action")?;
        match choice {
            "Add photo" => add_photo(ctx, out).await?,
            "Remove photo" => {
                let index = CustomType::<usize>::new("Photo number to remove:")
                    .prompt()
                    .context("Failed to read photo number")?;
                match index.checked_sub(1).and_then(|i| remove_photo(ctx, i)) {
                    Some(url) => out.success(format!("Removed {url}")),
                    None => out.warning(format!("There is no photo {index}")),
                }
            }
            "Next" => return Ok(Nav::Next),
            "Back" => return Ok(Nav::Back),
            _ => return Ok(Nav::Cancel),
        }
    }
}

#[instrument(skip_all, name = "upload_photo")]
async fn add_photo(ctx: &mut StateCtx, out: &Output) -> Result<()> {
    let path = Text::new("Photo path:")
        .with_help_message("jpg, jpeg, png or webp, up to 10MB")
        .prompt()
        .context("Failed to read photo path")?;
    let path = PathBuf::from(path.trim());

    let file = match PhotoFile::from_path(&path) {
        Ok(file) => file,
        Err(e) => {
            out.error(format!("Cannot read {}: {e}", path.display()));
            return Ok(());
        }
    };
    let name = file.name.clone();

    if let Err(rejected) = select_photo(ctx, file) {
        out.error(rejected);
        return Ok(());
    }
    info!(file = %name, "uploading photo");
    out.upload_progress(&name, &ctx.form().upload);

    flush_and_await(ctx).await;
    out.upload_progress(&name, &ctx.form().upload);
    show_notifications(ctx, out);
    Ok(())
}

fn map_position(ctx: &mut StateCtx, out: &Output) -> Result<Nav> {
    let current = ctx.form().draft.position;
    loop {
        let lat = CustomType::<f64>::new("Latitude:")
            .with_default(current.lat)
            .with_help_message("-90 to 90, leave 0 to skip")
            .prompt()
            .context("Failed to read latitude")?;
        let lng = CustomType::<f64>::new("Longitude:")
            .with_default(current.lng)
            .with_help_message("-180 to 180, leave 0 to skip")
            .prompt()
            .context("Failed to read longitude")?;

        let position = GeoPosition::new(lat, lng);
        if position.is_in_range() {
            ctx.set_position(position);
            return navigate(false);
        }
        out.error("Coordinates are out of range");
    }
}

fn more_details(ctx: &mut StateCtx) -> Result<Nav> {
    let current = ctx.form().draft.more_details.clone();

    let types = PropertyType::ALL;
    let starting = current
        .property_type
        .as_ref()
        .and_then(|t| types.iter().position(|known| known == t))
        .unwrap_or(0);
    let picked = Select::new("Property type:", types.iter().map(PropertyType::label).collect())
        .with_starting_cursor(starting)
        .raw_prompt()
        .context("Failed to read property type")?;
    let property_type = Some(types[picked.index].clone());

    let count = |label: &str, value: u32| {
        CustomType::<u32>::new(label)
            .with_default(value)
            .prompt()
            .with_context(|| format!("Failed to read {}", label.trim_end_matches(':')))
    };
    let bedrooms = count("Bedrooms:", current.bedrooms)?;
    let bathrooms = count("Bathrooms:", current.bathrooms)?;
    let kitchens = count("Kitchens:", current.kitchens)?;

    let enabled = current.amenities();
    let defaults: Vec<usize> = AMENITIES
        .iter()
        .enumerate()
        .filter_map(|(i, a)| enabled.contains(a).then_some(i))
        .collect();
    let picked = MultiSelect::new("Amenities:", AMENITIES.to_vec())
        .with_default(&defaults)
        .prompt()
        .context("Failed to read amenities")?;

    ctx.set_more_details(MoreDetails {
        property_type,
        bedrooms,
        bathrooms,
        kitchens,
        is_furnished: picked.contains(&"Furnished"),
        is_parking: picked.contains(&"Parking"),
        is_pet_friendly: picked.contains(&"Pet Friendly"),
        is_swimming_pool: picked.contains(&"Swimming Pool"),
        is_gym: picked.contains(&"Gym"),
    });
    navigate(false)
}

#[derive(Tabled)]
struct ReviewRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn review_rows(draft: &PropertyDraft) -> Vec<ReviewRow> {
    let row = |field, value: String| ReviewRow { field, value };
    let details = &draft.more_details;
    let amenities = details.amenities();

    vec![
        row("Name", draft.name.clone()),
        row("Description", draft.description.clone()),
        row("Price", format_price(draft.parsed_price().ok())),
        row("Location", draft.location.clone()),
        row(
            "Status",
            draft
                .property_status
                .as_ref()
                .map_or("Unknown", PropertyStatus::label)
                .to_owned(),
        ),
        row("Photos", draft.photos.len().to_string()),
        row(
            "Map",
            if draft.position.is_unset() {
                "Not set".to_owned()
            } else {
                format!("{:.5}, {:.5}", draft.position.lat, draft.position.lng)
            },
        ),
        row(
            "Type",
            details
                .property_type
                .as_ref()
                .map_or("Not set", PropertyType::label)
                .to_owned(),
        ),
        row(
            "Rooms",
            format!(
                "{} bed / {} bath / {} kitchen",
                details.bedrooms, details.bathrooms, details.kitchens
            ),
        ),
        row(
            "Amenities",
            if amenities.is_empty() {
                "None".to_owned()
            } else {
                amenities.join(", ")
            },
        ),
    ]
}

/// `None` means the user went back to an earlier step.
async fn review(ctx: &mut StateCtx, out: &Output) -> Result<Option<Outcome>> {
    let mut table = Table::new(review_rows(&ctx.form().draft));
    table.with(Style::rounded());
    out.print(table.to_string());

    let choice = Select::new("Ready?", vec!["Submit", "Back", "Cancel"])
        .prompt()
        .context("Failed to read review choice")?;
    match choice {
        "Submit" => {}
        "Back" => {
            if let Err(e) = ctx.retreat() {
                report(out, &e);
            }
            return Ok(None);
        }
        _ => return Ok(Some(Outcome::Cancelled)),
    }

    loop {
        if let Err(e) = submit_property(ctx) {
            report(out, &e);
            if let WizardError::StepInvalid { step, .. } = e {
                drop(ctx.go_to(step));
            }
            return Ok(None);
        }
        flush_and_await(ctx).await;

        if ctx.state::<SubmissionState>() == &SubmissionState::Created {
            return Ok(Some(Outcome::Created));
        }
        show_notifications(ctx, out);

        let retry = Confirm::new("Try again?")
            .with_default(true)
            .prompt()
            .context("Failed to read retry choice")?;
        if !retry {
            return Ok(None);
        }
    }
}

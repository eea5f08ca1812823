//! Toggle a favourite property and remember it in the config file.

use anyhow::Result;
use estately_business::{ListingsState, toggle_favourite};
use estately_states::StateCtx;
use tracing::instrument;

use crate::config::Config;
use crate::output::Output;

#[instrument(skip_all, name = "favourite", fields(id = %id))]
pub fn run_favourite(ctx: &mut StateCtx, config: &mut Config, id: &str) -> Result<()> {
    let out = Output::new();
    let id = id.trim();

    let now = toggle_favourite(ctx, id);
    config.set_favourites(&ctx.state::<ListingsState>().favourites);
    config.save()?;

    if now {
        out.success(format!("Property {id} added to favourites"));
    } else {
        out.success(format!("Property {id} removed from favourites"));
    }
    Ok(())
}

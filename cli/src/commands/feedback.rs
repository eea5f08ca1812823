//! Feedback command: flags fill the form, prompts fill whatever is missing.

use anyhow::{Context as _, Result, bail};
use estately_business::{FeedbackInput, FeedbackState, Route, rating_label, submit_feedback};
use estately_states::StateCtx;
use inquire::{Select, Text};
use tracing::instrument;

use crate::context::{flush_and_await, show_notifications};
use crate::output::Output;

#[derive(Debug, Default)]
pub struct FeedbackArgs {
    pub name: Option<String>,
    pub email: Option<String>,
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

#[instrument(skip_all, name = "feedback")]
pub async fn run_feedback(ctx: &mut StateCtx, args: FeedbackArgs) -> Result<()> {
    let out = Output::new();
    ctx.set(Route::CreateFeedback);

    let input = prompt_missing(args)?;
    ctx.set(input);

    if let Err(invalid) = submit_feedback(ctx) {
        out.field_errors(&invalid.0);
        bail!("Feedback was not sent");
    }
    flush_and_await(ctx).await;
    show_notifications(ctx, &out);

    match ctx.state::<FeedbackState>() {
        FeedbackState::Submitted => Ok(()),
        FeedbackState::Failed(reason) => bail!("{reason}"),
        FeedbackState::Idle | FeedbackState::Submitting => {
            bail!("Feedback submission did not complete")
        }
    }
}

fn prompt_missing(args: FeedbackArgs) -> Result<FeedbackInput> {
    let name = match args.name {
        Some(name) => name,
        None => Text::new("Name:").prompt().context("Failed to read name")?,
    };
    let email = match args.email {
        Some(email) => email,
        None => Text::new("Email:").prompt().context("Failed to read email")?,
    };
    let rating = match args.rating {
        Some(rating) => rating,
        None => prompt_rating()?,
    };
    let comment = match args.comment {
        Some(comment) => comment,
        None => Text::new("Comment:")
            .with_help_message("Optional, press Enter to skip")
            .prompt_skippable()
            .context("Failed to read comment")?
            .unwrap_or_default(),
    };
    Ok(FeedbackInput {
        name,
        email,
        rating,
        comment,
    })
}

fn prompt_rating() -> Result<u8> {
    let options: Vec<String> = (1..=5)
        .rev()
        .filter_map(|r| rating_label(r).map(|label| format!("{r} - {label}")))
        .collect();
    let choice = Select::new("Rating:", options)
        .prompt()
        .context("Failed to read rating")?;
    choice
        .split(' ')
        .next()
        .and_then(|r| r.parse().ok())
        .context("Invalid rating choice")
}

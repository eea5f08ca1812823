//! `estately`: terminal front end for browsing and listing properties.

mod cli;
mod commands;
mod config;
mod context;
mod output;
mod timing;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser as _;
use estately_business::{ListingsState, build_state_ctx};

use crate::cli::{Cli, Commands};
use crate::commands::{
    FeedbackArgs, generate_completions, run_create, run_favourite, run_feedback, run_list,
    run_show, run_token,
};
use crate::config::Config;
use crate::output::Output;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    timing::init_tracing(cli.verbose, cli.timing);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Output::new().error(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    // Commands that never talk to the backend
    match command {
        Commands::Token { action } => return run_token(action),
        Commands::Completions { shell } => {
            generate_completions(shell)?;
            return Ok(());
        }
        _ => {}
    }

    let mut config = Config::load()?;
    let mut ctx = build_state_ctx(config.business_config()?);
    ctx.set(ListingsState::with_favourites(config.favourite_ids()));

    let result = match command {
        Commands::List {
            search,
            category,
            favourites,
        } => run_list(&mut ctx, &search, category, favourites).await,
        Commands::Favourite { id } => run_favourite(&mut ctx, &mut config, &id),
        Commands::Show { id } => run_show(&mut ctx, id).await,
        Commands::Create => run_create(&mut ctx).await,
        Commands::Feedback {
            name,
            email,
            rating,
            comment,
        } => {
            let args = FeedbackArgs {
                name,
                email,
                rating,
                comment,
            };
            run_feedback(&mut ctx, args).await
        }
        Commands::Token { .. } | Commands::Completions { .. } => Ok(()),
    };

    ctx.shutdown().await;
    result
}

//! Save or forget the `Authorization` token.

use anyhow::Result;

use crate::cli::TokenAction;
use crate::config::Config;
use crate::output::Output;

pub fn run_token(action: TokenAction) -> Result<()> {
    let out = Output::new();
    let mut config = Config::load()?;

    match action {
        TokenAction::Set { token } => {
            config.set_token(&token);
            config.save()?;
            out.success(format!("Token saved to {}", Config::config_path()?.display()));
        }
        TokenAction::Clear => {
            if config.token().is_none() {
                out.dim("No token saved.");
                return Ok(());
            }
            config.clear_token();
            config.save()?;
            out.success("Token cleared");
        }
    }
    Ok(())
}

//! Command implementations for the estately CLI.
//!
//! Each subcommand is implemented in its own module.

pub mod completions;
pub mod create;
pub mod favourite;
pub mod feedback;
pub mod list;
pub mod show;
pub mod token;

pub use completions::generate_completions;
pub use create::run_create;
pub use favourite::run_favourite;
pub use feedback::{FeedbackArgs, run_feedback};
pub use list::run_list;
pub use show::run_show;
pub use token::run_token;

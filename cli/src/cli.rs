use clap::{Parser, Subcommand};
use clap_complete::Shell;
use estately_business::ListingCategory;

#[derive(Parser)]
#[command(name = "estately")]
#[command(about = "Browse and list real estate properties", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show timing/latency information
    #[arg(long, global = true)]
    pub timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List properties
    List {
        /// Only show properties whose name, location or address contains this text
        #[arg(long, short = 's', default_value = "")]
        search: String,

        /// all, new-listings, price-reduced, open-houses, recently-sold
        #[arg(long, short = 'c', default_value = "all")]
        category: ListingCategory,

        /// Only show properties marked as favourite
        #[arg(long, short = 'f')]
        favourites: bool,
    },
    /// Show a single property
    Show {
        /// Property ID
        id: String,
    },
    /// Mark a property as favourite, or unmark it if it already is
    Favourite {
        /// Property ID
        id: String,
    },
    /// Create a property listing step by step
    Create,
    /// Send feedback about the service
    Feedback {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// 1 (poor) to 5 (excellent)
        #[arg(long, short = 'r')]
        rating: Option<u8>,

        #[arg(long)]
        comment: Option<String>,
    },
    /// Manage the saved authorization token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum TokenAction {
    /// Save a token sent as the `Authorization` header
    Set { token: String },
    /// Forget the saved token
    Clear,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_parses_category() {
        let cli = Cli::parse_from(["estately", "list", "--category", "open-houses", "-s", "austin"]);
        match cli.command {
            Commands::List {
                search,
                category,
                favourites,
            } => {
                assert_eq!(search, "austin");
                assert_eq!(category, ListingCategory::OpenHouses);
                assert!(!favourites);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn list_favourites_flag() {
        let cli = Cli::parse_from(["estately", "list", "-f"]);
        assert!(matches!(cli.command, Commands::List { favourites: true, .. }));

        let cli = Cli::parse_from(["estately", "favourite", "42"]);
        match cli.command {
            Commands::Favourite { id } => assert_eq!(id, "42"),
            _ => panic!("expected favourite"),
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(Cli::try_parse_from(["estately", "list", "--category", "auction"]).is_err());
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["estately", "show", "42", "-v"]);
        assert!(cli.verbose);
        assert!(!cli.timing);
    }
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use snippetbox_core::auth::OAuthProvider;

#[derive(Parser)]
#[command(name = "snippetbox")]
#[command(about = "Store, search and filter your code snippets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the signed-in session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// List snippets, optionally filtered
    #[command(alias = "ls")]
    List(ListArgs),
    /// Save a new snippet
    #[command(alias = "new")]
    Add(AddArgs),
    /// Edit an existing snippet
    Edit(EditArgs),
    /// Delete a snippet
    #[command(alias = "rm")]
    Delete {
        /// Snippet ID or unique ID prefix
        id: String,
    },
    /// Show the languages and categories present in your collection
    Facets {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in through an OAuth provider
    Login {
        /// Identity provider to sign in with
        #[arg(long, value_enum, default_value_t = ProviderArg::Google)]
        provider: ProviderArg,
    },
    /// Show the current session
    Status,
    /// Sign out and forget the stored session
    Logout,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ProviderArg {
    Google,
    Github,
}

impl From<ProviderArg> for OAuthProvider {
    fn from(value: ProviderArg) -> Self {
        match value {
            ProviderArg::Google => Self::Google,
            ProviderArg::Github => Self::Github,
        }
    }
}

#[derive(Args)]
pub struct ListArgs {
    /// Case-insensitive text to find in title, description or code
    #[arg(short, long)]
    pub search: Option<String>,
    /// Only show this language (e.g. python)
    #[arg(short, long)]
    pub language: Option<String>,
    /// Only show this category (e.g. "Data Structure")
    #[arg(short, long)]
    pub category: Option<String>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Snippet title
    #[arg(short, long)]
    pub title: String,
    /// Optional description
    #[arg(short, long)]
    pub description: Option<String>,
    /// Language identifier (e.g. rust, python, bash)
    #[arg(short, long)]
    pub language: String,
    /// Category label (e.g. Utility, "Data Structure")
    #[arg(short, long)]
    pub category: String,
    /// Snippet code; read from --file or stdin when omitted
    #[arg(long, conflicts_with = "file")]
    pub code: Option<String>,
    /// Read snippet code from a file
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Snippet ID or unique ID prefix
    pub id: String,
    /// New title
    #[arg(short, long)]
    pub title: Option<String>,
    /// New description
    #[arg(short, long, conflicts_with = "clear_description")]
    pub description: Option<String>,
    /// Remove the description
    #[arg(long)]
    pub clear_description: bool,
    /// New language identifier
    #[arg(short, long)]
    pub language: Option<String>,
    /// New category label
    #[arg(short, long)]
    pub category: Option<String>,
    /// New snippet code
    #[arg(long, conflicts_with = "file")]
    pub code: Option<String>,
    /// Read new snippet code from a file
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

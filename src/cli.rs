//! Command-line interface parsing for the top stories reader
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a validated [`StartupConfig`]: the initial category, the provider
//! credentials and where cached data and logs live.

use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

use crate::data::{default_categories, Category};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified category is not a valid section identifier
    #[error("Invalid category: '{0}'. Use lowercase letters, digits and '-' (e.g. world, technology)")]
    InvalidCategory(String),

    /// No API key was given on the command line or in the environment
    #[error("Missing API key: pass --api-key or set NYT_API_KEY")]
    MissingApiKey,
}

/// Top Stories - Browse a news provider's top stories by section
#[derive(Parser, Debug)]
#[command(name = "topstories")]
#[command(about = "Browse top news stories by section, with a 10 minute local cache")]
#[command(version)]
pub struct Cli {
    /// Section to open first (defaults to the first tab, "home")
    ///
    /// Examples:
    ///   topstories --category world
    ///   topstories --category technology
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Provider API key
    #[arg(long, env = "NYT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Provider host, e.g. a server-side proxy that injects the key
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Directory for cached stories and preferences
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// File receiving log output (defaults to topstories.log in the cache directory)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Category selected on launch
    pub initial_category: Category,
    /// Provider API key
    pub api_key: String,
    /// Provider host override
    pub base_url: Option<String>,
    /// Cache directory override
    pub cache_dir: Option<PathBuf>,
    /// Log file override
    pub log_file: Option<PathBuf>,
}

/// Parses a category string argument.
///
/// # Returns
/// * `Ok(Category)` if the string is a valid section identifier
/// * `Err(CliError::InvalidCategory)` otherwise
pub fn parse_category_arg(s: &str) -> Result<Category, CliError> {
    Category::parse(s).ok_or_else(|| CliError::InvalidCategory(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// Without `--category` the first tab is selected.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let initial_category = match &cli.category {
            Some(category) => parse_category_arg(category)?,
            None => default_categories()
                .into_iter()
                .next()
                .ok_or_else(|| CliError::InvalidCategory(String::new()))?,
        };

        let api_key = cli
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(CliError::MissingApiKey)?
            .to_string();

        Ok(StartupConfig {
            initial_category,
            api_key,
            base_url: cli.base_url.clone(),
            cache_dir: cli.cache_dir.clone(),
            log_file: cli.log_file.clone(),
        })
    }
}

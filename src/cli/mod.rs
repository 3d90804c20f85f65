//! Command-line interface.
//!
//! Without a subcommand the binary starts the web server. Subcommands:
//! - `config check` - Validate the configuration file and print a summary
//! - `db migrate` - Apply pending migrations and seed the exercise catalog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "liftlog")]
#[command(author, version, about = "Personal workout log", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "LIFTLOG_CONFIG", default_value = "liftlog.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long, env = "LIFTLOG_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Keep all data in memory; everything is lost on exit
    #[arg(long)]
    pub in_memory: bool,

    /// Subcommand to run (if none, starts the server)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum DbCommands {
    /// Apply pending migrations and seed the exercise catalog
    Migrate,
}

/// Run a CLI subcommand
pub async fn run_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Config(ConfigCommands::Check)) => cmd_config_check(cli),
        Some(Commands::Db(DbCommands::Migrate)) => cmd_db_migrate(cli).await,
        None => {
            // No subcommand means start the server - this is handled in main.rs
            Ok(())
        }
    }
}

fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!("[!!] Configuration file not found: {}", config_path.display());
        println!();
        println!("A default configuration will be used when starting the server.");
        println!("To create a custom configuration, copy liftlog.example.toml to liftlog.toml");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            print_summary(&config);
            Ok(())
        }
        Err(e) => {
            println!("[ERROR] Configuration is invalid: {:#}", e);
            Err(e)
        }
    }
}

fn print_summary(config: &Config) {
    println!("=== Configuration Summary ===");
    println!();
    println!("Server:");
    println!("  Host:         {}", config.server.host);
    println!("  Port:         {}", config.server.port);
    println!("  Database:     {}", config.database_path().display());
    println!();
    println!("Identity:");
    println!("  User header:  {}", config.auth.user_header);
    println!(
        "  Proxy secret: {}",
        if config.auth.proxy_secret.is_some() {
            "Required"
        } else {
            "Not configured (trusting the identity header as-is)"
        }
    );
    match &config.auth.dev_user {
        Some(user) => println!("  Dev user:     {} (do not use in production)", user),
        None => println!("  Dev user:     Disabled"),
    }
    println!("  Sign-in URL:  {}", config.auth.sign_in_url);
    println!();
    println!("Logging:");
    println!("  Level:        {}", config.logging.level);
}

async fn cmd_db_migrate(cli: &Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    crate::utils::ensure_dir(&config.server.data_dir)?;

    // `init` applies migrations and seeds before returning
    let pool = crate::db::init(&config.server.data_dir).await?;
    let exercises = crate::db::exercises::list_exercises(&pool).await?;
    pool.close().await;

    println!("[OK] Database is up to date: {}", config.database_path().display());
    println!("     {} exercises in the catalog", exercises.len());
    Ok(())
}

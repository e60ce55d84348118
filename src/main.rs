//! CLI entry point for postcheck

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postcheck::commands::show::Format;

#[derive(Parser)]
#[command(name = "postcheck")]
#[command(version)]
#[command(about = "Load and validate front-matter driven blog posts", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every document and the collection
    #[command(alias = "c")]
    Check {
        /// Fail on warnings too
        #[arg(long)]
        deny_warnings: bool,

        /// Re-check whenever content changes
        #[arg(short, long)]
        watch: bool,
    },

    /// List site information
    List {
        /// Type of content to list (post, tag, category, series, alias, archive, language)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Show the metadata of one post, by route or alias
    Show {
        path: String,

        #[arg(short, long, value_enum, default_value = "yaml")]
        format: Format,
    },

    /// Export all posts as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create a new post bundle
    New {
        /// Title of the new post
        title: String,

        /// Author (defaults to `author` in _config.yml)
        #[arg(short, long)]
        author: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "postcheck=debug,info"
    } else {
        "postcheck=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let site = postcheck::Site::new(&base_dir)?;

    match cli.command {
        Commands::Check {
            deny_warnings,
            watch,
        } => {
            if watch {
                if let Err(e) = postcheck::commands::check::run(&site, deny_warnings) {
                    tracing::error!("{}", e);
                }
                postcheck::commands::check::watch(&site, deny_warnings).await?;
            } else {
                postcheck::commands::check::run(&site, deny_warnings)?;
            }
        }

        Commands::List { r#type } => {
            postcheck::commands::list::run(&site, &r#type)?;
        }

        Commands::Show { path, format } => {
            postcheck::commands::show::run(&site, &path, format)?;
        }

        Commands::Export { output } => {
            postcheck::commands::export::run(&site, output.as_deref())?;
        }

        Commands::New { title, author } => {
            tracing::info!("Creating new post with title: {}", title);
            postcheck::commands::new::run(&site, &title, author.as_deref())?;
        }
    }

    Ok(())
}

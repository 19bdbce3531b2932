//! CLI entry point for folio

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Check, build and publish a generator-driven blog and portfolio site", long_about = None)]
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
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Content section to create it in
        #[arg(short, long, default_value = "posts")]
        section: String,

        /// Mark the post as a draft
        #[arg(long)]
        draft: bool,

        /// Create a page bundle (<slug>/index.md)
        #[arg(short, long)]
        bundle: bool,
    },

    /// List site information
    List {
        /// Type of content to list (post, tag, category, section)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Validate front matter, data files and asset references
    Check,

    /// Run the generator into the local output directory
    #[command(alias = "b")]
    Build {
        /// Build even when the content check reports errors
        #[arg(long)]
        skip_check: bool,
    },

    /// Copy the last build to the publish target
    Publish,

    /// Build, then publish if every step succeeded
    Deploy {
        /// Build even when the content check reports errors
        #[arg(long)]
        skip_check: bool,
    },

    /// Print the digest of an output tree
    Digest {
        /// Directory to digest (defaults to the output directory)
        dir: Option<PathBuf>,
    },

    /// Remove the local output directory
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            folio::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New {
            title,
            section,
            draft,
            bundle,
        } => {
            let site = folio::Folio::new(&base_dir)?;
            tracing::info!("Creating new post in {} with title: {}", section, title);
            folio::commands::new::create_post(
                &site,
                &folio::commands::new::NewPost {
                    title: &title,
                    section: &section,
                    draft,
                    bundle,
                },
            )?;
        }

        Commands::List { r#type } => {
            let site = folio::Folio::new(&base_dir)?;
            folio::commands::list::run(&site, &r#type)?;
        }

        Commands::Check => {
            let site = folio::Folio::new(&base_dir)?;
            folio::commands::check::run(&site)?;
        }

        Commands::Build { skip_check } => {
            let site = folio::Folio::new(&base_dir)?;
            tracing::info!("Building site...");
            folio::commands::build::run(&site, skip_check).await?;
        }

        Commands::Publish => {
            let site = folio::Folio::new(&base_dir)?;
            folio::commands::publish::run(&site)?;
        }

        Commands::Deploy { skip_check } => {
            let site = folio::Folio::new(&base_dir)?;
            tracing::info!("Deploying site...");
            folio::commands::deploy::run(&site, skip_check).await?;
        }

        Commands::Digest { dir } => {
            let site = folio::Folio::new(&base_dir)?;
            folio::commands::digest::run(&site, dir.as_deref())?;
        }

        Commands::Clean => {
            let site = folio::Folio::new(&base_dir)?;
            tracing::info!("Cleaning output folder...");
            folio::commands::clean::run(&site)?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

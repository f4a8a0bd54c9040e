// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use worldtv::Config;

mod cli;
use cli::{BrowseCommand, CommandContext, FavoritesCommand, FilterArgs, OutputFormat, TrashCommand};

fn cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default())
}

#[derive(Parser)]
#[command(name = "worldtv")]
#[command(about = "Browse and play TV, radio, webcam and YouTube streams by country")]
#[command(version)]
#[command(styles = cargo_style())]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging to file (worldtv_debug.log)
    #[arg(long, global = true)]
    debug_log: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data root (directory or URL), overrides the configuration
    #[arg(short, long, global = true)]
    data: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ListArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Print the source names present in the list instead of the channels
    #[arg(long)]
    list_sources: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the channels of a country (ISO alpha-2 or alpha-3 code)
    Country {
        code: String,
        #[command(flatten)]
        list: ListArgs,
    },

    /// List the channels of a category
    Category {
        name: String,
        #[command(flatten)]
        list: ListArgs,
    },

    /// List all known categories
    Categories,

    /// Play a channel of a country, choosing interactively if no slug is given
    Play {
        code: String,
        slug: Option<String>,
        /// Start the player in the background
        #[arg(long)]
        detach: bool,
    },

    /// Restore a deep link (?country=FR&channel=tf1) and play its channel
    Open {
        link: String,
        /// Start the player in the background
        #[arg(long)]
        detach: bool,
    },

    /// Print the deep link for a country and optional channel
    Link { code: String, slug: Option<String> },

    /// Manage favourites
    #[command(subcommand)]
    Fav(FavSubcommand),

    /// Manage the trash
    #[command(subcommand)]
    Trash(TrashSubcommand),
}

#[derive(Subcommand)]
enum FavSubcommand {
    /// Show the favourites tree
    List,
    /// Add a channel to the favourites
    Add { code: String, slug: String },
    /// Remove a channel or folder by id
    Remove { id: String },
    /// Create a top-level folder
    Folder { name: String },
    /// Rename a folder
    Rename { id: String, name: String },
    /// Move an entry into a folder, or to the top level without --folder
    Move {
        id: String,
        #[arg(long)]
        folder: Option<String>,
    },
    /// Move an entry up within its folder
    Up { id: String },
    /// Move an entry down within its folder
    Down { id: String },
    /// Play a favourite
    Play {
        id: String,
        #[arg(long)]
        detach: bool,
    },
}

#[derive(Subcommand)]
enum TrashSubcommand {
    /// Show trashed channels
    List,
    /// Hide a channel from every view
    Add { code: String, slug: String },
    /// Bring a trashed channel back
    Restore { code: String, slug: String },
    /// Restore everything
    Empty,
}

fn init_logging(cli: &Cli) -> Result<()> {
    if cli.debug_log {
        let file = File::create("worldtv_debug.log")?;
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_level(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(
                EnvFilter::from_default_env()
                    .add_directive("worldtv=debug".parse()?)
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive(tracing::Level::DEBUG.into())
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("hyper_util=error".parse()?),
            )
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(Config::default_path()),
    };
    if let Some(root) = &cli.data {
        config.data.root = root.clone();
    }

    let context = CommandContext::new(config)?;

    match cli.command {
        Commands::Country { code, list } => {
            BrowseCommand::Country {
                code,
                filter: list.filter.into_filter()?,
                format: OutputFormat::from_str(&list.format)?,
                list_sources: list.list_sources,
            }
            .execute(context)
            .await?
        }
        Commands::Category { name, list } => {
            BrowseCommand::Category {
                name,
                filter: list.filter.into_filter()?,
                format: OutputFormat::from_str(&list.format)?,
                list_sources: list.list_sources,
            }
            .execute(context)
            .await?
        }
        Commands::Categories => BrowseCommand::Categories.execute(context).await?,
        Commands::Play { code, slug, detach } => {
            BrowseCommand::Play { code, slug, detach }
                .execute(context)
                .await?
        }
        Commands::Open { link, detach } => {
            BrowseCommand::Open { link, detach }
                .execute(context)
                .await?
        }
        Commands::Link { code, slug } => {
            BrowseCommand::Link { code, slug }
                .execute(context)
                .await?
        }
        Commands::Fav(cmd) => {
            let cmd = match cmd {
                FavSubcommand::List => FavoritesCommand::List,
                FavSubcommand::Add { code, slug } => FavoritesCommand::Add { code, slug },
                FavSubcommand::Remove { id } => FavoritesCommand::Remove { id },
                FavSubcommand::Folder { name } => FavoritesCommand::Folder { name },
                FavSubcommand::Rename { id, name } => FavoritesCommand::Rename { id, name },
                FavSubcommand::Move { id, folder } => FavoritesCommand::Move { id, folder },
                FavSubcommand::Up { id } => FavoritesCommand::Up { id },
                FavSubcommand::Down { id } => FavoritesCommand::Down { id },
                FavSubcommand::Play { id, detach } => FavoritesCommand::Play { id, detach },
            };
            cmd.execute(context).await?
        }
        Commands::Trash(cmd) => {
            let cmd = match cmd {
                TrashSubcommand::List => TrashCommand::List,
                TrashSubcommand::Add { code, slug } => TrashCommand::Add { code, slug },
                TrashSubcommand::Restore { code, slug } => TrashCommand::Restore { code, slug },
                TrashSubcommand::Empty => TrashCommand::Empty,
            };
            cmd.execute(context).await?
        }
    }

    Ok(())
}

mod opener;

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use kazami_core::config::AppConfig;
use kazami_core::{
    Aggregator, Archive, Feed, FeedCategory, FeedFilterManager, FeedItemState, KazamiError,
    MemoryLibrary, RssTransport,
};

use crate::opener::{LinkOpener, LinkPrinter};

/// Anime release feed filter.
#[derive(Parser)]
#[command(name = "kazami", version, about, long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch, filter and list a feed
    Check {
        #[arg(long, value_enum, default_value_t = Category::Link)]
        category: Category,

        /// Feed source to use instead of the configured ones (repeatable)
        #[arg(long = "source")]
        sources: Vec<String>,

        /// Treat the run as scheduled: failures only affect the exit status
        #[arg(long)]
        automatic: bool,

        /// Download every selected item afterwards
        #[arg(long)]
        download: bool,

        /// Print the filtered feed as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or seed the filter list
    Filters {
        #[command(subcommand)]
        command: FiltersCommand,
    },

    /// Query the download archive
    Archive {
        #[command(subcommand)]
        command: ArchiveCommand,
    },
}

#[derive(Subcommand)]
enum FiltersCommand {
    /// Show the configured filters in order
    List,
    /// Show the built-in presets
    Presets,
    /// Append the default presets and save
    AddDefaults,
}

#[derive(Subcommand)]
enum ArchiveCommand {
    /// Check whether a release name is archived
    Search { name: String },
    /// Record a release name as downloaded
    Add { name: String },
    /// Number of archived releases
    Count,
}

#[derive(Clone, Copy, ValueEnum)]
enum Category {
    Link,
    Text,
    Time,
}

impl From<Category> for FeedCategory {
    fn from(c: Category) -> Self {
        match c {
            Category::Link => FeedCategory::Link,
            Category::Text => FeedCategory::Text,
            Category::Time => FeedCategory::Time,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), KazamiError> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.verbose);

    let config = AppConfig::load()?;
    match cli.command {
        Command::Check {
            category,
            sources,
            automatic,
            download,
            json,
        } => check(&config, category.into(), sources, automatic, download, json).await,
        Command::Filters { command } => filters(&config, command),
        Command::Archive { command } => archive(command),
    }
}

/// Console output plus a daily log file when the data directory is usable.
fn init_tracing(verbose: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default = if verbose { "kazami=debug" } else { "kazami=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let (file_layer, guard) = match AppConfig::ensure_data_dir() {
        Ok(_) => {
            let appender = tracing_appender::rolling::daily(AppConfig::log_dir(), "kazami.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    guard
}

fn load_library() -> MemoryLibrary {
    let path = AppConfig::library_path();
    if !path.exists() {
        return MemoryLibrary::new();
    }
    MemoryLibrary::load(&path).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Failed to load library");
        MemoryLibrary::new()
    })
}

fn open_archive(config: &AppConfig) -> Archive {
    if !config.archive.enabled {
        return Archive::default();
    }
    match AppConfig::ensure_data_dir() {
        Ok(_) => Archive::load(&AppConfig::archive_path()),
        Err(e) => {
            tracing::warn!(error = %e, "No data directory, archive is not persisted");
            Archive::default()
        }
    }
}

async fn check(
    config: &AppConfig,
    category: FeedCategory,
    sources: Vec<String>,
    automatic: bool,
    download: bool,
    json: bool,
) -> Result<(), KazamiError> {
    let library = load_library();
    let mut manager =
        FeedFilterManager::load(&AppConfig::filters_path(), config.filters.use_presets)?;
    manager.cleanup(&library);

    let mut aggregator =
        Aggregator::new(manager, Arc::new(open_archive(config)), Arc::new(library));
    aggregator.filtering = config.filters.enabled;

    let sources = if sources.is_empty() {
        config.feeds.sources(category).to_vec()
    } else {
        sources
    };
    let transport = RssTransport::default();
    if !aggregator
        .check(&transport, category, &sources, automatic)
        .await?
    {
        return Err(KazamiError::Transport(format!("{category} feed check failed")));
    }

    let Some(feed) = aggregator.get(category) else {
        return Ok(());
    };
    if json {
        let out = serde_json::to_string_pretty(feed).map_err(std::io::Error::from)?;
        println!("{out}");
    } else {
        print_feed(feed);
    }
    let waiting = aggregator.notify(category).len();
    if !json && waiting > 0 {
        println!("{waiting} release(s) available");
    }

    if download && aggregator.is_item_download_available(category) {
        let count = if config.download.open_links {
            aggregator.download_selected(&LinkOpener, category).await?
        } else {
            aggregator.download_selected(&LinkPrinter, category).await?
        };
        println!("{count} item(s) downloaded");
    }
    Ok(())
}

fn print_feed(feed: &Feed) {
    for item in feed.sorted() {
        let marker = match item.state {
            FeedItemState::Selected => "+",
            FeedItemState::Blank => " ",
            _ => "-",
        };
        let new = if item.episode_data.new_episode { "*" } else { " " };
        println!(
            "{:>3} {marker}{new} {:<10} {:<6} {}",
            item.index,
            item.state.to_string(),
            item.torrent_category().to_string(),
            item.entry.title
        );
    }
}

fn filters(config: &AppConfig, command: FiltersCommand) -> Result<(), KazamiError> {
    let path = AppConfig::filters_path();
    let mut manager = FeedFilterManager::load(&path, config.filters.use_presets)?;
    match command {
        FiltersCommand::List => {
            for (i, filter) in manager.filters.iter().enumerate() {
                let state = if filter.enabled { "on " } else { "off" };
                println!("{i:>3} [{state}] {filter}");
            }
        }
        FiltersCommand::Presets => {
            for preset in manager.presets() {
                let default = if preset.is_default { "default" } else { "" };
                println!("{:<7} {}: {}", default, preset.filter.name, preset.description);
            }
        }
        FiltersCommand::AddDefaults => {
            manager.add_presets();
            manager.save(&path)?;
            println!("{} filter(s) saved to {}", manager.filters.len(), path.display());
        }
    }
    Ok(())
}

fn archive(command: ArchiveCommand) -> Result<(), KazamiError> {
    AppConfig::ensure_data_dir()?;
    let archive = Archive::load(&AppConfig::archive_path());
    match command {
        ArchiveCommand::Search { name } => {
            let found = if archive.search(&name) { "archived" } else { "not archived" };
            println!("{name}: {found}");
        }
        ArchiveCommand::Add { name } => {
            if archive.append(&name)? {
                println!("added {name}");
            } else {
                println!("{name} is already archived");
            }
        }
        ArchiveCommand::Count => println!("{}", archive.len()),
    }
    Ok(())
}

use clap::{ArgAction, Args, Parser, Subcommand};
use color_eyre::eyre::eyre;
use media_catalog_config::{Config, PathManager};
use media_catalog_models::VideoType;
use media_catalog_providers::ProviderRegistry;
use std::sync::Arc;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "streamscout")]
#[command(about = "Streamscout - browse streaming catalogs and resolve playable links")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the aggregated home screen
    #[command(long_about = "Fetch the home screen of every enabled provider (or a single one with --provider) and print the rows in provider order.")]
    Home {
        /// Only query this provider
        #[arg(long)]
        provider: Option<String>,
    },
    /// Search titles across providers
    #[command(long_about = "Search all enabled providers (or one with --provider). An empty query lists each provider's genres instead of titles.")]
    Search {
        /// Search query; empty lists genres
        #[arg(default_value = "")]
        query: String,

        /// Only query this provider
        #[arg(long)]
        provider: Option<String>,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Browse a provider's catalog
    Browse {
        #[command(subcommand)]
        what: BrowseCommands,
    },
    /// Show details for a single title
    Detail {
        #[command(subcommand)]
        what: DetailCommands,
    },
    /// List the episodes of a season
    Episodes {
        season_id: String,

        #[arg(long)]
        provider: String,
    },
    /// List playback candidates for a title
    Servers {
        #[arg(long)]
        provider: String,

        #[command(flatten)]
        title: TitleArgs,
    },
    /// Resolve a title to a playable stream URL
    #[command(long_about = "Run the full pipeline: list the title's servers, order them by your preferred-server list, and try each one until an extractor produces a playable URL.")]
    Resolve {
        #[arg(long)]
        provider: String,

        #[command(flatten)]
        title: TitleArgs,

        /// Only try the server with this display name
        #[arg(long)]
        server: Option<String>,
    },
    /// List registered providers and their capabilities
    Providers,
    /// View or edit configuration
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum BrowseCommands {
    /// Paginated movie catalog
    Movies {
        #[arg(long)]
        provider: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Paginated TV catalog
    Shows {
        #[arg(long)]
        provider: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Titles in one genre
    Genre {
        id: String,
        #[arg(long)]
        provider: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[derive(Subcommand)]
enum DetailCommands {
    Movie {
        id: String,
        #[arg(long)]
        provider: String,
    },
    Show {
        id: String,
        #[arg(long)]
        provider: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Interactive configuration wizard
    Init,
    /// Print the configuration file path
    Path,
}

/// Selects a movie or one episode of a show.
#[derive(Args)]
struct TitleArgs {
    /// Movie id
    #[arg(long, conflicts_with_all = ["show", "season", "episode"])]
    movie: Option<String>,

    /// TV show id (requires --season and --episode)
    #[arg(long, requires = "season", requires = "episode")]
    show: Option<String>,

    #[arg(long)]
    season: Option<u32>,

    #[arg(long)]
    episode: Option<u32>,
}

impl TitleArgs {
    fn to_video_type(&self) -> color_eyre::Result<VideoType> {
        match (&self.movie, &self.show) {
            (Some(movie), None) => Ok(VideoType::movie(movie)),
            (None, Some(show)) => Ok(VideoType::episode(
                show,
                self.season.ok_or_else(|| eyre!("--season is required with --show"))?,
                self.episode.ok_or_else(|| eyre!("--episode is required with --show"))?,
            )),
            _ => Err(eyre!("specify either --movie ID or --show ID --season N --episode N")),
        }
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet).map_err(|e| eyre!("{}", e))?;

    let out = output::Output::new(cli.output, cli.quiet);
    let paths = PathManager::default();
    let config = Config::load(&paths.config_file()).map_err(|e| eyre!("{}", e))?;

    // Config commands never need the provider registry (and `init` must
    // work before any provider is reachable).
    if let Commands::Config { cmd } = &cli.command {
        return commands::config::run(cmd, &config, &paths, &out);
    }

    let registry = Arc::new(ProviderRegistry::from_config(
        &config,
        paths.browser_data_dir(),
    ));
    if registry.is_empty() {
        return Err(eyre!(
            "No providers enabled. Run 'streamscout config init' first."
        ));
    }

    match cli.command {
        Commands::Home { provider } => {
            commands::home::run(&registry, provider.as_deref(), &out).await
        }
        Commands::Search {
            query,
            provider,
            page,
        } => commands::search::run(&registry, &query, provider.as_deref(), page, &out).await,
        Commands::Browse { what } => match what {
            BrowseCommands::Movies { provider, page } => {
                commands::browse::movies(&registry, &provider, page, &out).await
            }
            BrowseCommands::Shows { provider, page } => {
                commands::browse::shows(&registry, &provider, page, &out).await
            }
            BrowseCommands::Genre { id, provider, page } => {
                commands::browse::genre(&registry, &provider, &id, page, &out).await
            }
        },
        Commands::Detail { what } => match what {
            DetailCommands::Movie { id, provider } => {
                commands::detail::movie(&registry, &provider, &id, &out).await
            }
            DetailCommands::Show { id, provider } => {
                commands::detail::show(&registry, &provider, &id, &out).await
            }
        },
        Commands::Episodes {
            season_id,
            provider,
        } => commands::servers::episodes(&registry, &provider, &season_id, &out).await,
        Commands::Servers { provider, title } => {
            let video_type = title.to_video_type()?;
            commands::servers::servers(&registry, &provider, &video_type, &out).await
        }
        Commands::Resolve {
            provider,
            title,
            server,
        } => {
            let video_type = title.to_video_type()?;
            commands::resolve::run(
                &registry,
                &config,
                &provider,
                &video_type,
                server.as_deref(),
                &out,
            )
            .await
        }
        Commands::Providers => commands::providers::run(&registry, &out),
        Commands::Config { .. } => unreachable!("handled above"),
    }
}

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use trendwall::types::{BackdropRef, MediaDetails, MediaRecord};
use trendwall::{config, output, pipeline};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "trendwall")]
#[command(about = "Wallpapers from trending and recently added movies and shows")]
#[command(long_about = "\
Wallpapers from trending and recently added movies and shows

Each run lists the current titles (TMDB trending, or the newest items of a
Plex library), renders a captioned wallpaper for every title that does not
have one yet, and deletes wallpapers for titles that dropped off the list.

Output directory after a run:

  wallpapers/
  ├── Dune__Part_Two.jpg           # one file per current title
  ├── Shogun.jpg                   # existing files are never re-rendered
  └── .Heat.jpg.tmp                # hidden: in-flight write, ignored

Credentials come from environment variables (TMDB_TOKEN, PLEX_TOKEN by
default). Run 'trendwall gen-config' to generate a documented trendwall.toml.")]
#[command(version = env!("TRENDWALL_VERSION"))]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Output directory (overrides output_dir in the config)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Record fields for a one-off render.
#[derive(clap::Args)]
#[command(group(ArgGroup::new("kind").args(["movie", "series"])))]
struct PreviewArgs {
    /// Local backdrop image
    #[arg(long)]
    image: PathBuf,
    #[arg(long)]
    title: String,
    /// Render as a movie (default)
    #[arg(long)]
    movie: bool,
    /// Render as a series
    #[arg(long)]
    series: bool,
    #[arg(long, default_value = "")]
    overview: String,
    /// Release date, e.g. 2024-05-01
    #[arg(long, default_value = "")]
    date: String,
    #[arg(long, default_value_t = 0.0)]
    rating: f32,
    /// Comma-separated genre names
    #[arg(long, default_value = "")]
    genres: String,
    /// Runtime in minutes (movies)
    #[arg(long)]
    runtime: Option<u32>,
    /// Number of seasons (series)
    #[arg(long)]
    seasons: Option<u32>,
    /// Where to write the JPEG
    #[arg(long, default_value = "preview.jpg")]
    out: PathBuf,
}

impl PreviewArgs {
    fn record(&self) -> MediaRecord {
        let details = if self.series {
            MediaDetails::Series {
                season_count: self.seasons,
            }
        } else {
            MediaDetails::Movie {
                runtime_minutes: self.runtime,
            }
        };
        MediaRecord {
            id: "preview".to_string(),
            title: self.title.clone(),
            overview: self.overview.clone(),
            date: self.date.clone(),
            rating: self.rating,
            genres: self.genres.clone(),
            details,
            backdrop: Some(BackdropRef(self.image.display().to_string())),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Fetch current titles, reconcile the output directory, run the sink
    Sync,
    /// Render one local backdrop with the configured layout
    Preview(PreviewArgs),
    /// Validate the config and print the resolved settings
    Check,
    /// Print a stock trendwall.toml with all options documented
    GenConfig,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load(cli: &Cli) -> Result<config::Config, config::ConfigError> {
    let mut config = config::load_config(&cli.config)?;
    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Check => {
            let config = load(&cli)?;
            output::print_config(&config, &cli.config, cli.config.exists());
            println!("==> Config is valid");
        }
        Command::Sync => {
            init_logging(cli.verbose);
            let config = load(&cli)?;
            let summary = pipeline::sync(&config)?;
            output::print_sync_summary(&summary);
        }
        Command::Preview(args) => {
            init_logging(cli.verbose);
            let config = load(&cli)?;
            pipeline::preview(&config, &args.image, &args.record(), &args.out)?;
            println!("{}", args.out.display());
        }
    }

    Ok(())
}

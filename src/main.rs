//! CLI interface for aviasky

use anyhow::{bail, Context, Result};
use aviasky::{
    render, AviaClient, CityCatalog, ClientConfig, EventScope, Field, Key, SearchBackend, SearchOutcome,
    SearchPage,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "aviasky")]
#[command(about = "Search AviaSky flights from the terminal")]
#[command(version)]
pub struct Cli {
    /// Search service endpoint base URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,
    /// Also write JSON logs to daily files in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List city suggestions for a query
    Cities {
        /// Text typed into the city field
        #[arg(short, long, default_value = "")]
        query: String,
        /// City code chosen in the other field
        #[arg(short, long)]
        exclude: Option<String>,
        /// Let the search service filter by query instead of the local catalog
        #[arg(long)]
        remote: bool,
    },
    /// Search for flights
    Search(SearchArgs),
    /// Search, then print the booking chat link for one flight
    Buy {
        #[command(flatten)]
        search: SearchArgs,
        /// Flight id from the search results (e.g. SU2108)
        #[arg(long)]
        flight: String,
    },
}

#[derive(Args)]
pub struct SearchArgs {
    /// Origin city, typed as in the form; the first suggestion is chosen
    #[arg(short, long)]
    pub from: String,
    /// Destination city; the first suggestion is chosen
    #[arg(short, long)]
    pub to: String,
    /// Departure date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: NaiveDate,
    /// Return date (YYYY-MM-DD), shown only
    #[arg(short, long)]
    pub return_date: Option<NaiveDate>,
    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
    /// Output file for JSON results
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn init_logging(verbose: bool, log_dir: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    let default_level = if verbose { "aviasky=debug" } else { "aviasky=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::daily(dir, "aviasky.log");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_file(true)
                        .with_line_number(true)
                        .json(),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            Ok(None)
        }
    }
}

/// Type `text` into a city field and commit the first suggestion
fn choose_city<B: SearchBackend>(page: &mut SearchPage<B>, field: Field, text: &str) -> Result<()> {
    page.focus(field);
    page.type_text(field, text);
    page.press_key(field, Key::ArrowDown);
    page.press_key(field, Key::Enter);

    match page.selected(field) {
        Some(city) => {
            debug!(?field, code = %city.code, "City chosen");
            Ok(())
        }
        None => bail!("no city matches '{}'", text),
    }
}

async fn run_search(page: &mut SearchPage<AviaClient>, args: &SearchArgs) -> Result<()> {
    page.load_catalog().await;
    if page.catalog().is_empty() {
        bail!("city catalog is unavailable; check the endpoint or try again later");
    }

    choose_city(page, Field::Origin, &args.from)?;
    choose_city(page, Field::Destination, &args.to)?;
    page.set_depart_date(args.date.format("%Y-%m-%d").to_string());
    if let Some(return_date) = args.return_date {
        page.set_return_date(return_date.format("%Y-%m-%d").to_string());
    }

    match page.search().await {
        SearchOutcome::Completed { flights } => info!(flights, "Search finished"),
        SearchOutcome::Blocked(reason) => bail!("{}", reason),
        SearchOutcome::Failed => bail!("flight search failed; see log for details"),
    }
    Ok(())
}

fn print_results(page: &SearchPage<AviaClient>, args: &SearchArgs) -> Result<()> {
    if args.json || args.output.is_some() {
        let json = serde_json::to_string_pretty(page.flights())?;
        match &args.output {
            Some(path) => {
                fs::write(path, &json)
                    .with_context(|| format!("writing results to {}", path.display()))?;
                println!("Results saved to {}", path.display());
            }
            None => println!("{}", json),
        }
    } else {
        print!("{}", render::page(&page.view()));
    }

    if page.flights().is_empty() {
        println!("No flights found");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_ref())?;

    let config = match &cli.endpoint {
        Some(endpoint) => ClientConfig::with_endpoint(endpoint)?,
        None => ClientConfig::default(),
    };
    let client = AviaClient::new(config)?;
    let mut page = SearchPage::new(client, EventScope::new());

    match cli.command {
        Commands::Cities {
            query,
            exclude,
            remote,
        } => {
            let suggestions = if remote {
                let cities = page.backend().fetch_cities_matching(&query).await?;
                CityCatalog::new(cities).filter("", exclude.as_deref())
            } else {
                page.load_catalog().await;
                page.catalog().filter(&query, exclude.as_deref())
            };
            if suggestions.is_empty() {
                println!("No matching cities");
            }
            for city in suggestions {
                println!("{:<4} {:<28} {}", city.code, city.name, city.country);
            }
        }
        Commands::Search(args) => {
            run_search(&mut page, &args).await?;
            print_results(&page, &args)?;
        }
        Commands::Buy { search, flight } => {
            run_search(&mut page, &search).await?;
            print_results(&page, &search)?;
            let link = page.booking_link(&flight).await?;
            println!("\nBook {} in Telegram:\n{}", flight, link);
        }
    }

    Ok(())
}

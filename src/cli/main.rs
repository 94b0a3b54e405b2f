use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use nix_search_client::{
    Channel, ClientConfig, NixOption, Package, SearchClient, SearchResults, SortOrder,
    ToolEnvelope,
};

#[derive(Parser)]
#[command(name = "nix-search")]
#[command(about = "Search NixOS packages and options", long_about = None)]
struct Cli {
    /// Search backend endpoint (overrides configuration)
    #[arg(short, long, env = "NIX_SEARCH_ENDPOINT")]
    endpoint: Option<String>,

    /// Channel: a keyword (unstable, stable, beta, flakes) or a raw
    /// channel value such as nixos-24.11
    #[arg(short, long, default_value = "unstable")]
    channel: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// Search packages
    Packages {
        #[arg(value_name = "QUERY")]
        query: String,

        #[arg(short, long, default_value = "0")]
        page: u32,

        #[arg(short = 's', long, default_value = "25")]
        size: u32,

        /// Explicit ordering (asc or desc) instead of relevance
        #[arg(long)]
        sort: Option<String>,

        /// Restrict to a package set (repeatable)
        #[arg(long = "package-set")]
        package_sets: Vec<String>,

        /// Restrict to a license (repeatable)
        #[arg(long = "license")]
        licenses: Vec<String>,

        /// Restrict to a maintainer (repeatable)
        #[arg(long = "maintainer")]
        maintainers: Vec<String>,

        /// Restrict to a maintainer team (repeatable)
        #[arg(long = "team")]
        teams: Vec<String>,

        /// Restrict to a platform (repeatable)
        #[arg(long = "platform")]
        platforms: Vec<String>,
    },

    /// Search NixOS module options
    Options {
        #[arg(value_name = "QUERY")]
        query: String,

        #[arg(short, long, default_value = "0")]
        page: u32,

        #[arg(short = 's', long, default_value = "25")]
        size: u32,

        /// Explicit ordering (asc or desc) instead of relevance
        #[arg(long)]
        sort: Option<String>,
    },

    /// List channels discovered from the backend
    Channels,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::load().context("failed to load configuration")?;
    if let Some(endpoint) = cli.endpoint.clone() {
        config.endpoint = endpoint;
    }
    let client = SearchClient::new(config)?;

    match cli.command {
        Commands::Packages {
            query,
            page,
            size,
            sort,
            package_sets,
            licenses,
            maintainers,
            teams,
            platforms,
        } => {
            let channel = resolve_channel(&client, &cli.channel).await?;
            let sort = parse_sort(sort.as_deref())?;
            let results = client
                .packages()
                .for_channel(channel)
                .with_query(Some(query))
                .page(page as i64 * size as i64, size as i64)?
                .sort_by(sort)
                .with_package_sets(package_sets)
                .with_licenses(licenses)
                .with_maintainers(maintainers)
                .with_teams(teams)
                .with_platforms(platforms)
                .execute()
                .await?;
            render_packages(&results, page as usize, size as usize, cli.format)?;
        }

        Commands::Options {
            query,
            page,
            size,
            sort,
        } => {
            let channel = resolve_channel(&client, &cli.channel).await?;
            let sort = parse_sort(sort.as_deref())?;
            let results = client
                .options()
                .for_channel(channel)
                .with_query(Some(query))
                .page(page as i64 * size as i64, size as i64)?
                .sort_by(sort)
                .execute()
                .await?;
            render_options(&results, page as usize, size as usize, cli.format)?;
        }

        Commands::Channels => {
            let channels = client.discover_channels().await?;
            match cli.format {
                OutputFormat::Text => {
                    for channel in channels {
                        println!("{}", channel);
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(channels)?)
                }
                OutputFormat::Yaml => print!("{}", serde_yaml::to_string(channels)?),
            }
        }
    }

    Ok(())
}

/// Resolve a keyword against the discovered set, or accept a raw value
async fn resolve_channel(client: &SearchClient, requested: &str) -> anyhow::Result<Channel> {
    match requested.to_ascii_lowercase().as_str() {
        "unstable" | "stable" | "beta" | "flakes" => {
            Ok(client.resolve_channel(requested).await?)
        }
        _ => Ok(Channel::from_value(requested)?),
    }
}

fn parse_sort(sort: Option<&str>) -> anyhow::Result<Option<SortOrder>> {
    match sort {
        Some(value) => Ok(Some(value.parse()?)),
        None => Ok(None),
    }
}

fn render_packages(
    results: &SearchResults<Package>,
    page: usize,
    size: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for package in &results.results {
                let description = package.description.as_deref().unwrap_or("");
                println!(
                    "{} ({}) {}",
                    package.attr_name, package.version, description
                );
            }
            eprintln!("{} of {} packages shown", results.results.len(), results.total);
        }
        _ => render_envelope(results.clone(), page, size, format)?,
    }
    Ok(())
}

fn render_options(
    results: &SearchResults<NixOption>,
    page: usize,
    size: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for option in &results.results {
                let description = option.description.as_deref().unwrap_or("");
                println!("{}  {}", option.name, description);
            }
            eprintln!("{} of {} options shown", results.results.len(), results.total);
        }
        _ => render_envelope(results.clone(), page, size, format)?,
    }
    Ok(())
}

fn render_envelope<T: Serialize>(
    results: SearchResults<T>,
    page: usize,
    size: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let envelope = ToolEnvelope::from_results(results, page, size);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&envelope)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&envelope)?),
        OutputFormat::Text => unreachable!("text handled by the caller"),
    }
    Ok(())
}

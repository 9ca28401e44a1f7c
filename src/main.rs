mod error;
mod forum;
mod index;
mod legend;
mod listing;
mod model;
mod parser;
mod settings;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use forum::ForumPages;
use index::Collector;
use legend::StatusColors;
use model::ThreadRecord;
use settings::Settings;

#[derive(Parser)]
#[command(name = "csb_index", about = "Court Process Tracking master index generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the forum and print the master index table
    Generate {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Format::Bbcode)]
        format: Format,
        /// Use the built-in status colours instead of the reference legend
        #[arg(long)]
        no_legend: bool,
    },
    /// Scrape the forum and replace the table inside a saved post body
    Splice {
        /// Post body containing a previously generated table
        #[arg(short, long)]
        post: PathBuf,
        /// Write the updated post here (default: overwrite --post)
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(long)]
        no_legend: bool,
    },
    /// Build the index from saved listing pages instead of the live forum
    Parse {
        /// Saved viewforum pages, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Saved reference page carrying the status legend
        #[arg(short, long)]
        legend: Option<PathBuf>,
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Format::Bbcode)]
        format: Format,
    },
    /// Show the status colour map in effect
    Colors {
        #[arg(long)]
        no_legend: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Bbcode,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;
    info!(forum = %settings.forum_url, legend = %settings.legend_url, "Settings loaded");

    let result = match cli.command {
        Commands::Generate {
            out,
            format,
            no_legend,
        } => {
            let client = settings.http_client()?;
            let colors = load_colors(&settings, &client, no_legend).await;
            let records = scrape_forum(&settings, &client).await?;
            let count = write_output(&records, &colors, format, out.as_deref())?;
            eprintln!("{} entries", count);
            Ok(())
        }
        Commands::Splice {
            post,
            out,
            no_legend,
        } => {
            let body = std::fs::read_to_string(&post)
                .with_context(|| format!("Failed to read post body {}", post.display()))?;
            let client = settings.http_client()?;
            let colors = load_colors(&settings, &client, no_legend).await;
            let records = scrape_forum(&settings, &client).await?;
            let table = index::render(&records, &colors);
            let updated = index::splice(&body, &table.bbcode)?;
            let dest = out.unwrap_or(post);
            std::fs::write(&dest, updated)
                .with_context(|| format!("Failed to write {}", dest.display()))?;
            eprintln!("{} entries spliced into {}", table.count, dest.display());
            Ok(())
        }
        Commands::Parse {
            files,
            legend,
            out,
            format,
        } => {
            let colors = match legend {
                Some(path) => {
                    let html = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read legend {}", path.display()))?;
                    StatusColors::from_legend_html(&html, &settings.fallback_color)
                }
                None => StatusColors::with_fallback(&settings.fallback_color),
            };
            let records = parse_files(&settings, &files)?;
            let count = write_output(&records, &colors, format, out.as_deref())?;
            eprintln!("{} entries", count);
            Ok(())
        }
        Commands::Colors { no_legend } => {
            let client = settings.http_client()?;
            let colors = load_colors(&settings, &client, no_legend).await;
            for (status, color) in colors.iter() {
                println!("{:<20} {}", status, color);
            }
            println!("{:<20} {}", "(other)", colors.fallback());
            eprintln!("{} statuses", colors.len());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("Done in {}", format_duration(elapsed));
    }

    result
}

/// Reference legend if configured and reachable, built-in colours otherwise.
async fn load_colors(settings: &Settings, client: &reqwest::Client, no_legend: bool) -> StatusColors {
    let fallback = &settings.fallback_color;
    let Some(raw) = settings.legend_url().filter(|_| !no_legend) else {
        return StatusColors::with_fallback(fallback);
    };

    let fetched = match forum::parse_url(raw) {
        Ok(url) => forum::fetch_html(client, &url).await,
        Err(e) => Err(e),
    };
    match fetched {
        Ok(html) => StatusColors::from_legend_html(&html, fallback),
        Err(e) => {
            warn!("Status legend unavailable ({}), using built-in colours", e);
            StatusColors::with_fallback(fallback)
        }
    }
}

async fn scrape_forum(settings: &Settings, client: &reqwest::Client) -> Result<Vec<ThreadRecord>> {
    let forum = forum::parse_url(&settings.forum_url)?;
    let mut pages = ForumPages::new(client.clone(), forum);
    let mut collector = Collector::new();

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));

    while let Some(page) = pages.next_page().await? {
        collector.push_page(&page);
        pb.set_message(format!(
            "{} pages, {} threads ({} queued)",
            collector.pages(),
            collector.seen(),
            pages.pending()
        ));
    }

    pb.finish_and_clear();
    info!(
        "Scraped {} pages ({} threads)",
        collector.pages(),
        collector.seen()
    );
    Ok(collector.finish())
}

fn parse_files(settings: &Settings, files: &[PathBuf]) -> Result<Vec<ThreadRecord>> {
    let base = forum::parse_url(&settings.forum_url)?;
    let mut collector = Collector::new();
    for file in files {
        let html = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        collector.push_page(&listing::parse_listing(&html, &base));
    }
    info!(
        "Parsed {} pages ({} threads)",
        collector.pages(),
        collector.seen()
    );
    Ok(collector.finish())
}

/// Write the sorted records in the chosen format. Returns the row count.
fn write_output(
    records: &[ThreadRecord],
    colors: &StatusColors,
    format: Format,
    out: Option<&Path>,
) -> Result<usize> {
    let text = match format {
        Format::Bbcode => index::render(records, colors).bbcode,
        Format::Json => serde_json::to_string_pretty(records)?,
    };
    match out {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", text),
    }
    Ok(records.len())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

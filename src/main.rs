use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};

use supla_rssproxy::{
    Config, NoopReporter, ProgressEvent, ProgressReporter, ReqwestClient, SharedProgressReporter,
    generate_feeds,
};

// Emoji with fallback for terminals without Unicode support
static RADIO: Emoji<'_, '_> = Emoji("📻 ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "[?] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "x ");

/// Generate podcast RSS feeds from Supla
#[derive(Parser, Debug)]
#[command(name = "supla-rssproxy")]
#[command(about = "Generate podcast RSS feeds from Supla")]
#[command(version)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(long)]
    config_file: PathBuf,

    /// Only regenerate the entry with this shortname (repeatable)
    #[arg(long = "only", value_name = "SHORTNAME")]
    only: Vec<String>,

    /// Quiet mode - suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

/// Progress reporter using an indicatif spinner for terminal output
struct IndicatifReporter {
    spinner: ProgressBar,
}

impl IndicatifReporter {
    fn new() -> Result<Self> {
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .context("Invalid progress template")?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));

        Ok(Self { spinner })
    }
}

impl ProgressReporter for IndicatifReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::EntryStarted {
                shortname,
                source_ref,
            } => {
                self.spinner.set_message(format!(
                    "{SEARCH}{} • resolving {}",
                    shortname.bold(),
                    source_ref.cyan()
                ));
            }

            ProgressEvent::ReferenceResolved {
                shortname,
                platform_id,
                from_episode,
            } => {
                let via = if from_episode { " via episode" } else { "" };
                self.spinner.set_message(format!(
                    "{SEARCH}{} • podcast {}{}",
                    shortname.bold(),
                    platform_id.cyan(),
                    via.dimmed()
                ));
            }

            ProgressEvent::FetchingPodcast { platform_id } => {
                self.spinner
                    .set_message(format!("{HEADPHONES}Fetching podcast {}", platform_id.cyan()));
            }

            ProgressEvent::ListingTruncated {
                platform_id,
                total,
                returned,
            } => {
                self.spinner.println(format!(
                    "  {WARNING}podcast {} lists {} episodes, feed keeps the newest {}",
                    platform_id.cyan(),
                    total.to_string().yellow(),
                    returned.to_string().yellow()
                ));
            }

            ProgressEvent::FetchingEpisode {
                episode_id,
                index,
                total,
            } => {
                self.spinner.set_message(format!(
                    "{HEADPHONES}[{}/{}] episode {}",
                    (index + 1).to_string().cyan(),
                    total.to_string().cyan(),
                    episode_id
                ));
            }

            ProgressEvent::FeedWritten {
                shortname,
                path,
                item_count,
            } => {
                self.spinner.println(format!(
                    "{SUCCESS}{} {} items → {}",
                    shortname.green().bold(),
                    item_count.to_string().cyan(),
                    path.display().to_string().dimmed()
                ));
            }

            ProgressEvent::EntryFailed { shortname, error } => {
                self.spinner.println(format!(
                    "{FAILURE}{} - {}",
                    shortname.red().bold(),
                    error.red()
                ));
            }

            ProgressEvent::RunCompleted {
                generated_count,
                failed_count,
            } => {
                self.spinner.finish_and_clear();
                println!(
                    "\n{PARTY}{} {} generated, {} failed",
                    "Done:".bold().green(),
                    generated_count.to_string().green().bold(),
                    if failed_count > 0 {
                        failed_count.to_string().red().bold()
                    } else {
                        failed_count.to_string().green()
                    }
                );
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config_file)
        .with_context(|| format!("Failed to load {}", args.config_file.display()))?;

    if !args.quiet {
        println!(
            "\n{}{} {}\n",
            RADIO,
            "supla-rssproxy".bold().magenta(),
            "- Podcast feed generator".dimmed()
        );
    }

    let client = ReqwestClient::new();

    let reporter: SharedProgressReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(IndicatifReporter::new()?)
    };

    let result = generate_feeds(&client, &config, &args.only, reporter)
        .await
        .context("Failed to generate feeds")?;

    if !args.quiet && !result.failed.is_empty() {
        println!("\n{}", "Failed entries:".red().bold());
        for (shortname, error) in &result.failed {
            println!(
                "  {}{} - {}",
                CROSS,
                shortname.yellow(),
                error.to_string().dimmed()
            );
        }
    }

    if !args.quiet {
        println!(
            "\n{FOLDER}Output: {}\n",
            config.target_dir.display().to_string().cyan()
        );
    }

    // Quiet mode still reports failures on stderr
    if args.quiet {
        for (shortname, error) in &result.failed {
            eprintln!("{shortname}: {error}");
        }
    }

    if !result.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use love_timer::card::{self, Theme};
use love_timer::logging::{self, LoggingConfig};
use love_timer::ticker::{self, Ticker};
use love_timer::{AppState, Clock, DateEntry, ImageReference, JsonFileStore, SystemClock};

#[derive(Parser)]
#[command(author, version, about = "Counts the time since your start date")]
struct Cli {
    /// Preferences file holding the start date and selected image.
    #[arg(long, env = "LOVE_TIMER_PREFS", default_value = "love_timer_prefs.json")]
    prefs: PathBuf,

    /// Log filter (e.g. "debug"). Falls back to RUST_LOG, then "info".
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the love time once.
    Show {
        /// Print the breakdown as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the love time every second until Ctrl-C.
    Watch,
    /// Pick a new start date. Omitted fields default to today / midnight.
    SetStart {
        #[arg(long, default_value = "")]
        year: String,
        #[arg(long, default_value = "")]
        month: String,
        #[arg(long, default_value = "")]
        day: String,
        #[arg(long, default_value = "0")]
        hour: String,
        #[arg(long, default_value = "0")]
        minute: String,
    },
    /// Pick the photo shown on the card.
    SetImage { uri: String },
    /// Write the card as SVG.
    Render {
        #[arg(long, value_enum, default_value_t = ThemeArg::Both)]
        theme: ThemeArg,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Dark,
    Light,
    Both,
}

impl ThemeArg {
    fn themes(self) -> &'static [Theme] {
        match self {
            ThemeArg::Dark => &[Theme::Dark],
            ThemeArg::Light => &[Theme::Light],
            ThemeArg::Both => &[Theme::Dark, Theme::Light],
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(LoggingConfig {
        filter: cli.log_level.clone(),
        ..LoggingConfig::default()
    });

    let clock = SystemClock;
    let store = JsonFileStore::open_or_empty(&cli.prefs);
    let mut app = AppState::load(store, clock.today());

    match cli.command {
        Command::Show { json } => {
            let elapsed = app.breakdown_at(clock.now());
            if json {
                println!("{}", serde_json::to_string_pretty(&elapsed)?);
            } else {
                println!("Love Time: {elapsed}");
            }
        }
        Command::Watch => {
            let start = *app.start_date();
            println!("Love Time: {}", love_timer::compute(&start, clock.now()));

            let ticker = Ticker::start(ticker::DEFAULT_PERIOD, move || {
                println!("Love Time: {}", love_timer::compute(&start, clock.now()));
            });

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;
            ticker.stop().await;
        }
        Command::SetStart {
            year,
            month,
            day,
            hour,
            minute,
        } => {
            let entry = DateEntry {
                year,
                month,
                day,
                hour,
                minute,
            };
            let persisted = app.apply_date_entry(&entry, clock.today())?;
            if !persisted {
                bail!("start date could not be saved to {}", app.store().path().display());
            }
            println!("Start date set to {}", app.start_date());
        }
        Command::SetImage { uri } => {
            let Some(image) = ImageReference::new(uri) else {
                bail!("image reference must not be blank");
            };
            if !app.select_image(image) {
                bail!("image could not be saved to {}", app.store().path().display());
            }
            println!("Image set.");
        }
        Command::Render { theme, out_dir } => {
            let elapsed = app.breakdown_at(clock.now());
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;

            for theme in theme.themes() {
                let svg = card::render_card(app.image(), app.start_date(), &elapsed, *theme);
                let path = out_dir.join(format!("love_time_{}.svg", theme.name()));
                fs::write(&path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Generated {}", path.display());
            }
        }
    }

    Ok(())
}

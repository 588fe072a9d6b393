use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use pourover_rs::display::{format_countdown, format_grams, pour_action, recipe_summary};
use pourover_rs::{
    BrewConfig, BrewSession, PourEvent, PourEventKind, SessionEvent, SessionEventKind, Strength,
    Taste, TimerEvent, TimerEventKind, UI_MAX_BEAN_WEIGHT_G, UI_MIN_BEAN_WEIGHT_G,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pourover", about = "4:6 pour-over recipe calculator and brew timer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the pour schedule
    Recipe {
        #[command(flatten)]
        brew: BrewArgs,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Run a brewing session, one tick per second
    Brew {
        #[command(flatten)]
        brew: BrewArgs,
        /// Sleep a real second between ticks
        #[arg(long)]
        realtime: bool,
    },
}

#[derive(Args)]
struct BrewArgs {
    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Bean weight in grams (5-50)
    #[arg(long)]
    beans: Option<f64>,
    #[arg(long)]
    taste: Option<Taste>,
    #[arg(long)]
    strength: Option<Strength>,
    /// Seconds between pours
    #[arg(long)]
    interval: Option<u32>,
}

impl BrewArgs {
    fn resolve(&self) -> Result<BrewConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                BrewConfig::from_json_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => BrewConfig::default(),
        };

        if let Some(beans) = self.beans {
            config.set_bean_weight(beans)?;
        }
        if let Some(taste) = self.taste {
            config.taste = taste;
        }
        if let Some(strength) = self.strength {
            config.strength = strength;
        }
        if let Some(interval) = self.interval {
            config.pour_interval_secs = interval;
        }
        config.validate()?;
        if !config.has_typical_bean_weight() {
            warn!(
                "{:.1}g is outside the usual {UI_MIN_BEAN_WEIGHT_G}-{UI_MAX_BEAN_WEIGHT_G} g range",
                config.bean_weight_g
            );
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Recipe { brew, json } => {
            let recipe = brew.resolve()?.recipe()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&recipe)?);
            } else {
                print!("{}", recipe_summary(&recipe));
            }
        }
        Command::Brew { brew, realtime } => {
            let recipe = brew.resolve()?.recipe()?;
            print!("{}", recipe_summary(&recipe));
            run_session(BrewSession::new(&recipe)?, realtime)?;
        }
    }

    Ok(())
}

/// Drives the session the way a UI would: one tick per second until done.
fn run_session(mut session: BrewSession, realtime: bool) -> Result<()> {
    session.on(SessionEventKind::Pour(PourEventKind::PourReady), |event| {
        if let SessionEvent::Pour(PourEvent::PourReady { index, amount_g }) = event {
            println!("{}: {}", pour_action(*index), format_grams(*amount_g));
        }
    });
    session.on(SessionEventKind::Countdown(TimerEventKind::Tick), |event| {
        if let SessionEvent::Countdown(TimerEvent::Tick { remaining_secs }) = event {
            if *remaining_secs % 15 == 0 && *remaining_secs > 0 {
                println!("  next pour in {}", format_countdown(*remaining_secs));
            }
        }
    });
    session.on(SessionEventKind::Pour(PourEventKind::Complete), |_| {
        println!("Brewing complete!");
    });

    session.start_session()?;
    while !session.is_finished() {
        if realtime {
            std::thread::sleep(Duration::from_secs(1));
        }
        session.tick()?;
    }

    info!(
        "Session finished: {} pours in {}",
        session.total_pours(),
        format_countdown(session.elapsed_secs())
    );
    println!("{}", serde_json::to_string(&session.snapshot())?);
    Ok(())
}

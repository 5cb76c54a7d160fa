use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use monitor::{
    config::{mask, Config},
    context::Context,
    history::History,
    report,
    station::{ambient::AmbientSampler, StationSampler},
    run, Monitor,
};

#[derive(Parser, Debug)]
#[command(name = "aqi-monitor", version, about = "PM2.5 air quality monitor")]
struct Cli {
    /// Config file (default: the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Output machine-readable JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a PM2.5 concentration (µg/m³) to an AQI.
    Classify {
        #[arg(allow_hyphen_values = true)]
        pm25: String,
    },
    /// Fetch the station's latest report once.
    Fetch,
    /// Fetch repeatedly until interrupted.
    Watch {
        /// Minutes between refreshes; overrides the config file.
        #[arg(long)]
        interval_minutes: Option<u64>,
    },
    /// Manage the stored Ambient Weather keys.
    Keys {
        #[command(subcommand)]
        command: KeyCommands,
    },
}

#[derive(Subcommand, Debug)]
enum KeyCommands {
    /// Save keys to the config file.
    Save {
        #[arg(long)]
        api_key: String,
        #[arg(long)]
        app_key: String,
    },
    /// Show which keys are configured.
    Show,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let Cli {
        config,
        json,
        command,
    } = Cli::parse();
    let config_path = config.map_or_else(Config::default_path, Ok);

    match command {
        Commands::Classify { pm25 } => {
            let result = aqi::classify(pm25.as_str());
            if json {
                println!("{}", report::classification_to_json(&result));
            } else {
                println!("{}", report::classification(&result));
            }
            if result.is_err() {
                std::process::exit(1);
            }
        }
        Commands::Fetch => {
            let config = load_config(&config_path?)?;
            let mut monitor = Monitor::new(ambient_sampler(&config)?, History::new(1));
            let obs = monitor.refresh().context("fetching station data")?;
            if json {
                println!("{}", report::observation_to_json(&obs));
            } else {
                println!("{}", report::observation(&obs));
            }
        }
        Commands::Watch { interval_minutes } => {
            let mut config = load_config(&config_path?)?;
            if let Some(minutes) = interval_minutes {
                config.refresh.interval_minutes = minutes;
            }
            config.validate()?;
            watch(&config, json)?;
        }
        Commands::Keys { command } => keys(&config_path?, command)?,
    }
    Ok(())
}

fn load_config(path: &std::path::Path) -> anyhow::Result<Config> {
    let mut config = Config::load(path)?;
    config.apply_env();
    config.validate()?;
    Ok(config)
}

fn ambient_sampler(config: &Config) -> anyhow::Result<AmbientSampler> {
    let credentials = config
        .ambient
        .credentials()
        .context("set keys with `aqi-monitor keys save`, or AMBIENT_API_KEY / AMBIENT_APP_KEY")?;
    Ok(AmbientSampler::new(credentials, &config.ambient)?)
}

fn watch(config: &Config, json: bool) -> anyhow::Result<()> {
    let ctx = Context::new();
    {
        let ctx = ctx.clone();
        ctrlc::set_handler(move || {
            tracing::info!("got SIGINT, closing context");
            ctx.cancel();
        })
        .context("could not set SIGINT handler")?;
    }

    let sampler: Box<dyn StationSampler> = Box::new(ambient_sampler(config)?);
    let mut monitor = Monitor::new(sampler, History::new(config.history.capacity));
    let interval: Duration = config.refresh_interval();
    tracing::info!(
        "auto-refresh enabled every {} minutes",
        config.refresh.interval_minutes
    );

    run(&ctx, &mut monitor, interval, |outcome, history| {
        match (outcome, json) {
            (Ok(obs), true) => println!("{}", report::observation_to_json(obs)),
            (Ok(obs), false) => {
                println!("{}", report::observation(obs));
                println!("{}\n", report::chart(history));
            }
            (Err(e), true) => println!("{}", serde_json::json!({ "error": e.to_string() })),
            (Err(e), false) => println!("Fetch failed: {e}\n"),
        }
    });

    tracing::info!("shut down");
    Ok(())
}

fn keys(path: &std::path::Path, command: KeyCommands) -> anyhow::Result<()> {
    match command {
        KeyCommands::Save { api_key, app_key } => {
            let mut config = Config::load(path)?;
            config.ambient.api_key = Some(api_key.trim().to_owned());
            config.ambient.app_key = Some(app_key.trim().to_owned());
            // Refuse to save blank keys.
            config.ambient.credentials()?;
            config.save(path)?;
            println!("API Key and App Key saved to {}.", path.display());
        }
        KeyCommands::Show => {
            let mut config = Config::load(path)?;
            config.apply_env();
            let show = |k: &Option<String>| k.as_deref().map_or_else(|| "(not set)".to_owned(), mask);
            println!("config: {}", path.display());
            println!("api_key: {}", show(&config.ambient.api_key));
            println!("app_key: {}", show(&config.ambient.app_key));
            println!("endpoint: {}", config.ambient.endpoint);
            if let Some(device) = &config.ambient.device {
                println!("device: {device}");
            }
        }
    }
    Ok(())
}
